//! IBM Graph CLI: command-line interface for an IBM Graph service instance
//!
//! Uses the ibm-graph-client IbmGraphClient to talk to the service.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use ibm_graph_client::{
    ClientConfig, Edge, ElementId, IbmGraphClient, ResultSet, Schema, Vertex,
};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ibmgraph", version, about = "IBM Graph CLI")]
struct Cli {
    /// Instance API URL, ending in a graph id
    #[arg(long, global = true, env = "IBM_GRAPH_API_URL")]
    api_url: Option<String>,

    #[arg(long, global = true, env = "IBM_GRAPH_USERNAME")]
    username: Option<String>,

    #[arg(long, global = true, env = "IBM_GRAPH_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// JSON or YAML file with apiUrl, username and password
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Graph to operate on instead of the one named by the API URL
    #[arg(long, global = true)]
    graph: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage graphs of the service instance
    Graphs {
        #[command(subcommand)]
        action: GraphCommand,
    },
    /// Show or extend the schema of the current graph
    Schema {
        #[command(subcommand)]
        action: SchemaCommand,
    },
    /// Vertex operations
    Vertex {
        #[command(subcommand)]
        action: VertexCommand,
    },
    /// Edge operations
    Edge {
        #[command(subcommand)]
        action: EdgeCommand,
    },
    /// Index operations
    Index {
        #[command(subcommand)]
        action: IndexCommand,
    },
    /// Run a Gremlin traversal
    Gremlin {
        /// The traversal, e.g. "g.V().count()"
        traversal: String,

        /// Bindings as a JSON object
        #[arg(long)]
        bindings: Option<String>,
    },
    /// Bulk load a GraphSON file
    Load {
        file: PathBuf,
    },
    /// Start an interactive Gremlin shell
    Shell,
}

#[derive(Subcommand)]
enum GraphCommand {
    /// List graph ids
    List,
    /// Create a graph; the service picks an id if none is given
    Create { id: Option<String> },
    /// Delete a graph
    Delete { id: String },
}

#[derive(Subcommand)]
enum SchemaCommand {
    /// Print the schema
    Show,
    /// Add the schema elements in a JSON file
    Save { file: PathBuf },
}

#[derive(Subcommand)]
enum VertexCommand {
    Get { id: String },
    /// Add a vertex with a label and key=value properties
    Add {
        label: String,
        #[arg(long = "prop")]
        props: Vec<String>,
    },
    Delete { id: String },
}

#[derive(Subcommand)]
enum EdgeCommand {
    Get { id: String },
    /// Add an edge OUT -[label]-> IN with key=value properties
    Add {
        label: String,
        out_v: String,
        in_v: String,
        #[arg(long = "prop")]
        props: Vec<String>,
    },
    Delete { id: String },
}

#[derive(Subcommand)]
enum IndexCommand {
    Delete { name: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    if let Some(path) = &cli.config {
        return ClientConfig::from_file(path)
            .with_context(|| format!("cannot load configuration from {}", path.display()));
    }
    match (&cli.api_url, &cli.username, &cli.password) {
        (Some(url), Some(user), Some(pass)) => Ok(ClientConfig::new(url, user, pass)),
        _ => Ok(ClientConfig::from_env()?),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut client = IbmGraphClient::new(load_config(&cli)?)?;
    debug!("Connected to {} (graph {})", client.base_url(), client.graph_id());
    if let Some(graph) = &cli.graph {
        client.set_graph(graph).await?;
    }
    let format = &cli.format;

    match cli.command {
        Commands::Graphs { action } => run_graphs(&client, action, format).await,
        Commands::Schema { action } => run_schema(&client, action, format).await,
        Commands::Vertex { action } => run_vertex(&client, action, format).await,
        Commands::Edge { action } => run_edge(&client, action, format).await,
        Commands::Index { action: IndexCommand::Delete { name } } => {
            let removed = client.delete_index(&name).await?;
            println!("{}", if removed { "deleted" } else { "not deleted" });
            Ok(())
        }
        Commands::Gremlin { traversal, bindings } => {
            let bindings = parse_bindings(bindings.as_deref())?;
            let rs = client.execute_gremlin(&traversal, bindings.as_ref()).await?;
            print_result_set(&rs, format)
        }
        Commands::Load { file } => {
            if client.load_graphson_from_file(&file).await? {
                println!("Loaded {} into graph {}", file.display(), client.graph_id());
                Ok(())
            } else {
                bail!("the service did not accept {}", file.display())
            }
        }
        Commands::Shell => run_shell(&client, format).await,
    }
}

async fn run_graphs(client: &IbmGraphClient, action: GraphCommand, format: &OutputFormat) -> anyhow::Result<()> {
    match action {
        GraphCommand::List => {
            let graphs = client.list_graphs().await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&graphs)?),
                OutputFormat::Table => {
                    for g in &graphs {
                        let marker = if g == client.graph_id() { "*" } else { " " };
                        println!("{} {}", marker, g);
                    }
                }
            }
        }
        GraphCommand::Create { id } => {
            let id = client.create_graph(id.as_deref()).await?;
            println!("{}", id);
        }
        GraphCommand::Delete { id } => {
            if client.delete_graph(&id).await? {
                println!("Deleted graph {}", id);
            } else {
                println!("Graph {} not found", id);
            }
        }
    }
    Ok(())
}

async fn run_schema(client: &IbmGraphClient, action: SchemaCommand, format: &OutputFormat) -> anyhow::Result<()> {
    let schema = match action {
        SchemaCommand::Show => client.get_schema().await?,
        SchemaCommand::Save { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            let schema: Schema = serde_json::from_str(&text)
                .with_context(|| format!("{} is not a valid schema", file.display()))?;
            client.save_schema(&schema).await?
        }
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&schema)?),
        OutputFormat::Table => print_schema_table(&schema),
    }
    Ok(())
}

async fn run_vertex(client: &IbmGraphClient, action: VertexCommand, format: &OutputFormat) -> anyhow::Result<()> {
    match action {
        VertexCommand::Get { id } => match client.get_vertex(parse_id(&id)).await? {
            Some(v) => print_vertex(&v, format)?,
            None => println!("Vertex {} not found", id),
        },
        VertexCommand::Add { label, props } => {
            let mut vertex = Vertex::new(label);
            for (k, v) in parse_props(&props)? {
                vertex.set_property(k, v);
            }
            let created = client.add_vertex(&vertex).await?;
            print_vertex(&created, format)?;
        }
        VertexCommand::Delete { id } => {
            let removed = client.delete_vertex(parse_id(&id)).await?;
            println!("{}", if removed { "deleted" } else { "not deleted" });
        }
    }
    Ok(())
}

async fn run_edge(client: &IbmGraphClient, action: EdgeCommand, format: &OutputFormat) -> anyhow::Result<()> {
    match action {
        EdgeCommand::Get { id } => match client.get_edge(parse_id(&id)).await? {
            Some(e) => print_edge(&e, format)?,
            None => println!("Edge {} not found", id),
        },
        EdgeCommand::Add { label, out_v, in_v, props } => {
            let mut edge = Edge::new(label, parse_id(&out_v), parse_id(&in_v));
            for (k, v) in parse_props(&props)? {
                edge.set_property(k, v);
            }
            let created = client.add_edge(&edge).await?;
            print_edge(&created, format)?;
        }
        EdgeCommand::Delete { id } => {
            let removed = client.delete_edge(parse_id(&id)).await?;
            println!("{}", if removed { "deleted" } else { "not deleted" });
        }
    }
    Ok(())
}

async fn run_shell(client: &IbmGraphClient, format: &OutputFormat) -> anyhow::Result<()> {
    println!("IBM Graph Interactive Shell (graph {})", client.graph_id());
    println!("Type Gremlin traversals, or :help for commands. :quit to exit.\n");

    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        eprint!("gremlin> ");

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match trimmed {
            ":quit" | ":exit" | ":q" => break,
            ":help" | ":h" => {
                println!("Commands:");
                println!("  :graphs      List graphs");
                println!("  :schema      Show the schema");
                println!("  :quit        Exit shell");
                println!("  <traversal>  Run a Gremlin traversal");
            }
            ":graphs" => {
                if let Err(e) = run_graphs(client, GraphCommand::List, format).await {
                    eprintln!("Error: {:#}", e);
                }
            }
            ":schema" => {
                if let Err(e) = run_schema(client, SchemaCommand::Show, format).await {
                    eprintln!("Error: {:#}", e);
                }
            }
            traversal => {
                let result = client.execute_gremlin(traversal, None).await;
                match result {
                    Ok(rs) => {
                        if let Err(e) = print_result_set(&rs, format) {
                            eprintln!("Error: {:#}", e);
                        }
                    }
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
        }
    }

    println!("Bye!");
    Ok(())
}

/// Numeric ids are vertex ids, anything else is passed through as text
fn parse_id(raw: &str) -> ElementId {
    raw.trim()
        .parse::<i64>()
        .map(ElementId::Number)
        .unwrap_or_else(|_| ElementId::from(raw.trim()))
}

/// `key=value` pairs; values that parse as JSON keep their type
fn parse_props(props: &[String]) -> anyhow::Result<Vec<(String, Value)>> {
    props
        .iter()
        .map(|p| {
            let (k, v) = p
                .split_once('=')
                .with_context(|| format!("property {:?} is not in key=value form", p))?;
            let value = serde_json::from_str(v).unwrap_or_else(|_| Value::String(v.to_string()));
            Ok((k.trim().to_string(), value))
        })
        .collect()
}

fn parse_bindings(raw: Option<&str>) -> anyhow::Result<Option<serde_json::Map<String, Value>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match serde_json::from_str(raw).context("bindings must be JSON")? {
        Value::Object(map) => Ok(Some(map)),
        _ => bail!("bindings must be a JSON object"),
    }
}

fn print_vertex(v: &Vertex, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(v)?),
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["id", "label", "properties"]);
            table.add_row(vec![
                v.id.as_ref().map(ToString::to_string).unwrap_or_default(),
                v.label.clone().unwrap_or_default(),
                serde_json::to_string(&v.properties)?,
            ]);
            println!("{}", table);
        }
    }
    Ok(())
}

fn print_edge(e: &Edge, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(e)?),
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["id", "label", "outV", "inV", "properties"]);
            table.add_row(vec![
                e.id.as_ref().map(ToString::to_string).unwrap_or_default(),
                e.label.clone(),
                e.out_v.to_string(),
                e.in_v.to_string(),
                serde_json::to_string(&e.properties)?,
            ]);
            println!("{}", table);
        }
    }
    Ok(())
}

fn print_schema_table(schema: &Schema) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["kind", "name", "details"]);

    for k in &schema.property_keys {
        table.add_row(vec![
            "property key".to_string(),
            k.name.clone(),
            format!("{} {}", k.data_type, k.cardinality),
        ]);
    }
    for l in &schema.vertex_labels {
        table.add_row(vec!["vertex label".to_string(), l.name.clone(), String::new()]);
    }
    for l in &schema.edge_labels {
        table.add_row(vec![
            "edge label".to_string(),
            l.name.clone(),
            format!("{:?}", l.multiplicity),
        ]);
    }
    for (kind, indexes) in [("vertex index", &schema.vertex_indexes), ("edge index", &schema.edge_indexes)] {
        for i in indexes {
            let mut details = format!(
                "[{}] {}{}",
                i.property_keys.join(", "),
                if i.composite { "composite" } else { "mixed" },
                if i.unique { " unique" } else { "" }
            );
            if let Some(label) = &i.index_only {
                details.push_str(&format!(" only {}", label));
            }
            table.add_row(vec![kind.to_string(), i.name.clone(), details]);
        }
    }

    println!("{}", table);
}

/// Non-success replies fail the command in every output format
fn ensure_success(rs: &ResultSet) -> anyhow::Result<()> {
    if !rs.http_status().is_success() {
        bail!("{} {}", rs.status_code(), rs.status_message());
    }
    Ok(())
}

fn print_result_set(rs: &ResultSet, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let items: Vec<&Value> = rs.iter().collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "status": {"code": rs.status_code(), "message": rs.status_message()},
                    "data": items,
                    "meta": rs.meta(),
                }))?
            );
            ensure_success(rs)?;
        }
        OutputFormat::Table => {
            ensure_success(rs)?;
            if rs.is_empty() {
                println!("(no results)");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["#", "result"]);
            for (i, item) in rs.iter().enumerate() {
                table.add_row(vec![i.to_string(), format_table_value(item)]);
            }
            println!("{}", table);
            println!("{} result(s)", rs.len());
        }
    }
    Ok(())
}

fn format_table_value(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(map) => {
            // Vertices and edges get a compact representation
            if let (Some(id), Some(label)) = (map.get("id"), map.get("label").and_then(Value::as_str)) {
                match map.get("type").and_then(Value::as_str) {
                    Some("vertex") => return format!("v[{}:{}]", id, label),
                    Some("edge") => return format!("e[{}:{}]", id, label),
                    _ => {}
                }
            }
            serde_json::to_string(v).unwrap_or_default()
        }
        Value::Array(_) => serde_json::to_string(v).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibm_graph_client::{GraphResponse, HttpStatusInfo};
    use serde_json::json;

    fn result_set(code: u16, reason: &str, body: Value) -> ResultSet {
        GraphResponse::new(HttpStatusInfo::new(code, reason).unwrap(), body.to_string()).result_set()
    }

    #[test]
    fn test_failed_reply_fails_in_every_format() {
        let failed = result_set(
            400,
            "Bad Request",
            json!({"code": "ScriptEvaluationError", "message": "No such property: x"}),
        );
        for format in [OutputFormat::Table, OutputFormat::Json] {
            let err = print_result_set(&failed, &format).unwrap_err();
            assert!(err.to_string().contains("ScriptEvaluationError"));
        }

        let ok = result_set(200, "OK", json!({"status": {"code": 200}, "result": {"data": [3]}}));
        for format in [OutputFormat::Table, OutputFormat::Json] {
            assert!(print_result_set(&ok, &format).is_ok());
        }
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("4232"), ElementId::Number(4232));
        assert_eq!(parse_id("odxqw-3bs"), ElementId::from("odxqw-3bs"));
    }

    #[test]
    fn test_parse_props() {
        let props = parse_props(&["name=Alice".to_string(), "age=30".to_string()]).unwrap();
        assert_eq!(props[0], ("name".to_string(), json!("Alice")));
        assert_eq!(props[1], ("age".to_string(), json!(30)));
        assert!(parse_props(&["novalue".to_string()]).is_err());
    }

    #[test]
    fn test_parse_bindings() {
        assert!(parse_bindings(None).unwrap().is_none());
        assert_eq!(parse_bindings(Some(r#"{"n":1}"#)).unwrap().unwrap()["n"], json!(1));
        assert!(parse_bindings(Some("[1]")).is_err());
    }

    #[test]
    fn test_format_table_value() {
        assert_eq!(
            format_table_value(&json!({"id": 1, "label": "person", "type": "vertex"})),
            "v[1:person]"
        );
        assert_eq!(format_table_value(&json!(null)), "null");
        assert_eq!(format_table_value(&json!("x")), "x");
    }
}
