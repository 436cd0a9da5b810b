use anyhow::{anyhow, Context};
use attendease_store::codes::generate_department_code;
use attendease_store::import::{import_students, TEMPLATE_HEADER};
use attendease_store::model::{Collection, DepartmentDraft, Fields};
use attendease_store::{sdk, RecordReader, RecordWriter};
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    List { collection: String },
    Get { collection: String, id: u64 },
    Add { collection: String, json: String },
    Update { collection: String, id: u64, json: String },
    Del { collection: String, id: u64 },
    Search { collection: String, query: String },
    Import { file: String },
    Template,
    Stats,
    Reset,
    Code { name: String, start_date: String },
    AddDepartment { name: String, start_date: String },
}

fn parse_fields(json: &str) -> anyhow::Result<Fields> {
    match serde_json::from_str::<Value>(json).context("fields must be a JSON object")? {
        Value::Object(map) => Ok(map),
        other => Err(anyhow!("fields must be a JSON object, got {}", other)),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let store = sdk::open(&sdk::data_dir_from_env(cli.data_dir))?;

    match cli.command {
        Commands::List { collection } => {
            let list = store.list(collection.parse::<Collection>()?);
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        Commands::Get { collection, id } => {
            let collection: Collection = collection.parse()?;
            let record = store
                .get(collection, id)
                .ok_or_else(|| anyhow!("{} record {} not found", collection, id))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Add { collection, json } => {
            let id = store.create(collection.parse()?, parse_fields(&json)?)?;
            println!("{}", id);
        }
        Commands::Update { collection, id, json } => {
            store.update(collection.parse()?, id, parse_fields(&json)?)?;
            println!("OK");
        }
        Commands::Del { collection, id } => {
            store.delete(collection.parse()?, id)?;
            println!("OK");
        }
        Commands::Search { collection, query } => {
            let hits = store.search(collection.parse()?, &query);
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Commands::Import { file } => {
            let text = std::fs::read_to_string(&file).with_context(|| format!("reading {}", file))?;
            let summary = import_students(&store, &text)?;
            println!("Successfully imported {} students!", summary.imported_count);
        }
        Commands::Template => {
            println!("{}", TEMPLATE_HEADER);
        }
        Commands::Stats => {
            println!("{}", serde_json::to_string_pretty(&store.stats())?);
        }
        Commands::Reset => {
            store.reset()?;
            println!("OK");
        }
        Commands::Code { name, start_date } => {
            println!("{}", generate_department_code(&name, &start_date));
        }
        Commands::AddDepartment { name, start_date } => {
            let draft = DepartmentDraft::new(name, start_date);
            let id = store.create(Collection::Departments, draft.create_fields())?;
            println!("{}", id);
        }
    }

    Ok(())
}
