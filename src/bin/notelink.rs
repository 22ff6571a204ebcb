//! Notelink CLI: import notes and resolve the wiki-links between them.
//!
//! Usage:
//!   notelink import [--owner ID] [--db path] [--config path] [--dry-run] <PATHS>...
//!   notelink list --owner ID [--db path]

use clap::{Parser, Subcommand};
use notelink::{
    collect_files, DocumentStore, ImportConfig, ImportCoordinator, OpenStore, OwnerId, RawFile,
    SqliteStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(
    name = "notelink",
    version,
    about = "Batch note import with wiki-link resolution"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import files (or the files directly inside directories)
    Import {
        /// Files or directories to import
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Owner of the imported notes (defaults to the config's default_owner)
        #[arg(long)]
        owner: Option<String>,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
        /// Path to YAML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the write records as JSON instead of storing them
        #[arg(long)]
        dry_run: bool,
    },
    /// List an owner's notes
    List {
        /// Owner whose notes to list
        #[arg(long)]
        owner: String,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

/// Get the default database path (~/.local/share/notelink/notelink.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("notelink").join("notelink.db")
}

fn open_store(db: Option<PathBuf>) -> Result<SqliteStore, String> {
    let db_path = db.unwrap_or_else(default_db_path);
    SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))
}

async fn cmd_import(
    paths: &[PathBuf],
    owner: Option<String>,
    db: Option<PathBuf>,
    config: Option<PathBuf>,
    dry_run: bool,
) -> i32 {
    let config = match config {
        Some(path) => match ImportConfig::load(&path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: cannot load config '{}': {}", path.display(), e);
                return 1;
            }
        },
        None => ImportConfig::default(),
    };

    let owner = match owner.or_else(|| config.default_owner.clone()) {
        Some(o) => OwnerId::new(o),
        None => {
            eprintln!("Error: no owner given (use --owner or set default_owner)");
            return 1;
        }
    };

    let files = match collect_files(paths, &config) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if files.is_empty() {
        eprintln!("Error: no importable files found");
        return 1;
    }

    let store = match open_store(db) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let coordinator = ImportCoordinator::new(Arc::new(store)).with_config(&config);
    if dry_run {
        return print_records(&coordinator, &files, &owner).await;
    }

    println!("Importing {} notes, please wait...", files.len());
    match coordinator.import_for_owner(&files, &owner).await {
        Ok(report) => {
            if !report.is_fully_committed() {
                eprintln!("{} notes failed:", report.failed());
                for failure in &report.failures {
                    eprintln!("  {} ({})", failure.title, failure.reason);
                }
            }
            println!("{}", report.summary());
            if report.committed == 0 {
                1
            } else {
                0
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// Resolve against the stored index and print what an import would write
async fn print_records(
    coordinator: &ImportCoordinator,
    files: &[RawFile],
    owner: &OwnerId,
) -> i32 {
    let index = match coordinator.store().load_index(owner).await {
        Ok(index) => index,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let batch = coordinator.prepare(files, &index, owner);
    for failure in &batch.failures {
        eprintln!("  would fail: {} ({})", failure.title, failure.reason);
    }
    match serde_json::to_string_pretty(&batch.records()) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_list(owner: &str, db: Option<PathBuf>) -> i32 {
    let store = match open_store(db) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let docs = match store.list_documents(&OwnerId::new(owner)).await {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if docs.is_empty() {
        println!("No notes for '{}'.", owner);
        return 0;
    }
    println!("{:<36}  {:<32}  {:>7}", "ID", "TITLE", "NODES");
    println!("{}", "-".repeat(79));
    for doc in docs {
        let nodes = match &doc.content {
            Some(tree) => tree.node_count().to_string(),
            None => "-".to_string(),
        };
        println!("{:<36}  {:<32}  {:>7}", doc.id, doc.title, nodes);
    }
    0
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: could not install logger: {}", e);
    }

    let code = match cli.command {
        Commands::Import {
            paths,
            owner,
            db,
            config,
            dry_run,
        } => cmd_import(&paths, owner, db, config, dry_run).await,
        Commands::List { owner, db } => cmd_list(&owner, db).await,
    };
    std::process::exit(code);
}
