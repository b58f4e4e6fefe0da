use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roommate_ledger::api;
use roommate_ledger::config::LedgerConfig;
use roommate_ledger::db::{self, Database, MemoryStore};
use roommate_ledger::ledger::Ledger;
use roommate_ledger::models::format_amount;
use roommate_ledger::names::{FixedNames, NameGenerator, RandomUserClient};

#[derive(Parser)]
#[command(name = "ledger")]
#[command(about = "Split shared household expenses evenly between roommates")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, env = "PORT", default_value = "3000")]
        port: u16,

        /// Keep all data in memory instead of the SQLite database
        #[arg(long)]
        memory: bool,

        /// Comma-separated names to hand out instead of calling the name service
        #[arg(long, value_delimiter = ',')]
        names: Vec<String>,
    },
    /// Print every member's balances
    Members,
    /// Print every expense with its payer
    Expenses,
    /// Recompute and store all balances
    Recompute,
}

/// Initialize tracing with output to stderr (for report commands) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "roommate_ledger=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // Reports go to stdout, keep it free of log lines
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn open_database(config: &LedgerConfig) -> anyhow::Result<Database> {
    let path = match &config.db_path {
        Some(path) => path.clone(),
        None => db::default_path()?,
    };
    tracing::debug!("Opening database at {}", path.display());

    let db = Database::open(path.clone())
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    db.migrate()?;
    Ok(db)
}

fn name_generator(config: &LedgerConfig, names: Vec<String>) -> Arc<dyn NameGenerator> {
    if names.is_empty() {
        Arc::new(RandomUserClient::new(config.name_api_url.clone()))
    } else {
        Arc::new(FixedNames::new(names))
    }
}

async fn serve(ledger: Ledger, config: &LedgerConfig, port: u16) -> anyhow::Result<()> {
    let app = api::create_router(ledger, config.cors_origins.clone());

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Ledger server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn print_members(ledger: &Ledger) -> anyhow::Result<()> {
    let members = ledger.list_members()?;
    println!("{:<36}  {:<24} {:>10} {:>10}", "ID", "NAME", "OWED", "CREDITED");
    for member in members {
        println!(
            "{:<36}  {:<24} {:>10} {:>10}",
            member.id,
            member.name,
            format_amount(member.owed),
            format_amount(member.credited)
        );
    }
    Ok(())
}

fn print_expenses(ledger: &Ledger) -> anyhow::Result<()> {
    let expenses = ledger.list_expenses()?;
    println!("{:<36}  {:<24} {:<30} {:>10}", "ID", "PAID BY", "DESCRIPTION", "AMOUNT");
    for entry in expenses {
        println!(
            "{:<36}  {:<24} {:<30} {:>10}",
            entry.expense.id,
            entry.payer_name,
            entry.expense.description,
            format_amount(entry.expense.amount)
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = !matches!(cli.command, None | Some(Commands::Serve { .. }));
    init_tracing(use_stderr);

    let config = LedgerConfig::from_env();

    match cli.command {
        Some(Commands::Serve {
            port,
            memory,
            names,
        }) => {
            let names = name_generator(&config, names);
            let ledger = if memory {
                tracing::info!("Using in-memory storage");
                Ledger::with_store(MemoryStore::new(), names)
            } else {
                Ledger::with_store(open_database(&config)?, names)
            };

            tracing::info!("Starting ledger server on port {}", port);
            serve(ledger, &config, port).await?;
        }
        Some(Commands::Members) => {
            let ledger = Ledger::with_store(open_database(&config)?, name_generator(&config, vec![]));
            print_members(&ledger)?;
        }
        Some(Commands::Expenses) => {
            let ledger = Ledger::with_store(open_database(&config)?, name_generator(&config, vec![]));
            print_expenses(&ledger)?;
        }
        Some(Commands::Recompute) => {
            let ledger = Ledger::with_store(open_database(&config)?, name_generator(&config, vec![]));
            ledger.recompute()?;
            print_members(&ledger)?;
        }
        None => {
            // Default: start server
            let ledger = Ledger::with_store(open_database(&config)?, name_generator(&config, vec![]));

            tracing::info!("Starting ledger server on port 3000");
            serve(ledger, &config, 3000).await?;
        }
    }

    Ok(())
}
