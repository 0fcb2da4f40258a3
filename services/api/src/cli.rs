use crate::demo::{run_demo, DemoArgs};
use crate::infra::BoardStore;
use crate::server;
use clap::{Args, Parser, Subcommand};
use job_portal::config::{AppConfig, StorageConfig};
use job_portal::error::AppError;
use job_portal::telemetry;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "Job Portal",
    about = "Run the job portal service and its maintenance commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Create the SQLite schema if it does not exist yet
    InitDb(InitDbArgs),
    /// Walk through the hiring lifecycle on an in-memory board
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override DATABASE_URL (`memory`, `sqlite::memory:` or `sqlite://<path>`)
    #[arg(long)]
    pub(crate) database_url: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct InitDbArgs {
    /// Override DATABASE_URL for the database to initialize
    #[arg(long)]
    pub(crate) database_url: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::InitDb(args) => init_db(args),
        Command::Demo(args) => run_demo(args),
    }
}

fn init_db(args: InitDbArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(url) = args.database_url {
        config.storage = StorageConfig::parse(&url)?;
    }
    telemetry::init(&config.telemetry)?;

    let store = BoardStore::open(&config.storage)?;
    match &config.storage {
        StorageConfig::SqliteFile(path) => {
            info!(path = %path.display(), "database schema ready");
            println!("Database ready at {}", path.display());
        }
        StorageConfig::SqliteMemory | StorageConfig::Memory => {
            println!(
                "Nothing to initialize: {} storage lives only for the process",
                store.label()
            );
        }
    }
    Ok(())
}
