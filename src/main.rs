use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use sea_orm::DbBackend;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinema_system::{
    config::{Config, LogFormat},
    database::Database,
    inspect,
    migrations::m20220922_201653_cinema_system,
    schema, Migrator,
};

#[derive(Debug, Parser)]
#[command(name = "cinema-system", version, about = "Cinema booking schema migrations")]
struct Cli {
    /// Overrides DATABASE_URL from the environment or .env
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Log everything at debug level, including executed statements
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations
    Up {
        #[arg(short, long)]
        num: Option<u32>,
    },
    /// Roll back applied migrations (all unless -n is given)
    Down {
        #[arg(short, long)]
        num: Option<u32>,
    },
    /// Show which migrations are applied (creates the migration table if missing)
    Status,
    /// Roll back everything, then apply everything
    Refresh,
    /// Roll back everything and drop the migration table
    Reset,
    /// Print the DDL without connecting
    Sql {
        #[arg(long, value_enum, default_value_t = Dialect::Postgres)]
        dialect: Dialect,
        /// Print the rollback statements instead
        #[arg(long)]
        down: bool,
    },
    /// Print the live schema as JSON
    Inspect,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Dialect {
    Postgres,
    Sqlite,
}

impl From<Dialect> for DbBackend {
    fn from(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Postgres => DbBackend::Postgres,
            Dialect::Sqlite => DbBackend::Sqlite,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(&config, cli.verbose);

    if let Err(e) = run(cli, config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(config: &Config, verbose: bool) {
    let filter = if verbose {
        "cinema_system=debug,sea_orm_migration=debug,sea_orm=debug".to_string()
    } else {
        config.app.rust_log.clone()
    };

    let registry = tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(filter));
    match config.app.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn run(cli: Cli, mut config: Config) -> anyhow::Result<()> {
    if let Some(url) = cli.database_url {
        config.database.url = Some(url);
    }

    let command = cli.command.unwrap_or(Command::Up { num: None });
    if let Command::Sql { dialect, down } = command {
        print_sql(dialect.into(), down);
        return Ok(());
    }

    info!("Environment: {}", config.app.environment);
    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;

    let result = execute(&db, command).await;
    db.close().await?;
    result
}

fn print_sql(backend: DbBackend, down: bool) {
    let tables = m20220922_201653_cinema_system::tables();
    let statements: Vec<String> = if down {
        schema::drop_statements(&tables)
            .iter()
            .map(|statement| schema::render(backend, statement))
            .collect()
    } else {
        tables
            .iter()
            .map(|statement| schema::render(backend, statement))
            .collect()
    };
    for statement in statements {
        println!("{statement};\n");
    }
}

async fn execute(db: &Database, command: Command) -> anyhow::Result<()> {
    let conn = db.connection();
    match command {
        Command::Up { num } => Migrator::up(conn, num).await?,
        Command::Down { num } => Migrator::down(conn, num).await?,
        Command::Status => {
            for migration in Migrator::get_migration_with_status(conn).await? {
                println!("{}\t{}", migration.status(), migration.name());
            }
        }
        Command::Refresh => Migrator::refresh(conn).await?,
        Command::Reset => Migrator::reset(conn).await?,
        Command::Inspect => {
            let snapshot = inspect::snapshot(conn).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::Sql { .. } => {}
    }
    Ok(())
}
