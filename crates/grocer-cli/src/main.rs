mod resolve;

use clap::{Parser, Subcommand};
use grocer_core::AppConfig;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::resolve::ConvertCommands;

const FALLBACK_LOG_LEVEL: &str = "info";

#[derive(Debug, Parser)]
#[command(name = "grocer")]
#[command(about = "Resolve free-text shopping items to catalog products")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse a raw item line and print the result as JSON
    Parse {
        /// Raw text, e.g. "2kg rice 2.99€"
        text: String,
    },
    #[command(flatten)]
    Connected(ConnectedCommands),
}

/// Commands that need configuration and a database pool.
#[derive(Debug, Subcommand)]
enum ConnectedCommands {
    /// Suggest catalog products for a shopping item
    Suggest {
        #[arg(long)]
        item: Uuid,
        /// Id of the acting user
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        email: String,
    },
    /// Bind a shopping item to a catalog product
    Convert {
        #[arg(long)]
        item: Uuid,
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        email: String,
        #[command(subcommand)]
        choice: ConvertCommands,
    },
    /// List completed items of a list that are not yet bound to a product
    Opportunities {
        #[arg(long)]
        list: Uuid,
    },
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check database connectivity
    Ping,
}

fn init_tracing(config: Option<&AppConfig>) -> anyhow::Result<()> {
    let fallback = config.map_or(FALLBACK_LOG_LEVEL, |c| c.log_level.as_str());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = grocer_db::PoolConfig::from_app_config(config);
    Ok(grocer_db::connect_pool(&config.database_url, pool_config).await?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        init_tracing(None)?;
        println!("grocer: run with --help for usage");
        return Ok(());
    };

    let command = match command {
        Commands::Parse { text } => {
            init_tracing(None)?;
            let parsed = grocer_core::parse_item(&text);
            println!("{}", serde_json::to_string_pretty(&parsed)?);
            return Ok(());
        }
        Commands::Connected(command) => command,
    };

    let config = grocer_core::load_app_config()?;
    init_tracing(Some(&config))?;
    tracing::debug!(env = %config.env, "configuration loaded");
    let pool = connect(&config).await?;

    match command {
        ConnectedCommands::Suggest { item, user, email } => {
            resolve::run_suggest(&config, pool, item, resolve::principal(user, email)).await?;
        }
        ConnectedCommands::Convert {
            item,
            user,
            email,
            choice,
        } => {
            resolve::run_convert(&config, pool, item, resolve::principal(user, email), choice)
                .await?;
        }
        ConnectedCommands::Opportunities { list } => {
            resolve::run_opportunities(&config, pool, list).await?;
        }
        ConnectedCommands::Db { command } => match command {
            DbCommands::Migrate => {
                let applied = grocer_db::run_migrations(&pool).await?;
                println!("applied {applied} migration(s)");
            }
            DbCommands::Ping => {
                grocer_db::ping(&pool).await?;
                println!("database reachable");
            }
        },
    }

    Ok(())
}
