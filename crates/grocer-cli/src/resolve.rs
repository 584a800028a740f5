//! Resolution command handlers for the CLI.
//!
//! Called from `main` after config and the database pool are established.
//! Each handler builds the conversion engine over Postgres and Open Food
//! Facts and prints its result as JSON.

use clap::Subcommand;
use grocer_core::{AppConfig, Principal};
use grocer_openfood::OpenFoodClient;
use grocer_resolver::{ConversionChoice, ConversionEngine, PgCatalog, ResolverSettings};
use sqlx::PgPool;
use uuid::Uuid;

type PgEngine = ConversionEngine<PgCatalog, OpenFoodClient, PgCatalog, PgCatalog>;

/// Sub-commands available under `convert`.
#[derive(Debug, Subcommand)]
pub enum ConvertCommands {
    /// Bind to a product already in the catalog
    Existing {
        #[arg(long)]
        product: Uuid,
    },
    /// Import a product from Open Food Facts by barcode
    External {
        #[arg(long)]
        barcode: String,
    },
    /// Create a new catalog product
    Custom {
        #[arg(long)]
        name: String,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        barcode: Option<String>,
    },
}

impl From<ConvertCommands> for ConversionChoice {
    fn from(command: ConvertCommands) -> Self {
        match command {
            ConvertCommands::Existing { product } => ConversionChoice::UseExisting {
                product_id: product,
            },
            ConvertCommands::External { barcode } => ConversionChoice::CreateFromExternal { barcode },
            ConvertCommands::Custom {
                name,
                brand,
                barcode,
            } => ConversionChoice::CreateCustom {
                name,
                brand,
                barcode,
            },
        }
    }
}

pub(crate) fn principal(id: Uuid, email: String) -> Principal {
    Principal { id, email }
}

fn build_engine(config: &AppConfig, pool: PgPool) -> anyhow::Result<PgEngine> {
    let catalog = PgCatalog::new(pool);
    let off = OpenFoodClient::with_base_url(
        config.off_request_timeout_secs,
        &config.off_user_agent,
        &config.off_base_url,
    )?
    .with_retry_policy(config.off_max_retries, config.off_retry_backoff_base_ms);

    Ok(ConversionEngine::new(
        catalog.clone(),
        off,
        catalog.clone(),
        catalog,
        ResolverSettings::from_app_config(config),
    ))
}

pub(crate) async fn run_suggest(
    config: &AppConfig,
    pool: PgPool,
    item_id: Uuid,
    principal: Principal,
) -> anyhow::Result<()> {
    let engine = build_engine(config, pool)?;
    let suggestion = engine.suggest(&principal, item_id).await?;
    println!("{}", serde_json::to_string_pretty(&suggestion)?);
    Ok(())
}

pub(crate) async fn run_convert(
    config: &AppConfig,
    pool: PgPool,
    item_id: Uuid,
    principal: Principal,
    command: ConvertCommands,
) -> anyhow::Result<()> {
    let engine = build_engine(config, pool)?;
    let result = engine
        .convert(&principal, item_id, ConversionChoice::from(command))
        .await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.success {
        anyhow::bail!(
            "conversion failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

pub(crate) async fn run_opportunities(
    config: &AppConfig,
    pool: PgPool,
    list_id: Uuid,
) -> anyhow::Result<()> {
    let engine = build_engine(config, pool)?;
    let ids = engine.identify_conversion_opportunities(list_id).await?;
    if ids.is_empty() {
        println!("No conversion opportunities on list {list_id}.");
        return Ok(());
    }
    for id in ids {
        println!("{id}");
    }
    Ok(())
}
