//! Marketplace Pricer — sale-price calculator for e-commerce marketplaces
//!
//! Usage:
//!   marketplace-pricer calc --product-value 100 --shipping 20 --tax 5 --ads 10 --profit 15
//!   marketplace-pricer catalog                 — Print the active fee catalog
//!   marketplace-pricer serve --port 3002       — Launch JSON API (and static UI)

mod format;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use pricing::{
    calculate, calculate_validated, load_catalog, Calculation, CalculatorInputs,
    MarketplaceFeeProfile, PricingOutcome, RawCalculatorInputs,
};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use crate::format::{format_currency, format_percent};

const APP_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_HASH"));

#[derive(Parser)]
#[command(name = "marketplace-pricer")]
#[command(about = "Sale-price calculator for e-commerce marketplaces", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Fee catalog JSON file (defaults to PRICER_CATALOG_PATH, then the built-in table)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a product on every marketplace
    Calc {
        /// Product cost (accepts "12,50" or "12.50")
        #[arg(long)]
        product_value: String,
        /// Shipping cost absorbed under free shipping
        #[arg(long, default_value = "0")]
        shipping: String,
        /// Invoice tax, percent of sale price
        #[arg(long, default_value = "0")]
        tax: String,
        /// Advertising spend, percent of sale price
        #[arg(long, default_value = "0")]
        ads: String,
        /// Desired net margin, percent of sale price
        #[arg(long)]
        profit: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Optional JSON export path
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Print the active fee catalog
    Catalog,
    /// Launch the pricing web server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Port to listen on
        #[arg(short, long, default_value_t = 3002)]
        port: u16,
    },
}

#[derive(Clone)]
struct AppState {
    catalog: Arc<Vec<MarketplaceFeeProfile>>,
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug,pricing=debug,marketplace_pricer=debug")
    } else {
        EnvFilter::new("info,pricing=info,marketplace_pricer=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(filter)
        .init();
}

/// Resolve the catalog once at startup: CLI flag, then env, then built-in.
fn resolve_catalog(flag: Option<PathBuf>) -> anyhow::Result<Vec<MarketplaceFeeProfile>> {
    let path = flag.or_else(|| std::env::var("PRICER_CATALOG_PATH").ok().map(PathBuf::from));
    load_catalog(path.as_deref()).map_err(|e| {
        error!("Failed to load fee catalog: {}", e);
        anyhow::anyhow!("Catalog load failed: {}", e)
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    dotenvy::dotenv().ok();

    let catalog = resolve_catalog(cli.catalog)?;

    match cli.command {
        Commands::Calc {
            product_value,
            shipping,
            tax,
            ads,
            profit,
            json,
            export,
        } => {
            let raw = RawCalculatorInputs {
                product_value,
                shipping,
                tax_percent: tax,
                ads_percent: ads,
                desired_profit_percent: profit,
            };
            cmd_calc(&catalog, &raw, json, export)?;
        }
        Commands::Catalog => {
            print_catalog(&catalog);
        }
        Commands::Serve { host, port } => {
            cmd_serve(catalog, &host, port).await?;
        }
    }

    Ok(())
}

// ============================================================================
// Calc command — one calculation from the CLI
// ============================================================================

fn cmd_calc(
    catalog: &[MarketplaceFeeProfile],
    raw: &RawCalculatorInputs,
    json: bool,
    export: Option<PathBuf>,
) -> anyhow::Result<()> {
    let inputs = raw
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid input: {}", e))?;
    let calculation = calculate(&inputs, catalog);

    if json {
        println!("{}", serde_json::to_string_pretty(&build_export_json(&calculation))?);
    } else {
        println!("\n=== Marketplace Pricer v{} ===", APP_VERSION);
        print_inputs(&inputs);
        print_results(&calculation);
    }

    if let Some(path) = export {
        let body = serde_json::to_string_pretty(&build_export_json(&calculation))?;
        std::fs::write(&path, body)?;
        info!("Exported {} results to {}", calculation.outcomes.len(), path.display());
    }

    Ok(())
}

fn print_inputs(inputs: &CalculatorInputs) {
    println!(
        "Product: {} | Shipping: {} | Tax: {} | Ads: {} | Target margin: {}",
        format_currency(inputs.product_value),
        format_currency(inputs.shipping),
        format_percent(inputs.tax_percent),
        format_percent(inputs.ads_percent),
        format_percent(inputs.desired_profit_percent),
    );
}

fn print_results(calculation: &Calculation) {
    println!(
        "\n  {:<30} {:>14} {:>14} {:>10} {:>12} {:>14} {:>8}",
        "Marketplace", "Sale price", "Commission", "Fixed fee", "Shipping", "Net profit", "Margin"
    );
    println!("  {}", "-".repeat(108));

    let mut unsettled = 0;
    for outcome in &calculation.outcomes {
        match outcome {
            PricingOutcome::Priced(r) => {
                let marker = if r.converged {
                    ""
                } else {
                    unsettled += 1;
                    " *"
                };
                println!(
                    "  {:<30} {:>14} {:>14} {:>10} {:>12} {:>14} {:>8}{}",
                    r.label,
                    format_currency(r.sale_price),
                    format_currency(r.commission_amount),
                    if r.fixed_fee.is_zero() {
                        "-".to_string()
                    } else {
                        format_currency(r.fixed_fee)
                    },
                    if r.shipping_subsidy.is_zero() {
                        "free".to_string()
                    } else {
                        format_currency(r.shipping_subsidy)
                    },
                    format_currency(r.net_profit),
                    format_percent(r.net_profit_percent),
                    marker,
                );
            }
            PricingOutcome::Infeasible {
                label,
                aggregate_rate,
                ..
            } => {
                println!(
                    "  {:<30} infeasible: fees and margin take {} of the price",
                    label,
                    format_percent(aggregate_rate * Decimal::ONE_HUNDRED),
                );
            }
            PricingOutcome::Overflow { label, .. } => {
                println!("  {:<30} out of range: price too large to compute", label);
            }
        }
    }

    if unsettled > 0 {
        println!("\n  * price still moving between fee bands after the pass limit (approximate)");
    }
}

fn print_catalog(catalog: &[MarketplaceFeeProfile]) {
    println!(
        "\n  {:<26} {:<16} {:>10} {:>8} {:>14}",
        "Marketplace", "Commission", "Fixed fee", "Tiered", "Free shipping"
    );
    println!("  {}", "-".repeat(78));
    for p in catalog {
        let rates: Vec<String> = p
            .commission_rates
            .iter()
            .map(|r| format!("{}%", r.normalize()))
            .collect();
        println!(
            "  {:<26} {:<16} {:>10} {:>8} {:>14}",
            p.name,
            rates.join(" / "),
            if p.uses_tiered_fixed_fee {
                "by band".to_string()
            } else {
                format_currency(p.flat_fee)
            },
            if p.uses_tiered_fixed_fee { "yes" } else { "no" },
            if p.applies_free_shipping_subsidy_above_threshold {
                "above R$ 79"
            } else {
                "no"
            },
        );
    }
}

// ============================================================================
// Serve command — Axum web server
// ============================================================================

async fn cmd_serve(catalog: Vec<MarketplaceFeeProfile>, host: &str, port: u16) -> anyhow::Result<()> {
    info!("Marketplace Pricer v{} starting...", APP_VERSION);
    info!("Fee catalog: {} marketplaces", catalog.len());

    let state = AppState {
        catalog: Arc::new(catalog),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Determine static files directory
    let static_dir = match std::env::var("PRICER_STATIC_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let exe_path = std::env::current_exe().unwrap_or_default();
            let exe_dir = exe_path.parent().unwrap_or(std::path::Path::new("."));
            let dist_dir = exe_dir.join("dist");
            if dist_dir.exists() {
                dist_dir
            } else {
                PathBuf::from("dist")
            }
        }
    };
    if !static_dir.exists() {
        warn!("Static directory {} not found, serving API only", static_dir.display());
    }

    let api_routes = Router::new()
        .route("/health", get(api_health))
        .route("/marketplaces", get(api_marketplaces))
        .route("/calculate", post(api_calculate))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .fallback_service(ServeDir::new(&static_dir))
        .layer(cors);

    let addr: std::net::SocketAddr = format!("{}:{}", host, port).parse()?;
    println!("\n=== Marketplace Pricer v{} ===", APP_VERSION);
    println!("Listening on http://{}", addr);
    println!("\nEndpoints:");
    println!("  GET  /api/health        - Health check");
    println!("  GET  /api/marketplaces  - Active fee catalog");
    println!("  POST /api/calculate     - Price a product on every marketplace");
    println!("\n  Static files: {}", static_dir.display());
    println!("\nPress Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health
async fn api_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "marketplace-pricer",
        "version": APP_VERSION,
    }))
}

/// GET /api/marketplaces — active fee catalog
async fn api_marketplaces(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "marketplaces": state.catalog.as_slice(),
    }))
}

/// POST /api/calculate — price a product on every marketplace
async fn api_calculate(
    State(state): State<AppState>,
    Json(inputs): Json<CalculatorInputs>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    info!(
        product_value = %inputs.product_value,
        shipping = %inputs.shipping,
        profit = %inputs.desired_profit_percent,
        "Calculation requested"
    );

    match calculate_validated(&inputs, &state.catalog) {
        Ok(calculation) => Ok(Json(build_export_json(&calculation))),
        Err(e) => {
            warn!("Rejected calculation input: {}", e);
            Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({
                    "success": false,
                    "error": e.to_string(),
                })),
            ))
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// JSON body shared by the API response and the CLI export
fn build_export_json(calculation: &Calculation) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "generated_at": Utc::now().to_rfc3339(),
        "inputs": calculation.inputs,
        "total_results": calculation.outcomes.len(),
        "infeasible": calculation.infeasible_count(),
        "overflow": calculation.overflow_count(),
        "results": calculation.outcomes,
    })
}
