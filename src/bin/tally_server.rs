//! Tally API Server binary
//!
//! HTTP REST API for the consultation dashboard.

use clap::Parser;
use consult_tally::api::{run_api_server, ApiConfig};
use consult_tally::config::{DashboardConfig, DEFAULT_WORKBOOK, WORKBOOK_ENV};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tally-server")]
#[command(version)]
#[command(about = "Tally API Server - HTTP REST API for the consultation dashboard")]
#[command(long_about = r#"
Tally API Server - HTTP REST API for the consultation dashboard

Endpoints:
  - GET  /api/v1/options            - Countries, topics and employees
  - GET  /api/v1/matrix             - Topic × country matrix
  - GET  /api/v1/counts             - Per-country totals
  - GET  /api/v1/sheets             - Detail sheet names
  - GET  /api/v1/entries/:country   - Entries for one country
  - POST /api/v1/entries            - Record a consultation

Additional endpoints:
  - GET  /health                    - Health check
  - GET  /version                   - Server version info
  - GET  /                          - API documentation

Failed writes answer 422 for invalid input and 423 when the workbook
is open in another program.

Example usage:
  tally-server                            # Start on localhost:8080
  tally-server --host 0.0.0.0 --port 3000 --workbook data/Dashboard.xlsx

  curl -X POST http://localhost:8080/api/v1/entries \
    -H "Content-Type: application/json" \
    -d '{"country":"USA","topic":"Marktberatung","employee":"Li","company_name":"ACME"}'
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "TALLY_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "TALLY_PORT")]
    port: u16,

    /// Workbook file the dashboard reads and writes
    #[arg(short, long, default_value = DEFAULT_WORKBOOK, env = WORKBOOK_ENV)]
    workbook: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "consult_tally=info,tally_server=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        dashboard: DashboardConfig::new(args.workbook),
    };

    run_api_server(config).await
}
