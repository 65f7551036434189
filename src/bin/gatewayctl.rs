use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use doc_gateway::config::load_config;

#[derive(Parser)]
#[command(name = "gatewayctl")]
#[command(about = "Management CLI for the document gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8081")]
    url: String,

    #[arg(short, long, env = "GATEWAY_ADMIN_KEY", default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// Show the active routing policy and rule order
    Routing,
    /// Show which rule decides a host and path
    Explain {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        path: String,
    },
    /// Count stored documents
    Documents,
    /// Load and validate a config file without contacting a gateway
    Check {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::Check { config } = &cli.command {
        return Ok(check(config));
    }

    let client = admin_client(&cli.key)?;
    let request = match cli.command {
        Commands::Status => client.get(format!("{}/admin/status", cli.url)),
        Commands::Routing => client.get(format!("{}/admin/routing", cli.url)),
        Commands::Documents => client.get(format!("{}/admin/documents/count", cli.url)),
        Commands::Explain { host, path } => {
            let mut query = vec![("path", path)];
            if let Some(host) = host {
                query.push(("host", host));
            }
            client.get(format!("{}/admin/explain", cli.url)).query(&query)
        }
        Commands::Check { .. } => unreachable!("handled above"),
    };

    print_response(request.send().await?).await
}

fn admin_client(key: &str) -> Result<reqwest::Client, Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
    Ok(reqwest::Client::builder().default_headers(headers).build()?)
}

fn check(path: &Path) -> ExitCode {
    match load_config(path) {
        Ok(config) => {
            println!(
                "OK: {} (mode {}, base host {})",
                path.display(),
                config.deployment.mode,
                config.deployment.base_host
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Invalid config {}: {}", path.display(), e);
            ExitCode::FAILURE
        }
    }
}

async fn print_response(res: reqwest::Response) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(ExitCode::FAILURE);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(ExitCode::SUCCESS)
}
