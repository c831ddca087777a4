use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use lead_intake::config::{load_with_env, DeliveryMode};
use lead_intake::observability::logging;
use lead_intake::record::Record;
use lead_intake::submit::{HttpTransport, SubmissionChain};

#[derive(Parser)]
#[command(name = "lead-cli")]
#[command(about = "Submit contact leads to a lead-intake endpoint", long_about = None)]
struct Cli {
    /// Endpoint URL; overrides config and LEAD_INTAKE_ENDPOINT_URL.
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Send a single JSON request and read the reply instead of the
    /// fallback chain.
    #[arg(long)]
    confirmed: bool,

    /// Print the outcome as JSON.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit one contact record
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        company: String,
        #[arg(long)]
        message: String,
    },
    /// Probe the endpoint without submitting anything
    Status,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_with_env(cli.config.as_deref())?;
    logging::init_logging("warn");

    if let Some(endpoint) = cli.endpoint {
        config.client.endpoint_url = Some(endpoint);
    }
    if cli.confirmed {
        config.client.mode = DeliveryMode::Confirmed;
    }

    match cli.command {
        Commands::Submit {
            name,
            phone,
            email,
            company,
            message,
        } => {
            let record = Record {
                name,
                phone,
                email,
                company,
                message,
                timestamp: String::new(),
            };

            let missing = record.missing_required();
            if !missing.is_empty() {
                eprintln!("Missing required fields: {}", missing.join(", "));
                return Ok(ExitCode::from(2));
            }

            let chain = SubmissionChain::from_config(&config, Arc::new(HttpTransport::default()));
            let outcome = chain.submit(&record).await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", outcome.message);
            }

            Ok(if outcome.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Status => {
            let Some(endpoint) = config.client.endpoint_url else {
                eprintln!("Error: no endpoint configured");
                return Ok(ExitCode::FAILURE);
            };

            let res = reqwest::Client::new().get(&endpoint).send().await?;
            let status = res.status();
            let text = res.text().await?;

            if cli.json {
                let body = serde_json::json!({ "status": status.as_u16(), "body": text });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{} {}", status, text);
            }

            Ok(if status.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
