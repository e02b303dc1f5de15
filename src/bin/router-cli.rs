use clap::{Parser, Subcommand};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Management CLI for the Application API router", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List backends with their circuit breaker state
    Backends,
    /// Send a JSON payload through the router
    Send {
        /// JSON body to forward
        #[arg(short, long, default_value = "{}")]
        data: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Backends => {
            let res = client.get(format!("{}/admin/backends", cli.url)).send().await?;
            let status = res.status();
            if !status.is_success() {
                eprintln!("Error: Admin API returned status {}", status);
                if let Ok(text) = res.text().await {
                    eprintln!("Response: {}", text);
                }
                return Ok(());
            }
            let json: Value = res.json().await?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Commands::Send { data } => {
            let payload: Value = serde_json::from_str(&data)?;
            let res = client
                .post(format!("{}/api/router", cli.url))
                .header(CONTENT_TYPE, "application/json")
                .body(payload.to_string())
                .send()
                .await?;
            println!("{}", res.status());
            println!("{}", res.text().await?);
        }
    }

    Ok(())
}
