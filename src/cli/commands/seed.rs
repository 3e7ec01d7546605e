use clap::Subcommand;

use crate::cli::utils::output_envelope;
use crate::cli::OutputFormat;
use crate::client::{BuildProClient, SeedOptions};

#[derive(Subcommand)]
pub enum SeedCommands {
    #[command(about = "Show record counts and a sample of stored customers and projects")]
    Status,
}

pub async fn handle(
    client: &BuildProClient,
    cmd: Option<SeedCommands>,
    clear: bool,
    seed_type: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        Some(SeedCommands::Status) => {
            let envelope = client.seed_status().await;
            output_envelope(&output_format, &envelope, "Seed status")
        }
        None => {
            let options = SeedOptions { clear, seed_type };
            let envelope = client.seed(&options).await;
            output_envelope(&output_format, &envelope, "Seeded")
        }
    }
}
