pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::client::BuildProClient;

#[derive(Parser)]
#[command(name = "buildpro")]
#[command(about = "BuildPro CLI - Command-line interface for the BuildPro project management API")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "BUILDPRO_SERVER",
        default_value = "http://localhost:3000",
        help = "Base URL of the BuildPro API server"
    )]
    pub server: String,

    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Customer records")]
    Customers {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "Project records")]
    Projects {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "Task records and bulk operations")]
    Tasks {
        #[command(subcommand)]
        cmd: commands::tasks::TaskCommands,
    },

    #[command(about = "File metadata records")]
    Files {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "Upload a file to the server")]
    Upload {
        #[arg(help = "Path of the file to upload")]
        path: std::path::PathBuf,
        #[arg(long, help = "Upload as an image (image media type, 5MB limit)")]
        image: bool,
    },

    #[command(about = "Load demo data, or show what is stored")]
    Seed {
        #[command(subcommand)]
        cmd: Option<commands::seed::SeedCommands>,
        #[arg(long, help = "Clear existing records before seeding")]
        clear: bool,
        #[arg(long = "type", help = "What to seed: all, customers or projects")]
        seed_type: Option<String>,
    },

    #[command(about = "Check server health")]
    Health,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    use commands::resource::Resource;

    let output_format = OutputFormat::from_cli(&cli);
    let client = BuildProClient::new(&cli.server)?;

    match cli.command {
        Commands::Customers { cmd } => commands::resource::handle(&client, Resource::Customers, cmd, output_format).await,
        Commands::Projects { cmd } => commands::resource::handle(&client, Resource::Projects, cmd, output_format).await,
        Commands::Tasks { cmd } => commands::tasks::handle(&client, cmd, output_format).await,
        Commands::Files { cmd } => commands::resource::handle(&client, Resource::Files, cmd, output_format).await,
        Commands::Upload { path, image } => commands::upload::handle(&client, path, image, output_format).await,
        Commands::Seed { cmd, clear, seed_type } => {
            commands::seed::handle(&client, cmd, clear, seed_type, output_format).await
        }
        Commands::Health => {
            let envelope = client.health().await;
            utils::output_envelope(&output_format, &envelope, "Server is healthy")
        }
    }
}
