//! handwitch: Telegram bot that runs described HTTP requests, asking for missing params.

use anyhow::Result;
use clap::{Parser, Subcommand};
use handwitch_telegram::{check_descriptions, run_bot, BotConfig};

#[derive(Parser)]
#[command(name = "handwitch")]
#[command(about = "Run HTTP requests described in a file from Telegram", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot (config from env; flags override).
    Serve {
        /// Overrides BOT_TOKEN.
        #[arg(short, long)]
        token: Option<String>,
        /// JSON config file overlaid on the environment.
        #[arg(short, long)]
        config: Option<String>,
        /// Hand descriptions file; overrides DESCRIPTIONS_PATH and the config file.
        #[arg(short, long)]
        path: Option<String>,
    },
    /// Validate a descriptions file and list its hands.
    Check {
        #[arg(short, long)]
        path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            token,
            config,
            path,
        } => {
            let mut bot_config = BotConfig::load(token)?;
            if let Some(file) = config {
                bot_config.apply_file(file)?;
            }
            if let Some(path) = path {
                bot_config.descriptions_path = path;
            }
            run_bot(bot_config).await
        }
        Commands::Check { path } => {
            let path = path.unwrap_or_else(handwitch_telegram::descriptions_path_from_env);
            print!("{}", check_descriptions(path)?);
            Ok(())
        }
    }
}
