use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use wardrobe_core::preset::{Category, Theme};
use wardrobe_infrastructure::{ConfigStorage, WardrobePaths};

mod bootstrap;
mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "wardrobe")]
#[command(about = "Wardrobe - AI character customization with a branching edit history", long_about = None)]
struct Cli {
    /// Use this directory instead of the platform config directory
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create config.toml and the secret.json template
    Init,
    /// List the presets of a theme
    Presets {
        #[arg(long)]
        theme: Option<Theme>,
        #[arg(long)]
        category: Option<Category>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply one edit to an image file and save the result
    Apply {
        #[arg(long, short)]
        input: PathBuf,
        #[arg(long, short, default_value_t = Category::Clothing)]
        category: Category,
        /// Free-text instruction
        #[arg(long, short, conflicts_with = "preset", required_unless_present = "preset")]
        prompt: Option<String>,
        /// Preset name within the category
        #[arg(long)]
        preset: Option<String>,
        #[arg(long)]
        theme: Option<Theme>,
        /// Use the upload as-is instead of isolating the character first
        #[arg(long)]
        skip_isolation: bool,
        /// Output directory
        #[arg(long, short, default_value = ".")]
        out: PathBuf,
    },
    /// Start an interactive editing session
    Session {
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = WardrobePaths::new(cli.config_dir.as_deref());
    let config = ConfigStorage::new(&paths)?.load().await?;
    let _log_guard = logging::init(&paths, &config.log_level)?;

    match cli.command {
        Commands::Init => commands::init::run(&paths).await?,
        Commands::Presets {
            theme,
            category,
            json,
        } => commands::presets::run(theme.unwrap_or(config.theme), category, json)?,
        Commands::Apply {
            input,
            category,
            prompt,
            preset,
            theme,
            skip_isolation,
            out,
        } => {
            let edit = match (prompt, preset) {
                (_, Some(name)) => commands::apply::Edit::Preset(name),
                (Some(prompt), None) => commands::apply::Edit::Prompt(prompt),
                (None, None) => anyhow::bail!("Either --prompt or --preset is required"),
            };
            let args = commands::apply::ApplyArgs {
                input,
                category,
                edit,
                theme,
                skip_isolation,
                out,
            };
            commands::apply::run(&paths, &config, args).await?
        }
        Commands::Session { input } => commands::repl::run(&paths, &config, input).await?,
    }

    Ok(())
}
