use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use colored::Colorize;
use wardrobe_application::EditSession;
use wardrobe_core::config::WardrobeConfig;
use wardrobe_core::preset::{Category, Theme};
use wardrobe_infrastructure::WardrobePaths;
use wardrobe_infrastructure::image_file::{load_image, save_image};

use crate::bootstrap::build_session;

pub enum Edit {
    Prompt(String),
    Preset(String),
}

pub struct ApplyArgs {
    pub input: PathBuf,
    pub category: Category,
    pub edit: Edit,
    pub theme: Option<Theme>,
    pub skip_isolation: bool,
    pub out: PathBuf,
}

/// One-shot edit: load, optionally isolate, apply once, save.
pub async fn run(paths: &WardrobePaths, config: &WardrobeConfig, args: ApplyArgs) -> Result<()> {
    let upload = load_image(&args.input).await?;
    let session = build_session(paths, config).await?;
    if let Some(theme) = args.theme {
        session.set_theme(theme).await;
    }

    if args.skip_isolation {
        session.load_raw_image(upload).await?;
    } else {
        println!("{}", "Isolating character...".bright_black());
        let outcome = session.load_image(upload).await?;
        if outcome.is_fallback()
            && let Some(message) = session.last_error().await
        {
            println!("{} {}", "warning:".yellow().bold(), message);
            println!("{}", "Continuing with the original upload.".bright_black());
        }
    }

    println!("{}", format!("Applying {}...", args.category.label()).bright_black());
    let applied = match &args.edit {
        Edit::Prompt(prompt) => session.apply(args.category, prompt).await,
        Edit::Preset(name) => session.apply_preset(args.category, name).await,
    };
    if let Err(failure) = applied {
        let message = session
            .last_error()
            .await
            .unwrap_or_else(|| failure.to_string());
        bail!(message);
    }

    save_download(&session, &args.out).await
}

async fn save_download(session: &EditSession, out: &Path) -> Result<()> {
    let Some(artifact) = session.download().await else {
        bail!("Nothing to save");
    };
    let path = save_image(out, artifact.file_name(), &artifact).await?;
    println!("{} {}", "Saved".green().bold(), path.display());
    Ok(())
}
