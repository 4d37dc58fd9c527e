use anyhow::Result;
use colored::Colorize;
use wardrobe_core::config::WardrobeConfig;
use wardrobe_infrastructure::{ConfigStorage, WardrobePaths};

pub async fn run(paths: &WardrobePaths) -> Result<()> {
    let storage = ConfigStorage::new(paths)?;
    if storage.path().exists() {
        println!("Config already exists: {}", storage.path().display());
    } else {
        storage.save(&WardrobeConfig::default()).await?;
        println!("{} {}", "Created".green(), storage.path().display());
    }

    let secret_path = paths.ensure_secret_file()?;
    println!("Secrets file: {}", secret_path.display());
    println!();
    println!(
        "{}",
        "Add your Gemini API key to the secrets file, or export GEMINI_API_KEY.".bright_black()
    );
    Ok(())
}
