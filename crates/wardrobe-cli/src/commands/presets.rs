use anyhow::Result;
use colored::Colorize;
use wardrobe_core::preset::{Category, Preset, Theme, presets};

pub fn run(theme: Theme, category: Option<Category>, json: bool) -> Result<()> {
    let categories = match category {
        Some(category) => vec![category],
        None => Category::all(),
    };

    if json {
        let listing: Vec<serde_json::Value> = categories
            .into_iter()
            .map(|category| {
                let entries: &[Preset] = presets(theme, category);
                serde_json::json!({ "category": category, "presets": entries })
            })
            .collect();
        let value = serde_json::json!({ "theme": theme, "categories": listing });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", format!("=== {} presets ===", theme).bright_magenta().bold());
    for category in categories {
        println!();
        print_category(theme, category);
    }
    Ok(())
}

pub fn print_category(theme: Theme, category: Category) {
    println!(
        "{} {}",
        category.label().bright_cyan().bold(),
        format!("({category})").bright_black()
    );
    for preset in presets(theme, category) {
        let name = format!("{:<22}", preset.name);
        println!("  {} {}", name.yellow(), preset.prompt.bright_black());
    }
}
