use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use wardrobe_application::{EditSession, SessionEvent};
use wardrobe_core::config::WardrobeConfig;
use wardrobe_core::operation::Hotspot;
use wardrobe_core::outcome::EditFailure;
use wardrobe_core::preset::{Category, Theme};
use wardrobe_core::timeline::{PageBackground, Version};
use wardrobe_infrastructure::WardrobePaths;
use wardrobe_infrastructure::image_file::{load_image, save_image};

use super::presets::print_category;
use crate::bootstrap::build_session;

const COMMANDS: &[&str] = &[
    "/load", "/apply", "/preset", "/presets", "/edit", "/select", "/undo", "/redo", "/reset",
    "/new", "/history", "/save", "/theme", "/status", "/dismiss", "/help", "/quit",
];

/// A parsed line of REPL input.
#[derive(Debug, Clone, PartialEq)]
enum ReplCommand {
    Load(PathBuf),
    /// Plain text: applied with the active category.
    Prompt(String),
    Apply { category: Category, prompt: String },
    Preset { category: Category, name: String },
    Presets(Option<Category>),
    Edit { hotspot: Hotspot, prompt: String },
    Select(usize),
    Undo,
    Redo,
    Reset,
    New,
    History,
    Save(Option<PathBuf>),
    Theme(Option<Theme>),
    Status,
    Dismiss,
    Help,
    Quit,
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::from_str(value).map_err(|_| {
        let names: Vec<String> = Category::all().iter().map(ToString::to_string).collect();
        format!("Unknown category '{}'. Expected one of: {}", value, names.join(", "))
    })
}

fn parse_theme(value: &str) -> Result<Theme, String> {
    Theme::from_str(value).map_err(|_| {
        let names: Vec<String> = Theme::all().iter().map(ToString::to_string).collect();
        format!("Unknown theme '{}'. Expected one of: {}", value, names.join(", "))
    })
}

/// Splits off the first whitespace-delimited word.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

fn require<'a>(value: &'a str, usage: &str) -> Result<&'a str, String> {
    if value.is_empty() {
        Err(format!("Usage: {usage}"))
    } else {
        Ok(value)
    }
}

fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim();
    if !line.starts_with('/') {
        return Ok(ReplCommand::Prompt(line.to_string()));
    }

    let (command, rest) = split_word(line);
    match command {
        "/load" => Ok(ReplCommand::Load(PathBuf::from(require(rest, "/load <file>")?))),
        "/apply" => {
            let (category, prompt) = split_word(rest);
            let category = parse_category(require(category, "/apply <category> <prompt>")?)?;
            let prompt = require(prompt, "/apply <category> <prompt>")?.to_string();
            Ok(ReplCommand::Apply { category, prompt })
        }
        "/preset" => {
            let (category, name) = split_word(rest);
            let category = parse_category(require(category, "/preset <category> <name>")?)?;
            let name = require(name, "/preset <category> <name>")?.to_string();
            Ok(ReplCommand::Preset { category, name })
        }
        "/presets" if rest.is_empty() => Ok(ReplCommand::Presets(None)),
        "/presets" => Ok(ReplCommand::Presets(Some(parse_category(rest)?))),
        "/edit" => {
            const USAGE: &str = "/edit <x> <y> <prompt>";
            let (x, rest) = split_word(rest);
            let (y, prompt) = split_word(rest);
            let x = x.parse::<u32>().map_err(|_| format!("Usage: {USAGE}"))?;
            let y = y.parse::<u32>().map_err(|_| format!("Usage: {USAGE}"))?;
            let prompt = require(prompt, USAGE)?.to_string();
            Ok(ReplCommand::Edit {
                hotspot: Hotspot::new(x, y),
                prompt,
            })
        }
        "/select" => {
            let position = require(rest, "/select <n>")?
                .parse::<usize>()
                .map_err(|_| "Usage: /select <n>".to_string())?;
            // History is shown 1-based.
            match position.checked_sub(1) {
                Some(index) => Ok(ReplCommand::Select(index)),
                None => Err("Versions are numbered from 1".to_string()),
            }
        }
        "/undo" => Ok(ReplCommand::Undo),
        "/redo" => Ok(ReplCommand::Redo),
        "/reset" => Ok(ReplCommand::Reset),
        "/new" => Ok(ReplCommand::New),
        "/history" => Ok(ReplCommand::History),
        "/save" if rest.is_empty() => Ok(ReplCommand::Save(None)),
        "/save" => Ok(ReplCommand::Save(Some(PathBuf::from(rest)))),
        "/theme" if rest.is_empty() => Ok(ReplCommand::Theme(None)),
        "/theme" => Ok(ReplCommand::Theme(Some(parse_theme(rest)?))),
        "/status" => Ok(ReplCommand::Status),
        "/dismiss" => Ok(ReplCommand::Dismiss),
        "/help" => Ok(ReplCommand::Help),
        "/quit" | "/exit" => Ok(ReplCommand::Quit),
        other => Err(format!("Unknown command '{other}'. Type /help for a list.")),
    }
}

/// Label shown for the version at `index` in the history list.
fn slot_label(index: usize) -> String {
    if index == 0 {
        "Original Loadout".to_string()
    } else {
        format!("Outfit Slot {}", index + 1)
    }
}

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
    categories: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(ToString::to_string).collect(),
            categories: Category::all().iter().map(ToString::to_string).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }

        // Second word of /apply, /preset and /presets is a category.
        if let Some((command, partial)) = line.split_once(' ')
            && matches!(command, "/apply" | "/preset" | "/presets")
            && !partial.contains(' ')
        {
            let candidates = self
                .categories
                .iter()
                .filter(|category| category.starts_with(partial))
                .map(|category| Pair {
                    display: category.clone(),
                    replacement: format!("{category} "),
                })
                .collect();
            return Ok((command.len() + 1, candidates));
        }

        let candidates: Vec<Pair> = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

fn print_help() {
    let lines = [
        ("/load <file>", "Load an image and isolate the character"),
        ("<text>", "Apply text with the active category"),
        ("/apply <category> <prompt>", "Apply text with a category"),
        ("/preset <category> <name>", "Apply a preset of the current theme"),
        ("/presets [category]", "List presets"),
        ("/edit <x> <y> <prompt>", "Edit around a pixel"),
        ("/history", "List versions"),
        ("/select <n>", "Jump to version n"),
        ("/undo, /redo", "Step through versions"),
        ("/reset", "Jump back to the original"),
        ("/save [dir]", "Save the current version"),
        ("/theme [name]", "Show or switch the theme"),
        ("/new", "Discard every version"),
        ("/status, /dismiss", "Show state, clear the error"),
        ("/quit", "Exit"),
    ];
    for (usage, description) in lines {
        println!("  {} {}", format!("{usage:<28}").bright_cyan(), description.bright_black());
    }
}

fn describe_background(background: &PageBackground) -> String {
    let PageBackground::Image(image) = background;
    format!("generated ({})", image.file_name())
}

async fn print_status(session: &EditSession) {
    let snapshot = session.snapshot().await;
    if snapshot.len == 0 {
        println!("{}", "No image loaded. Use /load <file>.".bright_black());
        return;
    }

    let current = session
        .current()
        .await
        .map(|version| version.file_name().to_string())
        .unwrap_or_default();
    let mut line = format!(
        "[{}/{}] {}  theme: {}  category: {}",
        snapshot.position + 1,
        snapshot.len,
        current,
        session.theme().await,
        session.active_category().await,
    );
    if snapshot.can_undo {
        line.push_str("  /undo");
    }
    if snapshot.can_redo {
        line.push_str("  /redo");
    }
    println!("{}", line.bright_black());

    if let Some(background) = session.page_background().await {
        println!("{}", format!("background: {}", describe_background(&background)).bright_black());
    }
    if let Some(error) = snapshot.error {
        println!("{} {}", "error:".red().bold(), error);
    }
}

fn print_history(versions: &[Version], cursor: isize) {
    if versions.is_empty() {
        println!("{}", "History is empty.".bright_black());
        return;
    }
    for (index, version) in versions.iter().enumerate() {
        let marker = if index as isize == cursor { ">" } else { " " };
        let label = format!("{marker} {}. {:<18}", index + 1, slot_label(index));
        let details = format!(
            "{}  {}",
            version.file_name(),
            version.created_at.format("%H:%M:%S")
        );
        if index as isize == cursor {
            println!("{} {}", label.bright_green().bold(), details);
        } else {
            println!("{} {}", label, details.bright_black());
        }
    }
}

async fn report(session: &EditSession, result: Result<Version, EditFailure>) {
    match result {
        Ok(version) => {
            println!("{} {}", "Added".green().bold(), version.file_name());
            print_status(session).await;
        }
        Err(failure) => {
            let message = session
                .last_error()
                .await
                .unwrap_or_else(|| failure.to_string());
            println!("{} {}", "error:".red().bold(), message);
        }
    }
}

async fn load(session: &EditSession, path: &Path) {
    let upload = match load_image(path).await {
        Ok(upload) => upload,
        Err(e) => {
            println!("{} {}", "error:".red().bold(), e);
            return;
        }
    };

    println!("{}", "Isolating character...".bright_black());
    match session.load_image(upload).await {
        Ok(outcome) if outcome.is_fallback() => {
            println!("{}", "Background removal failed, using the original upload.".yellow());
            print_status(session).await;
        }
        Ok(outcome) => {
            println!("{} {}", "Loaded".green().bold(), outcome.version().file_name());
            print_status(session).await;
        }
        Err(failure) => println!("{} {}", "error:".red().bold(), failure),
    }
}

/// Runs one command. Returns `false` when the REPL should exit.
async fn dispatch(session: &EditSession, command: ReplCommand) -> bool {
    match command {
        ReplCommand::Load(path) => load(session, &path).await,
        ReplCommand::Prompt(prompt) => {
            let category = session.active_category().await;
            report(session, session.apply(category, &prompt).await).await;
        }
        ReplCommand::Apply { category, prompt } => {
            report(session, session.apply(category, &prompt).await).await;
        }
        ReplCommand::Preset { category, name } => {
            report(session, session.apply_preset(category, &name).await).await;
        }
        ReplCommand::Presets(category) => {
            let theme = session.theme().await;
            let categories = category.map(|c| vec![c]).unwrap_or_else(Category::all);
            for category in categories {
                print_category(theme, category);
            }
        }
        ReplCommand::Edit { hotspot, prompt } => {
            report(session, session.apply_localized_edit(hotspot, &prompt).await).await;
        }
        ReplCommand::Select(index) => match session.select_index(index).await {
            Ok(()) => print_status(session).await,
            Err(e) => println!("{} {}", "error:".red().bold(), e),
        },
        ReplCommand::Undo => {
            if session.undo().await {
                print_status(session).await;
            } else {
                println!("{}", "Nothing to undo.".bright_black());
            }
        }
        ReplCommand::Redo => {
            if session.redo().await {
                print_status(session).await;
            } else {
                println!("{}", "Nothing to redo.".bright_black());
            }
        }
        ReplCommand::Reset => match session.reset().await {
            Ok(()) => print_status(session).await,
            Err(failure) => println!("{} {}", "error:".red().bold(), failure),
        },
        ReplCommand::New => match session.start_new_session().await {
            Ok(()) => println!("{}", "Session cleared. Use /load <file> to start over.".bright_black()),
            Err(failure) => println!("{} {}", "error:".red().bold(), failure),
        },
        ReplCommand::History => {
            let snapshot = session.snapshot().await;
            print_history(&session.versions().await, snapshot.position);
        }
        ReplCommand::Save(dir) => {
            let dir = dir.unwrap_or_else(|| PathBuf::from("."));
            match session.download().await {
                Some(artifact) => match save_image(&dir, artifact.file_name(), &artifact).await {
                    Ok(path) => println!("{} {}", "Saved".green().bold(), path.display()),
                    Err(e) => println!("{} {}", "error:".red().bold(), e),
                },
                None => println!("{}", "Nothing to save.".bright_black()),
            }
        }
        ReplCommand::Theme(None) => println!("Theme: {}", session.theme().await),
        ReplCommand::Theme(Some(theme)) => {
            session.set_theme(theme).await;
            println!("{} {}", "Theme:".bright_magenta(), theme);
        }
        ReplCommand::Status => print_status(session).await,
        ReplCommand::Dismiss => session.dismiss_error().await,
        ReplCommand::Help => print_help(),
        ReplCommand::Quit => return false,
    }
    true
}

pub async fn run(paths: &WardrobePaths, config: &WardrobeConfig, input: Option<PathBuf>) -> Result<()> {
    let session = Arc::new(build_session(paths, config).await?);

    let mut events = session.subscribe();
    let event_logger = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SessionEvent::ErrorChanged { message: Some(message) } => {
                    tracing::debug!("[Repl] Error recorded: {}", message)
                }
                other => tracing::trace!("[Repl] {:?}", other),
            }
        }
    });

    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Wardrobe ===".bright_magenta().bold());
    println!(
        "{}",
        "Type /load <file> to start, /help for commands, /quit to exit.".bright_black()
    );
    println!();

    if let Some(path) = input {
        load(&session, &path).await;
    }

    loop {
        match rl.readline("wardrobe> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match parse_command(trimmed) {
                    Ok(command) => {
                        if !dispatch(&session, command).await {
                            println!("{}", "Goodbye!".bright_green());
                            break;
                        }
                    }
                    Err(message) => println!("{}", message.yellow()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    event_logger.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_prompt() {
        assert_eq!(
            parse_command("  neon visor ").unwrap(),
            ReplCommand::Prompt("neon visor".to_string())
        );
    }

    #[test]
    fn test_apply_parses_category_and_prompt() {
        assert_eq!(
            parse_command("/apply Clothing long black trench coat").unwrap(),
            ReplCommand::Apply {
                category: Category::Clothing,
                prompt: "long black trench coat".to_string(),
            }
        );
        assert!(parse_command("/apply clothing").is_err());
        assert!(parse_command("/apply shoes red").unwrap_err().contains("Unknown category"));
    }

    #[test]
    fn test_preset_keeps_multiword_name() {
        assert_eq!(
            parse_command("/preset environment Neon Alley").unwrap(),
            ReplCommand::Preset {
                category: Category::Environment,
                name: "Neon Alley".to_string(),
            }
        );
    }

    #[test]
    fn test_edit_parses_hotspot() {
        assert_eq!(
            parse_command("/edit 120 45 remove the scar").unwrap(),
            ReplCommand::Edit {
                hotspot: Hotspot::new(120, 45),
                prompt: "remove the scar".to_string(),
            }
        );
        assert!(parse_command("/edit 120 scar").is_err());
        assert!(parse_command("/edit 1 2").is_err());
    }

    #[test]
    fn test_select_is_one_based() {
        assert_eq!(parse_command("/select 1").unwrap(), ReplCommand::Select(0));
        assert_eq!(parse_command("/select 3").unwrap(), ReplCommand::Select(2));
        assert!(parse_command("/select 0").is_err());
        assert!(parse_command("/select x").is_err());
    }

    #[test]
    fn test_optional_arguments() {
        assert_eq!(parse_command("/save").unwrap(), ReplCommand::Save(None));
        assert_eq!(
            parse_command("/save out/looks").unwrap(),
            ReplCommand::Save(Some(PathBuf::from("out/looks")))
        );
        assert_eq!(parse_command("/theme").unwrap(), ReplCommand::Theme(None));
        assert_eq!(
            parse_command("/theme FANTASY").unwrap(),
            ReplCommand::Theme(Some(Theme::Fantasy))
        );
        assert_eq!(parse_command("/presets").unwrap(), ReplCommand::Presets(None));
    }

    #[test]
    fn test_unknown_command() {
        assert!(parse_command("/dance").unwrap_err().starts_with("Unknown command"));
        assert_eq!(parse_command("/exit").unwrap(), ReplCommand::Quit);
    }

    #[test]
    fn test_slot_labels() {
        assert_eq!(slot_label(0), "Original Loadout");
        assert_eq!(slot_label(1), "Outfit Slot 2");
        assert_eq!(slot_label(4), "Outfit Slot 5");
    }

    #[test]
    fn test_every_listed_command_parses() {
        for command in COMMANDS {
            let line = match *command {
                "/load" => "/load a.png",
                "/apply" => "/apply effects glitch",
                "/preset" => "/preset actions Jump",
                "/edit" => "/edit 1 2 fix",
                "/select" => "/select 1",
                other => other,
            };
            assert!(parse_command(line).is_ok(), "{line} failed to parse");
        }
    }
}
