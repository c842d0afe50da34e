use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing_subscriber::EnvFilter;

use ksearch_application::{SearchTicket, SearchUseCase};
use ksearch_core::citation::{CitationInteraction, CitationResolver, Gesture, InteractionMode};
use ksearch_core::search::SearchResult;
use ksearch_interaction::{
    ClientConfig, HttpSearchBackend, SseProgressStream, load_client_config_from,
};

mod command;
mod render;

use command::{COMMANDS, Command};
use render::{ProgressRenderer, marker_anchor, render_preview, render_sources, render_text};

#[derive(Parser)]
#[command(name = "ksearch")]
#[command(about = "Ask a knowledge search service and follow its progress live", long_about = None)]
struct Cli {
    /// Base URL of the search service (overrides config and KSEARCH_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Citation preview style: click or hover
    #[arg(long)]
    citation_mode: Option<InteractionMode>,

    /// Log filter, e.g. "debug" or "ksearch_application=trace" (default: warn)
    #[arg(long)]
    log_level: Option<String>,

    /// Configuration file (default: ~/.config/ksearch/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|cmd| cmd.to_string()).collect(),
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

        if line.starts_with('/') {
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
        } else {
            Ok((0, vec![]))
        }
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

/// Installs the stderr log subscriber. `--log-level` wins over `RUST_LOG`.
fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = load_client_config_from(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config
        }
        None => ClientConfig::load()?,
    };
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.clone());
    }
    if let Some(mode) = cli.citation_mode {
        config.citation_mode = mode;
    }
    config.validate()?;
    Ok(config)
}

/// REPL state shared between the input loop and background search tasks.
struct Repl {
    usecase: Arc<SearchUseCase>,
    latest: Arc<Mutex<Option<SearchResult>>>,
    interaction: Box<dyn CitationInteraction>,
    word_limit: usize,
}

impl Repl {
    fn latest(&self) -> Option<SearchResult> {
        self.latest.lock().ok().and_then(|latest| latest.clone())
    }

    async fn handle(&mut self, command: Command) {
        let latest = self.latest();

        // A hover preview lives only until the next input
        if self.interaction.mode() == InteractionMode::Hover {
            if let Some(result) = &latest {
                let resolver = self.resolver(result);
                self.interaction.handle(Gesture::PointerLeave, &resolver);
            }
        }

        match command {
            Command::Search(query) => self.submit(query).await,
            Command::Cite(source_id) => {
                let Some(result) = latest else {
                    println!("{}", "No answer yet.".bright_black());
                    return;
                };
                let resolver = self.resolver(&result);
                let gesture = match self.interaction.mode() {
                    InteractionMode::Hover => Gesture::PointerEnter {
                        source_id,
                        anchor: marker_anchor(&result, source_id),
                    },
                    InteractionMode::Click => Gesture::Click { source_id },
                };
                if resolver.source(source_id).is_none() {
                    println!("{}", format!("No source [{source_id}]").yellow());
                } else if self.interaction.handle(gesture, &resolver) {
                    self.print_preview();
                }
            }
            Command::Close => {
                if let Some(result) = &latest {
                    let resolver = self.resolver(result);
                    if self.interaction.handle(Gesture::Close, &resolver) {
                        println!("{}", "Preview closed".bright_black());
                    }
                }
            }
            Command::Details => match latest {
                Some(result) if !result.reasoning_text.is_empty() => {
                    let resolver = self.resolver(&result);
                    println!("{}", "Reasoning".bright_magenta().bold());
                    println!("{}", render_text(&result.reasoning_text, &resolver));
                }
                Some(_) => println!("{}", "No reasoning for this answer.".bright_black()),
                None => println!("{}", "No answer yet.".bright_black()),
            },
            Command::Sources => match latest {
                Some(result) => {
                    for line in render_sources(&result.sources) {
                        println!("{}", line.blue());
                    }
                }
                None => println!("{}", "No answer yet.".bright_black()),
            },
            Command::Feedback { score, comment } => {
                let Some(result) = latest else {
                    println!("{}", "No answer to rate yet.".bright_black());
                    return;
                };
                match self.usecase.submit_feedback(&result, score, comment).await {
                    Ok(()) => println!("{}", "Thanks for your feedback!".bright_green()),
                    Err(message) => eprintln!("{}", message.red()),
                }
            }
            Command::Cancel => {
                self.usecase.cancel_active().await;
            }
            Command::Help => print_help(),
            Command::Quit => {}
        }
    }

    async fn submit(&mut self, query: String) {
        let ticket = match self.usecase.begin(&query).await {
            Ok(ticket) => ticket,
            Err(err) => {
                eprintln!("{}", err.user_message().red());
                return;
            }
        };
        self.interaction.clear();

        tokio::spawn(follow_progress(ticket.clone()));

        let usecase = Arc::clone(&self.usecase);
        let latest = Arc::clone(&self.latest);
        let word_limit = self.word_limit;
        tokio::spawn(async move {
            let outcome = usecase.run(&ticket).await;
            if !usecase.is_current(&ticket.session_id).await {
                return;
            }
            match outcome {
                Ok(result) => {
                    print_answer(&result, word_limit);
                    if let Ok(mut latest) = latest.lock() {
                        *latest = Some(result);
                    }
                }
                Err(message) => eprintln!("{}", message.red()),
            }
        });
    }

    fn resolver<'r>(&self, result: &'r SearchResult) -> CitationResolver<'r> {
        CitationResolver::new(&result.sources).with_word_limit(self.word_limit)
    }

    fn print_preview(&self) {
        match self.interaction.active() {
            Some(active) => {
                for line in render_preview(active) {
                    println!("{}", line.bright_white());
                }
            }
            None => println!("{}", "Preview closed".bright_black()),
        }
    }
}

/// Prints each new part of the session's progress until it ends.
async fn follow_progress(ticket: SearchTicket) {
    let mut progress = ticket.progress;
    let mut renderer = ProgressRenderer::default();
    loop {
        let snapshot = progress.borrow_and_update().clone();
        for line in renderer.update(&snapshot) {
            println!("{}", line.paint());
        }
        if snapshot.state.is_terminal() || progress.changed().await.is_err() {
            break;
        }
    }
}

fn print_answer(result: &SearchResult, word_limit: usize) {
    let resolver = CitationResolver::new(&result.sources).with_word_limit(word_limit);
    println!();
    println!("{}", "Answer".bright_magenta().bold());
    println!("{}", render_text(&result.answer_text, &resolver));
    println!();
    for line in render_sources(&result.sources) {
        println!("{}", line.blue());
    }
    println!(
        "{}",
        "Use /cite <id> for a source, /details for reasoning, /feedback yes|no to rate."
            .bright_black()
    );
}

fn print_help() {
    println!("{}", "Type a question to search. Commands:".bright_black());
    for (cmd, help) in [
        ("/cite <id>", "show the preview of a source"),
        ("/close", "close the open preview"),
        ("/details", "show the reasoning behind the answer"),
        ("/sources", "list the sources of the answer"),
        ("/feedback yes|no [comment]", "rate the answer"),
        ("/cancel", "cancel the running search"),
        ("quit", "exit"),
    ] {
        println!("  {} {}", cmd.bright_cyan(), help.bright_black());
    }
}

/// The main entry point for the ksearch readline REPL application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;
    let config = load_config(&cli)?;
    tracing::info!(base_url = %config.base_url, mode = %config.citation_mode, "Starting ksearch");

    // ===== Backend Initialization =====
    let backend = Arc::new(HttpSearchBackend::new(config.clone()));
    let stream = Arc::new(SseProgressStream::new(config.clone()));
    let mut repl = Repl {
        usecase: Arc::new(SearchUseCase::new(backend, stream)),
        latest: Arc::new(Mutex::new(None)),
        interaction: config.citation_mode.strategy(),
        word_limit: config.excerpt_word_limit,
    };

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== ksearch ===".bright_magenta().bold());
    println!(
        "{}",
        format!(
            "Connected to {} ({} previews). Type a question, '/help', or 'quit'.",
            config.base_url, config.citation_mode
        )
        .bright_black()
    );
    println!();

    // ===== Main REPL Loop =====
    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match Command::parse(trimmed) {
                    Ok(Command::Quit) => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Ok(command) => repl.handle(command).await,
                    Err(message) => println!("{}", message.yellow()),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    repl.usecase.cancel_active().await;
    Ok(())
}
