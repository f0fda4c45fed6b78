//! CLI entry point for parley

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use parley_agent::generate::DEFAULT_POST_WORDS;
use parley_agent::{
    Asker, ChatSession, PostGenerator, PostRequest, Selector, SessionOptions, Tone, DEFAULT_MODE,
};
use parley_core::bus::{EventReceiver, SessionEvent};
use parley_core::config::{Config, ConfigLoader, LoggingConfig};
use parley_core::logging::init_logging;
use parley_providers::{CompletionProvider, CortexClient, SummarizationProvider, Summarizer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Chat with hosted language models from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat
    Chat {
        /// Model label or id
        #[arg(short, long)]
        model: Option<String>,
        /// Conversation mode
        #[arg(long)]
        mode: Option<String>,
    },
    /// Send a single prompt
    Ask {
        /// Prompt text
        #[arg(short, long)]
        prompt: String,
        /// Model label or id
        #[arg(short, long)]
        model: Option<String>,
        /// Also summarize the response
        #[arg(short, long)]
        summarize: bool,
    },
    /// Draft a LinkedIn post from a URL or text
    Post {
        /// Content URL or text
        #[arg(long)]
        content: String,
        /// Professional, Casual or Funny
        #[arg(short, long, default_value_t = Tone::Professional)]
        tone: Tone,
        /// Approximate word count (50-300)
        #[arg(short, long, default_value_t = DEFAULT_POST_WORDS)]
        words: u32,
    },
    /// List available models
    Models,
    /// List conversation modes
    Modes,
    /// Show the effective configuration
    Config {
        /// Write a default configuration file
        #[arg(long)]
        init: bool,
        /// Overwrite an existing file without asking
        #[arg(long, requires = "init")]
        force: bool,
    },
}

/// A line typed at the chat prompt
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Message(String),
    Clear,
    Model(Option<String>),
    Mode(Option<String>),
    Stats,
    Summary,
    Help,
    Quit,
    Unknown(String),
}

fn parse_repl_line(line: &str) -> ReplCommand {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return ReplCommand::Message(line.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim().to_string()).filter(|a| !a.is_empty())),
        None => (command, None),
    };

    match name {
        "clear" => ReplCommand::Clear,
        "model" => ReplCommand::Model(arg),
        "mode" => ReplCommand::Mode(arg),
        "stats" => ReplCommand::Stats,
        "summary" => ReplCommand::Summary,
        "help" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => ReplCommand::Unknown(other.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = if let Some(dir) = cli.config_dir {
        ConfigLoader::with_dir(dir)
    } else {
        ConfigLoader::new()
    };

    if let Commands::Config { init: true, force } = cli.command {
        return run_config_init(&loader, force);
    }

    let config = loader.load()?;
    let _log_guard = init_logging(&logging_in(&config.logging, loader.config_dir()));

    match cli.command {
        Commands::Chat { model, mode } => {
            info!("Starting chat");
            run_chat(&config, model, mode).await?;
        }
        Commands::Ask {
            prompt,
            model,
            summarize,
        } => {
            run_ask(&config, &prompt, model, summarize).await?;
        }
        Commands::Post {
            content,
            tone,
            words,
        } => {
            run_post(&config, PostRequest::new(tone, words, content)).await?;
        }
        Commands::Models => run_models(&config),
        Commands::Modes => run_modes(&config),
        Commands::Config { .. } => run_config_show(&loader, &config)?,
    }

    Ok(())
}

/// Relative log directories live under the config directory
fn logging_in(logging: &LoggingConfig, config_dir: &Path) -> LoggingConfig {
    let mut logging = logging.clone();
    if Path::new(&logging.dir).is_relative() {
        logging.dir = config_dir.join(&logging.dir).to_string_lossy().into_owned();
    }
    logging
}

type Clients = (Arc<dyn CompletionProvider>, Arc<dyn SummarizationProvider>);

fn build_clients(config: &Config, selector: &Selector) -> Result<Clients> {
    selector.registry().ensure_supported(&config.summary.model)?;
    let default_model = selector.model_id_for(&config.chat.model).to_string();
    let client = CortexClient::from_config(&config.service, default_model)?;
    info!("Completion endpoint: {}", client.endpoint());

    let completer: Arc<dyn CompletionProvider> = Arc::new(client);
    let summarizer: Arc<dyn SummarizationProvider> =
        Arc::new(Summarizer::from_config(completer.clone(), &config.summary));
    Ok((completer, summarizer))
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    Ok(bar)
}

async fn run_chat(config: &Config, model: Option<String>, mode: Option<String>) -> Result<()> {
    let selector = Selector::from_config(config);
    let (completer, summarizer) = build_clients(config, &selector)?;

    let mut options = SessionOptions::from_config(config);
    if let Some(model) = model {
        options.model = model;
    }
    if let Some(mode) = mode {
        options.mode = mode;
    }

    let mut session = ChatSession::new(completer, summarizer, selector, options);
    let mut events = session.events().take_receiver();

    println!("{}", style("parley chat").bold().cyan());
    println!(
        "Model: {}  Mode: {}  (type /help for commands)\n",
        style(&session.config().model).green(),
        style(&session.config().mode).green()
    );
    for turn in session.log().turns() {
        println!("{} {}\n", style("Assistant:").bold().magenta(), turn.content());
    }

    loop {
        let line: String = Input::new().with_prompt("You").interact_text()?;

        match parse_repl_line(&line) {
            ReplCommand::Message(text) => {
                let bar = spinner("Thinking...")?;
                let result = session.submit(&text).await;
                bar.finish_and_clear();

                match result {
                    Ok(exchange) => {
                        println!("\n{} {}\n", style("Assistant:").bold().magenta(), exchange.reply);
                    }
                    Err(e) => {
                        error!("Chat request failed: {}", e);
                        println!("{} {}\n", style("Error:").bold().red(), e);
                    }
                }
            }
            ReplCommand::Clear => {
                session.clear();
                println!("{}\n", style("Conversation cleared.").dim());
            }
            ReplCommand::Model(label) => {
                let label = match label {
                    Some(label) => label,
                    None => pick_model(session.selector())?,
                };
                if !session.set_model(&label) {
                    println!("Model unchanged: {}\n", session.config().model);
                }
            }
            ReplCommand::Mode(mode) => {
                let mode = match mode {
                    Some(mode) => mode,
                    None => pick_mode(session.selector())?,
                };
                let mode = session.set_mode(&mode).to_string();
                println!("Mode: {}\n", style(mode).green());
            }
            ReplCommand::Stats => {
                let stats = session.stats();
                println!("{}", style("Conversation stats").bold());
                println!("  Your messages: {}", stats.user_messages);
                println!("  AI responses: {}", stats.assistant_messages);
                println!(
                    "  Cached responses: {} ({} hits, {} misses)\n",
                    stats.cached_responses, stats.cache_hits, stats.cache_misses
                );
            }
            ReplCommand::Summary => {
                let bar = spinner("Summarizing...")?;
                let result = session.summarize_now().await;
                bar.finish_and_clear();
                match result {
                    Ok(summary) => print_summary(&summary),
                    Err(e) => println!("{} {}\n", style("Error:").bold().red(), e),
                }
            }
            ReplCommand::Help => print_help(),
            ReplCommand::Quit => break,
            ReplCommand::Unknown(name) => {
                println!("Unknown command /{} (type /help)\n", name);
            }
        }

        if let Some(rx) = events.as_mut() {
            drain_events(rx);
        }
    }

    Ok(())
}

/// Render the session notifications the transcript does not already show
fn drain_events(rx: &mut EventReceiver) {
    while let Ok(event) = rx.try_recv() {
        match event {
            SessionEvent::SummaryReady { summary, .. } => print_summary(&summary),
            SessionEvent::SummaryFailed { error, .. } => {
                println!("{} {}\n", style("Summary unavailable:").yellow(), error);
            }
            SessionEvent::CacheInvalidated { model, entries, .. } => {
                println!(
                    "Model: {} ({} cached responses cleared)\n",
                    style(model).green(),
                    entries
                );
            }
            _ => {}
        }
    }
}

fn print_summary(summary: &str) {
    println!("{}", style("Conversation summary (TL;DR)").bold().cyan());
    println!("{}\n", summary);
}

fn print_help() {
    println!("{}", style("Commands").bold());
    println!("  /clear           start over");
    println!("  /model [label]   switch model");
    println!("  /mode [name]     switch conversation mode");
    println!("  /stats           message counts");
    println!("  /summary         summarize recent turns");
    println!("  /quit            leave\n");
}

fn pick_model(selector: &Selector) -> Result<String> {
    let labels: Vec<String> = selector.models().iter().map(|m| m.label()).collect();
    let index = Select::new()
        .with_prompt("Select a model")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(labels[index].clone())
}

fn pick_mode(selector: &Selector) -> Result<String> {
    let modes = selector.modes();
    let index = Select::new()
        .with_prompt("Select a mode")
        .items(modes)
        .default(0)
        .interact()?;
    Ok(modes[index].clone())
}

async fn run_ask(
    config: &Config,
    prompt: &str,
    model: Option<String>,
    summarize: bool,
) -> Result<()> {
    let selector = Selector::from_config(config);
    let (completer, summarizer) = build_clients(config, &selector)?;
    let model = model.unwrap_or_else(|| config.chat.model.clone());
    let mut asker = Asker::new(completer, summarizer, selector);

    let bar = spinner("Thinking...")?;
    let result = asker.ask(prompt, &model, summarize).await;
    bar.finish_and_clear();

    let answer = result?;
    println!("{} {}", style("Model:").bold(), answer.model);
    println!("\n{}", answer.response);
    if let Some(summary) = answer.summary {
        println!("\n{}", style("Summary").bold().cyan());
        println!("{}", summary);
    }
    Ok(())
}

async fn run_post(config: &Config, request: PostRequest) -> Result<()> {
    let selector = Selector::from_config(config);
    let (completer, summarizer) = build_clients(config, &selector)?;
    let mut generator = PostGenerator::new(completer, summarizer);

    let bar = spinner("Generating post...")?;
    let post = generator.generate(&request).await;
    bar.finish_and_clear();

    println!("{}", style("Generated post").bold().cyan());
    println!("{}\n", post?);

    let bar = spinner("Summarizing content...")?;
    let summary = generator.summarize_content(&request.content).await;
    bar.finish_and_clear();

    println!("{}", style("Content summary").bold().cyan());
    println!("{}", summary?);
    Ok(())
}

fn run_models(config: &Config) {
    let selector = Selector::from_config(config);
    let current = selector.model_id_for(&config.chat.model);
    println!("{}", style("Models").bold().cyan());
    for model in selector.models() {
        let marker = if model.id == current { "*" } else { " " };
        println!(" {} {}", marker, model.label());
    }
}

fn run_modes(config: &Config) {
    let selector = Selector::from_config(config);
    let current = selector.resolve_mode(&config.chat.mode);
    println!("{}", style("Modes").bold().cyan());
    for mode in selector.modes() {
        let marker = if mode == current { "*" } else { " " };
        let note = if mode == DEFAULT_MODE { " (fallback)" } else { "" };
        println!(" {} {}{}", marker, mode, note);
    }
}

fn run_config_init(loader: &ConfigLoader, force: bool) -> Result<()> {
    let path = loader.config_path();
    if path.exists() && !force {
        let overwrite = Confirm::new()
            .with_prompt("Configuration already exists. Overwrite?")
            .default(false)
            .interact()?;
        if !overwrite {
            println!("Keeping {}", path.display());
            return Ok(());
        }
    }

    loader.save(&Config::default())?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn run_config_show(loader: &ConfigLoader, config: &Config) -> Result<()> {
    let mut shown = config.clone();
    if !shown.service.api_key.is_empty() {
        shown.service.api_key = "********".to_string();
    }
    println!("# {}", loader.config_path().display());
    println!("{}", serde_json::to_string_pretty(&shown)?);
    Ok(())
}
