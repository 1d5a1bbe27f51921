use anyhow::{bail, Context, Result};
use chatterbox::config::{default_config_path, Config, Mode};
use chatterbox::llm::Client;
use chatterbox::persona::{self, Catalog};
use chatterbox::resolver::{LocalResolver, RemoteResolver, ReplySource, ResolvedReply, Resolver};
use chatterbox::Session;
use clap::{Parser, Subcommand, ValueEnum};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Chat with canned-response personalities", long_about = None)]
struct Cli {
    /// Config file (TOML). Defaults to ~/.chatterbox/config.toml if present.
    #[arg(long, global = true, env = "CHATTERBOX_CONFIG")]
    config: Option<PathBuf>,

    /// Personality catalog (.json, .yaml or .toml)
    #[arg(long, global = true, env = "CHATTERBOX_CATALOG")]
    catalog: Option<PathBuf>,

    /// Personality to start with
    #[arg(short, long, global = true, env = "CHATTERBOX_PERSONALITY")]
    personality: Option<String>,

    /// Fallback strategy when no canned response applies
    #[arg(long, global = true, value_enum, env = "CHATTERBOX_MODE")]
    mode: Option<ModeArg>,

    /// Model name for remote mode
    #[arg(long, global = true, env = "CHATTERBOX_MODEL")]
    model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, global = true, env = "CHATTERBOX_BASE_URL")]
    base_url: Option<String>,

    /// Completion request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat (default)
    Chat,
    /// Run a single turn and print the reply
    Ask {
        /// Message to send
        text: Vec<String>,
    },
    /// List available personalities
    Personalities,
    /// Load and validate a catalog file
    CheckCatalog { path: PathBuf },
    /// Print the active catalog as JSON
    DumpCatalog,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Local,
    Remote,
}

impl From<ModeArg> for Mode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Local => Mode::Local,
            ModeArg::Remote => Mode::Remote,
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present (for the API key)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => {
            let mut session = build_session(&config)?;
            run_repl(&mut session)
        }
        Command::Ask { text } => {
            let text = text.join(" ");
            if text.trim().is_empty() {
                bail!("Nothing to ask");
            }
            let mut session = build_session(&config)?;
            if let Some(reply) = session.submit(&text) {
                println!("{}", reply.text);
            }
            Ok(())
        }
        Command::Personalities => {
            let catalog = load_catalog(&config)?;
            for p in catalog.personalities.values() {
                println!("{:<16} {}", p.id, p.name);
            }
            Ok(())
        }
        Command::CheckCatalog { path } => check_catalog(&path),
        Command::DumpCatalog => {
            let catalog = load_catalog(&config)?;
            println!("{}", catalog.to_json_pretty()?);
            Ok(())
        }
    }
}

/// Merge config file values with command-line overrides
fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::discover(cli.config.as_deref())?;
    if let Some(catalog) = &cli.catalog {
        config.catalog = Some(catalog.clone());
    }
    if let Some(personality) = &cli.personality {
        config.personality = personality.clone();
    }
    if let Some(mode) = cli.mode {
        config.mode = mode.into();
    }
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.llm.base_url = base_url.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.llm.timeout_secs = timeout;
    }
    Ok(config)
}

fn load_catalog(config: &Config) -> Result<Catalog> {
    match &config.catalog {
        Some(path) => persona::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display())),
        None => Ok(Catalog::builtin()),
    }
}

fn build_session(config: &Config) -> Result<Session> {
    let catalog = Arc::new(load_catalog(config)?);

    let resolver: Resolver = match config.mode {
        Mode::Local => LocalResolver::system().into(),
        Mode::Remote => {
            let api_key = config.llm.api_key();
            if api_key.is_none() {
                warn!(
                    env = %config.llm.api_key_env,
                    "No API key set; uncovered messages will report an error"
                );
            }
            let client = Client::new(&config.llm, api_key)
                .context("Failed to create HTTP client")?;
            RemoteResolver::with_client(Arc::new(client)).into()
        }
    };

    info!(
        mode = config.mode.as_str(),
        personality = %config.personality,
        "Starting session"
    );
    Session::new(catalog, &config.personality, resolver).map_err(Into::into)
}

fn check_catalog(path: &Path) -> Result<()> {
    let catalog =
        persona::load(path).with_context(|| format!("Failed to load catalog {}", path.display()))?;
    println!(
        "{}: {} personalities, {} pattern rules",
        path.display(),
        catalog.personalities.len(),
        catalog.patterns.len()
    );
    for p in catalog.personalities.values() {
        let missing = catalog.uncovered_tags(p);
        if !missing.is_empty() {
            println!("  {} has no responses for: {}", p.id, missing.join(", "));
        }
    }
    Ok(())
}

fn history_path() -> Option<PathBuf> {
    default_config_path().and_then(|p| p.parent().map(|d| d.join("history")))
}

fn print_greeting(session: &Session) {
    println!("{}> {}", session.personality().name, session.greeting());
}

fn print_help() {
    println!("Commands:");
    println!("  /personality <id>   switch personality (clears the conversation)");
    println!("  /personalities      list personalities");
    println!("  /clear              clear the conversation");
    println!("  /history            show the conversation so far");
    println!("  /why                explain how the last reply was chosen");
    println!("  /help               show this help");
    println!("  /quit               exit");
}

fn describe_reply(reply: &ResolvedReply) -> String {
    let matched = match &reply.tag {
        Some(tag) => format!("matched '{}'", tag),
        None => "no pattern matched".to_string(),
    };
    let how = match reply.source {
        ReplySource::Canned => "canned response",
        ReplySource::Contextual => "keyword fallback",
        ReplySource::Remote => "AI service",
        ReplySource::RemoteError => "AI service failed",
    };
    format!("{}; {}", matched, how)
}

/// Returns false when the REPL should exit
fn handle_command(session: &mut Session, input: &str) -> bool {
    let mut parts = input.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).unwrap_or_default();

    match cmd {
        "/quit" | "/exit" => return false,
        "/help" => print_help(),
        "/clear" => {
            session.clear();
            print_greeting(session);
        }
        "/personalities" => {
            for p in session.catalog().personalities.values() {
                let marker = if p.id == session.personality_id() { "*" } else { " " };
                println!("{} {:<16} {}", marker, p.id, p.name);
            }
        }
        "/personality" if arg.is_empty() => {
            println!("Current personality: {}", session.personality().name);
        }
        "/personality" => match session.select_personality(arg) {
            Ok(true) => print_greeting(session),
            Ok(false) => println!("Already talking to {}", session.personality().name),
            Err(e) => println!("{}", e),
        },
        "/why" => match session.last_reply() {
            Some(reply) => println!("{}", describe_reply(reply)),
            None => println!("(no replies yet)"),
        },
        "/history" => {
            if session.is_idle() {
                println!("(no messages yet)");
            }
            for msg in session.transcript().iter() {
                println!("[{}] {}", msg.role, msg.content);
            }
        }
        other => println!("Unknown command: {} (try /help)", other),
    }
    true
}

fn run_repl(session: &mut Session) -> Result<()> {
    let mut editor = DefaultEditor::new().context("Failed to create line editor")?;
    let history = history_path();
    if let Some(path) = &history {
        let _ = editor.load_history(path);
    }

    println!(
        "chatterbox ({} mode). Type /help for commands.",
        session.resolver_name()
    );
    print_greeting(session);

    loop {
        let line = match editor.readline("you> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(input);

        if input.starts_with('/') {
            if !handle_command(session, input) {
                break;
            }
            continue;
        }

        if let Some(reply) = session.submit(input) {
            println!("{}> {}", session.personality().name, reply.text);
        }
    }

    if let Some(path) = &history {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        let _ = editor.save_history(path);
    }
    Ok(())
}
