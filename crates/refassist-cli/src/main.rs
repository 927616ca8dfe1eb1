use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use refassist_application::{ChatController, ConversationDeps, SessionFactory, SessionRegistry};
use refassist_core::auth::{AuthProvider, StaticAuthProvider};
use refassist_core::event::{FollowUpOption, UiCommand, UiEvent};
use refassist_core::messenger::ChannelMessenger;
use refassist_infrastructure::{
    ConfigService, DirectoryWorkspace, FileArtifactStore, RefAssistPaths,
};
use refassist_remote::{HttpWorkflowClient, PollPolicy};

const COMMANDS: &[&str] = &["/help", "/download", "/stop", "/quit"];

#[derive(Parser)]
#[command(name = "refassist")]
#[command(about = "Chat with a remote refactoring-assessment service", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/refassist/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the configured service endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Workspace to assess
    #[arg(long, default_value = ".")]
    workspace: PathBuf,

    /// Conversation id, one per chat tab
    #[arg(long, default_value = "cli")]
    session: String,
}

/// Completion and highlighting for REPL commands.
#[derive(Clone)]
struct CliHelper;

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

        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
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
        if !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for CliHelper {}

/// Follow-up pills from the latest answer, selectable by number.
type FollowUps = Arc<Mutex<Vec<FollowUpOption>>>;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("refassist=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn build_controller(cli: &Cli, messenger: ChannelMessenger) -> Result<ChatController> {
    let config_service = match &cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new()?,
    };
    let mut config = config_service
        .load()
        .await
        .with_context(|| format!("loading {}", config_service.path().display()))?;
    if let Some(endpoint) = &cli.endpoint {
        config.remote.endpoint = endpoint.clone();
    }
    config.validate()?;

    let workspace = Arc::new(DirectoryWorkspace::new(&cli.workspace));
    let auth: Arc<dyn AuthProvider> = Arc::new(StaticAuthProvider::connected(
        config.remote.identity_token.clone(),
    ));
    let client =
        HttpWorkflowClient::new(&config.remote, workspace.clone())?.with_auth(auth.clone());

    let artifact_dir = match config.artifacts.directory.clone() {
        Some(directory) => directory,
        None => RefAssistPaths::artifact_dir()?,
    };

    tracing::info!(
        endpoint = %client.endpoint(),
        workspace = %cli.workspace.display(),
        artifacts = %artifact_dir.display(),
        "[refassist] Starting"
    );

    let deps = ConversationDeps {
        client: Arc::new(client),
        workspace,
        artifacts: Arc::new(FileArtifactStore::new(artifact_dir)),
        poll_policy: PollPolicy::from(&config.polling),
    };
    let registry = Arc::new(SessionRegistry::new(SessionFactory::new(
        deps,
        Arc::new(messenger),
    )));
    Ok(ChatController::new(registry, auth))
}

fn print_event(event: UiEvent, follow_ups: &FollowUps) {
    match event {
        UiEvent::Answer {
            message, follow_up, ..
        } => {
            for line in message.lines() {
                println!("{}", line.bright_blue());
            }
            let options = follow_up.map(|f| f.options).unwrap_or_default();
            for (index, option) in options.iter().enumerate() {
                println!("{}", format!("  [{}] {}", index + 1, option.pill_text).yellow());
            }
            println!();
            if let Ok(mut latest) = follow_ups.lock() {
                *latest = options;
            }
        }
        UiEvent::AnswerStream { message, .. } => {
            println!("{}", format!("... {}", message).bright_black());
        }
        UiEvent::PlaceholderUpdate { placeholder, .. } => {
            if !placeholder.is_empty() {
                println!("{}", format!("({})", placeholder).bright_black().italic());
            }
        }
        UiEvent::AuthNeeded { message, .. } => {
            println!("{}", message.bright_yellow());
        }
        UiEvent::InputEnabled { enabled, .. } => {
            tracing::debug!(enabled, "[refassist] Input enabled changed");
        }
    }
}

/// Turns a REPL line into a command, resolving `/N` against the latest follow-ups.
fn parse_line(line: &str, session_id: &str, follow_ups: &FollowUps) -> Option<UiCommand> {
    let session_id = session_id.to_string();
    match line {
        "/stop" => return Some(UiCommand::StopResponse { session_id }),
        "/quit" => return Some(UiCommand::TabClosed { session_id }),
        "/help" => return Some(UiCommand::Help { session_id }),
        _ => {}
    }

    if let Some(rest) = line.strip_prefix("/download")
        && (rest.is_empty() || rest.starts_with(' '))
    {
        let path = rest.trim();
        return Some(UiCommand::DownloadPlan {
            session_id,
            destination: (!path.is_empty()).then(|| PathBuf::from(path)),
        });
    }

    if let Some(number) = line.strip_prefix('/').and_then(|n| n.parse::<usize>().ok()) {
        let option = follow_ups
            .lock()
            .ok()
            .and_then(|options| options.get(number.checked_sub(1)?).cloned());
        return match option {
            Some(follow_up) => Some(UiCommand::FollowUpClicked {
                session_id,
                follow_up,
            }),
            None => {
                println!("{}", format!("No follow-up #{}", number).red());
                None
            }
        };
    }

    Some(UiCommand::ChatMessage {
        session_id,
        message: line.to_string(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let (messenger, mut events) = ChannelMessenger::channel();
    let controller = Arc::new(build_controller(&cli, messenger).await?);
    let follow_ups: FollowUps = Arc::new(Mutex::new(Vec::new()));

    let printer_follow_ups = follow_ups.clone();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            print_event(event, &printer_follow_ups);
        }
    });

    // Lines are read on a blocking thread so the runtime keeps printing events.
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    let reader = tokio::task::spawn_blocking(move || -> Result<()> {
        let mut rl = Editor::new()?;
        rl.set_helper(Some(CliHelper));
        loop {
            match rl.readline(">> ") {
                Ok(line) => {
                    let trimmed = line.trim().to_string();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(&line);
                    let quit = trimmed == "/quit";
                    if line_tx.send(trimmed).is_err() || quit {
                        break;
                    }
                }
                Err(rustyline::error::ReadlineError::Interrupted) => {
                    println!(
                        "{}",
                        "CTRL-C detected. Type /stop to cancel or /quit to exit.".yellow()
                    );
                }
                Err(rustyline::error::ReadlineError::Eof) => {
                    let _ = line_tx.send("/quit".to_string());
                    break;
                }
                Err(err) => {
                    eprintln!("{}", format!("Error: {:?}", err).red());
                    let _ = line_tx.send("/quit".to_string());
                    break;
                }
            }
        }
        Ok(())
    });

    println!("{}", "=== RefAssist ===".bright_magenta().bold());
    println!(
        "{}",
        "Describe what to refactor. /help shows examples, /download [path] saves the plan."
            .bright_black()
    );
    println!(
        "{}",
        "/stop cancels, /N picks a follow-up, /quit exits.".bright_black()
    );
    println!();

    while let Some(line) = line_rx.recv().await {
        let Some(command) = parse_line(&line, &cli.session, &follow_ups) else {
            continue;
        };
        let quit = matches!(command, UiCommand::TabClosed { .. });

        match controller.handle(command).await {
            Ok(Some(handle)) => {
                tokio::spawn(async move {
                    if let Err(e) = handle.wait().await {
                        eprintln!("{}", format!("Interaction failed: {}", e).red());
                    }
                });
            }
            Ok(None) => {}
            Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
        }

        if quit {
            println!("{}", "Goodbye!".bright_green());
            break;
        }
    }

    reader.await??;
    drop(controller);
    printer.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_follow_ups() -> FollowUps {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn download_takes_an_optional_path() {
        let follow_ups = no_follow_ups();

        match parse_line("/download", "cli", &follow_ups) {
            Some(UiCommand::DownloadPlan { destination, .. }) => assert_eq!(destination, None),
            other => panic!("unexpected {:?}", other),
        }
        match parse_line("/download  plans/plan.md ", "cli", &follow_ups) {
            Some(UiCommand::DownloadPlan { destination, .. }) => {
                assert_eq!(destination, Some(PathBuf::from("plans/plan.md")))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn help_and_numbered_follow_ups_are_commands() {
        let follow_ups = no_follow_ups();
        follow_ups
            .lock()
            .unwrap()
            .push(FollowUpOption::echo("Run analysis"));

        assert!(matches!(
            parse_line("/help", "cli", &follow_ups),
            Some(UiCommand::Help { .. })
        ));
        match parse_line("/1", "cli", &follow_ups) {
            Some(UiCommand::FollowUpClicked { follow_up, .. }) => {
                assert_eq!(follow_up.prompt, "Run analysis")
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            parse_line("/downloads please", "cli", &follow_ups),
            Some(UiCommand::ChatMessage { .. })
        ));
    }
}
