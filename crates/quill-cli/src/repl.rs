//! Interactive loop: reads stdin lines, dispatches slash commands, and
//! submits everything else to the session.

use std::fmt::Write as _;
use std::io::Write as _;

use quill_ai::{Message, ProviderSelector, Session, TokenTracker};
use quill_common::Result;
use quill_config::QuillConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::providers::build_provider;

const HELP: &str = "\
Commands:
  /help            show this help
  /reset           clear the conversation
  /history         print the conversation so far
  /config          show the active backend settings
  /providers       list supported backends
  /provider <id>   switch backend, keeping the conversation
  /usage           show token usage for this session
  /quit            exit (Ctrl-D also works)
Anything else is sent to the model.";

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Reset,
    History,
    Config,
    Providers,
    Provider(Option<String>),
    Usage,
    Quit,
    Unknown(String),
}

impl Command {
    /// `None` when the line is a prompt rather than a command.
    pub fn parse(line: &str) -> Option<Command> {
        let rest = line.trim().strip_prefix('/')?;
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (rest, None),
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "help" | "?" => Command::Help,
            "reset" | "clear" => Command::Reset,
            "history" => Command::History,
            "config" => Command::Config,
            "providers" => Command::Providers,
            "provider" => Command::Provider(arg.map(str::to_string)),
            "usage" => Command::Usage,
            "quit" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        };
        Some(command)
    }
}

pub struct Repl {
    session: Session,
    config: QuillConfig,
    selector: ProviderSelector,
    stream: bool,
}

impl Repl {
    pub fn new(
        session: Session,
        config: QuillConfig,
        selector: ProviderSelector,
        stream: bool,
    ) -> Self {
        Self {
            session,
            config,
            selector,
            stream,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        println!(
            "quill {} | {} (type /help for commands)",
            env!("CARGO_PKG_VERSION"),
            self.session.provider().config()
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            prompt()?;
            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match Command::parse(line) {
                Some(Command::Quit) => break,
                Some(command) => self.dispatch(command),
                None => self.send(line).await?,
            }
        }

        info!(session = %self.session.id().short(), "session ended");
        Ok(())
    }

    fn dispatch(&mut self, command: Command) {
        match command {
            Command::Help => println!("{HELP}"),
            Command::Reset => {
                self.session.reset();
                println!("conversation cleared");
            }
            Command::History => print!("{}", format_history(&self.session.history())),
            Command::Config => {
                println!("{}", self.session.provider().config());
                match self.session.system_prompt() {
                    Some(prompt) => println!("system prompt: {prompt}"),
                    None => println!("system prompt: (none)"),
                }
                println!("streaming: {}", if self.stream { "on" } else { "off" });
            }
            Command::Providers => {
                print!(
                    "{}",
                    format_providers(&self.selector, self.session.provider().name())
                );
            }
            Command::Provider(None) => println!("usage: /provider <id>"),
            Command::Provider(Some(id)) => self.switch(&id),
            Command::Usage => print!("{}", format_usage(self.session.tracker())),
            Command::Unknown(name) => println!("unknown command /{name} (try /help)"),
            Command::Quit => {}
        }
    }

    fn switch(&mut self, id: &str) {
        match build_provider(&self.selector, &self.config, id, None) {
            Ok(provider) => {
                self.session.switch_provider(provider);
                println!("now using {}", self.session.provider().config());
            }
            Err(e) => {
                warn!(provider = %id, error = %e, "provider switch failed");
                eprintln!("error: {e}");
            }
        }
    }

    async fn send(&mut self, text: &str) -> Result<()> {
        let result = if self.stream {
            let mut stdout = std::io::stdout();
            let result = self
                .session
                .submit_streaming(text, |fragment| {
                    // Broken pipes surface on the next prompt flush.
                    let _ = stdout.write_all(fragment.as_bytes());
                    let _ = stdout.flush();
                })
                .await;
            println!();
            result.map(|_| ())
        } else {
            self.session.submit(text).await.map(|reply| println!("{reply}"))
        };

        if let Err(e) = result {
            warn!(provider = %self.session.provider().name(), error = %e, "request failed");
            eprintln!("error: {e}");
        }
        Ok(())
    }
}

fn prompt() -> Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(b"> ")?;
    stdout.flush()?;
    Ok(())
}

pub fn format_history(messages: &[Message]) -> String {
    if messages.is_empty() {
        return "(empty conversation)\n".to_string();
    }
    let mut out = String::new();
    for message in messages {
        let _ = writeln!(out, "[{}] {}", message.role.as_str(), message.content);
    }
    out
}

pub fn format_usage(tracker: &TokenTracker) -> String {
    let total = tracker.total();
    let mut out = format!(
        "{} calls, {} tokens ({} prompt, {} completion)\n",
        tracker.call_count(),
        total.total_tokens,
        total.prompt_tokens,
        total.completion_tokens
    );
    if tracker.unreported_calls() > 0 {
        let _ = writeln!(
            out,
            "{} streamed calls did not report usage",
            tracker.unreported_calls()
        );
    }
    out
}

pub fn format_providers(selector: &ProviderSelector, current: &str) -> String {
    let mut out = String::new();
    for (kind, meta) in selector.catalog().iter() {
        let marker = if kind.id() == current { "*" } else { " " };
        let _ = writeln!(
            out,
            "{marker} {:<10} {:<18} default model {:<26} {}",
            kind.id(),
            meta.display_name,
            meta.default_model,
            meta.description
        );
    }
    out
}
