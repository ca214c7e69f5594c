mod ask;
mod attach;
mod config;
mod manage;

use aichat::config::ChatConfig;
use aichat::docs::DocumentUpload;
use aichat::state::Session;

/// A line typed at the prompt.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// Stage a document for the next message.
    Attach(String),
    /// Drop the staged document.
    Detach,
    Clear,
    History,
    Config,
    Help,
    Quit,
    Send(String),
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Command::Send(line.to_string());
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        match name {
            "attach" if !arg.is_empty() => Command::Attach(arg.to_string()),
            "detach" => Command::Detach,
            "clear" => Command::Clear,
            "history" => Command::History,
            "config" => Command::Config,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(trimmed.to_string()),
        }
    }
}

pub enum Flow {
    Continue,
    Quit,
}

/// Terminal front end: owns the session plus the document staged for the
/// next message.
pub struct Host {
    config: ChatConfig,
    session: Session,
    staged: Option<DocumentUpload>,
}

impl Host {
    pub fn new(config: ChatConfig, session: Session) -> Self {
        Self {
            config,
            session,
            staged: None,
        }
    }

    pub async fn handle(&mut self, line: &str) -> Flow {
        match Command::parse(line) {
            Command::Send(text) => ask::send(self, &text).await,
            Command::Attach(path) => {
                if let Err(e) = attach::attach(self, &path).await {
                    println!("! {:#}", e);
                }
            }
            Command::Detach => attach::detach(self),
            Command::Clear => manage::clear(self).await,
            Command::History => manage::history(self).await,
            Command::Config => config::show(self),
            Command::Help => print_help(),
            Command::Quit => return Flow::Quit,
            Command::Unknown(cmd) => println!("Unknown command `{}`. Type /help.", cmd),
        }
        Flow::Continue
    }
}

fn print_help() {
    println!(
        "Commands:\n  \
         /attach <path>  attach a PDF to your next message\n  \
         /detach         drop the attached PDF\n  \
         /history        show the conversation\n  \
         /clear          start a new conversation\n  \
         /config         show the current settings\n  \
         /quit           leave\n\
         Anything else is sent as a message."
    );
}
