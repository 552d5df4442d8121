//! Interactive chat loop.

use anyhow::Result;
use docchat_agent::ChatSession;
use docchat_rag::LoadOutcome;
use docchat_session::Role;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::error;

const PROMPT: &str = "you> ";

const HELP: &str = "\
Commands:
  /clear    forget the conversation
  /reindex  rebuild the document index
  /history  show the transcript
  /help     show this message
  /quit     leave";

/// What a line of input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Message(String),
    Clear,
    Reindex,
    History,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

pub fn parse_line(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    if !line.starts_with('/') {
        return ReplCommand::Message(line.to_string());
    }
    match line {
        "/clear" => ReplCommand::Clear,
        "/reindex" => ReplCommand::Reindex,
        "/history" => ReplCommand::History,
        "/help" => ReplCommand::Help,
        "/quit" | "/exit" => ReplCommand::Quit,
        other => ReplCommand::Unknown(other.to_string()),
    }
}

/// Read lines until `/quit`, Ctrl-C or Ctrl-D.
pub async fn run(session: &mut ChatSession) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    println!("docchat ready. Type /help for commands.");
    if !session.transcript().is_empty() {
        println!("(resumed a conversation with {} turn(s))", session.transcript().len());
    }

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let command = parse_line(&line);
        if command != ReplCommand::Empty {
            let _ = rl.add_history_entry(line.as_str());
        }

        match command {
            ReplCommand::Empty => {}
            ReplCommand::Message(text) => {
                let reply = session.send(&text).await;
                println!("\n{reply}\n");
            }
            ReplCommand::Clear => match session.clear() {
                Ok(()) => println!("Conversation cleared."),
                Err(e) => {
                    error!(error = %e, "failed to clear transcript");
                    println!("Conversation cleared, but the saved transcript could not be removed.");
                }
            },
            ReplCommand::Reindex => match session.reindex().await {
                Ok(LoadOutcome::Built(report)) => println!(
                    "Reindexed {} document(s) into {} chunk(s).",
                    report.documents, report.entries
                ),
                Ok(LoadOutcome::Restored { entries }) => {
                    println!("Index restored with {entries} chunk(s).")
                }
                Err(e) => println!("Reindex failed: {e}"),
            },
            ReplCommand::History => {
                for turn in session.transcript() {
                    let speaker = match turn.role {
                        Role::User => "you",
                        Role::Assistant => "assistant",
                    };
                    println!("{speaker}: {}", turn.text);
                }
            }
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Quit => break,
            ReplCommand::Unknown(cmd) => println!("Unknown command {cmd}. Type /help."),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(
            parse_line("  How many countries?  "),
            ReplCommand::Message("How many countries?".into())
        );
    }

    #[test]
    fn slash_commands() {
        assert_eq!(parse_line("/clear"), ReplCommand::Clear);
        assert_eq!(parse_line("/reindex"), ReplCommand::Reindex);
        assert_eq!(parse_line("/exit"), ReplCommand::Quit);
        assert_eq!(parse_line("/nope"), ReplCommand::Unknown("/nope".into()));
        assert_eq!(parse_line("   "), ReplCommand::Empty);
    }
}
