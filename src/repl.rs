//! Line-oriented terminal front end.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::commands::{help_text, message_text, parse_slash_command, SlashCommand, COMMANDS};
use crate::controller::SessionController;
use crate::session::{Indicator, SubmitOutcome};
use crate::transcript::{Message, Speaker};

pub const PROMPT: &str = "you> ";

/// Completion, hints and highlighting for slash commands.
#[derive(Debug, Clone, Default)]
pub struct ReplHelper;

impl Helper for ReplHelper {}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok((0, command_candidates(&line[..pos])))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        command_hint(&line[..pos])
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.dimmed().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Validator for ReplHelper {}

fn command_candidates(prefix: &str) -> Vec<Pair> {
    if !prefix.starts_with('/') || prefix.starts_with("//") {
        return Vec::new();
    }

    COMMANDS
        .iter()
        .filter(|(name, _)| name.starts_with(prefix))
        .map(|(name, _)| Pair {
            display: (*name).to_string(),
            replacement: (*name).to_string(),
        })
        .collect()
}

fn command_hint(prefix: &str) -> Option<String> {
    if !prefix.starts_with('/') || prefix.starts_with("//") || prefix.contains(' ') {
        return None;
    }

    COMMANDS
        .iter()
        .find(|(name, _)| name.starts_with(prefix) && name.len() > prefix.len())
        .map(|(name, _)| name[prefix.len()..].to_string())
}

#[must_use]
pub fn format_message(message: &Message) -> String {
    let label = match message.speaker {
        Speaker::User => "you:".cyan().bold(),
        Speaker::Assistant => "sage:".green().bold(),
    };
    let content = if message.is_error {
        message.content.red().to_string()
    } else {
        message.content.clone()
    };

    format!("{label} {content}")
}

#[must_use]
pub fn format_indicator(indicator: Indicator) -> String {
    indicator.text().dimmed().italic().to_string()
}

/// Prints everything after the first `shown` messages; returns the new count.
fn print_new_messages(controller: &SessionController, shown: usize) -> usize {
    let messages = controller.messages();
    for message in messages.iter().skip(shown) {
        println!("{}", format_message(message));
    }
    messages.len()
}

fn print_indicator(controller: &SessionController) {
    if let Some(indicator) = controller.snapshot().indicator {
        println!("{}", format_indicator(indicator));
    }
}

/// Mounts the session, prints it, then reads lines until `/quit` or end of input.
pub fn run(controller: &Arc<SessionController>) -> rustyline::Result<()> {
    let profile = controller.service_profile();
    println!("{}", "=== Sage Chat ===".bright_magenta().bold());
    let service_line = match profile.endpoint {
        Some(endpoint) => format!("service: {} ({endpoint})", profile.service_id),
        None => format!("service: {}", profile.service_id),
    };
    println!("{}", service_line.bright_black());
    println!("{}", "Type /help for commands.".bright_black());
    println!();

    controller.mount();
    print_indicator(controller);
    controller.wait_for_idle();
    let mut shown = print_new_messages(controller, 0);

    let mut editor = Editor::new()?;
    editor.set_helper(Some(ReplHelper));

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(error) => return Err(error),
        };

        if let Some(command) = parse_slash_command(&line) {
            match command {
                SlashCommand::Help => println!("{}", help_text()),
                SlashCommand::Transcript => println!("{}", controller.persisted_transcript()),
                SlashCommand::Quit => break,
                SlashCommand::Unknown(name) => {
                    println!("{}", format!("Unknown command: {name}").yellow());
                    println!(
                        "{}",
                        format!("Start the line with /{name} to send it as a message.").bright_black()
                    );
                }
            }
            continue;
        }

        match controller.submit(&message_text(&line)) {
            SubmitOutcome::Sent { .. } => {
                let _ = editor.add_history_entry(line.as_str());
                // The typed line is already on screen.
                shown = controller.messages().len();
                print_indicator(controller);
                controller.wait_for_idle();
                shown = print_new_messages(controller, shown);
            }
            SubmitOutcome::StartFailed(_) => {
                shown = controller.messages().len().saturating_sub(1);
                shown = print_new_messages(controller, shown);
            }
            SubmitOutcome::Blank => {}
            SubmitOutcome::Busy | SubmitOutcome::NotMounted => {
                println!("{}", "Still waiting on the previous reply.".bright_black());
            }
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_offers_matching_commands_only() {
        let names: Vec<String> = command_candidates("/t")
            .into_iter()
            .map(|pair| pair.replacement)
            .collect();

        assert_eq!(names, vec!["/transcript".to_string()]);
        assert!(command_candidates("hello").is_empty());
        assert_eq!(command_candidates("/").len(), COMMANDS.len());
    }

    #[test]
    fn hint_completes_the_remaining_command_text() {
        assert_eq!(command_hint("/he").as_deref(), Some("lp"));
        assert_eq!(command_hint("/help"), None);
        assert_eq!(command_hint("/help me"), None);
        assert_eq!(command_hint("plain"), None);
    }

    #[test]
    fn formatted_messages_keep_content_and_label() {
        let user = format_message(&Message::user("line1\nline2"));
        let reply = format_message(&Message::assistant("answer"));
        let failure = format_message(&Message::assistant_error("oops"));

        assert!(user.contains("you:"));
        assert!(user.contains("line1\nline2"));
        assert!(reply.contains("sage:"));
        assert!(reply.contains("answer"));
        assert!(failure.contains("oops"));
    }

    #[test]
    fn indicator_text_is_rendered() {
        assert!(format_indicator(Indicator::Contemplating).contains("The Sage is contemplating..."));
    }
}
