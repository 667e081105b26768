#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Transcript,
    Quit,
    Unknown(String),
}

/// Commands offered for completion, with a one-line description each.
pub const COMMANDS: [(&str, &str); 3] = [
    ("/help", "show available commands"),
    ("/transcript", "print the persisted conversation transcript"),
    ("/quit", "exit sage-chat"),
];

/// Prefix that sends the rest of the line as a message starting with `/`.
pub const ESCAPE_PREFIX: &str = "//";

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') || trimmed.starts_with(ESCAPE_PREFIX) {
        return None;
    }

    let command = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_string();

    let parsed = match command.as_str() {
        "/help" => SlashCommand::Help,
        "/transcript" => SlashCommand::Transcript,
        "/quit" | "/exit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command),
    };

    Some(parsed)
}

/// Returns the text to submit for a non-command line, dropping one `/` from
/// a leading `//`.
#[must_use]
pub fn message_text(input: &str) -> String {
    let leading = input.len() - input.trim_start().len();
    if input[leading..].starts_with(ESCAPE_PREFIX) {
        format!("{}{}", &input[..leading], &input[leading + 1..])
    } else {
        input.to_string()
    }
}

#[must_use]
pub fn help_text() -> String {
    let mut lines: Vec<String> = COMMANDS
        .iter()
        .map(|(name, description)| format!("  {name:<12} {description}"))
        .collect();
    lines.push(format!(
        "  {ESCAPE_PREFIX}<text>      send a message that starts with /"
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_slash_command("What is an ETF?"), None);
        assert_eq!(parse_slash_command("   "), None);
    }

    #[test]
    fn known_commands_parse_with_surrounding_whitespace() {
        assert_eq!(parse_slash_command("  /help "), Some(SlashCommand::Help));
        assert_eq!(
            parse_slash_command("/transcript"),
            Some(SlashCommand::Transcript)
        );
        assert_eq!(parse_slash_command("/quit now"), Some(SlashCommand::Quit));
        assert_eq!(parse_slash_command("/exit"), Some(SlashCommand::Quit));
    }

    #[test]
    fn unknown_command_keeps_its_name() {
        assert_eq!(
            parse_slash_command("/reset all"),
            Some(SlashCommand::Unknown("/reset".to_string()))
        );
    }

    #[test]
    fn double_slash_is_a_message_not_a_command() {
        assert_eq!(parse_slash_command("//ETF fees?"), None);
        assert_eq!(parse_slash_command("  //help"), None);
        assert_eq!(message_text("//ETF fees?"), "/ETF fees?");
        assert_eq!(message_text("  //help"), "  /help");
    }

    #[test]
    fn plain_messages_are_submitted_verbatim() {
        assert_eq!(message_text("  What is an ETF?  "), "  What is an ETF?  ");
        assert_eq!(message_text("a // b"), "a // b");
    }

    #[test]
    fn help_lists_every_command() {
        let help = help_text();
        for (name, _) in COMMANDS {
            assert!(help.contains(name), "missing {name} in help");
        }
        assert!(help.contains(ESCAPE_PREFIX));
    }
}
