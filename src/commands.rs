//! Interpretation of one line of operator input

/// Literal commands that end a session
const QUIT_COMMANDS: [&str; 3] = [":quit", ":q", ":exit"];

/// What a line of input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// End the session
    Quit,
    /// Nothing to send; prompt again
    Skip,
    /// Send the text to the agent
    Message(String),
}

/// Parse a raw input line
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();

    if input.is_empty() {
        return Command::Skip;
    }

    let lowered = input.to_lowercase();
    if QUIT_COMMANDS.contains(&lowered.as_str()) {
        return Command::Quit;
    }

    Command::Message(input.to_string())
}
