//! Console input parsing.

/// Shown on `/start`, before consent is given.
pub const WELCOME: &str = "\
Welcome to the psychologist skills simulator!

This program imitates a narcissistic client. It is meant only for training:
practicing therapeutic skills, active listening and strategies for working
with a narcissistic client.

Privacy and consent:
1. The whole dialogue is stored in anonymized form for reviewing the training.
2. Your messages are used only to generate the client's replies.
3. Consent to processing the training data is required to continue.

By typing \"I agree\" you confirm that you understand this is a training tool,
agree to the anonymized dialogue being stored, do not expect real
psychological help, and will use it for training only.";

/// Listed on `/help`.
pub const HELP: &str = "\
/start     show the introduction and consent request
I agree    give consent and start a session
/clear     clear the client's memory and start over (also /reset)
/feedback  get supervisor feedback on the session
/quit      exit";

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Welcome,
    Consent,
    Reset,
    Feedback,
    Help,
    Quit,
    Text(String),
    Blank,
}

impl Command {
    /// Classifies a line of input.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "" => Self::Blank,
            "/start" => Self::Welcome,
            "/clear" | "/reset" => Self::Reset,
            "/feedback" => Self::Feedback,
            "/help" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            _ if trimmed.eq_ignore_ascii_case("i agree") => Self::Consent,
            _ => Self::Text(trimmed.to_string()),
        }
    }
}
