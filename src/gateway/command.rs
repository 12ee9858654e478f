//! Chat command parsing — case-sensitive keyword dispatch.
//!
//! Anything that is not a recognised `/command` is free text and goes to
//! the chat path (trigger-phrase check, then generation).

/// One parsed inbound message.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    Status,
    Memories,
    Forget,
    Models,
    SetModel(&'a str),
    Chat(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(text: &'a str) -> Command<'a> {
        let trimmed = text.trim();
        match trimmed {
            "/start" | "/help" => Command::Help,
            "/status" => Command::Status,
            "/memory" => Command::Memories,
            "/forget" => Command::Forget,
            "/models" => Command::Models,
            _ => {
                if let Some(rest) = trimmed.strip_prefix("/model ") {
                    Command::SetModel(rest.trim())
                } else {
                    Command::Chat(trimmed)
                }
            }
        }
    }
}
