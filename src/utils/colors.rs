//! Terminal colors for result and summary output.

use colored::Colorize;

/// Kind of message, which decides prefix and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

impl MessageType {
    pub fn colorize(&self, message: &str) -> String {
        match self {
            MessageType::Success => message.green().to_string(),
            MessageType::Error => message.red().to_string(),
            MessageType::Warning => message.yellow().to_string(),
            MessageType::Info => message.blue().to_string(),
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            MessageType::Success => "✓",
            MessageType::Error => "✗",
            MessageType::Warning => "⚠",
            MessageType::Info => "ℹ",
        }
    }

    /// Prefix plus colored message.
    pub fn format(&self, message: &str) -> String {
        format!("{} {}", self.prefix(), self.colorize(message))
    }
}

/// Bold cyan section title.
pub fn header(message: &str) -> String {
    message.bold().cyan().to_string()
}

/// Color a count by whether a non-zero value is a problem.
pub fn count(value: usize, problem: MessageType) -> String {
    if value == 0 {
        value.to_string().dimmed().to_string()
    } else {
        problem.colorize(&value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(MessageType::Success.prefix(), "✓");
        assert_eq!(MessageType::Error.prefix(), "✗");
    }

    #[test]
    fn test_format_keeps_message() {
        colored::control::set_override(false);
        assert_eq!(MessageType::Warning.format("careful"), "⚠ careful");
        assert_eq!(count(0, MessageType::Error), "0");
        assert_eq!(count(3, MessageType::Error), "3");
        colored::control::unset_override();
    }
}
