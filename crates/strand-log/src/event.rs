//! Logger events and levels (§3 "Logger event", §4.11).

use std::fmt;

use chrono::{DateTime, FixedOffset};
use strand_value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TRACE" => Some(Level::Trace),
            "DEBUG" => Some(Level::Debug),
            "INFO" => Some(Level::Info),
            "WARN" => Some(Level::Warn),
            "ERROR" => Some(Level::Error),
            "FATAL" => Some(Level::Fatal),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: Level,
    pub template: String,
    pub args: Vec<Value>,
    pub logger_name: String,
    /// `std::thread::ThreadId`'s `Debug` representation — there's no
    /// stable way to project a `ThreadId` to an integer, so the event
    /// carries the string form instead (§3: "thread_id").
    pub thread_id: String,
    pub timestamp: DateTime<FixedOffset>,
    pub location: Option<LogLocation>,
    pub throwable: Option<Value>,
}

impl LogEvent {
    /// Expands `{}` placeholders in `template` against `args` in order;
    /// a placeholder with no remaining argument is left as literal text
    /// (§4.11: "captures a timestamp and location" then is handed to
    /// appenders as a rendered message via the layout).
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut args = self.args.iter();
        let mut chars = self.template.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '{' && chars.peek() == Some(&'}') {
                chars.next();
                match args.next() {
                    Some(v) => out.push_str(&v.as_string().as_str()),
                    None => out.push_str("{}"),
                }
            } else {
                out.push(c);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(template: &str, args: Vec<Value>) -> LogEvent {
        LogEvent {
            level: Level::Info,
            template: template.to_string(),
            args,
            logger_name: "app".to_string(),
            thread_id: "ThreadId(1)".to_string(),
            timestamp: chrono::Utc::now().into(),
            location: None,
            throwable: None,
        }
    }

    #[test]
    fn render_substitutes_placeholders_in_order() {
        let event = sample("user {} logged in from {}", vec![Value::string("ada"), Value::string("10.0.0.1")]);
        assert_eq!(event.render(), "user ada logged in from 10.0.0.1");
    }

    #[test]
    fn render_leaves_unmatched_placeholders_literal() {
        let event = sample("{} and {}", vec![Value::string("one")]);
        assert_eq!(event.render(), "one and {}");
    }

    #[test]
    fn level_parses_case_insensitively() {
        assert_eq!(Level::parse("warn"), Some(Level::Warn));
        assert_eq!(Level::parse("BOGUS"), None);
    }

    #[test]
    fn level_ordering_follows_declaration_order() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Error < Level::Fatal);
    }
}
