//! Hierarchical loggers with additivity (§4.11: "loggers form a dotted
//! name tree; each inherits its effective level from the nearest ancestor
//! that sets one, and an additive logger's event also reaches every
//! ancestor's own appenders").

use std::sync::{Arc, RwLock};

use chrono::Utc;

use crate::appender::Appender;
use crate::error::LogError;
use crate::event::{Level, LogEvent, LogLocation};

struct LoggerState {
    level: Option<Level>,
    additive: bool,
    appenders: Vec<Arc<dyn Appender>>,
}

impl Default for LoggerState {
    fn default() -> Self {
        LoggerState { level: None, additive: true, appenders: Vec::new() }
    }
}

/// One node of the dotted-name logger tree. Root is named `""`.
pub struct Logger {
    name: String,
    parent: Option<Arc<Logger>>,
    state: RwLock<LoggerState>,
}

impl Logger {
    pub fn root() -> Arc<Logger> {
        Arc::new(Logger { name: String::new(), parent: None, state: RwLock::new(LoggerState::default()) })
    }

    pub fn child(self: &Arc<Logger>, name: &str) -> Arc<Logger> {
        let qualified = if self.name.is_empty() { name.to_string() } else { format!("{}.{}", self.name, name) };
        Arc::new(Logger { name: qualified, parent: Some(self.clone()), state: RwLock::new(LoggerState::default()) })
    }

    /// Walks dotted segments from the root, creating any missing ancestors.
    pub fn descendant(self: &Arc<Logger>, dotted_name: &str) -> Arc<Logger> {
        let mut current = self.clone();
        for segment in dotted_name.split('.').filter(|s| !s.is_empty()) {
            current = current.child(segment);
        }
        current
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_level(&self, level: Option<Level>) {
        self.state.write().unwrap().level = level;
    }

    pub fn set_additive(&self, additive: bool) {
        self.state.write().unwrap().additive = additive;
    }

    pub fn add_appender(&self, appender: Arc<dyn Appender>) {
        self.state.write().unwrap().appenders.push(appender);
    }

    /// The level this logger actually filters at: its own, or the nearest
    /// ancestor's, or `Info` if nothing in the chain set one.
    pub fn effective_level(&self) -> Level {
        if let Some(level) = self.state.read().unwrap().level {
            return level;
        }
        match &self.parent {
            Some(parent) => parent.effective_level(),
            None => Level::Info,
        }
    }

    pub fn is_enabled_for(&self, level: Level) -> bool {
        level >= self.effective_level()
    }

    pub fn log(&self, level: Level, template: impl Into<String>, args: Vec<strand_value::Value>) -> Result<(), LogError> {
        self.log_at(level, template, args, None)
    }

    pub fn log_at(
        &self,
        level: Level,
        template: impl Into<String>,
        args: Vec<strand_value::Value>,
        location: Option<LogLocation>,
    ) -> Result<(), LogError> {
        if !self.is_enabled_for(level) {
            return Ok(());
        }
        let event = LogEvent {
            level,
            template: template.into(),
            args,
            logger_name: self.name.clone(),
            thread_id: format!("{:?}", std::thread::current().id()),
            timestamp: Utc::now().into(),
            location,
            throwable: None,
        };
        self.dispatch(&event)
    }

    fn dispatch(&self, event: &LogEvent) -> Result<(), LogError> {
        for appender in self.state.read().unwrap().appenders.iter() {
            appender.process_event(crate::appender::AppenderEventKind::Log, Some(event))?;
        }
        let additive = self.state.read().unwrap().additive;
        if additive {
            if let Some(parent) = &self.parent {
                parent.dispatch(event)?;
            }
        }
        Ok(())
    }
}
