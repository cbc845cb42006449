//! Encodes an appender event as a `Value` and back, so a queued appender can
//! ride `strand_value::queue::BlockingQueue` (§4.2.3/C2) without that queue
//! knowing anything about logging.

use strand_value::hash::QHash;
use strand_value::Value;

use crate::appender::AppenderEventKind;
use crate::error::LogError;
use crate::event::{Level, LogEvent, LogLocation};

fn kind_tag(kind: AppenderEventKind) -> &'static str {
    match kind {
        AppenderEventKind::Open => "open",
        AppenderEventKind::Close => "close",
        AppenderEventKind::Reopen => "reopen",
        AppenderEventKind::Log => "log",
    }
}

fn kind_from_tag(tag: &str) -> Result<AppenderEventKind, LogError> {
    match tag {
        "open" => Ok(AppenderEventKind::Open),
        "close" => Ok(AppenderEventKind::Close),
        "reopen" => Ok(AppenderEventKind::Reopen),
        "log" => Ok(AppenderEventKind::Log),
        other => Err(LogError::Decode(format!("unknown appender event kind '{}'", other))),
    }
}

pub fn encode(kind: AppenderEventKind, event: Option<&LogEvent>) -> Value {
    let mut h = QHash::new();
    h.set("kind", Value::string(kind_tag(kind)));
    if let Some(event) = event {
        h.set("level", Value::string(event.level.as_str()));
        h.set("template", Value::string(event.template.clone()));
        h.set("args", Value::list(event.args.clone()));
        h.set("logger_name", Value::string(event.logger_name.clone()));
        h.set("thread_id", Value::string(event.thread_id.clone()));
        h.set("timestamp", Value::string(event.timestamp.to_rfc3339()));
        if let Some(loc) = &event.location {
            h.set("location_file", Value::string(loc.file.clone()));
            h.set("location_line", Value::Int(loc.line as i64));
        }
        if let Some(t) = &event.throwable {
            h.set("throwable", t.clone());
        }
    }
    Value::hash(h)
}

pub fn decode(value: &Value) -> Result<(AppenderEventKind, Option<LogEvent>), LogError> {
    let h = match value {
        Value::Hash(h) => h,
        other => return Err(LogError::Decode(format!("expected a hash, got {}", other.type_name()))),
    };
    let kind_str = h
        .get("kind")
        .ok_or_else(|| LogError::Decode("missing 'kind' field".to_string()))?
        .as_string();
    let kind = kind_from_tag(&kind_str.as_str())?;
    if kind != AppenderEventKind::Log {
        return Ok((kind, None));
    }

    let level_str = h
        .get("level")
        .ok_or_else(|| LogError::Decode("missing 'level' field".to_string()))?
        .as_string();
    let level = Level::parse(&level_str.as_str())
        .ok_or_else(|| LogError::Decode(format!("unknown level '{}'", level_str.as_str())))?;
    let template = h.get("template").map(|v| v.as_string().as_str().into_owned()).unwrap_or_default();
    let args = match h.get("args") {
        Some(Value::List(l)) => l.iter().cloned().collect(),
        _ => Vec::new(),
    };
    let logger_name = h.get("logger_name").map(|v| v.as_string().as_str().into_owned()).unwrap_or_default();
    let thread_id = h.get("thread_id").map(|v| v.as_string().as_str().into_owned()).unwrap_or_default();
    let timestamp_str = h.get("timestamp").map(|v| v.as_string().as_str().into_owned()).unwrap_or_default();
    let timestamp = chrono::DateTime::parse_from_rfc3339(&timestamp_str)
        .map_err(|e| LogError::Decode(format!("bad timestamp '{}': {}", timestamp_str, e)))?;
    let location = match (h.get("location_file"), h.get("location_line")) {
        (Some(file), Some(line)) => {
            Some(LogLocation { file: file.as_string().as_str().into_owned(), line: line.as_int() as u32 })
        }
        _ => None,
    };
    let throwable = h.get("throwable").cloned();

    Ok((
        kind,
        Some(LogEvent { level, template, args, logger_name, thread_id, timestamp, location, throwable }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_event_round_trips_through_encode_decode() {
        let event = LogEvent {
            level: Level::Error,
            template: "boom at {}".to_string(),
            args: vec![Value::string("widget")],
            logger_name: "app.widget".to_string(),
            thread_id: "ThreadId(3)".to_string(),
            timestamp: chrono::Utc::now().into(),
            location: Some(LogLocation { file: "widget.strand".to_string(), line: 42 }),
            throwable: None,
        };
        let encoded = encode(AppenderEventKind::Log, Some(&event));
        let (kind, decoded) = decode(&encoded).unwrap();
        assert_eq!(kind, AppenderEventKind::Log);
        let decoded = decoded.unwrap();
        assert_eq!(decoded.level, Level::Error);
        assert_eq!(decoded.logger_name, "app.widget");
        assert_eq!(decoded.render(), "boom at widget");
        assert_eq!(decoded.location.unwrap().line, 42);
    }

    #[test]
    fn lifecycle_events_carry_no_log_event() {
        let encoded = encode(AppenderEventKind::Reopen, None);
        let (kind, decoded) = decode(&encoded).unwrap();
        assert_eq!(kind, AppenderEventKind::Reopen);
        assert!(decoded.is_none());
    }

    #[test]
    fn decoding_a_non_hash_value_is_an_error() {
        assert!(decode(&Value::Int(1)).is_err());
    }
}
