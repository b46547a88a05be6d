//! Integration tests for the global logging setup.
//!
//! `init_logging` installs a process-wide subscriber, so everything that
//! depends on it lives in a single test.

use async_trait::async_trait;
use bridge_traits::{error::Result as SinkResult, LogEntry, LogLevel, LoggerSink};
use core_runtime::logging::{init_logging, redact_source, LogFormat, LoggingConfig};
use core_runtime::Error;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CapturingSink {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LoggerSink for CapturingSink {
    async fn log(&self, entry: LogEntry) -> SinkResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Trace
    }
}

#[test]
fn test_global_logging_forwards_to_host_sink() {
    let sink = Arc::new(CapturingSink::default());
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_logger_sink(sink.clone());

    init_logging(config).unwrap();

    tracing::debug!(
        target: "core_playback",
        origin = "URL",
        source = %redact_source("https://user:pw@cdn.example.com/a/song.mp3?sig=1"),
        "Loading source"
    );
    tracing::trace!(target: "core_playback", "Below the configured level");
    tracing::info!(target: "some_dependency", "Outside the workspace filter");

    {
        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.level, LogLevel::Debug);
        assert_eq!(entry.message, "Loading source");
        assert_eq!(entry.fields.get("origin"), Some(&"URL".to_string()));
        assert_eq!(
            entry.fields.get("source"),
            Some(&"https://cdn.example.com/.../song.mp3".to_string())
        );
    }

    let second = init_logging(LoggingConfig::default());
    assert!(matches!(second, Err(Error::Config(_))));
}

#[test]
fn test_default_format_matches_build_profile() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Compact);
}
