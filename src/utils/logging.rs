//! Console and JSON-file tracing layers

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE_PREFIX: &str = "spread-settle-bot.jsonl";
const DEFAULT_FILTER: &str = "info";

/// Flushes the file writer when dropped; hold it for the life of `main`.
pub struct LoggingGuard {
    _file_writer: WorkerGuard,
}

pub fn log_dir(output_root: &Path) -> PathBuf {
    output_root.join(LOG_DIR)
}

/// Human-readable console output, plus one JSON object per event under
/// `<output_root>/logs`, rotated daily like the journals. Event fields such
/// as `opportunity_id` and `tx` become top-level keys in the file.
pub fn setup_logging(output_root: &Path) -> Result<LoggingGuard> {
    let dir = log_dir(output_root);
    std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(true)
                .with_level(true),
        )
        .with(json_layer(non_blocking))
        .with(env_filter())
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LoggingGuard { _file_writer: guard })
}

/// One flat JSON object per event.
pub fn json_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_target(true)
        .with_ansi(false)
        .with_writer(writer)
}

/// `RUST_LOG` when set and valid, otherwise `info`.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn file_lines_carry_event_fields_as_keys() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::registry().with(json_layer(move || writer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(opportunity_id = "opp-7", exposure = 1000, "Unresolved trade");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let line: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(line["level"], "WARN");
        assert_eq!(line["message"], "Unresolved trade");
        assert_eq!(line["opportunity_id"], "opp-7");
        assert_eq!(line["exposure"], 1000);
    }

    #[test]
    fn logs_live_beside_the_journals() {
        assert_eq!(log_dir(Path::new("output")), PathBuf::from("output/logs"));
    }
}
