//! Log output setup.
//!
//! Lines are written as `<timestamp> - <target> - <LEVEL> - <message>`, e.g.
//!
//! ```text
//! 2024-05-01 12:00:00,123 - fks_futures::service - INFO - FKS Futures Trading Service started successfully
//! ```

use std::fmt;

use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{prelude::*, EnvFilter};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Event formatter for the service's plain-text log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceLogFormat;

impl<S, N> FormatEvent<S, N> for ServiceLogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        write!(
            writer,
            "{} - {} - {} - ",
            Local::now().format(TIMESTAMP_FORMAT),
            meta.target(),
            level_name(meta.level())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Level label as printed in log lines. Warnings read `WARNING`.
fn level_name(level: &Level) -> &'static str {
    match level.as_str() {
        "WARN" => "WARNING",
        other => other,
    }
}

/// Build the level filter: `--verbose` wins, then `RUST_LOG`, then `fallback`.
pub fn filter(verbose: bool, fallback: &str) -> EnvFilter {
    if verbose {
        EnvFilter::new("fks_futures=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    }
}

/// Install the global subscriber.
pub fn init(filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .event_format(ServiceLogFormat),
        )
        .with(filter)
        .init();
}

/// Run `f` with a scoped subscriber and return everything it logged.
#[cfg(test)]
pub(crate) fn capture_logs<F: FnOnce()>(f: F) -> String {
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let buffer = Buffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .event_format(ServiceLogFormat)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}
