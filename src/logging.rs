//! Structured logging for carthage-cache
//!
//! Progress lines go to stdout so they read like the rest of a CI build log.
//! Events carry structured fields for filtering:
//!
//! - `operation`: which phase emitted the event ("check", "invoke", "copy")
//! - `status`: the result ("run", "skip", "success", "error")
//! - `reason`: why carthage has to run (check phase only)
//!
//! # Examples
//!
//! ```rust
//! use carthage_cache::logging::{operations, status};
//! use tracing::info;
//!
//! info!(
//!     operation = operations::CHECK,
//!     status = status::SKIP,
//!     "manifest unchanged"
//! );
//! ```

use std::{fmt as std_fmt, io};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{
    fmt::{self, format::Writer},
    prelude::*,
    EnvFilter,
};

/// Shows "carthage-cache" instead of the full module path
struct StepFormatter {
    with_ansi: bool,
}

impl<S, N> FormatEvent<S, N> for StepFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std_fmt::Result {
        let meta = event.metadata();

        write!(
            writer,
            "{} ",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ")
        )?;

        if self.with_ansi {
            let level_style = match *meta.level() {
                tracing::Level::ERROR => "\x1b[31m", // Red
                tracing::Level::WARN => "\x1b[33m",  // Yellow
                tracing::Level::INFO => "\x1b[32m",  // Green
                tracing::Level::DEBUG => "\x1b[34m", // Blue
                tracing::Level::TRACE => "\x1b[35m", // Magenta
            };
            write!(
                writer,
                "{}{:5}(carthage-cache)\x1b[0m: ",
                level_style,
                meta.level()
            )?;
        } else {
            write!(writer, "{:5}(carthage-cache): ", meta.level())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Coloured, for local runs
    Pretty,
    /// Plain text, for CI
    Compact,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Read `CARTHAGE_CACHE_LOG_FORMAT`, falling back on whether `CI` is set
    pub fn from_env() -> Self {
        Self::parse(
            std::env::var("CARTHAGE_CACHE_LOG_FORMAT").ok().as_deref(),
            std::env::var("CI").is_ok(),
        )
    }

    fn parse(value: Option<&str>, ci: bool) -> Self {
        match value.unwrap_or_default().to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            "pretty" => Self::Pretty,
            _ if ci => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Initialize the global tracing subscriber
///
/// # Environment Variables
///
/// - `RUST_LOG`: log filter (default "info")
/// - `CARTHAGE_CACHE_LOG_FORMAT`: "pretty", "compact" or "json"
/// - `CI`: if set, defaults to compact format
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match LogFormat::from_env() {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .event_format(StepFormatter { with_ansi: true })
                        .with_writer(io::stdout),
                )
                .init();
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .event_format(StepFormatter { with_ansi: false })
                        .with_writer(io::stdout),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_file(false)
                        .with_line_number(false)
                        .with_ansi(false)
                        .with_writer(io::stdout)
                        .json(),
                )
                .init();
        }
    }
}

/// Operation names for the `operation` field
pub mod operations {
    pub const CHECK: &str = "check";
    pub const INVOKE: &str = "invoke";
    pub const COPY: &str = "copy";
}

/// Status values for the `status` field
pub mod status {
    pub const RUN: &str = "run";
    pub const SKIP: &str = "skip";
    pub const SUCCESS: &str = "success";
    pub const ERROR: &str = "error";
}
