//! Log output formats.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Format logs are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// `[LEVEL file:func:line] message key=value`
    #[default]
    Text,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" => Ok(LogFormat::Text),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Human readable event formatter.
///
/// Renders `[LEVEL file:func:line] message key=value ...`. `file` is the
/// source file name without directories; `func` is the innermost span the
/// event was recorded in, or the module path outside of any span.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormat;

impl<S, N> FormatEvent<S, N> for TextFormat
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
        let file = meta
            .file()
            .and_then(|f| Path::new(f).file_name())
            .and_then(|f| f.to_str())
            .unwrap_or("?");
        let line = meta.line().unwrap_or(0);

        write!(writer, "[{} {}:", meta.level(), file)?;
        match ctx.lookup_current() {
            Some(span) => write!(writer, "{}", span.name())?,
            None => write!(writer, "{}", meta.module_path().unwrap_or_else(|| meta.target()))?,
        }
        write!(writer, ":{}] ", line)?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SharedBuffer;
    use tracing_subscriber::layer::SubscriberExt;

    fn render<F: FnOnce()>(f: F) -> String {
        let buffer = SharedBuffer::new();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .event_format(TextFormat)
                .with_ansi(false)
                .with_writer(buffer.clone()),
        );
        tracing::subscriber::with_default(subscriber, f);
        buffer.contents()
    }

    #[test]
    fn test_text_line_layout() {
        let output = render(|| tracing::warn!(attempt = 3, "something odd"));
        let expected_prefix = format!("[WARN format.rs:{}:", module_path!());
        assert!(output.starts_with(&expected_prefix), "got: {output}");
        assert!(output.contains("] something odd attempt=3"), "got: {output}");
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn test_span_name_is_used_as_function() {
        let output = render(|| {
            let span = tracing::info_span!("handle_job");
            let _enter = span.enter();
            tracing::info!("inside");
        });
        assert!(output.starts_with("[INFO format.rs:handle_job:"), "got: {output}");
    }

    #[test]
    fn test_parse_log_format() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("yaml".parse::<LogFormat>().is_err());
    }
}
