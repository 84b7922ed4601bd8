//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! Behavior:
//! - LOG_LEVEL controls the filter (e.g. "debug" or detailed directives like
//!   "info,quiz=debug,aptt_backend=debug,tower_http=info,axum=info").
//! - LOG_FORMAT selects "pretty" (default) or "json" structured logs.
//!
//! The server logs to stdout. The offline tools log to stderr so their
//! stdout stays a clean report.

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

const SERVER_FILTER: &str = "info,quiz=debug,aptt_backend=debug,tower_http=info,axum=info";
const CLI_FILTER: &str = "warn,generator=info,aptt_backend=info";

pub fn init_tracing() {
    init(SERVER_FILTER, BoxMakeWriter::new(std::io::stdout));
}

pub fn init_cli_tracing() {
    init(CLI_FILTER, BoxMakeWriter::new(std::io::stderr));
}

fn init(default_filter: &str, writer: BoxMakeWriter) {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(default_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // Choose JSON vs pretty; don't try to store different layer types.
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => {
            builder.json().init();
        }
        _ => {
            builder.init();
        }
    }
}
