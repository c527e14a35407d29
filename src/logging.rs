//! Process-wide tracing setup.
//!
//! Log lines go to stderr through a reloadable `EnvFilter` so JSON and short
//! output can drop everything below ERROR once the mode is known.

use std::env;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

/// Explicit filter directive, e.g. `GEMINI_USAGE_LOG=gemini_usage=trace`.
const LOG_FILTER_ENV: &str = "GEMINI_USAGE_LOG";

/// Returns true if debug logging is enabled via GEMINI_USAGE_DEBUG=1
pub fn is_debug_enabled() -> bool {
    env::var("GEMINI_USAGE_DEBUG")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

fn default_directive() -> &'static str {
    if is_debug_enabled() {
        "debug"
    } else {
        "info"
    }
}

/// Handle on the installed log filter.
#[derive(Clone)]
pub struct LogControl {
    handle: reload::Handle<EnvFilter, Registry>,
}

impl LogControl {
    /// Drops every level below ERROR for the rest of the process.
    pub fn silence(&self) {
        if let Err(e) = self.handle.reload(EnvFilter::new("error")) {
            eprintln!("[gemini-usage] Failed to silence logging: {}", e);
        }
    }
}

/// Builds the subscriber and a handle on its filter. Events are written to `writer`.
fn build<W>(filter: EnvFilter, writer: W) -> (impl Subscriber + Send + Sync, LogControl)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let (filter_layer, handle) = reload::Layer::new(filter);
    let subscriber = tracing_subscriber::registry().with(filter_layer).with(
        fmt::layer()
            .with_writer(writer)
            .with_target(false)
            .without_time(),
    );
    (subscriber, LogControl { handle })
}

/// Installs the global subscriber. Returns None if one is already installed.
pub fn init() -> Option<LogControl> {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive()));
    let (subscriber, control) = build(filter, std::io::stderr);
    tracing::subscriber::set_global_default(subscriber).ok()?;
    Some(control)
}
