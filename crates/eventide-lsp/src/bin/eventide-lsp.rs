//! Reference stdio entry point.
//!
//! Starts a dispatcher over [`StdioTransport`] with a single `ping` request
//! handler and a `$/log` notification handler, mostly to prove the wiring
//! rather than to serve as a real language server. Set `RUST_LOG=debug` for
//! per-message tracing.

#![deny(unsafe_code)]

use eventide_lsp::{LanguageServer, StdioTransport};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("eventide=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let transport = StdioTransport::open_stdio();
    let mut server = match LanguageServer::new(transport) {
        Ok(server) => server,
        Err(err) => {
            tracing::error!(target: "eventide.lsp", %err, "failed to start dispatcher");
            std::process::exit(1);
        }
    };

    server.register_request_handler("ping", |_params: Value| async move { Ok(json!("pong")) });
    server.register_notification_handler("$/log", |params: Value| {
        tracing::info!(target: "eventide.lsp", ?params, "client log");
    });

    std::process::exit(server.start());
}
