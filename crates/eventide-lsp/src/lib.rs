//! eventide-lsp
//!
//! A cooperative, single-threaded JSON-RPC 2.0 dispatcher: it parses framed
//! messages off a [`Transport`], routes requests to asynchronous handlers
//! and notifications to synchronous ones, and serializes replies back out
//! through a FIFO writer task. Requests may suspend and complete out of
//! order; notifications always run inline, in arrival order, before the
//! next message is read — this is what the rest of the crate exists to
//! guarantee.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod protocol;
mod server;
mod transport;

pub use error::LspError;
pub use protocol::{
    build_error_response, build_success_response, parse_incoming_message, IncomingMessage,
    RequestId, INTERNAL_ERROR, METHOD_NOT_FOUND, REQUEST_FAILED,
};
pub use server::LanguageServer;
pub use transport::{StdioTransport, Transport};
