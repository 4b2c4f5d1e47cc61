//! The byte-transport boundary the dispatcher reads framed messages from
//! and writes replies to, plus a reference `Content-Length`-framed
//! implementation over standard streams.
//!
//! The dispatcher's contract is expressed entirely against [`Transport`];
//! [`StdioTransport`] exists for completeness and is exercised by its own
//! tests, but nothing in [`crate::server`] depends on it specifically.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// A framed byte transport carrying JSON-RPC payloads.
///
/// `?Send`: the dispatcher is strictly single-threaded, so implementations
/// are free to hold `!Send` state (e.g. `Rc`-rooted buffers).
#[async_trait(?Send)]
pub trait Transport {
    /// Resolve to the next complete message payload, or `None` on clean EOF.
    async fn read_message(&mut self) -> Option<String>;

    /// Write one message payload. Resolves `false` on any transport failure.
    async fn write_message(&mut self, payload: &str) -> bool;
}

/// A reference [`Transport`] over `Content-Length: <n>\r\n\r\n<n bytes>`
/// framing, the wire format LSP-style servers use over stdio.
pub struct StdioTransport<R, W> {
    reader: BufReader<R>,
    writer: W,
}

impl<R: AsyncRead + Unpin, W: AsyncWrite + Unpin> StdioTransport<R, W> {
    /// Wrap an already-open reader/writer pair.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }
}

impl StdioTransport<tokio::io::Stdin, tokio::io::Stdout> {
    /// Open the process's standard streams as a transport.
    #[must_use]
    pub fn open_stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

#[async_trait(?Send)]
impl<R: AsyncRead + Unpin, W: AsyncWrite + Unpin> Transport for StdioTransport<R, W> {
    async fn read_message(&mut self) -> Option<String> {
        let mut content_length: Option<usize> = None;
        loop {
            let mut header = String::new();
            let bytes_read = self.reader.read_line(&mut header).await.ok()?;
            if bytes_read == 0 {
                return None;
            }
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some(value) = header.strip_prefix("Content-Length:") {
                content_length = value.trim().parse().ok();
            }
        }

        let content_length = content_length?;
        let mut buf = vec![0u8; content_length];
        tokio::io::AsyncReadExt::read_exact(&mut self.reader, &mut buf)
            .await
            .ok()?;
        String::from_utf8(buf).ok()
    }

    async fn write_message(&mut self, payload: &str) -> bool {
        let framed = format!("Content-Length: {}\r\n\r\n{}", payload.len(), payload);
        self.writer.write_all(framed.as_bytes()).await.is_ok() && self.writer.flush().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn reads_one_framed_message() {
        let payload = r#"{"jsonrpc":"2.0","method":"ping"}"#;
        let framed = format!("Content-Length: {}\r\n\r\n{}", payload.len(), payload);
        let mut transport = StdioTransport::new(Cursor::new(framed.into_bytes()), Vec::new());
        let message = transport.read_message().await;
        assert_eq!(message.as_deref(), Some(payload));
    }

    #[tokio::test]
    async fn read_at_eof_returns_none() {
        let mut transport = StdioTransport::new(Cursor::new(Vec::new()), Vec::new());
        assert_eq!(transport.read_message().await, None);
    }

    #[tokio::test]
    async fn write_message_frames_with_content_length() {
        let mut out = Vec::new();
        {
            let mut transport = StdioTransport::new(Cursor::new(Vec::new()), &mut out);
            assert!(transport.write_message("{}").await);
        }
        let written = String::from_utf8(out).unwrap();
        assert_eq!(written, "Content-Length: 2\r\n\r\n{}");
    }

    #[tokio::test]
    async fn round_trips_two_messages_in_order() {
        let first = r#"{"jsonrpc":"2.0","method":"a"}"#;
        let second = r#"{"jsonrpc":"2.0","method":"b"}"#;
        let framed = format!(
            "Content-Length: {}\r\n\r\n{}Content-Length: {}\r\n\r\n{}",
            first.len(),
            first,
            second.len(),
            second
        );
        let mut transport = StdioTransport::new(Cursor::new(framed.into_bytes()), Vec::new());
        assert_eq!(transport.read_message().await.as_deref(), Some(first));
        assert_eq!(transport.read_message().await.as_deref(), Some(second));
        assert_eq!(transport.read_message().await, None);
    }
}
