//! Raw-TCP debug link
//!
//! Manual test channel to a field device (typically a Raspberry Pi on the
//! same LAN), independent of the delivery lifecycle. Outgoing messages are
//! newline-terminated; inbound bytes are surfaced as opaque text lines.
//! Connection establishment is bounded by an explicit timeout so a wrong IP
//! fails in seconds instead of hanging the console.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::debug;

// ----------------------------------------------------------------------------
// Errors
// ----------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DebugLinkError {
    #[error("connection to {address} timed out after {seconds}s")]
    ConnectTimeout { address: String, seconds: u64 },
    #[error("invalid debug target: {reason}")]
    InvalidTarget { reason: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("connection closed by remote")]
    Closed,
}

pub type Result<T> = std::result::Result<T, DebugLinkError>;

// ----------------------------------------------------------------------------
// Debug Link
// ----------------------------------------------------------------------------

/// A connected raw-socket session with a field device.
#[derive(Debug)]
pub struct DebugLink {
    writer: OwnedWriteHalf,
    lines: Lines<BufReader<OwnedReadHalf>>,
    address: String,
}

impl DebugLink {
    /// Connect to `host:port`, aborting after `timeout`. Input validation
    /// happens before any network attempt.
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let host = host.trim();
        if host.is_empty() {
            return Err(DebugLinkError::InvalidTarget {
                reason: "host must not be empty".to_string(),
            });
        }
        if port == 0 {
            return Err(DebugLinkError::InvalidTarget {
                reason: "port must be in 1..=65535".to_string(),
            });
        }

        let address = format!("{}:{}", host, port);
        debug!(%address, "connecting debug link");
        let stream = tokio::time::timeout(timeout, TcpStream::connect(&address))
            .await
            .map_err(|_| DebugLinkError::ConnectTimeout {
                address: address.clone(),
                seconds: timeout.as_secs(),
            })??;

        let (read_half, writer) = stream.into_split();
        Ok(Self {
            writer,
            lines: BufReader::new(read_half).lines(),
            address,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Send one message, newline-terminated. Empty messages are dropped.
    pub async fn send(&mut self, message: &str) -> Result<()> {
        let message = message.trim_end_matches(['\r', '\n']);
        if message.is_empty() {
            return Ok(());
        }
        self.writer.write_all(message.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Wait for the next inbound line. `Err(Closed)` once the remote hangs
    /// up.
    pub async fn recv(&mut self) -> Result<String> {
        match self.lines.next_line().await? {
            Some(line) => Ok(line),
            None => Err(DebugLinkError::Closed),
        }
    }

    /// Shut the write side down; the read side drains on drop.
    pub async fn close(mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }

    /// Split into independent halves so a console can read and write
    /// concurrently.
    pub fn into_split(self) -> (DebugWriter, DebugReader) {
        (
            DebugWriter {
                writer: self.writer,
            },
            DebugReader { lines: self.lines },
        )
    }
}

/// Write half of a split `DebugLink`.
pub struct DebugWriter {
    writer: OwnedWriteHalf,
}

impl DebugWriter {
    /// Send one message, newline-terminated. Empty messages are dropped.
    pub async fn send(&mut self, message: &str) -> Result<()> {
        let message = message.trim_end_matches(['\r', '\n']);
        if message.is_empty() {
            return Ok(());
        }
        self.writer.write_all(message.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    pub async fn close(mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

/// Read half of a split `DebugLink`.
pub struct DebugReader {
    lines: Lines<BufReader<OwnedReadHalf>>,
}

impl DebugReader {
    /// Wait for the next inbound line. `Err(Closed)` once the remote hangs
    /// up.
    pub async fn recv(&mut self) -> Result<String> {
        match self.lines.next_line().await? {
            Some(line) => Ok(line),
            None => Err(DebugLinkError::Closed),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn rejects_invalid_target_before_connecting() {
        let err = DebugLink::connect("", 12345, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DebugLinkError::InvalidTarget { .. }));

        let err = DebugLink::connect("127.0.0.1", 0, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DebugLinkError::InvalidTarget { .. }));
    }

    #[tokio::test]
    async fn sends_newline_terminated_messages() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 64];
            let n = socket.read(&mut buf).await.unwrap();
            String::from_utf8_lossy(&buf[..n]).to_string()
        });

        let mut link = DebugLink::connect("127.0.0.1", addr.port(), Duration::from_secs(5))
            .await
            .unwrap();
        link.send("status").await.unwrap();
        link.close().await.unwrap();

        let received = server.await.unwrap();
        assert_eq!(received, "status\n");
    }

    #[tokio::test]
    async fn receives_lines_and_reports_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"pong\n").await.unwrap();
            socket.shutdown().await.unwrap();
        });

        let mut link = DebugLink::connect("127.0.0.1", addr.port(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(link.recv().await.unwrap(), "pong");
        assert!(matches!(link.recv().await, Err(DebugLinkError::Closed)));
    }

    #[tokio::test]
    async fn split_halves_work_independently() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = socket.into_split();
            let mut lines = BufReader::new(read_half).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                write_half
                    .write_all(format!("echo {}\n", line).as_bytes())
                    .await
                    .unwrap();
            }
        });

        let link = DebugLink::connect("127.0.0.1", addr.port(), Duration::from_secs(5))
            .await
            .unwrap();
        let (mut writer, mut reader) = link.into_split();

        writer.send("ping").await.unwrap();
        assert_eq!(reader.recv().await.unwrap(), "echo ping");
        writer.close().await.unwrap();
    }
}
