//! Line-oriented client transport.

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Framed, LinesCodec};
use tokio_util::sync::CancellationToken;

use super::error::SessionError;
use crate::portal::Reply;

/// Longest line accepted from a client, in bytes.
pub const MAX_LINE_LENGTH: usize = 1024;

/// Newline-delimited UTF-8 text over a byte stream.
///
/// Reads observe the session's cancellation token, so a session blocked on
/// client input stops as soon as the server shuts down. Writes are never
/// interrupted.
pub struct LineChannel<T> {
    framed: Framed<T, LinesCodec>,
    cancel: CancellationToken,
}

impl<T> LineChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(io: T, cancel: CancellationToken) -> Self {
        Self {
            framed: Framed::new(io, LinesCodec::new_with_max_length(MAX_LINE_LENGTH)),
            cancel,
        }
    }

    /// Sends `text`, one frame per line.
    pub async fn send(&mut self, text: &str) -> Result<(), SessionError> {
        for line in text.lines() {
            self.framed.feed(line).await?;
        }
        SinkExt::<&str>::flush(&mut self.framed).await?;
        Ok(())
    }

    pub async fn send_reply(&mut self, reply: &Reply) -> Result<(), SessionError> {
        self.send(&reply.message).await
    }

    /// Reads the next line, without its terminator.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Disconnected` at end of stream and
    /// `SessionError::Cancelled` once the session token fires.
    pub async fn read_line(&mut self) -> Result<String, SessionError> {
        tokio::select! {
            next = self.framed.next() => match next {
                Some(Ok(line)) => Ok(line.trim_end_matches('\r').to_string()),
                Some(Err(e)) => Err(e.into()),
                None => Err(SessionError::Disconnected),
            },
            _ = self.cancel.cancelled() => Err(SessionError::Cancelled),
        }
    }

    /// Sends `text` and waits for the answer.
    pub async fn prompt(&mut self, text: &str) -> Result<String, SessionError> {
        self.send(text).await?;
        self.read_line().await
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

    use super::*;

    #[tokio::test]
    async fn test_send_splits_lines() {
        let (server, mut client) = duplex(1024);
        let mut channel = LineChannel::new(server, CancellationToken::new());

        channel.send("\n=== Title ===\nbody\n").await.unwrap();
        drop(channel);

        let mut received = String::new();
        client.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "\n=== Title ===\nbody\n");
    }

    #[tokio::test]
    async fn test_read_line_strips_crlf() {
        let (server, mut client) = duplex(1024);
        let mut channel = LineChannel::new(server, CancellationToken::new());

        client.write_all(b"alice\r\n").await.unwrap();
        assert_eq!(channel.read_line().await.unwrap(), "alice");
    }

    #[tokio::test]
    async fn test_read_line_disconnected() {
        let (server, client) = duplex(1024);
        let mut channel = LineChannel::new(server, CancellationToken::new());
        drop(client);

        assert!(matches!(
            channel.read_line().await,
            Err(SessionError::Disconnected)
        ));
    }

    #[tokio::test]
    async fn test_read_line_cancelled() {
        let (server, _client) = duplex(1024);
        let token = CancellationToken::new();
        let mut channel = LineChannel::new(server, token.clone());

        token.cancel();
        assert!(matches!(
            channel.read_line().await,
            Err(SessionError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn test_overlong_line_rejected() {
        let (server, mut client) = duplex(4096);
        let mut channel = LineChannel::new(server, CancellationToken::new());

        let long = "x".repeat(MAX_LINE_LENGTH + 1);
        client.write_all(long.as_bytes()).await.unwrap();
        client.write_all(b"\n").await.unwrap();
        assert!(matches!(
            channel.read_line().await,
            Err(SessionError::Codec(_))
        ));
    }
}
