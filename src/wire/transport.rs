// src/wire/transport.rs

//! Client side of the service socket.
//!
//! One connection carries exactly one message:
//!
//! 1. dial the socket (Unix domain socket, or a named pipe on Windows),
//! 2. write the encoded message in a single write,
//! 3. read up to [`ACK_BUFFER_LEN`] bytes of acknowledgement,
//! 4. close.
//!
//! The acknowledgement content is ignored; waiting for it only keeps us from
//! closing before the service has read the message. Every step runs under
//! the same deadline so an unreachable service cannot hold up a command.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::debug;

use super::message::{WireError, WireMessage};

/// Size of the buffer used to read the service acknowledgement.
pub const ACK_BUFFER_LEN: usize = 1024;

/// Deadline applied to each of dial, write and read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("could not dial service socket {path:?}: {source}")]
    Dial { path: PathBuf, source: io::Error },

    #[error("could not write message to service socket {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("could not read acknowledgement from service socket {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("could not encode message for service socket {path:?}: {source}")]
    Encode { path: PathBuf, source: WireError },
}

/// Sends single messages to the background service.
#[derive(Debug, Clone)]
pub struct Transport {
    socket_path: PathBuf,
    timeout: Duration,
}

impl Transport {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Deliver `msg` and wait for the acknowledgement.
    ///
    /// Returns the number of acknowledgement bytes received (zero when the
    /// service closed without answering).
    pub async fn send<M>(&self, msg: &M) -> Result<usize, TransportError>
    where
        M: WireMessage + ?Sized,
    {
        let line = msg.to_line().map_err(|source| TransportError::Encode {
            path: self.socket_path.clone(),
            source,
        })?;

        debug!(
            socket = %self.socket_path.display(),
            tag = msg.tag(),
            "sending message to service"
        );

        let stream = self.dial().await?;
        self.exchange(stream, line.as_bytes()).await
    }

    #[cfg(unix)]
    async fn dial(&self) -> Result<tokio::net::UnixStream, TransportError> {
        let connect = tokio::net::UnixStream::connect(&self.socket_path);
        with_deadline(self.timeout, connect)
            .await
            .map_err(|source| TransportError::Dial {
                path: self.socket_path.clone(),
                source,
            })
    }

    #[cfg(windows)]
    async fn dial(
        &self,
    ) -> Result<tokio::net::windows::named_pipe::NamedPipeClient, TransportError> {
        use tokio::net::windows::named_pipe::ClientOptions;

        let path = self.socket_path.clone();
        let connect = async move { ClientOptions::new().open(&path) };
        with_deadline(self.timeout, connect)
            .await
            .map_err(|source| TransportError::Dial {
                path: self.socket_path.clone(),
                source,
            })
    }

    async fn exchange<S>(&self, mut stream: S, payload: &[u8]) -> Result<usize, TransportError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        with_deadline(self.timeout, async {
            stream.write_all(payload).await?;
            stream.flush().await
        })
        .await
        .map_err(|source| TransportError::Write {
            path: self.socket_path.clone(),
            source,
        })?;

        let mut ack = [0u8; ACK_BUFFER_LEN];
        let n = with_deadline(self.timeout, stream.read(&mut ack))
            .await
            .map_err(|source| TransportError::Read {
                path: self.socket_path.clone(),
                source,
            })?;

        debug!(
            socket = %self.socket_path.display(),
            ack_len = n,
            "service acknowledged message"
        );

        // Best effort: the service may already have hung up.
        let _ = stream.shutdown().await;
        Ok(n)
    }
}

/// Run `fut`, turning an elapsed deadline into `io::ErrorKind::TimedOut`.
async fn with_deadline<T, F>(limit: Duration, fut: F) -> io::Result<T>
where
    F: std::future::Future<Output = io::Result<T>>,
{
    match timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("no response within {} ms", limit.as_millis()),
        )),
    }
}
