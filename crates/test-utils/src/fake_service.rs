use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use execshim::wire::{ACK_BUFFER_LEN, Message};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixListener;
use tokio::task::JoinHandle;

/// A stand-in for the background service:
/// - records every message line it receives
/// - answers each connection with a short acknowledgement (unless silent).
pub struct FakeService {
    socket_path: PathBuf,
    received: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl FakeService {
    /// Listen on `socket_path` and acknowledge every message.
    pub async fn start(socket_path: impl AsRef<Path>) -> io::Result<Self> {
        Self::spawn(socket_path.as_ref(), true)
    }

    /// Listen on `socket_path` but never acknowledge, holding connections open.
    pub async fn start_silent(socket_path: impl AsRef<Path>) -> io::Result<Self> {
        Self::spawn(socket_path.as_ref(), false)
    }

    fn spawn(socket_path: &Path, ack: bool) -> io::Result<Self> {
        let listener = UnixListener::bind(socket_path)?;
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);

        let handle = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((mut stream, _addr)) = listener.accept().await {
                let mut buf = [0u8; ACK_BUFFER_LEN];
                let n = stream.read(&mut buf).await.unwrap_or(0);
                let line = String::from_utf8_lossy(&buf[..n]).into_owned();
                sink.lock().unwrap().push(line);

                if ack {
                    let _ = stream.write_all(b"ok").await;
                    let _ = stream.shutdown().await;
                } else {
                    held.push(stream);
                }
            }
        });

        Ok(Self {
            socket_path: socket_path.to_path_buf(),
            received,
            handle,
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Raw lines received so far.
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    /// Received lines parsed as messages; unparseable lines are skipped.
    pub fn messages(&self) -> Vec<Message> {
        self.received()
            .iter()
            .filter_map(|l| Message::parse(l).ok())
            .collect()
    }

    /// Poll until at least `count` lines arrived or two seconds passed.
    pub async fn wait_for(&self, count: usize) -> Vec<String> {
        for _ in 0..200 {
            let got = self.received();
            if got.len() >= count {
                return got;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.received()
    }
}

impl Drop for FakeService {
    fn drop(&mut self) {
        self.handle.abort();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}
