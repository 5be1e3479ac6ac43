// src/wire/mod.rs

//! Messages exchanged with the background service and the socket transport
//! that carries them.
//!
//! - [`message`] defines the `attempt` / `heart` / `exitcode` lines.
//! - [`transport`] opens a client connection, writes one message, waits for
//!   the acknowledgement and closes.

pub mod message;
pub mod transport;

pub use message::{
    Attempt, ExitCode, Heartbeat, MAX_MESSAGE_LEN, Message, WireError, WireMessage,
};
pub use transport::{ACK_BUFFER_LEN, DEFAULT_TIMEOUT, Transport, TransportError};
