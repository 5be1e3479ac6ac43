// src/wire/message.rs

//! Lifecycle messages reported to the background service.
//!
//! Every message is one line: a type tag followed by its fields, all joined
//! with `<`. That character cannot appear in a Windows path, so fields are
//! never escaped. Parsing splits with a bound equal to the number of parts,
//! so the last field (usually a path) is never split again.
//!
//! ```text
//! attempt<{exec_path}
//! heart<{process_id}<{exec_path}
//! exitcode<{exec_path}<{exit_code}
//! ```
//!
//! Parsing a specific variant never fails: missing trailing fields come back
//! empty. Only [`Message::parse`] can fail, and only when the tag is missing
//! or unknown.

use thiserror::Error;

pub const DELIMITER: char = '<';

/// Upper bound for one encoded message, matching the service's read buffer.
pub const MAX_MESSAGE_LEN: usize = 1024;

const ATTEMPT_TAG: &str = "attempt";
const HEARTBEAT_TAG: &str = "heart";
const EXIT_CODE_TAG: &str = "exitcode";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("message has no type tag")]
    MissingTag,

    #[error("unknown message type '{0}'")]
    UnknownTag(String),

    #[error("encoded {tag} message is {len} bytes, limit is {MAX_MESSAGE_LEN}")]
    TooLong { tag: &'static str, len: usize },

    #[error("field {index} of {tag} message cannot contain {what}")]
    InvalidField {
        tag: &'static str,
        index: usize,
        what: &'static str,
    },
}

/// Anything that can be sent to the background service.
pub trait WireMessage {
    fn tag(&self) -> &'static str;

    /// Fields in wire order.
    fn fields(&self) -> Vec<&str>;

    /// Tag and fields joined with the delimiter.
    fn encode(&self) -> String {
        let mut out = String::from(self.tag());
        for field in self.fields() {
            out.push(DELIMITER);
            out.push_str(field);
        }
        out
    }

    /// Encode and check the result is a single line within
    /// [`MAX_MESSAGE_LEN`] that parses back into the same fields.
    fn to_line(&self) -> Result<String, WireError> {
        let tag = self.tag();
        let fields = self.fields();
        let last = fields.len().saturating_sub(1);

        for (index, field) in fields.iter().enumerate() {
            if field.contains(['\n', '\r']) {
                return Err(WireError::InvalidField {
                    tag,
                    index,
                    what: "a line break",
                });
            }
            if index < last && field.contains(DELIMITER) {
                return Err(WireError::InvalidField {
                    tag,
                    index,
                    what: "the '<' delimiter",
                });
            }
        }

        let line = self.encode();
        if line.len() > MAX_MESSAGE_LEN {
            return Err(WireError::TooLong {
                tag,
                len: line.len(),
            });
        }
        Ok(line)
    }
}

/// Split `msg` into exactly `parts` pieces, padding with empty strings.
fn split_fields(msg: &str, parts: usize) -> Vec<String> {
    let mut out: Vec<String> = msg.splitn(parts, DELIMITER).map(str::to_string).collect();
    out.resize(parts, String::new());
    out
}

/// Reported when an executor is about to be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attempt {
    pub exec_path: String,
}

impl Attempt {
    pub fn new(exec_path: impl Into<String>) -> Self {
        Self {
            exec_path: exec_path.into(),
        }
    }

    pub fn parse(msg: &str) -> Self {
        let mut f = split_fields(msg, 2);
        Self {
            exec_path: std::mem::take(&mut f[1]),
        }
    }
}

impl WireMessage for Attempt {
    fn tag(&self) -> &'static str {
        ATTEMPT_TAG
    }

    fn fields(&self) -> Vec<&str> {
        vec![self.exec_path.as_str()]
    }
}

/// Reported once per executor invocation, before the target runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Heartbeat {
    pub process_id: String,
    pub exec_path: String,
}

impl Heartbeat {
    pub fn new(process_id: u32, exec_path: impl Into<String>) -> Self {
        Self {
            process_id: process_id.to_string(),
            exec_path: exec_path.into(),
        }
    }

    pub fn parse(msg: &str) -> Self {
        let mut f = split_fields(msg, 3);
        Self {
            process_id: std::mem::take(&mut f[1]),
            exec_path: std::mem::take(&mut f[2]),
        }
    }
}

impl WireMessage for Heartbeat {
    fn tag(&self) -> &'static str {
        HEARTBEAT_TAG
    }

    fn fields(&self) -> Vec<&str> {
        vec![self.process_id.as_str(), self.exec_path.as_str()]
    }
}

/// Reported after the target exits, when the activation opted in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExitCode {
    pub exec_path: String,
    pub exit_code: String,
}

impl ExitCode {
    pub fn new(exec_path: impl Into<String>, exit_code: i32) -> Self {
        Self {
            exec_path: exec_path.into(),
            exit_code: exit_code.to_string(),
        }
    }

    pub fn parse(msg: &str) -> Self {
        let mut f = split_fields(msg, 3);
        Self {
            exec_path: std::mem::take(&mut f[1]),
            exit_code: std::mem::take(&mut f[2]),
        }
    }
}

impl WireMessage for ExitCode {
    fn tag(&self) -> &'static str {
        EXIT_CODE_TAG
    }

    fn fields(&self) -> Vec<&str> {
        vec![self.exec_path.as_str(), self.exit_code.as_str()]
    }
}

/// Any message the service understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Attempt(Attempt),
    Heartbeat(Heartbeat),
    ExitCode(ExitCode),
}

impl Message {
    /// Dispatch on the type tag. Fields are parsed leniently.
    pub fn parse(msg: &str) -> Result<Self, WireError> {
        let msg = msg.trim_end_matches(['\n', '\r', '\0']);
        let tag = msg.split(DELIMITER).next().unwrap_or_default();

        match tag {
            "" => Err(WireError::MissingTag),
            ATTEMPT_TAG => Ok(Message::Attempt(Attempt::parse(msg))),
            HEARTBEAT_TAG => Ok(Message::Heartbeat(Heartbeat::parse(msg))),
            EXIT_CODE_TAG => Ok(Message::ExitCode(ExitCode::parse(msg))),
            other => Err(WireError::UnknownTag(other.to_string())),
        }
    }

    fn inner(&self) -> &dyn WireMessage {
        match self {
            Message::Attempt(m) => m,
            Message::Heartbeat(m) => m,
            Message::ExitCode(m) => m,
        }
    }
}

impl WireMessage for Message {
    fn tag(&self) -> &'static str {
        self.inner().tag()
    }

    fn fields(&self) -> Vec<&str> {
        self.inner().fields()
    }
}

impl From<Attempt> for Message {
    fn from(m: Attempt) -> Self {
        Message::Attempt(m)
    }
}

impl From<Heartbeat> for Message {
    fn from(m: Heartbeat) -> Self {
        Message::Heartbeat(m)
    }
}

impl From<ExitCode> for Message {
    fn from(m: ExitCode) -> Self {
        Message::ExitCode(m)
    }
}
