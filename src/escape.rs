// src/escape.rs

//! Windows command-line quoting.
//!
//! `CreateProcess` takes one command-line string, not an argument vector, so
//! the executor has to build that string itself. The standard library's
//! quoting leaves cmd metacharacters (`<>&|^!()%`) bare, which lets an
//! argument change the meaning of the command line once a `.bat` target is
//! involved, so every argument goes through [`quote_arg`] instead.
//!
//! Rules, per argument:
//! - nothing special: passed through unchanged
//! - whitespace or metacharacters only: wrapped in double quotes
//! - backslashes or quotes: wrapped in double quotes, each run of
//!   backslashes in front of a quote (including the closing one) doubled,
//!   and each literal quote escaped with a backslash
//!
//! The result re-tokenizes to the original arguments under the
//! `CommandLineToArgvW` rules.

use std::borrow::Cow;
use std::ffi::OsString;

use crate::errors::{ExecshimError, Result};

const METACHARACTERS: &[char] = &['<', '>', '&', '|', '^', '!', '(', ')', '%'];

fn needs_quoting(c: char) -> bool {
    c.is_whitespace() || c == '"' || c == '\\' || METACHARACTERS.contains(&c)
}

/// Quote a single argument.
pub fn quote_arg(arg: &str) -> Cow<'_, str> {
    if !arg.is_empty() && !arg.chars().any(needs_quoting) {
        return Cow::Borrowed(arg);
    }

    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');

    let mut backslashes = 0usize;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                push_backslashes(&mut out, backslashes * 2 + 1);
                out.push('"');
                backslashes = 0;
            }
            _ => {
                push_backslashes(&mut out, backslashes);
                backslashes = 0;
                out.push(c);
            }
        }
    }

    // Backslashes right before the closing quote would escape it.
    push_backslashes(&mut out, backslashes * 2);
    out.push('"');
    Cow::Owned(out)
}

fn push_backslashes(out: &mut String, n: usize) {
    out.extend(std::iter::repeat_n('\\', n));
}

/// Quote every argument and join them with single spaces.
pub fn quote<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|a| quote_arg(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// [`quote`] for arguments straight from the OS.
///
/// Arguments that are not valid unicode cannot be represented in the
/// command-line string and fail the call.
pub fn quote_os(args: &[OsString]) -> Result<String> {
    let args = args
        .iter()
        .enumerate()
        .map(|(i, a)| {
            a.to_str().ok_or_else(|| {
                ExecshimError::Encoding(format!("argument {i} is not valid unicode: {a:?}"))
            })
        })
        .collect::<Result<Vec<&str>>>()?;
    Ok(quote(&args))
}
