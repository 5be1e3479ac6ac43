// src/generator/template.rs

//! Executor file contents.
//!
//! An executor is a tiny script that hands control to the `execshim-exec`
//! binary, passing its own path first so the binary can find the metadata
//! file and pick the matching target. The socket path, target and
//! environment overrides are written as comments next to the ownership
//! markers; the binary itself reads them from the metadata file.

use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::{ExecshimError, Result};
use crate::platform::Platform;

use super::ownership::{EXECUTOR_DENOTER, target_line};

/// Everything an executor embeds.
#[derive(Debug, Clone)]
pub struct TemplateParams<'a> {
    pub executor: &'a Path,
    pub socket_path: &'a str,
    pub target: &'a Path,
    pub env: &'a BTreeMap<String, String>,
}

pub fn render(params: &TemplateParams<'_>, platform: Platform) -> Result<String> {
    let target = single_line("target", &params.target.to_string_lossy())?;
    let socket = single_line("socket path", params.socket_path)?;
    let executor = single_line("executor path", &params.executor.to_string_lossy())?;

    let comment = match platform {
        Platform::Posix => "#",
        Platform::Windows => "REM",
    };

    let mut header = Vec::new();
    header.push(format!("{comment} {EXECUTOR_DENOTER}"));
    header.push(format!("{comment} {}", target_line(&target)));
    header.push(format!("{comment} Socket: {socket}"));
    for (key, value) in params.env {
        header.push(format!(
            "{comment} Env: {}={}",
            flatten(key),
            flatten(value)
        ));
    }

    let out = match platform {
        Platform::Posix => format!(
            "#!/bin/sh\n{}\nexec {} \"$0\" \"$@\"\n",
            header.join("\n"),
            sh_quote(&executor)
        ),
        Platform::Windows => format!(
            "@ECHO OFF\r\n{}\r\n\"{}\" \"%~f0\" %*\r\nEXIT /B %ERRORLEVEL%\r\n",
            header.join("\r\n"),
            batch_escape(&executor)
        ),
    };
    Ok(out)
}

/// A target or path split across lines would hide the ownership markers.
fn single_line(what: &str, value: &str) -> Result<String> {
    if value.contains(['\n', '\r']) {
        return Err(ExecshimError::Encoding(format!(
            "{what} contains a line break: {value:?}"
        )));
    }
    Ok(value.to_string())
}

fn flatten(s: &str) -> String {
    s.replace('\r', "\\r").replace('\n', "\\n")
}

/// cmd expands `%VAR%` even inside double quotes.
fn batch_escape(s: &str) -> String {
    s.replace('%', "%%")
}

fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
