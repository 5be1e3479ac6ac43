// src/bin/execshim-exec.rs

//! Executor entry point.
//!
//! Invoked by every generated executor as
//! `execshim-exec <executor-path> [args...]`; everything after the executor
//! path belongs to the target and is passed on untouched.

use std::ffi::OsString;
use std::path::PathBuf;

use execshim::errors::ExecshimError;
use execshim::logging;
use execshim::runtime::{Executor, fatal_report};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    logging::init_executor_logging();

    let mut argv = std::env::args_os().skip(1);
    let Some(executor_path) = argv.next().map(PathBuf::from) else {
        let err = ExecshimError::ConfigError(
            "execshim-exec must be started by a generated executor".to_string(),
        );
        eprintln!("{}", fatal_report(&err));
        std::process::exit(1);
    };
    let args: Vec<OsString> = argv.collect();

    match Executor::new().run(&executor_path, &args).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{}", fatal_report(&err));
            std::process::exit(1);
        }
    }
}
