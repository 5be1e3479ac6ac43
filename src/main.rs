// src/main.rs

use execshim::errors::ExecshimError;
use execshim::runtime::describe;
use execshim::{cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{}", headline(&err));
            eprintln!("  {}", describe(&*err));
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<i32> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}

fn headline(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<ExecshimError>() {
        Some(ExecshimError::Conflict { .. }) => {
            "execshim: an executor could not be created because a file it does not own is in the way. Move that file aside and activate again."
        }
        Some(ExecshimError::ConfigError(_)) | Some(ExecshimError::TomlError(_)) => {
            "execshim: the activation file is not valid."
        }
        _ => "execshim: the command failed.",
    }
}
