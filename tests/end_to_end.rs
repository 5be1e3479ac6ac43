// tests/end_to_end.rs
#![cfg(unix)]

mod common;
use crate::common::builders::MetaBuilder;
use crate::common::{cli_binary, executor_binary, init_tracing, write_script};

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use execshim::fs::RealFileSystem;
use execshim::generator::Generator;
use execshim::meta;
use execshim::runtime::USER_FACING_HEADER;
use execshim::wire::{ExitCode, Heartbeat, Message};
use execshim_test_utils::fake_service::FakeService;
use execshim_test_utils::with_timeout;
use tokio::process::Command;

const TARGET_SCRIPT: &str = r#"for a in "$@"; do echo "arg=$a"; done
echo "path=$PATH"
echo "home=$EXECSHIM_TEST_HOME"
exit 7"#;

struct Fixture {
    _dir: tempfile::TempDir,
    rt_bin: PathBuf,
    bin_dir: PathBuf,
    socket: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let rt_bin = dir.path().join("rt").join("bin");
        write_script(&rt_bin.join("tool"), TARGET_SCRIPT);
        let bin_dir = dir.path().join("bin");
        let socket = dir.path().join("svc.sock");
        Self {
            _dir: dir,
            rt_bin,
            bin_dir,
            socket,
        }
    }

    fn target(&self) -> PathBuf {
        self.rt_bin.join("tool")
    }

    fn apply(&self, report_exit_code: bool) {
        let meta = MetaBuilder::new(&self.socket.to_string_lossy())
            .bin(&self.target().to_string_lossy())
            .env("PATH", &self.rt_bin.to_string_lossy())
            .env("EXECSHIM_TEST_HOME", "/from/meta")
            .report_exit_code(report_exit_code)
            .build();
        Generator::new(RealFileSystem, executor_binary())
            .apply(&self.bin_dir, &meta)
            .unwrap();
    }

    async fn run(&self, args: &[&str]) -> Output {
        run_executor(&self.bin_dir.join("tool"), args).await
    }
}

async fn run_executor(path: &Path, args: &[&str]) -> Output {
    with_timeout(
        Command::new(path)
            .args(args)
            .env("EXECSHIM_TEST_HOME", "/inherited")
            .env_remove("EXECSHIM_VERBOSE")
            .output(),
    )
    .await
    .unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_executor_runs_target_and_reports_heartbeat() {
    init_tracing();
    let fx = Fixture::new();
    let service = FakeService::start(&fx.socket).await.unwrap();
    fx.apply(false);

    let out = fx.run(&["-V", "two words", ""]).await;

    assert_eq!(out.status.code(), Some(7), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let text = stdout(&out);
    assert!(text.contains("arg=-V\narg=two words\narg=\n"), "stdout: {text}");
    assert!(
        text.contains(&format!("path={}:", fx.rt_bin.display())),
        "stdout: {text}"
    );
    assert!(text.contains("home=/from/meta"), "stdout: {text}");

    service.wait_for(1).await;
    let messages = service.messages();
    assert_eq!(messages.len(), 1, "messages: {messages:?}");
    match &messages[0] {
        Message::Heartbeat(Heartbeat {
            process_id,
            exec_path,
        }) => {
            assert!(process_id.parse::<u32>().is_ok());
            assert_eq!(exec_path, &fx.target().to_string_lossy());
        }
        other => panic!("expected heartbeat, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_exit_code_is_reported_when_enabled() {
    init_tracing();
    let fx = Fixture::new();
    let service = FakeService::start(&fx.socket).await.unwrap();
    fx.apply(true);

    let out = fx.run(&[]).await;
    assert_eq!(out.status.code(), Some(7));

    let received = service.wait_for(2).await;
    assert_eq!(received.len(), 2, "received: {received:?}");
    assert_eq!(
        service.messages()[1],
        Message::ExitCode(ExitCode::new(fx.target().to_string_lossy(), 7))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unreachable_service_does_not_block_the_command() {
    init_tracing();
    let fx = Fixture::new();
    fx.apply(true);

    let out = fx.run(&["still", "runs"]).await;

    assert_eq!(out.status.code(), Some(7));
    assert!(stdout(&out).contains("arg=still\narg=runs\n"));
    assert!(out.stderr.is_empty(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_missing_metadata_prints_header_and_exits_1() {
    init_tracing();
    let fx = Fixture::new();
    fx.apply(false);
    fs::remove_file(meta::meta_path(&fx.bin_dir)).unwrap();

    let out = fx.run(&["-V"]).await;

    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.starts_with(USER_FACING_HEADER), "stderr: {err}");
    assert!(err.contains(meta::META_FILE_NAME), "stderr: {err}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unknown_executor_name_is_fatal() {
    init_tracing();
    let fx = Fixture::new();
    fx.apply(false);
    let renamed = fx.bin_dir.join("other");
    fs::copy(fx.bin_dir.join("tool"), &renamed).unwrap();

    let out = run_executor(&renamed, &[]).await;

    assert_eq!(out.status.code(), Some(1));
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.starts_with(USER_FACING_HEADER), "stderr: {err}");
    assert!(err.contains("'other'"), "stderr: {err}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_signal_death_maps_to_128_plus_signal() {
    init_tracing();
    let fx = Fixture::new();
    write_script(&fx.target(), "kill -TERM $$");
    fx.apply(false);

    let out = fx.run(&[]).await;
    assert_eq!(out.status.code(), Some(128 + 15));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cli_apply_and_is_executor() {
    init_tracing();
    let fx = Fixture::new();
    let config = fx.rt_bin.parent().unwrap().join("Execshim.toml");
    fs::write(
        &config,
        format!(
            r#"
[config]
bin_dir = "{bin_dir}"
socket_path = "{socket}"
executor = "{executor}"

[runtime.env]
PATH = "{rt_bin}"
"#,
            bin_dir = fx.bin_dir.display(),
            socket = fx.socket.display(),
            executor = executor_binary().display(),
            rt_bin = fx.rt_bin.display(),
        ),
    )
    .unwrap();

    let apply = with_timeout(
        Command::new(cli_binary())
            .arg("apply")
            .arg("--config")
            .arg(&config)
            .env_remove("EXECSHIM_SOCKET")
            .output(),
    )
    .await
    .unwrap();
    assert!(
        apply.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&apply.stderr)
    );
    assert!(stdout(&apply).contains("1 created"), "stdout: {}", stdout(&apply));

    let check = with_timeout(
        Command::new(cli_binary())
            .arg("is-executor")
            .arg(fx.bin_dir.join("tool"))
            .output(),
    )
    .await
    .unwrap();
    assert_eq!(check.status.code(), Some(0));
    assert_eq!(stdout(&check).trim(), "yes");

    let out = fx.run(&["x"]).await;
    assert_eq!(out.status.code(), Some(7));
    assert!(stdout(&out).contains("arg=x\n"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_interrupt_sent_to_executor_reaches_target() {
    init_tracing();
    let fx = Fixture::new();
    let started = fx.rt_bin.join("started");
    let interrupted = fx.rt_bin.join("interrupted");
    write_script(
        &fx.target(),
        &format!(
            "trap 'touch \"{}\"; exit 42' INT\ntouch \"{}\"\nsleep 4 &\nwait",
            interrupted.display(),
            started.display()
        ),
    );
    fx.apply(false);

    // Own process group, so no terminal delivers the interrupt for us.
    let mut child = Command::new(fx.bin_dir.join("tool"))
        .process_group(0)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .env_remove("EXECSHIM_VERBOSE")
        .spawn()
        .unwrap();

    with_timeout(async {
        while !started.exists() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;

    let pid = child.id().unwrap() as libc::pid_t;
    // SAFETY: plain kill(2) on a child we spawned and have not reaped.
    unsafe {
        libc::kill(pid, libc::SIGINT);
    }

    let status = with_timeout(child.wait()).await.unwrap();
    assert_eq!(status.code(), Some(42));
    assert!(interrupted.exists());
}
