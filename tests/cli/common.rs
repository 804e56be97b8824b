//! Common test utilities for binary tests.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Returns the path to the tscell binary built for this test run.
fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tscell"))
}

/// Runs tscell with the given arguments and optional stdin.
///
/// The config file is pointed into `config_dir` and `TSCELL_*` variables are
/// cleared so the caller's environment cannot leak into the run.
pub fn run_tscell(config_dir: &Path, args: &[&str], stdin: Option<&str>) -> (i32, String, String) {
    run_tscell_with_env(config_dir, args, stdin, &[])
}

/// Like `run_tscell`, setting the given environment variables after clearing.
pub fn run_tscell_with_env(
    config_dir: &Path,
    args: &[&str],
    stdin: Option<&str>,
    env: &[(&str, &str)],
) -> (i32, String, String) {
    let mut command = Command::new(binary_path());
    command
        .arg("--config")
        .arg(config_dir.join("config.toml"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for var in [
        "TSCELL_ON_ERROR",
        "TSCELL_OUTPUT",
        "TSCELL_TIME_DISPLAY",
        "TSCELL_TIME_ZONE",
        "TSCELL_MAX_ROWS",
        "RUST_LOG",
    ] {
        command.env_remove(var);
    }
    command.envs(env.iter().copied());

    let mut child = command.spawn().expect("Failed to spawn tscell");
    {
        let mut pipe = child.stdin.take().expect("stdin is piped");
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes())
                .expect("Failed to write stdin");
        }
    }
    let output = child.wait_with_output().expect("Failed to wait for tscell");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}
