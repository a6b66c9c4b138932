//! External tool execution
//!
//! Every subprocess-backed backend runs its tool to completion, captures
//! stdout as the result and turns a non-zero exit into a `Bundle` error
//! carrying the tail of the tool's output.

use crate::error::{BundleError, BundleResult};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Max number of output lines to include in backend error messages.
const BUILD_ERROR_TAIL_LINES: usize = 50;

/// Extract the useful tail of tool output for error diagnostics.
///
/// Combines stdout and stderr, then returns the last `BUILD_ERROR_TAIL_LINES`
/// lines so error messages are actionable without being overwhelming.
pub(crate) fn build_error_output(stdout: &str, stderr: &str) -> String {
    let lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    let total = lines.len();
    let tail: Vec<&str> = if total > BUILD_ERROR_TAIL_LINES {
        lines[total - BUILD_ERROR_TAIL_LINES..].to_vec()
    } else {
        lines
    };
    tail.join("\n")
}

/// Run `program args...` in `cwd` and return its stdout.
///
/// `backend` names the failing backend in the error.
pub(crate) async fn run_tool(
    backend: &str,
    program: &str,
    args: &[String],
    cwd: &Path,
) -> BundleResult<String> {
    debug!("Executing in {}: {} {:?}", cwd.display(), program, args);

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| BundleError::command_failed(format!("{} {:?}", program, args), e))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

    if output.status.success() {
        Ok(stdout)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut diagnostics = build_error_output(&stdout, &stderr);
        if diagnostics.is_empty() {
            diagnostics = match output.status.code() {
                Some(code) => format!("exited with code {}", code),
                None => "terminated by signal".to_string(),
            };
        }
        Err(BundleError::backend(backend, diagnostics))
    }
}
