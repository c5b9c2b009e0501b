// src/pipeline/execute.rs
use super::lossy;
use crate::artifact::ArtifactStore;
use crate::config::ToolchainConfig;
use crate::models::RunResp;
use crate::process::{Invocation, ProcessOutcome, TIMEOUT_EXIT_CODE};
use crate::response::Reply;
use crate::status::St;

/// Runs a previously compiled artifact under the run timeout.
///
/// `args` is split on whitespace into argv; it is never shell-interpreted.
/// A timeout is reported like coreutils `timeout`: exit code 124, the
/// output written so far, and a note appended to stderr.
pub async fn execute(
    tool: &ToolchainConfig,
    store: &ArtifactStore,
    artifact: &str,
    args: &str,
    stdin: &str,
) -> Reply {
    // advisory only: the file can still vanish before the spawn below
    let path = match store.locate(artifact).await {
        Ok(path) => path,
        Err(e) => return Reply::json_error_with_message(St::IoErr, e.to_string()),
    };

    let outcome = Invocation::new(&path)
        .args(args.split_whitespace())
        .stdin(stdin)
        .with_timeout(tool.run_timeout)
        .with_output_limit(tool.output_limit)
        .run()
        .await;

    match outcome {
        Err(e) => {
            log::warn!("[execute] failed to start {}: {}", artifact, e);
            Reply::json_error_with_message(St::IoErr, e.to_string())
        }
        Ok(ProcessOutcome::TimedOut { limit, stdout, stderr }) => {
            let mut stderr = lossy(&stderr);
            if !stderr.is_empty() && !stderr.ends_with('\n') {
                stderr.push('\n');
            }
            stderr.push_str(&format!("time limit exceeded ({}s)\n", limit.as_secs_f32()));
            Reply::json(RunResp {
                exit_code: TIMEOUT_EXIT_CODE,
                stdout: lossy(&stdout),
                stderr,
            })
        }
        Ok(ProcessOutcome::Exited { code, stdout, stderr }) => {
            log::debug!("[execute] {} finished with exit code {}", artifact, code);
            Reply::json(RunResp {
                exit_code: code,
                stdout: lossy(&stdout),
                stderr: lossy(&stderr),
            })
        }
    }
}
