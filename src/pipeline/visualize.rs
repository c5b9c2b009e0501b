// src/pipeline/visualize.rs
use super::lossy;
use crate::config::ToolchainConfig;
use crate::models::VisualResp;
use crate::process::{Invocation, ProcessOutcome};
use crate::response::Reply;
use crate::status::St;

/// Feeds `source` to `<compiler> -V -` and returns what it prints.
///
/// Stderr is discarded. With `visual_strict` off, a non-zero exit still
/// returns the partial stdout; with it on, the exit is reported as
/// `St::ToolErr`.
pub async fn visualize(tool: &ToolchainConfig, source: &str) -> Reply {
    let outcome = Invocation::new(&tool.compiler)
        .args(["-V", "-"])
        .stdin(source)
        .discard_stderr()
        .with_timeout(tool.compile_timeout)
        .with_output_limit(tool.output_limit)
        .run()
        .await;

    match outcome {
        Err(e) => {
            log::warn!("[visualize] failed to start {}: {}", tool.compiler.display(), e);
            Reply::json_error_with_message(St::IoErr, e.to_string())
        }
        Ok(ProcessOutcome::TimedOut { limit, .. }) => Reply::json_error_with_message(
            St::CompileTimeout,
            format!("visualization exceeded {}s", limit.as_secs_f32()),
        ),
        Ok(ProcessOutcome::Exited { code, .. }) if code != 0 && tool.visual_strict => {
            Reply::json_error_with_message(St::ToolErr, format!("visualizer exited with code {}", code))
        }
        Ok(ProcessOutcome::Exited { stdout, .. }) => Reply::json(VisualResp { res: lossy(&stdout) }),
    }
}
