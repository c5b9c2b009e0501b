// src/pipeline/compile.rs
use std::io::Write;

use super::lossy;
use crate::artifact::{ArtifactStore, new_artifact_name};
use crate::config::ToolchainConfig;
use crate::models::GenResp;
use crate::process::{Invocation, ProcessOutcome};
use crate::response::Reply;
use crate::status::St;

fn stage_source(source: &str) -> std::io::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("cc99.")
        .suffix(".c")
        .tempfile()?;
    file.write_all(source.as_bytes())?;
    file.flush()?;
    file.as_file().sync_all()?;
    Ok(file)
}

/// Compiles `source` into a new artifact in the runtime directory.
///
/// A compiler that runs and exits non-zero is a normal outcome: the reply
/// is `St::Ok` and the caller reads `exitCode`. Only staging failures,
/// launch failures and the compile timeout are request-level errors.
/// `options`, when present, is handed to the compiler as one argument.
pub async fn compile(
    tool: &ToolchainConfig,
    store: &ArtifactStore,
    source: &str,
    options: &str,
) -> Reply {
    // deleted when this function returns
    let staged = match stage_source(source) {
        Ok(file) => file,
        Err(e) => {
            log::warn!("[compile] staging source failed: {}", e);
            return Reply::json_error_with_message(St::IoErr, e.to_string());
        }
    };

    let artifact = new_artifact_name();
    let mut invocation = Invocation::new(&tool.compiler)
        .arg("-o")
        .arg(store.path_for(&artifact))
        .arg(staged.path())
        .with_timeout(tool.compile_timeout)
        .with_output_limit(tool.output_limit);
    if !options.trim().is_empty() {
        invocation = invocation.arg(options);
    }

    match invocation.run().await {
        Err(e) => {
            log::warn!(
                "[compile] failed to start {}: {}",
                tool.compiler.display(),
                e
            );
            Reply::json_error_with_message(St::IoErr, e.to_string())
        }
        Ok(ProcessOutcome::TimedOut { limit, .. }) => {
            store.discard(&artifact).await;
            Reply::json_error_with_message(
                St::CompileTimeout,
                format!("compilation exceeded {}s", limit.as_secs_f32()),
            )
        }
        Ok(ProcessOutcome::Exited { code, stdout, stderr }) => {
            if code != 0 {
                // a failed build may still have left a partial output behind
                store.discard(&artifact).await;
            } else if !store.register(&artifact).await {
                log::warn!("[compile] compiler exited 0 but produced no file {}", artifact);
            }
            log::debug!("[compile] {} finished with exit code {}", artifact, code);
            Reply::json(GenResp {
                exit_code: code,
                file: artifact,
                stdout: lossy(&stdout),
                stderr: lossy(&stderr),
            })
        }
    }
}
