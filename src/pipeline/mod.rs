// src/pipeline/mod.rs
//! The three request flows. Each turns validated input into a `Reply`
//! and never lets a subprocess or filesystem error escape unwrapped.

pub mod compile;
pub mod execute;
pub mod visualize;

pub use compile::compile;
pub use execute::execute;
pub use visualize::visualize;

use crate::config::ToolchainConfig;
use crate::errors::{Result, ServiceError};
use crate::process::{Invocation, ProcessOutcome};
use std::time::Duration;

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Runs `<compiler> --version` and returns its first line of output.
/// The service refuses to start without a working compiler.
pub async fn probe_compiler(tool: &ToolchainConfig) -> Result<String> {
    let bin = tool.compiler.display().to_string();
    let outcome = Invocation::new(&tool.compiler)
        .arg("--version")
        .with_timeout(Duration::from_secs(10))
        .run()
        .await
        .map_err(|e| ServiceError::ToolUnavailable { bin: bin.clone(), reason: e.to_string() })?;

    match outcome {
        ProcessOutcome::Exited { code: 0, stdout, .. } => {
            Ok(lossy(&stdout).lines().next().unwrap_or_default().trim().to_string())
        }
        ProcessOutcome::Exited { code, .. } => Err(ServiceError::ToolUnavailable {
            bin,
            reason: format!("--version exited with code {}", code),
        }),
        ProcessOutcome::TimedOut { .. } => Err(ServiceError::ToolUnavailable {
            bin,
            reason: "--version timed out".to_string(),
        }),
    }
}
