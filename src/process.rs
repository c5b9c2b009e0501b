// src/process.rs
//! Subprocess invocation with separate stdout/stderr capture.
//!
//! Launch failure is the `Err` side of `Invocation::run`; anything that
//! actually ran comes back as a `ProcessOutcome`.

use std::ffi::{OsStr, OsString};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::sync::watch;

/// Exit code reported for a process killed by the wall-clock limit,
/// matching coreutils `timeout`.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_OUTPUT_LIMIT: usize = 1 << 20;

/// How long the output drains may run on after the process group is gone.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The process ran to completion. Non-zero codes are data, not errors.
    Exited {
        code: i32,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
    /// The process outlived its limit and was killed. The streams hold
    /// whatever it wrote before that.
    TimedOut {
        limit: Duration,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
}

#[derive(Debug, Clone)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
    stdin: Option<Vec<u8>>,
    capture_stderr: bool,
    timeout: Duration,
    output_limit: usize,
}

impl Invocation {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            stdin: None,
            capture_stderr: true,
            timeout: DEFAULT_TIMEOUT,
            output_limit: DEFAULT_OUTPUT_LIMIT,
        }
    }

    /// Adds one argv entry. Nothing is ever passed through a shell.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn stdin(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(data.into());
        self
    }

    pub fn discard_stderr(mut self) -> Self {
        self.capture_stderr = false;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Caps how many bytes of each stream are kept. The rest is still
    /// drained so the child never blocks on a full pipe.
    pub fn with_output_limit(mut self, limit: usize) -> Self {
        self.output_limit = limit;
        self
    }

    /// Starts the process and waits for it.
    ///
    /// Stdin is fed from its own task and both output pipes are drained by
    /// their own tasks, so a child that writes before it reads cannot
    /// deadlock us. The child leads a fresh process group. Once it exits or
    /// times out the whole group is killed, so nothing it forked outlives
    /// the call or keeps the pipes open. An `Err` means the process never
    /// started.
    pub async fn run(self) -> std::io::Result<ProcessOutcome> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(if self.stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(if self.capture_stderr { Stdio::piped() } else { Stdio::null() })
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);
        let mut child = command.spawn()?;
        let group = child.id();

        if let (Some(mut pipe), Some(data)) = (child.stdin.take(), self.stdin) {
            tokio::spawn(async move {
                // the child may exit without reading; a broken pipe is expected then
                if let Err(e) = pipe.write_all(&data).await {
                    log::debug!("[process] stdin write stopped: {}", e);
                }
                let _ = pipe.shutdown().await;
            });
        }

        let limit = self.output_limit;
        let (stop, stopped) = watch::channel(false);
        let stdout = tokio::spawn(drain(child.stdout.take(), limit, stopped.clone()));
        let stderr = tokio::spawn(drain(child.stderr.take(), limit, stopped));

        let waited = tokio::time::timeout(self.timeout, child.wait()).await;
        let status = match waited {
            Ok(status) => {
                kill_group(group);
                Some(status?)
            }
            Err(_) => {
                log::warn!(
                    "[process] {} exceeded {}s, killing",
                    self.program.to_string_lossy(),
                    self.timeout.as_secs_f32()
                );
                kill_group(group);
                if let Err(e) = child.kill().await {
                    log::warn!("[process] kill failed: {}", e);
                }
                None
            }
        };

        let mut joined = Box::pin(async move { tokio::join!(stdout, stderr) });
        let (stdout, stderr) = match tokio::time::timeout(DRAIN_GRACE, &mut joined).await {
            Ok(done) => done,
            Err(_) => {
                // a descendant left the group and still holds a pipe
                log::warn!("[process] output pipes still open after exit, closing");
                let _ = stop.send(true);
                joined.await
            }
        };
        let stdout = stdout.map_err(std::io::Error::other)??;
        let stderr = stderr.map_err(std::io::Error::other)??;

        Ok(match status {
            Some(status) => ProcessOutcome::Exited {
                code: exit_code(status),
                stdout,
                stderr,
            },
            None => ProcessOutcome::TimedOut {
                limit: self.timeout,
                stdout,
                stderr,
            },
        })
    }
}

async fn drain<R: AsyncRead + Unpin>(
    reader: Option<R>,
    limit: usize,
    mut stop: watch::Receiver<bool>,
) -> std::io::Result<Vec<u8>> {
    let Some(mut reader) = reader else {
        return Ok(Vec::new());
    };
    let mut kept = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = tokio::select! {
            read = reader.read(&mut chunk) => read?,
            _ = stop.changed() => break,
        };
        if n == 0 {
            break;
        }
        let room = limit.saturating_sub(kept.len());
        kept.extend_from_slice(&chunk[..n.min(room)]);
    }
    Ok(kept)
}

/// SIGKILLs every process in the group led by `leader`. A group that is
/// already empty is not an error.
#[cfg(unix)]
fn kill_group(leader: Option<u32>) {
    let Some(pgid) = leader.and_then(|id| libc::pid_t::try_from(id).ok()) else {
        return;
    };
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            log::warn!("[process] killing group {} failed: {}", pgid, err);
        }
    }
}

#[cfg(not(unix))]
fn kill_group(_leader: Option<u32>) {}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_streams_separately() {
        let outcome = Invocation::new("sh")
            .args(["-c", "echo out; echo err >&2; exit 7"])
            .run()
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ProcessOutcome::Exited {
                code: 7,
                stdout: b"out\n".to_vec(),
                stderr: b"err\n".to_vec(),
            }
        );
    }

    #[tokio::test]
    async fn feeds_stdin() {
        let outcome = Invocation::new("cat").stdin("hello\n").run().await.unwrap();
        match outcome {
            ProcessOutcome::Exited { code, stdout, .. } => {
                assert_eq!(code, 0);
                assert_eq!(stdout, b"hello\n");
            }
            other => panic!("expected Exited, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn large_stdin_and_stdout_do_not_deadlock() {
        let input = vec![b'x'; 4 << 20];
        let outcome = Invocation::new("cat")
            .stdin(input)
            .with_output_limit(1024)
            .run()
            .await
            .unwrap();
        match outcome {
            ProcessOutcome::Exited { code, stdout, .. } => {
                assert_eq!(code, 0);
                assert_eq!(stdout.len(), 1024);
            }
            other => panic!("expected Exited, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_binary_is_a_start_error() {
        let err = Invocation::new("/nonexistent/cc99-test-binary").run().await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn timeout_kills_the_child() {
        let started = std::time::Instant::now();
        let outcome = Invocation::new("sleep")
            .arg("30")
            .with_timeout(Duration::from_millis(200))
            .run()
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ProcessOutcome::TimedOut {
                limit: Duration::from_millis(200),
                stdout: Vec::new(),
                stderr: Vec::new(),
            }
        );
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn timeout_keeps_output_written_before_the_kill() {
        let outcome = Invocation::new("sh")
            .args(["-c", "echo progress; echo warn >&2; exec sleep 30"])
            .with_timeout(Duration::from_millis(500))
            .run()
            .await
            .unwrap();
        match outcome {
            ProcessOutcome::TimedOut { stdout, stderr, .. } => {
                assert_eq!(stdout, b"progress\n");
                assert_eq!(stderr, b"warn\n");
            }
            other => panic!("expected TimedOut, got {:?}", other),
        }
    }

    fn touch_later(marker: &std::path::Path) -> String {
        format!("(sleep 2; touch '{}') &", marker.display())
    }

    #[tokio::test]
    async fn background_child_neither_delays_exit_nor_survives_it() {
        let tmp = tempfile::TempDir::new().unwrap();
        let marker = tmp.path().join("marker");
        let script = format!("{} echo done; exit 0", touch_later(&marker));

        let started = std::time::Instant::now();
        let outcome = Invocation::new("sh")
            .args(["-c", &script])
            .with_timeout(Duration::from_secs(5))
            .run()
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(
            outcome,
            ProcessOutcome::Exited {
                code: 0,
                stdout: b"done\n".to_vec(),
                stderr: Vec::new(),
            }
        );

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn timeout_kills_the_whole_process_group() {
        let tmp = tempfile::TempDir::new().unwrap();
        let marker = tmp.path().join("marker");
        let script = format!("{} exec sleep 30", touch_later(&marker));

        let outcome = Invocation::new("sh")
            .args(["-c", &script])
            .with_timeout(Duration::from_millis(300))
            .run()
            .await
            .unwrap();
        assert!(matches!(outcome, ProcessOutcome::TimedOut { .. }));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn signal_death_maps_to_128_plus_signal() {
        let outcome = Invocation::new("sh").args(["-c", "kill -9 $$"]).run().await.unwrap();
        assert!(matches!(outcome, ProcessOutcome::Exited { code: 137, .. }));
    }

    #[tokio::test]
    async fn shell_metacharacters_stay_one_argument() {
        let outcome = Invocation::new("printf")
            .args(["%s", "; rm -rf /"])
            .run()
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            ProcessOutcome::Exited { code: 0, ref stdout, .. } if stdout == b"; rm -rf /"
        ));
    }
}
