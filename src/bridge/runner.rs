use crate::bridge::{BridgeError, InvocationRequest, InvocationResult, Settle};
use std::io::{self, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Forces UTF-8 stdio for Python children regardless of the platform locale.
pub const UTF8_IO_ENV: (&str, &str) = ("PYTHONIOENCODING", "utf-8");

const WATCH_INTERVAL: Duration = Duration::from_millis(10);

pub fn run_invocation(request: &InvocationRequest) -> Result<InvocationResult, BridgeError> {
    if request.program.trim().is_empty() {
        return Err(BridgeError::InvalidRequest(
            "program must be non-empty".to_string(),
        ));
    }

    let mut command = Command::new(&request.program);
    command
        .args(&request.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .env(UTF8_IO_ENV.0, UTF8_IO_ENV.1);
    if let Some(cwd) = &request.cwd {
        command.current_dir(cwd);
    }
    for (k, v) in &request.env_overrides {
        command.env(k, v);
    }

    let mut child = command.spawn().map_err(|source| BridgeError::Launch {
        program: request.program.clone(),
        source,
    })?;
    let deadline = request.timeout.map(|timeout| Instant::now() + timeout);

    let (out_tx, out_rx) = mpsc::channel();
    let readers = usize::from(spawn_reader(child.stdout.take(), OutputStream::Stdout, &out_tx))
        + usize::from(spawn_reader(child.stderr.take(), OutputStream::Stderr, &out_tx));
    drop(out_tx);

    let settle = Arc::new(Settle::new());
    let (tx, rx) = mpsc::channel();
    let watcher = {
        let settle = Arc::clone(&settle);
        thread::spawn(move || watch_child(child, &settle, tx))
    };

    let outcome = match deadline {
        Some(deadline) => match rx.recv_timeout(remaining(deadline)) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                if settle.reject() {
                    // The watcher kills and reaps the child once it observes
                    // the rejection. Reader threads are left to drain on their
                    // own; a grandchild may still hold the pipes open.
                    let _ = watcher.join();
                    return Err(timeout_error(request));
                }
                // Exit settled first; its status is already on the way.
                rx.recv().map_err(|_| watcher_lost(request))?
            }
            Err(RecvTimeoutError::Disconnected) => return Err(watcher_lost(request)),
        },
        None => rx.recv().map_err(|_| watcher_lost(request))?,
    };
    let _ = watcher.join();

    let status = outcome.map_err(|source| BridgeError::Wait {
        program: request.program.clone(),
        source,
    })?;

    // The pipes close only when every holder exits, which includes any
    // grandchild that inherited them. Output must arrive by the same deadline.
    let Some((stdout, stderr)) = collect_output(&out_rx, readers, deadline) else {
        return Err(timeout_error(request));
    };

    Ok(InvocationResult {
        stdout,
        stderr,
        exit_code: status.code(),
        signal: exit_signal(&status),
    })
}

fn watch_child(mut child: Child, settle: &Settle, tx: Sender<io::Result<ExitStatus>>) {
    loop {
        if settle.is_rejected() {
            // Already exited is fine here.
            let _ = child.kill();
            let _ = child.wait();
            return;
        }
        match child.try_wait() {
            Ok(Some(status)) => {
                if settle.resolve() {
                    let _ = tx.send(Ok(status));
                }
                return;
            }
            Ok(None) => thread::sleep(WATCH_INTERVAL),
            Err(err) => {
                if settle.resolve() {
                    let _ = tx.send(Err(err));
                }
                let _ = child.kill();
                let _ = child.wait();
                return;
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum OutputStream {
    Stdout,
    Stderr,
}

fn spawn_reader<R>(
    stream: Option<R>,
    kind: OutputStream,
    tx: &Sender<(OutputStream, Vec<u8>)>,
) -> bool
where
    R: Read + Send + 'static,
{
    let Some(stream) = stream else {
        return false;
    };
    let tx = tx.clone();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let mut reader = BufReader::new(stream);
        let _ = reader.read_to_end(&mut buf);
        let _ = tx.send((kind, buf));
    });
    true
}

/// `None` when the deadline passes before every reader has hit end of stream.
fn collect_output(
    rx: &Receiver<(OutputStream, Vec<u8>)>,
    readers: usize,
    deadline: Option<Instant>,
) -> Option<(String, String)> {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    for _ in 0..readers {
        let received = match deadline {
            Some(deadline) => rx.recv_timeout(remaining(deadline)),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok((OutputStream::Stdout, bytes)) => stdout = bytes,
            Ok((OutputStream::Stderr, bytes)) => stderr = bytes,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    Some((decode(&stdout), decode(&stderr)))
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}

fn timeout_error(request: &InvocationRequest) -> BridgeError {
    BridgeError::Timeout {
        program: request.program.clone(),
        timeout_ms: request.timeout_ms().unwrap_or_default(),
    }
}

fn watcher_lost(request: &InvocationRequest) -> BridgeError {
    BridgeError::Wait {
        program: request.program.clone(),
        source: io::Error::other("exit watcher stopped without reporting a status"),
    }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> InvocationRequest {
        InvocationRequest::new("sh").arg("-c").arg(script)
    }

    #[test]
    fn captures_both_streams_and_exit_code() {
        let result = run_invocation(&sh("echo out; echo err 1>&2; exit 4")).expect("run");
        assert_eq!(result.stdout, "out\n");
        assert_eq!(result.stderr, "err\n");
        assert_eq!(result.exit_code, Some(4));
        assert_eq!(result.signal, None);
    }

    #[test]
    fn utf8_io_env_is_set_for_child() {
        let result = run_invocation(&sh("printf '%s' \"$PYTHONIOENCODING\"")).expect("run");
        assert_eq!(result.stdout, "utf-8");
    }

    #[test]
    fn request_env_overrides_win_over_utf8_default() {
        let request = sh("printf '%s' \"$PYTHONIOENCODING\"").env("PYTHONIOENCODING", "gbk");
        let result = run_invocation(&request).expect("run");
        assert_eq!(result.stdout, "gbk");
    }

    #[test]
    fn stdin_is_closed() {
        let result = run_invocation(&sh("cat; echo done")).expect("run");
        assert_eq!(result.stdout, "done\n");
    }

    #[test]
    fn timeout_rejects_and_names_duration() {
        let started = Instant::now();
        let err = run_invocation(&sh("exec sleep 5").timeout(Some(Duration::from_millis(150))))
            .expect_err("timeout");
        assert!(started.elapsed() < Duration::from_secs(4));
        match &err {
            BridgeError::Timeout { timeout_ms, .. } => assert_eq!(*timeout_ms, 150),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "process timeout after 150 ms");
    }

    #[test]
    fn fast_exit_within_deadline_resolves() {
        let result = run_invocation(&sh("echo quick").timeout(Some(Duration::from_secs(5))))
            .expect("run");
        assert_eq!(result.stdout, "quick\n");
        assert!(result.success());
    }
}
