use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::Invocation;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs `command` to completion, capturing its output.
///
/// When `timeout` elapses first the child is killed and the returned
/// [`Invocation`] is flagged as timed out.
pub(crate) fn run(mut command: Command, timeout: Option<Duration>) -> io::Result<Invocation> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn()?;
    let readers = match spawn_readers(&mut child) {
        Ok(readers) => readers,
        Err(error) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(error);
        }
    };

    let status = match timeout {
        Some(limit) => wait_with_deadline(&mut child, limit),
        None => child.wait().map(Some),
    };
    let status = match status {
        Ok(status) => status,
        Err(error) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(error);
        }
    };

    let mut invocation = match (status, timeout) {
        (Some(status), _) => Invocation {
            status: status.code(),
            ..Invocation::default()
        },
        (None, limit) => {
            let _ = child.kill();
            let _ = child.wait();
            Invocation::timeout(limit.unwrap_or_default())
        }
    };

    let (stdout, stderr) = readers.join();
    invocation.stdout = stdout;
    if !invocation.timed_out {
        invocation.stderr = stderr;
    }
    Ok(invocation)
}

fn wait_with_deadline(child: &mut Child, limit: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

struct Readers {
    stdout: Option<JoinHandle<String>>,
    stderr: Option<JoinHandle<String>>,
}

impl Readers {
    fn join(self) -> (String, String) {
        let collect = |handle: Option<JoinHandle<String>>| {
            handle
                .and_then(|handle| handle.join().ok())
                .unwrap_or_default()
        };
        (collect(self.stdout), collect(self.stderr))
    }
}

fn spawn_readers(child: &mut Child) -> io::Result<Readers> {
    let stdout = child
        .stdout
        .take()
        .map(|pipe| spawn_reader("s3bulk-stdout", pipe))
        .transpose()?;
    let stderr = child
        .stderr
        .take()
        .map(|pipe| spawn_reader("s3bulk-stderr", pipe))
        .transpose()?;
    Ok(Readers { stdout, stderr })
}

fn spawn_reader<R>(name: &str, mut pipe: R) -> io::Result<JoinHandle<String>>
where
    R: Read + Send + 'static,
{
    thread::Builder::new().name(name.to_owned()).spawn(move || {
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut command = Command::new("sh");
        command.arg("-c").arg(script);
        command
    }

    #[test]
    fn captures_output_and_status() {
        let invocation = run(sh("echo out; echo err >&2; exit 3"), None).expect("run");
        assert_eq!(invocation.status, Some(3));
        assert_eq!(invocation.stdout.trim(), "out");
        assert_eq!(invocation.stderr.trim(), "err");
        assert!(!invocation.timed_out);
    }

    #[test]
    fn successful_command_within_deadline() {
        let invocation = run(sh("exit 0"), Some(Duration::from_secs(10))).expect("run");
        assert!(invocation.succeeded());
    }

    #[test]
    fn kills_command_after_timeout() {
        let started = Instant::now();
        let invocation = run(sh("exec sleep 5"), Some(Duration::from_millis(100))).expect("run");
        assert!(invocation.timed_out);
        assert_eq!(invocation.status, None);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let error = run(Command::new("/nonexistent/s3bulk-helper"), None).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }
}
