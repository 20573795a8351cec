use crate::remote::{CommandOutput, GhInvocation, RemoteError};
use std::io::{BufReader, Read};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Runs `binary` with the invocation's arguments, killing it once `timeout`
/// elapses. Any exit status is returned; see [`run_checked`].
pub fn run_command(
    binary: &str,
    invocation: &GhInvocation,
    timeout: Duration,
) -> Result<CommandOutput, RemoteError> {
    let command_form = invocation.command_form(binary);
    let io_error = |source: std::io::Error| RemoteError::Io {
        command: command_form.clone(),
        source,
    };

    let mut command = Command::new(binary);
    command
        .args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(RemoteError::MissingBinary {
                binary: binary.to_string(),
            })
        }
        Err(err) => return Err(io_error(err)),
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io_error(std::io::Error::other("missing stdout pipe")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io_error(std::io::Error::other("missing stderr pipe")))?;

    let stdout_reader = thread::spawn(move || {
        let mut buf = String::new();
        let mut reader = BufReader::new(stdout);
        let _ = reader.read_to_string(&mut buf);
        buf
    });
    let stderr_reader = thread::spawn(move || {
        let mut buf = String::new();
        let mut reader = BufReader::new(stderr);
        let _ = reader.read_to_string(&mut buf);
        buf
    });

    let start = Instant::now();
    let exit_status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = stdout_reader.join();
                    let _ = stderr_reader.join();
                    return Err(RemoteError::Timeout {
                        command: command_form.clone(),
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(err) => return Err(io_error(err)),
        }
    };

    Ok(CommandOutput {
        stdout: stdout_reader.join().unwrap_or_default(),
        stderr: stderr_reader.join().unwrap_or_default(),
        exit_code: exit_status.code(),
    })
}

pub fn run_checked(
    binary: &str,
    invocation: &GhInvocation,
    timeout: Duration,
) -> Result<CommandOutput, RemoteError> {
    let output = run_command(binary, invocation, timeout)?;
    if !output.success() {
        return Err(RemoteError::NonZeroExit {
            command: invocation.command_form(binary),
            exit_code: output.exit_code.unwrap_or(-1),
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(output)
}
