use crate::{
    error::{Result, StemError},
    types::{MSG_COMPLETED, MSG_FAILED},
};
use anyhow::{anyhow, Context};
use std::process::Stdio;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    process::Command,
};
use tracing::{debug, info, instrument, warn};

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// `None` when the child was killed by a signal.
    pub exit_code: Option<i32>,
}

impl RunOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn diagnostic(&self) -> &'static str {
        if self.succeeded() {
            MSG_COMPLETED
        } else {
            MSG_FAILED
        }
    }
}

/// Run `argv` with its output forwarded to this process's stdout/stderr.
pub async fn run(argv: &[String]) -> Result<RunOutcome> {
    let (outcome, _, _) = run_with_sinks(argv, tokio::io::stdout(), tokio::io::stderr()).await?;
    Ok(outcome)
}

/// Spawn `argv[0]` with the remaining arguments and copy its stdout and
/// stderr into the given sinks until both streams close, then wait for exit.
///
/// Each stream gets its own reader task, so a child that fills one pipe
/// while we would otherwise be blocked on the other cannot stall. The sinks
/// are handed back once the child is gone.
///
/// There is no timeout: a child that never exits keeps this future pending.
#[instrument(name = "run", skip_all, fields(program = argv.first().map(String::as_str).unwrap_or("")))]
pub async fn run_with_sinks<O, E>(
    argv: &[String],
    stdout_sink: O,
    stderr_sink: E,
) -> Result<(RunOutcome, O, E)>
where
    O: AsyncWrite + Unpin + Send + 'static,
    E: AsyncWrite + Unpin + Send + 'static,
{
    let (program, args) = argv.split_first().ok_or(StemError::EmptyCommand)?;
    debug!(?argv, "spawning");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| StemError::Spawn {
            program: program.clone(),
            source,
        })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("child stdout was not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("child stderr was not captured"))?;

    let stdout_task = tokio::spawn(pump(stdout, stdout_sink, "stdout"));
    let stderr_task = tokio::spawn(pump(stderr, stderr_sink, "stderr"));

    let (stdout_res, stderr_res) = tokio::join!(stdout_task, stderr_task);
    let stdout_sink = stdout_res.context("stdout reader task failed")??;
    let stderr_sink = stderr_res.context("stderr reader task failed")??;

    let status = child
        .wait()
        .await
        .context("Failed to wait for separation command")?;

    let outcome = RunOutcome {
        exit_code: status.code(),
    };
    if outcome.succeeded() {
        info!("command exited cleanly");
    } else {
        warn!(exit_code = ?outcome.exit_code, "command failed");
    }

    Ok((outcome, stdout_sink, stderr_sink))
}

/// Copy `reader` into `sink` chunk by chunk, flushing as we go. A sink that
/// starts failing is abandoned but the reader is still drained to EOF.
async fn pump<R, W>(mut reader: R, mut sink: W, name: &'static str) -> std::io::Result<W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut forwarding = true;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        if !forwarding {
            continue;
        }
        let written = match sink.write_all(&buf[..n]).await {
            Ok(()) => sink.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            warn!(stream = name, error = %e, "sink rejected output, discarding the rest");
            forwarding = false;
        }
    }
    Ok(sink)
}
