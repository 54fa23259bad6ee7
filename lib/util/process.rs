use super::Io;
use anyhow::{bail, Context, Error as Anyhow};
use async_trait::async_trait;
use std::{io, time::Duration};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader, BufWriter, Lines};
use tokio::{runtime, select, task::block_in_place, time::sleep};
use tracing::{debug, error, info_span, instrument, warn, Instrument};

/// The handle to a spawned executable.
#[async_trait]
#[cfg_attr(test, mockall::automock(
    type Stdin = tokio::io::DuplexStream;
    type Stdout = tokio::io::DuplexStream;
    type Stderr = tokio::io::DuplexStream;
    type Status = String;
))]
trait ChildProcess {
    type Stdin;
    type Stdout;
    fn pipe(&mut self) -> io::Result<(Self::Stdin, Self::Stdout)>;

    type Stderr;
    fn stderr(&mut self) -> Option<Self::Stderr>;

    type Status;
    async fn wait(&mut self) -> io::Result<Self::Status>;

    async fn kill(&mut self) -> io::Result<()>;
}

#[async_trait]
impl ChildProcess for tokio::process::Child {
    type Stdin = tokio::process::ChildStdin;
    type Stdout = tokio::process::ChildStdout;
    fn pipe(&mut self) -> io::Result<(Self::Stdin, Self::Stdout)> {
        match (self.stdin.take(), self.stdout.take()) {
            (Some(stdin), Some(stdout)) => Ok((stdin, stdout)),
            _ => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                Anyhow::msg("the engine's stdin or stdout is not piped"),
            )),
        }
    }

    type Stderr = tokio::process::ChildStderr;
    fn stderr(&mut self) -> Option<Self::Stderr> {
        self.stderr.take()
    }

    type Status = std::process::ExitStatus;
    async fn wait(&mut self) -> io::Result<Self::Status> {
        self.wait().await
    }

    async fn kill(&mut self) -> io::Result<()> {
        self.kill().await
    }
}

#[cfg(test)]
type Child = MockChildProcess;

#[cfg(not(test))]
type Child = tokio::process::Child;

/// Logs every line an engine writes to its stderr, until it closes it.
async fn forward<R: AsyncRead + Unpin>(stderr: R) {
    let mut lines = BufReader::new(stderr).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => warn!(%line, "the engine complained"),
            Ok(None) => break,
            Err(e) => {
                debug!(error = %e, "stopped reading the engine's stderr");
                break;
            }
        }
    }
}

/// The line-oriented stdio of an engine running as a child process.
///
/// Whatever the engine writes to its stderr ends up in the logs.
#[derive(Debug)]
pub struct Process {
    path: String,
    child: Child,
    writer: BufWriter<<Child as ChildProcess>::Stdin>,
    reader: Lines<BufReader<<Child as ChildProcess>::Stdout>>,
}

impl Process {
    /// How long the engine has to exit on its own once it is no longer needed.
    #[cfg(test)]
    const GRACE: Duration = Duration::ZERO;

    #[cfg(not(test))]
    const GRACE: Duration = Duration::from_secs(1);

    fn new(path: String, mut child: Child) -> io::Result<Self> {
        let (stdin, stdout) = child.pipe()?;

        match (child.stderr(), runtime::Handle::try_current()) {
            (Some(stderr), Ok(rt)) => {
                let span = info_span!("engine", %path);
                rt.spawn(forward(stderr).instrument(span));
            }

            (Some(_), Err(_)) => {
                warn!(%path, "discarding the engine's stderr outside of a runtime");
            }

            (None, _) => {}
        }

        Ok(Process {
            path,
            child,
            writer: BufWriter::new(stdin),
            reader: BufReader::new(stdout).lines(),
        })
    }

    /// Launches the engine executable found at `path`.
    #[instrument(level = "debug", err)]
    pub fn spawn(path: &str) -> io::Result<Self> {
        #[cfg(test)]
        let child = {
            let mut child = MockChildProcess::new();
            child.expect_pipe().returning(|| Ok(tokio::io::duplex(1)));
            child.expect_stderr().returning(|| None);
            child
        };

        #[cfg(not(test))]
        let child = tokio::process::Command::new(path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        Process::new(path.into(), child)
    }

    /// The path to the engine executable.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Gives the engine a grace period to exit after its stdin is flushed, then kills it.
impl Drop for Process {
    #[instrument(level = "trace", skip(self), fields(path = %self.path))]
    fn drop(&mut self) {
        let result: Result<_, Anyhow> = block_in_place(|| {
            runtime::Handle::try_current()?.block_on(async {
                self.writer.flush().await?;

                select! {
                    status = self.child.wait() => Ok(status?),
                    _ = sleep(Self::GRACE) => {
                        self.child.kill().await?;
                        warn!(grace = ?Self::GRACE, "killed the engine");
                        bail!("the engine did not exit within {:?}", Self::GRACE);
                    }
                }
            })
        });

        match result.context("the engine did not shut down cleanly") {
            Ok(status) => debug!(%status, "the engine exited"),
            Err(e) => error!("{:?}", e),
        }
    }
}

#[async_trait]
impl Io for Process {
    #[instrument(level = "trace", skip(self), fields(path = %self.path), err, ret)]
    async fn recv(&mut self) -> io::Result<String> {
        match self.reader.next_line().await? {
            Some(line) => Ok(line),
            None => Err(io::ErrorKind::UnexpectedEof.into()),
        }
    }

    #[instrument(level = "trace", skip(self), fields(path = %self.path), err)]
    async fn send(&mut self, msg: &str) -> io::Result<()> {
        self.writer.write_all(msg.as_bytes()).await?;
        self.writer.write_u8(b'\n').await?;
        Ok(())
    }

    #[instrument(level = "trace", skip(self), fields(path = %self.path), err)]
    async fn flush(&mut self) -> io::Result<()> {
        self.writer.flush().await
    }
}
