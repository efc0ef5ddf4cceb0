//! Module that deals with the request/reply exchange with VPP.
//!
//! Refer to documentation of [Connection] for more details.

use std::{fmt, path::Path, time::Duration};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::UnixStream,
    process::Command,
    time::Instant,
};

use crate::{Result, TelnetFilter};

/// The filtered text of one VPP reply.
///
/// Replies are bounded by the client's capacity. If VPP sent more than
/// that, the text is cut at the capacity and [Reply::truncated] is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub truncated: bool,
}

impl Reply {
    /// A reply carrying a locally generated diagnostic instead of engine output
    pub fn diagnostic(text: String) -> Self {
        Reply {
            text,
            truncated: false,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Returns true if the reply is a diagnostic about failing to reach VPP,
    /// or VPP rejected the command line outright.
    pub fn is_channel_error(&self) -> bool {
        self.text.trim_start().starts_with("Error:") || self.text.contains("unknown input")
    }

    /// Returns true if VPP reported an error. VPP has no status codes on
    /// its CLI, so this is a best-effort match on the text, and is only
    /// meaningful for the short replies of configuration commands: report
    /// output can mention counters such as `tx-error`.
    pub fn is_error(&self) -> bool {
        let lower = self.text.to_ascii_lowercase();
        !self.is_already_exists()
            && (lower.contains("error") || lower.contains("unknown input"))
    }

    /// Returns true if the reply says the object being created exists already
    pub fn is_already_exists(&self) -> bool {
        let lower = self.text.to_ascii_lowercase();
        lower.contains("already exist") || lower.contains("already in use")
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A single request/reply exchange with VPP.
///
/// The VPP CLI socket is used one command per connection: we connect,
/// write the command, and read until VPP closes the stream, the reply
/// reaches the capacity, or the timeout expires. A timeout before VPP has
/// sent anything is an error.
pub struct Connection {
    stream: UnixStream,
    capacity: usize,
    deadline: Instant,
}

impl Connection {
    /// Open a new connection to this `unix_socket`. The `timeout` covers the
    /// whole exchange, connect included.
    pub(crate) async fn new<P: AsRef<Path>>(
        unix_socket: P,
        capacity: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let deadline = Instant::now() + timeout;
        let stream = tokio::time::timeout_at(deadline, UnixStream::connect(unix_socket))
            .await
            .map_err(|_| timed_out("connect"))??;
        log::trace!("conn: connected");
        Ok(Connection {
            stream,
            capacity,
            deadline,
        })
    }

    /// Sends a request to VPP and returns the filtered reply. Consumes the
    /// connection, as VPP serves one command per connection.
    pub async fn send_request(mut self, request: &str) -> Result<Reply> {
        let request = normalize_request(request);
        tokio::time::timeout_at(self.deadline, self.stream.write_all(request.as_bytes()))
            .await
            .map_err(|_| timed_out("write"))??;
        log::trace!("conn: written request {}", request.trim_end());

        let mut filter = TelnetFilter::new();
        let mut payload: Vec<u8> = Vec::with_capacity(READ_FRAME_SIZE.min(self.capacity));
        let mut truncated = false;
        let mut frame = [0_u8; READ_FRAME_SIZE];
        loop {
            match tokio::time::timeout_at(self.deadline, self.stream.read(&mut frame)).await {
                Err(_) if payload.is_empty() => {
                    log::debug!("conn: timed out before any reply");
                    return Err(timed_out("read").into());
                }
                Err(_) => {
                    // VPP keeps some sessions open after replying, so once
                    // it has answered the timeout ends the reply
                    log::debug!("conn: timed out after {} bytes", payload.len());
                    break;
                }
                Ok(Ok(0)) => {
                    log::trace!("conn: eof after {} bytes", payload.len());
                    break;
                }
                Ok(Ok(count)) => {
                    filter.feed(&frame[..count], &mut payload);
                    if payload.len() > self.capacity {
                        truncated = true;
                        break;
                    }
                }
                Ok(Err(err)) => return Err(err.into()),
            }
        }
        Ok(finish_reply(payload, self.capacity, truncated))
    }
}

/// Runs `program -s <unix_socket> <request>` and returns its filtered stdout.
/// If the program fails, the reply is an `Error:` diagnostic carrying its
/// stderr.
pub(crate) async fn run_helper<P: AsRef<Path>>(
    program: &Path,
    unix_socket: P,
    request: &str,
    capacity: usize,
    timeout: Duration,
) -> Result<Reply> {
    let request = request.trim_end_matches(['\r', '\n']);
    let mut command = Command::new(program);
    command
        .arg("-s")
        .arg(unix_socket.as_ref())
        .arg(request)
        .kill_on_drop(true);
    log::trace!("conn: spawning {} for {}", program.display(), request);
    let output = tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| timed_out("helper"))??;
    if !output.status.success() {
        log::debug!("conn: helper exited with {}", output.status);
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Ok(Reply::diagnostic(format!(
            "Error: {} exited with {}: {}\n",
            program.display(),
            output.status,
            stderr.trim()
        )));
    }

    let mut payload = Vec::with_capacity(output.stdout.len());
    TelnetFilter::new().feed(&output.stdout, &mut payload);
    if payload.is_empty() && !output.stderr.is_empty() {
        payload = output.stderr;
    }
    let truncated = payload.len() > capacity;
    Ok(finish_reply(payload, capacity, truncated))
}

/// Makes sure the request ends with exactly one newline
fn normalize_request(request: &str) -> String {
    format!("{}\n", request.trim_end_matches(['\r', '\n']))
}

fn finish_reply(mut payload: Vec<u8>, capacity: usize, truncated: bool) -> Reply {
    if truncated {
        log::warn!(
            "conn: reply exceeded {} bytes and was truncated, raise reply_capacity to see all of it",
            capacity
        );
        payload.truncate(char_boundary(&payload, capacity));
    }
    Reply {
        text: String::from_utf8_lossy(&payload).into_owned(),
        truncated,
    }
}

/// The largest cut at or below `at` that doesn't split a UTF-8 sequence
fn char_boundary(payload: &[u8], at: usize) -> usize {
    let mut cut = at.min(payload.len());
    while cut > 0 && cut < payload.len() && payload[cut] & 0xC0 == 0x80 {
        cut -= 1;
    }
    cut
}

fn timed_out(stage: &str) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::TimedOut,
        format!("{} timed out", stage),
    )
}

/// Reads are done in sizes of this
const READ_FRAME_SIZE: usize = 2048;
