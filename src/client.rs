use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{connection, Config, Connection, Reply, Result};

/// A VPP client instance.
///
/// Each call to [Client::execute] is an independent exchange: a fresh
/// connection (or helper process) per command, and the reply is always
/// text. Failures to reach VPP come back as a diagnostic [Reply] rather than
/// an error, so callers can print whatever they get.
#[derive(Debug, Clone)]
pub struct Client {
    unix_socket: OsString,
    helper: Option<PathBuf>,
    capacity: usize,
    timeout: Duration,
}

impl Client {
    /// Creates a new [Client] using `unix_socket` file.
    ///
    /// This doesn't establish a new connection, so is guaranteed to
    /// succeed. Connections are created per request, which can fail if
    /// `unix_socket` does not exist, or permissions prevent access.
    pub fn for_unix_socket<P: AsRef<Path>>(unix_socket: P) -> Self {
        Client {
            unix_socket: unix_socket.as_ref().as_os_str().to_owned(),
            helper: None,
            capacity: crate::config::DEFAULT_REPLY_CAPACITY,
            timeout: Duration::from_millis(crate::config::DEFAULT_TIMEOUT_MS),
        }
    }

    /// Creates a new [Client] that runs `program` (typically `vppctl`)
    /// against `unix_socket` for each request, and captures its stdout.
    pub fn for_helper_program<P: AsRef<Path>, Q: AsRef<Path>>(program: P, unix_socket: Q) -> Self {
        Client {
            helper: Some(program.as_ref().to_path_buf()),
            ..Self::for_unix_socket(unix_socket)
        }
    }

    /// Creates the [Client] described by `config`
    pub fn from_config(config: &Config) -> Self {
        let client = match config.vppctl {
            Some(ref program) => Self::for_helper_program(program, &config.socket),
            None => Self::for_unix_socket(&config.socket),
        };
        client
            .with_capacity(config.reply_capacity)
            .with_timeout(config.timeout())
    }

    /// Sets the maximum size of a reply; anything beyond is truncated
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the upper bound on a single exchange
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Open a new [Connection] to the socket. Useful when the caller wants
    /// to handle connection errors itself; most callers want
    /// [Client::execute].
    pub async fn connect(&self) -> Result<Connection> {
        Connection::new(&self.unix_socket, self.capacity, self.timeout).await
    }

    /// Sends `command` to VPP and returns the filtered reply. Never fails:
    /// errors are reported as the reply text, and are not retried.
    pub async fn execute(&self, command: &str) -> Reply {
        log::debug!("client: executing {}", command.trim_end());
        if let Some(ref program) = self.helper {
            return connection::run_helper(
                program,
                &self.unix_socket,
                command,
                self.capacity,
                self.timeout,
            )
            .await
            .unwrap_or_else(|err| {
                Reply::diagnostic(format!("Error: Failed to run {}: {}\n", program.display(), err))
            });
        }

        let conn = match self.connect().await {
            Ok(conn) => conn,
            Err(err) => {
                log::debug!("client: connect failed: {}", err);
                return Reply::diagnostic(format!("Error: Cannot connect to VPP: {}\n", cause(&err)));
            }
        };
        match conn.send_request(command).await {
            Ok(reply) => reply,
            Err(err) => Reply::diagnostic(format!("Error: Failed to talk to VPP: {}\n", cause(&err))),
        }
    }
}

/// The underlying io error message, without our own prefix
fn cause(err: &crate::Error) -> String {
    match err {
        crate::Error::IoError(e) => e.to_string(),
        e => e.to_string(),
    }
}
