//! Library for driving VPP from a router-style shell.
//!
//! Each shell command is a short-lived invocation: it looks up a handler in
//! the [CommandTable], sends one or more native commands to VPP's CLI
//! socket, strips the telnet control sequences from the replies, scrapes
//! the text reports into structured records, and renders those as tables
//! or as a configuration script.
//!
//! ## Examples
//! ```no_run
//! use vppsh::*;
//!
//! // raw access: send a command and get the filtered reply text
//! async fn show_version() {
//!     let client = Client::for_unix_socket("/run/vpp/cli.sock");
//!     let reply = client.execute("show version").await;
//!     println!("{}", reply);
//! }
//!
//! // or go through a handler, as the shell does
//! async fn show_interfaces() -> Result<()> {
//!     let ctx = Context::new(Config::default(), SessionKey::from_parent_process());
//!     let output = CommandTable::new()
//!         .dispatch("show_interfaces", &ctx, &Params::new())
//!         .await?;
//!     print!("{}", output);
//!     Ok(())
//! }
//! ```
//!
//! Interface configuration mode survives across invocations through the
//! [SessionStore], keyed by the parent shell process or by an explicit
//! session token.

mod client;
pub use client::*;

mod commands;
pub use commands::*;

pub mod config;
pub use config::Config;

mod connection;
pub use connection::*;

mod error;
pub use error::*;

pub mod filter;
pub use filter::{strip_telnet, TelnetFilter};

mod models;
pub use models::*;

pub mod presenter;
pub use presenter::RunningConfig;

mod session;
pub use session::*;
