//! Command handlers exposed to the host shell.
//!
//! The shell owns the grammar; by the time a command reaches us it is a
//! handler name (e.g. `interface_ip_address`) plus a bag of named
//! parameters. [CommandTable] maps names to handlers.

use std::{collections::BTreeMap, collections::HashMap, future::Future, pin::Pin};

use crate::{Client, Config, Error, Reply, Result, SessionKey, SessionStore};

mod interface;
mod route;
mod show;
mod system;

/// Named command parameters. If a name is supplied more than once, the
/// last value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: HashMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (k, v) in pairs {
            params.set(k, v);
        }
        params
    }

    /// Parses `key=value` arguments
    pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let mut params = Self::new();
        for arg in args {
            let arg = arg.as_ref();
            match arg.split_once('=') {
                Some((k, v)) if !k.is_empty() => params.set(k, v),
                _ => {
                    return Err(Error::InvalidArgument(format!(
                        "expected key=value, got '{}'",
                        arg
                    )))
                }
            }
        }
        Ok(params)
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns the value of `name`; empty values count as absent
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name).ok_or_else(|| Error::missing(name))
    }
}

/// Everything a handler needs: the VPP client, and the session it runs in
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub client: Client,
    pub sessions: SessionStore,
    pub session: SessionKey,
}

impl Context {
    pub fn new(config: Config, session: SessionKey) -> Self {
        Context {
            client: Client::from_config(&config),
            sessions: SessionStore::new(&config.session_dir),
            session,
            config,
        }
    }

    /// The interface a command applies to: the `interface` parameter if
    /// given, otherwise the one the session is configuring.
    pub fn target_interface(&self, params: &Params) -> Result<String> {
        if let Some(name) = params.get("interface") {
            return Ok(name.to_owned());
        }
        self.sessions
            .get_current(&self.session)?
            .ok_or(Error::NotInConfigMode)
    }

    /// Runs a report command. Fails only if VPP could not be reached or
    /// rejected the command; the content itself is not judged.
    pub async fn query(&self, command: &str) -> Result<Reply> {
        let reply = self.client.execute(command).await;
        if reply.is_channel_error() {
            return Err(Error::EngineError(reply.text));
        }
        Ok(reply)
    }

    /// Runs a configuration command, failing if VPP reports an error
    pub async fn configure(&self, command: &str) -> Result<Reply> {
        let reply = self.client.execute(command).await;
        if reply.is_error() {
            log::debug!("cmd: '{}' failed: {}", command, reply.text.trim_end());
            return Err(Error::EngineError(reply.text));
        }
        Ok(reply)
    }
}

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + 'a>>;

/// A command handler. On success it returns the text to show the user.
pub type Handler = for<'a> fn(&'a Context, &'a Params) -> HandlerFuture<'a>;

/// Registers each `async fn` under its name, boxing its future
macro_rules! command_table {
    ($($name:literal => $handler:path),* $(,)?) => {{
        let mut handlers: BTreeMap<&'static str, Handler> = BTreeMap::new();
        $(
            handlers.insert($name, {
                fn wrapped<'a>(ctx: &'a Context, params: &'a Params) -> HandlerFuture<'a> {
                    Box::pin($handler(ctx, params))
                }
                wrapped
            });
        )*
        handlers
    }};
}

/// Maps command names to their handlers
pub struct CommandTable {
    handlers: BTreeMap<&'static str, Handler>,
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTable {
    pub fn new() -> Self {
        let handlers = command_table! {
            "show_interfaces" => show::show_interfaces,
            "show_interface_detail" => show::show_interface_detail,
            "show_ip_interface_brief" => show::show_interfaces,
            "show_ip_route" => show::show_ip_route,
            "show_bond" => show::show_bond,
            "show_lcp" => show::show_lcp,
            "show_running_config" => show::show_running_config,
            "show_version" => show::show_version,
            "show_hardware" => show::show_hardware,
            "configure_interface" => interface::configure_interface,
            "exit_interface" => interface::exit_interface,
            "interface_ip_address" => interface::ip_address,
            "interface_no_ip_address" => interface::no_ip_address,
            "interface_up" => interface::up,
            "interface_down" => interface::down,
            "interface_mtu" => interface::mtu,
            "create_loopback" => interface::create_loopback,
            "create_tap" => interface::create_tap,
            "lcp_create" => interface::lcp_create,
            "ip_route_add" => route::add,
            "ip_route_del" => route::del,
            "ping" => system::ping,
            "write_memory" => system::write_memory,
        };
        CommandTable { handlers }
    }

    pub fn get(&self, name: &str) -> Option<Handler> {
        self.handlers.get(name).copied()
    }

    /// Registered command names, sorted
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    pub async fn dispatch(&self, name: &str, ctx: &Context, params: &Params) -> Result<String> {
        let handler = self
            .get(name)
            .ok_or_else(|| Error::UnknownCommand(name.into()))?;
        log::debug!("cmd: dispatching {}", name);
        handler(ctx, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_last_wins() {
        let params = Params::from_pairs([("interface", "eth0"), ("interface", "eth1")]);
        assert_eq!(params.get("interface"), Some("eth1"));
        assert_eq!(params.get("mask"), None);
    }

    #[test]
    fn test_params_parse_args() {
        let params =
            Params::parse_args(&["address=10.0.0.1", "mask=255.255.255.0", "address=10.0.0.2"])
                .unwrap();
        assert_eq!(params.get("address"), Some("10.0.0.2"));
        assert_eq!(params.get("mask"), Some("255.255.255.0"));
        assert!(Params::parse_args(&["oops"]).is_err());
        assert!(Params::parse_args(&["=x"]).is_err());

        let params = Params::parse_args(&["name="]).unwrap();
        assert!(matches!(
            params.require("name"),
            Err(Error::MissingParameter(ref n)) if n == "name"
        ));
    }

    #[test]
    fn test_table_names() {
        let table = CommandTable::new();
        let names: Vec<&str> = table.names().collect();
        assert!(names.contains(&"show_interfaces"));
        assert!(names.contains(&"configure_interface"));
        assert!(names.contains(&"write_memory"));
        assert!(table.get("no_such_command").is_none());
    }

    #[tokio::test]
    async fn test_dispatch_unknown() {
        let ctx = Context::new(Config::default(), SessionKey::new("t").unwrap());
        let err = CommandTable::new()
            .dispatch("frobnicate", &ctx, &Params::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownCommand(ref n) if n == "frobnicate"));
    }

    #[test]
    fn test_target_interface() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config {
            session_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let ctx = Context::new(config, SessionKey::new("t").unwrap());
        assert!(matches!(
            ctx.target_interface(&Params::new()),
            Err(Error::NotInConfigMode)
        ));
        ctx.sessions.set_current(&ctx.session, "loop1").unwrap();
        assert_eq!(ctx.target_interface(&Params::new()).unwrap(), "loop1");
        let params = Params::from_pairs([("interface", "eth0")]);
        assert_eq!(ctx.target_interface(&params).unwrap(), "eth0");
    }
}
