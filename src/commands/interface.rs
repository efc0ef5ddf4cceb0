//! Interface configuration mode and the commands that run inside it

use crate::{to_cidr, Error, InterfaceKind, Params, Result};

use super::Context;

/// `interface <name>`: enters configuration mode for an interface.
///
/// Loopbacks (`loopN`) and VLAN sub-interfaces (`parent.vlan`) are created
/// on the way in. Re-entering one that already exists is fine.
pub(super) async fn configure_interface(ctx: &Context, params: &Params) -> Result<String> {
    let name = params.require("interface")?;
    if let Some(command) = InterfaceKind::classify(name).creation_command() {
        let reply = ctx.client.execute(&command).await;
        if reply.is_already_exists() {
            log::debug!("cmd: {} already exists", name);
        } else if reply.is_error() {
            return Err(Error::EngineError(reply.text));
        } else {
            log::info!("cmd: created {}", name);
        }
    }
    ctx.sessions.set_current(&ctx.session, name)?;
    Ok(String::new())
}

pub(super) async fn exit_interface(ctx: &Context, _params: &Params) -> Result<String> {
    ctx.sessions.clear_current(&ctx.session)?;
    Ok(String::new())
}

pub(super) async fn ip_address(ctx: &Context, params: &Params) -> Result<String> {
    let iface = ctx.target_interface(params)?;
    let cidr = to_cidr(params.require("address")?, params.get("mask"), None)?;
    ctx.configure(&format!("set interface ip address {} {}", iface, cidr))
        .await?;
    Ok(format!("IP address {} configured on {}\n", cidr, iface))
}

pub(super) async fn no_ip_address(ctx: &Context, params: &Params) -> Result<String> {
    let iface = ctx.target_interface(params)?;
    let cidr = to_cidr(params.require("address")?, params.get("mask"), None)?;
    ctx.configure(&format!("set interface ip address del {} {}", iface, cidr))
        .await?;
    Ok(format!("IP address {} removed from {}\n", cidr, iface))
}

pub(super) async fn up(ctx: &Context, params: &Params) -> Result<String> {
    let iface = ctx.target_interface(params)?;
    ctx.configure(&format!("set interface state {} up", iface))
        .await?;
    Ok(format!("Interface {} is now up\n", iface))
}

pub(super) async fn down(ctx: &Context, params: &Params) -> Result<String> {
    let iface = ctx.target_interface(params)?;
    ctx.configure(&format!("set interface state {} down", iface))
        .await?;
    Ok(format!("Interface {} is now administratively down\n", iface))
}

pub(super) async fn mtu(ctx: &Context, params: &Params) -> Result<String> {
    let iface = ctx.target_interface(params)?;
    let mtu: u32 = params.require("mtu")?.parse()?;
    ctx.configure(&format!("set interface mtu {} {}", mtu, iface))
        .await?;
    Ok(format!("MTU of {} set to {}\n", iface, mtu))
}

pub(super) async fn create_loopback(ctx: &Context, _params: &Params) -> Result<String> {
    Ok(ctx.configure("create loopback interface").await?.text)
}

pub(super) async fn create_tap(ctx: &Context, params: &Params) -> Result<String> {
    let id: u32 = params.get("id").unwrap_or("0").parse()?;
    let command = match params.get("name") {
        Some(name) => format!("create tap id {} host-if-name {}", id, name),
        None => format!("create tap id {}", id),
    };
    Ok(ctx.configure(&command).await?.text)
}

/// Pairs an interface with a linux tap of the given host name
pub(super) async fn lcp_create(ctx: &Context, params: &Params) -> Result<String> {
    let iface = ctx.target_interface(params)?;
    let host_if = params.require("host-if")?;
    ctx.configure(&format!("lcp create {} host-if {}", iface, host_if))
        .await?;
    Ok(format!("Interface {} paired with host interface {}\n", iface, host_if))
}
