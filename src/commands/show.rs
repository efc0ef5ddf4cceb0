use crate::{
    presenter, BondRecord, InterfaceAddresses, InterfaceRecord, InterfaceState, LcpPair,
    Params, Result, RouteEntry, RunningConfig,
};

use super::Context;

/// Queries both interface reports and merges them
pub(crate) async fn interface_records(ctx: &Context) -> Result<Vec<InterfaceRecord>> {
    let states = ctx.query("show interface").await?;
    let addresses = ctx.query("show interface addr").await?;
    Ok(InterfaceRecord::merge(
        InterfaceState::from_report(&states.text),
        InterfaceAddresses::from_report(&addresses.text, ctx.config.max_addresses_per_interface),
    ))
}

/// Gathers everything the configuration script is built from. Bonds and
/// LCP pairs come from plugins that may not be loaded, so failures there
/// just leave those groups empty.
pub(crate) async fn running_config(ctx: &Context) -> Result<RunningConfig> {
    let interfaces = interface_records(ctx).await?;
    let routes = RouteEntry::from_report(&ctx.query("show ip fib").await?.text);
    let bonds = BondRecord::from_report(&ctx.client.execute("show bond details").await.text);
    let lcp_pairs = LcpPair::from_report(&ctx.client.execute("show lcp").await.text);
    Ok(RunningConfig {
        interfaces,
        bonds,
        routes,
        lcp_pairs,
    })
}

pub(super) async fn show_interfaces(ctx: &Context, _params: &Params) -> Result<String> {
    let records = interface_records(ctx).await?;
    Ok(presenter::interface_table(&records))
}

pub(super) async fn show_interface_detail(ctx: &Context, _params: &Params) -> Result<String> {
    Ok(ctx.query("show interface addr").await?.text)
}

pub(super) async fn show_ip_route(ctx: &Context, _params: &Params) -> Result<String> {
    let reply = ctx.query("show ip fib").await?;
    Ok(presenter::route_table(&RouteEntry::from_report(&reply.text)))
}

pub(super) async fn show_bond(ctx: &Context, _params: &Params) -> Result<String> {
    let reply = ctx.query("show bond details").await?;
    Ok(presenter::bond_table(&BondRecord::from_report(&reply.text)))
}

pub(super) async fn show_lcp(ctx: &Context, _params: &Params) -> Result<String> {
    let reply = ctx.query("show lcp").await?;
    Ok(presenter::lcp_table(&LcpPair::from_report(&reply.text)))
}

pub(super) async fn show_running_config(ctx: &Context, _params: &Params) -> Result<String> {
    let config = running_config(ctx).await?;
    Ok(format!(
        "Building configuration...\n\nCurrent configuration:\n{}",
        config.render_script()
    ))
}

pub(super) async fn show_version(ctx: &Context, _params: &Params) -> Result<String> {
    Ok(ctx.client.execute("show version").await.text)
}

pub(super) async fn show_hardware(ctx: &Context, _params: &Params) -> Result<String> {
    Ok(ctx.client.execute("show hardware-interfaces").await.text)
}
