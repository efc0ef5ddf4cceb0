use crate::{Params, Result, RouteRequest};

use super::Context;

fn request(params: &Params) -> Result<RouteRequest> {
    RouteRequest::new(
        params.require("network")?,
        params.get("mask"),
        params.require("gateway")?,
    )
}

pub(super) async fn add(ctx: &Context, params: &Params) -> Result<String> {
    let route = request(params)?;
    ctx.configure(&route.add_command()).await?;
    Ok(format!("Route added: {} via {}\n", route.network, route.gateway))
}

pub(super) async fn del(ctx: &Context, params: &Params) -> Result<String> {
    let route = request(params)?;
    ctx.configure(&route.del_command()).await?;
    Ok(format!("Route deleted: {} via {}\n", route.network, route.gateway))
}
