//! Module for IP routes and prefix handling

use std::net::{IpAddr, Ipv4Addr};

use crate::{Error, Result};

/// Prefix length used for a route when no mask is given
pub const DEFAULT_ROUTE_PREFIX_LEN: u8 = 24;

/// Converts a netmask to a prefix length.
///
/// Accepts either a dotted IPv4 mask, which must be contiguous, or a bare
/// prefix length (`24`, `/24`).
pub fn prefix_len_from_mask(mask: &str) -> Result<u8> {
    let mask = mask.trim();
    if let Some(len) = mask.strip_prefix('/').or(Some(mask)).and_then(|m| m.parse::<u8>().ok()) {
        if len <= 32 {
            return Ok(len);
        }
        return Err(Error::InvalidArgument(format!("prefix length {} out of range", len)));
    }
    let bits = u32::from(
        mask.parse::<Ipv4Addr>()
            .map_err(|_| Error::InvalidArgument(format!("'{}' is not a netmask", mask)))?,
    );
    let len = bits.leading_ones();
    if bits.checked_shl(len).unwrap_or(0) != 0 {
        return Err(Error::InvalidArgument(format!(
            "'{}' is not a contiguous netmask",
            mask
        )));
    }
    Ok(len as u8)
}

/// Builds `address/len` out of an address and an optional mask. If `address`
/// is already in CIDR form, the mask is ignored; otherwise the mask is
/// required unless a `default_len` is given.
pub fn to_cidr(address: &str, mask: Option<&str>, default_len: Option<u8>) -> Result<String> {
    let (addr, len) = match address.split_once('/') {
        Some((addr, len)) => (
            addr,
            len.parse::<u8>()
                .map_err(|_| Error::InvalidArgument(format!("'{}' is not a prefix length", len)))?,
        ),
        None => {
            let len = match (mask, default_len) {
                (Some(mask), _) => prefix_len_from_mask(mask)?,
                (None, Some(len)) => len,
                (None, None) => return Err(Error::missing("mask")),
            };
            (address, len)
        }
    };
    let ip: IpAddr = addr
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("'{}' is not an IP address", addr)))?;
    let max_len = if ip.is_ipv4() { 32 } else { 128 };
    if len > max_len {
        return Err(Error::InvalidArgument(format!("prefix length {} out of range", len)));
    }
    Ok(format!("{}/{}", ip, len))
}

/// A request to add or remove a static route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    /// Destination, in address/prefix format
    pub network: String,
    pub gateway: String,
}

impl RouteRequest {
    pub fn new(network: &str, mask: Option<&str>, gateway: &str) -> Result<Self> {
        let network = to_cidr(network, mask, Some(DEFAULT_ROUTE_PREFIX_LEN))?;
        let gateway: IpAddr = gateway
            .parse()
            .map_err(|_| Error::InvalidArgument(format!("'{}' is not a gateway address", gateway)))?;
        Ok(RouteRequest {
            network,
            gateway: gateway.to_string(),
        })
    }

    pub fn add_command(&self) -> String {
        format!("ip route add {} via {}", self.network, self.gateway)
    }

    pub fn del_command(&self) -> String {
        format!("ip route del {} via {}", self.network, self.gateway)
    }
}

/// One prefix of `show ip fib`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub prefix: String,
    pub gateway: Option<String>,
    pub interface: Option<String>,
}

impl RouteEntry {
    /// Parses `show ip fib`:
    ///
    /// ```text
    /// ipv4-VRF:0, fib_index:0, flow hash:[src dst sport dport proto ] locks:[default-route:1, ]
    /// 0.0.0.0/0
    ///   unicast-ip4-chain
    ///   [@0]: dpo-load-balance: [proto:ip4 index:1 buckets:1 uRPF:0 to:[0:0]]
    ///     [0] [@0]: dpo-drop ip4
    /// 10.1.0.0/16
    ///   unicast-ip4-chain
    ///   [@0]: dpo-load-balance: [proto:ip4 index:16 buckets:1 uRPF:15 to:[0:0]]
    ///     [0] [@5]: ipv4 via 10.0.0.254 GigabitEthernet0/8/0: mtu:9000 next:3
    /// ```
    ///
    /// Only the first next hop of each prefix is kept.
    pub fn from_report(content: &str) -> Vec<Self> {
        let mut result: Vec<Self> = vec![];
        let mut in_entry = false;
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if !line.starts_with(char::is_whitespace) {
                in_entry = false;
                let token = line.split_ascii_whitespace().next().unwrap_or("");
                if is_prefix(token) {
                    result.push(RouteEntry {
                        prefix: token.into(),
                        gateway: None,
                        interface: None,
                    });
                    in_entry = true;
                } else {
                    log::trace!("route: skipping line {}", line);
                }
                continue;
            }
            if !in_entry {
                continue;
            }
            let entry = match result.last_mut() {
                Some(entry) if entry.gateway.is_none() => entry,
                _ => continue,
            };
            let mut it = line.split_ascii_whitespace().skip_while(|t| *t != "via");
            if it.next().is_some() {
                entry.gateway = it.next().map(|gw| gw.to_owned());
                entry.interface = it
                    .next()
                    .map(|ifc| ifc.trim_end_matches(':').to_owned())
                    .filter(|ifc| !ifc.is_empty());
            }
        }
        result
    }

    /// Returns true for a host route whose next hop is the host itself.
    /// VPP lists those for resolved neighbours; they are not configuration.
    pub fn is_adjacency(&self) -> bool {
        let (addr, len) = match self.prefix.split_once('/') {
            Some(split) => split,
            None => return false,
        };
        let host_len = match addr.parse::<IpAddr>() {
            Ok(IpAddr::V4(_)) => "32",
            Ok(IpAddr::V6(_)) => "128",
            Err(_) => return false,
        };
        len == host_len && self.gateway.as_deref() == Some(addr)
    }
}

fn is_prefix(token: &str) -> bool {
    match token.split_once('/') {
        Some((addr, len)) => addr.parse::<IpAddr>().is_ok() && len.parse::<u8>().is_ok(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_len_from_mask() {
        assert_eq!(prefix_len_from_mask("255.255.255.255").unwrap(), 32);
        assert_eq!(prefix_len_from_mask("255.255.255.128").unwrap(), 25);
        assert_eq!(prefix_len_from_mask("255.255.192.0").unwrap(), 18);
        assert_eq!(prefix_len_from_mask("255.0.0.0").unwrap(), 8);
        assert_eq!(prefix_len_from_mask("0.0.0.0").unwrap(), 0);
        assert_eq!(prefix_len_from_mask("/30").unwrap(), 30);
        assert_eq!(prefix_len_from_mask("16").unwrap(), 16);
        assert!(prefix_len_from_mask("255.0.255.0").is_err());
        assert!(prefix_len_from_mask("33").is_err());
        assert!(prefix_len_from_mask("bogus").is_err());
    }

    #[test]
    fn test_to_cidr() {
        assert_eq!(
            to_cidr("10.0.0.1", Some("255.255.255.0"), None).unwrap(),
            "10.0.0.1/24"
        );
        assert_eq!(to_cidr("10.0.0.1/30", None, None).unwrap(), "10.0.0.1/30");
        assert_eq!(to_cidr("2001:db8::1/64", None, None).unwrap(), "2001:db8::1/64");
        assert!(matches!(
            to_cidr("10.0.0.1", None, None),
            Err(Error::MissingParameter(ref p)) if p == "mask"
        ));
        assert!(to_cidr("10.0.0", Some("24"), None).is_err());
    }

    #[test]
    fn test_route_request() {
        let req = RouteRequest::new("10.1.0.0", None, "10.0.0.254").unwrap();
        assert_eq!(req.add_command(), "ip route add 10.1.0.0/24 via 10.0.0.254");

        let req = RouteRequest::new("0.0.0.0", Some("0.0.0.0"), "10.0.0.254").unwrap();
        assert_eq!(req.del_command(), "ip route del 0.0.0.0/0 via 10.0.0.254");

        assert!(RouteRequest::new("10.1.0.0", None, "gateway").is_err());
    }

    #[test]
    fn test_fib_report() {
        let _ = env_logger::try_init();
        let content = "ipv4-VRF:0, fib_index:0, flow hash:[src dst sport dport proto flowlabel ] epoch:0 flags:none locks:[default-route:1, ]
0.0.0.0/0
  unicast-ip4-chain
  [@0]: dpo-load-balance: [proto:ip4 index:1 buckets:1 uRPF:0 to:[0:0]]
    [0] [@0]: dpo-drop ip4
10.0.0.0/24
  unicast-ip4-chain
  [@0]: dpo-load-balance: [proto:ip4 index:10 buckets:1 uRPF:9 to:[0:0]]
    [0] [@4]: ipv4-glean: [src:10.0.0.0/24] GigabitEthernet0/8/0: mtu:9000 next:1
10.1.0.0/16
  unicast-ip4-chain
  [@0]: dpo-load-balance: [proto:ip4 index:16 buckets:1 uRPF:15 to:[0:0]]
    [0] [@5]: ipv4 via 10.0.0.254 GigabitEthernet0/8/0: mtu:9000 next:3 flags:[]
    [1] [@5]: ipv4 via 10.0.0.253 GigabitEthernet0/8/0: mtu:9000 next:3 flags:[]
10.0.0.2/32
  unicast-ip4-chain
  [@0]: dpo-load-balance: [proto:ip4 index:18 buckets:1 uRPF:17 to:[0:0]]
    [0] [@5]: ipv4 via 10.0.0.2 GigabitEthernet0/8/0: mtu:9000 next:4 flags:[]
";
        let routes = RouteEntry::from_report(content);
        assert_eq!(routes.len(), 4);
        assert!(routes[3].is_adjacency());
        assert!(!routes[2].is_adjacency());
        assert!(!routes[0].is_adjacency());
        assert_eq!(routes[0].prefix, "0.0.0.0/0");
        assert!(routes[0].gateway.is_none());
        assert_eq!(routes[1].prefix, "10.0.0.0/24");
        assert!(routes[1].gateway.is_none());
        assert_eq!(routes[2].prefix, "10.1.0.0/16");
        assert_eq!(routes[2].gateway.as_deref(), Some("10.0.0.254"));
        assert_eq!(routes[2].interface.as_deref(), Some("GigabitEthernet0/8/0"));
    }

    #[test]
    fn test_adjacency() {
        let entry = |prefix: &str, gw: &str| RouteEntry {
            prefix: prefix.into(),
            gateway: Some(gw.into()),
            interface: None,
        };
        assert!(entry("10.0.0.2/32", "10.0.0.2").is_adjacency());
        assert!(entry("2001:db8::2/128", "2001:db8::2").is_adjacency());
        // a real host route through another router
        assert!(!entry("10.9.9.9/32", "10.0.0.254").is_adjacency());
        assert!(!entry("10.0.0.0/24", "10.0.0.0").is_adjacency());
    }
}
