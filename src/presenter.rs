//! Rendering of scraped records, either as router-style tables or as a
//! replayable configuration script.

use std::fmt::Write;

use chrono::{DateTime, TimeZone};

use crate::{BondRecord, InterfaceKind, InterfaceRecord, LcpPair, RouteEntry, DEFAULT_MTU};

/// Placeholder for interfaces without any address
pub const UNASSIGNED: &str = "unassigned";

fn state_str(is_up: bool) -> &'static str {
    if is_up {
        "up"
    } else {
        "down"
    }
}

/// Renders interfaces the way a router's `show ip interface brief` does.
/// Interfaces with several addresses take one row per address, and only
/// the first of those rows carries the other columns.
pub fn interface_table(records: &[InterfaceRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:<20} {:<6} {:<6} {}",
        "Interface", "IP-Address", "MTU", "Status", "Protocol"
    );
    for record in records {
        let state = state_str(record.is_up);
        let first = record
            .addresses
            .first()
            .map(String::as_str)
            .unwrap_or(UNASSIGNED);
        let _ = writeln!(
            out,
            "{:<16} {:<20} {:<6} {:<6} {}",
            record.name, first, record.mtu, state, state
        );
        for address in record.addresses.iter().skip(1) {
            let _ = writeln!(out, "{:<16} {}", "", address);
        }
    }
    out
}

pub fn route_table(routes: &[RouteEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<20} {:<18} {}", "Destination", "Gateway", "Interface");
    for route in routes {
        let _ = writeln!(
            out,
            "{:<20} {:<18} {}",
            route.prefix,
            route.gateway.as_deref().unwrap_or("-"),
            route.interface.as_deref().unwrap_or("-"),
        );
    }
    out
}

pub fn bond_table(bonds: &[BondRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:<14} {:<12} {}",
        "Bond", "Mode", "Load-Balance", "Members"
    );
    for bond in bonds {
        let _ = writeln!(
            out,
            "{:<16} {:<14} {:<12} {}",
            bond.name,
            bond.mode.as_deref().unwrap_or("-"),
            bond.load_balance.as_deref().unwrap_or("-"),
            if bond.members.is_empty() {
                "-".to_owned()
            } else {
                bond.members.join(", ")
            },
        );
    }
    out
}

pub fn lcp_table(pairs: &[LcpPair]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<24} {:<10} {}", "Interface", "Tap", "Host-Interface");
    for pair in pairs {
        let _ = writeln!(out, "{:<24} {:<10} {}", pair.phy, pair.tap, pair.host_if);
    }
    out
}

/// Everything needed to regenerate the configuration of a running VPP
#[derive(Debug, Clone, Default)]
pub struct RunningConfig {
    pub interfaces: Vec<InterfaceRecord>,
    pub bonds: Vec<BondRecord>,
    pub routes: Vec<RouteEntry>,
    pub lcp_pairs: Vec<LcpPair>,
}

impl RunningConfig {
    /// Renders the configuration as a script. Groups come out in dependency
    /// order: loopbacks, bonds, VLAN sub-interfaces, interface blocks,
    /// static routes, and LCP pairs last. Empty groups are left out.
    pub fn render_script(&self) -> String {
        let mut out = String::new();

        let loopbacks: Vec<String> = self
            .interfaces
            .iter()
            .filter_map(|r| match r.kind() {
                k @ InterfaceKind::Loopback(_) => k.creation_command(),
                _ => None,
            })
            .collect();
        section(&mut out, "Loopback interfaces", &loopbacks);

        let bonds: Vec<String> = self
            .bonds
            .iter()
            .flat_map(|b| b.creation_command().into_iter().chain(b.member_commands()))
            .collect();
        section(&mut out, "Bond interfaces", &bonds);

        let vlans: Vec<String> = self
            .interfaces
            .iter()
            .filter_map(|r| match r.kind() {
                k @ InterfaceKind::SubInterface { .. } => k.creation_command(),
                _ => None,
            })
            .collect();
        section(&mut out, "VLAN sub-interfaces", &vlans);

        let blocks: Vec<String> = self
            .interfaces
            .iter()
            .filter(|r| !matches!(r.kind(), InterfaceKind::Local | InterfaceKind::Tap))
            .flat_map(interface_block)
            .collect();
        section(&mut out, "Interfaces", &blocks);

        let routes: Vec<String> = self
            .routes
            .iter()
            .filter(|r| !r.is_adjacency())
            .filter_map(|r| Some(format!("ip route add {} via {}", r.prefix, r.gateway.as_ref()?)))
            .collect();
        section(&mut out, "Static routes", &routes);

        let lcp: Vec<String> = self.lcp_pairs.iter().map(LcpPair::creation_command).collect();
        section(&mut out, "Linux control plane", &lcp);

        out.push_str("end\n");
        out
    }

    /// The script with the header block written to saved configuration files
    pub fn render_export<Tz: TimeZone>(&self, generated_at: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut out = String::new();
        out.push_str("!\n");
        out.push_str("! VPP configuration saved by vppsh\n");
        let _ = writeln!(out, "! Generated at {}", generated_at.format("%Y-%m-%d %H:%M:%S %z"));
        out.push_str("! Lines starting with '!' are comments\n");
        out.push_str(&self.render_script());
        out
    }
}

fn interface_block(record: &InterfaceRecord) -> Vec<String> {
    let mut lines = vec![format!("interface {}", record.name)];
    if record.mtu != DEFAULT_MTU && record.mtu != 0 {
        lines.push(format!(" mtu {}", record.mtu));
    }
    lines.extend(record.addresses.iter().map(|a| format!(" ip address {}", a)));
    lines.push(if record.is_up {
        " no shutdown".to_owned()
    } else {
        " shutdown".to_owned()
    });
    lines.push("exit".to_owned());
    lines
}

fn section(out: &mut String, title: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    let _ = writeln!(out, "!\n! {}", title);
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn record(name: &str, is_up: bool, mtu: u32, addresses: &[&str]) -> InterfaceRecord {
        InterfaceRecord {
            name: name.into(),
            is_up,
            mtu,
            addresses: addresses.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_table_unassigned() {
        let table = interface_table(&[record("loop0", false, 9000, &[])]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Interface        IP-Address"));
        assert_eq!(
            lines[1],
            format!("{:<16} {:<20} {:<6} {:<6} {}", "loop0", "unassigned", 9000, "down", "down")
        );
    }

    #[test]
    fn test_table_multiple_addresses() {
        let table = interface_table(&[record(
            "GigabitEthernet0/8/0",
            true,
            1500,
            &["10.0.0.1/24", "10.0.0.2/32"],
        )]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("GigabitEthernet0/8/0 10.0.0.1/24"));
        assert_eq!(lines[2], format!("{:<16} {}", "", "10.0.0.2/32"));
        assert!(lines[2].trim_start().starts_with("10.0.0.2/32"));
        assert_eq!(lines[2].find("10.0.0.2/32"), Some(17));
    }

    #[test]
    fn test_route_table() {
        let table = route_table(&[RouteEntry {
            prefix: "10.1.0.0/16".into(),
            gateway: Some("10.0.0.254".into()),
            interface: None,
        }]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], format!("{:<20} {:<18} {}", "10.1.0.0/16", "10.0.0.254", "-"));
    }

    fn sample_config() -> RunningConfig {
        RunningConfig {
            interfaces: vec![
                record("local0", false, 0, &[]),
                record("GigabitEthernet0/8/0", true, 9000, &["10.0.0.1/24"]),
                record("GigabitEthernet0/8/0.100", true, 1500, &[]),
                record("loop0", true, 9000, &["192.168.100.1/32"]),
                record("BondEthernet0", false, 9000, &[]),
                record("tap1", true, 9000, &[]),
            ],
            bonds: vec![BondRecord {
                name: "BondEthernet0".into(),
                mode: Some("lacp".into()),
                load_balance: Some("l2".into()),
                members: vec!["GigabitEthernet0/9/0".into()],
            }],
            routes: vec![
                RouteEntry {
                    prefix: "10.0.0.0/24".into(),
                    gateway: None,
                    interface: None,
                },
                RouteEntry {
                    prefix: "10.1.0.0/16".into(),
                    gateway: Some("10.0.0.254".into()),
                    interface: Some("GigabitEthernet0/8/0".into()),
                },
                RouteEntry {
                    prefix: "10.0.0.2/32".into(),
                    gateway: Some("10.0.0.2".into()),
                    interface: Some("GigabitEthernet0/8/0".into()),
                },
            ],
            lcp_pairs: vec![LcpPair {
                index: 0,
                phy: "GigabitEthernet0/8/0".into(),
                tap: "tap1".into(),
                host_if: "eth0".into(),
            }],
        }
    }

    #[test]
    fn test_script_order() {
        let script = sample_config().render_script();
        let expected = "!
! Loopback interfaces
create loopback interface instance 0
!
! Bond interfaces
create bond mode lacp load-balance l2 id 0
bond add BondEthernet0 GigabitEthernet0/9/0
!
! VLAN sub-interfaces
create sub-interfaces GigabitEthernet0/8/0 100
!
! Interfaces
interface GigabitEthernet0/8/0
 ip address 10.0.0.1/24
 no shutdown
exit
interface GigabitEthernet0/8/0.100
 mtu 1500
 no shutdown
exit
interface loop0
 ip address 192.168.100.1/32
 no shutdown
exit
interface BondEthernet0
 shutdown
exit
!
! Static routes
ip route add 10.1.0.0/16 via 10.0.0.254
!
! Linux control plane
lcp create GigabitEthernet0/8/0 host-if eth0
end
";
        assert_eq!(script, expected);
    }

    #[test]
    fn test_script_skips_empty_groups() {
        let config = RunningConfig {
            interfaces: vec![record("GigabitEthernet0/8/0", false, 9000, &[])],
            ..Default::default()
        };
        assert_eq!(
            config.render_script(),
            "!\n! Interfaces\ninterface GigabitEthernet0/8/0\n shutdown\nexit\nend\n"
        );
        assert_eq!(RunningConfig::default().render_script(), "end\n");
    }

    #[test]
    fn test_export_header() {
        let at = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 12, 30, 0)
            .unwrap();
        let export = RunningConfig::default().render_export(&at);
        assert!(export.starts_with("!\n! VPP configuration saved by vppsh\n"));
        assert!(export.contains("! Generated at 2024-03-01 12:30:00 +0000\n"));
        assert!(export.ends_with("end\n"));
    }
}
