/// MTU assumed when `show interface` doesn't give us a usable one
pub const DEFAULT_MTU: u32 = 9000;

/// A network interface as reported by VPP, merged from `show interface` and
/// `show interface addr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRecord {
    pub name: String,
    pub is_up: bool,
    /// L3 MTU
    pub mtu: u32,
    /// Addresses in address/prefix format, in the order VPP lists them
    pub addresses: Vec<String>,
}

impl InterfaceRecord {
    /// Merges the two reports by interface name. Order follows `states`;
    /// interfaces that only show up in `addresses` are appended after, with
    /// the default MTU.
    pub fn merge(states: Vec<InterfaceState>, addresses: Vec<InterfaceAddresses>) -> Vec<Self> {
        let mut result: Vec<Self> = states
            .into_iter()
            .map(|s| InterfaceRecord {
                name: s.name,
                is_up: s.is_up,
                mtu: s.mtu,
                addresses: vec![],
            })
            .collect();
        for group in addresses {
            if let Some(record) = result.iter_mut().find(|r| r.name == group.name) {
                record.addresses = group.addresses;
            } else {
                log::trace!("ifc: {} only present in address report", group.name);
                result.push(InterfaceRecord {
                    name: group.name,
                    is_up: group.is_up,
                    mtu: DEFAULT_MTU,
                    addresses: group.addresses,
                });
            }
        }
        result
    }

    #[inline]
    pub fn kind(&self) -> InterfaceKind {
        InterfaceKind::classify(&self.name)
    }
}

/// One line of `show interface`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceState {
    pub name: String,
    pub index: u32,
    pub is_up: bool,
    pub mtu: u32,
}

impl InterfaceState {
    /// Parses the tabular `show interface` report:
    ///
    /// ```text
    ///               Name               Idx    State  MTU (L3/IP4/IP6/MPLS)     Counter          Count
    /// GigabitEthernet0/8/0              1      up          9000/0/0/0     rx packets                     6
    ///                                                                     rx bytes                     360
    /// local0                            0     down          0/0/0/0
    /// ```
    ///
    /// The header, the indented counter lines, and anything that does not
    /// start with a name and a numeric index are skipped.
    pub fn from_report(content: &str) -> Vec<Self> {
        let mut result = vec![];
        for line in content.lines() {
            if line.is_empty()
                || line.starts_with(char::is_whitespace)
                || line.split_ascii_whitespace().any(|t| t == "Idx")
            {
                continue;
            }
            let mut it = line.split_ascii_whitespace();
            let (name, index) = match (it.next(), it.next().map(str::parse::<u32>)) {
                (Some(name), Some(Ok(index))) => (name, index),
                _ => {
                    log::trace!("ifc: skipping line {}", line);
                    continue;
                }
            };
            let is_up = it.next().map(|s| s.contains("up")).unwrap_or(false);
            let mtu = it
                .next()
                .and_then(|quad| quad.split('/').next())
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MTU);
            result.push(InterfaceState {
                name: name.into(),
                index,
                is_up,
                mtu,
            });
        }
        result
    }
}

/// One group of `show interface addr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddresses {
    pub name: String,
    pub is_up: bool,
    pub addresses: Vec<String>,
}

impl InterfaceAddresses {
    /// Parses the grouped `show interface addr` report:
    ///
    /// ```text
    /// GigabitEthernet0/8/0 (up):
    ///   L3 10.0.0.1/24
    ///   L3 10.0.0.2/32 ip4 table-id 10 fib-idx 1
    /// local0 (dn):
    /// ```
    ///
    /// At most `max_addresses` are kept per interface; the rest are dropped
    /// with a warning.
    pub fn from_report(content: &str, max_addresses: usize) -> Vec<Self> {
        let mut result: Vec<Self> = vec![];
        // index into result of the group that indented lines belong to
        let mut current: Option<usize> = None;
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if !line.starts_with(char::is_whitespace) {
                current = None;
                if let Some(paren) = line.find('(') {
                    let name = line[..paren].trim();
                    if name.is_empty() {
                        log::trace!("ifc: header without a name {}", line);
                        continue;
                    }
                    let is_up = line[paren..].contains("up");
                    current = match result.iter().position(|g| g.name == name) {
                        Some(idx) => Some(idx),
                        None => {
                            result.push(InterfaceAddresses {
                                name: name.into(),
                                is_up,
                                addresses: vec![],
                            });
                            Some(result.len() - 1)
                        }
                    };
                }
                continue;
            }

            let idx = match current {
                Some(idx) => idx,
                None => continue,
            };
            if let Some(pos) = line.find("L3 ") {
                if let Some(cidr) = line[(pos + 3)..].split_ascii_whitespace().next() {
                    let group = &mut result[idx];
                    if group.addresses.len() < max_addresses {
                        group.addresses.push(cidr.into());
                    } else {
                        log::warn!(
                            "ifc: {} has more than {} addresses, dropping {}",
                            group.name,
                            max_addresses,
                            cidr
                        );
                    }
                }
            }
        }
        result
    }
}

/// What an interface name tells us about how the interface came to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceKind {
    /// `loopN`
    Loopback(u32),
    /// `BondEthernetN`
    Bond(u32),
    /// `parent.vlan`, with vlan in 1..=4095
    SubInterface { parent: String, vlan: u16 },
    /// `tapN`, usually created by the linux control plane
    Tap,
    /// VPP's internal `local0`
    Local,
    Physical,
}

impl InterfaceKind {
    pub fn classify(name: &str) -> Self {
        if name == "local0" {
            return InterfaceKind::Local;
        }
        if let Some((parent, vlan)) = name.rsplit_once('.') {
            if let Ok(vlan) = vlan.parse::<u16>() {
                if !parent.is_empty() && vlan > 0 && vlan < 4096 {
                    return InterfaceKind::SubInterface {
                        parent: parent.into(),
                        vlan,
                    };
                }
            }
        }
        if let Some(n) = numeric_suffix(name, "loop") {
            InterfaceKind::Loopback(n)
        } else if let Some(n) = numeric_suffix(name, "BondEthernet") {
            InterfaceKind::Bond(n)
        } else if numeric_suffix(name, "tap").is_some() {
            InterfaceKind::Tap
        } else {
            InterfaceKind::Physical
        }
    }

    /// The VPP command that creates this interface, for kinds that can be
    /// created from their name alone
    pub fn creation_command(&self) -> Option<String> {
        match self {
            InterfaceKind::Loopback(n) => Some(format!("create loopback interface instance {}", n)),
            InterfaceKind::SubInterface { parent, vlan } => {
                Some(format!("create sub-interfaces {} {}", parent, vlan))
            }
            _ => None,
        }
    }
}

fn numeric_suffix(name: &str, prefix: &str) -> Option<u32> {
    let digits = name.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_INTERFACE: &str = "              Name               Idx    State  MTU (L3/IP4/IP6/MPLS)     Counter          Count
GigabitEthernet0/8/0              1      up          1500/0/0/0     rx packets                     6
                                                                    rx bytes                     360
                                                                    drops                          6
local0                            0     down          0/0/0/0
loop0                             2      up          9000/0/0/0
tap1                              3      up
";

    const SHOW_INTERFACE_ADDR: &str = "GigabitEthernet0/8/0 (up):
  L3 10.0.0.1/24
  L3 10.0.0.2/32 ip4 table-id 10 fib-idx 1
local0 (dn):
loop0 (up):
  L3 192.168.100.1/32
";

    #[test]
    fn test_state_report() {
        let _ = env_logger::try_init();
        let states = InterfaceState::from_report(SHOW_INTERFACE);
        assert_eq!(states.len(), 4);
        assert_eq!(states[0].name, "GigabitEthernet0/8/0");
        assert_eq!(states[0].index, 1);
        assert!(states[0].is_up);
        assert_eq!(states[0].mtu, 1500);
        assert_eq!(states[1].name, "local0");
        assert!(!states[1].is_up);
        assert_eq!(states[1].mtu, 0);
        assert_eq!(states[2].mtu, 9000);
        // no MTU column at all
        assert_eq!(states[3].name, "tap1");
        assert_eq!(states[3].mtu, DEFAULT_MTU);
    }

    #[test]
    fn test_state_report_name_with_idx() {
        let states = InterfaceState::from_report(
            "Name  Idx  State  MTU\nvxlanIdx7                         4      up          1500/0/0/0\n",
        );
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].name, "vxlanIdx7");
        assert_eq!(states[0].index, 4);
    }

    #[test]
    fn test_state_report_skips_garbage() {
        let states = InterfaceState::from_report("\nvpp# \nsomething weird\n  indented 1 up\n");
        assert!(states.is_empty());
    }

    #[test]
    fn test_address_report() {
        let _ = env_logger::try_init();
        let groups = InterfaceAddresses::from_report(SHOW_INTERFACE_ADDR, 8);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].name, "GigabitEthernet0/8/0");
        assert!(groups[0].is_up);
        assert_eq!(groups[0].addresses, vec!["10.0.0.1/24", "10.0.0.2/32"]);
        assert!(!groups[1].is_up);
        assert!(groups[1].addresses.is_empty());
        assert_eq!(groups[2].addresses, vec!["192.168.100.1/32"]);
    }

    #[test]
    fn test_address_report_orphans_and_cap() {
        let content = "  L3 1.1.1.1/32\n(weird):\n  L3 2.2.2.2/32\nloop1 (up):\n  L3 10.0.0.1/32\n  L3 10.0.0.2/32\n  L3 10.0.0.3/32\n";
        let groups = InterfaceAddresses::from_report(content, 2);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].addresses, vec!["10.0.0.1/32", "10.0.0.2/32"]);
    }

    #[test]
    fn test_merge() {
        let states = InterfaceState::from_report(
            "ifX                               5      up          1500/0/0/0\nifY                               6     down         9000/0/0/0\n",
        );
        let addrs = InterfaceAddresses::from_report(
            "ifX (up):\n  L3 10.0.0.1/24\n  L3 10.0.0.2/32\nifZ (dn):\n  L3 172.16.0.1/16\n",
            8,
        );
        let merged = InterfaceRecord::merge(states, addrs);
        assert_eq!(merged.len(), 3);
        assert_eq!(
            merged[0],
            InterfaceRecord {
                name: "ifX".into(),
                is_up: true,
                mtu: 1500,
                addresses: vec!["10.0.0.1/24".into(), "10.0.0.2/32".into()],
            }
        );
        assert_eq!(merged[1].name, "ifY");
        assert!(merged[1].addresses.is_empty());
        assert_eq!(merged[2].name, "ifZ");
        assert!(!merged[2].is_up);
        assert_eq!(merged[2].mtu, DEFAULT_MTU);
    }

    #[test]
    fn test_classify() {
        assert_eq!(InterfaceKind::classify("loop5"), InterfaceKind::Loopback(5));
        assert_eq!(InterfaceKind::classify("loopback"), InterfaceKind::Physical);
        assert_eq!(InterfaceKind::classify("BondEthernet0"), InterfaceKind::Bond(0));
        assert_eq!(InterfaceKind::classify("tap4096"), InterfaceKind::Tap);
        assert_eq!(InterfaceKind::classify("local0"), InterfaceKind::Local);
        assert_eq!(
            InterfaceKind::classify("GigabitEthernet0/8/0.100"),
            InterfaceKind::SubInterface {
                parent: "GigabitEthernet0/8/0".into(),
                vlan: 100
            }
        );
        assert_eq!(InterfaceKind::classify("eth0.0"), InterfaceKind::Physical);
        assert_eq!(InterfaceKind::classify("eth0.4096"), InterfaceKind::Physical);
        assert_eq!(InterfaceKind::classify(".10"), InterfaceKind::Physical);
    }

    #[test]
    fn test_creation_command() {
        assert_eq!(
            InterfaceKind::classify("loop5").creation_command().as_deref(),
            Some("create loopback interface instance 5")
        );
        assert_eq!(
            InterfaceKind::classify("eth1.42").creation_command().as_deref(),
            Some("create sub-interfaces eth1 42")
        );
        assert!(InterfaceKind::classify("eth1").creation_command().is_none());
    }
}
