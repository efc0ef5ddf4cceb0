/// A bond interface, as reported by `show bond details`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondRecord {
    pub name: String,
    pub mode: Option<String>,
    pub load_balance: Option<String>,
    /// Member interfaces, in the order VPP lists them
    pub members: Vec<String>,
}

impl BondRecord {
    /// Parses `show bond details`:
    ///
    /// ```text
    /// BondEthernet0
    ///   mode: lacp
    ///   load balance: l2
    ///   number of active members: 1
    ///     GigabitEthernet0/8/0
    ///   number of members: 2
    ///     GigabitEthernet0/8/0
    ///     GigabitEthernet0/9/0
    ///   device instance: 0
    /// ```
    ///
    /// Older VPP releases say "slaves" instead of "members"; both are accepted.
    pub fn from_report(content: &str) -> Vec<Self> {
        let mut result: Vec<Self> = vec![];
        let mut collecting_members = false;
        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !line.starts_with(char::is_whitespace) {
                collecting_members = false;
                if trimmed.contains(char::is_whitespace) || trimmed.contains(':') {
                    log::trace!("bond: skipping line {}", line);
                    continue;
                }
                result.push(BondRecord {
                    name: trimmed.into(),
                    mode: None,
                    load_balance: None,
                    members: vec![],
                });
                continue;
            }

            let bond = match result.last_mut() {
                Some(bond) => bond,
                None => continue,
            };
            if let Some((key, value)) = trimmed.split_once(':') {
                let value = value.trim();
                collecting_members = false;
                match key.trim() {
                    "mode" => bond.mode = Some(value.into()),
                    "load balance" => bond.load_balance = Some(value.into()),
                    "number of members" | "number of slaves" => collecting_members = true,
                    _ => {}
                }
            } else if collecting_members {
                bond.members.push(trimmed.into());
            }
        }
        result
    }

    /// The VPP command that recreates this bond, if its name carries an
    /// instance number
    pub fn creation_command(&self) -> Option<String> {
        let id = self.name.strip_prefix("BondEthernet")?.parse::<u32>().ok()?;
        let mode = self.mode.as_deref().unwrap_or("lacp");
        let mut cmd = format!("create bond mode {}", mode);
        if matches!(mode, "lacp" | "xor") {
            if let Some(ref lb) = self.load_balance {
                cmd.push_str(" load-balance ");
                cmd.push_str(lb);
            }
        }
        cmd.push_str(&format!(" id {}", id));
        Some(cmd)
    }

    pub fn member_commands(&self) -> Vec<String> {
        self.members
            .iter()
            .map(|m| format!("bond add {} {}", self.name, m))
            .collect()
    }
}
