/// A linux control plane interface pair, from `show lcp`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcpPair {
    pub index: u32,
    /// The VPP interface
    pub phy: String,
    /// The VPP side of the tap
    pub tap: String,
    /// Interface name in the linux network namespace
    pub host_if: String,
}

impl LcpPair {
    /// Parses the `itf-pair:` lines of `show lcp`:
    ///
    /// ```text
    /// lcp default netns '<unset>'
    /// itf-pair: [0] GigabitEthernet0/8/0 tap1 eth0 1 type tap
    /// ```
    ///
    /// Lines with too few tokens are skipped.
    pub fn from_report(content: &str) -> Vec<Self> {
        content
            .lines()
            .filter_map(|line| {
                let rest = line.trim_start().strip_prefix("itf-pair:")?;
                let pair = Self::from_line(rest);
                if pair.is_none() {
                    log::trace!("lcp: skipping line {}", line);
                }
                pair
            })
            .collect()
    }

    fn from_line(line: &str) -> Option<Self> {
        let mut it = line.split_ascii_whitespace();
        let index = it
            .next()?
            .trim_matches(|c| matches!(c, '[' | ']' | '(' | ')'))
            .parse()
            .ok()?;
        Some(LcpPair {
            index,
            phy: it.next()?.to_owned(),
            tap: it.next()?.to_owned(),
            host_if: it.next()?.to_owned(),
        })
    }

    pub fn creation_command(&self) -> String {
        format!("lcp create {} host-if {}", self.phy, self.host_if)
    }
}
