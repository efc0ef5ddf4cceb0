//! Telnet control-sequence filter for replies read off the VPP CLI socket.
//!
//! VPP's CLI socket talks to `vppctl` as if it were a telnet client, so a
//! reply can carry option negotiation (`IAC WILL ECHO`), sub-negotiation
//! blocks (`IAC SB TERMINAL-TYPE ... IAC SE`) and doubled `IAC IAC` escapes
//! interleaved with the printable text. [TelnetFilter] removes all of them
//! in a single pass.
//!
//! The filter keeps its state between calls to [TelnetFilter::feed], so a
//! sequence that straddles two socket reads is still handled correctly.

/// Interpret As Command, the escape byte
pub const IAC: u8 = 255;
/// Start of sub-negotiation
pub const SB: u8 = 250;
/// End of sub-negotiation
pub const SE: u8 = 240;
pub const WILL: u8 = 251;
pub const WONT: u8 = 252;
pub const DO: u8 = 253;
pub const DONT: u8 = 254;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    Escaped,
    /// `saw_iac` is set when the previous byte inside the block was an IAC,
    /// so that `IAC SE` is recognised even when split across reads
    InSubnegotiation { saw_iac: bool },
    AwaitingOption,
}

/// Streaming telnet filter. Create one per logical response.
#[derive(Debug, Clone)]
pub struct TelnetFilter {
    state: State,
}

impl Default for TelnetFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TelnetFilter {
    pub fn new() -> Self {
        TelnetFilter {
            state: State::Normal,
        }
    }

    /// Processes `input`, appending the payload bytes to `out`. Returns the
    /// number of bytes appended.
    pub fn feed(&mut self, input: &[u8], out: &mut Vec<u8>) -> usize {
        let start_len = out.len();
        for &b in input {
            self.state = match self.state {
                State::Normal => {
                    if b == IAC {
                        State::Escaped
                    } else {
                        out.push(b);
                        State::Normal
                    }
                }
                State::Escaped => match b {
                    IAC => {
                        out.push(IAC);
                        State::Normal
                    }
                    SB => State::InSubnegotiation { saw_iac: false },
                    WILL | WONT | DO | DONT => State::AwaitingOption,
                    _ => {
                        log::trace!("filter: dropping telnet command {}", b);
                        State::Normal
                    }
                },
                State::InSubnegotiation { saw_iac } => {
                    if saw_iac && b == SE {
                        State::Normal
                    } else {
                        // a doubled IAC inside the block is data, not an escape
                        State::InSubnegotiation {
                            saw_iac: !saw_iac && b == IAC,
                        }
                    }
                }
                State::AwaitingOption => State::Normal,
            };
        }
        out.len() - start_len
    }

    /// True if the filter is in the middle of a control sequence
    #[inline]
    pub fn is_mid_sequence(&self) -> bool {
        self.state != State::Normal
    }
}

/// Single-shot convenience over [TelnetFilter], for replies that were read
/// in one go.
pub fn strip_telnet(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    TelnetFilter::new().feed(input, &mut out);
    out
}
