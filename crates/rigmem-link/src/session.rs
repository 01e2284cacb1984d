//! Per-connection link state.
//!
//! A [`LinkSession`] remembers the baud rate and delimiter convention that
//! last produced a successful identification, so re-identifying a radio
//! that has not been reconfigured costs as few probes as possible. It lives
//! inside the connection's [`CommandChannel`](crate::CommandChannel); two
//! connections never share one.

use crate::protocol::{Delimiter, SEMICOLON};

/// Baud rates probed when nothing else is known, slowest first.
pub const DEFAULT_BAUD_CANDIDATES: &[u32] = &[4_800, 9_600, 19_200, 38_400, 57_600, 115_200];

/// Baud rate assumed before the first successful identification.
pub const DEFAULT_BAUD: u32 = 38_400;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSession {
    last_baud: u32,
    delimiter: Delimiter,
    identified: bool,
}

impl LinkSession {
    pub fn new(last_baud: u32, delimiter: Delimiter) -> Self {
        LinkSession {
            last_baud,
            delimiter,
            identified: false,
        }
    }

    /// The last baud rate that identified the radio, or the initial guess.
    pub fn last_baud(&self) -> u32 {
        self.last_baud
    }

    /// The delimiter convention every command on this link uses.
    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    /// True once a negotiation has succeeded on this session.
    pub fn is_identified(&self) -> bool {
        self.identified
    }

    /// Explicit reconfiguration: forget what negotiation learned.
    pub fn reset(&mut self, baud: u32, delimiter: Delimiter) {
        self.last_baud = baud;
        self.delimiter = delimiter;
        self.identified = false;
    }

    /// Probe order for one negotiation pass.
    ///
    /// Every candidate except the last-good rate comes first, fastest to
    /// slowest, and the last-good rate is probed last. Duplicates are
    /// dropped, so no rate is probed twice in a pass.
    ///
    /// ```
    /// use rigmem_link::{LinkSession, protocol::SEMICOLON};
    ///
    /// let session = LinkSession::new(9_600, SEMICOLON);
    /// assert_eq!(
    ///     session.candidate_bauds(&[4_800, 9_600, 19_200, 38_400]),
    ///     vec![38_400, 19_200, 4_800, 9_600]
    /// );
    /// ```
    pub fn candidate_bauds(&self, candidates: &[u32]) -> Vec<u32> {
        let mut order: Vec<u32> = candidates
            .iter()
            .copied()
            .filter(|&b| b != self.last_baud)
            .collect();
        order.sort_unstable_by(|a, b| b.cmp(a));
        order.dedup();
        order.push(self.last_baud);
        order
    }

    pub(crate) fn set_delimiter(&mut self, delimiter: Delimiter) {
        self.delimiter = delimiter;
    }

    pub(crate) fn record_success(&mut self, baud: u32, delimiter: Delimiter) {
        self.last_baud = baud;
        self.delimiter = delimiter;
        self.identified = true;
    }
}

impl Default for LinkSession {
    fn default() -> Self {
        LinkSession::new(DEFAULT_BAUD, SEMICOLON)
    }
}
