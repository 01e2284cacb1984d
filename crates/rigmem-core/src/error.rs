//! Error types for rigmem.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. The link, frame, addressing, and bank
//! failure families each have their own enum so callers can match on the
//! family they care about, and all of them convert into [`Error`] with `?`.

/// Failures of the command/response link to a radio.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// Every baud rate and delimiter convention was probed without the
    /// radio identifying itself.
    #[error("no response from radio")]
    NoResponse,

    /// Timed out waiting for a response.
    ///
    /// The caller decides whether the operation is worth retrying.
    #[error("timeout waiting for response")]
    Timeout,

    /// The radio answered with an error token instead of accepting a command.
    #[error("radio rejected command: {0}")]
    Rejected(String),
}

/// Failures while building or validating a wire frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The delimiter was never seen before the deadline.
    #[error("incomplete frame: delimiter not received")]
    Incomplete,

    /// The frame checksum did not verify. `residue` is the value that
    /// should have been zero.
    #[error("checksum mismatch (residue {residue:#04x})")]
    ChecksumMismatch { residue: u8 },

    /// The response contained bytes that are not valid text for the link.
    #[error("garbled response: {0}")]
    Garbled(String),

    /// A hex payload could not be decoded.
    #[error("invalid hex payload: {0}")]
    InvalidHex(String),
}

/// Failures mapping a logical channel id onto backing storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// No ordinary channel or special group owns this number or name.
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
}

/// Failures of bank membership bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BankError {
    /// Adding the channel would exceed the bank's fixed member capacity.
    #[error("bank {bank} is full ({capacity} members)")]
    BankFull { bank: usize, capacity: usize },

    /// The channel is not a member of the bank it was removed from.
    #[error("channel {channel} is not a member of bank {bank}")]
    NotAMember { channel: u32, bank: usize },

    /// Primary and backup copies of mirrored state disagree.
    ///
    /// `pairs` names every pair whose checksums differed. None of them
    /// were written.
    #[error("mirrored state diverged: {}", pairs.join(", "))]
    MirrorDivergence { pairs: Vec<String> },

    /// The bank index is outside the radio's bank table.
    #[error("unknown bank {0}")]
    UnknownBank(usize),
}

/// The error type for all rigmem operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port open or configuration).
    #[error("transport error: {0}")]
    Transport(String),

    /// A protocol-level error (unexpected response shape).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The requested operation is not supported by this radio model.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// An invalid parameter was passed in.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No connection to the radio has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the radio was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Bank(#[from] BankError),

    /// A field name, index, or value did not fit the memory layout.
    #[error("layout error: {0}")]
    Layout(String),

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for [`LinkError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Link(LinkError::Timeout))
    }
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_transport() {
        let e = Error::Transport("port busy".into());
        assert_eq!(e.to_string(), "transport error: port busy");
    }

    #[test]
    fn link_errors_display_through_error() {
        let e: Error = LinkError::NoResponse.into();
        assert_eq!(e.to_string(), "no response from radio");

        let e: Error = LinkError::Rejected("EW0C0040".into()).into();
        assert_eq!(e.to_string(), "radio rejected command: EW0C0040");
    }

    #[test]
    fn frame_checksum_display() {
        let e = FrameError::ChecksumMismatch { residue: 0x1A };
        assert_eq!(e.to_string(), "checksum mismatch (residue 0x1a)");
    }

    #[test]
    fn bank_divergence_lists_pairs() {
        let e = BankError::MirrorDivergence {
            pairs: vec!["VFO A".into(), "VFO B".into()],
        };
        assert_eq!(e.to_string(), "mirrored state diverged: VFO A, VFO B");
    }

    #[test]
    fn bank_full_display() {
        let e: Error = BankError::BankFull {
            bank: 3,
            capacity: 100,
        }
        .into();
        assert_eq!(e.to_string(), "bank 3 is full (100 members)");
    }

    #[test]
    fn is_timeout_only_for_link_timeout() {
        assert!(Error::Link(LinkError::Timeout).is_timeout());
        assert!(!Error::Link(LinkError::NoResponse).is_timeout());
        assert!(!Error::NotConnected.is_timeout());
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("pipe broken"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<Error>();
    }
}
