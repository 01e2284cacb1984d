//! Transport trait for radio communication.
//!
//! The [`Transport`] trait abstracts over the physical link to a radio.
//! Implementations exist for serial ports and for mock transports used in
//! tests. Link negotiation changes the line speed between probes, so the
//! trait exposes [`set_baud_rate`](Transport::set_baud_rate) alongside the
//! byte-level send and receive calls.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{Error, Result};

/// Asynchronous byte-level transport to a radio.
///
/// The transport does no framing of its own. Protocol concerns (delimiters,
/// checksums, command mnemonics) belong to the link layer that consumes
/// this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the radio.
    ///
    /// Implementations should block until all bytes have been written to
    /// the underlying transport.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes from the radio into the provided buffer.
    ///
    /// Returns the number of bytes actually read, at most `buf.len()`. Will
    /// wait up to `timeout` for data to arrive; returns
    /// [`LinkError::Timeout`](crate::error::LinkError::Timeout) if no data is
    /// received within the deadline.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Change the line speed of the underlying port.
    ///
    /// Transports without a configurable speed return
    /// [`Error::Unsupported`].
    async fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        let _ = baud_rate;
        Err(Error::Unsupported("set_baud_rate".into()))
    }

    /// Close the transport connection.
    ///
    /// After calling `close()`, subsequent `send()` and `receive()` calls
    /// should return [`Error::NotConnected`].
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
