//! rigmem-test-harness: Test utilities for rigmem.
//!
//! - [`MockTransport`] replays an ordered script of request/response pairs.
//! - [`MockDevice`] simulates a text-protocol radio that only understands
//!   the link at its own baud rate, for negotiation tests.

pub mod mock_device;
pub mod mock_serial;

pub use mock_device::{LINE_NOISE, MockDevice};
pub use mock_serial::MockTransport;
