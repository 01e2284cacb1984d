//! Transport implementations for rigmem.
//!
//! Provides [`SerialTransport`], the concrete
//! [`Transport`](rigmem_core::Transport) used to reach radios over a USB
//! virtual COM port or an RS-232 programming cable.

pub mod serial;

pub use serial::{DataBits, FlowControl, Parity, SerialConfig, SerialTransport, StopBits};
