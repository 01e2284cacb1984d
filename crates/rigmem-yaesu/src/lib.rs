//! Yaesu clone-mode memory channel backend for rigmem.
//!
//! Clone-mode handhelds such as the FT-1D send their whole memory as one
//! image and take it back the same way. This crate edits such an image:
//!
//! - **Layout** ([`layout`]) -- the memory map: channel slots, flag bytes,
//!   bank tables, VFO blocks and checksum regions.
//! - **Slot codec** ([`codec`]) -- channel slots to and from
//!   [`ChannelRecord`](rigmem_core::ChannelRecord).
//! - **Presets** ([`presets`]) -- the read-only weather, marine and
//!   shortwave channels built into the firmware.
//! - **Model definitions** ([`models`]) -- recognising an image by its
//!   length and model code.
//! - **Radio** ([`radio`]) -- a [`ChannelStore`](rigmem_core::ChannelStore)
//!   over the image, with banks, VFO mirrors and checksums.
//!
//! # Example
//!
//! ```
//! use rigmem_core::ChannelId;
//! use rigmem_yaesu::ft1d_resolver;
//!
//! let resolver = ft1d_resolver();
//! let addr = resolver.resolve(&ChannelId::from("U1")).unwrap();
//! assert_eq!(addr.number, 1001);
//! ```

pub mod codec;
pub mod layout;
pub mod models;
pub mod presets;
pub mod radio;

// Re-export the primary types for ergonomic `use rigmem_yaesu::*`.
pub use models::YaesuModel;
pub use presets::{Preset, PresetGroup};
pub use radio::{Ft1Radio, YaesuArray, ft1d_resolver};
