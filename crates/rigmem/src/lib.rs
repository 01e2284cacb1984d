//! # rigmem -- Radio Memory Channel Access
//!
//! `rigmem` reads and writes the memory channels of amateur transceivers.
//! Live-mode radios serve one channel record at a time over a CAT link;
//! clone-mode radios are edited as a whole downloaded memory image. Both
//! sit behind the same [`ChannelStore`] trait, so an editor can address
//! channels by canonical number or special name without knowing which
//! kind of radio it holds.
//!
//! ## Quick Start
//!
//! ```no_run
//! use rigmem::{ChannelId, ChannelStore};
//! use rigmem::elecraft::{ElecraftBuilder, models::kx3};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut radio = ElecraftBuilder::new(kx3())
//!         .serial_port("/dev/ttyUSB0")
//!         .build()
//!         .await?;
//!
//!     let addr = radio.resolve(&ChannelId::Number(5))?;
//!     let channel = radio.read_channel(&addr).await?;
//!     println!("{}: {} Hz {}", channel.number, channel.freq, channel.name);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! | Crate                | Purpose                                            |
//! |----------------------|----------------------------------------------------|
//! | `rigmem-core`        | [`ChannelStore`], channel records, layouts, errors |
//! | `rigmem-transport`   | Serial transport                                   |
//! | `rigmem-link`        | CAT command channel, framing, link negotiation     |
//! | `rigmem-memory`      | Channel addressing, banks, mirrors, checksums      |
//! | `rigmem-elecraft`    | Elecraft live-mode memory driver                   |
//! | `rigmem-yaesu`       | Yaesu FT-1D clone image driver                     |
//! | **`rigmem`**         | This facade crate -- re-exports everything         |
//!
//! ## Feature Flags
//!
//! | Feature    | Enables                                  | Default |
//! |------------|------------------------------------------|---------|
//! | `elecraft` | [`elecraft`] module (live memory access) | yes     |
//! | `yaesu`    | [`yaesu`] module (clone images)          | yes     |

pub use rigmem_core::*;

/// CAT command link: the command channel, memory frame codec and
/// baud/delimiter negotiation.
pub mod link {
    pub use rigmem_link::*;
}

/// Channel addressing, bank membership, mirrored state and image checksums.
pub mod memory {
    pub use rigmem_memory::*;
}

/// Serial transport.
pub mod transport {
    pub use rigmem_transport::*;
}

/// Elecraft live-mode backend.
///
/// Provides [`ElecraftRadio`](elecraft::ElecraftRadio) and
/// [`ElecraftBuilder`](elecraft::ElecraftBuilder) for the K3, K3S, KX3 and
/// KX2 memory channels.
#[cfg(feature = "elecraft")]
pub mod elecraft {
    pub use rigmem_elecraft::*;
}

/// Yaesu clone-mode backend.
///
/// Provides [`Ft1Radio`](yaesu::Ft1Radio) for editing FT-1D memory images.
#[cfg(feature = "yaesu")]
pub mod yaesu {
    pub use rigmem_yaesu::*;
}

/// How a radio exposes its memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// One record at a time over a CAT link.
    Live,
    /// As a whole memory image.
    Clone,
}

/// One supported radio, for model pickers and listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedModel {
    pub manufacturer: &'static str,
    pub name: &'static str,
    pub access: Access,
    pub default_baud_rate: u32,
}

/// Every model across the enabled backends.
///
/// # Example
///
/// ```
/// for model in rigmem::supported_models() {
///     println!("{} {} ({:?})", model.manufacturer, model.name, model.access);
/// }
/// ```
pub fn supported_models() -> Vec<SupportedModel> {
    #[allow(unused_mut)]
    let mut models = Vec::new();

    #[cfg(feature = "elecraft")]
    {
        models.extend(elecraft::models::all_elecraft_models().iter().map(|m| SupportedModel {
            manufacturer: "Elecraft",
            name: m.name,
            access: Access::Live,
            default_baud_rate: m.default_baud_rate,
        }));
    }

    #[cfg(feature = "yaesu")]
    {
        models.extend(yaesu::models::all_yaesu_models().iter().map(|m| SupportedModel {
            manufacturer: "Yaesu",
            name: m.name,
            access: Access::Clone,
            default_baud_rate: m.default_baud_rate,
        }));
    }

    models
}
