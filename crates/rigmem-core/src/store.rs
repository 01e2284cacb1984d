//! The application-facing channel store contract.
//!
//! [`ChannelStore`] is what an editing application programs against. A
//! live-mode driver implements it by issuing framed reads and writes over
//! the command link; a clone-mode driver implements it by indexing its
//! downloaded [`MemoryImage`](crate::layout::MemoryImage).

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::types::{ArrayKind, BankId, ChannelAddress, ChannelId, ChannelRecord, MemoryFeatures};

/// Uniform channel access for any supported radio.
///
/// Bank operations default to [`Error::Unsupported`]; drivers for radios
/// with banks override them.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    /// The backing arrays this driver declares.
    type Array: ArrayKind;

    /// Static description of the channel store.
    fn features(&self) -> MemoryFeatures;

    /// Map a channel number or special name to its backing storage.
    fn resolve(&self, id: &ChannelId) -> Result<ChannelAddress<Self::Array>>;

    /// Read one channel.
    async fn read_channel(&mut self, addr: &ChannelAddress<Self::Array>) -> Result<ChannelRecord>;

    /// Write one channel. Writing a record with `empty` set erases it.
    async fn write_channel(
        &mut self,
        addr: &ChannelAddress<Self::Array>,
        record: &ChannelRecord,
    ) -> Result<()>;

    /// The banks that channel `number` belongs to.
    async fn bank_membership(&self, number: u32) -> Result<BTreeSet<BankId>> {
        let _ = number;
        Err(Error::Unsupported("banks".into()))
    }

    /// Add channel `number` to `bank` (`present = true`) or remove it.
    async fn set_bank_membership(&mut self, number: u32, bank: BankId, present: bool) -> Result<()> {
        let _ = (number, bank, present);
        Err(Error::Unsupported("banks".into()))
    }
}
