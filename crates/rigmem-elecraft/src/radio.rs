//! ElecraftRadio -- live-mode channel store for Elecraft transceivers.
//!
//! Every channel read is one `ER` exchange over the [`CommandChannel`].
//! Decoded records are cached per session along with the raw 64 bytes,
//! because a write is a read-modify-write: only the fields the channel
//! model covers are replaced and the rest of the record goes back to the
//! radio exactly as it came.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, trace, warn};

use rigmem_core::error::{AddressError, Error, LinkError, Result};
use rigmem_core::store::ChannelStore;
use rigmem_core::types::{
    ArrayKind, ChannelAddress, ChannelId, ChannelKind, ChannelRecord, MemoryFeatures, Mode,
};
use rigmem_link::{CommandChannel, Identity};
use rigmem_memory::{ChannelResolver, SpecialGroup};

use crate::commands::{cmd_read_memory, cmd_write_memory, record_address};
use crate::models::{ElecraftModel, MEMORY_BOUNDS, quick_memory_names};
use crate::protocol::{self, NAME_LENGTH};
use crate::settings::{ElecraftSetting, SettingKind};

/// Storage behind Elecraft channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElecraftArray {
    /// Memories 0-99.
    Memory,
    /// Per-band quick memories, addressed right after memory 99.
    QuickMemory,
}

impl ArrayKind for ElecraftArray {
    fn name(&self) -> &'static str {
        match self {
            ElecraftArray::Memory => "memory",
            ElecraftArray::QuickMemory => "quick memory",
        }
    }
}

/// The canonical channel map shared by every Elecraft model.
pub fn elecraft_resolver() -> ChannelResolver<ElecraftArray> {
    let (first, last) = MEMORY_BOUNDS;
    ChannelResolver::new(ElecraftArray::Memory, first, last).group(SpecialGroup::new(
        ElecraftArray::QuickMemory,
        ChannelKind::Special,
        quick_memory_names(),
    ))
}

#[derive(Debug, Clone)]
struct CachedRecord {
    /// `None` when the radio gave no usable record.
    raw: Option<Vec<u8>>,
    record: ChannelRecord,
}

/// A connected Elecraft radio.
///
/// Built by [`ElecraftBuilder`](crate::builder::ElecraftBuilder), which
/// negotiates the link and checks the model before handing one out.
pub struct ElecraftRadio {
    channel: CommandChannel,
    model: ElecraftModel,
    identity: Identity,
    resolver: ChannelResolver<ElecraftArray>,
    cache: HashMap<u32, CachedRecord>,
    cache_enabled: bool,
}

impl ElecraftRadio {
    pub(crate) fn new(
        channel: CommandChannel,
        model: ElecraftModel,
        identity: Identity,
        cache_enabled: bool,
    ) -> Self {
        ElecraftRadio {
            channel,
            model,
            identity,
            resolver: elecraft_resolver(),
            cache: HashMap::new(),
            cache_enabled,
        }
    }

    pub fn model(&self) -> &ElecraftModel {
        &self.model
    }

    /// What the link negotiator found.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The command link, for sending commands this driver does not wrap.
    pub fn channel(&self) -> &CommandChannel {
        &self.channel
    }

    /// Forget every cached record. The next read of each channel goes to
    /// the radio.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Resolve and read in one call.
    pub async fn read(&mut self, id: &ChannelId) -> Result<ChannelRecord> {
        let addr = self.resolve(id)?;
        self.read_channel(&addr).await
    }

    /// Read a setting from the radio.
    pub async fn get_setting(&self, kind: SettingKind) -> Result<ElecraftSetting> {
        let reply = self.channel.query(&kind.query()).await?;
        kind.parse(&reply)
    }

    /// Change a setting. Set commands are not echoed; only an explicit
    /// refusal is an error.
    pub async fn set_setting(&self, setting: ElecraftSetting) -> Result<()> {
        let command = setting.command(&self.model)?;
        let reply = self.channel.execute(&command).await?;
        if reply.is_error() {
            warn!(?setting, reply = %reply.text, "radio refused setting");
            return Err(LinkError::Rejected(command.mnemonic().to_string()).into());
        }
        debug!(?setting, "setting applied");
        Ok(())
    }

    /// Close the link.
    pub async fn close(&self) -> Result<()> {
        self.channel.close().await
    }

    fn check_memory_commands(&self) -> Result<()> {
        if self.model.is_k4 {
            return Err(Error::Unsupported(format!(
                "memory channels on the {}",
                self.model.name
            )));
        }
        Ok(())
    }

    /// One `ER` exchange.
    async fn fetch(&self, number: u32) -> Result<Option<Vec<u8>>> {
        let address = record_address(number)?;
        let reply = self.channel.execute(&cmd_read_memory(number)?).await?;
        let raw = protocol::decode_read_reply(address, &reply)?;
        if let Some(data) = &raw {
            trace!(number, raw = %hex::encode(data), "memory record");
        }
        Ok(raw)
    }

    /// The raw record a write will modify.
    async fn write_base(&self, number: u32) -> Result<Vec<u8>> {
        let cached = self
            .cache
            .get(&number)
            .filter(|_| self.cache_enabled)
            .and_then(|c| c.raw.clone());
        if let Some(raw) = cached {
            return Ok(raw);
        }
        self.fetch(number).await?.ok_or_else(|| {
            Error::Protocol(format!("memory {number} could not be read back for update"))
        })
    }
}

#[async_trait]
impl ChannelStore for ElecraftRadio {
    type Array = ElecraftArray;

    fn features(&self) -> MemoryFeatures {
        MemoryFeatures {
            memory_bounds: MEMORY_BOUNDS,
            special_names: self.resolver.special_names().map(str::to_string).collect(),
            valid_modes: self.model.modes.to_vec(),
            name_length: NAME_LENGTH,
            bank_count: 0,
            has_comment: true,
            can_write: !self.model.is_k4,
        }
    }

    fn resolve(&self, id: &ChannelId) -> Result<ChannelAddress<ElecraftArray>> {
        self.resolver.resolve(id)
    }

    async fn read_channel(&mut self, addr: &ChannelAddress<ElecraftArray>) -> Result<ChannelRecord> {
        self.check_memory_commands()?;
        if self.cache_enabled {
            if let Some(cached) = self.cache.get(&addr.number) {
                trace!(number = addr.number, "memory served from cache");
                return Ok(cached.record.clone());
            }
        }

        let raw = self.fetch(addr.number).await?;
        let mut record = match &raw {
            Some(data) => protocol::decode_record(addr.number, data)?,
            None => ChannelRecord::empty(addr.number),
        };
        record.extended_name = addr.extended_name.clone();

        self.cache.insert(
            addr.number,
            CachedRecord {
                raw,
                record: record.clone(),
            },
        );
        Ok(record)
    }

    async fn write_channel(
        &mut self,
        addr: &ChannelAddress<ElecraftArray>,
        record: &ChannelRecord,
    ) -> Result<()> {
        self.check_memory_commands()?;
        let number = addr.number;
        if addr.kind != ChannelKind::Regular || number > MEMORY_BOUNDS.1 {
            return Err(AddressError::UnknownChannel(format!(
                "{number}: only memories {}-{} can be written",
                MEMORY_BOUNDS.0, MEMORY_BOUNDS.1
            ))
            .into());
        }
        if !record.empty && record.mode != Mode::Auto && !self.model.supports_mode(record.mode) {
            return Err(Error::InvalidParameter(format!(
                "the {} cannot store {} memories",
                self.model.name, record.mode
            )));
        }

        let mut data = self.write_base(number).await?;
        protocol::encode_record(record, &mut data)?;

        let reply = self.channel.execute(&cmd_write_memory(number, &data)?).await?;
        if reply.is_error() {
            warn!(number, reply = %reply.text, "radio refused memory write");
            return Err(LinkError::Rejected(format!("write of memory {number}")).into());
        }
        debug!(number, empty = record.empty, "memory written");

        let stored = protocol::decode_record(number, &data)?;
        self.cache.insert(
            number,
            CachedRecord {
                raw: Some(data),
                record: stored,
            },
        );
        Ok(())
    }
}
