//! Bank membership stored in a memory image.
//!
//! Each bank has an in-use word and a fixed-width list of member slots.
//! A slot holds `channel - 1`, or the empty-slot value. Members are always
//! written sorted ascending, with empty slots packed at the end; some
//! radios show the bank wrong otherwise.
//!
//! ```text
//! in_use:  0xFFFF (unused) | 0x0006 (active)
//! members: [ch-1, ch-1, ..., 0xFFFF, 0xFFFF]
//! ```
//!
//! Moving a channel between banks is two independent calls. A failure
//! between them leaves the channel in both banks or in neither.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use rigmem_core::charset::Charset;
use rigmem_core::error::{BankError, Error, Result};
use rigmem_core::layout::{ArrayDef, MemoryImage};
use rigmem_core::types::BankId;

/// Field holding the in-use word of each `in_use` element.
pub const IN_USE_FIELD: &str = "in_use";
/// Field holding the member slots of each `members` element.
pub const MEMBERS_FIELD: &str = "channel";
/// Field holding the name bytes of each `names` element.
pub const NAME_FIELD: &str = "name";

/// Sentinel values of a bank table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankEncoding {
    /// In-use word of a bank with no members.
    pub unused: u16,
    /// In-use word of a bank with members.
    pub active: u16,
    /// Value of a member slot that holds no channel.
    pub empty_slot: u16,
    /// Bits marking a member slot as a vendor firmware preset.
    pub preset_mask: u16,
}

/// Whether a channel may sit in more than one bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BankPolicy {
    #[default]
    ManyToMany,
    /// Adding a channel to a bank first removes it from every other bank.
    Exclusive,
}

/// Where a radio keeps its bank table.
#[derive(Debug, Clone, Copy)]
pub struct BankLayout {
    /// One element per bank with a 2-byte [`IN_USE_FIELD`].
    pub in_use: &'static ArrayDef,
    /// One element per bank with a [`MEMBERS_FIELD`] of big-endian u16 slots.
    pub members: &'static ArrayDef,
    /// One element per bank with a [`NAME_FIELD`], if banks have names.
    pub names: Option<&'static ArrayDef>,
    pub charset: Charset,
    pub encoding: BankEncoding,
    pub policy: BankPolicy,
}

/// Lifecycle of one bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankState {
    Unused,
    Active,
}

/// Reads and edits bank membership in a [`MemoryImage`].
#[derive(Debug, Clone, Copy)]
pub struct BankMembershipModel {
    layout: BankLayout,
}

impl BankMembershipModel {
    pub fn new(layout: BankLayout) -> Self {
        BankMembershipModel { layout }
    }

    pub fn layout(&self) -> &BankLayout {
        &self.layout
    }

    pub fn bank_count(&self) -> usize {
        self.layout.in_use.count.min(self.layout.members.count)
    }

    /// Member slots per bank.
    pub fn capacity(&self) -> Result<usize> {
        let field = self.layout.members.def.field(MEMBERS_FIELD)?;
        Ok(field.kind.byte_len() / 2)
    }

    pub fn banks(&self) -> impl Iterator<Item = BankId> {
        (0..self.bank_count()).map(BankId)
    }

    pub fn state(&self, image: &MemoryImage, bank: BankId) -> Result<BankState> {
        self.check(bank)?;
        let word = image.view(self.layout.in_use, bank.0)?.get(IN_USE_FIELD)?;
        Ok(if word == u32::from(self.layout.encoding.unused) {
            BankState::Unused
        } else {
            BankState::Active
        })
    }

    /// Channel numbers in `bank`. An unused bank is empty whatever its
    /// member slots hold.
    pub fn channels_in_bank(&self, image: &MemoryImage, bank: BankId) -> Result<BTreeSet<u32>> {
        if self.state(image, bank)? == BankState::Unused {
            return Ok(BTreeSet::new());
        }
        let slots = self.read_slots(image, bank)?;
        Ok(slots
            .into_iter()
            .filter(|&slot| slot != self.layout.encoding.empty_slot)
            .map(|slot| u32::from(slot) + 1)
            .collect())
    }

    /// Add `channel` to `bank`.
    ///
    /// Fails with [`BankError::BankFull`] when the bank has no free slot.
    /// Under [`BankPolicy::Exclusive`] the channel is first removed from
    /// every other bank.
    pub fn add_membership(&self, image: &mut MemoryImage, channel: u32, bank: BankId) -> Result<()> {
        self.check(bank)?;
        if self.is_preset(channel) {
            warn!(channel, %bank, "refusing to add a firmware preset entry to a bank");
            return Ok(());
        }
        let mut members = self.channels_in_bank(image, bank)?;
        if members.contains(&channel) {
            return Ok(());
        }
        members.insert(channel);
        let capacity = self.capacity()?;
        if members.len() > capacity {
            return Err(BankError::BankFull {
                bank: bank.0,
                capacity,
            }
            .into());
        }

        if self.layout.policy == BankPolicy::Exclusive {
            for other in self.banks().filter(|&b| b != bank) {
                if self.channels_in_bank(image, other)?.contains(&channel) {
                    debug!(channel, from = %other, to = %bank, "evicting from exclusive bank");
                    self.remove_membership(image, channel, other)?;
                }
            }
        }

        self.write_members(image, bank, &members)?;
        self.set_state(image, bank, BankState::Active)
    }

    /// Remove `channel` from `bank`.
    ///
    /// Fails with [`BankError::NotAMember`] and leaves the bank untouched
    /// if the channel is not in it. Emptying the bank marks it unused.
    pub fn remove_membership(&self, image: &mut MemoryImage, channel: u32, bank: BankId) -> Result<()> {
        let mut members = self.channels_in_bank(image, bank)?;
        if !members.remove(&channel) {
            return Err(BankError::NotAMember {
                channel,
                bank: bank.0,
            }
            .into());
        }
        self.write_members(image, bank, &members)?;
        if members.is_empty() {
            self.set_state(image, bank, BankState::Unused)?;
        }
        Ok(())
    }

    /// Add or remove, as `present` says.
    pub fn set_membership(
        &self,
        image: &mut MemoryImage,
        channel: u32,
        bank: BankId,
        present: bool,
    ) -> Result<()> {
        if present {
            self.add_membership(image, channel, bank)
        } else {
            self.remove_membership(image, channel, bank)
        }
    }

    /// Every bank `channel` belongs to.
    pub fn banks_of(&self, image: &MemoryImage, channel: u32) -> Result<BTreeSet<BankId>> {
        let mut banks = BTreeSet::new();
        for bank in self.banks() {
            if self.channels_in_bank(image, bank)?.contains(&channel) {
                banks.insert(bank);
            }
        }
        Ok(banks)
    }

    /// Remove `channel` from every bank it is in. Returns how many banks
    /// it left.
    pub fn remove_from_all(&self, image: &mut MemoryImage, channel: u32) -> Result<usize> {
        let banks = self.banks_of(image, channel)?;
        for &bank in &banks {
            self.remove_membership(image, channel, bank)?;
        }
        Ok(banks.len())
    }

    /// Bank name, or `None` for radios without bank names.
    ///
    /// Decoding stops at the first 0xFF and ignores the top bit of each
    /// character byte.
    pub fn bank_name(&self, image: &MemoryImage, bank: BankId) -> Result<Option<String>> {
        self.check(bank)?;
        let Some(names) = self.layout.names else {
            return Ok(None);
        };
        let view = image.view(names, bank.0)?;
        let raw: Vec<u8> = view
            .bytes(NAME_FIELD)?
            .iter()
            .take_while(|&&b| b != 0xFF)
            .map(|&b| b & 0x7F)
            .collect();
        Ok(Some(self.layout.charset.decode(&raw)))
    }

    /// Store a bank name, space padded to the field width.
    pub fn set_bank_name(&self, image: &mut MemoryImage, bank: BankId, name: &str) -> Result<()> {
        self.check(bank)?;
        let names = self
            .layout
            .names
            .ok_or_else(|| Error::Unsupported("bank names".into()))?;
        let width = names.def.field(NAME_FIELD)?.kind.byte_len();
        let charset = self.layout.charset;
        let space = charset
            .characters()
            .chars()
            .position(|c| c == ' ')
            .ok_or_else(|| Error::Layout("bank name alphabet has no space".into()))?;
        let used = name.trim_end().chars().count();
        let mut raw = charset.encode(name, width)?;
        for byte in raw.iter_mut().skip(used) {
            *byte = space as u8;
        }
        image.view_mut(names, bank.0)?.set_bytes(NAME_FIELD, &raw)
    }

    fn is_preset(&self, channel: u32) -> bool {
        let mask = u32::from(self.layout.encoding.preset_mask);
        mask != 0 && channel.saturating_sub(1) & mask != 0
    }

    fn check(&self, bank: BankId) -> Result<()> {
        if bank.0 >= self.bank_count() {
            return Err(BankError::UnknownBank(bank.0).into());
        }
        Ok(())
    }

    fn read_slots(&self, image: &MemoryImage, bank: BankId) -> Result<Vec<u16>> {
        let view = image.view(self.layout.members, bank.0)?;
        Ok(view
            .bytes(MEMBERS_FIELD)?
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect())
    }

    fn write_members(&self, image: &mut MemoryImage, bank: BankId, members: &BTreeSet<u32>) -> Result<()> {
        let capacity = self.capacity()?;
        let mut raw = Vec::with_capacity(capacity * 2);
        for &channel in members {
            if self.is_preset(channel) {
                warn!(
                    %bank,
                    id = format_args!("{channel:04x}"),
                    "bank holds a firmware preset entry, left as is"
                );
            }
            let slot = channel
                .checked_sub(1)
                .and_then(|c| u16::try_from(c).ok())
                .ok_or_else(|| {
                    Error::InvalidParameter(format!("channel {channel} does not fit a bank slot"))
                })?;
            raw.extend_from_slice(&slot.to_be_bytes());
        }
        while raw.len() < capacity * 2 {
            raw.extend_from_slice(&self.layout.encoding.empty_slot.to_be_bytes());
        }
        image
            .view_mut(self.layout.members, bank.0)?
            .set_bytes(MEMBERS_FIELD, &raw)
    }

    fn set_state(&self, image: &mut MemoryImage, bank: BankId, state: BankState) -> Result<()> {
        let word = match state {
            BankState::Unused => self.layout.encoding.unused,
            BankState::Active => self.layout.encoding.active,
        };
        image
            .view_mut(self.layout.in_use, bank.0)?
            .set(IN_USE_FIELD, u32::from(word))
    }
}
