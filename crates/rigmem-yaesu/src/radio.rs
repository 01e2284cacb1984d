//! Ft1Radio -- clone-mode channel store over an FT-1D memory image.
//!
//! The radio's whole memory is downloaded as one image, edited in place,
//! and uploaded again. Nothing here talks to the radio: reads and writes
//! index the image through the layout in [`crate::layout`].
//!
//! Canonical channel numbers run 1-900 for memories, then the special
//! groups in fixed order:
//!
//! | Numbers   | Group   | Backing                        |
//! |-----------|---------|--------------------------------|
//! | 901-999   | Skip    | slots with flags               |
//! | 1000-1099 | PMS     | slots with flags, `L1,U1,...`  |
//! | 1100-1110 | Home    | slots, cannot be erased        |
//! | 1111-1120 | WX      | firmware preset, read-only     |
//! | 1121-1208 | Marine  | firmware preset, read-only     |
//! | 1209-1297 | SWL     | firmware preset, read-only     |

use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use rigmem_core::error::{BankError, Error, Result};
use rigmem_core::helpers::format_freq_mhz;
use rigmem_core::layout::{ArrayDef, FieldViewMut, MemoryImage};
use rigmem_core::store::ChannelStore;
use rigmem_core::types::{
    ArrayKind, BankId, ChannelAddress, ChannelId, ChannelKind, ChannelRecord, MemoryFeatures, Mode,
};
use rigmem_memory::{
    BankMembershipModel, ChannelResolver, ChecksumRegion, SpecialGroup, reconcile_mirrors,
    update_checksums, verify_checksums,
};

use crate::codec::{
    decode_skip, decode_slot, empty_record, encode_flags, encode_slot, is_empty_slot, wipe_slot,
};
use crate::layout::{
    CHECKSUM_REGIONS, FLAG, FLAG_PMS, FLAG_SKIP, HOME, HOME_BANDS, HOME_NAMES, MEMORY, MEMORY_COUNT,
    PMS, PRESET_MASK, RX_RANGE, SKIP, VFO_MIRRORS, VFO_NO_BANK, bank_layout,
};
use crate::models::{YaesuModel, model_for_image};
use crate::presets::PresetGroup;

/// Storage behind FT-1D channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YaesuArray {
    Memory,
    Skip,
    Pms,
    Home,
    Wx,
    Marine,
    Swl,
}

impl ArrayKind for YaesuArray {
    fn name(&self) -> &'static str {
        match self {
            YaesuArray::Memory => "memory",
            YaesuArray::Skip => "Skip",
            YaesuArray::Pms => "PMS",
            YaesuArray::Home => "Home",
            YaesuArray::Wx => "wx_chan",
            YaesuArray::Marine => "marine",
            YaesuArray::Swl => "sw_chan",
        }
    }
}

/// Where an array's channels come from.
enum Backing {
    /// Slots in the image, with their flag bytes if the array has them.
    Slots {
        slots: &'static ArrayDef,
        flags: Option<&'static ArrayDef>,
    },
    Preset(PresetGroup),
}

impl YaesuArray {
    fn backing(self) -> Backing {
        match self {
            YaesuArray::Memory => Backing::Slots {
                slots: &MEMORY,
                flags: Some(&FLAG),
            },
            YaesuArray::Skip => Backing::Slots {
                slots: &SKIP,
                flags: Some(&FLAG_SKIP),
            },
            YaesuArray::Pms => Backing::Slots {
                slots: &PMS,
                flags: Some(&FLAG_PMS),
            },
            YaesuArray::Home => Backing::Slots {
                slots: &HOME,
                flags: None,
            },
            YaesuArray::Wx => Backing::Preset(PresetGroup::Wx),
            YaesuArray::Marine => Backing::Preset(PresetGroup::Marine),
            YaesuArray::Swl => Backing::Preset(PresetGroup::Swl),
        }
    }
}

/// The FT-1D channel map.
pub fn ft1d_resolver() -> ChannelResolver<YaesuArray> {
    let first_skip = MEMORY_COUNT as u32 + 1;
    ChannelResolver::new(YaesuArray::Memory, 1, MEMORY_COUNT as u32)
        .with_regular_flags()
        .group(
            SpecialGroup::new(
                YaesuArray::Skip,
                ChannelKind::Special,
                (first_skip..first_skip + SKIP.count as u32).map(|n| format!("Skip{n}")),
            )
            .with_flags(),
        )
        .group(
            SpecialGroup::new(
                YaesuArray::Pms,
                ChannelKind::Special,
                (1..=PMS.count / 2).flat_map(|i| [format!("L{i}"), format!("U{i}")]),
            )
            .with_flags(),
        )
        .group(SpecialGroup::new(YaesuArray::Home, ChannelKind::Special, HOME_NAMES))
        .group(SpecialGroup::new(YaesuArray::Wx, ChannelKind::Preset, PresetGroup::Wx.names()))
        .group(SpecialGroup::new(
            YaesuArray::Marine,
            ChannelKind::Preset,
            PresetGroup::Marine.names(),
        ))
        .group(SpecialGroup::new(YaesuArray::Swl, ChannelKind::Preset, PresetGroup::Swl.names()))
}

/// A bank and one of its channels, picked for a VFO to follow.
type VfoChoice = Option<(BankId, u32)>;

/// An FT-1D memory image opened for editing.
pub struct Ft1Radio {
    model: YaesuModel,
    image: MemoryImage,
    resolver: ChannelResolver<YaesuArray>,
    banks: BankMembershipModel,
}

impl Ft1Radio {
    /// Open a downloaded image.
    ///
    /// The image must have the length and model code of a supported radio.
    /// A checksum mismatch is logged but does not fail the load; sums are
    /// recomputed by [`prepare_upload`](Self::prepare_upload).
    pub fn from_image(image: MemoryImage) -> Result<Self> {
        let model = model_for_image(image.as_bytes()).ok_or_else(|| {
            Error::Protocol(format!("not a supported clone image ({} bytes)", image.len()))
        })?;
        if verify_checksums(&image, &CHECKSUM_REGIONS).is_err() {
            info!(model = model.name, "checksums will be recomputed before upload");
        }
        info!(model = model.name, "clone image loaded");
        Ok(Ft1Radio {
            model,
            image,
            resolver: ft1d_resolver(),
            banks: BankMembershipModel::new(bank_layout()),
        })
    }

    /// Open an image from raw bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_image(MemoryImage::new(data))
    }

    pub fn model(&self) -> &YaesuModel {
        &self.model
    }

    pub fn image(&self) -> &MemoryImage {
        &self.image
    }

    pub fn into_image(self) -> MemoryImage {
        self.image
    }

    pub fn resolver(&self) -> &ChannelResolver<YaesuArray> {
        &self.resolver
    }

    /// Check every checksum region of the image as it is now.
    pub fn verify_checksums(&self) -> Result<()> {
        verify_checksums(&self.image, &CHECKSUM_REGIONS)
    }

    /// Resolve and read in one call.
    pub fn channel(&self, id: &ChannelId) -> Result<ChannelRecord> {
        let addr = self.resolver.resolve(id)?;
        self.load(&addr)
    }

    /// Check a populated record against what the addressed slot can hold.
    ///
    /// Home channels must stay inside their band, exclusive of the edges.
    pub fn validate(&self, addr: &ChannelAddress<YaesuArray>, record: &ChannelRecord) -> Result<()> {
        let (lo, hi) = RX_RANGE;
        if !(lo..=hi).contains(&record.freq) {
            return Err(Error::InvalidParameter(format!(
                "{} outside {} to {}",
                format_freq_mhz(record.freq),
                format_freq_mhz(lo),
                format_freq_mhz(hi)
            )));
        }
        if addr.array == YaesuArray::Home {
            let in_band = HOME_BANDS
                .get(addr.index)
                .is_some_and(|&(lo, hi)| lo < record.freq && record.freq < hi);
            if !in_band {
                return Err(Error::InvalidParameter(format!(
                    "frequency outside of band for Home{}",
                    addr.index + 1
                )));
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Banks
    // -----------------------------------------------------------------------

    pub fn bank_count(&self) -> usize {
        self.banks.bank_count()
    }

    /// Channel numbers in `bank`, ascending.
    pub fn channels_in_bank(&self, bank: BankId) -> Result<BTreeSet<u32>> {
        self.banks.channels_in_bank(&self.image, bank)
    }

    pub fn bank_name(&self, bank: BankId) -> Result<String> {
        Ok(self.banks.bank_name(&self.image, bank)?.unwrap_or_default())
    }

    pub fn set_bank_name(&mut self, bank: BankId, name: &str) -> Result<()> {
        self.banks.set_bank_name(&mut self.image, bank, name)
    }

    // -----------------------------------------------------------------------
    // Upload preparation
    // -----------------------------------------------------------------------

    /// Point both VFOs at the banks.
    ///
    /// VFO A follows the first channel of the first bank that has one;
    /// VFO B follows the first channel it can tune (one not flagged
    /// `nosubvfo`). A VFO with nothing to follow is taken off banks. Each
    /// primary VFO block is then copied into its backup.
    ///
    /// A VFO whose primary and backup disagree is left alone and reported
    /// as [`BankError::MirrorDivergence`](rigmem_core::BankError) after the
    /// other has been updated. Returns the number of backups changed.
    pub fn update_vfo(&mut self) -> Result<usize> {
        let choices = self.choose_vfo_channels()?;
        reconcile_mirrors(&mut self.image, &VFO_MIRRORS, |pair, vfo| {
            let choice = if pair.primary == VFO_MIRRORS[0].primary {
                choices[0]
            } else {
                choices[1]
            };
            point_vfo(pair.name, choice, vfo)
        })
    }

    /// Make the image ready to send back to the radio: update the VFOs and
    /// recompute the checksums.
    ///
    /// The sums of a diverged VFO pair's blocks are left as they are, so the
    /// pair still reads as diverged afterwards, and the divergence is
    /// returned as an error.
    pub fn prepare_upload(&mut self) -> Result<()> {
        let (changed, divergent) = match self.update_vfo() {
            Ok(changed) => (changed, Vec::new()),
            Err(Error::Bank(BankError::MirrorDivergence { pairs })) => (0, pairs),
            Err(e) => return Err(e),
        };

        let held = diverged_blocks(&divergent)?;
        let regions: Vec<ChecksumRegion> = CHECKSUM_REGIONS
            .iter()
            .filter(|region| !held.contains(&region.start))
            .copied()
            .collect();
        update_checksums(&mut self.image, &regions)?;

        if divergent.is_empty() {
            debug!(backups = changed, "image ready for upload");
            Ok(())
        } else {
            Err(BankError::MirrorDivergence { pairs: divergent }.into())
        }
    }

    fn choose_vfo_channels(&self) -> Result<[VfoChoice; 2]> {
        let mut main: VfoChoice = None;
        let mut sub: VfoChoice = None;
        for bank in self.banks.banks() {
            for channel in self.channels_in_bank(bank)? {
                if channel.saturating_sub(1) & u32::from(PRESET_MASK) != 0 {
                    continue;
                }
                if main.is_none() {
                    main = Some((bank, channel));
                }
                if sub.is_none() && self.sub_vfo_can_tune(channel)? {
                    sub = Some((bank, channel));
                }
                if main.is_some() && sub.is_some() {
                    return Ok([main, sub]);
                }
            }
        }
        Ok([main, sub])
    }

    fn sub_vfo_can_tune(&self, channel: u32) -> Result<bool> {
        let Ok(addr) = self.resolver.resolve(&ChannelId::Number(channel)) else {
            return Ok(false);
        };
        match addr.array.backing() {
            Backing::Slots { flags: Some(flags), .. } => {
                Ok(!self.image.view(flags, addr.index)?.get_bool("nosubvfo")?)
            }
            _ => Ok(false),
        }
    }

    // -----------------------------------------------------------------------
    // Slot access
    // -----------------------------------------------------------------------

    fn load(&self, addr: &ChannelAddress<YaesuArray>) -> Result<ChannelRecord> {
        let mut record = match addr.array.backing() {
            Backing::Preset(group) => match group.lookup(addr.index) {
                Some(preset) => preset.to_record(addr.number),
                None => ChannelRecord {
                    read_only: true,
                    ..empty_record(addr.number)
                },
            },
            Backing::Slots { slots, flags } => {
                let slot = self.image.view(slots, addr.index)?;
                let flags = flags.map(|def| self.image.view(def, addr.index)).transpose()?;
                let empty = is_empty_slot(&slot, flags.as_ref())?;
                let mut record = if empty {
                    empty_record(addr.number)
                } else {
                    decode_slot(addr.number, &slot)?
                };
                if let Some(flags) = &flags {
                    record.skip = decode_skip(flags)?;
                }
                record
            }
        };
        record.extended_name = addr.extended_name.clone();
        Ok(record)
    }

    fn store(&mut self, addr: &ChannelAddress<YaesuArray>, record: &ChannelRecord) -> Result<()> {
        let (slots, flags) = match addr.array.backing() {
            Backing::Preset(_) => {
                warn!(
                    channel = addr.extended_name.as_deref().unwrap_or_default(),
                    "firmware preset channels are read-only, write ignored"
                );
                return Ok(());
            }
            Backing::Slots { slots, flags } => (slots, flags),
        };
        if record.empty {
            return self.erase(addr, slots, flags);
        }
        self.validate(addr, record)?;

        // Encode into a copy so a rejected record leaves the slot as it was.
        let range = slots.element_range(addr.index)?;
        let mut raw = self.image.slice(range.clone())?.to_vec();
        encode_slot(record, &mut FieldViewMut::over(slots.def, &mut raw)?)?;
        self.image.slice_mut(range)?.copy_from_slice(&raw);

        if let Some(flags) = flags {
            encode_flags(record, &mut self.image.view_mut(flags, addr.index)?)?;
        }
        debug!(number = addr.number, freq = record.freq, "channel stored");
        Ok(())
    }

    fn erase(
        &mut self,
        addr: &ChannelAddress<YaesuArray>,
        slots: &'static ArrayDef,
        flags: Option<&'static ArrayDef>,
    ) -> Result<()> {
        if addr.array == YaesuArray::Home {
            return Err(Error::InvalidParameter(format!(
                "Home channel {} cannot be erased",
                addr.extended_name.as_deref().unwrap_or_default()
            )));
        }
        let left = self.banks.remove_from_all(&mut self.image, addr.number)?;
        if left > 0 {
            debug!(number = addr.number, banks = left, "erased channel removed from banks");
        }
        wipe_slot(&mut self.image.view_mut(slots, addr.index)?)?;
        if let Some(flags) = flags {
            self.image.view_mut(flags, addr.index)?.set_bool("used", false)?;
        }
        debug!(number = addr.number, "channel erased");
        Ok(())
    }

    fn bankable(&self, number: u32) -> Result<()> {
        let addr = self.resolver.resolve(&ChannelId::Number(number))?;
        if addr.kind == ChannelKind::Preset {
            return Err(Error::Unsupported(format!(
                "bank membership of firmware preset {}",
                addr.extended_name.as_deref().unwrap_or_default()
            )));
        }
        Ok(())
    }
}

/// Start offsets of the VFO blocks belonging to the named pairs.
fn diverged_blocks(names: &[String]) -> Result<Vec<usize>> {
    let mut starts = Vec::new();
    for pair in VFO_MIRRORS.iter().filter(|p| names.iter().any(|n| n == p.name)) {
        for index in [pair.primary, pair.backup] {
            starts.push(pair.array.element_range(index)?.start);
        }
    }
    Ok(starts)
}

/// Put one VFO on or off banks.
fn point_vfo(name: &str, choice: VfoChoice, vfo: &mut FieldViewMut<'_>) -> Result<()> {
    let bank_index = vfo.get("bank_index")?;
    match choice {
        None if bank_index != VFO_NO_BANK => {
            info!(vfo = name, "disabling banks");
            vfo.set("bank_index", VFO_NO_BANK)?;
            vfo.set("mr_index", VFO_NO_BANK)?;
            vfo.set("bank_enable", VFO_NO_BANK)?;
        }
        Some((bank, channel)) if bank_index == VFO_NO_BANK => {
            info!(vfo = name, %bank, channel, "enabling banks");
            vfo.set("bank_index", bank.0 as u32)?;
            vfo.set("mr_index", channel)?;
            vfo.set("bank_enable", 0)?;
        }
        _ => {}
    }
    Ok(())
}

#[async_trait]
impl ChannelStore for Ft1Radio {
    type Array = YaesuArray;

    fn features(&self) -> MemoryFeatures {
        MemoryFeatures {
            memory_bounds: self.resolver.regular_bounds(),
            special_names: self.resolver.special_names().map(String::from).collect(),
            valid_modes: vec![Mode::FM, Mode::NFM, Mode::AM, Mode::WFM, Mode::DigitalVoice],
            name_length: self.model.name_length,
            bank_count: self.banks.bank_count(),
            has_comment: false,
            can_write: true,
        }
    }

    fn resolve(&self, id: &ChannelId) -> Result<ChannelAddress<YaesuArray>> {
        self.resolver.resolve(id)
    }

    async fn read_channel(&mut self, addr: &ChannelAddress<YaesuArray>) -> Result<ChannelRecord> {
        self.load(addr)
    }

    async fn write_channel(
        &mut self,
        addr: &ChannelAddress<YaesuArray>,
        record: &ChannelRecord,
    ) -> Result<()> {
        self.store(addr, record)
    }

    async fn bank_membership(&self, number: u32) -> Result<BTreeSet<BankId>> {
        self.resolver.resolve(&ChannelId::Number(number))?;
        self.banks.banks_of(&self.image, number)
    }

    async fn set_bank_membership(&mut self, number: u32, bank: BankId, present: bool) -> Result<()> {
        self.bankable(number)?;
        self.banks.set_membership(&mut self.image, number, bank, present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{
        BANK_INFO, BANK_MEMBERS, BANK_USED, IMAGE_SIZE, MODEL_CODE, POWER_LEVELS, VFO_INFO,
    };
    use proptest::prelude::*;
    use rigmem_core::error::{AddressError, BankError, FrameError};
    use rigmem_core::types::{Duplex, Skip};

    fn blank_image() -> MemoryImage {
        let mut image = MemoryImage::zeroed(IMAGE_SIZE);
        image.slice_mut(0..5).unwrap().copy_from_slice(MODEL_CODE);
        for array in [&BANK_USED, &BANK_MEMBERS, &BANK_INFO] {
            image.slice_mut(array.offset..array.end()).unwrap().fill(0xFF);
        }
        for i in 0..VFO_INFO.count {
            let mut vfo = image.view_mut(&VFO_INFO, i).unwrap();
            for field in ["mr_index", "bank_index", "bank_enable"] {
                vfo.set(field, VFO_NO_BANK).unwrap();
            }
        }
        update_checksums(&mut image, &CHECKSUM_REGIONS).unwrap();
        image
    }

    fn radio() -> Ft1Radio {
        Ft1Radio::from_image(blank_image()).unwrap()
    }

    fn flag_byte(radio: &Ft1Radio, number: u32) -> u8 {
        radio.image().view(&FLAG, number as usize - 1).unwrap().raw()[0]
    }

    async fn write(radio: &mut Ft1Radio, id: impl Into<ChannelId>, record: &ChannelRecord) -> Result<()> {
        let addr = radio.resolve(&id.into())?;
        radio.write_channel(&addr, record).await
    }

    async fn read(radio: &mut Ft1Radio, id: impl Into<ChannelId>) -> Result<ChannelRecord> {
        let addr = radio.resolve(&id.into())?;
        radio.read_channel(&addr).await
    }

    fn vfo_fields(radio: &Ft1Radio, index: usize) -> (u32, u32, u32) {
        let view = radio.image().view(&VFO_INFO, index).unwrap();
        (
            view.get("bank_index").unwrap(),
            view.get("mr_index").unwrap(),
            view.get("bank_enable").unwrap(),
        )
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    #[test]
    fn test_blank_image_loads_clean() {
        let radio = radio();
        assert_eq!(radio.model().name, "FT-1D");
        radio.verify_checksums().unwrap();
    }

    #[test]
    fn test_foreign_image_is_refused() {
        let mut data = blank_image().into_bytes();
        data[0] = b'Z';
        assert!(matches!(Ft1Radio::from_bytes(data), Err(Error::Protocol(_))));
        assert!(matches!(Ft1Radio::from_bytes(vec![0; 100]), Err(Error::Protocol(_))));
    }

    #[test]
    fn test_corrupted_image_still_loads() {
        let mut data = blank_image().into_bytes();
        data[0x3000] ^= 0x40;
        let radio = Ft1Radio::from_bytes(data).unwrap();
        assert!(matches!(
            radio.verify_checksums(),
            Err(Error::Frame(FrameError::ChecksumMismatch { .. }))
        ));
    }

    #[test]
    fn test_features() {
        let f = radio().features();
        assert_eq!(f.memory_bounds, (1, 900));
        assert_eq!(f.special_names.len(), 99 + 100 + 11 + 10 + 88 + 89);
        assert_eq!(f.special_names[0], "Skip901");
        assert_eq!(f.special_names.last().map(String::as_str), Some("SWL89"));
        assert_eq!(f.bank_count, 24);
        assert_eq!(f.name_length, 16);
    }

    #[test]
    fn test_canonical_numbers() {
        let r = ft1d_resolver();
        assert_eq!(r.max_number(), 1297);
        let cases = [
            ("Skip901", 901, YaesuArray::Skip),
            ("L1", 1000, YaesuArray::Pms),
            ("U50", 1099, YaesuArray::Pms),
            ("AM", 1100, YaesuArray::Home),
            ("Info2", 1110, YaesuArray::Home),
            ("WX1", 1111, YaesuArray::Wx),
            ("Marine1", 1121, YaesuArray::Marine),
            ("SWL89", 1297, YaesuArray::Swl),
        ];
        for (name, number, array) in cases {
            let addr = r.resolve(&ChannelId::from(name)).unwrap();
            assert_eq!((addr.number, addr.array), (number, array), "{name}");
        }
    }

    // -----------------------------------------------------------------------
    // Channels
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_unused_memory_reads_empty() {
        let mut radio = radio();
        let rec = read(&mut radio, 1u32).await.unwrap();
        assert!(rec.empty);
        assert_eq!(rec.power, Some(POWER_LEVELS[0]));
        assert_eq!(rec.mode, Mode::FM);
    }

    #[tokio::test]
    async fn test_write_then_read_memory() {
        let mut radio = radio();
        let rec = ChannelRecord {
            name: "Simplex".into(),
            skip: Skip::Skip,
            power: Some(POWER_LEVELS[3]),
            ..ChannelRecord::new(17, 146_520_000)
        };
        write(&mut radio, 17u32, &rec).await.unwrap();

        let back = read(&mut radio, 17u32).await.unwrap();
        assert_eq!(back.freq, 146_520_000);
        assert_eq!(back.name, "Simplex");
        assert_eq!(back.skip, Skip::Skip);
        assert_eq!(back.power, Some(POWER_LEVELS[3]));
        assert_eq!(back.tuning_step, Some(5_000));
        assert_eq!(back.extended_name, None);
        // used | valid | skip, sub VFO allowed
        assert_eq!(flag_byte(&radio, 17), 0x07);
    }

    #[tokio::test]
    async fn test_hf_channel_is_kept_off_the_sub_vfo() {
        let mut radio = radio();
        write(&mut radio, 2u32, &ChannelRecord::new(2, 7_074_000)).await.unwrap();
        assert_eq!(flag_byte(&radio, 2), 0x83);
    }

    #[tokio::test]
    async fn test_split_offset_is_the_transmit_frequency() {
        let mut radio = radio();
        let rec = ChannelRecord {
            duplex: Duplex::Split,
            offset: 445_012_500,
            ..ChannelRecord::new(3, 145_012_500)
        };
        write(&mut radio, 3u32, &rec).await.unwrap();
        let back = read(&mut radio, 3u32).await.unwrap();
        assert_eq!(back.duplex, Duplex::Split);
        assert_eq!(back.offset, 445_012_500);
        assert_eq!(back.freq, 145_012_500);
    }

    #[tokio::test]
    async fn test_rejected_record_leaves_slot_untouched() {
        let mut radio = radio();
        write(&mut radio, 4u32, &ChannelRecord::new(4, 146_520_000)).await.unwrap();
        let before = radio.image().clone();

        let bad = ChannelRecord {
            mode: Mode::USB,
            ..ChannelRecord::new(4, 146_550_000)
        };
        assert!(matches!(write(&mut radio, 4u32, &bad).await, Err(Error::InvalidParameter(_))));
        assert_eq!(radio.image(), &before);
    }

    #[tokio::test]
    async fn test_out_of_range_frequency() {
        let mut radio = radio();
        let err = write(&mut radio, 5u32, &ChannelRecord::new(5, 400_000)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn test_skip_and_pms_specials() {
        let mut radio = radio();
        write(&mut radio, "Skip950", &ChannelRecord::new(0, 446_000_000)).await.unwrap();
        let back = read(&mut radio, 950u32).await.unwrap();
        assert!(!back.empty);
        assert_eq!(back.number, 950);
        assert_eq!(back.extended_name.as_deref(), Some("Skip950"));

        write(&mut radio, "U1", &ChannelRecord::new(0, 144_000_000)).await.unwrap();
        let lower = read(&mut radio, "L1").await.unwrap();
        let upper = read(&mut radio, "U1").await.unwrap();
        assert!(lower.empty);
        assert_eq!((upper.number, upper.freq), (1001, 144_000_000));
        // Skip950 and U1 sit in the slots and flags right after memory 900
        assert_eq!(radio.image().view(&FLAG_SKIP, 49).unwrap().raw()[0], 0x03);
        assert_eq!(radio.image().view(&FLAG_PMS, 1).unwrap().raw()[0], 0x03);
    }

    #[tokio::test]
    async fn test_unknown_channel() {
        let mut radio = radio();
        for id in [ChannelId::Number(0), ChannelId::Number(1298), ChannelId::from("Skip1000")] {
            let err = read(&mut radio, id).await.unwrap_err();
            assert!(matches!(err, Error::Address(AddressError::UnknownChannel(_))));
        }
    }

    // -----------------------------------------------------------------------
    // Home channels
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_home_reads_without_flags() {
        let mut radio = radio();
        let rec = read(&mut radio, "144MHz").await.unwrap();
        assert!(!rec.empty);
        assert_eq!(rec.extended_name.as_deref(), Some("144MHz"));
    }

    #[tokio::test]
    async fn test_home_frequency_must_be_inside_its_band() {
        let mut radio = radio();
        let ok = ChannelRecord::new(0, 146_520_000);
        write(&mut radio, "144MHz", &ok).await.unwrap();
        assert_eq!(read(&mut radio, "144MHz").await.unwrap().freq, 146_520_000);

        let outside = ChannelRecord::new(0, 446_000_000);
        let err = write(&mut radio, "144MHz", &outside).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(ref m) if m.contains("Home6")));

        // band edges are exclusive
        let edge = ChannelRecord::new(0, 137_000_000);
        assert!(write(&mut radio, "144MHz", &edge).await.is_err());
    }

    #[tokio::test]
    async fn test_home_cannot_be_erased() {
        let mut radio = radio();
        let err = write(&mut radio, "AM", &ChannelRecord::empty(0)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    // -----------------------------------------------------------------------
    // Presets
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_presets_read_from_the_firmware_table() {
        let mut radio = radio();
        let voa = read(&mut radio, "SWL1").await.unwrap();
        assert_eq!((voa.name.as_str(), voa.freq, voa.mode), ("VOA", 6_030_000, Mode::AM));
        assert_eq!(voa.comment, "USA");
        assert!(voa.read_only);
        assert_eq!(voa.extended_name.as_deref(), Some("SWL1"));

        let unprogrammed = read(&mut radio, "Marine40").await.unwrap();
        assert!(unprogrammed.empty);
        assert!(unprogrammed.read_only);
    }

    #[tokio::test]
    async fn test_preset_writes_are_ignored() {
        let mut radio = radio();
        let before = radio.image().clone();
        write(&mut radio, "WX1", &ChannelRecord::new(0, 146_520_000)).await.unwrap();
        write(&mut radio, "WX1", &ChannelRecord::empty(0)).await.unwrap();
        assert_eq!(radio.image(), &before);
        assert_eq!(read(&mut radio, "WX1").await.unwrap().freq, 162_550_000);
    }

    // -----------------------------------------------------------------------
    // Banks
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_bank_membership_round_trip() {
        let mut radio = radio();
        radio.set_bank_membership(5, BankId(0), true).await.unwrap();
        radio.set_bank_membership(5, BankId(3), true).await.unwrap();
        radio.set_bank_membership(1, BankId(3), true).await.unwrap();

        let banks = radio.bank_membership(5).await.unwrap();
        assert_eq!(banks.into_iter().collect::<Vec<_>>(), vec![BankId(0), BankId(3)]);
        assert_eq!(radio.channels_in_bank(BankId(3)).unwrap().into_iter().collect::<Vec<_>>(), vec![1, 5]);

        radio.set_bank_membership(5, BankId(0), false).await.unwrap();
        assert!(radio.channels_in_bank(BankId(0)).unwrap().is_empty());
        assert_eq!(radio.image().view(&BANK_USED, 0).unwrap().get("in_use").unwrap(), 0xFFFF);
    }

    #[tokio::test]
    async fn test_bank_errors() {
        let mut radio = radio();
        let err = radio.set_bank_membership(5, BankId(2), false).await.unwrap_err();
        assert!(matches!(err, Error::Bank(BankError::NotAMember { channel: 5, bank: 2 })));

        let err = radio.set_bank_membership(5, BankId(24), true).await.unwrap_err();
        assert!(matches!(err, Error::Bank(BankError::UnknownBank(24))));

        let err = radio.set_bank_membership(1111, BankId(0), true).await.unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));

        assert!(radio.bank_membership(5000).await.is_err());
    }

    #[tokio::test]
    async fn test_full_bank() {
        let mut radio = radio();
        for channel in 1..=100 {
            radio.set_bank_membership(channel, BankId(7), true).await.unwrap();
        }
        let err = radio.set_bank_membership(101, BankId(7), true).await.unwrap_err();
        assert!(matches!(err, Error::Bank(BankError::BankFull { bank: 7, capacity: 100 })));
        assert_eq!(radio.channels_in_bank(BankId(7)).unwrap().len(), 100);
    }

    #[tokio::test]
    async fn test_erasing_a_channel_removes_it_from_banks() {
        let mut radio = radio();
        write(&mut radio, 9u32, &ChannelRecord::new(9, 146_520_000)).await.unwrap();
        radio.set_bank_membership(9, BankId(0), true).await.unwrap();
        radio.set_bank_membership(9, BankId(5), true).await.unwrap();
        radio.set_bank_membership(10, BankId(5), true).await.unwrap();

        write(&mut radio, 9u32, &ChannelRecord::empty(9)).await.unwrap();

        assert!(read(&mut radio, 9u32).await.unwrap().empty);
        assert!(radio.bank_membership(9).await.unwrap().is_empty());
        assert_eq!(radio.channels_in_bank(BankId(5)).unwrap().into_iter().collect::<Vec<_>>(), vec![10]);
        assert_eq!(flag_byte(&radio, 9) & 0x02, 0);
        let slot = radio.image().view(&MEMORY, 8).unwrap();
        assert_eq!(slot.raw()[0], 0x05);
        assert!(slot.raw()[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_bank_names() {
        let mut radio = radio();
        assert_eq!(radio.bank_name(BankId(0)).unwrap(), "");
        radio.set_bank_name(BankId(0), "Local").unwrap();
        assert_eq!(radio.bank_name(BankId(0)).unwrap(), "Local");
        // space padded, not 0xFF padded
        let raw = radio.image().view(&BANK_INFO, 0).unwrap().bytes("name").unwrap().to_vec();
        assert_eq!(raw[5..], [36u8; 11]);
        assert!(radio.set_bank_name(BankId(1), "caf\u{e9}").is_err());
    }

    // -----------------------------------------------------------------------
    // VFO mirrors
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_vfos_follow_the_banks() {
        let mut radio = radio();
        write(&mut radio, 3u32, &ChannelRecord::new(3, 7_074_000)).await.unwrap();
        write(&mut radio, 7u32, &ChannelRecord::new(7, 146_520_000)).await.unwrap();
        radio.set_bank_membership(3, BankId(0), true).await.unwrap();
        radio.set_bank_membership(7, BankId(1), true).await.unwrap();

        radio.prepare_upload().unwrap();

        // VFO A takes the HF channel, VFO B cannot tune it and takes channel 7
        assert_eq!(vfo_fields(&radio, 0), (0, 3, 0));
        assert_eq!(vfo_fields(&radio, 1), (0, 3, 0));
        assert_eq!(vfo_fields(&radio, 2), (1, 7, 0));
        assert_eq!(vfo_fields(&radio, 3), (1, 7, 0));
        radio.verify_checksums().unwrap();
    }

    #[tokio::test]
    async fn test_vfo_already_on_a_bank_is_left_alone() {
        let mut radio = radio();
        write(&mut radio, 7u32, &ChannelRecord::new(7, 146_520_000)).await.unwrap();
        radio.set_bank_membership(7, BankId(1), true).await.unwrap();
        radio.prepare_upload().unwrap();

        radio.set_bank_membership(8, BankId(0), true).await.unwrap();
        radio.prepare_upload().unwrap();
        assert_eq!(vfo_fields(&radio, 0), (1, 7, 0));
    }

    #[tokio::test]
    async fn test_vfos_leave_banks_when_banks_empty() {
        let mut radio = radio();
        write(&mut radio, 7u32, &ChannelRecord::new(7, 146_520_000)).await.unwrap();
        radio.set_bank_membership(7, BankId(1), true).await.unwrap();
        radio.prepare_upload().unwrap();

        radio.set_bank_membership(7, BankId(1), false).await.unwrap();
        radio.prepare_upload().unwrap();
        for i in 0..4 {
            assert_eq!(vfo_fields(&radio, i), (VFO_NO_BANK, VFO_NO_BANK, VFO_NO_BANK));
        }
    }

    #[tokio::test]
    async fn test_divergent_vfo_is_reported_and_skipped() {
        let mut radio = radio();
        write(&mut radio, 7u32, &ChannelRecord::new(7, 146_520_000)).await.unwrap();
        radio.set_bank_membership(7, BankId(1), true).await.unwrap();

        // Make the VFO B backup disagree with its primary.
        let backup_sum = CHECKSUM_REGIONS[3].address();
        radio.image.slice_mut(backup_sum..backup_sum + 1).unwrap()[0] ^= 0xFF;
        let corrupted = radio.image().as_bytes()[backup_sum];

        let err = radio.prepare_upload().unwrap_err();
        assert!(matches!(
            err,
            Error::Bank(BankError::MirrorDivergence { ref pairs }) if pairs == &["VFO B".to_string()]
        ));
        assert_eq!(vfo_fields(&radio, 0), (1, 7, 0));
        assert_eq!(vfo_fields(&radio, 2), (VFO_NO_BANK, VFO_NO_BANK, VFO_NO_BANK));
        assert_eq!(radio.image().as_bytes()[backup_sum], corrupted);
    }

    #[tokio::test]
    async fn test_divergence_survives_repeated_uploads() {
        let mut radio = radio();
        write(&mut radio, 7u32, &ChannelRecord::new(7, 146_520_000)).await.unwrap();
        radio.set_bank_membership(7, BankId(1), true).await.unwrap();

        let backup_sum = CHECKSUM_REGIONS[3].address();
        radio.image.slice_mut(backup_sum..backup_sum + 1).unwrap()[0] ^= 0xFF;

        for _ in 0..2 {
            let err = radio.prepare_upload().unwrap_err();
            assert!(matches!(err, Error::Bank(BankError::MirrorDivergence { .. })));
        }
        assert_eq!(
            rigmem_memory::divergent_mirrors(radio.image(), &VFO_MIRRORS).unwrap(),
            vec!["VFO B"]
        );

        // VFO A and the whole-image sum were still recomputed.
        for region in [CHECKSUM_REGIONS[0], CHECKSUM_REGIONS[1], CHECKSUM_REGIONS[4]] {
            region.verify(radio.image()).unwrap();
        }
        assert!(CHECKSUM_REGIONS[3].verify(radio.image()).is_err());
        assert!(radio.verify_checksums().is_err());
    }

    #[tokio::test]
    async fn test_preset_bank_entries_are_not_followed() {
        let mut radio = radio();
        // A firmware preset entry the radio itself put in bank 0.
        let mut members = [0xFFu8; 200];
        members[..2].copy_from_slice(&0x7005u16.to_be_bytes());
        radio
            .image
            .view_mut(&BANK_MEMBERS, 0)
            .unwrap()
            .set_bytes("channel", &members)
            .unwrap();
        radio.image.view_mut(&BANK_USED, 0).unwrap().set("in_use", 0x0006).unwrap();
        write(&mut radio, 7u32, &ChannelRecord::new(7, 146_520_000)).await.unwrap();
        radio.set_bank_membership(7, BankId(2), true).await.unwrap();

        radio.prepare_upload().unwrap();
        assert_eq!(vfo_fields(&radio, 0), (2, 7, 0));
    }

    proptest! {
        #[test]
        fn test_narrow_step_frequencies_survive_khz_storage(k in 23_040u64..=23_680) {
            let freq = k * 6_250;
            let mut radio = radio();
            let addr = radio.resolve(&ChannelId::Number(1)).unwrap();
            radio.store(&addr, &ChannelRecord::new(1, freq)).unwrap();
            prop_assert_eq!(radio.load(&addr).unwrap().freq, freq);
        }
    }
}
