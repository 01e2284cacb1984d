//! Channel slot codec.
//!
//! Converts between a 32-byte memory slot (plus its flag byte, when the
//! array has one) and a [`ChannelRecord`]. Values the radio stores as
//! table indices are looked up in the tables of [`crate::layout`].

use tracing::debug;

use rigmem_core::error::{Error, Result};
use rigmem_core::helpers::fix_rounded_step;
use rigmem_core::layout::{FieldView, FieldViewMut};
use rigmem_core::tones::{CTCSS_TONES, DTCS_CODES, dtcs_index, tone_index};
use rigmem_core::types::{ChannelRecord, Duplex, Mode, Skip};

use crate::layout::{
    DUPLEXES, LABEL_LENGTH, MODES, POWER_LEVELS, STEPS, TONE_MODES, YAESU_CHARSET, is_main_vfo_only,
};

/// `digmode` value for AMS, the default when a channel becomes DN.
const DIGMODE_AMS: u32 = 1;

/// Value of the low nibble of byte 0 in a freshly erased slot.
const WIPED_UNKNOWN1: u32 = 0x05;

/// Whether a slot holds a channel.
///
/// Slots with a flag byte are in use when both `used` and `valid` are set.
/// Slots without one are blank when the radio has filled them with 0xFF,
/// which shows in `charsetbits` and `dcs`.
pub fn is_empty_slot(slot: &FieldView<'_>, flags: Option<&FieldView<'_>>) -> Result<bool> {
    match flags {
        Some(flags) => Ok(!flags.get_bool("used")? || !flags.get_bool("valid")?),
        None => Ok(slot.get("charsetbits")? == 0xFFFF && slot.get("dcs")? == 0x7F),
    }
}

/// Scan setting from a flag byte.
pub fn decode_skip(flags: &FieldView<'_>) -> Result<Skip> {
    Ok(if flags.get_bool("pskip")? {
        Skip::Priority
    } else if flags.get_bool("skip")? {
        Skip::Skip
    } else {
        Skip::None
    })
}

/// The record an empty slot reads back as.
pub fn empty_record(number: u32) -> ChannelRecord {
    ChannelRecord {
        power: Some(POWER_LEVELS[0]),
        tuning_step: Some(STEPS[0]),
        ..ChannelRecord::empty(number)
    }
}

/// Decode an in-use slot. Skip and the special name are left for the
/// caller, which knows whether the slot has flags.
pub fn decode_slot(number: u32, slot: &FieldView<'_>) -> Result<ChannelRecord> {
    let duplex = DUPLEXES[slot.get("duplex")? as usize];
    let mut offset = u64::from(slot.get("offset")?) * 1000;
    if duplex == Duplex::Split {
        offset = fix_rounded_step(offset);
    }

    Ok(ChannelRecord {
        freq: fix_rounded_step(u64::from(slot.get("freq")?) * 1000),
        offset: offset as i64,
        mode: decode_mode(slot)?,
        name: YAESU_CHARSET.decode(slot.bytes("label")?),
        duplex,
        tone_mode: TONE_MODES[clamp_index(slot.get("tone_mode")?, TONE_MODES.len())],
        tone: CTCSS_TONES[clamp_index(slot.get("tone")?, CTCSS_TONES.len())],
        dtcs: DTCS_CODES[clamp_index(slot.get("dcs")?, DTCS_CODES.len())],
        power: Some(POWER_LEVELS[3 - slot.get("power")? as usize]),
        tuning_step: STEPS.get(slot.get("tune_step")? as usize).copied(),
        ..ChannelRecord::new(number, 0)
    })
}

fn clamp_index(raw: u32, len: usize) -> usize {
    (raw as usize).min(len - 1)
}

fn decode_mode(slot: &FieldView<'_>) -> Result<Mode> {
    let mode = MODES[clamp_index(slot.get("mode")?, MODES.len())];
    if mode == Mode::FM && slot.get("digmode")? != 0 {
        return Ok(Mode::DigitalVoice);
    }
    if mode == Mode::FM && slot.get_bool("mode_alt")? {
        return Ok(Mode::NFM);
    }
    Ok(mode)
}

/// Store `record` into an in-use slot.
///
/// Fields the record does not describe (`clock_shift`, the attenuator and
/// auto-step bits) keep their stored values.
pub fn encode_slot(record: &ChannelRecord, slot: &mut FieldViewMut<'_>) -> Result<()> {
    let power = match record.power {
        None => 3,
        Some(level) => {
            let index = POWER_LEVELS.iter().position(|p| *p == level).ok_or_else(|| {
                Error::InvalidParameter(format!("power level {level} not available"))
            })?;
            3 - index as u32
        }
    };
    slot.set("power", power)?;

    let tone = tone_index(record.tone)
        .ok_or_else(|| Error::InvalidParameter(format!("tone {} not a standard CTCSS tone", record.tone)))?;
    slot.set("tone", tone as u32)?;
    slot.set("tone_mode", index_of(&TONE_MODES, &record.tone_mode, "tone mode")?)?;

    let dcs = dtcs_index(record.dtcs)
        .ok_or_else(|| Error::InvalidParameter(format!("DCS code {:03} not standard", record.dtcs)))?;
    slot.set("dcs", dcs as u32)?;

    let step = record.tuning_step.unwrap_or(STEPS[0]);
    let step = STEPS
        .iter()
        .position(|&s| s == step)
        .ok_or_else(|| Error::InvalidParameter(format!("tuning step {step} Hz not available")))?;
    slot.set("tune_step", step as u32)?;
    slot.set("duplex", index_of(&DUPLEXES, &record.duplex, "duplex")?)?;

    encode_mode(record.mode, slot)?;

    if record.offset < 0 {
        return Err(Error::InvalidParameter(format!("negative offset {}", record.offset)));
    }
    slot.set("freq", khz(record.freq)?)?;
    slot.set("offset", khz(record.offset as u64)?)?;
    slot.set_bytes("label", &YAESU_CHARSET.encode(&record.name, LABEL_LENGTH)?)?;
    slot.set("charsetbits", 0)
}

fn index_of<T: PartialEq + std::fmt::Debug>(table: &[T], value: &T, what: &str) -> Result<u32> {
    table
        .iter()
        .position(|v| v == value)
        .map(|i| i as u32)
        .ok_or_else(|| Error::InvalidParameter(format!("{what} {value:?} not supported")))
}

fn khz(hz: u64) -> Result<u32> {
    u32::try_from(hz / 1000)
        .ok()
        .filter(|&k| k <= 999_999)
        .ok_or_else(|| Error::InvalidParameter(format!("{hz} Hz does not fit the slot")))
}

fn encode_mode(mode: Mode, slot: &mut FieldViewMut<'_>) -> Result<()> {
    let base = match mode {
        Mode::NFM | Mode::DigitalVoice => Mode::FM,
        other => other,
    };
    let index = index_of(&MODES, &base, "mode")?;

    slot.set_bool("mode_alt", mode == Mode::NFM)?;
    let digmode = slot.get("digmode")?;
    if mode == Mode::DigitalVoice && digmode == 0 {
        debug!("new DN channel, defaulting to AMS");
        slot.set("digmode", DIGMODE_AMS)?;
    } else if mode == Mode::FM && digmode != 0 {
        debug!("FM channel is analog only, clearing AMS");
        slot.set("digmode", 0)?;
    }
    slot.set("mode", index)
}

/// Update a flag byte for an in-use channel.
pub fn encode_flags(record: &ChannelRecord, flags: &mut FieldViewMut<'_>) -> Result<()> {
    flags.set_bool("nosubvfo", is_main_vfo_only(record.freq))?;
    flags.set_bool("used", true)?;
    flags.set_bool("valid", true)?;
    flags.set_bool("skip", record.skip == Skip::Skip)?;
    flags.set_bool("pskip", record.skip == Skip::Priority)
}

/// Blank a slot the way the radio does.
pub fn wipe_slot(slot: &mut FieldViewMut<'_>) -> Result<()> {
    slot.fill(0);
    slot.set("unknown1", WIPED_UNKNOWN1)
}
