//! Core types used throughout rigmem.
//!
//! These types describe a memory channel the way an editing application
//! sees it, independent of whether the radio stores it in a downloaded
//! clone image or serves it record by record over a command link.

use std::fmt;
use std::str::FromStr;

/// Operating mode stored with a memory channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Frequency modulation.
    FM,
    /// Narrow FM.
    NFM,
    /// Wide (broadcast) FM.
    WFM,
    /// Amplitude modulation.
    AM,
    /// Upper sideband voice.
    USB,
    /// Lower sideband voice.
    LSB,
    /// CW (morse).
    CW,
    /// Sound-card or FSK data modes.
    Data,
    /// Digital voice (C4FM, D-STAR, ...).
    DigitalVoice,
    /// Mode follows the band plan or is not stored by the radio.
    Auto,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::FM => "FM",
            Mode::NFM => "NFM",
            Mode::WFM => "WFM",
            Mode::AM => "AM",
            Mode::USB => "USB",
            Mode::LSB => "LSB",
            Mode::CW => "CW",
            Mode::Data => "DATA",
            Mode::DigitalVoice => "DN",
            Mode::Auto => "Auto",
        };
        write!(f, "{s}")
    }
}

/// Error returned when a string cannot be parsed into a [`Mode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError(String);

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown mode: {}", self.0)
    }
}

impl std::error::Error for ParseModeError {}

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FM" => Ok(Mode::FM),
            "NFM" => Ok(Mode::NFM),
            "WFM" => Ok(Mode::WFM),
            "AM" => Ok(Mode::AM),
            "USB" => Ok(Mode::USB),
            "LSB" => Ok(Mode::LSB),
            "CW" => Ok(Mode::CW),
            "DATA" => Ok(Mode::Data),
            "DN" | "DV" => Ok(Mode::DigitalVoice),
            "AUTO" => Ok(Mode::Auto),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Transmit offset direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Duplex {
    #[default]
    Simplex,
    Plus,
    Minus,
    /// `offset` holds the absolute transmit frequency.
    Split,
}

impl fmt::Display for Duplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Duplex::Simplex => "",
            Duplex::Plus => "+",
            Duplex::Minus => "-",
            Duplex::Split => "split",
        };
        write!(f, "{s}")
    }
}

/// Sub-audible signalling used by a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToneMode {
    #[default]
    None,
    /// CTCSS encode on transmit.
    Tone,
    /// CTCSS encode and squelch.
    Tsql,
    /// Digital coded squelch.
    Dtcs,
}

impl fmt::Display for ToneMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ToneMode::None => "",
            ToneMode::Tone => "Tone",
            ToneMode::Tsql => "TSQL",
            ToneMode::Dtcs => "DTCS",
        };
        write!(f, "{s}")
    }
}

/// Scan behaviour of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Skip {
    #[default]
    None,
    /// Skipped while scanning.
    Skip,
    /// Priority (preferential) scan.
    Priority,
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Skip::None => "",
            Skip::Skip => "S",
            Skip::Priority => "P",
        };
        write!(f, "{s}")
    }
}

/// A named transmit power setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PowerLevel {
    pub label: &'static str,
    pub milliwatts: u32,
}

impl PowerLevel {
    pub const fn new(label: &'static str, milliwatts: u32) -> Self {
        PowerLevel { label, milliwatts }
    }
}

impl fmt::Display for PowerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// The logical unit exposed to an editing application.
///
/// When `empty` is true the frequency and offset fields carry no meaning.
/// The backing storage of an empty slot frequently holds stale data or an
/// all-bits-set sentinel, and drivers do not scrub it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRecord {
    /// Canonical channel number.
    pub number: u32,
    /// Name of a special channel (`"Skip901"`, `"160 M1"`); `None` for
    /// ordinary channels.
    pub extended_name: Option<String>,
    pub empty: bool,
    /// Receive frequency in hertz.
    pub freq: u64,
    /// Offset in hertz, or the transmit frequency when duplex is split.
    /// Negative when the radio stores a "no offset" sentinel.
    pub offset: i64,
    pub mode: Mode,
    /// Channel label, already decoded from the vendor alphabet.
    pub name: String,
    pub duplex: Duplex,
    pub tone_mode: ToneMode,
    /// CTCSS tone in tenths of a hertz (885 = 88.5 Hz).
    pub tone: u16,
    /// DCS code, written in octal digits as printed on the radio (023).
    pub dtcs: u16,
    pub skip: Skip,
    pub power: Option<PowerLevel>,
    /// Tuning step in hertz, when the radio stores one.
    pub tuning_step: Option<u32>,
    pub comment: String,
    /// Vendor firmware data the application may display but not edit.
    pub read_only: bool,
}

impl ChannelRecord {
    /// An empty record for the given channel number.
    pub fn empty(number: u32) -> Self {
        ChannelRecord {
            number,
            extended_name: None,
            empty: true,
            freq: 0,
            offset: 0,
            mode: Mode::FM,
            name: String::new(),
            duplex: Duplex::Simplex,
            tone_mode: ToneMode::None,
            tone: 885,
            dtcs: 23,
            skip: Skip::None,
            power: None,
            tuning_step: None,
            comment: String::new(),
            read_only: false,
        }
    }

    /// A populated record tuned to `freq` with everything else defaulted.
    pub fn new(number: u32, freq: u64) -> Self {
        ChannelRecord {
            empty: false,
            freq,
            ..ChannelRecord::empty(number)
        }
    }
}

/// What sort of storage backs a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// An ordinary numbered channel.
    Regular,
    /// A named special channel the user can edit.
    Special,
    /// Vendor firmware preset; reads succeed, writes are ignored.
    Preset,
}

/// A closed set of backing arrays declared by a driver.
///
/// Drivers implement this on a small enum (`Memory`, `Skip`, `Pms`, ...)
/// and dispatch on it with an exhaustive `match` instead of string keys.
pub trait ArrayKind: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Display name of the backing array.
    fn name(&self) -> &'static str;
}

/// Where a logical channel lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelAddress<K: ArrayKind> {
    pub kind: ChannelKind,
    pub array: K,
    /// Element index within `array`.
    pub index: usize,
    /// Canonical channel number.
    pub number: u32,
    /// Special name, for special and preset channels.
    pub extended_name: Option<String>,
}

/// A channel named either by canonical number or by special name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChannelId {
    Number(u32),
    Name(String),
}

impl ChannelId {
    /// Parse user input: all-digit strings are numbers, anything else is a
    /// special name.
    pub fn parse(s: &str) -> Self {
        match s.trim().parse::<u32>() {
            Ok(n) => ChannelId::Number(n),
            Err(_) => ChannelId::Name(s.trim().to_string()),
        }
    }
}

impl From<u32> for ChannelId {
    fn from(n: u32) -> Self {
        ChannelId::Number(n)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        ChannelId::Name(s.to_string())
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelId::Number(n) => write!(f, "{n}"),
            ChannelId::Name(s) => write!(f, "{s}"),
        }
    }
}

/// Bank index, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BankId(pub usize);

impl fmt::Display for BankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bank {}", self.0 + 1)
    }
}

/// Static description of what a radio's channel store offers.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryFeatures {
    /// Lowest and highest ordinary channel number.
    pub memory_bounds: (u32, u32),
    /// Special channel names in canonical order.
    pub special_names: Vec<String>,
    pub valid_modes: Vec<Mode>,
    /// Maximum label length in characters.
    pub name_length: usize,
    pub bank_count: usize,
    pub has_comment: bool,
    pub can_write: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_round_trips_through_display() {
        for mode in [
            Mode::FM,
            Mode::NFM,
            Mode::WFM,
            Mode::AM,
            Mode::USB,
            Mode::LSB,
            Mode::CW,
            Mode::Data,
            Mode::DigitalVoice,
            Mode::Auto,
        ] {
            assert_eq!(mode.to_string().parse::<Mode>(), Ok(mode));
        }
    }

    #[test]
    fn mode_parse_rejects_unknown() {
        assert!("PKT".parse::<Mode>().is_err());
    }

    #[test]
    fn channel_id_parse() {
        assert_eq!(ChannelId::parse("901"), ChannelId::Number(901));
        assert_eq!(ChannelId::parse(" 12 "), ChannelId::Number(12));
        assert_eq!(ChannelId::parse("Skip901"), ChannelId::Name("Skip901".into()));
        assert_eq!(ChannelId::parse("160 M1"), ChannelId::Name("160 M1".into()));
    }

    #[test]
    fn empty_record_defaults() {
        let rec = ChannelRecord::empty(7);
        assert!(rec.empty);
        assert_eq!(rec.number, 7);
        assert_eq!(rec.duplex, Duplex::Simplex);
        assert!(!rec.read_only);
    }

    #[test]
    fn new_record_is_populated() {
        let rec = ChannelRecord::new(1, 146_520_000);
        assert!(!rec.empty);
        assert_eq!(rec.freq, 146_520_000);
    }

    #[test]
    fn bank_id_display_is_one_based() {
        assert_eq!(BankId(0).to_string(), "Bank 1");
        assert_eq!(BankId(23).to_string(), "Bank 24");
    }
}
