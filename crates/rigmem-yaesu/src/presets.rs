//! Firmware preset channels.
//!
//! The FT-1D ships weather, marine and shortwave broadcast channels in
//! firmware. They are not part of the clone image, so the driver carries
//! its own copy of the table and serves these channels read-only. Slots
//! without an entry read back empty.

use rigmem_core::types::{ChannelRecord, Duplex, Mode};

/// One firmware preset channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    /// One-based slot within its group (`Marine16` is slot 16).
    pub slot: u16,
    pub name: &'static str,
    pub freq: u64,
    pub mode: Mode,
    pub duplex: Duplex,
    pub offset: u64,
    pub comment: &'static str,
}

impl Preset {
    const fn new(
        slot: u16,
        name: &'static str,
        freq: u64,
        mode: Mode,
        duplex: Duplex,
        offset: u64,
        comment: &'static str,
    ) -> Self {
        Preset {
            slot,
            name,
            freq,
            mode,
            duplex,
            offset,
            comment,
        }
    }

    /// The preset as a read-only channel record.
    pub fn to_record(&self, number: u32) -> ChannelRecord {
        ChannelRecord {
            name: self.name.to_string(),
            mode: self.mode,
            duplex: self.duplex,
            offset: self.offset as i64,
            comment: self.comment.to_string(),
            read_only: true,
            ..ChannelRecord::new(number, self.freq)
        }
    }
}

/// The three preset groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetGroup {
    Wx,
    Marine,
    Swl,
}

impl PresetGroup {
    /// Number of slots the radio shows for the group.
    pub const fn slots(self) -> usize {
        match self {
            PresetGroup::Wx => 10,
            PresetGroup::Marine => 88,
            PresetGroup::Swl => 89,
        }
    }

    /// Channel name prefix (`WX`, `Marine`, `SWL`).
    pub const fn prefix(self) -> &'static str {
        match self {
            PresetGroup::Wx => "WX",
            PresetGroup::Marine => "Marine",
            PresetGroup::Swl => "SWL",
        }
    }

    pub fn table(self) -> &'static [Preset] {
        match self {
            PresetGroup::Wx => WX_PRESETS,
            PresetGroup::Marine => MARINE_PRESETS,
            PresetGroup::Swl => SWL_PRESETS,
        }
    }

    /// Channel names in slot order.
    pub fn names(self) -> impl Iterator<Item = String> {
        (1..=self.slots()).map(move |slot| format!("{}{slot}", self.prefix()))
    }

    /// The preset at zero-based `index`, if that slot is programmed.
    pub fn lookup(self, index: usize) -> Option<&'static Preset> {
        self.table().iter().find(|p| usize::from(p.slot) == index + 1)
    }
}

/// NOAA weather channels, `WX1` to `WX10`.
pub static WX_PRESETS: &[Preset] = &[
    Preset::new(1, "WX1PA7", 162_550_000, Mode::FM, Duplex::Simplex, 0, ""),
    Preset::new(2, "WX2PA1", 162_400_000, Mode::FM, Duplex::Simplex, 0, ""),
    Preset::new(3, "WX3PA4", 162_475_000, Mode::FM, Duplex::Simplex, 0, ""),
    Preset::new(4, "WX4PA2", 162_425_000, Mode::FM, Duplex::Simplex, 0, ""),
    Preset::new(5, "WX5PA3", 162_450_000, Mode::FM, Duplex::Simplex, 0, ""),
    Preset::new(6, "WX6PA5", 162_500_000, Mode::FM, Duplex::Simplex, 0, ""),
    Preset::new(7, "WX7PA6", 162_525_000, Mode::FM, Duplex::Simplex, 0, ""),
    Preset::new(8, "WX8", 161_650_000, Mode::FM, Duplex::Simplex, 0, ""),
    Preset::new(9, "WX9", 161_775_000, Mode::FM, Duplex::Simplex, 0, ""),
    Preset::new(10, "WX10", 163_275_000, Mode::FM, Duplex::Simplex, 0, ""),
];

/// VHF marine channels. Slots 29 to 59 are not programmed.
pub static MARINE_PRESETS: &[Preset] = &[
    Preset::new(1, "SEA 01", 156_050_000, Mode::FM, Duplex::Minus, 4_600_000, "Port Operations and Comm"),
    Preset::new(2, "VHF 2", 156_100_000, Mode::FM, Duplex::Minus, 4_600_000, ""),
    Preset::new(3, "VHF 3", 156_150_000, Mode::FM, Duplex::Minus, 4_600_000, ""),
    Preset::new(4, "VHF 4", 156_200_000, Mode::FM, Duplex::Minus, 4_600_000, ""),
    Preset::new(5, "SEA 05", 156_250_000, Mode::FM, Duplex::Minus, 4_600_000, "Port Operations.  VTS in"),
    Preset::new(6, "SEA 06", 156_300_000, Mode::FM, Duplex::Simplex, 0, "Intership Safety"),
    Preset::new(7, "SEA 07", 156_350_000, Mode::FM, Duplex::Minus, 4_600_000, "Commercial"),
    Preset::new(8, "SEA 08", 156_400_000, Mode::FM, Duplex::Simplex, 0, "Commercial (Intership on"),
    Preset::new(9, "SEA 09", 156_450_000, Mode::FM, Duplex::Simplex, 0, "Boater Calling.  Commerc"),
    Preset::new(10, "SEA 10", 156_500_000, Mode::FM, Duplex::Simplex, 0, "Commercial"),
    Preset::new(11, "SEA 11", 156_550_000, Mode::FM, Duplex::Simplex, 0, "Commercial.  VTS in sele"),
    Preset::new(12, "SEA 12", 156_600_000, Mode::FM, Duplex::Simplex, 0, "Port Operations.  VTS in"),
    Preset::new(13, "SEA 13 Guard", 156_650_000, Mode::FM, Duplex::Simplex, 0, "Intership Navigation Saf"),
    Preset::new(14, "SEA 14", 156_700_000, Mode::FM, Duplex::Simplex, 0, "Port Operations.  VTS in"),
    Preset::new(15, "SEA 15", 156_750_000, Mode::FM, Duplex::Simplex, 0, "Environmental (Receive o"),
    Preset::new(16, "SEA 16 Distress", 156_800_000, Mode::FM, Duplex::Simplex, 0, "International Distress, "),
    Preset::new(17, "SEA 17", 156_850_000, Mode::FM, Duplex::Simplex, 0, "State Control"),
    Preset::new(18, "SEA 18", 156_900_000, Mode::FM, Duplex::Minus, 0, "Commercial"),
    Preset::new(19, "SEA 19", 156_950_000, Mode::FM, Duplex::Minus, 0, "Commercial"),
    Preset::new(20, "SEA 20", 157_000_000, Mode::FM, Duplex::Minus, 0, "Port Operations (duplex)"),
    Preset::new(21, "SEA 21", 157_050_000, Mode::FM, Duplex::Minus, 0, "Port Operations"),
    Preset::new(22, "SEA 22", 157_100_000, Mode::FM, Duplex::Minus, 0, "Coast Guard Liaison and "),
    Preset::new(23, "SEA 23", 157_150_000, Mode::FM, Duplex::Minus, 0, "U.S. Government only"),
    Preset::new(24, "SEA 24", 157_200_000, Mode::FM, Duplex::Minus, 4_600_000, "Public Correspondence (M"),
    Preset::new(25, "SEA 25", 157_250_000, Mode::FM, Duplex::Minus, 4_600_000, "Public Correspondence (M"),
    Preset::new(26, "SEA 26", 157_300_000, Mode::FM, Duplex::Minus, 4_600_000, "Public Correspondence (M"),
    Preset::new(27, "SEA 27", 157_350_000, Mode::FM, Duplex::Minus, 4_600_000, "Public Correspondence (M"),
    Preset::new(28, "SEA 28", 157_400_000, Mode::FM, Duplex::Minus, 4_600_000, "Public Correspondence (M"),
    Preset::new(60, "VHF 60", 156_025_000, Mode::FM, Duplex::Minus, 4_600_000, ""),
    Preset::new(61, "VHF 61", 156_075_000, Mode::FM, Duplex::Minus, 4_600_000, ""),
    Preset::new(62, "VHF 62", 156_125_000, Mode::FM, Duplex::Minus, 4_600_000, ""),
    Preset::new(63, "VHF 63", 156_175_000, Mode::FM, Duplex::Minus, 4_600_000, ""),
    Preset::new(64, "VHF 64", 156_225_000, Mode::FM, Duplex::Minus, 4_600_000, ""),
    Preset::new(65, "SEA 65", 156_275_000, Mode::FM, Duplex::Minus, 0, "Port Operations"),
    Preset::new(66, "SEA 66", 156_325_000, Mode::FM, Duplex::Minus, 0, "Port Operations"),
    Preset::new(67, "SEA 67", 156_375_000, Mode::FM, Duplex::Simplex, 0, "Commercial.  Used for Br"),
    Preset::new(68, "SEA 68", 156_425_000, Mode::FM, Duplex::Simplex, 0, "Non-Commercial-Working C"),
    Preset::new(69, "SEA 69", 156_475_000, Mode::FM, Duplex::Simplex, 0, "Non-Commercial"),
    Preset::new(70, "DSC 70", 156_525_000, Mode::FM, Duplex::Simplex, 0, "Digital Selective Callin"),
    Preset::new(71, "SEA 71", 156_575_000, Mode::FM, Duplex::Simplex, 0, "Non-Commercial"),
    Preset::new(72, "SEA 72", 156_625_000, Mode::FM, Duplex::Simplex, 0, "Non-Commercial (Intershi"),
    Preset::new(73, "SEA 73", 156_675_000, Mode::FM, Duplex::Simplex, 0, "Port Operations"),
    Preset::new(74, "SEA 74", 156_725_000, Mode::FM, Duplex::Simplex, 0, "Port Operations"),
    Preset::new(75, "VHF 75", 156_775_000, Mode::FM, Duplex::Simplex, 0, ""),
    Preset::new(76, "VHF 76", 156_825_000, Mode::FM, Duplex::Simplex, 0, ""),
    Preset::new(77, "SEA 77", 156_875_000, Mode::FM, Duplex::Simplex, 0, "Port Operations"),
    Preset::new(78, "SEA 78", 156_925_000, Mode::FM, Duplex::Minus, 0, "Non-Commercial"),
    Preset::new(79, "SEA 79", 156_975_000, Mode::FM, Duplex::Minus, 0, "Commercial"),
    Preset::new(80, "SEA 80", 157_025_000, Mode::FM, Duplex::Minus, 0, "Commercial"),
    Preset::new(81, "SEA 81", 157_075_000, Mode::FM, Duplex::Minus, 0, "U.S. Government only - E"),
    Preset::new(82, "SEA 82", 157_125_000, Mode::FM, Duplex::Minus, 0, "U.S. Government only"),
    Preset::new(83, "SEA 83", 157_175_000, Mode::FM, Duplex::Minus, 0, "U.S. Government only"),
    Preset::new(84, "SEA 84", 157_225_000, Mode::FM, Duplex::Minus, 4_600_000, "Public Correspondence (M"),
    Preset::new(85, "SEA 85", 157_275_000, Mode::FM, Duplex::Minus, 4_600_000, "Public Correspondence (M"),
    Preset::new(86, "SEA 86", 157_325_000, Mode::FM, Duplex::Minus, 4_600_000, "Public Correspondence (M"),
    Preset::new(87, "SEA 87", 157_375_000, Mode::FM, Duplex::Minus, 0, "Public Correspondence (M"),
    Preset::new(88, "SEA 88", 157_425_000, Mode::FM, Duplex::Minus, 0, "Public Correspondence in"),
];

/// Shortwave broadcast stations, `SWL1` to `SWL89`.
pub static SWL_PRESETS: &[Preset] = &[
    Preset::new(1, "VOA", 6_030_000, Mode::AM, Duplex::Simplex, 0, "USA"),
    Preset::new(2, "VOA", 6_160_000, Mode::AM, Duplex::Simplex, 0, "USA"),
    Preset::new(3, "VOA", 9_760_000, Mode::AM, Duplex::Simplex, 0, "USA"),
    Preset::new(4, "VOA", 11_965_000, Mode::AM, Duplex::Simplex, 0, "USA"),
    Preset::new(5, "Canada", 9_555_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(6, "Canada", 9_660_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(7, "Canada", 11_715_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(8, "Canada", 11_955_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(9, "BBC", 6_195_000, Mode::AM, Duplex::Simplex, 0, "UK"),
    Preset::new(10, "BBC", 9_410_000, Mode::AM, Duplex::Simplex, 0, "UK"),
    Preset::new(11, "BBC", 12_095_000, Mode::AM, Duplex::Simplex, 0, "UK"),
    Preset::new(12, "BBC", 15_310_000, Mode::AM, Duplex::Simplex, 0, "UK"),
    Preset::new(13, "France", 6_090_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(14, "France", 9_790_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(15, "France", 11_670_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(16, "France", 15_195_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(17, "DW", 6_000_000, Mode::AM, Duplex::Simplex, 0, "Germany"),
    Preset::new(18, "DW", 6_075_000, Mode::AM, Duplex::Simplex, 0, "Germany"),
    Preset::new(19, "DW", 9_650_000, Mode::AM, Duplex::Simplex, 0, "Germany"),
    Preset::new(20, "DW", 9_735_000, Mode::AM, Duplex::Simplex, 0, "Germany"),
    Preset::new(21, "Italy", 5_990_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(22, "Italy", 9_575_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(23, "Italy", 9_675_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(24, "Italy", 17_780_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(25, "Turkey", 7_170_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(26, "Turkey", 7_270_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(27, "Turkey", 9_560_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(28, "Turkey", 11_690_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(29, "Vatican", 9_660_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(30, "Vatican", 11_625_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(31, "Vatican", 11_830_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(32, "Vatican", 15_235_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(33, "Nederland", 5_955_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(34, "Nederland", 6_020_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(35, "Nederland", 9_895_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(36, "Nederland", 11_655_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(37, "Czech", 5_985_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(38, "Czech", 6_105_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(39, "Czech", 9_455_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(40, "Czech", 11_860_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(41, "Portugal", 9_780_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(42, "Portugal", 11_630_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(43, "Portugal", 15_550_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(44, "Portugal", 21_655_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(45, "Spain", 9_650_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(46, "Spain", 11_880_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(47, "Spain", 11_910_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(48, "Spain", 15_290_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(49, "NIKKEI", 6_055_000, Mode::AM, Duplex::Simplex, 0, "Japan"),
    Preset::new(50, "Norway", 7_315_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(51, "Norway", 9_590_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(52, "Norway", 9_925_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(53, "Norway", 9_985_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(54, "Sweden", 6_065_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(55, "Sweden", 9_490_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(56, "Sweden", 15_240_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(57, "Sweden", 17_505_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(58, "Finland", 6_120_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(59, "Finland", 9_560_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(60, "Finland", 11_755_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(61, "Finland", 15_400_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(62, "Russia", 5_920_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(63, "Russia", 5_940_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(64, "Russia", 7_200_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(65, "Russia", 12_030_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(66, "Israel", 7_465_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(67, "Israel", 11_585_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(68, "Israel", 15_615_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(69, "Israel", 17_535_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(70, "India", 6_045_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(71, "India", 9_595_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(72, "India", 1_162_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(73, "India", 15_020_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(74, "China", 7_190_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(75, "China", 7_405_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(76, "China", 9_785_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(77, "China", 11_685_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(78, "Korea", 6_135_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(79, "Korea", 7_275_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(80, "Korea", 9_570_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(81, "Korea", 13_670_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(82, "Japan", 6_165_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(83, "Japan", 7_200_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(84, "Japan", 9_750_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(85, "Japan", 11_860_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(86, "Australia", 5_995_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(87, "Australia", 9_580_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(88, "Australia", 9_660_000, Mode::AM, Duplex::Simplex, 0, ""),
    Preset::new(89, "Australia", 12_080_000, Mode::AM, Duplex::Simplex, 0, ""),
];
