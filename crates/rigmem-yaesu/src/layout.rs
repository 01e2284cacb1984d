//! FT-1D clone image memory map.
//!
//! Everything here is a static description of where things live in the
//! 130507-byte image. Multi-byte integers are big-endian and frequencies
//! are packed BCD in kilohertz.
//!
//! | Offset   | Contents                                      |
//! |----------|-----------------------------------------------|
//! | `0x0000` | model code `AH44M`                            |
//! | `0x054A` | bank in-use words, 24 x u16                   |
//! | `0x064A` | VFO blocks, 6 x 128 bytes (3 primary/backup)  |
//! | `0x0EFE` | bank names, 24 x 18 bytes                     |
//! | `0x10CA` | Home channels, 11 slots                       |
//! | `0x154A` | bank members, 24 x 100 x u16                  |
//! | `0x280A` | flags for memories, Skip and PMS              |
//! | `0x2D4A` | memories 1-900, then Skip and PMS slots       |
//! | `0x1FDCA`| whole-image checksum                          |

use rigmem_core::charset::Charset;
use rigmem_core::layout::{ArrayDef, FieldDef, FieldKind, StructDef};
use rigmem_core::types::{Duplex, Mode, PowerLevel, ToneMode};
use rigmem_memory::{BankEncoding, BankLayout, BankPolicy, ChecksumRegion, MirrorPair};

/// Total image length.
pub const IMAGE_SIZE: usize = 130_507;

/// Model code at the start of every FT-1D image.
pub const MODEL_CODE: &[u8; 5] = b"AH44M";

pub const MEMORY_COUNT: usize = 900;
pub const SKIP_COUNT: usize = 99;
pub const PMS_COUNT: usize = 100;
pub const HOME_COUNT: usize = 11;
pub const BANK_COUNT: usize = 24;
pub const BANK_CAPACITY: usize = 100;

/// Label width in characters.
pub const LABEL_LENGTH: usize = 16;

/// Lowest and highest frequency a channel can hold, in hertz.
pub const RX_RANGE: (u64, u64) = (500_000, 999_900_000);

const SLOT_SIZE: usize = 32;
const MEMORY_OFFSET: usize = 0x2D4A;
const FLAG_OFFSET: usize = 0x280A;

/// Label alphabet. Bytes past the table read as `.`; unused label
/// positions hold 0xFF.
pub const YAESU_CHARSET: Charset = Charset::new(
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ abcdefghijklmnopqrstuvwxyz.,:;*#_-/&()@!?^ ",
    0xFF,
    '.',
);

// ---------------------------------------------------------------------------
// Channel slots
// ---------------------------------------------------------------------------

/// One 32-byte channel slot, shared by memories, Skip, PMS and Home.
pub static MEMSLOT: StructDef = StructDef {
    name: "memslot",
    size: SLOT_SIZE,
    fields: &[
        FieldDef::new("mode_alt", 0, FieldKind::Bits { shift: 5, width: 1 }),
        FieldDef::new("clock_shift", 0, FieldKind::Bits { shift: 4, width: 1 }),
        FieldDef::new("unknown1", 0, FieldKind::Bits { shift: 0, width: 4 }),
        FieldDef::new("mode", 1, FieldKind::Bits { shift: 6, width: 2 }),
        FieldDef::new("duplex", 1, FieldKind::Bits { shift: 4, width: 2 }),
        FieldDef::new("tune_step", 1, FieldKind::Bits { shift: 0, width: 4 }),
        FieldDef::new("freq", 2, FieldKind::Bcd { width: 3 }),
        FieldDef::new("power", 5, FieldKind::Bits { shift: 6, width: 2 }),
        FieldDef::new("digmode", 5, FieldKind::Bits { shift: 4, width: 2 }),
        FieldDef::new("tone_mode", 5, FieldKind::Bits { shift: 0, width: 4 }),
        FieldDef::new("charsetbits", 6, FieldKind::UInt { width: 2 }),
        FieldDef::new("label", 8, FieldKind::Bytes { len: LABEL_LENGTH }),
        FieldDef::new("offset", 24, FieldKind::Bcd { width: 3 }),
        FieldDef::new("tone", 27, FieldKind::Bits { shift: 0, width: 6 }),
        FieldDef::new("dcs", 28, FieldKind::Bits { shift: 0, width: 7 }),
        FieldDef::new("att", 31, FieldKind::Bits { shift: 5, width: 1 }),
        FieldDef::new("autostep", 31, FieldKind::Bits { shift: 4, width: 1 }),
        FieldDef::new("automode", 31, FieldKind::Bits { shift: 3, width: 1 }),
    ],
};

/// Per-channel flag byte.
pub static FLAGSLOT: StructDef = StructDef {
    name: "flagslot",
    size: 1,
    fields: &[
        FieldDef::new("nosubvfo", 0, FieldKind::Bits { shift: 7, width: 1 }),
        FieldDef::new("pskip", 0, FieldKind::Bits { shift: 3, width: 1 }),
        FieldDef::new("skip", 0, FieldKind::Bits { shift: 2, width: 1 }),
        FieldDef::new("used", 0, FieldKind::Bits { shift: 1, width: 1 }),
        FieldDef::new("valid", 0, FieldKind::Bits { shift: 0, width: 1 }),
    ],
};

pub static MEMORY: ArrayDef = ArrayDef {
    name: "memory",
    offset: MEMORY_OFFSET,
    count: MEMORY_COUNT,
    def: &MEMSLOT,
};

pub static SKIP: ArrayDef = ArrayDef {
    name: "Skip",
    offset: MEMORY_OFFSET + MEMORY_COUNT * SLOT_SIZE,
    count: SKIP_COUNT,
    def: &MEMSLOT,
};

pub static PMS: ArrayDef = ArrayDef {
    name: "PMS",
    offset: MEMORY_OFFSET + (MEMORY_COUNT + SKIP_COUNT) * SLOT_SIZE,
    count: PMS_COUNT,
    def: &MEMSLOT,
};

pub static HOME: ArrayDef = ArrayDef {
    name: "Home",
    offset: 0x10CA,
    count: HOME_COUNT,
    def: &MEMSLOT,
};

pub static FLAG: ArrayDef = ArrayDef {
    name: "flag",
    offset: FLAG_OFFSET,
    count: MEMORY_COUNT,
    def: &FLAGSLOT,
};

pub static FLAG_SKIP: ArrayDef = ArrayDef {
    name: "flagskp",
    offset: FLAG_OFFSET + MEMORY_COUNT,
    count: SKIP_COUNT,
    def: &FLAGSLOT,
};

pub static FLAG_PMS: ArrayDef = ArrayDef {
    name: "flagPMS",
    offset: FLAG_OFFSET + MEMORY_COUNT + SKIP_COUNT,
    count: PMS_COUNT,
    def: &FLAGSLOT,
};

// ---------------------------------------------------------------------------
// Banks
// ---------------------------------------------------------------------------

static BANK_USED_DEF: StructDef = StructDef {
    name: "bank_used",
    size: 2,
    fields: &[FieldDef::new("in_use", 0, FieldKind::UInt { width: 2 })],
};

static BANK_INFO_DEF: StructDef = StructDef {
    name: "bank_info",
    size: 18,
    fields: &[
        FieldDef::new("unknown", 0, FieldKind::Bytes { len: 2 }),
        FieldDef::new("name", 2, FieldKind::Bytes { len: 16 }),
    ],
};

static BANK_MEMBERS_DEF: StructDef = StructDef {
    name: "bank_members",
    size: BANK_CAPACITY * 2,
    fields: &[FieldDef::new("channel", 0, FieldKind::Bytes { len: BANK_CAPACITY * 2 })],
};

pub static BANK_USED: ArrayDef = ArrayDef {
    name: "bank_used",
    offset: 0x054A,
    count: BANK_COUNT,
    def: &BANK_USED_DEF,
};

pub static BANK_INFO: ArrayDef = ArrayDef {
    name: "bank_info",
    offset: 0x0EFE,
    count: BANK_COUNT,
    def: &BANK_INFO_DEF,
};

pub static BANK_MEMBERS: ArrayDef = ArrayDef {
    name: "bank_members",
    offset: 0x154A,
    count: BANK_COUNT,
    def: &BANK_MEMBERS_DEF,
};

/// Member slots with any of these bits set name a firmware preset.
pub const PRESET_MASK: u16 = 0x7000;

pub fn bank_layout() -> BankLayout {
    BankLayout {
        in_use: &BANK_USED,
        members: &BANK_MEMBERS,
        names: Some(&BANK_INFO),
        charset: YAESU_CHARSET,
        encoding: BankEncoding {
            unused: 0xFFFF,
            active: 0x0006,
            empty_slot: 0xFFFF,
            preset_mask: PRESET_MASK,
        },
        policy: BankPolicy::ManyToMany,
    }
}

// ---------------------------------------------------------------------------
// VFO blocks
// ---------------------------------------------------------------------------

/// Value of `mr_index`, `bank_index` and `bank_enable` when a VFO is not
/// following a bank.
pub const VFO_NO_BANK: u32 = 0xFFFF;

static VFO_INFO_DEF: StructDef = StructDef {
    name: "vfo_info",
    size: 128,
    fields: &[
        FieldDef::new("frequency_band", 4, FieldKind::UInt { width: 1 }),
        FieldDef::new("mr_index", 8, FieldKind::UInt { width: 2 }),
        FieldDef::new("bank_index", 10, FieldKind::UInt { width: 2 }),
        FieldDef::new("bank_enable", 12, FieldKind::UInt { width: 2 }),
        FieldDef::new("checksum", 127, FieldKind::UInt { width: 1 }),
    ],
};

pub static VFO_INFO: ArrayDef = ArrayDef {
    name: "vfo_info",
    offset: 0x064A,
    count: 6,
    def: &VFO_INFO_DEF,
};

/// Fields kept equal between a VFO block and its backup.
pub const VFO_SYNCED_FIELDS: &[&str] = &["mr_index", "bank_index", "bank_enable"];

/// VFO A and VFO B, each a primary block followed by its backup.
pub static VFO_MIRRORS: [MirrorPair; 2] = [
    MirrorPair {
        name: "VFO A",
        array: &VFO_INFO,
        primary: 0,
        backup: 1,
        checksum_field: "checksum",
        synced_fields: VFO_SYNCED_FIELDS,
    },
    MirrorPair {
        name: "VFO B",
        array: &VFO_INFO,
        primary: 2,
        backup: 3,
        checksum_field: "checksum",
        synced_fields: VFO_SYNCED_FIELDS,
    },
];

/// Plain-sum regions: the first four VFO blocks, then the whole image.
/// The whole-image region covers the VFO sums, so order matters.
pub static CHECKSUM_REGIONS: [ChecksumRegion; 5] = [
    ChecksumRegion::new(0x064A, 0x06C8),
    ChecksumRegion::new(0x06CA, 0x0748),
    ChecksumRegion::new(0x074A, 0x07C8),
    ChecksumRegion::new(0x07CA, 0x0848),
    ChecksumRegion::new(0x0000, 0x1FDC9),
];

// ---------------------------------------------------------------------------
// Value tables
// ---------------------------------------------------------------------------

pub const TONE_MODES: [ToneMode; 4] = [ToneMode::None, ToneMode::Tone, ToneMode::Tsql, ToneMode::Dtcs];

pub const DUPLEXES: [Duplex; 4] = [Duplex::Simplex, Duplex::Minus, Duplex::Plus, Duplex::Split];

/// Base modes. NFM and DN are FM with `mode_alt` or `digmode` set.
pub const MODES: [Mode; 3] = [Mode::FM, Mode::AM, Mode::WFM];

/// Tuning steps in hertz, by `tune_step` value.
pub const STEPS: [u32; 11] = [
    5_000, 6_250, 8_330, 10_000, 12_500, 15_000, 20_000, 25_000, 50_000, 100_000, 9_000,
];

/// Power levels, highest first. The slot stores `3 - index`.
pub const POWER_LEVELS: [PowerLevel; 4] = [
    PowerLevel::new("Hi", 5_000),
    PowerLevel::new("L3", 2_500),
    PowerLevel::new("L2", 1_000),
    PowerLevel::new("L1", 50),
];

/// Home channel names, in slot order.
pub const HOME_NAMES: [&str; HOME_COUNT] = [
    "AM", "SW", "50MHz", "FM", "Air", "144MHz", "174MHz", "Info1", "430MHz", "470MHz", "Info2",
];

/// Band edges in hertz for each Home channel. A Home frequency must lie
/// strictly between the two.
pub const HOME_BANDS: [(u64, u64); HOME_COUNT] = [
    (510_000, 1_790_000),
    (1_800_000, 30_990_000),
    (30_000_000, 75_990_000),
    (76_000_000, 107_990_000),
    (108_000_000, 136_990_000),
    (137_000_000, 173_990_000),
    (174_000_000, 221_950_000),
    (222_000_000, 419_990_000),
    (420_000_000, 774_990_000),
    (470_000_000, 773_990_000),
    (810_010_000, 999_000_000),
];

/// True when VFO B cannot tune `freq`: below 30 MHz, broadcast FM, or
/// above 580 MHz.
pub fn is_main_vfo_only(freq: u64) -> bool {
    freq < 30_000_000 || (freq > 88_000_000 && freq < 108_000_000) || freq > 580_000_000
}
