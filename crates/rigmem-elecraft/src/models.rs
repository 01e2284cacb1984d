//! Elecraft model definitions.
//!
//! Each supported Elecraft rig is described by an [`ElecraftModel`] returned
//! from a factory function (e.g. [`kx3()`]). The `model_id` is the name the
//! link negotiator reports once the `ID`/`OM` exchange has resolved the
//! identity code, and is what connection setup checks against.
//!
//! | Model    | Baud  | Power | Memory modes               | Memory commands |
//! |----------|-------|-------|----------------------------|-----------------|
//! | K3       | 38400 | 100W  | CW LSB USB DATA AM FM      | `ER`/`EW`       |
//! | K3S      | 38400 | 100W  | CW LSB USB DATA AM FM      | `ER`/`EW`       |
//! | KX3      | 38400 | 15W   | CW LSB USB DATA AM FM      | `ER`/`EW`       |
//! | KX2      | 38400 | 10W   | CW LSB USB DATA AM         | `ER`/`EW`       |
//! | K4       | 38400 | 100W  | CW LSB USB DATA AM FM      | `MC` (unsupported) |
//! | Elecraft | 38400 | 100W  | CW LSB USB DATA AM FM      | `ER`/`EW`       |
//!
//! All models share one channel map: memories 0-99, then four quick
//! memories per band ([`QUICK_MEMORY_BANDS`]), numbered from 100.

use rigmem_core::types::Mode;

/// Lowest and highest ordinary memory number.
pub const MEMORY_BOUNDS: (u32, u32) = (0, 99);

/// Quick memories stored per band.
pub const QUICK_MEMORIES_PER_BAND: usize = 4;

/// Bands carrying quick memories, in storage order.
pub const QUICK_MEMORY_BANDS: [&str; 25] = [
    "160", "80", "60", "40", "30", "20", "17", "15", "12", "10", "6", "Rs1", "Rs2", "Rs3", "Rs4",
    "Rs5", "XV1", "XV2", "XV3", "XV4", "XV5", "XV6", "XV7", "XV8", "XV9",
];

/// Identity reported for an Elecraft radio whose sub-model is unknown.
pub const GENERIC_MODEL_ID: &str = "Elecraft";

/// Names of the quick memories, `"160 M1"` through `"XV9 M4"`.
pub fn quick_memory_names() -> impl Iterator<Item = String> {
    QUICK_MEMORY_BANDS.iter().flat_map(|band| {
        (1..=QUICK_MEMORIES_PER_BAND).map(move |slot| format!("{band} M{slot}"))
    })
}

/// Static model definition for an Elecraft transceiver.
#[derive(Debug, Clone, PartialEq)]
pub struct ElecraftModel {
    /// Human-readable model name (e.g. "K3S").
    pub name: &'static str,
    /// Model the identity exchange reports for this rig.
    pub model_id: &'static str,
    /// Default serial baud rate for USB virtual COM port connections.
    pub default_baud_rate: u32,
    /// Modes a memory channel can store.
    pub modes: &'static [Mode],
    /// Maximum output power, for validating `PC` settings.
    pub max_power_watts: u8,
    /// The K4 replaced `ER`/`EW` with `MC`, which is not supported.
    pub is_k4: bool,
}

impl ElecraftModel {
    /// True if `reported` (from the identity exchange) is this model.
    ///
    /// The generic model accepts every Elecraft identity.
    pub fn accepts(&self, reported: &str) -> bool {
        self.model_id == GENERIC_MODEL_ID || self.model_id == reported
    }

    pub fn supports_mode(&self, mode: Mode) -> bool {
        self.modes.contains(&mode)
    }
}

const HF_MEMORY_MODES: &[Mode] = &[Mode::CW, Mode::LSB, Mode::USB, Mode::Data, Mode::AM, Mode::FM];

/// The KX2 has no FM.
const KX2_MEMORY_MODES: &[Mode] = &[Mode::CW, Mode::LSB, Mode::USB, Mode::Data, Mode::AM];

/// Elecraft K3.
pub fn k3() -> ElecraftModel {
    ElecraftModel {
        name: "K3",
        model_id: "K3",
        default_baud_rate: 38_400,
        modes: HF_MEMORY_MODES,
        max_power_watts: 100,
        is_k4: false,
    }
}

/// Elecraft K3S. Identifies exactly like a K3.
pub fn k3s() -> ElecraftModel {
    ElecraftModel {
        name: "K3S",
        ..k3()
    }
}

/// Elecraft KX3 portable.
pub fn kx3() -> ElecraftModel {
    ElecraftModel {
        name: "KX3",
        model_id: "KX3",
        default_baud_rate: 38_400,
        modes: HF_MEMORY_MODES,
        max_power_watts: 15,
        is_k4: false,
    }
}

/// Elecraft KX2 portable.
pub fn kx2() -> ElecraftModel {
    ElecraftModel {
        name: "KX2",
        model_id: "KX2",
        default_baud_rate: 38_400,
        modes: KX2_MEMORY_MODES,
        max_power_watts: 10,
        is_k4: false,
    }
}

/// Elecraft K4.
pub fn k4() -> ElecraftModel {
    ElecraftModel {
        name: "K4",
        model_id: "K4",
        default_baud_rate: 38_400,
        modes: HF_MEMORY_MODES,
        max_power_watts: 100,
        is_k4: true,
    }
}

/// Any Elecraft radio answering `ID017`.
pub fn generic() -> ElecraftModel {
    ElecraftModel {
        name: "Elecraft",
        model_id: GENERIC_MODEL_ID,
        default_baud_rate: 38_400,
        modes: HF_MEMORY_MODES,
        max_power_watts: 100,
        is_k4: false,
    }
}

/// Every named Elecraft model.
pub fn all_elecraft_models() -> Vec<ElecraftModel> {
    vec![k3(), k3s(), kx3(), kx2(), k4()]
}

/// The model matching an identity reported by the negotiator.
pub fn model_for_identity(reported: &str) -> Option<ElecraftModel> {
    all_elecraft_models()
        .into_iter()
        .chain([generic()])
        .find(|m| m.model_id == reported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_memory_names_in_order() {
        let names: Vec<String> = quick_memory_names().collect();
        assert_eq!(names.len(), 100);
        assert_eq!(names[0], "160 M1");
        assert_eq!(names[3], "160 M4");
        assert_eq!(names[4], "80 M1");
        assert_eq!(names[44], "Rs1 M1");
        assert_eq!(names[99], "XV9 M4");
    }

    #[test]
    fn kx2_has_no_fm() {
        assert!(!kx2().supports_mode(Mode::FM));
        assert!(kx3().supports_mode(Mode::FM));
        assert!(kx2().supports_mode(Mode::Data));
    }

    #[test]
    fn k3s_reports_as_k3() {
        let model = k3s();
        assert_eq!(model.name, "K3S");
        assert!(model.accepts("K3"));
        assert!(!model.accepts("KX3"));
    }

    #[test]
    fn generic_accepts_every_identity() {
        for id in ["K3", "KX2", "KX3", "K4", "Elecraft"] {
            assert!(generic().accepts(id), "{id}");
        }
    }

    #[test]
    fn only_k4_uses_the_new_memory_commands() {
        assert!(k4().is_k4);
        for model in [k3(), k3s(), kx2(), kx3(), generic()] {
            assert!(!model.is_k4, "{}", model.name);
        }
    }

    #[test]
    fn identity_lookup() {
        assert_eq!(model_for_identity("KX2").map(|m| m.name), Some("KX2"));
        assert_eq!(model_for_identity("K3").map(|m| m.name), Some("K3"));
        assert!(model_for_identity("FT-1D").is_none());
    }
}
