//! Radio settings reachable over the command link.
//!
//! Each setting is a variant of [`ElecraftSetting`] carrying its typed
//! value; [`SettingKind`] names a setting without a value, for queries.
//!
//! | Setting    | Command | Value                  |
//! |------------|---------|------------------------|
//! | AutoInfo   | `AI`    | `0` off, `1` on        |
//! | KeyerSpeed | `KS`    | 3 digits, 8-50 WPM     |
//! | PowerWatts | `PC`    | 3 digits, watts        |

use rigmem_core::error::{Error, Result};
use rigmem_link::Command;

use crate::models::ElecraftModel;

/// Slowest and fastest keyer speed in WPM.
pub const KEYER_SPEED_RANGE: (u8, u8) = (8, 50);

/// A setting without its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKind {
    AutoInfo,
    KeyerSpeed,
    PowerWatts,
}

impl SettingKind {
    pub fn mnemonic(self) -> &'static str {
        match self {
            SettingKind::AutoInfo => "AI",
            SettingKind::KeyerSpeed => "KS",
            SettingKind::PowerWatts => "PC",
        }
    }

    /// Build the read command (`AI;`, `KS;`, `PC;`).
    pub fn query(self) -> Command {
        Command::new(self.mnemonic())
    }

    /// Parse the radio's answer to [`query`](Self::query).
    ///
    /// ```
    /// use rigmem_elecraft::settings::{ElecraftSetting, SettingKind};
    ///
    /// assert_eq!(
    ///     SettingKind::KeyerSpeed.parse("KS022").unwrap(),
    ///     ElecraftSetting::KeyerSpeed(22)
    /// );
    /// ```
    pub fn parse(self, reply: &str) -> Result<ElecraftSetting> {
        let data = reply.strip_prefix(self.mnemonic()).ok_or_else(|| {
            Error::Protocol(format!("expected {} reply, got {reply:?}", self.mnemonic()))
        })?;
        match self {
            SettingKind::AutoInfo => match data {
                "0" => Ok(ElecraftSetting::AutoInfo(false)),
                // AI2 and AI3 are auto-info with more detail.
                "1" | "2" | "3" => Ok(ElecraftSetting::AutoInfo(true)),
                _ => Err(Error::Protocol(format!("invalid AI value: {data:?}"))),
            },
            SettingKind::KeyerSpeed => Ok(ElecraftSetting::KeyerSpeed(parse_digits(data, "keyer speed")?)),
            SettingKind::PowerWatts => Ok(ElecraftSetting::PowerWatts(parse_digits(data, "power")?)),
        }
    }
}

fn parse_digits(data: &str, what: &str) -> Result<u8> {
    if data.len() != 3 {
        return Err(Error::Protocol(format!(
            "expected 3 digits for {what}, got {} characters: {data:?}",
            data.len()
        )));
    }
    data.parse()
        .map_err(|e| Error::Protocol(format!("invalid {what} digits: {data:?} ({e})")))
}

/// A setting with its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElecraftSetting {
    /// Unsolicited state reports. Connection setup turns this off so
    /// reports cannot interleave with replies.
    AutoInfo(bool),
    /// CW keyer speed in WPM.
    KeyerSpeed(u8),
    /// Transmit power in watts.
    PowerWatts(u8),
}

impl ElecraftSetting {
    pub fn kind(&self) -> SettingKind {
        match self {
            ElecraftSetting::AutoInfo(_) => SettingKind::AutoInfo,
            ElecraftSetting::KeyerSpeed(_) => SettingKind::KeyerSpeed,
            ElecraftSetting::PowerWatts(_) => SettingKind::PowerWatts,
        }
    }

    /// Build the set command, checking the value against `model`.
    ///
    /// ```
    /// use rigmem_elecraft::models::kx2;
    /// use rigmem_elecraft::settings::ElecraftSetting;
    /// use rigmem_link::SEMICOLON;
    ///
    /// let cmd = ElecraftSetting::PowerWatts(5).command(&kx2()).unwrap();
    /// assert_eq!(cmd.encode(SEMICOLON), b"PC005;");
    /// assert!(ElecraftSetting::PowerWatts(50).command(&kx2()).is_err());
    /// ```
    pub fn command(&self, model: &ElecraftModel) -> Result<Command> {
        let value = match *self {
            ElecraftSetting::AutoInfo(on) => u8::from(on).to_string(),
            ElecraftSetting::KeyerSpeed(wpm) => {
                let (lo, hi) = KEYER_SPEED_RANGE;
                if !(lo..=hi).contains(&wpm) {
                    return Err(Error::InvalidParameter(format!(
                        "keyer speed {wpm} outside {lo}-{hi} WPM"
                    )));
                }
                format!("{wpm:03}")
            }
            ElecraftSetting::PowerWatts(watts) => {
                if watts > model.max_power_watts {
                    return Err(Error::InvalidParameter(format!(
                        "{watts} W exceeds the {} maximum of {} W",
                        model.name, model.max_power_watts
                    )));
                }
                format!("{watts:03}")
            }
        };
        Ok(Command::new(self.kind().mnemonic()).arg(value))
    }
}
