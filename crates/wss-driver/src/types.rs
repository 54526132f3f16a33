//! Domain types returned by the typed accessors.

use std::fmt;

use serde::Serialize;

use crate::error::TransactionError;

/// Boot mode names by raw value.
pub const BOOT_MODE_NAMES: &[(u16, &str)] = &[
    (0, "none"),
    (1, "cold"),
    (2, "warm"),
    (4, "watchdog"),
    (8, "hot"),
];

/// How the module restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BootMode {
    None,
    Cold,
    Warm,
    Watchdog,
    Hot,
}

impl BootMode {
    pub const fn as_raw(self) -> u16 {
        match self {
            BootMode::None => 0,
            BootMode::Cold => 1,
            BootMode::Warm => 2,
            BootMode::Watchdog => 4,
            BootMode::Hot => 8,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            BootMode::None => "none",
            BootMode::Cold => "cold",
            BootMode::Warm => "warm",
            BootMode::Watchdog => "watchdog",
            BootMode::Hot => "hot",
        }
    }

    /// Parse a mode by name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        [
            BootMode::None,
            BootMode::Cold,
            BootMode::Warm,
            BootMode::Watchdog,
            BootMode::Hot,
        ]
        .into_iter()
        .find(|mode| mode.name().eq_ignore_ascii_case(name))
    }
}

impl TryFrom<u16> for BootMode {
    type Error = TransactionError;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(BootMode::None),
            1 => Ok(BootMode::Cold),
            2 => Ok(BootMode::Warm),
            4 => Ok(BootMode::Watchdog),
            8 => Ok(BootMode::Hot),
            _ => Err(TransactionError::UnexpectedValue {
                register: "boot_mode",
                raw,
            }),
        }
    }
}

impl fmt::Display for BootMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Power-on self-test bit names.
pub const POST_BITS: &[(u16, &str)] = &[
    (PostFlags::SDRAM, "sdram"),
    (PostFlags::FLASH_IMAGE, "flash-image"),
    (PostFlags::CALIBRATION, "calibration"),
    (PostFlags::SWITCH_HARDWARE, "switch-hardware"),
    (PostFlags::SAFE_MODE_HOLD, "safe-mode-hold"),
];

/// Power-on self-test result.
///
/// Test bits read 1 when the test failed. `SAFE_MODE_HOLD` is a status bit:
/// the module was told to stay in safe mode after reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct PostFlags(pub u16);

impl PostFlags {
    pub const SDRAM: u16 = 0x0001;
    pub const FLASH_IMAGE: u16 = 0x0002;
    pub const CALIBRATION: u16 = 0x0004;
    pub const SWITCH_HARDWARE: u16 = 0x0008;
    pub const SAFE_MODE_HOLD: u16 = 0x0010;

    const TEST_MASK: u16 =
        Self::SDRAM | Self::FLASH_IMAGE | Self::CALIBRATION | Self::SWITCH_HARDWARE;

    pub const fn contains(self, bit: u16) -> bool {
        self.0 & bit == bit
    }

    /// True when every self-test passed.
    pub const fn passed(self) -> bool {
        self.0 & Self::TEST_MASK == 0
    }

    pub const fn safe_mode_hold(self) -> bool {
        self.contains(Self::SAFE_MODE_HOLD)
    }

    /// Names of the failed tests.
    pub fn failures(self) -> Vec<&'static str> {
        POST_BITS
            .iter()
            .filter(|(bit, _)| *bit & Self::TEST_MASK != 0 && self.contains(*bit))
            .map(|(_, name)| *name)
            .collect()
    }
}

/// Alarm bit names.
pub const ALARM_BITS: &[(u16, &str)] = &[
    (AlarmFlags::CASE_TEMPERATURE, "case-temperature"),
    (AlarmFlags::OCM_FAILURE, "ocm-failure"),
    (AlarmFlags::SWITCH_ACTUATOR, "switch-actuator"),
    (AlarmFlags::POWER_SUPPLY, "power-supply"),
    (AlarmFlags::FIRMWARE_INTEGRITY, "firmware-integrity"),
];

/// Active alarm summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct AlarmFlags(pub u16);

impl AlarmFlags {
    pub const CASE_TEMPERATURE: u16 = 0x0001;
    pub const OCM_FAILURE: u16 = 0x0002;
    pub const SWITCH_ACTUATOR: u16 = 0x0004;
    pub const POWER_SUPPLY: u16 = 0x0008;
    pub const FIRMWARE_INTEGRITY: u16 = 0x0010;

    pub const fn contains(self, bit: u16) -> bool {
        self.0 & bit == bit
    }

    pub const fn is_clear(self) -> bool {
        self.0 == 0
    }

    /// Names of the raised alarms. Unknown bits are not listed.
    pub fn active(self) -> Vec<&'static str> {
        ALARM_BITS
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
            .collect()
    }
}

/// Waveplan definition, in physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Waveplan {
    pub channel_count: u16,
    pub start_ghz: f64,
    pub spacing_ghz: f64,
    pub bandwidth_ghz: f64,
}

/// Center and passband of one waveplan channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaveplanChannel {
    pub channel: u8,
    pub center_ghz: f64,
    pub bandwidth_ghz: f64,
}

/// One channel's switch assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelRoute {
    pub channel: u8,
    pub port: u16,
    pub attenuation_db: f64,
}

impl std::str::FromStr for ChannelRoute {
    type Err = String;

    /// Parse `CHANNEL:PORT:ATTENUATION`, e.g. `3:1:2.5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (Some(channel), Some(port), Some(attenuation), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("expected CHANNEL:PORT:ATTENUATION, got {s:?}"));
        };

        Ok(Self {
            channel: channel
                .trim()
                .parse()
                .map_err(|_| format!("invalid channel {channel:?}"))?,
            port: port
                .trim()
                .parse()
                .map_err(|_| format!("invalid port {port:?}"))?,
            attenuation_db: attenuation
                .trim()
                .parse()
                .map_err(|_| format!("invalid attenuation {attenuation:?}"))?,
        })
    }
}

/// Identity and capability summary of a module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleInfo {
    pub vendor: String,
    pub part_number: String,
    pub serial_number: String,
    pub firmware_version: String,
    pub hardware_version: String,
    pub min_frequency_ghz: f64,
    pub max_frequency_ghz: f64,
    pub min_channel_bandwidth_ghz: f64,
    pub max_wss_id: i16,
    pub max_ocm_id: i16,
    pub max_waveplan_id: i16,
}

/// Firmware bank operations. These only trigger the action; image
/// transfer is not handled here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FirmwareAction {
    StartDownload,
    Commit,
    Activate,
    Abort,
}

impl FirmwareAction {
    pub const fn as_byte(self) -> u8 {
        match self {
            FirmwareAction::StartDownload => 1,
            FirmwareAction::Commit => 2,
            FirmwareAction::Activate => 3,
            FirmwareAction::Abort => 4,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            FirmwareAction::StartDownload => "start-download",
            FirmwareAction::Commit => "commit",
            FirmwareAction::Activate => "activate",
            FirmwareAction::Abort => "abort",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            FirmwareAction::StartDownload,
            FirmwareAction::Commit,
            FirmwareAction::Activate,
            FirmwareAction::Abort,
        ]
        .into_iter()
        .find(|action| action.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for FirmwareAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_mode_raw_values() {
        for (raw, name) in BOOT_MODE_NAMES {
            let mode = BootMode::try_from(*raw).unwrap();
            assert_eq!(mode.as_raw(), *raw);
            assert_eq!(mode.name(), *name);
            assert_eq!(BootMode::from_name(name), Some(mode));
        }
        assert_eq!(BootMode::from_name("HOT"), Some(BootMode::Hot));
        assert!(BootMode::from_name("lukewarm").is_none());
    }

    #[test]
    fn boot_mode_rejects_values_outside_set() {
        let err = BootMode::try_from(3).unwrap_err();
        assert!(matches!(
            err,
            TransactionError::UnexpectedValue {
                register: "boot_mode",
                raw: 3
            }
        ));
    }

    #[test]
    fn post_flags_separate_failures_from_hold() {
        let clean = PostFlags(PostFlags::SAFE_MODE_HOLD);
        assert!(clean.passed());
        assert!(clean.safe_mode_hold());
        assert!(clean.failures().is_empty());

        let failed = PostFlags(PostFlags::FLASH_IMAGE | PostFlags::SWITCH_HARDWARE);
        assert!(!failed.passed());
        assert!(!failed.safe_mode_hold());
        assert_eq!(failed.failures(), vec!["flash-image", "switch-hardware"]);
    }

    #[test]
    fn alarm_flags_list_active_alarms() {
        assert!(AlarmFlags(0).is_clear());
        let flags = AlarmFlags(AlarmFlags::CASE_TEMPERATURE | AlarmFlags::POWER_SUPPLY | 0x8000);
        assert_eq!(flags.active(), vec!["case-temperature", "power-supply"]);
    }

    #[test]
    fn channel_route_parses_triplet() {
        let route: ChannelRoute = "3:1:2.5".parse().unwrap();
        assert_eq!(
            route,
            ChannelRoute {
                channel: 3,
                port: 1,
                attenuation_db: 2.5
            }
        );
        assert!("3:1".parse::<ChannelRoute>().is_err());
        assert!("3:1:2:9".parse::<ChannelRoute>().is_err());
        assert!("x:1:2".parse::<ChannelRoute>().is_err());
    }

    #[test]
    fn firmware_actions_have_fixed_codes() {
        assert_eq!(FirmwareAction::StartDownload.as_byte(), 1);
        assert_eq!(FirmwareAction::Commit.as_byte(), 2);
        assert_eq!(FirmwareAction::Activate.as_byte(), 3);
        assert_eq!(FirmwareAction::Abort.as_byte(), 4);
        assert_eq!(
            FirmwareAction::from_name("start-download"),
            Some(FirmwareAction::StartDownload)
        );
    }

    #[test]
    fn flags_serialize_as_raw_words() {
        assert_eq!(serde_json::to_string(&PostFlags(0x11)).unwrap(), "17");
        assert_eq!(serde_json::to_string(&BootMode::Warm).unwrap(), r#""warm""#);
    }
}
