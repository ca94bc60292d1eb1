use crate::antenna::{AntennaKind, AntennaPath};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChipTarget {
    Esp32S3,
    Esp32C3,
    Esp32C6,
    Esp32C5,
    Unknown,
}

impl ChipTarget {
    /// Accepts the target names used by the toolchain and cargo features
    /// (`esp32c6`, `ESP32-C6`, ...).
    pub fn from_id(id: &str) -> Self {
        let mut normalized = heapless::String::<16>::new();
        for ch in id.chars().filter(|ch| *ch != '-' && *ch != '_') {
            if normalized.push(ch.to_ascii_lowercase()).is_err() {
                return Self::Unknown;
            }
        }
        match normalized.as_str() {
            "esp32s3" => Self::Esp32S3,
            "esp32c3" => Self::Esp32C3,
            "esp32c6" => Self::Esp32C6,
            "esp32c5" => Self::Esp32C5,
            _ => Self::Unknown,
        }
    }

    pub const fn device_name(self) -> &'static str {
        match self {
            Self::Esp32S3 => "XIAO ESP32-S3",
            Self::Esp32C3 => "XIAO ESP32-C3",
            Self::Esp32C6 => "XIAO ESP32-C6",
            Self::Esp32C5 => "XIAO ESP32-C5",
            Self::Unknown => "Unknown Device",
        }
    }

    /// Only the XIAO ESP32-C6 routes its RF path through a switch.
    pub const fn has_antenna_switch(self) -> bool {
        matches!(self, Self::Esp32C6)
    }
}

/// Resolved once at boot and read-only afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceProfile {
    device_name: &'static str,
    antenna_type: &'static str,
}

impl DeviceProfile {
    pub const fn resolve(target: ChipTarget, kind: AntennaKind, path: AntennaPath) -> Self {
        Self {
            device_name: get_chip_name(target),
            antenna_type: get_antenna_type(target, kind, path),
        }
    }

    pub const fn device_name(&self) -> &'static str {
        self.device_name
    }

    pub const fn antenna_type(&self) -> &'static str {
        self.antenna_type
    }
}

pub const fn get_chip_name(target: ChipTarget) -> &'static str {
    target.device_name()
}

pub const fn get_antenna_type(target: ChipTarget, kind: AntennaKind, path: AntennaPath) -> &'static str {
    if !target.has_antenna_switch() {
        return kind.label();
    }
    match (path, kind) {
        (AntennaPath::External, AntennaKind::Rod) => "External (ROD)",
        (AntennaPath::External, AntennaKind::Fpc) => "External (FPC)",
        (AntennaPath::Internal, _) => "Internal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c6_with_external_rod() {
        let target = ChipTarget::from_id("esp32c6");
        let profile = DeviceProfile::resolve(target, AntennaKind::Rod, AntennaPath::External);
        assert_eq!(profile.device_name(), "XIAO ESP32-C6");
        assert_eq!(profile.antenna_type(), "External (ROD)");
    }

    #[test]
    fn c6_internal_ignores_kind() {
        assert_eq!(
            get_antenna_type(ChipTarget::Esp32C6, AntennaKind::Fpc, AntennaPath::Internal),
            "Internal"
        );
    }

    #[test]
    fn boards_without_switch_report_bare_kind() {
        for target in [ChipTarget::Esp32S3, ChipTarget::Esp32C3, ChipTarget::Esp32C5] {
            assert_eq!(
                get_antenna_type(target, AntennaKind::Rod, AntennaPath::External),
                "ROD"
            );
            assert_eq!(
                get_antenna_type(target, AntennaKind::Fpc, AntennaPath::Internal),
                "FPC"
            );
        }
    }

    #[test]
    fn known_targets_map_to_board_names() {
        assert_eq!(get_chip_name(ChipTarget::from_id("esp32s3")), "XIAO ESP32-S3");
        assert_eq!(get_chip_name(ChipTarget::from_id("ESP32-C3")), "XIAO ESP32-C3");
        assert_eq!(get_chip_name(ChipTarget::from_id("esp32_c5")), "XIAO ESP32-C5");
    }

    #[test]
    fn unrecognized_target_falls_back() {
        assert_eq!(ChipTarget::from_id("esp32h2"), ChipTarget::Unknown);
        assert_eq!(ChipTarget::from_id("a-very-long-target-identifier"), ChipTarget::Unknown);
        assert_eq!(get_chip_name(ChipTarget::from_id("")), "Unknown Device");
    }
}
