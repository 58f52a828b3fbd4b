//! User-visible notices.

use std::fmt;

/// A short message for the user, shown briefly by the screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Auto mode was switched on.
    AutoModeEnabled,
    /// Auto mode was switched off.
    AutoModeDisabled,
    /// The flash button was pressed while auto mode owns the torch.
    ManualBlocked,
    /// The threshold slider was released at this value.
    SensitivitySet(f32),
    /// No sensor of any kind is present.
    NoSensors,
    /// The light sensor is missing, auto mode cannot see the room.
    NoLightSensor,
    /// The proximity sensor is missing, pocket mode is off.
    NoProximitySensor,
    /// No torch was found.
    NoTorch,
    /// Torch control was refused.
    PermissionDenied,
    /// The torch rejected a state change.
    FlashError,
}

impl Notice {
    /// Whether this notice reports a degraded feature rather than a user action.
    pub fn is_warning(&self) -> bool {
        !matches!(
            self,
            Notice::AutoModeEnabled
                | Notice::AutoModeDisabled
                | Notice::ManualBlocked
                | Notice::SensitivitySet(_)
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::AutoModeEnabled => f.write_str("Auto mode enabled"),
            Notice::AutoModeDisabled => f.write_str("Auto mode disabled"),
            Notice::ManualBlocked => f.write_str("Disable Auto Mode for manual control"),
            Notice::SensitivitySet(lux) => write!(f, "Sensitivity set to {} lux", *lux as i32),
            Notice::NoSensors => f.write_str("Device does not support sensors!"),
            Notice::NoLightSensor => f.write_str("No light sensor found!"),
            Notice::NoProximitySensor => {
                f.write_str("No proximity sensor. 'Pocket Mode' disabled.")
            }
            Notice::NoTorch => f.write_str("No camera torch found!"),
            Notice::PermissionDenied => f.write_str("Torch permission denied"),
            Notice::FlashError => f.write_str("Error controlling flash"),
        }
    }
}
