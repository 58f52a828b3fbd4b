//! Hardware seams: the torch and the sensor source.

use crate::error::TorchError;

// =============================================================================
// Torch
// =============================================================================

/// A torch (camera flash LED) that can be switched on and off.
///
/// Implemented by [`SysfsTorch`](crate::SysfsTorch) for real hardware and by
/// [`MockTorch`](crate::MockTorch) in tests.
pub trait Torch: Send {
    /// Switch the torch on or off.
    fn set_torch(&mut self, on: bool) -> Result<(), TorchError>;

    /// Check that the torch may be controlled, without changing its state.
    fn check_access(&self) -> Result<(), TorchError> {
        Ok(())
    }
}

// =============================================================================
// Sensors
// =============================================================================

/// A single sensor event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorReading {
    /// Ambient light level.
    Light {
        /// Illuminance in lux.
        lux: f32,
    },
    /// Proximity state.
    Proximity {
        /// Whether something covers the sensor.
        near: bool,
    },
}

impl SensorReading {
    /// Build a proximity reading from a distance sensor.
    ///
    /// Distance sensors report their maximum range when nothing is in front of
    /// them, so anything closer counts as near.
    pub fn proximity_from_distance(distance: f32, max_range: f32) -> Self {
        SensorReading::Proximity {
            near: distance < max_range,
        }
    }
}

/// Which sensors a source can deliver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorAvailability {
    /// An ambient light sensor is present.
    pub light: bool,
    /// A proximity sensor is present.
    pub proximity: bool,
}

impl SensorAvailability {
    /// Whether no sensor at all is present.
    pub fn is_empty(&self) -> bool {
        !self.light && !self.proximity
    }
}

/// A source of light and proximity readings.
///
/// Readings are only delivered between [`subscribe`](Self::subscribe) and
/// [`unsubscribe`](Self::unsubscribe).
pub trait SensorSource: Send {
    /// Report which sensors exist.
    fn available(&self) -> SensorAvailability;

    /// Start delivering readings.
    fn subscribe(&mut self) -> Result<(), TorchError>;

    /// Stop delivering readings. Unsubscribing twice is harmless.
    fn unsubscribe(&mut self);

    /// Collect the readings that arrived since the last poll.
    fn poll(&mut self) -> Result<Vec<SensorReading>, TorchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proximity_at_max_range_is_far() {
        assert_eq!(
            SensorReading::proximity_from_distance(5.0, 5.0),
            SensorReading::Proximity { near: false }
        );
        assert_eq!(
            SensorReading::proximity_from_distance(0.0, 5.0),
            SensorReading::Proximity { near: true }
        );
    }

    #[test]
    fn availability_empty() {
        assert!(SensorAvailability::default().is_empty());
        let light_only = SensorAvailability {
            light: true,
            proximity: false,
        };
        assert!(!light_only.is_empty());
    }
}
