//! Light and proximity driven torch control.
//!
//! This crate holds everything behind the LuxTorch screen: the torch state,
//! the auto-mode rule that switches the torch from ambient light and proximity
//! readings, and the lifecycle guard that keeps sensors and torch tied to the
//! screen's visibility.
//!
//! # Backends
//!
//! - [`SysfsTorch`] drives a Linux LED class torch (`/sys/class/leds/*torch*`).
//! - [`IioSensors`] reads Linux IIO light and proximity sensors.
//! - [`MockTorch`] and [`MockSensors`] stand in for hardware in tests.
//!
//! # Example
//!
//! ```no_run
//! use luxtorch_core::{Config, IioSensors, SensorSource, SysfsTorch, Torch, TorchController};
//!
//! let config = Config::from_env();
//! let torch = SysfsTorch::from_config(&config)
//!     .ok()
//!     .map(|t| Box::new(t) as Box<dyn Torch>);
//! let sensors = IioSensors::from_config(&config)
//!     .ok()
//!     .map(|s| Box::new(s) as Box<dyn SensorSource>);
//!
//! let mut controller = TorchController::new(&config, torch, sensors);
//! controller.check_permission();
//! controller.resume();
//! controller.set_auto_mode(true);
//! loop {
//!     controller.poll_sensors();
//!     for notice in controller.take_notices() {
//!         println!("{}", notice);
//!     }
//!     std::thread::sleep(config.poll_interval);
//! }
//! ```
//!
//! # Testing
//!
//! ```
//! use luxtorch_core::{Config, MockTorch, TorchController};
//!
//! let torch = MockTorch::new();
//! let mut controller =
//!     TorchController::new(&Config::default(), Some(Box::new(torch.clone())), None);
//! controller.resume();
//! controller.press_flash_button();
//! assert!(torch.is_on());
//! controller.pause();
//! assert!(!torch.is_on());
//! ```

#![warn(missing_docs)]

mod config;
mod controller;
mod error;
mod evaluator;
mod hardware;
mod lifecycle;
mod mock;
mod notice;
mod state;
mod sysfs;

// Re-export public API
pub use config::{Config, GAUGE_MAX, IIO_DEVICES_ROOT, LED_CLASS_ROOT, THRESHOLD_MAX};
pub use controller::{FlashStatus, Permission, TorchController};
pub use error::TorchError;
pub use evaluator::{TorchAction, evaluate};
pub use hardware::{SensorAvailability, SensorReading, SensorSource, Torch};
pub use lifecycle::{GuardEffect, Lifecycle, ResourceGuard};
pub use mock::{MockSensors, MockTorch};
pub use notice::Notice;
pub use state::{DEFAULT_LUX_THRESHOLD, TorchState};
pub use sysfs::{IioSensors, SysfsTorch};

#[cfg(test)]
mod tests {
    use super::*;

    fn visible_auto(torch: &MockTorch, sensors: &MockSensors) -> TorchController {
        let mut controller = TorchController::new(
            &Config::default(),
            Some(Box::new(torch.clone())),
            Some(Box::new(sensors.clone())),
        );
        controller.resume();
        controller.set_auto_mode(true);
        controller
    }

    #[test]
    fn test_evening_walk() {
        let torch = MockTorch::new();
        let sensors = MockSensors::new();
        let mut controller = visible_auto(&torch, &sensors);

        // Daylight
        sensors.push(SensorReading::Light { lux: 300.0 });
        controller.poll_sensors();
        assert!(!torch.is_on());

        // Dusk
        sensors.push(SensorReading::Light { lux: 12.0 });
        controller.poll_sensors();
        assert!(torch.is_on());

        // Phone goes into a pocket
        sensors.push(SensorReading::Proximity { near: true });
        controller.poll_sensors();
        assert!(!torch.is_on());

        // Out of the pocket, still dark
        sensors.push(SensorReading::Proximity { near: false });
        controller.poll_sensors();
        assert!(torch.is_on());

        // App switched away
        controller.pause();
        assert!(!torch.is_on());
        assert!(!sensors.is_subscribed());

        // Back again: sensors resume, torch waits for the next reading
        controller.resume();
        assert!(sensors.is_subscribed());
        assert!(!torch.is_on());
        sensors.push(SensorReading::Light { lux: 3.0 });
        controller.poll_sensors();
        assert!(torch.is_on());

        controller.destroy();
        assert!(!torch.is_on());
    }

    #[test]
    fn test_notices_on_startup() {
        let torch = MockTorch::new();
        let sensors = MockSensors::new();
        let mut controller = visible_auto(&torch, &sensors);
        assert_eq!(controller.take_notices(), vec![Notice::AutoModeEnabled]);
        assert!(controller.take_notices().is_empty());
    }

    #[test]
    fn test_state_defaults() {
        let state = TorchState::default();
        assert!(!state.torch_on);
        assert!(!state.auto_mode);
        assert!(!state.covered);
        assert_eq!(state.lux_threshold, DEFAULT_LUX_THRESHOLD);
        assert_eq!(state.current_lux, 0.0);
    }
}
