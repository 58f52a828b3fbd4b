//! The torch controller: state, evaluator and hardware bound together.

use crate::config::Config;
use crate::error::TorchError;
use crate::hardware::{SensorAvailability, SensorReading, SensorSource, Torch};
use crate::lifecycle::{Lifecycle, ResourceGuard};
use crate::notice::Notice;
use crate::state::TorchState;

use log::{debug, info, warn};
use std::fmt;

/// Outcome of the torch permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    /// Not answered yet. Torch calls are attempted.
    #[default]
    Pending,
    /// Torch control allowed.
    Granted,
    /// Torch control refused. No hardware call is made.
    Denied,
}

/// The status line shown under the flash button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashStatus {
    /// Manual mode, torch off.
    Off,
    /// Manual mode, torch lit.
    Active,
    /// Auto mode owns the torch.
    Auto,
}

impl fmt::Display for FlashStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlashStatus::Off => "FLASH OFF",
            FlashStatus::Active => "FLASH ACTIVE",
            FlashStatus::Auto => "AUTO MODE ACTIVE",
        })
    }
}

/// Drives the torch from user input, sensor readings and the screen lifecycle.
///
/// All methods are called from the UI thread. The controller exclusively owns
/// the torch handle; hardware failures become [`Notice`]s and never panic.
///
/// # Example
///
/// ```
/// use luxtorch_core::{Config, MockSensors, MockTorch, SensorReading, TorchController};
///
/// let torch = MockTorch::new();
/// let sensors = MockSensors::new();
/// let mut controller = TorchController::new(
///     &Config::default(),
///     Some(Box::new(torch.clone())),
///     Some(Box::new(sensors.clone())),
/// );
///
/// controller.resume();
/// controller.set_auto_mode(true);
/// sensors.push(SensorReading::Light { lux: 40.0 });
/// controller.poll_sensors();
/// assert!(!torch.is_on());
///
/// controller.pause();
/// assert!(!torch.is_on());
/// ```
pub struct TorchController {
    state: TorchState,
    guard: ResourceGuard,
    torch: Option<Box<dyn Torch>>,
    sensors: Option<Box<dyn SensorSource>>,
    subscribed: bool,
    permission: Permission,
    threshold_max: f32,
    gauge_max: f32,
    notices: Vec<Notice>,
}

impl TorchController {
    /// Create a controller for the given hardware.
    ///
    /// Missing hardware is not an error: the affected feature is disabled and
    /// a notice explains why.
    pub fn new(
        config: &Config,
        torch: Option<Box<dyn Torch>>,
        sensors: Option<Box<dyn SensorSource>>,
    ) -> Self {
        let mut notices = Vec::new();
        if torch.is_none() {
            warn!("no torch available, flash control disabled");
            notices.push(Notice::NoTorch);
        }
        match sensors.as_ref().map(|s| s.available()) {
            None => notices.push(Notice::NoSensors),
            Some(available) if available.is_empty() => notices.push(Notice::NoSensors),
            Some(available) => {
                if !available.light {
                    notices.push(Notice::NoLightSensor);
                }
                if !available.proximity {
                    notices.push(Notice::NoProximitySensor);
                }
            }
        }

        Self {
            state: TorchState::with_threshold(config.lux_threshold.clamp(0.0, config.threshold_max)),
            guard: ResourceGuard::default(),
            torch,
            sensors,
            subscribed: false,
            permission: Permission::Pending,
            threshold_max: config.threshold_max,
            gauge_max: config.gauge_max,
            notices,
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// A snapshot of the current state.
    pub fn state(&self) -> TorchState {
        self.state
    }

    /// Where the screen is in its lifecycle.
    pub fn lifecycle(&self) -> Lifecycle {
        self.guard.lifecycle()
    }

    /// Whether sensor readings are currently being received.
    pub fn sensors_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Which sensors the device has.
    pub fn sensors_available(&self) -> SensorAvailability {
        self.sensors
            .as_ref()
            .map(|s| s.available())
            .unwrap_or_default()
    }

    /// Whether a torch is present and usable.
    pub fn has_torch(&self) -> bool {
        self.torch.is_some() && self.permission != Permission::Denied
    }

    /// The answer to the permission prompt so far.
    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Largest threshold the slider allows.
    pub fn threshold_max(&self) -> f32 {
        self.threshold_max
    }

    /// Lux value at which the gauge is full.
    pub fn gauge_max(&self) -> f32 {
        self.gauge_max
    }

    /// The current lux reading, capped to the gauge.
    pub fn lux_gauge(&self) -> f32 {
        self.state.current_lux.clamp(0.0, self.gauge_max)
    }

    /// The status line.
    pub fn status(&self) -> FlashStatus {
        match (self.state.auto_mode, self.state.torch_on) {
            (true, _) => FlashStatus::Auto,
            (false, true) => FlashStatus::Active,
            (false, false) => FlashStatus::Off,
        }
    }

    /// Take the notices posted since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// The screen became visible.
    pub fn resume(&mut self) {
        if self.is_destroyed() {
            return;
        }
        let effect = self.guard.transition(Lifecycle::Visible);
        info!("screen visible");
        self.sync_sensors(effect.sensors);
    }

    /// The screen lost visibility. Sensors stop and the torch is forced off.
    pub fn pause(&mut self) {
        if self.is_destroyed() {
            return;
        }
        let effect = self.guard.transition(Lifecycle::Hidden);
        info!("screen hidden");
        self.sync_sensors(effect.sensors);
        if effect.release_torch {
            self.release_torch();
        }
    }

    /// The screen is torn down. Sensors stop, the torch is forced off and
    /// every later event is ignored.
    pub fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }
        let effect = self.guard.transition(Lifecycle::Destroyed);
        info!("screen destroyed");
        self.sync_sensors(effect.sensors);
        self.release_torch();
    }

    // -------------------------------------------------------------------------
    // User input
    // -------------------------------------------------------------------------

    /// Switch auto mode on or off.
    ///
    /// On: sensors start (if visible) and the torch is evaluated right away.
    /// Off: sensors stop and the torch is forced off.
    pub fn set_auto_mode(&mut self, enabled: bool) {
        if self.is_destroyed() || enabled == self.state.auto_mode {
            return;
        }
        if enabled && self.permission == Permission::Denied {
            self.notices.push(Notice::PermissionDenied);
            return;
        }

        self.state.auto_mode = enabled;
        let effect = self.guard.set_auto_mode(enabled);
        info!("auto mode {}", if enabled { "enabled" } else { "disabled" });
        self.sync_sensors(effect.sensors);

        if enabled {
            self.notices.push(Notice::AutoModeEnabled);
            self.evaluate();
        } else {
            if effect.release_torch {
                self.release_torch();
            }
            self.notices.push(Notice::AutoModeDisabled);
        }
    }

    /// The flash button was pressed. Toggles the torch in manual mode only.
    /// Presses on a screen that is not visible are ignored.
    pub fn press_flash_button(&mut self) {
        if !self.guard.lifecycle().is_visible() {
            debug!("ignoring flash press: screen not visible");
            return;
        }
        if self.state.auto_mode {
            self.notices.push(Notice::ManualBlocked);
            return;
        }
        if self.torch.is_none() {
            self.notices.push(Notice::NoTorch);
            return;
        }
        self.apply(!self.state.torch_on);
    }

    /// The threshold slider moved. The value is clamped to the slider range
    /// and auto mode is re-evaluated.
    pub fn set_threshold(&mut self, lux: f32) {
        if self.is_destroyed() || lux.is_nan() {
            return;
        }
        self.state.lux_threshold = lux.clamp(0.0, self.threshold_max);
        debug!("threshold set to {}", self.state.lux_threshold);
        self.evaluate();
    }

    /// The threshold slider was released.
    pub fn commit_threshold(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.notices
            .push(Notice::SensitivitySet(self.state.lux_threshold));
        self.evaluate();
    }

    // -------------------------------------------------------------------------
    // OS callbacks
    // -------------------------------------------------------------------------

    /// Handle one sensor event. Events arriving while unsubscribed are dropped.
    pub fn on_sensor_reading(&mut self, reading: SensorReading) {
        if !self.subscribed {
            debug!("dropping {:?}: sensors not subscribed", reading);
            return;
        }
        match reading {
            SensorReading::Light { lux } if !lux.is_finite() => {
                warn!("dropping non-finite light reading {}", lux);
                return;
            }
            SensorReading::Light { lux } => self.state.current_lux = lux,
            SensorReading::Proximity { near } => self.state.covered = near,
        }
        debug!("reading {:?}", reading);
        self.evaluate();
    }

    /// Deliver all pending readings from the sensor source.
    ///
    /// A failing source turns auto mode off and is reported once.
    pub fn poll_sensors(&mut self) {
        if !self.subscribed {
            return;
        }
        let Some(sensors) = self.sensors.as_mut() else {
            return;
        };
        match sensors.poll() {
            Ok(readings) => {
                for reading in readings {
                    self.on_sensor_reading(reading);
                }
            }
            Err(e) => {
                warn!("sensor read failed, disabling auto mode: {}", e);
                self.disable_auto_mode();
                self.notices.push(Notice::NoSensors);
            }
        }
    }

    /// Answer to the torch permission prompt.
    ///
    /// A refusal turns the torch off, disables auto mode and stops every
    /// further hardware call.
    pub fn on_permission_result(&mut self, granted: bool) {
        if granted {
            info!("torch permission granted");
            self.permission = Permission::Granted;
            return;
        }

        if self.permission == Permission::Denied {
            return;
        }
        warn!("torch permission denied");
        if self.state.torch_on {
            self.release_torch();
        }
        if self.permission != Permission::Denied {
            self.revoke();
        }
    }

    /// Ask the torch whether it may be controlled and record the answer.
    pub fn check_permission(&mut self) {
        let granted = match self.torch.as_ref().map(|t| t.check_access()) {
            None => return,
            Some(Ok(())) => true,
            Some(Err(TorchError::PermissionDenied)) => false,
            Some(Err(e)) => {
                warn!("torch access check failed: {}", e);
                return;
            }
        };
        self.on_permission_result(granted);
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn is_destroyed(&self) -> bool {
        self.guard.lifecycle() == Lifecycle::Destroyed
    }

    /// Stop all torch control after a refusal.
    fn revoke(&mut self) {
        self.permission = Permission::Denied;
        self.disable_auto_mode();
        self.notices.push(Notice::PermissionDenied);
    }

    /// Turn auto mode off without a user notice: sensors stop and the torch
    /// is forced off.
    fn disable_auto_mode(&mut self) {
        if !self.state.auto_mode {
            return;
        }
        self.state.auto_mode = false;
        let effect = self.guard.set_auto_mode(false);
        self.sync_sensors(effect.sensors);
        if effect.release_torch {
            self.release_torch();
        }
    }

    fn sync_sensors(&mut self, wanted: bool) {
        let Some(sensors) = self.sensors.as_mut() else {
            return;
        };
        if wanted && !self.subscribed {
            match sensors.subscribe() {
                Ok(()) => {
                    debug!("sensors subscribed");
                    self.subscribed = true;
                }
                Err(e) => {
                    warn!("cannot subscribe sensors: {}", e);
                    self.notices.push(Notice::NoSensors);
                }
            }
        } else if !wanted && self.subscribed {
            sensors.unsubscribe();
            debug!("sensors unsubscribed");
            self.subscribed = false;
        }
    }

    /// Run the auto-mode rule. Only a visible screen may light the torch.
    fn evaluate(&mut self) {
        if !self.guard.lifecycle().is_visible() {
            return;
        }
        let action = self.state.auto_action();
        debug!(
            "evaluate lux={} threshold={} covered={} on={} -> {:?}",
            self.state.current_lux,
            self.state.lux_threshold,
            self.state.covered,
            self.state.torch_on,
            action
        );
        if let Some(on) = action.target() {
            self.apply(on);
        }
    }

    /// Force the torch off, whatever the recorded state.
    fn release_torch(&mut self) {
        if self.torch.is_none() || self.permission == Permission::Denied {
            return;
        }
        self.apply(false);
    }

    fn apply(&mut self, on: bool) {
        if self.permission == Permission::Denied {
            if on {
                self.notices.push(Notice::PermissionDenied);
            }
            return;
        }
        let Some(torch) = self.torch.as_mut() else {
            return;
        };
        match torch.set_torch(on) {
            Ok(()) => {
                if self.state.torch_on != on {
                    info!("torch {}", if on { "on" } else { "off" });
                }
                self.state.torch_on = on;
            }
            Err(TorchError::PermissionDenied) => {
                warn!("torch write refused");
                self.revoke();
            }
            Err(e) => {
                warn!("torch {} failed: {}", if on { "on" } else { "off" }, e);
                self.notices.push(Notice::FlashError);
            }
        }
    }
}

impl fmt::Debug for TorchController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TorchController")
            .field("state", &self.state)
            .field("lifecycle", &self.guard.lifecycle())
            .field("subscribed", &self.subscribed)
            .field("permission", &self.permission)
            .finish_non_exhaustive()
    }
}
