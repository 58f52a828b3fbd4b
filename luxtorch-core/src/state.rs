//! Torch state record.

/// Default lux threshold below which auto mode lights the torch.
pub const DEFAULT_LUX_THRESHOLD: f32 = 15.0;

/// The screen's mutable state.
///
/// Created when the screen starts, mutated by sensor callbacks and user input,
/// discarded at teardown. Use [`TorchController::state`](crate::TorchController::state)
/// to obtain a snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorchState {
    /// Whether the torch is currently lit.
    pub torch_on: bool,
    /// Whether sensor-driven control is enabled.
    pub auto_mode: bool,
    /// Whether the proximity sensor reports something near (pocket, face down).
    pub covered: bool,
    /// Lux level below which auto mode turns the torch on.
    pub lux_threshold: f32,
    /// Latest light sensor reading in lux.
    pub current_lux: f32,
}

impl TorchState {
    /// Create a state with the given threshold and everything else off.
    pub fn with_threshold(lux_threshold: f32) -> Self {
        Self {
            lux_threshold,
            ..Self::default()
        }
    }
}

impl Default for TorchState {
    fn default() -> Self {
        Self {
            torch_on: false,
            auto_mode: false,
            covered: false,
            lux_threshold: DEFAULT_LUX_THRESHOLD,
            current_lux: 0.0,
        }
    }
}
