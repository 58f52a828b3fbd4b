//! Auto-mode evaluation rule.

use crate::state::TorchState;

/// What auto mode wants the torch to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorchAction {
    /// Light the torch.
    TurnOn,
    /// Switch the torch off.
    TurnOff,
    /// Leave the torch alone.
    Hold,
}

impl TorchAction {
    /// The torch state this action requests, if any.
    pub fn target(self) -> Option<bool> {
        match self {
            TorchAction::TurnOn => Some(true),
            TorchAction::TurnOff => Some(false),
            TorchAction::Hold => None,
        }
    }
}

/// Decide the next torch action from the current readings.
///
/// Turns on when it is darker than the threshold, the sensor is uncovered and
/// the torch is off. Turns off when it is at least as bright as the threshold
/// or the sensor is covered, and the torch is on. Anything else holds, so an
/// unchanged input never produces a second hardware call.
pub fn evaluate(current_lux: f32, lux_threshold: f32, covered: bool, torch_on: bool) -> TorchAction {
    if current_lux < lux_threshold && !covered && !torch_on {
        TorchAction::TurnOn
    } else if (current_lux >= lux_threshold || covered) && torch_on {
        TorchAction::TurnOff
    } else {
        TorchAction::Hold
    }
}

impl TorchState {
    /// Evaluate this state; holds unless auto mode is enabled.
    pub fn auto_action(&self) -> TorchAction {
        if !self.auto_mode {
            return TorchAction::Hold;
        }
        evaluate(
            self.current_lux,
            self.lux_threshold,
            self.covered,
            self.torch_on,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn dark_and_uncovered_turns_on() {
        assert_eq!(evaluate(10.0, 15.0, false, false), TorchAction::TurnOn);
    }

    #[test]
    fn bright_turns_off() {
        assert_eq!(evaluate(20.0, 15.0, false, true), TorchAction::TurnOff);
    }

    #[test]
    fn covered_stays_off() {
        assert_eq!(evaluate(5.0, 15.0, true, false), TorchAction::Hold);
    }

    #[test]
    fn covering_a_lit_torch_turns_it_off() {
        assert_eq!(evaluate(5.0, 15.0, true, true), TorchAction::TurnOff);
    }

    #[test]
    fn threshold_is_exclusive_for_on() {
        assert_eq!(evaluate(15.0, 15.0, false, false), TorchAction::Hold);
        assert_eq!(evaluate(15.0, 15.0, false, true), TorchAction::TurnOff);
    }

    #[test]
    fn auto_action_holds_in_manual_mode() {
        let state = TorchState {
            current_lux: 0.0,
            ..TorchState::default()
        };
        assert_eq!(state.auto_action(), TorchAction::Hold);

        let state = TorchState {
            auto_mode: true,
            ..state
        };
        assert_eq!(state.auto_action(), TorchAction::TurnOn);
    }

    proptest! {
        #[test]
        fn turns_on_iff_dark_uncovered_and_off(
            lux in 0.0f32..1000.0,
            threshold in 0.0f32..100.0,
            covered in any::<bool>(),
            torch_on in any::<bool>(),
        ) {
            let action = evaluate(lux, threshold, covered, torch_on);
            let expect_on = lux < threshold && !covered && !torch_on;
            prop_assert_eq!(action == TorchAction::TurnOn, expect_on);
        }

        #[test]
        fn applying_the_action_reaches_a_fixed_point(
            lux in 0.0f32..1000.0,
            threshold in 0.0f32..100.0,
            covered in any::<bool>(),
            torch_on in any::<bool>(),
        ) {
            let first = evaluate(lux, threshold, covered, torch_on);
            let torch_on = first.target().unwrap_or(torch_on);
            prop_assert_eq!(evaluate(lux, threshold, covered, torch_on), TorchAction::Hold);
        }
    }
}
