//! Screen lifecycle and the resource guard bound to it.

/// Where the screen is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Built but not yet shown.
    #[default]
    Created,
    /// On screen and in the foreground.
    Visible,
    /// Backgrounded or covered by another window.
    Hidden,
    /// Torn down. No further events are handled.
    Destroyed,
}

impl Lifecycle {
    /// Whether the screen is currently shown.
    pub fn is_visible(self) -> bool {
        self == Lifecycle::Visible
    }
}

/// Decides when sensors may run and when the torch must be released.
///
/// Sensors run only while auto mode is on and the screen is visible. Every
/// transition away from that reports that the torch must be forced off.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceGuard {
    lifecycle: Lifecycle,
    auto_mode: bool,
}

/// What the owner of the hardware must do after a guard transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardEffect {
    /// Sensors should be subscribed after this transition.
    pub sensors: bool,
    /// The torch must be switched off now, whatever its state.
    pub release_torch: bool,
}

impl ResourceGuard {
    /// The current lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Whether sensors should currently be subscribed.
    pub fn sensors_wanted(&self) -> bool {
        self.auto_mode && self.lifecycle.is_visible()
    }

    /// Record a lifecycle transition.
    ///
    /// A destroyed guard stays destroyed.
    pub fn transition(&mut self, next: Lifecycle) -> GuardEffect {
        if self.lifecycle != Lifecycle::Destroyed {
            self.lifecycle = next;
        }
        GuardEffect {
            sensors: self.sensors_wanted(),
            release_torch: !self.lifecycle.is_visible(),
        }
    }

    /// Record an auto mode change.
    pub fn set_auto_mode(&mut self, enabled: bool) -> GuardEffect {
        self.auto_mode = enabled;
        GuardEffect {
            sensors: self.sensors_wanted(),
            release_torch: !enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensors_need_auto_mode_and_visibility() {
        let mut guard = ResourceGuard::default();
        assert!(!guard.sensors_wanted());

        guard.set_auto_mode(true);
        assert!(!guard.sensors_wanted());

        let effect = guard.transition(Lifecycle::Visible);
        assert!(effect.sensors);
        assert!(!effect.release_torch);

        let effect = guard.transition(Lifecycle::Hidden);
        assert!(!effect.sensors);
        assert!(effect.release_torch);
    }

    #[test]
    fn disabling_auto_mode_releases_torch() {
        let mut guard = ResourceGuard::default();
        guard.transition(Lifecycle::Visible);
        guard.set_auto_mode(true);

        let effect = guard.set_auto_mode(false);
        assert!(!effect.sensors);
        assert!(effect.release_torch);
    }

    #[test]
    fn destroyed_is_terminal() {
        let mut guard = ResourceGuard::default();
        guard.set_auto_mode(true);
        guard.transition(Lifecycle::Destroyed);

        let effect = guard.transition(Lifecycle::Visible);
        assert_eq!(guard.lifecycle(), Lifecycle::Destroyed);
        assert!(!effect.sensors);
        assert!(effect.release_torch);
    }
}
