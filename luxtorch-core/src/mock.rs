//! Mock hardware for testing.

use crate::error::TorchError;
use crate::hardware::{SensorAvailability, SensorReading, SensorSource, Torch};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Mock Torch
// =============================================================================

#[derive(Debug, Default)]
struct TorchLog {
    on: bool,
    calls: Vec<bool>,
    fail: bool,
    deny: bool,
}

/// An in-memory torch that records every hardware call.
///
/// Clones share the same torch, so a test can keep a handle after moving one
/// into a [`TorchController`](crate::TorchController).
///
/// # Example
///
/// ```
/// use luxtorch_core::{MockTorch, Torch};
///
/// let mut torch = MockTorch::new();
/// let handle = torch.clone();
/// torch.set_torch(true).unwrap();
/// assert!(handle.is_on());
/// assert_eq!(handle.calls(), vec![true]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTorch {
    log: Arc<Mutex<TorchLog>>,
}

impl MockTorch {
    /// Create a mock torch that is off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the torch is lit.
    pub fn is_on(&self) -> bool {
        lock(&self.log).on
    }

    /// Every requested state, in order.
    pub fn calls(&self) -> Vec<bool> {
        lock(&self.log).calls.clone()
    }

    /// Make subsequent state changes fail.
    pub fn set_failing(&self, fail: bool) {
        lock(&self.log).fail = fail;
    }

    /// Make access checks and state changes report a permission error.
    pub fn set_denied(&self, deny: bool) {
        lock(&self.log).deny = deny;
    }
}

impl Torch for MockTorch {
    fn set_torch(&mut self, on: bool) -> Result<(), TorchError> {
        let mut log = lock(&self.log);
        log.calls.push(on);
        if log.deny {
            return Err(TorchError::PermissionDenied);
        }
        if log.fail {
            return Err(TorchError::TorchControl("mock failure".to_string()));
        }
        log.on = on;
        Ok(())
    }

    fn check_access(&self) -> Result<(), TorchError> {
        if lock(&self.log).deny {
            Err(TorchError::PermissionDenied)
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// Mock Sensors
// =============================================================================

#[derive(Debug, Default)]
struct SensorQueue {
    available: SensorAvailability,
    subscribed: bool,
    subscriptions: usize,
    pending: VecDeque<SensorReading>,
}

/// An in-memory sensor source fed by the test.
///
/// Readings pushed while unsubscribed are dropped, like a real sensor whose
/// listener is unregistered.
///
/// # Example
///
/// ```
/// use luxtorch_core::{MockSensors, SensorReading, SensorSource};
///
/// let mut sensors = MockSensors::new();
/// sensors.subscribe().unwrap();
/// sensors.push(SensorReading::Light { lux: 3.0 });
/// assert_eq!(sensors.poll().unwrap(), vec![SensorReading::Light { lux: 3.0 }]);
/// ```
#[derive(Debug, Clone)]
pub struct MockSensors {
    queue: Arc<Mutex<SensorQueue>>,
}

impl MockSensors {
    /// Create a source with both a light and a proximity sensor.
    pub fn new() -> Self {
        Self::with_availability(SensorAvailability {
            light: true,
            proximity: true,
        })
    }

    /// Create a source with only the given sensors.
    pub fn with_availability(available: SensorAvailability) -> Self {
        Self {
            queue: Arc::new(Mutex::new(SensorQueue {
                available,
                ..SensorQueue::default()
            })),
        }
    }

    /// Deliver a reading, if subscribed.
    pub fn push(&self, reading: SensorReading) {
        let mut queue = lock(&self.queue);
        if queue.subscribed {
            queue.pending.push_back(reading);
        }
    }

    /// Whether a listener is registered.
    pub fn is_subscribed(&self) -> bool {
        lock(&self.queue).subscribed
    }

    /// How many times the source was subscribed.
    pub fn subscriptions(&self) -> usize {
        lock(&self.queue).subscriptions
    }
}

impl Default for MockSensors {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSource for MockSensors {
    fn available(&self) -> SensorAvailability {
        lock(&self.queue).available
    }

    fn subscribe(&mut self) -> Result<(), TorchError> {
        let mut queue = lock(&self.queue);
        if queue.available.is_empty() {
            return Err(TorchError::NoSensors);
        }
        if !queue.subscribed {
            queue.subscribed = true;
            queue.subscriptions += 1;
        }
        Ok(())
    }

    fn unsubscribe(&mut self) {
        let mut queue = lock(&self.queue);
        queue.subscribed = false;
        queue.pending.clear();
    }

    fn poll(&mut self) -> Result<Vec<SensorReading>, TorchError> {
        Ok(lock(&self.queue).pending.drain(..).collect())
    }
}
