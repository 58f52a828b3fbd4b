//! Runtime configuration.

use crate::state::DEFAULT_LUX_THRESHOLD;
use log::warn;
use std::path::PathBuf;
use std::time::Duration;

/// Default root of the Linux LED class.
pub const LED_CLASS_ROOT: &str = "/sys/class/leds";
/// Default root of the Linux industrial I/O bus.
pub const IIO_DEVICES_ROOT: &str = "/sys/bus/iio/devices";

/// Upper end of the threshold slider, in lux.
pub const THRESHOLD_MAX: f32 = 100.0;
/// Full scale of the lux gauge, in lux. A dim room sits well inside it.
pub const GAUGE_MAX: f32 = 100.0;

/// Settings for the controller and the sysfs backends.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Initial lux threshold.
    pub lux_threshold: f32,
    /// Largest threshold the slider allows.
    pub threshold_max: f32,
    /// Lux value at which the gauge is full.
    pub gauge_max: f32,
    /// How often sensors are polled while subscribed.
    pub poll_interval: Duration,
    /// Where LED class devices live.
    pub led_root: PathBuf,
    /// Use this LED instead of searching for a torch.
    pub led_name: Option<String>,
    /// Where IIO devices live.
    pub iio_root: PathBuf,
    /// Raw proximity value at or above which the sensor counts as covered.
    pub proximity_near_level: f32,
    /// Run against in-memory hardware.
    pub mock: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lux_threshold: DEFAULT_LUX_THRESHOLD,
            threshold_max: THRESHOLD_MAX,
            gauge_max: GAUGE_MAX,
            poll_interval: Duration::from_millis(200),
            led_root: PathBuf::from(LED_CLASS_ROOT),
            led_name: None,
            iio_root: PathBuf::from(IIO_DEVICES_ROOT),
            proximity_near_level: 1.0,
            mock: false,
        }
    }
}

impl Config {
    /// Build a config from `LUXTORCH_*` environment variables.
    ///
    /// Unparseable values are logged and the default is kept.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build a config from key/value pairs, ignoring keys that are not ours.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "LUXTORCH_THRESHOLD" => {
                    if let Some(lux) = parse_finite(key, value) {
                        config.lux_threshold = lux.clamp(0.0, config.threshold_max);
                    }
                }
                "LUXTORCH_POLL_MS" => {
                    if let Some(ms) = parse_var::<u64>(key, value) {
                        config.poll_interval = Duration::from_millis(ms.max(10));
                    }
                }
                "LUXTORCH_LED_ROOT" => config.led_root = PathBuf::from(value),
                "LUXTORCH_LED" => config.led_name = Some(value.to_string()),
                "LUXTORCH_IIO_ROOT" => config.iio_root = PathBuf::from(value),
                "LUXTORCH_PROXIMITY_NEAR" => {
                    if let Some(level) = parse_finite(key, value) {
                        config.proximity_near_level = level;
                    }
                }
                "LUXTORCH_MOCK" => config.mock = matches!(value, "1" | "true" | "yes"),
                _ => {}
            }
        }
        config
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("ignoring {}={:?}: not a valid value", key, value);
            None
        }
    }
}

fn parse_finite(key: &str, value: &str) -> Option<f32> {
    let parsed = parse_var::<f32>(key, value)?;
    if parsed.is_finite() {
        Some(parsed)
    } else {
        warn!("ignoring {}={:?}: not a finite number", key, value);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.lux_threshold, 15.0);
        assert_eq!(config.gauge_max, 100.0);
        assert_eq!(config.led_root, PathBuf::from("/sys/class/leds"));
        assert!(!config.mock);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_vars([
            ("LUXTORCH_THRESHOLD", "30"),
            ("LUXTORCH_POLL_MS", "500"),
            ("LUXTORCH_LED", "white:flash"),
            ("LUXTORCH_MOCK", "1"),
            ("HOME", "/root"),
        ]);
        assert_eq!(config.lux_threshold, 30.0);
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.led_name.as_deref(), Some("white:flash"));
        assert!(config.mock);
    }

    #[test]
    fn bad_values_keep_defaults() {
        let config = Config::from_vars([("LUXTORCH_THRESHOLD", "bright"), ("LUXTORCH_POLL_MS", "-1")]);
        assert_eq!(config.lux_threshold, 15.0);
        assert_eq!(config.poll_interval, Duration::from_millis(200));
    }

    #[test]
    fn non_finite_values_keep_defaults() {
        let config = Config::from_vars([
            ("LUXTORCH_THRESHOLD", "NaN"),
            ("LUXTORCH_PROXIMITY_NEAR", "inf"),
        ]);
        assert_eq!(config.lux_threshold, 15.0);
        assert_eq!(config.proximity_near_level, 1.0);
    }

    #[test]
    fn threshold_is_clamped_to_slider() {
        let config = Config::from_vars([("LUXTORCH_THRESHOLD", "500")]);
        assert_eq!(config.lux_threshold, THRESHOLD_MAX);
    }
}
