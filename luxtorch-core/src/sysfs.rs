//! Linux sysfs backends: LED class torch and IIO light/proximity sensors.

use crate::config::Config;
use crate::error::TorchError;
use crate::hardware::{SensorAvailability, SensorReading, SensorSource, Torch};

use log::{debug, info, warn};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

fn read_number(path: &Path) -> Result<f32, TorchError> {
    let raw = fs::read_to_string(path).map_err(TorchError::from_io)?;
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| TorchError::InvalidReading {
            path: path.to_path_buf(),
            value: raw.trim().to_string(),
        })
}

// =============================================================================
// SysfsTorch
// =============================================================================

/// A torch exposed through the LED class, e.g. `/sys/class/leds/white:torch`.
///
/// On writes `max_brightness` to `brightness`, off writes `0`.
#[derive(Debug)]
pub struct SysfsTorch {
    brightness: PathBuf,
    max_brightness: u32,
}

impl SysfsTorch {
    /// Open the torch described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, TorchError> {
        Self::discover(&config.led_root, config.led_name.as_deref())
    }

    /// Find a torch LED under `root`.
    ///
    /// With `name`, that LED is used. Otherwise the first LED whose name
    /// mentions `torch` is taken, falling back to one that mentions `flash`.
    pub fn discover(root: &Path, name: Option<&str>) -> Result<Self, TorchError> {
        let dir = match name {
            Some(name) => root.join(name),
            None => find_torch_led(root)?,
        };
        Self::open(&dir)
    }

    /// Open the LED at `dir`.
    pub fn open(dir: &Path) -> Result<Self, TorchError> {
        let brightness = dir.join("brightness");
        if !brightness.exists() {
            return Err(TorchError::NoTorch);
        }
        let max_brightness = match read_number(&dir.join("max_brightness")) {
            Ok(max) if max >= 1.0 => max as u32,
            Ok(_) => 1,
            Err(e) => {
                warn!("no usable max_brightness in {}: {}", dir.display(), e);
                1
            }
        };
        info!(
            "using torch {} (max brightness {})",
            dir.display(),
            max_brightness
        );
        Ok(Self {
            brightness,
            max_brightness,
        })
    }

    /// The brightness written when the torch is switched on.
    pub fn max_brightness(&self) -> u32 {
        self.max_brightness
    }
}

fn find_torch_led(root: &Path) -> Result<PathBuf, TorchError> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("cannot list {}: {}", root.display(), e);
            return Err(TorchError::NoTorch);
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();

    let pick = |needle: &str| {
        names
            .iter()
            .find(|name| name.to_ascii_lowercase().contains(needle))
            .map(|name| root.join(name))
    };
    pick("torch").or_else(|| pick("flash")).ok_or(TorchError::NoTorch)
}

impl Torch for SysfsTorch {
    fn set_torch(&mut self, on: bool) -> Result<(), TorchError> {
        let value = if on { self.max_brightness } else { 0 };
        fs::write(&self.brightness, value.to_string()).map_err(TorchError::from_io)?;
        debug!("wrote {} to {}", value, self.brightness.display());
        Ok(())
    }

    fn check_access(&self) -> Result<(), TorchError> {
        OpenOptions::new()
            .write(true)
            .open(&self.brightness)
            .map(drop)
            .map_err(TorchError::from_io)
    }
}

// =============================================================================
// IioSensors
// =============================================================================

#[derive(Debug, Clone)]
enum LightChannel {
    /// Already in lux.
    Input(PathBuf),
    /// Raw counts, optionally multiplied by a scale attribute.
    Raw { raw: PathBuf, scale: Option<PathBuf> },
}

impl LightChannel {
    fn read_lux(&self) -> Result<f32, TorchError> {
        match self {
            LightChannel::Input(path) => read_number(path),
            LightChannel::Raw { raw, scale } => {
                let counts = read_number(raw)?;
                let scale = match scale {
                    Some(path) => read_number(path)?,
                    None => 1.0,
                };
                Ok(counts * scale)
            }
        }
    }
}

/// Light and proximity sensors on the industrial I/O bus.
///
/// Each poll while subscribed yields one reading per present sensor.
#[derive(Debug)]
pub struct IioSensors {
    light: Option<LightChannel>,
    proximity: Option<PathBuf>,
    near_level: f32,
    subscribed: bool,
}

impl IioSensors {
    /// Scan the IIO root described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, TorchError> {
        Self::discover(&config.iio_root, config.proximity_near_level)
    }

    /// Scan `root` for `iio:device*` directories carrying light or proximity channels.
    ///
    /// Fails with [`TorchError::NoSensors`] when `root` cannot be listed. A
    /// root with no matching channels yields a source with nothing available.
    pub fn discover(root: &Path, near_level: f32) -> Result<Self, TorchError> {
        let entries = fs::read_dir(root).map_err(|e| {
            debug!("cannot list {}: {}", root.display(), e);
            TorchError::NoSensors
        })?;

        let mut devices: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("iio:device"))
            .map(|entry| entry.path())
            .collect();
        devices.sort();

        let mut light = None;
        let mut proximity = None;
        for device in &devices {
            if light.is_none() {
                light = light_channel(device);
                if light.is_some() {
                    info!("light sensor at {}", device.display());
                }
            }
            if proximity.is_none() {
                proximity = ["in_proximity_raw", "in_proximity_input"]
                    .iter()
                    .map(|name| device.join(name))
                    .find(|path| path.exists());
                if proximity.is_some() {
                    info!("proximity sensor at {}", device.display());
                }
            }
        }

        Ok(Self {
            light,
            proximity,
            near_level,
            subscribed: false,
        })
    }
}

fn light_channel(device: &Path) -> Option<LightChannel> {
    let input = device.join("in_illuminance_input");
    if input.exists() {
        return Some(LightChannel::Input(input));
    }
    let raw = device.join("in_illuminance_raw");
    if raw.exists() {
        let scale = device.join("in_illuminance_scale");
        return Some(LightChannel::Raw {
            raw,
            scale: scale.exists().then_some(scale),
        });
    }
    None
}

impl SensorSource for IioSensors {
    fn available(&self) -> SensorAvailability {
        SensorAvailability {
            light: self.light.is_some(),
            proximity: self.proximity.is_some(),
        }
    }

    fn subscribe(&mut self) -> Result<(), TorchError> {
        if self.available().is_empty() {
            return Err(TorchError::NoSensors);
        }
        self.subscribed = true;
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.subscribed = false;
    }

    fn poll(&mut self) -> Result<Vec<SensorReading>, TorchError> {
        let mut readings = Vec::with_capacity(2);
        if !self.subscribed {
            return Ok(readings);
        }
        if let Some(light) = &self.light {
            readings.push(SensorReading::Light {
                lux: light.read_lux()?,
            });
        }
        if let Some(path) = &self.proximity {
            readings.push(SensorReading::Proximity {
                near: read_number(path)? >= self.near_level,
            });
        }
        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn torch_prefers_torch_over_flash() {
        let root = tempdir().unwrap();
        write(&root.path().join("led:flash/brightness"), "0\n");
        write(&root.path().join("white:torch/brightness"), "0\n");
        write(&root.path().join("white:torch/max_brightness"), "255\n");

        let mut torch = SysfsTorch::discover(root.path(), None).unwrap();
        assert_eq!(torch.max_brightness(), 255);

        torch.set_torch(true).unwrap();
        let written = fs::read_to_string(root.path().join("white:torch/brightness")).unwrap();
        assert_eq!(written, "255");

        torch.set_torch(false).unwrap();
        let written = fs::read_to_string(root.path().join("white:torch/brightness")).unwrap();
        assert_eq!(written, "0");
    }

    #[test]
    fn torch_by_name() {
        let root = tempdir().unwrap();
        write(&root.path().join("led0/brightness"), "0");
        let torch = SysfsTorch::discover(root.path(), Some("led0")).unwrap();
        assert_eq!(torch.max_brightness(), 1);
        assert!(torch.check_access().is_ok());
    }

    #[test]
    fn missing_torch() {
        let root = tempdir().unwrap();
        write(&root.path().join("input3::capslock/brightness"), "0");
        assert!(matches!(
            SysfsTorch::discover(root.path(), None),
            Err(TorchError::NoTorch)
        ));
        assert!(matches!(
            SysfsTorch::discover(&root.path().join("absent"), None),
            Err(TorchError::NoTorch)
        ));
    }

    #[test]
    fn iio_light_and_proximity() {
        let root = tempdir().unwrap();
        write(&root.path().join("iio:device0/in_illuminance_raw"), "40\n");
        write(&root.path().join("iio:device0/in_illuminance_scale"), "0.25\n");
        write(&root.path().join("iio:device1/in_proximity_raw"), "0\n");
        write(&root.path().join("trigger0/name"), "x");

        let mut sensors = IioSensors::discover(root.path(), 1.0).unwrap();
        assert_eq!(
            sensors.available(),
            SensorAvailability {
                light: true,
                proximity: true
            }
        );

        assert!(sensors.poll().unwrap().is_empty());

        sensors.subscribe().unwrap();
        assert_eq!(
            sensors.poll().unwrap(),
            vec![
                SensorReading::Light { lux: 10.0 },
                SensorReading::Proximity { near: false },
            ]
        );

        write(&root.path().join("iio:device1/in_proximity_raw"), "3\n");
        assert_eq!(
            sensors.poll().unwrap()[1],
            SensorReading::Proximity { near: true }
        );

        sensors.unsubscribe();
        assert!(sensors.poll().unwrap().is_empty());
    }

    #[test]
    fn iio_without_sensors() {
        let root = tempdir().unwrap();
        write(&root.path().join("iio:device0/in_accel_x_raw"), "1");

        let mut sensors = IioSensors::discover(root.path(), 1.0).unwrap();
        assert!(sensors.available().is_empty());
        assert!(matches!(sensors.subscribe(), Err(TorchError::NoSensors)));

        assert!(matches!(
            IioSensors::discover(&root.path().join("absent"), 1.0),
            Err(TorchError::NoSensors)
        ));
    }

    #[test]
    fn iio_non_finite_reading() {
        let root = tempdir().unwrap();
        write(&root.path().join("iio:device0/in_illuminance_input"), "NaN\n");

        let mut sensors = IioSensors::discover(root.path(), 1.0).unwrap();
        sensors.subscribe().unwrap();
        assert!(matches!(
            sensors.poll(),
            Err(TorchError::InvalidReading { .. })
        ));
    }

    #[test]
    fn iio_garbage_reading() {
        let root = tempdir().unwrap();
        write(&root.path().join("iio:device0/in_illuminance_input"), "dark\n");

        let mut sensors = IioSensors::discover(root.path(), 1.0).unwrap();
        sensors.subscribe().unwrap();
        match sensors.poll() {
            Err(TorchError::InvalidReading { value, .. }) => assert_eq!(value, "dark"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
