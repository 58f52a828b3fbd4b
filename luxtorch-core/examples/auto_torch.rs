//! Example: run auto mode against the device's torch and IIO sensors.
//!
//! Run with: `RUST_LOG=debug cargo run --example auto_torch`

use luxtorch_core::{Config, IioSensors, SensorSource, SysfsTorch, Torch, TorchController};

fn main() -> Result<(), luxtorch_core::TorchError> {
    // Initialize logging (optional)
    env_logger::init();

    let config = Config::from_env();
    let torch: Box<dyn Torch> = Box::new(SysfsTorch::from_config(&config)?);
    let sensors: Box<dyn SensorSource> = Box::new(IioSensors::from_config(&config)?);

    let mut controller = TorchController::new(&config, Some(torch), Some(sensors));
    controller.check_permission();
    controller.resume();
    controller.set_auto_mode(true);

    // Watch the room for a while
    for _ in 0..50 {
        controller.poll_sensors();
        for notice in controller.take_notices() {
            println!("{}", notice);
        }
        let state = controller.state();
        println!(
            "{:.1} lux (threshold {:.0}), covered={}, torch={}",
            state.current_lux, state.lux_threshold, state.covered, state.torch_on
        );
        std::thread::sleep(config.poll_interval);
    }

    // Always leave the torch off
    controller.destroy();
    Ok(())
}
