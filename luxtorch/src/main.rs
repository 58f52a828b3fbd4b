use luxtorch_core::{
    Config, IioSensors, MockSensors, MockTorch, Notice, SensorReading, SensorSource, SysfsTorch,
    Torch, TorchController,
};

use iced::keyboard::{self, Event as KeyboardEvent, Key, key::Named};
use iced::widget::{button, column, container, progress_bar, row, slider, text, toggler};
use iced::{Element, Subscription, Task, Theme, time, window};
use log::{info, warn};
use std::collections::VecDeque;
use std::time::Duration;

/// How long each notice stays on screen.
const NOTICE_DURATION: Duration = Duration::from_secs(3);

pub fn main() -> iced::Result {
    env_logger::init();

    iced::application(LuxTorchApp::new, LuxTorchApp::update, LuxTorchApp::view)
        .title("LuxTorch")
        .subscription(LuxTorchApp::subscription)
        .theme(LuxTorchApp::theme)
        .run()
}

/// In-memory sensors driven from the keyboard when running without hardware.
struct Simulator {
    sensors: MockSensors,
    lux: f32,
    near: bool,
}

struct LuxTorchApp {
    controller: TorchController,
    config: Config,
    simulator: Option<Simulator>,
    notices: VecDeque<Notice>,
}

#[derive(Debug, Clone)]
enum Message {
    // User input
    FlashPressed,
    AutoModeToggled(bool),
    ThresholdChanged(f32),
    ThresholdReleased,

    // Sensor pump
    Tick,

    // Notice timeout
    DismissNotice,

    // Screen visibility
    Window(window::Event),

    // Keyboard event
    KeyboardEvent(KeyboardEvent),
}

impl LuxTorchApp {
    fn new() -> Self {
        let config = Config::from_env();
        let mut simulator = None;

        let (torch, sensors): (Option<Box<dyn Torch>>, Option<Box<dyn SensorSource>>) =
            if config.mock {
                info!("running on simulated hardware");
                let sensors = MockSensors::new();
                simulator = Some(Simulator {
                    sensors: sensors.clone(),
                    lux: 50.0,
                    near: false,
                });
                (Some(Box::new(MockTorch::new())), Some(Box::new(sensors)))
            } else {
                let torch = match SysfsTorch::from_config(&config) {
                    Ok(torch) => Some(Box::new(torch) as Box<dyn Torch>),
                    Err(e) => {
                        warn!("torch unavailable: {}", e);
                        None
                    }
                };
                let sensors = match IioSensors::from_config(&config) {
                    Ok(sensors) => Some(Box::new(sensors) as Box<dyn SensorSource>),
                    Err(e) => {
                        warn!("sensors unavailable: {}", e);
                        None
                    }
                };
                (torch, sensors)
            };

        let mut controller = TorchController::new(&config, torch, sensors);
        controller.check_permission();
        controller.resume();

        let mut app = Self {
            controller,
            config,
            simulator,
            notices: VecDeque::new(),
        };
        app.collect_notices();
        app
    }

    fn collect_notices(&mut self) {
        self.notices.extend(self.controller.take_notices());
    }

    fn simulate(&mut self, lux_delta: f32, toggle_near: bool) {
        let Some(sim) = self.simulator.as_mut() else {
            return;
        };
        if toggle_near {
            sim.near = !sim.near;
            sim.sensors
                .push(SensorReading::Proximity { near: sim.near });
        } else {
            sim.lux = (sim.lux + lux_delta).max(0.0);
            sim.sensors.push(SensorReading::Light { lux: sim.lux });
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::FlashPressed => self.controller.press_flash_button(),

            Message::AutoModeToggled(enabled) => self.controller.set_auto_mode(enabled),

            Message::ThresholdChanged(lux) => self.controller.set_threshold(lux),

            Message::ThresholdReleased => self.controller.commit_threshold(),

            Message::Tick => self.controller.poll_sensors(),

            Message::DismissNotice => {
                self.notices.pop_front();
            }

            Message::Window(event) => match event {
                window::Event::Focused => self.controller.resume(),
                window::Event::Unfocused => self.controller.pause(),
                window::Event::CloseRequested | window::Event::Closed => {
                    self.controller.destroy();
                    return iced::exit();
                }
                _ => {}
            },

            Message::KeyboardEvent(event) => {
                if let KeyboardEvent::KeyPressed { key, .. } = event {
                    match key.as_ref() {
                        Key::Named(Named::Space) => {
                            return self.update(Message::FlashPressed);
                        }
                        Key::Character("a") => {
                            let enabled = !self.controller.state().auto_mode;
                            return self.update(Message::AutoModeToggled(enabled));
                        }
                        Key::Named(Named::ArrowUp) => self.simulate(5.0, false),
                        Key::Named(Named::ArrowDown) => self.simulate(-5.0, false),
                        Key::Character("p") => self.simulate(0.0, true),
                        _ => {}
                    }
                }
            }
        }

        self.collect_notices();
        Task::none()
    }

    fn view(&self) -> Element<'_, Message> {
        let state = self.controller.state();
        let title = text("LuxTorch").size(24);

        // Notice line, oldest first
        let notice = match self.notices.front() {
            Some(notice) => {
                let message = match self.notices.len() {
                    1 => notice.to_string(),
                    n => format!("{} (+{} more)", notice, n - 1),
                };
                let line = text(message).size(14);
                if notice.is_warning() {
                    line.style(text::danger)
                } else {
                    line
                }
            }
            None => text("").size(14),
        };

        // Flash button
        let label = if state.torch_on { "Flash ON" } else { "Flash OFF" };
        let flash = if self.controller.has_torch() {
            button(text(label).size(20)).on_press(Message::FlashPressed)
        } else {
            button(text(label).size(20))
        };
        let status = text(self.controller.status().to_string()).size(16);

        // Auto mode
        let auto = toggler(state.auto_mode)
            .label("Auto Mode")
            .on_toggle(Message::AutoModeToggled);

        // Ambient light
        let light_section = column![
            text(format!("{:.1} lux", state.current_lux)).size(16),
            progress_bar(0.0..=self.controller.gauge_max(), self.controller.lux_gauge()),
            text(if state.covered { "Sensor covered" } else { "" }).size(12),
        ]
        .spacing(5);

        // Threshold slider
        let threshold_section = column![
            text(format!("Turn on below {:.0} lux", state.lux_threshold)).size(14),
            slider(
                0.0..=self.controller.threshold_max(),
                state.lux_threshold,
                Message::ThresholdChanged
            )
            .step(1.0)
            .on_release(Message::ThresholdReleased),
        ]
        .spacing(5);

        let hint = if self.simulator.is_some() {
            "Keys: Space (flash) | A (auto) | Up/Down (simulated lux) | P (pocket)"
        } else {
            "Keys: Space (flash) | A (auto)"
        };

        let content = column![
            title,
            notice,
            row![flash, status].spacing(15),
            auto,
            light_section,
            threshold_section,
            text(hint).size(12),
        ]
        .spacing(15)
        .padding(20);

        container(content).into()
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![
            keyboard::listen().map(Message::KeyboardEvent),
            window::events().map(|(_id, event)| Message::Window(event)),
        ];
        if self.controller.sensors_subscribed() {
            subscriptions.push(time::every(self.config.poll_interval).map(|_| Message::Tick));
        }
        if !self.notices.is_empty() {
            subscriptions.push(time::every(NOTICE_DURATION).map(|_| Message::DismissNotice));
        }
        Subscription::batch(subscriptions)
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

impl Drop for LuxTorchApp {
    fn drop(&mut self) {
        self.controller.destroy();
    }
}
