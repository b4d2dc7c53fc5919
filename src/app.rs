use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use log::{info, warn};

use crate::config::Config;
use crate::face::blink::Blinker;
use crate::face::dilation::{AnalogDilator, Dilator, FractalDilator};
use crate::face::gaze::{AnalogLooker, AutonomousLooker, Looker};
use crate::face::{Face, FrameInputs};
use crate::gfx::draw::MeshBackend;
use crate::gfx::geom::EyeProfile;
use crate::hw::{self, AdcReader, DigitalInput, SensorHub};

/// Monotonic time source for the whole engine, seconds since startup.
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the frame loop needs, wired together from the config.
///
/// Sources are chosen once here: a configured analog channel (with an ADC
/// present) gets the sensor-backed variant, anything else falls back to the
/// autonomous one. After construction there is no wrong-variant call to make.
pub struct App {
    pub config: Config,
    clock: Clock,
    inputs: Box<dyn DigitalInput>,
    face: Face,
}

impl App {
    pub fn new(config: Config, adc: Option<Box<dyn AdcReader>>, inputs: Box<dyn DigitalInput>) -> Self {
        let clock = Clock::new();
        let hub = Arc::new(SensorHub::new());
        let have_adc = adc.is_some();
        if let Some(reader) = adc {
            hw::spawn_sampler(hub.clone(), reader);
        }

        let dilator = if config.pupil_chan >= 0 && have_adc {
            info!("pupil dilation from analog channel {}", config.pupil_chan);
            Dilator::Analog(AnalogDilator::new(
                hub.clone(),
                config.pupil_chan as usize,
                config.pupil_flip,
                config.pupil_smooth,
            ))
        } else {
            if config.pupil_chan >= 0 {
                warn!("pupil channel {} configured but no ADC present; using fractal dilation", config.pupil_chan);
            }
            Dilator::Fractal(FractalDilator::new(clock.now()))
        };

        let looker = if config.joystick_x_chan >= 0 && config.joystick_y_chan >= 0 && have_adc {
            info!(
                "gaze from analog channels {}/{}",
                config.joystick_x_chan, config.joystick_y_chan
            );
            Looker::Analog(AnalogLooker::new(
                hub,
                config.joystick_x_chan as usize,
                config.joystick_y_chan as usize,
                config.joystick_x_flip,
                config.joystick_y_flip,
            ))
        } else {
            if config.joystick_x_chan >= 0 || config.joystick_y_chan >= 0 {
                warn!("joystick needs both channels and an ADC; using autonomous gaze");
            }
            Looker::Autonomous(AutonomousLooker::new(clock.now()))
        };

        let blinker = Blinker::new(config.autoblink);
        let profile = EyeProfile::synthetic(config.eye_radius);
        let face = if config.cyclops {
            Face::cyclops(&profile, blinker, dilator, looker, config.tracking)
        } else {
            Face::two_eyes(&profile, blinker, dilator, looker, config.tracking)
        };

        Self {
            config,
            clock,
            inputs,
            face,
        }
    }

    /// Force both eyes shut on the next frame.
    pub fn force_blink(&mut self) {
        self.face.force_blink();
    }

    pub fn frames(&self) -> u64 {
        self.face.frames()
    }

    /// Run one display frame against the rendering backend.
    pub fn frame(&mut self, backend: &mut dyn MeshBackend) -> Result<()> {
        let now = self.clock.now();
        let inputs = FrameInputs {
            blink: self.config.blink_pin >= 0 && self.inputs.is_pressed(self.config.blink_pin),
            wink_left: self.config.wink_l_pin >= 0 && self.inputs.is_pressed(self.config.wink_l_pin),
            wink_right: self.config.wink_r_pin >= 0
                && self.inputs.is_pressed(self.config.wink_r_pin),
        };
        self.face.frame(now, inputs, backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::draw::NullBackend;
    use crate::hw::NoInputs;
    use std::thread;
    use std::time::Duration;

    struct DummyAdc;
    impl AdcReader for DummyAdc {
        fn read(&mut self, _channel: u8) -> Result<i32> {
            thread::sleep(Duration::from_millis(5));
            Ok(800)
        }
    }

    #[test]
    fn clock_is_monotonic() {
        let clock = Clock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert!(a >= 0.0);
    }

    #[test]
    fn default_config_selects_autonomous_sources() {
        let app = App::new(Config::default(), None, Box::new(NoInputs));
        assert!(matches!(app.face.dilator(), Dilator::Fractal(_)));
        assert!(matches!(app.face.looker(), Looker::Autonomous(_)));
    }

    #[test]
    fn configured_channels_select_analog_sources() {
        let mut config = Config::default();
        config.pupil_chan = 2;
        config.joystick_x_chan = 0;
        config.joystick_y_chan = 1;
        let app = App::new(config, Some(Box::new(DummyAdc)), Box::new(NoInputs));
        assert!(matches!(app.face.dilator(), Dilator::Analog(_)));
        assert!(matches!(app.face.looker(), Looker::Analog(_)));
    }

    #[test]
    fn missing_adc_degrades_to_autonomous() {
        let mut config = Config::default();
        config.pupil_chan = 2;
        config.joystick_x_chan = 0;
        config.joystick_y_chan = 1;
        let app = App::new(config, None, Box::new(NoInputs));
        assert!(matches!(app.face.dilator(), Dilator::Fractal(_)));
        assert!(matches!(app.face.looker(), Looker::Autonomous(_)));
    }

    #[test]
    fn app_runs_frames_headless() {
        let mut app = App::new(Config::default(), None, Box::new(NoInputs));
        let mut backend = NullBackend::default();
        for _ in 0..5 {
            app.frame(&mut backend).unwrap();
        }
        assert_eq!(app.frames(), 5);
        assert!(backend.draws >= 40); // 8 draw calls per two-eye frame
    }
}
