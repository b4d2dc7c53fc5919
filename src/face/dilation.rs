use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::hw::SensorHub;

const PUPIL_MIN: f32 = 0.0;
const PUPIL_MAX: f32 = 1.0;

/// Pupil dilation source, fixed at construction: either a smoothed analog
/// sensor or the synthetic fractal walk when no sensor channel is wired.
pub enum Dilator {
    Analog(AnalogDilator),
    Fractal(FractalDilator),
}

impl Dilator {
    /// Current dilation, 0.0 (constricted) to 1.0 (dilated).
    pub fn get_dilation(&mut self, now: f64) -> f32 {
        match self {
            Self::Analog(d) => d.get_dilation(),
            Self::Fractal(d) => d.get_dilation(now),
        }
    }
}

/// Dilation from a light/analog sensor channel, low-pass filtered so ADC
/// noise doesn't make the pupil shimmer.
pub struct AnalogDilator {
    hub: Arc<SensorHub>,
    channel: usize,
    flip: bool,
    /// Filter strength; 0 disables smoothing entirely.
    smooth_level: u32,
    current: f32,
}

impl AnalogDilator {
    pub fn new(hub: Arc<SensorHub>, channel: usize, flip: bool, smooth_level: u32) -> Self {
        Self {
            hub,
            channel,
            flip,
            smooth_level,
            current: 1.0,
        }
    }

    pub fn get_dilation(&mut self) -> f32 {
        let mut raw = self.hub.read_channel(self.channel);
        if self.flip {
            raw = 1.0 - raw;
        }
        let raw = raw.clamp(PUPIL_MIN, PUPIL_MAX);
        self.current = if self.smooth_level > 0 {
            let level = self.smooth_level as f32;
            (self.current * (level - 1.0) + raw) / level
        } else {
            raw
        };
        self.current
    }
}

/// Simulated pupil response when no sensor is attached: self-similar
/// divisions of time. Each 4-second cycle walks from the previous value to
/// a fresh random target through 8 waypoints whose random excursions halve
/// at every subdivision, which reads as organic drift rather than jitter.
pub struct FractalDilator {
    current: f32,
    start_value: f32,
    start_time: f64,
    targets: Vec<f32>,
    rng: StdRng,
}

const CYCLE_S: f64 = 4.0;
const STEPS: usize = 8;
const STEP_S: f64 = CYCLE_S / STEPS as f64;

impl FractalDilator {
    pub fn new(now: f64) -> Self {
        Self::with_rng(now, StdRng::from_entropy())
    }

    pub fn with_rng(now: f64, mut rng: StdRng) -> Self {
        let start_value = 0.0;
        let target = rng.gen::<f32>();
        let targets = fill_values(&mut rng, start_value, target, STEPS, 1.0);
        Self {
            current: start_value,
            start_value,
            start_time: now,
            targets,
            rng,
        }
    }

    pub fn get_dilation(&mut self, now: f64) -> f32 {
        let elapsed = now - self.start_time;
        if elapsed >= CYCLE_S {
            // Cycle done: snap to the final waypoint and schedule the next walk
            self.current = self.targets[STEPS - 1];
            self.start_value = self.current;
            let target = self.rng.gen::<f32>();
            self.targets = fill_values(&mut self.rng, self.start_value, target, STEPS, 1.0);
            self.start_time = now;
        } else {
            // Walk forward through the waypoints as the cycle elapses
            let percent = elapsed / CYCLE_S;
            let step = ((STEPS as f64) * percent) as usize;
            let step_elapsed = elapsed - step as f64 * STEP_S;
            let step_percent = (step_elapsed / STEP_S) as f32;
            let prior = if step == 0 {
                self.start_value
            } else {
                self.targets[step - 1]
            };
            self.current = prior + (self.targets[step] - prior) * step_percent;
        }
        self.current
    }
}

/// Subdivide `start..end` into `count` waypoints: pick a fudged midpoint,
/// halve the variance, recurse into both halves. The leaves carry the
/// endpoint of their sub-interval.
fn fill_values(rng: &mut StdRng, start: f32, end: f32, count: usize, variance: f32) -> Vec<f32> {
    if count == 1 {
        return vec![end];
    }
    let vari = variance / 2.0;
    let half = count / 2;
    let mid = (start + end) / 2.0;
    let fudged = (mid + rng.gen_range(-variance..vari)).clamp(PUPIL_MIN, PUPIL_MAX);
    let mut values = fill_values(rng, start, fudged, half, vari);
    values.extend(fill_values(rng, fudged, end, half, vari));
    values
}
