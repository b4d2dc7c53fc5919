use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::gfx::anim::smoothstep;
use crate::hw::SensorHub;

/// Gaze direction source, fixed at construction: joystick channels when
/// wired, otherwise autonomous saccades.
pub enum Looker {
    Analog(AnalogLooker),
    Autonomous(AutonomousLooker),
}

impl Looker {
    /// Gaze position in [0,1] x [0,1]; (0.5, 0.5) looks straight ahead.
    pub fn get_x_y(&mut self, now: f64) -> (f32, f32) {
        match self {
            Self::Analog(l) => l.get_x_y(),
            Self::Autonomous(l) => l.get_x_y(now),
        }
    }
}

/// Gaze straight off a two-axis joystick.
pub struct AnalogLooker {
    hub: Arc<SensorHub>,
    channel_x: usize,
    channel_y: usize,
    flip_x: bool,
    flip_y: bool,
}

impl AnalogLooker {
    pub fn new(hub: Arc<SensorHub>, channel_x: usize, channel_y: usize, flip_x: bool, flip_y: bool) -> Self {
        Self {
            hub,
            channel_x,
            channel_y,
            flip_x,
            flip_y,
        }
    }

    pub fn get_x_y(&mut self) -> (f32, f32) {
        let mut x = self.hub.read_channel(self.channel_x);
        if self.flip_x {
            x = 1.0 - x;
        }
        let mut y = self.hub.read_channel(self.channel_y);
        if self.flip_y {
            y = 1.0 - y;
        }
        (x, y)
    }
}

/// Human-like saccades: fast eased moves to random destinations, separated
/// by variable-length fixations.
pub struct AutonomousLooker {
    is_moving: bool,
    start_time: f64,
    start_x: f32,
    start_y: f32,
    dest_x: f32,
    dest_y: f32,
    cur_x: f32,
    cur_y: f32,
    hold_duration: f64,
    move_duration: f64,
    rng: StdRng,
}

impl AutonomousLooker {
    const MIN_HOLD_S: f64 = 0.1;
    const MAX_HOLD_S: f64 = 1.1;
    const MIN_MOVE_S: f64 = 0.075;
    const MAX_MOVE_S: f64 = 0.175;

    pub fn new(now: f64) -> Self {
        Self::with_rng(now, StdRng::from_entropy())
    }

    pub fn with_rng(now: f64, mut rng: StdRng) -> Self {
        let hold_duration = rng.gen_range(Self::MIN_HOLD_S..Self::MAX_HOLD_S);
        let move_duration = rng.gen_range(Self::MIN_MOVE_S..Self::MAX_MOVE_S);
        Self {
            is_moving: false,
            start_time: now,
            start_x: 0.5,
            start_y: 0.5,
            dest_x: 0.5,
            dest_y: 0.5,
            cur_x: 0.5,
            cur_y: 0.5,
            hold_duration,
            move_duration,
            rng,
        }
    }

    pub fn get_x_y(&mut self, now: f64) -> (f32, f32) {
        let dt = now - self.start_time;
        if self.is_moving {
            if dt <= self.move_duration {
                let s = smoothstep((dt / self.move_duration) as f32);
                self.cur_x = self.start_x + (self.dest_x - self.start_x) * s;
                self.cur_y = self.start_y + (self.dest_y - self.start_y) * s;
            } else {
                // Arrived: snap to the destination and fixate there
                self.start_x = self.dest_x;
                self.start_y = self.dest_y;
                self.cur_x = self.dest_x;
                self.cur_y = self.dest_y;
                self.hold_duration = self.rng.gen_range(Self::MIN_HOLD_S..Self::MAX_HOLD_S);
                self.start_time = now;
                self.is_moving = false;
            }
        } else if dt >= self.hold_duration {
            // Fixation over: pick somewhere new to look
            self.dest_x = self.rng.gen_range(0.0..1.0);
            self.dest_y = self.rng.gen_range(0.0..1.0);
            self.move_duration = self.rng.gen_range(Self::MIN_MOVE_S..Self::MAX_MOVE_S);
            self.start_time = now;
            self.is_moving = true;
        }
        (self.cur_x, self.cur_y)
    }
}
