use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Whether both eyes should currently be heading open or shut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkTarget {
    Open,
    Closed,
}

/// Schedules autonomous blinking for the whole face.
///
/// Blink length and spacing are redrawn for every decision so the rhythm
/// never repeats. Timings from
/// http://rsif.royalsocietypublishing.org/content/10/85/20130227
pub struct Blinker {
    target: BlinkTarget,
    /// When the current closed interval ends.
    stop_time: f64,
    /// When autonomous blinking may next trigger.
    next_time: f64,
    forced: bool,
    autoblink: bool,
    rng: StdRng,
}

impl Blinker {
    /// How long the eyes take to close plus how long they stay shut.
    pub const MIN_LENGTH_S: f64 = Winker::MIN_CLOSING_S + 0.054;
    pub const MAX_LENGTH_S: f64 = Winker::MAX_CLOSING_S + 0.062;
    /// Spacing between autonomous blinks.
    pub const MIN_INTERVAL_S: f64 = 2.0;
    pub const MAX_INTERVAL_S: f64 = 10.0;

    pub fn new(autoblink: bool) -> Self {
        Self::with_rng(autoblink, StdRng::from_entropy())
    }

    pub fn with_rng(autoblink: bool, rng: StdRng) -> Self {
        Self {
            target: BlinkTarget::Open,
            stop_time: 0.0,
            next_time: 1.0,
            forced: false,
            autoblink,
            rng,
        }
    }

    /// Latch a forced blink; consumed by the next `evaluate`.
    pub fn force_close(&mut self) {
        self.forced = true;
    }

    /// Decide whether the eyes should be opening or closing at `now`.
    /// `triggered` is the external blink button state for this frame.
    pub fn evaluate(&mut self, now: f64, triggered: bool) -> BlinkTarget {
        let length = self.rng.gen_range(Self::MIN_LENGTH_S..Self::MAX_LENGTH_S);
        let interval = self.rng.gen_range(Self::MIN_INTERVAL_S..Self::MAX_INTERVAL_S);

        if self.forced || self.target == BlinkTarget::Open {
            let autoblink_due = self.autoblink && now >= self.next_time;
            if self.forced || triggered || autoblink_due {
                self.target = BlinkTarget::Closed;
                self.stop_time = now + length;
                self.next_time = now + interval;
                self.forced = false;
            }
        } else if now > self.stop_time {
            self.target = BlinkTarget::Open;
        }
        self.target
    }
}

/// Converts the shared blink target and this eye's wink button into a timed
/// eyelid transition.
pub struct Winker {
    /// Combined target of the transition in flight; None until first frame.
    target: Option<BlinkTarget>,
    start_time: f64,
    duration: f64,
    finish_time: f64,
    rng: StdRng,
}

impl Winker {
    pub const MIN_CLOSING_S: f64 = 0.070;
    pub const MAX_CLOSING_S: f64 = 0.215;
    pub const MIN_OPENING_S: f64 = 0.100;
    pub const MAX_OPENING_S: f64 = 0.200;

    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            target: None,
            start_time: 0.0,
            duration: 0.0,
            finish_time: 0.0,
            rng,
        }
    }

    /// How far shut this eye should be drawn at `now`: 0.0 settled open
    /// through 1.0 settled closed, easing linearly during a transition.
    pub fn open_amount(&mut self, now: f64, blink_target: BlinkTarget, wink_pressed: bool) -> f32 {
        // A shared blink closes both eyes no matter what; an open blink
        // target yields control to this eye's own wink signal.
        let target = if blink_target == BlinkTarget::Closed || wink_pressed {
            BlinkTarget::Closed
        } else {
            BlinkTarget::Open
        };

        if self.target != Some(target) {
            self.target = Some(target);
            self.start_time = now;
            self.duration = match target {
                BlinkTarget::Closed => self.rng.gen_range(Self::MIN_CLOSING_S..Self::MAX_CLOSING_S),
                BlinkTarget::Open => self.rng.gen_range(Self::MIN_OPENING_S..Self::MAX_OPENING_S),
            };
            self.finish_time = now + self.duration;
        }

        let remaining = self.finish_time - now;
        if self.duration > 0.0 && remaining > 0.0 {
            match target {
                BlinkTarget::Open => (remaining / self.duration) as f32,
                BlinkTarget::Closed => ((now - self.start_time) / self.duration) as f32,
            }
        } else {
            match target {
                BlinkTarget::Open => 0.0,
                BlinkTarget::Closed => 1.0,
            }
        }
    }
}

impl Default for Winker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn autoblink_cycle_respects_timing_bounds() {
        let mut blinker = Blinker::with_rng(true, rng());

        // Before the first scheduled blink (1.0 s) the eyes stay open
        assert_eq!(blinker.evaluate(0.0, false), BlinkTarget::Open);
        assert_eq!(blinker.evaluate(0.9, false), BlinkTarget::Open);

        // Past the schedule, the blink fires
        assert_eq!(blinker.evaluate(1.5, false), BlinkTarget::Closed);
        let close_len = blinker.stop_time - 1.5;
        let interval = blinker.next_time - 1.5;
        assert!(close_len >= Blinker::MIN_LENGTH_S && close_len <= Blinker::MAX_LENGTH_S);
        assert!(interval >= Blinker::MIN_INTERVAL_S && interval <= Blinker::MAX_INTERVAL_S);

        // Shorter than any possible close duration: still shut
        assert_eq!(blinker.evaluate(1.5 + 0.1, false), BlinkTarget::Closed);
        // Longer than any possible close duration: open again
        assert_eq!(blinker.evaluate(1.5 + 0.3, false), BlinkTarget::Open);

        // Next autonomous blink waits for the drawn interval
        let next = blinker.next_time;
        assert_eq!(blinker.evaluate(next - 0.01, false), BlinkTarget::Open);
        assert_eq!(blinker.evaluate(next + 0.01, false), BlinkTarget::Closed);
    }

    #[test]
    fn external_trigger_blinks_without_autoblink() {
        let mut blinker = Blinker::with_rng(false, rng());
        // No autoblink: stays open arbitrarily long
        assert_eq!(blinker.evaluate(50.0, false), BlinkTarget::Open);
        // Button press closes immediately
        assert_eq!(blinker.evaluate(51.0, true), BlinkTarget::Closed);
        assert_eq!(blinker.evaluate(51.0 + 0.3, false), BlinkTarget::Open);
    }

    #[test]
    fn force_close_latch_is_consumed() {
        let mut blinker = Blinker::with_rng(false, rng());
        blinker.force_close();
        assert_eq!(blinker.evaluate(3.0, false), BlinkTarget::Closed);
        // Latch was consumed: the blink runs its course and reopens
        assert_eq!(blinker.evaluate(3.0 + 0.3, false), BlinkTarget::Open);
    }

    #[test]
    fn force_close_while_closed_extends_the_blink() {
        let mut blinker = Blinker::with_rng(false, rng());
        assert_eq!(blinker.evaluate(10.0, true), BlinkTarget::Closed);
        let first_stop = blinker.stop_time;
        blinker.force_close();
        assert_eq!(blinker.evaluate(10.2, false), BlinkTarget::Closed);
        assert!(blinker.stop_time >= first_stop);
    }

    #[test]
    fn closed_blink_dominates_wink() {
        let mut winker = Winker::with_rng(rng());
        // Shared blink closed, no wink: closing
        winker.open_amount(0.0, BlinkTarget::Closed, false);
        assert_eq!(winker.target, Some(BlinkTarget::Closed));
        // Open blink target yields to the wink button
        let mut winker = Winker::with_rng(rng());
        winker.open_amount(0.0, BlinkTarget::Open, true);
        assert_eq!(winker.target, Some(BlinkTarget::Closed));
        // Open and no wink: opening
        let mut winker = Winker::with_rng(rng());
        winker.open_amount(0.0, BlinkTarget::Open, false);
        assert_eq!(winker.target, Some(BlinkTarget::Open));
    }

    #[test]
    fn transition_eases_linearly_and_settles() {
        let mut winker = Winker::with_rng(rng());

        // Settle open first
        winker.open_amount(0.0, BlinkTarget::Open, false);
        let settle = winker.finish_time + 0.01;
        assert_eq!(winker.open_amount(settle, BlinkTarget::Open, false), 0.0);

        // Flip toward closed at t=10: continuous at the boundary (~0),
        // halfway at duration/2, settled at 1.0 past the finish.
        let v0 = winker.open_amount(10.0, BlinkTarget::Closed, false);
        assert!(v0.abs() < 1e-6);
        let d = winker.duration;
        assert!(d >= Winker::MIN_CLOSING_S && d <= Winker::MAX_CLOSING_S);
        let mid = winker.open_amount(10.0 + d / 2.0, BlinkTarget::Closed, false);
        assert!((mid - 0.5).abs() < 1e-3);
        assert_eq!(winker.open_amount(10.0 + d + 0.05, BlinkTarget::Closed, false), 1.0);

        // Flip toward open at t=20: starts at ~1, halfway at duration/2,
        // settles at 0.0.
        let v1 = winker.open_amount(20.0, BlinkTarget::Open, false);
        assert!((v1 - 1.0).abs() < 1e-6);
        let d = winker.duration;
        assert!(d >= Winker::MIN_OPENING_S && d <= Winker::MAX_OPENING_S);
        let mid = winker.open_amount(20.0 + d / 2.0, BlinkTarget::Open, false);
        assert!((mid - 0.5).abs() < 1e-3);
        assert_eq!(winker.open_amount(20.0 + d + 0.05, BlinkTarget::Open, false), 0.0);
    }

    #[test]
    fn open_amount_stays_in_unit_range() {
        let mut winker = Winker::with_rng(rng());
        let mut blinker = Blinker::with_rng(true, StdRng::seed_from_u64(21));
        let mut now = 0.0;
        for i in 0..2000 {
            now += 0.016; // 60 fps-ish
            let blink = blinker.evaluate(now, false);
            let wink = i % 97 == 0;
            let v = winker.open_amount(now, blink, wink);
            assert!((0.0..=1.0).contains(&v), "out of range at {now}: {v}");
        }
    }

    proptest::proptest! {
        // Any monotonic sampling cadence and any wink pattern keeps the
        // output inside the unit range.
        #[test]
        fn open_amount_bounded_for_arbitrary_cadence(
            seed in 0u64..1000,
            steps in proptest::collection::vec(0.0001f64..0.5, 1..300),
            winks in proptest::collection::vec(proptest::bool::ANY, 300),
        ) {
            let mut winker = Winker::with_rng(StdRng::seed_from_u64(seed));
            let mut blinker = Blinker::with_rng(true, StdRng::seed_from_u64(seed ^ 0xdead));
            let mut now = 0.0;
            for (i, dt) in steps.iter().enumerate() {
                now += dt;
                let blink = blinker.evaluate(now, false);
                let v = winker.open_amount(now, blink, winks[i]);
                proptest::prop_assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}
