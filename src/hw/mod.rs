use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use log::{info, warn};

/// Number of analog channels on the sensor board.
pub const ADC_CHANNELS: usize = 4;

/// ADC input range is +-4.096 V and the output span is -2048..+2047, but
/// analog inputs only swing 0..~3.3 V, i.e. 0..~1649 counts. Readings are
/// clipped to this before scaling to 0..1.
pub const ADC_RAW_MAX: i32 = 1649;

/// Latest reading per analog channel, shared between the sampling thread
/// and the frame loop.
///
/// Values are plain scalar replacements (f32 bits in an AtomicU32), so the
/// frame loop never blocks and never sees a torn value. Staleness is fine:
/// the inputs are continuous analog signals, not discrete events.
pub struct SensorHub {
    channels: [AtomicU32; ADC_CHANNELS],
}

impl SensorHub {
    pub fn new() -> Self {
        Self {
            channels: [
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
            ],
        }
    }

    /// Latest value for a channel, 0.0..1.0.
    pub fn read_channel(&self, channel: usize) -> f32 {
        f32::from_bits(self.channels[channel].load(Ordering::Relaxed))
    }

    pub fn store_channel(&self, channel: usize, value: f32) {
        self.channels[channel].store(value.to_bits(), Ordering::Relaxed);
    }
}

impl Default for SensorHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw ADC access. Implemented over the actual converter driver; reads are
/// blocking, which is why they live on their own thread.
pub trait AdcReader: Send {
    fn read(&mut self, channel: u8) -> Result<i32>;
}

/// Debounced digital inputs (buttons are wired active-low).
pub trait DigitalInput {
    fn is_pressed(&self, pin: i32) -> bool;
}

/// Stand-in for absent GPIO hardware: no button is ever pressed.
pub struct NoInputs;

impl DigitalInput for NoInputs {
    fn is_pressed(&self, _pin: i32) -> bool {
        false
    }
}

/// Continuously read every ADC channel into the hub.
///
/// ADC reads are blocking and would noticeably stall the animation loop,
/// especially across multiple channels, so they run here at the converter's
/// own data rate and the frame loop reads the hub at its leisure. A failed
/// read keeps the previous value.
pub fn spawn_sampler(hub: Arc<SensorHub>, mut reader: Box<dyn AdcReader>) {
    thread::spawn(move || {
        info!("ADC sampler running ({ADC_CHANNELS} channels)");
        loop {
            for ch in 0..ADC_CHANNELS {
                match reader.read(ch as u8) {
                    Ok(raw) => {
                        let clipped = raw.clamp(0, ADC_RAW_MAX);
                        hub.store_channel(ch, clipped as f32 / ADC_RAW_MAX as f32);
                    }
                    Err(e) => warn!("ADC read failed on channel {ch}: {e}"),
                }
            }
            thread::yield_now();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_roundtrips_values() {
        let hub = SensorHub::new();
        hub.store_channel(0, 0.25);
        hub.store_channel(3, 1.0);
        assert_eq!(hub.read_channel(0), 0.25);
        assert_eq!(hub.read_channel(3), 1.0);
        assert_eq!(hub.read_channel(1), 0.0);
    }

    #[test]
    fn sampler_clips_and_scales() {
        struct FixedAdc(Vec<i32>);
        impl AdcReader for FixedAdc {
            fn read(&mut self, channel: u8) -> Result<i32> {
                Ok(self.0[channel as usize])
            }
        }

        // Drive one pass of the sampling logic directly
        let hub = SensorHub::new();
        let mut reader = FixedAdc(vec![-50, 0, 900, 5000]);
        for ch in 0..ADC_CHANNELS {
            let raw = reader.read(ch as u8).unwrap();
            let clipped = raw.clamp(0, ADC_RAW_MAX);
            hub.store_channel(ch, clipped as f32 / ADC_RAW_MAX as f32);
        }
        assert_eq!(hub.read_channel(0), 0.0); // negative clipped up
        assert_eq!(hub.read_channel(1), 0.0);
        assert!((hub.read_channel(2) - 900.0 / 1649.0).abs() < 1e-6);
        assert_eq!(hub.read_channel(3), 1.0); // over-range clipped down
    }

    #[test]
    fn no_inputs_never_presses() {
        let inputs = NoInputs;
        assert!(!inputs.is_pressed(22));
        assert!(!inputs.is_pressed(-1));
    }
}
