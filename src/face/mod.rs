pub mod blink;
pub mod dilation;
pub mod gaze;

use anyhow::Result;

use crate::face::blink::Blinker;
use crate::face::dilation::Dilator;
use crate::face::gaze::Looker;
use crate::gfx::draw::{EyeSide, IrisRig, LidKind, LidRig, MeshBackend};
use crate::gfx::geom::EyeProfile;

/// Button states sampled once per frame by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInputs {
    pub blink: bool,
    pub wink_left: bool,
    pub wink_right: bool,
}

struct EyeAssembly {
    side: EyeSide,
    winker: blink::Winker,
    iris: IrisRig,
    upper_lid: LidRig,
    lower_lid: LidRig,
    /// Inward rotation (degrees) so paired eyes aim slightly at each other.
    convergence: f32,
}

impl EyeAssembly {
    fn new(profile: &EyeProfile, side: EyeSide, convergence: f32) -> Self {
        Self {
            side,
            winker: blink::Winker::new(),
            iris: IrisRig::new(side, profile.pupil_min.clone(), profile.pupil_max.clone()),
            upper_lid: LidRig::new(
                side,
                LidKind::Upper,
                profile.upper_lid_open.clone(),
                profile.upper_lid_closed.clone(),
            ),
            lower_lid: LidRig::new(
                side,
                LidKind::Lower,
                profile.lower_lid_open.clone(),
                profile.lower_lid_closed.clone(),
            ),
            convergence,
        }
    }
}

/// Drives the whole face for one frame: pulls gaze, dilation and per-eye
/// lid closure, derives tracking-adjusted lid weights, and hands the
/// finished numbers to the rendering backend.
pub struct Face {
    blinker: Blinker,
    dilator: Dilator,
    looker: Looker,
    eyes: Vec<EyeAssembly>,
    tracking: bool,
    tracking_pos: f32,
    frames: u64,
}

impl Face {
    const DEFAULT_TRACKING_POS: f32 = 0.3;
    const CONVERGENCE_DEG: f32 = 2.0;

    /// The usual paired-eye face.
    pub fn two_eyes(
        profile: &EyeProfile,
        blinker: Blinker,
        dilator: Dilator,
        looker: Looker,
        tracking: bool,
    ) -> Self {
        let eyes = vec![
            EyeAssembly::new(profile, EyeSide::Right, -Self::CONVERGENCE_DEG),
            EyeAssembly::new(profile, EyeSide::Left, Self::CONVERGENCE_DEG),
        ];
        Self::assemble(blinker, dilator, looker, eyes, tracking)
    }

    /// Single centered eye (spherical one-eye props); no convergence.
    pub fn cyclops(
        profile: &EyeProfile,
        blinker: Blinker,
        dilator: Dilator,
        looker: Looker,
        tracking: bool,
    ) -> Self {
        let eyes = vec![EyeAssembly::new(profile, EyeSide::Left, 0.0)];
        Self::assemble(blinker, dilator, looker, eyes, tracking)
    }

    fn assemble(
        blinker: Blinker,
        dilator: Dilator,
        looker: Looker,
        eyes: Vec<EyeAssembly>,
        tracking: bool,
    ) -> Self {
        Self {
            blinker,
            dilator,
            looker,
            eyes,
            tracking,
            tracking_pos: Self::DEFAULT_TRACKING_POS,
            frames: 0,
        }
    }

    /// Force both eyes shut on the next frame (spacebar, show control).
    pub fn force_blink(&mut self) {
        self.blinker.force_close();
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[cfg(test)]
    pub(crate) fn dilator(&self) -> &Dilator {
        &self.dilator
    }

    #[cfg(test)]
    pub(crate) fn looker(&self) -> &Looker {
        &self.looker
    }

    /// Generate one frame of imagery.
    pub fn frame(
        &mut self,
        now: f64,
        inputs: FrameInputs,
        backend: &mut dyn MeshBackend,
    ) -> Result<()> {
        self.frames += 1;

        let (cur_x, cur_y) = self.looker.get_x_y(now);
        let dilation = self.dilator.get_dilation(now);

        if self.tracking {
            // Lids follow the vertical gaze with a gentle lag
            let n = 0.4 - cur_y;
            self.tracking_pos = (self.tracking_pos * 3.0 + n) * 0.25;
        }

        let blink_target = self.blinker.evaluate(now, inputs.blink);

        for eye in &mut self.eyes {
            let wink = match eye.side {
                EyeSide::Left => inputs.wink_left,
                EyeSide::Right => inputs.wink_right,
            };
            // Never drive the lids fully off the eye: keep a sliver visible
            let blink_state = eye.winker.open_amount(now, blink_target, wink) * 0.75 + 0.25;

            eye.iris.set_dilation(dilation, backend)?;
            eye.upper_lid.update(blink_state, self.tracking_pos, backend)?;
            eye.lower_lid.update(blink_state, self.tracking_pos, backend)?;
        }

        // Map gaze from 0..1 onto -30..30 degrees of rotation
        let x_deg = cur_x * 60.0 - 30.0;
        let y_deg = cur_y * 60.0 - 30.0;

        // Eyeballs first, lids drawn over them
        for eye in &mut self.eyes {
            backend.draw_iris(eye.side, x_deg + eye.convergence, y_deg)?;
            backend.draw_sclera(eye.side, x_deg + eye.convergence, y_deg)?;
        }
        for eye in &mut self.eyes {
            backend.draw_lid(eye.side, LidKind::Upper)?;
            backend.draw_lid(eye.side, LidKind::Lower)?;
        }
        Ok(())
    }
}
