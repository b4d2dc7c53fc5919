use anyhow::Result;
use log::debug;

use crate::gfx::geom::{points_interp, Vec2};
use crate::gfx::regen::RegenPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EyeSide {
    Left,
    Right,
}

impl EyeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LidKind {
    Upper,
    Lower,
}

/// The rendering collaborator. Owns vertex construction, textures and the
/// actual draw calls; the engine only hands it interpolated point sets and
/// orientation angles.
pub trait MeshBackend {
    fn rebuild_iris(&mut self, side: EyeSide, points: &[Vec2]) -> Result<()>;
    fn rebuild_lid(&mut self, side: EyeSide, kind: LidKind, points: &[Vec2]) -> Result<()>;
    fn draw_iris(&mut self, side: EyeSide, x_deg: f32, y_deg: f32) -> Result<()>;
    fn draw_sclera(&mut self, side: EyeSide, x_deg: f32, y_deg: f32) -> Result<()>;
    fn draw_lid(&mut self, side: EyeSide, kind: LidKind) -> Result<()>;
}

/// Backend that renders nothing. Used when no display pipeline is attached,
/// and by tests to observe how often geometry is actually rebuilt.
#[derive(Debug, Default)]
pub struct NullBackend {
    pub iris_rebuilds: u64,
    pub lid_rebuilds: u64,
    pub draws: u64,
}

impl MeshBackend for NullBackend {
    fn rebuild_iris(&mut self, side: EyeSide, points: &[Vec2]) -> Result<()> {
        self.iris_rebuilds += 1;
        debug!("rebuild iris {} ({} points)", side.as_str(), points.len());
        Ok(())
    }

    fn rebuild_lid(&mut self, side: EyeSide, _kind: LidKind, points: &[Vec2]) -> Result<()> {
        self.lid_rebuilds += 1;
        debug!("rebuild lid {} ({} points)", side.as_str(), points.len());
        Ok(())
    }

    fn draw_iris(&mut self, _side: EyeSide, _x_deg: f32, _y_deg: f32) -> Result<()> {
        self.draws += 1;
        Ok(())
    }

    fn draw_sclera(&mut self, _side: EyeSide, _x_deg: f32, _y_deg: f32) -> Result<()> {
        self.draws += 1;
        Ok(())
    }

    fn draw_lid(&mut self, _side: EyeSide, _kind: LidKind) -> Result<()> {
        self.draws += 1;
        Ok(())
    }
}

/// Iris geometry state for one eye: interpolates the pupil outline between
/// its minimum and maximum size and rebuilds the mesh only when the dilation
/// moved far enough to be visible.
pub struct IrisRig {
    side: EyeSide,
    pupil_min: Vec<Vec2>,
    pupil_max: Vec<Vec2>,
    policy: RegenPolicy,
    prev_dilation: Option<f32>,
}

impl IrisRig {
    pub fn new(side: EyeSide, pupil_min: Vec<Vec2>, pupil_max: Vec<Vec2>) -> Self {
        let policy = RegenPolicy::for_pupil(&pupil_min, &pupil_max);
        Self {
            side,
            pupil_min,
            pupil_max,
            policy,
            prev_dilation: None,
        }
    }

    pub fn set_dilation(&mut self, dilation: f32, backend: &mut dyn MeshBackend) -> Result<()> {
        let regen = match self.prev_dilation {
            // First frame always builds a mesh
            None => true,
            Some(prev) => self.policy.should_regen((dilation - prev).abs()),
        };
        if regen {
            let points = points_interp(&self.pupil_min, &self.pupil_max, dilation);
            backend.rebuild_iris(self.side, &points)?;
            self.prev_dilation = Some(dilation);
        }
        Ok(())
    }
}

/// Eyelid geometry state for one eye and lid. Derives its lid weight from
/// the blink state and the tracking position, then regenerates behind the
/// same sub-pixel threshold policy as the iris.
pub struct LidRig {
    side: EyeSide,
    kind: LidKind,
    open_points: Vec<Vec2>,
    closed_points: Vec<Vec2>,
    policy: RegenPolicy,
    prev_weight: Option<f32>,
}

impl LidRig {
    pub fn new(side: EyeSide, kind: LidKind, open_points: Vec<Vec2>, closed_points: Vec<Vec2>) -> Self {
        let policy = RegenPolicy::for_lid(&open_points, &closed_points);
        Self {
            side,
            kind,
            open_points,
            closed_points,
            policy,
            prev_weight: None,
        }
    }

    /// Weight 0.0 = lid at its open path, 1.0 = at its closed path. The
    /// upper lid closes downward from the tracking position; the lower lid
    /// mirrors it.
    fn lid_weight(&self, blink_state: f32, tracking_pos: f32) -> f32 {
        match self.kind {
            LidKind::Upper => tracking_pos + blink_state * (1.0 - tracking_pos),
            LidKind::Lower => (1.0 - tracking_pos) + blink_state * tracking_pos,
        }
    }

    pub fn update(
        &mut self,
        blink_state: f32,
        tracking_pos: f32,
        backend: &mut dyn MeshBackend,
    ) -> Result<()> {
        let weight = self.lid_weight(blink_state, tracking_pos);
        let regen = match self.prev_weight {
            None => true,
            Some(prev) => self.policy.should_regen((weight - prev).abs()),
        };
        if regen {
            let points = points_interp(&self.open_points, &self.closed_points, weight);
            backend.rebuild_lid(self.side, self.kind, &points)?;
            self.prev_weight = Some(weight);
        }
        Ok(())
    }
}
