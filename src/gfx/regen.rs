use crate::gfx::geom::{path_midpoint, points_bounds, Vec2};

/// Decides whether a change in a driving value (pupil scale, lid weight) is
/// large enough to justify rebuilding mesh geometry.
///
/// Regenerating flexible geometry every frame is CPU intensive and can
/// noticeably slow things down on single-core boards. The threshold is sized
/// so that changes below roughly a quarter of one rendered pixel (4x4 area
/// sampling) are skipped.
#[derive(Debug, Clone, Copy)]
pub struct RegenPolicy {
    threshold: f32,
}

/// Fraction of a pixel below which a size change is not worth a rebuild.
const PIXEL_FRACTION: f32 = 0.25;

impl RegenPolicy {
    /// Threshold for pupil dilation, from the bounding boxes of the pupil
    /// outline at minimum and maximum size. The largest per-axis edge
    /// displacement is the motion range in pixels as the scale sweeps 0..1.
    pub fn for_pupil(min_points: &[Vec2], max_points: &[Vec2]) -> Self {
        let a = points_bounds(min_points);
        let b = points_bounds(max_points);
        let max_dist = (a.0 - b.0)
            .abs()
            .max((a.1 - b.1).abs())
            .max((a.2 - b.2).abs())
            .max((a.3 - b.3).abs());
        Self::from_extent(max_dist)
    }

    /// Threshold for an eyelid, from the distance between the middle points
    /// of the open and closed lid paths.
    pub fn for_lid(open_points: &[Vec2], closed_points: &[Vec2]) -> Self {
        let d = path_midpoint(open_points).distance(path_midpoint(closed_points));
        Self::from_extent(d)
    }

    fn from_extent(max_dist: f32) -> Self {
        // 1.0 / max_dist is one pixel's worth of driving-value range.
        let threshold = if max_dist > 0.0 {
            PIXEL_FRACTION / max_dist
        } else {
            0.0 // degenerate shapes: always regenerate
        };
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Should geometry be rebuilt for a driving value that moved by `delta`?
    pub fn should_regen(&self, delta: f32) -> bool {
        delta >= self.threshold
    }
}
