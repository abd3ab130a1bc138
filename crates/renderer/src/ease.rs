use std::fmt;

/// Y component of a two-control-point cubic bezier, driven directly by `t`.
///
/// This skips the inverse solve for X, so `t` is treated as the curve
/// parameter rather than as elapsed time along X. Endpoints are exact.
pub fn cubic_bezier(t: f32, p1x: f32, p1y: f32, p2x: f32, p2y: f32) -> f32 {
    CubicBezier::new(p1x, p1y, p2x, p2y).sample(t)
}

/// Control points of a CSS-style `cubic-bezier()` easing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p1x: f32,
    pub p1y: f32,
    pub p2x: f32,
    pub p2y: f32,
}

impl CubicBezier {
    /// Easing shared by the wave fade-in and the landing element fades.
    pub const WAVE: CubicBezier = CubicBezier::new(0.44, 0.17, 0.76, 0.47);

    pub const fn new(p1x: f32, p1y: f32, p2x: f32, p2y: f32) -> Self {
        Self { p1x, p1y, p2x, p2y }
    }

    pub fn sample(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        let cy = 3.0 * self.p1y;
        let by = 3.0 * (self.p2y - self.p1y) - cy;
        let ay = 1.0 - cy - by;

        let t2 = t * t;
        let t3 = t2 * t;
        ay * t3 + by * t2 + cy * t
    }
}

impl fmt::Display for CubicBezier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cubic-bezier({}, {}, {}, {})",
            self.p1x, self.p1y, self.p2x, self.p2y
        )
    }
}
