use tracklane_protocol::ZoomTransform;

/// Default scale-factor extent of one gesture, relative to the baseline.
pub const DEFAULT_SCALE_EXTENT: (f64, f64) = (0.5, 20.0);

/// Accumulates wheel and drag input into a pan/zoom transform.
///
/// The viewer resets the gesture to identity as soon as a transform has been
/// applied, so every transform is relative to the current scale and the
/// extent bounds a single step, not the cumulative zoom.
#[derive(Debug, Clone)]
pub struct ZoomGesture {
    extent: (f64, f64),
    transform: ZoomTransform,
}

impl ZoomGesture {
    pub fn new(extent: (f64, f64)) -> Self {
        let (lo, hi) = if extent.0 <= extent.1 {
            extent
        } else {
            (extent.1, extent.0)
        };
        Self {
            extent: (lo, hi),
            transform: ZoomTransform::identity(),
        }
    }

    pub fn extent(&self) -> (f64, f64) {
        self.extent
    }

    pub fn set_extent(&mut self, extent: (f64, f64)) {
        *self = Self {
            transform: self.transform,
            ..Self::new(extent)
        };
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    /// No gesture in flight.
    pub fn is_idle(&self) -> bool {
        self.transform.is_identity()
    }

    /// Zoom by `factor` keeping pixel `at_px` fixed.
    pub fn wheel(&mut self, at_px: f64, factor: f64) -> ZoomTransform {
        if !factor.is_finite() || factor <= 0.0 {
            return self.transform;
        }
        let t = self.transform;
        let k = (t.k * factor).clamp(self.extent.0, self.extent.1);
        let x = at_px - (at_px - t.x) * (k / t.k);
        self.transform = ZoomTransform::new(x, t.y, k);
        self.transform
    }

    /// Translate by `dx` pixels.
    pub fn drag(&mut self, dx: f64) -> ZoomTransform {
        if dx.is_finite() {
            self.transform.x += dx;
        }
        self.transform
    }

    pub fn reset(&mut self) {
        self.transform = ZoomTransform::identity();
    }
}

impl Default for ZoomGesture {
    fn default() -> Self {
        Self::new(DEFAULT_SCALE_EXTENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_keeps_anchor_fixed() {
        let mut gesture = ZoomGesture::default();
        let t = gesture.wheel(300.0, 2.0);
        assert!((t.k - 2.0).abs() < f64::EPSILON);
        assert!((t.apply_x(300.0) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn wheel_is_clamped_to_extent() {
        let mut gesture = ZoomGesture::default();
        assert!((gesture.wheel(0.0, 100.0).k - 20.0).abs() < f64::EPSILON);
        gesture.reset();
        assert!((gesture.wheel(0.0, 0.01).k - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn reset_returns_to_identity() {
        let mut gesture = ZoomGesture::default();
        gesture.drag(12.0);
        assert!(!gesture.is_idle());
        gesture.reset();
        assert!(gesture.is_idle());
    }

    #[test]
    fn inverted_extent_is_normalized() {
        let gesture = ZoomGesture::new((20.0, 0.5));
        assert_eq!(gesture.extent(), (0.5, 20.0));
    }
}
