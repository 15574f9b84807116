use tracklane_protocol::{LocationView, RegionLimits, ZoomTransform};

/// Linear map from the logical domain onto pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Scale spanning `view` across `[padding, width - padding]`.
    pub fn for_view(view: LocationView, width: f64, padding: f64) -> Self {
        Self::new((view.from, view.to), (padding, width - padding))
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn with_domain(&self, domain: (f64, f64)) -> Self {
        Self::new(domain, self.range)
    }

    /// Logical coordinate → pixel.
    pub fn apply(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0;
        }
        r0 + (x - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Pixel → logical coordinate.
    pub fn invert(&self, px: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return d0;
        }
        d0 + (px - r0) / (r1 - r0) * (d1 - d0)
    }

    /// Pixels per logical unit.
    pub fn pixels_per_unit(&self) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 { 0.0 } else { (r1 - r0) / (d1 - d0) }
    }

    /// The scale whose domain is what this scale shows after `transform` is
    /// applied to pixel space: the range is pushed back through the inverse
    /// transform and then through `invert`.
    pub fn rescale_x(&self, transform: &ZoomTransform) -> Self {
        let (r0, r1) = self.range;
        let d0 = self.invert(transform.invert_x(r0));
        let d1 = self.invert(transform.invert_x(r1));
        self.with_domain((d0, d1))
    }
}

/// Clamp a rescaled domain to the zoom and pan limits: the span is kept in
/// `[min_zoom, max_zoom]` around its center, then shifted inside
/// `[min, max]` when it fits.
pub fn clamp_domain(domain: (f64, f64), limits: &RegionLimits) -> (f64, f64) {
    let (mut d0, mut d1) = domain;
    let span = d1 - d0;
    let clamped_span = span.clamp(limits.min_zoom, limits.max_zoom.max(limits.min_zoom));
    if clamped_span != span {
        let center = (d0 + d1) / 2.0;
        d0 = center - clamped_span / 2.0;
        d1 = center + clamped_span / 2.0;
    }
    if d1 - d0 <= limits.extent() {
        if d0 < limits.min {
            d1 += limits.min - d0;
            d0 = limits.min;
        } else if d1 > limits.max {
            d0 -= d1 - limits.max;
            d1 = limits.max;
        }
    }
    (d0, d1)
}
