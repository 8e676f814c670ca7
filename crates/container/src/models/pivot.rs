/// Normalised anchor point of an image.
///
/// `x` is measured from the left edge, `y` from the **bottom** edge; both are
/// nominally within `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivot {
    pub x: f32,
    pub y: f32,
}

impl Default for Pivot {
    /// Centre of the image, used whenever the header carries no pivot.
    fn default() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

impl Pivot {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Integer pixel offset that puts a pivot at the logical origin.
///
/// Always derived from the `(pivot, width, height)` triple that produced it,
/// see [`Placement::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Placement {
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Placement {
    /// Compute the compositing offset for an image of `width` x `height`.
    ///
    /// Drawing the image with its top-left corner at `(offset_x, offset_y)`
    /// places the pivot pixel (`pivot.x * width`, `height - pivot.y * height`)
    /// exactly on `(0, 0)`. A non-finite pivot falls back to the centre.
    pub fn new(width: u32, height: u32, pivot: Pivot) -> Self {
        let pivot = if pivot.is_finite() { pivot } else { Pivot::default() };
        let w = f64::from(width);
        let h = f64::from(height);
        let offset_x = (-f64::from(pivot.x) * w).round();
        let offset_y = ((f64::from(pivot.y) - 1.0) * h).round();
        Self {
            // Pivots are normalised, so the offsets stay within +/- one image size.
            offset_x: offset_x.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32,
            offset_y: offset_y.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0, 64, 32, 0, -32)]
    #[case(1.0, 1.0, 64, 32, -64, 0)]
    #[case(0.5, 0.5, 64, 32, -32, -16)]
    #[case(0.25, 0.0, 100, 40, -25, -40)]
    fn computes_offsets(
        #[case] x: f32,
        #[case] y: f32,
        #[case] w: u32,
        #[case] h: u32,
        #[case] ox: i32,
        #[case] oy: i32,
    ) {
        let placement = Placement::new(w, h, Pivot::new(x, y));
        assert_eq!(placement, Placement { offset_x: ox, offset_y: oy });
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(1.0, 1.0)]
    #[case(0.5, 0.25)]
    #[case(0.125, 0.875)]
    fn pivot_lands_on_origin(#[case] x: f32, #[case] y: f32) {
        let (w, h) = (128u32, 64u32);
        let placement = Placement::new(w, h, Pivot::new(x, y));
        let pivot_px_x = f64::from(x) * f64::from(w);
        let pivot_px_y = f64::from(h) - f64::from(y) * f64::from(h);
        assert_eq!(f64::from(placement.offset_x) + pivot_px_x, 0.0);
        assert_eq!(f64::from(placement.offset_y) + pivot_px_y, 0.0);
    }

    #[test]
    fn non_finite_pivot_uses_centre() {
        let placement = Placement::new(10, 20, Pivot::new(f32::NAN, 0.0));
        assert_eq!(placement, Placement::new(10, 20, Pivot::default()));
    }
}
