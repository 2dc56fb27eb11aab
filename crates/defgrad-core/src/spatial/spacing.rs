//! Spacing between adjacent voxels along each image axis.

use super::Vector;

/// Physical distance between adjacent voxels along each axis.
pub type Spacing<const D: usize> = Vector<D>;

impl<const D: usize> Spacing<D> {
    /// Uniform spacing (same value on every axis).
    pub fn uniform(value: f64) -> Self {
        Self::new([value; D])
    }

    /// Spacing of a grid that keeps one sample out of every `factor` along
    /// each axis.
    pub fn coarsened(&self, factor: usize) -> Self {
        *self * factor as f64
    }

    /// Whether every component is finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        (0..D).all(|i| self[i].is_finite() && self[i] > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Spacing3 = Spacing<3>;

    #[test]
    fn test_spacing_uniform() {
        assert_eq!(Spacing3::uniform(1.5), Spacing3::new([1.5, 1.5, 1.5]));
    }

    #[test]
    fn test_spacing_coarsened() {
        let s = Spacing3::new([1.0, 2.0, 0.5]);
        assert_eq!(s.coarsened(4), Spacing3::new([4.0, 8.0, 2.0]));
    }

    #[test]
    fn test_spacing_validity() {
        assert!(Spacing3::new([1.0, 2.0, 3.0]).is_valid());
        assert!(!Spacing3::new([1.0, 0.0, 3.0]).is_valid());
        assert!(!Spacing3::new([1.0, f64::NAN, 3.0]).is_valid());
    }
}
