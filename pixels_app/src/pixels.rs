//! Random pixel scatter drawn by the `random_pixels` demo

use rand::Rng;

/// A fixed set of single-pixel points sharing one RGB color
#[derive(Debug, Clone)]
pub struct PixelScatter {
    points: Vec<(i32, i32)>,
    color: [u8; 3],
}

impl PixelScatter {
    /// Scatter `count` red pixels uniformly over a `size.0` x `size.1` area
    pub fn random(count: usize, size: (u32, u32), rng: &mut impl Rng) -> Self {
        let width = i32::try_from(size.0).unwrap_or(i32::MAX).max(1);
        let height = i32::try_from(size.1).unwrap_or(i32::MAX).max(1);

        let points = (0..count)
            .map(|_| (rng.gen_range(0..width), rng.gen_range(0..height)))
            .collect();

        Self {
            points,
            color: [255, 0, 0],
        }
    }

    /// Pixel coordinates, origin top-left
    pub fn points(&self) -> &[(i32, i32)] {
        &self.points
    }

    /// RGB color of every pixel
    pub const fn color(&self) -> &[u8; 3] {
        &self.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_scatter_stays_inside_area() {
        let mut rng = StdRng::seed_from_u64(7);
        let scatter = PixelScatter::random(500, (800, 600), &mut rng);

        assert_eq!(scatter.points().len(), 500);
        assert!(scatter
            .points()
            .iter()
            .all(|&(x, y)| (0..800).contains(&x) && (0..600).contains(&y)));
    }

    #[test]
    fn test_scatter_is_red() {
        let mut rng = StdRng::seed_from_u64(1);
        let scatter = PixelScatter::random(3, (10, 10), &mut rng);
        assert_eq!(scatter.color(), &[255, 0, 0]);
    }

    #[test]
    fn test_zero_area_collapses_to_origin() {
        let mut rng = StdRng::seed_from_u64(3);
        let scatter = PixelScatter::random(4, (0, 0), &mut rng);
        assert!(scatter.points().iter().all(|&p| p == (0, 0)));
    }
}
