//! Great-circle distances between orders.

use geo::Coord;

/// Mean Earth radius in metres.
const EARTH_RADIUS_METRES: f64 = 6_371_008.8;

/// Haversine distance in metres between two WGS84 coordinates.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "great-circle distance is inherently floating-point"
)]
pub fn haversine_metres(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let lat_a = a.y.to_radians();
    let lat_b = b.y.to_radians();
    let d_lat = (b.y - a.y).to_radians();
    let d_lon = (b.x - a.x).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METRES * h.sqrt().min(1.0).asin()
}

/// Symmetric matrix of rounded great-circle distances between orders.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use courier_core::DistanceMatrix;
///
/// let matrix = DistanceMatrix::from_locations(&[
///     Coord { x: 0.0, y: 0.0 },
///     Coord { x: 0.0, y: 0.01 },
/// ]);
/// let metres = matrix.get(0, 1).expect("pair exists");
/// assert!((1_100..1_120).contains(&metres));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DistanceMatrix {
    len: usize,
    metres: Vec<u32>,
}

impl DistanceMatrix {
    /// Compute pairwise distances for `locations`.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "distances are clamped to the u32 range before the cast"
    )]
    pub fn from_locations(locations: &[Coord<f64>]) -> Self {
        let len = locations.len();
        let metres = locations
            .iter()
            .flat_map(|a| locations.iter().map(move |b| (*a, *b)))
            .map(|(a, b)| {
                haversine_metres(a, b)
                    .round()
                    .clamp(0.0, f64::from(u32::MAX)) as u32
            })
            .collect();
        Self { len, metres }
    }

    /// Number of locations covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the matrix covers no locations.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Distance in metres between locations `a` and `b`.
    #[must_use]
    pub fn get(&self, a: usize, b: usize) -> Option<u32> {
        if a >= self.len || b >= self.len {
            return None;
        }
        self.metres
            .get(a.saturating_mul(self.len).saturating_add(b))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn diagonal_is_zero_and_matrix_is_symmetric() {
        let matrix = DistanceMatrix::from_locations(&[
            Coord { x: 37.60, y: 55.75 },
            Coord { x: 37.62, y: 55.76 },
            Coord { x: 37.58, y: 55.70 },
        ]);
        assert_eq!(matrix.len(), 3);
        for a in 0..3 {
            assert_eq!(matrix.get(a, a), Some(0));
            for b in 0..3 {
                assert_eq!(matrix.get(a, b), matrix.get(b, a));
            }
        }
        assert_eq!(matrix.get(3, 0), None);
    }
}
