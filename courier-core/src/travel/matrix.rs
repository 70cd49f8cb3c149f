//! Directed travel matrix between orders and their shop.

use super::error::TravelMatrixError;

/// Distance and duration of one directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    /// Distance in metres.
    pub distance: u32,
    /// Duration in seconds.
    pub duration: u32,
}

impl Leg {
    /// Construct a leg from metres and seconds.
    #[must_use]
    pub const fn new(distance: u32, duration: u32) -> Self {
        Self { distance, duration }
    }
}

/// Square matrix of [`Leg`]s for `n` orders plus the shop.
///
/// Nodes `0..n` are orders in the order they were requested; node `n` is the
/// shop. Lookups are directed: `leg(a, b)` may differ from `leg(b, a)`.
///
/// # Examples
///
/// ```
/// use courier_core::{Leg, TravelMatrix};
///
/// let matrix = TravelMatrix::from_fn(2, |from, to| {
///     if from == to { Leg::default() } else { Leg::new(100, 60) }
/// });
/// assert_eq!(matrix.order_count(), 2);
/// assert_eq!(matrix.shop_node(), 2);
/// assert_eq!(matrix.leg(2, 0), Some(Leg::new(100, 60)));
/// assert_eq!(matrix.leg(3, 0), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TravelMatrix {
    nodes: usize,
    legs: Vec<Leg>,
}

impl TravelMatrix {
    /// Build a matrix for `order_count` orders by evaluating `leg` for every
    /// ordered node pair, the shop included.
    pub fn from_fn<F>(order_count: usize, mut leg: F) -> Self
    where
        F: FnMut(usize, usize) -> Leg,
    {
        let nodes = order_count.saturating_add(1);
        let legs = (0..nodes)
            .flat_map(|from| (0..nodes).map(move |to| (from, to)))
            .map(|(from, to)| leg(from, to))
            .collect();
        Self { nodes, legs }
    }

    /// Build a matrix from rows, validating that it is square and non-empty.
    ///
    /// The last row and column belong to the shop.
    pub fn from_rows(rows: Vec<Vec<Leg>>) -> Result<Self, TravelMatrixError> {
        let nodes = rows.len();
        if nodes < 2 {
            return Err(TravelMatrixError::EmptyInput);
        }
        if let Some(row) = rows.iter().find(|row| row.len() != nodes) {
            return Err(TravelMatrixError::DimensionMismatch {
                expected: nodes,
                found: row.len(),
            });
        }
        Ok(Self {
            nodes,
            legs: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of order nodes.
    #[must_use]
    pub const fn order_count(&self) -> usize {
        self.nodes.saturating_sub(1)
    }

    /// Index of the shop node.
    #[must_use]
    pub const fn shop_node(&self) -> usize {
        self.order_count()
    }

    /// Directed leg from node `from` to node `to`, if both exist.
    #[must_use]
    pub fn leg(&self, from: usize, to: usize) -> Option<Leg> {
        if from >= self.nodes || to >= self.nodes {
            return None;
        }
        self.legs
            .get(from.saturating_mul(self.nodes).saturating_add(to))
            .copied()
    }

    /// Fail unless the matrix covers exactly `order_count` orders.
    pub const fn ensure_covers(&self, order_count: usize) -> Result<(), TravelMatrixError> {
        if self.order_count() == order_count && self.nodes > 1 {
            Ok(())
        } else {
            Err(TravelMatrixError::DimensionMismatch {
                expected: order_count.saturating_add(1),
                found: self.nodes,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn from_rows_rejects_jagged_input() {
        let rows = vec![vec![Leg::default(); 2], vec![Leg::default(); 1]];
        let err = TravelMatrix::from_rows(rows).expect_err("jagged matrix");
        assert_eq!(
            err,
            TravelMatrixError::DimensionMismatch {
                expected: 2,
                found: 1
            }
        );
    }

    #[rstest]
    fn from_rows_rejects_shop_only_matrix() {
        let err = TravelMatrix::from_rows(vec![vec![Leg::default()]]).expect_err("no orders");
        assert_eq!(err, TravelMatrixError::EmptyInput);
    }

    #[rstest]
    fn lookups_are_directed() {
        let rows = vec![
            vec![Leg::new(0, 0), Leg::new(10, 1)],
            vec![Leg::new(20, 2), Leg::new(0, 0)],
        ];
        let matrix = TravelMatrix::from_rows(rows).expect("square matrix");
        assert_eq!(matrix.leg(0, 1), Some(Leg::new(10, 1)));
        assert_eq!(matrix.leg(1, 0), Some(Leg::new(20, 2)));
    }

    #[rstest]
    fn ensure_covers_reports_expected_nodes() {
        let matrix = TravelMatrix::from_fn(3, |_, _| Leg::default());
        assert!(matrix.ensure_covers(3).is_ok());
        let err = matrix.ensure_covers(4).expect_err("mismatch");
        assert_eq!(
            err,
            TravelMatrixError::DimensionMismatch {
                expected: 5,
                found: 4
            }
        );
    }
}
