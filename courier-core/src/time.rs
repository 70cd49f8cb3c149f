//! Timestamps and closed time windows.

use thiserror::Error;

/// Seconds since the Unix epoch.
pub type Timestamp = i64;

/// A closed interval `[from, to]` of timestamps.
///
/// # Examples
/// ```
/// use courier_core::TimeWindow;
///
/// # fn main() -> Result<(), courier_core::TimeWindowError> {
/// let window = TimeWindow::new(100, 200)?;
/// assert!(window.contains(150));
/// assert!(!window.contains(201));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeWindow {
    /// Earliest admissible timestamp.
    pub from: Timestamp,
    /// Latest admissible timestamp.
    pub to: Timestamp,
}

/// Errors returned by [`TimeWindow::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeWindowError {
    /// The window closes before it opens.
    #[error("time window ends at {to} before it starts at {from}")]
    Inverted {
        /// Requested start.
        from: Timestamp,
        /// Requested end.
        to: Timestamp,
    },
}

impl TimeWindow {
    /// Validates and constructs a [`TimeWindow`].
    pub const fn new(from: Timestamp, to: Timestamp) -> Result<Self, TimeWindowError> {
        if to < from {
            return Err(TimeWindowError::Inverted { from, to });
        }
        Ok(Self { from, to })
    }

    /// A window admitting every timestamp.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            from: Timestamp::MIN,
            to: Timestamp::MAX,
        }
    }

    /// Whether `at` lies inside the window, bounds included.
    #[must_use]
    pub const fn contains(&self, at: Timestamp) -> bool {
        self.from <= at && at <= self.to
    }

    /// Whether the window shares at least one instant with `[start, end]`.
    #[must_use]
    pub const fn overlaps(&self, start: Timestamp, end: Timestamp) -> bool {
        self.from <= end && start <= self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn rejects_inverted_window() {
        let err = TimeWindow::new(10, 5).expect_err("inverted window");
        assert_eq!(err, TimeWindowError::Inverted { from: 10, to: 5 });
    }

    #[rstest]
    #[case(0, 10, true)]
    #[case(10, 20, true)]
    #[case(21, 30, false)]
    #[case(-5, -1, false)]
    fn overlap_includes_touching_bounds(
        #[case] start: Timestamp,
        #[case] end: Timestamp,
        #[case] expected: bool,
    ) {
        let window = TimeWindow::new(0, 20).expect("valid window");
        assert_eq!(window.overlaps(start, end), expected);
    }
}
