//! Dispatch snapshots stored as JSON documents.
//!
//! The document mirrors [`DispatchSnapshot`]:
//!
//! ```json
//! {
//!   "cycle_time": 1700000000,
//!   "shops": [{ "id": 1, "location": { "x": 37.61, "y": 55.75 } }],
//!   "couriers": [{ "id": 1, "vehicle_type": 1, "max_order_count": 3, "max_weight": 20000, "max_order_weight": 20000 }],
//!   "orders": [{ "id": 1, "shop_id": 1, "location": { "x": 37.62, "y": 55.76 }, "window": { "from": 0, "to": 1700003600 } }]
//! }
//! ```

use std::{collections::HashSet, fs, io::Read};

use camino::{Utf8Path, Utf8PathBuf};
use courier_core::{DispatchSnapshot, DispatchSource, SourceError, TimeWindow};
use log::{debug, warn};

/// Parse and validate a snapshot from JSON text.
///
/// # Examples
///
/// ```
/// use courier_data::parse_snapshot;
///
/// let snapshot = parse_snapshot(r#"{ "cycle_time": 60 }"#).expect("valid document");
/// assert_eq!(snapshot.cycle_time, 60);
/// assert!(snapshot.is_empty());
/// ```
pub fn parse_snapshot(text: &str) -> Result<DispatchSnapshot, SourceError> {
    let snapshot: DispatchSnapshot =
        serde_json::from_str(text).map_err(|err| SourceError::Malformed {
            message: err.to_string(),
        })?;
    validate(&snapshot)?;
    Ok(snapshot)
}

/// Read and validate a snapshot from any reader.
pub fn read_snapshot<R: Read>(reader: R) -> Result<DispatchSnapshot, SourceError> {
    let snapshot: DispatchSnapshot =
        serde_json::from_reader(reader).map_err(|err| SourceError::Malformed {
            message: err.to_string(),
        })?;
    validate(&snapshot)?;
    Ok(snapshot)
}

fn check_window(window: TimeWindow, owner: &str) -> Result<(), SourceError> {
    TimeWindow::new(window.from, window.to)
        .map(|_| ())
        .map_err(|err| SourceError::Malformed {
            message: format!("{owner}: {err}"),
        })
}

fn validate(snapshot: &DispatchSnapshot) -> Result<(), SourceError> {
    for shop in &snapshot.shops {
        if let Some(hours) = shop.work_hours {
            check_window(hours, &format!("shop {}", shop.id))?;
        }
    }
    for courier in &snapshot.couriers {
        let owner = format!("courier {}", courier.id);
        for window in [courier.work_window, courier.lunch_window].into_iter().flatten() {
            check_window(window, &owner)?;
        }
    }
    let mut seen = HashSet::with_capacity(snapshot.orders.len());
    for order in &snapshot.orders {
        if !seen.insert(order.id) {
            return Err(SourceError::Malformed {
                message: format!("order {} appears more than once", order.id),
            });
        }
        check_window(order.window, &format!("order {}", order.id))?;
        if snapshot.shop(order.shop_id).is_none() {
            warn!("order {} refers to unknown shop {}", order.id, order.shop_id);
        }
    }
    Ok(())
}

/// [`DispatchSource`] reading a JSON snapshot file on every load.
#[derive(Debug, Clone)]
pub struct JsonSnapshotSource {
    path: Utf8PathBuf,
}

impl JsonSnapshotSource {
    /// Source backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl DispatchSource for JsonSnapshotSource {
    fn load(&self) -> Result<DispatchSnapshot, SourceError> {
        let text = fs::read_to_string(&self.path).map_err(|err| SourceError::Unavailable {
            message: format!("{}: {err}", self.path),
        })?;
        let snapshot = parse_snapshot(&text).map_err(|err| match err {
            SourceError::Malformed { message } => SourceError::Malformed {
                message: format!("{}: {message}", self.path),
            },
            other => other,
        })?;
        debug!(
            "loaded {} orders, {} couriers and {} shops from {}",
            snapshot.orders.len(),
            snapshot.couriers.len(),
            snapshot.shops.len(),
            self.path
        );
        Ok(snapshot)
    }
}
