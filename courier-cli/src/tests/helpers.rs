//! Test helpers for writing snapshots into temporary workspaces.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// One shop, one bound courier carrying two orders, three nearby orders.
pub(super) const SNAPSHOT: &str = r#"{
  "cycle_time": 1700000000,
  "shops": [{ "id": 1, "location": { "x": 37.6050, "y": 55.7500 } }],
  "couriers": [{
    "id": 1, "vehicle_type": 1, "shop_id": 1,
    "max_order_count": 2, "max_weight": 10000, "max_order_weight": 5000,
    "hand_in_time": 120, "get_order_time": 300
  }],
  "orders": [
    { "id": 1, "shop_id": 1, "weight": 1000, "location": { "x": 37.6050, "y": 55.7520 }, "window": { "from": 1700000000, "to": 1700010800 } },
    { "id": 2, "shop_id": 1, "weight": 2000, "location": { "x": 37.6100, "y": 55.7510 }, "window": { "from": 1700000000, "to": 1700010800 } },
    { "id": 3, "shop_id": 1, "weight": 1500, "location": { "x": 37.6000, "y": 55.7550 }, "window": { "from": 1700000000, "to": 1700010800 } }
  ]
}"#;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write test file");
}

/// Temporary directory holding the snapshot and report of one test.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root =
            Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn snapshot(&self) -> Utf8PathBuf {
        let path = self.path("snapshot.json");
        write_utf8(&path, SNAPSHOT.as_bytes());
        path
    }
}
