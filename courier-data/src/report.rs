//! JSON output for dispatch results.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
};

use camino::Utf8Path;
use courier_core::{Delivery, DeliverySink, RejectedOrder, SinkError};
use log::debug;
use serde::{Deserialize, Serialize};

/// Everything a dispatch cycle produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Candidate deliveries.
    pub deliveries: Vec<Delivery>,
    /// Orders that could not be planned.
    pub rejected: Vec<RejectedOrder>,
}

/// [`DeliverySink`] that buffers results and writes one JSON document on
/// [`DeliverySink::finish`].
///
/// # Examples
///
/// ```
/// use courier_core::{DeliverySink, RejectedOrder};
/// use courier_data::JsonReportSink;
///
/// # fn main() -> Result<(), courier_core::SinkError> {
/// let mut sink = JsonReportSink::new(Vec::new());
/// sink.reject(&[RejectedOrder { order_id: 7, reason: "no courier".to_owned() }])?;
/// sink.finish()?;
/// let text = String::from_utf8(sink.into_inner()).expect("utf-8");
/// assert!(text.contains("\"order_id\": 7"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct JsonReportSink<W: Write> {
    writer: W,
    report: DispatchReport,
}

impl JsonReportSink<BufWriter<File>> {
    /// Sink writing to a new file at `path`, truncating any existing one.
    pub fn create(path: &Utf8Path) -> Result<Self, SinkError> {
        let file = File::create(path).map_err(SinkError::Io)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonReportSink<W> {
    /// Sink writing to `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            report: DispatchReport {
                deliveries: Vec::new(),
                rejected: Vec::new(),
            },
        }
    }

    /// Results buffered so far.
    #[must_use]
    pub const fn report(&self) -> &DispatchReport {
        &self.report
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DeliverySink for JsonReportSink<W> {
    fn accept(&mut self, deliveries: &[Delivery]) -> Result<(), SinkError> {
        self.report.deliveries.extend_from_slice(deliveries);
        Ok(())
    }

    fn reject(&mut self, orders: &[RejectedOrder]) -> Result<(), SinkError> {
        self.report.rejected.extend_from_slice(orders);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        serde_json::to_writer_pretty(&mut self.writer, &self.report).map_err(|err| {
            if err.is_io() {
                SinkError::Io(io::Error::other(err))
            } else {
                SinkError::Encode {
                    message: err.to_string(),
                }
            }
        })?;
        self.writer.write_all(b"\n").map_err(SinkError::Io)?;
        self.writer.flush().map_err(SinkError::Io)?;
        debug!(
            "wrote {} deliveries and {} rejected orders",
            self.report.deliveries.len(),
            self.report.rejected.len()
        );
        Ok(())
    }
}
