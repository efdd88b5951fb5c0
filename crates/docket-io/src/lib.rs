//! docket-io - CSV input and output for docket
//!
//! - [`read_table`] loads a court-record CSV into a [`RecordTable`](docket_core::RecordTable)
//! - the `write_*` functions emit the annotated table, the contingency table,
//!   the epsilon sweep, cluster summaries and frequency counts

pub mod reader;
pub mod writer;

pub use reader::*;
pub use writer::*;
