pub mod record_reader;

pub use record_reader::{normalize_column, RawTable, RecordReader};
