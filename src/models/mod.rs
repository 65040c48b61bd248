pub mod marker;
pub mod record;

pub use marker::{MapView, MarkerDescriptor, PopupFields, ViewOutcome};
pub use record::{CustomerRecord, CustomerRecordBuilder, Dataset, RawRecord};
