mod load;
mod parse;
mod record;

pub use load::{DEFAULT_MAX_RECORDS, load_dataset};
pub use record::{Dataset, Record, RecordId};
