pub mod criteria;
pub mod error;
pub mod extract;
pub mod format;
#[cfg(feature = "network")]
pub mod library;
pub mod parse;
pub mod query;
pub mod record;
pub mod store;

pub use criteria::{Bound, Criterion, DateBound, SortDimension, SortDirection, SortKey};
pub use error::OmError;
pub use query::{Query, QueryMatch};
pub use record::ModelRecord;
pub use store::{DirStore, RecordSource};
