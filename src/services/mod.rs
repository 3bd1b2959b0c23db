//! Services for loading and aggregating contract data

pub mod aggregator;
pub mod data_loader;
pub mod period;
pub mod schema;
pub mod store;

pub use aggregator::{Aggregator, GroupKey, Grouping};
pub use data_loader::{DataLoaderService, DataSource, LoadOptions, LoadResult};
pub use store::{ContractStore, RecordFilter};
