//! Services for loading, filtering and aggregating records

pub mod aggregator;
pub mod data_loader;
pub mod filter;
pub mod format;
pub mod remote;
pub mod session;

pub use aggregator::Aggregator;
pub use data_loader::{DataLoaderService, IngestSource, LoadResult};
pub use filter::filter_records;
pub use format::{
    format_amount, format_number, format_percentage_bar, pad_width, truncate_width,
};
pub use remote::{DateRange, RemoteClient};
pub use session::{Session, Status};
