pub mod classifier;
pub mod database;
pub mod ingest;
pub mod metrics;
pub mod storage;
pub mod summary;

pub use classifier::ClassifierClient;
pub use database::Database;
pub use storage::StorageClient;
