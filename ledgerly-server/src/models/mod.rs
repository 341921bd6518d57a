//! Domain models for ledgerly-server.

mod category;
mod client;
mod file;
mod transaction;

pub use category::Category;
pub use client::{Client, NewClient, UpdateClient};
pub use file::{File, NewFile};
pub use transaction::{CategoryPatch, NewTransaction, TransactionWithNames};
