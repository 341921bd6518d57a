pub mod categories;
pub mod clients;
pub mod files;
pub mod health;
pub mod storage;
pub mod transactions;
pub mod webhook;
