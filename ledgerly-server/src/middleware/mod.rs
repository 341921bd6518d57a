pub mod accountant;

pub use accountant::AccountantId;
