//! Cell types: addresses, values, and sparse paged storage

mod address;
mod store;
mod value;

pub use address::CellAddress;
pub use store::{CellStore, Enumerate};
pub use value::{CellError, CellValue, SharedString};
