mod records;
mod store;

pub use records::*;
pub use store::*;
