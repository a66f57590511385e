mod address;
mod engine;

pub use address::*;
pub use engine::*;
