mod date_format;
mod resolver;
mod token;

pub use date_format::*;
pub use resolver::*;
pub use token::*;
