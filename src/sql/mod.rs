//! Schema introspection from SQL DDL dumps.

mod dialect;
mod lexer;
mod parser;
mod types;

pub use dialect::Dialect;
pub use lexer::Token;
pub use parser::{SqlParseError, parse_sql};
pub use types::normalize_type;
