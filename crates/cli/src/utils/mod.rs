pub mod parser;

pub use parser::{normalize_path_arg, parse_key_value};
