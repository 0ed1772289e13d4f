pub mod formatter;

pub use formatter::{format_buildozer, format_generators, format_resolutions};
