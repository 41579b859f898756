pub mod normalizer;
pub mod renderer;

pub use normalizer::normalize;
pub use renderer::{build_rows, render_html, render_json, write_report, OutputFormat, DEFAULT_OUTPUT};
