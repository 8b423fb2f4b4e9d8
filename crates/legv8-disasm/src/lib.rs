pub mod analyze;
pub mod model;

// Re-export commonly used types/functions for the CLI
pub use analyze::{analyze_program, Analysis, Edge, EdgeKind, EdgeOut};
pub use model::{build_report, load_source, DataOut, InsnOut, LabelKV, Report};
