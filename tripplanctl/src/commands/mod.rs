pub mod completions;
pub mod demo;
pub mod plan;
pub mod sweep;
