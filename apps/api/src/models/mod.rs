pub mod project;
pub mod usage;
