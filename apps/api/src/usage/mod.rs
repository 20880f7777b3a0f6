// Prompt usage records and aggregate statistics.

pub mod handlers;
pub mod store;
