pub mod config;
pub mod tabular;
