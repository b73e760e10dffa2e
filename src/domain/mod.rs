pub mod error;

// Tabular cleaning model
pub mod table;
