pub mod clean_table;
pub mod column_filter;
pub mod date_normalizer;
pub mod deduplicator;
pub mod field_transform;
pub mod field_validator;
pub mod type_normalizer;
