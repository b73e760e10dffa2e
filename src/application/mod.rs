pub mod use_cases;

pub use use_cases::clean_table::CleanTableUseCase;
