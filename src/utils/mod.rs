//! Utility functions and types

pub mod data_loader;

pub use data_loader::{file_extension, load_csv, load_csv_with_text_columns, load_dataset};
