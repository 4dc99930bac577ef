//! sepolgraph-import: CSV importer for the SELinux policy graph.
//!
//! Reads subjects, objects, classes and relationships from CSV files and
//! upserts them into a [`PolicyStore`](sepolgraph_graph::PolicyStore) in
//! dependency order.

pub mod csv_reader;
pub mod error;
pub mod loader;
pub mod records;
pub mod report;

pub use csv_reader::{read_records, Field, Record};
pub use error::{CsvError, ImportError};
pub use loader::PolicyLoader;
pub use report::ImportReport;
