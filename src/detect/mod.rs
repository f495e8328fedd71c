//! Framework signal detection.
//!
//! Rules read one file's [`FileFacts`](crate::analysis::FileFacts) plus its
//! raw text and produce technologies, HTTP routes and database tables. They
//! never look at other files.

pub mod routes;
mod runner;
pub mod schema;
pub mod tech;
mod text;
mod types;

pub use runner::detect_file;
pub use types::{ApiEndpoint, Column, DatabaseTable, FileSignals, HttpMethod};
