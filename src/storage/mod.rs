pub mod db;
pub mod error;
pub mod fs;
pub mod kv;
pub mod operations;
pub(crate) mod schema;
