//! Infrastructure layer: DB, config, external services.

pub mod config;
pub mod db;
pub mod external;
