pub mod error;
pub mod probes;
pub mod processes;
pub mod snapshot_service;
pub mod types;
