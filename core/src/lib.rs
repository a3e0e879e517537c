pub mod archiver;
pub mod batcher;
pub mod config;
pub mod errors;
pub mod filter;
pub mod recorder;
pub mod sink;
pub mod source;
pub mod telemetry;
