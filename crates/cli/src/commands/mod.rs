//! Command handlers for the Thermo CLI.

pub mod ask;
pub mod calc;
pub mod ingest;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use calc::CalcCommand;
pub use ingest::IngestCommand;
pub use stats::StatsCommand;
