pub mod analyzers;
pub mod config;
pub mod enrich;
pub mod error;
pub mod importer;
pub mod output;
pub mod pipeline;
pub mod record;
