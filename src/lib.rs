pub mod analyzers;
pub mod cache;
pub mod config;
pub mod dates;
pub mod events;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod report;
pub mod selection;
