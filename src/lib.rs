pub mod config;
pub mod ingest;
pub mod manager;
pub mod projector;
pub mod render;
pub mod select;
pub mod track;
pub mod types;
pub mod util;
