pub mod archive;
pub mod combin;
pub mod filters;
pub mod grid;
pub mod metrics;
pub mod scoring;
pub mod search;
pub mod ticket;
