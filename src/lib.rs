//! doc-directives library: reads structured directives from documentation comments, checks
//! them against attribute contracts and generates code from them.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod server;
