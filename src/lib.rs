#![forbid(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod formats;
pub mod logging;
pub mod metadata;
pub mod normalize;
pub mod pipeline;
pub mod rewrite;
pub mod search;
