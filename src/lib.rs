#![forbid(unsafe_code)]

pub mod book;
pub mod cli;
pub mod crawl;
pub mod error;
pub mod export;
pub mod extract;
pub mod formats;
pub mod http;
pub mod logging;
pub mod schedule;
