pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod filter;
pub mod output;
pub mod providers;
pub mod quantity;
pub mod ranking;
pub mod selection;
pub mod taxonomy;
