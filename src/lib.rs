pub mod config;
pub mod error;
pub mod identity;
pub mod gateway;
pub mod cli;
