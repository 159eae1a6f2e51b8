pub mod catalog;
pub mod cli;
pub mod config;
pub mod prefs;
pub mod query;
pub mod selector;
pub mod session;
pub mod source;

pub type RepertoireError = anyhow::Error;
