pub mod config;
pub mod error;
pub mod i18n;
pub mod retry;
pub mod run;
pub mod server;
pub mod speech;
pub mod translation;
pub mod usage;
