pub mod app;
pub mod cli;
pub mod config;
pub mod kubernetes;
pub mod selection;
pub mod terminal;
pub mod ui;

pub use app::{Iexec, IexecConfig, IexecError, Target};
pub use config::Settings;
