pub mod application;
pub mod infrastructure;

pub use application::{ConsolePresenter, Flow, PatrolPilot};
pub use infrastructure::{CliError, LogConfig, Result};
