pub mod pilot;
pub mod presenter;

pub use pilot::{PatrolPilot, Shot};
pub use presenter::{ConsolePresenter, Flow};
