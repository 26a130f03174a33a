pub mod action;
pub mod command;
pub mod selection;

pub use action::{Action, AlertAction, InspectRequest, NavigateTarget, NotifyLevel};
pub use command::{parse_command, Command};
pub use selection::SelectionState;
