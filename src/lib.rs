pub mod core;
pub mod gui;

pub use crate::core::backend::{Backend, Command, ErrorDescriptor, ErrorKind, RawResponse, Response};
pub use crate::core::config::Config;
pub use crate::core::domain::{DomainError, DomainManager, DomainResult};
pub use crate::core::logging::init_logging;
pub use crate::gui::{App, AppState, Message};
