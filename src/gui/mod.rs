//! View state of the editor: panels, overlays and the loop that drives them.

pub mod app;
pub mod events;
pub mod message;
pub mod navigation;
pub mod overlays;
pub mod producer;
pub mod screens;
pub mod state;
pub mod task;
pub mod widgets;

pub use app::App;
pub use message::Message;
pub use state::AppState;
pub use task::Task;
