//! Top-level panels shown in the main content area.
//!
//! Each panel is a node of the navigation state machine. The
//! [`NavigationManager`](crate::gui::navigation::NavigationManager) owns every
//! instance and is the only caller of `activate` and `clean_up`.

pub mod entry_editor;
pub mod home;
pub mod search;
pub mod settings;

use std::fmt;

use crate::core::domain::{DomainError, EntryId, ErrorClass};
use crate::gui::{AppState, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Home,
    Settings,
    Search,
    EntryEditor,
}

/// Snapshot used to decide whether a requested panel is already showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelDetails {
    pub kind: PanelKind,
    pub entry: Option<EntryId>,
}

/// Identifies one foreground period of one panel.
///
/// Results of work started during an activation carry its token; once the
/// panel is cleaned up the token is dead and late results are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Activation(pub(crate) u64);

/// Where an entry editor was opened from, and so where it returns to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    #[default]
    Home,
    Search,
}

pub enum PanelMessage<P: Panel> {
    Panel(P::Message),
    Parent(P::ParentMessage),
}

impl<P: Panel> fmt::Debug for PanelMessage<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelMessage::Panel(message) => f.debug_tuple("Panel").field(message).finish(),
            PanelMessage::Parent(message) => f.debug_tuple("Parent").field(message).finish(),
        }
    }
}

pub trait Panel: Sized {
    type Message: fmt::Debug + 'static;
    type ParentMessage: fmt::Debug + 'static;

    fn kind(&self) -> PanelKind;
    fn details(&self) -> PanelDetails;

    /// Called each time the panel comes to the foreground.
    fn activate(&mut self, state: &AppState) -> Task<PanelMessage<Self>>;

    /// Called when the panel is replaced. Must be idempotent.
    fn clean_up(&mut self);

    fn update(&mut self, message: Self::Message, state: &mut AppState)
    -> Task<PanelMessage<Self>>;
}

/// Log a failure that is not shown inline.
pub(crate) fn log_failure(context: &'static str, error: &DomainError) {
    match error.class() {
        ErrorClass::Validation => tracing::debug!(context, %error, "validation failure"),
        ErrorClass::NotFound => tracing::warn!(context, %error, "entity not found"),
        ErrorClass::Fatal | ErrorClass::Unknown => tracing::error!(context, %error, "backend call failed"),
    }
}

/// First backend message of a validation failure, for inline display.
pub(crate) fn inline_message(error: &DomainError, fallback: &str) -> String {
    error
        .descriptors()
        .iter()
        .find_map(|descriptor| descriptor.msg.clone())
        .unwrap_or_else(|| fallback.to_string())
}
