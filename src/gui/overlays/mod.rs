//! Short-lived overlays layered above the active panel.

mod context_menu;
mod modal;

pub use context_menu::{
    ContextMenu, ContextMenuItem, ContextMenuManager, ContextMenuMessage, MenuAction, MenuTarget,
};
pub use modal::{DeleteTarget, Modal, ModalKind, ModalManager, ModalMessage, ModalOutcome, OpenModal};
