use std::rc::Rc;

use crate::core::domain::{EntryId, FolderId, ROOT_FOLDER_ID};
use crate::gui::events::{EventBus, ViewEvent};

/// What the menu was opened on.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuTarget {
    Root,
    Folder { folder_id: FolderId, name: String },
    Entry { entry_id: EntryId, title: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuAction {
    OpenEntry(EntryId),
    NewEntry { folder_id: FolderId },
    NewFolder { parent_id: FolderId },
    RenameFolder { folder_id: FolderId, name: String },
    DeleteFolder { folder_id: FolderId, name: String },
    DeleteEntry { entry_id: EntryId, title: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenuItem {
    pub label: &'static str,
    pub action: MenuAction,
}

impl ContextMenuItem {
    fn new(label: &'static str, action: MenuAction) -> Self {
        Self { label, action }
    }
}

fn items_for(target: &MenuTarget) -> Vec<ContextMenuItem> {
    match target {
        MenuTarget::Root => vec![
            ContextMenuItem::new(
                "New entry",
                MenuAction::NewEntry {
                    folder_id: ROOT_FOLDER_ID,
                },
            ),
            ContextMenuItem::new(
                "New folder",
                MenuAction::NewFolder {
                    parent_id: ROOT_FOLDER_ID,
                },
            ),
        ],
        MenuTarget::Folder { folder_id, name } => vec![
            ContextMenuItem::new(
                "New entry",
                MenuAction::NewEntry {
                    folder_id: *folder_id,
                },
            ),
            ContextMenuItem::new(
                "New folder",
                MenuAction::NewFolder {
                    parent_id: *folder_id,
                },
            ),
            ContextMenuItem::new(
                "Rename",
                MenuAction::RenameFolder {
                    folder_id: *folder_id,
                    name: name.clone(),
                },
            ),
            ContextMenuItem::new(
                "Delete",
                MenuAction::DeleteFolder {
                    folder_id: *folder_id,
                    name: name.clone(),
                },
            ),
        ],
        MenuTarget::Entry { entry_id, title } => vec![
            ContextMenuItem::new("Open", MenuAction::OpenEntry(*entry_id)),
            ContextMenuItem::new(
                "Delete",
                MenuAction::DeleteEntry {
                    entry_id: *entry_id,
                    title: title.clone(),
                },
            ),
        ],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub x: f32,
    pub y: f32,
    pub target: MenuTarget,
    pub items: Vec<ContextMenuItem>,
    pub selected_index: Option<usize>,
}

#[derive(Debug, Clone)]
pub enum ContextMenuMessage {
    Open { x: f32, y: f32, target: MenuTarget },
    /// Pointer moved over an item, or off all items.
    Hover(Option<usize>),
    SelectNext,
    SelectPrevious,
    /// Click on an item, or Enter on the highlighted one when `None`.
    Confirm(Option<usize>),
    /// Escape or a click outside the menu.
    Dismiss,
}

#[derive(Debug)]
pub struct ContextMenuManager {
    current: Option<ContextMenu>,
    bus: Rc<EventBus>,
}

impl ContextMenuManager {
    pub fn new(bus: Rc<EventBus>) -> Self {
        Self { current: None, bus }
    }

    pub fn current(&self) -> Option<&ContextMenu> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn open(&mut self, x: f32, y: f32, target: MenuTarget) {
        let items = items_for(&target);
        self.current = Some(ContextMenu {
            x,
            y,
            target,
            items,
            selected_index: None,
        });
        self.bus.produce(ViewEvent::ContextMenuOpened { x, y });
    }

    pub fn close(&mut self) -> bool {
        let was_open = self.current.take().is_some();
        if was_open {
            self.bus.produce(ViewEvent::ContextMenuClosed);
        }
        was_open
    }

    /// Apply `message`; a confirmed item's action is returned and the menu closes.
    pub fn update(&mut self, message: ContextMenuMessage) -> Option<MenuAction> {
        match message {
            ContextMenuMessage::Open { x, y, target } => {
                self.open(x, y, target);
                None
            }
            ContextMenuMessage::Dismiss => {
                self.close();
                None
            }
            ContextMenuMessage::Hover(index) => {
                let menu = self.current.as_mut()?;
                menu.selected_index = index.filter(|index| *index < menu.items.len());
                None
            }
            ContextMenuMessage::SelectNext => {
                let menu = self.current.as_mut()?;
                let count = menu.items.len();
                if count > 0 {
                    menu.selected_index = Some(match menu.selected_index {
                        Some(index) => (index + 1) % count,
                        None => 0,
                    });
                }
                None
            }
            ContextMenuMessage::SelectPrevious => {
                let menu = self.current.as_mut()?;
                let count = menu.items.len();
                if count > 0 {
                    menu.selected_index = Some(match menu.selected_index {
                        Some(0) | None => count - 1,
                        Some(index) => index - 1,
                    });
                }
                None
            }
            ContextMenuMessage::Confirm(index) => {
                let menu = self.current.as_ref()?;
                let action = index
                    .or(menu.selected_index)
                    .and_then(|index| menu.items.get(index))
                    .map(|item| item.action.clone())?;
                self.close();
                Some(action)
            }
        }
    }
}
