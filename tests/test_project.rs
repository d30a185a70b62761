//! Integration tests for the project session and the overlays around it.
//!
//! Tests cover:
//! - Creating, loading and closing a project
//! - Committing the project title from Home, also when leaving Home early
//! - Overlay events reaching the root bus
//! - Context menu actions and their modals
//! - Folder deletion closing an editor inside the folder

mod common;

use std::{cell::RefCell, rc::Rc};

use lorekeep::Command;
use lorekeep::core::domain::{EntityType, ROOT_FOLDER_ID};
use lorekeep::gui::{
    Message,
    events::ViewEvent,
    message::{NavigationRequest, ProjectMessage},
    overlays::{ContextMenuMessage, MenuAction, MenuTarget, Modal, ModalKind, ModalMessage},
    screens::{PanelKind, entry_editor::EditorStatus, home::HomeMessage, settings::SettingsMessage},
    widgets::TitleError,
};
use serde_json::json;

use common::*;

fn open_menu(target: MenuTarget) -> Message {
    Message::ContextMenu(ContextMenuMessage::Open {
        x: 10.0,
        y: 20.0,
        target,
    })
}

fn modal(message: ModalMessage) -> Message {
    Message::Modal(message)
}

#[tokio::test(start_paused = true)]
async fn test_project_title_commit_from_home() -> anyhow::Result<()> {
    // 1. Create the project, Home shows its name
    let backend = FakeBackend::new();
    let mut app = app_with_project(&backend, "MyWiki").await;
    assert_eq!(app.navigation().home().title().value(), "MyWiki");
    assert_eq!(
        backend.args_of(Command::CreateProject),
        vec![json!({ "name": "MyWiki", "dbFilePath": "/tmp/x.db" })]
    );

    // 2. Empty title is rejected locally
    app.dispatch(to_home(&app, HomeMessage::TitleChanged(String::new())));
    app.run_until_idle().await;
    let title = app.navigation().home().title();
    assert_eq!(title.error(), Some(&TitleError::Empty));
    assert_eq!(title.error().map(ToString::to_string).as_deref(), Some("Empty title"));
    assert_eq!(backend.count(Command::UpdateProject), 0);

    // 3. A real name commits exactly once
    app.dispatch(to_home(&app, HomeMessage::TitleChanged("MyWiki2".into())));
    app.run_until_idle().await;
    assert_eq!(
        backend.args_of(Command::UpdateProject),
        vec![json!({ "name": "MyWiki2" })]
    );
    assert_eq!(backend.project_name().as_deref(), Some("MyWiki2"));
    let title = app.navigation().home().title();
    assert_eq!(title.error(), None);
    assert_eq!(title.committed(), "MyWiki2");
    let project = app.state().current_project.as_ref().unwrap();
    assert_eq!(project.project.name, "MyWiki2");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_project_title_commits_when_leaving_home() -> anyhow::Result<()> {
    // 1. Edit the title and leave before the debounce fires
    let backend = FakeBackend::new();
    let mut app = app_with_project(&backend, "MyWiki").await;
    app.dispatch(to_home(&app, HomeMessage::TitleChanged("MyWiki2".into())));
    app.dispatch(Message::Navigate(NavigationRequest::Settings));
    app.run_until_idle().await;

    // 2. The pending name went out exactly once
    assert_eq!(
        backend.args_of(Command::UpdateProject),
        vec![json!({ "name": "MyWiki2" })]
    );
    assert_eq!(backend.project_name().as_deref(), Some("MyWiki2"));
    let project = app.state().current_project.as_ref().unwrap();
    assert_eq!(project.project.name, "MyWiki2");

    // 3. Coming back shows a settled field
    app.dispatch(Message::Navigate(NavigationRequest::Home));
    app.run_until_idle().await;
    let title = app.navigation().home().title();
    assert_eq!(title.value(), "MyWiki2");
    assert_eq!(title.committed(), "MyWiki2");
    assert!(!title.is_dirty());
    assert_eq!(backend.count(Command::UpdateProject), 1);

    Ok(())
}

#[tokio::test]
async fn test_overlay_events_reach_root_bus() -> anyhow::Result<()> {
    let backend = FakeBackend::new();
    let mut app = app_with_project(&backend, "MyWiki").await;
    let root = record_events(&app);
    let overlays = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&overlays);
    app.navigation()
        .overlay_bus()
        .subscribe(move |event| sink.borrow_mut().push(event));

    // 1. Opening a modal is seen on the overlay bus and on the root bus
    app.dispatch(modal(ModalMessage::Open(Modal::FolderCreator {
        name: String::new(),
        parent_id: ROOT_FOLDER_ID,
    })));
    let opened = ViewEvent::ModalOpened(ModalKind::FolderCreator);
    assert!(overlays.borrow().contains(&opened));
    assert!(root.borrow().contains(&opened));

    // 2. Panel events stay on the root bus
    app.dispatch(modal(ModalMessage::Close));
    app.dispatch(Message::Navigate(NavigationRequest::Settings));
    app.run_until_idle().await;
    let activated = |event: &ViewEvent| {
        matches!(
            event,
            ViewEvent::PanelActivated {
                kind: PanelKind::Settings,
                ..
            }
        )
    };
    assert!(root.borrow().iter().any(activated));
    assert!(!overlays.borrow().iter().any(activated));
    assert!(overlays.borrow().contains(&ViewEvent::ModalClosed));

    Ok(())
}

#[tokio::test]
async fn test_load_project_opens_home() -> anyhow::Result<()> {
    let backend = FakeBackend::new();
    backend.set_loadable_project("Arda");
    let mut app = new_app(&backend);
    let events = record_events(&app);

    app.dispatch(Message::Project(ProjectMessage::Load("/tmp/arda.db".into())));
    app.run_until_idle().await;

    assert_eq!(app.navigation().active_kind(), Some(PanelKind::Home));
    assert_eq!(app.navigation().home().title().value(), "Arda");
    assert!(
        events
            .borrow()
            .iter()
            .any(|event| matches!(event, ViewEvent::ProjectOpened { .. }))
    );
    assert_eq!(
        backend.args_of(Command::LoadProject),
        vec![json!({ "dbFilePath": "/tmp/arda.db" })]
    );

    Ok(())
}

#[tokio::test]
async fn test_close_project_from_settings() -> anyhow::Result<()> {
    let backend = FakeBackend::new();
    let mut app = app_with_project(&backend, "MyWiki").await;
    app.dispatch(Message::Navigate(NavigationRequest::Settings));
    assert_eq!(app.navigation().active_kind(), Some(PanelKind::Settings));

    app.dispatch(to_settings(&app, SettingsMessage::CloseProject));
    app.run_until_idle().await;

    assert!(!app.state().has_project());
    assert_eq!(app.navigation().active_kind(), None);
    assert_eq!(backend.count(Command::CloseProject), 1);

    Ok(())
}

#[tokio::test]
async fn test_create_entry_through_context_menu() -> anyhow::Result<()> {
    // 1. Right click on the tree root, pick "New entry"
    let backend = FakeBackend::new();
    let mut app = app_with_project(&backend, "MyWiki").await;
    app.dispatch(open_menu(MenuTarget::Root));
    let menu = app.navigation().context_menu().current().unwrap();
    assert_eq!(menu.items[0].label, "New entry");
    assert_eq!(menu.selected_index, None);

    app.dispatch(Message::ContextMenu(ContextMenuMessage::SelectNext));
    app.dispatch(Message::ContextMenu(ContextMenuMessage::Confirm(None)));
    assert!(!app.navigation().context_menu().is_open());
    assert_eq!(app.navigation().modal().kind(), Some(ModalKind::EntryCreator));

    // 2. An empty title never reaches the backend
    app.dispatch(modal(ModalMessage::Submit));
    let open = app.navigation().modal().current().unwrap();
    assert_eq!(open.error.as_deref(), Some("Empty title"));
    assert_eq!(backend.count(Command::CreateEntry), 0);

    // 3. Fill in the form and submit
    app.dispatch(modal(ModalMessage::SetTitle("Quenya".into())));
    app.dispatch(modal(ModalMessage::SetEntityType(EntityType::Language)));
    app.dispatch(modal(ModalMessage::Submit));
    app.run_until_idle().await;

    // 4. The modal is gone and the new entry is open
    assert!(!app.navigation().modal().is_open());
    let editor = app.navigation().editor().unwrap();
    assert_eq!(editor.status(), EditorStatus::Loaded);
    assert_eq!(editor.session().unwrap().info.title, "Quenya");
    let created = backend.args_of(Command::CreateEntry);
    assert_eq!(created[0]["entityType"], "Language");
    assert_eq!(created[0]["folderId"], ROOT_FOLDER_ID);
    let project = app.state().current_project.as_ref().unwrap();
    assert!(project.entries.iter().any(|entry| entry.title == "Quenya"));

    Ok(())
}

#[tokio::test]
async fn test_duplicate_entry_title_stays_in_modal() -> anyhow::Result<()> {
    let backend = FakeBackend::new();
    backend.seed_entry("Quenya", EntityType::Language, ROOT_FOLDER_ID);
    let mut app = app_with_project(&backend, "MyWiki").await;

    app.dispatch(open_menu(MenuTarget::Root));
    app.dispatch(Message::ContextMenu(ContextMenuMessage::Confirm(Some(0))));
    app.dispatch(modal(ModalMessage::SetTitle("Quenya".into())));
    app.dispatch(modal(ModalMessage::Submit));
    app.run_until_idle().await;

    let open = app.navigation().modal().current().unwrap();
    assert_eq!(open.error.as_deref(), Some("Title is not unique"));
    assert!(!open.submitting);
    assert_eq!(app.navigation().active_kind(), Some(PanelKind::Home));

    // Cancel closes it without touching the backend
    backend.clear_calls();
    app.dispatch(modal(ModalMessage::Cancel));
    assert!(!app.navigation().modal().is_open());
    assert!(backend.calls().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_context_menu_ignored_while_modal_open() -> anyhow::Result<()> {
    let backend = FakeBackend::new();
    let mut app = app_with_project(&backend, "MyWiki").await;

    // Opening a modal dismisses an open menu
    app.dispatch(open_menu(MenuTarget::Root));
    assert!(app.navigation().context_menu().is_open());
    app.dispatch(modal(ModalMessage::Open(Modal::FolderCreator {
        name: String::new(),
        parent_id: ROOT_FOLDER_ID,
    })));
    assert!(!app.navigation().context_menu().is_open());
    assert_eq!(app.navigation().modal().kind(), Some(ModalKind::FolderCreator));

    // A new menu request is dropped while the modal is up
    app.dispatch(open_menu(MenuTarget::Root));
    assert!(!app.navigation().context_menu().is_open());

    // Escape on the menu is harmless when nothing is open
    app.dispatch(Message::ContextMenu(ContextMenuMessage::Dismiss));
    assert!(app.navigation().modal().is_open());

    Ok(())
}

#[tokio::test]
async fn test_context_menu_keyboard_wraps() -> anyhow::Result<()> {
    let backend = FakeBackend::new();
    let entry_id = backend.seed_entry("Tirion", EntityType::Article, ROOT_FOLDER_ID);
    let mut app = app_with_project(&backend, "MyWiki").await;

    app.dispatch(open_menu(MenuTarget::Entry {
        entry_id,
        title: "Tirion".into(),
    }));
    app.dispatch(Message::ContextMenu(ContextMenuMessage::SelectPrevious));
    assert_eq!(
        app.navigation().context_menu().current().unwrap().selected_index,
        Some(1)
    );
    app.dispatch(Message::ContextMenu(ContextMenuMessage::SelectNext));
    assert_eq!(
        app.navigation().context_menu().current().unwrap().selected_index,
        Some(0)
    );

    app.dispatch(Message::ContextMenu(ContextMenuMessage::Confirm(None)));
    app.run_until_idle().await;
    assert_eq!(app.navigation().active_kind(), Some(PanelKind::EntryEditor));
    assert_eq!(app.navigation().editor().unwrap().entry_id(), entry_id);

    Ok(())
}

#[tokio::test]
async fn test_folder_delete_closes_editor_inside() -> anyhow::Result<()> {
    // 1. Places/Cities/Tirion, with Tirion open
    let backend = FakeBackend::new();
    let places = backend.seed_folder("Places", ROOT_FOLDER_ID);
    let cities = backend.seed_folder("Cities", places);
    let tirion = backend.seed_entry("Tirion", EntityType::Article, cities);
    let kept = backend.seed_entry("Arda", EntityType::Article, ROOT_FOLDER_ID);
    let mut app = app_with_project(&backend, "MyWiki").await;
    let events = record_events(&app);
    app.dispatch(open_entry(tirion));
    app.run_until_idle().await;
    assert_eq!(app.navigation().active_kind(), Some(PanelKind::EntryEditor));

    // 2. Delete "Places" from its context menu, confirming the modal
    app.dispatch(open_menu(MenuTarget::Folder {
        folder_id: places,
        name: "Places".into(),
    }));
    let items = &app.navigation().context_menu().current().unwrap().items;
    let delete = items
        .iter()
        .position(|item| matches!(item.action, MenuAction::DeleteFolder { .. }))
        .unwrap();
    app.dispatch(Message::ContextMenu(ContextMenuMessage::Confirm(Some(delete))));
    assert_eq!(app.navigation().modal().kind(), Some(ModalKind::ConfirmDelete));
    assert_eq!(backend.count(Command::DeleteFolder), 0);
    app.dispatch(modal(ModalMessage::Submit));
    app.run_until_idle().await;

    // 3. The editor went away, the rest of the tree survives
    assert!(!app.navigation().modal().is_open());
    assert_eq!(app.navigation().active_kind(), Some(PanelKind::Home));
    assert!(app.navigation().editor().is_none());
    let project = app.state().current_project.as_ref().unwrap();
    assert!(project.entry(tirion).is_none());
    assert!(project.entry(kept).is_some());
    assert!(events.borrow().iter().any(|event| matches!(
        event,
        ViewEvent::FolderDeleted { folder_ids } if folder_ids.contains(&cities)
    )));

    Ok(())
}
