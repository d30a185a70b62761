#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

use std::{cell::RefCell, rc::Rc};

use lorekeep::core::domain::{EntryId, NewProject};
use lorekeep::gui::{
    App, Message,
    events::ViewEvent,
    message::{NavigationRequest, PanelMsg, ProjectMessage},
    screens::{
        Origin, PanelKind, entry_editor::EditorMessage, home::HomeMessage, search::SearchMessage,
        settings::SettingsMessage,
    },
};
use lorekeep::{Backend, Config};

pub fn new_app(backend: &Rc<FakeBackend>) -> App {
    let backend: Rc<dyn Backend> = backend.clone();
    App::new(backend, Config::default(), None)
}

/// App with a freshly created project, showing Home.
pub async fn app_with_project(backend: &Rc<FakeBackend>, name: &str) -> App {
    let mut app = new_app(backend);
    app.dispatch(Message::Project(ProjectMessage::Create(NewProject {
        name: name.to_string(),
        db_file_path: "/tmp/x.db".into(),
    })));
    app.run_until_idle().await;
    assert_eq!(app.navigation().active_kind(), Some(PanelKind::Home));
    app
}

/// Record every event on the app's root bus.
pub fn record_events(app: &App) -> Rc<RefCell<Vec<ViewEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    app.bus()
        .subscribe(move |event| sink.borrow_mut().push(event));
    events
}

pub fn open_entry(entry_id: EntryId) -> Message {
    Message::Navigate(NavigationRequest::Entry {
        entry_id,
        view: None,
        origin: Origin::Home,
    })
}

fn active_panel(app: &App, message: PanelMsg) -> Message {
    let active = app
        .navigation()
        .active()
        .expect("a panel should be active");
    Message::Panel(active.activation, message)
}

pub fn to_editor(app: &App, message: EditorMessage) -> Message {
    active_panel(app, PanelMsg::Editor(message))
}

pub fn to_home(app: &App, message: HomeMessage) -> Message {
    active_panel(app, PanelMsg::Home(message))
}

pub fn to_search(app: &App, message: SearchMessage) -> Message {
    active_panel(app, PanelMsg::Search(message))
}

pub fn to_settings(app: &App, message: SettingsMessage) -> Message {
    active_panel(app, PanelMsg::Settings(message))
}

pub fn to_settings_autosave(app: &App, enabled: bool) -> Message {
    to_settings(app, SettingsMessage::SetAutosaveWords(enabled))
}
