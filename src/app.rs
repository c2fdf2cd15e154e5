//! Root application component
//!
//! The App owns the inventory handle, the group sidebar and the dialog
//! host. Keys go to the mounted dialog first and only reach the sidebar
//! when no dialog is visible. Dialog outcomes come back as Actions and are
//! queued, so one key press may cause several updates.

use crate::action::Action;
use crate::component::Component;
use crate::components::dialog_view::Dialog;
use crate::components::{
    calculate_main_layout, draw_dialog, draw_group_detail, group_dialogs, render_help_bar,
    DialogBody, GroupTreeComponent, StatusBar,
};
use crate::dialog::{AsyncAction, DialogEvent, DialogHost, DialogPhase, Settled};
use crate::error::ActionError;
use crate::model::group::DeviceGroup;
use crate::services::Inventory;
use anyhow::Result;
use chrono::Local;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

pub struct App {
    pub should_quit: bool,
    inventory: Inventory,
    pub tree: GroupTreeComponent,
    pub dialogs: DialogHost<DialogBody, Action>,
    /// Dialog whose submission hit an expired session, mounted again once
    /// the user has reconnected
    interrupted: Option<Dialog>,
    pub status: StatusBar,
    /// In-flight load of the group list
    loading: Option<AsyncAction<Vec<DeviceGroup>>>,
    /// A refresh was requested while a load was in flight
    refresh_queued: bool,
    pending: VecDeque<Action>,
    ticks: usize,
}

impl App {
    pub fn new(inventory: Inventory) -> App {
        App {
            should_quit: false,
            inventory,
            tree: GroupTreeComponent::new(),
            dialogs: DialogHost::new(),
            interrupted: None,
            status: StatusBar::default(),
            loading: None,
            refresh_queued: false,
            pending: VecDeque::new(),
            ticks: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.as_ref().is_some_and(AsyncAction::is_running)
    }

    /// Whether any background operation is in flight
    pub fn is_busy(&self) -> bool {
        self.is_loading()
            || matches!(
                self.dialogs.phase(),
                DialogPhase::Opening | DialogPhase::Submitting
            )
    }

    fn refresh_groups(&mut self) {
        if self.is_loading() {
            self.refresh_queued = true;
            return;
        }
        let inventory = self.inventory.clone();
        let mut action = AsyncAction::new();
        action.trigger(move || inventory.list().map_err(ActionError::from));
        self.loading = Some(action);
    }

    fn poll_loading(&mut self) {
        let Some(settled) = self.loading.as_mut().and_then(AsyncAction::poll) else {
            return;
        };
        self.loading = None;

        match settled {
            Settled::Succeeded(groups) => {
                debug!(count = groups.len(), "groups loaded");
                self.tree.set_groups(groups);
                self.status.last_refresh = Some(Local::now());
            }
            Settled::Failed(err) if err.is_unauthorized() => {
                self.pending.push_back(Action::OpenSessionExpired);
            }
            Settled::Failed(err) => {
                warn!(error = %err, "loading groups failed");
                self.status.error(format!("Could not load groups: {}", err));
            }
        }

        if std::mem::take(&mut self.refresh_queued) {
            self.pending.push_back(Action::RefreshGroups);
        }
    }

    /// Move dialog outcomes into the action queue
    fn drain_dialog_events(&mut self) {
        for event in self.dialogs.take_events() {
            match event {
                DialogEvent::Message(action) => self.pending.push_back(action),
                DialogEvent::Failed(err) => {
                    warn!(error = %err, "dialog operation failed");
                    if err.source_error().is_unauthorized() {
                        if err.is_recoverable() {
                            self.interrupted = self.dialogs.detach_active();
                        }
                        self.pending.push_back(Action::OpenSessionExpired);
                    } else if !err.is_recoverable() {
                        // Submission errors are already shown in the dialog
                        self.status.error(err.to_string());
                    }
                }
            }
        }
    }

    fn open_session_expired(&mut self) {
        let already_open = self
            .dialogs
            .current()
            .is_some_and(|d| d.title() == group_dialogs::SESSION_EXPIRED_TITLE);
        if !already_open {
            info!("session expired, asking to reconnect");
            self.dialogs
                .open(group_dialogs::session_expired(&self.inventory));
        }
    }
}

impl Component for App {
    fn init(&mut self) -> Result<()> {
        self.refresh_groups();
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.dialogs.handle_key(key) {
            self.drain_dialog_events();
            return Ok(self.pending.pop_front());
        }
        self.tree.handle_key_event(key)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => {
                self.ticks = self.ticks.wrapping_add(1);
                self.poll_loading();
                self.dialogs.poll();
            }
            Action::ForceQuit => {
                info!("quitting");
                self.should_quit = true;
            }
            Action::Resize(_, _) => {}

            // ─────────────────────────────────────────────────────────────────
            // Group Tree (delegate to GroupTreeComponent)
            // ─────────────────────────────────────────────────────────────────
            Action::NextItem
            | Action::PrevItem
            | Action::FirstItem
            | Action::LastItem
            | Action::ToggleFolder
            | Action::ExpandFolder
            | Action::CollapseFolder => {
                self.tree.update(action)?;
            }

            // ─────────────────────────────────────────────────────────────────
            // Dialogs
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => self.dialogs.open(group_dialogs::quit()),
            Action::OpenAddGroup => {
                let folder = self.tree.current_folder();
                self.dialogs
                    .open(group_dialogs::add_group(&self.inventory, &folder));
            }
            Action::OpenEditGroup => {
                if let Some(id) = self.tree.selected_group().map(|g| g.id) {
                    self.dialogs
                        .open(group_dialogs::edit_group(&self.inventory, id));
                }
            }
            Action::OpenDeleteGroup => {
                if let Some(group) = self.tree.selected_group().cloned() {
                    self.dialogs
                        .open(group_dialogs::delete_group(&self.inventory, &group));
                }
            }
            Action::OpenSessionExpired => self.open_session_expired(),
            Action::SessionRestored => {
                self.status.info("Session renewed");
                self.refresh_groups();
                if let Some(dialog) = self.interrupted.take() {
                    debug!(dialog = %dialog.title(), "resuming interrupted dialog");
                    self.dialogs.open_controller(dialog);
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Inventory
            // ─────────────────────────────────────────────────────────────────
            Action::RefreshGroups => self.refresh_groups(),
            Action::DismissStatus => self.status.clear(),
        }

        self.drain_dialog_events();
        Ok(self.pending.pop_front())
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let layout = calculate_main_layout(area);

        self.tree.loading = self.is_loading();
        self.tree.draw(frame, layout.tree)?;
        draw_group_detail(frame, layout.detail, self.tree.selected_row());
        self.status.draw(frame, layout.status, self.is_busy());
        render_help_bar(frame, layout.help, self.dialogs.is_open());

        if let Some(dialog) = self.dialogs.current() {
            draw_dialog(frame, area, dialog, self.ticks);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::inventory::sample_groups;
    use crossterm::event::KeyCode;
    use ratatui::{backend::TestBackend, Terminal};
    use std::thread;
    use std::time::{Duration, Instant};

    fn app_with(inventory: Inventory) -> App {
        let mut app = App::new(inventory);
        app.init().unwrap();
        settle(&mut app);
        app
    }

    fn app() -> App {
        app_with(Inventory::new(sample_groups()))
    }

    /// Process an action and everything it leads to, as the main loop does
    fn dispatch(app: &mut App, action: Option<Action>) {
        let mut current = action;
        while let Some(action) = current {
            current = app.update(action).unwrap();
        }
    }

    fn press(app: &mut App, code: KeyCode) {
        let action = app.handle_key_event(KeyEvent::from(code)).unwrap();
        dispatch(app, action);
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    /// Tick until nothing is in flight
    fn settle(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            dispatch(app, Some(Action::Tick));
            if !app.is_busy() && app.pending.is_empty() {
                return;
            }
            assert!(Instant::now() < deadline, "app did not settle");
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn group_names(app: &App) -> Vec<String> {
        app.inventory
            .list()
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect()
    }

    #[test]
    fn test_init_loads_groups() {
        let app = app();
        assert_eq!(app.tree.group_count(), 7);
        assert!(app.status.last_refresh.is_some());
        assert!(!app.tree.rows().is_empty());
    }

    #[test]
    fn test_add_group_through_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        assert!(app.dialogs.is_open());

        type_text(&mut app, "Edge routers");
        press(&mut app, KeyCode::Enter);
        settle(&mut app);

        assert!(!app.dialogs.is_open());
        assert!(group_names(&app).contains(&"Edge routers".to_string()));
        // The list was reloaded after the mutation
        assert_eq!(app.tree.group_count(), 8);
    }

    #[test]
    fn test_keys_stay_in_dialog() {
        let mut app = app();
        let before = app.tree.list_state.selected();

        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.tree.list_state.selected(), before);
        assert_eq!(app.dialogs.current().map(|d| d.title()), Some("Quit?"));

        press(&mut app, KeyCode::Esc);
        assert!(!app.dialogs.is_open());
        press(&mut app, KeyCode::Char('j'));
        assert_ne!(app.tree.list_state.selected(), before);
    }

    #[test]
    fn test_quit_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Enter);
        settle(&mut app);
        assert!(app.should_quit);
    }

    #[test]
    fn test_delete_selected_group() {
        let mut app = app();
        press(&mut app, KeyCode::End);
        let target = app.tree.selected_group().cloned().unwrap();

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Enter);
        settle(&mut app);

        assert!(app.inventory.get(target.id).is_err());
        assert_eq!(app.tree.group_count(), 6);
    }

    #[test]
    fn test_failed_submission_keeps_dialog_and_status_clean() {
        let mut app = app();
        // A root group is selected, so the form targets the root folder
        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "All devices");
        press(&mut app, KeyCode::Enter);
        settle(&mut app);

        let dialog = app.dialogs.current().unwrap();
        assert_eq!(dialog.phase(), DialogPhase::Open);
        assert_eq!(
            dialog.error_message(),
            Some("A group named 'All devices' already exists in this folder")
        );
        assert!(app.status.message.is_none());
    }

    #[test]
    fn test_session_expiry_blocks_until_reconnect() {
        let inventory =
            Inventory::new(sample_groups()).with_session_timeout(Some(Duration::from_millis(300)));
        let mut app = app_with(inventory);
        thread::sleep(Duration::from_millis(350));

        press(&mut app, KeyCode::Char('r'));
        settle(&mut app);
        let dialog = app.dialogs.current().unwrap();
        assert_eq!(dialog.title(), group_dialogs::SESSION_EXPIRED_TITLE);

        // Escape does not dismiss it
        press(&mut app, KeyCode::Esc);
        assert!(app.dialogs.is_open());

        press(&mut app, KeyCode::Enter);
        settle(&mut app);
        assert!(!app.dialogs.is_open());
        assert_eq!(app.tree.group_count(), 7);
        assert_eq!(
            app.status.message.as_ref().map(|m| m.text.as_str()),
            Some("Session renewed")
        );
    }

    #[test]
    fn test_session_expiry_during_submit_keeps_typed_form() {
        let inventory =
            Inventory::new(sample_groups()).with_session_timeout(Some(Duration::from_millis(300)));
        let mut app = app_with(inventory);
        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Edge");
        thread::sleep(Duration::from_millis(350));

        press(&mut app, KeyCode::Enter);
        settle(&mut app);
        let dialog = app.dialogs.current().unwrap();
        assert_eq!(dialog.title(), group_dialogs::SESSION_EXPIRED_TITLE);

        press(&mut app, KeyCode::Enter);
        settle(&mut app);
        let dialog = app.dialogs.current().expect("add dialog is back");
        assert_eq!(dialog.title(), "Add group");
        assert_eq!(dialog.phase(), DialogPhase::Open);
        assert_eq!(dialog.error_message(), Some("Your session has expired"));
        let name = dialog.content().and_then(DialogBody::form).map(|f| f.name.clone());
        assert_eq!(name.as_deref(), Some("Edge"));

        // Retrying on the same dialog now succeeds
        press(&mut app, KeyCode::Enter);
        settle(&mut app);
        assert!(!app.dialogs.is_open());
        assert!(group_names(&app).contains(&"Edge".to_string()));
    }

    #[test]
    fn test_edit_of_deleted_group_reports_in_status() {
        let mut app = app();
        press(&mut app, KeyCode::End);
        let id = app.tree.selected_group().map(|g| g.id).unwrap();
        app.inventory.delete(id).unwrap();

        press(&mut app, KeyCode::Char('e'));
        settle(&mut app);

        assert!(!app.dialogs.is_open());
        let message = app.status.message.clone().unwrap();
        assert_eq!(
            message.text,
            format!("Could not open \"Edit group\": No group with id {}", id)
        );
    }

    #[test]
    fn test_refresh_while_loading_is_queued() {
        let inventory = Inventory::new(sample_groups()).with_latency(Duration::from_millis(20));
        let mut app = App::new(inventory.clone());
        app.init().unwrap();
        dispatch(&mut app, Some(Action::RefreshGroups));
        assert!(app.refresh_queued);

        inventory.delete(1).unwrap();
        settle(&mut app);
        assert!(!app.refresh_queued);
        assert_eq!(app.tree.group_count(), 6);
    }

    #[test]
    fn test_draw_with_dialog() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame, frame.area()).unwrap()).unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(screen.contains("Add group"));
        assert!(screen.contains("Groups (7)"));
        assert!(screen.contains("[ Create ]"));
        assert!(screen.contains("[ Cancel ]"));
    }
}
