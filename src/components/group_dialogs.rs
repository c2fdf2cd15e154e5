//! Dialogs the console opens, built on the dialog core
//!
//! Every mutation runs against a clone of the inventory handle on a worker
//! thread and resolves to `Action::RefreshGroups` so the group list is
//! reloaded once the dialog has done its job. A reconnect resolves to
//! `Action::SessionRestored`, which reloads as well.

use crate::action::Action;
use crate::components::{DialogBody, GroupForm};
use crate::dialog::{ButtonRole, ButtonSpec, DialogDescriptor, Operation};
use crate::error::ActionError;
use crate::model::group::{DeviceGroup, GroupDraft};
use crate::services::Inventory;

pub const SESSION_EXPIRED_TITLE: &str = "Session expired";

pub type ConsoleDialog = DialogDescriptor<DialogBody, Action>;

fn form_draft(body: &DialogBody) -> GroupDraft {
    body.form().map(GroupForm::draft).unwrap_or_default()
}

fn name_blank(body: &DialogBody) -> bool {
    body.form().is_some_and(GroupForm::is_name_blank)
}

pub fn add_group(inventory: &Inventory, folder: &str) -> ConsoleDialog {
    let inventory = inventory.clone();
    DialogDescriptor::new("Add group", DialogBody::Form(GroupForm::new(folder)))
        .button(
            ButtonSpec::submit("Create", ButtonRole::Primary, move |body| -> Operation<Action> {
                let inventory = inventory.clone();
                let draft = form_draft(body);
                Box::new(move || -> Result<Action, ActionError> {
                    inventory.create(&draft)?;
                    Ok(Action::RefreshGroups)
                })
            })
            .disabled_when(name_blank),
        )
        .button(ButtonSpec::close("Cancel", ButtonRole::Neutral))
}

/// Edit dialog; the group is loaded again while the dialog opens
pub fn edit_group(inventory: &Inventory, id: u64) -> ConsoleDialog {
    let loader = inventory.clone();
    let inventory = inventory.clone();
    DialogDescriptor::prepared("Edit group", move || {
        let group = loader.get(id)?;
        Ok(DialogBody::Form(GroupForm::from_group(&group)))
    })
    .button(
        ButtonSpec::submit("Save", ButtonRole::Primary, move |body| -> Operation<Action> {
            let inventory = inventory.clone();
            let draft = form_draft(body);
            Box::new(move || -> Result<Action, ActionError> {
                inventory.update(id, &draft)?;
                Ok(Action::RefreshGroups)
            })
        })
        .disabled_when(name_blank),
    )
    .button(ButtonSpec::close("Cancel", ButtonRole::Neutral))
}

pub fn delete_group(inventory: &Inventory, group: &DeviceGroup) -> ConsoleDialog {
    let inventory = inventory.clone();
    let id = group.id;
    let location = match group.display_folder() {
        folder if folder.is_empty() => String::new(),
        folder => format!(" in {}", folder),
    };
    let text = format!(
        "Delete the group '{}'{}?\nDevices stay in the inventory.",
        group.name, location
    );
    DialogDescriptor::new("Delete group", DialogBody::Message(text))
        .button(ButtonSpec::submit(
            "Delete",
            ButtonRole::Danger,
            move |_| -> Operation<Action> {
                let inventory = inventory.clone();
                Box::new(move || -> Result<Action, ActionError> {
                    inventory.delete(id)?;
                    Ok(Action::RefreshGroups)
                })
            },
        ))
        .button(ButtonSpec::close("Cancel", ButtonRole::Neutral))
}

pub fn quit() -> ConsoleDialog {
    DialogDescriptor::new(
        "Quit?",
        DialogBody::Message("Are you sure you want to quit?".to_string()),
    )
    .button(ButtonSpec::submit(
        "Quit",
        ButtonRole::Primary,
        |_| -> Operation<Action> { Box::new(|| Ok(Action::ForceQuit)) },
    ))
    .button(ButtonSpec::close("Cancel", ButtonRole::Neutral))
}

/// Blocking dialog: only a successful reconnect dismisses it
pub fn session_expired(inventory: &Inventory) -> ConsoleDialog {
    let inventory = inventory.clone();
    DialogDescriptor::new(
        SESSION_EXPIRED_TITLE,
        DialogBody::Message("Your session has expired.\nReconnect to continue.".to_string()),
    )
    .button(ButtonSpec::submit(
        "Reconnect",
        ButtonRole::Primary,
        move |_| -> Operation<Action> {
            let inventory = inventory.clone();
            Box::new(move || -> Result<Action, ActionError> {
                inventory.reconnect()?;
                Ok(Action::SessionRestored)
            })
        },
    ))
    .closable(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::dialog_view::Dialog;
    use crate::dialog::controller::tests::settle;
    use crate::dialog::{DialogEvent, DialogPhase};
    use crate::services::inventory::sample_groups;

    fn inventory() -> Inventory {
        Inventory::new(sample_groups())
    }

    #[test]
    fn test_add_group_disabled_until_named() {
        let inventory = inventory();
        let mut dialog = Dialog::opened(add_group(&inventory, "Sites"));
        assert_eq!(dialog.default_button(), Some("Cancel"));

        if let Some(DialogBody::Form(form)) = dialog.content_mut() {
            form.name = "Edge".to_string();
        }
        assert_eq!(dialog.default_button(), Some("Create"));
        assert!(dialog.activate("Create"));
        settle(&mut dialog);

        assert_eq!(dialog.phase(), DialogPhase::Closed);
        assert_eq!(
            dialog.take_events(),
            vec![DialogEvent::Message(Action::RefreshGroups)]
        );
        let created = inventory.list().unwrap();
        assert!(created.iter().any(|g| g.name == "Edge" && g.folder == "Sites"));
    }

    #[test]
    fn test_edit_group_loads_current_values() {
        let inventory = inventory();
        let mut dialog = Dialog::new();
        dialog.open(edit_group(&inventory, 2));
        settle(&mut dialog);

        let Some(DialogBody::Form(form)) = dialog.content() else {
            panic!("edit dialog should hold a form");
        };
        assert_eq!(form.name, "Core routers");
        assert_eq!(form.folder, "Sites / Paris");
    }

    #[test]
    fn test_edit_of_vanished_group_fails_preparation() {
        let inventory = inventory();
        let mut dialog = Dialog::new();
        dialog.open(edit_group(&inventory, 99));
        settle(&mut dialog);

        assert_eq!(dialog.phase(), DialogPhase::Closed);
        let events = dialog.take_events();
        let [DialogEvent::Failed(err)] = events.as_slice() else {
            panic!("expected one failure, got {:?}", events);
        };
        assert!(!err.is_recoverable());
        assert_eq!(err.source_error().message, "No group with id 99");
    }

    #[test]
    fn test_duplicate_rename_keeps_dialog_open() {
        let inventory = inventory();
        let mut dialog = Dialog::new();
        dialog.open(edit_group(&inventory, 3));
        settle(&mut dialog);

        if let Some(DialogBody::Form(form)) = dialog.content_mut() {
            form.name = "Core routers".to_string();
        }
        assert!(dialog.activate("Save"));
        settle(&mut dialog);

        assert_eq!(dialog.phase(), DialogPhase::Open);
        assert_eq!(
            dialog.error_message(),
            Some("A group named 'Core routers' already exists in this folder")
        );
        assert!(dialog.is_button_enabled("Save"));
    }

    #[test]
    fn test_delete_removes_group() {
        let inventory = inventory();
        let group = inventory.get(6).unwrap();
        let mut dialog = Dialog::opened(delete_group(&inventory, &group));
        assert_eq!(dialog.default_button(), Some("Delete"));

        assert!(dialog.submit_default());
        settle(&mut dialog);
        assert_eq!(dialog.phase(), DialogPhase::Closed);
        assert!(inventory.get(6).is_err());
    }

    #[test]
    fn test_quit_resolves_to_force_quit() {
        let mut dialog = Dialog::opened(quit());
        assert!(dialog.activate("Quit"));
        settle(&mut dialog);
        assert_eq!(
            dialog.take_events(),
            vec![DialogEvent::Message(Action::ForceQuit)]
        );
    }

    #[test]
    fn test_session_dialog_is_blocking() {
        let dialog = Dialog::opened(session_expired(&inventory()));
        assert!(!dialog.is_closable());
        assert_eq!(dialog.title(), SESSION_EXPIRED_TITLE);
        assert_eq!(dialog.default_button(), Some("Reconnect"));
    }

    #[test]
    fn test_reconnect_restores_session() {
        let inventory = inventory().with_session_timeout(Some(std::time::Duration::ZERO));
        assert!(inventory.list().is_err());

        let mut dialog = Dialog::opened(session_expired(&inventory));
        assert!(dialog.activate("Reconnect"));
        settle(&mut dialog);
        assert_eq!(
            dialog.take_events(),
            vec![DialogEvent::Message(Action::SessionRestored)]
        );
    }
}
