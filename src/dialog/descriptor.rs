//! Dialog configuration: title, content, buttons and close behavior

use super::async_action::Operation;
use crate::error::ActionError;
use tracing::warn;

/// Presentation role of a button
///
/// Only affects styling, never the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonRole {
    Primary,
    Danger,
    Neutral,
}

/// Builds the operation to run from the dialog's current content
pub type MutationFactory<C, M> = Box<dyn Fn(&C) -> Operation<M>>;

/// Callback run when a dialog closes; may hand a message back to the caller
pub type CloseCallback<M> = Box<dyn FnOnce() -> Option<M>>;

/// What a button does when activated
pub enum ButtonAction<C, M> {
    /// Close the dialog immediately
    Close,
    /// Run an operation; its success value is forwarded to the caller
    Submit(MutationFactory<C, M>),
}

/// A named button of a dialog
pub struct ButtonSpec<C, M> {
    pub name: String,
    pub role: ButtonRole,
    pub action: ButtonAction<C, M>,
    disabled_when: Option<Box<dyn Fn(&C) -> bool>>,
}

impl<C, M> ButtonSpec<C, M> {
    /// A button that just closes the dialog
    pub fn close(name: impl Into<String>, role: ButtonRole) -> Self {
        Self {
            name: name.into(),
            role,
            action: ButtonAction::Close,
            disabled_when: None,
        }
    }

    /// A button that runs the operation built by `factory`
    pub fn submit<F>(name: impl Into<String>, role: ButtonRole, factory: F) -> Self
    where
        F: Fn(&C) -> Operation<M> + 'static,
    {
        Self {
            name: name.into(),
            role,
            action: ButtonAction::Submit(Box::new(factory)),
            disabled_when: None,
        }
    }

    /// Disable the button whenever `predicate` holds for the content
    pub fn disabled_when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&C) -> bool + 'static,
    {
        self.disabled_when = Some(Box::new(predicate));
        self
    }

    pub fn is_disabled(&self, content: &C) -> bool {
        self.disabled_when
            .as_ref()
            .is_some_and(|predicate| predicate(content))
    }
}

/// Where the dialog's content comes from
pub(crate) enum ContentSource<C> {
    Ready(C),
    Prepare(Operation<C>),
}

/// Configuration for one opening of a dialog
pub struct DialogDescriptor<C, M> {
    pub(crate) title: String,
    pub(crate) source: ContentSource<C>,
    pub(crate) buttons: Vec<ButtonSpec<C, M>>,
    pub(crate) on_close: Option<CloseCallback<M>>,
    pub(crate) closable: bool,
}

impl<C, M> DialogDescriptor<C, M> {
    /// Dialog with content available up front
    pub fn new(title: impl Into<String>, content: C) -> Self {
        Self::with_source(title.into(), ContentSource::Ready(content))
    }

    /// Dialog whose content is loaded asynchronously while it is opening
    pub fn prepared<F>(title: impl Into<String>, prepare: F) -> Self
    where
        F: FnOnce() -> Result<C, ActionError> + Send + 'static,
    {
        Self::with_source(title.into(), ContentSource::Prepare(Box::new(prepare)))
    }

    fn with_source(title: String, source: ContentSource<C>) -> Self {
        Self {
            title,
            source,
            buttons: Vec::new(),
            on_close: None,
            closable: true,
        }
    }

    /// Append a button. Names are unique: a repeated name is ignored.
    pub fn button(mut self, button: ButtonSpec<C, M>) -> Self {
        if self.buttons.iter().any(|b| b.name == button.name) {
            warn!(dialog = %self.title, button = %button.name, "duplicate button ignored");
            return self;
        }
        self.buttons.push(button);
        self
    }

    pub fn on_close<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() -> Option<M> + 'static,
    {
        self.on_close = Some(Box::new(callback));
        self
    }

    /// Whether Escape may close the dialog (defaults to true)
    pub fn closable(mut self, closable: bool) -> Self {
        self.closable = closable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons_keep_declared_order() {
        let descriptor: DialogDescriptor<(), ()> = DialogDescriptor::new("Edit rule", ())
            .button(ButtonSpec::submit("Save", ButtonRole::Primary, |_| -> Operation<()> {
                Box::new(|| Ok(()))
            }))
            .button(ButtonSpec::close("Cancel", ButtonRole::Neutral));

        let names: Vec<&str> = descriptor.buttons.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Save", "Cancel"]);
        assert!(descriptor.closable);
    }

    #[test]
    fn test_duplicate_button_name_is_ignored() {
        let descriptor: DialogDescriptor<(), ()> = DialogDescriptor::new("Delete", ())
            .button(ButtonSpec::close("Cancel", ButtonRole::Neutral))
            .button(ButtonSpec::close("Cancel", ButtonRole::Danger));

        assert_eq!(descriptor.buttons.len(), 1);
        assert_eq!(descriptor.buttons[0].role, ButtonRole::Neutral);
    }

    #[test]
    fn test_disabled_when_reads_content() {
        let button: ButtonSpec<String, ()> = ButtonSpec::close("Create", ButtonRole::Primary)
            .disabled_when(|name: &String| name.is_empty());

        assert!(button.is_disabled(&String::new()));
        assert!(!button.is_disabled(&"core".to_string()));
    }
}
