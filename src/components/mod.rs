//! UI Components
//!
//! The group sidebar is a `Component`; the detail pane, status bar and
//! dialogs are drawn from state the App owns.

pub mod dialog_view;
pub mod group_detail;
pub mod group_dialogs;
pub mod group_form;
pub mod group_tree;
pub mod layout;
pub mod status_bar;

pub use dialog_view::{draw_dialog, DialogBody};
pub use group_detail::draw_group_detail;
pub use group_form::GroupForm;
pub use group_tree::{GroupTreeComponent, TreeRow};
pub use layout::{calculate_main_layout, centered_popup};
pub use status_bar::{render_help_bar, StatusBar};
