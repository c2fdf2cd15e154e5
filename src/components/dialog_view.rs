//! Rendering of the mounted dialog
//!
//! Draws whatever the `DialogHost` has visible: title, body, the inline
//! error of a failed submission and the button row.

use crate::action::Action;
use crate::components::{centered_popup, GroupForm};
use crate::dialog::{ButtonRole, ButtonView, DialogContent, DialogController, DialogPhase, Focus};
use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Content of every dialog the console opens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogBody {
    Form(GroupForm),
    /// Read-only text, for confirmations
    Message(String),
}

impl DialogBody {
    pub fn form(&self) -> Option<&GroupForm> {
        match self {
            DialogBody::Form(form) => Some(form),
            DialogBody::Message(_) => None,
        }
    }

    fn lines(&self, editable: bool) -> Vec<Line<'static>> {
        match self {
            DialogBody::Form(form) => form.lines(editable),
            DialogBody::Message(text) => text
                .lines()
                .map(|l| Line::styled(l.to_string(), Style::default().fg(Color::White)))
                .collect(),
        }
    }
}

impl DialogContent for DialogBody {
    fn focus(&self) -> Focus {
        match self {
            DialogBody::Form(form) => form.focus(),
            DialogBody::Message(_) => Focus::Other,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self {
            DialogBody::Form(form) => form.handle_key(key),
            DialogBody::Message(_) => false,
        }
    }
}

pub type Dialog = DialogController<DialogBody, Action>;

fn button_style(button: &ButtonView) -> Style {
    let color = match button.role {
        ButtonRole::Primary => Color::Green,
        ButtonRole::Danger => Color::Red,
        ButtonRole::Neutral => Color::Gray,
    };
    if !button.enabled {
        return Style::default().fg(Color::DarkGray);
    }
    let style = Style::default().fg(color).add_modifier(Modifier::BOLD);
    if button.highlighted {
        style.bg(Color::Blue).fg(Color::White)
    } else {
        style
    }
}

fn button_row(dialog: &Dialog, tick: usize) -> Line<'static> {
    let mut spans = Vec::new();
    for button in dialog.buttons() {
        let label = if button.active {
            format!(" {} {} ", SPINNER[tick % SPINNER.len()], button.name)
        } else {
            format!(" {} ", button.name)
        };
        spans.push(Span::styled(format!("[{}]", label), button_style(&button)));
        spans.push(Span::raw("  "));
    }
    Line::from(spans)
}

/// Lines of the dialog body and its inline error, without the buttons
pub fn body_lines(dialog: &Dialog, tick: usize) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("")];

    match dialog.phase() {
        DialogPhase::Opening => {
            lines.push(Line::from(Span::styled(
                format!("{} Loading...", SPINNER[tick % SPINNER.len()]),
                Style::default().fg(Color::Yellow),
            )));
        }
        phase => {
            if let Some(content) = dialog.content() {
                lines.extend(content.lines(phase == DialogPhase::Open));
            }
        }
    }

    if let Some(error) = dialog.error_message() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )));
    }
    lines
}

pub fn draw_dialog(frame: &mut Frame, area: Rect, dialog: &Dialog, tick: usize) {
    let width = 60.min(area.width);
    let body = Paragraph::new(body_lines(dialog, tick))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });

    // Wrapped body, a spacer and the button row, inside the borders
    let body_height = body.line_count(width.saturating_sub(2)) as u16;
    let height = body_height.saturating_add(4).min(area.height);
    let popup_area = centered_popup(area, width, height);

    frame.render_widget(Clear, popup_area);

    let border = if dialog.error_message().is_some() {
        Color::Red
    } else {
        Color::Yellow
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(format!(" {} ", dialog.title()))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    // The button row keeps its line even when the body has to be cut
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    frame.render_widget(body, rows[0]);
    frame.render_widget(Paragraph::new(button_row(dialog, tick)), rows[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{ButtonSpec, DialogDescriptor, Operation};
    use crate::error::ActionError;
    use crossterm::event::KeyCode;
    use ratatui::{backend::TestBackend, Terminal};

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn name_blank(body: &DialogBody) -> bool {
        body.form().is_some_and(GroupForm::is_name_blank)
    }

    fn add_dialog() -> Dialog {
        let descriptor = DialogDescriptor::new("Add group", DialogBody::Form(GroupForm::new("")))
            .button(
                ButtonSpec::submit("Create", ButtonRole::Primary, |_| -> Operation<Action> {
                    Box::new(|| Ok(Action::RefreshGroups))
                })
                .disabled_when(name_blank),
            )
            .button(ButtonSpec::close("Cancel", ButtonRole::Neutral));
        Dialog::opened(descriptor)
    }

    fn render(dialog: &Dialog, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| draw_dialog(frame, frame.area(), dialog, 0))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .chunks(width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect())
            .collect()
    }

    #[test]
    fn test_buttons_render_in_order_with_disabled_state() {
        let dialog = add_dialog();

        let row = text(&button_row(&dialog, 0));
        assert!(row.find("Create").unwrap() < row.find("Cancel").unwrap());

        let buttons = dialog.buttons();
        assert_eq!(button_style(&buttons[0]).fg, Some(Color::DarkGray));
        assert_eq!(button_style(&buttons[1]).fg, Some(Color::Gray));
    }

    #[test]
    fn test_submission_error_is_shown_inline() {
        let body = DialogBody::Message("Delete Core?".to_string());
        let descriptor = DialogDescriptor::new("Delete group", body).button(ButtonSpec::submit(
            "Delete",
            ButtonRole::Danger,
            |_| -> Operation<Action> { Box::new(|| Err(ActionError::new("No group with id 3"))) },
        ));
        let mut dialog = Dialog::opened(descriptor);
        assert!(dialog.activate("Delete"));
        crate::dialog::controller::tests::settle(&mut dialog);

        let rendered: Vec<String> = body_lines(&dialog, 0).iter().map(text).collect();
        assert!(rendered.contains(&"Delete Core?".to_string()));
        assert!(rendered.contains(&"Error: No group with id 3".to_string()));
    }

    #[test]
    fn test_message_body_consumes_no_keys() {
        let mut body = DialogBody::Message("Quit?".to_string());
        assert!(!body.handle_key(KeyEvent::from(KeyCode::Char(' '))));
        assert_eq!(body.focus(), Focus::Other);
        assert!(body.form().is_none());
    }

    #[test]
    fn test_form_dialog_shows_its_buttons() {
        let dialog = add_dialog();
        let screen = render(&dialog, 100, 30);

        let button_line = screen
            .iter()
            .position(|l| l.contains("[ Create ]") && l.contains("[ Cancel ]"))
            .expect("button row is drawn");
        let bottom_border = screen
            .iter()
            .rposition(|l| l.contains('└'))
            .expect("popup has a bottom border");
        assert_eq!(button_line + 1, bottom_border);
        assert!(screen.iter().any(|l| l.contains("Visible in reports")));
    }

    #[test]
    fn test_buttons_survive_a_short_screen() {
        let dialog = add_dialog();
        let screen = render(&dialog, 40, 8);
        assert!(screen.iter().any(|l| l.contains("Create")));
    }
}
