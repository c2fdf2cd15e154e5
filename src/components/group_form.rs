//! Add/edit group form shown inside a dialog

use crate::dialog::{DialogContent, Focus};
use crate::model::group::{DeviceGroup, GroupDraft};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Name,
    Folder,
    Description,
    Visible,
}

impl FormField {
    const ALL: [FormField; 4] = [
        FormField::Name,
        FormField::Folder,
        FormField::Description,
        FormField::Visible,
    ];

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> FormField {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> FormField {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(&self) -> &str {
        match self {
            FormField::Name => "Name",
            FormField::Folder => "Folder",
            FormField::Description => "Description",
            FormField::Visible => "Visible in reports",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupForm {
    pub name: String,
    pub folder: String,
    pub description: String,
    pub visible_in_reports: bool,
    pub focused: FormField,
}

impl GroupForm {
    /// Empty form for a new group in `folder`
    pub fn new(folder: &str) -> Self {
        Self {
            name: String::new(),
            folder: folder.to_string(),
            description: String::new(),
            visible_in_reports: true,
            focused: FormField::Name,
        }
    }

    pub fn from_group(group: &DeviceGroup) -> Self {
        let draft = GroupDraft::from_group(group);
        Self {
            name: draft.name,
            folder: group.display_folder(),
            description: draft.description,
            visible_in_reports: draft.visible_in_reports,
            focused: FormField::Name,
        }
    }

    pub fn draft(&self) -> GroupDraft {
        GroupDraft {
            name: self.name.clone(),
            folder: self.folder.clone(),
            description: self.description.clone(),
            visible_in_reports: self.visible_in_reports,
        }
    }

    pub fn is_name_blank(&self) -> bool {
        self.name.trim().is_empty()
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.focused {
            FormField::Name => Some(&mut self.name),
            FormField::Folder => Some(&mut self.folder),
            FormField::Description => Some(&mut self.description),
            FormField::Visible => None,
        }
    }

    /// Rendered form; the cursor is only drawn while the form accepts input
    pub fn lines(&self, editable: bool) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for field in FormField::ALL {
            let focused = editable && field == self.focused;
            let label_style = if focused {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let marker = if focused { "▶ " } else { "  " };
            let cursor = if focused { "_" } else { "" };

            match field {
                FormField::Visible => {
                    let check = if self.visible_in_reports { "[x]" } else { "[ ]" };
                    lines.push(Line::from(vec![
                        Span::styled(marker, label_style),
                        Span::styled(format!("{} ", check), Style::default().fg(Color::White)),
                        Span::styled(field.label().to_string(), label_style),
                    ]));
                }
                FormField::Description => {
                    lines.push(Line::from(vec![
                        Span::styled(marker, label_style),
                        Span::styled(format!("{}:", field.label()), label_style),
                    ]));
                    let text = format!("{}{}", self.description, cursor);
                    for row in text.split('\n') {
                        lines.push(Line::from(Span::styled(
                            format!("    {}", row),
                            Style::default().fg(Color::White),
                        )));
                    }
                }
                FormField::Name | FormField::Folder => {
                    let value = if field == FormField::Name {
                        &self.name
                    } else {
                        &self.folder
                    };
                    lines.push(Line::from(vec![
                        Span::styled(marker, label_style),
                        Span::styled(format!("{:<8}", format!("{}:", field.label())), label_style),
                        Span::styled(
                            format!("{}{}", value, cursor),
                            Style::default()
                                .fg(Color::White)
                                .add_modifier(Modifier::BOLD),
                        ),
                    ]));
                }
            }
        }
        lines
    }
}

impl DialogContent for GroupForm {
    fn focus(&self) -> Focus {
        match self.focused {
            FormField::Name | FormField::Folder => Focus::SingleLine,
            FormField::Description => Focus::MultiLine,
            FormField::Visible => Focus::Other,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.focused = self.focused.next();
                true
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focused = self.focused.prev();
                true
            }
            KeyCode::Char(' ') if self.focused == FormField::Visible => {
                self.visible_in_reports = !self.visible_in_reports;
                true
            }
            KeyCode::Enter if self.focused == FormField::Description => {
                self.description.push('\n');
                true
            }
            KeyCode::Backspace => self.text_mut().map(|text| text.pop()).is_some(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                match self.text_mut() {
                    Some(text) => {
                        text.push(c);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }
}
