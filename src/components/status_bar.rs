//! Status bar and help line

use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
}

#[derive(Debug, Default)]
pub struct StatusBar {
    pub message: Option<StatusMessage>,
    pub last_refresh: Option<DateTime<Local>>,
}

impl StatusBar {
    pub fn info(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: text.into(),
            level: StatusLevel::Info,
        });
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: text.into(),
            level: StatusLevel::Error,
        });
    }

    pub fn clear(&mut self) {
        self.message = None;
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, busy: bool) {
        let mut spans = vec![Span::styled(
            " netshot ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )];

        if let Some(at) = self.last_refresh {
            spans.push(Span::styled(
                format!(" refreshed {} ", at.format("%H:%M:%S")),
                Style::default().fg(Color::DarkGray),
            ));
        }
        if busy {
            spans.push(Span::styled(" working… ", Style::default().fg(Color::Yellow)));
        }
        if let Some(message) = &self.message {
            let color = match message.level {
                StatusLevel::Info => Color::Green,
                StatusLevel::Error => Color::Red,
            };
            spans.push(Span::styled(
                format!(" {} ", message.text),
                Style::default().fg(color),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

fn key_hint(key: &str, label: &str, color: Color) -> [Span<'static>; 2] {
    [
        Span::styled(
            format!(" {} ", key),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("{} ", label)),
    ]
}

pub fn render_help_bar(frame: &mut Frame, area: Rect, dialog_open: bool) {
    let hints: Vec<[Span<'static>; 2]> = if dialog_open {
        vec![
            key_hint("Tab", "Next field", Color::Cyan),
            key_hint("←/→", "Choose button", Color::Cyan),
            key_hint("Space", "Press button", Color::Cyan),
            key_hint("Enter", "Default button", Color::Green),
            key_hint("Esc", "Close", Color::Red),
        ]
    } else {
        vec![
            key_hint("j/k", "Move", Color::Cyan),
            key_hint("Enter", "Open/Edit", Color::Cyan),
            key_hint("a", "Add", Color::Green),
            key_hint("e", "Edit", Color::Green),
            key_hint("d", "Delete", Color::Red),
            key_hint("r", "Refresh", Color::Cyan),
            key_hint("q", "Quit", Color::White),
        ]
    };

    let spans: Vec<Span> = hints.into_iter().flatten().collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_message_wins() {
        let mut status = StatusBar::default();
        status.info("Groups loaded");
        status.error("Could not load groups: Unknown");
        assert_eq!(
            status.message,
            Some(StatusMessage {
                text: "Could not load groups: Unknown".to_string(),
                level: StatusLevel::Error,
            })
        );
        status.clear();
        assert!(status.message.is_none());
    }
}
