//! Detail pane for the selected group

use crate::components::TreeRow;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

pub fn detail_lines(row: Option<&TreeRow>) -> Vec<Line<'static>> {
    match row {
        None => vec![Line::from(Span::styled(
            "No group selected",
            Style::default().fg(Color::DarkGray),
        ))],
        Some(TreeRow::Folder { path, groups, .. }) => vec![
            Line::from(Span::styled(
                path.replace('/', " / "),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            field("Groups", groups.to_string()),
        ],
        Some(TreeRow::Group { group, .. }) => {
            let folder = match group.display_folder() {
                f if f.is_empty() => "(root)".to_string(),
                f => f,
            };
            let reports = if group.hidden_from_reports {
                "hidden"
            } else {
                "visible"
            };
            let mut lines = vec![
                Line::from(Span::styled(
                    group.name.clone(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                field("Id", group.id.to_string()),
                field("Folder", folder),
                field("Type", group.group_type.label().to_string()),
                field("Reports", reports.to_string()),
            ];
            if !group.description.is_empty() {
                lines.push(Line::from(""));
                lines.extend(
                    group
                        .description
                        .lines()
                        .map(|l| Line::from(Span::raw(l.to_string()))),
                );
            }
            lines
        }
    }
}

pub fn draw_group_detail(frame: &mut Frame, area: Rect, row: Option<&TreeRow>) {
    let paragraph = Paragraph::new(detail_lines(row))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Details ")
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::group::{DeviceGroup, GroupType};

    fn text(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_group_details() {
        let row = TreeRow::Group {
            group: DeviceGroup {
                id: 4,
                name: "Core".to_string(),
                folder: "".to_string(),
                group_type: GroupType::Dynamic,
                description: "first\nsecond".to_string(),
                hidden_from_reports: true,
            },
            depth: 0,
        };
        let lines = text(&detail_lines(Some(&row)));
        assert_eq!(lines[0], "Core");
        assert!(lines.contains(&format!("{:<12}(root)", "Folder")));
        assert!(lines.contains(&format!("{:<12}hidden", "Reports")));
        assert_eq!(&lines[lines.len() - 2..], ["first", "second"]);
    }

    #[test]
    fn test_folder_and_empty_details() {
        let row = TreeRow::Folder {
            path: "Sites/Paris".to_string(),
            name: "Paris".to_string(),
            depth: 1,
            expanded: false,
            groups: 3,
        };
        assert_eq!(text(&detail_lines(Some(&row)))[0], "Sites / Paris");
        assert_eq!(text(&detail_lines(None)), vec!["No group selected"]);
    }
}
