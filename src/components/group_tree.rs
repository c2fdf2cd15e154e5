//! Group sidebar
//!
//! Shows the folder tree of device groups as a flat list of rows. Folder
//! expansion is keyed by full path so it survives reloads of the list.

use crate::action::Action;
use crate::component::Component;
use crate::model::group::DeviceGroup;
use crate::model::tree::{build_tree, TreeItem};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};
use std::collections::HashSet;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// One visible line of the sidebar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeRow {
    Folder {
        path: String,
        name: String,
        depth: usize,
        expanded: bool,
        groups: usize,
    },
    Group { group: DeviceGroup, depth: usize },
}

impl TreeRow {
    pub fn depth(&self) -> usize {
        match self {
            TreeRow::Folder { depth, .. } | TreeRow::Group { depth, .. } => *depth,
        }
    }

    /// Stable identity used to keep the selection across reloads
    fn key(&self) -> RowKey {
        match self {
            TreeRow::Folder { path, .. } => RowKey::Folder(path.clone()),
            TreeRow::Group { group, .. } => RowKey::Group(group.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RowKey {
    Folder(String),
    Group(u64),
}

#[derive(Default)]
pub struct GroupTreeComponent {
    tree: Vec<TreeItem<DeviceGroup>>,
    total: usize,
    expanded: HashSet<String>,
    rows: Vec<TreeRow>,
    pub list_state: ListState,
    /// Set while the list is being (re)loaded
    pub loading: bool,
}

fn count_groups(items: &[TreeItem<DeviceGroup>]) -> usize {
    items
        .iter()
        .map(|item| match item {
            TreeItem::Folder(folder) => count_groups(&folder.children),
            TreeItem::Leaf(_) => 1,
        })
        .sum()
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

impl GroupTreeComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[TreeRow] {
        &self.rows
    }

    pub fn group_count(&self) -> usize {
        self.total
    }

    /// Replace the groups, keeping expansion and selection where possible
    pub fn set_groups(&mut self, groups: Vec<DeviceGroup>) {
        let selected = self.selected_row().map(TreeRow::key);

        // The selected group may have moved; open its new location
        if let Some(RowKey::Group(id)) = &selected {
            if let Some(group) = groups.iter().find(|g| g.id == *id) {
                let mut path = String::new();
                for segment in group.folder_key().split('/').filter(|s| !s.is_empty()) {
                    path = join_path(&path, segment);
                    self.expanded.insert(path.clone());
                }
            }
        }

        self.total = groups.len();
        self.tree = build_tree(groups);
        self.rebuild_rows();

        let index = selected
            .and_then(|key| self.rows.iter().position(|row| row.key() == key))
            .or_else(|| {
                let previous = self.list_state.selected()?;
                Some(previous.min(self.rows.len().checked_sub(1)?))
            })
            .or(if self.rows.is_empty() { None } else { Some(0) });
        self.list_state.select(index);
    }

    fn rebuild_rows(&mut self) {
        let mut rows = Vec::new();
        Self::flatten(&self.tree, "", 0, &self.expanded, &mut rows);
        self.rows = rows;
    }

    fn flatten(
        items: &[TreeItem<DeviceGroup>],
        parent: &str,
        depth: usize,
        expanded: &HashSet<String>,
        rows: &mut Vec<TreeRow>,
    ) {
        for item in items {
            match item {
                TreeItem::Folder(folder) => {
                    let path = join_path(parent, &folder.name);
                    let is_expanded = expanded.contains(&path);
                    rows.push(TreeRow::Folder {
                        path: path.clone(),
                        name: folder.name.clone(),
                        depth,
                        expanded: is_expanded,
                        groups: count_groups(&folder.children),
                    });
                    if is_expanded {
                        Self::flatten(&folder.children, &path, depth + 1, expanded, rows);
                    }
                }
                TreeItem::Leaf(group) => rows.push(TreeRow::Group {
                    group: group.clone(),
                    depth,
                }),
            }
        }
    }

    pub fn selected_row(&self) -> Option<&TreeRow> {
        self.list_state.selected().and_then(|i| self.rows.get(i))
    }

    pub fn selected_group(&self) -> Option<&DeviceGroup> {
        match self.selected_row()? {
            TreeRow::Group { group, .. } => Some(group),
            TreeRow::Folder { .. } => None,
        }
    }

    /// Folder a new group would be added to: the selected folder, or the
    /// folder of the selected group
    pub fn current_folder(&self) -> String {
        match self.selected_row() {
            Some(TreeRow::Folder { path, .. }) => path.clone(),
            Some(TreeRow::Group { group, .. }) => group.folder_key(),
            None => String::new(),
        }
    }

    pub fn next(&mut self) {
        if let Some(i) = self.list_state.selected() {
            if i + 1 < self.rows.len() {
                self.list_state.select(Some(i + 1));
            }
        } else if !self.rows.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn previous(&mut self) {
        if let Some(i) = self.list_state.selected() {
            self.list_state.select(Some(i.saturating_sub(1)));
        }
    }

    pub fn select_first(&mut self) {
        if !self.rows.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if let Some(last) = self.rows.len().checked_sub(1) {
            self.list_state.select(Some(last));
        }
    }

    fn set_expanded(&mut self, path: String, expand: bool) {
        if expand {
            self.expanded.insert(path);
        } else {
            self.expanded.remove(&path);
        }
        self.rebuild_rows();
    }

    pub fn toggle(&mut self) {
        if let Some(TreeRow::Folder { path, expanded, .. }) = self.selected_row().cloned() {
            self.set_expanded(path, !expanded);
        }
    }

    pub fn expand(&mut self) {
        if let Some(TreeRow::Folder { path, .. }) = self.selected_row().cloned() {
            self.set_expanded(path, true);
        }
    }

    /// Collapse the selected folder, or the folder holding the selected group
    pub fn collapse(&mut self) {
        let Some(index) = self.list_state.selected() else {
            return;
        };
        let Some(row) = self.rows.get(index).cloned() else {
            return;
        };
        match row {
            TreeRow::Folder { path, expanded: true, .. } => self.set_expanded(path, false),
            row => {
                // Move up to the parent folder row and close it
                let depth = row.depth();
                if depth == 0 {
                    return;
                }
                let parent = self.rows[..index]
                    .iter()
                    .rposition(|r| matches!(r, TreeRow::Folder { .. }) && r.depth() < depth);
                if let Some(parent) = parent {
                    self.list_state.select(Some(parent));
                    if let TreeRow::Folder { path, .. } = self.rows[parent].clone() {
                        self.set_expanded(path, false);
                    }
                }
            }
        }
    }
}

/// Cut `text` to fit `width` columns, marking the cut with an ellipsis
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

impl Component for GroupTreeComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let on_folder = matches!(self.selected_row(), Some(TreeRow::Folder { .. }));
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Action::NextItem),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevItem),
            KeyCode::Char('g') | KeyCode::Home => Some(Action::FirstItem),
            KeyCode::Char('G') | KeyCode::End => Some(Action::LastItem),
            KeyCode::Char('l') | KeyCode::Right => Some(Action::ExpandFolder),
            KeyCode::Char('h') | KeyCode::Left => Some(Action::CollapseFolder),
            KeyCode::Enter | KeyCode::Char(' ') if on_folder => Some(Action::ToggleFolder),
            KeyCode::Enter | KeyCode::Char('e') => Some(Action::OpenEditGroup),
            KeyCode::Char('a') => Some(Action::OpenAddGroup),
            KeyCode::Char('d') | KeyCode::Delete => Some(Action::OpenDeleteGroup),
            KeyCode::Char('r') => Some(Action::RefreshGroups),
            KeyCode::Char('q') => Some(Action::OpenQuitDialog),
            KeyCode::Esc => Some(Action::DismissStatus),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::NextItem => self.next(),
            Action::PrevItem => self.previous(),
            Action::FirstItem => self.select_first(),
            Action::LastItem => self.select_last(),
            Action::ToggleFolder => self.toggle(),
            Action::ExpandFolder => self.expand(),
            Action::CollapseFolder => self.collapse(),
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        // Borders, highlight symbol
        let width = area.width.saturating_sub(4) as usize;

        let items: Vec<ListItem> = self
            .rows
            .iter()
            .map(|row| {
                let indent = "  ".repeat(row.depth());
                match row {
                    TreeRow::Folder {
                        name,
                        expanded,
                        groups,
                        ..
                    } => {
                        let arrow = if *expanded { "▾ " } else { "▸ " };
                        let suffix = format!(" ({})", groups);
                        let room = width
                            .saturating_sub(indent.width() + arrow.width() + suffix.width());
                        ListItem::new(Line::from(vec![
                            Span::raw(indent),
                            Span::styled(arrow, Style::default().fg(Color::Yellow)),
                            Span::styled(
                                truncate(name, room),
                                Style::default()
                                    .fg(Color::Cyan)
                                    .add_modifier(Modifier::BOLD),
                            ),
                            Span::styled(suffix, Style::default().fg(Color::DarkGray)),
                        ]))
                    }
                    TreeRow::Group { group, .. } => {
                        let room = width.saturating_sub(indent.width() + 2);
                        let style = if group.hidden_from_reports {
                            Style::default().fg(Color::DarkGray)
                        } else {
                            Style::default().fg(Color::White)
                        };
                        ListItem::new(Line::from(vec![
                            Span::raw(indent),
                            Span::styled("• ", Style::default().fg(Color::Green)),
                            Span::styled(truncate(&group.name, room), style),
                        ]))
                    }
                }
            })
            .collect();

        let title = if self.loading {
            format!(" Groups ({}) … ", self.total)
        } else {
            format!(" Groups ({}) ", self.total)
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, area, &mut self.list_state);
        Ok(())
    }
}
