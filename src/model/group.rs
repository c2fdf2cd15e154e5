//! Device groups as served by the inventory

use super::tree::{path_segments, Foldered};
use serde::{Deserialize, Serialize};

/// Whether group membership is a fixed list or computed from a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    #[default]
    Static,
    Dynamic,
}

impl GroupType {
    pub fn label(&self) -> &str {
        match self {
            GroupType::Static => "static",
            GroupType::Dynamic => "dynamic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceGroup {
    pub id: u64,
    pub name: String,
    /// Slash-delimited folder path, empty for top-level groups
    #[serde(default)]
    pub folder: String,
    #[serde(default, rename = "type")]
    pub group_type: GroupType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hidden_from_reports: bool,
}

impl DeviceGroup {
    /// Folder path with normalized separators ("A / B" for "A/B ")
    pub fn display_folder(&self) -> String {
        path_segments(&self.folder).collect::<Vec<_>>().join(" / ")
    }

    /// Key identifying a folder path regardless of spacing
    pub fn folder_key(&self) -> String {
        normalize_folder(&self.folder)
    }
}

impl Foldered for DeviceGroup {
    fn folder_path(&self) -> &str {
        &self.folder
    }
}

/// Canonical form of a folder path: trimmed segments joined by '/'
pub fn normalize_folder(path: &str) -> String {
    path_segments(path).collect::<Vec<_>>().join("/")
}

/// Values a user submits from the add/edit group form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupDraft {
    pub name: String,
    pub folder: String,
    pub description: String,
    pub visible_in_reports: bool,
}

impl GroupDraft {
    pub fn from_group(group: &DeviceGroup) -> Self {
        Self {
            name: group.name.clone(),
            folder: group.folder.clone(),
            description: group.description.clone(),
            visible_in_reports: !group.hidden_from_reports,
        }
    }
}
