//! Folder tree built from a flat list of entities carrying a folder path
//!
//! Paths are slash-delimited ("Sites / Paris / Core"). Segments are trimmed
//! and empty segments are skipped, so an empty or blank path puts the entity
//! at the root.

/// An entity that can be placed in a folder tree
pub trait Foldered {
    fn folder_path(&self) -> &str;
}

/// A folder and its children, folders first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode<T> {
    pub name: String,
    pub children: Vec<TreeItem<T>>,
}

/// Either a folder or one of the caller's entities
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeItem<T> {
    Folder(FolderNode<T>),
    Leaf(T),
}

impl<T> TreeItem<T> {
    pub fn is_folder(&self) -> bool {
        matches!(self, TreeItem::Folder(_))
    }
}

/// Split a folder path into its non-empty, trimmed segments
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').map(str::trim).filter(|s| !s.is_empty())
}

/// Build the folder tree for `entities`, keeping their input order within
/// each level.
pub fn build_tree<T, I>(entities: I) -> Vec<TreeItem<T>>
where
    T: Foldered,
    I: IntoIterator<Item = T>,
{
    let mut root: Vec<TreeItem<T>> = Vec::new();

    for entity in entities {
        // Owned copy so `entity` can move into the tree afterwards
        let segments: Vec<String> = path_segments(entity.folder_path())
            .map(str::to_string)
            .collect();

        let mut level = &mut root;
        for segment in &segments {
            let index = match level
                .iter()
                .position(|item| matches!(item, TreeItem::Folder(f) if f.name == *segment))
            {
                Some(index) => index,
                None => {
                    level.push(TreeItem::Folder(FolderNode {
                        name: segment.clone(),
                        children: Vec::new(),
                    }));
                    level.len() - 1
                }
            };
            level = match &mut level[index] {
                TreeItem::Folder(folder) => &mut folder.children,
                TreeItem::Leaf(_) => unreachable!("index points at a folder"),
            };
        }
        level.push(TreeItem::Leaf(entity));
    }

    sort_folders_first(&mut root);
    root
}

fn sort_folders_first<T>(items: &mut [TreeItem<T>]) {
    // sort_by_key is stable: original order survives inside each partition
    items.sort_by_key(|item| !item.is_folder());
    for item in items.iter_mut() {
        if let TreeItem::Folder(folder) = item {
            sort_folders_first(&mut folder.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Entity {
        name: &'static str,
        folder: &'static str,
    }

    impl Foldered for Entity {
        fn folder_path(&self) -> &str {
            self.folder
        }
    }

    fn entity(name: &'static str, folder: &'static str) -> Entity {
        Entity { name, folder }
    }

    fn folder(name: &str, children: Vec<TreeItem<Entity>>) -> TreeItem<Entity> {
        TreeItem::Folder(FolderNode {
            name: name.to_string(),
            children,
        })
    }

    fn leaf(name: &'static str, folder: &'static str) -> TreeItem<Entity> {
        TreeItem::Leaf(entity(name, folder))
    }

    fn assert_folders_first(items: &[TreeItem<Entity>]) {
        let first_leaf = items.iter().position(|i| !i.is_folder()).unwrap_or(items.len());
        assert!(items[first_leaf..].iter().all(|i| !i.is_folder()));
        for item in items {
            if let TreeItem::Folder(f) = item {
                assert_folders_first(&f.children);
            }
        }
    }

    #[test]
    fn test_build_tree_nested_scenario() {
        let tree = build_tree(vec![
            entity("A", ""),
            entity("B", "X/Y"),
            entity("C", "X"),
        ]);

        assert_eq!(
            tree,
            vec![
                folder("X", vec![folder("Y", vec![leaf("B", "X/Y")]), leaf("C", "X")]),
                leaf("A", ""),
            ]
        );
    }

    #[test]
    fn test_shared_prefix_reuses_folder() {
        let tree = build_tree(vec![
            entity("core-1", "Sites/Paris"),
            entity("core-2", "Sites/Paris"),
            entity("lab", "Sites/Lyon"),
        ]);

        assert_eq!(tree.len(), 1);
        let TreeItem::Folder(sites) = &tree[0] else {
            panic!("expected a folder");
        };
        assert_eq!(sites.name, "Sites");
        assert_eq!(sites.children.len(), 2);
        let TreeItem::Folder(paris) = &sites.children[0] else {
            panic!("expected a folder");
        };
        assert_eq!(paris.children.len(), 2);
    }

    #[test]
    fn test_leaves_keep_input_order() {
        let tree = build_tree(vec![
            entity("zeta", ""),
            entity("alpha", ""),
            entity("moved", "Archive"),
            entity("beta", ""),
        ]);

        assert_eq!(
            tree,
            vec![
                folder("Archive", vec![leaf("moved", "Archive")]),
                leaf("zeta", ""),
                leaf("alpha", ""),
                leaf("beta", ""),
            ]
        );
    }

    #[test]
    fn test_segments_are_trimmed() {
        let tree = build_tree(vec![
            entity("a", "Sites / Paris"),
            entity("b", "/Sites//Paris/"),
            entity("c", "   "),
        ]);

        assert_eq!(
            tree,
            vec![
                folder(
                    "Sites",
                    vec![folder(
                        "Paris",
                        vec![leaf("a", "Sites / Paris"), leaf("b", "/Sites//Paris/")]
                    )]
                ),
                leaf("c", "   "),
            ]
        );
    }

    #[test]
    fn test_build_tree_is_idempotent() {
        let input = vec![
            entity("edge", "WAN"),
            entity("a", ""),
            entity("core", "DC/Room 1"),
            entity("b", "DC"),
            entity("fw", "WAN/Firewalls"),
        ];

        let first = build_tree(input.clone());
        let second = build_tree(input);
        assert_eq!(first, second);
        assert_folders_first(&first);
    }

    #[test]
    fn test_empty_input() {
        let tree: Vec<TreeItem<Entity>> = build_tree(Vec::new());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_path_segments() {
        let segments: Vec<&str> = path_segments(" folder A / Subfolder A /").collect();
        assert_eq!(segments, vec!["folder A", "Subfolder A"]);
        assert_eq!(path_segments("").count(), 0);
    }
}
