//! Placement of models in a folder hierarchy.
//!
//! A schema name is a dot-delimited path: the last segment is the class, the
//! second-to-last its folder, and any earlier segments are ancestor folders.
//! `orders.v1.Order` lives at `models/orders/v1/Order.py`, `Pet` at
//! `models/Pet.py`.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use indexmap::IndexMap;

use super::name_normalizer::sanitize_model_name;

/// Where one schema's class lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceNode {
    pub schema_name: String,
    /// Sanitized folder segments below `models/`, outermost first.
    pub folders: Vec<String>,
    pub class_name: String,
}

impl NamespaceNode {
    pub fn from_schema_name(schema_name: &str) -> Self {
        let mut segments: Vec<String> = schema_name.split('.').map(sanitize_model_name).collect();
        let class_name = segments.pop().unwrap_or_else(|| "Model".to_string());
        Self {
            schema_name: schema_name.to_string(),
            folders: segments,
            class_name,
        }
    }

    /// Path of the class file relative to the package root.
    pub fn file_path(&self) -> String {
        let mut parts = vec!["models".to_string()];
        parts.extend(self.folders.iter().cloned());
        parts.push(format!("{}.py", self.class_name));
        parts.join("/")
    }

    /// Relative import of the base model package from this class file.
    pub fn base_model_import(&self) -> String {
        format!("{}base.base_model", ".".repeat(self.folders.len() + 2))
    }

    /// Import path of this class from a module at the package root.
    pub fn package_import(&self) -> String {
        let mut parts = vec!["models".to_string()];
        parts.extend(self.folders.iter().cloned());
        parts.push(self.class_name.clone());
        format!(".{}", parts.join("."))
    }
}

/// A relative import from one folder to a class in another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPath {
    /// Folders to climb from the importing file's folder.
    pub up: usize,
    /// Folders to descend after climbing.
    pub down: Vec<String>,
    pub class_name: String,
}

impl ImportPath {
    pub fn is_same_folder(&self) -> bool {
        self.up == 0 && self.down.is_empty()
    }

    /// Python relative module path, e.g. `.Pet`, `..common.Error`.
    pub fn to_module_string(&self) -> String {
        if self.is_same_folder() {
            return format!(".{}", self.class_name);
        }
        let dots = ".".repeat(self.up + 1);
        if self.down.is_empty() {
            format!("{dots}{}", self.class_name)
        } else {
            format!("{dots}{}.{}", self.down.join("."), self.class_name)
        }
    }

    /// Walk this path starting at `from` and return the folder it lands in.
    pub fn target_folders(&self, from: &[String]) -> Option<Vec<String>> {
        let kept = from.len().checked_sub(self.up)?;
        let mut folders = from[..kept].to_vec();
        folders.extend(self.down.iter().cloned());
        Some(folders)
    }
}

/// Compute the relative import from a file in folder `from` to `to`'s class.
pub fn import_path(from: &[String], to: &NamespaceNode) -> ImportPath {
    let common = from
        .iter()
        .zip(&to.folders)
        .take_while(|(a, b)| a == b)
        .count();
    ImportPath {
        up: from.len() - common,
        down: to.folders[common..].to_vec(),
        class_name: to.class_name.clone(),
    }
}

/// One generated folder and what its `__init__.py` exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    pub path: Vec<String>,
    /// Classes placed directly in this folder, sorted.
    pub classes: Vec<String>,
    /// Immediate child folders, sorted.
    pub subfolders: Vec<String>,
}

impl FolderEntry {
    pub fn init_file_path(&self) -> String {
        let mut parts = vec!["models".to_string()];
        parts.extend(self.path.iter().cloned());
        parts.push("__init__.py".to_string());
        parts.join("/")
    }
}

/// The placement of every schema, with class names made unique per folder.
#[derive(Debug, Clone, Default)]
pub struct ModelLayout {
    nodes: IndexMap<String, NamespaceNode>,
    folders: BTreeMap<Vec<String>, FolderEntry>,
}

impl ModelLayout {
    pub fn build<'a, I>(schema_names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let candidates: Vec<NamespaceNode> = schema_names
            .into_iter()
            .map(NamespaceNode::from_schema_name)
            .collect();

        // Every folder holding a class, plus all of its ancestors and the root.
        let mut folder_paths: BTreeSet<Vec<String>> = BTreeSet::new();
        folder_paths.insert(Vec::new());
        for node in &candidates {
            for depth in 1..=node.folders.len() {
                folder_paths.insert(node.folders[..depth].to_vec());
            }
        }

        // A class file must not shadow a sibling package or another class.
        let mut taken: HashSet<(Vec<String>, String)> = folder_paths
            .iter()
            .filter_map(|p| p.split_last().map(|(last, parent)| (parent.to_vec(), last.clone())))
            .collect();

        let mut nodes = IndexMap::new();
        for mut node in candidates {
            let base = node.class_name.clone();
            let mut n = 1;
            while !taken.insert((node.folders.clone(), node.class_name.clone())) {
                n += 1;
                node.class_name = format!("{base}_{n}");
            }
            if node.class_name != base {
                log::debug!(
                    "schema {} placed as {} to avoid a name clash",
                    node.schema_name,
                    node.class_name
                );
            }
            nodes.insert(node.schema_name.clone(), node);
        }

        let mut folders: BTreeMap<Vec<String>, FolderEntry> = folder_paths
            .into_iter()
            .map(|path| {
                let entry = FolderEntry {
                    path: path.clone(),
                    classes: Vec::new(),
                    subfolders: Vec::new(),
                };
                (path, entry)
            })
            .collect();

        for node in nodes.values() {
            if let Some(entry) = folders.get_mut(&node.folders) {
                entry.classes.push(node.class_name.clone());
            }
        }
        let child_paths: Vec<Vec<String>> = folders.keys().skip(1).cloned().collect();
        for path in child_paths {
            let Some((last, parent)) = path.split_last() else {
                continue;
            };
            if let Some(entry) = folders.get_mut(parent) {
                entry.subfolders.push(last.clone());
            }
        }
        for entry in folders.values_mut() {
            entry.classes.sort();
            entry.subfolders.sort();
            entry.subfolders.dedup();
        }

        Self { nodes, folders }
    }

    pub fn node(&self, schema_name: &str) -> Option<&NamespaceNode> {
        self.nodes.get(schema_name)
    }

    /// Nodes in schema declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &NamespaceNode> {
        self.nodes.values()
    }

    /// Folders sorted by path, root first.
    pub fn folders(&self) -> impl Iterator<Item = &FolderEntry> {
        self.folders.values()
    }

    pub fn folder(&self, path: &[String]) -> Option<&FolderEntry> {
        self.folders.get(path)
    }

    /// Import from `from`'s class file to `to`'s class; `None` if either is unknown.
    pub fn import_between(&self, from: &str, to: &str) -> Option<ImportPath> {
        let from = self.node(from)?;
        let to = self.node(to)?;
        Some(import_path(&from.folders, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folders(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_node_from_dotted_name() {
        let n = NamespaceNode::from_schema_name("billing.invoices.Invoice");
        assert_eq!(n.folders, folders(&["billing", "invoices"]));
        assert_eq!(n.class_name, "Invoice");
        assert_eq!(n.file_path(), "models/billing/invoices/Invoice.py");
        assert_eq!(n.base_model_import(), "....base.base_model");
        assert_eq!(n.package_import(), ".models.billing.invoices.Invoice");

        let root = NamespaceNode::from_schema_name("Pet");
        assert!(root.folders.is_empty());
        assert_eq!(root.file_path(), "models/Pet.py");
        assert_eq!(root.base_model_import(), "..base.base_model");
    }

    #[test]
    fn test_segments_are_sanitized() {
        let n = NamespaceNode::from_schema_name("my-api.2fa.Token Info");
        assert_eq!(n.folders, folders(&["my_api", "Model_2fa"]));
        assert_eq!(n.class_name, "Token_Info");
    }

    #[test]
    fn test_import_same_folder() {
        let to = NamespaceNode::from_schema_name("a.B");
        let path = import_path(&folders(&["a"]), &to);
        assert!(path.is_same_folder());
        assert_eq!(path.to_module_string(), ".B");
    }

    #[test]
    fn test_import_up_and_down() {
        let to = NamespaceNode::from_schema_name("common.errors.Error");
        let from = folders(&["billing", "invoices"]);
        let path = import_path(&from, &to);
        assert_eq!(path.up, 2);
        assert_eq!(path.down, folders(&["common", "errors"]));
        assert_eq!(path.to_module_string(), "...common.errors.Error");
        assert_eq!(path.target_folders(&from), Some(to.folders.clone()));
    }

    #[test]
    fn test_import_to_root_and_into_child() {
        let root = NamespaceNode::from_schema_name("Pet");
        assert_eq!(import_path(&folders(&["a", "b"]), &root).to_module_string(), "...Pet");

        let child = NamespaceNode::from_schema_name("a.b.C");
        assert_eq!(import_path(&folders(&["a"]), &child).to_module_string(), "..b.C");
        assert_eq!(import_path(&[], &child).to_module_string(), ".a.b.C");
    }

    #[test]
    fn test_walk_lands_on_target_for_all_pairs() {
        let names = ["Pet", "a.B", "a.C", "a.b.D", "x.y.z.E", "x.F"];
        let layout = ModelLayout::build(names);
        for from in names {
            for to in names {
                let path = layout.import_between(from, to).unwrap();
                let from_node = layout.node(from).unwrap();
                let to_node = layout.node(to).unwrap();
                assert_eq!(
                    path.target_folders(&from_node.folders),
                    Some(to_node.folders.clone()),
                    "{from} -> {to}"
                );
                if from_node.folders == to_node.folders {
                    assert!(path.is_same_folder());
                }
            }
        }
    }

    #[test]
    fn test_folder_index_lists_direct_children_only() {
        let layout = ModelLayout::build(["Pet", "a.B", "a.b.C", "x.y.z.D"]);

        let root = layout.folder(&[]).unwrap();
        assert_eq!(root.classes, vec!["Pet"]);
        assert_eq!(root.subfolders, vec!["a", "x"]);

        let a = layout.folder(&folders(&["a"])).unwrap();
        assert_eq!(a.classes, vec!["B"]);
        assert_eq!(a.subfolders, vec!["b"]);

        let x = layout.folder(&folders(&["x"])).unwrap();
        assert!(x.classes.is_empty());
        assert_eq!(x.subfolders, vec!["y"]);
        assert_eq!(
            layout.folder(&folders(&["x", "y", "z"])).unwrap().classes,
            vec!["D"]
        );
        assert_eq!(layout.folders().count(), 6);
        assert_eq!(x.init_file_path(), "models/x/__init__.py");
    }

    #[test]
    fn test_empty_layout_has_root() {
        let layout = ModelLayout::build(Vec::<&str>::new());
        let root: Vec<&FolderEntry> = layout.folders().collect();
        assert_eq!(root.len(), 1);
        assert!(root[0].path.is_empty());
    }

    #[test]
    fn test_class_clashes_get_suffixes() {
        let layout = ModelLayout::build(["Pet", "Pet!", "Pet.Tag"]);
        // `Pet` collides with the `Pet/` package created by `Pet.Tag`.
        assert_eq!(layout.node("Pet").unwrap().class_name, "Pet_2");
        assert_eq!(layout.node("Pet!").unwrap().class_name, "Pet_3");
        assert_eq!(layout.node("Pet.Tag").unwrap().class_name, "Tag");
        let root = layout.folder(&[]).unwrap();
        assert_eq!(root.classes, vec!["Pet_2", "Pet_3"]);
        assert_eq!(root.subfolders, vec!["Pet"]);
    }
}
