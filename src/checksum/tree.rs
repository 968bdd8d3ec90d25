use super::nodes::*;
use super::{ChecksumListing, ChecksumRecord};
use crate::errors::ChecksumTreeError;
use crate::zarr::{DirPath, EntryPath};
use log::trace;
use std::collections::BTreeMap;
use termtree::Tree;

type NodeId = usize;

const ROOT: NodeId = 0;

/// An in-memory tree of file checksums from which the checksum of every
/// directory, up to the root, can be computed
///
/// Nodes are stored in an arena and refer to their children by index.
/// Directory digests are computed by an iterative post-order walk, so each
/// directory is summed only after all of its children.
///
/// Trees are not comparable with `==`, as node IDs depend on the order of
/// insertions and removals; compare their checksums or listings instead.
#[derive(Clone, Debug)]
pub struct ChecksumTree {
    // Slots of removed nodes are set to `None` and are not reused.
    nodes: Vec<Option<TreeNode>>,
}

#[derive(Clone, Debug)]
enum TreeNode {
    File(FileChecksum),
    Directory {
        relpath: DirPath,
        children: BTreeMap<String, NodeId>,
    },
}

impl ChecksumTree {
    pub fn new() -> Self {
        ChecksumTree {
            nodes: vec![Some(TreeNode::Directory {
                relpath: DirPath::Root,
                children: BTreeMap::new(),
            })],
        }
    }

    /// Add the checksum for a file, creating its parent directories as needed
    pub fn add_file(&mut self, node: FileChecksum) -> Result<(), ChecksumTreeError> {
        trace!("Adding {:?} to checksum tree", node.relpath());
        let parent = self.make_parents(node.relpath())?;
        match self.child(parent, node.relpath().file_name()) {
            Some(id) => match self.node(id) {
                TreeNode::File(_) => Err(ChecksumTreeError::DoubleAdd {
                    path: node.relpath,
                }),
                TreeNode::Directory { .. } => Err(ChecksumTreeError::PathTypeConflict {
                    path: node.relpath,
                }),
            },
            None => {
                let name = node.relpath().file_name().to_owned();
                self.insert(parent, name, TreeNode::File(node));
                Ok(())
            }
        }
    }

    /// Ensure that the given directory exists in the tree.  A directory with no
    /// entries has the checksum [`EMPTY_CHECKSUM`][super::EMPTY_CHECKSUM].
    pub fn add_directory(&mut self, path: EntryPath) -> Result<(), ChecksumTreeError> {
        trace!("Adding directory {path:?} to checksum tree");
        let parent = self.make_parents(&path)?;
        match self.child(parent, path.file_name()) {
            Some(id) => match self.node(id) {
                TreeNode::File(_) => Err(ChecksumTreeError::PathTypeConflict { path }),
                TreeNode::Directory { .. } => Ok(()),
            },
            None => {
                let name = path.file_name().to_owned();
                self.insert(
                    parent,
                    name,
                    TreeNode::Directory {
                        relpath: path.into(),
                        children: BTreeMap::new(),
                    },
                );
                Ok(())
            }
        }
    }

    /// Replace the checksum of a file already in the tree
    pub fn update_file(&mut self, node: FileChecksum) -> Result<(), ChecksumTreeError> {
        let id = self.lookup(node.relpath()).ok_or_else(|| ChecksumTreeError::NoSuchPath {
            path: node.relpath.clone(),
        })?;
        match self.nodes.get_mut(id).and_then(Option::as_mut) {
            Some(TreeNode::File(f)) => {
                trace!("Updating checksum for {:?} in checksum tree", f.relpath());
                *f = node;
                Ok(())
            }
            _ => Err(ChecksumTreeError::PathTypeConflict {
                path: node.relpath,
            }),
        }
    }

    /// Remove a file or an entire directory from the tree
    pub fn remove(&mut self, path: &EntryPath) -> Result<(), ChecksumTreeError> {
        let no_such_path = || ChecksumTreeError::NoSuchPath { path: path.clone() };
        let parent = match path.parent() {
            Some(p) => self.lookup(&p).ok_or_else(no_such_path)?,
            None => ROOT,
        };
        let id = match self.nodes.get_mut(parent).and_then(Option::as_mut) {
            Some(TreeNode::Directory { children, .. }) => children
                .remove(path.file_name())
                .ok_or_else(no_such_path)?,
            _ => return Err(no_such_path()),
        };
        trace!("Removing {path:?} from checksum tree");
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(TreeNode::Directory { children, .. }) =
                self.nodes.get_mut(id).and_then(Option::take)
            {
                stack.extend(children.into_values());
            }
        }
        Ok(())
    }

    pub fn from_files<I: IntoIterator<Item = FileChecksum>>(
        iter: I,
    ) -> Result<ChecksumTree, ChecksumTreeError> {
        let mut zarr = ChecksumTree::new();
        for node in iter {
            zarr.add_file(node)?;
        }
        Ok(zarr)
    }

    /// True iff the tree contains no files or directories other than the root
    pub fn is_empty(&self) -> bool {
        matches!(self.node(ROOT), TreeNode::Directory { children, .. } if children.is_empty())
    }

    /// Compute the checksum of the root of the tree
    pub fn checksum(&self) -> String {
        self.reduce(|_, _, _| ())
    }

    /// Compute the checksum listing of every directory in the tree that has
    /// at least one entry.  Subdirectories are listed before their parents,
    /// and the root, if nonempty, is listed last.
    pub fn listings(&self) -> Vec<(DirPath, ChecksumListing)> {
        let mut listings = Vec::new();
        self.reduce(|_, relpath, listing| {
            if !listing.checksums().is_empty() {
                listings.push((relpath.clone(), listing.clone()));
            }
        });
        listings
    }

    /// Render the tree with each entry labelled by its name and checksum
    pub fn to_termtree(&self) -> Tree<String> {
        let mut digests = BTreeMap::new();
        self.reduce(|id, _, listing| {
            digests.insert(id, listing.digest().to_owned());
        });
        self.render(ROOT, &digests)
    }

    fn render(&self, id: NodeId, digests: &BTreeMap<NodeId, String>) -> Tree<String> {
        match self.node(id) {
            TreeNode::File(f) => Tree::new(format!("{} {}", f.name(), f.checksum())),
            TreeNode::Directory { relpath, children } => {
                let name = match relpath {
                    DirPath::Root => ".",
                    DirPath::Path(ep) => ep.file_name(),
                };
                let digest = digests.get(&id).map_or("", String::as_str);
                Tree::new(format!("{name}/ {digest}")).with_leaves(
                    children
                        .values()
                        .map(|&child| self.render(child, digests)),
                )
            }
        }
    }

    /// Compute the listing of every directory from the bottom up, passing
    /// each to `on_dir` along with the directory's node ID and path, and
    /// return the checksum of the root
    fn reduce<F>(&self, mut on_dir: F) -> String
    where
        F: FnMut(NodeId, &DirPath, &ChecksumListing),
    {
        let mut dir_digests: Vec<Option<String>> = vec![None; self.nodes.len()];
        // Each directory is pushed twice: once to schedule its subdirectories
        // and once, after they are done, to sum it.
        let mut stack = vec![(ROOT, false)];
        let mut root_digest = None;
        while let Some((id, expanded)) = stack.pop() {
            let TreeNode::Directory { relpath, children } = self.node(id) else {
                continue;
            };
            if !expanded {
                stack.push((id, true));
                stack.extend(
                    children
                        .values()
                        .filter(|&&child| matches!(self.node(child), TreeNode::Directory { .. }))
                        .map(|&child| (child, false)),
                );
                continue;
            }
            // Children are keyed by name, and their paths all share the
            // directory's path as a prefix, so both lists come out sorted.
            let mut files = Vec::new();
            let mut directories = Vec::new();
            for &child in children.values() {
                match self.node(child) {
                    TreeNode::File(f) => files.push(f.to_record()),
                    TreeNode::Directory {
                        relpath: DirPath::Path(ep),
                        ..
                    } => {
                        let digest = dir_digests
                            .get_mut(child)
                            .and_then(Option::take)
                            .unwrap_or_default();
                        directories.push(ChecksumRecord::new(ep.as_str(), digest));
                    }
                    TreeNode::Directory {
                        relpath: DirPath::Root,
                        ..
                    } => unreachable!("root directory should not be a child"),
                }
            }
            let listing =
                Dirsummer::from_sorted(relpath.clone(), files, directories).into_listing();
            on_dir(id, relpath, &listing);
            let digest = listing.into_parts().1;
            if id == ROOT {
                root_digest = Some(digest);
            } else if let Some(slot) = dir_digests.get_mut(id) {
                *slot = Some(digest);
            }
        }
        root_digest.unwrap_or_else(|| unreachable!("root directory should always be summed"))
    }

    fn node(&self, id: NodeId) -> &TreeNode {
        self.nodes
            .get(id)
            .and_then(Option::as_ref)
            .expect("linked node ids should refer to live nodes")
    }

    fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        match self.node(parent) {
            TreeNode::Directory { children, .. } => children.get(name).copied(),
            TreeNode::File(_) => None,
        }
    }

    fn insert(&mut self, parent: NodeId, name: String, node: TreeNode) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Some(node));
        if let Some(Some(TreeNode::Directory { children, .. })) = self.nodes.get_mut(parent) {
            children.insert(name, id);
        }
        id
    }

    /// Find the node at the given path
    fn lookup(&self, path: &EntryPath) -> Option<NodeId> {
        path.components()
            .try_fold(ROOT, |id, name| self.child(id, name))
    }

    /// Create any missing parent directories of `path` and return the ID of
    /// its immediate parent
    fn make_parents(&mut self, path: &EntryPath) -> Result<NodeId, ChecksumTreeError> {
        let mut id = ROOT;
        for parent in path.parents() {
            id = match self.child(id, parent.file_name()) {
                Some(child) => match self.node(child) {
                    TreeNode::Directory { .. } => child,
                    TreeNode::File(_) => {
                        return Err(ChecksumTreeError::PathTypeConflict { path: parent })
                    }
                },
                None => {
                    let name = parent.file_name().to_owned();
                    self.insert(
                        id,
                        name,
                        TreeNode::Directory {
                            relpath: parent.into(),
                            children: BTreeMap::new(),
                        },
                    )
                }
            };
        }
        Ok(id)
    }
}

impl Default for ChecksumTree {
    fn default() -> Self {
        ChecksumTree::new()
    }
}

/// Compute the checksum of a Zarr from the checksums of all of its files
pub fn compile_checksum<I: IntoIterator<Item = FileChecksum>>(
    iter: I,
) -> Result<String, ChecksumTreeError> {
    Ok(ChecksumTree::from_files(iter)?.checksum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::{
        aggregate_digest, compute_directory_digest, ChecksumCollection, ChecksumRecord,
        EMPTY_CHECKSUM,
    };
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    const SAMPLE_CHECKSUM: &str = "5687f01b69428c2d11370d461c412f87";

    fn file(path: &str, checksum: &str) -> FileChecksum {
        FileChecksum::new(EntryPath::try_from(path).unwrap(), checksum)
    }

    fn ep(s: &str) -> EntryPath {
        EntryPath::try_from(s).unwrap()
    }

    fn sample_files() -> Vec<FileChecksum> {
        vec![
            file("arr_0/.zarray", "9e30a0a1a465e24220d4132fdd544634"),
            file("arr_0/0", "ed4e934a474f1d2096846c6248f18c00"),
            file("arr_1/.zarray", "9e30a0a1a465e24220d4132fdd544634"),
            file("arr_1/0", "fba4dee03a51bde314e9713b00284a93"),
            file(".zgroup", "e20297935e73dd0154104d4ea53040ab"),
        ]
    }

    #[test]
    fn test_empty_tree() {
        let tree = ChecksumTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.checksum(), EMPTY_CHECKSUM);
        assert!(tree.listings().is_empty());
    }

    #[test]
    fn test_checksum_tree() {
        let mut sample = ChecksumTree::new();
        for f in sample_files() {
            sample.add_file(f).unwrap();
        }
        assert!(!sample.is_empty());
        assert_eq!(sample.checksum(), SAMPLE_CHECKSUM);
    }

    #[test]
    fn test_from_files_any_order() {
        let mut files = sample_files();
        files.reverse();
        assert_eq!(compile_checksum(files).unwrap(), SAMPLE_CHECKSUM);
    }

    #[test]
    fn test_matches_manual_aggregation() {
        let arr_0 = compute_directory_digest(
            HashMap::from([
                ("arr_0/.zarray", "9e30a0a1a465e24220d4132fdd544634"),
                ("arr_0/0", "ed4e934a474f1d2096846c6248f18c00"),
            ]),
            HashMap::<String, String>::new(),
        );
        let arr_1 = compute_directory_digest(
            HashMap::from([
                ("arr_1/.zarray", "9e30a0a1a465e24220d4132fdd544634"),
                ("arr_1/0", "fba4dee03a51bde314e9713b00284a93"),
            ]),
            HashMap::<String, String>::new(),
        );
        let root = compute_directory_digest(
            HashMap::from([(".zgroup", "e20297935e73dd0154104d4ea53040ab")]),
            HashMap::from([("arr_0", arr_0), ("arr_1", arr_1)]),
        );
        assert_eq!(root, SAMPLE_CHECKSUM);
    }

    #[test]
    fn test_listings() {
        let tree = ChecksumTree::from_files(sample_files()).unwrap();
        let listings = tree.listings();
        let summary = listings
            .iter()
            .map(|(path, listing)| (path.to_string(), listing.digest()))
            .collect::<Vec<_>>();
        assert_eq!(summary.len(), 3);
        assert!(summary.contains(&("arr_0".into(), "1a20ddc1654120e0ab24e894b706fe17")));
        assert!(summary.contains(&("arr_1".into(), "3109ca698b950451b45ca016bdb8b1e4")));
        assert_eq!(summary.last(), Some(&("<root>".into(), SAMPLE_CHECKSUM)));
        let (_, root) = listings.last().unwrap();
        assert_eq!(
            *root.checksums(),
            ChecksumCollection::new(
                [ChecksumRecord::new(
                    ".zgroup",
                    "e20297935e73dd0154104d4ea53040ab"
                )],
                [
                    ChecksumRecord::new("arr_0", "1a20ddc1654120e0ab24e894b706fe17"),
                    ChecksumRecord::new("arr_1", "3109ca698b950451b45ca016bdb8b1e4"),
                ],
            )
        );
        for (_, listing) in &listings {
            assert_matches!(listing.verify(), Ok(()));
        }
    }

    #[test]
    fn test_empty_directories_participate() {
        let mut tree = ChecksumTree::from_files(sample_files()).unwrap();
        tree.add_directory(ep("arr_2")).unwrap();
        tree.add_directory(ep("arr_3/foo")).unwrap();
        assert_eq!(tree.checksum(), "6c13a4498c62ade63289a8009849dc5b");
        // arr_3 contains only an empty directory, so it gets a listing, but
        // arr_2 and arr_3/foo do not
        assert_eq!(tree.listings().len(), 4);
    }

    #[test]
    fn test_nested() {
        let mut files = sample_files();
        files.push(file("arr_0/sub/1", "0123456789abcdef0123456789abcdef"));
        assert_eq!(
            compile_checksum(files).unwrap(),
            "8560b1b58022f8cf7942c156f225653e"
        );
    }

    #[test]
    fn test_update_file() {
        let mut tree = ChecksumTree::from_files(sample_files()).unwrap();
        tree.update_file(file("arr_1/0", "00000000000000000000000000000000"))
            .unwrap();
        assert_eq!(tree.checksum(), "dca22b1cab2d2efab71606db28c80954");
    }

    #[test]
    fn test_remove_directory() {
        let mut tree = ChecksumTree::from_files(sample_files()).unwrap();
        tree.remove(&ep("arr_1")).unwrap();
        assert_eq!(tree.checksum(), "cad281416d5e28aba97d946e2b5d2cc4");
        assert_eq!(
            tree.remove(&ep("arr_1/0")),
            Err(ChecksumTreeError::NoSuchPath { path: ep("arr_1/0") })
        );
        tree.add_file(file("arr_1/.zarray", "9e30a0a1a465e24220d4132fdd544634"))
            .unwrap();
        tree.add_file(file("arr_1/0", "fba4dee03a51bde314e9713b00284a93"))
            .unwrap();
        assert_eq!(tree.checksum(), SAMPLE_CHECKSUM);
    }

    #[test]
    fn test_rebuilt_tree_matches_fresh_tree() {
        let mut rebuilt = ChecksumTree::from_files(sample_files()).unwrap();
        rebuilt.remove(&ep("arr_0")).unwrap();
        rebuilt
            .add_file(file("arr_0/0", "ed4e934a474f1d2096846c6248f18c00"))
            .unwrap();
        rebuilt
            .add_file(file("arr_0/.zarray", "9e30a0a1a465e24220d4132fdd544634"))
            .unwrap();
        let fresh = ChecksumTree::from_files(sample_files()).unwrap();
        assert_eq!(rebuilt.checksum(), fresh.checksum());
        assert_eq!(rebuilt.listings(), fresh.listings());
        assert_eq!(
            rebuilt.to_termtree().to_string(),
            fresh.to_termtree().to_string()
        );
    }

    #[test]
    fn test_wide_directory() {
        let files = (0..2000)
            .rev()
            .map(|i| file(&format!("arr_0/{i}"), "ed4e934a474f1d2096846c6248f18c00"))
            .collect::<Vec<_>>();
        let tree = ChecksumTree::from_files(files).unwrap();
        let listings = tree.listings();
        let (_, arr_0) = listings
            .iter()
            .find(|(p, _)| p == &DirPath::from(ep("arr_0")))
            .unwrap();
        assert_eq!(arr_0.checksums().files().len(), 2000);
        assert!(arr_0
            .checksums()
            .files()
            .windows(2)
            .all(|w| w[0].path() < w[1].path()));
        assert_matches!(arr_0.verify(), Ok(()));
        let collection = ChecksumCollection::new(arr_0.checksums().files().to_vec(), []);
        assert_eq!(arr_0.digest(), aggregate_digest(&collection));
    }

    #[test]
    fn test_remove_everything() {
        let mut tree = ChecksumTree::from_files(sample_files()).unwrap();
        for p in ["arr_0", "arr_1", ".zgroup"] {
            tree.remove(&ep(p)).unwrap();
        }
        assert!(tree.is_empty());
        assert_eq!(tree.checksum(), EMPTY_CHECKSUM);
    }

    #[test]
    fn test_double_add() {
        let mut tree = ChecksumTree::from_files(sample_files()).unwrap();
        assert_eq!(
            tree.add_file(file("arr_0/0", "ed4e934a474f1d2096846c6248f18c00")),
            Err(ChecksumTreeError::DoubleAdd { path: ep("arr_0/0") })
        );
    }

    #[test]
    fn test_file_as_directory() {
        let mut tree = ChecksumTree::from_files(sample_files()).unwrap();
        assert_eq!(
            tree.add_file(file(".zgroup/foo", "ed4e934a474f1d2096846c6248f18c00")),
            Err(ChecksumTreeError::PathTypeConflict { path: ep(".zgroup") })
        );
        assert_eq!(
            tree.add_directory(ep(".zgroup")),
            Err(ChecksumTreeError::PathTypeConflict { path: ep(".zgroup") })
        );
    }

    #[test]
    fn test_directory_as_file() {
        let mut tree = ChecksumTree::from_files(sample_files()).unwrap();
        assert_eq!(
            tree.add_file(file("arr_0", "ed4e934a474f1d2096846c6248f18c00")),
            Err(ChecksumTreeError::PathTypeConflict { path: ep("arr_0") })
        );
        assert_eq!(
            tree.update_file(file("arr_0", "ed4e934a474f1d2096846c6248f18c00")),
            Err(ChecksumTreeError::PathTypeConflict { path: ep("arr_0") })
        );
        assert_eq!(
            tree.update_file(file("arr_9/0", "ed4e934a474f1d2096846c6248f18c00")),
            Err(ChecksumTreeError::NoSuchPath { path: ep("arr_9/0") })
        );
    }

    #[test]
    fn test_to_termtree() {
        let tree = ChecksumTree::from_files([
            file("arr_0/0", "ed4e934a474f1d2096846c6248f18c00"),
            file(".zgroup", "e20297935e73dd0154104d4ea53040ab"),
        ])
        .unwrap();
        let rendered = tree.to_termtree().to_string();
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("./ "));
        assert!(rendered.contains(".zgroup e20297935e73dd0154104d4ea53040ab"));
        assert!(rendered.contains("arr_0/ "));
        assert!(rendered.contains("0 ed4e934a474f1d2096846c6248f18c00"));
        assert!(lines[0].ends_with(&tree.checksum()));
    }
}
