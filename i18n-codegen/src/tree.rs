//! The message tree.
//!
//! Entries live in an arena owned by [`MessageTree`] and are addressed by
//! [`EntryId`]. A bag owns its children; the parent link of an entry is only a
//! back-reference used to rebuild dotted paths. Children of every bag are kept
//! sorted by key.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::arguments::{ArgumentCollision, ArgumentList};
use crate::error::Error;
use crate::values::MessageValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Bag,
    Instance,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Bag => write!(f, "bag"),
            EntryKind::Instance => write!(f, "message"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageBag {
    /// Display name overriding the generated interface name.
    pub name: Option<String>,
    children: Vec<EntryId>,
}

impl MessageBag {
    pub fn children(&self) -> &[EntryId] {
        &self.children
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageInstance {
    pub args: ArgumentList,
    /// One value per language tag.
    pub messages: BTreeMap<String, MessageValue>,
}

impl MessageInstance {
    pub fn new(args: ArgumentList) -> Self {
        MessageInstance {
            args,
            messages: BTreeMap::new(),
        }
    }

    pub fn with_message(mut self, language: impl Into<String>, value: MessageValue) -> Self {
        self.messages.insert(language.into(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Bag(MessageBag),
    Instance(MessageInstance),
}

impl Node {
    pub fn kind(&self) -> EntryKind {
        match self {
            Node::Bag(_) => EntryKind::Bag,
            Node::Instance(_) => EntryKind::Instance,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub parent: Option<EntryId>,
    pub node: Node,
}

/// A problem found while merging two trees that does not stop the merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeConflict {
    Argument {
        path: String,
        collision: ArgumentCollision,
    },
    BagName {
        path: String,
        existing: String,
        added: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageTree {
    entries: Vec<Entry>,
    root: EntryId,
}

impl Default for MessageTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageTree {
    /// A tree holding only the root bag.
    pub fn new() -> Self {
        MessageTree {
            entries: vec![Entry {
                key: String::new(),
                parent: None,
                node: Node::Bag(MessageBag::default()),
            }],
            root: EntryId(0),
        }
    }

    pub fn root(&self) -> EntryId {
        self.root
    }

    pub fn is_root(&self, id: EntryId) -> bool {
        id == self.root
    }

    pub fn entry(&self, id: EntryId) -> &Entry {
        &self.entries[id.0]
    }

    pub fn key(&self, id: EntryId) -> &str {
        &self.entry(id).key
    }

    pub fn parent(&self, id: EntryId) -> Option<EntryId> {
        self.entry(id).parent
    }

    pub fn kind(&self, id: EntryId) -> EntryKind {
        self.entry(id).node.kind()
    }

    pub fn bag(&self, id: EntryId) -> Option<&MessageBag> {
        match &self.entry(id).node {
            Node::Bag(bag) => Some(bag),
            Node::Instance(_) => None,
        }
    }

    fn bag_mut(&mut self, id: EntryId) -> Option<&mut MessageBag> {
        match &mut self.entries[id.0].node {
            Node::Bag(bag) => Some(bag),
            Node::Instance(_) => None,
        }
    }

    pub fn instance(&self, id: EntryId) -> Option<&MessageInstance> {
        match &self.entry(id).node {
            Node::Instance(instance) => Some(instance),
            Node::Bag(_) => None,
        }
    }

    pub fn instance_mut(&mut self, id: EntryId) -> Option<&mut MessageInstance> {
        match &mut self.entries[id.0].node {
            Node::Instance(instance) => Some(instance),
            Node::Bag(_) => None,
        }
    }

    /// Children of a bag in key order; empty for an instance.
    pub fn children(&self, id: EntryId) -> &[EntryId] {
        self.bag(id).map(MessageBag::children).unwrap_or_default()
    }

    pub fn child(&self, bag: EntryId, key: &str) -> Option<EntryId> {
        let children = self.children(bag);
        children
            .binary_search_by(|child| self.key(*child).cmp(key))
            .ok()
            .map(|index| children[index])
    }

    /// Keys from the root down to `id`, the root itself excluded.
    pub fn path(&self, id: EntryId) -> Vec<&str> {
        let mut keys = Vec::new();
        let mut current = Some(id);
        while let Some(entry_id) = current {
            if self.is_root(entry_id) {
                break;
            }
            let entry = self.entry(entry_id);
            keys.push(entry.key.as_str());
            current = entry.parent;
        }
        keys.reverse();
        keys
    }

    /// Dotted path of `id`, empty for the root.
    pub fn path_string(&self, id: EntryId) -> String {
        self.path(id).join(".")
    }

    /// Dotted path a child named `key` of `bag` would have.
    pub fn child_path_string(&self, bag: EntryId, key: &str) -> String {
        if self.is_root(bag) {
            key.to_string()
        } else {
            format!("{}.{}", self.path_string(bag), key)
        }
    }

    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<EntryId> {
        path.iter()
            .try_fold(self.root, |current, key| self.child(current, key.as_ref()))
    }

    fn insert_child(&mut self, parent: EntryId, key: &str, node: Node) -> EntryId {
        let id = EntryId(self.entries.len());
        self.entries.push(Entry {
            key: key.to_string(),
            parent: Some(parent),
            node,
        });

        let keys: Vec<&str> = self
            .children(parent)
            .iter()
            .map(|child| self.entries[child.0].key.as_str())
            .collect();
        let position = keys.partition_point(|existing| *existing < key);
        if let Some(bag) = self.bag_mut(parent) {
            bag.children.insert(position, id);
        }
        id
    }

    /// Returns the child bag `key` of `parent`, creating it when missing.
    pub fn add_bag(&mut self, parent: EntryId, key: &str) -> Result<EntryId, Error> {
        match self.child(parent, key) {
            Some(existing) => match self.kind(existing) {
                EntryKind::Bag => Ok(existing),
                EntryKind::Instance => Err(Error::EntryKindMismatch {
                    path: self.path_string(existing),
                    existing: EntryKind::Instance,
                    added: EntryKind::Bag,
                }),
            },
            None => Ok(self.insert_child(parent, key, Node::Bag(MessageBag::default()))),
        }
    }

    /// Walks `path` from the root, creating missing bags along the way.
    pub fn find_or_create_bag<S: AsRef<str>>(&mut self, path: &[S]) -> Result<EntryId, Error> {
        let mut current = self.root;
        for key in path {
            let key = key.as_ref();
            current = match self.child(current, key) {
                Some(existing) if self.kind(existing) == EntryKind::Instance => {
                    return Err(Error::ParentIsNotBag {
                        path: path
                            .iter()
                            .map(AsRef::as_ref)
                            .collect::<Vec<_>>()
                            .join("."),
                        at: self.path_string(existing),
                    });
                }
                Some(existing) => existing,
                None => self.insert_child(current, key, Node::Bag(MessageBag::default())),
            };
        }
        Ok(current)
    }

    /// Inserts `instance` under `parent`, or merges it into the instance
    /// already stored under `key`.
    ///
    /// Redefining a language of an existing instance is fatal. Argument type
    /// collisions are returned and the existing types are kept.
    pub fn add_instance(
        &mut self,
        parent: EntryId,
        key: &str,
        instance: MessageInstance,
    ) -> Result<(EntryId, Vec<ArgumentCollision>), Error> {
        let Some(existing_id) = self.child(parent, key) else {
            let id = self.insert_child(parent, key, Node::Instance(instance));
            return Ok((id, Vec::new()));
        };

        let path = self.path_string(existing_id);
        let Some(existing) = self.instance_mut(existing_id) else {
            return Err(Error::EntryKindMismatch {
                path,
                existing: EntryKind::Bag,
                added: EntryKind::Instance,
            });
        };

        if let Some(language) = instance
            .messages
            .keys()
            .find(|language| existing.messages.contains_key(*language))
        {
            return Err(Error::MessageRedefinition {
                path,
                language: language.clone(),
            });
        }

        let collisions = existing.args.merge(&instance.args);
        existing.messages.extend(instance.messages);
        Ok((existing_id, collisions))
    }

    /// Sets the display name of a bag. The first name wins; a different name
    /// given later is returned as the error value.
    pub fn set_bag_name(&mut self, bag: EntryId, name: &str) -> Result<(), String> {
        let Some(bag) = self.bag_mut(bag) else {
            return Ok(());
        };
        match &bag.name {
            None => {
                bag.name = Some(name.to_string());
                Ok(())
            }
            Some(existing) if existing == name => Ok(()),
            Some(existing) => Err(existing.clone()),
        }
    }

    /// Copies the children of `other`'s root into the bag `dest`, merging
    /// entries that already exist.
    pub fn merge_into(
        &mut self,
        dest: EntryId,
        other: &MessageTree,
    ) -> Result<Vec<MergeConflict>, Error> {
        let mut conflicts = Vec::new();
        self.merge_children(dest, other, other.root, &mut conflicts)?;
        Ok(conflicts)
    }

    fn merge_children(
        &mut self,
        dest: EntryId,
        other: &MessageTree,
        source: EntryId,
        conflicts: &mut Vec<MergeConflict>,
    ) -> Result<(), Error> {
        for &child in other.children(source) {
            let key = other.key(child);
            match &other.entry(child).node {
                Node::Bag(bag) => {
                    let target = self.add_bag(dest, key)?;
                    if let Some(name) = &bag.name {
                        if let Err(existing) = self.set_bag_name(target, name) {
                            conflicts.push(MergeConflict::BagName {
                                path: self.path_string(target),
                                existing,
                                added: name.clone(),
                            });
                        }
                    }
                    self.merge_children(target, other, child, conflicts)?;
                }
                Node::Instance(instance) => {
                    let (id, collisions) = self.add_instance(dest, key, instance.clone())?;
                    let path = self.path_string(id);
                    conflicts.extend(collisions.into_iter().map(|collision| {
                        MergeConflict::Argument {
                            path: path.clone(),
                            collision,
                        }
                    }));
                }
            }
        }
        Ok(())
    }

    /// Detaches `id` from its parent. The root cannot be removed.
    pub fn remove(&mut self, id: EntryId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        match self.bag_mut(parent) {
            Some(bag) => {
                let before = bag.children.len();
                bag.children.retain(|child| *child != id);
                bag.children.len() != before
            }
            None => false,
        }
    }

    /// Every entry reachable from the root, parents before children.
    pub fn walk(&self) -> Vec<EntryId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    pub fn instance_ids(&self) -> Vec<EntryId> {
        self.walk()
            .into_iter()
            .filter(|id| self.kind(*id) == EntryKind::Instance)
            .collect()
    }

    pub fn bag_ids(&self) -> Vec<EntryId> {
        self.walk()
            .into_iter()
            .filter(|id| self.kind(*id) == EntryKind::Bag)
            .collect()
    }

    /// Every language tag used by a reachable instance.
    pub fn languages(&self) -> BTreeSet<String> {
        self.instance_ids()
            .into_iter()
            .filter_map(|id| self.instance(id))
            .flat_map(|instance| instance.messages.keys().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::{ArgumentTypeRegistry, MessageArgument};

    fn literal(language: &str, text: &str) -> MessageInstance {
        MessageInstance::default().with_message(language, MessageValue::Literal(text.to_string()))
    }

    #[test]
    fn test_children_stay_sorted() {
        let mut tree = MessageTree::new();
        let root = tree.root();
        for key in ["zeta", "alpha", "mid", "Beta"] {
            tree.add_instance(root, key, literal("en", key)).unwrap();
        }
        let keys: Vec<_> = tree.children(root).iter().map(|id| tree.key(*id)).collect();
        assert_eq!(keys, vec!["Beta", "alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_paths() {
        let mut tree = MessageTree::new();
        let bag = tree.find_or_create_bag(&["cmds", "help"]).unwrap();
        let (id, _) = tree.add_instance(bag, "usage", literal("en", "x")).unwrap();

        assert_eq!(tree.path_string(id), "cmds.help.usage");
        assert_eq!(tree.path_string(tree.root()), "");
        assert_eq!(tree.child_path_string(tree.root(), "top"), "top");
        assert_eq!(tree.child_path_string(bag, "other"), "cmds.help.other");
        assert_eq!(tree.find(&["cmds", "help", "usage"]), Some(id));
        assert_eq!(tree.find(&["cmds", "missing"]), None);
    }

    #[test]
    fn test_find_or_create_reuses_bags() {
        let mut tree = MessageTree::new();
        let first = tree.find_or_create_bag(&["a", "b"]).unwrap();
        let second = tree.find_or_create_bag(&["a", "b"]).unwrap();
        assert_eq!(first, second);
        assert_eq!(tree.children(tree.root()).len(), 1);
    }

    #[test]
    fn test_find_or_create_through_instance_fails() {
        let mut tree = MessageTree::new();
        let root = tree.root();
        tree.add_instance(root, "a", literal("en", "x")).unwrap();
        let err = tree.find_or_create_bag(&["a", "b"]).unwrap_err();
        assert!(matches!(err, Error::ParentIsNotBag { ref at, .. } if at == "a"));
    }

    #[test]
    fn test_kind_mismatch_is_fatal() {
        let mut tree = MessageTree::new();
        let root = tree.root();
        tree.add_bag(root, "cmds").unwrap();
        let err = tree.add_instance(root, "cmds", literal("en", "x")).unwrap_err();
        assert!(matches!(
            err,
            Error::EntryKindMismatch {
                existing: EntryKind::Bag,
                added: EntryKind::Instance,
                ..
            }
        ));

        tree.add_instance(root, "leaf", literal("en", "x")).unwrap();
        assert!(tree.add_bag(root, "leaf").is_err());
    }

    #[test]
    fn test_redefinition_is_fatal() {
        let mut tree = MessageTree::new();
        let root = tree.root();
        tree.add_instance(root, "key1", literal("en", "a")).unwrap();
        let err = tree.add_instance(root, "key1", literal("en", "b")).unwrap_err();
        assert!(matches!(
            err,
            Error::MessageRedefinition { ref path, ref language } if path == "key1" && language == "en"
        ));
    }

    #[test]
    fn test_instances_merge_languages_and_arguments() {
        let registry = ArgumentTypeRegistry::builtin();
        let mut tree = MessageTree::new();
        let root = tree.root();

        let mut en_args = ArgumentList::new();
        en_args
            .add(MessageArgument::new("n", registry.unknown().clone()))
            .unwrap();
        let mut es_args = ArgumentList::new();
        es_args
            .add(MessageArgument::new("n", registry.find("int").unwrap().clone()))
            .unwrap();

        let en = MessageInstance::new(en_args).with_message("en", MessageValue::Literal("a".into()));
        let es = MessageInstance::new(es_args).with_message("es", MessageValue::Literal("b".into()));
        tree.add_instance(root, "msg", en).unwrap();
        let (id, collisions) = tree.add_instance(root, "msg", es).unwrap();

        assert!(collisions.is_empty());
        let instance = tree.instance(id).unwrap();
        assert_eq!(instance.messages.len(), 2);
        assert_eq!(instance.args.get("n").unwrap().kind.name, "int");
    }

    #[test]
    fn test_bag_name_first_wins() {
        let mut tree = MessageTree::new();
        let root = tree.root();
        let bag = tree.add_bag(root, "cmds").unwrap();
        assert!(tree.set_bag_name(bag, "Commands").is_ok());
        assert!(tree.set_bag_name(bag, "Commands").is_ok());
        assert_eq!(tree.set_bag_name(bag, "Other"), Err("Commands".to_string()));
        assert_eq!(tree.bag(bag).unwrap().name.as_deref(), Some("Commands"));
    }

    #[test]
    fn test_remove_detaches() {
        let mut tree = MessageTree::new();
        let root = tree.root();
        let (id, _) = tree.add_instance(root, "gone", literal("fr", "x")).unwrap();
        tree.add_instance(root, "kept", literal("en", "y")).unwrap();

        assert!(tree.remove(id));
        assert!(!tree.remove(id));
        assert!(!tree.remove(root));
        assert_eq!(tree.child(root, "gone"), None);
        assert_eq!(tree.instance_ids().len(), 1);
        assert_eq!(
            tree.languages().into_iter().collect::<Vec<_>>(),
            vec!["en".to_string()]
        );
    }

    #[test]
    fn test_merge_into_flattens_root() {
        let mut shared = MessageTree::new();
        let dest = shared.find_or_create_bag(&["cmds"]).unwrap();
        let dest_root = shared.root();
        shared.add_instance(dest, "a", literal("en", "a")).unwrap();

        let mut file = MessageTree::new();
        let file_root = file.root();
        file.add_instance(file_root, "b", literal("en", "b")).unwrap();
        let nested = file.add_bag(file_root, "sub").unwrap();
        file.set_bag_name(nested, "Sub").unwrap();
        file.add_instance(nested, "c", literal("en", "c")).unwrap();

        let conflicts = shared.merge_into(dest, &file).unwrap();
        assert!(conflicts.is_empty());
        assert!(shared.find(&["cmds", "b"]).is_some());
        assert!(shared.find(&["cmds", "sub", "c"]).is_some());
        assert_eq!(shared.children(dest_root).len(), 1);

        let sub = shared.find(&["cmds", "sub"]).unwrap();
        assert_eq!(shared.bag(sub).unwrap().name.as_deref(), Some("Sub"));
    }

    #[test]
    fn test_merge_into_reports_bag_name_conflicts() {
        let mut shared = MessageTree::new();
        let root = shared.root();
        let bag = shared.add_bag(root, "cmds").unwrap();
        shared.set_bag_name(bag, "Commands").unwrap();

        let mut file = MessageTree::new();
        let file_root = file.root();
        let other = file.add_bag(file_root, "cmds").unwrap();
        file.set_bag_name(other, "Cmds").unwrap();

        let conflicts = shared.merge_into(root, &file).unwrap();
        assert_eq!(
            conflicts,
            vec![MergeConflict::BagName {
                path: "cmds".to_string(),
                existing: "Commands".to_string(),
                added: "Cmds".to_string(),
            }]
        );
    }

    #[test]
    fn test_walk_is_depth_first_in_key_order() {
        let mut tree = MessageTree::new();
        let root = tree.root();
        let b = tree.add_bag(root, "b").unwrap();
        tree.add_instance(b, "inner", literal("en", "x")).unwrap();
        tree.add_instance(root, "a", literal("en", "y")).unwrap();
        tree.add_instance(root, "c", literal("en", "z")).unwrap();

        let paths: Vec<_> = tree.walk().into_iter().map(|id| tree.path_string(id)).collect();
        assert_eq!(paths, vec!["", "a", "b", "b.inner", "c"]);
    }
}
