//! Structural model of the server-rendered navigation markup.
//!
//! The browser host snapshots the live DOM into a [`MarkupNode`] tree; tests
//! build the same tree with the builder methods. [`MarkupTree`] flattens it in
//! pre-order so every element gets a stable [`NodeId`] that the host can map
//! back to the real element.

#[cfg(test)]
#[path = "markup_test.rs"]
mod markup_test;

use std::collections::BTreeMap;

/// Pre-order index of an element inside a [`MarkupTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

/// One element of the markup snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarkupNode {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    /// Text from this element's own text-node children (not descendants).
    pub text: String,
    pub children: Vec<MarkupNode>,
}

impl MarkupNode {
    #[must_use]
    pub fn element(tag: &str) -> Self {
        Self { tag: tag.to_ascii_lowercase(), ..Self::default() }
    }

    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_owned());
        self
    }

    /// Add one or more whitespace-separated classes.
    #[must_use]
    pub fn with_class(mut self, classes: &str) -> Self {
        self.classes.extend(classes.split_whitespace().map(str::to_owned));
        self
    }

    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_ascii_lowercase(), value.to_owned());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text.push_str(text);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: MarkupNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = MarkupNode>) -> Self {
        self.children.extend(children);
        self
    }
}

/// A flattened element with parent/child links.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatNode {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub text: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl FlatNode {
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Pre-order flattening of a [`MarkupNode`] tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarkupTree {
    nodes: Vec<FlatNode>,
}

impl MarkupTree {
    #[must_use]
    pub fn from_root(root: &MarkupNode) -> Self {
        let mut tree = Self::default();
        tree.push(root, None);
        tree
    }

    fn push(&mut self, node: &MarkupNode, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(FlatNode {
            tag: node.tag.clone(),
            id: node.id.clone(),
            classes: node.classes.clone(),
            attrs: node.attrs.clone(),
            text: node.text.clone(),
            parent,
            children: Vec::with_capacity(node.children.len()),
        });
        for child in &node.children {
            let child_id = self.push(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&FlatNode> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// All node ids in document order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// `id` itself followed by its ancestors, nearest first.
    pub fn self_and_ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get(id).map(|_| id), |current| self.get(*current).and_then(|n| n.parent))
    }

    /// Nearest node (starting with `id`) matching `pred`, like `Element.closest`.
    pub fn closest(&self, id: NodeId, mut pred: impl FnMut(&FlatNode) -> bool) -> Option<NodeId> {
        self.self_and_ancestors(id)
            .find(|candidate| self.get(*candidate).is_some_and(&mut pred))
    }

    /// Whether `id` is `ancestor` or lies inside it.
    #[must_use]
    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        self.self_and_ancestors(id).any(|candidate| candidate == ancestor)
    }

    /// Strict descendants of `id` in document order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let Some(node) = self.get(id) else {
            return out;
        };
        let mut stack: Vec<NodeId> = node.children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(child) = self.get(next) {
                stack.extend(child.children.iter().rev().copied());
            }
        }
        out
    }

    /// First strict descendant carrying `class`.
    #[must_use]
    pub fn find_class_within(&self, id: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|d| self.get(*d).is_some_and(|n| n.has_class(class)))
    }

    /// Every node (document order) carrying `class`.
    #[must_use]
    pub fn find_all_class(&self, class: &str) -> Vec<NodeId> {
        self.ids()
            .filter(|id| self.get(*id).is_some_and(|n| n.has_class(class)))
            .collect()
    }

    #[must_use]
    pub fn find_by_dom_id(&self, dom_id: &str) -> Option<NodeId> {
        self.ids()
            .find(|id| self.get(*id).is_some_and(|n| n.id.as_deref() == Some(dom_id)))
    }

    /// The element immediately following `id` under the same parent.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.get(self.get(id)?.parent?)?;
        let pos = parent.children.iter().position(|c| *c == id)?;
        parent.children.get(pos + 1).copied()
    }

    /// Text of the node and its descendants, whitespace collapsed.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut raw = String::new();
        if let Some(node) = self.get(id) {
            raw.push_str(&node.text);
            raw.push(' ');
        }
        for d in self.descendants(id) {
            if let Some(node) = self.get(d) {
                raw.push_str(&node.text);
                raw.push(' ');
            }
        }
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
