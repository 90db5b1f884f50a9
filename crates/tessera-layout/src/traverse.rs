//! Bounded tree walks.
//!
//! Extensions constantly ask questions like "the nearest ancestor that is a
//! grid container, unless a table is found first". [`TraverseOptions`] covers
//! those shapes once so each extension does not reimplement the walk.

use crate::node::{Node, NodeId};
use crate::node_tree::NodeTree;

/// A predicate over nodes.
pub type NodePredicate<'a> = Box<dyn Fn(&Node) -> bool + 'a>;

/// Which link a walk follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Link {
    /// Natural parent and children.
    #[default]
    Parent,
    /// Render parent and render children.
    RenderParent,
    /// Wrapper chain: outer wrappers going up, wrapped nodes going down.
    OuterWrapper,
}

/// Sibling direction for [`NodeTree::siblings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the first child, nearest first.
    Previous,
    /// Towards the last child, nearest first.
    Next,
}

/// Filters and stop conditions for a walk.
#[derive(Default)]
pub struct TraverseOptions<'a> {
    condition: Option<NodePredicate<'a>>,
    error: Option<NodePredicate<'a>>,
    every: Option<NodePredicate<'a>>,
    excluding: Option<NodeId>,
    link: Link,
    include_excluded: bool,
}

impl<'a> TraverseOptions<'a> {
    /// Collects every node on the path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects only nodes matching `predicate`.
    #[must_use]
    pub fn condition(mut self, predicate: impl Fn(&Node) -> bool + 'a) -> Self {
        self.condition = Some(Box::new(predicate));
        self
    }

    /// Stops the walk at the first node matching `predicate`, keeping what
    /// was collected so far.
    #[must_use]
    pub fn error(mut self, predicate: impl Fn(&Node) -> bool + 'a) -> Self {
        self.error = Some(Box::new(predicate));
        self
    }

    /// Returns nothing unless every collected node matches `predicate`.
    #[must_use]
    pub fn every(mut self, predicate: impl Fn(&Node) -> bool + 'a) -> Self {
        self.every = Some(Box::new(predicate));
        self
    }

    /// A node the walk must not cross.
    #[must_use]
    pub fn excluding(mut self, boundary: NodeId) -> Self {
        self.excluding = Some(boundary);
        self
    }

    /// The link to follow.
    #[must_use]
    pub fn via(mut self, link: Link) -> Self {
        self.link = link;
        self
    }

    /// Also visits nodes removed from layout.
    #[must_use]
    pub fn include_excluded(mut self) -> Self {
        self.include_excluded = true;
        self
    }

    fn accepts(&self, node: &Node) -> bool {
        self.condition.as_ref().is_none_or(|f| f(node))
    }

    fn aborts(&self, node: &Node) -> bool {
        self.error.as_ref().is_some_and(|f| f(node))
    }

    fn finish(&self, tree: &NodeTree, collected: Vec<NodeId>) -> Vec<NodeId> {
        match &self.every {
            Some(every) if !collected.iter().all(|&id| every(&tree[id])) => Vec::new(),
            _ => collected,
        }
    }
}

impl NodeTree {
    fn up(&self, id: NodeId, link: Link) -> Option<NodeId> {
        match link {
            Link::Parent => self.parent(id),
            Link::RenderParent => self.render_parent(id),
            Link::OuterWrapper => self.outer_wrapper(id),
        }
    }

    fn down(&self, id: NodeId, link: Link) -> Vec<NodeId> {
        match link {
            Link::Parent => self.children(id).to_vec(),
            Link::RenderParent => self.render_children(id).to_vec(),
            Link::OuterWrapper => self.inner_wrapped(id).into_iter().collect(),
        }
    }

    /// Ancestors of `id`, nearest first. The document node is never included.
    #[must_use]
    pub fn ascend(&self, id: NodeId, options: &TraverseOptions<'_>) -> Vec<NodeId> {
        let mut collected = Vec::new();
        let mut current = self.up(id, options.link);
        while let Some(ancestor) = current {
            if ancestor == self.document() || Some(ancestor) == options.excluding {
                break;
            }
            let node = &self[ancestor];
            if options.aborts(node) {
                break;
            }
            if options.accepts(node) {
                collected.push(ancestor);
            }
            current = self.up(ancestor, options.link);
        }
        options.finish(self, collected)
    }

    /// Descendants of `id` in pre-order.
    #[must_use]
    pub fn descend(&self, id: NodeId, options: &TraverseOptions<'_>) -> Vec<NodeId> {
        let mut collected = Vec::new();
        let mut stack: Vec<NodeId> = self.down(id, options.link).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            if Some(current) == options.excluding {
                continue;
            }
            let node = &self[current];
            if node.flags.excluded && !options.include_excluded {
                continue;
            }
            if options.aborts(node) {
                break;
            }
            if options.accepts(node) {
                collected.push(current);
            }
            stack.extend(self.down(current, options.link).into_iter().rev());
        }
        options.finish(self, collected)
    }

    /// Siblings of `id` in `direction`, nearest first.
    #[must_use]
    pub fn siblings(
        &self,
        id: NodeId,
        direction: Direction,
        options: &TraverseOptions<'_>,
    ) -> Vec<NodeId> {
        let Some(parent) = self.up(id, options.link) else {
            return Vec::new();
        };
        let all = self.down(parent, options.link);
        let Some(index) = all.iter().position(|&c| c == id) else {
            return Vec::new();
        };
        let ordered: Vec<NodeId> = match direction {
            Direction::Previous => all[..index].iter().rev().copied().collect(),
            Direction::Next => all[index + 1..].to_vec(),
        };
        let mut collected = Vec::new();
        for sibling in ordered {
            if Some(sibling) == options.excluding {
                break;
            }
            let node = &self[sibling];
            if node.flags.excluded && !options.include_excluded {
                continue;
            }
            if options.aborts(node) {
                break;
            }
            if options.accepts(node) {
                collected.push(sibling);
            }
        }
        options.finish(self, collected)
    }

    /// Nearest previous sibling taking part in layout.
    #[must_use]
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.siblings(id, Direction::Previous, &TraverseOptions::new())
            .first()
            .copied()
    }

    /// Nearest next sibling taking part in layout.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.siblings(id, Direction::Next, &TraverseOptions::new())
            .first()
            .copied()
    }
}
