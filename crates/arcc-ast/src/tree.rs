//! Node storage: an index-addressed arena with checkpoint and rollback.

use arcc_diag::Diagnostics;
use arcc_lex::Token;

use crate::{Node, NodeKind};

/// Index of a node in its [`Tree`].
///
/// Parents refer to children by id; ids stay valid for the lifetime of
/// the tree, and dropping the tree frees every node at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The abstract syntax tree: all nodes, plus the root once parsed.
#[derive(Debug, Default)]
pub struct Tree<'src> {
    nodes: Vec<Node<'src>>,
    root: Option<NodeId>,
}

impl<'src> Tree<'src> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node and returns its id.
    pub fn push(&mut self, node: Node<'src>) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("tree too large"));
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node<'src> {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub(crate) const fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    /// High-water mark for speculative rollback.
    pub fn mark(&self) -> usize {
        self.nodes.len()
    }

    /// Discards nodes allocated after `mark`.
    pub fn truncate(&mut self, mark: usize) {
        self.nodes.truncate(mark);
    }

    /// The kind of a node, for traversal.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }
}

/// A speculative-parse checkpoint over the three rolled-back resources:
/// the token cursor, the diagnostic count, and the tree high-water mark.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Checkpoint<'t, 'src> {
    tokens: &'t [Token<'src>],
    diagnostics_len: usize,
    tree_mark: usize,
}

impl<'t, 'src> Checkpoint<'t, 'src> {
    pub(crate) fn save(
        tokens: &'t [Token<'src>],
        tree: &Tree<'src>,
        diagnostics: &Diagnostics<'src>,
    ) -> Self {
        Self {
            tokens,
            diagnostics_len: diagnostics.len(),
            tree_mark: tree.mark(),
        }
    }

    /// Restores all three resources to their state at the snapshot.
    pub(crate) fn restore(
        self,
        tokens: &mut &'t [Token<'src>],
        tree: &mut Tree<'src>,
        diagnostics: &mut Diagnostics<'src>,
    ) {
        *tokens = self.tokens;
        tree.truncate(self.tree_mark);
        diagnostics.truncate(self.diagnostics_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcc_diag::{DiagnosticInfo, DiagnosticKind};

    fn identifier_node() -> Node<'static> {
        Node::new(NodeKind::Identifier, DiagnosticInfo::detached("x"))
    }

    #[test]
    fn test_push_and_index() {
        let mut tree = Tree::new();
        let first = tree.push(identifier_node());
        let second = tree.push(identifier_node());
        assert_ne!(first, second);
        assert_eq!(tree.len(), 2);
        assert_eq!(*tree.kind(first), NodeKind::Identifier);
    }

    #[test]
    fn test_checkpoint_restores_all_three_resources() {
        let tokens: &[Token<'_>] = &[];
        let mut cursor = tokens;
        let mut tree = Tree::new();
        let mut diagnostics = Diagnostics::new("test.c", 8);
        tree.push(identifier_node());

        let checkpoint = Checkpoint::save(cursor, &tree, &diagnostics);
        let nodes_before = tree.len();
        let diagnostics_before = diagnostics.len();

        tree.push(identifier_node());
        tree.push(identifier_node());
        diagnostics.push(DiagnosticKind::UnexpectedToken, DiagnosticInfo::detached(""));
        checkpoint.restore(&mut cursor, &mut tree, &mut diagnostics);

        assert_eq!(tree.len(), nodes_before);
        assert_eq!(diagnostics.len(), diagnostics_before);
        assert_eq!(cursor.len(), tokens.len());
    }
}
