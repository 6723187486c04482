//! Parse-tree storage and traversal.
//!
//! Nodes live in one arena owned by the tree and refer to each other by
//! [`NodeId`]; a node's `children` vector holds ids in left-to-right rule
//! order. Leaves bind the symbol-table entry of the token that matched
//! them (or the synthetic `EPSILON` entry); internal nodes are labeled by
//! the non-terminal they expand.
//!
//! The traversal the printers rely on is left-root-rest: first child,
//! then the node itself, then the remaining children. The parent is
//! passed to the visitor, so nodes carry no parent pointers.

use opalc_lex::SymId;
use opalc_util::{define_idx, IndexVec};

use crate::grammar::GrammarSymbol;

define_idx! {
    /// Handle to a parse-tree node.
    pub struct NodeId;
}

/// Initial capacity of a child list; it doubles on overflow.
const CHILDREN_CAPACITY: usize = 4;

/// One parse-tree node.
#[derive(Clone, Debug)]
pub struct ParseNode {
    /// The grammar symbol this node is labeled with.
    pub symbol: GrammarSymbol,
    /// Children in left-to-right rule order; empty for leaves.
    pub children: Vec<NodeId>,
    /// Source line of the token that triggered creation or expansion.
    pub line: u32,
    /// Bound symbol-table entry for terminal leaves.
    pub entry: Option<SymId>,
}

impl ParseNode {
    /// True when the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A parse tree rooted at the start non-terminal.
#[derive(Debug)]
pub struct ParseTree {
    nodes: IndexVec<NodeId, ParseNode>,
    root: NodeId,
}

impl ParseTree {
    /// Create a tree containing only a root labeled `symbol`.
    pub fn new(symbol: GrammarSymbol) -> Self {
        let mut nodes = IndexVec::new();
        let root = nodes.push(ParseNode {
            symbol,
            children: Vec::with_capacity(CHILDREN_CAPACITY),
            line: 1,
            entry: None,
        });
        Self { nodes, root }
    }

    /// The root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True only for a tree that lost its root; never for a built tree.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node behind a handle.
    pub fn node(&self, id: NodeId) -> &ParseNode {
        &self.nodes[id]
    }

    /// Mutable node behind a handle.
    pub fn node_mut(&mut self, id: NodeId) -> &mut ParseNode {
        &mut self.nodes[id]
    }

    /// Append a new childless node labeled `symbol` under `parent`.
    pub fn add_child(&mut self, parent: NodeId, symbol: GrammarSymbol, line: u32) -> NodeId {
        let id = self.nodes.push(ParseNode {
            symbol,
            children: Vec::with_capacity(CHILDREN_CAPACITY),
            line,
            entry: None,
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// Left-root-rest traversal from the root: visit the first child's
    /// subtree, then the node itself, then the remaining children's
    /// subtrees. The visitor receives each node together with its parent
    /// (`None` at the root).
    pub fn visit_left_root_rest<F>(&self, visitor: &mut F)
    where
        F: FnMut(&ParseNode, Option<&ParseNode>),
    {
        self.walk(self.root, None, visitor);
    }

    fn walk<F>(&self, id: NodeId, parent: Option<NodeId>, visitor: &mut F)
    where
        F: FnMut(&ParseNode, Option<&ParseNode>),
    {
        let node = &self.nodes[id];
        if let Some(&first) = node.children.first() {
            self.walk(first, Some(id), visitor);
        }
        visitor(node, parent.map(|p| &self.nodes[p]));
        for &child in node.children.iter().skip(1) {
            self.walk(child, Some(id), visitor);
        }
    }
}
