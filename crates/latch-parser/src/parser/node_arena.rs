//! NodeArena creation and access methods.

use latch_common::Span;

use super::node::{FunctionData, Node, NodeArena, NodeData, NodeFlags, NodeIndex, NodeList};

impl NodeArena {
    /// Maximum pre-allocation to avoid capacity overflow in huge files.
    const MAX_NODE_PREALLOC: usize = 1_000_000;

    #[must_use]
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    /// Create an arena with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> NodeArena {
        NodeArena {
            nodes: Vec::with_capacity(capacity.min(Self::MAX_NODE_PREALLOC)),
        }
    }

    pub fn add(&mut self, span: Span, flags: NodeFlags, data: NodeData) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node { span, flags, data });
        idx
    }

    #[inline]
    #[must_use]
    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        if idx.is_none() {
            return None;
        }
        self.nodes.get(idx.0 as usize)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Span of a node, or an empty span for `NONE`.
    #[must_use]
    pub fn span(&self, idx: NodeIndex) -> Span {
        self.get(idx).map_or(Span::dummy(), |node| node.span)
    }

    /// Text of an identifier node.
    #[must_use]
    pub fn identifier_text(&self, idx: NodeIndex) -> Option<&str> {
        match &self.get(idx)?.data {
            NodeData::Identifier { text } => Some(text.as_str()),
            _ => None,
        }
    }

    /// Statements of a source file or block.
    #[must_use]
    pub fn statements(&self, idx: NodeIndex) -> Option<&NodeList> {
        match &self.get(idx)?.data {
            NodeData::SourceFile { statements } | NodeData::Block { statements } => {
                Some(statements)
            }
            _ => None,
        }
    }

    /// Function payload of a function declaration or expression.
    #[must_use]
    pub fn function(&self, idx: NodeIndex) -> Option<&FunctionData> {
        match &self.get(idx)?.data {
            NodeData::FunctionDeclaration(func) | NodeData::FunctionExpression(func) => Some(func),
            _ => None,
        }
    }

    /// Collect the identifier nodes a binding target introduces, in textual
    /// order: the identifier itself, or each element of an array pattern.
    pub fn collect_binding_identifiers(&self, target: NodeIndex, out: &mut Vec<NodeIndex>) {
        let Some(node) = self.get(target) else {
            return;
        };
        match &node.data {
            NodeData::Identifier { .. } => out.push(target),
            NodeData::ArrayBindingPattern { elements } => {
                for element in elements.iter() {
                    self.collect_binding_identifiers(element, out);
                }
            }
            _ => {}
        }
    }
}
