//! AST node types.
//!
//! Nodes are stored in a flat [`NodeArena`] and refer to their children by
//! [`NodeIndex`]. Absent optional children use [`NodeIndex::NONE`].

use bitflags::bitflags;
use latch_common::Span;
use latch_scanner::SyntaxKind;
use serde::Serialize;

/// Index of a node in its [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    #[must_use]
    pub const fn is_some(self) -> bool {
        self.0 != u32::MAX
    }
}

/// An ordered list of child nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeList {
    pub nodes: Vec<NodeIndex>,
}

impl NodeList {
    #[must_use]
    pub fn new(nodes: Vec<NodeIndex>) -> Self {
        NodeList { nodes }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes.iter().copied()
    }
}

bitflags! {
    /// Per-node flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        /// Declaration introduced by `let`.
        const LET = 1 << 0;
        /// Declaration introduced by `const`.
        const CONST = 1 << 1;
        /// Synthesized during error recovery; has no source text.
        const MISSING = 1 << 2;
    }
}

/// Which keyword introduced a variable declaration list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum VariableKind {
    Let,
    Const,
}

impl VariableKind {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            VariableKind::Let => "let",
            VariableKind::Const => "const",
        }
    }

    #[must_use]
    pub const fn flags(self) -> NodeFlags {
        match self {
            VariableKind::Let => NodeFlags::LET,
            VariableKind::Const => NodeFlags::CONST,
        }
    }
}

/// Shared shape of function declarations and function expressions.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionData {
    /// Identifier node, or `NONE` for anonymous function expressions.
    pub name: NodeIndex,
    /// Identifier nodes, in order.
    pub parameters: NodeList,
    /// Block node.
    pub body: NodeIndex,
}

/// Node payload.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
    SourceFile {
        statements: NodeList,
    },

    // ----- Statements -----
    VariableStatement {
        kind: VariableKind,
        declarations: NodeList,
    },
    VariableDeclaration {
        /// Identifier or ArrayBindingPattern.
        name: NodeIndex,
        initializer: NodeIndex,
    },
    ArrayBindingPattern {
        /// Identifier nodes.
        elements: NodeList,
    },
    FunctionDeclaration(FunctionData),
    Block {
        statements: NodeList,
    },
    If {
        condition: NodeIndex,
        then_statement: NodeIndex,
        else_statement: NodeIndex,
    },
    While {
        condition: NodeIndex,
        body: NodeIndex,
    },
    For {
        /// VariableStatement, expression, or `NONE`.
        initializer: NodeIndex,
        condition: NodeIndex,
        incrementor: NodeIndex,
        body: NodeIndex,
    },
    ForOf {
        kind: VariableKind,
        /// Identifier or ArrayBindingPattern.
        binding: NodeIndex,
        expression: NodeIndex,
        body: NodeIndex,
    },
    Return {
        expression: NodeIndex,
    },
    Break,
    Continue,
    Throw {
        expression: NodeIndex,
    },
    Try {
        try_block: NodeIndex,
        catch_clause: NodeIndex,
        finally_block: NodeIndex,
    },
    CatchClause {
        /// Identifier, or `NONE` for `catch { ... }`.
        binding: NodeIndex,
        block: NodeIndex,
    },
    ExpressionStatement {
        expression: NodeIndex,
    },
    Empty,

    // ----- Expressions -----
    Identifier {
        text: String,
    },
    NumericLiteral {
        value: f64,
    },
    StringLiteral {
        value: String,
    },
    BooleanLiteral {
        value: bool,
    },
    NullLiteral,
    ArrayLiteral {
        elements: NodeList,
    },
    FunctionExpression(FunctionData),
    Call {
        callee: NodeIndex,
        arguments: NodeList,
    },
    ElementAccess {
        object: NodeIndex,
        index: NodeIndex,
    },
    PropertyAccess {
        object: NodeIndex,
        name: String,
    },
    /// `! - + typeof void`
    Unary {
        operator: SyntaxKind,
        operand: NodeIndex,
    },
    /// `++`/`--`, prefix or postfix.
    Update {
        operator: SyntaxKind,
        prefix: bool,
        operand: NodeIndex,
    },
    Binary {
        left: NodeIndex,
        operator: SyntaxKind,
        right: NodeIndex,
    },
    Conditional {
        condition: NodeIndex,
        when_true: NodeIndex,
        when_false: NodeIndex,
    },
    Assignment {
        target: NodeIndex,
        operator: SyntaxKind,
        value: NodeIndex,
    },
    Parenthesized {
        expression: NodeIndex,
    },
}

/// One AST node.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub span: Span,
    pub flags: NodeFlags,
    pub data: NodeData,
}

/// Flat storage for every node of one source file.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    pub(crate) nodes: Vec<Node>,
}
