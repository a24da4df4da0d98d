//! Scope and declaration tables produced by the binder.

use indexmap::IndexMap;
use latch_common::Span;
use latch_parser::NodeIndex;
use serde::Serialize;

/// Index into [`crate::BinderState::scopes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ScopeId(pub u32);

/// Which construct created a scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ScopeKind {
    /// The source file.
    Script,
    /// Parameters and top-level body declarations of a function.
    Function,
    /// A `{ ... }` block that declares something.
    Block,
    /// The head of a C-style `for` or a `for-of`.
    For,
    /// A `catch` clause: its binding and its block's declarations.
    Catch,
}

/// How a name was declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DeclarationKind {
    Let,
    Const,
    Function,
    Parameter,
    CatchParameter,
}

impl DeclarationKind {
    /// `let`, `const` and catch bindings are lexical; redeclaring one is
    /// reported as a block-scoped redeclaration.
    #[must_use]
    pub const fn is_lexical(self) -> bool {
        matches!(
            self,
            DeclarationKind::Let | DeclarationKind::Const | DeclarationKind::CatchParameter
        )
    }

    /// Declarations the runtime creates as immutable entries.
    #[must_use]
    pub const fn is_immutable(self) -> bool {
        matches!(self, DeclarationKind::Const)
    }
}

/// One declared name.
#[derive(Clone, Debug, Serialize)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclarationKind,
    /// Identifier node introducing the name.
    pub node: NodeIndex,
    /// Declaring node: `VariableDeclaration`, `FunctionDeclaration`, or the
    /// identifier itself for parameters and catch bindings.
    pub declaration: NodeIndex,
    /// Whether the declarator carries an inline initializer.
    pub has_initializer: bool,
    pub span: Span,
}

/// Declarations of one scope, in textual order.
#[derive(Clone, Debug, Serialize)]
pub struct ScopeInfo {
    pub kind: ScopeKind,
    /// Node that created the scope.
    pub node: NodeIndex,
    pub parent: Option<ScopeId>,
    pub declarations: IndexMap<String, Declaration>,
}

impl ScopeInfo {
    #[must_use]
    pub fn new(kind: ScopeKind, node: NodeIndex, parent: Option<ScopeId>) -> Self {
        ScopeInfo {
            kind,
            node,
            parent,
            declarations: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.declarations.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.values()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}
