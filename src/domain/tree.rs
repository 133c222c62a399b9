//! Typed syntax tree: the contract between a type-checking frontend and the graph scanner.
//!
//! **Provider mapping**: a frontend serializes one compilation unit as a [`CompilationUnit`]:
//! the source text, the root [`Tree`], a [`SymbolTable`] of resolved declarations, and the
//! comment list. Trees refer to symbols by [`SymbolId`]; a missing id means the frontend could
//! not resolve the construct. Spans are byte offsets into the source text; an absent span is
//! encoded as `(-1, -1)`.

use std::collections::HashMap;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Index of a symbol in the unit's [`SymbolTable`].
pub type SymbolId = u32;

/// Half-open byte range over the file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: i64,
    pub end: i64,
}

impl Span {
    pub const ABSENT: Span = Span { start: -1, end: -1 };

    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Both offsets non-negative and `start <= end`.
    pub fn is_valid(&self) -> bool {
        self.start >= 0 && self.end >= self.start
    }

    pub fn is_valid_and_non_zero(&self) -> bool {
        self.is_valid() && self.end > self.start
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::ABSENT
    }
}

fn absent_pos() -> i64 {
    -1
}

/// One node of the typed syntax tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    #[serde(default)]
    pub span: Span,
    /// Preferred (diagnostic) position; falls back to the span start when absent.
    #[serde(default = "absent_pos")]
    pub pos: i64,
    pub kind: TreeKind,
}

impl Tree {
    pub fn new(span: Span, kind: TreeKind) -> Self {
        Self {
            span,
            pos: -1,
            kind,
        }
    }

    /// Sets the preferred position.
    pub fn at(mut self, pos: i64) -> Self {
        self.pos = pos;
        self
    }

    pub fn preferred_position(&self) -> i64 {
        if self.pos >= 0 { self.pos } else { self.span.start }
    }

    pub fn is_class_or_method(&self) -> bool {
        matches!(
            self.kind,
            TreeKind::ClassDef { .. } | TreeKind::MethodDef { .. }
        )
    }

    /// The resolved symbol of an identifier or member selection.
    pub fn symbol(&self) -> Option<SymbolId> {
        match &self.kind {
            TreeKind::Ident { symbol, .. } | TreeKind::Select { symbol, .. } => *symbol,
            _ => None,
        }
    }

    /// The symbol a declaration introduces.
    pub fn declared_symbol(&self) -> Option<SymbolId> {
        match &self.kind {
            TreeKind::ClassDef { symbol, .. }
            | TreeKind::MethodDef { symbol, .. }
            | TreeKind::VarDef { symbol, .. }
            | TreeKind::TypeParameter { symbol, .. }
            | TreeKind::Package { symbol, .. } => *symbol,
            _ => None,
        }
    }

    /// Dotted rendering of an identifier/selection chain (`a.b.C`), if the tree is one.
    pub fn qualified_text(&self) -> Option<String> {
        match &self.kind {
            TreeKind::Ident { name, .. } => Some(name.clone()),
            TreeKind::Select { expr, name, .. } => {
                expr.qualified_text().map(|prefix| format!("{prefix}.{name}"))
            }
            _ => None,
        }
    }
}

/// Closed set of syntactic constructs the scanner understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeKind {
    TopLevel {
        #[serde(default)]
        package: Option<Box<Tree>>,
        #[serde(default)]
        imports: Vec<Tree>,
        #[serde(default)]
        decls: Vec<Tree>,
    },
    Package {
        pid: Box<Tree>,
        #[serde(default)]
        symbol: Option<SymbolId>,
        #[serde(default)]
        annotations: Vec<Tree>,
    },
    Import {
        #[serde(default)]
        is_static: bool,
        qualid: Box<Tree>,
    },
    Ident {
        name: String,
        #[serde(default)]
        symbol: Option<SymbolId>,
    },
    Select {
        expr: Box<Tree>,
        name: String,
        #[serde(default)]
        symbol: Option<SymbolId>,
    },
    ClassDef {
        name: String,
        #[serde(default)]
        symbol: Option<SymbolId>,
        class_kind: ClassKind,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        type_params: Vec<Tree>,
        #[serde(default)]
        extends: Option<Box<Tree>>,
        #[serde(default)]
        implements: Vec<Tree>,
        #[serde(default)]
        members: Vec<Tree>,
    },
    MethodDef {
        name: String,
        #[serde(default)]
        symbol: Option<SymbolId>,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        type_params: Vec<Tree>,
        #[serde(default)]
        return_type: Option<Box<Tree>>,
        #[serde(default)]
        params: Vec<Tree>,
        #[serde(default)]
        throws: Vec<Tree>,
        #[serde(default)]
        default_value: Option<Box<Tree>>,
        #[serde(default)]
        receiver: Option<Box<Tree>>,
        #[serde(default)]
        body: Option<Box<Tree>>,
    },
    VarDef {
        name: String,
        #[serde(default)]
        symbol: Option<SymbolId>,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        var_type: Option<Box<Tree>>,
        #[serde(default)]
        init: Option<Box<Tree>>,
    },
    TypeParameter {
        name: String,
        #[serde(default)]
        symbol: Option<SymbolId>,
        #[serde(default)]
        bounds: Vec<Tree>,
        #[serde(default)]
        annotations: Vec<Tree>,
    },
    Lambda {
        #[serde(default)]
        params: Vec<Tree>,
        body: Box<Tree>,
        #[serde(default)]
        targets: FunctionalTargets,
    },
    TypeApply {
        base: Box<Tree>,
        #[serde(default)]
        args: Vec<Tree>,
    },
    MemberRef {
        qualifier: Box<Tree>,
        name: String,
        #[serde(default)]
        mode: ReferenceMode,
        #[serde(default)]
        symbol: Option<SymbolId>,
    },
    Apply {
        method: Box<Tree>,
        #[serde(default)]
        args: Vec<Tree>,
        #[serde(default)]
        type_args: Vec<Tree>,
    },
    NewClass {
        ident: Box<Tree>,
        #[serde(default)]
        constructor: Option<SymbolId>,
        #[serde(default)]
        args: Vec<Tree>,
        #[serde(default)]
        type_args: Vec<Tree>,
        #[serde(default)]
        enclosing: Option<Box<Tree>>,
        #[serde(default)]
        body: Option<Box<Tree>>,
    },
    PrimitiveType {
        tag: PrimitiveTag,
    },
    ArrayType {
        elem: Box<Tree>,
    },
    Annotation {
        annotation_type: Box<Tree>,
        #[serde(default)]
        args: Vec<Tree>,
    },
    Wildcard {
        bound_kind: BoundKind,
        #[serde(default)]
        bound: Option<Box<Tree>>,
    },
    ExpressionStatement {
        expr: Box<Tree>,
    },
    Return {
        #[serde(default)]
        expr: Option<Box<Tree>>,
    },
    Throw {
        expr: Box<Tree>,
    },
    Assert {
        cond: Box<Tree>,
        #[serde(default)]
        detail: Option<Box<Tree>>,
    },
    Assign {
        lhs: Box<Tree>,
        rhs: Box<Tree>,
    },
    AssignOp {
        lhs: Box<Tree>,
        rhs: Box<Tree>,
    },
    Literal {
        value: LiteralValue,
    },
    Block {
        #[serde(default)]
        statements: Vec<Tree>,
    },
    /// Any construct without dedicated handling; its children are scanned in order.
    Other {
        #[serde(default)]
        label: String,
        #[serde(default)]
        children: Vec<Tree>,
    },
}

impl TreeKind {
    /// Short label used for syntactic paths.
    pub fn label(&self) -> &'static str {
        match self {
            TreeKind::TopLevel { .. } => "top_level",
            TreeKind::Package { .. } => "package",
            TreeKind::Import { .. } => "import",
            TreeKind::Ident { .. } => "ident",
            TreeKind::Select { .. } => "select",
            TreeKind::ClassDef { .. } => "class_def",
            TreeKind::MethodDef { .. } => "method_def",
            TreeKind::VarDef { .. } => "var_def",
            TreeKind::TypeParameter { .. } => "type_parameter",
            TreeKind::Lambda { .. } => "lambda",
            TreeKind::TypeApply { .. } => "type_apply",
            TreeKind::MemberRef { .. } => "member_ref",
            TreeKind::Apply { .. } => "apply",
            TreeKind::NewClass { .. } => "new_class",
            TreeKind::PrimitiveType { .. } => "primitive_type",
            TreeKind::ArrayType { .. } => "array_type",
            TreeKind::Annotation { .. } => "annotation",
            TreeKind::Wildcard { .. } => "wildcard",
            TreeKind::ExpressionStatement { .. } => "expression_statement",
            TreeKind::Return { .. } => "return",
            TreeKind::Throw { .. } => "throw",
            TreeKind::Assert { .. } => "assert",
            TreeKind::Assign { .. } => "assign",
            TreeKind::AssignOp { .. } => "assign_op",
            TreeKind::Literal { .. } => "literal",
            TreeKind::Block { .. } => "block",
            TreeKind::Other { .. } => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    AnnotationType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Abstract,
    Default,
    Static,
    Final,
    Transient,
    Volatile,
    Synchronized,
    Native,
    Strictfp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub flags: Vec<Modifier>,
    #[serde(default)]
    pub annotations: Vec<Tree>,
}

impl Modifiers {
    pub fn is_static(&self) -> bool {
        self.flags.contains(&Modifier::Static)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMode {
    #[default]
    Invoke,
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundKind {
    Unbounded,
    Extends,
    Super,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveTag {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
    Error,
}

impl PrimitiveTag {
    /// Lower-case builtin name (`int`, `void`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveTag::Boolean => "boolean",
            PrimitiveTag::Byte => "byte",
            PrimitiveTag::Char => "char",
            PrimitiveTag::Short => "short",
            PrimitiveTag::Int => "int",
            PrimitiveTag::Long => "long",
            PrimitiveTag::Float => "float",
            PrimitiveTag::Double => "double",
            PrimitiveTag::Void => "void",
            PrimitiveTag::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Null,
}

/// Functional-interface target types inferred for a lambda.
///
/// Frontends report either a single target or a list of targets depending on the host
/// compiler version. Anything else is kept verbatim and rejected by [`FunctionalTargets::resolve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FunctionalTargets {
    Single(SymbolId),
    Multiple(Vec<SymbolId>),
    Absent,
    Unrecognized(serde_json::Value),
}

impl Default for FunctionalTargets {
    fn default() -> Self {
        FunctionalTargets::Multiple(Vec::new())
    }
}

impl FunctionalTargets {
    /// Normalizes to a list of target symbols. An unrecognized representation is a linkage
    /// mismatch with the frontend and cannot be recovered from.
    pub fn resolve(&self) -> Result<Vec<SymbolId>> {
        match self {
            FunctionalTargets::Single(sym) => Ok(vec![*sym]),
            FunctionalTargets::Multiple(syms) => Ok(syms.clone()),
            FunctionalTargets::Absent => Ok(Vec::new()),
            FunctionalTargets::Unrecognized(value) => {
                bail!("linkage mismatch: unrecognized lambda target representation: {value}")
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Symbols
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Package,
    Class,
    Interface,
    Enum,
    AnnotationType,
    Method,
    Constructor,
    Field,
    EnumConstant,
    LocalVariable,
    Parameter,
    ExceptionParameter,
    ResourceVariable,
    TypeParameter,
    Other,
}

impl SymbolKind {
    pub fn is_class_like(&self) -> bool {
        matches!(
            self,
            SymbolKind::Class | SymbolKind::Interface | SymbolKind::Enum | SymbolKind::AnnotationType
        )
    }

    pub fn is_field(&self) -> bool {
        matches!(self, SymbolKind::Field | SymbolKind::EnumConstant)
    }

    pub fn is_executable(&self) -> bool {
        matches!(self, SymbolKind::Method | SymbolKind::Constructor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestingKind {
    #[default]
    TopLevel,
    Member,
    Local,
    Anonymous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKind {
    Direct,
    Transitive,
}

/// A method overridden by the owning method symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverriddenMethod {
    pub method: SymbolId,
    pub kind: OverrideKind,
}

/// Erased semantic type of a symbol, as the frontend reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypeDesc {
    Primitive { tag: PrimitiveTag },
    Array { component: Box<TypeDesc> },
    /// Class type, by binary (flat) name.
    Class { name: String },
    /// Type variable, by the binary name of its erasure.
    TypeVar { erasure: String },
    Method {
        #[serde(default)]
        params: Vec<TypeDesc>,
        ret: Box<TypeDesc>,
    },
}

fn yes() -> bool {
    true
}

/// A resolved declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Simple name; constructors are named `<init>`.
    pub name: String,
    #[serde(default)]
    pub qualified_name: String,
    /// Binary name for classes (`a.b.Outer$Inner`).
    #[serde(default)]
    pub flat_name: Option<String>,
    pub kind: SymbolKind,
    #[serde(default)]
    pub owner: Option<SymbolId>,
    /// Path of the source file that declares the symbol, if it was compiled from source.
    #[serde(default)]
    pub source_file: Option<String>,
    #[serde(default)]
    pub nesting: NestingKind,
    #[serde(default)]
    pub is_static: bool,
    /// Accessible from the unit's top-level scope.
    #[serde(default = "yes")]
    pub accessible: bool,
    /// Completion of the symbol's type failed in the frontend.
    #[serde(default)]
    pub incomplete: bool,
    /// Belongs to the language platform (standard library).
    #[serde(default)]
    pub platform: bool,
    #[serde(default)]
    pub type_params: Vec<SymbolId>,
    #[serde(default)]
    pub members: Vec<SymbolId>,
    #[serde(default)]
    pub overrides: Vec<OverriddenMethod>,
    #[serde(default)]
    pub erased_type: Option<TypeDesc>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, qualified_name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            qualified_name: qualified_name.into(),
            flat_name: None,
            kind,
            owner: None,
            source_file: None,
            nesting: NestingKind::TopLevel,
            is_static: false,
            accessible: true,
            incomplete: false,
            platform: false,
            type_params: Vec::new(),
            members: Vec::new(),
            overrides: Vec::new(),
            erased_type: None,
        }
    }

    pub fn with_owner(mut self, owner: SymbolId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_source(mut self, path: impl Into<String>) -> Self {
        self.source_file = Some(path.into());
        self
    }

    pub fn with_type(mut self, ty: TypeDesc) -> Self {
        self.erased_type = Some(ty);
        self
    }

    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Binary name, defaulting to the qualified name.
    pub fn binary_name(&self) -> &str {
        self.flat_name.as_deref().unwrap_or(&self.qualified_name)
    }
}

/// All symbols of a compilation unit, indexed by [`SymbolId`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Symbol>", into = "Vec<Symbol>")]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    classes_by_name: HashMap<String, SymbolId>,
}

impl From<Vec<Symbol>> for SymbolTable {
    fn from(symbols: Vec<Symbol>) -> Self {
        let mut table = SymbolTable::default();
        for symbol in symbols {
            table.add(symbol);
        }
        table
    }
}

impl From<SymbolTable> for Vec<Symbol> {
    fn from(table: SymbolTable) -> Self {
        table.symbols
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a symbol and returns its id. Member lists of the owner are not touched.
    pub fn add(&mut self, symbol: Symbol) -> SymbolId {
        let id = self.symbols.len() as SymbolId;
        if symbol.kind.is_class_like() && !symbol.qualified_name.is_empty() {
            self.classes_by_name
                .entry(symbol.qualified_name.clone())
                .or_insert(id);
        }
        self.symbols.push(symbol);
        id
    }

    /// Registers a symbol and appends it to its owner's member list.
    pub fn add_member(&mut self, symbol: Symbol) -> SymbolId {
        let owner = symbol.owner;
        let id = self.add(symbol);
        if let Some(owner) = owner.and_then(|o| self.symbols.get_mut(o as usize)) {
            owner.members.push(id);
        }
        id
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id as usize)
    }

    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id as usize)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Looks up a class-like symbol by fully qualified name.
    pub fn class_by_name(&self, qualified_name: &str) -> Option<SymbolId> {
        self.classes_by_name.get(qualified_name).copied()
    }

    /// Finds any symbol with the given qualified name, preferring classes.
    pub fn by_qualified_name(&self, qualified_name: &str) -> Option<SymbolId> {
        self.class_by_name(qualified_name).or_else(|| {
            self.symbols
                .iter()
                .position(|s| s.qualified_name == qualified_name)
                .map(|i| i as SymbolId)
        })
    }

    /// The class with simple name `name`, if exactly one exists.
    pub fn unique_class_named(&self, name: &str) -> Option<SymbolId> {
        let mut found = self
            .classes_by_name
            .values()
            .copied()
            .filter(|id| self.get(*id).is_some_and(|s| s.name == name));
        let first = found.next()?;
        found.next().is_none().then_some(first)
    }

    /// Members of `class` whose simple name is `name`, in declaration order.
    pub fn members_named<'t>(
        &'t self,
        class: SymbolId,
        name: &'t str,
    ) -> impl Iterator<Item = SymbolId> + 't {
        self.get(class)
            .map(|c| c.members.as_slice())
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(move |m| self.get(*m).is_some_and(|s| s.name == name))
    }

    /// The innermost class enclosing `id`; a class encloses itself.
    pub fn enclosing_class(&self, id: SymbolId) -> Option<SymbolId> {
        let mut current = Some(id);
        while let Some(cur) = current {
            let symbol = self.get(cur)?;
            if symbol.kind.is_class_like() {
                return Some(cur);
            }
            current = symbol.owner;
        }
        None
    }

    /// Methods overridden by `method`, each tagged as direct or transitive.
    pub fn overridden_methods(
        &self,
        method: SymbolId,
    ) -> impl Iterator<Item = (SymbolId, OverrideKind)> + '_ {
        self.get(method)
            .map(|m| m.overrides.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|o| (o.method, o.kind))
    }

    /// Whether the symbol (or its enclosing class) belongs to the language platform.
    pub fn is_platform(&self, id: SymbolId) -> bool {
        let own = self.get(id).is_some_and(|s| s.platform);
        own || self
            .enclosing_class(id)
            .and_then(|c| self.get(c))
            .is_some_and(|c| c.platform)
    }
}

// -----------------------------------------------------------------------------
// Compilation unit
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub text: String,
}

impl SourceFile {
    /// File stem equals `simple_name` (e.g. `package-info` for `a/b/package-info.java`).
    pub fn is_name_compatible(&self, simple_name: &str) -> bool {
        std::path::Path::new(&self.path)
            .file_stem()
            .is_some_and(|stem| stem == simple_name)
    }
}

/// A source comment, line or block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub span: Span,
    pub text: String,
}

/// A structured documentation comment attached to the declaration at `decl_pos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocComment {
    pub decl_pos: i64,
    pub span: Span,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub source: SourceFile,
    pub root: Tree,
    #[serde(default)]
    pub symbols: SymbolTable,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Present when the frontend retained documentation comments.
    #[serde(default)]
    pub doc_comments: Option<Vec<DocComment>>,
}
