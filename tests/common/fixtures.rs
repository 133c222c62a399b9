//! Typed-tree fixtures over real source text.
#![allow(dead_code)]

use semgraph::adapters::doc::javadoc::JavadocScanner;
use semgraph::adapters::jvm::mapper::JvmDescriptorMapper;
use semgraph::adapters::signature::qualified::QualifiedNameSignatures;
use semgraph::config::IndexerConfig;
use semgraph::domain::emitter::{FactEmitter, composite_signature};
use semgraph::domain::graph::FactGraph;
use semgraph::domain::node::NodeId;
use semgraph::domain::ports::{MetadataLoader, SignatureGenerator};
use semgraph::domain::scanner::{ScanSummary, Scanner};
use semgraph::domain::tree::{
    BoundKind, ClassKind, CompilationUnit, FunctionalTargets, LiteralValue, Modifier, Modifiers,
    PrimitiveTag, ReferenceMode, SourceFile, Span, Symbol, SymbolId, SymbolKind, SymbolTable,
    Tree, TreeKind, TypeDesc,
};

pub const PATH: &str = "com/example/Greeter.java";

// ============ Source text ============

/// Source text with span lookup by substring.
pub struct Source {
    pub text: String,
}

impl Source {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }

    fn find_from(&self, needle: &str, from: usize) -> usize {
        self.text[from..]
            .find(needle)
            .map(|i| i + from)
            .unwrap_or_else(|| panic!("{needle:?} not found after {from}"))
    }

    /// Span of the `n`-th (0-based) occurrence of `needle`.
    pub fn nth(&self, needle: &str, n: usize) -> Span {
        let mut start = self.find_from(needle, 0);
        for _ in 0..n {
            start = self.find_from(needle, start + 1);
        }
        Span::new(start as i64, (start + needle.len()) as i64)
    }

    pub fn span(&self, needle: &str) -> Span {
        self.nth(needle, 0)
    }

    pub fn pos(&self, needle: &str) -> i64 {
        self.span(needle).start
    }

    /// First occurrence of `needle` at or after the first occurrence of `after`.
    pub fn span_after(&self, needle: &str, after: &str) -> Span {
        let from = self.find_from(after, 0);
        let start = self.find_from(needle, from);
        Span::new(start as i64, (start + needle.len()) as i64)
    }

    /// From the first `from` through the first `to` after it.
    pub fn range(&self, from: &str, to: &str) -> Span {
        let start = self.find_from(from, 0);
        let end = self.find_from(to, start + from.len()) + to.len();
        Span::new(start as i64, end as i64)
    }

    pub fn all(&self) -> Span {
        Span::new(0, self.text.len() as i64)
    }
}

// ============ Trees ============

pub fn ident(name: &str, symbol: Option<SymbolId>, span: Span) -> Tree {
    Tree::new(
        span,
        TreeKind::Ident {
            name: name.to_string(),
            symbol,
        },
    )
}

pub fn select(expr: Tree, name: &str, symbol: Option<SymbolId>, span: Span) -> Tree {
    Tree::new(
        span,
        TreeKind::Select {
            expr: Box::new(expr),
            name: name.to_string(),
            symbol,
        },
    )
}

pub fn primitive(tag: PrimitiveTag, span: Span) -> Tree {
    Tree::new(span, TreeKind::PrimitiveType { tag })
}

pub fn type_apply(base: Tree, args: Vec<Tree>, span: Span) -> Tree {
    Tree::new(
        span,
        TreeKind::TypeApply {
            base: Box::new(base),
            args,
        },
    )
}

pub fn wildcard(span: Span) -> Tree {
    Tree::new(
        span,
        TreeKind::Wildcard {
            bound_kind: BoundKind::Unbounded,
            bound: None,
        },
    )
}

pub fn bounded_wildcard(bound_kind: BoundKind, bound: Tree, span: Span) -> Tree {
    Tree::new(
        span,
        TreeKind::Wildcard {
            bound_kind,
            bound: Some(Box::new(bound)),
        },
    )
}

pub fn array(elem: Tree, span: Span) -> Tree {
    Tree::new(
        span,
        TreeKind::ArrayType {
            elem: Box::new(elem),
        },
    )
}

pub fn literal(value: LiteralValue, span: Span) -> Tree {
    Tree::new(span, TreeKind::Literal { value })
}

pub fn block(statements: Vec<Tree>, span: Span) -> Tree {
    Tree::new(span, TreeKind::Block { statements })
}

pub fn ret(expr: Tree, span: Span) -> Tree {
    Tree::new(
        span,
        TreeKind::Return {
            expr: Some(Box::new(expr)),
        },
    )
}

pub fn expr_stmt(expr: Tree, span: Span) -> Tree {
    Tree::new(
        span,
        TreeKind::ExpressionStatement {
            expr: Box::new(expr),
        },
    )
}

pub fn apply(method: Tree, args: Vec<Tree>, span: Span) -> Tree {
    Tree::new(
        span,
        TreeKind::Apply {
            method: Box::new(method),
            args,
            type_args: Vec::new(),
        },
    )
}

pub fn new_class(ident: Tree, constructor: Option<SymbolId>, span: Span) -> Tree {
    Tree::new(
        span,
        TreeKind::NewClass {
            ident: Box::new(ident),
            constructor,
            args: Vec::new(),
            type_args: Vec::new(),
            enclosing: None,
            body: None,
        },
    )
}

pub fn assign(lhs: Tree, rhs: Tree, span: Span) -> Tree {
    Tree::new(
        span,
        TreeKind::Assign {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
    )
}

pub fn annotation(annotation_type: Tree, args: Vec<Tree>, span: Span) -> Tree {
    Tree::new(
        span,
        TreeKind::Annotation {
            annotation_type: Box::new(annotation_type),
            args,
        },
    )
}

pub fn other(label: &str, children: Vec<Tree>, span: Span) -> Tree {
    Tree::new(
        span,
        TreeKind::Other {
            label: label.to_string(),
            children,
        },
    )
}

pub fn lambda(params: Vec<Tree>, body: Tree, targets: FunctionalTargets, span: Span) -> Tree {
    Tree::new(
        span,
        TreeKind::Lambda {
            params,
            body: Box::new(body),
            targets,
        },
    )
}

pub fn member_ref(
    qualifier: Tree,
    name: &str,
    mode: ReferenceMode,
    symbol: Option<SymbolId>,
    span: Span,
) -> Tree {
    Tree::new(
        span,
        TreeKind::MemberRef {
            qualifier: Box::new(qualifier),
            name: name.to_string(),
            mode,
            symbol,
        },
    )
}

pub fn type_param(name: &str, symbol: Option<SymbolId>, bounds: Vec<Tree>, span: Span) -> Tree {
    Tree::new(
        span,
        TreeKind::TypeParameter {
            name: name.to_string(),
            symbol,
            bounds,
            annotations: Vec::new(),
        },
    )
}

pub fn package(pid: Tree, symbol: Option<SymbolId>, span: Span) -> Tree {
    Tree::new(
        span,
        TreeKind::Package {
            pid: Box::new(pid),
            symbol,
            annotations: Vec::new(),
        },
    )
}

pub fn import(qualid: Tree, is_static: bool, span: Span) -> Tree {
    Tree::new(
        span,
        TreeKind::Import {
            is_static,
            qualid: Box::new(qualid),
        },
    )
}

pub fn top_level(package: Option<Tree>, imports: Vec<Tree>, decls: Vec<Tree>, span: Span) -> Tree {
    Tree::new(
        span,
        TreeKind::TopLevel {
            package: package.map(Box::new),
            imports,
            decls,
        },
    )
}

/// Builder for class declarations.
pub struct ClassBuilder {
    name: String,
    symbol: Option<SymbolId>,
    class_kind: ClassKind,
    modifiers: Modifiers,
    type_params: Vec<Tree>,
    extends: Option<Box<Tree>>,
    implements: Vec<Tree>,
    members: Vec<Tree>,
}

pub fn class(name: &str, symbol: Option<SymbolId>) -> ClassBuilder {
    ClassBuilder {
        name: name.to_string(),
        symbol,
        class_kind: ClassKind::Class,
        modifiers: Modifiers::default(),
        type_params: Vec::new(),
        extends: None,
        implements: Vec::new(),
        members: Vec::new(),
    }
}

impl ClassBuilder {
    pub fn kind(mut self, kind: ClassKind) -> Self {
        self.class_kind = kind;
        self
    }

    pub fn annotate(mut self, annotation: Tree) -> Self {
        self.modifiers.annotations.push(annotation);
        self
    }

    pub fn type_param(mut self, param: Tree) -> Self {
        self.type_params.push(param);
        self
    }

    pub fn extends(mut self, tree: Tree) -> Self {
        self.extends = Some(Box::new(tree));
        self
    }

    pub fn implements(mut self, tree: Tree) -> Self {
        self.implements.push(tree);
        self
    }

    pub fn member(mut self, member: Tree) -> Self {
        self.members.push(member);
        self
    }

    pub fn build(self, span: Span, pos: i64) -> Tree {
        Tree::new(
            span,
            TreeKind::ClassDef {
                name: self.name,
                symbol: self.symbol,
                class_kind: self.class_kind,
                modifiers: self.modifiers,
                type_params: self.type_params,
                extends: self.extends,
                implements: self.implements,
                members: self.members,
            },
        )
        .at(pos)
    }
}

/// Builder for method declarations.
pub struct MethodBuilder {
    name: String,
    symbol: Option<SymbolId>,
    modifiers: Modifiers,
    type_params: Vec<Tree>,
    return_type: Option<Box<Tree>>,
    params: Vec<Tree>,
    body: Option<Box<Tree>>,
}

pub fn method(name: &str, symbol: Option<SymbolId>) -> MethodBuilder {
    MethodBuilder {
        name: name.to_string(),
        symbol,
        modifiers: Modifiers::default(),
        type_params: Vec::new(),
        return_type: None,
        params: Vec::new(),
        body: None,
    }
}

impl MethodBuilder {
    pub fn flag(mut self, flag: Modifier) -> Self {
        self.modifiers.flags.push(flag);
        self
    }

    pub fn annotate(mut self, annotation: Tree) -> Self {
        self.modifiers.annotations.push(annotation);
        self
    }

    pub fn type_param(mut self, param: Tree) -> Self {
        self.type_params.push(param);
        self
    }

    pub fn returns(mut self, tree: Tree) -> Self {
        self.return_type = Some(Box::new(tree));
        self
    }

    pub fn param(mut self, param: Tree) -> Self {
        self.params.push(param);
        self
    }

    pub fn body(mut self, body: Tree) -> Self {
        self.body = Some(Box::new(body));
        self
    }

    pub fn build(self, span: Span, pos: i64) -> Tree {
        Tree::new(
            span,
            TreeKind::MethodDef {
                name: self.name,
                symbol: self.symbol,
                modifiers: self.modifiers,
                type_params: self.type_params,
                return_type: self.return_type,
                params: self.params,
                throws: Vec::new(),
                default_value: None,
                receiver: None,
                body: self.body,
            },
        )
        .at(pos)
    }
}

/// Builder for variable declarations.
pub struct VarBuilder {
    name: String,
    symbol: Option<SymbolId>,
    modifiers: Modifiers,
    var_type: Option<Box<Tree>>,
    init: Option<Box<Tree>>,
}

pub fn var(name: &str, symbol: Option<SymbolId>) -> VarBuilder {
    VarBuilder {
        name: name.to_string(),
        symbol,
        modifiers: Modifiers::default(),
        var_type: None,
        init: None,
    }
}

impl VarBuilder {
    pub fn flag(mut self, flag: Modifier) -> Self {
        self.modifiers.flags.push(flag);
        self
    }

    pub fn annotate(mut self, annotation: Tree) -> Self {
        self.modifiers.annotations.push(annotation);
        self
    }

    pub fn ty(mut self, tree: Tree) -> Self {
        self.var_type = Some(Box::new(tree));
        self
    }

    pub fn init(mut self, tree: Tree) -> Self {
        self.init = Some(Box::new(tree));
        self
    }

    pub fn build(self, span: Span, pos: i64) -> Tree {
        Tree::new(
            span,
            TreeKind::VarDef {
                name: self.name,
                symbol: self.symbol,
                modifiers: self.modifiers,
                var_type: self.var_type,
                init: self.init,
            },
        )
        .at(pos)
    }
}

// ============ Symbols ============

pub fn class_type(name: &str) -> TypeDesc {
    TypeDesc::Class {
        name: name.to_string(),
    }
}

pub fn prim_type(tag: PrimitiveTag) -> TypeDesc {
    TypeDesc::Primitive { tag }
}

pub fn method_type(params: Vec<TypeDesc>, ret: TypeDesc) -> TypeDesc {
    TypeDesc::Method {
        params,
        ret: Box::new(ret),
    }
}

/// Adds a platform (standard library) class.
pub fn platform_class(symbols: &mut SymbolTable, name: &str, qualified: &str, kind: SymbolKind) -> SymbolId {
    let mut symbol = Symbol::new(name, qualified, kind);
    symbol.platform = true;
    symbols.add(symbol)
}

/// Adds a platform class with named type parameters.
pub fn generic_platform_class(
    symbols: &mut SymbolTable,
    name: &str,
    qualified: &str,
    kind: SymbolKind,
    params: &[&str],
) -> SymbolId {
    let class = platform_class(symbols, name, qualified, kind);
    let ids: Vec<SymbolId> = params
        .iter()
        .map(|p| symbols.add(Symbol::new(*p, *p, SymbolKind::TypeParameter).with_owner(class)))
        .collect();
    if let Some(sym) = symbols.get_mut(class) {
        sym.type_params = ids;
    }
    class
}

/// Adds a class declared in the fixture file.
pub fn source_class(symbols: &mut SymbolTable, name: &str, qualified: &str, kind: SymbolKind) -> SymbolId {
    symbols.add(Symbol::new(name, qualified, kind).with_source(PATH))
}

pub fn unit(source: &Source, root: Tree, symbols: SymbolTable) -> CompilationUnit {
    CompilationUnit {
        source: SourceFile {
            path: PATH.to_string(),
            text: source.text.clone(),
        },
        root,
        symbols,
        comments: Vec::new(),
        doc_comments: None,
    }
}

// ============ Indexing ============

pub fn index(unit: &CompilationUnit) -> (FactGraph, ScanSummary) {
    index_with(&IndexerConfig::default(), unit)
}

pub fn index_with(config: &IndexerConfig, unit: &CompilationUnit) -> (FactGraph, ScanSummary) {
    let signatures = QualifiedNameSignatures::new();
    index_full(config, unit, &signatures, None)
}

pub fn index_full(
    config: &IndexerConfig,
    unit: &CompilationUnit,
    signatures: &dyn SignatureGenerator,
    loader: Option<&dyn MetadataLoader>,
) -> (FactGraph, ScanSummary) {
    let graph = FactGraph::new();
    let docs = JavadocScanner::new();
    let mapper = JvmDescriptorMapper::new(config.corpus.clone());
    let mut scanner = Scanner::new(config, unit, &graph, signatures)
        .with_doc_scanner(&docs)
        .with_binary_mapper(&mapper);
    if let Some(loader) = loader {
        scanner = scanner.with_metadata_loader(loader);
    }
    let summary = scanner.scan_unit().expect("scan unit");
    (graph, summary)
}

/// Node identifier the scanner gives the declaration of `symbol`.
pub fn decl_id(unit: &CompilationUnit, symbol: SymbolId) -> NodeId {
    let signature = QualifiedNameSignatures::new()
        .signature(&unit.symbols, symbol)
        .expect("signature");
    let sink = FactGraph::new();
    let emitter = FactEmitter::new(&sink, "", "java", PATH);
    emitter.declaration_id(unit.symbols.get(symbol).expect("symbol"), &signature)
}

pub fn anchor_id(span: Span) -> NodeId {
    NodeId::new(format!("@{}:{}", span.start, span.end), "", PATH, "java")
}

pub fn abs_id(owner: &NodeId) -> NodeId {
    NodeId::new(
        composite_signature("abs", &[owner], &[]),
        owner.corpus.clone(),
        owner.path.clone(),
        owner.language.clone(),
    )
}

pub fn builtin_id(name: &str) -> NodeId {
    NodeId::new(format!("{name}#builtin"), "", "", "java")
}

// ============ Greeter ============

pub const GREETER: &str = "package com.example;

import java.util.List;

// Greeter says hello.
public class Greeter {
  private int count = 1 + 2;

  public Greeter() {}

  public String greet(String name) {
    return name;
  }
}
";

pub struct GreeterSymbols {
    pub package: SymbolId,
    pub java_util: SymbolId,
    pub object: SymbolId,
    pub string: SymbolId,
    pub list: SymbolId,
    pub greeter: SymbolId,
    pub count: SymbolId,
    pub ctor: SymbolId,
    pub greet: SymbolId,
    pub name: SymbolId,
}

pub struct Greeter {
    pub source: Source,
    pub unit: CompilationUnit,
    pub syms: GreeterSymbols,
}

/// A small class with a field, an explicit constructor and a method.
pub fn greeter() -> Greeter {
    let src = Source::new(GREETER);

    let mut symbols = SymbolTable::new();
    let package_sym = symbols.add(Symbol::new("example", "com.example", SymbolKind::Package));
    let java_util = symbols.add(Symbol::new("util", "java.util", SymbolKind::Package));
    let object = platform_class(&mut symbols, "Object", "java.lang.Object", SymbolKind::Class);
    let string = platform_class(&mut symbols, "String", "java.lang.String", SymbolKind::Class);
    let list = generic_platform_class(&mut symbols, "List", "java.util.List", SymbolKind::Interface, &["E"]);
    let greeter = source_class(&mut symbols, "Greeter", "com.example.Greeter", SymbolKind::Class);
    let count = symbols.add_member(
        Symbol::new("count", "com.example.Greeter.count", SymbolKind::Field)
            .with_owner(greeter)
            .with_type(prim_type(PrimitiveTag::Int)),
    );
    let ctor = symbols.add_member(
        Symbol::new("<init>", "com.example.Greeter.<init>", SymbolKind::Constructor)
            .with_owner(greeter)
            .with_type(method_type(vec![], prim_type(PrimitiveTag::Void))),
    );
    let greet = symbols.add_member(
        Symbol::new("greet", "com.example.Greeter.greet", SymbolKind::Method)
            .with_owner(greeter)
            .with_type(method_type(
                vec![class_type("java.lang.String")],
                class_type("java.lang.String"),
            )),
    );
    let name = symbols.add(Symbol::new("name", "name", SymbolKind::Parameter).with_owner(greet));

    let pkg = package(
        select(
            ident("com", None, src.span("com")),
            "example",
            Some(package_sym),
            src.span("com.example"),
        ),
        Some(package_sym),
        src.span("package com.example;"),
    );

    let list_import = import(
        select(
            select(
                ident("java", None, src.span("java")),
                "util",
                Some(java_util),
                src.span("java.util"),
            ),
            "List",
            Some(list),
            src.span("java.util.List"),
        ),
        false,
        src.span("import java.util.List;"),
    );

    let field = var("count", Some(count))
        .flag(Modifier::Private)
        .ty(primitive(PrimitiveTag::Int, src.span("int")))
        .init(other(
            "binary",
            vec![
                literal(LiteralValue::Int(1), src.span("1")),
                literal(LiteralValue::Int(2), src.span("2")),
            ],
            src.span("1 + 2"),
        ))
        .build(src.span("private int count = 1 + 2;"), src.pos("count"));

    let constructor = method("<init>", Some(ctor))
        .flag(Modifier::Public)
        .body(block(Vec::new(), src.span_after("{}", "public Greeter()")))
        .build(src.span("public Greeter() {}"), src.pos("Greeter() {}"));

    let param = var("name", Some(name))
        .ty(ident("String", Some(string), src.span_after("String", "greet(")))
        .build(src.span("String name"), src.span_after("name", "String name").start);

    let greet_method = method("greet", Some(greet))
        .flag(Modifier::Public)
        .returns(ident("String", Some(string), src.span_after("String", "public String")))
        .param(param)
        .body(block(
            vec![ret(
                ident("name", Some(name), src.span_after("name", "return")),
                src.span("return name;"),
            )],
            src.range("{\n    return", "}"),
        ))
        .build(src.range("public String greet", "  }"), src.pos("greet("));

    let class_def = class("Greeter", Some(greeter))
        .member(field)
        .member(constructor)
        .member(greet_method)
        .build(
            src.range("public class Greeter", "\n}"),
            src.span_after("Greeter", "class ").start,
        );

    let root = top_level(Some(pkg), vec![list_import], vec![class_def], src.all());
    let mut unit = unit(&src, root, symbols);
    unit.comments.push(semgraph::domain::tree::Comment {
        span: src.span("// Greeter says hello."),
        text: "// Greeter says hello.".to_string(),
    });

    Greeter {
        source: src,
        unit,
        syms: GreeterSymbols {
            package: package_sym,
            java_util,
            object,
            string,
            list,
            greeter,
            count,
            ctor,
            greet,
            name,
        },
    }
}
