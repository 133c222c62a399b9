//! Package clauses, enum constants, local and anonymous classes, initializers.

mod common;

use common::fixtures::*;
use semgraph::config::IndexerConfig;
use semgraph::domain::edge::EdgeKind;
use semgraph::domain::node::{NodeId, facts};
use semgraph::domain::tree::{
    ClassKind, CompilationUnit, LiteralValue, NestingKind, PrimitiveTag, Span, Symbol,
    SymbolKind, SymbolTable, Tree, TreeKind,
};

fn global(signature: &str) -> NodeId {
    NodeId::new(signature, "", "", "java")
}

// ============ Package clause ============

const PACKAGE: &str = "package com.example;\n";

fn package_unit(path: &str) -> (Source, CompilationUnit) {
    let src = Source::new(PACKAGE);
    let mut symbols = SymbolTable::new();
    let pkg = symbols.add(Symbol::new("example", "com.example", SymbolKind::Package));
    let clause = package(
        select(
            ident("com", None, src.span("com")),
            "example",
            Some(pkg),
            src.span("com.example"),
        ),
        Some(pkg),
        src.span("package com.example;"),
    );
    let mut unit = unit(&src, top_level(Some(clause), Vec::new(), Vec::new(), src.all()), symbols);
    unit.source.path = path.to_string();
    (src, unit)
}

#[test]
fn test_package_is_referenced_from_ordinary_files() {
    let (src, unit) = package_unit(PATH);
    let (graph, _) = index(&unit);

    let anchor = anchor_id(src.span("com.example"));
    assert!(graph.has_edge(&anchor, EdgeKind::Ref, &global("com.example")));
    assert!(!graph.has_edge(&anchor, EdgeKind::DefinesBinding, &global("com.example")));
}

#[test]
fn test_package_info_defines_package() {
    let path = "com/example/package-info.java";
    let (src, unit) = package_unit(path);
    let (graph, _) = index(&unit);

    let span = src.span("com.example");
    let anchor = NodeId::new(format!("@{}:{}", span.start, span.end), "", path, "java");
    assert!(graph.has_edge(&anchor, EdgeKind::DefinesBinding, &global("com.example")));
    assert!(!graph.has_edge(&anchor, EdgeKind::Ref, &global("com.example")));
}

// ============ Enum constants ============

const PLANET: &str = "enum Planet {\n  EARTH(3), MARS(4);\n  Planet(int order) {}\n}\n";

#[test]
fn test_enum_constants_reference_constructor() {
    let src = Source::new(PLANET);
    let mut symbols = SymbolTable::new();
    platform_class(&mut symbols, "Object", "java.lang.Object", SymbolKind::Class);
    generic_platform_class(&mut symbols, "Enum", "java.lang.Enum", SymbolKind::Class, &["E"]);
    let planet = source_class(&mut symbols, "Planet", "p.Planet", SymbolKind::Enum);
    let ctor = symbols.add_member(
        Symbol::new("<init>", "p.Planet.<init>", SymbolKind::Constructor)
            .with_owner(planet)
            .with_type(method_type(vec![prim_type(PrimitiveTag::Int)], prim_type(PrimitiveTag::Void))),
    );
    let order = symbols.add(Symbol::new("order", "order", SymbolKind::Parameter).with_owner(ctor));

    let mut members = Vec::new();
    for (name, arg) in [("EARTH", 3), ("MARS", 4)] {
        let constant = symbols.add_member(
            Symbol::new(name, format!("p.Planet.{name}"), SymbolKind::EnumConstant)
                .with_owner(planet)
                .with_type(class_type("p.Planet")),
        );
        let decl = format!("{name}({arg})");
        let init = Tree::new(
            src.span(&decl),
            TreeKind::NewClass {
                ident: Box::new(ident("Planet", Some(planet), Span::ABSENT)),
                constructor: Some(ctor),
                args: vec![literal(LiteralValue::Int(arg), src.span_after(&arg.to_string(), name))],
                type_args: Vec::new(),
                enclosing: None,
                body: None,
            },
        );
        members.push(var(name, Some(constant)).init(init).build(src.span(&decl), src.pos(name)));
    }
    let param = var("order", Some(order))
        .ty(primitive(PrimitiveTag::Int, src.span("int")))
        .build(src.span("int order"), src.pos("order"));
    members.push(
        method("<init>", Some(ctor))
            .param(param)
            .body(block(Vec::new(), src.span("{}")))
            .build(src.span("Planet(int order) {}"), src.span_after("Planet", "MARS").start),
    );
    let mut class_def = class("Planet", Some(planet)).kind(ClassKind::Enum);
    for member in members {
        class_def = class_def.member(member);
    }
    let class_def = class_def.build(src.range("enum Planet", "\n}"), src.pos("Planet"));
    let unit = unit(&src, top_level(None, Vec::new(), vec![class_def], src.all()), symbols);

    let (graph, _) = index(&unit);
    let ctor_id = decl_id(&unit, ctor);

    for name in ["EARTH", "MARS"] {
        let decl = if name == "EARTH" { "EARTH(3)" } else { "MARS(4)" };
        assert!(
            graph.has_edge(&anchor_id(src.span(name)), EdgeKind::Ref, &ctor_id),
            "{name} should reference the constructor"
        );
        assert!(
            graph.has_edge(&anchor_id(src.span(decl)), EdgeKind::RefCall, &ctor_id),
            "{decl} should call the constructor"
        );
    }
    let calls = graph
        .edges_to(&ctor_id)
        .into_iter()
        .filter(|e| e.kind == EdgeKind::RefCall)
        .count();
    assert_eq!(calls, 2);
}

// ============ Local and anonymous classes ============

const OUTER: &str = "class Outer {
  Object task = new Object() {};
  void run() {
    class Helper {}
  }
}
";

#[test]
fn test_local_and_anonymous_class_scopes() {
    let src = Source::new(OUTER);
    let mut symbols = SymbolTable::new();
    let object = platform_class(&mut symbols, "Object", "java.lang.Object", SymbolKind::Class);
    let outer = source_class(&mut symbols, "Outer", "p.Outer", SymbolKind::Class);
    let task = symbols.add_member(
        Symbol::new("task", "p.Outer.task", SymbolKind::Field)
            .with_owner(outer)
            .with_type(class_type("java.lang.Object")),
    );
    let run = symbols.add_member(
        Symbol::new("run", "p.Outer.run", SymbolKind::Method)
            .with_owner(outer)
            .with_type(method_type(vec![], prim_type(PrimitiveTag::Void))),
    );

    let mut anon = Symbol::new("", "", SymbolKind::Class)
        .with_owner(outer)
        .with_source(PATH);
    anon.flat_name = Some("p.Outer$1".to_string());
    anon.nesting = NestingKind::Anonymous;
    let anon = symbols.add(anon);
    let anon_ctor =
        symbols.add(Symbol::new("<init>", "", SymbolKind::Constructor).with_owner(anon));

    let mut helper = Symbol::new("Helper", "", SymbolKind::Class)
        .with_owner(run)
        .with_source(PATH);
    helper.flat_name = Some("p.Outer$1Helper".to_string());
    helper.nesting = NestingKind::Local;
    let helper = symbols.add(helper);

    let anon_body = class("", Some(anon)).build(src.span("{}"), src.pos("{}"));
    let creation = Tree::new(
        src.span("new Object() {}"),
        TreeKind::NewClass {
            ident: Box::new(ident("Object", Some(object), src.span_after("Object", "new "))),
            constructor: Some(anon_ctor),
            args: Vec::new(),
            type_args: Vec::new(),
            enclosing: None,
            body: Some(Box::new(anon_body)),
        },
    );
    let field = var("task", Some(task))
        .ty(ident("Object", Some(object), src.span("Object")))
        .init(creation)
        .build(src.span("Object task = new Object() {};"), src.pos("task"));

    let helper_def = class("Helper", Some(helper)).build(src.span("class Helper {}"), src.pos("Helper"));
    let run_def = method("run", Some(run))
        .returns(primitive(PrimitiveTag::Void, src.span("void")))
        .body(block(vec![helper_def], src.range("{\n    class", "}\n  }")))
        .build(src.range("void run()", "}\n  }"), src.pos("run"));

    let class_def = class("Outer", Some(outer))
        .member(field)
        .member(run_def)
        .build(src.range("class Outer", "\n}"), src.pos("Outer"));
    let unit = unit(&src, top_level(None, Vec::new(), vec![class_def], src.all()), symbols);

    let (graph, _) = index(&unit);
    let outer_id = decl_id(&unit, outer);
    let run_id = decl_id(&unit, run);

    let helper_id = decl_id(&unit, helper);
    assert_eq!(helper_id.path, PATH);
    assert!(graph.has_edge(&helper_id, EdgeKind::ChildOf, &run_id));
    assert!(!graph.has_edge(&helper_id, EdgeKind::ChildOf, &outer_id));

    let anon_id = decl_id(&unit, anon);
    assert!(graph.has_edge(&anon_id, EdgeKind::ChildOf, &outer_id));
    assert!(!graph.has_edge(&anon_id, EdgeKind::ChildOf, &decl_id(&unit, task)));
}

// ============ Initializers ============

const LABEL: &str = "class Label {\n  String text = \"ünïcödé\";\n}\n";

fn label_unit(type_span: impl Fn(&Source) -> Span) -> (Source, CompilationUnit, NodeId) {
    let src = Source::new(LABEL);
    let mut symbols = SymbolTable::new();
    platform_class(&mut symbols, "Object", "java.lang.Object", SymbolKind::Class);
    let string = platform_class(&mut symbols, "String", "java.lang.String", SymbolKind::Class);
    let label = source_class(&mut symbols, "Label", "p.Label", SymbolKind::Class);
    let text = symbols.add_member(
        Symbol::new("text", "p.Label.text", SymbolKind::Field)
            .with_owner(label)
            .with_type(class_type("java.lang.String")),
    );

    let field = var("text", Some(text))
        .ty(ident("String", Some(string), type_span(&src)))
        .init(literal(
            LiteralValue::String("ünïcödé".to_string()),
            src.span("\"ünïcödé\""),
        ))
        .build(src.span("String text = \"ünïcödé\";"), src.pos("text"));
    let class_def = class("Label", Some(label))
        .member(field)
        .build(src.range("class Label", "\n}"), src.pos("Label"));
    let unit = unit(&src, top_level(None, Vec::new(), vec![class_def], src.all()), symbols);
    let field = decl_id(&unit, text);
    (src, unit, field)
}

#[test]
fn test_initializer_limit_counts_characters() {
    let (_, unit, field) = label_unit(|src| src.span("String"));
    let mut config = IndexerConfig::default();
    // Nine characters, thirteen bytes.
    config.max_initializer_length = 9;
    let (graph, _) = index_with(&config, &unit);
    assert_eq!(
        graph.fact(&field, facts::INITIALIZER).as_deref(),
        Some("\"ünïcödé\"")
    );

    config.max_initializer_length = 8;
    let (graph, _) = index_with(&config, &unit);
    assert_eq!(graph.fact(&field, facts::INITIALIZER), None);
}

#[test]
fn test_spans_past_end_of_file_get_no_anchor() {
    let end = LABEL.len() as i64;
    let outside = Span::new(end, end + 6);
    let (src, unit, field) = label_unit(|_| outside);
    let (graph, _) = index(&unit);

    assert_eq!(graph.kind_of(&anchor_id(outside)), None);
    // The rest of the declaration is still anchored.
    assert!(graph.has_edge(&anchor_id(src.span("text")), EdgeKind::DefinesBinding, &field));
}
