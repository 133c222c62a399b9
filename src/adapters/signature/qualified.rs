use crate::domain::ports::SignatureGenerator;
use crate::domain::tree::{SymbolId, SymbolKind, SymbolTable, TypeDesc};

/// Signatures derived from qualified names.
///
/// - classes and packages: `a.b.Outer.Inner` (binary name for local and anonymous classes)
/// - methods: `a.b.C.m(int,java.lang.String)`; constructors are named `<init>`
/// - fields: `a.b.C.f`
/// - type parameters: `<owner>~T`
/// - locals and parameters: `<owner>.name@<id>` so shadowed names stay distinct
#[derive(Debug, Default, Clone, Copy)]
pub struct QualifiedNameSignatures;

impl QualifiedNameSignatures {
    pub fn new() -> Self {
        Self
    }

    fn owner_signature(&self, symbols: &SymbolTable, symbol: SymbolId) -> Option<String> {
        let owner = symbols.get(symbol)?.owner?;
        self.signature(symbols, owner)
    }
}

impl SignatureGenerator for QualifiedNameSignatures {
    fn signature(&self, symbols: &SymbolTable, symbol: SymbolId) -> Option<String> {
        let sym = symbols.get(symbol)?;
        match sym.kind {
            SymbolKind::Package => non_empty(&sym.qualified_name),
            k if k.is_class_like() => {
                if sym.qualified_name.is_empty() {
                    sym.flat_name.clone()
                } else {
                    Some(sym.qualified_name.clone())
                }
            }
            SymbolKind::Method | SymbolKind::Constructor => {
                let owner = self.owner_signature(symbols, symbol)?;
                let params = match &sym.erased_type {
                    Some(TypeDesc::Method { params, .. }) => {
                        params.iter().map(render).collect::<Vec<_>>().join(",")
                    }
                    _ => String::new(),
                };
                Some(format!("{owner}.{}({params})", sym.name))
            }
            SymbolKind::Field | SymbolKind::EnumConstant => {
                let owner = self.owner_signature(symbols, symbol)?;
                Some(format!("{owner}.{}", sym.name))
            }
            SymbolKind::TypeParameter => {
                let owner = self.owner_signature(symbols, symbol)?;
                Some(format!("{owner}~{}", sym.name))
            }
            SymbolKind::LocalVariable
            | SymbolKind::Parameter
            | SymbolKind::ExceptionParameter
            | SymbolKind::ResourceVariable => {
                let owner = self.owner_signature(symbols, symbol)?;
                Some(format!("{owner}.{}@{symbol}", sym.name))
            }
            _ => non_empty(&sym.qualified_name),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn render(ty: &TypeDesc) -> String {
    match ty {
        TypeDesc::Primitive { tag } => tag.name().to_string(),
        TypeDesc::Array { component } => format!("{}[]", render(component)),
        TypeDesc::Class { name } => name.clone(),
        TypeDesc::TypeVar { erasure } => erasure.clone(),
        TypeDesc::Method { params, ret } => {
            let params: Vec<String> = params.iter().map(render).collect();
            format!("({}){}", params.join(","), render(ret))
        }
    }
}
