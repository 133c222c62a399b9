//! Binary-level (JVM) type descriptors.

use anyhow::{Result, bail};
use std::fmt;

use crate::domain::tree::{PrimitiveTag, TypeDesc};

/// A class, interface or enum in binary form, named by its flat (binary) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceType {
    pub qualified_name: String,
}

impl ReferenceType {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JvmType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Array(Box<JvmType>),
    Reference(ReferenceType),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VoidableType {
    Void,
    Type(JvmType),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodType {
    pub params: Vec<JvmType>,
    pub ret: VoidableType,
}

impl JvmType {
    /// Field descriptor (`I`, `[J`, `Ljava/lang/String;`).
    pub fn descriptor(&self) -> String {
        match self {
            JvmType::Boolean => "Z".to_string(),
            JvmType::Byte => "B".to_string(),
            JvmType::Char => "C".to_string(),
            JvmType::Short => "S".to_string(),
            JvmType::Int => "I".to_string(),
            JvmType::Long => "J".to_string(),
            JvmType::Float => "F".to_string(),
            JvmType::Double => "D".to_string(),
            JvmType::Array(component) => format!("[{}", component.descriptor()),
            JvmType::Reference(r) => format!("L{};", r.qualified_name.replace('.', "/")),
        }
    }
}

impl VoidableType {
    pub fn descriptor(&self) -> String {
        match self {
            VoidableType::Void => "V".to_string(),
            VoidableType::Type(t) => t.descriptor(),
        }
    }
}

impl MethodType {
    /// Method descriptor (`(IJ)V`).
    pub fn descriptor(&self) -> String {
        let params: String = self.params.iter().map(JvmType::descriptor).collect();
        format!("({params}){}", self.ret.descriptor())
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

fn primitive(tag: PrimitiveTag) -> Result<JvmType> {
    Ok(match tag {
        PrimitiveTag::Boolean => JvmType::Boolean,
        PrimitiveTag::Byte => JvmType::Byte,
        PrimitiveTag::Char => JvmType::Char,
        PrimitiveTag::Short => JvmType::Short,
        PrimitiveTag::Int => JvmType::Int,
        PrimitiveTag::Long => JvmType::Long,
        PrimitiveTag::Float => JvmType::Float,
        PrimitiveTag::Double => JvmType::Double,
        PrimitiveTag::Void | PrimitiveTag::Error => {
            bail!("unhandled type for binary descriptor: {}", tag.name())
        }
    })
}

/// Converts an erased semantic type to its binary form.
pub fn to_jvm_type(ty: &TypeDesc) -> Result<JvmType> {
    match ty {
        TypeDesc::Primitive { tag } => primitive(*tag),
        TypeDesc::Array { component } => Ok(JvmType::Array(Box::new(to_jvm_type(component)?))),
        TypeDesc::Class { name } => Ok(JvmType::Reference(ReferenceType::new(name.clone()))),
        TypeDesc::TypeVar { erasure } => Ok(JvmType::Reference(ReferenceType::new(erasure.clone()))),
        TypeDesc::Method { .. } => bail!("method type is not a value type"),
    }
}

fn to_jvm_return_type(ty: &TypeDesc) -> Result<VoidableType> {
    match ty {
        TypeDesc::Primitive {
            tag: PrimitiveTag::Void,
        } => Ok(VoidableType::Void),
        other => Ok(VoidableType::Type(to_jvm_type(other)?)),
    }
}

/// Converts an erased method type to its binary form.
pub fn to_method_jvm_type(ty: &TypeDesc) -> Result<MethodType> {
    match ty {
        TypeDesc::Method { params, ret } => Ok(MethodType {
            params: params.iter().map(to_jvm_type).collect::<Result<_>>()?,
            ret: to_jvm_return_type(ret)?,
        }),
        other => bail!("expected a method type, found {other:?}"),
    }
}
