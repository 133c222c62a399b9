use crate::domain::emitter::JVM_LANGUAGE;
use crate::domain::jvm::{MethodType, ReferenceType};
use crate::domain::node::NodeId;
use crate::domain::ports::BinaryMapper;

/// Names binary-level nodes after their JVM descriptors.
#[derive(Debug, Default, Clone)]
pub struct JvmDescriptorMapper {
    corpus: String,
}

impl JvmDescriptorMapper {
    pub fn new(corpus: impl Into<String>) -> Self {
        Self {
            corpus: corpus.into(),
        }
    }

    fn node(&self, signature: String) -> NodeId {
        NodeId::new(signature, self.corpus.clone(), "", JVM_LANGUAGE)
    }
}

impl BinaryMapper for JvmDescriptorMapper {
    fn class_node(&self, class: &ReferenceType) -> NodeId {
        self.node(class.qualified_name.clone())
    }

    fn method_node(&self, class: &ReferenceType, name: &str, ty: &MethodType) -> NodeId {
        self.node(format!("{}.{name}{}", class.qualified_name, ty.descriptor()))
    }

    fn field_node(&self, class: &ReferenceType, name: &str) -> NodeId {
        self.node(format!("{}.{name}", class.qualified_name))
    }

    fn parameter_node(
        &self,
        class: &ReferenceType,
        name: &str,
        ty: &MethodType,
        index: usize,
    ) -> NodeId {
        self.node(format!(
            "{}.{name}{}.param{index}",
            class.qualified_name,
            ty.descriptor()
        ))
    }
}
