pub mod anchor;
pub mod comments;
pub mod context;
pub mod edge;
pub mod emitter;
pub mod graph;
pub mod jvm;
pub mod metadata;
pub mod node;
pub mod ports;
pub mod scanner;
pub mod stats;
pub mod tree;
