pub mod doc {
    pub mod javadoc;
}
pub mod fs {
    pub mod reader;
}
pub mod jvm {
    pub mod mapper;
}
pub mod metadata {
    pub mod json;
}
pub mod signature {
    pub mod qualified;
}
pub mod sink {
    pub mod jsonl;
}
pub mod tree {
    pub mod loader;
}
