/// A rendered file destined for the state repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFile {
    /// Path relative to the repository root
    pub name: String,

    /// Serialized contents
    pub contents: Vec<u8>,
}

impl ResourceFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}
