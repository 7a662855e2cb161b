use serde::{Deserialize, Serialize};

/// Records the backend hands out either populated or as a bare id.
pub trait Identified {
    fn id(&self) -> Option<&str>;
    fn display_name(&self) -> String;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Ref<T> {
    Id(String),
    Inline(Box<T>),
}

impl<T: Identified> Ref<T> {
    pub fn id(&self) -> Option<&str> {
        match self {
            Ref::Id(id) => Some(id.as_str()),
            Ref::Inline(item) => item.id(),
        }
    }

    pub fn inline(&self) -> Option<&T> {
        match self {
            Ref::Id(_) => None,
            Ref::Inline(item) => Some(item),
        }
    }

    /// Name of a populated reference, the raw id otherwise.
    pub fn display_name(&self) -> String {
        match self {
            Ref::Id(id) => id.clone(),
            Ref::Inline(item) => item.display_name(),
        }
    }
}
