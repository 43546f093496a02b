use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// String identifier tagged with the kind of object it names, so an element id can
/// never be passed where a request id is expected.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T> {
    pub id: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(id: impl Into<String>) -> Self {
        Id { id: id.into(), _marker: PhantomData }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl<T> From<Id<T>> for String {
    fn from(id_wrapper: Id<T>) -> Self {
        id_wrapper.id
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full_name = std::any::type_name::<T>();
        let clean_name = full_name.split("::").last().unwrap_or(full_name);
        let display_name = clean_name.replace("Tag", "Id");

        write!(f, "{}: {:?}", display_name, self.id)
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy, Serialize, Deserialize)]
pub struct ElementTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy, Serialize, Deserialize)]
pub struct RequestTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy, Serialize, Deserialize)]
pub struct DisjunctionTag;

pub type ElementId = Id<ElementTag>;
pub type RequestId = Id<RequestTag>;
pub type DisjunctionId = Id<DisjunctionTag>;

/// Index of an OMS in the list produced by the partitioner.
pub type OmsId = usize;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_uses_tag_name() {
        let id = ElementId::new("roadm Lannion");

        assert_eq!(format!("{:?}", id), "ElementId: \"roadm Lannion\"");
        assert_eq!(format!("{}", id), "roadm Lannion");
    }

    #[test]
    fn test_ids_order_lexicographically() {
        let mut ids = vec![RequestId::new("2"), RequestId::new("10"), RequestId::new("1")];
        ids.sort();

        assert_eq!(ids, vec![RequestId::new("1"), RequestId::new("10"), RequestId::new("2")]);
    }
}
