use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Opaque identifier of a project record. Assigned once by the factory, never changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl_id!(ProjectId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        let a = ProjectId::new();
        let b = ProjectId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ProjectId::from("abc-123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc-123\"");

        let back: ProjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
