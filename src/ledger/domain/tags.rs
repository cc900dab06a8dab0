use serde::{Deserialize, Serialize};

/// A free-form label. Transactions hold a set of tag ids; removing a tag does
/// not cascade, so a transaction may carry ids that no longer resolve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagDraft {
    pub name: String,
    pub color: String,
}

impl TagDraft {
    pub fn into_tag(self, id: String) -> Tag {
        Tag {
            id,
            name: self.name,
            color: self.color,
        }
    }
}
