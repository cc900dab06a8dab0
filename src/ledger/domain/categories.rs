use serde::{Deserialize, Serialize};

use super::transactions::TransactionType;

/// A label transactions reference by name. There is no foreign key from
/// transactions to categories; deleting or renaming a category leaves
/// historical transactions pointing at the old name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl CategoryDraft {
    pub fn into_category(self, id: String) -> Category {
        Category {
            id,
            name: self.name,
            icon: self.icon,
            color: self.color,
            kind: self.kind,
        }
    }
}
