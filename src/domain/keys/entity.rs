use serde::{Deserialize, Serialize};

use crate::domain::{Identity, PublicKey};

/// One authorized_keys entry: a provenance comment and the key material
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    comment: String,
    #[serde(rename = "key")]
    material: String,
}

impl Key {
    pub fn new(comment: impl Into<String>, material: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            material: material.into(),
        }
    }

    /// Key with the comment `"<login> - <key id>"`
    pub fn for_identity(identity: &Identity, key: &PublicKey) -> Self {
        Self::new(format!("{} - {}", identity.login(), key.id), key.key.clone())
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn material(&self) -> &str {
        &self.material
    }
}
