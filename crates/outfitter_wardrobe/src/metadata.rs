//! Token metadata and trait extraction.

use serde::{Deserialize, Serialize};

use crate::catalog::Slot;

/// Token metadata document (`metadata/<id>.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub attributes: Vec<TraitAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitAttribute {
    pub trait_type: String,
    /// Usually a string; numbers and other values are stringified.
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl TraitAttribute {
    /// Trimmed value, or `None` for empty and "none" values.
    #[must_use]
    pub fn value_name(&self) -> Option<String> {
        let text = match self.value.as_ref()? {
            serde_json::Value::String(s) => s.trim().to_string(),
            serde_json::Value::Null => return None,
            other => other.to_string(),
        };
        if text.is_empty() || text.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(text)
        }
    }
}

/// The fur and wearables a token is made of.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraitSet {
    pub fur: Option<String>,
    pub hat: Option<String>,
    pub shirt: Option<String>,
    pub eyes: Option<String>,
}

impl TraitSet {
    /// Picks traits by case-insensitive type. Later duplicates win.
    #[must_use]
    pub fn from_metadata(metadata: &TokenMetadata) -> Self {
        let mut traits = Self::default();
        for attribute in &metadata.attributes {
            let Some(value) = attribute.value_name() else {
                continue;
            };
            match attribute.trait_type.trim().to_ascii_lowercase().as_str() {
                "fur" => traits.fur = Some(value),
                "hat" | "hats" => traits.hat = Some(value),
                "shirt" | "shirts" => traits.shirt = Some(value),
                "eyes" | "eye" => traits.eyes = Some(value),
                _ => {}
            }
        }
        traits
    }

    #[must_use]
    pub fn wearable(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Hat => self.hat.as_deref(),
            Slot::Shirt => self.shirt.as_deref(),
            Slot::Eyes => self.eyes.as_deref(),
        }
    }
}
