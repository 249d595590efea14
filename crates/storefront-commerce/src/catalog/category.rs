//! Category types for product organization.

use crate::ids::CategoryId;
use crate::text::generate_slug;
use serde::{Deserialize, Serialize};

/// A product category as served by `GET /categories`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// URL-friendly slug; products reference categories by this value.
    pub slug: String,
    /// Category description.
    #[serde(default)]
    pub description: String,
    /// Category image URL.
    #[serde(default)]
    pub image_url: String,
    /// Parent category ID (None for root categories).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
    /// Whether the category is shown in navigation.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Category {
    /// Create a new active root category; the slug is derived from the name.
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            slug: generate_slug(&name),
            name,
            description: String::new(),
            image_url: String::new(),
            parent_id: None,
            is_active: true,
        }
    }

    /// Whether this is a top-level category.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
