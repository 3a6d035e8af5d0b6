// SPDX-License-Identifier: MIT OR Apache-2.0
//! Effect catalog entries referenced by effect clips.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectAssetId(pub String);

impl EffectAssetId {
    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EffectAssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EffectAssetId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EffectAssetId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Category of an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    /// Transition between shots
    Transition,
    /// Per-pixel filter
    Filter,
    /// Graphic drawn over the program
    Overlay,
    /// Combines several sources
    Composite,
}

/// Read-only catalog entry describing an applicable effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectAsset {
    /// Catalog id
    pub id: EffectAssetId,
    /// Display name
    pub name: String,
    /// Category
    pub kind: EffectKind,
    /// Icon name for pickers
    pub icon: Option<String>,
    /// Short description
    pub description: Option<String>,
}

impl EffectAsset {
    /// Create a catalog entry without icon or description
    pub fn new(id: impl Into<EffectAssetId>, name: impl Into<String>, kind: EffectKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            icon: None,
            description: None,
        }
    }

    /// Set the icon
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Effects available in every new timeline
    pub fn builtin_catalog() -> Vec<EffectAsset> {
        vec![
            EffectAsset::new("fade", "Fade", EffectKind::Transition)
                .with_icon("fade")
                .with_description("Fade the program to and from black"),
            EffectAsset::new("crossfade", "Crossfade", EffectKind::Transition)
                .with_icon("crossfade")
                .with_description("Dissolve between overlapping sources"),
            EffectAsset::new("blur", "Blur", EffectKind::Filter)
                .with_icon("blur")
                .with_description("Gaussian blur over the program"),
            EffectAsset::new("color-grade", "Color Grade", EffectKind::Filter)
                .with_icon("palette")
                .with_description("Exposure, contrast and saturation adjustment"),
            EffectAsset::new("lower-third", "Lower Third", EffectKind::Overlay)
                .with_icon("text")
                .with_description("Name and title strap in the lower third"),
            EffectAsset::new("picture-in-picture", "Picture in Picture", EffectKind::Composite)
                .with_icon("pip")
                .with_description("Inset a second source over the program"),
            EffectAsset::new("chroma-key", "Chroma Key", EffectKind::Composite)
                .with_icon("key")
                .with_description("Replace a solid background color"),
        ]
    }
}
