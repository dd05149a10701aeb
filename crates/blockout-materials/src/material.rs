//! Core material types: [`MaterialId`], [`MaterialDef`], and [`MaterialNaming`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// MaterialId
// ---------------------------------------------------------------------------

/// Handle to a material stored in a [`MaterialLibrary`](crate::MaterialLibrary).
///
/// Ids are never reused within a library, so a slot holding the id of a
/// removed material reads as empty instead of aliasing a newer one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

// ---------------------------------------------------------------------------
// MaterialError
// ---------------------------------------------------------------------------

/// Errors returned during material validation.
#[derive(Debug, Error, PartialEq)]
pub enum MaterialError {
    /// The material name must not be empty.
    #[error("material name must not be empty")]
    EmptyName,
}

// ---------------------------------------------------------------------------
// MaterialDef
// ---------------------------------------------------------------------------

/// A surface material as seen by the assignment policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialDef {
    /// Unique name within a library; doubles as the seed identity.
    pub name: String,

    /// Linear RGBA base color, or `None` when the material exposes no color
    /// input (e.g. an imported material without a surface shader).
    /// Each component is clamped to `[0.0, 1.0]`.
    pub base_color: Option<[f32; 4]>,
}

impl Default for MaterialDef {
    fn default() -> Self {
        Self {
            name: String::from("Material"),
            base_color: Some([0.8, 0.8, 0.8, 1.0]),
        }
    }
}

impl MaterialDef {
    /// A material carrying `color` as its base color.
    pub fn with_color(name: impl Into<String>, color: [f32; 4]) -> Self {
        Self {
            name: name.into(),
            base_color: Some(color),
        }
    }

    /// Validates the name and clamps the base color to `[0.0, 1.0]`.
    ///
    /// # Errors
    ///
    /// Returns [`MaterialError::EmptyName`] if the name is empty.
    pub fn validated(mut self) -> Result<Self, MaterialError> {
        if self.name.is_empty() {
            return Err(MaterialError::EmptyName);
        }
        if let Some(color) = &mut self.base_color {
            for c in color {
                *c = c.clamp(0.0, 1.0);
            }
        }
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// MaterialNaming
// ---------------------------------------------------------------------------

/// Name conventions that tell generated materials and placeholders apart
/// from everything else in a library.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialNaming {
    /// Materials whose name contains this tag are owned by the generator.
    /// It is also the base name for new entries.
    pub tag: String,

    /// Exact name of the host's default material, replaced in per-target mode.
    pub placeholder: String,
}

impl Default for MaterialNaming {
    fn default() -> Self {
        Self {
            tag: String::from("BlockMaterial"),
            placeholder: String::from("Material"),
        }
    }
}

impl MaterialNaming {
    /// Returns `true` if `name` marks a generated material.
    pub fn is_generated(&self, name: &str) -> bool {
        name.contains(&self.tag)
    }

    /// Returns `true` if `name` is the host's default material.
    pub fn is_placeholder(&self, name: &str) -> bool {
        name == self.placeholder
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
