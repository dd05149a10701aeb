//! Material library: the session's materials keyed by [`MaterialId`], with
//! unique-name allocation and lookup by name.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::material::{MaterialDef, MaterialError, MaterialId};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned while populating a library.
#[derive(Debug, Error, PartialEq)]
pub enum LibraryError {
    /// Material validation error.
    #[error("material error: {0}")]
    Material(#[from] MaterialError),

    /// Duplicate material name while loading a fixed set of definitions.
    #[error("duplicate material name: {0}")]
    DuplicateName(String),
}

// ---------------------------------------------------------------------------
// MaterialLibrary
// ---------------------------------------------------------------------------

/// All materials known to the session.
///
/// Names are unique. [`MaterialLibrary::add`] renames on collision the way
/// Blender does (`Name`, `Name.001`, `Name.002`, ...), always picking the
/// lowest free suffix, so names freed by removal get reused.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    /// Ordered by id, which is insertion order.
    materials: BTreeMap<MaterialId, MaterialDef>,
    /// Reverse lookup: name → `MaterialId`.
    name_to_id: HashMap<String, MaterialId>,
    next_id: u32,
}

impl MaterialLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a library from a fixed list of definitions, keeping names as given.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::DuplicateName`] if two definitions share a name,
    /// or [`LibraryError::Material`] if one fails validation.
    pub fn from_defs(defs: impl IntoIterator<Item = MaterialDef>) -> Result<Self, LibraryError> {
        let mut library = Self::new();
        for def in defs {
            if library.name_to_id.contains_key(&def.name) {
                return Err(LibraryError::DuplicateName(def.name));
            }
            library.add(def)?;
        }
        Ok(library)
    }

    /// Adds a material, renaming it if its name is taken. Returns its id.
    ///
    /// The lowest free `Name.NNN` is used, so a name freed by [`remove`](Self::remove)
    /// is handed out again. Since seeds are keyed by name, the new material
    /// then shares the removed one's seed in any [`SeedTable`](crate::SeedTable).
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Material`] if the definition fails validation.
    pub fn add(&mut self, def: MaterialDef) -> Result<MaterialId, LibraryError> {
        let mut def = def.validated()?;
        def.name = self.unique_name(&def.name);

        let id = MaterialId(self.next_id);
        self.next_id += 1;
        self.name_to_id.insert(def.name.clone(), id);
        self.materials.insert(id, def);
        Ok(id)
    }

    /// Removes a material. Slots still holding `id` read as empty afterwards.
    pub fn remove(&mut self, id: MaterialId) -> Option<MaterialDef> {
        let def = self.materials.remove(&id)?;
        self.name_to_id.remove(&def.name);
        Some(def)
    }

    /// Returns the material for `id`, if it still exists.
    pub fn get(&self, id: MaterialId) -> Option<&MaterialDef> {
        self.materials.get(&id)
    }

    /// Mutable access to the material for `id`.
    pub fn get_mut(&mut self, id: MaterialId) -> Option<&mut MaterialDef> {
        self.materials.get_mut(&id)
    }

    /// Look up a material ID by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<MaterialId> {
        self.name_to_id.get(name).copied()
    }

    /// Returns `true` if a material with this id exists.
    pub fn contains(&self, id: MaterialId) -> bool {
        self.materials.contains_key(&id)
    }

    /// Number of materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Returns `true` if the library holds no materials.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Iterates materials in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &MaterialDef)> {
        self.materials.iter().map(|(&id, def)| (id, def))
    }

    /// First free name derived from `name`.
    fn unique_name(&self, name: &str) -> String {
        if !self.name_to_id.contains_key(name) {
            return name.to_owned();
        }
        let stem = strip_numeric_suffix(name);
        (1u32..)
            .map(|n| format!("{stem}.{n:03}"))
            .find(|candidate| !self.name_to_id.contains_key(candidate))
            .unwrap_or_else(|| stem.to_owned())
    }
}

/// `"Name.004"` → `"Name"`; anything else is returned unchanged.
fn strip_numeric_suffix(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, digits))
            if !stem.is_empty()
                && !digits.is_empty()
                && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            stem
        }
        _ => name,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
