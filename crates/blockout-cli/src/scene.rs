//! RON scene files: the materials, preset seeds, and targets a run starts
//! from, and the same shape written back out afterwards.

use std::collections::BTreeMap;
use std::path::Path;

use blockout_materials::{
    LibraryError, MaterialDef, MaterialId, MaterialLibrary, MaterialNaming, SeedTable,
    SeedTableError, Target, TargetList,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned while loading or resolving a scene file.
#[derive(Debug, Error)]
pub enum SceneError {
    /// I/O error reading the scene file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// RON deserialization error.
    #[error("ron parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// The material list is invalid.
    #[error("material error: {0}")]
    Library(#[from] LibraryError),

    /// A preset seed was rejected.
    #[error("seed error: {0}")]
    Seed(#[from] SeedTableError),

    /// A target slot names a material the scene does not define.
    #[error("target {target:?} uses unknown material {material:?}")]
    UnknownMaterial {
        /// Target holding the slot.
        target: String,
        /// Name in the slot.
        material: String,
    },

    /// A generated material has no base color to recolor.
    #[error("generated material {0:?} has no base color")]
    MissingColor(String),

    /// The active target is not in the target list.
    #[error("active target {0:?} not found")]
    UnknownActive(String),
}

/// A target as written in a scene file, with slots referring to materials by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetEntry {
    /// Target name.
    pub name: String,
    /// Material names per slot; `None` is an empty slot.
    #[serde(default)]
    pub slots: Vec<Option<String>>,
    /// Explicit selection flag.
    #[serde(default)]
    pub selected: bool,
}

/// Top-level scene file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    /// Materials in the library, in order.
    #[serde(default)]
    pub materials: Vec<MaterialDef>,
    /// Seeds already assigned to material identities.
    #[serde(default)]
    pub seeds: BTreeMap<String, f64>,
    /// Targets in order.
    pub targets: Vec<TargetEntry>,
    /// Name of the target being edited.
    #[serde(default)]
    pub active: Option<String>,
}

/// A scene resolved into the types the policy works on.
pub struct Scene {
    pub library: MaterialLibrary,
    pub targets: TargetList,
}

impl SceneFile {
    /// Reads a scene file from disk.
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parses a scene from a RON string.
    pub fn from_ron_str(ron_str: &str) -> Result<Self, SceneError> {
        Ok(ron::from_str(ron_str)?)
    }

    /// Builds the library and target list, and copies preset seeds into `seeds`.
    ///
    /// Materials that `naming` marks as generated must carry a base color.
    pub fn resolve(
        &self,
        naming: &MaterialNaming,
        seeds: &mut SeedTable,
    ) -> Result<Scene, SceneError> {
        if let Some(def) = self
            .materials
            .iter()
            .find(|def| naming.is_generated(&def.name) && def.base_color.is_none())
        {
            return Err(SceneError::MissingColor(def.name.clone()));
        }

        let library = MaterialLibrary::from_defs(self.materials.iter().cloned())?;

        let mut targets = Vec::with_capacity(self.targets.len());
        for entry in &self.targets {
            let slots = entry
                .slots
                .iter()
                .map(|slot| match slot {
                    None => Ok(None),
                    Some(name) => library
                        .lookup_by_name(name)
                        .map(Some)
                        .ok_or_else(|| SceneError::UnknownMaterial {
                            target: entry.name.clone(),
                            material: name.clone(),
                        }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            targets.push(Target {
                name: entry.name.clone(),
                slots,
                selected: entry.selected,
            });
        }

        let active = match &self.active {
            None => None,
            Some(name) => Some(
                targets
                    .iter()
                    .position(|t| &t.name == name)
                    .ok_or_else(|| SceneError::UnknownActive(name.clone()))?,
            ),
        };

        for (identity, &seed) in &self.seeds {
            seeds.try_insert(identity.as_str(), seed)?;
        }

        Ok(Scene {
            library,
            targets: TargetList { targets, active },
        })
    }

    /// Captures the state after a run in scene-file form, so it can be fed
    /// back in to continue the session.
    pub fn capture(scene: &Scene, seeds: &SeedTable) -> Self {
        let name_of = |id: MaterialId| scene.library.get(id).map(|def| def.name.clone());
        let targets = &scene.targets;

        Self {
            materials: scene.library.iter().map(|(_, def)| def.clone()).collect(),
            seeds: seeds
                .iter()
                .map(|(identity, seed)| (identity.to_owned(), seed))
                .collect(),
            targets: targets
                .targets
                .iter()
                .map(|t| TargetEntry {
                    name: t.name.clone(),
                    slots: t.slots.iter().map(|slot| slot.and_then(name_of)).collect(),
                    selected: t.selected,
                })
                .collect(),
            active: targets
                .active
                .and_then(|i| targets.targets.get(i))
                .map(|t| t.name.clone()),
        }
    }
}
