//! The narrow view of host objects the assignment policy works through.
//!
//! A host implements [`TargetCollection`] over whatever it calls objects or
//! meshes. [`TargetList`] is the in-memory implementation used by the CLI and
//! the tests.

use serde::{Deserialize, Serialize};

use crate::library::MaterialLibrary;
use crate::material::{MaterialId, MaterialNaming};

/// One material slot on a target. `None` is a slot that exists but holds nothing.
pub type Slot = Option<MaterialId>;

// ---------------------------------------------------------------------------
// TargetCollection
// ---------------------------------------------------------------------------

/// Color-bearing targets addressed by index in `0..target_count()`.
pub trait TargetCollection {
    /// Number of targets.
    fn target_count(&self) -> usize;

    /// Material slots of `target`, in slot order.
    fn slots(&self, target: usize) -> &[Slot];

    /// Overwrites slot `slot` of `target`.
    fn set_slot(&mut self, target: usize, slot: usize, material: Slot);

    /// Appends a slot to `target` and returns its index.
    fn push_slot(&mut self, target: usize, material: Slot) -> usize;

    /// Returns `true` if `target` is explicitly selected.
    fn is_selected(&self, target: usize) -> bool;

    /// Target being edited, if the host is in an edit mode.
    fn active(&self) -> Option<usize> {
        None
    }

    /// Returns `true` if at least one target is selected.
    fn has_selection(&self) -> bool {
        (0..self.target_count()).any(|t| self.is_selected(t))
    }

    /// Number of slots across all targets that hold `material`.
    fn users(&self, material: MaterialId) -> usize {
        (0..self.target_count())
            .flat_map(|t| self.slots(t))
            .filter(|slot| **slot == Some(material))
            .count()
    }
}

// ---------------------------------------------------------------------------
// SlotState
// ---------------------------------------------------------------------------

/// What a target's first slot currently holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotState {
    /// The target has no slots at all.
    NoSlots,
    /// The first slot exists but is empty, or points at a removed material.
    Empty,
    /// The first slot holds a generated material.
    Generated(MaterialId),
    /// The first slot holds the host's default material.
    Placeholder(MaterialId),
    /// The first slot holds some other material.
    Foreign(MaterialId),
}

impl SlotState {
    /// Classifies `slots` by their first entry only.
    pub fn classify(slots: &[Slot], library: &MaterialLibrary, naming: &MaterialNaming) -> Self {
        let Some(first) = slots.first().copied() else {
            return Self::NoSlots;
        };
        let Some((id, def)) = first.and_then(|id| library.get(id).map(|def| (id, def))) else {
            return Self::Empty;
        };
        if naming.is_generated(&def.name) {
            Self::Generated(id)
        } else if naming.is_placeholder(&def.name) {
            Self::Placeholder(id)
        } else {
            Self::Foreign(id)
        }
    }
}

// ---------------------------------------------------------------------------
// TargetList
// ---------------------------------------------------------------------------

/// An in-memory target.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Display name, used only for reporting.
    pub name: String,
    /// Material slots.
    pub slots: Vec<Slot>,
    /// Explicit selection flag.
    pub selected: bool,
}

impl Target {
    /// An unselected target with no slots.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: replaces the slots.
    pub fn with_slots(mut self, slots: impl IntoIterator<Item = Slot>) -> Self {
        self.slots = slots.into_iter().collect();
        self
    }

    /// Builder: marks the target selected.
    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }
}

/// A plain list of targets with an optional active target.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetList {
    /// The targets, addressed by index.
    pub targets: Vec<Target>,
    /// Index of the target being edited.
    pub active: Option<usize>,
}

impl TargetList {
    /// Wraps `targets` with no active target.
    pub fn new(targets: Vec<Target>) -> Self {
        Self {
            targets,
            active: None,
        }
    }

    /// First slot of `target`, flattened: `None` for no slots or an empty slot.
    pub fn first_material(&self, target: usize) -> Option<MaterialId> {
        self.targets
            .get(target)
            .and_then(|t| t.slots.first().copied().flatten())
    }
}

impl TargetCollection for TargetList {
    fn target_count(&self) -> usize {
        self.targets.len()
    }

    fn slots(&self, target: usize) -> &[Slot] {
        &self.targets[target].slots
    }

    fn set_slot(&mut self, target: usize, slot: usize, material: Slot) {
        self.targets[target].slots[slot] = material;
    }

    fn push_slot(&mut self, target: usize, material: Slot) -> usize {
        let slots = &mut self.targets[target].slots;
        slots.push(material);
        slots.len() - 1
    }

    fn is_selected(&self, target: usize) -> bool {
        self.targets[target].selected
    }

    fn active(&self) -> Option<usize> {
        self.active.filter(|&t| t < self.targets.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
