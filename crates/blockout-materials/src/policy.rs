//! Assignment policy: decides which targets get a new generated material,
//! which generated materials are recolored in place, and which targets are
//! left alone. Also removes generated materials nothing references anymore.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::color::{ColorParams, ColorParamsError, generate, with_alpha};
use crate::library::{LibraryError, MaterialLibrary};
use crate::material::{MaterialDef, MaterialId, MaterialNaming};
use crate::seeds::SeedTable;
use crate::target::{SlotState, TargetCollection};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by an invocation. Nothing is modified when one occurs.
#[derive(Debug, Error, PartialEq)]
pub enum AssignError {
    /// The invocation parameters are outside their accepted domain.
    #[error("invalid color params: {0}")]
    Params(#[from] ColorParamsError),

    /// The naming tag is empty, which would match every material.
    #[error("generated-material tag must not be empty")]
    EmptyTag,

    /// A new material could not be added to the library.
    #[error("library error: {0}")]
    Library(#[from] LibraryError),
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// How an invocation walks its targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AssignmentMode {
    /// Selected targets share one new material; generated ones are recolored.
    Batch,
    /// Every target without a usable material gets its own new material.
    PerTarget,
    /// The active target gets a new material in an extra slot.
    ActiveTarget,
}

impl AssignmentMode {
    /// Batch mode when the host has an explicit selection, otherwise per-target.
    pub fn for_selection(has_selection: bool) -> Self {
        if has_selection {
            Self::Batch
        } else {
            Self::PerTarget
        }
    }
}

/// What happened to one target slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AssignmentAction {
    /// A new slot was appended.
    Attached,
    /// An existing empty slot was filled.
    Filled,
    /// A placeholder or foreign material was replaced.
    Overridden,
    /// The generated material already in the slot got a fresh color.
    Recolored,
}

/// A single change made by an invocation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Assignment {
    /// Index of the target in its collection.
    pub target: usize,
    /// Slot index that now holds `material`.
    pub slot: usize,
    /// The generated material.
    pub material: MaterialId,
    /// What was done.
    pub action: AssignmentAction,
    /// The material's RGBA color after the change.
    pub color: [f32; 4],
}

/// Summary of one invocation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InvocationReport {
    /// Mode the invocation ran in.
    pub mode: AssignmentMode,
    /// Unreferenced generated materials removed before any generation.
    pub removed: usize,
    /// Materials created by this invocation, in creation order.
    pub created: Vec<MaterialId>,
    /// Placeholder materials deleted from the library (per-target mode only).
    pub discarded: Vec<MaterialId>,
    /// Every slot that changed, in target order.
    pub assignments: Vec<Assignment>,
}

impl InvocationReport {
    fn new(mode: AssignmentMode, removed: usize) -> Self {
        Self {
            mode,
            removed,
            created: Vec::new(),
            discarded: Vec::new(),
            assignments: Vec::new(),
        }
    }

    /// The assignment made to `target`, if any.
    pub fn for_target(&self, target: usize) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.target == target)
    }
}

// ---------------------------------------------------------------------------
// AssignmentPolicy
// ---------------------------------------------------------------------------

/// Applies the blocking-material rules to a [`TargetCollection`].
///
/// The policy itself is stateless apart from its naming rules. The session's
/// [`SeedTable`] and [`MaterialLibrary`] are owned by the caller and passed in
/// on every invocation.
#[derive(Clone, Debug, Default)]
pub struct AssignmentPolicy {
    naming: MaterialNaming,
}

impl AssignmentPolicy {
    /// Creates a policy using `naming` to recognise generated and placeholder materials.
    pub fn new(naming: MaterialNaming) -> Self {
        Self { naming }
    }

    /// The naming rules in use.
    pub fn naming(&self) -> &MaterialNaming {
        &self.naming
    }

    /// Removes every generated material no slot references. Returns how many
    /// were removed.
    pub fn clean_up<T: TargetCollection + ?Sized>(
        &self,
        library: &mut MaterialLibrary,
        targets: &T,
    ) -> usize {
        let orphans: Vec<MaterialId> = library
            .iter()
            .filter(|(id, def)| self.naming.is_generated(&def.name) && targets.users(*id) == 0)
            .map(|(id, _)| id)
            .collect();

        for &id in &orphans {
            if let Some(def) = library.remove(id) {
                debug!(material = %def.name, "removed unreferenced material");
            }
        }
        orphans.len()
    }

    /// Runs one invocation in batch or per-target mode, depending on whether
    /// the collection has a selection.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::Params`] if `params` is out of range and
    /// [`AssignError::EmptyTag`] if the naming tag is empty, both before
    /// touching anything.
    ///
    /// # Panics
    ///
    /// Panics if a generated material has no base color input to recolor.
    pub fn invoke<T: TargetCollection + ?Sized>(
        &self,
        seeds: &mut SeedTable,
        library: &mut MaterialLibrary,
        targets: &mut T,
        params: &ColorParams,
    ) -> Result<InvocationReport, AssignError> {
        let mode = AssignmentMode::for_selection(targets.has_selection());
        self.run(mode, seeds, library, targets, params)
    }

    /// Runs one invocation against the active target only: a new generated
    /// material is appended as an extra slot. The report's assignment carries
    /// the new slot index so the host can make it active. Without an active
    /// target only the cleanup pass runs.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::Params`] if `params` is out of range and
    /// [`AssignError::EmptyTag`] if the naming tag is empty, both before
    /// touching anything.
    pub fn invoke_on_active<T: TargetCollection + ?Sized>(
        &self,
        seeds: &mut SeedTable,
        library: &mut MaterialLibrary,
        targets: &mut T,
        params: &ColorParams,
    ) -> Result<InvocationReport, AssignError> {
        self.run(AssignmentMode::ActiveTarget, seeds, library, targets, params)
    }

    fn run<T: TargetCollection + ?Sized>(
        &self,
        mode: AssignmentMode,
        seeds: &mut SeedTable,
        library: &mut MaterialLibrary,
        targets: &mut T,
        params: &ColorParams,
    ) -> Result<InvocationReport, AssignError> {
        let params = params.validated()?;
        if self.naming.tag.is_empty() {
            return Err(AssignError::EmptyTag);
        }

        let removed = self.clean_up(library, targets);
        let mut report = InvocationReport::new(mode, removed);

        match mode {
            AssignmentMode::Batch => self.batch(seeds, library, targets, &params, &mut report)?,
            AssignmentMode::PerTarget => {
                self.per_target(seeds, library, targets, &params, &mut report)?
            }
            AssignmentMode::ActiveTarget => {
                self.active_target(seeds, library, targets, &params, &mut report)?
            }
        }

        info!(
            ?mode,
            removed = report.removed,
            created = report.created.len(),
            assigned = report.assignments.len(),
            "blocking materials applied"
        );
        Ok(report)
    }

    fn batch<T: TargetCollection + ?Sized>(
        &self,
        seeds: &mut SeedTable,
        library: &mut MaterialLibrary,
        targets: &mut T,
        params: &ColorParams,
        report: &mut InvocationReport,
    ) -> Result<(), AssignError> {
        // Created on first need so a batch that only recolors adds nothing.
        let mut shared: Option<(MaterialId, [f32; 4])> = None;

        for target in 0..targets.target_count() {
            if !targets.is_selected(target) {
                continue;
            }

            let state = SlotState::classify(targets.slots(target), library, &self.naming);
            let assignment = match state {
                SlotState::Generated(material) => Assignment {
                    target,
                    slot: 0,
                    material,
                    action: AssignmentAction::Recolored,
                    color: self.recolor(seeds, library, material, params),
                },
                SlotState::NoSlots
                | SlotState::Empty
                | SlotState::Placeholder(_)
                | SlotState::Foreign(_) => {
                    let (material, color) = match shared {
                        Some(entry) => entry,
                        None => {
                            let entry = self.create(seeds, library, params)?;
                            report.created.push(entry.0);
                            *shared.insert(entry)
                        }
                    };
                    let (slot, action) = attach(targets, target, state, material);
                    Assignment {
                        target,
                        slot,
                        material,
                        action,
                        color,
                    }
                }
            };

            debug!(
                index = target,
                action = ?assignment.action,
                material = assignment.material.0,
                "batch"
            );
            report.assignments.push(assignment);
        }
        Ok(())
    }

    fn per_target<T: TargetCollection + ?Sized>(
        &self,
        seeds: &mut SeedTable,
        library: &mut MaterialLibrary,
        targets: &mut T,
        params: &ColorParams,
        report: &mut InvocationReport,
    ) -> Result<(), AssignError> {
        for target in 0..targets.target_count() {
            let state = SlotState::classify(targets.slots(target), library, &self.naming);
            match state {
                SlotState::Generated(_) | SlotState::Foreign(_) => continue,
                SlotState::Placeholder(placeholder) => {
                    // Other targets sharing the placeholder now see an empty slot.
                    library.remove(placeholder);
                    report.discarded.push(placeholder);
                }
                SlotState::NoSlots | SlotState::Empty => {}
            }

            let (material, color) = self.create(seeds, library, params)?;
            report.created.push(material);
            let (slot, action) = attach(targets, target, state, material);

            debug!(index = target, ?action, material = material.0, "per-target");
            report.assignments.push(Assignment {
                target,
                slot,
                material,
                action,
                color,
            });
        }
        Ok(())
    }

    fn active_target<T: TargetCollection + ?Sized>(
        &self,
        seeds: &mut SeedTable,
        library: &mut MaterialLibrary,
        targets: &mut T,
        params: &ColorParams,
        report: &mut InvocationReport,
    ) -> Result<(), AssignError> {
        let Some(target) = targets.active() else {
            debug!("no active target");
            return Ok(());
        };

        let (material, color) = self.create(seeds, library, params)?;
        report.created.push(material);
        let slot = targets.push_slot(target, Some(material));
        report.assignments.push(Assignment {
            target,
            slot,
            material,
            action: AssignmentAction::Attached,
            color,
        });
        Ok(())
    }

    /// Adds a fresh generated material and colors it from its own seed.
    fn create(
        &self,
        seeds: &mut SeedTable,
        library: &mut MaterialLibrary,
        params: &ColorParams,
    ) -> Result<(MaterialId, [f32; 4]), AssignError> {
        let id = library.add(MaterialDef::with_color(
            self.naming.tag.clone(),
            [0.0, 0.0, 0.0, 1.0],
        ))?;
        Ok((id, self.recolor(seeds, library, id, params)))
    }

    /// Regenerates the color of a generated material from its stored seed.
    ///
    /// # Panics
    ///
    /// Panics if the material is missing or exposes no base color input; the
    /// policy only recolors materials it has just classified or created.
    fn recolor(
        &self,
        seeds: &mut SeedTable,
        library: &mut MaterialLibrary,
        id: MaterialId,
        params: &ColorParams,
    ) -> [f32; 4] {
        let Some(def) = library.get_mut(id) else {
            panic!("generated material {id:?} is not in the library");
        };
        let color = with_alpha(generate(&def.name, seeds, params));
        match &mut def.base_color {
            Some(base_color) => *base_color = color,
            None => panic!("generated material {:?} has no base color input", def.name),
        }
        color
    }
}

/// Puts `material` into the slot `state` calls for and reports where it went.
fn attach<T: TargetCollection + ?Sized>(
    targets: &mut T,
    target: usize,
    state: SlotState,
    material: MaterialId,
) -> (usize, AssignmentAction) {
    match state {
        SlotState::NoSlots => (
            targets.push_slot(target, Some(material)),
            AssignmentAction::Attached,
        ),
        SlotState::Empty => {
            targets.set_slot(target, 0, Some(material));
            (0, AssignmentAction::Filled)
        }
        SlotState::Generated(_) | SlotState::Placeholder(_) | SlotState::Foreign(_) => {
            targets.set_slot(target, 0, Some(material));
            (0, AssignmentAction::Overridden)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
