//! Blocking materials: deterministic seed-driven colors, a session seed table,
//! a material library, and the policy that decides which targets get a new
//! generated material, which are recolored, and which are left alone.

mod color;
mod library;
mod material;
mod policy;
mod seeds;
mod target;

pub use color::{
    CHANNEL_RANGE, COLOR_SEED_RANGE, ColorParams, ColorParamsError, color_for_seed, generate,
    hsv_to_rgb, hue_for_seed, with_alpha,
};
pub use library::{LibraryError, MaterialLibrary};
pub use material::{MaterialDef, MaterialError, MaterialId, MaterialNaming};
pub use policy::{
    AssignError, Assignment, AssignmentAction, AssignmentMode, AssignmentPolicy, InvocationReport,
};
pub use seeds::{SeedTable, SeedTableError};
pub use target::{Slot, SlotState, Target, TargetCollection, TargetList};
