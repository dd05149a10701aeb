//! End-to-end invocations over a session: seed table, library, and targets
//! persisting across calls.

use blockout_materials::{
    AssignmentAction, AssignmentMode, AssignmentPolicy, ColorParams, MaterialDef, MaterialLibrary,
    MaterialNaming, SeedTable, Slot, Target, TargetCollection, TargetList, color_for_seed,
    generate, with_alpha,
};

fn material(library: &mut MaterialLibrary, name: &str) -> blockout_materials::MaterialId {
    library
        .add(MaterialDef::with_color(name, [0.8, 0.8, 0.8, 1.0]))
        .unwrap()
}

#[test]
fn test_mixed_batch_scenario() {
    let policy = AssignmentPolicy::default();
    let mut seeds = SeedTable::with_rng_seed(2024);
    let mut library = MaterialLibrary::new();
    let tagged = material(&mut library, "BlockMaterial");
    let foreign = material(&mut library, "Concrete");
    seeds.try_insert("BlockMaterial", 0.3).unwrap();

    let mut targets = TargetList::new(vec![
        Target::new("A").selected(),
        Target::new("B").with_slots([Some(tagged)]).selected(),
        Target::new("C").with_slots([Some(foreign)]).selected(),
    ]);
    let params = ColorParams {
        color_seed: 1,
        saturation: 0.65,
        value: 0.5,
    };

    let report = policy
        .invoke(&mut seeds, &mut library, &mut targets, &params)
        .unwrap();

    assert_eq!(report.mode, AssignmentMode::Batch);
    assert_eq!(report.removed, 0);
    assert_eq!(report.created.len(), 1);

    let a = report.for_target(0).unwrap();
    let b = report.for_target(1).unwrap();
    let c = report.for_target(2).unwrap();
    let naming = MaterialNaming::default();

    // A and C share the single new material.
    assert_eq!(a.material, c.material);
    assert_eq!(a.color, c.color);
    assert_eq!(a.action, AssignmentAction::Attached);
    assert_eq!(c.action, AssignmentAction::Overridden);
    let shared = library.get(a.material).unwrap();
    assert!(naming.is_generated(&shared.name));
    assert_eq!(shared.base_color, Some(a.color));

    // B keeps its identity and is colored from seed 0.3.
    assert_eq!(b.material, tagged);
    assert_eq!(b.action, AssignmentAction::Recolored);
    assert_eq!(b.color, with_alpha(color_for_seed(0.3, &params)));
    assert_ne!(b.color, a.color);

    assert_eq!(targets.first_material(0), Some(a.material));
    assert_eq!(targets.first_material(1), Some(tagged));
    assert_eq!(targets.first_material(2), Some(a.material));
}

#[test]
fn test_generate_is_deterministic() {
    let params = ColorParams {
        color_seed: 250,
        saturation: 0.9,
        value: 0.7,
    };
    for seed in [0.0, 0.125, 0.3, 0.75, 0.999_999] {
        let mut seeds = SeedTable::with_rng_seed(0);
        seeds.try_insert("m", seed).unwrap();
        let first = generate("m", &mut seeds, &params);
        let second = generate("m", &mut seeds, &params);
        assert_eq!(first, second);
        assert_eq!(first, color_for_seed(seed, &params));
    }
}

#[test]
fn test_seed_drawn_once_then_reused() {
    let params = ColorParams::default();
    let mut seeds = SeedTable::with_rng_seed(11);

    let first = generate("BlockMaterial", &mut seeds, &params);
    let stored = seeds.get("BlockMaterial").unwrap();
    let second = generate("BlockMaterial", &mut seeds, &params);

    assert_eq!(seeds.len(), 1);
    assert_eq!(first, second);
    assert_eq!(first, color_for_seed(stored, &params));

    // Same pinned stream, same first seed.
    let mut replay = SeedTable::with_rng_seed(11);
    assert_eq!(generate("BlockMaterial", &mut replay, &params), first);
}

#[test]
fn test_session_persists_across_invocations() {
    let policy = AssignmentPolicy::default();
    let mut seeds = SeedTable::with_rng_seed(5);
    let mut library = MaterialLibrary::new();
    let mut targets = TargetList::new(vec![Target::new("a"), Target::new("b")]);

    let first = policy
        .invoke(&mut seeds, &mut library, &mut targets, &ColorParams::default())
        .unwrap();
    assert_eq!(first.created.len(), 2);
    let colors: Vec<[f32; 4]> = first.assignments.iter().map(|a| a.color).collect();

    // Nothing qualifies in per-target mode anymore.
    let second = policy
        .invoke(&mut seeds, &mut library, &mut targets, &ColorParams::default())
        .unwrap();
    assert!(second.assignments.is_empty());

    // Selecting both recolors them in place with their stored seeds and a new multiplier.
    for t in &mut targets.targets {
        t.selected = true;
    }
    let shifted = ColorParams {
        color_seed: 42,
        ..Default::default()
    };
    let third = policy
        .invoke(&mut seeds, &mut library, &mut targets, &shifted)
        .unwrap();
    assert!(third.created.is_empty());
    for (assignment, before) in third.assignments.iter().zip(&colors) {
        assert_eq!(assignment.action, AssignmentAction::Recolored);
        assert_ne!(&assignment.color, before);
        let name = &library.get(assignment.material).unwrap().name;
        let seed = seeds.get(name).unwrap();
        assert_eq!(assignment.color, with_alpha(color_for_seed(seed, &shifted)));
    }

    // Back to the original multiplier restores the original colors.
    let fourth = policy
        .invoke(&mut seeds, &mut library, &mut targets, &ColorParams::default())
        .unwrap();
    let restored: Vec<[f32; 4]> = fourth.assignments.iter().map(|a| a.color).collect();
    assert_eq!(restored, colors);
}

#[test]
fn test_detached_material_is_cleaned_next_time() {
    let policy = AssignmentPolicy::default();
    let mut seeds = SeedTable::with_rng_seed(5);
    let mut library = MaterialLibrary::new();
    let mut targets = TargetList::new(vec![Target::new("a")]);

    let first = policy
        .invoke(&mut seeds, &mut library, &mut targets, &ColorParams::default())
        .unwrap();
    let generated = first.created[0];

    // The host drops the slot between invocations.
    targets.targets[0].slots.clear();
    targets.targets[0].selected = true;

    let second = policy
        .invoke(&mut seeds, &mut library, &mut targets, &ColorParams::default())
        .unwrap();
    assert_eq!(second.removed, 1);
    assert!(!library.contains(generated));
    // The freed name is reused, and with it the stored seed.
    let reborn = library.get(second.created[0]).unwrap();
    assert_eq!(reborn.name, "BlockMaterial");
    assert_eq!(second.assignments[0].color, first.assignments[0].color);
}

/// A host-side adapter that only exposes mesh objects to the policy.
struct MeshesOnly {
    objects: Vec<(bool, Target)>,
}

impl MeshesOnly {
    fn mesh_indices(&self) -> Vec<usize> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, (is_mesh, _))| *is_mesh)
            .map(|(i, _)| i)
            .collect()
    }

    fn object(&self, target: usize) -> &Target {
        &self.objects[self.mesh_indices()[target]].1
    }

    fn object_mut(&mut self, target: usize) -> &mut Target {
        let index = self.mesh_indices()[target];
        &mut self.objects[index].1
    }
}

impl TargetCollection for MeshesOnly {
    fn target_count(&self) -> usize {
        self.mesh_indices().len()
    }

    fn slots(&self, target: usize) -> &[Slot] {
        &self.object(target).slots
    }

    fn set_slot(&mut self, target: usize, slot: usize, material: Slot) {
        self.object_mut(target).slots[slot] = material;
    }

    fn push_slot(&mut self, target: usize, material: Slot) -> usize {
        let slots = &mut self.object_mut(target).slots;
        slots.push(material);
        slots.len() - 1
    }

    fn is_selected(&self, target: usize) -> bool {
        self.object(target).selected
    }
}

#[test]
fn test_custom_collection_adapter() {
    let policy = AssignmentPolicy::new(MaterialNaming {
        tag: "Greybox".to_string(),
        placeholder: "Material".to_string(),
    });
    let mut seeds = SeedTable::with_rng_seed(9);
    let mut library = MaterialLibrary::new();
    let mut scene = MeshesOnly {
        objects: vec![
            (true, Target::new("cube")),
            (false, Target::new("camera")),
            (true, Target::new("plane")),
        ],
    };

    let report = policy
        .invoke(&mut seeds, &mut library, &mut scene, &ColorParams::default())
        .unwrap();

    assert_eq!(report.created.len(), 2);
    assert!(scene.objects[1].1.slots.is_empty(), "non-mesh objects are invisible");
    let names: Vec<&str> = library.iter().map(|(_, def)| def.name.as_str()).collect();
    assert_eq!(names, ["Greybox", "Greybox.001"]);
}

#[test]
fn test_report_serializes() {
    let policy = AssignmentPolicy::default();
    let mut seeds = SeedTable::with_rng_seed(1);
    let mut library = MaterialLibrary::new();
    let mut targets = TargetList::new(vec![Target::new("a").selected()]);

    let report = policy
        .invoke(&mut seeds, &mut library, &mut targets, &ColorParams::default())
        .unwrap();
    let text = ron::ser::to_string_pretty(&report, ron::ser::PrettyConfig::new()).unwrap();

    assert!(text.contains("mode: Batch"));
    assert!(text.contains("action: Attached"));
}
