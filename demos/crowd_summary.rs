//! Builds a small crowd, walks the generated hierarchy and prints one line
//! per location.
//!
//! ```sh
//! RUST_LOG=debug cargo run --example crowd_summary
//! ```

use std::sync::Arc;

use glam::{DMat4, DVec3, Vec3};

use crowd_scene::crowd::input::{AgentRecord, agent_points, crowd_attributes};
use crowd_scene::crowd::skinning::{JOINT_INDEX_COUNT, JOINT_INDICES, JOINT_WEIGHTS};
use crowd_scene::{
    Box3d, CompoundData, CrowdGenerator, CrowdInput, Data, MemoizedScene, MemoryScene,
    MeshPrimitive, Object, SceneSource, ScenePath, Settings, interner,
};

fn templates() -> MemoryScene {
    let mut scene = MemoryScene::new();
    let binding = CompoundData::new()
        .with(JOINT_INDEX_COUNT, Data::IntVector(vec![1; 4]))
        .with(JOINT_INDICES, Data::IntVector(vec![0; 4]))
        .with(JOINT_WEIGHTS, Data::FloatVector(vec![1.0; 4]));
    for location in ["/soldier/red", "/soldier/blue", "/horse/brown"] {
        scene
            .location_mut(&ScenePath::from(location))
            .set_object(Object::Mesh(MeshPrimitive::new(
                vec![4],
                vec![0, 1, 2, 3],
                vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y],
            )))
            .set_attributes(binding.clone());
    }
    scene
}

fn crowd() -> CrowdInput {
    let agents = [
        ("soldier", "red", 1),
        ("soldier", "blue", 2),
        ("horse", "brown", 3),
        ("soldier", "red", 4),
    ];
    let records = agents.iter().map(|&(_, _, id)| {
        let at = DVec3::new(f64::from(id) * 3.0, 0.0, 0.0);
        (
            id,
            AgentRecord {
                root_matrix: Some(DMat4::from_translation(at)),
                bounding_box: Some(Box3d::new(at, at + DVec3::new(1.0, 1.0, 0.0))),
                pose_world_matrices: Some(vec![DMat4::from_translation(DVec3::Z)]),
                pose_normal_world_matrices: Some(vec![DMat4::IDENTITY]),
                metadata: Some(CompoundData::new().with("team", Data::Int(id % 2))),
            },
        )
    });
    let types = ["soldier", "horse"].map(|t| (t.to_string(), vec![DMat4::IDENTITY]));
    CrowdInput::new(
        Object::Points(agent_points(&agents)),
        crowd_attributes(records, types),
    )
}

fn print_location(scene: &dyn SceneSource, path: &ScenePath) -> crowd_scene::Result<()> {
    let bound = scene.bound(path)?;
    let object = scene.object(path)?;
    println!(
        "{:<28} {:<16} bound {:?} .. {:?}",
        path.to_string(),
        object.type_name(),
        bound.min,
        bound.max
    );
    for &child in scene.child_names(path)?.iter() {
        print_location(scene, &path.child(interner::resolve(child)))?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    interner::preload_crowd_names();

    let settings = match std::env::args().nth(1) {
        Some(file) => Settings::from_json_file(file)?,
        None => Settings::default(),
    };

    let generator = CrowdGenerator::new(Arc::new(crowd()), Arc::new(templates()), settings);
    let scene = MemoizedScene::new(generator);
    print_location(&scene, &ScenePath::root())?;

    let stats = scene.object_stats();
    println!(
        "object cache: {} entries, {} hits, {} misses",
        stats.entries, stats.hits, stats.misses
    );
    Ok(())
}
