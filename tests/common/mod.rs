//! Shared crowd fixture.
//!
//! Four agents arriving out of order:
//!
//! | id | agentType | variation | rootMatrix        |
//! |----|-----------|-----------|-------------------|
//! | 2  | robot     | a         | translate(20,0,0) |
//! | 4  | human     | a         | translate(40,0,0) |
//! | 3  | robot     | b         | translate(30,0,0) |
//! | 1  | robot     | a         | translate(10,0,0) |
//!
//! Every template is a single triangle bound to joint 0 with weight one,
//! and `/robot/a` carries a nested `body` location.

#![allow(dead_code)]

use std::sync::Arc;

use glam::{DMat4, DVec3, Vec3};

use crowd_scene::crowd::input::{agent_points, crowd_attributes};
use crowd_scene::crowd::skinning::{JOINT_INDEX_COUNT, JOINT_INDICES, JOINT_WEIGHTS};
use crowd_scene::data::{Interpolation, PrimitiveVariable};
use crowd_scene::{
    AgentRecord, Box3d, CompoundData, CrowdGenerator, CrowdInput, Data, MemoryScene,
    MeshPrimitive, Object, ScenePath, Settings,
};

pub const AGENTS: [(&str, &str, i32); 4] = [
    ("robot", "a", 2),
    ("human", "a", 4),
    ("robot", "b", 3),
    ("robot", "a", 1),
];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn path(s: &str) -> ScenePath {
    ScenePath::from(s)
}

pub fn triangle_mesh() -> MeshPrimitive {
    MeshPrimitive::new(
        vec![3],
        vec![0, 1, 2],
        vec![Vec3::ZERO, Vec3::X, Vec3::Y],
    )
    .with_variable(
        "N",
        PrimitiveVariable::new(Interpolation::FaceVarying, Data::V3fVector(vec![Vec3::Z; 3])),
    )
}

pub fn single_joint_binding(points: usize) -> CompoundData {
    CompoundData::new()
        .with(JOINT_INDEX_COUNT, Data::IntVector(vec![1; points]))
        .with(JOINT_INDICES, Data::IntVector(vec![0; points]))
        .with(JOINT_WEIGHTS, Data::FloatVector(vec![1.0; points]))
}

pub fn agent_record(id: i32) -> AgentRecord {
    let offset = DVec3::new(f64::from(id) * 10.0, 0.0, 0.0);
    AgentRecord {
        root_matrix: Some(DMat4::from_translation(offset)),
        bounding_box: Some(Box3d::new(offset - DVec3::ONE, offset + DVec3::ONE)),
        pose_world_matrices: Some(vec![DMat4::IDENTITY]),
        pose_normal_world_matrices: Some(vec![DMat4::IDENTITY]),
        metadata: Some(CompoundData::new().with("health", Data::Int(id * 100))),
    }
}

pub fn crowd_with(records: impl IntoIterator<Item = (i32, AgentRecord)>) -> CrowdInput {
    let attributes = crowd_attributes(
        records,
        [
            ("robot".to_string(), vec![DMat4::IDENTITY]),
            ("human".to_string(), vec![DMat4::IDENTITY]),
        ],
    );
    CrowdInput::new(Object::Points(agent_points(&AGENTS)), attributes)
}

pub fn crowd() -> CrowdInput {
    crowd_with(AGENTS.iter().map(|&(_, _, id)| (id, agent_record(id))))
}

pub fn templates() -> MemoryScene {
    let mut scene = MemoryScene::new();
    for location in ["/robot/a", "/robot/b", "/human/a"] {
        scene
            .location_mut(&path(location))
            .set_object(Object::Mesh(triangle_mesh()))
            .set_attributes(single_joint_binding(3));
    }
    scene
        .location_mut(&path("/robot/a/body"))
        .set_object(Object::Mesh(triangle_mesh()))
        .set_attributes(CompoundData::new().with("shader", Data::String("metal".into())));
    scene
}

pub fn generator_for(crowd: CrowdInput, templates: MemoryScene) -> CrowdGenerator {
    CrowdGenerator::new(Arc::new(crowd), Arc::new(templates), Settings::default())
}

pub fn generator() -> CrowdGenerator {
    generator_for(crowd(), templates())
}

pub fn names(symbols: &[crowd_scene::utils::Symbol]) -> Vec<&'static str> {
    symbols
        .iter()
        .map(|&s| crowd_scene::interner::resolve(s))
        .collect()
}
