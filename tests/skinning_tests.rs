//! Skinning tests
//!
//! Tests for:
//! - Identity pose leaves points and normals unchanged
//! - Blended translation moves points and keeps normal directions
//! - Weights are not renormalized
//! - Shared points between face-vertices
//! - Degraded results: no pose, empty normal pose, no binding, no normals
//! - Malformed bindings and inconsistent records
//! - Metadata attached as constant variables

mod common;

use std::sync::Arc;

use glam::{DMat4, DQuat, DVec3, Vec3};

use common::{
    agent_record, crowd, crowd_with, generator, generator_for, path, single_joint_binding,
    templates, triangle_mesh,
};
use crowd_scene::crowd::input::crowd_attributes;
use crowd_scene::crowd::skinning::{
    JOINT_INDEX_COUNT, JOINT_INDICES, JOINT_WEIGHTS, SkinBinding, attach_metadata, skin_mesh,
};
use crowd_scene::data::{Interpolation, PrimitiveVariable};
use crowd_scene::{
    AgentRecord, CompoundData, CrowdError, CrowdInput, Data, MeshPrimitive, Object, SceneSource,
};

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

fn two_joint_binding(points: usize) -> CompoundData {
    CompoundData::new()
        .with(JOINT_INDEX_COUNT, Data::IntVector(vec![2; points]))
        .with(JOINT_INDICES, Data::IntVector([0, 1].repeat(points)))
        .with(JOINT_WEIGHTS, Data::FloatVector([0.5, 0.5].repeat(points)))
}

fn skin(
    mesh: &MeshPrimitive,
    binding: &CompoundData,
    pose: &[DMat4],
    normal_pose: Option<&[DMat4]>,
) -> crowd_scene::Result<MeshPrimitive> {
    skin_mesh(
        mesh,
        SkinBinding::from_attributes(binding).as_ref(),
        pose,
        normal_pose,
        &path("/agents/robot/a/1"),
    )
}

// ============================================================================
// Deformation
// ============================================================================

#[test]
fn identity_joint_leaves_mesh_unchanged() {
    let mesh = triangle_mesh();
    let identity = [DMat4::IDENTITY];
    let skinned = skin(&mesh, &single_joint_binding(3), &identity, Some(&identity[..])).unwrap();
    assert_eq!(skinned.positions(), mesh.positions());
    assert_eq!(skinned.normals(), mesh.normals());
}

#[test]
fn half_weights_on_same_translation_move_by_translation() {
    let mesh = triangle_mesh();
    let t = DVec3::new(1.5, -2.0, 3.25);
    let pose = [DMat4::from_translation(t); 2];
    let normal_pose = [DMat4::IDENTITY; 2];
    let skinned = skin(&mesh, &two_joint_binding(3), &pose, Some(&normal_pose[..])).unwrap();

    for (before, after) in mesh.positions().unwrap().iter().zip(skinned.positions().unwrap()) {
        assert!(vec3_approx(*after, *before + t.as_vec3()), "{before} -> {after}");
    }
    for normal in skinned.normals().unwrap() {
        assert!(vec3_approx(*normal, Vec3::Z));
    }
}

#[test]
fn translation_does_not_move_normals() {
    let mesh = triangle_mesh();
    let pose = [DMat4::from_translation(DVec3::new(5.0, 5.0, 5.0))];
    // Normal matrices carry translation too; w = 0 must ignore it.
    let skinned = skin(&mesh, &single_joint_binding(3), &pose, Some(&pose[..])).unwrap();
    for normal in skinned.normals().unwrap() {
        assert!(vec3_approx(*normal, Vec3::Z));
    }
}

#[test]
fn rotation_turns_points_and_normals() {
    let mesh = triangle_mesh();
    let rotation = [DMat4::from_quat(DQuat::from_rotation_x(std::f64::consts::FRAC_PI_2))];
    let skinned = skin(&mesh, &single_joint_binding(3), &rotation, Some(&rotation[..])).unwrap();

    let points = skinned.positions().unwrap();
    assert!(vec3_approx(points[2], Vec3::Z));
    for normal in skinned.normals().unwrap() {
        assert!(vec3_approx(*normal, Vec3::NEG_Y));
    }
}

#[test]
fn weights_are_not_renormalized() {
    let mesh = triangle_mesh();
    let binding = CompoundData::new()
        .with(JOINT_INDEX_COUNT, Data::IntVector(vec![1; 3]))
        .with(JOINT_INDICES, Data::IntVector(vec![0; 3]))
        .with(JOINT_WEIGHTS, Data::FloatVector(vec![0.5; 3]));
    let identity = [DMat4::IDENTITY];
    let skinned = skin(&mesh, &binding, &identity, Some(&identity[..])).unwrap();

    assert!(vec3_approx(skinned.positions().unwrap()[1], Vec3::new(0.5, 0.0, 0.0)));
    // Normals are always unit length.
    for normal in skinned.normals().unwrap() {
        assert!((normal.length() - 1.0).abs() < EPSILON);
    }
}

#[test]
fn face_vertices_use_their_point_influences() {
    // Two triangles sharing points 1 and 2; point 3 follows the mirror joint.
    let mesh = MeshPrimitive::new(
        vec![3, 3],
        vec![0, 1, 2, 2, 1, 3],
        vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::ONE],
    )
    .with_variable(
        "N",
        PrimitiveVariable::new(Interpolation::FaceVarying, Data::V3fVector(vec![Vec3::Z; 6])),
    );
    let binding = CompoundData::new()
        .with(JOINT_INDEX_COUNT, Data::IntVector(vec![1, 1, 2, 1]))
        .with(JOINT_INDICES, Data::IntVector(vec![0, 0, 0, 1, 1]))
        .with(JOINT_WEIGHTS, Data::FloatVector(vec![1.0, 1.0, 0.5, 0.5, 1.0]));
    let mirror = DMat4::from_scale(DVec3::new(-1.0, 1.0, -1.0));
    let pose = [DMat4::IDENTITY, mirror];
    let skinned = skin(&mesh, &binding, &pose, Some(&pose[..])).unwrap();

    let normals = skinned.normals().unwrap();
    // Face-vertex 5 is point 3, fully on the mirror joint.
    assert!(vec3_approx(normals[5], Vec3::NEG_Z));
    // Face-vertices 0 and 1 are points 0 and 1, on the identity joint.
    assert!(vec3_approx(normals[0], Vec3::Z));
    assert!(vec3_approx(normals[4], Vec3::Z));
    // Point 2 blends both equally: the sum cancels and normalizes to zero.
    assert_eq!(normals[2], Vec3::ZERO);
    assert_eq!(normals[3], Vec3::ZERO);

    let points = skinned.positions().unwrap();
    assert!(vec3_approx(points[3], Vec3::new(-1.0, 1.0, -1.0)));
}

#[test]
fn vertex_interpolated_normals_follow_points() {
    let mesh = MeshPrimitive::new(vec![3], vec![0, 1, 2], vec![Vec3::ZERO, Vec3::X, Vec3::Y])
        .with_variable(
            "N",
            PrimitiveVariable::new(Interpolation::Vertex, Data::V3fVector(vec![Vec3::Y; 3])),
        );
    let rotation = [DMat4::from_quat(DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2))];
    let skinned = skin(&mesh, &single_joint_binding(3), &rotation, Some(&rotation[..])).unwrap();
    for normal in skinned.normals().unwrap() {
        assert!(vec3_approx(*normal, Vec3::NEG_X));
    }
}

// ============================================================================
// Degraded Results
// ============================================================================

#[test]
fn without_binding_template_is_copied() {
    let mesh = triangle_mesh();
    let pose = [DMat4::from_translation(DVec3::X)];
    let skinned = skin(&mesh, &CompoundData::new(), &pose, Some(&pose[..])).unwrap();
    assert_eq!(skinned, mesh);
}

#[test]
fn without_normals_points_are_still_skinned() {
    let mut mesh = triangle_mesh();
    mesh.variables.remove("N");
    let pose = [DMat4::from_translation(DVec3::X)];
    let skinned = skin(&mesh, &single_joint_binding(3), &pose, Some(&pose[..])).unwrap();
    assert!(skinned.normals().is_none());
    assert!(vec3_approx(skinned.positions().unwrap()[0], Vec3::X));
}

#[test]
fn without_normal_pose_normals_are_left_alone() {
    let mesh = triangle_mesh();
    let pose = [DMat4::from_quat(DQuat::from_rotation_x(1.0))];
    let skinned = skin(&mesh, &single_joint_binding(3), &pose, None).unwrap();
    assert_eq!(skinned.normals(), mesh.normals());
    assert_ne!(skinned.positions(), mesh.positions());
}

#[test]
fn empty_normal_pose_leaves_normals_alone() {
    common::init_logging();
    let rotation = DMat4::from_quat(DQuat::from_rotation_x(1.0));
    let record = AgentRecord {
        pose_world_matrices: Some(vec![rotation]),
        pose_normal_world_matrices: Some(Vec::new()),
        ..agent_record(1)
    };
    let g = generator_for(crowd_with([(1, record)]), templates());
    let object = g.object(&path("/agents/robot/a/1")).unwrap();
    let skinned = object.as_mesh().unwrap();

    let template = triangle_mesh();
    assert_eq!(skinned.normals(), template.normals());
    let expected = rotation.transform_point3(DVec3::Y).as_vec3();
    assert!(vec3_approx(skinned.positions().unwrap()[2], expected));
}

#[test]
fn empty_normal_pose_slice_skips_normals() {
    let mesh = triangle_mesh();
    let pose = [DMat4::from_quat(DQuat::from_rotation_x(1.0))];
    let normal_pose: [DMat4; 0] = [];
    let skinned = skin(&mesh, &single_joint_binding(3), &pose, Some(&normal_pose[..])).unwrap();
    assert_eq!(skinned.normals(), mesh.normals());
    assert_ne!(skinned.positions(), mesh.positions());
}

#[test]
fn empty_pose_returns_template_unchanged() {
    common::init_logging();
    let record = AgentRecord {
        pose_world_matrices: Some(Vec::new()),
        ..agent_record(1)
    };
    let g = generator_for(crowd_with([(1, record)]), templates());
    let object = g.object(&path("/agents/robot/a/1")).unwrap();
    assert_eq!(*object, Object::Mesh(triangle_mesh()));
}

#[test]
fn absent_pose_returns_template_unchanged() {
    let record = AgentRecord {
        pose_world_matrices: None,
        ..agent_record(1)
    };
    let g = generator_for(crowd_with([(1, record)]), templates());
    let object = g.object(&path("/agents/robot/a/1")).unwrap();
    assert_eq!(object.as_mesh(), Some(&triangle_mesh()));
}

#[test]
fn non_mesh_template_is_passed_through() {
    let mut scene = templates();
    scene.location_mut(&path("/robot/a")).set_object(Object::Null);
    let g = generator_for(crowd(), scene);
    assert_eq!(*g.object(&path("/agents/robot/a/1")).unwrap(), Object::Null);
}

// ============================================================================
// Invalid Input
// ============================================================================

#[test]
fn joint_out_of_range_is_invalid() {
    let mesh = triangle_mesh();
    let binding = single_joint_binding(3).with(JOINT_INDICES, Data::IntVector(vec![0, 0, 4]));
    let err = skin(&mesh, &binding, &[DMat4::IDENTITY], None).unwrap_err();
    assert!(err.is_invalid_input());
    assert!(err.to_string().contains("joint 4"), "{err}");
}

#[test]
fn negative_count_is_invalid() {
    let mesh = triangle_mesh();
    let binding = single_joint_binding(3).with(JOINT_INDEX_COUNT, Data::IntVector(vec![1, -1, 1]));
    assert!(skin(&mesh, &binding, &[DMat4::IDENTITY], None).is_err());
}

#[test]
fn counts_overrunning_influences_are_invalid() {
    let mesh = triangle_mesh();
    let binding = single_joint_binding(3).with(JOINT_INDEX_COUNT, Data::IntVector(vec![1, 1, 5]));
    let err = skin(&mesh, &binding, &[DMat4::IDENTITY], None).unwrap_err();
    assert!(matches!(err, CrowdError::InvalidInput { .. }));
}

#[test]
fn count_table_must_cover_every_point() {
    let mesh = triangle_mesh();
    let err = skin(&mesh, &single_joint_binding(2), &[DMat4::IDENTITY], None).unwrap_err();
    assert!(err.to_string().contains("3 points"), "{err}");
}

#[test]
fn mismatched_index_and_weight_lengths_are_invalid() {
    let mesh = triangle_mesh();
    let binding = single_joint_binding(3).with(JOINT_WEIGHTS, Data::FloatVector(vec![1.0; 2]));
    assert!(skin(&mesh, &binding, &[DMat4::IDENTITY], None).is_err());
}

#[test]
fn unknown_agent_type_is_invalid() {
    let attributes = crowd_attributes(
        [(1, agent_record(1))],
        [("human".to_string(), vec![DMat4::IDENTITY])],
    );
    let crowd = CrowdInput::new(
        Object::Points(crowd_scene::crowd::input::agent_points(&common::AGENTS)),
        attributes,
    );
    let g = generator_for(crowd, templates());
    let err = g.object(&path("/agents/robot/a/1")).unwrap_err();
    assert!(err.to_string().contains("robot"), "{err}");
}

#[test]
fn missing_agent_record_is_invalid() {
    let g = generator_for(crowd_with([(2, agent_record(2))]), templates());
    let err = g.object(&path("/agents/robot/a/1")).unwrap_err();
    assert!(matches!(err, CrowdError::InvalidInput { .. }));
}

// ============================================================================
// Metadata
// ============================================================================

#[test]
fn metadata_becomes_constant_variables() {
    let g = generator();
    let object = g.object(&path("/agents/robot/a/2")).unwrap();
    let mesh = object.as_mesh().unwrap();
    let health = mesh.variable("health").unwrap();
    assert_eq!(health.interpolation, Interpolation::Constant);
    assert_eq!(health.data, Data::Int(200));
}

#[test]
fn metadata_overwrites_existing_variables() {
    let mut mesh = triangle_mesh().with_variable(
        "health",
        PrimitiveVariable::new(Interpolation::Vertex, Data::IntVector(vec![0; 3])),
    );
    attach_metadata(&mut mesh, &CompoundData::new().with("health", Data::Int(7)));
    assert_eq!(mesh.variable("health").unwrap().data, Data::Int(7));
}

// ============================================================================
// Nested Locations
// ============================================================================

#[test]
fn nested_object_is_template_object() {
    let scene = Arc::new(templates());
    let g = crowd_scene::CrowdGenerator::new(
        Arc::new(crowd()),
        scene.clone(),
        crowd_scene::Settings::default(),
    );
    let nested = g.object(&path("/agents/robot/a/2/body")).unwrap();
    let template = scene.object(&path("/robot/a/body")).unwrap();
    assert!(Arc::ptr_eq(&nested, &template));
}
