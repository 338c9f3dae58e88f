//! Scene Import & Traversal Integration Tests
//!
//! Tests for:
//! - OBJ and TOML scene import (hierarchy, materials, missing attributes)
//! - Camera, light and mesh passes over imported scenes
//! - Load-time bindings and default camera/lights

use nalgebra::{Matrix4, Point3, Vector3};
use sceneview::core::math::transform::{TransformFactory, transform_point};
use sceneview::error::SceneError;
use sceneview::io::config::Config;
use sceneview::io::importer::import_scene;
use sceneview::pipeline::passes::{camera_pass, light_pass, mesh_pass, render_frame};
use sceneview::pipeline::renderer::{DrawRecorder, Topology};
use sceneview::scene::camera::CameraRecord;
use sceneview::scene::context::{RenderContext, SceneDefaults};
use sceneview::scene::light::LightType;
use sceneview::ui::input::{ControlKey, InputEvent, ViewerControls};
use std::path::{Path, PathBuf};

const EPSILON: f32 = 1e-4;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn load(name: &str) -> RenderContext {
    let scene = import_scene(&fixture(name), None).expect("fixture should import");
    RenderContext::new(scene, SceneDefaults::default(), 1.5)
}

// ============================================================================
// OBJ Import
// ============================================================================

#[test]
fn obj_import_builds_root_with_object_children() {
    let ctx = load("quad.obj");
    let scene = &ctx.scene;

    assert_eq!(scene.root.name, "quad");
    assert_eq!(scene.root.children.len(), 1);
    assert_eq!(scene.root.children[0].meshes, vec![0]);
    assert_eq!(scene.meshes.len(), 1);
    assert_eq!(scene.meshes[0].num_faces(), 2);
    assert!(scene.cameras.is_empty());
    assert!(scene.lights.is_empty());
}

#[test]
fn obj_materials_come_from_mtl() {
    let ctx = load("quad.obj");
    let material = ctx.scene.materials.get(ctx.scene.meshes[0].material_index);

    assert_eq!(material.name, "red");
    assert!((material.diffuse.x - 1.0).abs() < EPSILON);
    assert!((material.emission.z - 0.2).abs() < EPSILON);
    assert!((material.shininess - 16.0).abs() < EPSILON);
    // The referenced texture does not exist.
    assert!(!material.has_texture());
}

#[test]
fn obj_without_normals_still_imports() {
    let ctx = load("bare.obj");
    let scene = &ctx.scene;

    assert_eq!(scene.meshes.len(), 2);
    assert!(scene.meshes.iter().all(|m| m.normals.is_none()));
    assert!(scene.buffers.iter().all(Option::is_some));

    let mut recorder = DrawRecorder::new();
    let mut ctx = ctx;
    assert_eq!(render_frame(&mut ctx, &Matrix4::identity(), &mut recorder), 2);
}

#[test]
fn missing_scene_is_reported() {
    let err = import_scene(&fixture("nope.obj"), None).unwrap_err();
    assert!(matches!(err, SceneError::FileNotFound(_)));
}

// ============================================================================
// Mesh Pass
// ============================================================================

#[test]
fn two_face_mesh_draws_six_triangle_indices() {
    let mut ctx = load("quad.obj");
    let mut recorder = DrawRecorder::new();
    render_frame(&mut ctx, &Matrix4::identity(), &mut recorder);

    assert_eq!(recorder.draws.len(), 1);
    assert_eq!(recorder.total_indices(), 6);
    let draw = &recorder.draws[0];
    assert_eq!(draw.index_count, 6);
    assert_eq!(draw.topology, Topology::Triangles);
    assert_eq!(draw.model, Matrix4::identity());
    assert_eq!(draw.material, "red");
    assert!(!draw.has_texture);
    assert_eq!(draw.light_count, 2);
}

#[test]
fn mvp_is_projection_view_model() {
    let mut ctx = load("quad.obj");
    let user = TransformFactory::translation(&Vector3::new(0.0, 1.0, 0.0));
    let mut recorder = DrawRecorder::new();
    render_frame(&mut ctx, &user, &mut recorder);

    let draw = &recorder.draws[0];
    let expected = ctx.frame.projection * ctx.frame.view * user;
    assert!((draw.mvp - expected).norm() < EPSILON);
    assert_eq!(draw.eye, ctx.frame.eye);
}

#[test]
fn user_controls_change_model_but_not_camera() {
    let mut ctx = load("quad.obj");
    let mut controls = ViewerControls::new(Config::default().controls, 600, 400);

    let mut before = DrawRecorder::new();
    render_frame(&mut ctx, &controls.transform.matrix(), &mut before);
    let frame_before = ctx.frame;

    controls.handle(InputEvent::KeyPressed(ControlKey::Forward));
    controls.handle(InputEvent::KeyPressed(ControlKey::ScaleUp));
    controls.handle(InputEvent::LeftClick);
    controls.handle(InputEvent::MouseMoved { x: 320.0, y: 180.0 });

    let mut after = DrawRecorder::new();
    render_frame(&mut ctx, &controls.transform.matrix(), &mut after);

    assert_ne!(before.draws[0].model, after.draws[0].model);
    assert_eq!(ctx.frame.view, frame_before.view);
    assert_eq!(ctx.frame.projection, frame_before.projection);
}

// ============================================================================
// TOML Scene: Hierarchy, Camera & Lights
// ============================================================================

#[test]
fn toml_scene_hierarchy() {
    let ctx = load("scene.toml");
    let scene = &ctx.scene;

    assert_eq!(scene.node_count(), 4);
    assert_eq!(scene.root.name, "world");
    assert_eq!(scene.root.children[1].children[0].name, "lamp");
    assert_eq!(scene.root.children[1].children[0].index, 3);
    assert_eq!(scene.cameras.len(), 1);
    assert_eq!(scene.lights.len(), 2);
}

#[test]
fn camera_pass_uses_bound_node() {
    let mut ctx = load("scene.toml");
    let frame = camera_pass(&mut ctx);

    assert!((frame.eye - Point3::new(0.0, 0.0, 5.0)).norm() < EPSILON);
    let target = transform_point(&frame.view, &Point3::new(0.0, 0.0, 4.0));
    assert!(target.x.abs() < EPSILON && target.y.abs() < EPSILON);
    assert!((target.z + 1.0).abs() < EPSILON);
}

#[test]
fn light_pass_moves_bound_lights_only() {
    let mut ctx = load("scene.toml");
    light_pass(&mut ctx);
    light_pass(&mut ctx);

    let lamp = ctx.lights.get(0).unwrap();
    assert!((lamp.position - Point3::new(1.0, 2.0, 0.0)).norm() < EPSILON);

    let mystery = ctx.lights.get(1).unwrap();
    assert_eq!(mystery.light_type, LightType::Unknown);
    assert_eq!(mystery.position, Point3::new(4.0, 4.0, 4.0));
    assert_eq!(mystery.attenuation_at(&Point3::origin()), 0.0);
}

#[test]
fn mesh_pass_accumulates_through_meshless_nodes() {
    let mut ctx = load("scene.toml");
    camera_pass(&mut ctx);
    let mut recorder = DrawRecorder::new();
    mesh_pass(&ctx, &Matrix4::identity(), &mut recorder);

    assert_eq!(recorder.draws.len(), 1);
    let draw = &recorder.draws[0];
    assert_eq!(draw.node, 3);
    let origin = transform_point(&draw.model, &Point3::origin());
    assert!((origin - Point3::new(1.0, 2.0, 0.0)).norm() < EPSILON);
}

#[test]
fn scene_without_camera_uses_defaults() {
    let mut ctx = load("bare.obj");
    let frame = camera_pass(&mut ctx);

    let expected = CameraRecord::default().resolve(&Matrix4::identity(), 1.5);
    assert_eq!(frame.eye, Point3::new(0.0, 3.0, 3.0));
    assert!((frame.view - expected.view).norm() < EPSILON);
    assert!((frame.projection - expected.projection).norm() < EPSILON);
}

#[test]
fn config_defaults_flow_into_context() {
    let config = Config::load(fixture("viewer.toml")).unwrap();
    let scene = import_scene(&fixture("bare.obj"), config.texture_dir()).unwrap();
    let mut ctx = RenderContext::new(scene, config.scene_defaults(), 64.0 / 48.0);

    let frame = camera_pass(&mut ctx);
    assert_eq!(frame.eye, Point3::new(0.0, 0.0, 3.0));
    assert_eq!(ctx.lights.len(), 2);
}
