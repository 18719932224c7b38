use glam::Vec3;
use rlabz_site::geometry;
use rlabz_site::scene::{Material, SceneGraph, Transform, hex_rgb};

#[test]
fn hex_colors_split_into_channels() {
    assert_eq!(hex_rgb(0xff0000), [1.0, 0.0, 0.0]);
    assert_eq!(hex_rgb(0x0000ff), [0.0, 0.0, 1.0]);
    let c = Material::lit(0x89cff0).color;
    assert!((c[0] - 0x89 as f32 / 255.0).abs() < 1e-6);
}

#[test]
fn world_matrix_composes_parents() {
    let mut scene = SceneGraph::new();
    let mesh = scene.add_mesh(geometry::cuboid(1.0, 1.0, 1.0));
    let outer = scene.group(SceneGraph::ROOT, "outer", Transform::at(1.0, 0.0, 0.0));
    let inner = scene.group(outer, "inner", Transform::at(0.0, 2.0, 0.0).scaled(2.0, 2.0, 2.0));
    let leaf = scene.object(
        inner,
        "leaf",
        mesh,
        Material::flat(0xffffff),
        Transform::at(0.0, 0.0, 1.0),
    );

    let p = scene.world_matrix(leaf).transform_point3(Vec3::ZERO);
    assert!((p - Vec3::new(1.0, 2.0, 2.0)).length() < 1e-6, "{p}");
    assert_eq!(scene.find("inner"), Some(inner));
    assert_eq!(scene.find("missing"), None);
}

#[test]
fn hidden_nodes_prune_their_subtree() {
    let mut scene = SceneGraph::new();
    let mesh = scene.add_mesh(geometry::plane(1.0, 1.0));
    let group = scene.group(SceneGraph::ROOT, "group", Transform::default());
    scene.object(group, "a", mesh, Material::flat(0), Transform::default());
    scene.object(group, "b", mesh, Material::flat(0), Transform::default());
    scene.object(SceneGraph::ROOT, "c", mesh, Material::flat(0), Transform::default());
    assert_eq!(scene.world_draws().len(), 3);

    scene.node_mut(group).visible = false;
    let draws = scene.world_draws();
    assert_eq!(draws.len(), 1);
    assert_eq!(scene.node(draws[0].node).name, "c");
}

#[test]
fn draws_follow_insertion_order() {
    let mut scene = SceneGraph::new();
    let mesh = scene.add_mesh(geometry::plane(1.0, 1.0));
    let first = scene.object(SceneGraph::ROOT, "first", mesh, Material::flat(0), Transform::default());
    let second = scene.object(SceneGraph::ROOT, "second", mesh, Material::flat(0), Transform::default());
    let nodes: Vec<_> = scene.world_draws().iter().map(|d| d.node).collect();
    assert_eq!(nodes, vec![first, second]);
}

#[test]
fn rotation_is_applied_before_translation() {
    let t = Transform::at(0.0, 1.0, 0.0).rotated(0.0, 0.0, std::f32::consts::FRAC_PI_2);
    let p = t.matrix().transform_point3(Vec3::X);
    assert!((p - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-6, "{p}");
}
