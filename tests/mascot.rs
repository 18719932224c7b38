use glam::Vec3;
use rlabz_site::mascot::Mascot;
use rlabz_site::pose::{Pose, Prop};

fn visible_props(mascot: &Mascot) -> Vec<Prop> {
    Prop::ALL
        .into_iter()
        .filter(|&p| mascot.scene().node(mascot.prop_node(p)).visible)
        .collect()
}

#[test]
fn builds_with_every_part() {
    let mascot = Mascot::build();
    let scene = mascot.scene();
    for name in ["robot", "head", "hand", "shadow"] {
        assert!(scene.find(name).is_some(), "missing {name}");
    }
    assert!(scene.meshes().len() > 10);
    let parts = mascot.parts();
    assert_ne!(parts.hand_right, parts.arm_right);
    assert!(scene.node(parts.arm_right).children.contains(&parts.hand_right));
}

#[test]
fn meshes_fit_sixteen_bit_indices() {
    let mascot = Mascot::build();
    for (i, mesh) in mascot.scene().meshes().iter().enumerate() {
        assert!(mesh.vertex_count() <= u16::MAX as usize, "mesh {i}");
        assert!(
            mesh.indices.iter().all(|&idx| (idx as usize) < mesh.vertex_count()),
            "mesh {i}"
        );
    }
}

#[test]
fn props_start_hidden() {
    let mascot = Mascot::build();
    assert!(visible_props(&mascot).is_empty());
}

#[test]
fn apply_shows_exactly_the_held_prop() {
    let mut mascot = Mascot::build();
    let idle_draws = mascot.scene().world_draws().len();

    for prop in Prop::ALL {
        let pose = Pose {
            held: Some(prop),
            ..Pose::default()
        };
        mascot.apply(&pose);
        assert_eq!(visible_props(&mascot), vec![prop]);
        assert!(mascot.scene().world_draws().len() > idle_draws);
    }

    mascot.apply(&Pose::default());
    assert!(visible_props(&mascot).is_empty());
    assert_eq!(mascot.scene().world_draws().len(), idle_draws);
}

#[test]
fn apply_writes_root_and_shadow() {
    let mut mascot = Mascot::build();
    let pose = Pose {
        root_position: Vec3::new(1.0, 2.0, 0.0),
        root_scale: 0.32,
        shadow_opacity: 0.0,
        head_yaw: 0.4,
        ..Pose::default()
    };
    mascot.apply(&pose);

    let parts = *mascot.parts();
    let scene = mascot.scene();
    let root = scene.node(parts.root).transform;
    assert_eq!(root.translation, Vec3::new(1.0, 2.0, 0.0));
    assert_eq!(root.scale, Vec3::splat(0.32));
    assert_eq!(scene.node(parts.shadow).material.opacity, 0.0);
    assert_eq!(scene.node(parts.head).transform.rotation.y, 0.4);
}

#[test]
fn chest_light_scales_flat() {
    let mut mascot = Mascot::build();
    mascot.apply(&Pose {
        indicator_scale: 1.2,
        ..Pose::default()
    });
    let light = mascot.scene().node(mascot.parts().chest_light).transform;
    assert_eq!(light.scale, Vec3::new(1.2, 1.2, 1.0));
}

#[test]
fn shadow_is_translucent() {
    let mascot = Mascot::build();
    let shadow = mascot.scene().node(mascot.parts().shadow);
    assert!(shadow.material.opacity < 1.0);
    assert!(!shadow.material.lit);
}
