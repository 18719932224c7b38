//! The robot mascot: built once from procedural meshes, posed every frame.

use crate::geometry::{self, Bevel, Mesh};
use crate::pose::{Pose, Prop};
use crate::scene::{Material, MeshId, NodeId, SceneGraph, Transform};
use glam::Vec3;
use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

const PRIMARY_BLUE: Material = Material::lit(0x89cff0);
const GLOSSY_WHITE: Material = Material::lit(0xffffff);
const CHROME: Material = Material::lit(0xaaaaaa);
const BLACK_PLASTIC: Material = Material::lit(0x111111);
const SIGNAL_RED: Material = Material::flat(0xff4444);
const SHADOW: Material = Material {
    color: [0.0, 0.0, 0.0],
    lit: false,
    opacity: 0.2,
};

#[derive(Clone, Copy, Debug)]
pub struct MascotParts {
    pub root: NodeId,
    pub head: NodeId,
    pub antenna: NodeId,
    pub body: NodeId,
    pub arm_left: NodeId,
    pub arm_right: NodeId,
    pub hand_right: NodeId,
    pub chest_light: NodeId,
    pub shadow: NodeId,
    pub props: [(Prop, NodeId); 4],
}

pub struct Mascot {
    scene: SceneGraph,
    parts: MascotParts,
}

struct Builder {
    scene: SceneGraph,
    cache: HashMap<&'static str, MeshId>,
}

impl Builder {
    fn mesh(&mut self, key: &'static str, make: impl FnOnce() -> Mesh) -> MeshId {
        if let Some(&id) = self.cache.get(key) {
            return id;
        }
        let id = self.scene.add_mesh(make());
        self.cache.insert(key, id);
        id
    }

    fn part(
        &mut self,
        parent: NodeId,
        key: &'static str,
        make: impl FnOnce() -> Mesh,
        material: Material,
        transform: Transform,
    ) -> NodeId {
        let mesh = self.mesh(key, make);
        self.scene.object(parent, key, mesh, material, transform)
    }

    fn group(&mut self, parent: NodeId, name: &'static str, transform: Transform) -> NodeId {
        self.scene.group(parent, name, transform)
    }
}

fn squircle(width: f32, height: f32, depth: f32, radius: f32) -> Mesh {
    let outline = geometry::rounded_rect_outline(width, height, radius, 8);
    geometry::extrude(
        &outline,
        depth,
        Some(Bevel {
            size: 0.05,
            thickness: 0.05,
            segments: 4,
        }),
    )
}

impl Mascot {
    pub fn build() -> Self {
        let mut b = Builder {
            scene: SceneGraph::new(),
            cache: HashMap::new(),
        };
        let root = b.group(SceneGraph::ROOT, "robot", Transform::default());

        let (head, antenna) = build_head(&mut b, root);
        let (body, chest_light) = build_torso(&mut b, root);

        let arm_left = build_arm(&mut b, body, -1.0);
        b.scene.node_mut(arm_left).transform.rotation.z = 0.1;
        let arm_right = build_arm(&mut b, body, 1.0);
        b.scene.node_mut(arm_right).transform.rotation.z = -0.1;
        let hand_right = *b
            .scene
            .node(arm_right)
            .children
            .iter()
            .find(|&&child| b.scene.node(child).name == "hand")
            .unwrap_or(&arm_right);
        let props = build_props(&mut b, hand_right);

        build_leg(&mut b, root, -0.4);
        build_leg(&mut b, root, 0.4);

        let shadow = b.part(
            root,
            "shadow",
            || geometry::circle(1.5, 32),
            SHADOW,
            Transform::at(0.0, -2.0, 0.0).rotated(-FRAC_PI_2, 0.0, 0.0),
        );

        Self {
            scene: b.scene,
            parts: MascotParts {
                root,
                head,
                antenna,
                body,
                arm_left,
                arm_right,
                hand_right,
                chest_light,
                shadow,
                props,
            },
        }
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn parts(&self) -> &MascotParts {
        &self.parts
    }

    pub fn prop_node(&self, prop: Prop) -> NodeId {
        self.parts
            .props
            .iter()
            .find(|(p, _)| *p == prop)
            .map(|(_, node)| *node)
            .unwrap_or(self.parts.hand_right)
    }

    /// Writes a pose into the scene graph.
    pub fn apply(&mut self, pose: &Pose) {
        let parts = self.parts;
        let scene = &mut self.scene;

        let root = &mut scene.node_mut(parts.root).transform;
        root.translation = pose.root_position;
        root.scale = Vec3::splat(pose.root_scale);

        scene.node_mut(parts.shadow).material.opacity = pose.shadow_opacity;
        scene.node_mut(parts.body).transform.rotation.y = pose.body_yaw;

        let head = &mut scene.node_mut(parts.head).transform.rotation;
        head.x = pose.head_pitch;
        head.y = pose.head_yaw;

        scene.node_mut(parts.antenna).transform.rotation.z = pose.antenna_roll;
        scene.node_mut(parts.arm_left).transform.rotation.x = pose.arm_left_pitch;

        let arm = &mut scene.node_mut(parts.arm_right).transform.rotation;
        arm.x = pose.arm_right_pitch;
        arm.z = pose.arm_right_roll;

        let hand = &mut scene.node_mut(parts.hand_right).transform.rotation;
        hand.x = pose.hand_right_pitch;
        hand.z = pose.hand_right_roll;

        let s = pose.indicator_scale;
        scene.node_mut(parts.chest_light).transform.scale = Vec3::new(s, s, 1.0);

        for (prop, node) in parts.props {
            scene.node_mut(node).visible = pose.held == Some(prop);
        }
    }
}

fn build_head(b: &mut Builder, root: NodeId) -> (NodeId, NodeId) {
    let head = b.group(root, "head", Transform::at(0.0, 1.6, 0.0));
    b.part(
        head,
        "head_shell",
        || squircle(2.2, 1.6, 1.4, 0.4),
        PRIMARY_BLUE,
        Transform::default(),
    );
    b.part(
        head,
        "face_plate",
        || squircle(1.9, 1.3, 0.1, 0.3),
        GLOSSY_WHITE,
        Transform::at(0.0, 0.0, 0.72),
    );

    for x in [-0.5, 0.5] {
        build_eye(b, head, x);
    }

    for side in [-1.0, 1.0] {
        b.part(
            head,
            "ear",
            || geometry::cylinder(0.3, 0.35, 0.2, 32),
            PRIMARY_BLUE,
            Transform::at(1.2 * side, 0.0, 0.0).rotated(0.0, 0.0, FRAC_PI_2),
        );
        b.part(
            head,
            "ear_cap",
            || geometry::cylinder(0.2, 0.2, 0.25, 32),
            GLOSSY_WHITE,
            Transform::at(1.22 * side, 0.0, 0.0).rotated(0.0, 0.0, FRAC_PI_2),
        );
    }

    b.part(
        head,
        "smile",
        || geometry::torus(0.25, 0.03, 16, 32, 2.5),
        Material::flat(0x333333),
        Transform::at(0.0, -0.25, 0.74).rotated(0.0, 0.0, -1.25 + PI),
    );

    let antenna = b.group(head, "antenna", Transform::at(0.0, 0.8, 0.0));
    b.part(
        antenna,
        "antenna_stem",
        || geometry::cylinder(0.02, 0.02, 0.3, 8),
        CHROME,
        Transform::at(0.0, 0.15, 0.0),
    );
    b.part(
        antenna,
        "antenna_bulb",
        || geometry::sphere(0.08, 16, 16),
        SIGNAL_RED,
        Transform::at(0.0, 0.3, 0.0),
    );

    (head, antenna)
}

fn build_eye(b: &mut Builder, head: NodeId, x: f32) {
    let eye = b.group(head, "eye", Transform::at(x, 0.1, 0.9));
    b.part(
        eye,
        "eye_rim",
        || geometry::torus(0.35, 0.04, 16, 64, TAU),
        CHROME,
        Transform::at(0.0, 0.0, 0.01),
    );
    let layers: [(&'static str, f32, u32, f32); 3] = [
        ("eye_socket", 0.33, 0x111122, 0.02),
        ("eye_iris", 0.26, 0x4488ff, 0.03),
        ("eye_pupil", 0.14, 0x000011, 0.04),
    ];
    for (key, radius, color, z) in layers {
        b.part(
            eye,
            key,
            || geometry::circle(radius, 32),
            Material::flat(color),
            Transform::at(0.0, 0.0, z),
        );
    }
    let sparkles: [(&'static str, f32, f32, f32); 3] = [
        ("eye_sparkle_large", 0.10, -0.08, 0.08),
        ("eye_sparkle_small", 0.04, 0.08, -0.06),
        ("eye_sparkle_tiny", 0.02, -0.05, -0.08),
    ];
    for (key, radius, sx, sy) in sparkles {
        b.part(
            eye,
            key,
            || geometry::circle(radius, 32),
            Material::flat(0xffffff),
            Transform::at(sx, sy, 0.05),
        );
    }
}

fn build_torso(b: &mut Builder, root: NodeId) -> (NodeId, NodeId) {
    let body = b.group(root, "body", Transform::default());
    b.part(
        body,
        "torso",
        || squircle(1.4, 1.4, 1.0, 0.3),
        PRIMARY_BLUE,
        Transform::default(),
    );
    b.part(
        body,
        "chest_screen",
        || squircle(1.0, 0.8, 0.05, 0.15),
        BLACK_PLASTIC,
        Transform::at(0.0, 0.1, 0.51),
    );
    let chest_light = b.part(
        body,
        "chest_light",
        || geometry::circle(0.15, 32),
        Material::flat(0x00ffcc),
        Transform::at(0.0, 0.1, 0.54),
    );
    b.part(
        root,
        "neck",
        || geometry::ribbed_tube(0.5, 0.3, 3),
        CHROME,
        Transform::at(0.0, 0.9, 0.0),
    );
    (body, chest_light)
}

fn build_arm(b: &mut Builder, body: NodeId, x: f32) -> NodeId {
    let arm = b.group(body, "arm", Transform::at(x, 0.25, 0.25));
    b.part(
        arm,
        "shoulder",
        || geometry::sphere(0.32, 32, 32),
        PRIMARY_BLUE,
        Transform::default(),
    );
    b.part(
        arm,
        "upper_arm",
        || geometry::cylinder(0.2, 0.16, 0.5, 32),
        PRIMARY_BLUE,
        Transform::at(0.0, -0.35, 0.0),
    );
    b.part(
        arm,
        "elbow",
        || geometry::sphere(0.19, 32, 32),
        CHROME,
        Transform::at(0.0, -0.65, 0.0),
    );
    b.part(
        arm,
        "forearm",
        || geometry::cylinder(0.16, 0.24, 0.45, 32),
        PRIMARY_BLUE,
        Transform::at(0.0, -0.92, 0.0),
    );
    b.part(
        arm,
        "cuff",
        || geometry::torus(0.22, 0.05, 16, 32, TAU),
        CHROME,
        Transform::at(0.0, -1.13, 0.0).rotated(FRAC_PI_2, 0.0, 0.0),
    );

    let hand = b.group(arm, "hand", Transform::at(0.0, -1.3, 0.0));
    b.part(
        hand,
        "palm",
        || geometry::sphere(0.15, 32, 32),
        GLOSSY_WHITE,
        Transform::default().scaled(1.4, 0.9, 0.8),
    );

    const FINGER_RADIUS: f32 = 0.065;
    const FINGER_LENGTH: f32 = 0.16;
    for (angle, fx) in [(-0.25, -0.11), (0.0, 0.0), (0.25, 0.11)] {
        b.part(
            hand,
            "finger",
            || geometry::capsule(FINGER_RADIUS, FINGER_LENGTH, 8, 16),
            GLOSSY_WHITE,
            Transform::at(fx, -0.12, 0.05).rotated(PI - 0.5, 0.0, angle),
        );
    }

    // Thumb sits on the inner side of each hand.
    let side = if x > 0.0 { -1.0 } else { 1.0 };
    b.part(
        hand,
        "thumb",
        || geometry::capsule(FINGER_RADIUS * 1.1, FINGER_LENGTH * 0.9, 8, 16),
        GLOSSY_WHITE,
        Transform::at(0.20 * side, -0.05, 0.04).rotated(-0.3, 0.0, 0.6 * side),
    );
    arm
}

fn build_props(b: &mut Builder, hand: NodeId) -> [(Prop, NodeId); 4] {
    let phone = build_phone(b, hand);
    let laptop = build_laptop(b, hand);

    let rocket = b.group(
        hand,
        "prop_rocket",
        Transform::at(0.0, -0.4, 0.1)
            .rotated(1.5, 0.0, 0.5)
            .scaled(1.8, 1.8, 1.8),
    );
    b.part(
        rocket,
        "rocket_body",
        || geometry::cylinder(0.06, 0.06, 0.25, 16),
        GLOSSY_WHITE,
        Transform::default(),
    );
    b.part(
        rocket,
        "rocket_nose",
        || geometry::cone(0.06, 0.12, 16),
        SIGNAL_RED,
        Transform::at(0.0, 0.18, 0.0),
    );
    b.part(
        rocket,
        "rocket_fin",
        || geometry::cuboid(0.2, 0.08, 0.02),
        SIGNAL_RED,
        Transform::at(0.0, -0.08, 0.0),
    );

    let cloud = b.group(
        hand,
        "prop_cloud",
        Transform::at(0.0, -0.4, 0.1).scaled(1.8, 1.8, 1.8),
    );
    b.part(
        cloud,
        "cloud_puff",
        || geometry::sphere(0.12, 16, 16),
        GLOSSY_WHITE,
        Transform::default(),
    );
    for cx in [0.14, -0.14] {
        b.part(
            cloud,
            "cloud_side_puff",
            || geometry::sphere(0.09, 16, 16),
            GLOSSY_WHITE,
            Transform::at(cx, -0.02, 0.0),
        );
    }

    let props = [
        (Prop::Phone, phone),
        (Prop::Laptop, laptop),
        (Prop::Rocket, rocket),
        (Prop::Cloud, cloud),
    ];
    for (_, node) in props {
        b.scene.node_mut(node).visible = false;
    }
    props
}

fn build_phone(b: &mut Builder, hand: NodeId) -> NodeId {
    const WIDTH: f32 = 0.45;
    const HEIGHT: f32 = 0.85;
    const DEPTH: f32 = 0.05;
    const CAMERA_X: f32 = -0.12;
    const CAMERA_TOP: f32 = 0.25;
    const CAMERA_SPACING: f32 = 0.16;

    // Back faces the viewer, screen faces the robot.
    let phone = b.group(
        hand,
        "prop_phone",
        Transform::at(0.05, -0.45, 0.15).rotated(-0.2, 0.2, PI - 0.1),
    );
    b.part(
        phone,
        "phone_body",
        || geometry::cuboid(WIDTH, HEIGHT, DEPTH),
        Material::lit(0xcccccc),
        Transform::default(),
    );
    b.part(
        phone,
        "phone_screen",
        || geometry::plane(WIDTH - 0.04, HEIGHT - 0.04),
        Material::flat(0x000000),
        Transform::at(0.0, 0.0, DEPTH / 2.0 + 0.002),
    );

    let back = -DEPTH / 2.0;
    for i in 0..3 {
        let y = CAMERA_TOP - i as f32 * CAMERA_SPACING;
        b.part(
            phone,
            "phone_camera_bump",
            || geometry::cylinder(0.07, 0.07, 0.05, 32),
            Material::flat(0x111111),
            Transform::at(CAMERA_X, y, back - 0.025).rotated(FRAC_PI_2, 0.0, 0.0),
        );
        b.part(
            phone,
            "phone_camera_ring",
            || geometry::torus(0.07, 0.015, 8, 32, TAU),
            Material::flat(0xffffff),
            Transform::at(CAMERA_X, y, back - 0.05),
        );
    }
    b.part(
        phone,
        "phone_flash",
        || geometry::cylinder(0.03, 0.03, 0.02, 16),
        Material::flat(0xffff00),
        Transform::at(CAMERA_X + 0.12, CAMERA_TOP, back - 0.01).rotated(FRAC_PI_2, 0.0, 0.0),
    );
    phone
}

fn build_laptop(b: &mut Builder, hand: NodeId) -> NodeId {
    let frame = Material::lit(0x2b2b2b);
    let laptop = b.group(
        hand,
        "prop_laptop",
        Transform::at(0.0, -0.20, 0.3).rotated(1.6, -0.1, 0.3),
    );
    let base = b.part(
        laptop,
        "laptop_base",
        || geometry::cuboid(0.8, 0.04, 0.55),
        frame,
        Transform::default(),
    );
    b.part(
        base,
        "laptop_keyboard",
        || geometry::plane(0.7, 0.28),
        Material::flat(0x111111),
        Transform::at(0.0, 0.021, 0.05).rotated(-FRAC_PI_2, 0.0, 0.0),
    );

    // Lid pivots on the hinge at the back edge of the base.
    let lid = b.group(
        laptop,
        "laptop_lid",
        Transform::at(0.0, 0.02, -0.27).rotated(0.3, 0.0, 0.0),
    );
    b.part(
        lid,
        "laptop_lid_frame",
        || geometry::cuboid(0.8, 0.55, 0.04),
        frame,
        Transform::at(0.0, 0.275, 0.0),
    );
    b.part(
        lid,
        "laptop_screen",
        || geometry::plane(0.72, 0.45),
        Material::flat(0x3399ff),
        Transform::at(0.0, 0.275, 0.021),
    );
    laptop
}

fn build_leg(b: &mut Builder, root: NodeId, x: f32) {
    let leg = b.group(root, "leg", Transform::at(x, -0.7, 0.0));
    b.part(
        leg,
        "hip",
        || geometry::sphere(0.3, 32, 32),
        CHROME,
        Transform::default(),
    );
    b.part(
        leg,
        "leg_tube",
        || geometry::ribbed_tube(1.0, 0.2, 5),
        CHROME,
        Transform::at(0.0, -0.6, 0.0),
    );
    let boot = b.group(leg, "boot", Transform::at(0.0, -1.2, 0.0));
    b.part(
        boot,
        "boot_base",
        || squircle(0.6, 0.3, 0.8, 0.15),
        PRIMARY_BLUE,
        Transform::at(0.0, 0.1, 0.0)
            .rotated(-0.1, 0.0, 0.0)
            .scaled(1.0, 1.0, 1.2),
    );
    b.part(
        boot,
        "boot_cuff",
        || geometry::cylinder(0.25, 0.25, 0.1, 32),
        GLOSSY_WHITE,
        Transform::at(0.0, 0.3, 0.0),
    );
}
