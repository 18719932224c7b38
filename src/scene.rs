use crate::geometry::Mesh;
use glam::{EulerRot, Mat4, Quat, Vec3};

pub type NodeId = usize;
pub type MeshId = usize;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    /// Euler angles in radians, applied in X, Y, Z order.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: Vec3::new(x, y, z),
            ..Self::default()
        }
    }

    pub fn rotated(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Vec3::new(x, y, z);
        self
    }

    pub fn scaled(mut self, x: f32, y: f32, z: f32) -> Self {
        self.scale = Vec3::new(x, y, z);
        self
    }

    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.translation)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: [f32; 3],
    pub lit: bool,
    pub opacity: f32,
}

impl Material {
    pub const fn lit(hex: u32) -> Self {
        Self {
            color: hex_rgb(hex),
            lit: true,
            opacity: 1.0,
        }
    }

    pub const fn flat(hex: u32) -> Self {
        Self {
            color: hex_rgb(hex),
            lit: false,
            opacity: 1.0,
        }
    }
}

pub const fn hex_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: &'static str,
    pub transform: Transform,
    pub mesh: Option<MeshId>,
    pub material: Material,
    pub visible: bool,
    pub children: Vec<NodeId>,
}

#[derive(Clone, Copy, Debug)]
pub struct Draw {
    pub node: NodeId,
    pub mesh: MeshId,
    pub material: Material,
    pub world: Mat4,
}

#[derive(Clone, Debug)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    meshes: Vec<Mesh>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub const ROOT: NodeId = 0;

    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: "scene",
                transform: Transform::default(),
                mesh: None,
                material: Material::flat(0xffffff),
                visible: true,
                children: Vec::new(),
            }],
            meshes: Vec::new(),
        }
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn group(&mut self, parent: NodeId, name: &'static str, transform: Transform) -> NodeId {
        self.insert(parent, name, transform, None, Material::flat(0xffffff))
    }

    pub fn object(
        &mut self,
        parent: NodeId,
        name: &'static str,
        mesh: MeshId,
        material: Material,
        transform: Transform,
    ) -> NodeId {
        self.insert(parent, name, transform, Some(mesh), material)
    }

    fn insert(
        &mut self,
        parent: NodeId,
        name: &'static str,
        transform: Transform,
        mesh: Option<MeshId>,
        material: Material,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            name,
            transform,
            mesh,
            material,
            visible: true,
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name)
    }

    /// World matrix of a node, composed from the root down.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut chain = vec![id];
        while let Some(&child) = chain.last() {
            match self.parent_of(child) {
                Some(parent) => chain.push(parent),
                None => break,
            }
        }
        chain
            .iter()
            .rev()
            .fold(Mat4::IDENTITY, |acc, &n| acc * self.nodes[n].transform.matrix())
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.children.contains(&id))
    }

    /// Every visible mesh node with its world matrix. Hidden nodes prune their subtree.
    pub fn world_draws(&self) -> Vec<Draw> {
        let mut draws = Vec::new();
        let mut stack = vec![(Self::ROOT, Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let node = &self.nodes[id];
            if !node.visible {
                continue;
            }
            let world = parent_world * node.transform.matrix();
            if let Some(mesh) = node.mesh {
                draws.push(Draw {
                    node: id,
                    mesh,
                    material: node.material,
                    world,
                });
            }
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
        draws
    }
}
