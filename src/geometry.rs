//! Procedural mesh generators for the mascot.
//!
//! Everything here is plain data: indexed triangle lists with per-vertex
//! normals, ready to be flattened into WebGL buffers. Surfaces follow the
//! usual conventions of scene-graph libraries (Y up, circles and tori lie in
//! the XY plane facing +Z, solids of revolution spin around Y).

use glam::{Vec2, Vec3};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u16>,
}

#[derive(Clone, Copy, Debug)]
pub struct Bevel {
    pub size: f32,
    pub thickness: f32,
    pub segments: u32,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u16 {
        let index = self.positions.len();
        debug_assert!(index <= u16::MAX as usize, "mesh exceeds u16 index range");
        self.positions.push(position);
        self.normals.push(normal);
        index as u16
    }

    fn push_triangle(&mut self, a: u16, b: u16, c: u16) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    pub fn append(&mut self, other: Mesh) {
        let base = self.positions.len() as u16;
        self.positions.extend(other.positions);
        self.normals.extend(other.normals);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
    }

    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Moves the mesh so its bounding box is centered on the origin.
    pub fn center(&mut self) {
        if let Some((lo, hi)) = self.bounds() {
            self.translate(-(lo + hi) * 0.5);
        }
    }

    /// Area-weighted vertex normals from the triangle list.
    pub fn compute_smooth_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            acc[a] += face;
            acc[b] += face;
            acc[c] += face;
        }
        self.normals = acc.into_iter().map(Vec3::normalize_or_zero).collect();
    }

    pub fn positions_flat(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| p.to_array()).collect()
    }

    pub fn normals_flat(&self) -> Vec<f32> {
        self.normals.iter().flat_map(|n| n.to_array()).collect()
    }
}

/// Builds a `(cols + 1) x (rows + 1)` vertex grid and stitches it into quads.
fn grid(cols: u32, rows: u32, vertex: impl Fn(f32, f32) -> (Vec3, Vec3)) -> Mesh {
    let mut mesh = Mesh::default();
    for iy in 0..=rows {
        let v = iy as f32 / rows as f32;
        for ix in 0..=cols {
            let u = ix as f32 / cols as f32;
            let (p, n) = vertex(u, v);
            mesh.push_vertex(p, n);
        }
    }

    let stride = cols + 1;
    let at = |ix: u32, iy: u32| (iy * stride + ix) as u16;
    for iy in 0..rows {
        for ix in 0..cols {
            let a = at(ix + 1, iy);
            let b = at(ix, iy);
            let c = at(ix, iy + 1);
            let d = at(ix + 1, iy + 1);
            mesh.push_triangle(a, b, d);
            mesh.push_triangle(b, c, d);
        }
    }
    mesh
}

fn quadratic(p0: Vec2, control: Vec2, p1: Vec2, t: f32) -> Vec2 {
    let k = 1.0 - t;
    p0 * (k * k) + control * (2.0 * k * t) + p1 * (t * t)
}

/// Closed rounded-rectangle outline centered on the origin, counter-clockwise,
/// with each corner sampled as a quadratic curve of `segments` steps.
pub fn rounded_rect_outline(width: f32, height: f32, radius: f32, segments: u32) -> Vec<Vec2> {
    let radius = radius.clamp(0.0, width.min(height) * 0.5);
    let segments = segments.max(1);
    let x = -width / 2.0;
    let y = -height / 2.0;

    let mut points = vec![Vec2::new(x, y + radius)];
    let line_to = |points: &mut Vec<Vec2>, p: Vec2| points.push(p);
    let curve_to = |points: &mut Vec<Vec2>, control: Vec2, end: Vec2| {
        let Some(&start) = points.last() else {
            return;
        };
        for s in 1..=segments {
            points.push(quadratic(start, control, end, s as f32 / segments as f32));
        }
    };

    line_to(&mut points, Vec2::new(x, y + height - radius));
    curve_to(&mut points, Vec2::new(x, y + height), Vec2::new(x + radius, y + height));
    line_to(&mut points, Vec2::new(x + width - radius, y + height));
    curve_to(
        &mut points,
        Vec2::new(x + width, y + height),
        Vec2::new(x + width, y + height - radius),
    );
    line_to(&mut points, Vec2::new(x + width, y + radius));
    curve_to(&mut points, Vec2::new(x + width, y), Vec2::new(x + width - radius, y));
    line_to(&mut points, Vec2::new(x + radius, y));
    curve_to(&mut points, Vec2::new(x, y), Vec2::new(x, y + radius));

    points.dedup_by(|a, b| a.distance_squared(*b) < 1e-12);
    if points.len() > 1 && points[0].distance_squared(points[points.len() - 1]) < 1e-12 {
        points.pop();
    }

    if signed_area(&points) < 0.0 {
        points.reverse();
    }
    points
}

pub fn signed_area(outline: &[Vec2]) -> f32 {
    let n = outline.len();
    (0..n)
        .map(|i| outline[i].perp_dot(outline[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

fn outline_normals(outline: &[Vec2]) -> Vec<Vec2> {
    let n = outline.len();
    (0..n)
        .map(|i| {
            let prev = outline[(i + n - 1) % n];
            let next = outline[(i + 1) % n];
            let here = outline[i];
            let e0 = (here - prev).normalize_or_zero();
            let e1 = (next - here).normalize_or_zero();
            // Outward for a counter-clockwise outline.
            let n0 = Vec2::new(e0.y, -e0.x);
            let n1 = Vec2::new(e1.y, -e1.x);
            (n0 + n1).normalize_or_zero()
        })
        .collect()
}

/// Extrudes a convex counter-clockwise outline along +Z and centers the result.
pub fn extrude(outline: &[Vec2], depth: f32, bevel: Option<Bevel>) -> Mesh {
    let n = outline.len();
    if n < 3 {
        return Mesh::default();
    }
    let normals2d = outline_normals(outline);

    // (z, outward expansion) per ring, back to front.
    let mut rings: Vec<(f32, f32)> = Vec::new();
    match bevel {
        Some(b) if b.segments > 0 => {
            for s in 0..b.segments {
                let t = s as f32 / b.segments as f32;
                rings.push((-b.thickness * (t * FRAC_PI_2).cos(), b.size * (t * FRAC_PI_2).sin()));
            }
            rings.push((0.0, b.size));
            rings.push((depth, b.size));
            for s in (0..b.segments).rev() {
                let t = s as f32 / b.segments as f32;
                rings.push((
                    depth + b.thickness * (t * FRAC_PI_2).cos(),
                    b.size * (t * FRAC_PI_2).sin(),
                ));
            }
        }
        _ => {
            rings.push((0.0, 0.0));
            rings.push((depth, 0.0));
        }
    }

    let ring_point = |i: usize, (z, expand): (f32, f32)| {
        let p = outline[i] + normals2d[i] * expand;
        Vec3::new(p.x, p.y, z)
    };

    let mut sides = Mesh::default();
    for &ring in &rings {
        for i in 0..n {
            sides.push_vertex(ring_point(i, ring), Vec3::ZERO);
        }
    }
    for r in 0..rings.len() - 1 {
        for i in 0..n {
            let j = (i + 1) % n;
            let a = (r * n + i) as u16;
            let b = (r * n + j) as u16;
            let c = ((r + 1) * n + j) as u16;
            let d = ((r + 1) * n + i) as u16;
            sides.push_triangle(a, b, c);
            sides.push_triangle(a, c, d);
        }
    }
    sides.compute_smooth_normals();

    let mut mesh = sides;
    let first = rings[0];
    let last = rings[rings.len() - 1];
    mesh.append(cap(outline, &normals2d, first, -Vec3::Z));
    mesh.append(cap(outline, &normals2d, last, Vec3::Z));
    mesh.center();
    mesh
}

fn cap(outline: &[Vec2], normals2d: &[Vec2], (z, expand): (f32, f32), facing: Vec3) -> Mesh {
    let mut mesh = Mesh::default();
    let centroid = outline.iter().copied().sum::<Vec2>() / outline.len() as f32;
    let hub = mesh.push_vertex(centroid.extend(z), facing);
    for (p, n) in outline.iter().zip(normals2d) {
        let q = *p + *n * expand;
        mesh.push_vertex(q.extend(z), facing);
    }
    let count = outline.len() as u16;
    for i in 0..count {
        let a = 1 + i;
        let b = 1 + (i + 1) % count;
        if facing.z > 0.0 {
            mesh.push_triangle(hub, a, b);
        } else {
            mesh.push_triangle(hub, b, a);
        }
    }
    mesh
}

/// Solid of revolution around Y from a profile of `(radius, y)` points.
pub fn lathe(profile: &[Vec2], segments: u32) -> Mesh {
    if profile.len() < 2 {
        return Mesh::default();
    }
    let last = profile.len() - 1;
    let profile_normals: Vec<Vec2> = (0..profile.len())
        .map(|i| {
            let tangent = profile[(i + 1).min(last)] - profile[i.saturating_sub(1)];
            Vec2::new(tangent.y, -tangent.x).normalize_or_zero()
        })
        .collect();

    // Rows run from the last profile point down to the first, like the cylinder side.
    grid(segments, last as u32, |u, v| {
        let i = ((1.0 - v) * last as f32).round() as usize;
        let phi = u * TAU;
        let (s, c) = phi.sin_cos();
        let p = profile[i];
        let n = profile_normals[i];
        (
            Vec3::new(p.x * s, p.y, p.x * c),
            Vec3::new(n.x * s, n.y, n.x * c),
        )
    })
}

/// Profile of an accordion joint: a tube whose radius ripples `ribs` times.
pub fn ribbed_profile(length: f32, radius: f32, ribs: u32) -> Vec<Vec2> {
    let segments = ribs * 4;
    (0..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            let y = (t - 0.5) * length;
            let r = radius + (t * PI * ribs as f32 * 2.0).sin() * (radius * 0.15);
            Vec2::new(r, y)
        })
        .collect()
}

pub fn ribbed_tube(length: f32, radius: f32, ribs: u32) -> Mesh {
    lathe(&ribbed_profile(length, radius, ribs), 32)
}

pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Mesh {
    grid(width_segments, height_segments, |u, v| {
        let phi = u * TAU;
        let theta = v * PI;
        let n = Vec3::new(
            -phi.cos() * theta.sin(),
            theta.cos(),
            phi.sin() * theta.sin(),
        );
        (n * radius, n)
    })
}

pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, radial: u32) -> Mesh {
    let slope = (radius_bottom - radius_top) / height;
    let mut mesh = grid(radial, 1, |u, v| {
        let radius = v * (radius_bottom - radius_top) + radius_top;
        let (s, c) = (u * TAU).sin_cos();
        (
            Vec3::new(radius * s, -v * height + height / 2.0, radius * c),
            Vec3::new(s, slope, c).normalize_or_zero(),
        )
    });

    for (radius, y, facing) in [
        (radius_top, height / 2.0, Vec3::Y),
        (radius_bottom, -height / 2.0, -Vec3::Y),
    ] {
        if radius <= 0.0 {
            continue;
        }
        let mut cap = Mesh::default();
        let hub = cap.push_vertex(Vec3::new(0.0, y, 0.0), facing);
        for i in 0..=radial {
            let (s, c) = (i as f32 / radial as f32 * TAU).sin_cos();
            cap.push_vertex(Vec3::new(radius * s, y, radius * c), facing);
        }
        for i in 0..radial as u16 {
            if facing.y > 0.0 {
                cap.push_triangle(hub, 1 + i, 2 + i);
            } else {
                cap.push_triangle(hub, 2 + i, 1 + i);
            }
        }
        mesh.append(cap);
    }
    mesh
}

pub fn cone(radius: f32, height: f32, radial: u32) -> Mesh {
    cylinder(0.0, radius, height, radial)
}

pub fn torus(radius: f32, tube: f32, radial: u32, tubular: u32, arc: f32) -> Mesh {
    grid(tubular, radial, |u, v| {
        let a = u * arc;
        let b = (1.0 - v) * TAU;
        let center = Vec3::new(radius * a.cos(), radius * a.sin(), 0.0);
        let p = Vec3::new(
            (radius + tube * b.cos()) * a.cos(),
            (radius + tube * b.cos()) * a.sin(),
            tube * b.sin(),
        );
        (p, (p - center).normalize_or_zero())
    })
}

pub fn circle(radius: f32, segments: u32) -> Mesh {
    let mut mesh = Mesh::default();
    let hub = mesh.push_vertex(Vec3::ZERO, Vec3::Z);
    for i in 0..=segments {
        let (s, c) = (i as f32 / segments as f32 * TAU).sin_cos();
        mesh.push_vertex(Vec3::new(radius * c, radius * s, 0.0), Vec3::Z);
    }
    for i in 0..segments as u16 {
        mesh.push_triangle(hub, 1 + i, 2 + i);
    }
    mesh
}

pub fn plane(width: f32, height: f32) -> Mesh {
    grid(1, 1, |u, v| {
        (
            Vec3::new((u - 0.5) * width, (0.5 - v) * height, 0.0),
            Vec3::Z,
        )
    })
}

pub fn cuboid(width: f32, height: f32, depth: f32) -> Mesh {
    let half = Vec3::new(width, height, depth) * 0.5;
    let mut mesh = Mesh::default();
    // (normal, u axis, v axis) per face
    let faces = [
        (Vec3::X, -Vec3::Z, Vec3::Y),
        (-Vec3::X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, -Vec3::Z),
        (-Vec3::Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (-Vec3::Z, -Vec3::X, Vec3::Y),
    ];
    for (normal, u, v) in faces {
        let center = normal * half;
        let du = u * half;
        let dv = v * half;
        let a = mesh.push_vertex(center - du - dv, normal);
        let b = mesh.push_vertex(center + du - dv, normal);
        let c = mesh.push_vertex(center + du + dv, normal);
        let d = mesh.push_vertex(center - du + dv, normal);
        mesh.push_triangle(a, b, c);
        mesh.push_triangle(a, c, d);
    }
    mesh
}

/// Pill shape along Y: a cylinder of `length` with hemispherical ends.
pub fn capsule(radius: f32, length: f32, cap_segments: u32, radial: u32) -> Mesh {
    let cap_segments = cap_segments.max(1);
    let half = length / 2.0;
    let mut profile = Vec::with_capacity((cap_segments as usize + 1) * 2);
    for i in 0..=cap_segments {
        let a = -FRAC_PI_2 + (i as f32 / cap_segments as f32) * FRAC_PI_2;
        profile.push(Vec2::new(radius * a.cos(), -half + radius * a.sin()));
    }
    for i in 0..=cap_segments {
        let a = (i as f32 / cap_segments as f32) * FRAC_PI_2;
        profile.push(Vec2::new(radius * a.cos(), half + radius * a.sin()));
    }
    lathe(&profile, radial)
}
