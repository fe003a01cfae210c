//! Polygon mesh data model edited by the knife tool.
//!
//! `PolyMesh` is an indexed face list with n-gon faces. Faces reference
//! vertices by index; vertices carry any number of UV and normal channels.
//! The knife engine appends vertices and replaces/appends faces in place.

use bevy::mesh::{Indices, PrimitiveTopology, VertexAttributeValues};
use bevy::prelude::*;

use super::knife::edge::PositionEdge;

/// Index of a face in the mesh.
pub type FaceIndex = usize;
/// Index of a vertex in the mesh.
pub type VertexIndex = u32;

/// Up to four joint influences for skinned meshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinWeight {
    pub joints: [u16; 4],
    pub weights: [f32; 4],
}

/// A single mesh vertex.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshVertex {
    pub position: Vec3,
    /// UV channels, first channel is the primary one.
    pub uvs: Vec<Vec2>,
    /// Normal channels, first channel is the shading normal.
    pub normals: Vec<Vec3>,
    pub skin: Option<SkinWeight>,
}

impl MeshVertex {
    /// Vertex with a position and no attributes.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..default()
        }
    }

    pub fn uv(&self) -> Option<Vec2> {
        self.uvs.first().copied()
    }

    pub fn normal(&self) -> Option<Vec3> {
        self.normals.first().copied()
    }
}

/// A polygon face: an ordered vertex loop plus a material slot.
///
/// Two vertices form an auxiliary line, three a triangle, four a quad.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeshFace {
    pub vertices: Vec<VertexIndex>,
    pub material: u32,
}

impl MeshFace {
    pub fn new(vertices: Vec<VertexIndex>, material: u32) -> Self {
        Self { vertices, material }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn is_triangle(&self) -> bool {
        self.vertices.len() == 3
    }

    pub fn is_quad(&self) -> bool {
        self.vertices.len() == 4
    }

    /// Vertex indices of face-local edge `edge` (vertex `edge` to `edge + 1 mod n`).
    pub fn edge(&self, edge: usize) -> Option<(VertexIndex, VertexIndex)> {
        let n = self.vertices.len();
        if n < 2 || edge >= n {
            return None;
        }
        Some((self.vertices[edge], self.vertices[(edge + 1) % n]))
    }
}

/// Indexed polygon mesh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolyMesh {
    pub vertices: Vec<MeshVertex>,
    pub faces: Vec<MeshFace>,
}

impl PolyMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from bare positions and vertex loops (material 0).
    pub fn from_quads(positions: &[Vec3], loops: &[&[VertexIndex]]) -> Self {
        Self {
            vertices: positions.iter().map(|&p| MeshVertex::at(p)).collect(),
            faces: loops
                .iter()
                .map(|l| MeshFace::new(l.to_vec(), 0))
                .collect(),
        }
    }

    /// Build a `PolyMesh` from a Bevy `Mesh`, one triangle face per triangle.
    ///
    /// Returns `None` if the mesh lacks positions or uses a non-triangle topology.
    pub fn from_bevy_mesh(mesh: &Mesh) -> Option<Self> {
        if mesh.primitive_topology() != PrimitiveTopology::TriangleList {
            return None;
        }

        let positions: Vec<Vec3> = match mesh.attribute(Mesh::ATTRIBUTE_POSITION)? {
            VertexAttributeValues::Float32x3(v) => v.iter().map(|p| Vec3::from(*p)).collect(),
            _ => return None,
        };

        let normals: Option<Vec<Vec3>> = match mesh.attribute(Mesh::ATTRIBUTE_NORMAL) {
            Some(VertexAttributeValues::Float32x3(v)) => {
                Some(v.iter().map(|n| Vec3::from(*n)).collect())
            }
            _ => None,
        };

        let uvs: Option<Vec<Vec2>> = match mesh.attribute(Mesh::ATTRIBUTE_UV_0) {
            Some(VertexAttributeValues::Float32x2(v)) => {
                Some(v.iter().map(|u| Vec2::from(*u)).collect())
            }
            _ => None,
        };

        let indices: Vec<u32> = match mesh.indices() {
            Some(Indices::U32(indices)) => indices.clone(),
            Some(Indices::U16(indices)) => indices.iter().map(|&i| i as u32).collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| MeshVertex {
                position,
                uvs: uvs.as_ref().and_then(|u| u.get(i).copied()).into_iter().collect(),
                normals: normals
                    .as_ref()
                    .and_then(|n| n.get(i).copied())
                    .into_iter()
                    .collect(),
                skin: None,
            })
            .collect();

        let faces = indices
            .chunks_exact(3)
            .map(|c| MeshFace::new(vec![c[0], c[1], c[2]], 0))
            .collect();

        let mesh = PolyMesh { vertices, faces };
        if !mesh.validate() {
            warn!("Bevy mesh references out-of-range vertices, refusing to edit it");
            return None;
        }
        Some(mesh)
    }

    /// Convert to a renderable Bevy `Mesh`, fan-triangulating every polygon.
    ///
    /// Auxiliary two-vertex faces are not rendered.
    pub fn to_bevy_mesh(&self) -> Mesh {
        let positions: Vec<[f32; 3]> = self.vertices.iter().map(|v| v.position.to_array()).collect();
        let normals: Vec<[f32; 3]> = self
            .vertices
            .iter()
            .map(|v| v.normal().unwrap_or(Vec3::ZERO).to_array())
            .collect();
        let uvs: Vec<[f32; 2]> = self
            .vertices
            .iter()
            .map(|v| v.uv().unwrap_or(Vec2::ZERO).to_array())
            .collect();
        let indices = self.triangulate();

        let build = |positions: Vec<[f32; 3]>,
                     normals: Vec<[f32; 3]>,
                     uvs: Vec<[f32; 2]>,
                     indices: Vec<u32>| {
            let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, default());
            mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
            mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
            mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
            mesh.insert_indices(Indices::U32(indices));
            mesh
        };

        let mesh = build(positions.clone(), normals.clone(), uvs.clone(), indices.clone());
        match mesh.with_generated_tangents() {
            Ok(m) => m,
            Err(e) => {
                warn!("Failed to generate tangents for PolyMesh: {e}");
                build(positions, normals, uvs, indices)
            }
        }
    }

    /// Fan triangulation of all faces with at least three vertices.
    pub fn triangulate(&self) -> Vec<u32> {
        let mut indices = Vec::new();
        for face in &self.faces {
            if face.len() < 3 {
                continue;
            }
            let hub = face.vertices[0];
            for w in face.vertices[1..].windows(2) {
                indices.extend_from_slice(&[hub, w[0], w[1]]);
            }
        }
        indices
    }

    /// Check that every face index is in bounds and every face has at least 2 vertices.
    pub fn validate(&self) -> bool {
        let n = self.vertices.len();
        self.faces
            .iter()
            .all(|f| f.len() >= 2 && f.vertices.iter().all(|&v| (v as usize) < n))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn face(&self, face: FaceIndex) -> Option<&MeshFace> {
        self.faces.get(face)
    }

    pub fn position(&self, vertex: VertexIndex) -> Option<Vec3> {
        self.vertices.get(vertex as usize).map(|v| v.position)
    }

    /// Append a vertex and return its index.
    pub fn add_vertex(&mut self, vertex: MeshVertex) -> VertexIndex {
        let id = self.vertices.len() as VertexIndex;
        self.vertices.push(vertex);
        id
    }

    /// World positions of a face's vertex loop, or `None` if any index is out of range.
    pub fn face_positions(&self, face: FaceIndex) -> Option<Vec<Vec3>> {
        self.face(face)?
            .vertices
            .iter()
            .map(|&v| self.position(v))
            .collect()
    }

    /// Positions of face-local edge `edge` on `face`.
    pub fn edge_positions(&self, face: FaceIndex, edge: usize) -> Option<PositionEdge> {
        let (a, b) = self.face(face)?.edge(edge)?;
        Some(PositionEdge::new(self.position(a)?, self.position(b)?))
    }

    /// Find the face-local index of the edge on `face` matching `edge` by position.
    pub fn find_edge(&self, face: FaceIndex, edge: &PositionEdge, epsilon: f32) -> Option<usize> {
        let n = self.face(face)?.len();
        (0..n).find(|&i| {
            self.edge_positions(face, i)
                .is_some_and(|e| e.matches(edge, epsilon))
        })
    }

    /// First vertex whose position lies within `epsilon` of `position`.
    pub fn find_vertex_at(&self, position: Vec3, epsilon: f32) -> Option<VertexIndex> {
        self.vertices
            .iter()
            .position(|v| v.position.distance(position) <= epsilon)
            .map(|i| i as VertexIndex)
    }

    /// Newell normal of a face, scaled by its area.
    pub fn face_normal(&self, face: FaceIndex) -> Option<Vec3> {
        let positions = self.face_positions(face)?;
        let n = positions.len();
        let mut normal = Vec3::ZERO;
        for i in 0..n {
            let (a, b) = (positions[i], positions[(i + 1) % n]);
            normal += Vec3::new(
                (a.y - b.y) * (a.z + b.z),
                (a.z - b.z) * (a.x + b.x),
                (a.x - b.x) * (a.y + b.y),
            );
        }
        Some(normal * 0.5)
    }

    /// Give every vertex without a normal the normalized sum of its faces' normals.
    pub fn with_smooth_normals(mut self) -> Self {
        let mut sums = vec![Vec3::ZERO; self.vertices.len()];
        for face in 0..self.faces.len() {
            let Some(normal) = self.face_normal(face) else {
                continue;
            };
            for &v in &self.faces[face].vertices {
                if let Some(sum) = sums.get_mut(v as usize) {
                    *sum += normal;
                }
            }
        }
        for (vertex, sum) in self.vertices.iter_mut().zip(sums) {
            if vertex.normals.is_empty() {
                vertex.normals.push(sum.normalize_or_zero());
            }
        }
        self
    }
}
