//! One new vertex per physical cut location.
//!
//! Belt steps that share an edge land on the same point; the cache makes sure
//! they reference a single vertex. Lookups are an epsilon scan, optionally
//! accelerated by a quantized grid (cell size 2x epsilon, 3x3x3 neighborhood)
//! that returns the same answers.

use bevy::prelude::*;
use std::collections::HashMap;

use super::edge::{Intersection, POSITION_EPSILON, PositionEdge};
use crate::modeling::poly_mesh::{MeshFace, MeshVertex, PolyMesh, VertexIndex};

/// Cache of vertices created during one cut operation.
#[derive(Debug, Clone)]
pub struct VertexCache {
    epsilon: f32,
    entries: Vec<(Vec3, VertexIndex)>,
    grid: Option<HashMap<IVec3, Vec<usize>>>,
    created: usize,
}

impl Default for VertexCache {
    fn default() -> Self {
        Self::new(POSITION_EPSILON)
    }
}

impl VertexCache {
    pub fn new(epsilon: f32) -> Self {
        Self {
            epsilon,
            entries: Vec::new(),
            grid: None,
            created: 0,
        }
    }

    /// Use a quantized grid for cache lookups.
    pub fn with_spatial_hash(mut self) -> Self {
        let mut grid: HashMap<IVec3, Vec<usize>> = HashMap::new();
        for (i, (p, _)) in self.entries.iter().enumerate() {
            grid.entry(self.cell(*p)).or_default().push(i);
        }
        self.grid = Some(grid);
        self
    }

    /// Number of vertices this cache appended to the mesh.
    pub fn created(&self) -> usize {
        self.created
    }

    fn cell(&self, p: Vec3) -> IVec3 {
        let size = (self.epsilon * 2.0).max(f32::MIN_POSITIVE);
        (p / size).floor().as_ivec3()
    }

    fn cached(&self, position: Vec3) -> Option<VertexIndex> {
        let close = |&(p, _): &(Vec3, VertexIndex)| p.distance(position) <= self.epsilon;
        match &self.grid {
            None => self.entries.iter().find(|e| close(e)).map(|&(_, v)| v),
            Some(grid) => {
                let c = self.cell(position);
                let mut best: Option<usize> = None;
                for dx in -1..=1 {
                    for dy in -1..=1 {
                        for dz in -1..=1 {
                            let Some(bucket) = grid.get(&(c + IVec3::new(dx, dy, dz))) else {
                                continue;
                            };
                            for &i in bucket {
                                if close(&self.entries[i]) && best.is_none_or(|b| i < b) {
                                    best = Some(i);
                                }
                            }
                        }
                    }
                }
                best.map(|i| self.entries[i].1)
            }
        }
    }

    /// Vertex that `position` would resolve to without creating anything:
    /// a cached vertex, or an existing mesh vertex at one of the edge endpoints.
    pub fn lookup(&self, mesh: &PolyMesh, position: Vec3, edge: &PositionEdge) -> Option<VertexIndex> {
        if let Some(v) = self.cached(position) {
            return Some(v);
        }
        [edge.a, edge.b]
            .into_iter()
            .filter(|end| end.distance(position) <= self.epsilon)
            .find_map(|end| mesh.find_vertex_at(end, self.epsilon))
    }

    /// Resolve `position` on `edge` to a vertex index, appending an
    /// interpolated vertex when nothing matches.
    pub fn resolve(&mut self, mesh: &mut PolyMesh, position: Vec3, edge: &PositionEdge) -> VertexIndex {
        if let Some(v) = self.lookup(mesh, position, edge) {
            return v;
        }
        let ends = mesh
            .find_vertex_at(edge.a, self.epsilon)
            .zip(mesh.find_vertex_at(edge.b, self.epsilon));
        self.create(mesh, position, edge, ends)
    }

    /// The face's own corner standing at the cut point, if the cut sits on
    /// an end of its edge. `edge` runs from corner `at.edge_start` to
    /// corner `at.edge_end`.
    fn corner_at(&self, face: &MeshFace, at: &Intersection, edge: &PositionEdge) -> Option<VertexIndex> {
        if edge.a.distance(at.position) <= self.epsilon {
            face.vertices.get(at.edge_start).copied()
        } else if edge.b.distance(at.position) <= self.epsilon {
            face.vertices.get(at.edge_end).copied()
        } else {
            None
        }
    }

    /// Like [`lookup`](Self::lookup), but a cut on an edge end resolves to
    /// `face`'s own corner rather than to any coincident vertex, so seam
    /// duplicates of other faces are never pulled into the loop.
    pub fn lookup_on_face(&self, face: &MeshFace, at: &Intersection, edge: &PositionEdge) -> Option<VertexIndex> {
        self.corner_at(face, at, edge).or_else(|| self.cached(at.position))
    }

    /// Like [`resolve`](Self::resolve), interpolating attributes from `face`'s
    /// corners on the cut edge.
    pub fn resolve_on_face(
        &mut self,
        mesh: &mut PolyMesh,
        face: &MeshFace,
        at: &Intersection,
        edge: &PositionEdge,
    ) -> VertexIndex {
        if let Some(v) = self.lookup_on_face(face, at, edge) {
            return v;
        }
        let ends = face
            .vertices
            .get(at.edge_start)
            .copied()
            .zip(face.vertices.get(at.edge_end).copied());
        self.create(mesh, at.position, edge, ends)
    }

    fn create(
        &mut self,
        mesh: &mut PolyMesh,
        position: Vec3,
        edge: &PositionEdge,
        ends: Option<(VertexIndex, VertexIndex)>,
    ) -> VertexIndex {
        let vertex = interpolate_on_edge(mesh, position, edge, ends);
        let index = mesh.add_vertex(vertex);
        self.insert(position, index);
        self.created += 1;
        index
    }

    fn insert(&mut self, position: Vec3, index: VertexIndex) {
        let slot = self.entries.len();
        self.entries.push((position, index));
        let cell = self.cell(position);
        if let Some(grid) = &mut self.grid {
            grid.entry(cell).or_default().push(slot);
        }
    }

}

/// Build a vertex at `position` with attributes interpolated from `ends`,
/// the vertices at `edge.a` and `edge.b`. Missing endpoints give a bare vertex.
fn interpolate_on_edge(
    mesh: &PolyMesh,
    position: Vec3,
    edge: &PositionEdge,
    ends: Option<(VertexIndex, VertexIndex)>,
) -> MeshVertex {
    let endpoints = ends.and_then(|(ia, ib)| mesh.vertices.get(ia as usize).zip(mesh.vertices.get(ib as usize)));
    let Some((a, b)) = endpoints else {
        warn!("Cut edge endpoints not found in mesh, creating vertex without attributes");
        return MeshVertex::at(position);
    };
    let t = edge.parameter_of(position);

    let uvs = a
        .uv()
        .zip(b.uv())
        .map(|(ua, ub)| ua.lerp(ub, t))
        .into_iter()
        .collect();
    let normals = a
        .normal()
        .zip(b.normal())
        .map(|(na, nb)| na.lerp(nb, t).normalize_or_zero())
        .into_iter()
        .collect();
    let skin = if t < 0.5 { a.skin } else { b.skin };

    MeshVertex {
        position,
        uvs,
        normals,
        skin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modeling::knife::test_fixtures::make_seam_quads;

    fn make_edge_mesh() -> PolyMesh {
        let mut mesh = PolyMesh::from_quads(
            &[Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 0.0)],
            &[&[0, 1, 2]],
        );
        mesh.vertices[0].uvs.push(Vec2::new(0.0, 0.0));
        mesh.vertices[1].uvs.push(Vec2::new(1.0, 0.0));
        mesh.vertices[0].normals.push(Vec3::Z);
        mesh.vertices[1].normals.push(Vec3::Y);
        mesh
    }

    fn bottom() -> PositionEdge {
        PositionEdge::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0))
    }

    #[test]
    fn creates_interpolated_vertex() {
        let mut mesh = make_edge_mesh();
        let mut cache = VertexCache::default();
        let v = cache.resolve(&mut mesh, Vec3::new(0.5, 0.0, 0.0), &bottom());
        assert_eq!(v, 3);
        let vertex = &mesh.vertices[3];
        assert!((vertex.uv().expect("uv") - Vec2::new(0.25, 0.0)).length() < 1e-6);
        let n = vertex.normal().expect("normal");
        assert!((n.length() - 1.0).abs() < 1e-5);
        assert_eq!(cache.created(), 1);
    }

    #[test]
    fn same_location_resolves_once() {
        let mut mesh = make_edge_mesh();
        let mut cache = VertexCache::default();
        let p = Vec3::new(1.0, 0.0, 0.0);
        let first = cache.resolve(&mut mesh, p, &bottom());
        let second = cache.resolve(&mut mesh, p + Vec3::splat(1e-5), &bottom().reversed());
        assert_eq!(first, second);
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn endpoint_reuses_existing_vertex() {
        let mut mesh = make_edge_mesh();
        let mut cache = VertexCache::default();
        let v = cache.resolve(&mut mesh, Vec3::new(2.0, 0.0, 0.0), &bottom());
        assert_eq!(v, 1);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(cache.created(), 0);
    }

    #[test]
    fn missing_endpoints_give_bare_vertex() {
        let mut mesh = make_edge_mesh();
        let mut cache = VertexCache::default();
        let stray = PositionEdge::new(Vec3::new(5.0, 5.0, 0.0), Vec3::new(6.0, 5.0, 0.0));
        let v = cache.resolve(&mut mesh, Vec3::new(5.5, 5.0, 0.0), &stray);
        assert!(mesh.vertices[v as usize].uvs.is_empty());
        assert!(mesh.vertices[v as usize].normals.is_empty());
    }

    #[test]
    fn spatial_hash_agrees_with_linear_scan() {
        let points = [
            Vec3::new(0.19999, 0.0, 0.0),
            Vec3::new(0.20001, 0.0, 0.0),
            Vec3::new(1.5, 0.0, 0.0),
        ];
        let mut linear_mesh = make_edge_mesh();
        let mut hashed_mesh = make_edge_mesh();
        let mut linear = VertexCache::default();
        let mut hashed = VertexCache::default().with_spatial_hash();
        for p in points {
            let a = linear.resolve(&mut linear_mesh, p, &bottom());
            let b = hashed.resolve(&mut hashed_mesh, p, &bottom());
            assert_eq!(a, b);
        }
        assert_eq!(linear.created(), 2);
        assert_eq!(hashed.created(), 2);
    }

    #[test]
    fn face_corner_wins_over_coincident_seam_vertex() {
        let mut mesh = make_seam_quads();
        let face = mesh.faces[1].clone();
        // Edge 3 of the right quad runs 7 -> 4; its end is shared in space with corner 1.
        let edge = mesh.edge_positions(1, 3).expect("edge");
        let at = Intersection::new(3, 4, 1.0, edge.b);
        let mut cache = VertexCache::default();

        assert_eq!(cache.lookup(&mesh, at.position, &edge), Some(1));
        assert_eq!(cache.lookup_on_face(&face, &at, &edge), Some(4));
        assert_eq!(cache.resolve_on_face(&mut mesh, &face, &at, &edge), 4);
        assert_eq!(cache.created(), 0);
    }

    #[test]
    fn mid_edge_vertex_takes_attributes_from_its_own_face() {
        let mut mesh = make_seam_quads();
        // Left quad's copies of the seam carry u = 1, the right quad's u = 0.
        for (v, uv) in [(1, Vec2::new(1.0, 0.0)), (2, Vec2::new(1.0, 1.0)), (4, Vec2::ZERO), (7, Vec2::Y)] {
            mesh.vertices[v].uvs.push(uv);
        }
        let face = mesh.faces[1].clone();
        let edge = mesh.edge_positions(1, 3).expect("edge");
        let at = Intersection::new(3, 4, 0.5, edge.point_at(0.5));
        let mut cache = VertexCache::default();

        let v = cache.resolve_on_face(&mut mesh, &face, &at, &edge);
        assert_eq!(v, 8);
        assert!((mesh.vertices[8].uv().expect("uv") - Vec2::new(0.0, 0.5)).length() < 1e-6);
    }
}
