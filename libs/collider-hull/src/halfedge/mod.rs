//! # Halfedge Mesh Data Structure
//!
//! Mutable topology the hull builder grows and edits in place.
//! Uses index-based references instead of pointers for Rust safety.
//!
//! ## Structure
//!
//! - **Vertex**: input point, scratch index, outside-set links
//! - **HalfEdge**: head vertex, owning face, next/prev loop links, opposite
//! - **Face**: loop entry, plane (normal, offset), centroid, area, mark
//!
//! All records live in one [`HalfEdgeMesh`] arena per build. Nothing is ever
//! removed from the arena; faces leave the hull by being marked
//! [`FaceMark::Deleted`].
//!
//! ## Example
//!
//! ```rust
//! use collider_hull::halfedge::HalfEdgeMesh;
//! use glam::DVec3;
//!
//! let mut mesh = HalfEdgeMesh::new();
//! let v0 = mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0));
//! let v1 = mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
//! let v2 = mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0));
//! let face = mesh.create_triangle(v0, v1, v2, 0.0);
//! assert_eq!(mesh.face(face).num_verts, 3);
//! ```

mod face;
mod list;


pub use list::{FaceList, VertexList};

use crate::error::HullError;
use glam::DVec3;
use std::collections::HashMap;

/// Index type for vertices in the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct VertexId(pub u32);

/// Index type for half-edges in the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HalfEdgeId(pub u32);

/// Index type for faces in the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FaceId(pub u32);

/// Hull membership state of a face.
///
/// `Visible` faces are on the hull. `NonConvex` is a transient flag set by
/// the first merge pass and cleared by the second. `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaceMark {
    #[default]
    Visible,
    NonConvex,
    Deleted,
}

/// Vertex in the halfedge mesh.
///
/// # Fields
///
/// - `point`: input coordinates, never modified after creation
/// - `index`: input ordinal before the build, hull ordinal after it
/// - `prev`/`next`: links in whichever vertex list currently holds it
/// - `face`: face whose outside set claims this vertex
#[derive(Debug, Clone)]
pub struct Vertex {
    /// 3D position of the vertex
    pub point: DVec3,
    /// Input ordinal, hull ordinal, or `None` while unmarked during reindexing
    pub index: Option<usize>,
    /// Previous vertex in the owning list
    pub prev: Option<VertexId>,
    /// Next vertex in the owning list
    pub next: Option<VertexId>,
    /// Face this vertex lies outside of
    pub face: Option<FaceId>,
}

impl Vertex {
    /// Creates an unlinked vertex.
    pub fn new(point: DVec3, index: usize) -> Self {
        Self {
            point,
            index: Some(index),
            prev: None,
            next: None,
            face: None,
        }
    }
}

/// Half-edge in the mesh.
///
/// The tail of a half-edge is the head of its `prev`.
#[derive(Debug, Clone)]
pub struct HalfEdge {
    /// Vertex this half-edge points TO
    pub head: VertexId,
    /// Face this half-edge belongs to
    pub face: FaceId,
    /// Next half-edge in the face loop (counter-clockwise)
    pub next: HalfEdgeId,
    /// Previous half-edge in the face loop (counter-clockwise)
    pub prev: HalfEdgeId,
    /// Half-edge on the neighbouring face running the other way
    pub opposite: Option<HalfEdgeId>,
}

/// Face in the halfedge mesh.
#[derive(Debug, Clone)]
pub struct Face {
    /// Loop entry half-edge
    pub he0: HalfEdgeId,
    /// Unit outward normal
    pub normal: DVec3,
    /// Magnitude of the unnormalized Newell normal
    pub area: f64,
    /// Average of the loop vertices
    pub centroid: DVec3,
    /// `normal · centroid`
    pub plane_offset: f64,
    /// Number of half-edges in the loop
    pub num_verts: usize,
    /// Hull membership state
    pub mark: FaceMark,
    /// Next face in the owning face list
    pub next: Option<FaceId>,
    /// First vertex of this face's outside set in the claimed list
    pub outside: Option<VertexId>,
}

impl Face {
    fn new(he0: HalfEdgeId) -> Self {
        Self {
            he0,
            normal: DVec3::ZERO,
            area: 0.0,
            centroid: DVec3::ZERO,
            plane_offset: 0.0,
            num_verts: 0,
            mark: FaceMark::Visible,
            next: None,
            outside: None,
        }
    }

    /// Signed distance from `point` to this face's plane; positive outside.
    #[inline]
    pub fn distance_to_plane(&self, point: DVec3) -> f64 {
        self.normal.dot(point) - self.plane_offset
    }
}

/// Arena owning every vertex, half-edge and face of one hull build.
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    vertices: Vec<Vertex>,
    half_edges: Vec<HalfEdge>,
    faces: Vec<Face>,
}

impl HalfEdgeMesh {
    /// Creates a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty mesh sized for `num_points` input vertices.
    pub fn with_capacity(num_points: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_points),
            // A hull over n points has at most 2n - 4 triangles
            half_edges: Vec::with_capacity(num_points * 6),
            faces: Vec::with_capacity(num_points * 2),
        }
    }

    /// Adds a vertex whose index is its insertion ordinal.
    pub fn add_vertex(&mut self, point: DVec3) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(Vertex::new(point, id.0 as usize));
        id
    }

    /// Returns the number of vertices in the arena.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of faces ever created, deleted ones included.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns the number of half-edges ever created.
    #[inline]
    pub fn half_edge_count(&self) -> usize {
        self.half_edges.len()
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0 as usize]
    }

    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id.0 as usize]
    }

    /// All vertices, in input order.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub(crate) fn vertices_mut(&mut self) -> &mut [Vertex] {
        &mut self.vertices
    }

    #[inline]
    pub fn half_edge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.half_edges[id.0 as usize]
    }

    #[inline]
    pub(crate) fn half_edge_mut(&mut self, id: HalfEdgeId) -> &mut HalfEdge {
        &mut self.half_edges[id.0 as usize]
    }

    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.0 as usize]
    }

    #[inline]
    pub fn face_mut(&mut self, id: FaceId) -> &mut Face {
        &mut self.faces[id.0 as usize]
    }

    /// All faces ever created, deleted ones included.
    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[inline]
    pub(crate) fn faces_mut(&mut self) -> &mut [Face] {
        &mut self.faces
    }

    /// Position of the vertex a half-edge points to.
    #[inline]
    pub fn head_point(&self, he: HalfEdgeId) -> DVec3 {
        self.vertex(self.half_edge(he).head).point
    }

    /// Vertex a half-edge starts from.
    #[inline]
    pub fn tail(&self, he: HalfEdgeId) -> VertexId {
        self.half_edge(self.half_edge(he).prev).head
    }

    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.half_edge(he).next
    }

    #[inline]
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.half_edge(he).prev
    }

    #[inline]
    pub fn opposite(&self, he: HalfEdgeId) -> Option<HalfEdgeId> {
        self.half_edge(he).opposite
    }

    /// Opposite of a half-edge that must already be linked.
    pub fn reflected(&self, he: HalfEdgeId) -> Result<HalfEdgeId, HullError> {
        self.opposite(he).ok_or_else(|| {
            HullError::consistency(format!("unreflected half edge {}", self.edge_string(he)))
        })
    }

    /// Face on the other side of a half-edge.
    #[inline]
    pub fn opposite_face(&self, he: HalfEdgeId) -> Option<FaceId> {
        self.opposite(he).map(|opp| self.half_edge(opp).face)
    }

    /// Links two half-edges as opposites of each other.
    pub fn set_opposite(&mut self, a: HalfEdgeId, b: HalfEdgeId) {
        self.half_edge_mut(a).opposite = Some(b);
        self.half_edge_mut(b).opposite = Some(a);
    }

    /// Squared length of a half-edge.
    pub fn length_squared(&self, he: HalfEdgeId) -> f64 {
        self.head_point(he)
            .distance_squared(self.vertex(self.tail(he)).point)
    }

    /// Returns the `i`-th half-edge of a face loop, walking backwards for
    /// negative `i`.
    pub fn edge(&self, face: FaceId, i: isize) -> HalfEdgeId {
        let mut he = self.face(face).he0;
        if i >= 0 {
            for _ in 0..i {
                he = self.next(he);
            }
        } else {
            for _ in 0..-i {
                he = self.prev(he);
            }
        }
        he
    }

    /// Iterates the half-edges of a face loop starting at `he0`.
    pub fn face_edges(&self, face: FaceId) -> FaceEdges<'_> {
        let start = self.face(face).he0;
        FaceEdges {
            mesh: self,
            start,
            current: Some(start),
        }
    }

    /// Finds the half-edge of `face` running from `tail` to `head`.
    pub fn find_edge(&self, face: FaceId, tail: VertexId, head: VertexId) -> Option<HalfEdgeId> {
        self.face_edges(face)
            .find(|&he| self.half_edge(he).head == head && self.tail(he) == tail)
    }

    /// Creates a triangle `v0 → v1 → v2` and computes its plane.
    pub fn create_triangle(&mut self, v0: VertexId, v1: VertexId, v2: VertexId, min_area: f64) -> FaceId {
        self.create_face(&[v0, v1, v2], min_area)
    }

    /// Creates a face from a loop of vertices (counter-clockwise seen from
    /// outside) and computes its plane. Opposites are left unset.
    pub fn create_face(&mut self, vertex_ids: &[VertexId], min_area: f64) -> FaceId {
        debug_assert!(vertex_ids.len() >= 3);
        let face_id = FaceId(self.faces.len() as u32);
        let first = self.half_edges.len() as u32;
        let n = vertex_ids.len() as u32;

        for (i, &head) in vertex_ids.iter().enumerate() {
            let i = i as u32;
            self.half_edges.push(HalfEdge {
                head,
                face: face_id,
                next: HalfEdgeId(first + (i + 1) % n),
                prev: HalfEdgeId(first + (i + n - 1) % n),
                opposite: None,
            });
        }

        self.faces.push(Face::new(HalfEdgeId(first)));
        self.compute_normal_and_centroid(face_id, min_area);
        face_id
    }

    /// Builds a mesh from explicit polygons, linking opposites by matching
    /// each `tail → head` edge with a `head → tail` edge of another polygon.
    ///
    /// Polygons index into `points` and wind counter-clockwise seen from
    /// outside. Edges without a partner keep `opposite == None`.
    pub fn from_polygons(
        points: &[DVec3],
        polygons: &[Vec<usize>],
    ) -> Result<(Self, Vec<FaceId>), HullError> {
        let mut mesh = Self::with_capacity(points.len());
        for &p in points {
            mesh.add_vertex(p);
        }

        let mut edge_map: HashMap<(u32, u32), HalfEdgeId> = HashMap::new();
        let mut faces = Vec::with_capacity(polygons.len());
        for polygon in polygons {
            if polygon.len() < 3 {
                return Err(HullError::consistency(format!(
                    "polygon with {} vertices",
                    polygon.len()
                )));
            }
            if let Some(&bad) = polygon.iter().find(|&&i| i >= points.len()) {
                return Err(HullError::consistency(format!(
                    "polygon index {bad} is out of range (points.len = {})",
                    points.len()
                )));
            }

            let ids: Vec<VertexId> = polygon.iter().map(|&i| VertexId(i as u32)).collect();
            let face = mesh.create_face(&ids, 0.0);
            let edges: Vec<HalfEdgeId> = mesh.face_edges(face).collect();
            for he in edges {
                let head = mesh.half_edge(he).head.0;
                let tail = mesh.tail(he).0;
                if let Some(&twin) = edge_map.get(&(head, tail)) {
                    mesh.set_opposite(he, twin);
                }
                edge_map.insert((tail, head), he);
            }
            faces.push(face);
        }

        Ok((mesh, faces))
    }

    /// Adds a lone half-edge owned by `face`; the caller splices it in.
    pub(crate) fn add_half_edge(&mut self, head: VertexId, face: FaceId) -> HalfEdgeId {
        let id = HalfEdgeId(self.half_edges.len() as u32);
        self.half_edges.push(HalfEdge {
            head,
            face,
            next: id,
            prev: id,
            opposite: None,
        });
        id
    }

    /// Head vertex ordinals of a face loop, e.g. `"0 4 2"`.
    pub fn vertex_string(&self, face: FaceId) -> String {
        self.face_edges(face)
            .map(|he| self.index_label(self.half_edge(he).head))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Tail and head ordinals of a half-edge, e.g. `"3-7"`.
    pub fn edge_string(&self, he: HalfEdgeId) -> String {
        format!(
            "{}-{}",
            self.index_label(self.tail(he)),
            self.index_label(self.half_edge(he).head)
        )
    }

    fn index_label(&self, v: VertexId) -> String {
        match self.vertex(v).index {
            Some(index) => index.to_string(),
            None => "?".to_string(),
        }
    }
}

/// Iterator over the half-edges of one face loop.
pub struct FaceEdges<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: Option<HalfEdgeId>,
}

impl Iterator for FaceEdges<'_> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        let he = self.current?;
        let next = self.mesh.next(he);
        self.current = (next != self.start).then_some(next);
        Some(he)
    }
}
