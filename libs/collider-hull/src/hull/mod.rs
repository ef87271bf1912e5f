//! # Convex Hull
//!
//! QuickHull construction of the smallest convex polytope containing a
//! point set, plus the [`Hull`] result it produces.
//!
//! ## Algorithm Overview
//!
//! QuickHull grows a tetrahedron one extreme point at a time:
//! 1. Find extreme points to form the initial simplex
//! 2. For each face, find the farthest point outside
//! 3. Replace the faces that point can see with a fan to their horizon
//! 4. Merge coplanar and non-convex neighbours
//! 5. Repeat until no points remain outside
//!
//! ## Tolerance
//!
//! A point counts as outside a face only when its plane distance is strictly
//! greater than the build tolerance, so points on a face are interior. By
//! default the tolerance scales with the coordinate magnitudes of the input.
//!
//! ## Example
//!
//! ```rust
//! use collider_hull::{build_hull, FaceFlags};
//! use glam::DVec3;
//!
//! let points = vec![
//!     DVec3::new(0.0, 0.0, 0.0),
//!     DVec3::new(1.0, 0.0, 0.0),
//!     DVec3::new(0.0, 1.0, 0.0),
//!     DVec3::new(0.0, 0.0, 1.0),
//!     DVec3::new(0.1, 0.1, 0.1),
//! ];
//! let hull = build_hull(&points).unwrap();
//! assert_eq!(hull.vertex_count(), 4);
//! assert_eq!(hull.faces(FaceFlags::default()).len(), 4);
//! ```

mod quickhull;

#[cfg(test)]
mod tests;

use crate::error::HullError;
use crate::halfedge::{FaceId, FaceList, FaceMark, HalfEdgeMesh, VertexId};
use crate::mesh::Mesh;
use config::constants::{MIN_HULL_POINTS, POINT_CHECK_FACTOR, TRIANGULATE_MIN_AREA_FACTOR};
use config::HullConfig;
use glam::DVec3;
use quickhull::QuickHull;
use std::ops::BitOr;
use tracing::{debug, trace};

/// Output options for [`Hull::faces`].
///
/// Flags combine with `|`. The default walks faces counter-clockwise seen
/// from outside, indexes from zero and numbers vertices by hull ordinal.
///
/// # Example
///
/// ```rust
/// use collider_hull::FaceFlags;
///
/// let flags = FaceFlags::CLOCKWISE | FaceFlags::INDEX_FROM_ONE;
/// assert!(flags.contains(FaceFlags::CLOCKWISE));
/// assert!(!flags.contains(FaceFlags::POINT_RELATIVE));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FaceFlags(u8);

impl FaceFlags {
    /// Walk each face clockwise seen from outside.
    pub const CLOCKWISE: Self = Self(0x1);
    /// Start indices at one instead of zero.
    pub const INDEX_FROM_ONE: Self = Self(0x2);
    /// Index into the original input points instead of the hull vertices.
    pub const POINT_RELATIVE: Self = Self(0x4);

    /// No flags set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns true if every flag in `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for FaceFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Configured hull construction.
///
/// # Example
///
/// ```rust
/// use collider_hull::HullBuilder;
/// use config::{HullConfig, Tolerance};
/// use glam::DVec3;
///
/// let config = HullConfig::new(Tolerance::Explicit(1e-9), true).unwrap();
/// let cube: Vec<DVec3> = (0..8)
///     .map(|i| DVec3::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64))
///     .collect();
/// let hull = HullBuilder::new(config).build(&cube).unwrap();
/// assert_eq!(hull.face_count(), 12);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HullBuilder {
    config: HullConfig,
}

impl HullBuilder {
    pub fn new(config: HullConfig) -> Self {
        Self { config }
    }

    /// Builds the convex hull of `points`.
    ///
    /// # Errors
    ///
    /// Input is rejected before any mesh is built when it is empty, has
    /// fewer than four points or holds a non-finite coordinate. Coincident,
    /// collinear and coplanar input fails while seeding the simplex.
    pub fn build(&self, points: &[DVec3]) -> Result<Hull, HullError> {
        self.config.validate()?;
        validate_points(points)?;

        let mut builder = QuickHull::new(points);
        builder.build(self.config.tolerance)?;

        let vertices = builder
            .vertex_point_indices
            .iter()
            .map(|&i| points[i])
            .collect();
        let loops = index_loops(&builder.mesh, &builder.faces)?;
        let mut hull = Hull {
            mesh: builder.mesh,
            faces: builder.faces,
            loops,
            vertices,
            vertex_point_indices: builder.vertex_point_indices,
            tolerance: builder.tolerance,
            char_length: builder.char_length,
        };

        if self.config.triangulate {
            hull.triangulate()?;
        }
        Ok(hull)
    }
}

/// Builds the convex hull of `points` with an automatic tolerance.
pub fn build_hull(points: &[DVec3]) -> Result<Hull, HullError> {
    HullBuilder::default().build(points)
}

fn validate_points(points: &[DVec3]) -> Result<(), HullError> {
    if points.is_empty() {
        return Err(HullError::EmptyInput);
    }
    if points.len() < MIN_HULL_POINTS {
        return Err(HullError::TooFewPoints { count: points.len() });
    }
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(HullError::NonFiniteCoordinate { index });
    }
    Ok(())
}

/// Hull ordinal of a vertex that lies on a visible face.
fn hull_index(mesh: &HalfEdgeMesh, v: VertexId) -> Result<usize, HullError> {
    mesh.vertex(v)
        .index
        .ok_or_else(|| HullError::consistency(format!("vertex {} was not re-indexed", v.0)))
}

/// Counter-clockwise hull-ordinal loop of every face, starting at `he0`.
fn index_loops(mesh: &HalfEdgeMesh, faces: &[FaceId]) -> Result<Vec<Vec<usize>>, HullError> {
    faces
        .iter()
        .map(|&face| {
            mesh.face_edges(face)
                .map(|he| hull_index(mesh, mesh.half_edge(he).head))
                .collect()
        })
        .collect()
}

/// A finished convex hull.
///
/// Vertices are the input points that ended up on the hull, in input order.
/// Faces are convex polygons; coplanar neighbours are merged unless the hull
/// was triangulated.
#[derive(Debug, Clone)]
pub struct Hull {
    mesh: HalfEdgeMesh,
    faces: Vec<FaceId>,
    /// Vertex loops of `faces`, resolved once so export cannot fail
    loops: Vec<Vec<usize>>,
    vertices: Vec<DVec3>,
    vertex_point_indices: Vec<usize>,
    tolerance: f64,
    char_length: f64,
}

impl Hull {
    /// Hull vertex positions, indexed by hull ordinal.
    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Input ordinal of each hull vertex.
    #[inline]
    pub fn vertex_point_indices(&self) -> &[usize] {
        &self.vertex_point_indices
    }

    /// Tolerance the build used for every outside test.
    #[inline]
    pub fn distance_tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Largest extent of the input bounding box.
    #[inline]
    pub fn char_length(&self) -> f64 {
        self.char_length
    }

    /// Vertex index loop of every face.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let ccw = hull.faces(FaceFlags::default());
    /// let cw_input = hull.faces(FaceFlags::CLOCKWISE | FaceFlags::POINT_RELATIVE);
    /// ```
    pub fn faces(&self, flags: FaceFlags) -> Vec<Vec<usize>> {
        self.loops
            .iter()
            .map(|ccw| self.face_indices(ccw, flags))
            .collect()
    }

    fn face_indices(&self, ccw: &[usize], flags: FaceFlags) -> Vec<usize> {
        let mut order: Vec<usize> = ccw.to_vec();
        if flags.contains(FaceFlags::CLOCKWISE) {
            // walking backwards from he0 keeps the first vertex first
            order[1..].reverse();
        }
        for idx in &mut order {
            if flags.contains(FaceFlags::POINT_RELATIVE) {
                *idx = self.vertex_point_indices[*idx];
            }
            if flags.contains(FaceFlags::INDEX_FROM_ONE) {
                *idx += 1;
            }
        }
        order
    }

    /// Unit outward normal of each face, in [`Hull::faces`] order.
    pub fn face_normals(&self) -> Vec<DVec3> {
        self.faces.iter().map(|&f| self.mesh.face(f).normal).collect()
    }

    /// Returns this hull with every polygonal face split into a triangle fan.
    pub fn triangulated(mut self) -> Result<Self, HullError> {
        self.triangulate()?;
        Ok(self)
    }

    fn triangulate(&mut self) -> Result<(), HullError> {
        let min_area = TRIANGULATE_MIN_AREA_FACTOR * self.char_length * f64::EPSILON;
        let mut new_faces = FaceList::new();
        for i in 0..self.faces.len() {
            let face = self.faces[i];
            if self.mesh.face(face).mark == FaceMark::Visible {
                self.mesh.triangulate(face, &mut new_faces, min_area)?;
            }
        }

        let created = new_faces.to_vec(self.mesh.faces());
        trace!(created = created.len(), "triangulated hull");
        self.faces.extend(created);
        self.loops = index_loops(&self.mesh, &self.faces)?;
        Ok(())
    }

    /// Triangle mesh of the hull for asset writers.
    ///
    /// Polygonal faces are fanned from their first vertex; normals are
    /// averaged per vertex.
    pub fn to_mesh(&self) -> Mesh {
        let loops = self.faces(FaceFlags::default());
        let triangles: usize = loops.iter().map(|l| l.len() - 2).sum();

        let mut mesh = Mesh::with_capacity(self.vertices.len(), triangles);
        for &v in &self.vertices {
            mesh.add_vertex(v);
        }
        for face in &loops {
            for pair in face[1..].windows(2) {
                mesh.add_triangle(face[0] as u32, pair[0] as u32, pair[1] as u32);
            }
        }
        mesh.compute_normals();
        mesh
    }

    /// Verifies the hull against `points`.
    ///
    /// Every face must pass the topology check and be convex with respect to
    /// its neighbours within the build tolerance, and no point may lie more
    /// than `POINT_CHECK_FACTOR * tolerance` outside any face.
    pub fn check(&self, points: &[DVec3], tolerance: f64) -> Result<(), HullError> {
        for &face in &self.faces {
            self.check_face_convexity(face)?;
        }

        let point_tolerance = POINT_CHECK_FACTOR * tolerance;
        for (i, &p) in points.iter().enumerate() {
            for &face in &self.faces {
                let dist = self.mesh.face(face).distance_to_plane(p);
                if dist > point_tolerance {
                    return Err(HullError::consistency(format!(
                        "point {i} is {dist:e} above face {}",
                        self.mesh.vertex_string(face)
                    )));
                }
            }
        }

        debug!(
            faces = self.faces.len(),
            points = points.len(),
            "hull check passed"
        );
        Ok(())
    }

    fn check_face_convexity(&self, face: FaceId) -> Result<(), HullError> {
        self.mesh.check_consistency(face)?;

        for he in self.mesh.face_edges(face) {
            let dist = self.mesh.opp_face_distance(he)?;
            if dist > self.tolerance {
                return Err(HullError::consistency(format!(
                    "edge {} non-convex by {dist:e}",
                    self.mesh.edge_string(he)
                )));
            }

            let opp = self.mesh.reflected(he)?;
            let dist = self.mesh.opp_face_distance(opp)?;
            if dist > self.tolerance {
                return Err(HullError::consistency(format!(
                    "opposite edge {} non-convex by {dist:e}",
                    self.mesh.edge_string(opp)
                )));
            }

            if self.mesh.opposite_face(self.mesh.next(he)) == self.mesh.opposite_face(he) {
                return Err(HullError::consistency(format!(
                    "redundant vertex {} in face {}",
                    hull_index(&self.mesh, self.mesh.half_edge(he).head)?,
                    self.mesh.vertex_string(face)
                )));
            }
        }
        Ok(())
    }
}
