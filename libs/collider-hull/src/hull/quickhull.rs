//! # QuickHull Builder
//!
//! Incremental 3D convex hull construction on a [`HalfEdgeMesh`].
//! Based on the algorithm by Barber, Dobkin, and Huhdanpaa.
//!
//! ## Algorithm Steps
//!
//! 1. Record the extreme vertex on each axis and derive the tolerance
//! 2. Build an initial tetrahedron and assign every other point to the face
//!    it lies furthest outside of
//! 3. While some face has outside points:
//!    a. Take the farthest point of the first claimed face (the eye)
//!    b. Delete every face visible from the eye, collecting the horizon
//!    c. Fan new triangles from the eye to the horizon
//!    d. Merge new faces that are not convex with their neighbours
//!    e. Hand orphaned points to the new faces
//! 4. Number the surviving vertices densely in input order

use crate::error::HullError;
use crate::halfedge::{FaceId, FaceList, FaceMark, HalfEdgeId, HalfEdgeMesh, VertexId, VertexList};
use config::constants::{AUTOMATIC_TOLERANCE_FACTOR, DEGENERACY_FACTOR, UNCLAIMED_EARLY_EXIT_FACTOR};
use config::Tolerance;
use glam::DVec3;
use tracing::{debug, trace};

/// Which test decides that two adjacent faces merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeKind {
    /// Merge when non-convex with respect to the larger of the two faces;
    /// otherwise only flag the face for the second pass.
    NonConvexWrtLargerFace,
    /// Merge when non-convex in either direction.
    NonConvex,
}

/// One level of the horizon walk: the edge to visit next and the edge that
/// ends the loop.
#[derive(Debug, Clone, Copy)]
struct HorizonFrame {
    edge: HalfEdgeId,
    stop: HalfEdgeId,
}

/// Mutable state of one hull build.
///
/// Owns the arena exclusively; nothing is shared between builds.
pub(crate) struct QuickHull {
    pub(crate) mesh: HalfEdgeMesh,
    /// Every face ever created, in creation order
    pub(crate) faces: Vec<FaceId>,
    horizon: Vec<HalfEdgeId>,
    new_faces: FaceList,
    claimed: VertexList,
    unclaimed: VertexList,
    pub(crate) tolerance: f64,
    pub(crate) char_length: f64,
    max_vtxs: [VertexId; 3],
    min_vtxs: [VertexId; 3],
    /// Hull ordinal to input ordinal, filled once the build finishes
    pub(crate) vertex_point_indices: Vec<usize>,
}

impl QuickHull {
    /// Loads the input points into a fresh arena.
    ///
    /// The caller has already checked the point count and coordinates.
    pub(crate) fn new(points: &[DVec3]) -> Self {
        let mut mesh = HalfEdgeMesh::with_capacity(points.len());
        for &p in points {
            mesh.add_vertex(p);
        }
        Self {
            mesh,
            faces: Vec::new(),
            horizon: Vec::new(),
            new_faces: FaceList::new(),
            claimed: VertexList::new(),
            unclaimed: VertexList::new(),
            tolerance: 0.0,
            char_length: 0.0,
            max_vtxs: [VertexId(0); 3],
            min_vtxs: [VertexId(0); 3],
            vertex_point_indices: Vec::new(),
        }
    }

    /// Runs every construction phase.
    pub(crate) fn build(&mut self, tolerance: Tolerance) -> Result<(), HullError> {
        self.compute_max_and_min(tolerance);
        self.create_initial_simplex()?;

        let mut iterations = 0usize;
        while let Some(eye) = self.next_point_to_add() {
            self.add_point_to_hull(eye)?;
            iterations += 1;
        }

        self.reindex_faces_and_vertices();
        debug!(
            points = self.mesh.vertex_count(),
            iterations,
            faces = self.faces.len(),
            vertices = self.vertex_point_indices.len(),
            tolerance = self.tolerance,
            "hull built"
        );
        Ok(())
    }

    fn point(&self, v: VertexId) -> DVec3 {
        self.mesh.vertex(v).point
    }

    // =========================================================================
    // BOUNDS & TOLERANCE
    // =========================================================================

    fn compute_max_and_min(&mut self, tolerance: Tolerance) {
        let first = VertexId(0);
        self.max_vtxs = [first; 3];
        self.min_vtxs = [first; 3];
        let mut max = self.point(first);
        let mut min = max;

        for i in 1..self.mesh.vertex_count() {
            let v = VertexId(i as u32);
            let p = self.point(v);
            for axis in 0..3 {
                if p[axis] > max[axis] {
                    max[axis] = p[axis];
                    self.max_vtxs[axis] = v;
                } else if p[axis] < min[axis] {
                    min[axis] = p[axis];
                    self.min_vtxs[axis] = v;
                }
            }
        }

        self.char_length = (max - min).max_element();
        self.tolerance = match tolerance {
            Tolerance::Explicit(value) => value,
            Tolerance::Automatic => {
                let extent = max.abs().max(min.abs());
                AUTOMATIC_TOLERANCE_FACTOR * f64::EPSILON * (extent.x + extent.y + extent.z)
            }
        };
    }

    // =========================================================================
    // INITIAL SIMPLEX
    // =========================================================================

    fn create_initial_simplex(&mut self) -> Result<(), HullError> {
        let mut max = 0.0;
        let mut imax = 0;
        for axis in 0..3 {
            let diff = self.point(self.max_vtxs[axis])[axis] - self.point(self.min_vtxs[axis])[axis];
            if diff > max {
                max = diff;
                imax = axis;
            }
        }
        if max <= self.tolerance {
            return Err(HullError::CoincidentPoints);
        }

        let v0 = self.max_vtxs[imax];
        let v1 = self.min_vtxs[imax];
        let p0 = self.point(v0);

        // third vertex: farthest from the line v0-v1
        let u01 = (self.point(v1) - p0).normalize();
        let mut max_sqr = 0.0;
        let mut best: Option<(VertexId, DVec3)> = None;
        for i in 0..self.mesh.vertex_count() {
            let v = VertexId(i as u32);
            let xprod = u01.cross(self.point(v) - p0);
            let len_sqr = xprod.length_squared();
            if len_sqr > max_sqr && v != v0 && v != v1 {
                max_sqr = len_sqr;
                best = Some((v, xprod));
            }
        }
        let distance = max_sqr.sqrt();
        let (v2, xprod) = match best {
            Some(found) if distance > DEGENERACY_FACTOR * self.tolerance => found,
            _ => {
                return Err(HullError::CollinearPoints {
                    distance,
                    tolerance: self.tolerance,
                })
            }
        };

        let mut normal = xprod.normalize();
        // drop any component along u01 left by rounding
        normal -= normal.dot(u01) * u01;
        normal = normal.normalize();

        // fourth vertex: farthest from the plane v0-v1-v2
        let d0 = self.point(v2).dot(normal);
        let mut max_dist = 0.0;
        let mut v3 = None;
        for i in 0..self.mesh.vertex_count() {
            let v = VertexId(i as u32);
            let dist = (self.point(v).dot(normal) - d0).abs();
            if dist > max_dist && v != v0 && v != v1 && v != v2 {
                max_dist = dist;
                v3 = Some(v);
            }
        }
        let v3 = match v3 {
            Some(v) if max_dist > DEGENERACY_FACTOR * self.tolerance => v,
            _ => {
                return Err(HullError::CoplanarPoints {
                    distance: max_dist,
                    tolerance: self.tolerance,
                })
            }
        };

        debug!(
            v0 = v0.0,
            v1 = v1.0,
            v2 = v2.0,
            v3 = v3.0,
            tolerance = self.tolerance,
            "initial simplex"
        );

        let tris = if self.point(v3).dot(normal) - d0 < 0.0 {
            let tris = [
                self.mesh.create_triangle(v0, v1, v2, 0.0),
                self.mesh.create_triangle(v3, v1, v0, 0.0),
                self.mesh.create_triangle(v3, v2, v1, 0.0),
                self.mesh.create_triangle(v3, v0, v2, 0.0),
            ];
            for i in 0..3 {
                let k = (i + 1) % 3;
                let a = self.mesh.edge(tris[i + 1], 1);
                let b = self.mesh.edge(tris[k + 1], 0);
                self.mesh.set_opposite(a, b);
                let a = self.mesh.edge(tris[i + 1], 2);
                let b = self.mesh.edge(tris[0], k as isize);
                self.mesh.set_opposite(a, b);
            }
            tris
        } else {
            let tris = [
                self.mesh.create_triangle(v0, v2, v1, 0.0),
                self.mesh.create_triangle(v3, v0, v1, 0.0),
                self.mesh.create_triangle(v3, v1, v2, 0.0),
                self.mesh.create_triangle(v3, v2, v0, 0.0),
            ];
            for i in 0..3 {
                let k = (i + 1) % 3;
                let a = self.mesh.edge(tris[i + 1], 0);
                let b = self.mesh.edge(tris[k + 1], 1);
                self.mesh.set_opposite(a, b);
                let a = self.mesh.edge(tris[i + 1], 2);
                let b = self.mesh.edge(tris[0], ((3 - i) % 3) as isize);
                self.mesh.set_opposite(a, b);
            }
            tris
        };
        self.faces.extend_from_slice(&tris);

        for i in 0..self.mesh.vertex_count() {
            let v = VertexId(i as u32);
            if v == v0 || v == v1 || v == v2 || v == v3 {
                continue;
            }
            let p = self.point(v);
            let mut max_dist = self.tolerance;
            let mut max_face = None;
            for &tri in &tris {
                let dist = self.mesh.face(tri).distance_to_plane(p);
                if dist > max_dist {
                    max_dist = dist;
                    max_face = Some(tri);
                }
            }
            if let Some(face) = max_face {
                self.add_point_to_face(v, face);
            }
        }

        Ok(())
    }

    // =========================================================================
    // OUTSIDE SETS
    // =========================================================================

    /// Claims `v` for `face`, keeping each face's outside set contiguous in
    /// the claimed list.
    fn add_point_to_face(&mut self, v: VertexId, face: FaceId) {
        self.mesh.vertex_mut(v).face = Some(face);
        let outside = self.mesh.face(face).outside;
        match outside {
            None => self.claimed.add(self.mesh.vertices_mut(), v),
            Some(first) => self.claimed.insert_before(self.mesh.vertices_mut(), v, first),
        }
        self.mesh.face_mut(face).outside = Some(v);
    }

    fn remove_point_from_face(&mut self, v: VertexId, face: FaceId) {
        if self.mesh.face(face).outside == Some(v) {
            let next = self
                .mesh
                .vertex(v)
                .next
                .filter(|&n| self.mesh.vertex(n).face == Some(face));
            self.mesh.face_mut(face).outside = next;
        }
        self.claimed.delete(self.mesh.vertices_mut(), v);
    }

    /// Detaches the whole outside set of `face` and returns its members.
    fn remove_all_points_from_face(&mut self, face: FaceId) -> Vec<VertexId> {
        let Some(first) = self.mesh.face(face).outside else {
            return Vec::new();
        };

        let mut members = vec![first];
        let mut end = first;
        while let Some(next) = self.mesh.vertex(end).next {
            if self.mesh.vertex(next).face != Some(face) {
                break;
            }
            members.push(next);
            end = next;
        }

        self.claimed.delete_range(self.mesh.vertices_mut(), first, end);
        self.mesh.vertex_mut(end).next = None;
        self.mesh.face_mut(face).outside = None;
        members
    }

    /// Moves the outside points of a removed face to `absorbing` when they are
    /// still outside it, otherwise to the unclaimed pool.
    fn delete_face_points(&mut self, face: FaceId, absorbing: Option<FaceId>) {
        let members = self.remove_all_points_from_face(face);
        for v in members {
            match absorbing {
                Some(target) if self.mesh.face(target).distance_to_plane(self.point(v)) > self.tolerance => {
                    self.add_point_to_face(v, target);
                }
                _ => self.unclaimed.add(self.mesh.vertices_mut(), v),
            }
        }
    }

    // =========================================================================
    // INSERTION LOOP
    // =========================================================================

    /// Farthest outside point of the first face that still has any.
    fn next_point_to_add(&self) -> Option<VertexId> {
        let first = self.claimed.first()?;
        let eye_face = self.mesh.vertex(first).face?;
        let face = self.mesh.face(eye_face);

        let mut max_dist = 0.0;
        let mut eye = None;
        let mut current = face.outside;
        while let Some(v) = current {
            let vertex = self.mesh.vertex(v);
            if vertex.face != Some(eye_face) {
                break;
            }
            let dist = face.distance_to_plane(vertex.point);
            if dist > max_dist {
                max_dist = dist;
                eye = Some(v);
            }
            current = vertex.next;
        }
        eye
    }

    fn add_point_to_hull(&mut self, eye: VertexId) -> Result<(), HullError> {
        self.horizon.clear();
        self.unclaimed.clear();

        let eye_face = self
            .mesh
            .vertex(eye)
            .face
            .ok_or_else(|| HullError::consistency("eye point is not claimed by any face"))?;
        trace!(
            eye = eye.0,
            distance = self.mesh.face(eye_face).distance_to_plane(self.point(eye)),
            "adding point"
        );

        self.remove_point_from_face(eye, eye_face);
        self.calculate_horizon(self.point(eye), eye_face)?;
        self.new_faces.clear();
        self.add_new_faces(eye)?;

        // first pass: merge faces non-convex wrt the larger face
        let mut current = self.new_faces.first();
        while let Some(face) = current {
            if self.mesh.face(face).mark == FaceMark::Visible {
                while self.do_adjacent_merge(face, MergeKind::NonConvexWrtLargerFace)? {}
            }
            current = self.mesh.face(face).next;
        }

        // second pass: merge whatever is still non-convex
        let mut current = self.new_faces.first();
        while let Some(face) = current {
            if self.mesh.face(face).mark == FaceMark::NonConvex {
                self.mesh.face_mut(face).mark = FaceMark::Visible;
                while self.do_adjacent_merge(face, MergeKind::NonConvex)? {}
            }
            current = self.mesh.face(face).next;
        }

        self.resolve_unclaimed_points();
        Ok(())
    }

    /// Deletes every face visible from `eye_point`, starting at `start`, and
    /// records the horizon edges in walk order.
    ///
    /// Equivalent to a depth-first recursion over visible neighbours, kept on
    /// an explicit stack so large horizons cannot exhaust the call stack.
    fn calculate_horizon(&mut self, eye_point: DVec3, start: FaceId) -> Result<(), HullError> {
        self.delete_face_points(start, None);
        self.mesh.face_mut(start).mark = FaceMark::Deleted;
        let he0 = self.mesh.face(start).he0;

        let mut stack = vec![HorizonFrame { edge: he0, stop: he0 }];
        while let Some(frame) = stack.last_mut() {
            let edge = frame.edge;
            let next = self.mesh.next(edge);
            if next == frame.stop {
                stack.pop();
            } else {
                frame.edge = next;
            }

            let opp = self.mesh.reflected(edge)?;
            let opp_face = self.mesh.half_edge(opp).face;
            if self.mesh.face(opp_face).mark != FaceMark::Visible {
                continue;
            }

            if self.mesh.face(opp_face).distance_to_plane(eye_point) > self.tolerance {
                self.delete_face_points(opp_face, None);
                self.mesh.face_mut(opp_face).mark = FaceMark::Deleted;
                stack.push(HorizonFrame {
                    edge: self.mesh.next(opp),
                    stop: opp,
                });
            } else {
                self.horizon.push(edge);
            }
        }

        trace!(edges = self.horizon.len(), "horizon");
        Ok(())
    }

    /// Creates the triangle `eye, tail, head` over a horizon edge and returns
    /// its edge running into the eye.
    fn add_adjoining_face(&mut self, eye: VertexId, he: HalfEdgeId) -> Result<HalfEdgeId, HullError> {
        let tail = self.mesh.tail(he);
        let head = self.mesh.half_edge(he).head;
        let face = self.mesh.create_triangle(eye, tail, head, 0.0);
        self.faces.push(face);

        let outer = self.mesh.edge(face, -1);
        let across = self.mesh.reflected(he)?;
        self.mesh.set_opposite(outer, across);
        Ok(self.mesh.edge(face, 0))
    }

    fn add_new_faces(&mut self, eye: VertexId) -> Result<(), HullError> {
        let horizon = std::mem::take(&mut self.horizon);
        let mut side_prev: Option<HalfEdgeId> = None;
        let mut side_begin: Option<HalfEdgeId> = None;

        for &he in &horizon {
            let side = self.add_adjoining_face(eye, he)?;
            match side_prev {
                Some(prev) => {
                    let next = self.mesh.next(side);
                    self.mesh.set_opposite(next, prev);
                }
                None => side_begin = Some(side),
            }
            let face = self.mesh.half_edge(side).face;
            self.new_faces.add(self.mesh.faces_mut(), face);
            side_prev = Some(side);
        }

        let (Some(begin), Some(last)) = (side_begin, side_prev) else {
            return Err(HullError::consistency("empty horizon"));
        };
        let next = self.mesh.next(begin);
        self.mesh.set_opposite(next, last);

        self.horizon = horizon;
        Ok(())
    }

    /// Tries one merge across the edges of `face`. Returns true when a merge
    /// happened so the caller can try again on the reshaped face.
    fn do_adjacent_merge(&mut self, face: FaceId, kind: MergeKind) -> Result<bool, HullError> {
        let he0 = self.mesh.face(face).he0;
        let mut hedge = he0;
        let mut convex = true;

        loop {
            let opp = self.mesh.reflected(hedge)?;
            let opp_face = self.mesh.half_edge(opp).face;
            let mut merge = false;

            match kind {
                MergeKind::NonConvex => {
                    if self.mesh.opp_face_distance(hedge)? > -self.tolerance
                        || self.mesh.opp_face_distance(opp)? > -self.tolerance
                    {
                        merge = true;
                    }
                }
                MergeKind::NonConvexWrtLargerFace => {
                    let face_is_larger = self.mesh.face(face).area > self.mesh.face(opp_face).area;
                    let (toward_larger, toward_smaller) = if face_is_larger {
                        (hedge, opp)
                    } else {
                        (opp, hedge)
                    };
                    if self.mesh.opp_face_distance(toward_larger)? > -self.tolerance {
                        merge = true;
                    } else if self.mesh.opp_face_distance(toward_smaller)? > -self.tolerance {
                        convex = false;
                    }
                }
            }

            if merge {
                let discarded = self.mesh.merge_adjacent_face(face, hedge)?;
                for gone in discarded {
                    self.delete_face_points(gone, Some(face));
                }
                return Ok(true);
            }

            hedge = self.mesh.next(hedge);
            if hedge == he0 {
                break;
            }
        }

        if !convex {
            self.mesh.face_mut(face).mark = FaceMark::NonConvex;
        }
        Ok(false)
    }

    /// Gives each orphaned point to the new face it is furthest outside of.
    /// Points outside none of them are now interior and dropped.
    fn resolve_unclaimed_points(&mut self) {
        let early_exit = UNCLAIMED_EARLY_EXIT_FACTOR * self.tolerance;
        let orphans = self.unclaimed.to_vec(self.mesh.vertices());
        let new_faces = self.new_faces.to_vec(self.mesh.faces());

        for v in orphans {
            let p = self.point(v);
            let mut max_dist = self.tolerance;
            let mut max_face = None;
            for &face in &new_faces {
                let f = self.mesh.face(face);
                if f.mark != FaceMark::Visible {
                    continue;
                }
                let dist = f.distance_to_plane(p);
                if dist > max_dist {
                    max_dist = dist;
                    max_face = Some(face);
                }
                if max_dist > early_exit {
                    break;
                }
            }

            match max_face {
                Some(face) => self.add_point_to_face(v, face),
                None => self.mesh.vertex_mut(v).face = None,
            }
        }
        self.unclaimed.clear();
    }

    // =========================================================================
    // OUTPUT
    // =========================================================================

    /// Drops non-visible faces and numbers the vertices they use densely,
    /// in input order.
    fn reindex_faces_and_vertices(&mut self) {
        for v in self.mesh.vertices_mut() {
            v.index = None;
        }

        let mesh = &self.mesh;
        self.faces.retain(|&face| mesh.face(face).mark == FaceMark::Visible);

        for &face in &self.faces {
            let heads: Vec<VertexId> = self
                .mesh
                .face_edges(face)
                .map(|he| self.mesh.half_edge(he).head)
                .collect();
            for v in heads {
                self.mesh.vertex_mut(v).index = Some(0);
            }
        }

        self.vertex_point_indices.clear();
        for (i, v) in self.mesh.vertices_mut().iter_mut().enumerate() {
            if v.index.is_some() {
                v.index = Some(self.vertex_point_indices.len());
                self.vertex_point_indices.push(i);
            }
        }
    }
}
