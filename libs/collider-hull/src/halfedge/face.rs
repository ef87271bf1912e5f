//! Face-level operations: plane fitting, merging and fan triangulation.

use super::{FaceId, FaceList, FaceMark, HalfEdgeId, HalfEdgeMesh};
use crate::error::HullError;
use glam::DVec3;
use tracing::trace;

impl HalfEdgeMesh {
    /// Recomputes the Newell normal, area and loop length of a face.
    ///
    /// When the area falls below `min_area` the normal is made orthogonal to
    /// the longest edge, which is the best-conditioned direction for a sliver.
    pub fn compute_normal(&mut self, face: FaceId, min_area: f64) {
        let he0 = self.face(face).he0;
        let he1 = self.next(he0);
        let mut he2 = self.next(he1);

        let p0 = self.head_point(he0);
        let mut d2 = self.head_point(he1) - p0;
        let mut normal = DVec3::ZERO;
        let mut num_verts = 2;

        while he2 != he0 {
            let d1 = d2;
            d2 = self.head_point(he2) - p0;
            normal += d1.cross(d2);
            he2 = self.next(he2);
            num_verts += 1;
        }

        let area = normal.length();
        if area > 0.0 {
            normal /= area;
        }

        if area < min_area {
            let longest = self
                .face_edges(face)
                .map(|he| (he, self.length_squared(he)))
                .fold(None, |best: Option<(HalfEdgeId, f64)>, (he, len_sqr)| match best {
                    Some((_, best_len)) if best_len >= len_sqr => best,
                    _ => Some((he, len_sqr)),
                });
            if let Some((he_max, len_sqr)) = longest {
                if len_sqr > 0.0 {
                    let p2 = self.head_point(he_max);
                    let p1 = self.vertex(self.tail(he_max)).point;
                    let u = (p2 - p1) / len_sqr.sqrt();
                    normal -= normal.dot(u) * u;
                    normal = normal.normalize_or_zero();
                }
            }
        }

        let f = self.face_mut(face);
        f.normal = normal;
        f.area = area;
        f.num_verts = num_verts;
    }

    /// Recomputes the centroid of a face from its current loop.
    pub fn compute_centroid(&mut self, face: FaceId) {
        let (sum, count) = self
            .face_edges(face)
            .fold((DVec3::ZERO, 0usize), |(sum, count), he| {
                (sum + self.head_point(he), count + 1)
            });
        self.face_mut(face).centroid = sum / count as f64;
    }

    /// Refreshes normal, area, centroid, vertex count and plane offset.
    pub fn compute_normal_and_centroid(&mut self, face: FaceId, min_area: f64) {
        self.compute_normal(face, min_area);
        self.compute_centroid(face);
        let f = self.face_mut(face);
        f.plane_offset = f.normal.dot(f.centroid);
    }

    /// Distance from `he`'s face plane to the centroid of the face across it.
    pub fn opp_face_distance(&self, he: HalfEdgeId) -> Result<f64, HullError> {
        let opp_face = self.half_edge(self.reflected(he)?).face;
        let face = self.half_edge(he).face;
        Ok(self.face(face).distance_to_plane(self.face(opp_face).centroid))
    }

    /// Absorbs the face across `hedge_adj` into `face`.
    ///
    /// Runs of shared edges are removed, so the neighbour is always deleted
    /// and up to two further triangles that become redundant are deleted with
    /// it. Returns every face marked [`FaceMark::Deleted`] by the merge.
    pub fn merge_adjacent_face(
        &mut self,
        face: FaceId,
        hedge_adj: HalfEdgeId,
    ) -> Result<Vec<FaceId>, HullError> {
        let hedge_opp = self.reflected(hedge_adj)?;
        let opp_face = self.half_edge(hedge_opp).face;

        trace!(
            face = %self.vertex_string(face),
            neighbour = %self.vertex_string(opp_face),
            "merging adjacent faces"
        );

        let mut discarded = Vec::with_capacity(3);
        discarded.push(opp_face);
        self.face_mut(opp_face).mark = FaceMark::Deleted;

        let mut hedge_adj_prev = self.prev(hedge_adj);
        let mut hedge_adj_next = self.next(hedge_adj);
        let mut hedge_opp_prev = self.prev(hedge_opp);
        let mut hedge_opp_next = self.next(hedge_opp);

        while self.opposite_face(hedge_adj_prev) == Some(opp_face) {
            hedge_adj_prev = self.prev(hedge_adj_prev);
            hedge_opp_next = self.next(hedge_opp_next);
        }

        while self.opposite_face(hedge_adj_next) == Some(opp_face) {
            hedge_opp_prev = self.prev(hedge_opp_prev);
            hedge_adj_next = self.next(hedge_adj_next);
        }

        let stop = self.next(hedge_opp_prev);
        let mut hedge = hedge_opp_next;
        while hedge != stop {
            self.half_edge_mut(hedge).face = face;
            hedge = self.next(hedge);
        }

        if hedge_adj == self.face(face).he0 {
            self.face_mut(face).he0 = hedge_adj_next;
        }

        // close the gap at the head of the removed run, then at its tail
        if let Some(extra) = self.connect_half_edges(face, hedge_opp_prev, hedge_adj_next)? {
            discarded.push(extra);
        }
        if let Some(extra) = self.connect_half_edges(face, hedge_adj_prev, hedge_opp_next)? {
            discarded.push(extra);
        }

        self.compute_normal_and_centroid(face, 0.0);
        self.check_consistency(face)?;

        Ok(discarded)
    }

    /// Splices `hedge` after `hedge_prev` inside `face`, collapsing the
    /// redundant edge pair when both border the same neighbour.
    fn connect_half_edges(
        &mut self,
        face: FaceId,
        hedge_prev: HalfEdgeId,
        hedge: HalfEdgeId,
    ) -> Result<Option<FaceId>, HullError> {
        let opp_face = self.opposite_face(hedge);
        if self.opposite_face(hedge_prev) != opp_face {
            self.half_edge_mut(hedge_prev).next = hedge;
            self.half_edge_mut(hedge).prev = hedge_prev;
            return Ok(None);
        }

        let hedge_opposite = self.reflected(hedge)?;
        let opp_face = self.half_edge(hedge_opposite).face;
        let mut discarded = None;

        if hedge_prev == self.face(face).he0 {
            self.face_mut(face).he0 = hedge;
        }

        let hedge_opp = if self.face(opp_face).num_verts == 3 {
            // the neighbour collapses entirely
            let across = self.prev(hedge_opposite);
            let hedge_opp = self.reflected(across)?;
            self.face_mut(opp_face).mark = FaceMark::Deleted;
            discarded = Some(opp_face);
            hedge_opp
        } else {
            let hedge_opp = self.next(hedge_opposite);
            if self.face(opp_face).he0 == self.prev(hedge_opp) {
                self.face_mut(opp_face).he0 = hedge_opp;
            }
            let new_prev = self.prev(self.prev(hedge_opp));
            self.half_edge_mut(hedge_opp).prev = new_prev;
            self.half_edge_mut(new_prev).next = hedge_opp;
            hedge_opp
        };

        let new_prev = self.prev(hedge_prev);
        self.half_edge_mut(hedge).prev = new_prev;
        self.half_edge_mut(new_prev).next = hedge;

        self.set_opposite(hedge, hedge_opp);

        self.compute_normal_and_centroid(opp_face, 0.0);

        Ok(discarded)
    }

    /// Verifies the loop and opposite links of a face.
    ///
    /// Fails on a loop shorter than three edges, an edge without an
    /// opposite, asymmetric opposites, mismatched endpoints, a neighbour
    /// that is deleted, or a stale vertex count.
    pub fn check_consistency(&self, face: FaceId) -> Result<(), HullError> {
        let f = self.face(face);
        if f.num_verts < 3 {
            return Err(HullError::consistency(format!(
                "degenerate face: {}",
                self.vertex_string(face)
            )));
        }

        let limit = self.half_edge_count();
        let mut numv = 0;
        let mut hedge = f.he0;
        loop {
            let hedge_opp = self.opposite(hedge).ok_or_else(|| {
                HullError::consistency(format!(
                    "face {}: unreflected half edge {}",
                    self.vertex_string(face),
                    self.edge_string(hedge)
                ))
            })?;

            if self.opposite(hedge_opp) != Some(hedge) {
                return Err(HullError::consistency(format!(
                    "face {}: opposite half edge {} is not reflected back",
                    self.vertex_string(face),
                    self.edge_string(hedge_opp)
                )));
            }

            if self.half_edge(hedge_opp).head != self.tail(hedge)
                || self.half_edge(hedge).head != self.tail(hedge_opp)
            {
                return Err(HullError::consistency(format!(
                    "face {}: half edge {} reflected by {}",
                    self.vertex_string(face),
                    self.edge_string(hedge),
                    self.edge_string(hedge_opp)
                )));
            }

            let opp_face = self.half_edge(hedge_opp).face;
            if self.face(opp_face).mark == FaceMark::Deleted {
                return Err(HullError::consistency(format!(
                    "face {}: opposite face {} not on hull",
                    self.vertex_string(face),
                    self.vertex_string(opp_face)
                )));
            }

            if self.half_edge(hedge).face != face {
                return Err(HullError::consistency(format!(
                    "face {}: half edge {} owned by another face",
                    self.vertex_string(face),
                    self.edge_string(hedge)
                )));
            }

            numv += 1;
            if numv > limit {
                return Err(HullError::consistency("face loop does not close"));
            }

            hedge = self.next(hedge);
            if hedge == f.he0 {
                break;
            }
        }

        if numv != f.num_verts {
            return Err(HullError::consistency(format!(
                "face {} numVerts={} should be {}",
                self.vertex_string(face),
                f.num_verts,
                numv
            )));
        }

        Ok(())
    }

    /// Splits a face with four or more vertices into a fan of triangles
    /// around its first head vertex.
    ///
    /// The original face is shrunk to the last triangle of the fan; the new
    /// triangles are appended to `new_faces`.
    pub fn triangulate(
        &mut self,
        face: FaceId,
        new_faces: &mut FaceList,
        min_area: f64,
    ) -> Result<(), HullError> {
        if self.face(face).num_verts < 4 {
            return Ok(());
        }

        let he0 = self.face(face).he0;
        let v0 = self.half_edge(he0).head;
        let last = self.prev(he0);

        let mut hedge = self.next(he0);
        let mut opp_prev = self.reflected(hedge)?;
        let mut created = Vec::new();

        hedge = self.next(hedge);
        while hedge != last {
            let prev_head = self.half_edge(self.prev(hedge)).head;
            let head = self.half_edge(hedge).head;
            let tri = self.create_triangle(v0, prev_head, head, min_area);
            let tri_he0 = self.face(tri).he0;
            let hedge_opp = self.reflected(hedge)?;
            self.set_opposite(self.next(tri_he0), opp_prev);
            self.set_opposite(self.prev(tri_he0), hedge_opp);
            opp_prev = tri_he0;
            new_faces.add(self.faces_mut(), tri);
            created.push(tri);
            hedge = self.next(hedge);
        }

        let closing_head = self.half_edge(self.prev(last)).head;
        let closing = self.add_half_edge(closing_head, face);
        self.set_opposite(closing, opp_prev);

        self.half_edge_mut(closing).prev = he0;
        self.half_edge_mut(he0).next = closing;
        self.half_edge_mut(closing).next = last;
        self.half_edge_mut(last).prev = closing;

        self.compute_normal_and_centroid(face, min_area);
        self.check_consistency(face)?;
        for tri in created {
            self.check_consistency(tri)?;
        }

        Ok(())
    }
}
