//! Intrusive vertex and face lists.
//!
//! The lists only hold head/tail ids; the links live on the records
//! themselves, so a vertex belongs to at most one [`VertexList`] at a time.

use super::{Face, FaceId, Vertex, VertexId};

/// Doubly linked list threaded through [`Vertex::prev`] / [`Vertex::next`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexList {
    head: Option<VertexId>,
    tail: Option<VertexId>,
}

#[inline]
fn vtx(vertices: &mut [Vertex], id: VertexId) -> &mut Vertex {
    &mut vertices[id.0 as usize]
}

impl VertexList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every member without touching their links.
    pub fn clear(&mut self) {
        self.head = None;
        self.tail = None;
    }

    #[inline]
    pub fn first(&self) -> Option<VertexId> {
        self.head
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Appends one vertex.
    pub fn add(&mut self, vertices: &mut [Vertex], v: VertexId) {
        match self.tail {
            None => self.head = Some(v),
            Some(tail) => vtx(vertices, tail).next = Some(v),
        }
        let node = vtx(vertices, v);
        node.prev = self.tail;
        node.next = None;
        self.tail = Some(v);
    }

    /// Appends a chain starting at `v` and running until a vertex with no
    /// `next`.
    pub fn add_range(&mut self, vertices: &mut [Vertex], v: VertexId) {
        match self.tail {
            None => self.head = Some(v),
            Some(tail) => vtx(vertices, tail).next = Some(v),
        }
        vtx(vertices, v).prev = self.tail;
        let mut last = v;
        while let Some(next) = vtx(vertices, last).next {
            last = next;
        }
        self.tail = Some(last);
    }

    /// Unlinks one vertex. Its own links are left dangling.
    pub fn delete(&mut self, vertices: &mut [Vertex], v: VertexId) {
        self.delete_range(vertices, v, v);
    }

    /// Unlinks the run `first..=last`.
    pub fn delete_range(&mut self, vertices: &mut [Vertex], first: VertexId, last: VertexId) {
        let before = vtx(vertices, first).prev;
        let after = vtx(vertices, last).next;

        match before {
            None => self.head = after,
            Some(prev) => vtx(vertices, prev).next = after,
        }
        match after {
            None => self.tail = before,
            Some(next) => vtx(vertices, next).prev = before,
        }
    }

    /// Links `v` directly in front of `next`.
    pub fn insert_before(&mut self, vertices: &mut [Vertex], v: VertexId, next: VertexId) {
        let before = vtx(vertices, next).prev;
        {
            let node = vtx(vertices, v);
            node.prev = before;
            node.next = Some(next);
        }
        match before {
            None => self.head = Some(v),
            Some(prev) => vtx(vertices, prev).next = Some(v),
        }
        vtx(vertices, next).prev = Some(v);
    }

    /// Collects the members in order.
    pub fn to_vec(&self, vertices: &[Vertex]) -> Vec<VertexId> {
        let mut out = Vec::new();
        let mut current = self.head;
        while let Some(v) = current {
            out.push(v);
            if Some(v) == self.tail {
                break;
            }
            current = vertices[v.0 as usize].next;
        }
        out
    }
}

/// Singly linked list threaded through [`Face::next`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FaceList {
    head: Option<FaceId>,
    tail: Option<FaceId>,
}

impl FaceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.head = None;
        self.tail = None;
    }

    #[inline]
    pub fn first(&self) -> Option<FaceId> {
        self.head
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Appends one face.
    pub fn add(&mut self, faces: &mut [Face], f: FaceId) {
        match self.tail {
            None => self.head = Some(f),
            Some(tail) => faces[tail.0 as usize].next = Some(f),
        }
        faces[f.0 as usize].next = None;
        self.tail = Some(f);
    }

    /// Collects the members in order.
    pub fn to_vec(&self, faces: &[Face]) -> Vec<FaceId> {
        let mut out = Vec::new();
        let mut current = self.head;
        while let Some(f) = current {
            out.push(f);
            current = faces[f.0 as usize].next;
        }
        out
    }
}
