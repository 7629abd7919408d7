//! Triangle meshes used as obstacles and as waypoint sources.
//!
//! Faces keep their neighbors as indices into the owning [`TriangleMesh`], so the
//! graph is built once and shared read-only afterwards.

pub mod triangle;
pub use triangle::{ClosestPoint, SegmentDistance, Triangle};


use crate::geometry::{Aabb, Point3};
use std::collections::HashMap;
use tracing::debug;

type VertexKey = [u64; 3];

fn vertex_key(p: &Point3) -> VertexKey {
    // +0.0 and -0.0 must map to the same vertex
    [(p.x + 0.0).to_bits(), (p.y + 0.0).to_bits(), (p.z + 0.0).to_bits()]
}

#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
    neighbors: Vec<Vec<usize>>,
}

impl TriangleMesh {
    /// Builds the mesh and its edge adjacency. Faces are neighbors when they
    /// share two vertices with bitwise identical coordinates.
    pub fn new(triangles: Vec<Triangle>) -> Self {
        let mut edges: HashMap<(VertexKey, VertexKey), Vec<usize>> = HashMap::new();

        for (idx, tri) in triangles.iter().enumerate() {
            let keys = [vertex_key(&tri.a), vertex_key(&tri.b), vertex_key(&tri.c)];
            for k in 0..3 {
                let (p, q) = (keys[k], keys[(k + 1) % 3]);
                let edge = if p <= q { (p, q) } else { (q, p) };
                edges.entry(edge).or_default().push(idx);
            }
        }

        let mut neighbors = vec![Vec::new(); triangles.len()];
        for faces in edges.values() {
            for &i in faces {
                for &j in faces {
                    if i != j && !neighbors[i].contains(&j) {
                        neighbors[i].push(j);
                    }
                }
            }
        }
        for list in neighbors.iter_mut() {
            list.sort_unstable();
        }

        debug!(triangles = triangles.len(), shared_edges = edges.len(), "built triangle mesh");
        Self { triangles, neighbors }
    }

    /// Builds a mesh from a vertex buffer and triangle index triples.
    /// Triples referencing missing vertices are skipped.
    pub fn from_indexed(positions: &[Point3], indices: &[[usize; 3]]) -> Self {
        let triangles = indices
            .iter()
            .filter(|idx| idx.iter().all(|&i| i < positions.len()))
            .map(|idx| Triangle::new(positions[idx[0]], positions[idx[1]], positions[idx[2]]))
            .collect();
        Self::new(triangles)
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Triangle> {
        self.triangles.get(idx)
    }

    /// Indices of the faces sharing an edge with face `idx`.
    pub fn neighbors(&self, idx: usize) -> &[usize] {
        self.neighbors.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::empty();
        for tri in &self.triangles {
            for v in tri.vertices().iter() {
                bounds.extend(v);
            }
        }
        bounds
    }

    /// First face that comes closer than `clearance` to the segment `e-f`.
    pub fn first_obstruction(&self, e: &Point3, f: &Point3, clearance: f64) -> Option<(usize, SegmentDistance)> {
        self.triangles.iter().enumerate().find_map(|(idx, tri)| {
            tri.distance_to_segment(e, f, clearance)
                .filter(|res| res.distance < clearance)
                .map(|res| (idx, res))
        })
    }

    /// Faces touching or inside the box.
    pub fn faces_in_box(&self, bx: &Aabb) -> Vec<usize> {
        self.triangles
            .iter()
            .enumerate()
            .filter(|(_, tri)| tri.intersects_box(bx))
            .map(|(idx, _)| idx)
            .collect()
    }
}
