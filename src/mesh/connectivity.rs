//! Incidence maps for an indexed triangle mesh

use std::collections::HashMap;

/// Vertex/edge/triangle incidence built once from a triangle list.
///
/// Edges are unordered vertex pairs stored with the smaller index first and
/// numbered in order of first appearance while scanning triangles, so edge ids
/// are deterministic for a given triangle list. Tombstoned triangles (first two
/// indices equal) take no part in incidence.
#[derive(Debug, Clone, Default)]
pub struct Connectivity {
    pub(crate) edges: Vec<[usize; 2]>,
    pub(crate) edge_lookup: HashMap<(usize, usize), usize>,
    pub(crate) vertex_to_triangles: Vec<Vec<usize>>,
    pub(crate) vertex_to_edges: Vec<Vec<usize>>,
    pub(crate) edge_to_triangles: Vec<Vec<usize>>,
}

impl Connectivity {
    pub fn build(num_vertices: usize, triangles: &[[usize; 3]]) -> Self {
        let mut connectivity = Connectivity {
            vertex_to_triangles: vec![Vec::new(); num_vertices],
            vertex_to_edges: vec![Vec::new(); num_vertices],
            ..Default::default()
        };

        for (tri_idx, tri) in triangles.iter().enumerate() {
            if tri[0] == tri[1] {
                continue;
            }

            for &v in tri {
                connectivity.vertex_to_triangles[v].push(tri_idx);
            }

            for i in 0..3 {
                let a = tri[i];
                let b = tri[(i + 1) % 3];
                let edge = connectivity.get_or_insert_edge(a, b);
                connectivity.edge_to_triangles[edge].push(tri_idx);
            }
        }

        connectivity
    }

    fn get_or_insert_edge(&mut self, a: usize, b: usize) -> usize {
        // Canonical edge representation (smaller index first)
        let key = if a < b { (a, b) } else { (b, a) };
        if let Some(&edge) = self.edge_lookup.get(&key) {
            return edge;
        }

        let edge = self.edges.len();
        self.edges.push([key.0, key.1]);
        self.edge_to_triangles.push(Vec::new());
        self.edge_lookup.insert(key, edge);
        self.vertex_to_edges[key.0].push(edge);
        if key.1 != key.0 {
            self.vertex_to_edges[key.1].push(edge);
        }
        edge
    }

    /// Edge id joining `a` and `b`, if any live triangle uses it.
    pub fn find_edge(&self, a: usize, b: usize) -> Option<usize> {
        let key = if a < b { (a, b) } else { (b, a) };
        self.edge_lookup.get(&key).copied()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tetrahedron_incidence() {
        let tris = [[0, 1, 2], [0, 3, 1], [1, 3, 2], [2, 3, 0]];
        let conn = Connectivity::build(4, &tris);

        assert_eq!(conn.num_edges(), 6);
        for v in 0..4 {
            assert_eq!(conn.vertex_to_triangles[v].len(), 3);
            assert_eq!(conn.vertex_to_edges[v].len(), 3);
        }
        for tris in &conn.edge_to_triangles {
            assert_eq!(tris.len(), 2);
        }
        assert_eq!(conn.find_edge(3, 0), conn.find_edge(0, 3));
    }

    #[test]
    fn tombstoned_triangles_are_ignored() {
        let tris = [[0, 1, 2], [1, 1, 3]];
        let conn = Connectivity::build(4, &tris);

        assert_eq!(conn.num_edges(), 3);
        assert!(conn.vertex_to_triangles[3].is_empty());
        assert!(conn.find_edge(1, 3).is_none());
    }
}
