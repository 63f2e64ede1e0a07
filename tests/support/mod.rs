//! Test support library
//! Provides mesh fixtures & helper functions for the smoothing tests.
#![allow(dead_code)]

use nalgebra::Point3;
use surfsmooth::{SurfaceMesh, float_types::Real};

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

fn p(x: Real, y: Real, z: Real) -> Point3<Real> {
    Point3::new(x, y, z)
}

/// Unit hexagon ring (vertices 1..=6) around a center vertex 0 at `center`.
///
/// Ring edges are boundary edges, so only the center is ever smoothed. With
/// the center at `(0.75, 0, 0)` two triangles have a 13.9° angle and the
/// area-weighted centroid of the fan is exactly the origin.
pub fn hex_fan(center: Point3<Real>) -> (Vec<Point3<Real>>, Vec<[usize; 3]>) {
    let mut positions = vec![center];
    for k in 0..6 {
        let angle = k as Real * surfsmooth::float_types::PI / 3.0;
        positions.push(p(angle.cos(), angle.sin(), 0.0));
    }
    let triangles = (0..6).map(|i| [0, 1 + i, 1 + (i + 1) % 6]).collect();
    (positions, triangles)
}

pub fn hex_fan_mesh(center: Point3<Real>) -> SurfaceMesh {
    let (positions, triangles) = hex_fan(center);
    SurfaceMesh::new(positions, triangles).unwrap()
}

/// The standard badly-shaped hex fan, center at `(0.75, 0, 0)`.
pub fn skewed_hex_fan() -> SurfaceMesh {
    hex_fan_mesh(p(0.75, 0.0, 0.0))
}

/// Skewed hex fan plus a thin triangle standing in the plane `x = 0.4`
/// across the path of the center vertex (vertices 7, 8, 9; triangle 6).
pub fn hex_fan_with_obstacle() -> SurfaceMesh {
    let (mut positions, mut triangles) = hex_fan(p(0.75, 0.0, 0.0));
    positions.extend([p(0.4, -0.05, -0.5), p(0.4, 0.05, -0.5), p(0.4, 0.0, 0.5)]);
    triangles.push([7, 8, 9]);
    SurfaceMesh::new(positions, triangles).unwrap()
}

/// Vertex 0 on a crease along the x axis between two sheets.
///
/// Ring vertices 2 and 4 sit at `(0, ±spread, -1)`. With `spread = 1` the
/// sheets meet at a right angle; small spreads fold them nearly shut.
/// Vertex 0 sits at `(0.8, 0, 0)`, giving 5.8° slivers next to vertex 1.
pub fn crease_fan(spread: Real) -> SurfaceMesh {
    SurfaceMesh::new(
        vec![
            p(0.8, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, spread, -1.0),
            p(-1.0, 0.0, 0.0),
            p(0.0, -spread, -1.0),
        ],
        vec![[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 1]],
    )
    .unwrap()
}

/// Three mutually orthogonal faces meeting at vertex 0, each with an 11° angle.
pub fn skewed_corner() -> SurfaceMesh {
    SurfaceMesh::new(
        vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 0.2, 0.0),
            p(0.0, 0.0, 1.0),
        ],
        vec![[0, 1, 2], [0, 2, 3], [0, 3, 1]],
    )
    .unwrap()
}

/// Regular octahedron, outward-wound.
pub fn octahedron() -> (Vec<Point3<Real>>, Vec<[usize; 3]>) {
    let positions = vec![
        p(1.0, 0.0, 0.0),
        p(-1.0, 0.0, 0.0),
        p(0.0, 1.0, 0.0),
        p(0.0, -1.0, 0.0),
        p(0.0, 0.0, 1.0),
        p(0.0, 0.0, -1.0),
    ];
    let triangles = vec![
        [0, 2, 4],
        [2, 1, 4],
        [1, 3, 4],
        [3, 0, 4],
        [2, 0, 5],
        [1, 2, 5],
        [3, 1, 5],
        [0, 3, 5],
    ];
    (positions, triangles)
}

pub fn octahedron_mesh() -> SurfaceMesh {
    let (positions, triangles) = octahedron();
    SurfaceMesh::new(positions, triangles).unwrap()
}

/// Octahedron plus two needle triangles (vertices 6..=9, triangles 8 and 9)
/// sharing the edge (6, 7), each with a 1.15° angle.
pub fn octahedron_with_needles() -> SurfaceMesh {
    let (mut positions, mut triangles) = octahedron();
    positions.extend([
        p(10.0, 0.0, 0.0),
        p(11.0, 0.0, 0.0),
        p(10.5, 0.01, 0.0),
        p(10.5, -0.01, 0.0),
    ]);
    triangles.extend([[6, 7, 8], [7, 6, 9]]);
    SurfaceMesh::new(positions, triangles).unwrap()
}

/// Minor-ring count of the default [`skewed_torus`].
pub const TORUS_MINOR: usize = 16;

/// Id of the vertex at major step `i` and minor step `j` of a torus with `n_minor` rings.
pub const fn torus_vertex(i: usize, j: usize, n_minor: usize) -> usize {
    i * n_minor + j
}

/// Closed torus, major radius 2.5 and minor radius 1, outward-wound.
///
/// Each `(i, j, fraction)` in `skews` slides vertex `(i, j)` that fraction of
/// a major step towards `(i + 1, j)`. Unskewed, every angle lies between 23°
/// and 98° and no adjacent normals differ by more than 23°.
pub fn torus(
    n_major: usize,
    n_minor: usize,
    skews: &[(usize, usize, Real)],
) -> (Vec<Point3<Real>>, Vec<[usize; 3]>) {
    let tau = 2.0 * surfsmooth::float_types::PI;
    let mut positions = Vec::with_capacity(n_major * n_minor);
    for i in 0..n_major {
        for j in 0..n_minor {
            let shift = skews
                .iter()
                .find(|&&(si, sj, _)| (si, sj) == (i, j))
                .map_or(0.0, |&(_, _, fraction)| fraction);
            let u = tau * (i as Real + shift) / n_major as Real;
            let w = tau * j as Real / n_minor as Real;
            let ring = 2.5 + w.cos();
            positions.push(p(ring * u.cos(), ring * u.sin(), w.sin()));
        }
    }

    let mut triangles = Vec::with_capacity(2 * n_major * n_minor);
    for i in 0..n_major {
        for j in 0..n_minor {
            let a = torus_vertex(i, j, n_minor);
            let b = torus_vertex((i + 1) % n_major, j, n_minor);
            let c = torus_vertex((i + 1) % n_major, (j + 1) % n_minor, n_minor);
            let d = torus_vertex(i, (j + 1) % n_minor, n_minor);
            triangles.extend([[a, b, c], [a, c, d]]);
        }
    }
    (positions, triangles)
}

pub fn torus_mesh(n_major: usize, n_minor: usize) -> SurfaceMesh {
    let (positions, triangles) = torus(n_major, n_minor, &[]);
    SurfaceMesh::new(positions, triangles).unwrap()
}

/// 24 × [`TORUS_MINOR`] torus with the given vertices slid along the major direction.
pub fn skewed_torus(skews: &[(usize, usize, Real)]) -> SurfaceMesh {
    let (positions, triangles) = torus(24, TORUS_MINOR, skews);
    SurfaceMesh::new(positions, triangles).unwrap()
}
