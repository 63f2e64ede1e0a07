//! Per-triangle area/normal/centroid cache kept in sync during a pass

use crate::float_types::{Real, TINY_TRIANGLE_AREA_SQUARED};
use crate::mesh::SurfaceMesh;
use nalgebra::{Point3, Vector3};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Cached triangle quantities, indexed by triangle id.
///
/// Tombstoned triangles always hold zero area, a zero normal and a centroid at
/// the origin. The smoothing pass refreshes the entries of every triangle
/// incident to a vertex right after that vertex moves, so later vertices in
/// the same pass always read geometry consistent with committed positions.
#[derive(Debug, Clone, Default)]
pub struct TriangleCache {
    areas: Vec<Real>,
    normals: Vec<Vector3<Real>>,
    centroids: Vec<Point3<Real>>,
}

impl TriangleCache {
    /// Compute every entry from the mesh's committed positions.
    pub fn build(mesh: &SurfaceMesh, verbose: bool) -> Self {
        let triangles: Vec<usize> = (0..mesh.num_triangles()).collect();

        #[cfg(feature = "parallel")]
        let entries: Vec<(Real, Vector3<Real>, Point3<Real>)> = triangles
            .par_iter()
            .map(|&t| Self::entry(mesh, t, verbose))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let entries: Vec<(Real, Vector3<Real>, Point3<Real>)> = triangles
            .iter()
            .map(|&t| Self::entry(mesh, t, verbose))
            .collect();

        let mut cache = TriangleCache {
            areas: Vec::with_capacity(entries.len()),
            normals: Vec::with_capacity(entries.len()),
            centroids: Vec::with_capacity(entries.len()),
        };
        for (area, normal, centroid) in entries {
            cache.areas.push(area);
            cache.normals.push(normal);
            cache.centroids.push(centroid);
        }
        cache
    }

    fn entry(mesh: &SurfaceMesh, t: usize, verbose: bool) -> (Real, Vector3<Real>, Point3<Real>) {
        if mesh.triangle_is_deleted(t) {
            return (0.0, Vector3::zeros(), Point3::origin());
        }

        let area = mesh.triangle_area(t);
        if verbose && 4.0 * area * area < TINY_TRIANGLE_AREA_SQUARED {
            debug!(triangle = t, area, "near-zero-area triangle");
        }

        (area, mesh.triangle_normal(t), mesh.triangle_centroid(t))
    }

    /// Recompute the entries of `triangles` from committed positions.
    pub fn refresh(&mut self, mesh: &SurfaceMesh, triangles: &[usize], verbose: bool) {
        for &t in triangles {
            let (area, normal, centroid) = Self::entry(mesh, t, verbose);
            self.areas[t] = area;
            self.normals[t] = normal;
            self.centroids[t] = centroid;
        }
    }

    /// Commit a new position for `v` and refresh every triangle incident to it.
    pub fn commit_position(
        &mut self,
        mesh: &mut SurfaceMesh,
        v: usize,
        position: Point3<Real>,
        verbose: bool,
    ) {
        mesh.set_position(v, position);
        self.refresh(mesh, mesh.vertex_triangles(v), verbose);
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn area(&self, t: usize) -> Real {
        self.areas[t]
    }

    pub fn normal(&self, t: usize) -> &Vector3<Real> {
        &self.normals[t]
    }

    pub fn centroid(&self, t: usize) -> &Point3<Real> {
        &self.centroids[t]
    }

    pub fn areas(&self) -> &[Real] {
        &self.areas
    }

    pub fn normals(&self) -> &[Vector3<Real>] {
        &self.normals
    }

    pub fn centroids(&self) -> &[Point3<Real>] {
        &self.centroids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use tracing::{
        Event, Level, Metadata, Subscriber,
        span::{Attributes, Id, Record},
    };

    /// Counts debug-level events and ignores everything else.
    struct DebugEvents(Arc<AtomicUsize>);

    impl Subscriber for DebugEvents {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _span: &Attributes<'_>) -> Id {
            Id::from_u64(1)
        }

        fn record(&self, _span: &Id, _values: &Record<'_>) {}

        fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

        fn event(&self, event: &Event<'_>) {
            if *event.metadata().level() == Level::DEBUG {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn enter(&self, _span: &Id) {}

        fn exit(&self, _span: &Id) {}
    }

    /// Debug events emitted while collapsing triangle 0 through a committed move.
    fn debug_events_for_collapse(verbose: bool) -> usize {
        let mut mesh = SurfaceMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let mut cache = TriangleCache::build(&mesh, false);

        let count = Arc::new(AtomicUsize::new(0));
        tracing::subscriber::with_default(DebugEvents(Arc::clone(&count)), || {
            cache.commit_position(&mut mesh, 2, Point3::new(0.5, 1e-9, 0.0), verbose);
        });

        assert!(cache.area(0) < 1e-9);
        count.load(Ordering::SeqCst)
    }

    #[test]
    fn committed_sliver_is_reported_when_verbose() {
        assert!(debug_events_for_collapse(true) >= 1);
        assert_eq!(debug_events_for_collapse(false), 0);
    }

    #[test]
    fn tombstones_are_zeroed_and_refresh_tracks_moves() {
        let mut mesh = SurfaceMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(5.0, 5.0, 5.0),
            ],
            vec![[0, 1, 2], [3, 3, 1]],
        )
        .unwrap();

        let mut cache = TriangleCache::build(&mesh, true);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.area(1), 0.0);
        assert_eq!(*cache.normal(1), Vector3::zeros());
        assert_eq!(*cache.centroid(1), Point3::origin());

        cache.commit_position(&mut mesh, 1, Point3::new(2.0, 0.0, 0.0), false);
        assert_eq!(mesh.position(1), Point3::new(2.0, 0.0, 0.0));
        assert!((cache.area(0) - 1.0).abs() < 1e-12);
        assert_eq!(*cache.normal(0), Vector3::z());
        assert_eq!(cache.area(1), 0.0);
    }
}
