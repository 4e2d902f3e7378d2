//! Nearest-anchor lookup
//!
//! Anchors are indexed by position only; filtering on occupancy or category is the
//! caller's job. Two implementations are provided and must answer identically:
//! [`LinearIndex`] for the handful of anchors a typical task has, and
//! [`GridIndex`] for dense panels.

use std::collections::HashMap;
use std::fmt::Debug;

use skillbench_config::IndexSettings;
use skillbench_spatial::Point3D;

use crate::ids::AnchorId;

/// Spatial index over anchor positions
pub trait ProximityIndex: Debug {
    fn insert(&mut self, id: AnchorId, position: Point3D);

    fn remove(&mut self, id: AnchorId) -> bool;

    /// Push every anchor within `radius` of `position` onto `out` together with
    /// its squared distance. Order is unspecified.
    fn candidates_within(&self, position: Point3D, radius: f32, out: &mut Vec<(AnchorId, f32)>);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the index selected in settings
pub fn index_for(settings: &IndexSettings) -> Box<dyn ProximityIndex> {
    match settings {
        IndexSettings::Linear => Box::new(LinearIndex::default()),
        IndexSettings::Grid { cell_size } => Box::new(GridIndex::new(*cell_size)),
    }
}

/// Pick the closest candidate. Equal distances go to the lower id, which is the
/// earlier registration.
pub fn nearest_of<K: Ord + Copy>(candidates: impl IntoIterator<Item = (K, f32)>) -> Option<(K, f32)> {
    candidates.into_iter().fold(None, |best, (id, dist_sq)| match best {
        Some((best_id, best_dist)) if best_dist < dist_sq || (best_dist == dist_sq && best_id < id) => {
            Some((best_id, best_dist))
        }
        _ => Some((id, dist_sq)),
    })
}

/// Flat list scanned in registration order
#[derive(Debug, Default)]
pub struct LinearIndex {
    entries: Vec<(AnchorId, Point3D)>,
}

impl ProximityIndex for LinearIndex {
    fn insert(&mut self, id: AnchorId, position: Point3D) {
        self.remove(id);
        self.entries.push((id, position));
    }

    fn remove(&mut self, id: AnchorId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    fn candidates_within(&self, position: Point3D, radius: f32, out: &mut Vec<(AnchorId, f32)>) {
        let limit = radius * radius;
        out.extend(
            self.entries
                .iter()
                .map(|(id, p)| (*id, p.distance_squared(&position)))
                .filter(|(_, dist_sq)| *dist_sq <= limit),
        );
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

type Cell = (i32, i32, i32);

/// Uniform hash grid. Queries visit only the cells overlapping the query sphere's
/// bounding box.
#[derive(Debug)]
pub struct GridIndex {
    cell_size: f32,
    cells: HashMap<Cell, Vec<(AnchorId, Point3D)>>,
    positions: HashMap<AnchorId, Point3D>,
}

impl GridIndex {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            positions: HashMap::new(),
        }
    }

    fn cell_of(&self, p: Point3D) -> Cell {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
            (p.z / self.cell_size).floor() as i32,
        )
    }

    fn scan_all(&self, position: Point3D, limit: f32, out: &mut Vec<(AnchorId, f32)>) {
        out.extend(
            self.positions
                .iter()
                .map(|(id, p)| (*id, p.distance_squared(&position)))
                .filter(|(_, dist_sq)| *dist_sq <= limit),
        );
    }
}

impl ProximityIndex for GridIndex {
    fn insert(&mut self, id: AnchorId, position: Point3D) {
        self.remove(id);
        let cell = self.cell_of(position);
        self.cells.entry(cell).or_default().push((id, position));
        self.positions.insert(id, position);
    }

    fn remove(&mut self, id: AnchorId) -> bool {
        let Some(position) = self.positions.remove(&id) else {
            return false;
        };
        let cell = self.cell_of(position);
        if let Some(bucket) = self.cells.get_mut(&cell) {
            bucket.retain(|(existing, _)| *existing != id);
            if bucket.is_empty() {
                self.cells.remove(&cell);
            }
        }
        true
    }

    fn candidates_within(&self, position: Point3D, radius: f32, out: &mut Vec<(AnchorId, f32)>) {
        let limit = radius * radius;
        let span = (radius / self.cell_size).ceil();
        // Huge radii would walk more cells than there are anchors.
        if !span.is_finite() || span * span * span > self.positions.len() as f32 * 8.0 {
            self.scan_all(position, limit, out);
            return;
        }

        let min = self.cell_of(Point3D::new(position.x - radius, position.y - radius, position.z - radius));
        let max = self.cell_of(Point3D::new(position.x + radius, position.y + radius, position.z + radius));
        for x in min.0..=max.0 {
            for y in min.1..=max.1 {
                for z in min.2..=max.2 {
                    let Some(bucket) = self.cells.get(&(x, y, z)) else {
                        continue;
                    };
                    out.extend(
                        bucket
                            .iter()
                            .map(|(id, p)| (*id, p.distance_squared(&position)))
                            .filter(|(_, dist_sq)| *dist_sq <= limit),
                    );
                }
            }
        }
    }

    fn len(&self) -> usize {
        self.positions.len()
    }
}
