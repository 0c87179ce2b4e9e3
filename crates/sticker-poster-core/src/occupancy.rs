use crate::error::{PosterError, Result};
use crate::model::PlacementRegion;

/// Append-only record of committed regions on one canvas.
///
/// Regions are bucketed into a uniform grid of `cell x cell` pixel cells so an
/// overlap query only tests regions sharing a cell with the query box.
#[derive(Debug, Clone)]
pub struct OccupancyIndex {
    width: u32,
    height: u32,
    cell: u32,
    cols: u32,
    rows: u32,
    regions: Vec<PlacementRegion>,
    buckets: Vec<Vec<usize>>,
    center_sum: (f64, f64),
}

impl OccupancyIndex {
    pub fn new(width: u32, height: u32, cell: u32) -> Self {
        let cell = cell.max(1);
        let cols = width.div_ceil(cell).max(1);
        let rows = height.div_ceil(cell).max(1);
        Self {
            width,
            height,
            cell,
            cols,
            rows,
            regions: Vec::new(),
            buckets: vec![Vec::new(); (cols as usize) * (rows as usize)],
            center_sum: (0.0, 0.0),
        }
    }

    pub fn regions(&self) -> &[PlacementRegion] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn covered_area(&self) -> u64 {
        self.regions.iter().map(|r| r.area()).sum()
    }

    /// True if `region`, grown by `spacing`, touches any committed region.
    pub fn overlaps(&self, region: &PlacementRegion, spacing: u32) -> bool {
        self.first_conflict(region, spacing).is_some()
    }

    /// Index of the first committed region intersecting `region` grown by `spacing`.
    pub fn first_conflict(&self, region: &PlacementRegion, spacing: u32) -> Option<usize> {
        let query = PlacementRegion::new(
            region.x1.saturating_sub(spacing),
            region.y1.saturating_sub(spacing),
            region.x2.saturating_add(spacing),
            region.y2.saturating_add(spacing),
        );
        let (cx1, cy1, cx2, cy2) = self.cell_span(&query)?;
        for cy in cy1..=cy2 {
            for cx in cx1..=cx2 {
                let bucket = &self.buckets[(cy * self.cols + cx) as usize];
                if let Some(&idx) = bucket
                    .iter()
                    .find(|&&i| region.intersects(&self.regions[i], spacing))
                {
                    return Some(idx);
                }
            }
        }
        None
    }

    /// Commits `region`. Fails if it leaves the canvas or overlaps a committed region.
    pub fn insert(&mut self, region: PlacementRegion) -> Result<usize> {
        if !region.within(self.width, self.height) {
            return Err(PosterError::OutOfBounds {
                region,
                width: self.width,
                height: self.height,
            });
        }
        if let Some(existing) = self.first_conflict(&region, 0) {
            return Err(PosterError::RegionConflict { region, existing });
        }
        let idx = self.regions.len();
        if let Some((cx1, cy1, cx2, cy2)) = self.cell_span(&region) {
            for cy in cy1..=cy2 {
                for cx in cx1..=cx2 {
                    self.buckets[(cy * self.cols + cx) as usize].push(idx);
                }
            }
        }
        let (x, y) = region.center();
        self.center_sum.0 += x;
        self.center_sum.1 += y;
        self.regions.push(region);
        Ok(idx)
    }

    /// Mean of committed region centers.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.regions.is_empty() {
            return None;
        }
        let n = self.regions.len() as f64;
        Some((self.center_sum.0 / n, self.center_sum.1 / n))
    }

    /// Euclidean distance from `point` to the closest committed region center.
    pub fn nearest_center_distance(&self, point: (f64, f64)) -> Option<f64> {
        self.regions
            .iter()
            .map(|r| distance(point, r.center()))
            .min_by(|a, b| a.total_cmp(b))
    }

    // Inclusive cell range covered by a non-empty region, clamped to the grid.
    fn cell_span(&self, r: &PlacementRegion) -> Option<(u32, u32, u32, u32)> {
        if r.x2 <= r.x1 || r.y2 <= r.y1 {
            return None;
        }
        let cx1 = (r.x1 / self.cell).min(self.cols - 1);
        let cy1 = (r.y1 / self.cell).min(self.rows - 1);
        let cx2 = ((r.x2 - 1) / self.cell).min(self.cols - 1);
        let cy2 = ((r.y2 - 1) / self.cell).min(self.rows - 1);
        Some((cx1, cy1, cx2, cy2))
    }
}

pub fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_regions_do_not_conflict() {
        let mut occ = OccupancyIndex::new(100, 100, 16);
        occ.insert(PlacementRegion::from_xywh(0, 0, 10, 10)).unwrap();
        assert!(!occ.overlaps(&PlacementRegion::from_xywh(10, 0, 10, 10), 0));
        assert!(occ.overlaps(&PlacementRegion::from_xywh(10, 0, 10, 10), 1));
        assert!(occ.overlaps(&PlacementRegion::from_xywh(9, 9, 10, 10), 0));
    }

    #[test]
    fn insert_rejects_overlap_and_out_of_bounds() {
        let mut occ = OccupancyIndex::new(64, 64, 8);
        assert_eq!(occ.insert(PlacementRegion::from_xywh(4, 4, 20, 20)).unwrap(), 0);
        assert!(matches!(
            occ.insert(PlacementRegion::from_xywh(10, 10, 5, 5)),
            Err(PosterError::RegionConflict { existing: 0, .. })
        ));
        assert!(matches!(
            occ.insert(PlacementRegion::from_xywh(60, 60, 8, 8)),
            Err(PosterError::OutOfBounds { .. })
        ));
        assert_eq!(occ.len(), 1);
    }

    #[test]
    fn large_region_spanning_many_cells_is_found() {
        let mut occ = OccupancyIndex::new(512, 512, 32);
        occ.insert(PlacementRegion::from_xywh(0, 0, 500, 500)).unwrap();
        assert!(occ.overlaps(&PlacementRegion::from_xywh(480, 480, 10, 10), 0));
        assert!(!occ.overlaps(&PlacementRegion::from_xywh(500, 0, 12, 12), 0));
    }

    #[test]
    fn centroid_and_nearest_distance() {
        let mut occ = OccupancyIndex::new(100, 100, 10);
        assert_eq!(occ.centroid(), None);
        occ.insert(PlacementRegion::from_xywh(0, 0, 10, 10)).unwrap();
        occ.insert(PlacementRegion::from_xywh(20, 0, 10, 10)).unwrap();
        assert_eq!(occ.centroid(), Some((15.0, 5.0)));
        let d = occ.nearest_center_distance((25.0, 9.0)).unwrap();
        assert!((d - 4.0).abs() < 1e-9);
        assert_eq!(occ.covered_area(), 200);
    }
}
