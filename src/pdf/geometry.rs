//! Ruled-line table detection.
//!
//! Works purely on page geometry: axis-aligned edges from painted paths and
//! positioned chars, all in top-left page coordinates. Edges are snapped,
//! joined and intersected; the smallest rectangles whose corners are
//! connected intersections become cells, and cells sharing corners become
//! tables.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::options::{TableSettings, TextTolerance};
use super::text::extract_text;

/// Axis-aligned rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    /// Create a rectangle.
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            top: self.top.min(other.top),
            x1: self.x1.max(other.x1),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Whether the centre of `ch` lies inside (right and bottom edges open).
    pub fn contains_center(&self, ch: &Char) -> bool {
        let h_mid = (ch.x0 + ch.x1) / 2.0;
        let v_mid = (ch.top + ch.bottom) / 2.0;
        h_mid >= self.x0 && h_mid < self.x1 && v_mid >= self.top && v_mid < self.bottom
    }
}

/// One positioned glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Char {
    pub text: String,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Char {
    /// Create a char from its box.
    pub fn new(text: impl Into<String>, x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            text: text.into(),
            x0,
            x1,
            top,
            bottom,
        }
    }

    /// Whether the glyph is whitespace only.
    pub fn is_blank(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }

    /// Whether every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.x1.is_finite() && self.top.is_finite() && self.bottom.is_finite()
    }
}

/// Direction of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// An axis-aligned straight line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub orientation: Orientation,
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl Edge {
    /// Horizontal edge at `y` between `xa` and `xb`.
    pub fn horizontal(xa: f64, xb: f64, y: f64) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            x0: xa.min(xb),
            top: y,
            x1: xa.max(xb),
            bottom: y,
        }
    }

    /// Vertical edge at `x` between `ya` and `yb`.
    pub fn vertical(x: f64, ya: f64, yb: f64) -> Self {
        Self {
            orientation: Orientation::Vertical,
            x0: x,
            top: ya.min(yb),
            x1: x,
            bottom: ya.max(yb),
        }
    }

    /// Length along the edge's own axis.
    pub fn length(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.x1 - self.x0,
            Orientation::Vertical => self.bottom - self.top,
        }
    }

    /// Coordinate on the cross axis.
    fn position(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.top,
            Orientation::Vertical => self.x0,
        }
    }

    fn start(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.x0,
            Orientation::Vertical => self.top,
        }
    }

    fn end(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.x1,
            Orientation::Vertical => self.bottom,
        }
    }

    fn set_end(&mut self, value: f64) {
        match self.orientation {
            Orientation::Horizontal => self.x1 = value,
            Orientation::Vertical => self.bottom = value,
        }
    }

    fn shift(&mut self, delta: f64) {
        match self.orientation {
            Orientation::Horizontal => {
                self.top += delta;
                self.bottom += delta;
            }
            Orientation::Vertical => {
                self.x0 += delta;
                self.x1 += delta;
            }
        }
    }

    fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.x1.is_finite() && self.top.is_finite() && self.bottom.is_finite()
    }
}

/// Geometry that cannot be reasoned about.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("non-finite coordinate in {0}")]
    NonFinite(&'static str),
}

/// Group values whose sorted sequence advances by at most `tolerance` per
/// step. Returns indices into `values`, clusters in ascending value order,
/// indices within a cluster in input order.
pub(crate) fn cluster_indices(values: &[f64], tolerance: f64) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut clusters: Vec<Vec<usize>> = Vec::new();
    let mut last: Option<f64> = None;
    for i in order {
        let value = values[i];
        match (last, clusters.last_mut()) {
            (Some(prev), Some(cluster)) if value <= prev + tolerance => cluster.push(i),
            _ => clusters.push(vec![i]),
        }
        last = Some(value);
    }

    for cluster in &mut clusters {
        cluster.sort_unstable();
    }
    clusters
}

/// A group of cells sharing corners.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateTable {
    cells: Vec<BBox>,
}

impl CandidateTable {
    /// Build a table from its cells.
    pub fn new(cells: Vec<BBox>) -> Self {
        Self { cells }
    }

    /// The table's cells in detection order.
    pub fn cells(&self) -> &[BBox] {
        &self.cells
    }

    /// Bounding box of all cells.
    pub fn bbox(&self) -> BBox {
        let mut iter = self.cells.iter();
        let first = iter.next().copied().unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0));
        iter.fold(first, |acc, cell| acc.union(cell))
    }

    /// Cells laid out on a grid: rows by cell top, columns by the table's
    /// distinct cell lefts. `None` marks a grid slot without a cell.
    pub fn rows(&self) -> Vec<Vec<Option<BBox>>> {
        let mut sorted = self.cells.clone();
        sorted.sort_by(|a, b| a.top.total_cmp(&b.top).then(a.x0.total_cmp(&b.x0)));

        let mut xs: Vec<f64> = self.cells.iter().map(|c| c.x0).collect();
        xs.sort_by(f64::total_cmp);
        xs.dedup();

        let mut rows = Vec::new();
        let mut start = 0;
        while start < sorted.len() {
            let top = sorted[start].top;
            let end = sorted[start..]
                .iter()
                .position(|c| c.top != top)
                .map_or(sorted.len(), |n| start + n);
            let group = &sorted[start..end];
            rows.push(
                xs.iter()
                    .map(|x| group.iter().rev().find(|c| c.x0 == *x).copied())
                    .collect(),
            );
            start = end;
        }
        rows
    }

    /// Cell text of every grid slot.
    pub fn extract(&self, chars: &[Char], tolerance: TextTolerance) -> Vec<Vec<Option<String>>> {
        self.rows()
            .into_iter()
            .map(|row| {
                let row_box = row
                    .iter()
                    .flatten()
                    .copied()
                    .reduce(|acc, cell| acc.union(&cell));
                let row_chars: Vec<&Char> = match row_box {
                    Some(bbox) => chars.iter().filter(|c| bbox.contains_center(c)).collect(),
                    None => Vec::new(),
                };

                row.iter()
                    .map(|slot| {
                        slot.map(|cell| {
                            let cell_chars: Vec<&Char> = row_chars
                                .iter()
                                .copied()
                                .filter(|c| cell.contains_center(c))
                                .collect();
                            extract_text(cell_chars, tolerance)
                        })
                    })
                    .collect()
            })
            .collect()
    }
}

/// Finds ruled-line tables in page geometry.
#[derive(Debug, Clone, Default)]
pub struct GeometryDetector {
    settings: TableSettings,
}

type PointKey = (u64, u64);

fn point_key(x: f64, y: f64) -> PointKey {
    // Adding 0.0 folds -0.0 into 0.0.
    ((x + 0.0).to_bits(), (y + 0.0).to_bits())
}

struct Intersections {
    /// Vertices sorted by (x, y)
    points: Vec<(f64, f64)>,
    index: HashMap<PointKey, usize>,
    vertical: Vec<HashSet<usize>>,
    horizontal: Vec<HashSet<usize>>,
}

impl Intersections {
    fn connects(&self, a: usize, b: usize) -> bool {
        let (pa, pb) = (self.points[a], self.points[b]);
        if pa.0 == pb.0 && !self.vertical[a].is_disjoint(&self.vertical[b]) {
            return true;
        }
        pa.1 == pb.1 && !self.horizontal[a].is_disjoint(&self.horizontal[b])
    }
}

impl GeometryDetector {
    /// Create a detector with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with custom settings.
    pub fn with_settings(settings: TableSettings) -> Self {
        Self { settings }
    }

    /// Settings in use.
    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }

    /// Find candidate tables, ordered by their top-most then left-most cell.
    pub fn find_tables(&self, edges: &[Edge]) -> Result<Vec<CandidateTable>, GeometryError> {
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(GeometryError::NonFinite("edge"));
        }

        let edges = self.prepare_edges(edges);
        log::debug!("GeometryDetector: {} edges after merging", edges.len());

        let intersections = self.intersections(&edges);
        log::debug!(
            "GeometryDetector: {} intersections",
            intersections.points.len()
        );

        let cells = find_cells(&intersections);
        let tables = group_cells(cells);
        log::debug!("GeometryDetector: {} candidate tables", tables.len());
        Ok(tables)
    }

    /// Find candidate tables and extract their cell text.
    pub fn extract_tables(
        &self,
        edges: &[Edge],
        chars: &[Char],
    ) -> Result<Vec<(CandidateTable, Vec<Vec<Option<String>>>)>, GeometryError> {
        if chars.iter().any(|c| !c.is_finite()) {
            return Err(GeometryError::NonFinite("char"));
        }
        let tolerance = self.settings.cell_text_tolerance();
        Ok(self
            .find_tables(edges)?
            .into_iter()
            .map(|table| {
                let data = table.extract(chars, tolerance);
                (table, data)
            })
            .collect())
    }

    /// Prefilter, snap, join and filter edges.
    fn prepare_edges(&self, edges: &[Edge]) -> Vec<Edge> {
        let s = &self.settings;
        let edges: Vec<Edge> = edges
            .iter()
            .filter(|e| e.length() >= s.edge_min_length_prefilter)
            .copied()
            .collect();

        let edges = snap_edges(edges, s.snap_tolerance);
        join_edges(edges, s.join_tolerance)
            .into_iter()
            .filter(|e| e.length() >= s.edge_min_length)
            .collect()
    }

    fn intersections(&self, edges: &[Edge]) -> Intersections {
        let tol = self.settings.intersection_tolerance;

        let mut v_edges: Vec<usize> = (0..edges.len())
            .filter(|&i| edges[i].orientation == Orientation::Vertical)
            .collect();
        v_edges.sort_by(|&a, &b| {
            let (a, b) = (&edges[a], &edges[b]);
            a.x0.total_cmp(&b.x0).then(a.top.total_cmp(&b.top))
        });
        let mut h_edges: Vec<usize> = (0..edges.len())
            .filter(|&i| edges[i].orientation == Orientation::Horizontal)
            .collect();
        h_edges.sort_by(|&a, &b| {
            let (a, b) = (&edges[a], &edges[b]);
            a.top.total_cmp(&b.top).then(a.x0.total_cmp(&b.x0))
        });

        let mut found: HashMap<PointKey, (f64, f64, HashSet<usize>, HashSet<usize>)> =
            HashMap::new();
        for &vi in &v_edges {
            let v = &edges[vi];
            for &hi in &h_edges {
                let h = &edges[hi];
                if v.top <= h.top + tol
                    && v.bottom >= h.top - tol
                    && v.x0 >= h.x0 - tol
                    && v.x0 <= h.x1 + tol
                {
                    let entry = found
                        .entry(point_key(v.x0, h.top))
                        .or_insert_with(|| (v.x0, h.top, HashSet::new(), HashSet::new()));
                    entry.2.insert(vi);
                    entry.3.insert(hi);
                }
            }
        }

        let mut entries: Vec<_> = found.into_values().collect();
        entries.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

        let mut result = Intersections {
            points: Vec::with_capacity(entries.len()),
            index: HashMap::with_capacity(entries.len()),
            vertical: Vec::with_capacity(entries.len()),
            horizontal: Vec::with_capacity(entries.len()),
        };
        for (i, (x, y, v, h)) in entries.into_iter().enumerate() {
            result.index.insert(point_key(x, y), i);
            result.points.push((x, y));
            result.vertical.push(v);
            result.horizontal.push(h);
        }
        result
    }
}

/// Move every edge to the mean cross-axis position of its cluster.
fn snap_edges(edges: Vec<Edge>, tolerance: f64) -> Vec<Edge> {
    let (mut vertical, mut horizontal): (Vec<Edge>, Vec<Edge>) = edges
        .into_iter()
        .partition(|e| e.orientation == Orientation::Vertical);

    for group in [&mut vertical, &mut horizontal] {
        let positions: Vec<f64> = group.iter().map(Edge::position).collect();
        for cluster in cluster_indices(&positions, tolerance) {
            let mean = cluster.iter().map(|&i| positions[i]).sum::<f64>() / cluster.len() as f64;
            for i in cluster {
                group[i].shift(mean - positions[i]);
            }
        }
    }

    vertical.extend(horizontal);
    vertical
}

/// Merge collinear edges at the same position whose gap is within `tolerance`.
fn join_edges(mut edges: Vec<Edge>, tolerance: f64) -> Vec<Edge> {
    edges.sort_by(|a, b| {
        a.orientation
            .cmp(&b.orientation)
            .then(a.position().total_cmp(&b.position()))
    });

    let mut joined = Vec::with_capacity(edges.len());
    let mut start = 0;
    while start < edges.len() {
        let (orientation, position) = (edges[start].orientation, edges[start].position());
        let end = edges[start..]
            .iter()
            .position(|e| e.orientation != orientation || e.position() != position)
            .map_or(edges.len(), |n| start + n);

        let mut group = edges[start..end].to_vec();
        group.sort_by(|a, b| a.start().total_cmp(&b.start()));

        let mut current = group[0];
        for edge in &group[1..] {
            if edge.start() <= current.end() + tolerance {
                if edge.end() > current.end() {
                    current.set_end(edge.end());
                }
            } else {
                joined.push(current);
                current = *edge;
            }
        }
        joined.push(current);
        start = end;
    }
    joined
}

/// For each intersection, the smallest cell it is the top-left corner of.
fn find_cells(ix: &Intersections) -> Vec<BBox> {
    let n = ix.points.len();
    let mut cells = Vec::new();

    for i in 0..n {
        let (px, py) = ix.points[i];
        let below: Vec<usize> = (i + 1..n).filter(|&j| ix.points[j].0 == px).collect();
        let right: Vec<usize> = (i + 1..n).filter(|&j| ix.points[j].1 == py).collect();

        'search: for &b in &below {
            if !ix.connects(i, b) {
                continue;
            }
            for &r in &right {
                if !ix.connects(i, r) {
                    continue;
                }
                let corner = (ix.points[r].0, ix.points[b].1);
                if let Some(&c) = ix.index.get(&point_key(corner.0, corner.1)) {
                    if ix.connects(c, r) && ix.connects(c, b) {
                        cells.push(BBox::new(px, py, corner.0, corner.1));
                        break 'search;
                    }
                }
            }
        }
    }
    cells
}

/// Group cells that share corners; single-cell groups are dropped.
fn group_cells(cells: Vec<BBox>) -> Vec<CandidateTable> {
    fn corners(cell: &BBox) -> [PointKey; 4] {
        [
            point_key(cell.x0, cell.top),
            point_key(cell.x0, cell.bottom),
            point_key(cell.x1, cell.top),
            point_key(cell.x1, cell.bottom),
        ]
    }

    let mut remaining = cells;
    let mut tables: Vec<Vec<BBox>> = Vec::new();
    let mut current_cells: Vec<BBox> = Vec::new();
    let mut current_corners: HashSet<PointKey> = HashSet::new();

    while !remaining.is_empty() {
        let before = current_cells.len();
        let mut rest = Vec::with_capacity(remaining.len());
        for cell in remaining {
            let cell_corners = corners(&cell);
            if current_cells.is_empty() || cell_corners.iter().any(|c| current_corners.contains(c))
            {
                current_corners.extend(cell_corners);
                current_cells.push(cell);
            } else {
                rest.push(cell);
            }
        }
        remaining = rest;

        if current_cells.len() == before {
            tables.push(std::mem::take(&mut current_cells));
            current_corners.clear();
        }
    }
    if !current_cells.is_empty() {
        tables.push(current_cells);
    }

    let min_corner = |cells: &[BBox]| {
        cells
            .iter()
            .map(|c| (c.top, c.x0))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)))
            .unwrap_or((0.0, 0.0))
    };
    tables.sort_by(|a, b| {
        let (ka, kb) = (min_corner(a), min_corner(b));
        ka.0.total_cmp(&kb.0).then(ka.1.total_cmp(&kb.1))
    });

    tables
        .into_iter()
        .filter(|t| t.len() > 1)
        .map(CandidateTable::new)
        .collect()
}
