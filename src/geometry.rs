use geo::{Area, BooleanOps, BoundingRect, Centroid, Coord, EuclideanDistance, Intersects, Line, LineString, MultiPolygon, Polygon, Translate};
use crate::errors::GeometryError;

/// Builds a simple polygon from an ordered ring of (x, y) vertices in a metre-scale
/// projected coordinate system.
///
/// A closing vertex equal to the first one is optional. Consecutive duplicates are dropped
/// before validation.
///
/// # Arguments
///
/// * 'vertices' - the ring of vertices
pub fn polygon_from_vertices(vertices: &[(f64, f64)]) -> Result<Polygon<f64>, GeometryError> {
    if let Some((x, y)) = vertices.iter().find(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return Err(GeometryError::Parse(format!("non-finite vertex ({}, {})", x, y)));
    }

    let mut ring: Vec<Coord<f64>> = Vec::with_capacity(vertices.len());
    for &(x, y) in vertices {
        let c = Coord { x, y };
        if ring.last() != Some(&c) {
            ring.push(c);
        }
    }
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }

    if ring.len() < 3 {
        return Err(GeometryError::Parse(format!("polygon needs at least 3 distinct vertices, got {}", ring.len())));
    }
    if let Some((i, j)) = first_self_intersection(&ring) {
        return Err(GeometryError::Parse(format!("polygon ring intersects itself between edges {} and {}", i, j)));
    }

    Ok(Polygon::new(LineString::from(ring), vec![]))
}

/// Returns the first pair of non-adjacent ring edges that touch or cross
///
/// # Arguments
///
/// * 'ring' - open ring, i.e. without a repeated closing vertex
fn first_self_intersection(ring: &[Coord<f64>]) -> Option<(usize, usize)> {
    let n = ring.len();
    let edges: Vec<Line<f64>> = (0..n).map(|i| Line::new(ring[i], ring[(i + 1) % n])).collect();

    for i in 0..n {
        for j in (i + 2)..n {
            // First and last edge share the ring's start vertex
            if i == 0 && j == n - 1 {
                continue;
            }
            if edges[i].intersects(&edges[j]) {
                return Some((i, j));
            }
        }
    }

    None
}

/// Area of a polygon in square metres, independent of winding order
pub fn area(polygon: &Polygon<f64>) -> f64 {
    polygon.unsigned_area()
}

/// Translates a polygon by the given offset
pub fn translate(polygon: &Polygon<f64>, dx: f64, dy: f64) -> Polygon<f64> {
    polygon.translate(dx, dy)
}

/// Union of any number of footprints. An empty input gives an empty multipolygon.
///
/// # Arguments
///
/// * 'parts' - footprints to merge
pub fn union_all<'a>(parts: impl IntoIterator<Item = &'a MultiPolygon<f64>>) -> MultiPolygon<f64> {
    parts.into_iter().fold(MultiPolygon::new(Vec::new()), |acc, part| acc.union(part))
}

/// Area of the part of 'polygon' covered by 'cover'
///
/// # Arguments
///
/// * 'polygon' - the surface of interest
/// * 'cover' - the (possibly disjoint) covering footprint
pub fn covered_area(polygon: &Polygon<f64>, cover: &MultiPolygon<f64>) -> f64 {
    if cover.0.is_empty() {
        return 0.0;
    }
    MultiPolygon::new(vec![polygon.clone()]).intersection(cover).unsigned_area()
}

/// Shortest distance between two polygons, zero when they touch or overlap
pub fn distance(a: &Polygon<f64>, b: &Polygon<f64>) -> f64 {
    a.euclidean_distance(b)
}

/// Distance between the centroids of two polygons, or None if either centroid is undefined
pub fn centroid_distance(a: &Polygon<f64>, b: &Polygon<f64>) -> Option<f64> {
    let ca = a.centroid()?;
    let cb = b.centroid()?;

    Some((ca.x() - cb.x()).hypot(ca.y() - cb.y()))
}

/// Length of the bounding box diagonal of a polygon
pub fn diagonal(polygon: &Polygon<f64>) -> f64 {
    polygon
        .bounding_rect()
        .map(|r| r.width().hypot(r.height()))
        .unwrap_or(0.0)
}

/// Whether two polygons share any point
pub fn intersects(a: &Polygon<f64>, b: &Polygon<f64>) -> bool {
    a.intersects(b)
}
