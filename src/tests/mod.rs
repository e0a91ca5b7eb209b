use crate::{Point, Triangle};

mod predicates;
mod triangulate;

pub(crate) fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

/// Anticlockwise regular polygon centred on the origin.
pub(crate) fn regular_polygon(n: usize, radius: f64) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let theta = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            Point::new(radius * theta.cos(), radius * theta.sin())
        })
        .collect()
}

/// Shoelace formula; positive for anticlockwise contours.
pub(crate) fn signed_area(contour: &[Point]) -> f64 {
    let mut sum = 0.0;
    for (i, a) in contour.iter().enumerate() {
        let b = contour[(i + 1) % contour.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Rotate each triangle so its smallest vertex index comes first, then sort
/// the list, so triangulations can be compared as sets.
pub(crate) fn normalized(triangles: &[Triangle]) -> Vec<[usize; 3]> {
    let mut out: Vec<[usize; 3]> = triangles
        .iter()
        .map(|t| {
            let [a, b, c] = t.0;
            if a < b && a < c {
                [a, b, c]
            } else if b < c {
                [b, c, a]
            } else {
                [c, a, b]
            }
        })
        .collect();
    out.sort_unstable();
    out
}

pub(crate) fn triangle_area(vertices: &[Point], t: Triangle) -> f64 {
    let [a, b, c] = t.0;
    let (a, b, c) = (vertices[a], vertices[b], vertices[c]);
    ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)) / 2.0
}

/// Check the output invariants shared by every triangulation: the triangle
/// count law `n + 2h - 2`, index validity, non-degeneracy, and total area.
pub(crate) fn assert_valid_triangulation(contours: &[Vec<Point>], triangles: &[Triangle]) {
    let vertices: Vec<Point> = contours.iter().flatten().copied().collect();
    let n = vertices.len();
    let holes = contours.len() - 1;
    assert_eq!(triangles.len(), n + 2 * holes - 2, "triangle count for n={}, h={}", n, holes);

    let mut covered = 0.0;
    for &t in triangles {
        let [a, b, c] = t.0;
        assert!(a < n && b < n && c < n, "vertex index out of range in {}", t);
        assert!(a != b && b != c && a != c, "degenerate triangle {}", t);
        covered += triangle_area(&vertices, t).abs();
    }

    let expected: f64 = contours.iter().map(|c| signed_area(c)).sum();
    assert!(
        (covered - expected.abs()).abs() < 1e-9 * (1.0 + expected.abs()),
        "covered area {} != polygon area {}",
        covered,
        expected.abs()
    );
}
