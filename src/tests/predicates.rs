use crate::point::{cross, Point, PointOrder};

fn ord() -> PointOrder {
    PointOrder::new(1.0e-7)
}

#[test]
fn order_by_y_then_x() {
    let ord = ord();
    assert!(ord.gt(Point::new(0.0, 1.0), Point::new(5.0, 0.0)));
    assert!(ord.lt(Point::new(5.0, 0.0), Point::new(0.0, 1.0)));
    // same level: x breaks the tie
    assert!(ord.gt(Point::new(2.0, 1.0), Point::new(1.0, 1.0)));
    assert!(ord.lt(Point::new(1.0, 1.0), Point::new(2.0, 1.0)));
}

#[test]
fn tolerance_merges_nearby_points() {
    let ord = ord();
    let a = Point::new(1.0, 1.0);
    let b = Point::new(1.0 + 1.0e-9, 1.0 - 1.0e-9);
    assert!(ord.eq(a, b));
    assert!(!ord.gt(b, a) || !ord.gt(a, b), "mutually greater");

    let c = Point::new(1.0, 1.001);
    assert!(!ord.eq(a, c));
    assert!(ord.gt(c, a));
}

#[test]
fn ge_is_gt_or_eq() {
    let ord = ord();
    let a = Point::new(0.0, 0.0);
    let b = Point::new(0.0, 1.0);
    assert!(ord.ge(b, a));
    assert!(!ord.ge(a, b));
    assert!(ord.ge(a, a));
}

#[test]
fn max_min_pick_extremes() {
    let ord = ord();
    let lo = Point::new(0.0, 0.0);
    let hi = Point::new(0.0, 2.0);
    assert_eq!(ord.max(lo, hi), hi);
    assert_eq!(ord.max(hi, lo), hi);
    assert_eq!(ord.min(lo, hi), lo);
    assert_eq!(ord.min(hi, lo), lo);
}

#[test]
fn left_of_vertical_segment() {
    let ord = ord();
    let v0 = Point::new(0.0, 0.0);
    let v1 = Point::new(0.0, 2.0);
    assert!(ord.is_left_of(v0, v1, Point::new(-1.0, 1.0)));
    assert!(!ord.is_left_of(v0, v1, Point::new(1.0, 1.0)));
    // orientation of the stored endpoints must not matter
    assert!(ord.is_left_of(v1, v0, Point::new(-1.0, 1.0)));
    assert!(!ord.is_left_of(v1, v0, Point::new(1.0, 1.0)));
}

#[test]
fn left_of_level_with_endpoint() {
    let ord = ord();
    let v0 = Point::new(0.0, 0.0);
    let v1 = Point::new(2.0, 2.0);
    // query point sharing a y level with an endpoint is sided by x alone
    assert!(ord.is_left_of(v0, v1, Point::new(1.0, 2.0)));
    assert!(!ord.is_left_of(v0, v1, Point::new(3.0, 2.0)));
    assert!(ord.is_left_of(v0, v1, Point::new(-1.0, 0.0)));
    assert!(!ord.is_left_of(v0, v1, Point::new(1.0, 0.0)));
}

#[test]
fn cross_sign_is_orientation() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(1.0, 0.0);
    assert!(cross(a, b, Point::new(0.0, 1.0)) > 0.0);
    assert!(cross(a, b, Point::new(0.0, -1.0)) < 0.0);
    assert_eq!(cross(a, b, Point::new(2.0, 0.0)), 0.0);
}
