use strata_geom::{Aabb, Vec3};

#[test]
fn block_box_is_unit_cube() {
    let b = Aabb::from_block(-3, 7, 2);
    assert_eq!(b.min, Vec3::new(-3.0, 7.0, 2.0));
    assert_eq!(b.max, Vec3::new(-2.0, 8.0, 3.0));
}

#[test]
fn touching_blocks_do_not_intersect() {
    let a = Aabb::from_block(0, 0, 0);
    let b = Aabb::from_block(1, 0, 0);
    assert!(!a.intersects(&b));
    assert!(a.intersects(&a));
}

#[test]
fn feet_box_spans_height_above_feet() {
    let p = Aabb::from_feet(Vec3::new(5.5, 11.0, 5.5), 0.6, 1.8);
    assert!(p.intersects(&Aabb::from_block(5, 11, 5)));
    assert!(p.intersects(&Aabb::from_block(5, 12, 5)));
    assert!(!p.intersects(&Aabb::from_block(5, 10, 5)));
    assert!(!p.intersects(&Aabb::from_block(5, 13, 5)));
}

#[test]
fn cell_range_stops_at_exact_boundaries() {
    let b = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.5));
    assert_eq!(b.cell_range(), ((0, 0, 0), (1, 0, 1)));
    let neg = Aabb::new(Vec3::new(-1.5, -0.5, -0.25), Vec3::new(-0.5, 0.5, 0.25));
    assert_eq!(neg.cell_range(), ((-2, -1, -1), (-1, 0, 0)));
}

#[test]
fn union_covers_both() {
    let a = Aabb::from_block(0, 0, 0);
    let b = Aabb::from_block(4, -2, 9);
    let u = a.union(&b);
    assert_eq!(u.min, Vec3::new(0.0, -2.0, 0.0));
    assert_eq!(u.max, Vec3::new(5.0, 1.0, 10.0));
    assert!(u.contains_point(Vec3::new(2.0, 0.0, 5.0)));
    assert!(!u.is_empty());
}
