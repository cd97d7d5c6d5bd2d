use proptest::prelude::*;
use strata_geom::Aabb;

fn block() -> impl Strategy<Value = (i32, i32, i32)> {
    (-500i32..500, -64i32..320, -500i32..500)
}

proptest! {
    #[test]
    fn intersection_is_symmetric(a in block(), b in block()) {
        let ba = Aabb::from_block(a.0, a.1, a.2);
        let bb = Aabb::from_block(b.0, b.1, b.2);
        prop_assert_eq!(ba.intersects(&bb), bb.intersects(&ba));
        prop_assert_eq!(ba.intersects(&bb), a == b);
    }

    #[test]
    fn block_cell_range_is_its_own_cell(a in block()) {
        let b = Aabb::from_block(a.0, a.1, a.2);
        prop_assert_eq!(b.cell_range(), (a, a));
    }

    #[test]
    fn union_contains_both_blocks(a in block(), b in block()) {
        let ba = Aabb::from_block(a.0, a.1, a.2);
        let bb = Aabb::from_block(b.0, b.1, b.2);
        let u = ba.union(&bb);
        prop_assert!(u.contains_point(ba.min) && u.contains_point(ba.max));
        prop_assert!(u.contains_point(bb.min) && u.contains_point(bb.max));
    }
}
