use strata_geom::Vec3;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Face {
    PosY = 0,
    NegY = 1,
    PosX = 2,
    NegX = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    /// Fixed emission order; the builder's output order depends on it.
    pub const ALL: [Face; 6] = [
        Face::PosY,
        Face::NegY,
        Face::PosX,
        Face::NegX,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the unit-normal vector for this face.
    #[inline]
    pub fn normal(self) -> Vec3 {
        let (dx, dy, dz) = self.delta();
        Vec3::new(dx as f32, dy as f32, dz as f32)
    }

    /// Returns the integer grid delta `(dx,dy,dz)` when stepping out of this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    /// The four corners of this face on the unit cube at `(x, y, z)`.
    pub fn corners(self, x: i32, y: i32, z: i32) -> [Vec3; 4] {
        let (x0, y0, z0) = (x as f32, y as f32, z as f32);
        let (x1, y1, z1) = (x0 + 1.0, y0 + 1.0, z0 + 1.0);
        match self {
            Face::PosY => [
                Vec3::new(x0, y1, z0),
                Vec3::new(x1, y1, z0),
                Vec3::new(x1, y1, z1),
                Vec3::new(x0, y1, z1),
            ],
            Face::NegY => [
                Vec3::new(x0, y0, z1),
                Vec3::new(x1, y0, z1),
                Vec3::new(x1, y0, z0),
                Vec3::new(x0, y0, z0),
            ],
            Face::PosX => [
                Vec3::new(x1, y1, z1),
                Vec3::new(x1, y1, z0),
                Vec3::new(x1, y0, z0),
                Vec3::new(x1, y0, z1),
            ],
            Face::NegX => [
                Vec3::new(x0, y1, z0),
                Vec3::new(x0, y1, z1),
                Vec3::new(x0, y0, z1),
                Vec3::new(x0, y0, z0),
            ],
            Face::PosZ => [
                Vec3::new(x1, y1, z1),
                Vec3::new(x0, y1, z1),
                Vec3::new(x0, y0, z1),
                Vec3::new(x1, y0, z1),
            ],
            Face::NegZ => [
                Vec3::new(x0, y1, z0),
                Vec3::new(x1, y1, z0),
                Vec3::new(x1, y0, z0),
                Vec3::new(x0, y0, z0),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_lie_on_the_face_plane() {
        for face in Face::ALL {
            let n = face.normal();
            let corners = face.corners(2, 3, 4);
            let center = Vec3::new(2.5, 3.5, 4.5);
            for c in corners {
                let d = c - center;
                let along = d.x * n.x + d.y * n.y + d.z * n.z;
                assert!((along - 0.5).abs() < 1e-6, "{face:?}");
            }
        }
    }

    #[test]
    fn indices_follow_all_order() {
        for (i, face) in Face::ALL.iter().enumerate() {
            assert_eq!(face.index(), i);
        }
    }
}
