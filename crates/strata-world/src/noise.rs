//! Seeded 2D simplex noise.
//!
//! The permutation table is derived from the seed alone, so every thread that
//! builds a `SimplexNoise` from the same seed samples bit-identical values.

const F2: f64 = 0.366_025_403_784_438_6; // 0.5 * (sqrt(3) - 1)
const G2: f64 = 0.211_324_865_405_187_1; // (3 - sqrt(3)) / 6
const SCALE: f64 = 70.0;

const GRAD3: [(f64, f64); 12] = [
    (1.0, 1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (0.0, 1.0),
    (0.0, -1.0),
];

#[derive(Clone)]
pub struct SimplexNoise {
    seed: i32,
    perm: [u8; 512],
    perm_mod12: [u8; 512],
}

impl std::fmt::Debug for SimplexNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplexNoise")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

/// Numerical Recipes LCG; only used to drive the shuffle.
struct Lcg(u32);

impl Lcg {
    #[inline]
    fn next(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.0
    }
}

impl SimplexNoise {
    pub fn new(seed: i32) -> Self {
        let mut p = [0u8; 256];
        for (i, v) in p.iter_mut().enumerate() {
            *v = i as u8;
        }
        let mut rng = Lcg(seed as u32);
        for i in (1..256usize).rev() {
            let j = (rng.next() % (i as u32 + 1)) as usize;
            p.swap(i, j);
        }
        let mut perm = [0u8; 512];
        let mut perm_mod12 = [0u8; 512];
        for i in 0..512 {
            perm[i] = p[i & 255];
            perm_mod12[i] = perm[i] % 12;
        }
        Self {
            seed,
            perm,
            perm_mod12,
        }
    }

    #[inline]
    pub fn seed(&self) -> i32 {
        self.seed
    }

    #[inline]
    fn corner(&self, gi: usize, x: f64, y: f64) -> f64 {
        let t = 0.5 - x * x - y * y;
        if t < 0.0 {
            0.0
        } else {
            let (gx, gy) = GRAD3[gi];
            let t2 = t * t;
            t2 * t2 * (gx * x + gy * y)
        }
    }

    /// Samples noise at `(xin, yin)`. Output is roughly within `[-1, 1]`.
    pub fn noise2d(&self, xin: f64, yin: f64) -> f64 {
        let s = (xin + yin) * F2;
        let i = (xin + s).floor();
        let j = (yin + s).floor();
        let t = (i + j) * G2;
        let x0 = xin - (i - t);
        let y0 = yin - (j - t);

        // Lower or upper triangle of the skewed cell.
        let (i1, j1) = if x0 > y0 { (1usize, 0usize) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + G2;
        let y1 = y0 - j1 as f64 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;
        let gi0 = self.perm_mod12[ii + self.perm[jj] as usize] as usize;
        let gi1 = self.perm_mod12[ii + i1 + self.perm[jj + j1] as usize] as usize;
        let gi2 = self.perm_mod12[ii + 1 + self.perm[jj + 1] as usize] as usize;

        let n0 = self.corner(gi0, x0, y0);
        let n1 = self.corner(gi1, x1, y1);
        let n2 = self.corner(gi2, x2, y2);
        SCALE * (n0 + n1 + n2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permutation_is_a_shuffle_of_all_bytes() {
        let n = SimplexNoise::new(42);
        let mut seen = [false; 256];
        for &v in &n.perm[..256] {
            seen[v as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
        assert_eq!(n.perm[..256], n.perm[256..]);
        assert!(n.perm_mod12.iter().all(|v| *v < 12));
    }

    #[test]
    fn different_seeds_give_different_fields() {
        let a = SimplexNoise::new(1);
        let b = SimplexNoise::new(2);
        let differs = (0..64).any(|i| {
            let x = i as f64 * 0.37;
            a.noise2d(x, -x * 0.5) != b.noise2d(x, -x * 0.5)
        });
        assert!(differs);
    }

    #[test]
    fn lattice_origin_is_zero() {
        // All three corner contributions vanish at a lattice point's first corner.
        let n = SimplexNoise::new(7);
        assert_eq!(n.noise2d(0.0, 0.0), 0.0);
    }
}
