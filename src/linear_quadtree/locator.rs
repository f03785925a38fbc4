/// Location code of a linear quadtree node.
///
/// The code is the Morton (Z-order) interleave of the node's cell coordinates at its depth,
/// x on the even bits and y on the odd bits, with a sentinel bit set right above them at
/// position `2 * depth`. The sentinel keeps the codes of different depths distinct, e.g. the
/// bottom-left cell of every level would be `0` without it.
///
/// Breadth first ordering of the nodes is also ascending ordering of their codes.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct LocatorCode(pub u32);

impl Default for LocatorCode {
    fn default() -> Self {
        Self::ROOT
    }
}

impl LocatorCode {
    pub const ROOT: Self = Self(1);

    /// Deepest depth a code can represent
    pub const MAX_DEPTH: u32 = 15;

    /// Code of the cell at `[x, y]` on the grid of `depth`.
    pub fn from_cell(x: u32, y: u32, depth: u32) -> Self {
        debug_assert!(depth <= Self::MAX_DEPTH);
        debug_assert!(x < (1 << depth) && y < (1 << depth), "{} {} {}", x, y, depth);
        Self(Self::morton2(x, y) | (1 << (2 * depth)))
    }

    /// Code of the given child. Tag bit 0 selects the right half, bit 1 the top half.
    #[inline]
    pub fn child(self, tag: u32) -> Self {
        debug_assert!(tag < 4);
        Self((self.0 << 2) | tag)
    }

    #[inline]
    pub fn parent(self) -> Option<Self> {
        if self == Self::ROOT {
            None
        } else {
            Some(Self(self.0 >> 2))
        }
    }

    #[inline]
    pub fn depth(self) -> u32 {
        debug_assert!(self.0 != 0);
        (31 - self.0.leading_zeros()) / 2
    }

    /// Which child of its parent this node is
    #[inline]
    pub fn quadrant(self) -> u32 {
        self.0 & 3
    }

    /// The inverse of [`from_cell`](Self::from_cell)
    pub fn cell(self) -> [u32; 2] {
        let n = self.0 ^ (1 << (2 * self.depth()));
        let x = Self::reconstruct(n);
        let y = Self::reconstruct(n >> 1);
        [x, y]
    }

    fn morton2(x: u32, y: u32) -> u32 {
        Self::partition(x) + (Self::partition(y) << 1)
    }

    fn partition(mut n: u32) -> u32 {
        // n = ----------------fedcba9876543210 : Bits initially
        // n = --------fedcba98--------76543210 : After (1)
        // n = ----fedc----ba98----7654----3210 : After (2)
        // n = --fe--dc--ba--98--76--54--32--10 : After (3)
        // n = -f-e-d-c-b-a-9-8-7-6-5-4-3-2-1-0 : After (4)
        n = (n ^ (n << 8)) & 0x00ff00ff; // (1)
        n = (n ^ (n << 4)) & 0x0f0f0f0f; // (2)
        n = (n ^ (n << 2)) & 0x33333333; // (3)
        (n ^ (n << 1)) & 0x55555555 // (4)
    }

    fn reconstruct(mut n: u32) -> u32 {
        // -f-e-d-c-b-a-9-8-7-6-5-4-3-2-1-0 : After (1)
        // -ffeeddccbbaa9988776655443322110 : After (2)
        // --fe--dc--ba--98--76--54--32--10 : After (3)
        // --fefedcdcbaba989876765454323210 : After (4)
        // ----fedc----ba98----7654----3210 : After (5)
        // ----fedcfedcba98ba98765476543210 : After (6)
        // --------fedcba98--------76543210 : After (7)
        // --------fedcba98fedcba9876543210 : After (8)
        // ----------------fedcba9876543210 : After (9)
        n &= 0x55555555;
        n |= n >> 1;
        n &= 0x33333333;
        n |= n >> 2;
        n &= 0x0f0f0f0f;
        n |= n >> 4;
        n &= 0x00ff00ff;
        n |= n >> 8;
        n & 0x0000ffff
    }
}

/// The first `bits` binary digits of the fractional part of `value`.
///
/// Digits are extracted by repeated doubling, so the result is truncated, never rounded:
/// `bin_fraction(0.75, 3) == 0b110`. The first digit after the binary point ends up in the
/// most significant of the `bits` positions.
pub fn bin_fraction(value: f64, bits: u32) -> u32 {
    debug_assert!(bits <= 32);

    let mut r = value.fract();
    let mut result = 0;
    let mut n = bits;

    while r > 0.0 && n > 0 {
        r *= 2.0;
        n -= 1;
        if r >= 1.0 {
            result |= 1 << n;
            r -= 1.0;
        }
    }
    result
}

/// Cell index of `t` on a grid of `1 << depth` cells spanning `[0, 1]`.
///
/// `t == 1` lands in the last cell, anything outside `[0, 1]` (including NaN) yields None.
pub fn grid_cell(t: f64, depth: u32) -> Option<u32> {
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    if t >= 1.0 {
        return Some((1 << depth) - 1);
    }
    Some(bin_fraction(t, depth))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_fraction_truncates() {
        assert_eq!(bin_fraction(0.5, 4), 0b1000);
        assert_eq!(bin_fraction(0.75, 3), 0b110);
        assert_eq!(bin_fraction(0.0, 4), 0);
        // 0.999.. would round up to the next cell
        assert_eq!(bin_fraction(0.99999, 4), 0b1111);
        // 1/3 = 0.010101..
        assert_eq!(bin_fraction(1.0 / 3.0, 6), 0b010101);
        // only the fractional part counts
        assert_eq!(bin_fraction(2.25, 2), 0b01);
    }

    #[test]
    fn grid_cell_bounds() {
        assert_eq!(grid_cell(0.0, 4), Some(0));
        assert_eq!(grid_cell(1.0, 4), Some(15));
        assert_eq!(grid_cell(0.0625, 4), Some(1));
        assert_eq!(grid_cell(0.0624, 4), Some(0));
        assert_eq!(grid_cell(-0.001, 4), None);
        assert_eq!(grid_cell(1.001, 4), None);
        assert_eq!(grid_cell(std::f64::NAN, 4), None);
    }

    #[test]
    fn sentinel_and_interleave() {
        assert_eq!(LocatorCode::from_cell(0, 0, 0), LocatorCode::ROOT);
        assert_eq!(LocatorCode::from_cell(0, 0, 4), LocatorCode(0b1_0000_0000));
        assert_eq!(LocatorCode::from_cell(15, 15, 4), LocatorCode(0b1_1111_1111));
        // x on the even bits
        assert_eq!(LocatorCode::from_cell(8, 0, 4), LocatorCode(0b1_0100_0000));
        // y on the odd bits
        assert_eq!(LocatorCode::from_cell(0, 8, 4), LocatorCode(0b1_1000_0000));
    }

    #[test]
    fn family() {
        let code = LocatorCode::ROOT.child(3).child(1).child(2);
        assert_eq!(code.depth(), 3);
        assert_eq!(code.quadrant(), 2);
        assert_eq!(code.cell(), [0b110, 0b101]);
        assert_eq!(LocatorCode::from_cell(0b110, 0b101, 3), code);

        let parent = code.parent().unwrap();
        assert_eq!(parent, LocatorCode::ROOT.child(3).child(1));
        assert_eq!(parent.parent().unwrap().parent(), Some(LocatorCode::ROOT));
        assert_eq!(LocatorCode::ROOT.parent(), None);
        assert_eq!(LocatorCode::ROOT.depth(), 0);
    }

    #[test]
    fn cell_reconstruction() {
        for depth in 0..=LocatorCode::MAX_DEPTH {
            let n = 1u32 << depth;
            for &[x, y] in [[0, 0], [n - 1, 0], [0, n - 1], [n - 1, n - 1], [n / 2, n / 3]].iter()
            {
                let code = LocatorCode::from_cell(x, y, depth);
                assert_eq!(code.depth(), depth);
                assert_eq!(code.cell(), [x, y], "{:?}", code);
            }
        }
    }
}
