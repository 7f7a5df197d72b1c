//! Skewed index hashing
//!
//! Two banks addressed from the same (address, history) pair use related
//! but decorrelated index functions, so an entry aliased in one bank is
//! unlikely to be aliased in the other. Reference:
//! <http://meseec.ce.rit.edu/eecc722-fall2002/papers/branch-prediction/7/michaud97trading.pdf>

use crate::counter::get_mask;

/// Folded rotate on `n`-bit values: shift right by one and
/// set the new top bit to the XOR of the old top and bottom bits
pub fn h(a: u32, n: u32) -> u32 {
    let y1 = a & 1;
    let yn = (a >> (n - 1)) & 1;
    (a >> 1) + ((y1 ^ yn) << (n - 1))
}

/// Inverse of [`h`] on `n`-bit values
pub fn h_inv(b: u32, n: u32) -> u32 {
    // Top bit of h(x) is x1 ^ xn, the bit below it is xn
    let top = (b >> (n - 1)) & 1;
    let yn = (b >> (n - 2)) & 1;
    let y1 = top ^ yn;
    ((b << 1) + y1) & get_mask(n as usize)
}

/// `H(a) ^ H⁻¹(b) ^ c`
pub fn map_index(a: u32, b: u32, c: u32, n: u32) -> u32 {
    h(a, n) ^ h_inv(b, n) ^ c
}

/// The two `idx_len`-wide fields sliced from `(pc << hist_len) + hist`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkewFields {
    /// Lowest `idx_len` bits
    pub low: u32,
    /// The next `idx_len` bits above `low`
    pub high: u32,
}

impl SkewFields {
    pub fn construct(pc: u32, hist: u32, hist_len: u32, idx_len: u32) -> Self {
        let v = (pc << hist_len).wrapping_add(hist);
        let mask = get_mask(idx_len as usize);
        Self {
            low: v & mask,
            high: (v >> idx_len) & mask,
        }
    }

    /// Index into the first bank of a skewed pair
    pub fn first_bank(&self, n: u32) -> usize {
        map_index(self.low, self.high, self.high, n) as usize
    }

    /// Index into the second bank of a skewed pair
    pub fn second_bank(&self, n: u32) -> usize {
        map_index(self.low, self.high, self.low, n) as usize
    }

    /// Index into the gskew/bimodal chooser, with the fields' roles swapped
    pub fn chooser(&self, n: u32) -> usize {
        map_index(self.high, self.low, self.high, n) as usize
    }
}
