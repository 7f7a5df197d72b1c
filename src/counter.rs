//! Saturating counter arithmetic and bit helpers shared by every table

/// Increments a counter, clamping at `max`
pub fn sat_increment(counter: u8, max: u8) -> u8 {
    if counter >= max {
        max
    } else {
        counter + 1
    }
}

/// Decrements a counter, clamping at zero
pub fn sat_decrement(counter: u8) -> u8 {
    counter.saturating_sub(1)
}

/// Moves a counter one step toward the given direction
pub fn sat_update(counter: u8, max: u8, taken: bool) -> u8 {
    if taken {
        sat_increment(counter, max)
    } else {
        sat_decrement(counter)
    }
}

/// A counter votes taken when it lies strictly above `max / 2`
pub fn votes_taken(counter: u8, max: u8) -> bool {
    counter > max / 2
}

/// Mask with the low `bits` bits set; `bits` may be the full word width
pub fn get_mask(bits: usize) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1 << bits) - 1
    }
}

/// Number of bits a counter saturating at `max` occupies
pub fn counter_bits(max: u8) -> usize {
    (8 - max.leading_zeros()) as usize
}
