//! Branch outcome history registers

use crate::counter::get_mask;

/// Global history register
///
/// Bits shifted past the word width are dropped, and every reader goes
/// through [`GlobalHistory::read`] which masks to the configured length.
#[derive(Clone, Copy, Debug)]
pub struct GlobalHistory {
    data: u32,
    length: usize,
}

impl GlobalHistory {
    pub fn new(length: usize) -> Self {
        Self { data: 0, length }
    }

    /// Returns the meaningful low `length` bits
    pub fn read(&self) -> u32 {
        self.data & get_mask(self.length)
    }

    /// Shifts in the resolved direction of a branch
    pub fn push(&mut self, taken: bool) {
        self.data = (self.data << 1) | taken as u32;
    }

    pub fn length(&self) -> usize {
        self.length
    }

    #[cfg(test)]
    pub(crate) fn raw(&self) -> u32 {
        self.data
    }

    #[cfg(test)]
    pub(crate) fn set_raw(&mut self, data: u32) {
        self.data = data;
    }
}

/// Per-address local history registers, directly indexed by `pc mod size`
#[derive(Clone, Debug)]
pub struct LocalHistoryTable {
    entries: Vec<u32>,
    length: usize,
}

impl LocalHistoryTable {
    pub fn new(idx_length: usize, length: usize) -> Self {
        Self {
            entries: vec![0; 1 << idx_length],
            length,
        }
    }

    pub fn index(&self, pc: u32) -> usize {
        (pc as usize) % self.entries.len()
    }

    /// Returns the meaningful low `length` bits of the register for `pc`
    pub fn read(&self, pc: u32) -> u32 {
        self.entries[self.index(pc)] & get_mask(self.length)
    }

    /// Shifts in the resolved direction of the branch at `pc`
    pub fn push(&mut self, pc: u32, taken: bool) {
        let index = self.index(pc);
        let entry = &mut self.entries[index];
        *entry = (*entry << 1) | taken as u32;
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn set_raw(&mut self, pc: u32, data: u32) {
        let index = self.index(pc);
        self.entries[index] = data;
    }
}
