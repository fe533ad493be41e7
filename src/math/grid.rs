//! Dense row-major 2-D and 3-D arrays.
//!
//! Layout matches C order: the last index varies fastest, so a 3-D cell
//! `[i, j, k]` lives at `(i * ny + j) * nz + k`.

use std::ops::{Index, IndexMut};

/// Dense 2-D array indexed `[u, v]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid2<T> {
    dims: [usize; 2],
    data: Vec<T>,
}

impl<T: Copy> Grid2<T> {
    /// Create a grid filled with `value`.
    pub fn filled(dims: [usize; 2], value: T) -> Self {
        Self { dims, data: vec![value; dims[0] * dims[1]] }
    }

    /// Wrap an existing row-major buffer. Returns `None` on a length mismatch.
    pub fn from_vec(dims: [usize; 2], data: Vec<T>) -> Option<Self> {
        (data.len() == dims[0] * dims[1]).then_some(Self { dims, data })
    }

    pub fn dims(&self) -> [usize; 2] {
        self.dims
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Index<[usize; 2]> for Grid2<T> {
    type Output = T;

    fn index(&self, [u, v]: [usize; 2]) -> &T {
        &self.data[u * self.dims[1] + v]
    }
}

impl<T> IndexMut<[usize; 2]> for Grid2<T> {
    fn index_mut(&mut self, [u, v]: [usize; 2]) -> &mut T {
        &mut self.data[u * self.dims[1] + v]
    }
}

/// Dense 3-D array indexed `[i, j, k]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid3<T> {
    dims: [usize; 3],
    data: Vec<T>,
}

impl<T: Copy> Grid3<T> {
    /// Create a grid filled with `value`.
    pub fn filled(dims: [usize; 3], value: T) -> Self {
        Self { dims, data: vec![value; dims[0] * dims[1] * dims[2]] }
    }

    /// Wrap an existing row-major buffer. Returns `None` on a length mismatch.
    pub fn from_vec(dims: [usize; 3], data: Vec<T>) -> Option<Self> {
        (data.len() == dims[0] * dims[1] * dims[2]).then_some(Self { dims, data })
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Bounds-checked read using signed indices; `None` outside the grid.
    pub fn get(&self, cell: [i64; 3]) -> Option<T> {
        self.checked_index(cell).map(|c| self[c])
    }

    /// Convert signed indices to an in-bounds cell, if possible.
    pub fn checked_index(&self, cell: [i64; 3]) -> Option<[usize; 3]> {
        let mut out = [0usize; 3];
        for a in 0..3 {
            if cell[a] < 0 || cell[a] as usize >= self.dims[a] {
                return None;
            }
            out[a] = cell[a] as usize;
        }
        Some(out)
    }

    /// Apply `f` to every element, producing a new grid.
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Grid3<U> {
        Grid3 { dims: self.dims, data: self.data.iter().map(|v| f(*v)).collect() }
    }

    /// Iterate `([i, j, k], value)` in storage order.
    pub fn indexed_iter(&self) -> impl Iterator<Item = ([usize; 3], T)> + '_ {
        let [_, ny, nz] = self.dims;
        self.data.iter().enumerate().map(move |(flat, v)| {
            ([flat / (ny * nz), (flat / nz) % ny, flat % nz], *v)
        })
    }

    fn offset(&self, [i, j, k]: [usize; 3]) -> usize {
        (i * self.dims[1] + j) * self.dims[2] + k
    }
}

impl<T: Copy> Index<[usize; 3]> for Grid3<T> {
    type Output = T;

    fn index(&self, cell: [usize; 3]) -> &T {
        &self.data[self.offset(cell)]
    }
}

impl<T: Copy> IndexMut<[usize; 3]> for Grid3<T> {
    fn index_mut(&mut self, cell: [usize; 3]) -> &mut T {
        let off = self.offset(cell);
        &mut self.data[off]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid2_row_major() {
        let g = Grid2::from_vec([2, 3], vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(g[[1, 0]], 3);
        assert_eq!(g[[0, 2]], 2);
        assert_eq!(g.as_slice()[4], g[[1, 1]]);
        assert!(Grid2::from_vec([2, 2], vec![0u8; 3]).is_none());
    }

    #[test]
    fn test_grid3_c_order() {
        let mut g = Grid3::filled([2, 3, 4], 0u32);
        g[[1, 2, 3]] = 7;
        assert_eq!(g.as_slice()[(1 * 3 + 2) * 4 + 3], 7);
        let (cell, v) = g.indexed_iter().find(|(_, v)| *v == 7).unwrap();
        assert_eq!(cell, [1, 2, 3]);
        assert_eq!(v, 7);
    }

    #[test]
    fn test_grid3_checked_access() {
        let g = Grid3::filled([2, 2, 2], 1u8);
        assert_eq!(g.get([1, 1, 1]), Some(1));
        assert_eq!(g.get([-1, 0, 0]), None);
        assert_eq!(g.get([0, 2, 0]), None);
    }

    #[test]
    fn test_map() {
        let g = Grid3::filled([1, 1, 2], 2u32).map(|v| v as f64 * 0.5);
        assert_eq!(g.as_slice(), &[1.0, 1.0]);
    }
}
