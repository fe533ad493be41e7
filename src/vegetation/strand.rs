//! Bounded walks along the surface normal that mark blade and root cells.

use std::iter::FusedIterator;
use std::ops::Range;

use crate::mask::MaskCell;
use crate::math::{Axis, Grid3};

/// Direction and stopping rule of a strand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StrandKind {
    /// Climbs from the bottom of the mask while the absolute index is below `tip`.
    /// Cells already `Filled` are stepped over.
    Blade { tip: f64 },
    /// Descends from the top of the mask while the absolute index is above
    /// `floor` and the cell in the base column is `Filled`.
    Root { floor: f64 },
}

/// Iterator over the mask cells a single blade or root occupies.
///
/// Yields in-bounds cell indices. The lateral offset callback is invoked
/// with the number of cells marked so far, only for steps that qualify.
/// The walk ends for good the first time an offset leaves the mask.
pub struct StrandWalk<'a, F> {
    mask: &'a Grid3<MaskCell>,
    normal: Axis,
    column: [i64; 3],
    origin: i64,
    kind: StrandKind,
    steps: Range<i64>,
    offset: F,
    grown: usize,
    done: bool,
}

impl<'a, F> StrandWalk<'a, F>
where
    F: FnMut(usize) -> (i64, i64),
{
    /// Walk the column at lateral mask coordinates `column`.
    ///
    /// `origin` is the absolute index of mask layer 0 along `normal`.
    pub fn new(
        mask: &'a Grid3<MaskCell>,
        normal: Axis,
        column: [usize; 2],
        origin: u32,
        kind: StrandKind,
        offset: F,
    ) -> Self {
        let (a, b) = normal.lateral();
        let mut cell = [0i64; 3];
        cell[a.index()] = column[0] as i64;
        cell[b.index()] = column[1] as i64;
        let len = mask.dims()[normal.index()] as i64;
        let steps = match kind {
            StrandKind::Blade { .. } => 0..len,
            StrandKind::Root { .. } => 1..len,
        };
        Self {
            mask,
            normal,
            column: cell,
            origin: origin as i64,
            kind,
            steps,
            offset,
            grown: 0,
            done: false,
        }
    }

    fn next_step(&mut self) -> Option<i64> {
        let step = match self.kind {
            StrandKind::Blade { tip } => self.steps.next().filter(|k| ((self.origin + k) as f64) < tip),
            StrandKind::Root { floor } => self.steps.next_back().filter(|k| ((self.origin + k) as f64) > floor),
        };
        if step.is_none() {
            self.done = true;
        }
        step
    }
}

impl<F> Iterator for StrandWalk<'_, F>
where
    F: FnMut(usize) -> (i64, i64),
{
    type Item = [usize; 3];

    fn next(&mut self) -> Option<[usize; 3]> {
        let n = self.normal.index();
        let (a, b) = self.normal.lateral();
        while !self.done {
            let k = self.next_step()?;
            let mut base = self.column;
            base[n] = k;

            if let StrandKind::Root { .. } = self.kind {
                if self.mask.get(base) != Some(MaskCell::Filled) {
                    continue;
                }
            }

            let (da, db) = (self.offset)(self.grown);
            let mut target = base;
            target[a.index()] += da;
            target[b.index()] += db;
            let Some(cell) = self.mask.checked_index(target) else {
                self.done = true;
                return None;
            };

            if let StrandKind::Blade { .. } = self.kind {
                if self.mask[cell] == MaskCell::Filled {
                    continue;
                }
            }

            self.grown += 1;
            return Some(cell);
        }
        None
    }
}

impl<F> FusedIterator for StrandWalk<'_, F> where F: FnMut(usize) -> (i64, i64) {}
