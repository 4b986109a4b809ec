//! Enumeration of the blocks a moving box passes through.
//!
//! A movement shorter than one block only touches the blocks under its destination box,
//! so only those are reported. Longer movements step a grid ray along the path of the
//! box's lower corner, and add the blocks covered by the box at each cell boundary the
//! ray crosses.

use alloc::vec::Vec;

/// Acts as polyfill for float methods
#[cfg(not(any(feature = "std", test)))]
#[allow(unused_imports)]
use num_traits::float::FloatCore as _;

use hashbrown::HashSet;

use crate::math::{
    Aab, Axis, AxisOrder, COLLISION_EPSILON, Cube, CubeRange, FreeCoordinate, FreePoint, FreeVector,
    GridCoordinate, frac, signum_101,
};

#[cfg(test)]
mod tests;

/// Maximum number of cell boundaries crossed before the walk gives up.
///
/// The walk stops on the step after this many, so a very long movement only reports
/// the blocks near its start and its end.
pub const MAX_TRAVERSAL_STEPS: u32 = 16;

/// Reusable buffers for finding the blocks touched by a box moving in a straight line.
///
/// Each call to [`Traversal::traverse()`] forgets the previous result but keeps the
/// allocations, so a [`Traversal`] kept alive across ticks does not allocate once warmed up.
#[derive(Clone, Debug, Default)]
pub struct Traversal {
    visited: HashSet<Cube>,
    cells: Vec<Cube>,
}

impl Traversal {
    /// Constructs an empty [`Traversal`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every block touched by `sweep_box` moving from `from` to `to`.
    ///
    /// `sweep_box` is the box at its destination; the same box translated by
    /// `from - to` is where the movement starts.
    ///
    /// Each block is reported once, in the order it was first reached: blocks crossed
    /// along the way, then the blocks under the destination box, then the blocks under the
    /// starting box.
    ///
    /// ```
    /// # extern crate movecheck_base as movecheck;
    /// use movecheck::math::{Aab, Cube, FreePoint};
    /// use movecheck::traverse::Traversal;
    ///
    /// let mut traversal = Traversal::new();
    /// let cells = traversal.traverse(
    ///     FreePoint::new(0.5, 0.5, 0.5),
    ///     FreePoint::new(0.6, 0.5, 0.5),
    ///     Aab::new(0.3, 0.9, 0.5, 0.9, 0.3, 0.7),
    /// );
    /// assert_eq!(cells, [Cube::new(0, 0, 0)]);
    /// ```
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn traverse(&mut self, from: FreePoint, to: FreePoint, sweep_box: Aab) -> &[Cube] {
        self.visited.clear();
        self.cells.clear();
        self.add_traversal(from, to, sweep_box);
        &self.cells
    }

    /// Like [`Self::traverse()`], but splits the movement into one straight movement
    /// per axis, taken in the order given by [`AxisOrder::for_step()`].
    ///
    /// `sweep_box_at` gives the box to sweep for each partial movement, given where that
    /// partial movement ends. Blocks are reported once even if several of the partial
    /// movements touch them.
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn traverse_by_axis(
        &mut self,
        from: FreePoint,
        to: FreePoint,
        mut sweep_box_at: impl FnMut(FreePoint) -> Aab,
    ) -> &[Cube] {
        self.visited.clear();
        self.cells.clear();

        let displacement = to - from;
        if displacement == FreeVector::zero() {
            self.add_traversal(from, to, sweep_box_at(to));
            return &self.cells;
        }
        let mut start = from;
        for axis in AxisOrder::for_step(displacement).axes() {
            if displacement[axis] == 0.0 {
                continue;
            }
            let mut end = start;
            end[axis] += displacement[axis];
            self.add_traversal(start, end, sweep_box_at(end));
            start = end;
        }
        &self.cells
    }

    /// Adds the cells of one straight movement, without forgetting earlier ones.
    fn add_traversal(&mut self, from: FreePoint, to: FreePoint, sweep_box: Aab) {
        let direction: FreeVector = to - from;
        let threshold = FreeCoordinate::from(0.99999f32 * 0.99999f32);
        if direction.square_length() >= threshold {
            let end = sweep_box.lower_bounds_p();
            self.walk(end - direction, end, sweep_box);
        }

        self.add_range(sweep_box.touched_cubes());
        if direction.square_length() >= threshold {
            self.add_range(sweep_box.translate(-direction).touched_cubes());
        }
    }

    fn add(&mut self, cube: Cube) {
        if self.visited.insert(cube) {
            self.cells.push(cube);
        }
    }

    fn add_range(&mut self, range: CubeRange) {
        for cube in range.cubes() {
            self.add(cube);
        }
    }

    /// Walks the grid cells crossed by the segment from `start` to `end`, which is the
    /// path of the lower corner of `sweep_box`.
    fn walk(&mut self, start: FreePoint, end: FreePoint, sweep_box: Aab) {
        let direction = end - start;
        let size = sweep_box.size();

        let mut current = [
            start.x.floor() as GridCoordinate,
            start.y.floor() as GridCoordinate,
            start.z.floor() as GridCoordinate,
        ];
        let step = [
            signum_101(direction.x),
            signum_101(direction.y),
            signum_101(direction.z),
        ];
        // Parameter distance covered by crossing one whole cell on each axis.
        let mut t_per_cell = [FreeCoordinate::MAX; 3];
        // Parameter distance at which the next cell boundary on each axis is crossed.
        let mut t_next = [FreeCoordinate::MAX; 3];
        for axis in Axis::ALL {
            if step[axis] != 0 {
                t_per_cell[axis] = FreeCoordinate::from(step[axis]) / direction[axis];
                let fraction = frac(start[axis]);
                t_next[axis] = t_per_cell[axis]
                    * if step[axis] > 0 {
                        1.0 - fraction
                    } else {
                        fraction
                    };
            }
        }

        let mut iterations: u32 = 0;
        while t_next.iter().any(|&t| t <= 1.0) {
            let axis = if t_next[Axis::X] < t_next[Axis::Y] {
                if t_next[Axis::X] < t_next[Axis::Z] {
                    Axis::X
                } else {
                    Axis::Z
                }
            } else if t_next[Axis::Y] < t_next[Axis::Z] {
                Axis::Y
            } else {
                Axis::Z
            };
            current[axis] += step[axis];
            t_next[axis] += t_per_cell[axis];

            let count = iterations;
            iterations += 1;
            if count > MAX_TRAVERSAL_STEPS {
                break;
            }

            let cell = Cube::from(current);
            let Some(hit) = clip_segment(cell.aab(), start, end) else {
                continue;
            };
            let margin = FreeCoordinate::from(1.0e-5f32);
            let mut last = current;
            for axis in Axis::ALL {
                let lower = FreeCoordinate::from(current[axis]);
                let clamped = hit[axis].clamp(lower + margin, lower + 1.0 - margin);
                last[axis] = (clamped + size[axis]).floor() as GridCoordinate;
            }
            // Emitted X outermost to match the order blocks are applied in.
            for x in current[Axis::X]..=last[Axis::X] {
                for y in current[Axis::Y]..=last[Axis::Y] {
                    for z in current[Axis::Z]..=last[Axis::Z] {
                        self.add(Cube::new(x, y, z));
                    }
                }
            }
        }
    }
}

/// Finds where the segment from `start` to `end` first enters `cell`, if it does so
/// after leaving `start` and before reaching `end`.
fn clip_segment(cell: Aab, start: FreePoint, end: FreePoint) -> Option<FreePoint> {
    let delta = end - start;
    let mut min_distance: FreeCoordinate = 1.0;
    let mut hit = false;

    for axis in Axis::ALL {
        let plane = if delta[axis] > COLLISION_EPSILON {
            cell.lower(axis)
        } else if delta[axis] < -COLLISION_EPSILON {
            cell.upper(axis)
        } else {
            continue;
        };
        let t = (plane - start[axis]) / delta[axis];
        if t > 0.0
            && t < min_distance
            && [axis.increment(), axis.decrement()].into_iter().all(|other| {
                let c = start[other] + t * delta[other];
                cell.lower(other) - COLLISION_EPSILON < c
                    && c < cell.upper(other) + COLLISION_EPSILON
            })
        {
            min_distance = t;
            hit = true;
        }
    }

    hit.then(|| start + delta * min_distance)
}
