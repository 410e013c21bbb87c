//! A* pathfinding on the block grid
//!
//! 4-connected, uniform step cost, Manhattan heuristic. Ties are broken by
//! the lower heuristic, then by insertion order, so results are
//! deterministic for a given grid.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::IVec2;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Anything that can answer "may an agent stand on this block"
pub trait NavGrid {
    /// Whether a block can be entered. Out-of-range blocks must be `false`.
    fn is_walkable(&self, block: IVec2) -> bool;
}

/// Neighbor order: up, down, left, right
const NEIGHBOR_OFFSETS: [IVec2; 4] = [IVec2::Y, IVec2::NEG_Y, IVec2::NEG_X, IVec2::X];

/// A* node for priority queue
#[derive(Debug, Clone, Copy)]
struct Node {
    block: IVec2,
    f_cost: i32,
    h_cost: i32,
    seq: u32,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.h_cost.cmp(&self.h_cost))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn manhattan(a: IVec2, b: IVec2) -> i32 {
    let d = (a - b).abs();
    d.x + d.y
}

fn walkable_neighbors(grid: &impl NavGrid, block: IVec2) -> SmallVec<[IVec2; 4]> {
    NEIGHBOR_OFFSETS
        .iter()
        .map(|&offset| block + offset)
        .filter(|&n| grid.is_walkable(n))
        .collect()
}

/// Find a path from `start` to `goal`.
///
/// Returns the steps after `start` up to and including `goal`; an empty
/// path means `start == goal`. Returns `None` when the start is not walkable
/// or the goal cannot be reached.
#[must_use]
pub fn find_path(grid: &impl NavGrid, start: IVec2, goal: IVec2) -> Option<Vec<IVec2>> {
    if !grid.is_walkable(start) {
        return None;
    }
    if start == goal {
        return Some(Vec::new());
    }

    let mut open_set = BinaryHeap::new();
    let mut closed: FxHashSet<IVec2> = FxHashSet::default();
    let mut came_from: FxHashMap<IVec2, IVec2> = FxHashMap::default();
    let mut g_score: FxHashMap<IVec2, i32> = FxHashMap::default();
    let mut seq = 0u32;

    g_score.insert(start, 0);
    let h = manhattan(start, goal);
    open_set.push(Node {
        block: start,
        f_cost: h,
        h_cost: h,
        seq,
    });

    while let Some(current) = open_set.pop() {
        if !closed.insert(current.block) {
            continue;
        }

        if current.block == goal {
            // Reconstruct path
            let mut path = vec![goal];
            let mut curr = goal;
            while let Some(&prev) = came_from.get(&curr) {
                if prev == start {
                    break;
                }
                path.push(prev);
                curr = prev;
            }
            path.reverse();
            return Some(path);
        }

        let current_g = g_score.get(&current.block).copied().unwrap_or(i32::MAX);
        for neighbor in walkable_neighbors(grid, current.block) {
            if closed.contains(&neighbor) {
                continue;
            }
            let tentative_g = current_g + 1;
            if tentative_g < g_score.get(&neighbor).copied().unwrap_or(i32::MAX) {
                came_from.insert(neighbor, current.block);
                g_score.insert(neighbor, tentative_g);

                seq += 1;
                let h = manhattan(neighbor, goal);
                open_set.push(Node {
                    block: neighbor,
                    f_cost: tentative_g + h,
                    h_cost: h,
                    seq,
                });
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Simple walkability bitmap for tests
    struct TestGrid {
        width: i32,
        height: i32,
        blocked: FxHashSet<IVec2>,
    }

    impl TestGrid {
        fn open(width: i32, height: i32) -> Self {
            Self {
                width,
                height,
                blocked: FxHashSet::default(),
            }
        }

        fn block(&mut self, x: i32, y: i32) {
            self.blocked.insert(IVec2::new(x, y));
        }
    }

    impl NavGrid for TestGrid {
        fn is_walkable(&self, b: IVec2) -> bool {
            b.x >= 0 && b.y >= 0 && b.x < self.width && b.y < self.height && !self.blocked.contains(&b)
        }
    }

    #[test]
    fn test_direct_path() {
        let grid = TestGrid::open(10, 10);

        let path = find_path(&grid, IVec2::ZERO, IVec2::new(6, 0)).unwrap();

        assert_eq!(path.len(), 6);
        assert_eq!(path.last(), Some(&IVec2::new(6, 0)));
        for pair in path.windows(2) {
            assert!(pair[1].x > pair[0].x);
        }
    }

    #[test]
    fn test_path_around_wall() {
        let mut grid = TestGrid::open(10, 10);
        for y in 0..8 {
            grid.block(5, y);
        }

        let path = find_path(&grid, IVec2::new(2, 0), IVec2::new(8, 0)).unwrap();

        assert!(path.len() > 6);
        assert!(path.iter().all(|&b| grid.is_walkable(b)));
        // Every step is one block from the previous one
        let mut prev = IVec2::new(2, 0);
        for &step in &path {
            assert_eq!(manhattan(prev, step), 1);
            prev = step;
        }
    }

    #[test]
    fn test_no_path() {
        let mut grid = TestGrid::open(5, 5);
        grid.block(3, 2);
        grid.block(3, 4);
        grid.block(2, 3);
        grid.block(4, 3);

        assert!(find_path(&grid, IVec2::ZERO, IVec2::new(3, 3)).is_none());
    }

    #[test]
    fn test_unwalkable_start_or_goal() {
        let mut grid = TestGrid::open(5, 5);
        grid.block(0, 0);

        assert!(find_path(&grid, IVec2::ZERO, IVec2::new(2, 2)).is_none());
        assert!(find_path(&grid, IVec2::new(2, 2), IVec2::ZERO).is_none());
        assert!(find_path(&grid, IVec2::new(2, 2), IVec2::new(-1, 2)).is_none());
    }

    #[test]
    fn test_start_equals_goal() {
        let grid = TestGrid::open(3, 3);
        assert_eq!(find_path(&grid, IVec2::ONE, IVec2::ONE), Some(Vec::new()));
    }

    #[test]
    fn test_path_is_deterministic() {
        let grid = TestGrid::open(8, 8);
        let first = find_path(&grid, IVec2::ZERO, IVec2::new(5, 5));
        for _ in 0..10 {
            assert_eq!(find_path(&grid, IVec2::ZERO, IVec2::new(5, 5)), first);
        }
        // Ties prefer "up" first
        assert_eq!(first.unwrap()[0], IVec2::new(0, 1));
    }
}
