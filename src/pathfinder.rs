//! Weighted A* search between the grid's start and goal positions.

use grid_util::point::Point;
use log::{debug, info, warn};

use crate::astar::astar_weighted;
use crate::terrain::{cost_to_float, MIN_STEP_COST};
use crate::{TerrainGrid, NEIGHBOR_OFFSETS};

/// Outcome of a search: the cell sequence from start to goal inclusive and
/// its exact total cost. An unset start or goal and an unreachable goal both
/// yield the empty path with [PathResult::NO_PATH_COST]; the caller is
/// expected to translate that into user-facing messaging.
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    pub path: Vec<Point>,
    pub total_cost: f64,
}

impl PathResult {
    /// Sentinel cost reported when no path exists.
    pub const NO_PATH_COST: f64 = -1.0;

    fn no_path() -> PathResult {
        PathResult {
            path: Vec::new(),
            total_cost: Self::NO_PATH_COST,
        }
    }

    /// True if a route was found, including the trivial start == goal route.
    pub fn is_found(&self) -> bool {
        !self.path.is_empty()
    }
}

/// Shortest-path engine over a borrowed [TerrainGrid]. Holds no state between
/// calls; all search bookkeeping is rebuilt per invocation and dropped on
/// return, so the grid is only frozen for the duration of a single
/// [Pathfinder::find_path].
///
/// The heuristic is the Manhattan distance to the goal scaled by the minimum
/// possible per-step cost, which never overestimates the true remaining cost,
/// so found paths are minimum-total-cost.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pathfinder;

impl Pathfinder {
    pub fn new() -> Pathfinder {
        Pathfinder
    }

    /// Computes the lowest-cost route from the grid's start to its goal over
    /// the 4-connected neighborhood, stepping only onto in-bounds passable
    /// cells. The cost of a step is determined by the destination cell's
    /// terrain. Skips the search outright when the grid's (clean) components
    /// already prove the goal unreachable.
    pub fn find_path(&self, grid: &TerrainGrid) -> PathResult {
        let (Some(start), Some(goal)) = (grid.start(), grid.goal()) else {
            debug!("start or goal is unset, nothing to search");
            return PathResult::no_path();
        };
        let components_clean = !grid.components_dirty();
        if components_clean && grid.unreachable(&start, &goal) {
            info!("{} is not reachable from {}, skipping search", goal, start);
            return PathResult::no_path();
        }
        let result = astar_weighted(
            &start,
            |node| self.successors(grid, node),
            |node| manhattan(node, &goal) * MIN_STEP_COST,
            |node| *node == goal,
        );
        match result {
            Some((path, cost)) => {
                let total_cost = cost_to_float(cost);
                info!(
                    "found a {} cell path from {} to {} costing {}",
                    path.len(),
                    start,
                    goal,
                    total_cost
                );
                PathResult { path, total_cost }
            }
            None => {
                if components_clean {
                    warn!(
                        "{} is in the same component as {} but no path was found",
                        goal, start
                    );
                }
                PathResult::no_path()
            }
        }
    }

    fn successors(&self, grid: &TerrainGrid, node: &Point) -> Vec<(Point, i32)> {
        NEIGHBOR_OFFSETS
            .iter()
            .map(|&(dx, dy)| Point::new(node.x + dx, node.y + dy))
            .filter(|&n| grid.in_bounds(n))
            .filter_map(|n| grid.terrain(n).step_cost().map(|cost| (n, cost)))
            .collect()
    }
}

fn manhattan(a: &Point, b: &Point) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}
