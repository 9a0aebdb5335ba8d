//! Synchronous notifications for grid mutations, consumed by a rendering
//! layer to limit redraw scope.

use grid_util::point::Point;

/// Receives notifications from [crate::TerrainGrid] mutations. Delivery is
/// synchronous: every callback runs before the mutating call returns.
///
/// All methods default to no-ops so implementors only handle what they need.
pub trait GridObserver {
    /// A single cell's terrain may have changed.
    fn on_cell_updated(&mut self, _pos: Point) {}
    /// The start slot moved, including to or from unset.
    fn on_start_changed(&mut self, _old: Option<Point>, _new: Option<Point>) {}
    /// The goal slot moved, including to or from unset.
    fn on_goal_changed(&mut self, _old: Option<Point>, _new: Option<Point>) {}
    /// Every cell reverted to Normal and both slots were cleared.
    fn on_grid_cleared(&mut self) {}
}

pub struct NoOpGridObserver;
impl GridObserver for NoOpGridObserver {}
