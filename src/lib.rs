//! # terrain_pathfinding
//!
//! An editable terrain grid paired with a weighted shortest-path engine.
//!
//! [TerrainGrid] owns the authoritative state of a bounded 2D grid in which
//! every cell holds one [Terrain] kind, together with the unique start and
//! goal positions. Mutations are bounds-checked and notify registered
//! [GridObserver]s synchronously, so a rendering layer can limit redraws to
//! the cells that actually changed. [Pathfinder] computes the lowest-cost
//! route between start and goal over the 4-connected neighborhood, where the
//! cost of a step depends on the terrain of the destination cell.
//! Pre-computes
//! [connected components](https://en.wikipedia.org/wiki/Component_(graph_theory))
//! over passable cells to avoid flood-filling behaviour if no path exists.

mod astar;
pub mod observer;
pub mod pathfinder;
pub mod terrain;

pub use observer::GridObserver;
pub use pathfinder::{PathResult, Pathfinder};
pub use terrain::Terrain;

use grid_util::grid::{Grid, SimpleGrid};
use grid_util::point::Point;
use log::{debug, info};
use petgraph::unionfind::UnionFind;
use thiserror::Error;

use core::fmt;

/// Largest allowed grid dimension (each of width and height).
pub const MAX_DIM: usize = 255;

/// Offsets of the 4-connected (von Neumann) neighborhood: up, down, left,
/// right. No diagonals.
pub(crate) const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// A coordinate outside the grid was passed to an accessor. This is a
    /// caller bug, never an expected runtime condition.
    #[error("coordinates ({x}, {y}) are outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },
    #[error("grid dimensions {width}x{height} are outside 1..={}", MAX_DIM)]
    InvalidDimensions { width: usize, height: usize },
}

/// Rectangular grid of [Terrain] cells with unique start and goal positions.
///
/// Dimensions are fixed at construction. The start and goal slots are either
/// unset or hold the coordinate of the single cell carrying that kind; the
/// slot and the cell state never disagree. Painting [Terrain::Start] or
/// [Terrain::Goal] moves the corresponding slot, reverting the previously
/// occupied cell to [Terrain::Normal]; painting any other kind over a
/// special cell vacates its slot.
///
/// [UnionFind] components over passable (non-Wall) cells give a cheap
/// reachability answer to the path engine. Walling a cell (potentially)
/// splits components, so it only marks them dirty; [TerrainGrid::update]
/// regenerates them on demand, and un-walling joins components in place.
pub struct TerrainGrid {
    terrain: SimpleGrid<Terrain>,
    start: Option<Point>,
    goal: Option<Point>,
    components: UnionFind<usize>,
    components_dirty: bool,
    observers: Vec<Box<dyn GridObserver>>,
}

impl TerrainGrid {
    /// Creates a grid with all cells [Terrain::Normal] and both slots unset.
    /// Each dimension must be in `1..=MAX_DIM`.
    pub fn new(width: usize, height: usize) -> Result<TerrainGrid, GridError> {
        if width == 0 || height == 0 || width > MAX_DIM || height > MAX_DIM {
            return Err(GridError::InvalidDimensions { width, height });
        }
        let mut grid = TerrainGrid {
            terrain: SimpleGrid::new(width, height, Terrain::Normal),
            start: None,
            goal: None,
            components: UnionFind::new(width * height),
            components_dirty: false,
            observers: Vec::new(),
        };
        grid.generate_components();
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.terrain.width()
    }

    pub fn height(&self) -> usize {
        self.terrain.height()
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as usize) < self.width() && (p.y as usize) < self.height()
    }

    /// Current start position, or [None] if unset.
    pub fn start(&self) -> Option<Point> {
        self.start
    }

    /// Current goal position, or [None] if unset.
    pub fn goal(&self) -> Option<Point> {
        self.goal
    }

    /// Terrain kind at `p`.
    pub fn cell_state(&self, p: Point) -> Result<Terrain, GridError> {
        self.validate(p)?;
        Ok(self.terrain(p))
    }

    /// Writes `kind` at `p`, maintaining the start/goal slot invariants and
    /// notifying observers of every cell whose state may have changed.
    pub fn set_cell_state(&mut self, p: Point, kind: Terrain) -> Result<(), GridError> {
        self.validate(p)?;
        match kind {
            Terrain::Start | Terrain::Goal => self.update_special_position(p, kind),
            _ => {
                self.write_terrain(p, kind);
                self.notify_cell(p);
                self.vacate_slot_at(p);
            }
        }
        Ok(())
    }

    /// Reverts every cell to [Terrain::Normal], unsets both slots and
    /// regenerates components, then delivers a single reset notification.
    pub fn clear_grid(&mut self) {
        debug!("clearing grid");
        for y in 0..self.height() {
            for x in 0..self.width() {
                self.terrain.set(x, y, Terrain::Normal);
            }
        }
        self.start = None;
        self.goal = None;
        self.generate_components();
        for observer in &mut self.observers {
            observer.on_grid_cleared();
        }
    }

    /// Registers an observer; it receives every subsequent notification.
    pub fn add_observer(&mut self, observer: Box<dyn GridObserver>) {
        self.observers.push(observer);
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            info!("Components are dirty: regenerating components");
            self.generate_components();
        }
    }

    /// Whether a wall placement has invalidated the component structure since
    /// it was last generated. While dirty, [TerrainGrid::unreachable] may
    /// report stale answers.
    pub fn components_dirty(&self) -> bool {
        self.components_dirty
    }

    /// Generates a new [UnionFind] structure and links up passable grid
    /// neighbours to the same components.
    pub fn generate_components(&mut self) {
        info!("Generating connected components");
        let w = self.width();
        let h = self.height();
        self.components = UnionFind::new(w * h);
        self.components_dirty = false;
        for x in 0..w {
            for y in 0..h {
                let p = Point::new(x as i32, y as i32);
                if !self.terrain(p).is_passable() {
                    continue;
                }
                let ix = self.cell_index(p);
                // Linking the right and down neighbours covers every edge once.
                for n in [Point::new(p.x + 1, p.y), Point::new(p.x, p.y + 1)] {
                    if self.in_bounds(n) && self.terrain(n).is_passable() {
                        let n_ix = self.cell_index(n);
                        self.components.union(ix, n_ix);
                    }
                }
            }
        }
    }

    /// Checks if `start` and `goal` lie in different components of passable
    /// cells. Only meaningful while the components are not dirty.
    pub fn unreachable(&self, start: &Point, goal: &Point) -> bool {
        if self.in_bounds(*start) && self.in_bounds(*goal) {
            let start_ix = self.cell_index(*start);
            let goal_ix = self.cell_index(*goal);
            if self.components.equiv(start_ix, goal_ix) {
                false
            } else {
                info!("{} and {} are not equivalent components", start_ix, goal_ix);
                true
            }
        } else {
            true
        }
    }

    /// Terrain at an in-bounds coordinate; used on already validated points.
    pub(crate) fn terrain(&self, p: Point) -> Terrain {
        self.terrain.get(p.x as usize, p.y as usize)
    }

    fn validate(&self, p: Point) -> Result<(), GridError> {
        if self.in_bounds(p) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                x: p.x,
                y: p.y,
                width: self.width(),
                height: self.height(),
            })
        }
    }

    fn cell_index(&self, p: Point) -> usize {
        p.y as usize * self.width() + p.x as usize
    }

    fn passable_neighbors(&self, p: Point) -> Vec<Point> {
        NEIGHBOR_OFFSETS
            .iter()
            .map(|&(dx, dy)| Point::new(p.x + dx, p.y + dy))
            .filter(|&n| self.in_bounds(n) && self.terrain(n).is_passable())
            .collect()
    }

    /// Low-level terrain write with component bookkeeping: un-walling joins
    /// the cell to its passable neighbours, walling flags the components as
    /// dirty since they may break apart.
    fn write_terrain(&mut self, p: Point, kind: Terrain) {
        let was_passable = self.terrain(p).is_passable();
        self.terrain.set(p.x as usize, p.y as usize, kind);
        if kind.is_passable() {
            let ix = self.cell_index(p);
            for n in self.passable_neighbors(p) {
                let n_ix = self.cell_index(n);
                self.components.union(ix, n_ix);
            }
        } else if was_passable {
            self.components_dirty = true;
        }
    }

    /// Moves the start or goal slot to `p`: the previously occupied cell (if
    /// any) reverts to Normal, the slot the new cell may have carried for the
    /// other kind is vacated, and the new cell is written and recorded, each
    /// step with its own notification. Correct when the new coordinate equals
    /// the old one.
    fn update_special_position(&mut self, p: Point, kind: Terrain) {
        debug!("moving {:?} position to {}", kind, p);
        let old = match kind {
            Terrain::Start => self.start,
            _ => self.goal,
        };
        if let Some(old_p) = old {
            self.write_terrain(old_p, Terrain::Normal);
            self.notify_cell(old_p);
        }
        // Painting one special kind over the cell holding the other demotes
        // the other: last write wins and its slot is vacated.
        match kind {
            Terrain::Start if self.goal == Some(p) => {
                self.goal = None;
                self.notify_goal_changed(Some(p), None);
            }
            Terrain::Goal if self.start == Some(p) => {
                self.start = None;
                self.notify_start_changed(Some(p), None);
            }
            _ => {}
        }
        self.write_terrain(p, kind);
        self.notify_cell(p);
        if kind == Terrain::Start {
            self.start = Some(p);
            self.notify_start_changed(old, Some(p));
        } else {
            self.goal = Some(p);
            self.notify_goal_changed(old, Some(p));
        }
    }

    /// Unsets whichever slot points at `p`, when an ordinary kind was painted
    /// over a special cell.
    fn vacate_slot_at(&mut self, p: Point) {
        if self.start == Some(p) {
            self.start = None;
            self.notify_start_changed(Some(p), None);
        }
        if self.goal == Some(p) {
            self.goal = None;
            self.notify_goal_changed(Some(p), None);
        }
    }

    fn notify_cell(&mut self, p: Point) {
        for observer in &mut self.observers {
            observer.on_cell_updated(p);
        }
    }

    fn notify_start_changed(&mut self, old: Option<Point>, new: Option<Point>) {
        for observer in &mut self.observers {
            observer.on_start_changed(old, new);
        }
    }

    fn notify_goal_changed(&mut self, old: Option<Point>, new: Option<Point>) {
        for observer in &mut self.observers {
            observer.on_goal_changed(old, new);
        }
    }

    /// Forces the slots to arbitrary values, bypassing the update protocol.
    #[cfg(test)]
    pub(crate) fn force_slots(&mut self, start: Option<Point>, goal: Option<Point>) {
        self.start = start;
        self.goal = goal;
    }
}

impl fmt::Display for TerrainGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..self.height() {
            for x in 0..self.width() {
                let c = match self.terrain.get(x, y) {
                    Terrain::Normal => '.',
                    Terrain::Wall => '#',
                    Terrain::Rough => '~',
                    Terrain::Boost => '+',
                    Terrain::Start => 'S',
                    Terrain::Goal => 'G',
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
