//! The closed set of terrain kinds a cell can hold and their movement costs.

/// Integer cost units per 1.0 of movement cost. Costs are stored scaled so the
/// search can use an [Ord] cost type instead of floats; results are converted
/// back with [cost_to_float].
pub(crate) const COST_SCALE: i32 = 2;

/// Smallest possible per-step cost in scaled units (a step onto a Boost cell).
/// Scaling the Manhattan distance by this keeps the heuristic admissible.
pub(crate) const MIN_STEP_COST: i32 = COST_SCALE / 2;

/// Terrain kind of a single grid cell. Every cell holds exactly one kind at
/// all times; a freshly created or cleared cell is [Terrain::Normal].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Terrain {
    #[default]
    Normal,
    Wall,
    Rough,
    Boost,
    Start,
    Goal,
}

impl Terrain {
    /// Cost of stepping *onto* a cell of this kind, in scaled units
    /// ([COST_SCALE] per 1.0), or [None] if the cell cannot be entered.
    pub(crate) fn step_cost(self) -> Option<i32> {
        match self {
            Terrain::Wall => None,
            Terrain::Rough => Some(2 * COST_SCALE),
            Terrain::Boost => Some(COST_SCALE / 2),
            Terrain::Normal | Terrain::Start | Terrain::Goal => Some(COST_SCALE),
        }
    }

    /// Whether a path may pass through a cell of this kind.
    pub fn is_passable(self) -> bool {
        self != Terrain::Wall
    }
}

/// Converts a scaled integer cost to the floating point equivalent where a
/// step onto a Normal cell has cost 1.0.
pub(crate) fn cost_to_float(cost: i32) -> f64 {
    f64::from(cost) / f64::from(COST_SCALE)
}
