//! Fuzzes the search by checking for many random terrain grids that a path is
//! found exactly when the goal is reachable, and that every found path is
//! step-adjacent, wall-free and priced identically to an independent Dijkstra
//! oracle.
use grid_util::point::Point;
use rand::prelude::*;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use terrain_pathfinding::{PathResult, Pathfinder, Terrain, TerrainGrid};

const OFFSETS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

fn random_grid(n: usize, rng: &mut StdRng) -> TerrainGrid {
    let mut grid = TerrainGrid::new(n, n).unwrap();
    for y in 0..n as i32 {
        for x in 0..n as i32 {
            let kind = match rng.gen_range(0..10) {
                0..=3 => Terrain::Wall,
                4 | 5 => Terrain::Rough,
                6 => Terrain::Boost,
                _ => Terrain::Normal,
            };
            grid.set_cell_state(Point::new(x, y), kind).unwrap();
        }
    }
    grid
}

fn random_point(grid: &TerrainGrid, rng: &mut StdRng) -> Point {
    Point::new(
        rng.gen_range(0..grid.width()) as i32,
        rng.gen_range(0..grid.height()) as i32,
    )
}

fn neighbors(grid: &TerrainGrid, p: Point) -> Vec<Point> {
    OFFSETS
        .iter()
        .map(|&(dx, dy)| Point::new(p.x + dx, p.y + dy))
        .filter(|&n| grid.in_bounds(n))
        .collect()
}

/// Independent step cost table in half-units, mirroring the documented
/// terrain costs.
fn step_cost(kind: Terrain) -> Option<i64> {
    match kind {
        Terrain::Wall => None,
        Terrain::Rough => Some(4),
        Terrain::Boost => Some(1),
        Terrain::Normal | Terrain::Start | Terrain::Goal => Some(2),
    }
}

/// Plain Dijkstra over the same neighborhood, as a cost oracle. Returns the
/// cheapest cost from start to goal in half-units, if any path exists.
fn dijkstra_cost(grid: &TerrainGrid, start: Point, goal: Point) -> Option<i64> {
    let index = |p: Point| p.y as usize * grid.width() + p.x as usize;
    let mut best = vec![i64::MAX; grid.width() * grid.height()];
    let mut heap = BinaryHeap::new();
    best[index(start)] = 0;
    heap.push(Reverse((0i64, start.x, start.y)));
    while let Some(Reverse((cost, x, y))) = heap.pop() {
        let p = Point::new(x, y);
        if p == goal {
            return Some(cost);
        }
        if cost > best[index(p)] {
            continue;
        }
        for n in neighbors(grid, p) {
            let Some(step) = step_cost(grid.cell_state(n).unwrap()) else {
                continue;
            };
            let next = cost + step;
            if next < best[index(n)] {
                best[index(n)] = next;
                heap.push(Reverse((next, n.x, n.y)));
            }
        }
    }
    None
}

fn assert_path_valid(grid: &TerrainGrid, start: Point, goal: Point, result: &PathResult) {
    assert_eq!(result.path.first(), Some(&start));
    assert_eq!(result.path.last(), Some(&goal));
    let mut walked = 0i64;
    for pair in result.path.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert_eq!((a.x - b.x).abs() + (a.y - b.y).abs(), 1);
        let kind = grid.cell_state(b).unwrap();
        assert_ne!(kind, Terrain::Wall);
        walked += step_cost(kind).unwrap();
    }
    assert_eq!(result.total_cost, walked as f64 / 2.0);
}

#[test]
fn fuzz() {
    const N: usize = 10;
    const N_GRIDS: usize = 1000;
    let mut rng = StdRng::seed_from_u64(0);
    let finder = Pathfinder::new();
    for _ in 0..N_GRIDS {
        let mut grid = random_grid(N, &mut rng);
        let start = random_point(&grid, &mut rng);
        let mut goal = random_point(&grid, &mut rng);
        while goal == start {
            goal = random_point(&grid, &mut rng);
        }
        grid.set_cell_state(start, Terrain::Start).unwrap();
        grid.set_cell_state(goal, Terrain::Goal).unwrap();
        grid.update();

        let oracle = dijkstra_cost(&grid, start, goal);
        let result = finder.find_path(&grid);
        // Show the grid if the outcomes disagree
        if result.is_found() != oracle.is_some() {
            println!("start {} goal {}\n{}", start, goal, grid);
        }
        assert_eq!(result.is_found(), oracle.is_some());
        match oracle {
            Some(cost) => {
                assert_path_valid(&grid, start, goal, &result);
                assert_eq!(result.total_cost, cost as f64 / 2.0);
            }
            None => {
                assert!(result.path.is_empty());
                assert_eq!(result.total_cost, PathResult::NO_PATH_COST);
            }
        }
    }
}

#[test]
fn fuzz_without_component_update() {
    // Same property with the components left dirty: the engine must fall back
    // to searching and still reach the right conclusion.
    const N: usize = 8;
    const N_GRIDS: usize = 500;
    let mut rng = StdRng::seed_from_u64(1);
    let finder = Pathfinder::new();
    for _ in 0..N_GRIDS {
        let mut grid = random_grid(N, &mut rng);
        let start = random_point(&grid, &mut rng);
        let mut goal = random_point(&grid, &mut rng);
        while goal == start {
            goal = random_point(&grid, &mut rng);
        }
        grid.set_cell_state(start, Terrain::Start).unwrap();
        grid.set_cell_state(goal, Terrain::Goal).unwrap();

        let oracle = dijkstra_cost(&grid, start, goal);
        let result = finder.find_path(&grid);
        assert_eq!(result.is_found(), oracle.is_some());
        if let Some(cost) = oracle {
            assert_eq!(result.total_cost, cost as f64 / 2.0);
        }
    }
}
