//! Procedural levels: a Sidewinder maze carved into solid ground, then
//! player, enemy and rock placement.
//!
//! Generation is fully determined by `(width, height, difficulty, seed)`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::grid::symbol;
use crate::level::{EnemySpawnData, EnemyType, LevelData, LevelPoint};

/// Side length of endless-mode levels
pub const ENDLESS_SIZE: i32 = 15;

/// Smallest level the maze carver accepts per axis
pub const MIN_SIZE: i32 = 5;

/// Probability of extending a run eastwards instead of closing it
const EAST_CARVE_CHANCE: f32 = 0.6;

/// Random placement tries before falling back to a scan
const PLACEMENT_ATTEMPTS: u32 = 200;

/// Enemies never spawn closer than this to the player start (in blocks)
const MIN_ENEMY_DISTANCE: f32 = 4.0;

/// Number of enemies for a difficulty level
#[must_use]
pub fn enemy_count(difficulty: u32) -> usize {
    3 + difficulty as usize
}

/// Number of rocks for a difficulty level
#[must_use]
pub fn rock_count(difficulty: u32) -> usize {
    2 + (difficulty / 2) as usize
}

/// Generate an endless-mode level (15x15)
#[must_use]
pub fn generate_endless(difficulty: u32, seed: u64) -> LevelData {
    generate_sidewinder(ENDLESS_SIZE, ENDLESS_SIZE, difficulty, seed)
}

/// Symbol matrix in level coordinates (`cells[y][x]`, y = 0 is the top row)
struct Canvas {
    width: i32,
    height: i32,
    cells: Vec<Vec<char>>,
}

impl Canvas {
    fn new(width: i32, height: i32) -> Self {
        let cells = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        if x == 0 || x == width - 1 || y == 0 || y == height - 1 {
                            symbol::INDESTRUCTIBLE
                        } else {
                            symbol::GROUND
                        }
                    })
                    .collect()
            })
            .collect();
        Self {
            width,
            height,
            cells,
        }
    }

    fn get(&self, x: i32, y: i32) -> Option<char> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y as usize][x as usize])
    }

    fn set(&mut self, x: i32, y: i32, c: char) {
        if self.get(x, y).is_some() {
            self.cells[y as usize][x as usize] = c;
        }
    }

    /// Open a cell; walls are never carved
    fn carve(&mut self, x: i32, y: i32) {
        if self.get(x, y).is_some_and(|c| c != symbol::INDESTRUCTIBLE) {
            self.set(x, y, symbol::EMPTY);
        }
    }

    fn into_rows(self) -> Vec<String> {
        self.cells
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect()
    }
}

/// Carve a Sidewinder maze. Maze cells sit on odd coordinates; the first
/// interior row is one open corridor so every cell connects.
fn carve_sidewinder(canvas: &mut Canvas, rng: &mut impl Rng) {
    let (start_x, end_x) = (1, canvas.width - 2);
    let (start_y, end_y) = (1, canvas.height - 2);

    for y in (start_y..=end_y).step_by(2) {
        let at_northern_boundary = y - 2 < start_y;
        let mut run_start = start_x;

        for x in (start_x..=end_x).step_by(2) {
            let at_eastern_boundary = x + 2 > end_x;
            let carve_east = !at_eastern_boundary
                && (at_northern_boundary || rng.gen_range(0.0f32..1.0) < EAST_CARVE_CHANCE);

            if carve_east {
                canvas.carve(x, y);
                canvas.carve(x + 1, y);
                canvas.carve(x + 2, y);
                continue;
            }

            canvas.carve(x, y);
            if !at_northern_boundary {
                let cell_count = (x - run_start) / 2 + 1;
                let north_x = run_start + rng.gen_range(0..cell_count) * 2;
                canvas.carve(north_x, y - 1);
                canvas.carve(north_x, y - 2);
            }
            run_start = x + 2;
        }
    }
}

/// Pick `count` cells, first by random probing, then by scanning so the
/// count is met whenever enough eligible cells exist.
fn place_cells(
    canvas: &Canvas,
    rng: &mut impl Rng,
    count: usize,
    x_range: std::ops::Range<i32>,
    y_range: std::ops::Range<i32>,
    eligible: impl Fn(&Canvas, i32, i32) -> bool,
) -> Vec<(i32, i32)> {
    let mut chosen: Vec<(i32, i32)> = Vec::with_capacity(count);
    if x_range.is_empty() || y_range.is_empty() {
        return chosen;
    }

    let mut attempts = 0;
    while chosen.len() < count && attempts < PLACEMENT_ATTEMPTS {
        attempts += 1;
        let x = rng.gen_range(x_range.clone());
        let y = rng.gen_range(y_range.clone());
        if eligible(canvas, x, y) && !chosen.contains(&(x, y)) {
            chosen.push((x, y));
        }
    }

    if chosen.len() < count {
        log::debug!(
            "Random placement found {}/{} cells, scanning for the rest",
            chosen.len(),
            count
        );
        for y in y_range.clone() {
            for x in x_range.clone() {
                if chosen.len() >= count {
                    break;
                }
                if eligible(canvas, x, y) && !chosen.contains(&(x, y)) {
                    chosen.push((x, y));
                }
            }
        }
    }

    if chosen.len() < count {
        log::warn!("Only {} of {} placements fit the level", chosen.len(), count);
    }
    chosen
}

/// Generate a Sidewinder level of the given size.
///
/// The result has an indestructible border, an open player start at the
/// center connected to the maze, `3 + difficulty` enemies on open cells at
/// least four blocks from the start, and `2 + difficulty / 2` rocks embedded
/// in supported ground. Sizes below [`MIN_SIZE`] are raised to it.
#[must_use]
pub fn generate_sidewinder(width: i32, height: i32, difficulty: u32, seed: u64) -> LevelData {
    let width = width.max(MIN_SIZE);
    let height = height.max(MIN_SIZE);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut canvas = Canvas::new(width, height);
    carve_sidewinder(&mut canvas, &mut rng);

    // Center start, linked to the nearest maze cell for even sizes
    let (player_x, player_y) = (width / 2, height / 2);
    let cell_x = if player_x % 2 == 0 { player_x - 1 } else { player_x };
    let cell_y = if player_y % 2 == 0 { player_y - 1 } else { player_y };
    canvas.set(player_x, player_y, symbol::EMPTY);
    canvas.carve(cell_x, player_y);
    canvas.carve(cell_x, cell_y);

    let enemy_cells = place_cells(
        &canvas,
        &mut rng,
        enemy_count(difficulty),
        1..width - 1,
        1..height - 1,
        |c, x, y| {
            let (dx, dy) = ((x - player_x) as f32, (y - player_y) as f32);
            c.get(x, y) == Some(symbol::EMPTY) && (dx * dx + dy * dy).sqrt() > MIN_ENEMY_DISTANCE
        },
    );
    let enemies = enemy_cells
        .into_iter()
        .map(|(x, y)| {
            let kind = if rng.gen_range(0.0f32..1.0) > 0.5 {
                EnemyType::Pooka
            } else {
                EnemyType::Fygar
            };
            EnemySpawnData {
                enemy_type: kind.tag().to_string(),
                position: LevelPoint::new(x, y),
            }
        })
        .collect::<Vec<_>>();

    // Rocks sit in ground with something solid underneath so they do not
    // drop before the player digs below them.
    let rock_cells = place_cells(
        &canvas,
        &mut rng,
        rock_count(difficulty),
        1..width - 1,
        1..height - 2,
        |c, x, y| {
            c.get(x, y) == Some(symbol::GROUND)
                && matches!(
                    c.get(x, y + 1),
                    Some(symbol::GROUND | symbol::INDESTRUCTIBLE)
                )
        },
    );
    for &(x, y) in &rock_cells {
        canvas.set(x, y, symbol::ROCK);
    }

    log::info!(
        "Generated {}x{} level (difficulty {}, seed {}): {} enemies, {} rocks",
        width,
        height,
        difficulty,
        seed,
        enemies.len(),
        rock_cells.len()
    );

    LevelData {
        level_id: format!("auto_{seed}"),
        level_name: "Sidewinder Area".to_string(),
        map: canvas.into_rows(),
        player_start_position: LevelPoint::new(player_x, player_y),
        enemies,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    fn cell(level: &LevelData, x: i32, y: i32) -> char {
        level.map[y as usize].chars().nth(x as usize).unwrap()
    }

    fn is_border(level: &LevelData, x: i32, y: i32) -> bool {
        let w = level.map[0].len() as i32;
        let h = level.map.len() as i32;
        x == 0 || y == 0 || x == w - 1 || y == h - 1
    }

    /// Open cells reachable from the player start through open cells
    fn reachable_open_cells(level: &LevelData) -> usize {
        let start = level.player_start_position;
        let w = level.map[0].len() as i32;
        let h = level.map.len() as i32;
        let mut seen = vec![vec![false; w as usize]; h as usize];
        let mut queue = VecDeque::from([(start.x, start.y)]);
        seen[start.y as usize][start.x as usize] = true;
        let mut count = 0;

        while let Some((x, y)) = queue.pop_front() {
            count += 1;
            for (dx, dy) in [(0, 1), (0, -1), (-1, 0), (1, 0)] {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= w || ny >= h {
                    continue;
                }
                if seen[ny as usize][nx as usize] || cell(level, nx, ny) != symbol::EMPTY {
                    continue;
                }
                seen[ny as usize][nx as usize] = true;
                queue.push_back((nx, ny));
            }
        }
        count
    }

    fn open_cells(level: &LevelData) -> usize {
        level
            .map
            .iter()
            .map(|row| row.chars().filter(|&c| c == symbol::EMPTY).count())
            .sum()
    }

    #[test]
    fn test_endless_level_difficulty_one() {
        let level = generate_endless(1, 42);

        assert_eq!(level.map.len(), 15);
        assert!(level.map.iter().all(|row| row.len() == 15));
        assert_eq!(level.enemies.len(), 4);

        let rocks: usize = level.map.iter().map(|r| r.matches('R').count()).sum();
        assert!(rocks >= 2);

        for y in 0..15 {
            for x in 0..15 {
                if is_border(&level, x, y) {
                    assert_eq!(cell(&level, x, y), '#', "border at ({x},{y})");
                }
            }
        }

        let start = level.player_start_position;
        assert!(start.x > 0 && start.x < 14 && start.y > 0 && start.y < 14);
        assert_eq!(cell(&level, start.x, start.y), '0');
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(generate_sidewinder(21, 17, 3, 7), generate_sidewinder(21, 17, 3, 7));
        assert_ne!(generate_endless(1, 1).map, generate_endless(1, 2).map);
    }

    #[test]
    fn test_maze_is_connected_from_start() {
        for seed in 0..20 {
            let level = generate_endless(2, seed);
            assert_eq!(
                reachable_open_cells(&level),
                open_cells(&level),
                "seed {seed} left unreachable tunnels"
            );
        }
    }

    #[test]
    fn test_even_sized_start_joins_maze() {
        for seed in 0..10 {
            let level = generate_sidewinder(16, 12, 0, seed);
            assert_eq!(reachable_open_cells(&level), open_cells(&level));
        }
    }

    #[test]
    fn test_placements_respect_rules() {
        for seed in 0..20 {
            let difficulty = (seed % 5) as u32;
            let level = generate_endless(difficulty, seed);
            let start = level.player_start_position;

            assert_eq!(level.enemies.len(), enemy_count(difficulty));
            for enemy in &level.enemies {
                let p = enemy.position;
                assert!(!is_border(&level, p.x, p.y));
                assert_ne!((p.x, p.y), (start.x, start.y));
                assert_eq!(cell(&level, p.x, p.y), '0');
                assert!(EnemyType::from_tag(&enemy.enemy_type).is_some());
            }

            let mut rocks = 0;
            for (y, row) in level.map.iter().enumerate() {
                for (x, c) in row.chars().enumerate() {
                    if c == 'R' {
                        rocks += 1;
                        assert!(!is_border(&level, x as i32, y as i32));
                        assert_ne!((x as i32, y as i32), (start.x, start.y));
                        let below = cell(&level, x as i32, y as i32 + 1);
                        assert!(below == '1' || below == '#');
                    }
                }
            }
            assert_eq!(rocks, rock_count(difficulty));
        }
    }

    #[test]
    fn test_tiny_sizes_are_raised() {
        let level = generate_sidewinder(1, 2, 0, 3);
        assert_eq!(level.map.len(), MIN_SIZE as usize);
        assert_eq!(level.map[0].len(), MIN_SIZE as usize);
    }
}
