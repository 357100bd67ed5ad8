//! Board controller
//!
//! Owns the grid and every ball, and sequences a removal:
//! spin (highlight) -> vanish (commit) -> drop (gravity, then closing empty
//! columns) -> recluster. While a vanish/drop sequence runs, player input is
//! dropped on the floor (`block_events`).
//!
//! Time is `f64` seconds on whatever monotonic clock the host uses. Pointer
//! driven transitions are stamped with the time of the latest `tick`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ball::{Ball, BallEvent, BallState};
use super::grid::{BallId, ColorIndex, Grid};
use super::score::{ScoreRecord, clear_bonus, cluster_points, unix_now};
use crate::assets::AssetTable;
use crate::error::{Error, Result};
use crate::layout::{Cell, Layout, Rect};
use crate::seed::GameSeed;

/// Board dimensions and difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub width_px: u32,
    pub height_px: u32,
    pub num_colors: usize,
    pub columns: usize,
    pub rows: usize,
}

impl BoardConfig {
    pub fn new(width_px: u32, height_px: u32, num_colors: usize, columns: usize, rows: usize) -> Self {
        Self {
            width_px,
            height_px,
            num_colors,
            columns,
            rows,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.columns == 0 || self.rows == 0 {
            return Err(Error::InvalidConfig(format!(
                "board must have at least one cell ({}x{})",
                self.columns, self.rows
            )));
        }
        if self.num_colors == 0 {
            return Err(Error::InvalidConfig("at least one colour is required".into()));
        }
        Ok(())
    }
}

/// One entry of the draw list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub ball: BallId,
    /// Index into the board's `AssetTable`
    pub sheet: usize,
    pub frame: usize,
    pub rect: Rect,
}

/// Complete game board
#[derive(Debug, Clone)]
pub struct Board {
    columns: usize,
    rows: usize,
    num_colors: usize,
    seed: GameSeed,
    layout: Layout,
    assets: AssetTable,
    /// Colour index -> sheet index
    palette: Vec<usize>,
    grid: Grid,
    /// Every ball ever created, indexed by id; gone balls stay as `Gone`
    balls: Vec<Ball>,
    live_balls: usize,
    spinning: Vec<BallId>,
    vanishing: Vec<BallId>,
    dropping: Vec<BallId>,
    /// Landed during the current tick; reported once as damage
    dropped: Vec<BallId>,
    pending_damage: Vec<Rect>,
    block_events: bool,
    score: u64,
    /// Time of the latest tick (seconds)
    t: f64,
}

impl Board {
    /// Create a board with a random layout drawn from `seed` (a fresh seed if `None`)
    pub fn new(config: BoardConfig, seed: Option<GameSeed>, assets: AssetTable, now: f64) -> Result<Self> {
        config.validate()?;
        let seed = seed.unwrap_or_else(GameSeed::generate);
        let mut rng = seed.rng_state().to_rng();

        // Palette first, then per-ball colour and phase, column by column
        let palette = assets.palette(config.num_colors, &mut rng);
        let num_colors = palette.len();
        if num_colors == 0 {
            return Err(Error::ImageAsset("asset table has no sprite sheets".into()));
        }
        let mut layout = Vec::with_capacity(config.columns * config.rows);
        for _ in 0..config.columns * config.rows {
            let color = rng.random_range(0..num_colors) as ColorIndex;
            let rotation = rng.random::<f64>();
            layout.push(Some((color, rotation)));
        }

        let board = Self::assemble(config, seed, assets, palette, &layout, now);
        log::info!(
            "New {}x{} board, {} colours, seed {}",
            board.columns,
            board.rows,
            board.num_colors,
            board.seed
        );
        Ok(board)
    }

    /// Build a board from a column-major layout of `(colour, rotation)`
    fn assemble(
        config: BoardConfig,
        seed: GameSeed,
        assets: AssetTable,
        palette: Vec<usize>,
        layout: &[Option<(ColorIndex, f64)>],
        now: f64,
    ) -> Self {
        let (columns, rows) = (config.columns, config.rows);
        let mut grid = Grid::new(columns, rows);
        let mut balls = Vec::with_capacity(columns * rows);
        for (idx, entry) in layout.iter().take(columns * rows).enumerate() {
            if let Some((color, rotation)) = *entry {
                let cell = Cell::new(idx / rows, idx % rows);
                let id = grid.add_ball(color);
                grid.set(cell, Some(id));
                balls.push(Ball::new(id, color, cell, rotation, now));
            }
        }
        grid.recompute_clusters();

        Self {
            columns,
            rows,
            num_colors: palette.len(),
            seed,
            layout: Layout::new(config.width_px, config.height_px, columns, rows),
            assets,
            palette,
            grid,
            live_balls: balls.len(),
            balls,
            spinning: Vec::new(),
            vanishing: Vec::new(),
            dropping: Vec::new(),
            dropped: Vec::new(),
            pending_damage: Vec::new(),
            block_events: false,
            score: 0,
            t: now,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn num_colors(&self) -> usize {
        self.num_colors
    }

    pub fn seed(&self) -> &GameSeed {
        &self.seed
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        self.balls.get(id)
    }

    /// Ball logically occupying a cell
    pub fn ball_at(&self, cell: Cell) -> Option<&Ball> {
        self.grid.get(cell).and_then(|id| self.balls.get(id))
    }

    /// Balls still on the board, including ones mid-vanish
    pub fn live_balls(&self) -> usize {
        self.live_balls
    }

    /// A vanish/drop sequence is running; input is ignored
    pub fn block_events(&self) -> bool {
        self.block_events
    }

    pub fn spinning_cluster(&self) -> &[BallId] {
        &self.spinning
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    /// Some cluster of two or more balls remains
    pub fn has_clusters(&self) -> bool {
        self.grid.has_clusters()
    }

    pub fn is_game_over(&self) -> bool {
        !self.block_events && !self.has_clusters()
    }

    /// Bring the clock up to `now` before a pointer-driven transition.
    /// While a sequence runs only `tick` moves time.
    fn catch_up(&mut self, now: f64) {
        if !self.block_events {
            self.t = now.max(self.t);
        }
    }

    /// Highlight the cluster under `cell` at time `now`
    pub fn highlight(&mut self, cell: Cell, now: f64) {
        if self.block_events {
            return;
        }
        self.catch_up(now);
        let Some(id) = self.grid.get(cell) else {
            return;
        };
        if self.balls[id].state == BallState::Spinning {
            return;
        }
        if self.grid.cluster_size(cell) < 2 {
            return;
        }

        self.clear_highlight(now);
        let members: Vec<BallId> = self
            .grid
            .cluster_of(cell)
            .iter()
            .filter_map(|&c| self.grid.get(c))
            .collect();
        for &id in &members {
            self.balls[id].start_spinning(self.t);
            let rect = self.ball_rect(id);
            self.pending_damage.push(rect);
        }
        self.spinning = members;
    }

    /// Return the spinning cluster to idle
    pub fn clear_highlight(&mut self, now: f64) {
        self.catch_up(now);
        for id in std::mem::take(&mut self.spinning) {
            self.balls[id].stop_spinning(self.t);
            let rect = self.ball_rect(id);
            self.pending_damage.push(rect);
        }
    }

    /// Remove the spinning cluster containing `cell`.
    ///
    /// Returns the points scored, or `None` while input is blocked.
    pub fn commit(&mut self, cell: Cell, now: f64) -> Result<Option<u64>> {
        if self.block_events {
            return Ok(None);
        }
        self.catch_up(now);
        let id = self
            .grid
            .get(cell)
            .ok_or(Error::InvalidState("commit on an empty cell"))?;
        if self.balls[id].state != BallState::Spinning || !self.spinning.contains(&id) {
            return Err(Error::InvalidState("commit outside the spinning cluster"));
        }

        self.block_events = true;
        self.vanishing = std::mem::take(&mut self.spinning);
        for &id in &self.vanishing {
            let ball = &mut self.balls[id];
            self.grid.take(ball.cell);
            ball.vanish(self.t)?;
        }

        let n = self.vanishing.len();
        let points = cluster_points(n);
        self.score += points;
        log::debug!("Removed cluster of {n} for {points} points (total {})", self.score);
        Ok(Some(points))
    }

    /// Any spin, vanish or drop in progress
    pub fn has_pending_animations(&self) -> bool {
        !self.spinning.is_empty() || !self.vanishing.is_empty() || !self.dropping.is_empty()
    }

    /// Advance every animated ball to `now`, returning the damaged rects
    pub fn tick(&mut self, now: f64) -> Result<Vec<Rect>> {
        let mut damage = std::mem::take(&mut self.pending_damage);
        if !self.has_pending_animations() {
            self.t = now.max(self.t);
            return Ok(damage);
        }

        // Where moving balls were drawn last frame
        let mut previous: Vec<(BallId, Rect)> = self
            .vanishing
            .iter()
            .chain(&self.dropping)
            .map(|&id| (id, self.ball_rect(id)))
            .collect();
        self.t = now.max(self.t);

        for id in self.vanishing.clone() {
            if self.balls[id].advance(self.t) == Some(BallEvent::Vanished) {
                self.remove_ball(id)?;
            }
        }
        for id in self.dropping.clone() {
            if self.balls[id].advance(self.t) == Some(BallEvent::Landed) {
                self.stop_dropping_ball(id)?;
            }
        }

        let changed: Vec<BallId> = self
            .spinning
            .iter()
            .chain(&self.vanishing)
            .chain(&self.dropping)
            .chain(&self.dropped)
            .copied()
            .collect();
        for id in changed {
            let rect = self.ball_rect(id);
            match previous.iter().position(|&(p, _)| p == id) {
                Some(i) => damage.push(previous.swap_remove(i).1.union(&rect)),
                None => damage.push(rect),
            }
        }
        // Balls that finished vanishing
        damage.extend(previous.into_iter().map(|(_, rect)| rect));
        self.dropped.clear();
        Ok(damage)
    }

    /// A vanishing ball finished its animation
    fn remove_ball(&mut self, id: BallId) -> Result<()> {
        let pos = self
            .vanishing
            .iter()
            .position(|&v| v == id)
            .filter(|_| self.balls[id].state == BallState::Gone)
            .ok_or(Error::InvalidState("remove_ball called for a ball that is not vanishing"))?;
        self.vanishing.remove(pos);
        self.live_balls -= 1;
        if self.vanishing.is_empty() {
            self.begin_drop_phase()?;
        }
        Ok(())
    }

    /// Gravity pass: fill vertical gaps, then slide columns left over empty ones
    fn begin_drop_phase(&mut self) -> Result<()> {
        if !self.vanishing.is_empty() {
            return Err(Error::InvalidState("drop phase started while balls are vanishing"));
        }
        self.dropping.clear();

        let mut num_empty_cols = 0;
        for col in 0..self.columns {
            if num_empty_cols > 0 {
                for row in 0..self.rows {
                    if let Some(id) = self.grid.get(Cell::new(col, row)) {
                        self.mark_dropping(id);
                        self.balls[id].drop_horizontally(num_empty_cols, self.t);
                    }
                }
            }

            let mut num_empty_rows = 0;
            for row in (0..self.rows).rev() {
                match self.grid.get(Cell::new(col, row)) {
                    None => num_empty_rows += 1,
                    Some(id) if num_empty_rows > 0 => {
                        self.mark_dropping(id);
                        self.balls[id].drop_vertically(num_empty_rows, self.t);
                    }
                    Some(_) => {}
                }
            }
            if num_empty_rows == self.rows {
                num_empty_cols += 1;
            }
        }

        if self.dropping.is_empty() {
            return self.end_drop_phase();
        }
        for &id in &self.dropping {
            self.grid.take(self.balls[id].cell);
        }
        log::debug!("Dropping {} balls", self.dropping.len());
        Ok(())
    }

    fn mark_dropping(&mut self, id: BallId) {
        if self.balls[id].state != BallState::Dropping {
            self.dropping.push(id);
        }
    }

    /// A dropping ball reached its target cell
    fn stop_dropping_ball(&mut self, id: BallId) -> Result<()> {
        let pos = self
            .dropping
            .iter()
            .position(|&d| d == id)
            .ok_or(Error::InvalidState("stop_dropping_ball called for a ball that is not dropping"))?;
        self.dropping.remove(pos);
        self.grid.set(self.balls[id].cell, Some(id));
        self.dropped.push(id);
        if self.dropping.is_empty() {
            self.end_drop_phase()?;
        }
        Ok(())
    }

    /// Last ball has settled: recluster and accept input again
    fn end_drop_phase(&mut self) -> Result<()> {
        if !self.dropping.is_empty() || !self.vanishing.is_empty() {
            return Err(Error::InvalidState("drop phase ended while balls are still moving"));
        }
        self.grid.recompute_clusters();
        self.block_events = false;
        if !self.grid.has_clusters() {
            log::info!("Game over: {} points, {} balls left", self.score, self.live_balls);
        }
        Ok(())
    }

    /// Score to record for the game as it stands now
    pub fn final_score(&self) -> ScoreRecord {
        self.final_score_at(unix_now())
    }

    pub fn final_score_at(&self, timestamp: u64) -> ScoreRecord {
        let cleared = self.live_balls == 0;
        let bonus = if cleared {
            clear_bonus(self.columns, self.rows, self.num_colors)
        } else {
            0
        };
        ScoreRecord::new(
            self.score + bonus,
            cleared,
            self.columns,
            self.rows,
            self.num_colors,
            timestamp,
        )
    }

    /// Pixel rect a ball currently covers
    pub fn ball_rect(&self, id: BallId) -> Rect {
        let ball = &self.balls[id];
        match ball.state {
            BallState::Vanishing => {
                let size = ball.vanish_size_at(self.t) as f32;
                self.layout.rect(
                    ball.cell.col as f32 + 0.5 - size / 2.0,
                    ball.cell.row as f32 + 0.5 - size / 2.0,
                    size,
                    size,
                )
            }
            _ => {
                let pos = ball.position_at(self.t);
                self.layout.rect(pos.x, pos.y, 1.0, 1.0)
            }
        }
    }

    /// Draw list for every live ball
    pub fn sprites(&self) -> impl Iterator<Item = Sprite> + '_ {
        self.balls.iter().filter(|b| b.is_live()).map(|ball| {
            let sheet = self.palette.get(ball.color as usize).copied().unwrap_or(0);
            let frame = self
                .assets
                .sheet(sheet)
                .map(|s| s.frame_index(ball.rotation_at(self.t)))
                .unwrap_or(0);
            Sprite {
                ball: ball.id,
                sheet,
                frame,
                rect: self.ball_rect(ball.id),
            }
        })
    }

    /// The surface changed size; the whole board must be redrawn
    pub fn resize(&mut self, width_px: u32, height_px: u32) {
        self.layout = Layout::new(width_px, height_px, self.columns, self.rows);
        self.pending_damage.push(Rect::new(0, 0, width_px as i32, height_px as i32));
    }

    /// Pointer moved over the surface
    pub fn pointer_move(&mut self, x: f32, y: f32, now: f64) {
        if self.block_events {
            return;
        }
        let ball = self
            .layout
            .cell_at(x, y)
            .and_then(|cell| self.ball_at(cell).map(|b| (cell, b.state)));
        match ball {
            None => self.clear_highlight(now),
            Some((_, BallState::Spinning)) => {}
            Some((cell, _)) => {
                self.clear_highlight(now);
                self.highlight(cell, now);
            }
        }
    }

    /// Pointer left the surface
    pub fn pointer_leave(&mut self, now: f64) {
        self.clear_highlight(now);
    }

    /// Pointer clicked; removes the cluster if the ball under it is spinning
    pub fn pointer_click(&mut self, x: f32, y: f32, now: f64) -> Result<Option<u64>> {
        if self.block_events {
            return Ok(None);
        }
        let Some(cell) = self.layout.cell_at(x, y) else {
            return Ok(None);
        };
        let spinning = self
            .ball_at(cell)
            .is_some_and(|b| b.state == BallState::Spinning);
        if spinning {
            self.commit(cell, now)
        } else {
            Ok(None)
        }
    }
}
