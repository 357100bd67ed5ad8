//! Same Ball entry point
//!
//! Native builds have no window; this driver plays a game headlessly so a
//! seed can be checked end to end: it hovers and clicks the largest cluster
//! on a simulated clock paced by `TickPacer` until no move is left, then
//! records the score.
//!
//! Usage: `same-ball [SEED]`

use std::time::{Duration, Instant};

use anyhow::{Result, bail};

use same_ball::seed::seed_or_generate;
use same_ball::{AssetTable, Board, HighScores, Settings, TickPacer};

const SETTINGS_FILE: &str = "same-ball.json";
const SCORES_FILE: &str = "same-ball-scores.txt";

/// Surface the board is laid out in
const SURFACE: (u32, u32) = (800, 600);
/// Rotation frames per stock sprite film
const FRAMES_PER_FILM: usize = 32;

fn main() -> Result<()> {
    env_logger::init();

    let mut settings = Settings::load(SETTINGS_FILE);
    let seed = seed_or_generate(std::env::args().nth(1).as_deref());
    settings.last_seed = Some(seed.clone());

    let config = settings.board_config(SURFACE.0, SURFACE.1);
    let mut board = Board::new(config, Some(seed), AssetTable::standard(FRAMES_PER_FILM)?, 0.0)?;
    log::info!("Seed {} - share it to replay this board", board.seed());

    let moves = autoplay(&mut board, &TickPacer::from_settings(&settings))?;
    let record = board.final_score();
    log::info!(
        "Game over after {moves} moves: {} points{}",
        record.points,
        if record.cleared_board { " (board cleared)" } else { "" }
    );
    println!("{} {}", board.seed(), record.points);

    let mut scores = HighScores::load_or_default(SCORES_FILE);
    if let Some(rank) = scores.add(record) {
        log::info!("New high score, rank {rank}");
        scores.save(SCORES_FILE)?;
    }
    settings.save(SETTINGS_FILE)?;
    Ok(())
}

/// Remove the largest cluster until none is left; returns the move count
fn autoplay(board: &mut Board, pacer: &TickPacer) -> Result<usize> {
    let frame = pacer.frame_duration().as_secs_f64();
    let mut t = board.time();
    let mut moves = 0;

    while !board.is_game_over() {
        let Some(cell) = board.grid().largest_cluster().map(|c| c[0]) else {
            break;
        };
        let rect = board.layout().cell_rect(cell);
        let (x, y) = ((rect.x + rect.w / 2) as f32, (rect.y + rect.h / 2) as f32);

        board.pointer_move(x, y, t);
        t += frame;
        board.tick(t)?;
        let Some(points) = board.pointer_click(x, y, t)? else {
            bail!("cluster at ({}, {}) did not respond to a click", cell.col, cell.row);
        };
        moves += 1;
        log::debug!("Move {moves}: {points} points at ({}, {})", cell.col, cell.row);

        // Simulated time follows the pacer, including its CPU back-off
        let mut last_update = Duration::ZERO;
        while let Some(delay) = pacer.next_delay(last_update, board.has_pending_animations()) {
            t += delay.as_secs_f64();
            let started = Instant::now();
            board.tick(t)?;
            last_update = started.elapsed();
        }
    }
    board.pointer_leave(t);
    Ok(moves)
}
