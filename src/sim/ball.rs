//! Ball entity and its animation state machine
//!
//! Every animated quantity is a closed-form function of the time elapsed
//! since the ball entered its current state, so a tick only needs the
//! current clock.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::{BallId, ColorIndex};
use crate::consts::*;
use crate::error::{Error, Result};
use crate::layout::Cell;

/// Animation state of a ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BallState {
    #[default]
    Idle,
    /// Part of the highlighted cluster
    Spinning,
    /// Falling toward `Ball::target`
    Dropping,
    /// Shrinking away after a commit; no longer occupies its cell
    Vanishing,
    /// Removed from the board
    Gone,
}

/// What happened to a ball during `Ball::advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallEvent {
    /// Vanish finished; the ball is now `Gone`
    Vanished,
    /// Drop reached its target; the ball is `Idle` in its new cell
    Landed,
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: BallId,
    pub color: ColorIndex,
    /// Logical cell; the drop origin while dropping
    pub cell: Cell,
    /// Drop destination; equals `cell` when not dropping
    pub target: Cell,
    pub state: BallState,
    /// Rotation phase in [0, 1) persisted while idle
    pub rotation: f64,
    /// Time the current state was entered (seconds)
    pub state_t: f64,
}

impl Ball {
    pub fn new(id: BallId, color: ColorIndex, cell: Cell, rotation: f64, t: f64) -> Self {
        Self {
            id,
            color,
            cell,
            target: cell,
            state: BallState::Idle,
            rotation,
            state_t: t,
        }
    }

    /// Still on the board (anything but `Gone`)
    #[inline]
    pub fn is_live(&self) -> bool {
        self.state != BallState::Gone
    }

    /// Idle -> Spinning
    pub fn start_spinning(&mut self, t: f64) {
        if self.state == BallState::Idle {
            self.state = BallState::Spinning;
            self.state_t = t;
        }
    }

    /// Spinning -> Idle, keeping the phase reached so a re-highlight resumes smoothly
    pub fn stop_spinning(&mut self, t: f64) {
        if self.state == BallState::Spinning {
            self.rotation = self.rotation_at(t);
            self.state = BallState::Idle;
            self.state_t = t;
        }
    }

    /// Rotation phase at time `t`
    pub fn rotation_at(&self, t: f64) -> f64 {
        match self.state {
            BallState::Spinning => spin_phase(self.rotation, t - self.state_t),
            _ => self.rotation,
        }
    }

    /// Spinning -> Vanishing
    pub fn vanish(&mut self, t: f64) -> Result<()> {
        if self.state != BallState::Spinning {
            return Err(Error::InvalidState("only a spinning ball can vanish"));
        }
        self.rotation = self.rotation_at(t);
        self.state = BallState::Vanishing;
        self.state_t = t;
        Ok(())
    }

    /// Scale factor of a vanishing ball at time `t` (1 otherwise)
    pub fn vanish_size_at(&self, t: f64) -> f64 {
        match self.state {
            BallState::Vanishing => vanish_size(t - self.state_t),
            _ => 1.0,
        }
    }

    /// Fall `num_rows` further down
    pub fn drop_vertically(&mut self, num_rows: usize, t: f64) {
        self.state = BallState::Dropping;
        self.state_t = t;
        self.target.row += num_rows;
    }

    /// Slide `num_cols` further left
    pub fn drop_horizontally(&mut self, num_cols: usize, t: f64) {
        self.state = BallState::Dropping;
        self.state_t = t;
        self.target.col = self.target.col.saturating_sub(num_cols);
    }

    /// Interpolated (col, row) at time `t`, in cell units
    pub fn position_at(&self, t: f64) -> Vec2 {
        match self.state {
            BallState::Dropping => {
                let (col, row) = drop_position(self.cell, self.target, t - self.state_t);
                Vec2::new(col as f32, row as f32)
            }
            _ => Vec2::new(self.cell.col as f32, self.cell.row as f32),
        }
    }

    /// Dropping -> Idle at the target cell
    pub fn land(&mut self, t: f64) -> Result<()> {
        if self.state != BallState::Dropping {
            return Err(Error::InvalidState("only a dropping ball can land"));
        }
        self.cell = self.target;
        self.state = BallState::Idle;
        self.state_t = t;
        Ok(())
    }

    /// Apply the automatic transitions due at time `t`
    pub fn advance(&mut self, t: f64) -> Option<BallEvent> {
        match self.state {
            BallState::Vanishing if t - self.state_t >= VANISH_DURATION_S => {
                self.state = BallState::Gone;
                self.state_t = t;
                Some(BallEvent::Vanished)
            }
            BallState::Dropping => {
                let (col, row) = drop_position(self.cell, self.target, t - self.state_t);
                if col == self.target.col as f64 && row == self.target.row as f64 {
                    self.land(t).ok()?;
                    Some(BallEvent::Landed)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// Cyclic spin phase: `(base + (dt mod D) / D) mod 1`
#[inline]
pub fn spin_phase(base: f64, dt: f64) -> f64 {
    (base + dt.rem_euclid(SPIN_DURATION_S) / SPIN_DURATION_S).rem_euclid(1.0)
}

/// Perspective shrink of a vanishing ball: `Z / (Z + A dt²)`
#[inline]
pub fn vanish_size(dt: f64) -> f64 {
    Z_VIEWER / (Z_VIEWER + VANISH_ACCEL * dt * dt)
}

/// Accelerated slide toward `target`, clamped so it never overshoots
#[inline]
pub fn drop_position(origin: Cell, target: Cell, dt: f64) -> (f64, f64) {
    let col = (origin.col as f64 - DROP_ACCEL_COL * dt * dt).max(target.col as f64);
    let row = (origin.row as f64 + DROP_ACCEL_ROW * dt * dt).min(target.row as f64);
    (col, row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball() -> Ball {
        Ball::new(0, 1, Cell::new(3, 2), 0.25, 10.0)
    }

    #[test]
    fn test_spin_phase_wraps() {
        assert!((spin_phase(0.25, 0.0) - 0.25).abs() < 1e-12);
        assert!((spin_phase(0.25, 1.0) - 0.75).abs() < 1e-12);
        assert!((spin_phase(0.75, 1.0) - 0.25).abs() < 1e-12);
        assert!((spin_phase(0.0, SPIN_DURATION_S * 3.0 + 0.5) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_stop_spinning_keeps_phase() {
        let mut b = ball();
        b.start_spinning(10.0);
        assert_eq!(b.state, BallState::Spinning);
        b.stop_spinning(11.0);
        assert_eq!(b.state, BallState::Idle);
        assert!((b.rotation - 0.75).abs() < 1e-12);
        // Idle balls do not rotate
        assert!((b.rotation_at(50.0) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_vanish_requires_spinning() {
        let mut b = ball();
        assert!(matches!(b.vanish(10.0), Err(Error::InvalidState(_))));
        b.start_spinning(10.0);
        b.vanish(10.5).unwrap();
        assert_eq!(b.state, BallState::Vanishing);
    }

    #[test]
    fn test_vanish_size_shrinks() {
        assert_eq!(vanish_size(0.0), 1.0);
        // 5 / (5 + 500 * 0.01) = 0.5
        assert!((vanish_size(0.1) - 0.5).abs() < 1e-12);
        assert!(vanish_size(0.25) < vanish_size(0.2));
    }

    #[test]
    fn test_vanish_completes_after_duration() {
        let mut b = ball();
        b.start_spinning(10.0);
        b.vanish(10.0).unwrap();
        assert_eq!(b.advance(10.2), None);
        assert_eq!(b.advance(10.25), Some(BallEvent::Vanished));
        assert_eq!(b.state, BallState::Gone);
        assert!(!b.is_live());
    }

    #[test]
    fn test_drop_position_clamps_at_target() {
        let origin = Cell::new(4, 1);
        let target = Cell::new(2, 3);
        assert_eq!(drop_position(origin, target, 0.0), (4.0, 1.0));
        let (col, row) = drop_position(origin, target, 0.1);
        assert!((col - 3.9).abs() < 1e-9);
        assert!((row - 1.1).abs() < 1e-9);
        assert_eq!(drop_position(origin, target, 10.0), (2.0, 3.0));
    }

    #[test]
    fn test_drop_lands_exactly_on_target() {
        let mut b = ball();
        b.drop_vertically(2, 10.0);
        b.drop_horizontally(1, 10.0);
        assert_eq!(b.target, Cell::new(2, 4));
        assert_eq!(b.advance(10.1), None);
        assert_eq!(b.cell, Cell::new(3, 2));
        // sqrt(2 / 10) s for two rows
        assert_eq!(b.advance(10.5), Some(BallEvent::Landed));
        assert_eq!(b.cell, Cell::new(2, 4));
        assert_eq!(b.state, BallState::Idle);
        assert_eq!(b.position_at(11.0), Vec2::new(2.0, 4.0));
    }

    #[test]
    fn test_land_out_of_sequence_is_an_error() {
        let mut b = ball();
        assert!(matches!(b.land(10.0), Err(Error::InvalidState(_))));
    }
}
