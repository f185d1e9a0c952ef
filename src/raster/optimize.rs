//! Run-length merging of the raw move sequence
//!
//! A move burns its intensity on the way to its position, so a straight
//! stretch of moves sharing one intensity is equivalent to a single move to
//! the end of the stretch.

use crate::types::{Move, PixelPos};

/// True when the path `a -> b -> c` does not turn at `b`.
///
/// A zero-length step on either side never counts as a turn.
fn is_straight(a: &PixelPos, b: &PixelPos, c: &PixelPos) -> bool {
    let (dx1, dy1) = a.step_to(b);
    let (dx2, dy2) = b.step_to(c);
    if (dx1, dy1) == (0, 0) || (dx2, dy2) == (0, 0) {
        return true;
    }
    let cross = dx1 * dy2 - dy1 * dx2;
    let dot = dx1 * dx2 + dy1 * dy2;
    cross == 0 && dot > 0
}

/// Merge same-intensity runs.
///
/// A move is dropped only if the next move burns the same intensity and the
/// path runs straight through it. Straightness is judged from the last
/// retained move, so a zero-length step cannot hide a corner. The first and
/// last moves always survive, so the ordered intensity transitions and the
/// traced extent are unchanged.
pub fn optimize_moves(moves: &[Move]) -> Vec<Move> {
    if moves.len() < 3 {
        return moves.to_vec();
    }

    let mut optimized = Vec::with_capacity(moves.len() / 2);
    let mut kept = moves[0];
    optimized.push(kept);

    for pair in moves[1..].windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        let merged = current.intensity == next.intensity
            && is_straight(&kept.pixel, &current.pixel, &next.pixel);
        if !merged {
            kept = *current;
            optimized.push(kept);
        }
    }

    optimized.push(moves[moves.len() - 1]);
    optimized
}

/// Intensities in path order with consecutive repeats removed
pub fn intensity_transitions(moves: &[Move]) -> Vec<u8> {
    let mut out: Vec<u8> = moves.iter().map(|m| m.intensity).collect();
    out.dedup();
    out
}
