//! Strength computations for the adjudicator.
//!
//! Strengths are measured in half-points so that the ½ used by travel moves
//! and unsupported convoy claims orders correctly against whole strengths.
//! All comparisons in the rulebook are strict: an attack must exceed the
//! opposing strength to win.

use super::resolver::{resolve, Context, ResolverState};
use crate::board::Square;
use crate::order::OrderId;
use std::ops::Add;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Strength(u32);

impl Strength {
    pub const ZERO: Strength = Strength(0);
    pub const HALF: Strength = Strength(1);
    pub const ONE: Strength = Strength(2);

    pub fn whole(n: usize) -> Strength {
        Strength(2 * n as u32)
    }
}

impl Add for Strength {
    type Output = Strength;

    fn add(self, rhs: Strength) -> Strength {
        Strength(self.0 + rhs.0)
    }
}

/// A move that can reach its destination but musters no force still claims
/// the square with strength ½. This keeps unsupported pawn travels bouncing
/// off each other instead of stacking on the same square.
fn at_least_half(strength: Strength) -> Strength {
    strength.max(Strength::HALF)
}

/// Number of real supports of `order` that resolve successfully.
pub(crate) fn support_strength(
    ctx: &Context<'_>,
    state: &mut ResolverState,
    order: OrderId,
    optimistic: bool,
) -> usize {
    let supports = ctx.manager.get(order).supports().to_vec();
    supports
        .into_iter()
        .filter(|&s| ctx.manager.live(s) && !ctx.manager.get(s).is_virtual())
        .filter(|&s| resolve(ctx, state, ctx.entry_of(s), optimistic))
        .count()
}

/// The resistance a square puts up against an incoming move.
///
/// A piece that vacates the square resists with nothing; a piece that holds
/// resists with one plus its hold supports. A piece whose move fails has no
/// hold order and therefore no resistance: it is open to capture.
pub(crate) fn hold_strength(
    ctx: &Context<'_>,
    state: &mut ResolverState,
    square: Square,
    optimistic: bool,
) -> Strength {
    let vacating = ctx
        .manager
        .iter()
        .find(|(_, o)| {
            !o.is_virtual() && o.is_move() && o.starting_square() == square && o.path_valid()
        })
        .map(|(id, _)| id);
    if let Some(mv) = vacating {
        if resolve(ctx, state, ctx.entry_of(mv), optimistic) {
            return Strength::ZERO;
        }
    }

    let holding = ctx
        .manager
        .iter()
        .find(|(_, o)| !o.is_virtual() && o.is_hold() && o.starting_square() == square)
        .map(|(id, _)| id);
    match holding {
        Some(hold) => Strength::ONE + Strength::whole(support_strength(ctx, state, hold, optimistic)),
        None => Strength::ZERO,
    }
}

/// The force a move brings to its landing square.
///
/// What stands on the landing square decides the shape of the computation:
/// an empty or successfully vacated square takes the move's full strength,
/// a piece of the same power cannot be dislodged at all, and a head-to-head
/// opponent or failed exit discounts supports from the defender's power.
pub(crate) fn attack_strength(
    ctx: &Context<'_>,
    state: &mut ResolverState,
    order: OrderId,
    optimistic: bool,
) -> Strength {
    if !check_path(ctx, state, order, optimistic) {
        return Strength::ZERO;
    }

    let (start, landing, travel) = {
        let o = ctx.manager.get(order);
        (o.starting_square(), o.landing_square(), o.is_travel())
    };
    let base = if travel { 0 } else { 1 };

    let occupier = match ctx.board.piece_at(landing) {
        None => {
            let n = support_strength(ctx, state, order, optimistic);
            return at_least_half(Strength::whole(base + n));
        }
        Some(piece) => piece,
    };

    let exit = ctx
        .move_of(occupier)
        .filter(|&m| ctx.manager.get(m).landing_square() != start);
    if let Some(exit) = exit {
        // The occupier is trying to leave; a successful exit clears the way
        // no matter whose piece it is. A failed exit defends like a
        // head-to-head loser below.
        if resolve(ctx, state, ctx.entry_of(exit), optimistic) {
            let n = support_strength(ctx, state, order, optimistic);
            return at_least_half(Strength::whole(base + n));
        }
    }

    let defender = ctx.board.piece(occupier).power();
    if defender == ctx.power_of(order) {
        // A piece cannot dislodge one of its own power.
        return Strength::ZERO;
    }

    // Head-to-head battle or a failed exit: supports from the defender's own
    // power do not help the attack.
    let supports = ctx.manager.get(order).supports().to_vec();
    let n = supports
        .into_iter()
        .filter(|&s| ctx.manager.live(s) && !ctx.manager.get(s).is_virtual())
        .filter(|&s| ctx.power_of(s) != defender)
        .filter(|&s| resolve(ctx, state, ctx.entry_of(s), optimistic))
        .count();
    Strength::whole(base + n)
}

/// The force a move defends with in a head-to-head battle.
pub(crate) fn defend_strength(
    ctx: &Context<'_>,
    state: &mut ResolverState,
    order: OrderId,
    optimistic: bool,
) -> Strength {
    if !check_path(ctx, state, order, optimistic) {
        return Strength::ZERO;
    }
    let base = if ctx.manager.get(order).is_travel() { 0 } else { 1 };
    Strength::whole(base + support_strength(ctx, state, order, optimistic))
}

/// The force an order applies to stop anything else from entering its
/// landing square.
///
/// Convoy claims prevent with at least ½ regardless of path; a move that
/// lost its own head-to-head prevents nothing.
pub(crate) fn prevent_strength(
    ctx: &Context<'_>,
    state: &mut ResolverState,
    order: OrderId,
    optimistic: bool,
) -> Strength {
    if ctx.manager.get(order).is_convoy() {
        return at_least_half(Strength::whole(support_strength(
            ctx, state, order, optimistic,
        )));
    }

    if !check_path(ctx, state, order, optimistic) {
        return Strength::ZERO;
    }

    let (start, landing) = {
        let o = ctx.manager.get(order);
        (o.starting_square(), o.landing_square())
    };
    let returning = ctx
        .board
        .piece_at(landing)
        .and_then(|piece| ctx.move_of(piece))
        .filter(|&m| ctx.manager.get(m).landing_square() == start);
    if let Some(opponent) = returning {
        // A move that lost its own head-to-head cannot prevent.
        if resolve(ctx, state, ctx.entry_of(opponent), optimistic) {
            return Strength::ZERO;
        }
    }

    let base = if ctx.manager.get(order).is_travel() { 0 } else { 1 };
    at_least_half(Strength::whole(
        base + support_strength(ctx, state, order, optimistic),
    ))
}

/// True when the order's own path is valid and every convoy tiling it
/// resolves successfully.
pub(crate) fn check_path(
    ctx: &Context<'_>,
    state: &mut ResolverState,
    order: OrderId,
    optimistic: bool,
) -> bool {
    if !ctx.manager.get(order).path_valid() {
        return false;
    }
    let convoys = ctx.manager.get(order).convoys().to_vec();
    for convoy in convoys {
        if !ctx.manager.live(convoy) {
            continue;
        }
        if !resolve(ctx, state, ctx.entry_of(convoy), optimistic) {
            return false;
        }
    }
    true
}
