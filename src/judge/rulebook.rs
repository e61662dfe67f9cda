//! The adjudication rules for each order variant, threaded through the
//! resolver for every dependent sub-decision.

use super::resolver::{resolve, Context, Entry, ResolverState};
use super::strength::{
    attack_strength, check_path, defend_strength, hold_strength, prevent_strength,
    support_strength, Strength,
};
use crate::order::{OrderId, OrderKind};

/// Adjudicate a resolvable unit under the given guess. Linkers are
/// all-or-none: every constituent must come through.
pub(crate) fn adjudicate_entry(
    ctx: &Context<'_>,
    state: &mut ResolverState,
    entry: Entry,
    optimistic: bool,
) -> bool {
    match entry {
        Entry::Linker(linker) => {
            let members = ctx.manager.linker(linker).orders().to_vec();
            members
                .into_iter()
                .all(|member| adjudicate_order(ctx, state, member, optimistic))
        }
        Entry::Order(order) => adjudicate_order(ctx, state, order, optimistic),
    }
}

fn adjudicate_order(
    ctx: &Context<'_>,
    state: &mut ResolverState,
    order: OrderId,
    optimistic: bool,
) -> bool {
    match ctx.manager.get(order).kind() {
        OrderKind::Move { .. } => adjudicate_move(ctx, state, order, optimistic),
        OrderKind::SupportHold { .. }
        | OrderKind::SupportMove { .. }
        | OrderKind::SupportConvoy { .. }
        | OrderKind::Support { .. } => adjudicate_support(ctx, state, order, optimistic),
        OrderKind::Convoy { .. } => adjudicate_convoy(ctx, state, order, optimistic),
        other => panic!("adjudicating unexpected order variant: {:?}", other),
    }
}

/// A move goes through when its attack strength beats the resistance at the
/// landing square (the defender in a head-to-head, the hold strength
/// otherwise) and every competing order aimed at the same square.
fn adjudicate_move(
    ctx: &Context<'_>,
    state: &mut ResolverState,
    order: OrderId,
    optimistic: bool,
) -> bool {
    let (start, landing) = {
        let o = ctx.manager.get(order);
        (o.starting_square(), o.landing_square())
    };
    let attack = attack_strength(ctx, state, order, optimistic);

    let head_to_head = ctx
        .board
        .piece_at(landing)
        .and_then(|piece| ctx.move_of(piece))
        .filter(|&m| ctx.manager.get(m).landing_square() == start);
    if let Some(opponent) = head_to_head {
        if defend_strength(ctx, state, opponent, optimistic) >= attack {
            return false;
        }
    } else if hold_strength(ctx, state, landing, optimistic) >= attack {
        return false;
    }

    for other in ctx.opposing_orders(order) {
        if prevent_strength(ctx, state, other, optimistic) >= attack {
            return false;
        }
    }
    true
}

/// A support holds unless its piece is dislodged or a foreign move with a
/// working path cuts it. An attack out of the square the support is aimed
/// at only cuts by dislodging.
fn adjudicate_support(
    ctx: &Context<'_>,
    state: &mut ResolverState,
    order: OrderId,
    optimistic: bool,
) -> bool {
    if !check_path(ctx, state, order, optimistic) {
        return false;
    }

    let (start, target) = {
        let o = ctx.manager.get(order);
        (o.starting_square(), o.landing_square())
    };
    let power = ctx.power_of(order);

    let incoming = ctx
        .manager
        .iter()
        .filter(|(_, o)| !o.is_virtual() && o.is_move() && o.landing_square() == start)
        .map(|(id, _)| id)
        .collect::<Vec<_>>();

    for other in incoming {
        // Dislodgement cuts support no matter who the attacker is.
        if resolve(ctx, state, ctx.entry_of(other), optimistic) {
            return false;
        }
        let foreign = ctx.power_of(other) != power;
        let at_support_target = ctx.manager.get(other).starting_square() == target;
        if foreign && !at_support_target && check_path(ctx, state, other, optimistic) {
            return false;
        }
    }
    true
}

/// A convoy claim stands while its square stays clear: the piece there (if
/// any) must vacate, no stronger convoy may contest the square, and no move
/// into it may succeed.
fn adjudicate_convoy(
    ctx: &Context<'_>,
    state: &mut ResolverState,
    order: OrderId,
    optimistic: bool,
) -> bool {
    let site = ctx.manager.get(order).starting_square();

    if let Some(occupier) = ctx.move_or_hold_at(site) {
        if ctx.manager.get(occupier).is_hold() {
            return false;
        }
        if !resolve(ctx, state, ctx.entry_of(occupier), optimistic) {
            return false;
        }
    }

    let strength = Strength::whole(support_strength(ctx, state, order, optimistic));
    for other in ctx.opposing_orders(order) {
        if ctx.manager.get(other).is_convoy() {
            let rival = Strength::whole(support_strength(ctx, state, other, optimistic));
            if rival >= strength {
                return false;
            }
        } else if resolve(ctx, state, ctx.entry_of(other), optimistic) {
            return false;
        }
    }
    true
}
