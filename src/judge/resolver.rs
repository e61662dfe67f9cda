//! The recursive partial-information resolver.
//!
//! Each order is adjudicated under a guess for any order whose outcome is
//! not yet known: the optimistic pass assumes unresolved cycle members
//! succeed, the pessimistic pass assumes they fail. When the two passes
//! disagree on an order inside a dependency cycle, the cycle cannot resolve
//! itself and a backup rule breaks it: Szykman when a convoy is involved,
//! circular movement otherwise.

use super::rulebook;
use crate::board::{Board, PieceId, PowerId, Square};
use crate::order::{LinkerId, OrderId, OrderManager};
use std::collections::HashMap;
use tracing::debug;

/// A resolvable unit: a single order, or a linker standing in for all of its
/// members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Entry {
    Order(OrderId),
    Linker(LinkerId),
}

/// The immutable inputs for a resolution run.
pub(crate) struct Context<'a> {
    pub board: &'a Board,
    pub manager: &'a OrderManager,
    entries: Vec<Entry>,
    index: HashMap<Entry, usize>,
}

impl<'a> Context<'a> {
    pub fn new(board: &'a Board, manager: &'a OrderManager) -> Self {
        let mut entries = Vec::new();
        let mut index = HashMap::new();
        for (id, order) in manager.iter() {
            if order.is_virtual() || order.is_hold() {
                continue;
            }
            if !(order.is_move() || order.is_support() || order.is_convoy()) {
                // Builds and disbands execute without adjudication.
                continue;
            }
            let entry = match order.linker() {
                Some(linker) => Entry::Linker(linker),
                None => Entry::Order(id),
            };
            if !index.contains_key(&entry) {
                index.insert(entry, entries.len());
                entries.push(entry);
            }
        }
        Context {
            board,
            manager,
            entries,
            index,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = Entry> + '_ {
        self.entries.iter().copied()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// The resolvable unit an order belongs to: itself, or its linker.
    pub fn entry_of(&self, order: OrderId) -> Entry {
        match self.manager.get(order).linker() {
            Some(linker) => Entry::Linker(linker),
            None => Entry::Order(order),
        }
    }

    fn index_of(&self, entry: Entry) -> usize {
        *self
            .index
            .get(&entry)
            .unwrap_or_else(|| panic!("resolving an order outside the adjudicable set: {:?}", entry))
    }

    /// The ordering power behind an order. Only meaningful for piece-bearing
    /// orders.
    pub fn power_of(&self, order: OrderId) -> PowerId {
        let piece = self
            .manager
            .get(order)
            .piece()
            .expect("order has no acting piece");
        self.board.piece(piece).power()
    }

    /// The real move order of a piece, if it has one. An en-passant pair
    /// yields the travel half, which is the one that relocates the pawn.
    pub fn move_of(&self, piece: PieceId) -> Option<OrderId> {
        self.manager
            .iter()
            .find(|(_, o)| !o.is_virtual() && o.is_move() && o.piece() == Some(piece))
            .map(|(id, _)| id)
    }

    /// Other non-virtual moves and convoy claims sharing the order's landing
    /// square.
    pub fn opposing_orders(&self, order: OrderId) -> Vec<OrderId> {
        let landing = self.manager.get(order).landing_square();
        self.manager
            .iter()
            .filter(|&(id, o)| {
                id != order
                    && !o.is_virtual()
                    && (o.is_move() || o.is_convoy())
                    && o.landing_square() == landing
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// The move leaving `square`, if any; otherwise the hold sitting on it.
    pub fn move_or_hold_at(&self, square: Square) -> Option<OrderId> {
        self.manager
            .iter()
            .find(|(_, o)| !o.is_virtual() && o.is_move() && o.starting_square() == square)
            .or_else(|| {
                self.manager
                    .iter()
                    .find(|(_, o)| o.is_hold() && o.starting_square() == square)
            })
            .map(|(id, _)| id)
    }
}

/// Mutable resolution state: per-entry flags plus the engine-wide cycle
/// bookkeeping.
pub(crate) struct ResolverState {
    resolved: Vec<bool>,
    result: Vec<bool>,
    visited: Vec<bool>,
    cycle: Vec<usize>,
    recursion_hits: usize,
    uncertain: bool,
}

impl ResolverState {
    pub fn new(entry_count: usize) -> Self {
        ResolverState {
            resolved: vec![false; entry_count],
            result: vec![false; entry_count],
            visited: vec![false; entry_count],
            cycle: Vec::new(),
            recursion_hits: 0,
            uncertain: false,
        }
    }
}

/// Resolve whether an entry succeeds, updating the resolver state along the
/// way. `optimistic` is the guess handed to any unresolved cycle member the
/// computation runs into.
pub(crate) fn resolve(
    ctx: &Context<'_>,
    state: &mut ResolverState,
    entry: Entry,
    optimistic: bool,
) -> bool {
    let e = ctx.index_of(entry);

    if state.resolved[e] {
        return state.result[e];
    }
    if state.cycle.contains(&e) {
        state.uncertain = true;
        return optimistic;
    }
    if state.visited[e] {
        // Second visit on the active call stack: a cycle.
        state.cycle.push(e);
        state.recursion_hits += 1;
        state.uncertain = true;
        return optimistic;
    }

    state.visited[e] = true;
    let cycle_len = state.cycle.len();
    let hits_snapshot = state.recursion_hits;
    let was_uncertain = state.uncertain;
    state.uncertain = false;

    let opt = rulebook::adjudicate_entry(ctx, state, entry, true);
    let pes = if state.uncertain && opt {
        rulebook::adjudicate_entry(ctx, state, entry, false)
    } else {
        opt
    };

    state.visited[e] = false;

    if opt == pes {
        // Certain regardless of guesses: keep the result and forget any
        // cycle speculation gathered below us.
        state.cycle.truncate(cycle_len);
        state.recursion_hits = hits_snapshot;
        state.uncertain = was_uncertain;
        state.result[e] = opt;
        state.resolved[e] = true;
        return opt;
    }

    if state.cycle.contains(&e) {
        state.recursion_hits -= 1;
        if state.recursion_hits == hits_snapshot {
            // The whole cycle has unwound back to us; break the deadlock.
            let tail = state.cycle[cycle_len..].to_vec();
            backup_rule(ctx, state, &tail);
            state.cycle.truncate(cycle_len);
            state.uncertain = was_uncertain;
            return resolve(ctx, state, entry, optimistic);
        }
        return optimistic;
    }

    state.cycle.push(e);
    optimistic
}

/// Break a deadlocked cycle.
///
/// If any convoy is implicated, Szykman's rule fails every convoy in the
/// cycle and re-resolves the rest. Otherwise the cycle is a circular
/// movement and every move in it succeeds.
fn backup_rule(ctx: &Context<'_>, state: &mut ResolverState, cycle: &[usize]) {
    let is_convoy = |e: usize| match ctx.entries[e] {
        Entry::Order(id) => ctx.manager.get(id).is_convoy(),
        Entry::Linker(_) => false,
    };
    let is_move = |e: usize| match ctx.entries[e] {
        Entry::Order(id) => ctx.manager.get(id).is_move(),
        // Linkers bundle moves.
        Entry::Linker(_) => true,
    };

    if cycle.iter().any(|&e| is_convoy(e)) {
        debug!("applying Szykman's rule to a convoy cycle");
        for &e in cycle {
            if is_convoy(e) {
                state.result[e] = false;
                state.resolved[e] = true;
            } else {
                state.resolved[e] = false;
            }
        }
    } else {
        debug!("applying circular movement to a move cycle");
        for &e in cycle {
            if is_move(e) {
                state.result[e] = true;
                state.resolved[e] = true;
            } else {
                state.resolved[e] = false;
            }
        }
    }
}

/// Adjudicate the order set: resolve every real move, support, and convoy
/// (linked orders as one unit), then write each order's success back.
///
/// Holds succeed when nothing dislodges their piece, and every virtual
/// order is forced to fail. The caller is expected to have injected a real
/// hold for every piece without a valid real move.
pub fn adjudicate(board: &Board, manager: &mut OrderManager) {
    let results = {
        let ctx = Context::new(board, manager);
        let mut state = ResolverState::new(ctx.entry_count());
        ctx.entries()
            .map(|entry| (entry, resolve(&ctx, &mut state, entry, true)))
            .collect::<Vec<_>>()
    };

    for (entry, result) in results {
        match entry {
            Entry::Order(id) => manager.set_success(id, result),
            Entry::Linker(linker) => {
                manager.set_linker_success(linker, result);
                for member in manager.linker(linker).orders().to_vec() {
                    manager.set_success(member, result);
                }
            }
        }
    }

    // A hold succeeds unless a foreign move took its square.
    let holds = manager
        .iter()
        .filter(|(_, o)| o.is_hold() && !o.is_virtual())
        .map(|(id, o)| (id, o.starting_square(), o.piece()))
        .collect::<Vec<_>>();
    for (id, square, piece) in holds {
        let dislodged = manager.iter().any(|(_, o)| {
            !o.is_virtual()
                && o.is_move()
                && o.success()
                && o.landing_square() == square
                && o.piece() != piece
        });
        manager.set_success(id, !dislodged);
    }

    // Virtual orders always fail; they only exist to be referenced.
    let virtuals = manager
        .iter()
        .filter(|(_, o)| o.is_virtual())
        .map(|(id, _)| id)
        .collect::<Vec<_>>();
    for id in virtuals {
        manager.set_success(id, false);
    }
}
