use crate::board::{Board, ChessPath, PieceId, Square};
use crate::order::{LinkerId, Order, OrderId, OrderKind, OrderLinker, OrderSpec};
use tracing::debug;

/// Owner of the order set for one turn.
///
/// All order creation and destruction goes through the manager, which keeps
/// the cross-links coherent: at most one real order per piece, a convoy per
/// intermediate square of every path, support back-references on both ends,
/// and no orphaned virtual orders. Orders are stored in an arena; retracted
/// orders vacate their slot and their handles die with them.
pub struct OrderManager {
    orders: Vec<Option<Order>>,
    linkers: Vec<OrderLinker>,
}

impl OrderManager {
    pub fn new() -> Self {
        OrderManager {
            orders: Vec::new(),
            linkers: Vec::new(),
        }
    }

    pub fn has_orders(&self) -> bool {
        self.orders.iter().any(Option::is_some)
    }

    pub fn clear(&mut self) {
        self.orders.clear();
        self.linkers.clear();
    }

    /// Ids of all live orders, in insertion order.
    pub fn order_ids(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.orders
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| OrderId(i))
    }

    /// Live orders with their ids, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (OrderId, &Order)> + '_ {
        self.orders
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|o| (OrderId(i), o)))
    }

    pub fn get(&self, id: OrderId) -> &Order {
        self.orders[id.0]
            .as_ref()
            .expect("order handle refers to a retracted order")
    }

    fn get_mut(&mut self, id: OrderId) -> &mut Order {
        self.orders[id.0]
            .as_mut()
            .expect("order handle refers to a retracted order")
    }

    pub fn live(&self, id: OrderId) -> bool {
        self.orders.get(id.0).map_or(false, Option::is_some)
    }

    pub fn new_linker(&mut self) -> LinkerId {
        let id = LinkerId(self.linkers.len());
        self.linkers.push(OrderLinker::default());
        id
    }

    pub fn linker(&self, id: LinkerId) -> &OrderLinker {
        &self.linkers[id.0]
    }

    pub(crate) fn set_success(&mut self, id: OrderId, success: bool) {
        self.get_mut(id).success = success;
    }

    pub(crate) fn set_linker_success(&mut self, id: LinkerId, success: bool) {
        self.linkers[id.0].success = success;
    }

    /// Find the existing order matching `spec`, or create it.
    ///
    /// Matching goes by identity args only. If the match is found but the
    /// request is real, the order stops being virtual. If no exact match
    /// exists but a support order is inheritable by a requested support
    /// subtype, its convoys are transplanted onto the fresh typed order and
    /// the old one is removed. Fresh orders get a convoy per intermediate
    /// square of their path.
    pub fn get_order(&mut self, board: &Board, spec: OrderSpec, make_virtual: bool) -> OrderId {
        let inherit_key = self.support_target_of(&spec);

        let mut inheritable = None;
        for id in self.order_ids().collect::<Vec<_>>() {
            if self.matches(id, &spec) {
                let still_virtual = self.get(id).is_virtual() && make_virtual;
                self.set_virtual(id, still_virtual);
                if !still_virtual {
                    if !make_virtual {
                        self.refresh_move_type(id, &spec);
                    }
                    self.clear_conflicting(id);
                }
                return id;
            }
            if let Some((piece, target)) = inherit_key {
                if self.get(id).is_inheritable(piece, target) {
                    inheritable = Some(id);
                    break;
                }
            }
        }

        if let Some(old) = inheritable {
            let new_id = self.insert(self.construct(board, &spec), &spec, make_virtual);
            self.inherit_convoys(new_id, old);
            if matches!(self.get(old).kind, OrderKind::Support { .. }) {
                self.remove(old);
            } else {
                let supported = self
                    .get(old)
                    .supported_order
                    .expect("typed support has a supported order");
                self.remove_support(supported, old);
                if self.get(supported).is_virtual() {
                    self.retract(supported);
                }
                self.remove(old);
            }
            self.clear_conflicting(new_id);
            new_id
        } else {
            let new_id = self.insert(self.construct(board, &spec), &spec, make_virtual);
            self.clear_conflicting(new_id);
            self.add_convoys(new_id);
            new_id
        }
    }

    /// Find or create a virtual supported order, then the support order
    /// pointing at it, wiring both sides.
    pub fn get_support_order(
        &mut self,
        board: &Board,
        piece: PieceId,
        supported_spec: OrderSpec,
        make_virtual: bool,
    ) -> OrderId {
        let supported = self.get_order(board, supported_spec, true);
        let spec = match supported_spec {
            OrderSpec::Hold { .. } => OrderSpec::SupportHold { piece, supported },
            OrderSpec::Move { .. } => OrderSpec::SupportMove { piece, supported },
            _ => panic!("supported order must be a hold or a move"),
        };
        let order = self.get_order(board, spec, make_virtual);
        self.add_support(supported, order);
        order
    }

    /// Find or create a virtual convoyed order and the virtual convoy at
    /// `site` that carries it, then a support-convoy order pointing at the
    /// convoy.
    pub fn get_support_convoy_order(
        &mut self,
        board: &Board,
        piece: PieceId,
        site: Square,
        convoyed_spec: OrderSpec,
        make_virtual: bool,
    ) -> OrderId {
        let convoyed = self.get_order(board, convoyed_spec, true);
        let convoy = self.get_order(board, OrderSpec::Convoy { site, convoyed }, true);
        let order = self.get_order(board, OrderSpec::SupportConvoy { piece, convoy }, make_virtual);
        self.add_support(convoy, order);
        order
    }

    /// Retract an order, cascading so the graph invariants hold afterwards.
    /// Linked orders are retracted as a unit.
    pub fn retract(&mut self, id: OrderId) {
        let members = match self.get(id).linker {
            Some(linker) => self.linkers[linker.0].orders.clone(),
            None => vec![id],
        };
        for member in members {
            if self.live(member) {
                self.retract_single(member);
            }
        }
    }

    fn retract_single(&mut self, id: OrderId) {
        // Kept alive by a real support: demote to virtual instead.
        if self
            .get(id)
            .supports
            .iter()
            .any(|&s| !self.get(s).is_virtual())
        {
            self.set_virtual(id, true);
            return;
        }

        // Unhook from the supported order; a virtual supported order with no
        // remaining support collapses too.
        if let Some(supported) = self.get(id).supported_order {
            self.remove_support(supported, id);
            if self.live(supported) && self.get(supported).is_virtual() {
                self.retract(supported);
            }
        }

        // A convoy of ours that somebody supports is worth preserving.
        let convoys = self.get(id).convoys.clone();
        if convoys
            .iter()
            .any(|&c| self.live(c) && !self.get(c).supports.is_empty())
        {
            if self.get(id).is_support() {
                // Convert to a generic support inheriting the convoys; the
                // generic keeps the same piece and target, so the old path
                // carries over as-is.
                let old = self.get(id);
                let path = old.path().expect("support orders have paths").clone();
                let mut generic =
                    Order::new(old.piece, old.start, OrderKind::Support { path });
                generic.is_virtual = true;
                let gid = self.push(generic);
                debug!(order = gid.0, "support retracted into generic support");
                self.inherit_convoys(gid, id);
                self.remove(id);
            } else {
                self.set_virtual(id, true);
            }
            return;
        }

        // A convoy collapses with the order it carries.
        if let Some(convoyed) = self.get(id).convoyed_order {
            if self.live(convoyed) {
                self.retract(convoyed);
            }
            return;
        }

        // Nothing depends on this order: remove it and its convoys.
        for convoy in self.get(id).convoys.clone() {
            if self.live(convoy) {
                self.remove(convoy);
            }
        }
        self.remove(id);
    }

    /// Flip an order between real and virtual, carrying its convoys and any
    /// linked siblings along.
    pub fn set_virtual(&mut self, id: OrderId, make_virtual: bool) {
        let members = match self.get(id).linker {
            Some(linker) => self.linkers[linker.0].orders.clone(),
            None => vec![id],
        };
        for member in members {
            if self.live(member) {
                self.set_virtual_single(member, make_virtual);
            }
        }
    }

    fn set_virtual_single(&mut self, id: OrderId, make_virtual: bool) {
        self.get_mut(id).is_virtual = make_virtual;
        for convoy in self.get(id).convoys.clone() {
            if self.live(convoy) {
                self.set_virtual_single(convoy, make_virtual);
            }
        }
    }

    pub(crate) fn add_support(&mut self, order: OrderId, support: OrderId) {
        if !self.get(order).supports.contains(&support) {
            self.get_mut(order).supports.push(support);
        }
    }

    fn remove_support(&mut self, order: OrderId, support: OrderId) {
        if self.live(order) {
            self.get_mut(order).supports.retain(|&s| s != support);
        }
    }

    /// Create one convoy per intermediate square of the order's path.
    fn add_convoys(&mut self, id: OrderId) {
        let sites = self.get(id).intermediate_squares().to_vec();
        let virtual_flag = self.get(id).is_virtual();
        for site in sites {
            let mut convoy = Order::new(None, site, OrderKind::Convoy { site });
            convoy.convoyed_order = Some(id);
            convoy.is_virtual = virtual_flag;
            let convoy_id = self.push(convoy);
            self.get_mut(id).convoys.push(convoy_id);
        }
    }

    /// Re-point another order's convoys at `to`, aligning their virtuality.
    fn inherit_convoys(&mut self, to: OrderId, from: OrderId) {
        let convoys = self.get(from).convoys.clone();
        let virtual_flag = self.get(to).is_virtual();
        self.get_mut(to).convoys = convoys.clone();
        for convoy in convoys {
            self.get_mut(convoy).convoyed_order = Some(to);
            self.get_mut(convoy).is_virtual = virtual_flag;
        }
    }

    /// A real order displaces every other real order acting on the same
    /// piece. Convoys never conflict, and linker siblings are exempt from
    /// each other.
    fn clear_conflicting(&mut self, id: OrderId) {
        if self.get(id).is_convoy() || self.get(id).is_virtual() {
            return;
        }
        let conflicting = self
            .iter()
            .filter(|&(other_id, other)| {
                if other_id == id || other.is_virtual() {
                    return false;
                }
                if let (Some(a), Some(b)) = (self.get(id).linker, other.linker) {
                    if a == b {
                        return false;
                    }
                }
                match (self.get(id).piece, other.piece) {
                    (Some(p), Some(q)) => p == q,
                    // Builds are keyed by square rather than piece.
                    (None, None) => {
                        self.build_square(id).is_some()
                            && self.build_square(id) == self.build_square(other_id)
                    }
                    _ => false,
                }
            })
            .map(|(other_id, _)| other_id)
            .collect::<Vec<_>>();
        for other in conflicting {
            if self.live(other) {
                debug!(
                    retracted = other.0,
                    conflicts_with = id.0,
                    "clearing conflicting order"
                );
                self.retract(other);
            }
        }
    }

    fn build_square(&self, id: OrderId) -> Option<Square> {
        match self.get(id).kind {
            OrderKind::Build { square, .. } => Some(square),
            _ => None,
        }
    }

    /// Whether an existing order is the one `spec` identifies.
    fn matches(&self, id: OrderId, spec: &OrderSpec) -> bool {
        let order = self.get(id);
        match *spec {
            OrderSpec::Hold { piece } => order.is_hold() && order.piece == Some(piece),
            OrderSpec::Move {
                piece,
                dest,
                linker,
                ..
            } => {
                // Linked move requests always construct fresh orders; plain
                // requests match any move of the piece to the destination.
                linker.is_none()
                    && order.is_move()
                    && order.piece == Some(piece)
                    && order.landing_square() == dest
            }
            OrderSpec::Convoy { site, convoyed } => {
                order.is_convoy()
                    && order.starting_square() == site
                    && order.convoyed_order == Some(convoyed)
            }
            OrderSpec::SupportHold { piece, supported } => {
                matches!(order.kind, OrderKind::SupportHold { .. })
                    && order.piece == Some(piece)
                    && order.supported_order == Some(supported)
            }
            OrderSpec::SupportMove { piece, supported } => {
                matches!(order.kind, OrderKind::SupportMove { .. })
                    && order.piece == Some(piece)
                    && order.supported_order == Some(supported)
            }
            OrderSpec::SupportConvoy { piece, convoy } => {
                matches!(order.kind, OrderKind::SupportConvoy { .. })
                    && order.piece == Some(piece)
                    && order.supported_order == Some(convoy)
            }
            // A generic support request is satisfied by any support of the
            // same piece aimed at the same square, typed or not.
            OrderSpec::Support { piece, target } => {
                order.is_support()
                    && order.piece == Some(piece)
                    && order.landing_square() == target
            }
            OrderSpec::Build {
                power,
                kind,
                square,
            } => match order.kind {
                OrderKind::Build {
                    power: p,
                    kind: k,
                    square: s,
                } => p == power && k == kind && s == square,
                _ => false,
            },
            OrderSpec::Disband { piece } => {
                matches!(order.kind, OrderKind::Disband) && order.piece == Some(piece)
            }
        }
    }

    /// The (piece, target) key a support spec would inherit a generic
    /// support by.
    fn support_target_of(&self, spec: &OrderSpec) -> Option<(PieceId, Square)> {
        match *spec {
            OrderSpec::SupportHold { piece, supported }
            | OrderSpec::SupportMove { piece, supported } => {
                Some((piece, self.get(supported).landing_square()))
            }
            OrderSpec::SupportConvoy { piece, convoy } => {
                Some((piece, self.get(convoy).landing_square()))
            }
            OrderSpec::Support { piece, target } => Some((piece, target)),
            _ => None,
        }
    }

    fn construct(&self, board: &Board, spec: &OrderSpec) -> Order {
        match *spec {
            OrderSpec::Hold { piece } => {
                Order::new(Some(piece), board.piece(piece).square(), OrderKind::Hold)
            }
            OrderSpec::Move {
                piece,
                dest,
                move_type,
                exception,
                ..
            } => {
                let at = board.piece(piece);
                let path = ChessPath::new(
                    at.kind(),
                    board.power(at.power()).side(),
                    at.square(),
                    dest,
                    exception,
                );
                Order::new(
                    Some(piece),
                    at.square(),
                    OrderKind::Move {
                        dest,
                        move_type,
                        path,
                    },
                )
            }
            OrderSpec::Convoy { site, convoyed } => {
                let mut order = Order::new(None, site, OrderKind::Convoy { site });
                order.convoyed_order = Some(convoyed);
                order
            }
            OrderSpec::SupportHold { piece, supported } => {
                let mut order = Order::new(
                    Some(piece),
                    board.piece(piece).square(),
                    OrderKind::SupportHold {
                        path: self.support_path(board, piece, supported),
                    },
                );
                order.supported_order = Some(supported);
                order
            }
            OrderSpec::SupportMove { piece, supported } => {
                let mut order = Order::new(
                    Some(piece),
                    board.piece(piece).square(),
                    OrderKind::SupportMove {
                        path: self.support_path(board, piece, supported),
                    },
                );
                order.supported_order = Some(supported);
                order
            }
            OrderSpec::SupportConvoy { piece, convoy } => {
                let mut order = Order::new(
                    Some(piece),
                    board.piece(piece).square(),
                    OrderKind::SupportConvoy {
                        path: self.support_path(board, piece, convoy),
                    },
                );
                order.supported_order = Some(convoy);
                order
            }
            OrderSpec::Support { piece, target } => {
                let at = board.piece(piece);
                let path = ChessPath::new(
                    at.kind(),
                    board.power(at.power()).side(),
                    at.square(),
                    target,
                    None,
                );
                Order::new(Some(piece), at.square(), OrderKind::Support { path })
            }
            OrderSpec::Build {
                power,
                kind,
                square,
            } => Order::new(
                None,
                square,
                OrderKind::Build {
                    power,
                    kind,
                    square,
                },
            ),
            OrderSpec::Disband { piece } => {
                Order::new(Some(piece), board.piece(piece).square(), OrderKind::Disband)
            }
        }
    }

    /// The path a support order claims: from its piece to the supported
    /// order's landing square.
    fn support_path(&self, board: &Board, piece: PieceId, supported: OrderId) -> ChessPath {
        let at = board.piece(piece);
        ChessPath::new(
            at.kind(),
            board.power(at.power()).side(),
            at.square(),
            self.get(supported).landing_square(),
            None,
        )
    }

    fn insert(&mut self, mut order: Order, spec: &OrderSpec, make_virtual: bool) -> OrderId {
        order.is_virtual = make_virtual;
        if let OrderSpec::Move {
            linker: Some(linker),
            ..
        } = *spec
        {
            order.linker = Some(linker);
            let id = self.push(order);
            self.linkers[linker.0].orders.push(id);
            return id;
        }
        self.push(order)
    }

    fn push(&mut self, order: Order) -> OrderId {
        let id = OrderId(self.orders.len());
        self.orders.push(Some(order));
        id
    }

    fn remove(&mut self, id: OrderId) {
        if let Some(linker) = self.get(id).linker {
            self.linkers[linker.0].orders.retain(|&o| o != id);
        }
        self.orders[id.0] = None;
    }

    /// Make sure a piece that is not moving has a hold order, and that it is
    /// real. Bypasses conflict clearing: holds coexist with the piece's
    /// support orders for strength purposes.
    pub(crate) fn ensure_hold(&mut self, board: &Board, piece: PieceId) -> OrderId {
        let existing = self
            .iter()
            .find(|(_, o)| o.is_hold() && o.piece == Some(piece))
            .map(|(id, _)| id);
        match existing {
            Some(id) => {
                self.set_virtual(id, false);
                id
            }
            None => self.push(Order::new(
                Some(piece),
                board.piece(piece).square(),
                OrderKind::Hold,
            )),
        }
    }

    /// Record a disband created by the post-adjudication capture pass.
    /// Bypasses conflict clearing: the piece's failed order stays in the
    /// set so its outcome can still be reported.
    pub(crate) fn push_disband(&mut self, board: &Board, piece: PieceId) -> OrderId {
        self.push(Order::new(
            Some(piece),
            board.piece(piece).square(),
            OrderKind::Disband,
        ))
    }

    /// If a real request re-identifies a virtual move created as a support
    /// target, adopt the requested move type so pawn travel/attack
    /// semantics survive the upgrade.
    fn refresh_move_type(&mut self, id: OrderId, spec: &OrderSpec) {
        if let OrderSpec::Move { move_type, .. } = *spec {
            if let OrderKind::Move {
                move_type: ref mut current,
                ..
            } = self.get_mut(id).kind
            {
                *current = move_type;
            }
        }
    }
}

impl Default for OrderManager {
    fn default() -> Self {
        OrderManager::new()
    }
}
