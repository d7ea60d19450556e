/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Per-security order book model.
//!
//! The book exclusively owns its orders. After any successful operation
//! exactly one order matches the updated id, `best_bid` is the
//! highest-priced bid present and `best_offer` the lowest-priced offer
//! (both `None` when the side is empty). Best-of-side recomputation on
//! deletion is a linear scan; book depth in validation runs keeps that
//! cheap.

use fixlink_core::types::OrdType;
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;

/// Side of a book entry (MDEntryType 0/1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookSide {
    /// Bid (MDEntryType=0).
    Bid,
    /// Offer (MDEntryType=1).
    Offer,
}

impl BookSide {
    /// Creates a side from the MDEntryType wire character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Bid),
            '1' => Some(Self::Offer),
            _ => None,
        }
    }

    /// Returns the lowercase label used in logs and metric label values.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bid => "bid",
            Self::Offer => "offer",
        }
    }
}

/// Book operation failures.
///
/// These are application errors: reported as metrics and logs, never a
/// disconnect.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BookError {
    /// An order with the same id is already present.
    #[error("order already exists")]
    OrderAlreadyExists,
    /// No order with the given id is present.
    #[error("order not found")]
    OrderNotFound,
}

/// One resting order as seen in the market-data stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// Venue-assigned order id.
    pub id: String,
    /// Book side.
    pub side: BookSide,
    /// Order type.
    pub ord_type: OrdType,
    /// Limit price (zero for entries the venue sends without one).
    pub price: Decimal,
    /// Original size.
    pub size: Decimal,
    /// Remaining size.
    pub remaining_size: Decimal,
}

/// Crossed-state transition reported by [`OrderBook::check_crossed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossedState {
    /// True when best bid >= best offer with both sides populated.
    pub crossed: bool,
    /// True when the crossed state changed with this check.
    pub changed: bool,
}

/// Per-security collection of orders with derived bests and counters.
#[derive(Debug, Default)]
pub struct OrderBook {
    orders: Vec<Order>,
    types_volume: HashMap<OrdType, i64>,
    sides_volume: HashMap<BookSide, i64>,
    best_bid: Option<Order>,
    best_offer: Option<Order>,
    crossed: bool,
}

impl OrderBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resting orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Returns true if the book holds no orders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Best (highest-priced) bid.
    #[must_use]
    pub fn best_bid(&self) -> Option<&Order> {
        self.best_bid.as_ref()
    }

    /// Best (lowest-priced) offer.
    #[must_use]
    pub fn best_offer(&self) -> Option<&Order> {
        self.best_offer.as_ref()
    }

    /// Per-type volume counters.
    #[must_use]
    pub fn types_volume(&self) -> &HashMap<OrdType, i64> {
        &self.types_volume
    }

    /// Per-side volume counters.
    #[must_use]
    pub fn sides_volume(&self) -> &HashMap<BookSide, i64> {
        &self.sides_volume
    }

    /// Looks up an order by id.
    #[must_use]
    pub fn get_order(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Adds an order.
    ///
    /// # Errors
    /// Returns `BookError::OrderAlreadyExists` if the id is present.
    pub fn add_order(&mut self, order: Order) -> Result<(), BookError> {
        if self.get_order(&order.id).is_some() {
            return Err(BookError::OrderAlreadyExists);
        }

        *self.types_volume.entry(order.ord_type).or_insert(0) += 1;
        *self.sides_volume.entry(order.side).or_insert(0) += 1;
        self.fill_best(&order);
        self.orders.push(order);
        Ok(())
    }

    /// Replaces an order in place.
    ///
    /// # Errors
    /// Returns `BookError::OrderNotFound` if the id is absent.
    pub fn update_order(&mut self, order: Order) -> Result<(), BookError> {
        let Some(idx) = self.orders.iter().position(|o| o.id == order.id) else {
            return Err(BookError::OrderNotFound);
        };

        let previous = std::mem::replace(&mut self.orders[idx], order.clone());
        if previous.ord_type != order.ord_type {
            *self.types_volume.entry(previous.ord_type).or_insert(0) -= 1;
            *self.types_volume.entry(order.ord_type).or_insert(0) += 1;
        }
        if previous.side != order.side {
            *self.sides_volume.entry(previous.side).or_insert(0) -= 1;
            *self.sides_volume.entry(order.side).or_insert(0) += 1;
            self.recompute_best(previous.side);
            self.recompute_best(order.side);
            return Ok(());
        }

        let was_best = match order.side {
            BookSide::Bid => self.best_bid.as_ref().is_some_and(|b| b.id == order.id),
            BookSide::Offer => self.best_offer.as_ref().is_some_and(|b| b.id == order.id),
        };
        if was_best {
            self.recompute_best(order.side);
        } else {
            self.fill_best(&order);
        }
        Ok(())
    }

    /// Removes an order by id.
    ///
    /// # Errors
    /// Returns `BookError::OrderNotFound` if the id is absent.
    pub fn delete_order(&mut self, id: &str) -> Result<(), BookError> {
        let Some(idx) = self.orders.iter().position(|o| o.id == id) else {
            return Err(BookError::OrderNotFound);
        };

        let removed = self.orders.remove(idx);
        *self.types_volume.entry(removed.ord_type).or_insert(0) -= 1;
        *self.sides_volume.entry(removed.side).or_insert(0) -= 1;

        let was_best = match removed.side {
            BookSide::Bid => self.best_bid.as_ref().is_some_and(|b| b.id == removed.id),
            BookSide::Offer => self.best_offer.as_ref().is_some_and(|b| b.id == removed.id),
        };
        if was_best {
            self.recompute_best(removed.side);
        }
        Ok(())
    }

    /// Per-(type, side) order counts, for the orders gauge.
    #[must_use]
    pub fn stats(&self) -> HashMap<(OrdType, BookSide), i64> {
        let mut stats = HashMap::new();
        for order in &self.orders {
            *stats.entry((order.ord_type, order.side)).or_insert(0) += 1;
        }
        stats
    }

    /// Returns true iff both bests exist and best bid >= best offer.
    #[must_use]
    pub fn is_crossed(&self) -> bool {
        match (&self.best_bid, &self.best_offer) {
            (Some(bid), Some(offer)) => bid.price >= offer.price,
            _ => false,
        }
    }

    /// Evaluates the crossed state and latches transitions.
    ///
    /// The `changed` flag fires exactly once per crossed/uncrossed cycle, so
    /// the caller can increment the one-shot counter and move the gauge.
    pub fn check_crossed(&mut self) -> CrossedState {
        let crossed = self.is_crossed();
        let changed = crossed != self.crossed;
        self.crossed = crossed;
        CrossedState { crossed, changed }
    }

    fn fill_best(&mut self, order: &Order) {
        match order.side {
            BookSide::Bid => {
                if self.best_bid.as_ref().is_none_or(|b| order.price > b.price) {
                    self.best_bid = Some(order.clone());
                }
            }
            BookSide::Offer => {
                if self.best_offer.as_ref().is_none_or(|b| order.price < b.price) {
                    self.best_offer = Some(order.clone());
                }
            }
        }
    }

    fn recompute_best(&mut self, side: BookSide) {
        let best = match side {
            BookSide::Bid => self
                .orders
                .iter()
                .filter(|o| o.side == BookSide::Bid)
                .max_by_key(|o| o.price)
                .cloned(),
            BookSide::Offer => self
                .orders
                .iter()
                .filter(|o| o.side == BookSide::Offer)
                .min_by_key(|o| o.price)
                .cloned(),
        };
        match side {
            BookSide::Bid => self.best_bid = best,
            BookSide::Offer => self.best_offer = best,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, side: BookSide, price: &str, size: &str) -> Order {
        Order {
            id: id.to_string(),
            side,
            ord_type: OrdType::Limit,
            price: price.parse().unwrap(),
            size: size.parse().unwrap(),
            remaining_size: size.parse().unwrap(),
        }
    }

    // Scenario: one bid in an empty book becomes the best bid, no offer,
    // not crossed.
    #[test]
    fn test_single_bid() {
        let mut book = OrderBook::new();
        book.add_order(order("o1", BookSide::Bid, "100.00", "10"))
            .unwrap();

        assert_eq!(book.len(), 1);
        assert_eq!(book.best_bid().unwrap().id, "o1");
        assert!(book.best_offer().is_none());
        assert!(!book.is_crossed());
    }

    #[test]
    fn test_add_duplicate_fails() {
        let mut book = OrderBook::new();
        book.add_order(order("o1", BookSide::Bid, "100.00", "10"))
            .unwrap();
        let err = book
            .add_order(order("o1", BookSide::Bid, "101.00", "5"))
            .unwrap_err();
        assert_eq!(err, BookError::OrderAlreadyExists);
        assert_eq!(book.len(), 1);
    }

    // Scenario: an offer below the standing bid crosses the book; the
    // transition fires exactly once.
    #[test]
    fn test_crossed_detection_latches() {
        let mut book = OrderBook::new();
        book.add_order(order("o1", BookSide::Bid, "100.00", "10"))
            .unwrap();
        book.add_order(order("o2", BookSide::Offer, "99.00", "5"))
            .unwrap();

        assert!(book.is_crossed());
        let first = book.check_crossed();
        assert!(first.crossed && first.changed);
        let second = book.check_crossed();
        assert!(second.crossed && !second.changed);
    }

    // Scenario: deleting the best bid uncrosses the book and clears the
    // best; deleting again reports OrderNotFound.
    #[test]
    fn test_delete_best_uncrosses() {
        let mut book = OrderBook::new();
        book.add_order(order("o1", BookSide::Bid, "100.00", "10"))
            .unwrap();
        book.add_order(order("o2", BookSide::Offer, "99.00", "5"))
            .unwrap();
        let _ = book.check_crossed();

        book.delete_order("o1").unwrap();
        assert!(book.best_bid().is_none());
        assert!(!book.is_crossed());
        let state = book.check_crossed();
        assert!(!state.crossed && state.changed);

        assert_eq!(book.delete_order("o1").unwrap_err(), BookError::OrderNotFound);
    }

    #[test]
    fn test_best_recomputed_after_delete() {
        let mut book = OrderBook::new();
        book.add_order(order("o1", BookSide::Bid, "100.00", "10"))
            .unwrap();
        book.add_order(order("o2", BookSide::Bid, "101.00", "10"))
            .unwrap();
        book.add_order(order("o3", BookSide::Bid, "99.00", "10"))
            .unwrap();
        assert_eq!(book.best_bid().unwrap().id, "o2");

        book.delete_order("o2").unwrap();
        assert_eq!(book.best_bid().unwrap().id, "o1");
    }

    #[test]
    fn test_update_moves_best() {
        let mut book = OrderBook::new();
        book.add_order(order("o1", BookSide::Offer, "100.00", "10"))
            .unwrap();
        book.add_order(order("o2", BookSide::Offer, "101.00", "10"))
            .unwrap();
        assert_eq!(book.best_offer().unwrap().id, "o1");

        // The best offer moves away; the other order takes over.
        book.update_order(order("o1", BookSide::Offer, "102.00", "10"))
            .unwrap();
        assert_eq!(book.best_offer().unwrap().id, "o2");

        // A non-best order improves past the best.
        book.update_order(order("o1", BookSide::Offer, "99.00", "10"))
            .unwrap();
        assert_eq!(book.best_offer().unwrap().id, "o1");
    }

    #[test]
    fn test_update_missing_fails() {
        let mut book = OrderBook::new();
        let err = book
            .update_order(order("ghost", BookSide::Bid, "1.00", "1"))
            .unwrap_err();
        assert_eq!(err, BookError::OrderNotFound);
    }

    // Invariant: order count equals the sum of type counters and the sum
    // of side counters.
    #[test]
    fn test_volume_bijection() {
        let mut book = OrderBook::new();
        book.add_order(order("o1", BookSide::Bid, "100.00", "10"))
            .unwrap();
        book.add_order(order("o2", BookSide::Offer, "101.00", "5"))
            .unwrap();
        book.add_order(order("o3", BookSide::Bid, "99.00", "1"))
            .unwrap();
        book.delete_order("o3").unwrap();

        let type_sum: i64 = book.types_volume().values().sum();
        let side_sum: i64 = book.sides_volume().values().sum();
        assert_eq!(book.len() as i64, type_sum);
        assert_eq!(book.len() as i64, side_sum);

        let stats = book.stats();
        let stat_sum: i64 = stats.values().sum();
        assert_eq!(stat_sum, book.len() as i64);
    }
}
