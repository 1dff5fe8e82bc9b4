//! Delivery orders posted on the farm's order board.
//!
//! The book itself only stores orders and hands out ids. Generation and
//! fulfillment live in the economy domain.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ItemId, OrderId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequirement {
    pub item_id: ItemId,
    pub quantity: u32,
}

/// Immutable once posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub requirements: Vec<OrderRequirement>,
    pub reward_gold: u64,
    pub reward_xp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OrderBookSnapshot {
    pub orders: Vec<Order>,
    pub next_id: OrderId,
}

impl OrderBookSnapshot {
    /// `u64::MAX` is never a valid id or counter: a book restored from it
    /// could not hand out a fresh id.
    pub fn ids_in_range(&self) -> bool {
        self.next_id < OrderId::MAX && self.orders.iter().all(|o| o.id < OrderId::MAX)
    }
}

#[derive(Resource, Debug, Clone)]
pub struct OrderBook {
    orders: Vec<Order>,
    next_id: OrderId,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self {
            orders: Vec::new(),
            next_id: 1,
        }
    }
}

impl OrderBook {
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Append a new order under a fresh id and return that id.
    pub fn post(
        &mut self,
        requirements: Vec<OrderRequirement>,
        reward_gold: u64,
        reward_xp: u64,
    ) -> OrderId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.orders.push(Order {
            id,
            requirements,
            reward_gold,
            reward_xp,
        });
        id
    }

    pub fn remove(&mut self, id: OrderId) -> Option<Order> {
        let index = self.orders.iter().position(|o| o.id == id)?;
        Some(self.orders.remove(index))
    }

    pub fn to_snapshot(&self) -> OrderBookSnapshot {
        OrderBookSnapshot {
            orders: self.orders.clone(),
            next_id: self.next_id,
        }
    }

    /// Replace the book. The id counter is bumped past every restored id so
    /// new orders never collide with old ones.
    pub fn restore(&mut self, snapshot: OrderBookSnapshot) {
        let max_seen = snapshot.orders.iter().map(|o| o.id).max().unwrap_or(0);
        self.next_id = snapshot.next_id.max(max_seen.saturating_add(1));
        self.orders = snapshot.orders;
    }
}
