use crate::operation::{Resolution, ResolvedOperation};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CartEntry {
    pub item_id: String,
    pub name: String,
    pub quantity: u32,
}

/// Immutable cart snapshot. Entries keep insertion order, ids are unique and
/// every quantity is at least 1.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn quantity_of(&self, item_id: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|entry| entry.item_id == item_id)
            .map(|entry| entry.quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_items(&self) -> u64 {
        self.entries.iter().map(|entry| u64::from(entry.quantity)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub cart: Cart,
    pub messages: Vec<String>,
}

impl Reconciliation {
    pub fn status(&self) -> String {
        self.messages.join(" ")
    }
}

/// Applies operations in order to a copy of `cart`. Navigation and capture
/// commands are left to the session and contribute nothing here.
pub fn reconcile(cart: &Cart, operations: &[ResolvedOperation]) -> Reconciliation {
    let mut entries = cart.entries.clone();
    let mut messages = Vec::new();

    for operation in operations {
        match operation {
            ResolvedOperation::Add { resolution, quantity } => {
                messages.push(apply_add(&mut entries, resolution, *quantity));
            }
            ResolvedOperation::Remove { resolution, quantity } => {
                messages.push(apply_remove(&mut entries, resolution, *quantity));
            }
            ResolvedOperation::Reset => {
                entries.clear();
                messages.push("Your cart is now empty.".to_string());
            }
            ResolvedOperation::Unrecognized { text } => {
                messages.push(format!("Sorry, I didn't catch \"{text}\"."));
            }
            ResolvedOperation::NavigateToCart
            | ResolvedOperation::NavigateToMenu
            | ResolvedOperation::StartCapture
            | ResolvedOperation::StopCapture => {}
        }
    }

    Reconciliation {
        cart: Cart { entries },
        messages,
    }
}

fn apply_add(entries: &mut Vec<CartEntry>, resolution: &Resolution, quantity: u32) -> String {
    let item = match resolution {
        Resolution::Found { item, .. } => item,
        Resolution::NotFound { fragment } => return not_found(fragment),
    };
    if quantity == 0 {
        return format!("Nothing to add for {}.", item.name);
    }

    match entries.iter_mut().find(|entry| entry.item_id == item.id) {
        Some(entry) => entry.quantity = entry.quantity.saturating_add(quantity),
        None => entries.push(CartEntry {
            item_id: item.id.clone(),
            name: item.name.clone(),
            quantity,
        }),
    }
    debug!(item = %item.id, quantity, "added to cart");
    format!("Added {quantity} {} to your cart.", item.name)
}

fn apply_remove(
    entries: &mut Vec<CartEntry>,
    resolution: &Resolution,
    quantity: Option<u32>,
) -> String {
    let item = match resolution {
        Resolution::Found { item, .. } => item,
        Resolution::NotFound { fragment } => return not_found(fragment),
    };
    let Some(position) = entries.iter().position(|entry| entry.item_id == item.id) else {
        return format!("{} is not in your cart.", item.name);
    };

    match quantity {
        None => {
            entries.remove(position);
            debug!(item = %item.id, "removed from cart");
            format!("Removed {} from your cart.", item.name)
        }
        Some(count) => {
            let remaining = entries[position].quantity.saturating_sub(count);
            if remaining == 0 {
                entries.remove(position);
            } else {
                entries[position].quantity = remaining;
            }
            debug!(item = %item.id, count, remaining, "reduced cart quantity");
            format!("Removed {count} {} from your cart.", item.name)
        }
    }
}

fn not_found(fragment: &str) -> String {
    format!("Item \"{fragment}\" not found in menu.")
}
