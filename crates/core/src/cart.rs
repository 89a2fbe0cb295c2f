//! Cart

use tracing::debug;

use crate::{
    menu::{Menu, MenuItemId},
    money::Amount,
};

/// One menu item and its requested quantity, with the name, price and photo recorded when it
/// was first added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    item: MenuItemId,
    quantity: u32,
    name: String,
    price: Amount,
    photo: Option<String>,
}

impl CartLine {
    /// Menu item id
    pub fn item(&self) -> MenuItemId {
        self.item
    }

    /// Quantity, always at least one
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Name recorded when the line was created or last refreshed
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price recorded when the line was created or last refreshed
    pub fn recorded_price(&self) -> Amount {
        self.price
    }
}

/// A cart line resolved against the current menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotLine {
    /// Menu item id
    pub item: MenuItemId,

    /// Current name, or the recorded one if the item is gone
    pub name: String,

    /// Current unit price, or the recorded one if the item is gone
    pub price: Amount,

    /// Unit price recorded on the cart line
    pub recorded_price: Amount,

    /// Quantity
    pub quantity: u32,

    /// Photo URL
    pub photo: Option<String>,

    /// Category name, when the item still resolves
    pub category: Option<String>,

    /// The item no longer resolves against the menu
    pub unavailable: bool,
}

impl SnapshotLine {
    /// The current price differs from the one recorded on the line.
    pub fn price_changed(&self) -> bool {
        !self.unavailable && self.price != self.recorded_price
    }

    /// Quantity × unit price; zero for unavailable lines.
    pub fn line_total(&self) -> Amount {
        if self.unavailable {
            return 0;
        }

        self.price.saturating_mul(Amount::from(self.quantity))
    }
}

/// Every cart line joined against the live menu, with derived totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    /// Lines in insertion order
    pub lines: Vec<SnapshotLine>,

    /// Sum of line totals at current prices
    pub total: Amount,

    /// Sum of quantities
    pub item_count: u64,
}

impl CartSnapshot {
    /// Check if the snapshot has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Ids of lines whose item no longer resolves.
    pub fn unavailable_items(&self) -> Vec<MenuItemId> {
        self.lines
            .iter()
            .filter(|line| line.unavailable)
            .map(|line| line.item)
            .collect()
    }

    /// Ids of lines whose price moved since they were recorded.
    pub fn repriced_items(&self) -> Vec<MenuItemId> {
        self.lines
            .iter()
            .filter(|line| line.price_changed())
            .map(|line| line.item)
            .collect()
    }
}

/// Outcome of [`Cart::refresh`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Lines dropped because their item is gone
    pub removed: Vec<MenuItemId>,

    /// Lines whose recorded price was brought up to date
    pub repriced: Vec<MenuItemId>,
}

impl RefreshReport {
    /// Check if the refresh changed nothing.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.repriced.is_empty()
    }
}

/// Quantities keyed by menu item: the single source of truth for what is being ordered.
///
/// The cart never holds a line with quantity zero. Totals are never taken from the recorded
/// prices; they are always recomputed against the menu passed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the quantity for `item` by `delta`.
    ///
    /// Creates the line when it is absent and the result is positive, removes it when the
    /// result drops to zero or below. Adding an item the menu cannot resolve is a no-op.
    pub fn add_item(&mut self, menu: &Menu, item: MenuItemId, delta: i64) {
        if let Some(position) = self.position(item) {
            let Some(line) = self.lines.get_mut(position) else {
                return;
            };

            let quantity = i64::from(line.quantity).saturating_add(delta);

            if quantity <= 0 {
                self.lines.remove(position);
                debug!(%item, "cart line removed");
            } else {
                line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                debug!(%item, quantity = line.quantity, "cart line updated");
            }

            return;
        }

        if delta <= 0 {
            return;
        }

        let Some(resolved) = menu.resolve(item) else {
            debug!(%item, "ignoring add for an item missing from the menu");
            return;
        };

        let quantity = u32::try_from(delta).unwrap_or(u32::MAX);

        self.lines.push(CartLine {
            item,
            quantity,
            name: resolved.item.name.clone(),
            price: resolved.item.price,
            photo: resolved.item.photo.clone(),
        });

        debug!(%item, quantity, "cart line created");
    }

    /// Add one of `item`.
    pub fn add(&mut self, menu: &Menu, item: MenuItemId) {
        self.add_item(menu, item, 1);
    }

    /// Remove the line for `item`, returning whether one existed.
    pub fn remove_item(&mut self, item: MenuItemId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.item != item);

        before != self.lines.len()
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity for `item`, zero when absent.
    pub fn quantity(&self, item: MenuItemId) -> u32 {
        self.lines
            .iter()
            .find(|line| line.item == item)
            .map_or(0, CartLine::quantity)
    }

    /// Sum of quantities.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Number of distinct items.
    pub fn unique_line_count(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total at the menu's current prices.
    pub fn total(&self, menu: &Menu) -> Amount {
        self.snapshot(menu).total
    }

    /// Resolve every line against `menu`.
    ///
    /// Lines whose item no longer resolves are kept and flagged unavailable.
    pub fn snapshot(&self, menu: &Menu) -> CartSnapshot {
        let lines: Vec<SnapshotLine> = self
            .lines
            .iter()
            .map(|line| match menu.resolve(line.item) {
                Some(resolved) => SnapshotLine {
                    item: line.item,
                    name: resolved.item.name.clone(),
                    price: resolved.item.price,
                    recorded_price: line.price,
                    quantity: line.quantity,
                    photo: resolved.item.photo.clone(),
                    category: Some(resolved.category.name.clone()),
                    unavailable: false,
                },
                None => SnapshotLine {
                    item: line.item,
                    name: line.name.clone(),
                    price: line.price,
                    recorded_price: line.price,
                    quantity: line.quantity,
                    photo: line.photo.clone(),
                    category: None,
                    unavailable: true,
                },
            })
            .collect();

        let total = lines
            .iter()
            .fold(0, |acc: Amount, line| acc.saturating_add(line.line_total()));

        CartSnapshot {
            lines,
            total,
            item_count: self.item_count(),
        }
    }

    /// Bring the cart in line with `menu`: drop unavailable lines and record current names
    /// and prices.
    pub fn refresh(&mut self, menu: &Menu) -> RefreshReport {
        let mut report = RefreshReport::default();

        self.lines.retain_mut(|line| {
            let Some(resolved) = menu.resolve(line.item) else {
                report.removed.push(line.item);
                return false;
            };

            if line.price != resolved.item.price {
                report.repriced.push(line.item);
            }

            line.name.clone_from(&resolved.item.name);
            line.price = resolved.item.price;
            line.photo.clone_from(&resolved.item.photo);

            true
        });

        if !report.is_empty() {
            debug!(
                removed = report.removed.len(),
                repriced = report.repriced.len(),
                "cart refreshed against menu"
            );
        }

        report
    }

    fn position(&self, item: MenuItemId) -> Option<usize> {
        self.lines.iter().position(|line| line.item == item)
    }
}
