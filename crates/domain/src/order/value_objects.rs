//! Value objects for the order domain.

use serde::{Deserialize, Serialize};

/// Menu item identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Money amount held in minor units (paise) to avoid floating point issues.
///
/// The payment gateway takes amounts in minor units, so `minor_units()` is
/// passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    minor_units: i64,
}

impl Money {
    /// Creates a new Money amount from minor units.
    pub fn from_minor_units(minor_units: i64) -> Self {
        Self { minor_units }
    }

    /// Creates a new Money amount from whole rupees.
    pub fn from_rupees(rupees: i64) -> Self {
        Self {
            minor_units: rupees * 100,
        }
    }

    pub fn zero() -> Self {
        Self { minor_units: 0 }
    }

    /// Returns the amount in minor units.
    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    /// Returns the whole-rupee portion.
    pub fn rupees(&self) -> i64 {
        self.minor_units / 100
    }

    /// Returns the paise remaining after whole rupees.
    pub fn paise_part(&self) -> i64 {
        self.minor_units.abs() % 100
    }

    pub fn is_zero(&self) -> bool {
        self.minor_units == 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            minor_units: self.minor_units * quantity as i64,
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.minor_units < 0 {
            write!(f, "-₹{}.{:02}", self.rupees().abs(), self.paise_part())
        } else {
            write!(f, "₹{}.{:02}", self.rupees(), self.paise_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            minor_units: self.minor_units + rhs.minor_units,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.minor_units += rhs.minor_units;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// A line in the shopping cart, copied verbatim onto the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    /// Pizza size label (e.g. "small", "medium", "large").
    pub size: String,
    /// Unit price.
    pub price: Money,
    pub qty: u32,
}

impl CartItem {
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        size: impl Into<String>,
        price: Money,
        qty: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            size: size.into(),
            price,
            qty,
        }
    }

    /// Returns qty * price.
    pub fn line_total(&self) -> Money {
        self.price.multiply(self.qty)
    }
}

/// Session-scoped shopping cart.
///
/// `total_price` is whatever the session recorded; it is charged as-is and
/// not recomputed from the items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total_qty: u32,
    pub total_price: Money,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart whose totals are computed from `items`.
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let total_qty = items.iter().map(|i| i.qty).sum();
        let total_price = items.iter().map(CartItem::line_total).sum();
        Self {
            items,
            total_qty,
            total_price,
        }
    }

    /// Adds a line, merging quantities when the product is already present.
    pub fn add_item(&mut self, item: CartItem) {
        self.total_qty += item.qty;
        self.total_price += item.line_total();
        match self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id && i.size == item.size)
        {
            Some(existing) => existing.qty += item.qty,
            None => self.items.push(item),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
