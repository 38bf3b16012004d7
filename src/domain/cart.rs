//! Shopping cart reducer and price normalisation.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Product;

/// Product identifier as the catalog hands it out: numeric for the static
/// catalog, text for anything else. `101` and `"101"` are distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{n}"),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

/// Price as received: either a number or currency-formatted text such as
/// `"$10.000"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Price {
    Amount(f64),
    Text(String),
}

impl Price {
    /// Numeric value of the price. Text keeps only digits, `.` and `-`
    /// before parsing the longest numeric prefix; anything unparseable is 0.
    ///
    /// ```
    /// use baristaflow_api::domain::cart::Price;
    ///
    /// assert_eq!(Price::Text("$10.000".into()).value(), 10.0);
    /// assert_eq!(Price::Text("19.99".into()).value(), 19.99);
    /// assert_eq!(Price::Text("gratis".into()).value(), 0.0);
    /// ```
    pub fn value(&self) -> f64 {
        match self {
            Price::Amount(n) if n.is_finite() => *n,
            Price::Amount(_) => 0.0,
            Price::Text(raw) => {
                let kept: String = raw
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                    .collect();
                parse_float_prefix(&kept).unwrap_or(0.0)
            }
        }
    }
}

/// Parse the longest prefix of `s` that forms a decimal number
/// (`-?digits(.digits)?` or `-?.digits`).
fn parse_float_prefix(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if frac_end > frac_start || digits > 0 {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    s.get(..end)?.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: ItemId,
    pub name: String,
    #[serde(alias = "price")]
    pub unit_price: Price,
    #[serde(default)]
    pub image: String,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price.value() * f64::from(self.quantity)
    }
}

/// Anything that can be put in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartProduct {
    pub id: ItemId,
    pub name: String,
    pub unit_price: Price,
    pub image: String,
}

impl From<&Product> for CartProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: ItemId::Number(product.id),
            name: product.name.clone(),
            unit_price: Price::Text(product.price.clone()),
            image: product.image.clone(),
        }
    }
}

/// Session-scoped cart. At most one line per id; quantities never reach 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from line items, merging duplicate ids and dropping
    /// zero-quantity lines.
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            match cart.items.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
                None => cart.items.push(item),
            }
        }
        cart
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit: bumps the quantity of an existing line or appends a new
    /// line with quantity 1.
    pub fn add(&mut self, product: CartProduct) {
        match self.items.iter_mut().find(|item| item.id == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => self.items.push(CartItem {
                id: product.id,
                name: product.name,
                unit_price: product.unit_price,
                image: product.image,
                quantity: 1,
            }),
        }
    }

    /// Drop the whole line for `id`.
    pub fn remove(&mut self, id: &ItemId) {
        self.items.retain(|item| &item.id != id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(CartItem::line_total)
            .fold(0.0, |acc, line| acc + line)
    }

    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Owned copy of the lines, for order records.
    pub fn snapshot(&self) -> Vec<CartItem> {
        self.items.clone()
    }
}
