use serde::{Deserialize, Serialize};

use crate::product::Product;

/// One line of the locally persisted cart. Unique by `id` within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(deserialize_with = "crate::product::string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(deserialize_with = "crate::product::price")]
    pub price: u64,
    pub quantity: u32,
}

impl CartItem {
    pub fn subtotal(&self) -> u64 {
        self.price * u64::from(self.quantity)
    }
}

impl From<&Product> for CartItem {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            brand: product.brand.clone().unwrap_or_default(),
            price: product.price,
            quantity: 1,
        }
    }
}

pub fn cart_total(items: &[CartItem]) -> u64 {
    items.iter().map(CartItem::subtotal).sum()
}

pub fn cart_item_count(items: &[CartItem]) -> u64 {
    items.iter().map(|i| u64::from(i.quantity)).sum()
}

/// Formats a Rupiah amount with `.` thousands separators, e.g. `Rp 150.000`.
pub fn format_rupiah(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    format!("Rp {out}")
}
