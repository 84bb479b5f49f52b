use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cart::{cart_total, CartItem};
use crate::error::ValidationError;
use crate::user::User;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery
    #[default]
    Cod,
    Transfer,
}

impl PaymentMethod {
    pub fn label(self) -> &'static str {
        match self {
            Self::Cod => "COD (Cash on Delivery)",
            Self::Transfer => "Bank transfer",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cod" => Ok(Self::Cod),
            "transfer" | "bank" | "bank_transfer" => Ok(Self::Transfer),
            other => Err(ValidationError::PaymentMethod(other.to_string())),
        }
    }
}

/// Backend-owned order lifecycle. Statuses this client does not know are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipping,
    Delivered,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Awaiting confirmation",
            Self::Confirmed => "Confirmed",
            Self::Processing => "Processing",
            Self::Shipping => "Shipping",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => Self::Pending,
            "confirmed" => Self::Confirmed,
            "processing" => Self::Processing,
            "shipping" => Self::Shipping,
            "delivered" => Self::Delivered,
            "cancelled" => Self::Cancelled,
            _ => Self::Other(s),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipping => "shipping",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Other(s) => s,
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(deserialize_with = "crate::product::string_or_number")]
    pub product_id: String,
    pub product_name: String,
    #[serde(default)]
    pub product_brand: String,
    pub price: u64,
    pub quantity: u32,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.id.clone(),
            product_name: item.name.clone(),
            product_brand: item.brand.clone(),
            price: item.price,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub province: String,
    #[serde(default)]
    pub postal_code: String,
}

/// Checkout form as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub shipping: ShippingAddress,
    pub payment_method: PaymentMethod,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    pub user_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub total_amount: u64,
    pub status: OrderStatus,
}

impl NewOrder {
    pub fn from_cart(user: &User, cart: &[CartItem], form: &CheckoutForm) -> Self {
        Self {
            user_id: user.id,
            user_name: user.display_name().to_string(),
            user_email: user.email.clone(),
            items: cart.iter().map(OrderItem::from).collect(),
            shipping_address: form.shipping.clone(),
            payment_method: form.payment_method,
            total_amount: cart_total(cart),
            status: OrderStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: i64,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub total_amount: u64,
    pub status: OrderStatus,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}
