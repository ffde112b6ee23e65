use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique product identifier, assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(#[serde(deserialize_with = "crate::identity::opaque_id")] pub String);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Availability of a surplus-food offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductStatus {
    #[serde(rename = "disponible")]
    Available,
    #[serde(rename = "reservado")]
    Reserved,
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductStatus::Available => f.write_str("available"),
            ProductStatus::Reserved => f.write_str("reserved"),
        }
    }
}

/// Local, best-effort view of a product's remaining stock.
///
/// Only mutated after the backend confirms a reservation; discarded on reload.
/// Invariant: `quantity == 0` implies `status == Reserved`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductProjection {
    pub product_id: ProductId,
    quantity: u32,
    status: ProductStatus,
}

impl ProductProjection {
    /// Build a projection from the listed stock. An empty listing starts out
    /// reserved regardless of `status`.
    pub fn new(product_id: ProductId, quantity: u32, status: ProductStatus) -> Self {
        let status = if quantity == 0 {
            ProductStatus::Reserved
        } else {
            status
        };
        Self {
            product_id,
            quantity,
            status,
        }
    }

    pub fn available(product_id: ProductId, quantity: u32) -> Self {
        Self::new(product_id, quantity, ProductStatus::Available)
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    /// Apply a server-confirmed reservation: one unit fewer, floored at zero.
    pub fn record_reservation(&mut self) {
        self.quantity = self.quantity.saturating_sub(1);
        if self.quantity == 0 {
            self.status = ProductStatus::Reserved;
        }
    }
}
