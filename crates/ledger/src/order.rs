//! The order document and its parts.

use chrono::{DateTime, Utc};
use common::{Money, OrderId};
use serde::{Deserialize, Serialize};

use crate::{CustomerRef, OrderStatus, PaymentMethod, PaymentStatus};

/// Structured recipient details captured at checkout.
///
/// Every field is a trimmed string; missing input is the empty string, never
/// an option, so downstream joins and display code never branch on absence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub ward: String,
    pub district: String,
    pub province: String,
}

impl RecipientInfo {
    /// Address fields in display order, skipping empties.
    pub fn address_parts(&self) -> impl Iterator<Item = &str> {
        [
            self.street.as_str(),
            self.ward.as_str(),
            self.district.as_str(),
            self.province.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
    }
}

/// A frozen snapshot of one cart line at checkout time.
///
/// Never re-reads live product state; the price and discount are whatever the
/// cart carried when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// The product reference.
    pub product_id: String,

    /// Unit price at the time of order.
    pub unit_price: Money,

    /// Quantity ordered.
    pub quantity: u32,

    /// Discount percentage snapshot.
    #[serde(default)]
    pub discount_percent: u32,
}

/// The order aggregate root as persisted in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// System-assigned, immutable identifier.
    pub id: OrderId,

    /// Who placed the order (registered account or guest token).
    pub customer: CustomerRef,

    /// Cart snapshot, non-empty.
    pub line_items: Vec<LineItem>,

    /// Caller-supplied order total. Not recomputed from line items.
    pub total_amount: Money,

    /// Shipping fee, zero unless set by an administrator.
    pub shipping_fee: Money,

    /// Resolved single-line shipping address, non-empty.
    pub shipping_address: String,

    /// Normalized recipient details.
    pub recipient: RecipientInfo,

    pub payment_method: PaymentMethod,

    /// Settlement state, independent of the order status.
    pub payment_status: PaymentStatus,

    pub status: OrderStatus,

    /// Optional free-text note from the buyer or an administrator.
    pub note: String,

    /// Opaque voucher reference, if one was applied.
    pub voucher: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Stamps `updated_at` with the current time.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A partial administrative update.
///
/// Each field is independently patchable; `None` leaves the stored value
/// untouched. An all-`None` patch is a caller error, rejected upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub shipping_address: Option<String>,
    pub shipping_fee: Option<Money>,
    pub note: Option<String>,
    pub total_amount: Option<Money>,
}

impl OrderPatch {
    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.payment_method.is_none()
            && self.shipping_address.is_none()
            && self.shipping_fee.is_none()
            && self.note.is_none()
            && self.total_amount.is_none()
    }

    /// Applies the supplied fields to an order and stamps `updated_at`.
    pub fn apply(&self, order: &mut Order) {
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(method) = self.payment_method {
            order.payment_method = method;
        }
        if let Some(ref address) = self.shipping_address {
            order.shipping_address = address.clone();
        }
        if let Some(fee) = self.shipping_fee {
            order.shipping_fee = fee;
        }
        if let Some(ref note) = self.note {
            order.note = note.clone();
        }
        if let Some(total) = self.total_amount {
            order.total_amount = total;
        }
        order.touch();
    }
}
