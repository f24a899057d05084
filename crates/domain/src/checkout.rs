//! Checkout wire payloads.
//!
//! The storefront still sends the field names of the original platform, so
//! the payload types map them onto the internal model via serde renames.
//! Normalization trims every string and turns absent fields into empty
//! strings, keeping the persisted document free of `Option` noise.

use common::Money;
use ledger::{LineItem, PaymentMethod, RecipientInfo};
use serde::Deserialize;

use crate::address::AddressInput;
use crate::error::{DomainError, Result};

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().unwrap_or("").trim().to_string()
}

/// One cart line as sent by the storefront.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemInput {
    #[serde(rename = "MaSanPham")]
    pub product_id: Option<String>,

    #[serde(rename = "Gia")]
    pub unit_price: Option<i64>,

    #[serde(rename = "SoLuong")]
    pub quantity: Option<u32>,

    #[serde(default, rename = "KhuyenMai")]
    pub discount_percent: Option<u32>,
}

impl LineItemInput {
    fn into_line_item(self, index: usize) -> Result<LineItem> {
        let product_id = trimmed(&self.product_id);
        if product_id.is_empty() {
            return Err(DomainError::validation(format!(
                "line item {index}: missing product id"
            )));
        }
        let unit_price = self.unit_price.unwrap_or(0);
        if unit_price < 0 {
            return Err(DomainError::validation(format!(
                "line item {index}: negative unit price"
            )));
        }
        let quantity = self.quantity.unwrap_or(0);
        if quantity == 0 {
            return Err(DomainError::validation(format!(
                "line item {index}: quantity must be at least 1"
            )));
        }

        Ok(LineItem {
            product_id,
            unit_price: Money::new(unit_price),
            quantity,
            discount_percent: self.discount_percent.unwrap_or(0),
        })
    }
}

/// Recipient details as sent by the storefront.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipientInput {
    #[serde(rename = "HoTen")]
    pub full_name: Option<String>,

    #[serde(rename = "Email")]
    pub email: Option<String>,

    #[serde(rename = "SoDienThoai")]
    pub phone: Option<String>,

    #[serde(rename = "DiaChiChiTiet")]
    pub street: Option<String>,

    #[serde(rename = "PhuongXa")]
    pub ward: Option<String>,

    #[serde(rename = "QuanHuyen")]
    pub district: Option<String>,

    #[serde(rename = "TinhThanh")]
    pub province: Option<String>,
}

impl RecipientInput {
    /// Trims every field; missing input becomes the empty string.
    pub fn normalize(&self) -> RecipientInfo {
        RecipientInfo {
            full_name: trimmed(&self.full_name),
            email: trimmed(&self.email),
            phone: trimmed(&self.phone),
            street: trimmed(&self.street),
            ward: trimmed(&self.ward),
            district: trimmed(&self.district),
            province: trimmed(&self.province),
        }
    }
}

/// The checkout request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutPayload {
    #[serde(default, rename = "SanPham")]
    pub items: Vec<LineItemInput>,

    #[serde(rename = "TongTien")]
    pub total_amount: Option<i64>,

    #[serde(rename = "PhuongThucThanhToan")]
    pub payment_method: Option<PaymentMethod>,

    #[serde(default, rename = "DiaChi")]
    pub address: Option<AddressInput>,

    #[serde(default, rename = "ThongTinNhanHang")]
    pub recipient: Option<RecipientInput>,

    #[serde(default, rename = "GhiChu")]
    pub note: Option<String>,

    #[serde(default, rename = "Voucher")]
    pub voucher: Option<String>,
}

impl CheckoutPayload {
    /// Validates and converts the cart lines.
    pub fn line_items(&self) -> Result<Vec<LineItem>> {
        if self.items.is_empty() {
            return Err(DomainError::validation("order has no items"));
        }
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| item.clone().into_line_item(index))
            .collect()
    }

    /// Validates the caller-supplied order total.
    pub fn total(&self) -> Result<Money> {
        match self.total_amount {
            Some(total) if total > 0 => Ok(Money::new(total)),
            _ => Err(DomainError::validation("order total must be positive")),
        }
    }

    /// Validates that a payment method was chosen.
    pub fn method(&self) -> Result<PaymentMethod> {
        self.payment_method
            .ok_or_else(|| DomainError::validation("missing payment method"))
    }

    /// Normalized recipient details; an absent block normalizes to empties.
    pub fn normalized_recipient(&self) -> RecipientInfo {
        self.recipient
            .clone()
            .unwrap_or_default()
            .normalize()
    }

    /// Trimmed buyer note.
    pub fn normalized_note(&self) -> String {
        trimmed(&self.note)
    }

    /// Trimmed voucher reference, `None` when blank.
    pub fn normalized_voucher(&self) -> Option<String> {
        let voucher = trimmed(&self.voucher);
        if voucher.is_empty() { None } else { Some(voucher) }
    }
}
