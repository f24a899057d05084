//! Shipping address resolution.
//!
//! Storefront checkouts send the delivery address in one of two shapes: a
//! plain string (a saved-address reference or a literal address line) or a
//! structured object with the detail/ward/district/province split. Either may
//! be absent, in which case the address is rebuilt from the recipient fields.

use ledger::RecipientInfo;
use serde::Deserialize;

/// The address field of a checkout payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AddressInput {
    /// A saved-address reference or a literal one-line address.
    Raw(String),

    /// A structured address, in either the storefront's original field
    /// names or the plain equivalents.
    Structured {
        #[serde(default, rename = "DiaChiChiTiet", alias = "detail")]
        detail: Option<String>,
        #[serde(default, rename = "PhuongXa", alias = "ward")]
        ward: Option<String>,
        #[serde(default, rename = "QuanHuyen", alias = "district")]
        district: Option<String>,
        #[serde(default, rename = "TinhThanh", alias = "province")]
        province: Option<String>,
    },
}

impl AddressInput {
    /// Collapses the input to a single trimmed line, or `None` when every
    /// part is blank.
    pub fn to_line(&self) -> Option<String> {
        match self {
            AddressInput::Raw(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            AddressInput::Structured {
                detail,
                ward,
                district,
                province,
            } => {
                let parts: Vec<&str> = [detail, ward, district, province]
                    .into_iter()
                    .filter_map(|part| part.as_deref())
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(", "))
                }
            }
        }
    }
}

/// Resolves the shipping address for an order.
///
/// The explicit address input wins; when it is absent or blank the address is
/// rebuilt from the recipient's street/ward/district/province fields. Returns
/// `None` when neither source yields anything, which callers reject.
pub fn resolve_shipping_address(
    input: Option<&AddressInput>,
    recipient: &RecipientInfo,
) -> Option<String> {
    if let Some(line) = input.and_then(AddressInput::to_line) {
        return Some(line);
    }

    let parts: Vec<&str> = recipient.address_parts().collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_string_is_trimmed() {
        let input = AddressInput::Raw("  12 Le Loi, Q1  ".to_string());
        assert_eq!(input.to_line().as_deref(), Some("12 Le Loi, Q1"));
    }

    #[test]
    fn blank_raw_string_is_none() {
        assert_eq!(AddressInput::Raw("   ".to_string()).to_line(), None);
    }

    #[test]
    fn structured_joins_non_empty_parts() {
        let input = AddressInput::Structured {
            detail: Some("12 Le Loi".to_string()),
            ward: Some("  ".to_string()),
            district: Some("Quan 1".to_string()),
            province: Some("TP HCM".to_string()),
        };
        assert_eq!(input.to_line().as_deref(), Some("12 Le Loi, Quan 1, TP HCM"));
    }

    #[test]
    fn all_blank_structured_is_none() {
        let input = AddressInput::Structured {
            detail: None,
            ward: Some(String::new()),
            district: None,
            province: None,
        };
        assert_eq!(input.to_line(), None);
    }

    #[test]
    fn falls_back_to_recipient_fields() {
        let recipient = RecipientInfo {
            street: "34 Tran Phu".to_string(),
            district: "Hai Chau".to_string(),
            province: "Da Nang".to_string(),
            ..Default::default()
        };
        assert_eq!(
            resolve_shipping_address(None, &recipient).as_deref(),
            Some("34 Tran Phu, Hai Chau, Da Nang")
        );
    }

    #[test]
    fn explicit_input_wins_over_recipient() {
        let recipient = RecipientInfo {
            street: "34 Tran Phu".to_string(),
            ..Default::default()
        };
        let input = AddressInput::Raw("12 Le Loi".to_string());
        assert_eq!(
            resolve_shipping_address(Some(&input), &recipient).as_deref(),
            Some("12 Le Loi")
        );
    }

    #[test]
    fn nothing_resolvable_is_none() {
        assert_eq!(
            resolve_shipping_address(None, &RecipientInfo::default()),
            None
        );
    }

    #[test]
    fn deserializes_both_wire_shapes() {
        let raw: AddressInput = serde_json::from_str("\"12 Le Loi\"").unwrap();
        assert_eq!(raw, AddressInput::Raw("12 Le Loi".to_string()));

        let structured: AddressInput = serde_json::from_str(
            r#"{"detail": "12 Le Loi", "ward": "Ben Nghe", "district": "Quan 1", "province": "TP HCM"}"#,
        )
        .unwrap();
        assert_eq!(
            structured.to_line().as_deref(),
            Some("12 Le Loi, Ben Nghe, Quan 1, TP HCM")
        );

        let storefront: AddressInput = serde_json::from_str(
            r#"{"DiaChiChiTiet": "12 Le Loi", "PhuongXa": "Ben Nghe", "QuanHuyen": "Q1", "TinhThanh": "HCM"}"#,
        )
        .unwrap();
        assert_eq!(
            storefront.to_line().as_deref(),
            Some("12 Le Loi, Ben Nghe, Q1, HCM")
        );
    }
}
