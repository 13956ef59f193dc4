use serde::Deserialize;

/// The incoming `/checkout` body (`SPEC_FULL.md` §6). Field casing follows
/// the source's own mixed convention: snake_case at the top level,
/// camelCase for the nested objects it carries over unchanged. Fields this
/// crate doesn't interpret (`shippingMethod`, `termsAccepted`,
/// `userComment`, `giftWrapping`) are accepted but not modeled — `serde`
/// simply ignores unknown keys on deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRequest {
    /// Absent means a 400 rejection (`SPEC_FULL.md` §4.1); modeled as
    /// `Option` rather than failing deserialization so the orchestrator can
    /// return its specific "missing order_id" response.
    pub order_id: Option<String>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub user: UserFields,
    #[serde(default)]
    pub items: Vec<ItemFields>,
    #[serde(rename = "creditCard", default)]
    pub credit_card: CreditCardFields,
    #[serde(rename = "billingAddress", default)]
    pub billing_address: BillingAddressFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact: String,
    /// `"regular"` unless the client opts into `"premium"`, which earns a
    /// priority-queue bonus (`SPEC_FULL.md` §3).
    #[serde(rename = "type", default = "default_user_type")]
    pub user_type: String,
}

fn default_user_type() -> String {
    "regular".to_owned()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemFields {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreditCardFields {
    #[serde(default)]
    pub number: String,
    #[serde(rename = "expirationDate", default)]
    pub expiration_date: String,
    #[serde(default)]
    pub cvv: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillingAddressFields {
    #[serde(default)]
    pub street: String,
}

impl CreditCardFields {
    /// Strips spaces and dashes, as the transaction flow does before
    /// handing the card number to the checker (`SPEC_FULL.md` §4.1).
    #[must_use]
    pub fn normalized_number(&self) -> String {
        self.number.chars().filter(|c| !matches!(c, ' ' | '-')).collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_the_documented_request_shape() {
        let json = serde_json::json!({
            "order_id": "order-1",
            "user_id": "user-1",
            "amount": 42.5,
            "payment_method": "credit_card",
            "user": {"name": "Jane", "contact": "jane@example.com"},
            "items": [{"name": "Book A", "quantity": 2}],
            "creditCard": {"number": "4111-1111 1111-1111", "expirationDate": "12/25", "cvv": "123"},
            "billingAddress": {"street": "100 Main St"},
            "shippingMethod": "standard",
            "termsAccepted": true,
        });
        let order: OrderRequest = serde_json::from_value(json).unwrap();
        assert_eq!(order.order_id.as_deref(), Some("order-1"));
        assert_eq!(order.user.user_type, "regular");
        assert_eq!(order.billing_address.street, "100 Main St");
        assert_eq!(order.credit_card.normalized_number(), "4111111111111111");
        assert_eq!(order.items[0].quantity, 2);
    }

    #[test]
    fn missing_order_id_parses_to_none() {
        let order: OrderRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(order.order_id.is_none());
    }

    #[test]
    fn premium_user_type_is_preserved() {
        let json = serde_json::json!({"order_id": "o", "user": {"type": "premium"}});
        let order: OrderRequest = serde_json::from_value(json).unwrap();
        assert_eq!(order.user.user_type, "premium");
    }
}
