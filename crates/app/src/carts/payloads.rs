//! Cart API request and response bodies.

use serde::{Deserialize, Serialize};
use storefront::prelude::{ProductId, RemoteCartLine, UserId};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CartItemPayload<'a> {
    pub(super) identity: &'a UserId,
    pub(super) product_id: ProductId,
    pub(super) quantity: u32,
}

#[derive(Debug, Serialize)]
pub(super) struct IdentityPayload<'a> {
    pub(super) identity: &'a UserId,
}

#[derive(Debug, Deserialize)]
pub(super) struct CartResponse {
    #[serde(default)]
    pub(super) cart: Vec<RemoteCartLine>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn item_payload_uses_camel_case() -> TestResult {
        let user = UserId::new("u1");

        let payload = serde_json::to_value(CartItemPayload {
            identity: &user,
            product_id: ProductId::new(3),
            quantity: 2,
        })?;

        assert_eq!(
            payload,
            json!({ "identity": "u1", "productId": 3, "quantity": 2 })
        );

        Ok(())
    }

    #[test]
    fn cart_response_reads_lines() -> TestResult {
        let response: CartResponse = serde_json::from_value(json!({
            "cart": [
                { "productId": 1, "quantity": 2 },
                { "productId": 7, "quantity": 1 }
            ]
        }))?;

        assert_eq!(
            response.cart,
            [
                RemoteCartLine {
                    product_id: ProductId::new(1),
                    quantity: 2,
                },
                RemoteCartLine {
                    product_id: ProductId::new(7),
                    quantity: 1,
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn missing_cart_reads_as_empty() -> TestResult {
        let response: CartResponse = serde_json::from_value(json!({}))?;

        assert!(response.cart.is_empty());

        Ok(())
    }
}
