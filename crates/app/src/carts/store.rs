//! HTTP cart store.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use storefront::prelude::{CartStore, CartStoreError, ProductId, RemoteCartLine, UserId};
use tracing::debug;

use crate::{
    api::{ApiClient, ApiError},
    carts::payloads::{CartItemPayload, CartResponse, IdentityPayload},
};

impl From<ApiError> for CartStoreError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Rejected { status, message } => Self::Rejected { status, message },
            ApiError::Http(source) => Self::Unavailable(Box::new(source)),
        }
    }
}

/// [`CartStore`] backed by the storefront REST API.
#[derive(Debug, Clone)]
pub struct HttpCartStore {
    api: ApiClient,
}

impl HttpCartStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn fetch_request(&self, user: &UserId) -> RequestBuilder {
        self.api
            .request(Method::GET, "cart")
            .query(&[("identity", user.as_str())])
    }

    fn item_request(
        &self,
        method: Method,
        path: &str,
        user: &UserId,
        product: ProductId,
        quantity: u32,
    ) -> RequestBuilder {
        self.api.request(method, path).json(&CartItemPayload {
            identity: user,
            product_id: product,
            quantity,
        })
    }

    fn remove_request(&self, user: &UserId, product: ProductId) -> RequestBuilder {
        self.api
            .request(Method::DELETE, &format!("cart/{product}"))
            .json(&IdentityPayload { identity: user })
    }
}

#[async_trait]
impl CartStore for HttpCartStore {
    async fn fetch_cart(&self, user: &UserId) -> Result<Vec<RemoteCartLine>, CartStoreError> {
        let response = self.api.send(self.fetch_request(user)).await?;
        let body: CartResponse = response.json().await.map_err(ApiError::from)?;

        debug!(user = %user, lines = body.cart.len(), "fetched remote cart");

        Ok(body.cart)
    }

    async fn add_item(
        &self,
        user: &UserId,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), CartStoreError> {
        let request = self.item_request(Method::POST, "cart/add", user, product, quantity);

        self.api.send(request).await?;

        Ok(())
    }

    async fn update_item(
        &self,
        user: &UserId,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), CartStoreError> {
        let request = self.item_request(Method::PUT, "cart/update", user, product, quantity);

        self.api.send(request).await?;

        Ok(())
    }

    async fn remove_item(&self, user: &UserId, product: ProductId) -> Result<(), CartStoreError> {
        self.api.send(self.remove_request(user, product)).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::{Request, header::AUTHORIZATION};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use super::*;

    fn store() -> Result<HttpCartStore, ApiError> {
        let api = ApiClient::new("http://shop.test/api/", Duration::from_secs(5))?;

        api.set_token(Some("secret".to_string()));

        Ok(HttpCartStore::new(api))
    }

    fn json_body(request: &Request) -> Result<Value, Box<dyn std::error::Error>> {
        let bytes = request
            .body()
            .and_then(reqwest::Body::as_bytes)
            .ok_or("request has no buffered body")?;

        Ok(serde_json::from_slice(bytes)?)
    }

    #[test]
    fn fetch_queries_by_identity() -> TestResult {
        let request = store()?.fetch_request(&UserId::new("u 1")).build()?;

        assert_eq!(*request.method(), Method::GET);
        assert_eq!(request.url().as_str(), "http://shop.test/api/cart?identity=u+1");
        assert!(request.body().is_none());
        assert_eq!(
            request.headers().get(AUTHORIZATION).map(|value| value.as_bytes()),
            Some(b"Bearer secret".as_slice())
        );

        Ok(())
    }

    #[test]
    fn add_and_update_post_item_bodies() -> TestResult {
        let store = store()?;
        let user = UserId::new("u1");

        let add = store
            .item_request(Method::POST, "cart/add", &user, ProductId::new(3), 2)
            .build()?;
        let update = store
            .item_request(Method::PUT, "cart/update", &user, ProductId::new(3), 5)
            .build()?;

        assert_eq!(*add.method(), Method::POST);
        assert_eq!(add.url().as_str(), "http://shop.test/api/cart/add");
        assert_eq!(
            json_body(&add)?,
            json!({ "identity": "u1", "productId": 3, "quantity": 2 })
        );

        assert_eq!(*update.method(), Method::PUT);
        assert_eq!(update.url().as_str(), "http://shop.test/api/cart/update");
        assert_eq!(
            json_body(&update)?,
            json!({ "identity": "u1", "productId": 3, "quantity": 5 })
        );

        Ok(())
    }

    #[test]
    fn remove_deletes_by_product_path_with_identity_body() -> TestResult {
        let request = store()?
            .remove_request(&UserId::new("u1"), ProductId::new(7))
            .build()?;

        assert_eq!(*request.method(), Method::DELETE);
        assert_eq!(request.url().as_str(), "http://shop.test/api/cart/7");
        assert_eq!(json_body(&request)?, json!({ "identity": "u1" }));

        Ok(())
    }

    #[test]
    fn rejections_keep_status_and_message() {
        let error = CartStoreError::from(ApiError::Rejected {
            status: 404,
            message: "Cart not found".to_string(),
        });

        assert!(
            matches!(
                &error,
                CartStoreError::Rejected { status: 404, message } if message == "Cart not found"
            ),
            "expected Rejected, got {error:?}"
        );
    }
}
