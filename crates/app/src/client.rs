//! HTTP client for the storefront backend.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use storefront::{
    api::{ApiError, Restaurant, RestaurantId, StorefrontApi},
    menu::Menu,
    orders::{OrderRequest, OrderResult},
};
use tracing::debug;

use crate::config::ApiConfig;

/// [`StorefrontApi`] over HTTP and JSON.
#[derive(Debug, Clone)]
pub struct HttpStorefrontApi {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl HttpStorefrontApi {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(transport)?;

        Ok(Self {
            base_url: config.base_url().to_string(),
            token: config.token().map(str::to_string),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);

        debug!(%url, "GET");

        let response = self
            .authorize(self.http.get(&url))
            .send()
            .await
            .map_err(transport)?;

        read_json(response).await
    }
}

/// Map a reqwest failure onto the backend error kinds.
fn transport(error: reqwest::Error) -> ApiError {
    if error.is_decode() {
        ApiError::Decode(error.to_string())
    } else {
        ApiError::Transport(error.to_string())
    }
}

/// Human-readable explanation from an error body: its `detail` field, or the first
/// validation message when `detail` is a list.
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    match value.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Array(entries) => entries
            .iter()
            .find_map(|entry| entry.get("msg").and_then(Value::as_str))
            .map(str::to_string),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();

        return Err(ApiError::Status {
            status: status.as_u16(),
            detail: error_detail(&body),
        });
    }

    let body = response.text().await.map_err(transport)?;

    serde_json::from_str(&body).map_err(|error| ApiError::Decode(error.to_string()))
}

#[async_trait]
impl StorefrontApi for HttpStorefrontApi {
    async fn get_menu(&self, restaurant: RestaurantId) -> Result<Menu, ApiError> {
        self.get_json(&format!("restaurants/{restaurant}/menu")).await
    }

    async fn get_restaurant(&self, restaurant: RestaurantId) -> Result<Restaurant, ApiError> {
        self.get_json(&format!("restaurants/{restaurant}")).await
    }

    async fn create_order(
        &self,
        restaurant: RestaurantId,
        order: OrderRequest,
    ) -> Result<OrderResult, ApiError> {
        let url = self.url(&format!("restaurants/{restaurant}/orders"));

        debug!(%url, items = order.items.len(), "POST");

        let response = self
            .authorize(self.http.post(&url))
            .json(&order)
            .send()
            .await
            .map_err(transport)?;

        read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn config(url: &str) -> ApiConfig {
        ApiConfig {
            api_url: url.to_string(),
            api_token: None,
            http_timeout_seconds: 5,
        }
    }

    #[test]
    fn urls_join_without_double_slashes() -> TestResult {
        let api = HttpStorefrontApi::new(&config("https://taam.menu/api/"))?;

        assert_eq!(
            api.url("/restaurants/4/menu"),
            "https://taam.menu/api/restaurants/4/menu"
        );

        Ok(())
    }

    #[test]
    fn detail_is_read_from_error_bodies() {
        assert_eq!(
            error_detail(r#"{"detail":"Restaurant is closed"}"#),
            Some("Restaurant is closed".to_string())
        );
        let validation = r#"{"detail":[{"loc":["body","customer_phone"],"msg":"field required"}]}"#;

        assert_eq!(
            error_detail(validation),
            Some("field required".to_string())
        );
        assert_eq!(error_detail(r#"{"detail":null}"#), None);
        assert_eq!(error_detail("<html>Bad gateway</html>"), None);
    }
}
