use std::sync::Arc;

use log::*;
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};

use crate::{config::RazorpayConfig, NewRazorpayOrder, RazorpayApiError, RazorpayErrorBody, RazorpayOrder};

#[derive(Clone)]
pub struct RazorpayApi {
    config: RazorpayConfig,
    client: Arc<Client>,
}

impl RazorpayApi {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        let client = Client::builder().build().map_err(|e| RazorpayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &RazorpayConfig {
        &self.config
    }

    /// Sends an authenticated request to the Razorpay REST API. Every call uses HTTP basic auth with the key id and
    /// key secret.
    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, RazorpayApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {method} {url}");
        let mut req = self
            .client
            .request(method, url)
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.reveal()));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| RazorpayApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| RazorpayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let text = response.text().await.map_err(|e| RazorpayApiError::RestResponseError(e.to_string()))?;
            let message = serde_json::from_str::<RazorpayErrorBody>(&text)
                .map(|b| format!("{}: {}", b.error.code, b.error.description))
                .unwrap_or(text);
            Err(RazorpayApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url.trim_end_matches('/'))
    }

    pub async fn create_order(&self, order: NewRazorpayOrder) -> Result<RazorpayOrder, RazorpayApiError> {
        debug!("Creating order for {} {} (receipt {})", order.amount, order.currency, order.receipt);
        let result = self.rest_query::<RazorpayOrder, NewRazorpayOrder>(Method::POST, "/orders", Some(order)).await?;
        info!("Created order {}", result.id);
        Ok(result)
    }

    pub async fn fetch_order(&self, order_id: &str) -> Result<RazorpayOrder, RazorpayApiError> {
        let path = format!("/orders/{order_id}");
        debug!("Fetching order {order_id}");
        let result = self.rest_query::<RazorpayOrder, ()>(Method::GET, &path, None).await?;
        debug!("Fetched order {order_id}. Status: {}", result.status);
        Ok(result)
    }
}
