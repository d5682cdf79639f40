//! Payment client backed by the Stripe REST API.

use async_trait::async_trait;
use checkout_core::payment::{CreateIntentRequest, PaymentClient, PaymentIntent};
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Stripe API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("no Stripe secret key configured")]
    MissingSecretKey,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

pub struct StripeClient {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl StripeClient {
    /// `timeout` bounds every request end to end.
    pub fn new(base_url: &str, secret_key: &str, timeout: Duration) -> Result<Self, StripeError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    fn key(&self) -> Result<&str, StripeError> {
        if self.secret_key.is_empty() {
            Err(StripeError::MissingSecretKey)
        } else {
            Ok(&self.secret_key)
        }
    }

    async fn handle_response(response: Response) -> Result<PaymentIntent, StripeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(StripeError::Api {
            status: status.as_u16(),
            message: api_error_message(&body),
        })
    }
}

/// Form body for `POST /v1/payment_intents`, nested keys in bracket notation.
pub fn intent_form(request: &CreateIntentRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("amount".to_string(), request.amount.to_string()),
        ("currency".to_string(), request.currency.to_lowercase()),
        ("payment_method_types[]".to_string(), "card".to_string()),
    ];
    if let Some(email) = &request.receipt_email {
        form.push(("receipt_email".to_string(), email.clone()));
    }
    for (key, value) in &request.metadata {
        form.push((format!("metadata[{}]", key), value.clone()));
    }
    form
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error.message)
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl PaymentClient for StripeClient {
    async fn create_intent(
        &self,
        request: &CreateIntentRequest,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(self.key()?)
            .form(&intent_form(request))
            .send()
            .await
            .map_err(StripeError::from)?;

        let intent = Self::handle_response(response).await?;
        tracing::debug!("Created payment intent {} for {} {}", intent.id, intent.amount, intent.currency);
        Ok(intent)
    }

    async fn retrieve_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .client
            .get(format!("{}/v1/payment_intents/{}", self.base_url, intent_id))
            .bearer_auth(self.key()?)
            .send()
            .await
            .map_err(StripeError::from)?;

        Ok(Self::handle_response(response).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_intent_form() {
        let request = CreateIntentRequest {
            amount: 23400,
            currency: "HKD".to_string(),
            receipt_email: Some("a@b.co".to_string()),
            metadata: BTreeMap::from([
                ("country".to_string(), "Taiwan".to_string()),
                ("quantity".to_string(), "2".to_string()),
            ]),
        };

        let form = intent_form(&request);
        let get = |k: &str| form.iter().find(|(key, _)| key == k).map(|(_, v)| v.as_str());
        assert_eq!(get("amount"), Some("23400"));
        assert_eq!(get("currency"), Some("hkd"));
        assert_eq!(get("receipt_email"), Some("a@b.co"));
        assert_eq!(get("metadata[country]"), Some("Taiwan"));
        assert_eq!(get("metadata[quantity]"), Some("2"));
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error":{"type":"invalid_request_error","message":"Amount must be at least 400 hkd"}}"#;
        assert_eq!(api_error_message(body), "Amount must be at least 400 hkd");
        assert_eq!(api_error_message("bad gateway"), "bad gateway");
    }

    #[tokio::test]
    async fn test_missing_secret_key_fails_without_network() {
        let client = StripeClient::new("https://api.stripe.com", "", Duration::from_secs(1)).unwrap();
        let err = client.retrieve_intent("pi_1").await.unwrap_err();
        assert_eq!(err.to_string(), "no Stripe secret key configured");
    }
}
