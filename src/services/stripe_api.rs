use crate::errors::AppError;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

#[derive(Clone)]
pub struct StripeApiService {
    client: Client,
    base_url: String,
    secret_key: String,
}

// Generic request helpers
impl StripeApiService {
    pub fn new(base_url: String, secret_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            secret_key,
        }
    }

    async fn post_form<R: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<R, AppError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error reading response body".to_string());
            log::error!("Stripe API error on path {}: {} - {}", path, status, error_text);
            let message = serde_json::from_str::<StripeErrorEnvelope>(&error_text)
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or_else(|| format!("payment request failed with status {}", status));
            return Err(AppError::ExternalApiError(message));
        }

        let result = response.json::<R>().await?;
        Ok(result)
    }
}

// API method implementations
impl StripeApiService {
    pub async fn create_customer(&self, email: &str, source: &str) -> Result<Customer, AppError> {
        self.post_form(
            "/v1/customers",
            &[("email", email.to_string()), ("source", source.to_string())],
        )
        .await
    }

    /// Creates and confirms a card payment intent for `customer`.
    pub async fn create_payment_intent(
        &self,
        customer: &Customer,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, AppError> {
        let mut form = vec![
            ("amount", request.amount.to_string()),
            ("currency", request.currency.to_string()),
            ("description", request.description.clone()),
            ("payment_method_types[]", "card".to_string()),
            ("customer", customer.id.clone()),
            ("confirm", "true".to_string()),
        ];
        if let Some(email) = &customer.email {
            form.push(("receipt_email", email.clone()));
        }
        if let Some(source) = &customer.default_source {
            form.push(("payment_method", source.clone()));
        }
        self.post_form("/v1/payment_intents", &form).await
    }
}

// --- Request & Response Structs ---

#[derive(Debug, Clone)]
pub struct PaymentIntentRequest {
    pub amount: i64,
    pub currency: &'static str,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub id: String,
    pub email: Option<String>,
    pub default_source: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub description: Option<String>,
}

impl PaymentIntent {
    /// Funds are guaranteed once the intent has succeeded or is settling.
    pub fn is_paid(&self) -> bool {
        matches!(self.status.as_str(), "succeeded" | "processing")
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_payment_intent() {
        let raw = r#"{
            "id": "pi_123",
            "object": "payment_intent",
            "amount": 1000,
            "currency": "usd",
            "status": "succeeded",
            "description": "$10 for 20 messages"
        }"#;
        let intent: PaymentIntent = serde_json::from_str(raw).unwrap();
        assert_eq!(intent.amount, 1000);
        assert!(intent.is_paid());
    }

    #[test]
    fn unconfirmed_intent_is_not_paid() {
        let raw = r#"{"id":"pi_1","amount":2000,"currency":"usd","status":"requires_payment_method","description":null}"#;
        let intent: PaymentIntent = serde_json::from_str(raw).unwrap();
        assert!(!intent.is_paid());
    }

    #[test]
    fn extracts_processor_error_message() {
        let raw = r#"{"error":{"type":"card_error","message":"Your card was declined."}}"#;
        let envelope: StripeErrorEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.error.message.as_deref(), Some("Your card was declined."));
    }
}
