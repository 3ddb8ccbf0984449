use serde::Deserialize;
use std::future::Future;

const PAYMENT_INTENTS_URL: &str = "https://api.stripe.com/v1/payment_intents";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

pub trait PaymentGateway: Clone + Send + Sync + 'static {
    /// Creates a payment intent for `amount` (smallest currency unit) and
    /// returns the client-usable handle. Pure pass-through, no retries.
    fn create_payment_intent(
        &self,
        amount: u64,
        currency: &str,
    ) -> impl Future<Output = Result<PaymentIntent, String>> + Send;
}

#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: Option<String>,
}

impl StripeGateway {
    pub fn new(secret_key: Option<String>, client: reqwest::Client) -> Self {
        Self { client, secret_key }
    }
}

impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(
        &self,
        amount: u64,
        currency: &str,
    ) -> Result<PaymentIntent, String> {
        let Some(secret_key) = self.secret_key.as_deref() else {
            return Err("payment gateway is not configured".into());
        };

        let params = [
            ("amount", amount.to_string()),
            ("currency", currency.to_string()),
            ("payment_method_types[]", "card".to_string()),
        ];
        let response = self
            .client
            .post(PAYMENT_INTENTS_URL)
            .basic_auth(secret_key, None::<&str>)
            .form(&params)
            .send()
            .await
            .map_err(|err| format!("payment request failed: {err}"))?;

        if !response.status().is_success() {
            return Err(format!("payment gateway answered {}", response.status()));
        }
        response
            .json::<PaymentIntent>()
            .await
            .map_err(|err| format!("payment gateway returned invalid JSON: {err}"))
    }
}
