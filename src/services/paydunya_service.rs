use std::{collections::BTreeMap, env};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{error::Error, Result};

const LIVE_API_URL: &str = "https://app.paydunya.com/api/v1";
const SANDBOX_API_URL: &str = "https://app.paydunya.com/sandbox-api/v1";

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceLine {
    pub name: String,
    pub quantity: u32,
    pub unit_price: u32,
    pub total_price: u64,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct InvoiceRequest {
    pub items: Vec<InvoiceLine>,
    pub total_amount: u64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedInvoice {
    pub token: String,
    /// Hosted payment page the buyer is redirected to.
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Completed,
    Cancelled,
}

/// Hosted invoice API that takes the actual payment.
#[async_trait]
pub trait InvoiceProvider: Send + Sync {
    async fn create_invoice(&self, invoice: &InvoiceRequest) -> Result<CreatedInvoice>;

    async fn invoice_status(&self, token: &str) -> Result<InvoiceStatus>;
}

#[derive(Clone)]
pub struct PaydunyaConfig {
    pub master_key: String,
    pub private_key: String,
    pub token: String,
    pub api_url: String,
}

impl PaydunyaConfig {
    pub fn from_env() -> Result<Self> {
        let live = env::var("PAYDUNYA_MODE")
            .map(|mode| mode.eq_ignore_ascii_case("live"))
            .unwrap_or(false);

        Ok(Self {
            master_key: env::var("PAYDUNYA_MASTER_KEY")?,
            private_key: env::var("PAYDUNYA_PRIVATE_KEY")?,
            token: env::var("PAYDUNYA_TOKEN")?,
            api_url: if live { LIVE_API_URL } else { SANDBOX_API_URL }.to_string(),
        })
    }
}

#[derive(Serialize)]
struct StoreInfo {
    name: &'static str,
    tagline: &'static str,
    phone: &'static str,
    postal_address: &'static str,
    website_url: &'static str,
    logo_url: &'static str,
}

const STORE: StoreInfo = StoreInfo {
    name: "RAP2RUE",
    tagline: "La plateforme rap la plus street",
    phone: "787203975",
    postal_address: "Dakar, Sénégal",
    website_url: "https://rap2rue.com",
    logo_url: "https://rap2rue.com/logo.png",
};

#[derive(Serialize)]
struct CheckoutInvoiceBody<'a> {
    invoice: InvoiceBody<'a>,
    store: &'a StoreInfo,
}

#[derive(Serialize)]
struct InvoiceBody<'a> {
    items: BTreeMap<String, &'a InvoiceLine>,
    total_amount: u64,
    description: &'a str,
}

#[derive(Deserialize, Debug)]
struct CreateInvoiceResponse {
    response_code: String,
    response_text: Option<String>,
    token: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ConfirmInvoiceResponse {
    response_code: String,
    response_text: Option<String>,
    status: Option<InvoiceStatus>,
}

const SUCCESS_CODE: &str = "00";

pub struct PaydunyaClient {
    config: PaydunyaConfig,
    http: reqwest::Client,
}

impl PaydunyaClient {
    pub fn new(config: PaydunyaConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.config.api_url, path))
            .header("PAYDUNYA-MASTER-KEY", &self.config.master_key)
            .header("PAYDUNYA-PRIVATE-KEY", &self.config.private_key)
            .header("PAYDUNYA-TOKEN", &self.config.token)
    }
}

fn provider_error(message: impl Into<String>) -> Error {
    Error::PaymentProvider {
        message: message.into(),
    }
}

#[async_trait]
impl InvoiceProvider for PaydunyaClient {
    async fn create_invoice(&self, invoice: &InvoiceRequest) -> Result<CreatedInvoice> {
        let items = invoice
            .items
            .iter()
            .enumerate()
            .map(|(i, line)| (format!("item_{i}"), line))
            .collect();

        let body = CheckoutInvoiceBody {
            invoice: InvoiceBody {
                items,
                total_amount: invoice.total_amount,
                description: &invoice.description,
            },
            store: &STORE,
        };

        let response: CreateInvoiceResponse = self
            .request(reqwest::Method::POST, "/checkout-invoice/create")
            .json(&body)
            .send()
            .await
            .map_err(|e| provider_error(format!("Erreur serveur PayDunya: {e}")))?
            .json()
            .await
            .map_err(|e| provider_error(format!("Réponse PayDunya illisible: {e}")))?;

        tracing::debug!("paydunya create invoice: {:?}", response);

        match (response.response_code.as_str(), response.token, response.response_text) {
            (SUCCESS_CODE, Some(token), Some(url)) => Ok(CreatedInvoice { token, url }),
            (_, _, text) => Err(provider_error(
                text.unwrap_or_else(|| "Erreur PayDunya".to_string()),
            )),
        }
    }

    async fn invoice_status(&self, token: &str) -> Result<InvoiceStatus> {
        let response: ConfirmInvoiceResponse = self
            .request(
                reqwest::Method::GET,
                &format!("/checkout-invoice/confirm/{token}"),
            )
            .send()
            .await
            .map_err(|e| provider_error(format!("Erreur serveur PayDunya: {e}")))?
            .json()
            .await
            .map_err(|e| provider_error(format!("Réponse PayDunya illisible: {e}")))?;

        match (response.response_code.as_str(), response.status) {
            (SUCCESS_CODE, Some(status)) => Ok(status),
            (_, _) => Err(provider_error(
                response
                    .response_text
                    .unwrap_or_else(|| "Facture introuvable".to_string()),
            )),
        }
    }
}
