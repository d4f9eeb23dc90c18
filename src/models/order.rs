use serde::{Deserialize, Serialize};
use surrealdb::{sql::Thing, Datetime};

/// Points credited to a referrer when their referee places a first order.
pub const REFERRAL_BONUS_POINTS: u32 = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OrderItem {
    pub music: Thing,
    pub name: String,
    pub price: u32,
    pub quantity: u32,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OrderRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub user: Thing,
    pub items: Vec<OrderItem>,
    pub amount: u64,
    pub payment_method: String,
    #[serde(default)]
    pub payment: bool,
    pub invoice_token: String,
    pub address: Option<String>,
    pub date: Datetime,
}

/// A cart line as sent by the client. Only `music_id` and `quantity` are
/// trusted; name and price come from the catalog.
#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutItem {
    #[serde(alias = "musicId")]
    pub music_id: Option<String>,
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutPayload {
    pub items: Option<Vec<CheckoutItem>>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct CheckoutResponse {
    pub success: bool,
    pub message: String,
    pub redirect_url: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct ConfirmationResponse {
    pub paid: bool,
    pub unlocked: Vec<String>,
}
