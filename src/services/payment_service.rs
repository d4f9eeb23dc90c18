use surrealdb::{engine::any::Any, Surreal};

use crate::{
    auth::capability::authorize_owner_or_admin,
    error::{Error, Result},
    helpers::{
        music_helpers::{find_music, get_music},
        thing_helpers::{create_user_thing, thing_id},
        user_helpers::get_user,
    },
    middlewares::mw_auth::Ctx,
    models::{
        database_helpers::CountResult,
        order::{
            CheckoutPayload, CheckoutResponse, ConfirmationResponse, OrderItem, OrderRecord,
            REFERRAL_BONUS_POINTS,
        },
    },
    services::{
        entitlement_service::EntitlementService,
        paydunya_service::{InvoiceLine, InvoiceProvider, InvoiceRequest, InvoiceStatus},
    },
};

pub const PAYMENT_METHOD: &str = "paydunya";
const INVOICE_DESCRIPTION: &str = "Achat de musique sur RAP2RUE";

pub struct PaymentService;

impl PaymentService {
    /// Prices the cart from the catalog, opens an invoice and records the
    /// unpaid order.
    pub async fn checkout(
        db: &Surreal<Any>,
        invoices: &dyn InvoiceProvider,
        user_id: &str,
        payload: CheckoutPayload,
    ) -> Result<CheckoutResponse> {
        let cart = payload.items.unwrap_or_default();
        if cart.is_empty() {
            return Err(Error::InvalidInput {
                reason: "Aucune musique dans la commande.".to_string(),
            });
        }

        let mut items = Vec::with_capacity(cart.len());
        for line in cart {
            let music_id = line
                .music_id
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| Error::InvalidInput {
                    reason: "Chaque musique doit avoir un musicId.".to_string(),
                })?;
            let music = get_music(db, &music_id).await?;
            let Some(music_thing) = music.id else {
                return Err(Error::MusicNotFound { id: music_id });
            };

            items.push(OrderItem {
                music: music_thing,
                name: music.title,
                price: music.price,
                quantity: line.quantity.unwrap_or(1).max(1),
                description: music.description,
            });
        }

        let amount: u64 = items
            .iter()
            .map(|item| u64::from(item.price) * u64::from(item.quantity))
            .sum();
        let invoice = InvoiceRequest {
            items: items
                .iter()
                .map(|item| InvoiceLine {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    unit_price: item.price,
                    total_price: u64::from(item.price) * u64::from(item.quantity),
                    description: item.description.clone(),
                })
                .collect(),
            total_amount: amount,
            description: INVOICE_DESCRIPTION.to_string(),
        };

        let created = invoices.create_invoice(&invoice).await?;

        let order = OrderRecord {
            id: None,
            user: create_user_thing(user_id),
            items,
            amount,
            payment_method: PAYMENT_METHOD.to_string(),
            payment: false,
            invoice_token: created.token,
            address: payload.address,
            date: chrono::Utc::now().into(),
        };
        let saved: Option<OrderRecord> = db.create("orders").content(order).await?;
        let saved = saved.ok_or(Error::DbError("Could not create order".into()))?;

        tracing::info!(
            "order {} opened for user {} ({} F CFA)",
            saved.invoice_token,
            user_id,
            saved.amount
        );

        Self::apply_referral_bonus(db, user_id).await?;

        Ok(CheckoutResponse {
            success: true,
            message: "Facture générée avec succès".to_string(),
            redirect_url: created.url,
        })
    }

    /// Credits the referrer when this is the buyer's first order.
    async fn apply_referral_bonus(db: &Surreal<Any>, user_id: &str) -> Result<()> {
        let user = get_user(db, user_id).await?;
        let Some(code) = user.referred_by else {
            return Ok(());
        };

        let mut response = db
            .query("SELECT count() AS total FROM orders WHERE user = $user GROUP ALL;")
            .bind(("user", create_user_thing(user_id)))
            .await?;
        let orders: Option<CountResult> = response.take(0)?;
        if orders.map(|c| c.total).unwrap_or(0) != 1 {
            return Ok(());
        }

        db.query("UPDATE user SET points += $bonus WHERE referral_code = $code;")
            .bind(("bonus", REFERRAL_BONUS_POINTS))
            .bind(("code", code.clone()))
            .await?
            .check()?;

        tracing::info!("referral bonus credited to {}", code);
        Ok(())
    }

    /// Asks the provider whether the invoice was paid; once it is, marks the
    /// order paid and unlocks its music.
    pub async fn confirm(
        db: &Surreal<Any>,
        invoices: &dyn InvoiceProvider,
        ctx: &Ctx,
        token: &str,
    ) -> Result<ConfirmationResponse> {
        let mut response = db
            .query("SELECT * FROM orders WHERE invoice_token = $invoice_token LIMIT 1;")
            .bind(("invoice_token", token.to_string()))
            .await?;
        let order: Option<OrderRecord> = response.take(0)?;
        let order = order.ok_or_else(|| Error::OrderNotFound {
            token: token.to_string(),
        })?;
        authorize_owner_or_admin(ctx, &thing_id(&order.user))?;

        if invoices.invoice_status(token).await? != InvoiceStatus::Completed {
            return Ok(ConfirmationResponse {
                paid: false,
                unlocked: vec![],
            });
        }

        if let Some(order_thing) = &order.id {
            db.query("UPDATE $order SET payment = true;")
                .bind(("order", order_thing.clone()))
                .await?
                .check()?;
        }

        let mut unlocked = Vec::new();
        for item in &order.items {
            let music_id = thing_id(&item.music);
            let Some(music) = find_music(db, &music_id).await? else {
                tracing::warn!("paid order {} references deleted music {}", token, music_id);
                continue;
            };
            if music.artist == order.user {
                continue;
            }
            if EntitlementService::grant(db, &order.user, &item.music).await? {
                unlocked.push(music_id);
            }
        }

        tracing::info!("order {} paid, {} track(s) unlocked", token, unlocked.len());
        Ok(ConfirmationResponse {
            paid: true,
            unlocked,
        })
    }
}
