use surrealdb::{engine::any::Any, sql::Thing, Surreal};

#[derive(serde::Deserialize)]
pub struct CountResult {
    pub total: u64,
}

#[derive(serde::Deserialize)]
pub struct RecordId {
    pub id: Thing,
}

/// Whether `err` is a write refused by the UNIQUE index named `index`.
pub fn violates_index(err: &surrealdb::Error, index: &str) -> bool {
    err.to_string()
        .contains(&format!("Database index `{index}` already contains"))
}

/// Uniqueness the services rely on, enforced once more by the database.
pub async fn define_indexes(db: &Surreal<Any>) -> surrealdb::Result<()> {
    db.query(
        r#"
        DEFINE INDEX IF NOT EXISTS user_email ON TABLE user COLUMNS email UNIQUE;
        DEFINE INDEX IF NOT EXISTS user_referral_code ON TABLE user COLUMNS referral_code UNIQUE;
        DEFINE INDEX IF NOT EXISTS user_google_id ON TABLE user COLUMNS google_id;
        DEFINE INDEX IF NOT EXISTS review_music_user ON TABLE review COLUMNS music, user UNIQUE;
        DEFINE INDEX IF NOT EXISTS orders_invoice_token ON TABLE orders COLUMNS invoice_token UNIQUE;
        "#,
    )
    .await?
    .check()?;
    Ok(())
}
