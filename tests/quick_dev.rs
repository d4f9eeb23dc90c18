#![allow(unused)]

use anyhow::Result;
use serde_json::json;

// Needs a running server: `cargo run` in another terminal.
#[tokio::test]
#[ignore]
async fn quick_dev() -> Result<()> {
    let hc = httpc_test::new_client("http://localhost:5000")?;

    hc.do_post(
        "/api/auth/register",
        json!({
            "name": "Quick Dev",
            "email": "quick.dev@rap2rue.sn",
            "password": "welcome",
            "role": "artist"
        }),
    )
    .await?
    .print()
    .await?;

    hc.do_post(
        "/api/auth/login",
        json!({
            "email": "quick.dev@rap2rue.sn",
            "password": "welcome"
        }),
    )
    .await?
    .print()
    .await?;

    hc.do_get("/api/music").await?.print().await?;
    hc.do_get("/api/video").await?.print().await?;
    hc.do_get("/api/music/artist-dashboard").await?.print().await?;

    Ok(())
}
