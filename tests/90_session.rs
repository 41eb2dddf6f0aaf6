mod common;

use std::time::Duration;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn cart_requires_a_session() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.get_cart("a@b.com", None).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.get_cart("a@b.com", Some("token=forged.token.value")).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn session_scopes_cart_to_its_owner() -> Result<()> {
    let server = common::TestServer::spawn_with_ttl(60).await?;
    for owner in ["a@b.com", "c@d.com"] {
        server
            .client
            .post(server.url("/addCart"))
            .json(&json!({ "userEmail": owner, "name": "Roshogolla" }))
            .send()
            .await?;
    }

    let cookie = server.login("a@b.com").await?;

    let res = server.get_cart("c@d.com", Some(&cookie)).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.get_cart("a@b.com", Some(&cookie)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let entries = res.json::<Vec<Value>>().await?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["userEmail"], json!("a@b.com"));

    Ok(())
}

#[tokio::test]
async fn session_expires_after_its_window() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let cookie = server.login("a@b.com").await?;

    let res = server.get_cart("a@b.com", Some(&cookie)).await?;
    assert_eq!(res.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(2500)).await;

    let res = server.get_cart("a@b.com", Some(&cookie)).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn log_out_clears_the_cookie() -> Result<()> {
    let server = common::TestServer::spawn_with_ttl(60).await?;
    server.login("a@b.com").await?;

    let res = server
        .client
        .post(server.url("/logOut"))
        .json(&json!({ "email": "a@b.com" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // A browser honours Max-Age=0 and sends the emptied cookie from now on
    let cleared = common::set_cookie_pair(&res).unwrap_or_default();
    assert_eq!(cleared, "token=");
    assert_eq!(res.json::<Value>().await?, json!({ "success": true }));

    let res = server.get_cart("a@b.com", Some(&cleared)).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
