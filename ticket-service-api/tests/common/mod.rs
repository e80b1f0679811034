use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Once;

static INIT_ENV_ONCE: Once = Once::new();

pub fn init_env() {
    INIT_ENV_ONCE.call_once(|| {
        let _ = dotenvy::dotenv();
    });
}

pub fn address() -> String {
    std::env::var("TICKET_SERVICE_API_BIND_ADDRESS").unwrap()
}

pub fn url(path: &str) -> String {
    format!("http://{}{}", address(), path)
}

///
/// Server must fetch its key set from an endpoint
/// that publishes [jwt_auth::test::test_jwk_set]
///
pub fn token(user_id: &str, roles: &[&str]) -> String {
    jwt_auth::test::create_jwt(user_id, roles)
}

pub async fn purchase(client: &Client, user_id: &str) -> anyhow::Result<Value> {
    let response = client
        .post(url("/tickets/purchase"))
        .bearer_auth(token(user_id, &[]))
        .json(&json!({
            "eventID": "evt-1",
            "quantity": 2,
            "totalPrice": 49.98,
        }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    Ok(response.json().await?)
}
