//! HTTP surface, driven through the router without a socket

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use common::{CUSTOMER, shop};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use storefront_server::api::build_app;
use tower::ServiceExt;

fn app(shop: &common::Shop) -> Router {
    build_app(&shop.state).with_state(shop.state.clone())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str) -> axum::http::request::Builder {
    Request::post(uri).header(header::CONTENT_TYPE, "application/json")
}

fn with_body(builder: axum::http::request::Builder, body: Value) -> Request<Body> {
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_health_reports_catalog_and_gateways() {
    let shop = shop().await;
    let (status, _, body) = send(&app(&shop), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["products"], 2);
    assert_eq!(body["payment_methods"], json!(["paystack"]));
}

#[tokio::test]
async fn test_shop_listing_with_filters() {
    let shop = shop().await;
    let app = app(&shop);

    let (status, _, body) = send(&app, get("/api/shop?brand=Acme")).await;
    assert_eq!(status, StatusCode::OK);
    let page = &body["data"];
    assert_eq!(page["product_count"], 1);
    assert_eq!(page["products"][0]["name"], "Linen Shirt");
    assert_eq!(page["active_filters"][0]["value"], "Acme");
    assert_eq!(page["page"], 1);

    let (status, _, body) = send(&app, get(&format!("/api/category/{}", shop.shirts))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["product_count"], 1);

    let (status, _, body) = send(&app, get("/api/category/999999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1101);
}

#[tokio::test]
async fn test_cart_token_is_minted_and_reused() {
    let shop = shop().await;
    let app = app(&shop);

    let request = with_body(
        post_json("/api/cart/items"),
        json!({ "product_id": shop.socks, "qty": 3 }),
    );
    let (status, headers, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_cart_items"], 1);
    let token = headers["x-cart-token"].to_str().unwrap().to_string();
    assert_eq!(token.len(), 32);

    let request = Request::get("/api/cart")
        .header("x-cart-token", &token)
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["item_count"], 1);
    assert_eq!(body["data"]["items"][0]["qty"], 3);

    // Without the token the cart is simply empty
    let (_, _, body) = send(&app, get("/api/cart")).await;
    assert_eq!(body["data"]["is_empty"], true);

    let request = with_body(
        post_json("/api/cart/items"),
        json!({ "product_id": 0, "qty": 1 }),
    );
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_and_payment_over_http() {
    let shop = shop().await;
    let app = app(&shop);
    let token = "http-cart";

    let request = post_json("/api/cart/items")
        .header("x-cart-token", token)
        .body(Body::from(json!({ "product_id": shop.shirt, "qty": 1, "size": "L" }).to_string()))
        .unwrap();
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    // Anonymous callers cannot check out
    let request = post_json("/api/checkout")
        .header("x-cart-token", token)
        .body(Body::from(json!({ "address": shop.address }).to_string()))
        .unwrap();
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = post_json("/api/checkout")
        .header("x-cart-token", token)
        .header("x-customer-id", CUSTOMER.to_string())
        .body(Body::from(json!({ "address": shop.address }).to_string()))
        .unwrap();
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let order_id = body["data"]["order"]["order_id"].as_str().unwrap().to_string();

    let request = with_body(
        post_json(&format!("/api/checkout/{order_id}/coupon")),
        json!({ "coupon_code": "TEN" }),
    );
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Coupon activated");

    let (status, _, body) = send(
        &app,
        Request::post(format!("/api/payments/paystack/{order_id}/start"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reference = body["data"]["reference"].as_str().unwrap().to_string();
    assert!(reference.starts_with(&order_id));

    let (status, _, body) = send(
        &app,
        get(&format!("/api/payments/paystack/{order_id}/verify?reference=wrong")),
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(
        body["details"]["redirect"],
        format!("/payment_status/{order_id}/?payment_status=failed")
    );

    // Body fields win over the query string
    let request = with_body(
        post_json(&format!("/api/payments/paystack/{order_id}/verify?reference=wrong")),
        json!({ "reference": reference }),
    );
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "paid");
    assert_eq!(body["data"]["transitioned"], true);

    let (status, _, body) = send(
        &app,
        get(&format!("/api/payment_status/{order_id}?payment_status=paid")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["order"]["payment_status"], "paid");
    assert_eq!(body["data"]["outcome"], "paid");

    let request = Request::get("/api/notifications")
        .header("x-customer-id", CUSTOMER.to_string())
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _, _) = send(&app, get(&format!("/api/payments/bitcoin/{order_id}/verify"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_locale_for_local_caller() {
    let shop = shop().await;
    let request = Request::get("/api/locale")
        .header("x-forwarded-for", "127.0.0.1")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app(&shop), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["country"], "KG");
    // Rates source is offline, fallback table in use
    assert_eq!(body["data"]["degraded"], true);
}
