//! Integration tests for the REST client against a local axum server.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bistro::api::{
    AddCartItemRequest, ApiClient, CheckoutRequest, ClientError, MenuQuery, Paging,
};
use bistro_core::{
    BistroError, CartToken, CategoryId, KitchenStatus, LineId, MenuItemId, Money, OptionId,
    OrderId, PaymentMethod,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Requests seen by the mock server: (path, authorization header, body).
type Seen = Arc<Mutex<Vec<(String, Option<String>, Value)>>>;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base: &str) -> ApiClient {
    ApiClient::new(base, Duration::from_secs(5)).unwrap()
}

fn auth_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn ok(result: Value) -> Json<Value> {
    Json(json!({ "success": true, "result": result }))
}

fn cart_json(items: Value) -> Value {
    json!({ "token": "tok-1", "items": items, "totalAmount": 0, "totalItems": 0 })
}

// =============================================================================
// ENVELOPE & ERROR MAPPING
// =============================================================================

#[tokio::test]
async fn menu_list_decodes_page_and_sends_query() {
    async fn list(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        Json(json!({
            "success": true,
            "result": [{
                "id": 1,
                "name": params.get("search").cloned().unwrap_or_default(),
                "price": 450,
                "categoryId": params.get("categoryId").and_then(|c| c.parse::<u64>().ok()),
                "isAvailable": true
            }],
            "metadata": {
                "page": 1,
                "pageSize": params.get("pageSize").and_then(|s| s.parse::<u32>().ok()),
                "totalCount": 1,
                "totalPages": 1
            }
        }))
    }

    let base = serve(Router::new().route("/api/menu-items", get(list))).await;
    let query = MenuQuery {
        category_id: Some(CategoryId(2)),
        search: Some("  soup ".to_string()),
        paging: Paging {
            page: Some(1),
            page_size: Some(10_000),
        },
    };

    let page = client(&base).list_menu_items(&query).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "soup");
    assert_eq!(page.items[0].category_id, CategoryId(2));
    assert_eq!(page.items[0].price, Money(450));

    let meta = page.meta.unwrap();
    assert_eq!(meta.page_size, 200);
    assert!(!meta.has_next());
}

#[tokio::test]
async fn unsuccessful_envelope_becomes_api_error() {
    let router = Router::new().route(
        "/api/menu-items/{id}",
        get(|| async { Json(json!({ "success": false, "message": "Item retired" })) }),
    );
    let base = serve(router).await;

    let err = client(&base).get_menu_item(MenuItemId(9)).await.unwrap_err();
    assert!(matches!(err, ClientError::Core(BistroError::Api(m)) if m == "Item retired"));
}

#[tokio::test]
async fn missing_result_is_reported() {
    let router = Router::new().route(
        "/api/menu-items/{id}",
        get(|| async { Json(json!({ "success": true })) }),
    );
    let base = serve(router).await;

    let err = client(&base).get_menu_item(MenuItemId(9)).await.unwrap_err();
    assert!(matches!(err, ClientError::Core(BistroError::EmptyResult)));
}

#[tokio::test]
async fn status_codes_map_to_client_errors() {
    let router = Router::new()
        .route(
            "/api/orders/{id}",
            get(|Path(id): Path<u64>| async move {
                match id {
                    1 => StatusCode::UNAUTHORIZED.into_response(),
                    2 => StatusCode::TOO_MANY_REQUESTS.into_response(),
                    3 => (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response(),
                    4 => (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "success": false, "message": "Bad order id" })),
                    )
                        .into_response(),
                    _ => (StatusCode::NOT_FOUND, "nothing here").into_response(),
                }
            }),
        );
    let base = serve(router).await;
    let api = client(&base);

    assert!(matches!(
        api.get_order(OrderId(1)).await,
        Err(ClientError::Unauthorized)
    ));
    assert!(matches!(
        api.get_order(OrderId(2)).await,
        Err(ClientError::RateLimited)
    ));
    assert!(matches!(
        api.get_order(OrderId(3)).await,
        Err(ClientError::Server(503, body)) if body == "maintenance"
    ));
    assert!(matches!(
        api.get_order(OrderId(4)).await,
        Err(ClientError::Core(BistroError::Api(m))) if m == "Bad order id"
    ));
    assert!(matches!(
        api.get_order(OrderId(5)).await,
        Err(ClientError::Rejected(404, _))
    ));
}

#[tokio::test]
async fn unreachable_server_is_connection_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}", addr))
        .list_categories()
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ConnectionFailed(_)));
}

// =============================================================================
// AUTHORIZATION
// =============================================================================

#[tokio::test]
async fn bearer_token_sent_only_when_usable() {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route(
            "/api/categories",
            get(|State(seen): State<Seen>, headers: HeaderMap| async move {
                seen.lock()
                    .unwrap()
                    .push(("/api/categories".to_string(), auth_header(&headers), Value::Null));
                ok(json!([{ "id": 1, "name": "Drinks" }]))
            }),
        )
        .with_state(Arc::clone(&seen));
    let base = serve(router).await;

    let expired = format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#),
        URL_SAFE_NO_PAD.encode(br#"{"exp":1}"#)
    );

    client(&base).list_categories().await.unwrap();
    client(&base)
        .with_token(Some("opaque-token".to_string()))
        .list_categories()
        .await
        .unwrap();
    let categories = client(&base)
        .with_token(Some(expired))
        .list_categories()
        .await
        .unwrap();
    assert_eq!(categories[0].name, "Drinks");

    let headers: Vec<Option<String>> = seen.lock().unwrap().iter().map(|s| s.1.clone()).collect();
    assert_eq!(
        headers,
        vec![None, Some("Bearer opaque-token".to_string()), None]
    );
}

// =============================================================================
// CART & ORDERS
// =============================================================================

#[tokio::test]
async fn cart_round_trip_through_checkout() {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route("/api/cart", post(|| async { ok(cart_json(json!([]))) }))
        .route(
            "/api/cart/{token}/items",
            post(
                |State(seen): State<Seen>, Path(token): Path<String>, Json(body): Json<Value>| async move {
                    seen.lock().unwrap().push((token, None, body.clone()));
                    ok(json!({
                        "token": "tok-1",
                        "items": [{
                            "id": 31,
                            "menuItemId": body["menuItemId"],
                            "name": "Burger",
                            "quantity": body["quantity"],
                            "unitPrice": 900,
                            "extraPrice": 200,
                            "options": body["options"]
                        }],
                        "totalAmount": 2200,
                        "totalItems": 2
                    }))
                },
            ),
        )
        .route(
            "/api/cart/{token}/checkout",
            post(|Json(body): Json<Value>| async move {
                ok(json!({
                    "id": 77,
                    "code": "B-0077",
                    "customerName": body["customerName"],
                    "phone": body["phone"],
                    "paymentMethod": body["paymentMethod"],
                    "items": [{
                        "id": 1, "menuItemId": 4, "name": "Burger",
                        "quantity": 2, "unitPrice": 900, "extraPrice": 200
                    }],
                    "totalAmount": 2200
                }))
            }),
        )
        .with_state(Arc::clone(&seen));
    let base = serve(router).await;
    let api = client(&base);

    let cart = api.create_cart().await.unwrap();
    assert_eq!(cart.token, CartToken::new("tok-1"));
    assert!(cart.is_empty());

    let request = AddCartItemRequest {
        menu_item_id: MenuItemId(4),
        quantity: 2,
        options: vec![OptionId(12)],
        note: None,
    };
    let cart = api.add_cart_item(&cart.token, &request).await.unwrap();
    assert_eq!(cart.items[0].line_total(), Money(2200));
    assert_eq!(cart.total_amount, Money(2200));

    let (token, _, body) = seen.lock().unwrap()[0].clone();
    assert_eq!(token, "tok-1");
    assert_eq!(body, json!({ "menuItemId": 4, "quantity": 2, "options": [12] }));

    let order = api
        .checkout(
            &cart.token,
            &CheckoutRequest {
                customer_name: "Ana".to_string(),
                phone: "555-0101".to_string(),
                email: None,
                payment_method: PaymentMethod::BankTransfer,
                promo_code: None,
                note: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(order.id, OrderId(77));
    assert_eq!(order.customer_name, "Ana");
    assert_eq!(order.payment_method, PaymentMethod::BankTransfer);
    assert_eq!(order.total_amount, Money(2200));
}

#[tokio::test]
async fn kitchen_status_update_sends_lowercase_status() {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route(
            "/api/orders/{order}/items/{item}/status",
            put(
                |State(seen): State<Seen>,
                 Path((order, item)): Path<(u64, u64)>,
                 Json(body): Json<Value>| async move {
                    seen.lock()
                        .unwrap()
                        .push((format!("{}/{}", order, item), None, body));
                    Json(json!({ "success": true }))
                },
            ),
        )
        .with_state(Arc::clone(&seen));
    let base = serve(router).await;

    client(&base)
        .update_item_status(OrderId(5), LineId(2), KitchenStatus::Cooking)
        .await
        .unwrap();

    let (path, _, body) = seen.lock().unwrap()[0].clone();
    assert_eq!(path, "5/2");
    assert_eq!(body, json!({ "status": "cooking" }));
}

#[tokio::test]
async fn cart_token_is_one_encoded_path_segment() {
    let router = Router::new().route(
        "/api/cart/{token}",
        get(|Path(token): Path<String>| async move {
            ok(json!({ "token": token, "items": [], "totalAmount": 0, "totalItems": 0 }))
        }),
    );
    let base = serve(router).await;

    let token = CartToken::new("a/b?c#d e");
    let cart = client(&base).get_cart(&token).await.unwrap();
    assert_eq!(cart.token, token);
}
