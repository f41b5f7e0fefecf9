//! End-to-end tests for the SSE hub transport against a local axum server.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use bistro::hub::{HubClient, HubError, HubOptions, RetryPolicy, SseTransport};
use bistro::sync::LiveCart;
use bistro_core::{CartCache, CartToken, Money};
use futures::Stream;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

// =============================================================================
// MOCK HUB SERVER
// =============================================================================

#[derive(Default)]
struct MockHub {
    streams: Mutex<Vec<mpsc::UnboundedSender<Event>>>,
    /// (cartToken query, authorization header) per handshake.
    handshakes: Mutex<Vec<(Option<String>, Option<String>)>>,
    invokes: Mutex<Vec<Value>>,
}

impl MockHub {
    fn connections(&self) -> usize {
        self.handshakes.lock().unwrap().len()
    }

    fn open_streams(&self) -> usize {
        self.streams.lock().unwrap().len()
    }

    fn push(&self, event: &str, payload: &Value) {
        self.push_raw(event, &payload.to_string());
    }

    fn push_raw(&self, event: &str, data: &str) {
        for tx in self.streams.lock().unwrap().iter() {
            let _ = tx.send(Event::default().event(event).data(data));
        }
    }

    /// End every open stream from the server side.
    fn hang_up(&self) {
        self.streams.lock().unwrap().clear();
    }
}

async fn events(
    State(hub): State<Arc<MockHub>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    hub.handshakes
        .lock()
        .unwrap()
        .push((params.get("cartToken").cloned(), auth));

    let (tx, rx) = mpsc::unbounded_channel();
    hub.streams.lock().unwrap().push(tx);

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (Ok::<_, Infallible>(event), rx))
    });
    Sse::new(stream)
}

async fn invoke(State(hub): State<Arc<MockHub>>, Json(body): Json<Value>) -> StatusCode {
    hub.invokes.lock().unwrap().push(body);
    StatusCode::NO_CONTENT
}

async fn serve() -> (String, Arc<MockHub>) {
    let hub = Arc::new(MockHub::default());
    let router = Router::new()
        .route("/hubs/notifications", get(events))
        .route("/hubs/notifications/invoke", post(invoke))
        .route("/hubs/closed", get(|| async { StatusCode::FORBIDDEN }))
        .with_state(Arc::clone(&hub));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{}", addr), hub)
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn options() -> HubOptions {
    HubOptions {
        retry: RetryPolicy::fixed(Duration::from_millis(20), 2),
        reconnect_delay: Duration::from_millis(10),
    }
}

fn hub_client(url: String) -> HubClient<SseTransport> {
    let transport = SseTransport::new(url, Duration::from_secs(5)).unwrap();
    HubClient::new(transport, options())
}

async fn wait_until(f: impl Fn() -> bool) {
    for _ in 0..200 {
        if f() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(f(), "condition not reached in time");
}

async fn changed(rx: &mut tokio::sync::watch::Receiver<u64>) {
    tokio::time::timeout(Duration::from_secs(2), rx.changed())
        .await
        .expect("timed out waiting for live update")
        .expect("live cart dropped");
}

// =============================================================================
// TESTS
// =============================================================================

#[tokio::test]
async fn pushed_events_update_live_cart() {
    let (base, server) = serve().await;
    let hub = hub_client(format!("{}/hubs/notifications", base));
    hub.set_cart_token(Some(CartToken::new("tok-1")));
    hub.set_access_token(Some("staff-token".to_string()));

    let live = LiveCart::new(CartCache::new());
    let _attachment = live.attach(&hub);
    let mut revisions = live.watch();

    hub.start().await.unwrap();
    wait_until(|| server.open_streams() == 1).await;
    assert_eq!(
        server.handshakes.lock().unwrap()[0],
        (
            Some("tok-1".to_string()),
            Some("Bearer staff-token".to_string())
        )
    );

    server.push(
        "cart-updated",
        &json!({
            "token": "tok-1",
            "items": [{ "id": 1, "menuItemId": 3, "name": "Tea", "quantity": 3, "unitPrice": 250 }]
        }),
    );
    changed(&mut revisions).await;
    assert_eq!(live.cart().total_amount, Money(750));

    server.push(
        "Order-Created",
        &json!({ "id": 9, "customerName": "Ana", "paymentMethod": "card", "totalAmount": 750 }),
    );
    changed(&mut revisions).await;
    assert_eq!(live.recent_orders(1)[0].customer_name, "Ana");

    hub.stop().await;
}

#[tokio::test]
async fn invoke_posts_target_and_arguments() {
    let (base, server) = serve().await;
    let hub = hub_client(format!("{}/hubs/notifications", base));
    hub.set_cart_token(Some(CartToken::new("tok-2")));

    hub.start().await.unwrap();
    hub.try_invoke("JoinCart", vec![json!("tok-2")]).await.unwrap();

    let invokes = server.invokes.lock().unwrap().clone();
    assert_eq!(
        invokes,
        vec![json!({ "target": "JoinCart", "arguments": ["tok-2"], "cartToken": "tok-2" })]
    );

    hub.stop().await;
    assert!(matches!(
        hub.try_invoke("JoinCart", vec![]).await,
        Err(HubError::NotConnected)
    ));
}

#[tokio::test]
async fn rejected_handshake_exhausts_retries() {
    let (base, _server) = serve().await;
    let hub = hub_client(format!("{}/hubs/closed", base));

    let err = hub.start().await.unwrap_err();
    assert!(matches!(err, HubError::Failed { attempts: 3, .. }));
    assert!(hub.state().is_failed());
}

#[tokio::test]
async fn server_hang_up_reconnects_with_subscribers_intact() {
    let (base, server) = serve().await;
    let hub = hub_client(format!("{}/hubs/notifications", base));

    let live = LiveCart::new(CartCache::with_cart(bistro_core::Cart::new(CartToken::new(
        "tok-3",
    ))));
    let _attachment = live.attach(&hub);
    let mut revisions = live.watch();

    hub.start().await.unwrap();
    wait_until(|| server.open_streams() == 1).await;

    server.hang_up();
    wait_until(|| server.connections() == 2 && server.open_streams() == 1).await;
    wait_until(|| hub.is_connected()).await;

    server.push("cart-updated", &json!({ "token": "tok-3", "totalItems": 4, "totalAmount": 1600 }));
    changed(&mut revisions).await;
    let cart = live.cart();
    assert_eq!(cart.total_items, 4);
    assert_eq!(cart.total_amount, Money(1600));
    assert_eq!(hub.subscriber_count("cart-updated"), 1);

    hub.stop().await;
}

#[tokio::test]
async fn clear_without_token_empties_live_cart() {
    let (base, server) = serve().await;
    let hub = hub_client(format!("{}/hubs/notifications", base));

    let seeded: bistro_core::Cart = serde_json::from_value(json!({
        "token": "tok-4",
        "items": [{ "id": 1, "menuItemId": 3, "name": "Tea", "quantity": 4, "unitPrice": 250 }],
        "totalAmount": 1000,
        "totalItems": 4
    }))
    .unwrap();

    for data in ["", r#"{"token":""}"#] {
        let live = LiveCart::new(CartCache::with_cart(seeded.clone()));
        let attachment = live.attach(&hub);
        let mut revisions = live.watch();

        hub.start().await.unwrap();
        wait_until(|| server.open_streams() == 1).await;

        server.push_raw("cart-cleared", data);
        changed(&mut revisions).await;
        let cart = live.cart();
        assert!(cart.is_empty(), "data {:?} left the cart populated", data);
        assert_eq!(cart.total_amount, Money::ZERO);
        assert_eq!(cart.total_items, 0);
        assert_eq!(cart.token, CartToken::new("tok-4"));

        attachment.detach(&hub);
        hub.stop().await;
        server.hang_up();
    }
}
