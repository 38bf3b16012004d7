mod common;

use std::time::Duration;

use baristaflow_api::{
    domain::{
        cart::{Cart, CartProduct},
        checkout::{
            CheckoutError, CheckoutFlow, CheckoutStep, Entry, ORDER_STATUS_COMPLETED, OrderPlacer,
        },
    },
    dto::orders::CreateOrderRequest,
    error::AppError,
    mail::RecordingMailer,
    models::NotificationKind,
    services::{
        notification_service,
        order_service::{self, StoreOrderPlacer},
        product_service::catalog,
    },
    store::MemoryStore,
};
use common::{app, app_with, register};
use serde_json::json;

fn fill_identity(flow: &mut CheckoutFlow) {
    let customer = flow.customer_mut();
    customer.full_name = "Ana Rojas".into();
    customer.rut = "12.345.678-9".into();
    customer.phone = "+56 9 1234 5678".into();
}

fn fill_delivery(flow: &mut CheckoutFlow) {
    let customer = flow.customer_mut();
    customer.address = "Av. Providencia 123".into();
    customer.city = "Santiago".into();
    customer.region = "Metropolitana".into();
}

#[tokio::test]
async fn completed_checkout_records_the_order_and_empties_the_cart() -> anyhow::Result<()> {
    let app = app();
    let state = &app.state;
    let user = register(state, "Ana").await?;

    let mut cart = Cart::new();
    let mut flow = CheckoutFlow::new(Some("ana@example.com")).with_latency(Duration::ZERO);
    assert_eq!(flow.entry(&cart), Entry::RedirectToCatalog);

    cart.add(CartProduct::from(&catalog()[0]));
    cart.add(CartProduct::from(&catalog()[0]));
    cart.add(CartProduct::from(&catalog()[1]));
    assert_eq!(flow.entry(&cart), Entry::Proceed(CheckoutStep::Identity));

    assert_eq!(flow.next(&cart), Err(CheckoutError::MissingField("fullName")));
    fill_identity(&mut flow);
    assert_eq!(flow.next(&cart)?, CheckoutStep::Delivery);
    assert_eq!(flow.back()?, CheckoutStep::Identity);
    assert_eq!(flow.next(&cart)?, CheckoutStep::Delivery);
    fill_delivery(&mut flow);
    assert_eq!(flow.next(&cart)?, CheckoutStep::Payment);

    let placer = StoreOrderPlacer::new(state.clone(), user.uid.clone(), "ana@example.com");
    let receipt = flow.submit_payment(&mut cart, &placer).await?.clone();
    assert!(receipt.persisted);
    assert!(receipt.order.id.starts_with("ORD-"));
    assert_eq!(receipt.order.status, ORDER_STATUS_COMPLETED);
    assert!((receipt.order.total - (18.99 * 2.0 + 34.50)).abs() < 1e-9);

    assert!(cart.is_empty());
    assert_eq!(flow.step(), CheckoutStep::Confirmation);
    assert_eq!(flow.entry(&cart), Entry::Proceed(CheckoutStep::Confirmation));

    let orders = order_service::list_orders(state, &user)
        .await?
        .data
        .expect("orders");
    assert_eq!(orders.items.len(), 1);
    assert_eq!(orders.items[0].id, receipt.order.id);
    assert_eq!(orders.items[0].customer.city, "Santiago");

    let inbox = notification_service::inbox(state.store.as_ref(), &user.uid).await?;
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::OrderSuccess);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ana@example.com");
    assert!(sent[0].subject.contains(&receipt.order.id));
    Ok(())
}

#[tokio::test]
async fn mail_failure_does_not_lose_the_order() -> anyhow::Result<()> {
    let app = app_with(
        std::sync::Arc::new(MemoryStore::new()),
        RecordingMailer::failing(),
    );
    let state = &app.state;
    let user = register(state, "Ana").await?;

    let payload: CreateOrderRequest = serde_json::from_value(json!({
        "orderId": "ORD-1",
        "orderData": {
            "fullName": "Ana Rojas",
            "email": "ana@example.com",
            "items": [
                { "id": 101, "name": "Etiopía", "unitPrice": "$10.000", "image": "", "quantity": 2 }
            ],
            "total": 1
        }
    }))?;
    let order = order_service::create_order(state, &user, payload)
        .await?
        .data
        .expect("order");
    assert_eq!(order.id, "ORD-1");
    assert_eq!(order.total, 20.0);

    let fetched = order_service::get_order(state, &user, "ORD-1")
        .await?
        .data
        .expect("order");
    assert_eq!(fetched.items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn orders_are_scoped_to_the_caller() -> anyhow::Result<()> {
    let app = app();
    let state = &app.state;
    let ana = register(state, "Ana").await?;
    let luis = register(state, "Luis").await?;

    let spoofed: CreateOrderRequest = serde_json::from_value(json!({
        "userId": luis.uid,
        "orderData": { "items": [ { "id": 101, "name": "x", "unitPrice": 1, "image": "", "quantity": 1 } ] }
    }))?;
    let denied = order_service::create_order(state, &ana, spoofed).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    let empty: CreateOrderRequest =
        serde_json::from_value(json!({ "orderData": { "items": [] } }))?;
    let rejected = order_service::create_order(state, &ana, empty).await;
    assert!(matches!(rejected, Err(AppError::BadRequest(_))));

    let missing = order_service::get_order(state, &luis, "ORD-1").await;
    assert!(matches!(missing, Err(AppError::NotFound)));
    Ok(())
}

fn order_request(
    order_id: Option<&str>,
    quantity: u32,
    city: &str,
) -> anyhow::Result<CreateOrderRequest> {
    let mut body = json!({
        "orderData": {
            "city": city,
            "items": [
                { "id": 101, "name": "Etiopía", "unitPrice": "18.99", "image": "", "quantity": quantity }
            ]
        }
    });
    if let Some(id) = order_id {
        body["orderId"] = json!(id);
    }
    Ok(serde_json::from_value(body)?)
}

#[tokio::test]
async fn stored_orders_are_never_replaced() -> anyhow::Result<()> {
    let app = app();
    let state = &app.state;
    let ana = register(state, "Ana").await?;

    order_service::create_order(state, &ana, order_request(Some("ORD-1"), 1, "Santiago")?).await?;
    let again =
        order_service::create_order(state, &ana, order_request(Some("ORD-1"), 3, "Valparaiso")?)
            .await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    let stored = order_service::get_order(state, &ana, "ORD-1")
        .await?
        .data
        .expect("order");
    assert_eq!(stored.customer.city, "Santiago");
    assert_eq!(stored.items[0].quantity, 1);

    let placer = StoreOrderPlacer::new(state.clone(), ana.uid.clone(), "ana@example.com");
    let mut reissued = stored.clone();
    reissued.customer.city = "Valparaiso".into();
    let placed = placer.place_order(reissued).await?;
    assert_eq!(placed.id, "ORD-1-2");

    let orders = order_service::list_orders(state, &ana)
        .await?
        .data
        .expect("orders");
    assert_eq!(orders.items.len(), 2);
    Ok(())
}

#[tokio::test]
async fn order_lines_follow_the_cart_rules() -> anyhow::Result<()> {
    let app = app();
    let state = &app.state;
    let ana = register(state, "Ana").await?;

    let zero = order_service::create_order(state, &ana, order_request(None, 0, "Santiago")?).await;
    assert!(matches!(zero, Err(AppError::BadRequest(_))));

    let duplicated: CreateOrderRequest = serde_json::from_value(json!({
        "orderData": {
            "items": [
                { "id": 101, "name": "Etiopía", "unitPrice": 2, "image": "", "quantity": 1 },
                { "id": 102, "name": "Kenia", "unitPrice": 5, "image": "", "quantity": 0 },
                { "id": 101, "name": "Etiopía", "unitPrice": 2, "image": "", "quantity": 2 }
            ]
        }
    }))?;
    let order = order_service::create_order(state, &ana, duplicated)
        .await?
        .data
        .expect("order");
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 3);
    assert_eq!(order.total, 6.0);
    Ok(())
}
