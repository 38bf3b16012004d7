use async_trait::async_trait;
use chrono::Utc;

use crate::{
    domain::{
        cart::Cart,
        checkout::{ORDER_STATUS_COMPLETED, OrderPlacer, PAYMENT_METHOD},
    },
    dto::orders::{CreateOrderRequest, OrderList},
    error::{AppError, AppResult},
    mail::order_confirmation_email,
    middleware::auth::AuthUser,
    models::{NotificationKind, Order},
    response::{ApiResponse, Meta},
    services::{
        auth_service::current_user,
        notification_service::{notification, push},
    },
    state::AppState,
    store::{DocumentStore, StorePath, StorePathError, get_as, list_as, set_as},
};

fn orders_path(uid: &str) -> Result<StorePath, StorePathError> {
    StorePath::root("orders")?.child(uid)
}

pub fn new_order_id() -> String {
    format!("ORD-{}", Utc::now().timestamp_millis())
}

/// How [`record_order`] treats an order id that is already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateId {
    /// The caller chose the id; a second order under it is refused.
    Reject,
    /// The id was minted here; suffix it until it is free.
    Reissue,
}

/// Pick the id the order is stored under. Orders are never overwritten.
async fn free_order_path(
    store: &dyn DocumentStore,
    uid: &str,
    order: &mut Order,
    on_duplicate: DuplicateId,
) -> AppResult<StorePath> {
    if order.id.trim().is_empty() {
        order.id = new_order_id();
    }
    let base = order.id.clone();
    let mut attempt = 1u32;
    loop {
        let path = orders_path(uid)?.child(&order.id)?;
        if store.get(&path).await?.is_none() {
            return Ok(path);
        }
        if on_duplicate == DuplicateId::Reject {
            return Err(AppError::BadRequest(format!(
                "order {} already exists",
                order.id
            )));
        }
        attempt += 1;
        order.id = format!("{base}-{attempt}");
    }
}

/// Persist `order` for `uid`, then notify and email the customer. Lines are
/// normalized with the cart rules and the total is recomputed from them; the
/// notification and the email are best effort.
pub async fn record_order(
    state: &AppState,
    uid: &str,
    fallback_email: &str,
    mut order: Order,
    on_duplicate: DuplicateId,
) -> AppResult<Order> {
    let cart = Cart::from_items(std::mem::take(&mut order.items));
    if cart.is_empty() {
        return Err(AppError::BadRequest("order has no items".into()));
    }
    order.items = cart.snapshot();
    order.total = cart.total();

    let store = state.store.as_ref();
    let path = free_order_path(store, uid, &mut order, on_duplicate).await?;
    set_as(store, &path, &order).await?;
    tracing::info!(uid = %uid, order_id = %order.id, total = order.total, "order recorded");

    let note = notification(
        NotificationKind::OrderSuccess,
        format!("Your order {} was placed successfully.", order.id),
        Some("/profile".to_string()),
        None,
    );
    if let Err(err) = push(store, uid, &note).await {
        tracing::warn!(order_id = %order.id, error = %err, "order notification failed");
    }

    let to = if order.customer.email.trim().is_empty() {
        fallback_email
    } else {
        order.customer.email.as_str()
    };
    if let Err(err) = state
        .mailer
        .send(order_confirmation_email(to, &order))
        .await
    {
        tracing::warn!(order_id = %order.id, error = %err, "order confirmation email failed");
    }

    Ok(order)
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    if payload.user_id.as_deref().is_some_and(|id| id != user.uid) {
        return Err(AppError::Forbidden);
    }
    let customer = current_user(state, user).await?;
    let data = payload.order_data;

    let order_id = payload
        .order_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_default();
    let on_duplicate = if order_id.is_empty() {
        DuplicateId::Reissue
    } else {
        DuplicateId::Reject
    };

    let order = Order {
        id: order_id,
        customer: data.customer,
        items: data.items,
        total: 0.0,
        status: data
            .status
            .unwrap_or_else(|| ORDER_STATUS_COMPLETED.to_string()),
        date: data.date.unwrap_or_else(|| Utc::now().to_rfc3339()),
        payment_method: data
            .payment_method
            .unwrap_or_else(|| PAYMENT_METHOD.to_string()),
    };

    let order = record_order(state, &user.uid, &customer.email, order, on_duplicate).await?;
    Ok(ApiResponse::success("Order created", order, None))
}

pub async fn list_orders(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    let mut orders: Vec<Order> = list_as::<Order>(state.store.as_ref(), &orders_path(&user.uid)?)
        .await?
        .into_iter()
        .map(|(id, mut order)| {
            if order.id.is_empty() {
                order.id = id;
            }
            order
        })
        .collect();
    orders.sort_by(|a, b| b.date.cmp(&a.date));

    let meta = Meta::total(orders.len());
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    order_id: &str,
) -> AppResult<ApiResponse<Order>> {
    let path = orders_path(&user.uid)?.child(order_id)?;
    let order = get_as::<Order>(state.store.as_ref(), &path)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("OK", order, Some(Meta::empty())))
}

/// Records checkout orders for one signed-in customer.
#[derive(Clone)]
pub struct StoreOrderPlacer {
    state: AppState,
    uid: String,
    email: String,
}

impl StoreOrderPlacer {
    pub fn new(state: AppState, uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            state,
            uid: uid.into(),
            email: email.into(),
        }
    }
}

#[async_trait]
impl OrderPlacer for StoreOrderPlacer {
    async fn place_order(&self, order: Order) -> AppResult<Order> {
        record_order(
            &self.state,
            &self.uid,
            &self.email,
            order,
            DuplicateId::Reissue,
        )
        .await
    }
}
