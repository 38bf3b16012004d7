use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::cart::CartItem,
    models::{CustomerFields, Order},
};

/// Order payload as the checkout screen sends it.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    #[serde(flatten)]
    pub customer: CustomerFields,
    pub items: Vec<CartItem>,
    pub status: Option<String>,
    pub date: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Must match the caller when present.
    pub user_id: Option<String>,
    pub order_id: Option<String>,
    pub order_data: OrderData,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
