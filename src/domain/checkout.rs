//! Four-step checkout wizard: identity, delivery, payment, confirmation.
//!
//! The flow is transient and linear. It only moves forward one step at a
//! time, steps back from delivery or payment, and reaches confirmation
//! solely by submitting payment.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::cart::Cart;
use crate::error::AppResult;
use crate::models::{CustomerFields, Order};

pub const ORDER_STATUS_COMPLETED: &str = "Completado";
pub const PAYMENT_METHOD: &str = "Mercado Pago";
pub const DEFAULT_PAYMENT_LATENCY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    Identity,
    Delivery,
    Payment,
    Confirmation,
}

impl CheckoutStep {
    /// 1-based position shown in the progress header.
    pub fn number(&self) -> u8 {
        match self {
            CheckoutStep::Identity => 1,
            CheckoutStep::Delivery => 2,
            CheckoutStep::Payment => 3,
            CheckoutStep::Confirmation => 4,
        }
    }
}

/// Result of the entry guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Proceed(CheckoutStep),
    RedirectToCatalog,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("cannot {action} from the {step:?} step")]
    InvalidTransition {
        action: &'static str,
        step: CheckoutStep,
    },

    #[error("the cart is empty")]
    EmptyCart,
}

/// Persists a completed order on behalf of the signed-in customer.
#[async_trait]
pub trait OrderPlacer: Send + Sync {
    async fn place_order(&self, order: Order) -> AppResult<Order>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    pub order: Order,
    /// False when the order record could not be written.
    pub persisted: bool,
}

#[derive(Debug, Clone)]
pub struct CheckoutFlow {
    step: CheckoutStep,
    customer: CustomerFields,
    latency: Duration,
    receipt: Option<PaymentReceipt>,
}

impl CheckoutFlow {
    /// Start at the identity step, pre-filling the signed-in user's email.
    pub fn new(email: Option<&str>) -> Self {
        Self {
            step: CheckoutStep::Identity,
            customer: CustomerFields {
                email: email.unwrap_or_default().to_string(),
                ..CustomerFields::default()
            },
            latency: DEFAULT_PAYMENT_LATENCY,
            receipt: None,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn customer(&self) -> &CustomerFields {
        &self.customer
    }

    pub fn customer_mut(&mut self) -> &mut CustomerFields {
        &mut self.customer
    }

    pub fn receipt(&self) -> Option<&PaymentReceipt> {
        self.receipt.as_ref()
    }

    /// An empty cart blocks every step except the confirmation screen,
    /// which is reached right after the cart has been cleared.
    pub fn entry(&self, cart: &Cart) -> Entry {
        if cart.is_empty() && self.step != CheckoutStep::Confirmation {
            Entry::RedirectToCatalog
        } else {
            Entry::Proceed(self.step)
        }
    }

    pub fn next(&mut self, cart: &Cart) -> Result<CheckoutStep, CheckoutError> {
        if self.entry(cart) == Entry::RedirectToCatalog {
            return Err(CheckoutError::EmptyCart);
        }
        self.step = match self.step {
            CheckoutStep::Identity => {
                validate_identity(&self.customer)?;
                CheckoutStep::Delivery
            }
            CheckoutStep::Delivery => {
                validate_delivery(&self.customer)?;
                CheckoutStep::Payment
            }
            step => {
                return Err(CheckoutError::InvalidTransition {
                    action: "advance",
                    step,
                });
            }
        };
        Ok(self.step)
    }

    pub fn back(&mut self) -> Result<CheckoutStep, CheckoutError> {
        self.step = match self.step {
            CheckoutStep::Delivery => CheckoutStep::Identity,
            CheckoutStep::Payment => CheckoutStep::Delivery,
            step => {
                return Err(CheckoutError::InvalidTransition {
                    action: "go back",
                    step,
                });
            }
        };
        Ok(self.step)
    }

    /// Simulate the payment round trip, record the order, empty the cart and
    /// move to confirmation. Payment itself never fails; a failed order write
    /// is logged and reported through [`PaymentReceipt::persisted`].
    pub async fn submit_payment<P>(
        &mut self,
        cart: &mut Cart,
        placer: &P,
    ) -> Result<&PaymentReceipt, CheckoutError>
    where
        P: OrderPlacer + ?Sized,
    {
        if self.step != CheckoutStep::Payment {
            return Err(CheckoutError::InvalidTransition {
                action: "pay",
                step: self.step,
            });
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        validate_identity(&self.customer)?;
        validate_delivery(&self.customer)?;

        tokio::time::sleep(self.latency).await;

        let now = Utc::now();
        let order = Order {
            id: format!("ORD-{}", now.timestamp_millis()),
            customer: self.customer.clone(),
            items: cart.snapshot(),
            total: cart.total(),
            status: ORDER_STATUS_COMPLETED.to_string(),
            date: now.to_rfc3339(),
            payment_method: PAYMENT_METHOD.to_string(),
        };

        let receipt = match placer.place_order(order.clone()).await {
            Ok(order) => PaymentReceipt {
                order,
                persisted: true,
            },
            Err(err) => {
                tracing::error!(order_id = %order.id, error = %err, "order could not be recorded");
                PaymentReceipt {
                    order,
                    persisted: false,
                }
            }
        };

        cart.clear();
        self.step = CheckoutStep::Confirmation;
        Ok(self.receipt.insert(receipt))
    }
}

fn require(value: &str, field: &'static str) -> Result<(), CheckoutError> {
    if value.trim().is_empty() {
        Err(CheckoutError::MissingField(field))
    } else {
        Ok(())
    }
}

pub fn validate_identity(customer: &CustomerFields) -> Result<(), CheckoutError> {
    require(&customer.full_name, "fullName")?;
    require(&customer.rut, "rut")?;
    require(&customer.email, "email")?;
    require(&customer.phone, "phone")
}

pub fn validate_delivery(customer: &CustomerFields) -> Result<(), CheckoutError> {
    require(&customer.address, "address")?;
    require(&customer.city, "city")?;
    require(&customer.region, "region")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::cart::{CartProduct, ItemId, Price};
    use crate::error::AppError;

    #[derive(Default)]
    struct RecordingPlacer {
        placed: Mutex<Vec<Order>>,
        fail: bool,
    }

    #[async_trait]
    impl OrderPlacer for RecordingPlacer {
        async fn place_order(&self, order: Order) -> AppResult<Order> {
            if self.fail {
                return Err(AppError::Internal(anyhow::anyhow!("store offline")));
            }
            self.placed.lock().unwrap().push(order.clone());
            Ok(order)
        }
    }

    fn cart_with_one_item() -> Cart {
        let mut cart = Cart::new();
        cart.add(CartProduct {
            id: ItemId::Number(104),
            name: "Molino Manual".into(),
            unit_price: Price::Text("49.99".into()),
            image: String::new(),
        });
        cart
    }

    fn filled_flow() -> CheckoutFlow {
        let mut flow = CheckoutFlow::new(Some("ana@example.com")).with_latency(Duration::ZERO);
        let customer = flow.customer_mut();
        customer.full_name = "Ana Pérez".into();
        customer.rut = "12.345.678-9".into();
        customer.phone = "+56 9 1234 5678".into();
        customer.address = "Av. Providencia 123".into();
        customer.city = "Santiago".into();
        customer.region = "RM".into();
        flow
    }

    #[test]
    fn empty_cart_redirects_before_confirmation() {
        let flow = CheckoutFlow::new(None);
        assert_eq!(flow.entry(&Cart::new()), Entry::RedirectToCatalog);
        assert_eq!(
            flow.entry(&cart_with_one_item()),
            Entry::Proceed(CheckoutStep::Identity)
        );
    }

    #[test]
    fn identity_fields_are_required_to_advance() {
        let mut flow = CheckoutFlow::new(Some("ana@example.com"));
        let cart = cart_with_one_item();
        assert_eq!(flow.next(&cart), Err(CheckoutError::MissingField("fullName")));
        assert_eq!(flow.step(), CheckoutStep::Identity);
    }

    #[test]
    fn back_is_only_allowed_from_delivery_and_payment() {
        let mut flow = filled_flow();
        assert!(flow.back().is_err());
        let cart = cart_with_one_item();
        flow.next(&cart).unwrap();
        assert_eq!(flow.back(), Ok(CheckoutStep::Identity));
        flow.next(&cart).unwrap();
        flow.next(&cart).unwrap();
        assert_eq!(flow.back(), Ok(CheckoutStep::Delivery));
    }

    #[tokio::test]
    async fn full_walkthrough_places_order_and_clears_cart() {
        let mut flow = filled_flow();
        let mut cart = cart_with_one_item();
        let placer = RecordingPlacer::default();

        assert_eq!(flow.next(&cart), Ok(CheckoutStep::Delivery));
        assert_eq!(flow.next(&cart), Ok(CheckoutStep::Payment));
        assert!(flow.next(&cart).is_err());

        let receipt = flow.submit_payment(&mut cart, &placer).await.unwrap().clone();
        assert!(receipt.persisted);
        assert!(receipt.order.id.starts_with("ORD-"));
        assert_eq!(receipt.order.total, 49.99);
        assert_eq!(receipt.order.status, ORDER_STATUS_COMPLETED);
        assert_eq!(placer.placed.lock().unwrap().len(), 1);

        assert!(cart.is_empty());
        assert_eq!(flow.step(), CheckoutStep::Confirmation);
        assert_eq!(flow.entry(&cart), Entry::Proceed(CheckoutStep::Confirmation));
    }

    #[tokio::test]
    async fn failed_order_write_still_confirms() {
        let mut flow = filled_flow();
        let mut cart = cart_with_one_item();
        flow.next(&cart).unwrap();
        flow.next(&cart).unwrap();

        let placer = RecordingPlacer {
            fail: true,
            ..RecordingPlacer::default()
        };
        let receipt = flow.submit_payment(&mut cart, &placer).await.unwrap();
        assert!(!receipt.persisted);
        assert_eq!(flow.step(), CheckoutStep::Confirmation);
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn payment_requires_the_payment_step() {
        let mut flow = filled_flow();
        let mut cart = cart_with_one_item();
        let err = flow
            .submit_payment(&mut cart, &RecordingPlacer::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidTransition { .. }));
        assert!(!cart.is_empty());
    }
}
