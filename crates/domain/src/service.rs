//! The order ledger service: the write path behind checkout and the
//! administrative order endpoints.

use std::sync::Arc;

use chrono::Utc;
use ledger::{
    CustomerRef, LineItem, Order, OrderFilter, OrderId, OrderPatch, OrderStatus, OrderStore,
    PageRequest, PageResult, PaymentMethod, PaymentStatus, RecipientInfo,
};
use serde::Serialize;
use services::{AccountStore, NotificationSender, OrderNotification, ServiceError, StockService};

use crate::address::resolve_shipping_address;
use crate::checkout::CheckoutPayload;
use crate::error::{DomainError, Result};

/// What a successful checkout hands back to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
    /// The order id as a plain string, for storefront clients.
    pub order_id: String,

    /// Whether the buyer still owes an online payment step.
    pub requires_payment: bool,

    pub payment_method: PaymentMethod,

    pub order: Order,
}

/// An order decorated with the owning customer's profile, when resolvable.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
}

/// The administrative detail view of a single order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub view: OrderView,

    /// Short human-facing order code.
    pub order_code: String,

    pub requires_payment: bool,
}

/// Service for placing and managing orders.
pub struct OrderLedger<S: OrderStore> {
    store: S,
    stock: Arc<dyn StockService>,
    accounts: Arc<dyn AccountStore>,
    notifier: Arc<dyn NotificationSender>,
}

impl<S: OrderStore> OrderLedger<S> {
    /// Creates a new order ledger service.
    pub fn new(
        store: S,
        stock: Arc<dyn StockService>,
        accounts: Arc<dyn AccountStore>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            store,
            stock,
            accounts,
            notifier,
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Places an order for a customer-facing checkout.
    ///
    /// `actor` is the raw identity value from the session, if any: a
    /// canonical account id places a registered order, anything else is kept
    /// verbatim as a guest token, and absence mints a fresh one.
    #[tracing::instrument(skip(self, payload))]
    pub async fn checkout(
        &self,
        actor: Option<&str>,
        payload: CheckoutPayload,
    ) -> Result<CheckoutOutcome> {
        let actor = actor.map(str::trim).filter(|value| !value.is_empty());
        self.place(CustomerRef::classify(actor), payload).await
    }

    /// Places an order for an anonymous buyer.
    ///
    /// Unlike [`checkout`](Self::checkout), the recipient block must carry
    /// name, phone, and the full address split, since there is no account to
    /// fall back on.
    #[tracing::instrument(skip(self, payload))]
    pub async fn guest_checkout(&self, payload: CheckoutPayload) -> Result<CheckoutOutcome> {
        require_guest_fields(&payload.normalized_recipient())?;
        self.place(CustomerRef::classify(None), payload).await
    }

    async fn place(
        &self,
        customer: CustomerRef,
        payload: CheckoutPayload,
    ) -> Result<CheckoutOutcome> {
        let line_items = payload.line_items()?;
        let total = payload.total()?;
        let method = payload.method()?;
        let recipient = payload.normalized_recipient();
        let shipping_address = resolve_shipping_address(payload.address.as_ref(), &recipient)
            .ok_or_else(|| DomainError::validation("missing shipping address"))?;

        self.take_stock(&line_items).await?;

        let now = Utc::now();
        let order = Order {
            id: OrderId::new(),
            customer,
            line_items: line_items.clone(),
            total_amount: total,
            shipping_fee: common::Money::zero(),
            shipping_address,
            recipient,
            payment_method: method,
            payment_status: PaymentStatus::Pending,
            status: OrderStatus::Pending,
            note: payload.normalized_note(),
            voucher: payload.normalized_voucher(),
            created_at: now,
            updated_at: now,
        };

        if let Err(err) = self.store.insert(order.clone()).await {
            self.return_stock(&line_items).await;
            return Err(err.into());
        }

        metrics::counter!("orders_placed_total").increment(1);
        tracing::info!(order_id = %order.id, customer = %order.customer, "order placed");
        self.send_confirmation(&order);

        Ok(CheckoutOutcome {
            order_id: order.id.to_string(),
            requires_payment: method.requires_payment(),
            payment_method: method,
            order,
        })
    }

    /// Decreases stock for every line, unwinding on the first failure.
    async fn take_stock(&self, items: &[LineItem]) -> Result<()> {
        for (index, item) in items.iter().enumerate() {
            if let Err(err) = self.stock.decrease(&item.product_id, item.quantity).await {
                self.return_stock(&items[..index]).await;
                return Err(match err {
                    err @ ServiceError::InsufficientStock { .. } => {
                        DomainError::Validation(err.to_string())
                    }
                    other => DomainError::Collaborator(other),
                });
            }
        }
        Ok(())
    }

    async fn return_stock(&self, items: &[LineItem]) {
        for item in items {
            if let Err(err) = self.stock.restore(&item.product_id, item.quantity).await {
                tracing::warn!(
                    product_id = %item.product_id,
                    error = %err,
                    "failed to restore stock after aborted checkout"
                );
            }
        }
    }

    /// Fires off the order confirmation without blocking the request.
    fn send_confirmation(&self, order: &Order) {
        let notifier = Arc::clone(&self.notifier);
        let notification = OrderNotification {
            order_id: order.id,
            email: order.recipient.email.clone(),
            recipient_name: order.recipient.full_name.clone(),
            total_amount: order.total_amount,
            payment_method: order.payment_method.to_string(),
        };
        tokio::spawn(async move {
            let order_id = notification.order_id;
            if let Err(err) = notifier.order_placed(notification).await {
                tracing::warn!(order_id = %order_id, error = %err, "order confirmation failed");
            }
        });
    }

    /// Applies a partial administrative update.
    ///
    /// An empty patch is rejected, and a status change must be a legal
    /// transition from the order's current state.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, id: OrderId, patch: OrderPatch) -> Result<OrderView> {
        if patch.is_empty() {
            return Err(DomainError::validation("update carries no fields"));
        }

        if let Some(next) = patch.status {
            let current = self.get(id).await?;
            if next != current.status && !current.status.can_transition_to(next) {
                return Err(DomainError::InvalidTransition {
                    from: current.status,
                    action: format!("move to '{next}'"),
                });
            }
        }

        let updated = self
            .store
            .update(id, patch)
            .await?
            .ok_or(DomainError::NotFound(id))?;
        Ok(self.decorate(updated).await)
    }

    /// Cancels an order. Only pending orders can be cancelled.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, id: OrderId) -> Result<Order> {
        let order = self.get(id).await?;
        if !order.status.can_cancel() {
            return Err(DomainError::InvalidTransition {
                from: order.status,
                action: "cancel".to_string(),
            });
        }

        let patch = OrderPatch {
            status: Some(OrderStatus::Cancelled),
            ..Default::default()
        };
        let cancelled = self
            .store
            .update(id, patch)
            .await?
            .ok_or(DomainError::NotFound(id))?;

        metrics::counter!("orders_cancelled_total").increment(1);
        Ok(cancelled)
    }

    /// Removes an order. Succeeds whether or not the order existed.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: OrderId) -> Result<()> {
        let removed = self.store.delete(id).await?;
        if !removed {
            tracing::warn!(order_id = %id, "delete requested for an unknown order");
        }
        Ok(())
    }

    /// All orders for a raw identity value, newest first. Unknown values
    /// yield an empty list, never an error.
    #[tracing::instrument(skip(self))]
    pub async fn orders_for_customer(&self, raw_id: &str) -> Result<Vec<Order>> {
        Ok(self.store.find_by_customer(raw_id.trim()).await?)
    }

    /// Loads an order by id.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: OrderId) -> Result<Order> {
        self.store.get(id).await?.ok_or(DomainError::NotFound(id))
    }

    /// Administrative detail view: the order plus its short code and the
    /// owning customer's profile when one resolves.
    #[tracing::instrument(skip(self))]
    pub async fn detail(&self, id: OrderId) -> Result<OrderDetail> {
        let order = self.get(id).await?;
        let order_code = order.id.short_code();
        let requires_payment = order.payment_method.requires_payment();
        Ok(OrderDetail {
            view: self.decorate(order).await,
            order_code,
            requires_payment,
        })
    }

    /// Paginated administrative listing, each row decorated with the
    /// customer profile when resolvable.
    #[tracing::instrument(skip(self))]
    pub async fn list(
        &self,
        filter: OrderFilter,
        page: PageRequest,
    ) -> Result<PageResult<OrderView>> {
        let result = self.store.list(filter, page).await?;
        let mut items = Vec::with_capacity(result.items.len());
        for order in result.items {
            items.push(self.decorate(order).await);
        }
        Ok(PageResult {
            items,
            page: result.page,
            limit: result.limit,
            total: result.total,
        })
    }

    /// Attaches the customer profile to an order. Lookup failures degrade to
    /// an undecorated view rather than failing the read.
    async fn decorate(&self, order: Order) -> OrderView {
        let profile = match order.customer.account_id() {
            Some(account_id) => match self.accounts.get_profile(account_id).await {
                Ok(profile) => profile,
                Err(err) => {
                    tracing::warn!(
                        customer = %order.customer,
                        error = %err,
                        "customer profile lookup failed"
                    );
                    None
                }
            },
            None => None,
        };

        match profile {
            Some(profile) => OrderView {
                customer_name: Some(profile.display_name().to_string()),
                customer_email: Some(profile.email),
                order,
            },
            None => OrderView {
                customer_name: None,
                customer_email: None,
                order,
            },
        }
    }
}

/// Recipient fields an anonymous checkout cannot omit, by wire name.
fn require_guest_fields(recipient: &RecipientInfo) -> Result<()> {
    let required = [
        ("HoTen", &recipient.full_name),
        ("SoDienThoai", &recipient.phone),
        ("DiaChiChiTiet", &recipient.street),
        ("PhuongXa", &recipient.ward),
        ("QuanHuyen", &recipient.district),
        ("TinhThanh", &recipient.province),
    ];

    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "missing required recipient fields: {}",
            missing.join(", ")
        )))
    }
}
