//! Notification sender trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, OrderId};

use crate::error::{Result, ServiceError};

/// Order confirmation details handed to the notification channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderNotification {
    pub order_id: OrderId,
    /// Recipient email; empty when the buyer left none.
    pub email: String,
    pub recipient_name: String,
    pub total_amount: Money,
    pub payment_method: String,
}

/// Trait for sending order confirmations.
///
/// Delivery is best-effort: callers fire it off the request path and log
/// failures rather than surfacing them to the buyer.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Sends an order confirmation.
    async fn order_placed(&self, notification: OrderNotification) -> Result<()>;
}

#[derive(Debug, Default)]
struct InMemoryNotificationState {
    sent: Vec<OrderNotification>,
    fail_on_send: bool,
}

/// In-memory notification sender for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationSender {
    state: Arc<RwLock<InMemoryNotificationState>>,
}

impl InMemoryNotificationSender {
    /// Creates a new in-memory notification sender.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the sender to fail on the next send call.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.state.write().unwrap().fail_on_send = fail;
    }

    /// Returns the number of notifications sent so far.
    pub fn sent_count(&self) -> usize {
        self.state.read().unwrap().sent.len()
    }

    /// Returns all notifications sent so far.
    pub fn sent(&self) -> Vec<OrderNotification> {
        self.state.read().unwrap().sent.clone()
    }
}

#[async_trait]
impl NotificationSender for InMemoryNotificationSender {
    async fn order_placed(&self, notification: OrderNotification) -> Result<()> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_send {
            return Err(ServiceError::Notification(
                "Notification channel unavailable".to_string(),
            ));
        }

        state.sent.push(notification);
        Ok(())
    }
}
