use surety_shared::LedgerEvent;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Fan-out of ledger events to every subscriber (responders, SSE clients)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LedgerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to current subscribers. Having none is not an error.
    pub fn publish(&self, event: LedgerEvent) {
        let kind = event.kind();
        match self.sender.send(event) {
            Ok(receivers) => info!("Published {} to {} subscriber(s)", kind, receivers),
            Err(_) => debug!("Published {} with no subscribers", kind),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surety_shared::{AccountId, FlightKey, FlightStatus};

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let bus = EventBus::new(16);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let key = FlightKey::new(AccountId::new("airline"), "ND1309", 1);
        bus.publish(LedgerEvent::oracle_report(&key, FlightStatus::OnTime));

        assert_eq!(first.recv().await.unwrap().kind(), "OracleReport");
        assert_eq!(second.recv().await.unwrap().kind(), "OracleReport");
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new(4);
        let key = FlightKey::new(AccountId::new("airline"), "ND1309", 1);
        bus.publish(LedgerEvent::oracle_request(3, &key));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
