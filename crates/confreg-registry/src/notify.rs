use std::time::{SystemTime, UNIX_EPOCH};

use confreg_types::{Amount, NotificationId, NotificationKind, RegistrantId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Audit notification emitted once per successful purchase or refund.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    /// Position in the registry's audit trail (1-based, gap-free).
    pub seq: u64,
    /// Wall-clock milliseconds since UNIX epoch.
    pub emitted_at_ms: u64,
    pub kind: NotificationKind,
    pub registrant: RegistrantId,
    pub amount: Amount,
}

/// Filter for subscribing to a subset of notifications.
#[derive(Clone, Debug, Default)]
pub struct NotificationFilter {
    /// If set, only notifications of these kinds are delivered.
    pub kinds: Option<Vec<NotificationKind>>,
    /// If set, only notifications about these registrants are delivered.
    pub registrants: Option<Vec<RegistrantId>>,
}

impl NotificationFilter {
    /// Deliver everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Deliver only notifications of `kind`.
    pub fn kind(kind: NotificationKind) -> Self {
        Self {
            kinds: Some(vec![kind]),
            registrants: None,
        }
    }

    /// Deliver only notifications about `registrant`.
    pub fn registrant(registrant: RegistrantId) -> Self {
        Self {
            kinds: None,
            registrants: Some(vec![registrant]),
        }
    }

    pub fn matches(&self, notification: &Notification) -> bool {
        if let Some(ref kinds) = self.kinds {
            if !kinds.contains(&notification.kind) {
                return false;
            }
        }
        if let Some(ref registrants) = self.registrants {
            if !registrants.contains(&notification.registrant) {
                return false;
            }
        }
        true
    }
}

/// A broadcast channel receiver for notifications.
pub type NotificationStream = broadcast::Receiver<Notification>;

struct Subscriber {
    filter: NotificationFilter,
    sender: broadcast::Sender<Notification>,
}

/// Retained audit trail plus live fan-out to subscribers.
///
/// Lives inside the registry state, so it is only ever touched under the
/// registry lock. Lagging subscribers lose their oldest messages; the
/// retained trail never does.
pub struct NotificationLog {
    entries: Vec<Notification>,
    subscribers: Vec<Subscriber>,
    capacity: usize,
}

impl NotificationLog {
    /// `capacity` must already be validated (non-zero).
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            subscribers: Vec::new(),
            capacity,
        }
    }

    pub(crate) fn from_entries(entries: Vec<Notification>, capacity: usize) -> Self {
        Self {
            entries,
            subscribers: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    /// Notifications with `seq > after`, oldest first.
    pub fn since(&self, after: u64) -> Vec<Notification> {
        self.entries
            .iter()
            .filter(|n| n.seq > after)
            .cloned()
            .collect()
    }

    /// Sequence number of the most recent notification (0 if none).
    pub fn last_seq(&self) -> u64 {
        self.entries.last().map(|n| n.seq).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub(crate) fn subscribe(&mut self, filter: NotificationFilter) -> NotificationStream {
        let (sender, receiver) = broadcast::channel(self.capacity);
        self.subscribers.push(Subscriber { filter, sender });
        receiver
    }

    /// Append a notification to the trail and route it to matching
    /// subscribers. Subscribers whose receivers are all dropped are pruned.
    pub(crate) fn emit(
        &mut self,
        kind: NotificationKind,
        registrant: RegistrantId,
        amount: Amount,
    ) -> Notification {
        let notification = Notification {
            id: NotificationId::new(),
            seq: self.last_seq() + 1,
            emitted_at_ms: now_ms(),
            kind,
            registrant,
            amount,
        };

        self.entries.push(notification.clone());
        self.subscribers.retain(|sub| {
            if sub.filter.matches(&notification) {
                sub.sender.send(notification.clone()).is_ok()
            } else {
                sub.sender.receiver_count() > 0
            }
        });

        tracing::debug!(
            seq = notification.seq,
            kind = %notification.kind,
            registrant = %notification.registrant,
            amount = %notification.amount,
            "notification emitted"
        );
        notification
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> RegistrantId {
        RegistrantId::from_label("alice")
    }

    fn bob() -> RegistrantId {
        RegistrantId::from_label("bob")
    }

    #[test]
    fn emit_assigns_gap_free_sequence() {
        let mut log = NotificationLog::new(8);
        let first = log.emit(NotificationKind::Deposit, alice(), Amount::new(20));
        let second = log.emit(NotificationKind::Refund, alice(), Amount::new(20));

        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 2);
        assert_eq!(log.last_seq(), 2);
        assert_eq!(log.entries().len(), 2);
        assert_eq!(log.since(1), vec![second]);
    }

    #[test]
    fn subscribers_receive_matching_notifications() {
        let mut log = NotificationLog::new(8);
        let mut refunds = log.subscribe(NotificationFilter::kind(NotificationKind::Refund));
        let mut everything = log.subscribe(NotificationFilter::all());

        log.emit(NotificationKind::Deposit, alice(), Amount::new(20));
        log.emit(NotificationKind::Refund, alice(), Amount::new(20));

        assert_eq!(everything.try_recv().unwrap().kind, NotificationKind::Deposit);
        assert_eq!(everything.try_recv().unwrap().kind, NotificationKind::Refund);
        assert_eq!(refunds.try_recv().unwrap().kind, NotificationKind::Refund);
        assert!(refunds.try_recv().is_err());
    }

    #[test]
    fn registrant_filter() {
        let filter = NotificationFilter::registrant(bob());
        let mut log = NotificationLog::new(8);
        let about_alice = log.emit(NotificationKind::Deposit, alice(), Amount::new(1));
        let about_bob = log.emit(NotificationKind::Deposit, bob(), Amount::new(1));
        assert!(!filter.matches(&about_alice));
        assert!(filter.matches(&about_bob));
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut log = NotificationLog::new(8);
        let stream = log.subscribe(NotificationFilter::all());
        assert_eq!(log.subscriber_count(), 1);

        drop(stream);
        log.emit(NotificationKind::Deposit, alice(), Amount::new(1));
        assert_eq!(log.subscriber_count(), 0);
    }

    #[test]
    fn serde_roundtrip() {
        let mut log = NotificationLog::new(8);
        let n = log.emit(NotificationKind::Deposit, alice(), Amount::new(20));
        let json = serde_json::to_string(&n).unwrap();
        let parsed: Notification = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, n);
    }
}
