use pastelink_core::Payload;
use pastelink_events::{Call, Listener, Registration};
use pastelink_peer::{PeerBus, PeerEvent, PeerSignal};
use std::sync::{Arc, Mutex};

/// What a peer published, in publication order.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedEvent {
    HaveOffer(String),
    HaveAnswer(String),
    Connected,
    DataChannel(String),
    ChannelOpen,
    Message(Payload),
    Disconnected,
}

/// Subscribes to every public [`PeerEvent`] of a bus and records it.
///
/// # Example
///
/// ```ignore
/// let recorder = EventRecorder::attach(peer.events());
/// // ... drive the handshake ...
/// assert_eq!(recorder.count(|e| matches!(e, RecordedEvent::Connected)), 1);
/// ```
#[derive(Clone)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl EventRecorder {
    pub fn attach(bus: &PeerBus) -> Self {
        let recorder = Self {
            events: Arc::new(Mutex::new(Vec::new())),
        };

        let tracked = [
            PeerEvent::HaveOffer,
            PeerEvent::HaveAnswer,
            PeerEvent::Connected,
            PeerEvent::DataChannel,
            PeerEvent::ChannelOpen,
            PeerEvent::Message,
            PeerEvent::Disconnected,
        ];
        for event in tracked {
            let events = Arc::clone(&recorder.events);
            let listener = Listener::new(move |call: Call<'_, PeerSignal>| {
                let recorded = match (event, call.arg(0)) {
                    (PeerEvent::HaveOffer, Some(PeerSignal::Token(t))) => {
                        RecordedEvent::HaveOffer(t.clone())
                    }
                    (PeerEvent::HaveAnswer, Some(PeerSignal::Token(t))) => {
                        RecordedEvent::HaveAnswer(t.clone())
                    }
                    (PeerEvent::DataChannel, Some(PeerSignal::Channel(c))) => {
                        RecordedEvent::DataChannel(c.label().to_owned())
                    }
                    (PeerEvent::Message, Some(PeerSignal::Message(p))) => {
                        RecordedEvent::Message(p.clone())
                    }
                    (PeerEvent::Connected, _) => RecordedEvent::Connected,
                    (PeerEvent::ChannelOpen, _) => RecordedEvent::ChannelOpen,
                    (PeerEvent::Disconnected, _) => RecordedEvent::Disconnected,
                    (event, args) => anyhow::bail!("unexpected arguments for {event}: {args:?}"),
                };
                events.lock().unwrap().push(recorded);
                Ok(())
            });
            bus.add(event, [Registration::new(listener)]);
        }

        recorder
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&RecordedEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| predicate(e)).count()
    }

    pub fn messages(&self) -> Vec<Payload> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                RecordedEvent::Message(payload) => Some(payload.clone()),
                _ => None,
            })
            .collect()
    }

    /// Polls until `predicate` matches `count` recorded events or the timeout expires.
    pub async fn wait_for(
        &self,
        count: usize,
        predicate: impl Fn(&RecordedEvent) -> bool,
        timeout_ms: u64,
    ) -> bool {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);

        loop {
            if self.count(&predicate) >= count {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
    }
}
