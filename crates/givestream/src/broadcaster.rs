//! realtime event fan-out.
//!
//! confirmed pledges are pushed to connected browsers over two rooms:
//! `public` (every connection) and `admin` (connections that presented a
//! valid access token). delivery is best-effort: there is no replay, no
//! ordering guarantee across rooms, and a slow receiver that lags simply
//! drops the events it missed.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

/// event name for a pledge newly visible on the public feed.
pub const EVENT_NEW_PLEDGE: &str = "new-pledge";

/// event name for an admin-room record update.
pub const EVENT_PLEDGE_UPDATED: &str = "pledge-updated";

/// event name for refreshed public totals.
pub const EVENT_STATS_UPDATE: &str = "stats-update";

/// events buffered per room before slow receivers start lagging.
const CHANNEL_CAPACITY: usize = 64;

/// a server-emitted realtime event, ready for the wire.
///
/// serializes as `{"event": "...", "data": ...}` and is sent to clients
/// as a single json text frame.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// event name.
    pub event: &'static str,
    /// event payload.
    pub data: serde_json::Value,
}

impl Event {
    /// build an event from a name and a serializable payload.
    pub fn new(event: &'static str, data: impl Serialize) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event,
            data: serde_json::to_value(data)?,
        })
    }
}

/// fan-out hub for realtime events.
///
/// cheap to clone; all clones share the same rooms. handlers get one of
/// these injected through the application state rather than reaching for
/// a global, so tests can subscribe a receiver and observe exactly what
/// a request emitted.
#[derive(Clone)]
pub struct Broadcaster {
    inner: Arc<Inner>,
}

struct Inner {
    public: broadcast::Sender<Event>,
    admin: broadcast::Sender<Event>,
}

impl Broadcaster {
    /// create a new broadcaster with empty rooms.
    pub fn new() -> Self {
        let (public, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (admin, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner { public, admin }),
        }
    }

    /// subscribe to the public room.
    pub fn subscribe_public(&self) -> broadcast::Receiver<Event> {
        self.inner.public.subscribe()
    }

    /// subscribe to the admin room.
    pub fn subscribe_admin(&self) -> broadcast::Receiver<Event> {
        self.inner.admin.subscribe()
    }

    /// send an event to every public-room subscriber.
    ///
    /// events sent while no client is connected are dropped.
    pub fn send_public(&self, event: Event) {
        let _ = self.inner.public.send(event);
    }

    /// send an event to every admin-room subscriber.
    pub fn send_admin(&self, event: Event) {
        let _ = self.inner.admin.send(event);
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}
