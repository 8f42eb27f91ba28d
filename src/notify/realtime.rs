// Realtime pub/sub publisher
//
// Publishes booking events over Redis channels: the admin dashboard
// subscribes to `bookings:admin`, and each booking has its own
// `bookings:{id}` channel for the customer-facing status page.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value as JsonValue;

use crate::notify::NotifyError;

/// Redis-backed event publisher
#[derive(Clone)]
pub struct RealtimePublisher {
    conn: ConnectionManager,
}

impl RealtimePublisher {
    /// Connect to Redis and build a publisher
    ///
    /// The connection manager reconnects on its own; a publish during an
    /// outage surfaces as a per-channel failure in the dispatch report.
    pub async fn connect(redis_url: &str) -> Result<Self, NotifyError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| NotifyError::Realtime(format!("invalid redis url: {}", e)))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| NotifyError::Realtime(format!("connection failed: {}", e)))?;

        tracing::info!("Connected realtime publisher to redis");
        Ok(Self { conn })
    }

    /// Publish a JSON payload to a channel
    pub async fn publish(&self, channel: &str, payload: &JsonValue) -> Result<(), NotifyError> {
        let mut conn = self.conn.clone();

        let _receivers: i64 = conn
            .publish(channel, payload.to_string())
            .await
            .map_err(|e| NotifyError::Realtime(format!("publish to '{}' failed: {}", channel, e)))?;

        Ok(())
    }
}
