//! LocalControlChannel - in-process control channel
//!
//! One FIFO queue drained by one delivery task. Messages from every
//! endpoint are delivered in send order, so per-sender order holds too.
//! Used when all roles share a process (CLI runs, tests).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use bytes::Bytes;
use contracts::{ContractError, ControlChannel, ControlMessage, MessageHandler, NodeId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, trace, warn};

type HandlerMap = Arc<RwLock<HashMap<String, MessageHandler>>>;

/// Delivery counters returned by `close`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Messages passed to a handler
    pub delivered: u64,
    /// Messages dropped for lack of a handler
    pub unroutable: u64,
}

struct Hub {
    tx: Mutex<Option<mpsc::UnboundedSender<ControlMessage>>>,
    handlers: HandlerMap,
    worker: Mutex<Option<JoinHandle<Result<DeliveryStats, ContractError>>>>,
}

/// Shared in-process channel
///
/// Hands out sender-stamped endpoints; must be created inside a tokio runtime.
#[derive(Clone)]
pub struct LocalControlChannel {
    hub: Arc<Hub>,
}

impl LocalControlChannel {
    /// Create the channel and spawn its delivery task
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handlers: HandlerMap = Arc::new(RwLock::new(HashMap::new()));

        let worker_handlers = Arc::clone(&handlers);
        let worker = tokio::spawn(async move { delivery_loop(rx, worker_handlers).await });

        Self {
            hub: Arc::new(Hub {
                tx: Mutex::new(Some(tx)),
                handlers,
                worker: Mutex::new(Some(worker)),
            }),
        }
    }

    /// Endpoint whose messages are stamped with `node_id`
    pub fn endpoint(&self, node_id: impl Into<NodeId>) -> ChannelEndpoint {
        ChannelEndpoint {
            node_id: node_id.into(),
            hub: Arc::clone(&self.hub),
        }
    }

    /// Stop accepting messages and wait until the queue is drained
    ///
    /// # Errors
    /// The first handler error, which also stopped delivery.
    #[instrument(name = "local_channel_close", skip(self))]
    pub async fn close(&self) -> Result<DeliveryStats, ContractError> {
        // Dropping the sender ends the delivery loop once the queue is empty
        if let Ok(mut tx) = self.hub.tx.lock() {
            tx.take();
        }

        let worker = self.hub.worker.lock().ok().and_then(|mut w| w.take());
        let Some(worker) = worker else {
            debug!("LocalControlChannel already closed");
            return Ok(DeliveryStats::default());
        };

        let stats = worker
            .await
            .map_err(|e| ContractError::Other(format!("delivery task panicked: {e}")))??;
        debug!(
            delivered = stats.delivered,
            unroutable = stats.unroutable,
            "LocalControlChannel closed"
        );
        Ok(stats)
    }
}

/// Sender-stamped handle on a LocalControlChannel
#[derive(Clone)]
pub struct ChannelEndpoint {
    node_id: NodeId,
    hub: Arc<Hub>,
}

impl ChannelEndpoint {
    pub fn node_id(&self) -> &str {
        &self.node_id
    }
}

impl ControlChannel for ChannelEndpoint {
    fn send(&self, topic: &str, payload: Bytes) -> Result<(), ContractError> {
        let guard = self
            .hub
            .tx
            .lock()
            .map_err(|_| ContractError::channel_send(topic, "sender lock poisoned"))?;
        let tx = guard
            .as_ref()
            .ok_or_else(|| ContractError::channel_send(topic, "channel closed"))?;

        let message = ControlMessage {
            topic: topic.to_string(),
            sender: self.node_id.clone(),
            payload,
        };
        tx.send(message)
            .map_err(|_| ContractError::channel_send(topic, "delivery task stopped"))?;
        trace!(sender = %self.node_id, topic, "message queued");
        Ok(())
    }

    fn register_handler(&self, topic: &str, handler: MessageHandler) -> Result<(), ContractError> {
        let mut handlers = self
            .hub
            .handlers
            .write()
            .map_err(|_| ContractError::channel_handler(topic, "handler lock poisoned"))?;
        if handlers.contains_key(topic) {
            return Err(ContractError::channel_handler(
                topic,
                "handler already registered",
            ));
        }
        handlers.insert(topic.to_string(), handler);
        debug!(node = %self.node_id, topic, "handler registered");
        Ok(())
    }
}

/// Delivery task: invoke the topic handler for each message, in order
async fn delivery_loop(
    mut rx: mpsc::UnboundedReceiver<ControlMessage>,
    handlers: HandlerMap,
) -> Result<DeliveryStats, ContractError> {
    let mut stats = DeliveryStats::default();

    while let Some(message) = rx.recv().await {
        let handler = handlers
            .read()
            .map_err(|_| ContractError::Other("handler lock poisoned".to_string()))?
            .get(&message.topic)
            .cloned();

        let Some(handler) = handler else {
            warn!(
                topic = %message.topic,
                sender = %message.sender,
                "No handler registered, message dropped"
            );
            stats.unroutable += 1;
            continue;
        };

        let topic = message.topic.clone();
        let sender = message.sender.clone();
        if let Err(e) = handler(message) {
            error!(topic = %topic, sender = %sender, error = %e, "Handler failed, delivery stopped");
            return Err(e);
        }
        stats.delivered += 1;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn collecting_handler(seen: Arc<Mutex<Vec<(String, Bytes)>>>) -> MessageHandler {
        Arc::new(move |msg: ControlMessage| {
            seen.lock().unwrap().push((msg.sender, msg.payload));
            Ok(())
        })
    }

    #[tokio::test]
    async fn test_messages_delivered_in_order_with_sender() {
        let channel = LocalControlChannel::spawn();
        let seen = Arc::new(Mutex::new(Vec::new()));
        channel
            .endpoint("master")
            .register_handler("events", collecting_handler(Arc::clone(&seen)))
            .unwrap();

        let worker = channel.endpoint("worker-1");
        for i in 0..10u8 {
            worker.send("events", Bytes::from(vec![i])).unwrap();
        }

        let stats = channel.close().await.unwrap();
        assert_eq!(stats.delivered, 10);

        let seen = seen.lock().unwrap();
        let payloads: Vec<u8> = seen.iter().map(|(_, p)| p[0]).collect();
        assert_eq!(payloads, (0..10).collect::<Vec<_>>());
        assert!(seen.iter().all(|(sender, _)| sender == "worker-1"));
    }

    #[tokio::test]
    async fn test_unroutable_messages_are_dropped() {
        let channel = LocalControlChannel::spawn();
        channel
            .endpoint("worker-1")
            .send("nobody", Bytes::from_static(b"x"))
            .unwrap();
        let stats = channel.close().await.unwrap();
        assert_eq!(stats.unroutable, 1);
        assert_eq!(stats.delivered, 0);
    }

    #[tokio::test]
    async fn test_send_after_close_fails() {
        let channel = LocalControlChannel::spawn();
        let endpoint = channel.endpoint("worker-1");
        channel.close().await.unwrap();
        let err = endpoint.send("events", Bytes::new()).unwrap_err();
        assert!(matches!(err, ContractError::ChannelSend { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_handler_rejected() {
        let channel = LocalControlChannel::spawn();
        let master = channel.endpoint("master");
        let seen = Arc::new(Mutex::new(Vec::new()));
        master
            .register_handler("events", collecting_handler(Arc::clone(&seen)))
            .unwrap();
        assert!(master
            .register_handler("events", collecting_handler(seen))
            .is_err());
        channel.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_handler_error_surfaces_on_close() {
        let channel = LocalControlChannel::spawn();
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        channel
            .endpoint("master")
            .register_handler(
                "events",
                Arc::new(move |_msg: ControlMessage| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ContractError::sink_write("csv", "disk full"))
                }),
            )
            .unwrap();

        let worker = channel.endpoint("worker-1");
        worker.send("events", Bytes::new()).unwrap();
        // May be accepted or rejected depending on whether delivery already stopped
        let _ = worker.send("events", Bytes::new());

        let err = channel.close().await.unwrap_err();
        assert!(err.is_sink_failure());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
