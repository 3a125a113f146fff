//! Dispatcher - routes flushed batches by process role
//!
//! Producers relay batches to the coordinator over the control channel.
//! The coordinator appends its own batches and every relayed batch to
//! the sink.

use std::sync::Arc;

use contracts::{
    Batch, BatchOutlet, ContractError, ControlChannel, ControlMessage, MessageHandler, NodeId,
    RecordSink, Role, WireFormat,
};
use observability::{record_batch_sent, record_batch_written, BatchSource};
use tracing::{debug, info, instrument, warn};

use crate::codec::{decode_batch, encode_batch};
use crate::error::DispatcherError;
use crate::metrics::{DispatchMetrics, DispatchSnapshot};

enum Route {
    Producer {
        channel: Arc<dyn ControlChannel>,
        topic: String,
    },
    Coordinator {
        sink: Arc<dyn RecordSink>,
    },
}

/// Role-aware batch router
pub struct Dispatcher {
    node_id: NodeId,
    route: Route,
    format: WireFormat,
    metrics: Arc<DispatchMetrics>,
}

impl Dispatcher {
    /// Producer dispatcher: every batch goes out on `topic`
    pub fn producer(
        node_id: impl Into<NodeId>,
        channel: Arc<dyn ControlChannel>,
        topic: impl Into<String>,
        format: WireFormat,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            route: Route::Producer {
                channel,
                topic: topic.into(),
            },
            format,
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    /// Coordinator dispatcher: batches are appended to `sink`
    ///
    /// `format` is used to decode inbound payloads. The sink must already
    /// be initialized.
    pub fn coordinator(
        node_id: impl Into<NodeId>,
        sink: Arc<dyn RecordSink>,
        format: WireFormat,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            route: Route::Coordinator { sink },
            format,
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    pub fn role(&self) -> Role {
        match self.route {
            Route::Producer { .. } => Role::Producer,
            Route::Coordinator { .. } => Role::Coordinator,
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Coordinator sink, `None` on a producer
    pub fn sink(&self) -> Option<&Arc<dyn RecordSink>> {
        match &self.route {
            Route::Coordinator { sink } => Some(sink),
            Route::Producer { .. } => None,
        }
    }

    pub fn metrics(&self) -> DispatchSnapshot {
        self.metrics.snapshot()
    }

    /// Route one batch
    ///
    /// # Errors
    /// Encoding failures on a producer; sink failures on the coordinator.
    /// A refused channel send is logged and counted, not returned.
    #[instrument(
        name = "dispatcher_dispatch",
        skip(self, batch),
        fields(node = %self.node_id, role = %self.role(), records = batch.len())
    )]
    pub fn dispatch(&self, batch: Batch) -> Result<(), DispatcherError> {
        self.metrics.inc_dispatched();

        match &self.route {
            Route::Producer { channel, topic } => {
                let payload = encode_batch(&batch, self.format)?;
                match channel.send(topic, payload) {
                    Ok(()) => {
                        self.metrics.inc_sent();
                        record_batch_sent(true);
                        debug!(topic = %topic, records = batch.len(), "Batch sent to coordinator");
                    }
                    Err(e) => {
                        // No retry: this batch is missing from the aggregate
                        self.metrics.inc_send_failures();
                        record_batch_sent(false);
                        warn!(
                            topic = %topic,
                            records = batch.len(),
                            error = %e,
                            "Batch send failed, batch lost"
                        );
                    }
                }
                Ok(())
            }
            Route::Coordinator { sink } => {
                sink.append(&batch)?;
                self.metrics.inc_written_local();
                record_batch_written(BatchSource::Local, batch.len());
                Ok(())
            }
        }
    }

    /// Register the inbound handler for relayed batches (coordinator only)
    ///
    /// Each inbound payload is decoded and appended in receive order. A
    /// sink failure is returned from the handler to the channel.
    #[instrument(name = "dispatcher_register_inbound", skip(self, channel), fields(node = %self.node_id))]
    pub fn register_inbound(
        &self,
        channel: &dyn ControlChannel,
        topic: &str,
    ) -> Result<(), DispatcherError> {
        let Route::Coordinator { sink } = &self.route else {
            return Err(DispatcherError::role_mismatch(
                "register_inbound",
                self.role(),
            ));
        };

        let sink = Arc::clone(sink);
        let metrics = Arc::clone(&self.metrics);
        let format = self.format;

        let handler: MessageHandler = Arc::new(move |message: ControlMessage| {
            receive_batch(sink.as_ref(), &metrics, format, message)
        });
        channel.register_handler(topic, handler)?;

        info!(topic, "Inbound handler registered");
        Ok(())
    }
}

fn receive_batch(
    sink: &dyn RecordSink,
    metrics: &DispatchMetrics,
    format: WireFormat,
    message: ControlMessage,
) -> Result<(), ContractError> {
    // A bad payload loses that message only; delivery carries on
    let batch = match decode_batch(&message.payload, format) {
        Ok(batch) => batch,
        Err(e) => {
            metrics.inc_decode_failures();
            warn!(
                sender = %message.sender,
                bytes = message.payload.len(),
                error = %e,
                "Undecodable batch dropped"
            );
            return Ok(());
        }
    };
    if batch.is_empty() {
        debug!(sender = %message.sender, "Empty batch received, ignored");
        return Ok(());
    }

    info!(
        sender = %message.sender,
        records = batch.len(),
        "Received raw events from producer"
    );
    sink.append(&batch)?;
    metrics.inc_received_remote();
    record_batch_written(BatchSource::Remote, batch.len());
    Ok(())
}

impl BatchOutlet for Dispatcher {
    type Error = DispatcherError;

    fn accept(&self, batch: Batch) -> Result<(), Self::Error> {
        self.dispatch(batch)
    }
}
