//! Progress events flowing from a resolution run to its front end.
//!
//! The run owns the single [`EventSink`]; whoever drives the UI owns the
//! matching [`EventStream`]. Sending never blocks and never fails: if the
//! consumer has gone away, events are dropped. [`EventSink::complete`]
//! consumes the sink, so nothing can follow the terminal event.

use tokio::sync::mpsc;

use crate::pins::ResolvedSet;

/// One item on the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Free-form progress line.
    Log(String),
    /// Short description of the current phase, for status bars.
    Status(String),
    /// The final pin set, sent just before a successful completion.
    Data(ResolvedSet),
    /// Terminal event. Exactly one per run, always last.
    Complete { message: String, success: bool },
}

impl Event {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }
}

/// Create a connected sink/stream pair.
pub fn channel() -> (EventSink, EventStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSink { tx }, EventStream { rx })
}

/// Producer half. Deliberately not `Clone`: one run, one producer.
#[derive(Debug)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventSink {
    pub fn log(&self, message: impl Into<String>) {
        self.send(Event::Log(message.into()));
    }

    pub fn status(&self, message: impl Into<String>) {
        self.send(Event::Status(message.into()));
    }

    pub fn data(&self, resolved: ResolvedSet) {
        self.send(Event::Data(resolved));
    }

    /// Emit the terminal event and close the stream.
    pub fn complete(self, message: impl Into<String>, success: bool) {
        self.send(Event::Complete {
            message: message.into(),
            success,
        });
    }

    fn send(&self, event: Event) {
        if self.tx.send(event).is_err() {
            tracing::trace!("event consumer dropped; discarding event");
        }
    }
}

/// Consumer half.
///
/// Pick whichever receive style suits the front end: `recv().await` inside a
/// cancellable task, `try_recv()` from a UI timer, or `blocking_recv()` from
/// a plain thread.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventStream {
    /// Next event, or `None` once the run has finished and the stream is drained.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Non-blocking poll; `None` when nothing is queued right now.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }

    /// Blocking receive for non-async consumers. Must not be called from
    /// inside an async runtime.
    pub fn blocking_recv(&mut self) -> Option<Event> {
        self.rx.blocking_recv()
    }

    /// Drain every remaining event until the producer is gone.
    pub async fn collect(mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some(event) = self.rx.recv().await {
            events.push(event);
        }
        events
    }
}
