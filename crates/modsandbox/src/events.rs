//! Bundle lifecycle notifications
//!
//! Every bundle call emits, in order:
//!
//! ```text
//! bundleStart ─┬─ bundleError                          (fetch or specifier failure)
//!              ├─ bundleEnd                            (cache read failure, no payload)
//!              └─ [modules] ─ bundleContent ─ bundleEnd (payload)
//! ```
//!
//! `modules` is skipped when the entry source has no dependencies.

use crate::assemble::DeliveryPayload;
use crate::cache::PackageMeta;
use tokio::sync::mpsc::UnboundedSender;

/// A lifecycle notification
#[derive(Debug, Clone, PartialEq)]
pub enum BundleEvent {
    /// Dependencies were scanned; resolution begins
    BundleStart,

    /// Package metadata of every merged module, in merge order
    Modules(Vec<PackageMeta>),

    /// Merged bundle text, before the entry source is appended
    BundleContent(String),

    /// Terminal event; carries the payload on success
    BundleEnd(Option<DeliveryPayload>),

    /// Terminal failure with the service's response text or error message
    BundleError(String),
}

impl BundleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BundleEvent::BundleStart => "bundleStart",
            BundleEvent::Modules(_) => "modules",
            BundleEvent::BundleContent(_) => "bundleContent",
            BundleEvent::BundleEnd(_) => "bundleEnd",
            BundleEvent::BundleError(_) => "bundleError",
        }
    }
}

/// Receiver of lifecycle notifications
pub trait EventSink {
    fn emit(&mut self, event: BundleEvent);
}

impl EventSink for Vec<BundleEvent> {
    fn emit(&mut self, event: BundleEvent) {
        self.push(event);
    }
}

/// Forwards to a channel; events are dropped once the receiver is gone
impl EventSink for UnboundedSender<BundleEvent> {
    fn emit(&mut self, event: BundleEvent) {
        let _ = self.send(event);
    }
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn emit(&mut self, event: BundleEvent) {
        (**self).emit(event);
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: BundleEvent) {}
}

/// Adapts a closure into a sink
pub struct FnSink<F>(pub F);

impl<F: FnMut(BundleEvent)> EventSink for FnSink<F> {
    fn emit(&mut self, event: BundleEvent) {
        (self.0)(event);
    }
}
