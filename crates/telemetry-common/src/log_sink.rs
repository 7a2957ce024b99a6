// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Explicit logger dependency for processors and exporters.
//!
//! Components emit through the `tracing` macros, but always inside [`LogSink::emit`]. An ambient
//! sink lets events flow to whatever subscriber is current for the thread; a scoped sink routes
//! them to one dispatcher only, which lets each instance be observed in isolation.

use std::fmt;

use tracing::Dispatch;

#[derive(Clone, Default)]
pub enum LogSink {
    #[default]
    Ambient,
    Scoped(Dispatch),
}

impl LogSink {
    #[must_use]
    pub fn ambient() -> Self {
        LogSink::Ambient
    }

    #[must_use]
    pub fn scoped(dispatch: Dispatch) -> Self {
        LogSink::Scoped(dispatch)
    }

    /// Runs `f`, routing any event it records to this sink.
    ///
    /// `f` must not await: the scoped dispatcher is only installed for the duration of the call.
    pub fn emit<T>(&self, f: impl FnOnce() -> T) -> T {
        match self {
            LogSink::Ambient => f(),
            LogSink::Scoped(dispatch) => tracing::dispatcher::with_default(dispatch, f),
        }
    }
}

impl From<Dispatch> for LogSink {
    fn from(dispatch: Dispatch) -> Self {
        LogSink::Scoped(dispatch)
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSink::Ambient => write!(f, "LogSink::Ambient"),
            LogSink::Scoped(_) => write!(f, "LogSink::Scoped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing::span::{Attributes, Id, Record};
    use tracing::{Event, Metadata, Subscriber};

    struct CountingSubscriber(Arc<AtomicUsize>);

    impl Subscriber for CountingSubscriber {
        fn enabled(&self, _: &Metadata<'_>) -> bool {
            true
        }
        fn new_span(&self, _: &Attributes<'_>) -> Id {
            Id::from_u64(1)
        }
        fn record(&self, _: &Id, _: &Record<'_>) {}
        fn record_follows_from(&self, _: &Id, _: &Id) {}
        fn event(&self, _: &Event<'_>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
        fn enter(&self, _: &Id) {}
        fn exit(&self, _: &Id) {}
    }

    #[test]
    fn test_scoped_sink_receives_events() {
        let count = Arc::new(AtomicUsize::new(0));
        let sink = LogSink::scoped(Dispatch::new(CountingSubscriber(Arc::clone(&count))));

        sink.emit(|| tracing::warn!(key = "k", "Invalid UTF-8 in span attribute"));
        sink.emit(|| tracing::info!("second"));

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_scoped_sinks_are_isolated() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let first_sink = LogSink::from(Dispatch::new(CountingSubscriber(Arc::clone(&first))));
        let _second_sink = LogSink::from(Dispatch::new(CountingSubscriber(Arc::clone(&second))));

        first_sink.emit(|| tracing::info!("only first"));

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_emit_returns_closure_result() {
        assert_eq!(LogSink::ambient().emit(|| 7), 7);
        assert_eq!(format!("{:?}", LogSink::default()), "LogSink::Ambient");
    }
}
