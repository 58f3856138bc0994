use crate::util::waker_stream;
use futures::stream::Stream;
use std::{
    pin::Pin,
    task::{Context, Poll},
};

// Woken by the exchanger after it pushed new values into device targets;
// the stream side is consumed by the owning device.
#[derive(Debug)]
pub struct TargetsChangedWaker {
    inner: waker_stream::Signal,
}
impl TargetsChangedWaker {
    pub fn new() -> Self {
        Self {
            inner: waker_stream::Signal::new(),
        }
    }

    pub fn wake(&self) {
        self.inner.wake();
    }

    pub fn stream(
        &self,
        initially_pending: bool,
    ) -> WakerStream<'_> {
        WakerStream {
            inner: self.inner.receiver(initially_pending),
        }
    }
}

// Woken by a device after it changed its source signals; the stream side is
// consumed by the exchanger.
#[derive(Debug)]
pub struct SourcesChangedWaker {
    inner: waker_stream::Signal,
}
impl SourcesChangedWaker {
    pub fn new() -> Self {
        Self {
            inner: waker_stream::Signal::new(),
        }
    }

    pub fn wake(&self) {
        self.inner.wake();
    }

    pub fn stream(
        &self,
        initially_pending: bool,
    ) -> WakerStream<'_> {
        WakerStream {
            inner: self.inner.receiver(initially_pending),
        }
    }
}

#[derive(Debug)]
pub struct WakerStream<'s> {
    inner: waker_stream::Receiver<'s>,
}
impl<'s> Stream for WakerStream<'s> {
    type Item = ();

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
