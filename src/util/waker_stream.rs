use futures::{
    stream::{FusedStream, Stream},
    task::AtomicWaker,
};
use std::{
    pin::Pin,
    sync::atomic::{AtomicBool, Ordering},
    task::{Context, Poll},
};

// Edge-compressing wake signal with a single stream consumer.
// Any number of producers may call wake(); the receiver observes at least
// one item after the last wake.

#[derive(Debug)]
pub struct Signal {
    flag: AtomicBool,
    waker: AtomicWaker,

    receiver_taken: AtomicBool,
}
impl Signal {
    pub fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
            waker: AtomicWaker::new(),

            receiver_taken: AtomicBool::new(false),
        }
    }

    pub fn wake(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.waker.wake();
    }

    pub fn receiver(
        &self,
        initially_pending: bool,
    ) -> Receiver<'_> {
        assert!(
            !self.receiver_taken.swap(true, Ordering::SeqCst),
            "receiver already taken"
        );
        if initially_pending {
            self.flag.store(true, Ordering::SeqCst);
        }
        Receiver { parent: self }
    }
}

#[derive(Debug)]
pub struct Receiver<'s> {
    parent: &'s Signal,
}
impl<'s> Stream for Receiver<'s> {
    type Item = ();

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        self.parent.waker.register(cx.waker());

        if self.parent.flag.swap(false, Ordering::SeqCst) {
            Poll::Ready(Some(()))
        } else {
            Poll::Pending
        }
    }
}
impl<'s> FusedStream for Receiver<'s> {
    fn is_terminated(&self) -> bool {
        false
    }
}
impl<'s> Drop for Receiver<'s> {
    fn drop(&mut self) {
        assert!(
            self.parent.receiver_taken.swap(false, Ordering::SeqCst),
            "receiver not taken"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::Signal;
    use futures::{future::FutureExt, stream::StreamExt};

    #[test]
    fn wakes_compress() {
        let signal = Signal::new();
        signal.wake();
        signal.wake();

        let mut receiver = signal.receiver(false);
        assert_eq!(receiver.next().now_or_never(), Some(Some(())));
        assert!(receiver.next().now_or_never().is_none());
    }

    #[test]
    fn initially_pending() {
        let signal = Signal::new();

        let mut receiver = signal.receiver(true);
        assert_eq!(receiver.next().now_or_never(), Some(Some(())));
    }
}
