use futures::{
    channel::oneshot,
    future::{FusedFuture, Future, FutureExt, Shared},
};
use std::{
    pin::Pin,
    task::{Context, Poll},
};

// One-shot broadcast flag, used as exit signal for runnables.
// Receivers resolve once the sender is signaled (or dropped).

#[derive(Debug)]
pub struct Sender {
    inner: oneshot::Sender<()>,
}
impl Sender {
    pub fn signal(self) {
        // dropped receivers are fine
        let _ = self.inner.send(());
    }
}

#[derive(Clone, Debug)]
pub struct Receiver {
    inner: Shared<oneshot::Receiver<()>>,
}
impl Future for Receiver {
    type Output = ();

    fn poll(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx).map(|_| ())
    }
}
impl FusedFuture for Receiver {
    fn is_terminated(&self) -> bool {
        self.inner.is_terminated()
    }
}

pub fn pair() -> (Sender, Receiver) {
    let (sender, receiver) = oneshot::channel::<()>();

    let sender = Sender { inner: sender };
    let receiver = Receiver {
        inner: receiver.shared(),
    };

    (sender, receiver)
}

#[cfg(test)]
mod tests {
    use super::pair;
    use futures::future::FutureExt;

    #[test]
    fn resolves_after_signal() {
        let (sender, receiver) = pair();

        assert!(receiver.clone().now_or_never().is_none());

        sender.signal();

        assert!(receiver.now_or_never().is_some());
    }
}
