use super::{
    super::types::{state::Value, ValueErased},
    Base, RemoteBase, RemoteBaseVariant, StateTargetRemoteBase,
};
use parking_lot::RwLock;
use std::{
    any::{type_name, TypeId},
    mem::take,
};

#[derive(Debug)]
pub struct Last<V: Value> {
    pub value: Option<V>,
    pub pending: bool,
}

#[derive(Debug)]
struct Inner<V: Value> {
    // outer None until the first set, so the initial value is never deduped
    last: Option<Option<V>>,
    pending: Vec<Option<V>>,
}

// State input of a device, keeping every transition until the device
// consumes them.
#[derive(Debug)]
pub struct Signal<V: Value> {
    inner: RwLock<Inner<V>>,
}
impl<V: Value> Signal<V> {
    pub fn new() -> Self {
        let inner = Inner {
            last: None,
            pending: Vec::<Option<V>>::new(),
        };

        Self {
            inner: RwLock::new(inner),
        }
    }

    // Clears the pending queue, returning queued transitions oldest first.
    pub fn take_pending(&self) -> Box<[Option<V>]> {
        let mut lock = self.inner.write();

        let pending = take(&mut lock.pending);

        drop(lock);

        pending.into_boxed_slice()
    }

    // Clears the pending queue, returning the last value only.
    pub fn take_last(&self) -> Last<V> {
        let mut lock = self.inner.write();

        let value = lock.last.clone().flatten();
        let pending = !lock.pending.is_empty();
        lock.pending.clear();

        drop(lock);

        Last { value, pending }
    }

    // Does not clear the pending queue.
    pub fn peek_last(&self) -> Option<V> {
        self.inner.read().last.clone().flatten()
    }
}
impl<V: Value> Base for Signal<V> {
    fn as_remote_base(&self) -> &dyn RemoteBase {
        self
    }
}
impl<V: Value> StateTargetRemoteBase for Signal<V> {
    fn set(
        &self,
        values: &[Option<ValueErased>],
    ) -> bool {
        let mut lock = self.inner.write();

        let mut changes = false;

        for value in values {
            let value = value
                .as_ref()
                .map(|value| value.downcast_ref::<V>().unwrap().clone());

            if lock.last.as_ref() == Some(&value) {
                continue;
            }

            lock.last = Some(value.clone());
            lock.pending.push(value);

            changes = true;
        }

        drop(lock);

        changes
    }
}
impl<V: Value> RemoteBase for Signal<V> {
    fn type_id(&self) -> TypeId {
        TypeId::of::<V>()
    }
    fn type_name(&self) -> &'static str {
        type_name::<V>()
    }

    fn as_remote_base_variant(&self) -> RemoteBaseVariant<'_> {
        RemoteBaseVariant::StateTarget(self)
    }
}

#[cfg(test)]
mod tests {
    use super::Signal;
    use crate::signals::signal::StateTargetRemoteBase;

    #[test]
    fn first_set_is_queued_even_when_none() {
        let signal = Signal::<bool>::new();

        assert!(StateTargetRemoteBase::set(&signal, &[None]));
        assert_eq!(signal.take_pending().as_ref(), [None]);
        assert_eq!(signal.peek_last(), None);

        // second None is a duplicate of the last value
        assert!(!StateTargetRemoteBase::set(&signal, &[None]));
        assert!(signal.take_pending().is_empty());
    }

    #[test]
    fn duplicate_values_are_deduplicated() {
        let signal = Signal::<bool>::new();

        assert!(StateTargetRemoteBase::set(
            &signal,
            &[Some(Box::new(true)), Some(Box::new(true))]
        ));
        assert_eq!(signal.take_pending().as_ref(), [Some(true)]);
        assert_eq!(signal.peek_last(), Some(true));
    }
}
