use super::{
    super::types::{state::Value, ValueErased},
    Base, RemoteBase, RemoteBaseVariant, StateSourceRemoteBase,
};
use parking_lot::RwLock;
use std::{
    any::{type_name, TypeId},
    mem::take,
};

#[derive(Debug)]
struct Inner<V: Value> {
    last: Option<V>,
    pending: Vec<Option<V>>,
}

// State output of a device. Transitions are queued until the exchanger
// forwards them, so short pulses are not lost between exchange rounds.
#[derive(Debug)]
pub struct Signal<V: Value> {
    inner: RwLock<Inner<V>>,
}
impl<V: Value> Signal<V> {
    pub fn new(initial: Option<V>) -> Self {
        let inner = Inner {
            last: initial,
            pending: Vec::<Option<V>>::new(),
        };

        Self {
            inner: RwLock::new(inner),
        }
    }

    pub fn peek_last(&self) -> Option<V> {
        self.inner.read().last.clone()
    }

    #[must_use = "use this value to wake sources changed waker"]
    pub fn set_one(
        &self,
        value: Option<V>,
    ) -> bool {
        let mut lock = self.inner.write();

        if lock.last == value {
            return false;
        }

        lock.last.clone_from(&value);
        lock.pending.push(value);

        drop(lock);

        true
    }
}
impl<V: Value> Base for Signal<V> {
    fn as_remote_base(&self) -> &dyn RemoteBase {
        self
    }
}
impl<V: Value> StateSourceRemoteBase for Signal<V> {
    fn take_pending(&self) -> Box<[Option<ValueErased>]> {
        let mut lock = self.inner.write();

        let pending = take(&mut lock.pending);

        drop(lock);

        pending
            .into_iter()
            .map(|value| value.map(|value| Box::new(value) as ValueErased))
            .collect()
    }

    fn peek_last(&self) -> Option<ValueErased> {
        self.inner
            .read()
            .last
            .clone()
            .map(|value| Box::new(value) as ValueErased)
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
        RemoteBaseVariant::StateSource(self)
    }
}
