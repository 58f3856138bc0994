use super::{
    super::types::{event::Value, ValueErased},
    Base, EventTargetRemoteBase, RemoteBase, RemoteBaseVariant,
};
use parking_lot::RwLock;
use std::{
    any::{type_name, TypeId},
    mem::take,
};

#[derive(Debug)]
struct Inner<V: Value> {
    pending: Vec<V>,
}

#[derive(Debug)]
pub struct Signal<V: Value> {
    inner: RwLock<Inner<V>>,
}
impl<V: Value> Signal<V> {
    pub fn new() -> Self {
        let inner = Inner {
            pending: Vec::<V>::new(),
        };

        Self {
            inner: RwLock::new(inner),
        }
    }

    pub fn take_pending(&self) -> Box<[V]> {
        let mut lock = self.inner.write();

        let pending = take(&mut lock.pending);

        drop(lock);

        pending.into_boxed_slice()
    }
}
impl<V: Value> Base for Signal<V> {
    fn as_remote_base(&self) -> &dyn RemoteBase {
        self
    }
}
impl<V: Value> EventTargetRemoteBase for Signal<V> {
    fn push(
        &self,
        values: &[ValueErased],
    ) -> bool {
        let mut lock = self.inner.write();

        lock.pending.extend(
            values
                .iter()
                .map(|value| value.downcast_ref::<V>().unwrap().clone()),
        );

        drop(lock);

        !values.is_empty()
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
        RemoteBaseVariant::EventTarget(self)
    }
}
