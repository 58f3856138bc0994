use super::{
    super::types::{event::Value, ValueErased},
    Base, EventSourceRemoteBase, RemoteBase, RemoteBaseVariant,
};
use crossbeam::queue::SegQueue;
use std::any::{type_name, TypeId};

#[derive(Debug)]
pub struct Signal<V: Value> {
    queue: SegQueue<V>,
}
impl<V: Value> Signal<V> {
    pub fn new() -> Self {
        Self {
            queue: SegQueue::new(),
        }
    }

    #[must_use = "use this value to wake sources changed waker"]
    pub fn push_one(
        &self,
        value: V,
    ) -> bool {
        self.queue.push(value);
        true
    }
}
impl<V: Value> Base for Signal<V> {
    fn as_remote_base(&self) -> &dyn RemoteBase {
        self
    }
}
impl<V: Value> EventSourceRemoteBase for Signal<V> {
    fn take_pending(&self) -> Box<[ValueErased]> {
        let mut buffer = Vec::with_capacity(self.queue.len());
        while let Some(value) = self.queue.pop() {
            buffer.push(Box::new(value) as ValueErased);
        }
        buffer.into_boxed_slice()
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
        RemoteBaseVariant::EventSource(self)
    }
}
