pub mod event_source;
pub mod event_target_queued;
pub mod state_source;
pub mod state_target_queued;

use super::types::ValueErased;
use std::any::TypeId;

pub trait Base: Send + Sync {
    fn as_remote_base(&self) -> &dyn RemoteBase;
}

pub trait StateSourceRemoteBase: RemoteBase {
    // All value transitions since the last take, oldest first.
    fn take_pending(&self) -> Box<[Option<ValueErased>]>;
    fn peek_last(&self) -> Option<ValueErased>;
}
pub trait StateTargetRemoteBase: RemoteBase {
    fn set(
        &self,
        values: &[Option<ValueErased>],
    ) -> bool;
}

pub trait EventSourceRemoteBase: RemoteBase {
    fn take_pending(&self) -> Box<[ValueErased]>;
}
pub trait EventTargetRemoteBase: RemoteBase {
    fn push(
        &self,
        values: &[ValueErased],
    ) -> bool;
}

pub enum RemoteBaseVariant<'a> {
    StateSource(&'a dyn StateSourceRemoteBase),
    StateTarget(&'a dyn StateTargetRemoteBase),
    EventSource(&'a dyn EventSourceRemoteBase),
    EventTarget(&'a dyn EventTargetRemoteBase),
}

pub trait RemoteBase: Send + Sync {
    fn type_id(&self) -> TypeId;
    fn type_name(&self) -> &'static str;

    fn as_remote_base_variant(&self) -> RemoteBaseVariant<'_>;
}
