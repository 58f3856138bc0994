pub mod exchanger;
pub mod signal;
pub mod types;
pub mod waker;

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

// Devices identify their signals with a device-specific enum; the exchanger
// operates on the erased wrapper.
pub trait Identifier: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

trait IdentifierBase: Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn eq_dyn(
        &self,
        other: &dyn IdentifierBase,
    ) -> bool;
    fn hash_dyn(
        &self,
        state: &mut dyn Hasher,
    );
}
impl<I: Identifier> IdentifierBase for I {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn eq_dyn(
        &self,
        other: &dyn IdentifierBase,
    ) -> bool {
        match other.as_any().downcast_ref::<I>() {
            Some(other) => self == other,
            None => false,
        }
    }
    fn hash_dyn(
        &self,
        mut state: &mut dyn Hasher,
    ) {
        TypeId::of::<I>().hash(&mut state);
        self.hash(&mut state);
    }
}

#[derive(Clone, Debug)]
pub struct IdentifierBaseWrapper(Arc<dyn IdentifierBase>);
impl IdentifierBaseWrapper {
    pub fn new<I: Identifier>(identifier: I) -> Self {
        Self(Arc::new(identifier))
    }
}
impl PartialEq for IdentifierBaseWrapper {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.0.eq_dyn(&*other.0)
    }
}
impl Eq for IdentifierBaseWrapper {}
impl Hash for IdentifierBaseWrapper {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.0.hash_dyn(state);
    }
}

pub type ByIdentifier<'a, I> = HashMap<I, &'a dyn signal::Base>;
pub type ByIdentifierErased<'a> = HashMap<IdentifierBaseWrapper, &'a dyn signal::Base>;

pub trait Device: Send + Sync {
    fn targets_changed_waker(&self) -> Option<&waker::TargetsChangedWaker> {
        None
    }
    fn sources_changed_waker(&self) -> Option<&waker::SourcesChangedWaker> {
        None
    }

    type Identifier: Identifier;
    fn by_identifier(&self) -> ByIdentifier<'_, Self::Identifier>;
}

// Object-safe view of [Device], used by the exchanger.
pub trait DeviceBase: Send + Sync {
    fn targets_changed_waker_base(&self) -> Option<&waker::TargetsChangedWaker>;
    fn sources_changed_waker_base(&self) -> Option<&waker::SourcesChangedWaker>;
    fn by_identifier_erased(&self) -> ByIdentifierErased<'_>;
    fn type_name(&self) -> &'static str;
}
impl<D: Device> DeviceBase for D {
    fn targets_changed_waker_base(&self) -> Option<&waker::TargetsChangedWaker> {
        self.targets_changed_waker()
    }
    fn sources_changed_waker_base(&self) -> Option<&waker::SourcesChangedWaker> {
        self.sources_changed_waker()
    }
    fn by_identifier_erased(&self) -> ByIdentifierErased<'_> {
        self.by_identifier()
            .into_iter()
            .map(|(identifier, signal)| (IdentifierBaseWrapper::new(identifier), signal))
            .collect()
    }
    fn type_name(&self) -> &'static str {
        std::any::type_name::<D>()
    }
}

#[cfg(test)]
mod tests {
    use super::{Identifier, IdentifierBaseWrapper};

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum IdentifierA {
        One,
        Two,
    }
    impl Identifier for IdentifierA {}

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum IdentifierB {
        One,
    }
    impl Identifier for IdentifierB {}

    #[test]
    fn wrapper_equality() {
        assert_eq!(
            IdentifierBaseWrapper::new(IdentifierA::One),
            IdentifierBaseWrapper::new(IdentifierA::One),
        );
        assert_ne!(
            IdentifierBaseWrapper::new(IdentifierA::One),
            IdentifierBaseWrapper::new(IdentifierA::Two),
        );
        // same discriminant position, different type
        assert_ne!(
            IdentifierBaseWrapper::new(IdentifierA::One),
            IdentifierBaseWrapper::new(IdentifierB::One),
        );
    }
}
