pub mod event;
pub mod state;

use std::any::Any;

// Type-erased signal value, downcast by the receiving signal.
pub type ValueErased = Box<dyn Any + Send + Sync>;
