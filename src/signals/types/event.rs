use std::{any::Any, fmt};

pub trait Value: Any + Clone + Send + Sync + fmt::Debug + 'static {}

impl Value for () {}
impl Value for bool {}
