use crate::datatypes::real::Real;
use std::{any::Any, fmt};

pub trait Value: Any + Clone + PartialEq + Send + Sync + fmt::Debug + 'static {}

impl Value for bool {}
impl Value for Real {}
