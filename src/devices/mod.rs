pub mod genset;
pub mod helpers;
pub mod runner;
pub mod soft;

use crate::{signals, util::runnable::Runnable};
use std::{borrow::Cow, fmt};

pub type Id = u32;

pub trait Device: Send + Sync + fmt::Debug {
    fn class(&self) -> Cow<'static, str>;

    fn as_runnable(&self) -> Option<&dyn Runnable> {
        None
    }
    fn as_signals_device_base(&self) -> &dyn signals::DeviceBase;
}
