pub mod async_flag;
pub mod logging;
pub mod runnable;
pub mod waker_stream;
