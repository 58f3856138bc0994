pub mod binary_sensor_a;
pub mod button_a;
pub mod switch_a;
pub mod value;
