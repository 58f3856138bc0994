pub mod sensor_a;
