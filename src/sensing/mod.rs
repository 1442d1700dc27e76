pub mod camera;
pub mod telemetry;

pub use camera::{acquire_camera, CameraDevice, CameraRequest, CameraStream, Facing, SimulatedCamera};
pub use telemetry::{SensorReport, SENSOR_SCENARIOS};
