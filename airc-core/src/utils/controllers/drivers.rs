//! Hardware seams for the drive agent.
//!
//! Concrete motor and range-sensor drivers live in board support code; the
//! controller only relies on these traits. Both are infallible: the hardware
//! layer is expected to deal with its own bus errors.

/// Motor and steering driver.
pub trait Actuator {
    /// Command continuous steering (`-1.0` left to `1.0` right) and throttle.
    fn cmd(
        &mut self,
        steering: f32,
        throttle: f32,
    );

    /// Halt all motion.
    fn stop(&mut self);
}

impl<T: Actuator + ?Sized> Actuator for &mut T {
    fn cmd(
        &mut self,
        steering: f32,
        throttle: f32,
    ) {
        T::cmd(self, steering, throttle)
    }

    fn stop(&mut self) {
        T::stop(self)
    }
}

/// Multi-beam range sensor.
pub trait RangeSensor {
    /// Fill `buffer` with one raw sample per beam, left to right.
    fn get_data(
        &mut self,
        buffer: &mut [u16],
    );
}

impl<T: RangeSensor + ?Sized> RangeSensor for &mut T {
    fn get_data(
        &mut self,
        buffer: &mut [u16],
    ) {
        T::get_data(self, buffer)
    }
}
