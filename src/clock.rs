//! Time source for the driver's polling loops
//!
//! Every wait in the driver (command completion, IRQ release, DIO1 polling) goes through
//! a [`Clock`], so host tests can advance simulated time instead of sleeping.

use embedded_hal::delay::DelayNs;

/// Monotonic millisecond clock that can also block
pub trait Clock: DelayNs {
    /// Milliseconds since an arbitrary fixed epoch
    fn now_ms(&mut self) -> u64;
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn now_ms(&mut self) -> u64 {
        T::now_ms(self)
    }
}

/// Wall clock backed by `std::time::Instant`
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    epoch: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    pub fn new() -> Self {
        Self {
            epoch: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl DelayNs for StdClock {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_ms(&mut self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}
