//! Peripheral capabilities the driver needs beyond `embedded-hal`.
//!
//! `embedded-hal` 1.0 has no notion of switching a pin between input and
//! output or of a resettable counter, so these small traits fill the gap.
//! Each is also implemented for `&mut T`, letting the caller keep ownership of
//! its peripherals and lend them to the driver.

use embedded_hal::digital::{InputPin, OutputPin};

/// Direction of the data line.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Push-pull output, no pull resistor, low slew rate.
    Output,
    /// Floating digital input.
    Input,
}

/// A GPIO line that can be switched between driving and sensing.
pub trait DataPin: InputPin + OutputPin {
    /// Reconfigures the line direction.
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;

    /// Returns the line to its reset configuration.
    fn release(&mut self);
}

impl<T: DataPin + ?Sized> DataPin for &mut T {
    #[inline]
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        T::set_direction(self, direction)
    }

    #[inline]
    fn release(&mut self) {
        T::release(self)
    }
}

/// A free-running counter ticking once per microsecond.
pub trait MicrosTimer {
    /// Starts counting.
    fn start(&mut self);

    /// Stops counting.
    fn stop(&mut self);

    /// Sets the counter back to zero.
    fn reset(&mut self);

    /// Ticks elapsed since the last [`reset`](MicrosTimer::reset).
    fn now(&self) -> u32;
}

impl<T: MicrosTimer + ?Sized> MicrosTimer for &mut T {
    #[inline]
    fn start(&mut self) {
        T::start(self)
    }

    #[inline]
    fn stop(&mut self) {
        T::stop(self)
    }

    #[inline]
    fn reset(&mut self) {
        T::reset(self)
    }

    #[inline]
    fn now(&self) -> u32 {
        T::now(self)
    }
}

/// Global masking of interrupt delivery.
pub trait InterruptControl {
    /// Stops interrupt delivery.
    fn disable(&mut self);

    /// Resumes interrupt delivery.
    fn enable(&mut self);
}

impl<T: InterruptControl + ?Sized> InterruptControl for &mut T {
    #[inline]
    fn disable(&mut self) {
        T::disable(self)
    }

    #[inline]
    fn enable(&mut self) {
        T::enable(self)
    }
}

/// Keeps interrupts disabled for as long as it is alive.
///
/// Interrupts are enabled again when the guard is dropped, which covers every
/// early return out of the sampling window.
pub struct InterruptGuard<'a, I: InterruptControl> {
    ctl: &'a mut I,
}

impl<'a, I: InterruptControl> InterruptGuard<'a, I> {
    /// Disables interrupts until the returned guard is dropped.
    pub fn new(ctl: &'a mut I) -> Self {
        ctl.disable();
        Self { ctl }
    }
}

impl<I: InterruptControl> Drop for InterruptGuard<'_, I> {
    fn drop(&mut self) {
        self.ctl.enable();
    }
}

/// Interrupt control that does nothing.
///
/// Use it when the read is already issued from inside a critical section, or
/// on targets where nothing can preempt the driver.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInterruptControl;

impl InterruptControl for NoInterruptControl {
    fn disable(&mut self) {}

    fn enable(&mut self) {}
}

/// Interrupt control backed by the [`critical-section`] crate.
///
/// [`critical-section`]: https://docs.rs/critical-section
#[cfg(feature = "critical-section")]
#[derive(Default)]
pub struct CriticalSection {
    state: Option<critical_section::RestoreState>,
}

#[cfg(feature = "critical-section")]
impl CriticalSection {
    /// Creates a handle that does not hold the critical section yet.
    pub const fn new() -> Self {
        Self { state: None }
    }
}

#[cfg(feature = "critical-section")]
impl InterruptControl for CriticalSection {
    fn disable(&mut self) {
        if self.state.is_none() {
            // SAFETY: the matching release happens in `enable`, and `state`
            // ensures acquire and release are strictly paired.
            self.state = Some(unsafe { critical_section::acquire() });
        }
    }

    fn enable(&mut self) {
        if let Some(state) = self.state.take() {
            // SAFETY: `state` came from the `acquire` in `disable`.
            unsafe { critical_section::release(state) }
        }
    }
}
