//! Simulated peripherals for unit tests.
//!
//! [`SimLine`] models the data line as a waveform that starts playing when
//! the driver switches the pin to input. Its [`SimTimer`] shares a virtual
//! clock with the pin: every call to `now()` advances the clock by one
//! microsecond, so pulse widths measured by the driver come out exact.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin};
use embedded_hal_mock::eh1::digital::Mock as PinMock;

use crate::hal::{DataPin, Direction, InterruptControl, MicrosTimer};

/// High pulse width the sensor uses for a `0` bit.
pub const ZERO_US: u32 = 26;
/// High pulse width the sensor uses for a `1` bit.
pub const ONE_US: u32 = 70;

#[derive(Debug)]
struct Bus {
    clock: u32,
    timer_base: u32,
    timer_running: bool,
    direction: Direction,
    driven_high: bool,
    input_since: u32,
    waveform: Vec<(bool, u32)>,
    idle_high: bool,
    released: bool,
    fail_direction: bool,
    directions: Vec<Direction>,
}

impl Bus {
    fn level(&self) -> bool {
        if self.direction == Direction::Output {
            return self.driven_high;
        }

        let mut offset = self.clock - self.input_since;
        for &(high, width) in &self.waveform {
            if offset < width {
                return high;
            }
            offset -= width;
        }
        self.idle_high
    }
}

/// A simulated DHT11 data line.
#[derive(Clone, Debug)]
pub struct SimLine {
    bus: Rc<RefCell<Bus>>,
}

impl SimLine {
    /// Plays `waveform` once the pin becomes an input, then rests at `idle_high`.
    pub fn new(waveform: Vec<(bool, u32)>, idle_high: bool) -> Self {
        let bus = Bus {
            clock: 0,
            timer_base: 0,
            timer_running: false,
            direction: Direction::Input,
            driven_high: true,
            input_since: 0,
            waveform,
            idle_high,
            released: false,
            fail_direction: false,
            directions: Vec::new(),
        };
        Self {
            bus: Rc::new(RefCell::new(bus)),
        }
    }

    /// A line that never changes level.
    pub fn stuck(high: bool) -> Self {
        Self::new(Vec::new(), high)
    }

    /// A sensor answering with the given high pulse width for each bit.
    pub fn from_pulses(widths: &[u32]) -> Self {
        Self::new(response(widths), true)
    }

    /// A sensor answering with `packet`, using the given widths for 1 and 0 bits.
    pub fn from_packet_with(packet: [u8; 5], one_us: u32, zero_us: u32) -> Self {
        Self::from_pulses(&encode(packet, one_us, zero_us))
    }

    /// A well-behaved sensor answering with `packet`.
    pub fn from_packet(packet: [u8; 5]) -> Self {
        Self::from_packet_with(packet, ONE_US, ZERO_US)
    }

    pub fn pin(&self) -> SimPin {
        SimPin {
            bus: self.bus.clone(),
        }
    }

    pub fn timer(&self) -> SimTimer {
        SimTimer {
            bus: self.bus.clone(),
        }
    }

    /// Changes what the sensor sends on the next read.
    pub fn respond_with(&self, packet: [u8; 5]) {
        let mut bus = self.bus.borrow_mut();
        bus.waveform = response(&encode(packet, ONE_US, ZERO_US));
        bus.idle_high = true;
    }

    /// Makes every later direction change fail.
    pub fn fail_direction_changes(&self) {
        self.bus.borrow_mut().fail_direction = true;
    }

    pub fn directions(&self) -> Vec<Direction> {
        self.bus.borrow().directions.clone()
    }

    pub fn released(&self) -> bool {
        self.bus.borrow().released
    }

    pub fn timer_running(&self) -> bool {
        self.bus.borrow().timer_running
    }
}

/// Handshake followed by one bit slot per width and the trailing low pulse.
pub fn response(widths: &[u32]) -> Vec<(bool, u32)> {
    let mut waveform = vec![(false, 80), (true, 80)];
    for &width in widths {
        waveform.push((false, 50));
        waveform.push((true, width));
    }
    waveform.push((false, 50));
    waveform
}

/// Expands a packet into per-bit high pulse widths, MSB first.
pub fn encode(packet: [u8; 5], one_us: u32, zero_us: u32) -> Vec<u32> {
    packet
        .iter()
        .flat_map(|byte| (0..8).map(move |i| (byte >> (7 - i)) & 1))
        .map(|bit| if bit == 1 { one_us } else { zero_us })
        .collect()
}

#[derive(Debug, PartialEq, Eq)]
pub struct SimFault;

impl digital::Error for SimFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Debug)]
pub struct SimPin {
    bus: Rc<RefCell<Bus>>,
}

impl ErrorType for SimPin {
    type Error = SimFault;
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.bus.borrow().level())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.bus.borrow().level())
    }
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.bus.borrow_mut().driven_high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.bus.borrow_mut().driven_high = true;
        Ok(())
    }
}

impl DataPin for SimPin {
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        let mut bus = self.bus.borrow_mut();
        if bus.fail_direction {
            return Err(SimFault);
        }
        if direction == Direction::Input {
            bus.input_since = bus.clock;
        }
        bus.direction = direction;
        bus.directions.push(direction);
        Ok(())
    }

    fn release(&mut self) {
        let mut bus = self.bus.borrow_mut();
        bus.direction = Direction::Input;
        bus.released = true;
    }
}

#[derive(Debug)]
pub struct SimTimer {
    bus: Rc<RefCell<Bus>>,
}

impl MicrosTimer for SimTimer {
    fn start(&mut self) {
        self.bus.borrow_mut().timer_running = true;
    }

    fn stop(&mut self) {
        self.bus.borrow_mut().timer_running = false;
    }

    fn reset(&mut self) {
        let mut bus = self.bus.borrow_mut();
        bus.timer_base = bus.clock;
    }

    fn now(&self) -> u32 {
        let mut bus = self.bus.borrow_mut();
        let elapsed = bus.clock - bus.timer_base;
        bus.clock += 1;
        elapsed
    }
}

/// Records how often interrupts were masked and unmasked.
#[derive(Debug, Default)]
pub struct CountingInterrupts {
    pub disables: usize,
    pub enables: usize,
    pub disabled: bool,
}

impl InterruptControl for CountingInterrupts {
    fn disable(&mut self) {
        self.disables += 1;
        self.disabled = true;
    }

    fn enable(&mut self) {
        self.enables += 1;
        self.disabled = false;
    }
}

// Scripted pins have a single fixed configuration.
impl DataPin for PinMock {
    fn set_direction(&mut self, _direction: Direction) -> Result<(), Self::Error> {
        Ok(())
    }

    fn release(&mut self) {}
}
