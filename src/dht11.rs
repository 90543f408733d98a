use embedded_hal::delay::DelayNs;

use crate::config::Config;
use crate::convert::celsius_to_fahrenheit;
use crate::error::{DhtError, Status};
use crate::hal::{DataPin, Direction, InterruptControl, InterruptGuard, MicrosTimer};

/// How long (in milliseconds) the start signal holds the line low.
///
/// The datasheet asks for at least 18 ms.
const START_LOW_MS: u32 = 20;

/// How long (in microseconds) the line is released high before listening.
const START_HIGH_US: u32 = 40;

/// High pulses longer than this (in microseconds) are `1` bits.
///
/// The sensor sends ~26-28us for a `0` and ~70us for a `1`.
pub const BIT_THRESHOLD_US: u32 = 50;

/// Humidity integer, humidity decimal, temperature integer, temperature
/// decimal, checksum.
const PACKET_LEN: usize = 5;

/// Driver for the DHT11 temperature and humidity sensor.
///
/// The handle remembers the last good reading and the status of the most
/// recent transaction. A failed read never touches the stored reading.
pub struct Dht11<PIN, TIMER, D, IRQ> {
    pin: PIN,
    timer: TIMER,
    delay: D,
    interrupts: IRQ,
    config: Config,
    temperature: f32,
    humidity: f32,
    status: Status,
}

/// Reading returned by the DHT11 sensor.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub relative_humidity: f32,
}

impl Reading {
    /// Temperature in degrees Fahrenheit.
    pub fn temperature_fahrenheit(&self) -> f32 {
        celsius_to_fahrenheit(self.temperature)
    }

    /// Decodes the four data bytes of a packet.
    ///
    /// The DHT11 sends whole units in the first byte of each pair and tenths
    /// in the second. Sub-zero temperatures are not decoded.
    fn from_data(data: [u8; 4]) -> Self {
        let [hum_int, hum_dec, temp_int, temp_dec] = data;

        Reading {
            temperature: temp_int as f32 + temp_dec as f32 * 0.1,
            relative_humidity: hum_int as f32 + hum_dec as f32 * 0.1,
        }
    }
}

impl<PIN, TIMER, D, IRQ, E> Dht11<PIN, TIMER, D, IRQ>
where
    PIN: DataPin<Error = E>,
    TIMER: MicrosTimer,
    D: DelayNs,
    IRQ: InterruptControl,
{
    /// Creates a new instance of the DHT11 driver and starts the timer.
    ///
    /// # Arguments
    ///
    /// * `pin` - The GPIO line connected to the DHT11 data pin.
    /// * `timer` - A free-running counter ticking once per microsecond.
    /// * `delay` - A delay provider implementing the `DelayNs` trait.
    /// * `interrupts` - Masks interrupts while the sensor is transmitting.
    ///
    /// Any of these may be passed as `&mut` to keep ownership with the caller.
    pub fn new(pin: PIN, timer: TIMER, delay: D, interrupts: IRQ) -> Self {
        Self::with_config(pin, timer, delay, interrupts, Config::default())
    }

    /// Like [`new`](Self::new), with custom calibration.
    pub fn with_config(
        pin: PIN,
        mut timer: TIMER,
        delay: D,
        interrupts: IRQ,
        config: Config,
    ) -> Self {
        timer.start();

        Dht11 {
            pin,
            timer,
            delay,
            interrupts,
            config,
            temperature: 0.0,
            humidity: 0.0,
            status: Status::Ok,
        }
    }

    /// Releases the data line, stops the timer and returns the peripherals.
    pub fn deinit(mut self) -> (PIN, TIMER, D, IRQ) {
        self.pin.release();
        self.timer.stop();

        let Dht11 {
            pin,
            timer,
            delay,
            interrupts,
            ..
        } = self;
        (pin, timer, delay, interrupts)
    }

    /// Reads a temperature and humidity measurement from the DHT11 sensor.
    ///
    /// This method performs the complete DHT11 communication sequence:
    /// sending a start signal, waiting for the sensor's response,
    /// reading 5 bytes, validating the checksum, and decoding the result.
    /// The outcome is stored on the driver; on success the reading is too.
    ///
    /// Interrupts are masked from the moment the pin switches to input until
    /// the last bit is sampled, and are unmasked again on every exit path.
    ///
    /// # Returns
    ///
    /// * `Ok(Reading)` if the read is successful and the checksum is valid.
    /// * `Err(DhtError)` if a communication or checksum error occurs.
    pub fn read(&mut self) -> Result<Reading, DhtError<E>> {
        let result = self.transact();

        match &result {
            Ok(reading) => {
                self.temperature = reading.temperature;
                self.humidity = reading.relative_humidity;
                self.status = Status::Ok;
            }
            Err(e) => self.status = e.status(),
        }

        result
    }

    /// Runs one transaction and returns its [`Status`].
    pub fn read_data(&mut self) -> Status {
        let status = match self.read() {
            Ok(_) => Status::Ok,
            Err(e) => e.status(),
        };

        #[cfg(feature = "defmt")]
        defmt::debug!("DHT11 read: {}", status);

        status
    }

    /// Runs a fresh transaction and returns the temperature in Celsius.
    ///
    /// The value is stale unless [`status`](Self::status) is [`Status::Ok`]
    /// afterwards. Every call costs a full transaction (~45 ms).
    pub fn read_temperature_celsius(&mut self) -> f32 {
        self.read_data();
        self.temperature
    }

    /// Runs a fresh transaction and returns the temperature in Fahrenheit.
    ///
    /// The value is stale unless [`status`](Self::status) is [`Status::Ok`]
    /// afterwards.
    pub fn read_temperature_fahrenheit(&mut self) -> f32 {
        celsius_to_fahrenheit(self.read_temperature_celsius())
    }

    /// Runs a fresh transaction and returns the relative humidity in percent.
    ///
    /// The value is stale unless [`status`](Self::status) is [`Status::Ok`]
    /// afterwards.
    pub fn read_humidity(&mut self) -> f32 {
        self.read_data();
        self.humidity
    }

    /// Temperature in Celsius from the last successful read.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Relative humidity in percent from the last successful read.
    pub fn humidity(&self) -> f32 {
        self.humidity
    }

    /// Status of the most recent transaction.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Calibration this driver was created with.
    pub fn config(&self) -> Config {
        self.config
    }

    fn transact(&mut self) -> Result<Reading, DhtError<E>> {
        self.start()?;

        let [hum_int, hum_dec, temp_int, temp_dec, checksum] = self.sample_packet()?;
        let data = [hum_int, hum_dec, temp_int, temp_dec];

        if data.iter().fold(0u8, |sum, v| sum.wrapping_add(*v)) != checksum {
            Err(DhtError::ChecksumMismatch)
        } else {
            Ok(Reading::from_data(data))
        }
    }

    /// Sends the start signal to the DHT11.
    ///
    /// The line is pulled low for 20 ms, then released high for 40us.
    fn start(&mut self) -> Result<(), DhtError<E>> {
        self.pin.set_direction(Direction::Output)?;
        self.pin.set_low()?;
        self.delay.delay_ms(START_LOW_MS);
        self.pin.set_high()?;
        self.hold_us(START_HIGH_US);
        Ok(())
    }

    /// Busy-waits on the microsecond counter.
    fn hold_us(&mut self, us: u32) {
        self.timer.reset();
        while self.timer.now() < us {
            core::hint::spin_loop();
        }
    }

    /// Listens for the sensor's response and samples all 40 data bits.
    fn sample_packet(&mut self) -> Result<[u8; PACKET_LEN], DhtError<E>> {
        let timeout = self.config.timeout_us;
        let pin = &mut self.pin;
        let timer = &mut self.timer;
        let _guard = InterruptGuard::new(&mut self.interrupts);

        pin.set_direction(Direction::Input)?;

        // Still high: the sensor did not answer the start signal
        if pin.is_high()? {
            return Err(DhtError::NoResponse);
        }

        // Waiting for DHT11 Response
        Self::wait_for_state(timer, timeout, || pin.is_high())?; // 80us
        Self::wait_for_state(timer, timeout, || pin.is_low())?; // 80us

        let mut packet = [0; PACKET_LEN];
        for byte in packet.iter_mut() {
            for _ in 0..8 {
                *byte = (*byte << 1) | Self::read_bit(pin, timer, timeout)? as u8;
            }
        }

        Ok(packet)
    }

    /// Reads a single bit from the sensor.
    ///
    /// The bit is determined by how long the line stays high after the
    /// sensor's ~50us low separator.
    fn read_bit(pin: &mut PIN, timer: &mut TIMER, timeout: u32) -> Result<bool, DhtError<E>> {
        Self::wait_for_state(timer, timeout, || pin.is_high())?;

        timer.reset();
        while pin.is_high()? {
            if timer.now() > timeout {
                return Err(DhtError::Timeout);
            }
        }

        Ok(timer.now() > BIT_THRESHOLD_US)
    }

    /// Generic wait loop that checks a pin condition until true or timeout.
    ///
    /// # Arguments
    ///
    /// * `timer` - Counter, reset to zero before polling starts
    /// * `timeout` - Ticks to wait before giving up
    /// * `condition` - Closure that returns true when the expected condition is met
    ///
    /// # Errors
    ///
    /// Returns `DhtError::Timeout` if the timeout is exceeded
    fn wait_for_state<F>(
        timer: &mut TIMER,
        timeout: u32,
        mut condition: F,
    ) -> Result<(), DhtError<E>>
    where
        F: FnMut() -> Result<bool, E>,
    {
        timer.reset();
        while timer.now() < timeout {
            if condition()? {
                return Ok(());
            }
        }
        Err(DhtError::Timeout)
    }
}
