use core::fmt;
use embedded_hal::delay::DelayNs;

use crate::bus::Bus;
use crate::humidity;
use crate::sensirion::*;

pub mod commands;

pub const ADDR: u8 = 0x58;

/// Static facts about the chip and this driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Info {
    pub chip_name: &'static str,
    pub manufacturer_name: &'static str,
    pub interface: &'static str,
    pub supply_voltage_min_v: f32,
    pub supply_voltage_max_v: f32,
    pub max_current_ma: f32,
    pub temperature_min: f32,
    pub temperature_max: f32,
    pub driver_version: &'static str,
}

pub const INFO: Info = Info {
    chip_name: "Sensirion SGP30",
    manufacturer_name: "Sensirion",
    interface: "IIC",
    supply_voltage_min_v: 1.62,
    supply_voltage_max_v: 1.98,
    max_current_ma: 48.8,
    temperature_min: -40.0,
    temperature_max: 85.0,
    driver_version: env!("CARGO_PKG_VERSION"),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum State {
    /// Not initialized. Only linking and releasing bindings is allowed.
    #[default]
    Unbound,
    /// The bus is open and commands may be sent.
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Measurement {
    pub co2eq_ppm: u16,
    pub tvoc_ppb: u16,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ppm CO2eq, {} ppb TVOC",
            self.co2eq_ppm, self.tvoc_ppb
        )
    }
}

/// Sensor raw signals, proportional to the logarithm of the H2 and ethanol
/// concentrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSignals {
    pub h2: u16,
    pub ethanol: u16,
}

/// The chip's adaptive compensation state. It carries no meaning outside the
/// chip and should only be stored and restored as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Baseline {
    pub co2eq: u16,
    pub tvoc: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureSet {
    pub product_type: u8,
    pub product_version: u8,
}

impl From<u16> for FeatureSet {
    fn from(word: u16) -> Self {
        Self {
            product_type: (word >> 12) as u8,
            product_version: word as u8,
        }
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "product type {}, version {:#04x}",
            self.product_type, self.product_version
        )
    }
}

fn logged<T, E: fmt::Debug>(what: &str, result: Result<T, Error<E>>) -> Result<T, Error<E>> {
    result.inspect_err(|err| log::error!("sgp30: {} failed: {:?}", what, err))
}

/// Driver session for one SGP30.
///
/// The bus and the delay provider may be linked at construction or later.
/// Nothing is sent to the chip until [`init`](Self::init) has opened the bus,
/// and every method taking `&mut self` runs one transaction to completion, so
/// a session can't interleave commands. Sharing a session between threads
/// needs an external lock.
#[derive(Debug)]
pub struct SGP30<B, D> {
    sensor: Option<Sensor<B>>,
    delay: Option<D>,
    state: State,
}

impl<B, D> Default for SGP30<B, D> {
    fn default() -> Self {
        Self::unbound()
    }
}

impl<B, D> SGP30<B, D> {
    /// Creates a session with nothing linked yet.
    pub const fn unbound() -> Self {
        Self {
            sensor: None,
            delay: None,
            state: State::Unbound,
        }
    }

    pub fn new(bus: B, delay: D) -> Self {
        Self {
            sensor: Some(Sensor::new(bus, ADDR)),
            delay: Some(delay),
            state: State::Unbound,
        }
    }

    /// Links the bus, returning the previously linked one. A new bus has not
    /// been opened, so the session must be initialized again.
    pub fn link_bus(&mut self, bus: B) -> Option<B> {
        self.state = State::Unbound;
        self.sensor
            .replace(Sensor::new(bus, ADDR))
            .map(Sensor::release)
    }

    pub fn link_delay(&mut self, delay: D) -> Option<D> {
        self.delay.replace(delay)
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == State::Ready
    }

    /// Gives the bindings back. The bus is not closed; call
    /// [`deinit`](Self::deinit) first if it was opened.
    pub fn release(self) -> (Option<B>, Option<D>) {
        (self.sensor.map(Sensor::release), self.delay)
    }
}

impl<B: Bus, D: DelayNs> SGP30<B, D> {
    fn ready(&mut self) -> Result<(&mut Sensor<B>, &mut D), Error<B::Error>> {
        match (self.state, self.sensor.as_mut(), self.delay.as_mut()) {
            (State::Ready, Some(sensor), Some(delay)) => Ok((sensor, delay)),
            _ => Err(Error::NotReady),
        }
    }

    /// Checks that the bus and the delay provider are linked and opens the
    /// bus.
    pub fn init(&mut self) -> Result<(), Error<B::Error>> {
        let Some(sensor) = self.sensor.as_mut() else {
            log::error!("sgp30: bus is not linked");
            return Err(Error::MissingCapability(Capability::Bus));
        };
        if self.delay.is_none() {
            log::error!("sgp30: delay is not linked");
            return Err(Error::MissingCapability(Capability::Delay));
        }

        logged("bus open", sensor.bus().open().map_err(Error::I2c))?;
        self.state = State::Ready;

        Ok(())
    }

    /// Resets the chip and closes the bus.
    ///
    /// If the reset fails, [`Error::ResetFailed`] is returned and the bus is
    /// left open. If closing the bus fails, [`Error::I2c`] is returned. The
    /// session stays ready in both cases.
    pub fn deinit(&mut self) -> Result<(), Error<B::Error>> {
        self.soft_reset().map_err(|err| match err {
            Error::I2c(err) => Error::ResetFailed(err),
            err => err,
        })?;

        let (sensor, _) = self.ready()?;
        logged("bus close", sensor.bus().close().map_err(Error::I2c))?;
        self.state = State::Unbound;

        Ok(())
    }

    /// Issues a general call reset. This resets every device on the bus that
    /// understands it, not only the SGP30.
    pub fn soft_reset(&mut self) -> Result<(), Error<B::Error>> {
        let (sensor, _) = self.ready()?;
        logged(
            "soft reset",
            sensor.general_call_reset(commands::SOFT_RESET),
        )
    }

    /// Starts the air quality algorithm. For the first 15 seconds afterwards
    /// `measure_iaq` returns 400 ppm CO2eq and 0 ppb TVOC.
    pub fn iaq_init(&mut self) -> Result<(), Error<B::Error>> {
        let (sensor, delay) = self.ready()?;
        logged("iaq init", sensor.write(&commands::IAQ_INIT, &[]))?;
        delay.delay_ms(commands::IAQ_INIT_DELAY_MS);
        Ok(())
    }

    /// Reads the air quality signals. The on-chip algorithm expects this to be
    /// called once per second.
    pub fn measure_iaq(&mut self) -> Result<Measurement, Error<B::Error>> {
        let (sensor, delay) = self.ready()?;
        let [co2eq_ppm, tvoc_ppb] = logged(
            "measure iaq",
            sensor.read_words::<2>(
                &commands::MEASURE_IAQ,
                delay,
                commands::MEASURE_IAQ_DELAY_MS,
            ),
        )?;

        Ok(Measurement {
            co2eq_ppm,
            tvoc_ppb,
        })
    }

    pub fn measure_raw(&mut self) -> Result<RawSignals, Error<B::Error>> {
        let (sensor, delay) = self.ready()?;
        let [h2, ethanol] = logged(
            "measure raw",
            sensor.read_words::<2>(
                &commands::MEASURE_RAW,
                delay,
                commands::MEASURE_RAW_DELAY_MS,
            ),
        )?;

        Ok(RawSignals { h2, ethanol })
    }

    /// Runs the on-chip self test and returns its raw result. Meant for
    /// production checks, before `iaq_init` has been sent.
    pub fn measure_test(&mut self) -> Result<u16, Error<B::Error>> {
        let (sensor, delay) = self.ready()?;
        let [result] = logged(
            "measure test",
            sensor.read_words::<1>(
                &commands::MEASURE_TEST,
                delay,
                commands::MEASURE_TEST_DELAY_MS,
            ),
        )?;

        Ok(result)
    }

    /// Returns true if every on-chip test passed.
    pub fn self_test(&mut self) -> Result<bool, Error<B::Error>> {
        Ok(self.measure_test()? == commands::MEASURE_TEST_PASSED)
    }

    pub fn get_iaq_baseline(&mut self) -> Result<Baseline, Error<B::Error>> {
        let (sensor, delay) = self.ready()?;
        let [co2eq, tvoc] = logged(
            "get iaq baseline",
            sensor.read_words::<2>(
                &commands::GET_IAQ_BASELINE,
                delay,
                commands::BASELINE_DELAY_MS,
            ),
        )?;

        Ok(Baseline { co2eq, tvoc })
    }

    /// Restores a baseline previously read with `get_iaq_baseline`. Must be
    /// sent after `iaq_init`.
    pub fn set_iaq_baseline(&mut self, baseline: Baseline) -> Result<(), Error<B::Error>> {
        let (sensor, delay) = self.ready()?;
        // The chip takes the words in the reverse order they are read out.
        logged(
            "set iaq baseline",
            sensor.write(
                &commands::SET_IAQ_BASELINE,
                &[baseline.tvoc, baseline.co2eq],
            ),
        )?;
        delay.delay_ms(commands::BASELINE_DELAY_MS);
        Ok(())
    }

    pub fn get_tvoc_inceptive_baseline(&mut self) -> Result<u16, Error<B::Error>> {
        let (sensor, delay) = self.ready()?;
        let [baseline] = logged(
            "get tvoc inceptive baseline",
            sensor.read_words::<1>(
                &commands::GET_TVOC_INCEPTIVE_BASELINE,
                delay,
                commands::BASELINE_DELAY_MS,
            ),
        )?;

        Ok(baseline)
    }

    pub fn set_tvoc_baseline(&mut self, baseline: u16) -> Result<(), Error<B::Error>> {
        let (sensor, delay) = self.ready()?;
        logged(
            "set tvoc baseline",
            sensor.write(&commands::SET_TVOC_BASELINE, &[baseline]),
        )?;
        delay.delay_ms(commands::BASELINE_DELAY_MS);
        Ok(())
    }

    /// Sets the absolute humidity in 8.8 fixed-point g/m³, see
    /// [`humidity::to_register`]. Zero turns compensation off.
    pub fn set_absolute_humidity(&mut self, register: u16) -> Result<(), Error<B::Error>> {
        let (sensor, delay) = self.ready()?;
        logged(
            "set absolute humidity",
            sensor.write(&commands::SET_ABSOLUTE_HUMIDITY, &[register]),
        )?;
        delay.delay_ms(commands::SET_ABSOLUTE_HUMIDITY_DELAY_MS);
        Ok(())
    }

    /// Compensates for the humidity of air at `temp_celsius` and
    /// `rh_percent` relative humidity.
    pub fn set_humidity(
        &mut self,
        temp_celsius: f32,
        rh_percent: f32,
    ) -> Result<(), Error<B::Error>> {
        self.ready()?;
        let Some(register) = humidity::to_register(temp_celsius, rh_percent) else {
            log::error!(
                "sgp30: {}°C, {}% RH is out of the compensation range",
                temp_celsius,
                rh_percent
            );
            return Err(Error::InvalidArgument);
        };
        log::debug!("sgp30: absolute humidity register {:#06x}", register);

        self.set_absolute_humidity(register)
    }

    pub fn disable_humidity_compensation(&mut self) -> Result<(), Error<B::Error>> {
        self.set_absolute_humidity(0)
    }

    /// Reads the 48-bit serial number.
    pub fn get_serial_id(&mut self) -> Result<u64, Error<B::Error>> {
        let (sensor, delay) = self.ready()?;
        let words = logged(
            "get serial id",
            sensor.read_words::<3>(
                &commands::GET_SERIAL_ID,
                delay,
                commands::GET_SERIAL_ID_DELAY_MS,
            ),
        )?;

        Ok((words[0] as u64) << 32 | (words[1] as u64) << 16 | (words[2] as u64))
    }

    pub fn get_feature_set(&mut self) -> Result<FeatureSet, Error<B::Error>> {
        let (sensor, delay) = self.ready()?;
        let [word] = logged(
            "get feature set",
            sensor.read_words::<1>(
                &commands::GET_FEATURE_SET,
                delay,
                commands::GET_FEATURE_SET_DELAY_MS,
            ),
        )?;

        Ok(FeatureSet::from(word))
    }

    /// Sends an arbitrary command and reads `words.len()` words back, for
    /// commands this driver has no dedicated method for.
    pub fn get_reg(&mut self, cmd: u16, words: &mut [u16]) -> Result<(), Error<B::Error>> {
        let (sensor, delay) = self.ready()?;
        logged(
            "get reg",
            sensor.read(
                &cmd.to_be_bytes(),
                delay,
                commands::RAW_REGISTER_DELAY_MS,
                words,
            ),
        )
    }

    /// Sends an arbitrary command with `words` as its payload.
    pub fn set_reg(&mut self, cmd: u16, words: &[u16]) -> Result<(), Error<B::Error>> {
        let (sensor, _) = self.ready()?;
        logged("set reg", sensor.write(&cmd.to_be_bytes(), words))
    }
}
