use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error, ErrorType, I2c, Operation};

use crate::bus::Bus;
use crate::sensirion::crc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DummyError {
    InvalidTest,
    Nack,
}

impl Error for DummyError {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        match &self {
            DummyError::InvalidTest => embedded_hal::i2c::ErrorKind::Other,
            DummyError::Nack => embedded_hal::i2c::ErrorKind::NoAcknowledge(
                embedded_hal::i2c::NoAcknowledgeSource::Address,
            ),
        }
    }
}

/// Which bus primitive a [`DummyBus`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fail {
    Open,
    Close,
    Write,
    Read,
    GeneralCall,
}

/// Answers every read with `response` and records everything else.
#[derive(Debug, Default)]
pub struct DummyBus<'a> {
    pub response: &'a [u8],
    pub fail: Option<Fail>,
    pub writes: Vec<(u8, Vec<u8>)>,
    pub reads: usize,
    pub transactions: usize,
    pub opened: usize,
    pub closed: usize,
}

impl<'a> DummyBus<'a> {
    pub fn new(response: &'a [u8]) -> Self {
        Self {
            response,
            ..Default::default()
        }
    }

    pub fn failing(fail: Fail) -> Self {
        Self {
            fail: Some(fail),
            ..Default::default()
        }
    }
}

impl ErrorType for DummyBus<'_> {
    type Error = DummyError;
}

impl I2c for DummyBus<'_> {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation],
    ) -> Result<(), Self::Error> {
        self.transactions += 1;

        match operations {
            [Operation::Write(bytes)] => {
                let general_call = address == 0x00;
                match self.fail {
                    Some(Fail::Write) => return Err(DummyError::Nack),
                    Some(Fail::GeneralCall) if general_call => return Err(DummyError::Nack),
                    _ => {}
                }

                self.writes.push((address, bytes.to_vec()));

                Ok(())
            }
            [Operation::Read(response)] => {
                self.reads += 1;
                if self.fail == Some(Fail::Read) {
                    return Err(DummyError::Nack);
                }
                if response.len() != self.response.len() {
                    return Err(DummyError::InvalidTest);
                }

                response.copy_from_slice(self.response);

                Ok(())
            }
            // Other transactions are invalid
            _ => Err(DummyError::InvalidTest),
        }
    }
}

impl Bus for DummyBus<'_> {
    fn open(&mut self) -> Result<(), Self::Error> {
        self.opened += 1;
        if self.fail == Some(Fail::Open) {
            return Err(DummyError::Nack);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.closed += 1;
        if self.fail == Some(Fail::Close) {
            return Err(DummyError::Nack);
        }
        Ok(())
    }
}

/// Records every delay instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub delays_ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delays_ms.push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
    }
}

/// A simulated SGP30 that keeps its baselines and humidity setting between
/// commands, the way the chip does.
#[derive(Debug, Default)]
pub struct FakeSgp30 {
    pub baseline: [u16; 2],
    pub tvoc_baseline: u16,
    pub inceptive_baseline: u16,
    pub absolute_humidity: u16,
    pub iaq_initialized: bool,
    pending: VecDeque<u8>,
}

impl FakeSgp30 {
    pub fn with_inceptive_baseline(inceptive_baseline: u16) -> Self {
        Self {
            inceptive_baseline,
            ..Default::default()
        }
    }

    fn respond(&mut self, words: &[u16]) {
        for word in words {
            let bytes = word.to_be_bytes();
            self.pending.extend(bytes);
            self.pending.push_back(crc(&bytes));
        }
    }

    fn payload(bytes: &[u8]) -> Result<Vec<u16>, DummyError> {
        let mut words = Vec::new();
        for piece in bytes.chunks(3) {
            match piece {
                [hi, lo, check] if crc(&[*hi, *lo]) == *check => {
                    words.push(u16::from_be_bytes([*hi, *lo]))
                }
                _ => return Err(DummyError::InvalidTest),
            }
        }
        Ok(words)
    }

    fn command(&mut self, frame: &[u8]) -> Result<(), DummyError> {
        let (cmd, payload) = frame.split_at(2);
        let payload = Self::payload(payload)?;

        match (u16::from_be_bytes([cmd[0], cmd[1]]), payload.as_slice()) {
            (0x2003, []) => {
                self.iaq_initialized = true;
                self.baseline = [0x0000, 0x0000];
            }
            (0x2008, []) => self.respond(&[400, 0]),
            (0x2015, []) => {
                let [co2eq, tvoc] = self.baseline;
                self.respond(&[co2eq, tvoc]);
            }
            (0x201e, [tvoc, co2eq]) => self.baseline = [*co2eq, *tvoc],
            (0x20b3, []) => {
                let inceptive_baseline = self.inceptive_baseline;
                self.respond(&[inceptive_baseline]);
            }
            (0x2077, [tvoc]) => self.tvoc_baseline = *tvoc,
            (0x2061, [humidity]) => self.absolute_humidity = *humidity,
            (0x202f, []) => self.respond(&[0x0022]),
            _ => return Err(DummyError::InvalidTest),
        }

        Ok(())
    }
}

impl ErrorType for FakeSgp30 {
    type Error = DummyError;
}

impl I2c for FakeSgp30 {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation],
    ) -> Result<(), Self::Error> {
        match (address, operations) {
            (0x00, [Operation::Write([0x06])]) => {
                *self = Self::default();
                Ok(())
            }
            (0x58, [Operation::Write(frame)]) if frame.len() >= 2 => self.command(frame),
            (0x58, [Operation::Read(response)]) => {
                if response.len() != self.pending.len() {
                    return Err(DummyError::InvalidTest);
                }
                for byte in response.iter_mut() {
                    *byte = self.pending.pop_front().ok_or(DummyError::InvalidTest)?;
                }
                Ok(())
            }
            _ => Err(DummyError::InvalidTest),
        }
    }
}

impl Bus for FakeSgp30 {
    fn open(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
