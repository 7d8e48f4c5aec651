use core::fmt;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use heapless::Vec;
use thiserror::Error;

pub type Cmd = [u8; 2];

/// Size of the transmit buffer: the opcode plus up to four payload words.
pub const MAX_FRAME_LEN: usize = 16;

/// Longest response the codec reads in a single transaction.
pub const MAX_RESPONSE_WORDS: usize = 5;

/// A data word on the wire: two bytes followed by their CRC.
const WORD_LEN: usize = 3;

/// I2C general call address, used for the bus-wide reset.
const GENERAL_CALL_ADDR: u8 = 0x00;

/// A binding the driver needs before it can be initialized.
#[derive(Clone, Copy, Hash, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Capability {
    Bus,
    Delay,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Capability::Bus => f.write_str("bus"),
            Capability::Delay => f.write_str("delay"),
        }
    }
}

#[derive(Clone, Copy, Hash, Debug, PartialEq, Eq, PartialOrd, Ord, Error)]
pub enum Error<I2cError> {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("device is not initialized")]
    NotReady,
    #[error("{0} is not linked")]
    MissingCapability(Capability),
    #[error("invalid CRC")]
    InvalidCrc,
    /// The soft reset issued while shutting down failed. The chip may still be
    /// running, but the bus has not been closed.
    #[error("soft reset failed")]
    ResetFailed(I2cError),
    #[error(transparent)]
    I2c(#[from] I2cError),
}

impl<E> embedded_hal::i2c::Error for Error<E>
where
    E: embedded_hal::i2c::Error,
{
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        match self {
            Self::I2c(err) | Self::ResetFailed(err) => err.kind(),
            _ => embedded_hal::i2c::ErrorKind::Other,
        }
    }
}

// https://sensirion.com/media/documents/984E0DD5/61644B8B/Sensirion_Gas_Platform_Datasheet_SGP30.pdf
// Section 6.6
pub fn crc(data: &[u8; 2]) -> u8 {
    let mut crc = 0xff;

    for byte in data {
        crc ^= byte;

        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ 0x31;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}

fn check_crc<E>(data: &[u8; WORD_LEN]) -> Result<(), Error<E>> {
    let expected = crc(&[data[0], data[1]]);
    if expected != data[2] {
        log::warn!(
            "crc mismatch on word {:#06x}: expected {:#04x}, got {:#04x}",
            u16::from_be_bytes([data[0], data[1]]),
            expected,
            data[2]
        );
        Err(Error::InvalidCrc)
    } else {
        Ok(())
    }
}

/// Command/response codec shared by Sensirion chips: 16-bit opcodes, and
/// 16-bit data words each protected by their own CRC byte.
#[derive(Debug)]
pub struct Sensor<I2C> {
    i2c: I2C,
    addr: u8,
}

impl<I2C> Sensor<I2C> {
    pub fn new(i2c: I2C, addr: u8) -> Self {
        Self { i2c, addr }
    }

    pub fn bus(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> Sensor<I2C> {
    /// Sends `cmd` followed by `words`, each word trailed by its CRC.
    ///
    /// Frames that don't fit in [`MAX_FRAME_LEN`] bytes are rejected before
    /// anything is put on the bus.
    pub fn write(&mut self, cmd: &Cmd, words: &[u16]) -> Result<(), Error<I2C::Error>> {
        let mut frame: Vec<u8, MAX_FRAME_LEN> = Vec::new();

        frame
            .extend_from_slice(cmd)
            .map_err(|_| Error::InvalidArgument)?;
        for word in words {
            let bytes = word.to_be_bytes();
            frame
                .extend_from_slice(&bytes)
                .map_err(|_| Error::InvalidArgument)?;
            frame
                .push(crc(&bytes))
                .map_err(|_| Error::InvalidArgument)?;
        }

        self.i2c.write(self.addr, &frame)?;
        Ok(())
    }

    /// Sends `cmd`, waits `settle_ms` for the chip to prepare the answer, then
    /// reads back `words.len()` words.
    ///
    /// `words` is only written once every word of the response passed its CRC
    /// check.
    pub fn read(
        &mut self,
        cmd: &Cmd,
        delay: &mut impl DelayNs,
        settle_ms: u32,
        words: &mut [u16],
    ) -> Result<(), Error<I2C::Error>> {
        if words.is_empty() || words.len() > MAX_RESPONSE_WORDS {
            return Err(Error::InvalidArgument);
        }

        let mut buf = [0u8; MAX_RESPONSE_WORDS * WORD_LEN];
        let response = &mut buf[..words.len() * WORD_LEN];

        self.i2c.write(self.addr, cmd)?;
        delay.delay_ms(settle_ms);
        self.i2c.read(self.addr, response)?;

        let pieces = response.as_chunks::<WORD_LEN>().0;
        for piece in pieces {
            check_crc(piece)?;
        }

        for (word, piece) in words.iter_mut().zip(pieces) {
            *word = u16::from_be_bytes([piece[0], piece[1]]);
        }

        Ok(())
    }

    pub fn read_words<const N: usize>(
        &mut self,
        cmd: &Cmd,
        delay: &mut impl DelayNs,
        settle_ms: u32,
    ) -> Result<[u16; N], Error<I2C::Error>> {
        let mut words = [0u16; N];
        self.read(cmd, delay, settle_ms, &mut words)?;
        Ok(words)
    }

    /// Broadcasts a single reset byte to every device on the bus. This is not
    /// a framed command: there is no opcode, no CRC and no response.
    pub fn general_call_reset(&mut self, byte: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c.write(GENERAL_CALL_ADDR, &[byte])?;
        Ok(())
    }
}
