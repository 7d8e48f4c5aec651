use embedded_hal::i2c::{ErrorType, I2c, Operation};

/// An I2C bus with an explicit lifecycle.
///
/// [`SGP30::init`](crate::SGP30::init) opens the bus before the first
/// transaction and [`SGP30::deinit`](crate::SGP30::deinit) closes it after the
/// last one. Buses that are configured elsewhere can be wrapped in
/// [`Passthrough`].
pub trait Bus: I2c {
    fn open(&mut self) -> Result<(), Self::Error>;

    fn close(&mut self) -> Result<(), Self::Error>;
}

impl<B: Bus + ?Sized> Bus for &mut B {
    fn open(&mut self) -> Result<(), Self::Error> {
        B::open(self)
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        B::close(self)
    }
}

/// Adapts a HAL I2C peripheral that is already set up. Opening and closing it
/// does nothing.
#[derive(Debug)]
pub struct Passthrough<I2C>(I2C);

impl<I2C> Passthrough<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self(i2c)
    }

    pub fn into_inner(self) -> I2C {
        self.0
    }
}

impl<I2C: ErrorType> ErrorType for Passthrough<I2C> {
    type Error = I2C::Error;
}

impl<I2C: I2c> I2c for Passthrough<I2C> {
    fn read(&mut self, address: u8, read: &mut [u8]) -> Result<(), Self::Error> {
        self.0.read(address, read)
    }

    fn write(&mut self, address: u8, write: &[u8]) -> Result<(), Self::Error> {
        self.0.write(address, write)
    }

    fn write_read(
        &mut self,
        address: u8,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.0.write_read(address, write, read)
    }

    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.0.transaction(address, operations)
    }
}

impl<I2C: I2c> Bus for Passthrough<I2C> {
    fn open(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
