//! MCP23008 8-bit I2C port expander.
//!
//! Drives the front panel: three button inputs and four outputs on one
//! chip.  Generic over `embedded_hal::i2c::I2c`, so host tests run it
//! against a register-file mock.
//!
//! Outputs are written through OLAT from a cached copy, so setting one pin
//! is a single two-byte write and never disturbs its neighbours.

use embedded_hal::i2c::I2c;

/// Register addresses (IOCON.BANK = 0, the power-on default).
pub mod reg {
    pub const IODIR: u8 = 0x00;
    pub const IPOL: u8 = 0x01;
    pub const GPPU: u8 = 0x06;
    pub const GPIO: u8 = 0x09;
    pub const OLAT: u8 = 0x0A;
}

pub struct Mcp23008<I2C> {
    i2c: I2C,
    address: u8,
    olat: u8,
}

impl<I2C: I2c> Mcp23008<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            olat: 0,
        }
    }

    /// Configure `input_mask` pins as pulled-up, non-inverted inputs and
    /// drive every output LOW.
    pub fn init(&mut self, input_mask: u8) -> Result<(), I2C::Error> {
        self.olat = 0;
        self.write_reg(reg::OLAT, 0)?;
        self.write_reg(reg::IPOL, 0)?;
        self.write_reg(reg::GPPU, input_mask)?;
        self.write_reg(reg::IODIR, input_mask)
    }

    /// Current level of all eight pins.
    pub fn read_port(&mut self) -> Result<u8, I2C::Error> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.address, &[reg::GPIO], &mut buf)?;
        Ok(buf[0])
    }

    /// Set one output pin.  Skips the bus write if the latch already holds
    /// that level.
    pub fn set_pin(&mut self, pin: u8, high: bool) -> Result<(), I2C::Error> {
        debug_assert!(pin < 8, "MCP23008 has 8 pins, got {pin}");
        let mask = 1u8 << (pin & 0x07);
        let next = if high { self.olat | mask } else { self.olat & !mask };
        if next == self.olat {
            return Ok(());
        }
        self.write_reg(reg::OLAT, next)?;
        self.olat = next;
        Ok(())
    }

    /// Cached output latch.
    pub fn output_latch(&self) -> u8 {
        self.olat
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_reg(&mut self, register: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[register, value])
    }
}
