//! LIS3DH three-axis accelerometer
//!
//! Used as the handheld's tilt sensor. Held still, the gravity component on
//! each axis is the tilt: about ±1 g when the axis points straight down/up.
//!
//! Setup:
//! - 100 Hz output data rate, X/Y/Z enabled
//! - high-resolution mode (12-bit), ±2 g full scale, 1 mg/digit
//! - block data update, so X and Y come from the same conversion

use embedded_hal_async::i2c::I2c;
use hydroflyer_core::tilt::TiltSample;
use hydroflyer_core::traits::{SensorError, TiltSensor};

/// I2C address with SDO/SA0 tied low
pub const ADDR_SDO_LOW: u8 = 0x18;

/// I2C address with SDO/SA0 tied high
pub const ADDR_SDO_HIGH: u8 = 0x19;

/// LIS3DH register addresses
pub mod reg {
    pub const WHO_AM_I: u8 = 0x0F;
    pub const CTRL_REG1: u8 = 0x20;
    pub const CTRL_REG4: u8 = 0x23;
    pub const STATUS_REG: u8 = 0x27;
    pub const OUT_X_L: u8 = 0x28;
}

/// Expected WHO_AM_I value
pub const DEVICE_ID: u8 = 0x33;

/// Sub-address flag for multi-byte reads
const AUTO_INCREMENT: u8 = 0x80;

/// ODR = 100 Hz, normal power, X/Y/Z enabled
const CTRL_REG1_100HZ_XYZ: u8 = 0x57;

/// BDU set, ±2 g, HR set
const CTRL_REG4_BDU_HR_2G: u8 = 0x88;

/// New X/Y/Z data available
const STATUS_ZYXDA: u8 = 0x08;

/// High-resolution ±2 g sensitivity (1 mg/digit)
const DIGITS_PER_G: f32 = 1000.0;

/// Convert a left-justified 12-bit sample to g
pub fn raw_to_g(lo: u8, hi: u8) -> f32 {
    (i16::from_le_bytes([lo, hi]) >> 4) as f32 / DIGITS_PER_G
}

/// LIS3DH on an async I2C bus
pub struct Lis3dh<I2C> {
    i2c: I2C,
    addr: u8,
}

impl<I2C: I2c> Lis3dh<I2C> {
    /// Create a driver; call [`Lis3dh::init`] before sampling
    pub fn new(i2c: I2C, addr: u8) -> Self {
        Self { i2c, addr }
    }

    /// Check the device ID and configure the sensor
    pub async fn init(&mut self) -> Result<(), SensorError> {
        let id = self.read_reg(reg::WHO_AM_I).await?;
        if id != DEVICE_ID {
            return Err(SensorError::WrongDevice);
        }

        self.write_reg(reg::CTRL_REG1, CTRL_REG1_100HZ_XYZ).await?;
        self.write_reg(reg::CTRL_REG4, CTRL_REG4_BDU_HR_2G).await?;
        Ok(())
    }

    /// Read X and Y in g
    ///
    /// Returns [`SensorError::NotReady`] when no conversion has completed
    /// since the last read.
    pub async fn read_xy(&mut self) -> Result<TiltSample, SensorError> {
        let status = self.read_reg(reg::STATUS_REG).await?;
        if status & STATUS_ZYXDA == 0 {
            return Err(SensorError::NotReady);
        }

        let mut buf = [0u8; 4];
        self.i2c
            .write_read(self.addr, &[reg::OUT_X_L | AUTO_INCREMENT], &mut buf)
            .await
            .map_err(|_| SensorError::Bus)?;

        Ok(TiltSample::new(
            raw_to_g(buf[0], buf[1]),
            raw_to_g(buf[2], buf[3]),
        ))
    }

    /// Give back the bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    async fn read_reg(&mut self, register: u8) -> Result<u8, SensorError> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(self.addr, &[register], &mut value)
            .await
            .map_err(|_| SensorError::Bus)?;
        Ok(value[0])
    }

    async fn write_reg(&mut self, register: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.addr, &[register, value])
            .await
            .map_err(|_| SensorError::Bus)
    }
}

impl<I2C: I2c> TiltSensor for Lis3dh<I2C> {
    async fn sample(&mut self) -> Result<TiltSample, SensorError> {
        self.read_xy().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

    /// Register-file model of the sensor
    struct FakeBus {
        addr: u8,
        regs: [u8; 0x40],
        pointer: usize,
        auto_increment: bool,
        fail: bool,
    }

    impl FakeBus {
        fn new(addr: u8) -> Self {
            let mut regs = [0u8; 0x40];
            regs[reg::WHO_AM_I as usize] = DEVICE_ID;
            regs[reg::STATUS_REG as usize] = STATUS_ZYXDA;
            Self {
                addr,
                regs,
                pointer: 0,
                auto_increment: false,
                fail: false,
            }
        }

        fn set_xy(&mut self, x: [u8; 2], y: [u8; 2]) {
            let base = reg::OUT_X_L as usize;
            self.regs[base..base + 4].copy_from_slice(&[x[0], x[1], y[0], y[1]]);
        }
    }

    impl ErrorType for FakeBus {
        type Error = ErrorKind;
    }

    impl I2c for FakeBus {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::Bus);
            }
            if address != self.addr {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }

            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        let Some((&sub, data)) = bytes.split_first() else {
                            continue;
                        };
                        self.pointer = (sub & !AUTO_INCREMENT) as usize;
                        self.auto_increment = sub & AUTO_INCREMENT != 0;
                        for &b in data {
                            self.regs[self.pointer] = b;
                            self.pointer += 1;
                        }
                    }
                    Operation::Read(buf) => {
                        for b in buf.iter_mut() {
                            *b = self.regs[self.pointer];
                            if self.auto_increment {
                                self.pointer += 1;
                            }
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_raw_to_g() {
        assert_eq!(raw_to_g(0x00, 0x00), 0.0);
        assert_eq!(raw_to_g(0x40, 0x1F), 0.5); // 500 << 4
        assert_eq!(raw_to_g(0x60, 0xF0), -0.25); // -250 << 4
        // Low nibble is padding
        assert_eq!(raw_to_g(0x4F, 0x1F), 0.5);
    }

    #[test]
    fn test_init_configures_sensor() {
        let mut imu = Lis3dh::new(FakeBus::new(ADDR_SDO_LOW), ADDR_SDO_LOW);
        block_on(imu.init()).unwrap();

        let bus = imu.release();
        assert_eq!(bus.regs[reg::CTRL_REG1 as usize], 0x57);
        assert_eq!(bus.regs[reg::CTRL_REG4 as usize], 0x88);
    }

    #[test]
    fn test_init_rejects_wrong_device() {
        let mut bus = FakeBus::new(ADDR_SDO_LOW);
        bus.regs[reg::WHO_AM_I as usize] = 0x6A;
        let mut imu = Lis3dh::new(bus, ADDR_SDO_LOW);
        assert_eq!(block_on(imu.init()), Err(SensorError::WrongDevice));
    }

    #[test]
    fn test_sample_reads_x_and_y() {
        let mut bus = FakeBus::new(ADDR_SDO_HIGH);
        bus.set_xy([0x40, 0x1F], [0x60, 0xF0]);
        let mut imu = Lis3dh::new(bus, ADDR_SDO_HIGH);
        block_on(imu.init()).unwrap();

        let sample = block_on(imu.sample()).unwrap();
        assert_eq!(sample, TiltSample::new(0.5, -0.25));
    }

    #[test]
    fn test_sample_not_ready() {
        let mut bus = FakeBus::new(ADDR_SDO_LOW);
        bus.regs[reg::STATUS_REG as usize] = 0;
        let mut imu = Lis3dh::new(bus, ADDR_SDO_LOW);
        assert_eq!(block_on(imu.sample()), Err(SensorError::NotReady));
    }

    #[test]
    fn test_bus_errors() {
        let mut imu = Lis3dh::new(FakeBus::new(ADDR_SDO_LOW), ADDR_SDO_HIGH);
        assert_eq!(block_on(imu.init()), Err(SensorError::Bus));

        let mut bus = FakeBus::new(ADDR_SDO_LOW);
        bus.fail = true;
        let mut imu = Lis3dh::new(bus, ADDR_SDO_LOW);
        assert_eq!(block_on(imu.sample()), Err(SensorError::Bus));
    }
}
