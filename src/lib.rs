//! # TI ADS1x1x / ADS1x19 Driver
//!
//! One async driver for the ADS1013/4/5, ADS1113/4/5, ADS1119 and ADS1219
//! I2C ADCs. The chips differ in register layout, result width and how the
//! end of a conversion is signalled; those differences live in a static
//! [`Descriptor`] per [`Variant`], so the driver itself never branches on
//! the chip model.
//!
//! Reads are single-shot: select the input, trigger, wait, fetch. Waiting is
//! done through the supplied [`DelayNs`](embedded_hal_async::delay::DelayNs),
//! so a read can be bounded or cancelled by dropping its future.

#![cfg_attr(not(test), no_std)]

use crate::registers::*;
use byteorder::{BigEndian, ByteOrder};
use core::result::Result;
use embedded_hal::digital::InputPin;
use embedded_hal_async::{delay, i2c};

#[cfg(feature = "defmt")]
use defmt::{debug, trace};

pub mod channel;
pub mod config;
mod registers;
pub mod variant;

pub use channel::{resolve_channels, resolve_mux, ChannelPair, InvalidChannelPair};
pub use config::{
    ConversionMode, DataRate, FullScaleRange, Gain, Settings, UnsupportedSetting,
    VoltageReference,
};
pub use variant::{Completion, Descriptor, Protocol, Resolution, UnknownVariant, Variant};

/// Default I2C device address (ADDR pin tied to GND).
pub const DEFAULT_DEVICE_ADDRESS: u8 = 0x48;

/// Time between two ready checks while waiting on a conversion.
const DEFAULT_POLL_INTERVAL_US: u32 = 100;

/// Errors that can occur when using the driver.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<I2cErr, PinErr> {
    /// The bus transfer failed.
    I2c(I2cErr),
    /// Reading the DRDY pin failed.
    Pin(PinErr),
    /// Bad construction argument (unknown variant tag, address wider than 7 bits).
    ConstructionFailed,
    /// The value cannot be represented on this variant.
    UnsupportedSetting,
    /// The channel pair cannot be routed on this variant.
    InvalidChannelPair,
    /// No conversion result is available.
    NotReady,
}

impl<I2cErr, PinErr> From<UnsupportedSetting> for Error<I2cErr, PinErr> {
    fn from(_: UnsupportedSetting) -> Self {
        Error::UnsupportedSetting
    }
}

impl<I2cErr, PinErr> From<InvalidChannelPair> for Error<I2cErr, PinErr> {
    fn from(_: InvalidChannelPair) -> Self {
        Error::InvalidChannelPair
    }
}

impl<I2cErr, PinErr> From<UnknownVariant> for Error<I2cErr, PinErr> {
    fn from(_: UnknownVariant) -> Self {
        Error::ConstructionFailed
    }
}

/// Async driver for one ADC on the bus.
pub struct Ads1x1x<D, DRDY, DELAY>
where
    D: i2c::I2c,
    DRDY: InputPin,
    DELAY: delay::DelayNs,
{
    i2c_dev: D,
    drdy_pin: Option<DRDY>,
    delay: DELAY,
    address: u8,
    descriptor: &'static Descriptor,
    /// Logical view of the last configuration written to the chip.
    settings: Settings,
    /// Config register contents as last written, start bit cleared.
    image: u16,
    poll_interval_us: u32,
    poll_limit: Option<u32>,
}

impl<D, DRDY, DELAY, I2cErr, PinErr> Ads1x1x<D, DRDY, DELAY>
where
    D: i2c::I2c<Error = I2cErr>,
    DRDY: InputPin<Error = PinErr>,
    DELAY: delay::DelayNs,
{
    /// Creates a new driver instance and resets the chip.
    ///
    /// # Arguments
    /// i2c_dev: The I2C device.
    /// drdy_pin: The data ready pin, already configured as an input. Only
    ///   polled on variants that signal completion. If not used, set to `None`.
    /// delay: The delay provider.
    /// address: 7-bit bus address.
    /// variant: The chip model.
    ///
    pub async fn try_new(
        i2c_dev: D,
        drdy_pin: Option<DRDY>,
        delay: DELAY,
        address: u8,
        variant: Variant,
    ) -> Result<Self, Error<I2cErr, PinErr>> {
        if address > 0x7F {
            return Err(Error::ConstructionFailed);
        }

        let mut adc = Self {
            i2c_dev,
            drdy_pin,
            delay,
            address,
            descriptor: variant.descriptor(),
            settings: Settings::for_variant(variant),
            image: 0,
            poll_interval_us: DEFAULT_POLL_INTERVAL_US,
            poll_limit: None,
        };
        adc.reset().await?;

        #[cfg(feature = "defmt")]
        debug!(
            "{} initialized at I2C {=u8:#x}",
            adc.descriptor.name, adc.address
        );

        Ok(adc)
    }

    /// Releases the bus, pin and delay provider.
    pub fn destroy(self) -> (D, Option<DRDY>, DELAY) {
        (self.i2c_dev, self.drdy_pin, self.delay)
    }

    /// Resets the chip to its power-on configuration.
    pub async fn reset(&mut self) -> Result<(), Error<I2cErr, PinErr>> {
        let variant = self.variant();
        match self.descriptor.protocol {
            Protocol::RegisterPointer => {
                self.write_register(Register::Config, CONFIG_RESET).await?;
                self.image = CONFIG_RESET & !start_mask(self.descriptor);
            }
            Protocol::Command => {
                self.send_command(Command::Reset).await?;
                self.image = 0;
            }
        }
        self.settings = Settings::for_variant(variant);

        #[cfg(feature = "defmt")]
        debug!("{} reset, config {=u16:#x}", self.descriptor.name, self.image);

        Ok(())
    }

    /// The chip model this driver was created for.
    pub fn variant(&self) -> Variant {
        self.descriptor.variant
    }

    /// Static facts about the chip model.
    pub fn descriptor(&self) -> &'static Descriptor {
        self.descriptor
    }

    /// The 7-bit bus address.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// The cached logical configuration.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The full-scale range last written.
    pub fn full_scale_range(&self) -> FullScaleRange {
        self.settings.fsr
    }

    /// The data rate last written, aliases resolved.
    pub fn data_rate(&self) -> DataRate {
        self.settings.rate
    }

    /// The programmable gain, or `None` on variants without one.
    pub fn gain(&self) -> Option<Gain> {
        self.descriptor.has_gain().then_some(self.settings.gain)
    }

    /// The conversion mode last written.
    pub fn conversion_mode(&self) -> ConversionMode {
        self.settings.mode
    }

    /// The reference source, or `None` on variants without a selectable one.
    pub fn voltage_reference(&self) -> Option<VoltageReference> {
        self.descriptor
            .has_voltage_reference()
            .then_some(self.settings.vref)
    }

    /// The channel pair currently routed to the converter.
    pub fn channel(&self) -> ChannelPair {
        self.settings.channel
    }

    /// Sets the full-scale range.
    ///
    /// Fixed-reference variants only accept ±2.048V.
    pub async fn set_full_scale_range(
        &mut self,
        fsr: FullScaleRange,
    ) -> Result<(), Error<I2cErr, PinErr>> {
        let code = config::encode_fsr(self.variant(), fsr)?;
        if let Some(field) = self.descriptor.layout.fsr {
            self.write_config(field.insert(self.image, code)).await?;
        }
        self.settings.fsr = fsr.resolve();
        Ok(())
    }

    /// Sets the data rate. Rates from another sub-family are rejected.
    pub async fn set_data_rate(&mut self, rate: DataRate) -> Result<(), Error<I2cErr, PinErr>> {
        let variant = self.variant();
        let code = config::encode_rate(variant, rate)?;
        let image = self.descriptor.layout.rate.insert(self.image, code);
        self.write_config(image).await?;
        self.settings.rate = rate.resolve(variant);
        Ok(())
    }

    /// Sets the programmable gain (ADS1x19 only).
    pub async fn set_gain(&mut self, gain: Gain) -> Result<(), Error<I2cErr, PinErr>> {
        let code = config::encode_gain(self.variant(), gain)?;
        let field = self.descriptor.layout.gain.ok_or(Error::UnsupportedSetting)?;
        self.write_config(field.insert(self.image, code)).await?;
        self.settings.gain = gain;
        Ok(())
    }

    /// Sets the conversion mode. Continuous mode needs the command family.
    pub async fn set_conversion_mode(
        &mut self,
        mode: ConversionMode,
    ) -> Result<(), Error<I2cErr, PinErr>> {
        let code = config::encode_mode(self.variant(), mode)?;
        let image = self.descriptor.layout.mode.insert(self.image, code);
        self.write_config(image).await?;
        self.settings.mode = mode;
        Ok(())
    }

    /// Selects the internal or external reference (ADS1x19 only).
    pub async fn set_voltage_reference(
        &mut self,
        vref: VoltageReference,
    ) -> Result<(), Error<I2cErr, PinErr>> {
        let code = config::encode_vref(self.variant(), vref)?;
        let field = self.descriptor.layout.vref.ok_or(Error::UnsupportedSetting)?;
        self.write_config(field.insert(self.image, code)).await?;
        self.settings.vref = vref;
        Ok(())
    }

    /// Routes a channel pair to the converter without starting a conversion.
    pub async fn set_channel(&mut self, pair: ChannelPair) -> Result<(), Error<I2cErr, PinErr>> {
        let mux = resolve_mux(self.variant(), pair)?;
        let image = self.descriptor.layout.mux.insert(self.image, mux);
        self.write_config(image).await?;
        self.settings.channel = pair;
        Ok(())
    }

    /// Writes a complete configuration in one transfer.
    ///
    /// Every field is validated first; nothing is written if any of them is
    /// unsupported. Gain and reference must stay at their defaults on
    /// variants that lack them.
    pub async fn apply(&mut self, settings: Settings) -> Result<(), Error<I2cErr, PinErr>> {
        let variant = self.variant();
        let layout = self.descriptor.layout;
        let mut image = self.image;

        let fsr = config::encode_fsr(variant, settings.fsr)?;
        if let Some(field) = layout.fsr {
            image = field.insert(image, fsr);
        }
        image = layout
            .rate
            .insert(image, config::encode_rate(variant, settings.rate)?);
        image = layout
            .mode
            .insert(image, config::encode_mode(variant, settings.mode)?);
        match layout.gain {
            Some(field) => {
                image = field.insert(image, config::encode_gain(variant, settings.gain)?);
            }
            None if settings.gain != Gain::X1 => return Err(Error::UnsupportedSetting),
            None => {}
        }
        match layout.vref {
            Some(field) => {
                image = field.insert(image, config::encode_vref(variant, settings.vref)?);
            }
            None if settings.vref != VoltageReference::Internal => {
                return Err(Error::UnsupportedSetting)
            }
            None => {}
        }
        image = layout
            .mux
            .insert(image, resolve_mux(variant, settings.channel)?);

        self.write_config(image).await?;
        self.settings = Settings {
            fsr: settings.fsr.resolve(),
            rate: settings.rate.resolve(variant),
            ..settings
        };
        Ok(())
    }

    /// Reads the configuration register back and rebuilds the cache from it.
    ///
    /// The cache is left alone if the register holds something this driver
    /// cannot express (for example the ADS1x19 AVDD/2 monitor mux).
    pub async fn refresh(&mut self) -> Result<Settings, Error<I2cErr, PinErr>> {
        let variant = self.variant();
        let layout = self.descriptor.layout;
        let image = match self.descriptor.protocol {
            Protocol::RegisterPointer => {
                self.read_register(Register::Config).await? & !start_mask(self.descriptor)
            }
            Protocol::Command => self.read_command_byte(Command::RRegConfig).await? as u16,
        };

        // Fixed-reference variants decode to their reference whatever the code.
        let fsr = config::decode_fsr(variant, layout.fsr.map_or(0, |f| f.extract(image)))?;
        let gain = match layout.gain {
            Some(field) => config::decode_gain(variant, field.extract(image))?,
            None => Gain::X1,
        };
        let vref = match layout.vref {
            Some(field) => config::decode_vref(variant, field.extract(image))?,
            None => VoltageReference::Internal,
        };
        let settings = Settings {
            fsr,
            rate: config::decode_rate(variant, layout.rate.extract(image))?,
            gain,
            mode: config::decode_mode(variant, layout.mode.extract(image))?,
            vref,
            channel: resolve_channels(variant, layout.mux.extract(image))?,
        };

        self.image = image;
        self.settings = settings;
        Ok(settings)
    }

    /// Tunes the wait on ready-signalling variants.
    ///
    /// The ready state is checked every `interval_us`. With `limit` set, a
    /// read gives up with [`Error::NotReady`] after that many intervals;
    /// without it the wait is unbounded.
    pub fn set_ready_poll(&mut self, interval_us: u32, limit: Option<u32>) {
        self.poll_interval_us = interval_us;
        self.poll_limit = limit;
    }

    /// Checks whether a conversion result is waiting.
    ///
    /// Only available on variants that signal completion; returns
    /// [`Error::NotReady`] when nothing is available yet.
    pub async fn check_ready(&mut self) -> Result<(), Error<I2cErr, PinErr>> {
        if !self.descriptor.is_poll_based() {
            return Err(Error::UnsupportedSetting);
        }
        if self.data_ready().await? {
            Ok(())
        } else {
            Err(Error::NotReady)
        }
    }

    /// Reads a single-ended channel against ground.
    pub async fn read_single_ended(
        &mut self,
        channel: u8,
    ) -> Result<i32, Error<I2cErr, PinErr>> {
        self.read(channel, None).await
    }

    /// Reads the difference between two channels.
    pub async fn read_differential(
        &mut self,
        positive: u8,
        negative: u8,
    ) -> Result<i32, Error<I2cErr, PinErr>> {
        self.read(positive, Some(negative)).await
    }

    /// Runs one conversion on the given inputs and returns the scaled result.
    ///
    /// `negative: None` measures `positive` against ground. An illegal pair
    /// fails before anything is sent. The selected channel is cached as soon
    /// as the mux write succeeds, even if a later step fails.
    pub async fn read(
        &mut self,
        positive: u8,
        negative: Option<u8>,
    ) -> Result<i32, Error<I2cErr, PinErr>> {
        let pair = ChannelPair { positive, negative };
        let mux = resolve_mux(self.variant(), pair)?;
        let layout = self.descriptor.layout;

        // Select the input. The register family starts converting on the same write.
        let image = layout.mux.insert(self.image, mux);
        let trigger = layout.start.map_or(image, |start| start.insert(image, 1));
        self.write_config_raw(trigger).await?;
        self.image = image;
        self.settings.channel = pair;

        if layout.start.is_none() {
            self.send_command(Command::StartSync).await?;
        }

        #[cfg(feature = "defmt")]
        trace!("{} conversion started, mux {=u8}", self.descriptor.name, mux);

        self.wait_for_conversion().await?;
        let result = self.read_result().await?;

        #[cfg(feature = "defmt")]
        trace!("{} result {=i32}", self.descriptor.name, result);

        Ok(result)
    }

    async fn wait_for_conversion(&mut self) -> Result<(), Error<I2cErr, PinErr>> {
        match self.descriptor.completion {
            Completion::Delay { micros } => self.delay.delay_us(micros).await,
            Completion::RateDelay => {
                self.delay
                    .delay_ms(rate_delay_ms(self.settings.rate))
                    .await
            }
            Completion::ReadyPoll => self.poll_for_data_ready().await?,
        }
        Ok(())
    }

    /// Waits until the chip reports a finished conversion.
    async fn poll_for_data_ready(&mut self) -> Result<(), Error<I2cErr, PinErr>> {
        let mut polls: u32 = 0;
        loop {
            if self.data_ready().await? {
                return Ok(());
            }
            if self.poll_limit.is_some_and(|limit| polls >= limit) {
                return Err(Error::NotReady);
            }
            polls = polls.saturating_add(1);
            self.delay.delay_us(self.poll_interval_us).await;
        }
    }

    /// DRDY is active low. Without a pin, the status register's DRDY flag is used.
    async fn data_ready(&mut self) -> Result<bool, Error<I2cErr, PinErr>> {
        if let Some(drdy) = &mut self.drdy_pin {
            return drdy.is_low().map_err(Error::Pin);
        }
        let status = self.read_command_byte(Command::RRegStatus).await?;
        Ok(status & STATUS_DRDY != 0)
    }

    /// Fetches the last conversion result and scales it to the variant's width.
    async fn read_result(&mut self) -> Result<i32, Error<I2cErr, PinErr>> {
        let pointer = match self.descriptor.protocol {
            Protocol::RegisterPointer => Register::Conversion as u8,
            Protocol::Command => Command::RData as u8,
        };
        let mut buf = [0u8; 3];
        let buf = &mut buf[..self.descriptor.resolution.bytes()];
        self.i2c_dev
            .write_read(self.address, &[pointer], buf)
            .await
            .map_err(Error::I2c)?;
        Ok(scale_result(self.descriptor.resolution, buf))
    }

    /// Writes a new config register image and caches it on success.
    async fn write_config(&mut self, image: u16) -> Result<(), Error<I2cErr, PinErr>> {
        self.write_config_raw(image).await?;
        self.image = image;

        #[cfg(feature = "defmt")]
        debug!("{} config {=u16:#x}", self.descriptor.name, image);

        Ok(())
    }

    async fn write_config_raw(&mut self, image: u16) -> Result<(), Error<I2cErr, PinErr>> {
        match self.descriptor.protocol {
            Protocol::RegisterPointer => self.write_register(Register::Config, image).await,
            Protocol::Command => self
                .i2c_dev
                .write(self.address, &[Command::WReg as u8, image as u8])
                .await
                .map_err(Error::I2c),
        }
    }

    /// Reads a 16-bit register of the register-pointer family.
    async fn read_register(&mut self, reg: Register) -> Result<u16, Error<I2cErr, PinErr>> {
        let mut buf = [0u8; 2];
        self.i2c_dev
            .write_read(self.address, &[reg as u8], &mut buf)
            .await
            .map_err(Error::I2c)?;
        Ok(BigEndian::read_u16(&buf))
    }

    /// Writes a 16-bit register of the register-pointer family.
    async fn write_register(
        &mut self,
        reg: Register,
        value: u16,
    ) -> Result<(), Error<I2cErr, PinErr>> {
        let mut buf = [reg as u8, 0, 0];
        BigEndian::write_u16(&mut buf[1..], value);
        self.i2c_dev
            .write(self.address, &buf)
            .await
            .map_err(Error::I2c)
    }

    async fn send_command(&mut self, command: Command) -> Result<(), Error<I2cErr, PinErr>> {
        self.i2c_dev
            .write(self.address, &[command as u8])
            .await
            .map_err(Error::I2c)
    }

    /// Sends a command-family read command and returns the single byte it yields.
    async fn read_command_byte(
        &mut self,
        command: Command,
    ) -> Result<u8, Error<I2cErr, PinErr>> {
        let mut buf = [0u8];
        self.i2c_dev
            .write_read(self.address, &[command as u8], &mut buf)
            .await
            .map_err(Error::I2c)?;
        Ok(buf[0])
    }
}

fn start_mask(descriptor: &Descriptor) -> u16 {
    descriptor.layout.start.map_or(0, |start| start.mask())
}

/// ADS1x19 single-shot wait: a touch over one period at 20 SPS, 20 ms from 90 SPS up.
fn rate_delay_ms(rate: DataRate) -> u32 {
    match rate.sps() {
        Some(sps) if sps >= 90 => 20,
        _ => 60,
    }
}

/// Assembles a big-endian result and applies the variant's width correction.
///
/// 12-bit results are left-aligned in 16 bits; the padding nibble is divided
/// away.
fn scale_result(resolution: Resolution, buf: &[u8]) -> i32 {
    match resolution {
        Resolution::Bits12 => BigEndian::read_i16(buf) as i32 / 16,
        Resolution::Bits16 => BigEndian::read_i16(buf) as i32,
        Resolution::Bits24 => BigEndian::read_i24(buf),
    }
}
