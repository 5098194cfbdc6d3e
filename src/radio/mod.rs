//! LoRa radio driver
//!
//! [`Sx1262`] sits on top of [`Device`] and turns single command exchanges into radio
//! operations: bring-up, configuration, receive mode, and the transmit and receive
//! pipelines. After every command it polls the chip until the command has been
//! processed (see [`Sx1262::wait_for_idle`]).
//!
//! All operations block the caller until they complete or time out. A transmit at SF12
//! can take several minutes; run the driver on its own thread or task if the host has
//! other work to do.
//!
//! # Example
//! ```no_run
//! # fn demo<SPI, NSS, RESET, DIO1, CLK>(
//! #     spi: SPI, nss: NSS, reset: RESET, dio1: DIO1, clock: CLK,
//! # ) -> Result<(), sx1262_lora::Error>
//! # where
//! #     SPI: embedded_hal::spi::SpiBus<u8>,
//! #     NSS: embedded_hal::digital::OutputPin,
//! #     RESET: embedded_hal::digital::OutputPin,
//! #     DIO1: embedded_hal::digital::InputPin,
//! #     CLK: sx1262_lora::Clock,
//! # {
//! use sx1262_lora::{Preset, Sx1262};
//!
//! let mut radio = Sx1262::new(spi, nss, reset, dio1, clock);
//! radio.init()?;
//! radio.apply_preset(Preset::LongRange)?;
//!
//! radio.transmit(b"hello")?;
//!
//! let mut buf = [0u8; 255];
//! if let Some(len) = radio.blocking_receive(&mut buf, 10_000)? {
//!     let status = radio.packet_status();
//!     // buf[..len] holds the payload, status.rssi its signal strength
//! }
//! # Ok(())
//! # }
//! ```

mod configure;
mod mode;
mod poll;
mod rx;
mod tx;

#[cfg(test)]
mod test;

pub use mode::RadioMode;

use core::convert::Infallible;

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiBus,
};

use crate::{
    clock::Clock,
    commands::{
        DioIrqConfig, IrqMask, LoRaSymbNumTimeout, PacketStatus, PacketType, PaConfig,
        RampTime, RfSwitchConfig, SetDio2AsRfSwitchCtrl, SetDioIrqParams, SetLoRaSymbNumTimeout,
        SetPaConfig, SetPacketType, SetTxParams, StopTimerOnPreamble, StopTimerOnPreambleConfig,
        TxParams,
    },
    config::RadioConfig,
    device::Device,
    error::Error,
    registers::LoraSyncWordMsb,
    Command, ToByteArray,
};

/// Idle-wait budget for configuration commands
pub(crate) const CONFIG_TIMEOUT_MS: u32 = 100;

/// How long NRESET is held low, and how long the chip gets to boot afterwards
const RESET_PULSE_MS: u32 = 10;

/// DIO2 drives the antenna switch
const RF_SWITCH: RfSwitchConfig = RfSwitchConfig { enable: true };

/// RX timer stops on sync word or header detection
const STOP_TIMER_ON_SYNC_WORD: StopTimerOnPreambleConfig = StopTimerOnPreambleConfig::empty();

/// +22 dBm, 40 µs ramp
const TX_PARAMS: TxParams = TxParams {
    power: 22,
    ramp_time: RampTime::Micros40,
};

/// Lock on the first detected symbol
const SYMBOL_TIMEOUT: LoRaSymbNumTimeout = LoRaSymbNumTimeout { symb_num: 0 };

/// Only RxDone is raised, and it is routed to DIO1
const IRQ_CONFIG: DioIrqConfig = DioIrqConfig {
    irq_mask: IrqMask::RX_DONE,
    dio1_mask: IrqMask::ALL,
    dio2_mask: IrqMask::empty(),
    dio3_mask: IrqMask::empty(),
};

/// SX1262 LoRa radio
///
/// Owns the bus, the reset and DIO1 lines, and the clock used for every wait.
/// Operations other than [`init`](Self::init) and [`is_connected`](Self::is_connected)
/// fail with [`Error::Uninitialized`] until `init` has succeeded.
pub struct Sx1262<SPI, NSS, RESET, DIO1, CLK> {
    device: Device<SPI, NSS>,
    reset: RESET,
    dio1: DIO1,
    clock: CLK,
    config: RadioConfig,
    mode: RadioMode,
    packet_status: PacketStatus,
    ready: bool,
}

impl<SPI, NSS, RESET, DIO1, CLK> Sx1262<SPI, NSS, RESET, DIO1, CLK> {
    /// Creates a driver with the default configuration. Nothing is sent until
    /// [`init`](Self::init).
    pub fn new(spi: SPI, nss: NSS, reset: RESET, dio1: DIO1, clock: CLK) -> Self {
        Self {
            device: Device::new(spi, nss),
            reset,
            dio1,
            clock,
            config: RadioConfig::default(),
            mode: RadioMode::Standby,
            packet_status: PacketStatus::default(),
            ready: false,
        }
    }

    /// Configuration last pushed to the chip
    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    /// Tracked radio mode
    pub fn mode(&self) -> RadioMode {
        self.mode
    }

    /// Metrics of the last received packet, all zero before the first one
    pub fn packet_status(&self) -> PacketStatus {
        self.packet_status
    }

    /// Whether [`init`](Self::init) has completed successfully
    pub fn is_initialized(&self) -> bool {
        self.ready
    }

    /// Releases the bus, the pins and the clock
    pub fn release(self) -> (SPI, NSS, RESET, DIO1, CLK) {
        let (spi, nss) = self.device.release();
        (spi, nss, self.reset, self.dio1, self.clock)
    }

    fn ensure_ready(&self) -> Result<(), Error> {
        if self.ready {
            Ok(())
        } else {
            Err(Error::Uninitialized)
        }
    }
}

impl<SPI, NSS, RESET, DIO1, CLK> Sx1262<SPI, NSS, RESET, DIO1, CLK>
where
    SPI: SpiBus<u8>,
    NSS: OutputPin,
    RESET: OutputPin,
    DIO1: InputPin,
    CLK: Clock,
{
    /// Resets the chip, checks that it answers, and loads the LoRa essentials
    ///
    /// The configuration reverts to [`RadioConfig::default`] and the mode to
    /// [`RadioMode::Standby`]. On any failure the driver stays uninitialized.
    pub fn init(&mut self) -> Result<(), Error> {
        self.ready = false;
        self.mode = RadioMode::Standby;

        self.device.deselect()?;
        self.reset_pulse()?;

        let sanity: LoraSyncWordMsb = self.device.read_register()?;
        if !sanity.is_reset_value() {
            log::warn!("radio not responding, sanity register read {:#04x}", sanity.value);
            return Err(Error::NotConnected {
                found: sanity.value,
            });
        }

        self.configure_essentials()?;
        self.ready = true;
        log::debug!("radio initialized");

        Ok(())
    }

    /// Whether the chip answers with the reset value of the LoRa sync word register
    ///
    /// Only meaningful before the sync word has been changed, which this driver never does.
    pub fn is_connected(&mut self) -> Result<bool, Error> {
        let sanity: LoraSyncWordMsb = self.device.read_register()?;
        Ok(sanity.is_reset_value())
    }

    fn reset_pulse(&mut self) -> Result<(), Error> {
        self.reset.set_high().map_err(|_| Error::Pin)?;
        self.reset.set_low().map_err(|_| Error::Pin)?;
        self.clock.delay_ms(RESET_PULSE_MS);
        self.reset.set_high().map_err(|_| Error::Pin)?;
        self.clock.delay_ms(RESET_PULSE_MS);
        Ok(())
    }

    fn configure_essentials(&mut self) -> Result<(), Error> {
        let config = RadioConfig::default();

        self.command(SetDio2AsRfSwitchCtrl { config: RF_SWITCH }, CONFIG_TIMEOUT_MS)?;
        self.push_frequency(&config)?;
        self.command(
            SetPacketType {
                packet_type: PacketType::LoRa,
            },
            CONFIG_TIMEOUT_MS,
        )?;
        self.command(
            StopTimerOnPreamble {
                config: STOP_TIMER_ON_SYNC_WORD,
            },
            CONFIG_TIMEOUT_MS,
        )?;
        self.push_modulation(&config)?;
        self.command(
            SetPaConfig {
                config: PaConfig::SX1262_FULL_POWER,
            },
            CONFIG_TIMEOUT_MS,
        )?;
        self.command(SetTxParams { params: TX_PARAMS }, CONFIG_TIMEOUT_MS)?;
        self.command(
            SetLoRaSymbNumTimeout {
                config: SYMBOL_TIMEOUT,
            },
            CONFIG_TIMEOUT_MS,
        )?;
        self.command(SetDioIrqParams { config: IRQ_CONFIG }, CONFIG_TIMEOUT_MS)?;

        self.config = config;
        Ok(())
    }

    /// Executes `command` and waits up to `timeout_ms` for the chip to process it
    fn command<C>(&mut self, command: C, timeout_ms: u32) -> Result<C::ResponseParameters, Error>
    where
        C: Command<IdType = u8>,
        C::CommandParameters: ToByteArray<Error = Infallible>,
    {
        let response = self.device.execute_command(command)?;
        self.await_idle(C::id(), timeout_ms)?;
        Ok(response)
    }
}
