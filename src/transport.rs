use core::time::Duration;

use embassy_futures::select::{select, Either};
use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{Read, ReadReady, Write};
use log::debug;

use crate::{TransportError, FRAME_LEN};

// Upper bound on chunks drained by `discard_pending_input`, so a sensor
// streaming in active mode cannot keep the drain loop alive forever.
const DISCARD_CHUNK_LIMIT: usize = 8;

/// Byte link to one sensor.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Writes all of `bytes`.
    async fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Fills `buf` completely or fails with [`TransportError::Timeout`] once
    /// `deadline` has passed.
    async fn receive_exact(&mut self, buf: &mut [u8], deadline: Duration)
        -> Result<(), TransportError>;

    /// Drops whatever the sensor has already sent.
    async fn discard_pending_input(&mut self) -> Result<(), TransportError>;
}

/// [`Transport`] over an `embedded-io-async` UART.
///
/// # Type Parameters
///
/// * `Serial`: The serial interface. It must implement `embedded_io_async::Read`,
///   `embedded_io_async::Write` and `embedded_io_async::ReadReady`.
/// * `Delay`: An async delay used to enforce receive deadlines.
pub struct SerialTransport<Serial, Delay> {
    serial: Serial,
    delay: Delay,
}

impl<S, D> SerialTransport<S, D>
where
    S: Read + Write + ReadReady,
    D: DelayNs,
{
    pub fn new(serial: S, delay: D) -> Self {
        Self { serial, delay }
    }

    /// Gives back the serial interface and delay.
    pub fn release(self) -> (S, D) {
        (self.serial, self.delay)
    }
}

impl<S, D> Transport for SerialTransport<S, D>
where
    S: Read + Write + ReadReady,
    D: DelayNs,
{
    async fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.serial.write_all(bytes).await.map_err(|e| {
            log::error!("Serial write failed: {:?}", e);
            TransportError::Io
        })?;
        self.serial.flush().await.map_err(|e| {
            log::error!("Serial flush failed: {:?}", e);
            TransportError::Io
        })
    }

    async fn receive_exact(
        &mut self,
        buf: &mut [u8],
        deadline: Duration,
    ) -> Result<(), TransportError> {
        let Self { serial, delay } = self;
        let millis = u32::try_from(deadline.as_millis()).unwrap_or(u32::MAX);

        match select(serial.read_exact(buf), delay.delay_ms(millis)).await {
            Either::First(Ok(())) => Ok(()),
            Either::First(Err(e)) => {
                debug!("Serial read error: {:?}", e);
                Err(TransportError::Io)
            }
            Either::Second(()) => {
                debug!("No data within {} ms", millis);
                Err(TransportError::Timeout)
            }
        }
    }

    async fn discard_pending_input(&mut self) -> Result<(), TransportError> {
        let mut scratch = [0u8; FRAME_LEN];
        for _ in 0..DISCARD_CHUNK_LIMIT {
            let ready = self.serial.read_ready().map_err(|e| {
                debug!("Serial read_ready error: {:?}", e);
                TransportError::Io
            })?;
            if !ready {
                return Ok(());
            }
            let dropped = self.serial.read(&mut scratch).await.map_err(|e| {
                debug!("Serial read error while discarding: {:?}", e);
                TransportError::Io
            })?;
            debug!("Discarded {} stale bytes", dropped);
        }
        Ok(())
    }
}
