#![cfg_attr(not(test), no_std)]

use log::debug;

mod constants;
pub use constants::*;

mod error;
pub use error::*;

mod config;
pub use config::*;

mod command;
pub use command::*;

pub mod frame;
pub use frame::parse_frame;

mod reading;
pub use reading::*;

pub mod scheduler;
pub use scheduler::{Action, Phase, Scheduler};

mod sink;
pub use sink::*;

mod transport;
pub use transport::*;

/// Outcome of one [`Pms7003::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Dormant, the sampling interval has not elapsed.
    Idle,
    /// The fan is running but has not warmed up yet.
    WarmingUp,
    /// The wake command was sent this step.
    WokeUp,
    /// A reading was taken and handed to the sink.
    Sampled(Reading),
}

/// Represents one PMS7003 sensor and its sampling cycle.
///
/// The session exclusively owns the transport for its port. It is stepped
/// by an external loop with the current time, and decides on its own when
/// to wake the sensor, read a frame and put it back to sleep.
///
/// # Type Parameters
///
/// * `T`: The byte link to the sensor, see [`Transport`] and [`SerialTransport`].
pub struct Pms7003<T> {
    transport: T,
    config: Config,
    scheduler: Scheduler,
    initialized: bool,
    read_attempts: u8,
}

impl<T> Pms7003<T>
where
    T: Transport,
{
    /// Creates a new `Pms7003` session.
    ///
    /// Nothing is sent until [`init`](Self::init) or the first [`step`](Self::step)
    /// that needs the sensor.
    pub fn new(transport: T, config: Config) -> Self {
        Self {
            transport,
            scheduler: scheduler_for(&config),
            config,
            initialized: false,
            read_attempts: 0,
        }
    }

    /// The session's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The sampling-cycle state, for inspection.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Receive attempts used by the most recent read.
    pub fn read_attempts(&self) -> u8 {
        self.read_attempts
    }

    /// Ends the session and gives back the transport.
    pub fn release(self) -> T {
        self.transport
    }

    /// Puts the sensor into the configured reporting mode.
    ///
    /// - Passive mode: switch to passive reporting, then sleep until the first cycle.
    /// - Active mode: switch to active reporting and start the fan.
    pub async fn init(&mut self) -> Result<(), Error> {
        let sequence = match self.config.mode {
            DeviceMode::Passive => [Command::PassiveMode, Command::Sleep],
            DeviceMode::Active => [Command::ActiveMode, Command::WakeUp],
        };
        for command in sequence {
            self.send_command(command).await.map_err(|e| {
                log::error!(
                    "{}: failed to send {:?} during init: {}",
                    self.config.label,
                    command,
                    e
                );
                e
            })?;
        }

        self.initialized = true;
        debug!("{}: init sequence complete ({:?})", self.config.label, self.config.mode);
        Ok(())
    }

    /// Advances the sampling cycle to `now` (seconds).
    ///
    /// A failed read abandons the cycle and returns the error; the session stays
    /// usable and a later step starts over.
    pub async fn step<K>(&mut self, now: u64, sink: &mut K) -> Result<Step, Error>
    where
        K: ReadingSink,
    {
        match self.scheduler.poll(now) {
            Action::Wait => Ok(match self.scheduler.phase() {
                Phase::WarmingUp => Step::WarmingUp,
                _ => Step::Idle,
            }),
            Action::WakeUp => {
                if !self.initialized {
                    self.init().await?;
                }
                self.wake_up().await?;
                self.scheduler.mark_turned_on(now);
                debug!("{}: waking up", self.config.label);
                Ok(Step::WokeUp)
            }
            Action::Sample => self.sample(now, sink).await,
        }
    }

    /// Reads one frame right now, outside of the sampling schedule.
    ///
    /// In passive mode the read request is sent first. Rejected frames are
    /// skipped without repeating the request, up to `max_read_attempts`.
    pub async fn read(&mut self, now: u64) -> Result<Reading, Error> {
        if !self.initialized {
            self.init().await?;
        }

        self.transport.discard_pending_input().await?;
        if self.config.mode == DeviceMode::Passive {
            self.send_command(Command::ReadPassiveRequest).await?;
        }
        self.receive_frame(now).await
    }

    /// Stops the fan and laser.
    pub async fn sleep(&mut self) -> Result<(), Error> {
        self.send_command(Command::Sleep).await
    }

    /// Starts the fan and laser.
    pub async fn wake_up(&mut self) -> Result<(), Error> {
        self.send_command(Command::WakeUp).await
    }

    /// Switches the reporting mode and restarts the sampling cycle.
    pub async fn set_mode(&mut self, mode: DeviceMode) -> Result<(), Error> {
        debug!("{}: setting reporting mode to {:?}", self.config.label, mode);
        self.config.mode = mode;
        self.scheduler = scheduler_for(&self.config);
        self.initialized = false;
        self.init().await
    }

    /// Encodes and sends a single command.
    pub async fn send_command(&mut self, command: Command) -> Result<(), Error> {
        let bytes = command.encode();
        debug!("{} > {:02X?}", self.config.label, bytes);
        self.transport.send(&bytes).await?;
        Ok(())
    }

    // Reads, records and (in passive mode) puts the sensor back to sleep.
    async fn sample<K>(&mut self, now: u64, sink: &mut K) -> Result<Step, Error>
    where
        K: ReadingSink,
    {
        let reading = match self.read(now).await {
            Ok(reading) => reading,
            Err(e) => {
                log::error!("{}: sampling cycle abandoned: {}", self.config.label, e);
                self.scheduler.abandon();
                return Err(e);
            }
        };

        let recorded = sink.record(&reading, self.config.label).map_err(|e| {
            log::error!("{}: failed to record reading: {:?}", self.config.label, e);
            Error::RecordFailure
        });

        let slept = if self.config.mode == DeviceMode::Passive {
            debug!("{}: sleeping", self.config.label);
            self.sleep().await
        } else {
            Ok(())
        };

        self.scheduler.mark_sampled(now);
        recorded?;
        slept?;
        Ok(Step::Sampled(reading))
    }

    async fn receive_frame(&mut self, now: u64) -> Result<Reading, Error> {
        let max_attempts = self.config.max_read_attempts.max(1);
        // Overwritten by the first attempt, `max_attempts` is at least one.
        let mut last = ReadFailure::Transport(TransportError::Timeout);

        for attempt in 1..=max_attempts {
            self.read_attempts = attempt;
            match self.try_receive_frame(now).await {
                Ok(reading) => return Ok(reading),
                Err(e) => {
                    log::warn!(
                        "{}: read attempt {}/{} failed: {}",
                        self.config.label,
                        attempt,
                        max_attempts,
                        e
                    );
                    last = e;
                }
            }
        }

        log::error!(
            "{}: no valid frame after {} attempts, last failure: {}",
            self.config.label,
            max_attempts,
            last
        );
        Err(Error::ReadAttemptsExhausted {
            attempts: max_attempts,
            last,
        })
    }

    async fn try_receive_frame(&mut self, now: u64) -> Result<Reading, ReadFailure> {
        self.synchronize().await?;

        let mut frame = [0u8; FRAME_LEN];
        frame[..2].copy_from_slice(&SYNC);
        self.transport
            .receive_exact(&mut frame[2..], self.config.read_timeout)
            .await?;

        debug!("{} < {:02X?}", self.config.label, frame);
        Ok(parse_frame(&frame, now)?)
    }

    // Consumes bytes up to and including the next 0x42 0x4D pair.
    async fn synchronize(&mut self) -> Result<(), ReadFailure> {
        let mut previous = 0u8;
        for _ in 0..SYNC_SCAN_LIMIT {
            let mut byte = [0u8; 1];
            self.transport
                .receive_exact(&mut byte, self.config.read_timeout)
                .await?;
            if previous == SYNC[0] && byte[0] == SYNC[1] {
                return Ok(());
            }
            previous = byte[0];
        }
        Err(FrameError::BadSync.into())
    }
}

fn scheduler_for(config: &Config) -> Scheduler {
    match config.mode {
        DeviceMode::Passive => Scheduler::passive(config.sampling_interval, config.warmup_duration),
        DeviceMode::Active => Scheduler::active(config.sampling_interval),
    }
}
