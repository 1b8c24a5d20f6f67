use core::time::Duration;

/// Represents the reporting mode of the PMS7003 sensor.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum DeviceMode {
    /// In Active mode, the sensor streams a frame roughly every second.
    Active,
    /// In Passive mode, the sensor only reports data when queried.
    Passive,
}

/// Configuration settings for one PMS7003 session.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Config {
    /// Name forwarded to the reading sink with every record.
    pub label: &'static str,
    /// The reporting mode of the sensor.
    pub mode: DeviceMode,
    /// Seconds the sensor stays dormant between the end of one cycle and the start of the next.
    pub sampling_interval: u64,
    /// Seconds the fan must run before a passive-mode reading is trusted.
    pub warmup_duration: u64,
    /// Receive attempts per cycle before the cycle is abandoned.
    pub max_read_attempts: u8,
    /// Deadline applied to every receive on the transport.
    pub read_timeout: Duration,
}

impl Config {
    /// Creates a new `Config` instance.
    ///
    /// # Arguments
    ///
    /// * `label` - The session label.
    /// * `mode` - The `DeviceMode` for the sensor.
    ///
    /// # Returns
    ///
    /// A new `Config` with the given label and mode and default timings.
    pub fn new(label: &'static str, mode: DeviceMode) -> Config {
        Config {
            label,
            mode,
            ..Config::default()
        }
    }
    /// Sets the session label.
    pub fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }
    /// Sets the device mode for the configuration.
    ///
    /// # Arguments
    ///
    /// * `mode` - The `DeviceMode` to set.
    ///
    /// # Returns
    ///
    /// The updated `Config` instance.
    pub fn mode(mut self, mode: DeviceMode) -> Self {
        self.mode = mode;
        self
    }
    /// Sets the dormant time between cycles, in seconds.
    pub fn sampling_interval(mut self, seconds: u64) -> Self {
        self.sampling_interval = seconds;
        self
    }
    /// Sets the fan warm-up time before a passive read, in seconds.
    ///
    /// A passive cycle lasts roughly `sampling_interval + warmup_duration`.
    pub fn warmup_duration(mut self, seconds: u64) -> Self {
        self.warmup_duration = seconds;
        self
    }
    /// Sets how many frames may be rejected before a cycle is abandoned.
    ///
    /// A value of zero is raised to one.
    pub fn max_read_attempts(mut self, attempts: u8) -> Self {
        self.max_read_attempts = attempts.max(1);
        self
    }
    /// Sets the deadline for each receive on the transport.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

/// Provides default configuration values for the PMS7003 sensor.
impl Default for Config {
    /// Returns the default configuration.
    ///
    /// Passive mode, a 60 second sampling interval, 30 seconds of warm-up,
    /// five read attempts and a one second receive deadline.
    fn default() -> Config {
        Config {
            label: "PMS7003",
            mode: DeviceMode::Passive,
            sampling_interval: 60,
            warmup_duration: 30,
            max_read_attempts: 5,
            read_timeout: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = Config::new("P11", DeviceMode::Active)
            .sampling_interval(30)
            .warmup_duration(20)
            .max_read_attempts(0)
            .read_timeout(Duration::from_millis(500));

        assert_eq!(config.label, "P11");
        assert_eq!(config.mode, DeviceMode::Active);
        assert_eq!(config.sampling_interval, 30);
        assert_eq!(config.warmup_duration, 20);
        assert_eq!(config.max_read_attempts, 1);
        assert_eq!(config.read_timeout, Duration::from_millis(500));
    }
}
