use core::f64::consts::PI;
use core::fmt;

use crate::{PAYLOAD_END, PAYLOAD_START};

/// Column names matching the [`Display`](fmt::Display) form of a [`Reading`].
pub const CSV_HEADER: &str = "time,pm1.0_cf,pm2.5_cf,pm10_cf,pm1.0_ac,pm2.5_ac,pm10_ac,um03,um05,um1,um2.5,um5.0,um10,pm2.5_es";

// Assumed mean radius of a particle counted between 0.3 and 2.5 µm, in metres.
const PARTICLE_RADIUS_M: f64 = 0.44e-6;
// Assumed particle density, in µg/m³.
const PARTICLE_DENSITY: f64 = 1.65e12;

/// A decoded PMS7003 frame.
///
/// Concentrations are in µg/m³. Counts are particles at or above the named
/// diameter per 0.1 L of air.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Capture time, in the caller's clock (seconds).
    pub timestamp: u64,
    /// PM1.0 under the standard-particle (CF=1) calibration.
    pub pm1_0_cf1: u16,
    /// PM2.5 under the standard-particle (CF=1) calibration.
    pub pm2_5_cf1: u16,
    /// PM10 under the standard-particle (CF=1) calibration.
    pub pm10_cf1: u16,
    /// PM1.0 under the atmospheric-environment calibration.
    pub pm1_0_atm: u16,
    /// PM2.5 under the atmospheric-environment calibration.
    pub pm2_5_atm: u16,
    /// PM10 under the atmospheric-environment calibration.
    pub pm10_atm: u16,
    /// Particles of 0.3 µm and above, per 0.1 L of air.
    pub count_0_3um: u16,
    /// Particles of 0.5 µm and above, per 0.1 L of air.
    pub count_0_5um: u16,
    /// Particles of 1.0 µm and above, per 0.1 L of air.
    pub count_1_0um: u16,
    /// Particles of 2.5 µm and above, per 0.1 L of air.
    pub count_2_5um: u16,
    /// Particles of 5.0 µm and above, per 0.1 L of air.
    pub count_5_0um: u16,
    /// Particles of 10 µm and above, per 0.1 L of air.
    pub count_10um: u16,
    /// PM2.5 derived from particle counts, see [`pm2_5_estimate`].
    pub pm2_5_estimate: f64,
}

impl Reading {
    /// Decodes the twelve big-endian words of a validated frame.
    pub(crate) fn from_frame(frame: &[u8], timestamp: u64) -> Reading {
        let mut words = [0u16; 12];
        for (word, chunk) in words
            .iter_mut()
            .zip(frame[PAYLOAD_START..PAYLOAD_END].chunks_exact(2))
        {
            *word = u16::from_be_bytes([chunk[0], chunk[1]]);
        }

        let [pm1_0_cf1, pm2_5_cf1, pm10_cf1, pm1_0_atm, pm2_5_atm, pm10_atm, count_0_3um, count_0_5um, count_1_0um, count_2_5um, count_5_0um, count_10um] =
            words;

        Reading {
            timestamp,
            pm1_0_cf1,
            pm2_5_cf1,
            pm10_cf1,
            pm1_0_atm,
            pm2_5_atm,
            pm10_atm,
            count_0_3um,
            count_0_5um,
            count_1_0um,
            count_2_5um,
            count_5_0um,
            count_10um,
            pm2_5_estimate: pm2_5_estimate(count_0_3um, count_2_5um),
        }
    }
}

/// Rough PM2.5 mass concentration (µg/m³) computed from particle counts.
///
/// This is an approximation, not a calibrated measurement. Every particle
/// between 0.3 and 2.5 µm is treated as a sphere of radius 0.44 µm with a
/// density of 1.65e12 µg/m³; counts are per 0.1 L and scaled to a cubic metre.
/// The result is rounded to one decimal place. A 2.5 µm count larger than the
/// 0.3 µm count yields zero.
pub fn pm2_5_estimate(count_0_3um: u16, count_2_5um: u16) -> f64 {
    let count = f64::from(count_0_3um.saturating_sub(count_2_5um));
    let volume = (4.0 / 3.0) * PI * PARTICLE_RADIUS_M * PARTICLE_RADIUS_M * PARTICLE_RADIUS_M;
    let mass = volume * PARTICLE_DENSITY;
    libm::round(mass * 10.0 * 1000.0 * count * 10.0) / 10.0
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{:.1}",
            self.timestamp,
            self.pm1_0_cf1,
            self.pm2_5_cf1,
            self.pm10_cf1,
            self.pm1_0_atm,
            self.pm2_5_atm,
            self.pm10_atm,
            self.count_0_3um,
            self.count_0_5um,
            self.count_1_0um,
            self.count_2_5um,
            self.count_5_0um,
            self.count_10um,
            self.pm2_5_estimate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_payload(payload: &[u8; 24]) -> [u8; 32] {
        let mut frame = [0u8; 32];
        frame[PAYLOAD_START..PAYLOAD_END].copy_from_slice(payload);
        frame
    }

    #[test]
    fn test_fields_decode_in_declared_order() {
        let payload = [
            0x00, 0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x04, 0x00, 0x05, 0x00, 0x06, 0x00, 0x07,
            0x00, 0x08, 0x00, 0x09, 0x00, 0x0A, 0x00, 0x0B, 0x00, 0x0C,
        ];
        let reading = Reading::from_frame(&frame_with_payload(&payload), 7);

        assert_eq!(reading.timestamp, 7);
        assert_eq!(
            [
                reading.pm1_0_cf1,
                reading.pm2_5_cf1,
                reading.pm10_cf1,
                reading.pm1_0_atm,
                reading.pm2_5_atm,
                reading.pm10_atm,
                reading.count_0_3um,
                reading.count_0_5um,
                reading.count_1_0um,
                reading.count_2_5um,
                reading.count_5_0um,
                reading.count_10um,
            ],
            [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]
        );
    }

    #[test]
    fn test_words_are_big_endian() {
        let mut payload = [0u8; 24];
        payload[0] = 0x12;
        payload[1] = 0x34;
        let reading = Reading::from_frame(&frame_with_payload(&payload), 0);
        assert_eq!(reading.pm1_0_cf1, 0x1234);
    }

    #[test]
    fn test_pm2_5_estimate() {
        assert_eq!(pm2_5_estimate(0, 0), 0.0);
        assert_eq!(pm2_5_estimate(1000, 0), 5.9);
        assert_eq!(pm2_5_estimate(10_300, 300), 58.9);
        assert_eq!(pm2_5_estimate(5, 50), 0.0);
    }

    #[test]
    fn test_csv_line() {
        let mut payload = [0u8; 24];
        payload[13] = 100;
        let reading = Reading::from_frame(&frame_with_payload(&payload), 1_554_500_000);
        assert_eq!(
            reading.to_string(),
            "1554500000,0,0,0,0,0,0,100,0,0,0,0,0,0.6"
        );
        assert_eq!(CSV_HEADER.split(',').count(), reading.to_string().split(',').count());
    }
}
