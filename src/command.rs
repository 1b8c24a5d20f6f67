use core::str::FromStr;

use crate::{Error, CMD_CHANGE_MODE, CMD_READ_PASSIVE, CMD_SLEEP_WAKEUP, COMMAND_LEN, SYNC};

/// Commands understood by the PMS7003.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Stop the fan and laser.
    Sleep,
    /// Start the fan and laser.
    WakeUp,
    /// Stream frames continuously.
    ActiveMode,
    /// Only answer explicit read requests.
    PassiveMode,
    /// Request one frame while in passive mode.
    ReadPassiveRequest,
}

impl Command {
    /// Opcode and two argument bytes.
    pub fn opcode(&self) -> [u8; 3] {
        match self {
            Self::Sleep => [CMD_SLEEP_WAKEUP, 0x00, 0x00],
            Self::WakeUp => [CMD_SLEEP_WAKEUP, 0x00, 0x01],
            Self::ActiveMode => [CMD_CHANGE_MODE, 0x00, 0x01],
            Self::PassiveMode => [CMD_CHANGE_MODE, 0x00, 0x00],
            Self::ReadPassiveRequest => [CMD_READ_PASSIVE, 0x00, 0x00],
        }
    }

    /// Builds the 7-byte wire form: sync, opcode, arguments, then the
    /// big-endian sum of the five preceding bytes.
    pub fn encode(&self) -> [u8; COMMAND_LEN] {
        let [op, arg_h, arg_l] = self.opcode();
        let mut frame = [SYNC[0], SYNC[1], op, arg_h, arg_l, 0x00, 0x00];
        let checksum = frame[..5]
            .iter()
            .fold(0u16, |sum, &b| sum.wrapping_add(u16::from(b)));
        frame[5..].copy_from_slice(&checksum.to_be_bytes());
        frame
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sleep" => Ok(Self::Sleep),
            "wakeup" => Ok(Self::WakeUp),
            "active" => Ok(Self::ActiveMode),
            "passive" => Ok(Self::PassiveMode),
            "read_passive" => Ok(Self::ReadPassiveRequest),
            _ => {
                log::error!("Unrecognized command mode {:?}", s);
                Err(Error::InvalidMode)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_matches_datasheet_frames() {
        assert_eq!(
            Command::ReadPassiveRequest.encode(),
            [0x42, 0x4D, 0xE2, 0x00, 0x00, 0x01, 0x71]
        );
        assert_eq!(
            Command::Sleep.encode(),
            [0x42, 0x4D, 0xE4, 0x00, 0x00, 0x01, 0x73]
        );
        assert_eq!(
            Command::WakeUp.encode(),
            [0x42, 0x4D, 0xE4, 0x00, 0x01, 0x01, 0x74]
        );
        assert_eq!(
            Command::ActiveMode.encode(),
            [0x42, 0x4D, 0xE1, 0x00, 0x01, 0x01, 0x71]
        );
        assert_eq!(
            Command::PassiveMode.encode(),
            [0x42, 0x4D, 0xE1, 0x00, 0x00, 0x01, 0x70]
        );
    }

    #[test]
    fn test_checksum_covers_prefix() {
        for command in [
            Command::Sleep,
            Command::WakeUp,
            Command::ActiveMode,
            Command::PassiveMode,
            Command::ReadPassiveRequest,
        ] {
            let frame = command.encode();
            let sum: u16 = frame[..5].iter().map(|&b| u16::from(b)).sum();
            assert_eq!(u16::from_be_bytes([frame[5], frame[6]]), sum);
            assert_eq!(&frame[2..5], &command.opcode());
        }
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("sleep".parse::<Command>(), Ok(Command::Sleep));
        assert_eq!("wakeup".parse::<Command>(), Ok(Command::WakeUp));
        assert_eq!("active".parse::<Command>(), Ok(Command::ActiveMode));
        assert_eq!("passive".parse::<Command>(), Ok(Command::PassiveMode));
        assert_eq!(
            "read_passive".parse::<Command>(),
            Ok(Command::ReadPassiveRequest)
        );
        assert_eq!("turbo".parse::<Command>(), Err(Error::InvalidMode));
        assert_eq!("".parse::<Command>(), Err(Error::InvalidMode));
    }
}
