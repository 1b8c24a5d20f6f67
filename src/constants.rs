// SYNC is the two-byte signature that opens every command and response frame.
pub const SYNC: [u8; 2] = [0x42, 0x4D];

// FRAME_LEN is the size of a data frame sent by the sensor.
pub const FRAME_LEN: usize = 32;

// CHECKSUM_OFFSET is where the big-endian checksum starts inside a data frame.
// Everything before it is summed.
pub const CHECKSUM_OFFSET: usize = 30;

// PAYLOAD_START and PAYLOAD_END bound the twelve measurement words of a data frame.
pub const PAYLOAD_START: usize = 4;
pub const PAYLOAD_END: usize = 28;

// COMMAND_LEN is the size of a command frame sent to the sensor.
pub const COMMAND_LEN: usize = 7;

// CMD_READ_PASSIVE asks for one data frame while in passive mode.
pub const CMD_READ_PASSIVE: u8 = 0xE2;

// CMD_CHANGE_MODE switches between active (0x01) and passive (0x00) reporting.
pub const CMD_CHANGE_MODE: u8 = 0xE1;

// CMD_SLEEP_WAKEUP stops (0x00) or starts (0x01) the fan and laser.
pub const CMD_SLEEP_WAKEUP: u8 = 0xE4;

// SYNC_SCAN_LIMIT bounds how many bytes are inspected while hunting for SYNC.
pub const SYNC_SCAN_LIMIT: usize = 2 * FRAME_LEN;
