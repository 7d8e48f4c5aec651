use crate::sensirion::Cmd;

// Air quality signals
pub const IAQ_INIT: Cmd = [0x20, 0x03];
pub const MEASURE_IAQ: Cmd = [0x20, 0x08];
pub const MEASURE_RAW: Cmd = [0x20, 0x50];
pub const MEASURE_TEST: Cmd = [0x20, 0x32];

// Baselines
pub const GET_IAQ_BASELINE: Cmd = [0x20, 0x15];
pub const SET_IAQ_BASELINE: Cmd = [0x20, 0x1e];
pub const GET_TVOC_INCEPTIVE_BASELINE: Cmd = [0x20, 0xb3];
pub const SET_TVOC_BASELINE: Cmd = [0x20, 0x77];

// Humidity compensation
pub const SET_ABSOLUTE_HUMIDITY: Cmd = [0x20, 0x61];

// Identification
pub const GET_FEATURE_SET: Cmd = [0x20, 0x2f];
pub const GET_SERIAL_ID: Cmd = [0x36, 0x82];

/// Sent to the I2C general call address rather than as a framed command.
pub const SOFT_RESET: u8 = 0x06;

// Maximum execution times from the datasheet, in milliseconds.
pub const IAQ_INIT_DELAY_MS: u32 = 10;
pub const MEASURE_IAQ_DELAY_MS: u32 = 12;
pub const MEASURE_RAW_DELAY_MS: u32 = 25;
pub const MEASURE_TEST_DELAY_MS: u32 = 220;
pub const BASELINE_DELAY_MS: u32 = 10;
pub const SET_ABSOLUTE_HUMIDITY_DELAY_MS: u32 = 10;
pub const GET_FEATURE_SET_DELAY_MS: u32 = 10;
pub const GET_SERIAL_ID_DELAY_MS: u32 = 10;
pub const RAW_REGISTER_DELAY_MS: u32 = 20;

/// Result of `MEASURE_TEST` when every on-chip test passed.
pub const MEASURE_TEST_PASSED: u16 = 0xd400;
