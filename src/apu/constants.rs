//! APU constants and lookup tables

/// NTSC CPU clock driving the channel timers
pub const CPU_CLOCK_HZ: f64 = 1_789_773.0;

/// High-time fraction of each pulse duty setting
pub const DUTY_RATIOS: [f32; 4] = [0.125, 0.25, 0.5, 0.75];

/// Noise channel period lookup table
/// Maps the 4-bit period value to the actual timer period (in CPU cycles)
/// NTSC values
pub const NOISE_PERIOD_TABLE: [u16; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

/// Pulse timers below this period are silenced by the sweep unit
pub const MIN_PULSE_PERIOD: u16 = 8;
