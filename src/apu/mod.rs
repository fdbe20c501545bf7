// APU module - Audio unit seen from the CPU bus
//
// The emulator does not synthesize samples. Instead the host polls each
// channel's type, volume, frequency and duty ratio once per frame and drives
// its own oscillators. `RegisterApu` derives those values from the channel
// registers ($4000-$400F) and the enable mask ($4015).

pub mod constants;

use crate::bus::MemoryMappedDevice;
use constants::{CPU_CLOCK_HZ, DUTY_RATIOS, MIN_PULSE_PERIOD, NOISE_PERIOD_TABLE};

/// Waveform family of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelType {
    /// Square wave with a selectable duty
    Pulse,
    /// Fixed-shape triangle wave
    Triangle,
    /// Pseudo-random noise
    Noise,
}

/// Audio unit mapped at $4000-$4017
///
/// Channel indices follow `channel_types()`. Queries for an index beyond the
/// channel list return 0.
pub trait AudioUnit: MemoryMappedDevice {
    /// Waveform of each channel, in index order
    fn channel_types(&self) -> &[ChannelType];

    /// Output level of channel `ch` (0.0 - 1.0)
    fn volume(&self, ch: usize) -> f32;

    /// Tone frequency of channel `ch` in Hz
    fn frequency(&self, ch: usize) -> f32;

    /// High-time fraction of channel `ch` (0.0 - 1.0)
    fn duty_ratio(&self, ch: usize) -> f32;

    /// Return all registers to their power-on state
    fn reset(&mut self);
}

const CHANNELS: [ChannelType; 4] = [
    ChannelType::Pulse,
    ChannelType::Pulse,
    ChannelType::Triangle,
    ChannelType::Noise,
];

/// Register-level audio unit
#[derive(Debug, Clone, Default)]
pub struct RegisterApu {
    /// Raw channel registers $4000-$400F
    regs: [u8; 16],
    /// $4015 enable bits (pulse 1, pulse 2, triangle, noise)
    enabled: u8,
    /// Channels whose length counter was loaded while enabled
    playing: u8,
}

impl RegisterApu {
    /// Create an APU with every channel silent
    pub fn new() -> Self {
        Self::default()
    }

    fn channel_regs(&self, ch: usize) -> &[u8] {
        &self.regs[ch * 4..ch * 4 + 4]
    }

    /// 11-bit timer period of a pulse or triangle channel
    fn timer_period(&self, ch: usize) -> u16 {
        let r = self.channel_regs(ch);
        ((r[3] as u16 & 0x07) << 8) | r[2] as u16
    }

    fn is_playing(&self, ch: usize) -> bool {
        self.playing & (1 << ch) != 0
    }

    /// Constant volume or envelope period, as a 0-1 level
    fn envelope_level(&self, ch: usize) -> f32 {
        (self.channel_regs(ch)[0] & 0x0F) as f32 / 15.0
    }
}

impl MemoryMappedDevice for RegisterApu {
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x4015 => self.playing & 0x0F,
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x4000..=0x400F => {
                let index = (addr - 0x4000) as usize;
                self.regs[index] = data;
                let ch = index / 4;
                if index % 4 == 3 && self.enabled & (1 << ch) != 0 {
                    self.playing |= 1 << ch;
                }
            }
            0x4015 => {
                self.enabled = data & 0x0F;
                self.playing &= self.enabled;
            }
            // DMC and frame counter writes have no audible effect here
            _ => {}
        }
    }
}

impl AudioUnit for RegisterApu {
    fn channel_types(&self) -> &[ChannelType] {
        &CHANNELS
    }

    fn volume(&self, ch: usize) -> f32 {
        if ch >= CHANNELS.len() || !self.is_playing(ch) {
            return 0.0;
        }
        match CHANNELS[ch] {
            ChannelType::Pulse => {
                if self.timer_period(ch) < MIN_PULSE_PERIOD {
                    0.0
                } else {
                    self.envelope_level(ch)
                }
            }
            ChannelType::Triangle => {
                // Linear counter reload of 0 mutes the channel
                if self.channel_regs(ch)[0] & 0x7F == 0 {
                    0.0
                } else {
                    1.0
                }
            }
            ChannelType::Noise => self.envelope_level(ch),
        }
    }

    fn frequency(&self, ch: usize) -> f32 {
        if ch >= CHANNELS.len() {
            return 0.0;
        }
        let hz = match CHANNELS[ch] {
            ChannelType::Pulse => CPU_CLOCK_HZ / (16.0 * (self.timer_period(ch) as f64 + 1.0)),
            ChannelType::Triangle => {
                CPU_CLOCK_HZ / (32.0 * (self.timer_period(ch) as f64 + 1.0))
            }
            ChannelType::Noise => {
                let period = NOISE_PERIOD_TABLE[(self.channel_regs(ch)[2] & 0x0F) as usize];
                CPU_CLOCK_HZ / period as f64
            }
        };
        hz as f32
    }

    fn duty_ratio(&self, ch: usize) -> f32 {
        match CHANNELS.get(ch) {
            Some(ChannelType::Pulse) => DUTY_RATIOS[(self.channel_regs(ch)[0] >> 6) as usize],
            Some(_) => 0.5,
            None => 0.0,
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
