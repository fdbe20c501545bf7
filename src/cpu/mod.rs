// CPU module - 6502 processor implementation
//
// The CPU executes whole instructions against the `Bus`. Interrupt lines are
// sampled at instruction boundaries only, so the CPU is always stopped
// between complete instructions when control returns to the caller.
//
// # Submodules
//
// - `addressing`: the 13 addressing modes and page-cross detection
// - `opcodes`: the 256-entry opcode table (mnemonic, mode, length, cycles)
// - `execute`: fetch/decode/dispatch, interrupt entry and trace output
// - `instructions`: instruction semantics grouped by kind

pub mod addressing;
mod execute;
mod instructions;
pub mod opcodes;

use crate::bus::Bus;

/// NTSC CPU clock rate in Hz
pub const CPU_FREQUENCY: u64 = 1_789_773;

/// Cycles charged for reset and for interrupt entry
pub const INTERRUPT_CYCLES: u8 = 7;

/// NMI vector address
pub const NMI_VECTOR: u16 = 0xFFFA;
/// Reset vector address
pub const RESET_VECTOR: u16 = 0xFFFC;
/// IRQ/BRK vector address
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Processor Status Flags (P register)
///
/// Bit layout:
/// ```text
/// 7  6  5  4  3  2  1  0
/// N  V  -  B  D  I  Z  C
/// ```
pub mod flags {
    pub const CARRY: u8 = 0b0000_0001; // Bit 0: C
    pub const ZERO: u8 = 0b0000_0010; // Bit 1: Z
    pub const INTERRUPT_DISABLE: u8 = 0b0000_0100; // Bit 2: I
    pub const DECIMAL: u8 = 0b0000_1000; // Bit 3: D (no effect on the 2A03)
    pub const BREAK: u8 = 0b0001_0000; // Bit 4: B
    pub const UNUSED: u8 = 0b0010_0000; // Bit 5: - (always 1)
    pub const OVERFLOW: u8 = 0b0100_0000; // Bit 6: V
    pub const NEGATIVE: u8 = 0b1000_0000; // Bit 7: N
}

/// CPU structure representing the 6502 processor state
#[derive(Debug, Clone)]
pub struct Cpu {
    // Registers
    pub a: u8,      // Accumulator
    pub x: u8,      // Index Register X
    pub y: u8,      // Index Register Y
    pub sp: u8,     // Stack Pointer
    pub pc: u16,    // Program Counter
    pub status: u8, // Processor Status flags

    /// Total cycles executed since reset
    pub cycles: u64,

    /// NMI edge latched, serviced at the next instruction boundary
    nmi_pending: bool,
    /// Level of the IRQ input
    irq_line: bool,
    /// Emit a trace line before each instruction
    trace_enabled: bool,
}

impl Cpu {
    /// Create a new CPU instance in the power-on state
    ///
    /// SP is $FD and status is $24 (I and the unused bit set). PC stays 0
    /// until `reset` loads the reset vector.
    pub fn new() -> Self {
        Cpu {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0,
            status: flags::UNUSED | flags::INTERRUPT_DISABLE,
            cycles: 0,
            nmi_pending: false,
            irq_line: false,
            trace_enabled: false,
        }
    }

    /// Reset the CPU
    ///
    /// Loads PC from the reset vector, sets SP to $FD and clears every flag
    /// except the unused bit, so interrupts are enabled after reset. Pending
    /// interrupts are dropped and the cycle counter restarts at 7.
    pub fn reset(&mut self, bus: &mut Bus) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0xFD;
        self.status = flags::UNUSED;
        self.pc = bus.read_u16(RESET_VECTOR);
        self.cycles = INTERRUPT_CYCLES as u64;
        self.nmi_pending = false;
        self.irq_line = false;
    }

    // ========================================
    // Interrupt Lines
    // ========================================

    /// Latch an NMI edge
    pub fn trigger_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Whether an NMI is waiting for the next instruction boundary
    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    /// Drive the IRQ input level
    pub fn set_irq_line(&mut self, active: bool) {
        self.irq_line = active;
    }

    /// Current IRQ input level
    pub fn irq_line(&self) -> bool {
        self.irq_line
    }

    /// Enable or disable per-instruction trace logging
    pub fn set_trace(&mut self, enabled: bool) {
        self.trace_enabled = enabled;
    }

    // ========================================
    // Run Loops
    // ========================================

    /// Execute instructions until at least `cycles` cycles have elapsed
    ///
    /// Returns the number of cycles actually consumed, which may exceed the
    /// budget by up to one instruction.
    pub fn run_cycles(&mut self, bus: &mut Bus, cycles: u64) -> u64 {
        let mut consumed = 0;
        while consumed < cycles {
            consumed += self.step(bus) as u64;
        }
        consumed
    }

    /// Execute roughly `ms` milliseconds of CPU time at the NTSC clock rate
    pub fn run_milliseconds(&mut self, bus: &mut Bus, ms: f64) -> u64 {
        self.run_cycles(bus, milliseconds_to_cycles(ms))
    }

    // ========================================
    // Status Flag Manipulation Methods
    // ========================================

    /// Get the value of a specific flag
    #[inline]
    pub fn get_flag(&self, flag: u8) -> bool {
        (self.status & flag) != 0
    }

    /// Set or clear a flag
    #[inline]
    pub fn update_flag(&mut self, flag: u8, condition: bool) {
        if condition {
            self.status |= flag;
        } else {
            self.status &= !flag;
        }
    }

    #[inline]
    pub fn get_carry(&self) -> bool {
        self.get_flag(flags::CARRY)
    }

    #[inline]
    pub fn set_carry(&mut self, value: bool) {
        self.update_flag(flags::CARRY, value);
    }

    #[inline]
    pub fn get_zero(&self) -> bool {
        self.get_flag(flags::ZERO)
    }

    #[inline]
    pub fn get_interrupt_disable(&self) -> bool {
        self.get_flag(flags::INTERRUPT_DISABLE)
    }

    #[inline]
    pub fn set_interrupt_disable(&mut self, value: bool) {
        self.update_flag(flags::INTERRUPT_DISABLE, value);
    }

    #[inline]
    pub fn get_overflow(&self) -> bool {
        self.get_flag(flags::OVERFLOW)
    }

    #[inline]
    pub fn set_overflow(&mut self, value: bool) {
        self.update_flag(flags::OVERFLOW, value);
    }

    #[inline]
    pub fn get_negative(&self) -> bool {
        self.get_flag(flags::NEGATIVE)
    }

    /// Update Zero and Negative flags from a result byte
    #[inline]
    pub fn update_zero_and_negative_flags(&mut self, value: u8) {
        self.update_flag(flags::ZERO, value == 0);
        self.update_flag(flags::NEGATIVE, value & 0x80 != 0);
    }

    // ========================================
    // Stack
    // ========================================

    /// Push a byte onto the stack page ($0100-$01FF)
    pub(crate) fn stack_push(&mut self, bus: &mut Bus, value: u8) {
        bus.write(0x0100 | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    /// Pull a byte from the stack page
    pub(crate) fn stack_pop(&mut self, bus: &mut Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(0x0100 | self.sp as u16)
    }

    /// Push a word, high byte first
    pub(crate) fn stack_push_u16(&mut self, bus: &mut Bus, value: u16) {
        self.stack_push(bus, (value >> 8) as u8);
        self.stack_push(bus, value as u8);
    }

    /// Pull a word, low byte first
    pub(crate) fn stack_pop_u16(&mut self, bus: &mut Bus) -> u16 {
        let lo = self.stack_pop(bus) as u16;
        let hi = self.stack_pop(bus) as u16;
        (hi << 8) | lo
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert milliseconds of emulated time to CPU cycles
pub fn milliseconds_to_cycles(ms: f64) -> u64 {
    if ms <= 0.0 {
        return 0;
    }
    (ms * CPU_FREQUENCY as f64 / 1000.0) as u64
}
