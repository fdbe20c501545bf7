// Logical instructions for 6502 CPU

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::{flags, Cpu};

impl Cpu {
    /// AND - Logical AND with accumulator
    ///
    /// Flags affected: Z, N
    pub fn and(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        self.a &= self.read_operand(bus, operand);
        self.update_zero_and_negative_flags(self.a);
    }

    /// ORA - Logical inclusive OR with accumulator
    ///
    /// Flags affected: Z, N
    pub fn ora(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        self.a |= self.read_operand(bus, operand);
        self.update_zero_and_negative_flags(self.a);
    }

    /// EOR - Exclusive OR with accumulator
    ///
    /// Flags affected: Z, N
    pub fn eor(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        self.a ^= self.read_operand(bus, operand);
        self.update_zero_and_negative_flags(self.a);
    }

    /// BIT - Bit test
    ///
    /// Z is set from A & M; N and V are copied from bits 7 and 6 of M.
    /// The accumulator is not changed.
    pub fn bit(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand);
        self.update_flag(flags::ZERO, self.a & value == 0);
        self.update_flag(flags::NEGATIVE, value & 0x80 != 0);
        self.update_flag(flags::OVERFLOW, value & 0x40 != 0);
    }
}
