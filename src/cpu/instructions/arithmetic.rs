// Arithmetic instructions for 6502 CPU
//
// The 2A03 has no decimal mode: the D flag can be set but ADC and SBC
// always work in binary.

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    /// Binary add with carry shared by ADC and SBC
    ///
    /// Overflow is set when both inputs share a sign that the result lacks.
    fn add_to_accumulator(&mut self, value: u8) {
        let sum = self.a as u16 + value as u16 + self.get_carry() as u16;
        let result = sum as u8;
        self.set_carry(sum > 0xFF);
        self.set_overflow((self.a ^ result) & (value ^ result) & 0x80 != 0);
        self.a = result;
        self.update_zero_and_negative_flags(result);
    }

    /// ADC - Add with Carry
    ///
    /// A = A + M + C
    ///
    /// Flags affected: C, Z, V, N
    pub fn adc(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand);
        self.add_to_accumulator(value);
    }

    /// SBC - Subtract with Carry
    ///
    /// A = A - M - (1 - C), computed as A + !M + C.
    ///
    /// Flags affected: C, Z, V, N
    pub fn sbc(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand);
        self.add_to_accumulator(!value);
    }

    // ========================================
    // Increment / Decrement
    // ========================================

    /// INC - Increment Memory
    pub fn inc(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        self.modify_operand(bus, operand, |_, value| value.wrapping_add(1));
    }

    /// DEC - Decrement Memory
    pub fn dec(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        self.modify_operand(bus, operand, |_, value| value.wrapping_sub(1));
    }

    pub fn inx(&mut self) {
        self.x = self.x.wrapping_add(1);
        self.update_zero_and_negative_flags(self.x);
    }

    pub fn iny(&mut self) {
        self.y = self.y.wrapping_add(1);
        self.update_zero_and_negative_flags(self.y);
    }

    pub fn dex(&mut self) {
        self.x = self.x.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.x);
    }

    pub fn dey(&mut self) {
        self.y = self.y.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.y);
    }
}
