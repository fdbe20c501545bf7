// Load and Store instructions for 6502 CPU

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    // ========================================
    // Load Instructions
    // ========================================
    // Loads update the Zero (Z) and Negative (N) flags.

    /// LDA - Load Accumulator
    ///
    /// Flags affected: Z, N
    pub fn lda(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        self.a = self.read_operand(bus, operand);
        self.update_zero_and_negative_flags(self.a);
    }

    /// LDX - Load X Register
    ///
    /// Flags affected: Z, N
    pub fn ldx(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        self.x = self.read_operand(bus, operand);
        self.update_zero_and_negative_flags(self.x);
    }

    /// LDY - Load Y Register
    ///
    /// Flags affected: Z, N
    pub fn ldy(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        self.y = self.read_operand(bus, operand);
        self.update_zero_and_negative_flags(self.y);
    }

    // ========================================
    // Store Instructions
    // ========================================
    // Stores never touch the flags.

    /// STA - Store Accumulator
    pub fn sta(&self, bus: &mut Bus, operand: &AddressingResult) {
        bus.write(operand.address, self.a);
    }

    /// STX - Store X Register
    pub fn stx(&self, bus: &mut Bus, operand: &AddressingResult) {
        bus.write(operand.address, self.x);
    }

    /// STY - Store Y Register
    pub fn sty(&self, bus: &mut Bus, operand: &AddressingResult) {
        bus.write(operand.address, self.y);
    }
}
