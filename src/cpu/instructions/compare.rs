// Compare instructions for 6502 CPU

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    /// Compare `register` with the operand
    ///
    /// C = register >= M; Z and N come from register - M.
    fn compare(&mut self, register: u8, bus: &mut Bus, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand);
        self.set_carry(register >= value);
        self.update_zero_and_negative_flags(register.wrapping_sub(value));
    }

    /// CMP - Compare accumulator
    pub fn cmp(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        self.compare(self.a, bus, operand);
    }

    /// CPX - Compare X register
    pub fn cpx(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        self.compare(self.x, bus, operand);
    }

    /// CPY - Compare Y register
    pub fn cpy(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        self.compare(self.y, bus, operand);
    }
}
