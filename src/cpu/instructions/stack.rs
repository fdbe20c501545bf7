// Stack instructions for 6502 CPU

use crate::bus::Bus;
use crate::cpu::{flags, Cpu};

impl Cpu {
    /// PHA - Push accumulator
    pub fn pha(&mut self, bus: &mut Bus) {
        self.stack_push(bus, self.a);
    }

    /// PLA - Pull accumulator
    ///
    /// Flags affected: Z, N
    pub fn pla(&mut self, bus: &mut Bus) {
        self.a = self.stack_pop(bus);
        self.update_zero_and_negative_flags(self.a);
    }

    /// PHP - Push processor status with B and U set
    pub fn php(&mut self, bus: &mut Bus) {
        self.stack_push(bus, self.status | flags::BREAK | flags::UNUSED);
    }

    /// PLP - Pull processor status
    ///
    /// B does not exist in the register, so it is dropped; U is always set.
    pub fn plp(&mut self, bus: &mut Bus) {
        let value = self.stack_pop(bus);
        self.status = (value & !flags::BREAK) | flags::UNUSED;
    }
}
