// Jump, subroutine and interrupt-return instructions for 6502 CPU

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::{flags, Cpu, IRQ_VECTOR};

impl Cpu {
    /// JMP - Jump (absolute or indirect)
    pub fn jmp(&mut self, operand: &AddressingResult) {
        self.pc = operand.address;
    }

    /// JSR - Jump to subroutine
    ///
    /// Pushes the address of the last byte of the JSR instruction.
    pub fn jsr(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        let return_addr = self.pc.wrapping_sub(1);
        self.stack_push_u16(bus, return_addr);
        self.pc = operand.address;
    }

    /// RTS - Return from subroutine
    pub fn rts(&mut self, bus: &mut Bus) {
        self.pc = self.stack_pop_u16(bus).wrapping_add(1);
    }

    /// BRK - Software interrupt
    ///
    /// Skips a padding byte, pushes PC and status with B set, sets I and
    /// jumps through the IRQ vector.
    pub fn brk(&mut self, bus: &mut Bus) {
        let return_addr = self.pc.wrapping_add(1);
        self.stack_push_u16(bus, return_addr);
        self.stack_push(bus, self.status | flags::BREAK | flags::UNUSED);
        self.set_interrupt_disable(true);
        self.pc = bus.read_u16(IRQ_VECTOR);
    }

    /// RTI - Return from interrupt
    ///
    /// B is discarded and U forced on when status is pulled.
    pub fn rti(&mut self, bus: &mut Bus) {
        let status = self.stack_pop(bus);
        self.status = (status & !flags::BREAK) | flags::UNUSED;
        self.pc = self.stack_pop_u16(bus);
    }
}
