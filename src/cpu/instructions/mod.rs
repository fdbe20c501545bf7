// Instructions module for 6502 CPU
// This module organizes CPU instructions by semantic grouping

mod arithmetic;
mod branch;
mod compare;
mod jump_subroutine;
mod load_store;
mod logic;
mod shift_rotate;
mod stack;
mod transfer;

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;

impl crate::cpu::Cpu {
    /// Read the operand of an instruction
    ///
    /// Immediate and accumulator operands are carried in the addressing
    /// result; everything else is read from the bus.
    #[inline]
    pub(crate) fn read_operand(&self, bus: &mut Bus, operand: &AddressingResult) -> u8 {
        match operand.value {
            Some(value) => value,
            None => bus.read(operand.address),
        }
    }

    /// Read-modify-write an operand, storing the result back to A or memory
    pub(crate) fn modify_operand(
        &mut self,
        bus: &mut Bus,
        operand: &AddressingResult,
        op: impl FnOnce(&mut Self, u8) -> u8,
    ) {
        let value = self.read_operand(bus, operand);
        let result = op(self, value);
        if operand.value.is_some() {
            self.a = result;
        } else {
            bus.write(operand.address, result);
        }
        self.update_zero_and_negative_flags(result);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::bus::Bus;
    use crate::cpu::addressing::AddressingResult;

    /// RAM-only bus preloaded with `data`
    pub fn bus_with(data: &[(u16, u8)]) -> Bus {
        let mut bus = Bus::new();
        for &(addr, value) in data {
            bus.write(addr, value);
        }
        bus
    }

    pub fn imm(value: u8) -> AddressingResult {
        AddressingResult::immediate(value)
    }

    pub fn mem(addr: u16) -> AddressingResult {
        AddressingResult::new(addr)
    }
}
