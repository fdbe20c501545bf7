// Branch instructions for 6502 CPU
//
// All eight conditional branches share one implementation; the dispatcher
// evaluates the condition. The relative target is already resolved by the
// addressing mode, along with whether it lies on another page.

use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    /// Take the branch when `condition` holds
    ///
    /// # Returns
    /// Extra cycles: 0 when not taken, 1 when taken, 2 when taken to
    /// another page.
    pub fn branch(&mut self, condition: bool, operand: &AddressingResult) -> u8 {
        if !condition {
            return 0;
        }
        self.pc = operand.address;
        if operand.page_crossed {
            2
        } else {
            1
        }
    }
}
