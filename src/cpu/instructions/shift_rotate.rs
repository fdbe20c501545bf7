// Shift and rotate instructions for 6502 CPU
//
// Each works on the accumulator or on memory, depending on the addressing
// mode; `modify_operand` writes the result back to the right place.

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    /// ASL - Arithmetic shift left; bit 7 goes to carry
    pub fn asl(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        self.modify_operand(bus, operand, |cpu, value| {
            cpu.set_carry(value & 0x80 != 0);
            value << 1
        });
    }

    /// LSR - Logical shift right; bit 0 goes to carry
    pub fn lsr(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        self.modify_operand(bus, operand, |cpu, value| {
            cpu.set_carry(value & 0x01 != 0);
            value >> 1
        });
    }

    /// ROL - Rotate left through carry
    pub fn rol(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        self.modify_operand(bus, operand, |cpu, value| {
            let carry_in = cpu.get_carry() as u8;
            cpu.set_carry(value & 0x80 != 0);
            (value << 1) | carry_in
        });
    }

    /// ROR - Rotate right through carry
    pub fn ror(&mut self, bus: &mut Bus, operand: &AddressingResult) {
        self.modify_operand(bus, operand, |cpu, value| {
            let carry_in = (cpu.get_carry() as u8) << 7;
            cpu.set_carry(value & 0x01 != 0);
            (value >> 1) | carry_in
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::addressing::AddressingResult;
    use crate::cpu::instructions::test_support::{bus_with, mem};
    use crate::cpu::Cpu;

    fn accumulator(cpu: &Cpu) -> AddressingResult {
        AddressingResult::immediate(cpu.a)
    }

    #[test]
    fn test_asl_accumulator() {
        let mut cpu = Cpu::new();
        let mut bus = bus_with(&[]);
        cpu.a = 0x81;
        let operand = accumulator(&cpu);

        cpu.asl(&mut bus, &operand);

        assert_eq!(cpu.a, 0x02);
        assert!(cpu.get_carry());
        assert!(!cpu.get_negative());
    }

    #[test]
    fn test_lsr_memory() {
        let mut cpu = Cpu::new();
        let mut bus = bus_with(&[(0x0030, 0x01)]);

        cpu.lsr(&mut bus, &mem(0x0030));

        assert_eq!(bus.read(0x0030), 0x00);
        assert!(cpu.get_carry());
        assert!(cpu.get_zero());
        assert_eq!(cpu.a, 0, "memory form leaves A untouched");
    }

    #[test]
    fn test_rol_uses_carry_in() {
        let mut cpu = Cpu::new();
        let mut bus = bus_with(&[(0x0030, 0x40)]);
        cpu.set_carry(true);

        cpu.rol(&mut bus, &mem(0x0030));

        assert_eq!(bus.read(0x0030), 0x81);
        assert!(!cpu.get_carry());
        assert!(cpu.get_negative());
    }

    #[test]
    fn test_ror_accumulator() {
        let mut cpu = Cpu::new();
        let mut bus = bus_with(&[]);
        cpu.a = 0x01;
        cpu.set_carry(true);
        let operand = accumulator(&cpu);

        cpu.ror(&mut bus, &operand);

        assert_eq!(cpu.a, 0x80);
        assert!(cpu.get_carry());
        assert!(cpu.get_negative());
    }
}
