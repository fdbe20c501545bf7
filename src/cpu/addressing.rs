// Addressing modes module for 6502 CPU
// Implements all 13 addressing modes used by the 6502 processor

use crate::bus::Bus;

/// Result of an addressing mode calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressingResult {
    /// The effective address where the data is located
    pub address: u16,

    /// Whether indexing crossed a page boundary
    pub page_crossed: bool,

    /// The operand value for immediate and accumulator modes
    pub value: Option<u8>,
}

impl AddressingResult {
    /// Result pointing at a memory address
    pub fn new(address: u16) -> Self {
        Self {
            address,
            page_crossed: false,
            value: None,
        }
    }

    /// Result carrying an inline operand
    pub fn immediate(value: u8) -> Self {
        Self {
            address: 0,
            page_crossed: false,
            value: Some(value),
        }
    }

    /// Set the page_crossed flag
    pub fn with_page_cross(mut self, crossed: bool) -> Self {
        self.page_crossed = crossed;
        self
    }
}

/// Addressing modes supported by the 6502
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// Implied - No operand (e.g., CLC, NOP)
    Implied,
    /// Accumulator - Operate on accumulator (e.g., LSR A)
    Accumulator,
    /// Immediate - 8-bit constant (e.g., LDA #$01)
    Immediate,
    /// Zero Page - Address in zero page $00-$FF (e.g., LDA $80)
    ZeroPage,
    /// Zero Page,X - Zero page address + X register (e.g., LDA $80,X)
    ZeroPageX,
    /// Zero Page,Y - Zero page address + Y register (e.g., LDX $80,Y)
    ZeroPageY,
    /// Relative - Signed 8-bit offset for branches (e.g., BNE label)
    Relative,
    /// Absolute - 16-bit address (e.g., LDA $8000)
    Absolute,
    /// Absolute,X - 16-bit address + X register (e.g., LDA $8000,X)
    AbsoluteX,
    /// Absolute,Y - 16-bit address + Y register (e.g., LDA $8000,Y)
    AbsoluteY,
    /// Indirect - 16-bit pointer (JMP only) (e.g., JMP ($FFFC))
    Indirect,
    /// Indexed Indirect - Zero page pointer + X (e.g., LDA ($40,X))
    IndexedIndirect,
    /// Indirect Indexed - Zero page pointer + Y (e.g., LDA ($40),Y)
    IndirectIndexed,
}

impl AddressingMode {
    /// Instruction length in bytes, opcode included
    pub const fn instruction_len(self) -> u8 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 3,
            _ => 2,
        }
    }
}

#[inline]
fn page_crossed(base: u16, addr: u16) -> bool {
    (base & 0xFF00) != (addr & 0xFF00)
}

/// Read a pointer from zero page; the high byte wraps within page 0
#[inline]
pub(crate) fn read_zero_page_pointer(bus: &mut Bus, ptr: u8) -> u16 {
    let lo = bus.read(ptr as u16) as u16;
    let hi = bus.read(ptr.wrapping_add(1) as u16) as u16;
    (hi << 8) | lo
}

/// Address of the high byte of a `JMP ($xxFF)` pointer
///
/// The 6502 does not carry into the high byte, so it wraps to $xx00.
#[inline]
pub(crate) fn indirect_high_address(ptr: u16) -> u16 {
    (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF)
}

impl super::Cpu {
    /// Fetch the byte at PC and advance PC
    #[inline]
    fn fetch_byte(&mut self, bus: &mut Bus) -> u8 {
        let value = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    /// Fetch a little-endian word at PC and advance PC by two
    #[inline]
    fn fetch_word(&mut self, bus: &mut Bus) -> u16 {
        let lo = self.fetch_byte(bus) as u16;
        let hi = self.fetch_byte(bus) as u16;
        (hi << 8) | lo
    }

    /// Resolve the operand for `mode`, advancing PC past the operand bytes
    pub fn resolve_operand(&mut self, mode: AddressingMode, bus: &mut Bus) -> AddressingResult {
        match mode {
            AddressingMode::Implied => AddressingResult::new(0),
            AddressingMode::Accumulator => AddressingResult::immediate(self.a),
            AddressingMode::Immediate => AddressingResult::immediate(self.fetch_byte(bus)),
            AddressingMode::ZeroPage => AddressingResult::new(self.fetch_byte(bus) as u16),
            AddressingMode::ZeroPageX => {
                // Wraps within zero page: $FF + 2 = $01
                let base = self.fetch_byte(bus);
                AddressingResult::new(base.wrapping_add(self.x) as u16)
            }
            AddressingMode::ZeroPageY => {
                let base = self.fetch_byte(bus);
                AddressingResult::new(base.wrapping_add(self.y) as u16)
            }
            AddressingMode::Relative => {
                let offset = self.fetch_byte(bus) as i8;
                let target = self.pc.wrapping_add(offset as u16);
                AddressingResult::new(target).with_page_cross(page_crossed(self.pc, target))
            }
            AddressingMode::Absolute => AddressingResult::new(self.fetch_word(bus)),
            AddressingMode::AbsoluteX => {
                let base = self.fetch_word(bus);
                let addr = base.wrapping_add(self.x as u16);
                AddressingResult::new(addr).with_page_cross(page_crossed(base, addr))
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch_word(bus);
                let addr = base.wrapping_add(self.y as u16);
                AddressingResult::new(addr).with_page_cross(page_crossed(base, addr))
            }
            AddressingMode::Indirect => {
                let ptr = self.fetch_word(bus);
                let lo = bus.read(ptr) as u16;
                let hi = bus.read(indirect_high_address(ptr)) as u16;
                AddressingResult::new((hi << 8) | lo)
            }
            AddressingMode::IndexedIndirect => {
                let base = self.fetch_byte(bus);
                let ptr = base.wrapping_add(self.x);
                AddressingResult::new(read_zero_page_pointer(bus, ptr))
            }
            AddressingMode::IndirectIndexed => {
                let ptr = self.fetch_byte(bus);
                let base = read_zero_page_pointer(bus, ptr);
                let addr = base.wrapping_add(self.y as u16);
                AddressingResult::new(addr).with_page_cross(page_crossed(base, addr))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::Cpu;

    /// Helper function to create a test bus with data
    fn create_test_bus(data: &[(u16, u8)]) -> Bus {
        let mut bus = Bus::new();
        for &(addr, value) in data {
            bus.write(addr, value);
        }
        bus
    }

    fn cpu_at(pc: u16) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.pc = pc;
        cpu
    }

    #[test]
    fn test_immediate_advances_pc() {
        let mut cpu = cpu_at(0x0100);
        let mut bus = create_test_bus(&[(0x0100, 0x42)]);
        let result = cpu.resolve_operand(AddressingMode::Immediate, &mut bus);
        assert_eq!(result.value, Some(0x42));
        assert_eq!(cpu.pc, 0x0101);
    }

    #[test]
    fn test_accumulator_carries_a() {
        let mut cpu = cpu_at(0x0100);
        cpu.a = 0x99;
        let mut bus = Bus::new();
        let result = cpu.resolve_operand(AddressingMode::Accumulator, &mut bus);
        assert_eq!(result.value, Some(0x99));
        assert_eq!(cpu.pc, 0x0100);
    }

    #[test]
    fn test_zero_page_x_wraps() {
        let mut cpu = cpu_at(0x0100);
        cpu.x = 0x10;
        let mut bus = create_test_bus(&[(0x0100, 0xFF)]);
        let result = cpu.resolve_operand(AddressingMode::ZeroPageX, &mut bus);
        assert_eq!(result.address, 0x000F);
    }

    #[test]
    fn test_zero_page_y_wraps() {
        let mut cpu = cpu_at(0x0100);
        cpu.y = 0x02;
        let mut bus = create_test_bus(&[(0x0100, 0xFF)]);
        let result = cpu.resolve_operand(AddressingMode::ZeroPageY, &mut bus);
        assert_eq!(result.address, 0x0001);
    }

    #[test]
    fn test_absolute_little_endian() {
        let mut cpu = cpu_at(0x0100);
        let mut bus = create_test_bus(&[(0x0100, 0x34), (0x0101, 0x12)]);
        let result = cpu.resolve_operand(AddressingMode::Absolute, &mut bus);
        assert_eq!(result.address, 0x1234);
        assert_eq!(cpu.pc, 0x0102);
    }

    #[test]
    fn test_absolute_x_page_cross() {
        let mut cpu = cpu_at(0x0100);
        cpu.x = 0x01;
        let mut bus = create_test_bus(&[(0x0100, 0xFF), (0x0101, 0x02)]);
        let result = cpu.resolve_operand(AddressingMode::AbsoluteX, &mut bus);
        assert_eq!(result.address, 0x0300);
        assert!(result.page_crossed);
    }

    #[test]
    fn test_absolute_y_same_page() {
        let mut cpu = cpu_at(0x0100);
        cpu.y = 0x10;
        let mut bus = create_test_bus(&[(0x0100, 0x00), (0x0101, 0x02)]);
        let result = cpu.resolve_operand(AddressingMode::AbsoluteY, &mut bus);
        assert_eq!(result.address, 0x0210);
        assert!(!result.page_crossed);
    }

    #[test]
    fn test_indirect_page_wrap_quirk() {
        let mut cpu = cpu_at(0x0100);
        let mut bus = create_test_bus(&[
            (0x0100, 0xFF),
            (0x0101, 0x02),
            (0x02FF, 0x34),
            (0x0200, 0x12),
            (0x0300, 0x56),
        ]);
        let result = cpu.resolve_operand(AddressingMode::Indirect, &mut bus);
        assert_eq!(result.address, 0x1234, "high byte read from $0200, not $0300");
    }

    #[test]
    fn test_indexed_indirect_wraps_pointer() {
        let mut cpu = cpu_at(0x0100);
        cpu.x = 0x01;
        let mut bus = create_test_bus(&[(0x0100, 0xFE), (0x00FF, 0x34), (0x0000, 0x12)]);
        let result = cpu.resolve_operand(AddressingMode::IndexedIndirect, &mut bus);
        assert_eq!(result.address, 0x1234);
    }

    #[test]
    fn test_indirect_indexed_page_cross() {
        let mut cpu = cpu_at(0x0100);
        cpu.y = 0x10;
        let mut bus = create_test_bus(&[(0x0100, 0x40), (0x0040, 0xF8), (0x0041, 0x03)]);
        let result = cpu.resolve_operand(AddressingMode::IndirectIndexed, &mut bus);
        assert_eq!(result.address, 0x0408);
        assert!(result.page_crossed);
    }

    #[test]
    fn test_relative_backward_branch() {
        let mut cpu = cpu_at(0x0100);
        let mut bus = create_test_bus(&[(0x0100, 0xFC)]); // -4
        let result = cpu.resolve_operand(AddressingMode::Relative, &mut bus);
        assert_eq!(result.address, 0x00FD);
        assert!(result.page_crossed);
    }

    #[test]
    fn test_instruction_lengths() {
        assert_eq!(AddressingMode::Implied.instruction_len(), 1);
        assert_eq!(AddressingMode::IndirectIndexed.instruction_len(), 2);
        assert_eq!(AddressingMode::Indirect.instruction_len(), 3);
    }
}
