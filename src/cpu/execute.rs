// CPU execution and trace logging module

use crate::bus::Bus;
use crate::cpu::addressing::{indirect_high_address, AddressingMode, AddressingResult};
use crate::cpu::opcodes::{OpcodeInfo, OPCODE_TABLE};
use crate::cpu::{flags, Cpu, INTERRUPT_CYCLES, IRQ_VECTOR, NMI_VECTOR};
use crate::debug::CPU_TRACE_TARGET;

impl Cpu {
    /// Execute one CPU instruction, or enter a pending interrupt
    ///
    /// NMI is checked first, then IRQ when the I flag is clear. Otherwise the
    /// next opcode is fetched, decoded and executed. A DMA transfer started by
    /// the instruction adds its stall to the returned count.
    ///
    /// # Returns
    /// The number of cycles consumed by this step
    pub fn step(&mut self, bus: &mut Bus) -> u16 {
        if self.nmi_pending {
            self.nmi_pending = false;
            return self.enter_interrupt(bus, NMI_VECTOR);
        }
        if self.irq_line && !self.get_interrupt_disable() {
            return self.enter_interrupt(bus, IRQ_VECTOR);
        }

        if self.trace_enabled && log::log_enabled!(target: CPU_TRACE_TARGET, log::Level::Trace) {
            log::trace!(target: CPU_TRACE_TARGET, "{}", self.trace(bus));
        }

        let opcode = bus.read(self.pc);
        let info = &OPCODE_TABLE[opcode as usize];
        self.pc = self.pc.wrapping_add(1);

        let operand = self.resolve_operand(info.mode, bus);

        let extra_cycles = if info.official {
            self.execute_instruction(opcode, &operand, bus)
        } else {
            log::debug!(
                "unofficial opcode ${:02X} ({}) at ${:04X} executed as NOP",
                opcode,
                info.mnemonic,
                self.pc.wrapping_sub(1)
            );
            0
        };

        let mut cycles = info.cycles as u16 + extra_cycles as u16;
        if info.page_cycle && operand.page_crossed {
            cycles += 1;
        }
        self.cycles = self.cycles.wrapping_add(cycles as u64);

        let stall = bus.take_dma_stall(self.cycles);
        self.cycles = self.cycles.wrapping_add(stall as u64);

        cycles + stall
    }

    /// Push PC and status, set I and jump through `vector`
    fn enter_interrupt(&mut self, bus: &mut Bus, vector: u16) -> u16 {
        self.stack_push_u16(bus, self.pc);
        let pushed = (self.status & !flags::BREAK) | flags::UNUSED;
        self.stack_push(bus, pushed);
        self.set_interrupt_disable(true);
        self.pc = bus.read_u16(vector);
        self.cycles = self.cycles.wrapping_add(INTERRUPT_CYCLES as u64);
        INTERRUPT_CYCLES as u16
    }

    /// Dispatch an official opcode
    ///
    /// Returns the extra cycles taken by branches.
    #[allow(clippy::too_many_lines)]
    fn execute_instruction(&mut self, opcode: u8, operand: &AddressingResult, bus: &mut Bus) -> u8 {
        match opcode {
            // Load/Store instructions
            0xA9 | 0xA5 | 0xB5 | 0xAD | 0xBD | 0xB9 | 0xA1 | 0xB1 => self.lda(bus, operand),
            0xA2 | 0xA6 | 0xB6 | 0xAE | 0xBE => self.ldx(bus, operand),
            0xA0 | 0xA4 | 0xB4 | 0xAC | 0xBC => self.ldy(bus, operand),
            0x85 | 0x95 | 0x8D | 0x9D | 0x99 | 0x81 | 0x91 => self.sta(bus, operand),
            0x86 | 0x96 | 0x8E => self.stx(bus, operand),
            0x84 | 0x94 | 0x8C => self.sty(bus, operand),

            // Arithmetic instructions
            0x69 | 0x65 | 0x75 | 0x6D | 0x7D | 0x79 | 0x61 | 0x71 => self.adc(bus, operand),
            0xE9 | 0xE5 | 0xF5 | 0xED | 0xFD | 0xF9 | 0xE1 | 0xF1 => self.sbc(bus, operand),
            0xE6 | 0xF6 | 0xEE | 0xFE => self.inc(bus, operand),
            0xC6 | 0xD6 | 0xCE | 0xDE => self.dec(bus, operand),
            0xE8 => self.inx(),
            0xC8 => self.iny(),
            0xCA => self.dex(),
            0x88 => self.dey(),

            // Logical instructions
            0x29 | 0x25 | 0x35 | 0x2D | 0x3D | 0x39 | 0x21 | 0x31 => self.and(bus, operand),
            0x09 | 0x05 | 0x15 | 0x0D | 0x1D | 0x19 | 0x01 | 0x11 => self.ora(bus, operand),
            0x49 | 0x45 | 0x55 | 0x4D | 0x5D | 0x59 | 0x41 | 0x51 => self.eor(bus, operand),
            0x24 | 0x2C => self.bit(bus, operand),

            // Shift/Rotate instructions
            0x0A | 0x06 | 0x16 | 0x0E | 0x1E => self.asl(bus, operand),
            0x4A | 0x46 | 0x56 | 0x4E | 0x5E => self.lsr(bus, operand),
            0x2A | 0x26 | 0x36 | 0x2E | 0x3E => self.rol(bus, operand),
            0x6A | 0x66 | 0x76 | 0x6E | 0x7E => self.ror(bus, operand),

            // Compare instructions
            0xC9 | 0xC5 | 0xD5 | 0xCD | 0xDD | 0xD9 | 0xC1 | 0xD1 => self.cmp(bus, operand),
            0xE0 | 0xE4 | 0xEC => self.cpx(bus, operand),
            0xC0 | 0xC4 | 0xCC => self.cpy(bus, operand),

            // Branch instructions (return extra cycles)
            0x90 => return self.branch(!self.get_carry(), operand),
            0xB0 => return self.branch(self.get_carry(), operand),
            0xF0 => return self.branch(self.get_zero(), operand),
            0xD0 => return self.branch(!self.get_zero(), operand),
            0x30 => return self.branch(self.get_negative(), operand),
            0x10 => return self.branch(!self.get_negative(), operand),
            0x70 => return self.branch(self.get_overflow(), operand),
            0x50 => return self.branch(!self.get_overflow(), operand),

            // Jump/Subroutine instructions
            0x4C | 0x6C => self.jmp(operand),
            0x20 => self.jsr(bus, operand),
            0x60 => self.rts(bus),
            0x00 => self.brk(bus),
            0x40 => self.rti(bus),

            // Stack instructions
            0x48 => self.pha(bus),
            0x68 => self.pla(bus),
            0x08 => self.php(bus),
            0x28 => self.plp(bus),

            // Transfer instructions
            0xAA => self.tax(),
            0xA8 => self.tay(),
            0x8A => self.txa(),
            0x98 => self.tya(),
            0x9A => self.txs(),
            0xBA => self.tsx(),

            // Flag instructions
            0x18 => self.update_flag(flags::CARRY, false),
            0x38 => self.update_flag(flags::CARRY, true),
            0x58 => self.update_flag(flags::INTERRUPT_DISABLE, false),
            0x78 => self.update_flag(flags::INTERRUPT_DISABLE, true),
            0xB8 => self.update_flag(flags::OVERFLOW, false),
            0xD8 => self.update_flag(flags::DECIMAL, false),
            0xF8 => self.update_flag(flags::DECIMAL, true),

            // NOP
            _ => {}
        }
        0
    }

    /// Generate a trace log line in Nestest format
    ///
    /// Format: PC  OP OP OP  MNEMONIC $ADDR    A:XX X:XX Y:XX P:XX SP:XX CYC:XXXX
    /// Example: C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD CYC:7
    ///
    /// Operand values are read with `Bus::peek`, so tracing never disturbs
    /// device state.
    pub fn trace(&self, bus: &Bus) -> String {
        let pc = self.pc;
        let opcode = bus.peek(pc);
        let info = &OPCODE_TABLE[opcode as usize];

        let byte2 = if info.bytes >= 2 { bus.peek(pc.wrapping_add(1)) } else { 0 };
        let byte3 = if info.bytes >= 3 { bus.peek(pc.wrapping_add(2)) } else { 0 };

        let hex_bytes = match info.bytes {
            2 => format!("{:02X} {:02X}   ", opcode, byte2),
            3 => format!("{:02X} {:02X} {:02X}", opcode, byte2, byte3),
            _ => format!("{:02X}      ", opcode),
        };

        // Unofficial opcodes are marked with '*' in place of the leading space
        let marker = if info.official { ' ' } else { '*' };
        let disassembly = self.disassemble(pc, bus, info, byte2, byte3);

        format!(
            "{:04X}  {} {}{:<32}A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            pc,
            hex_bytes,
            marker,
            disassembly,
            self.a,
            self.x,
            self.y,
            self.status,
            self.sp,
            self.cycles
        )
    }

    fn disassemble(&self, pc: u16, bus: &Bus, info: &OpcodeInfo, byte2: u8, byte3: u8) -> String {
        let mnemonic = info.mnemonic;
        let word = u16::from_le_bytes([byte2, byte3]);

        match info.mode {
            AddressingMode::Implied => mnemonic.to_string(),
            AddressingMode::Accumulator => format!("{} A", mnemonic),
            AddressingMode::Immediate => format!("{} #${:02X}", mnemonic, byte2),
            AddressingMode::ZeroPage => {
                format!("{} ${:02X} = {:02X}", mnemonic, byte2, bus.peek(byte2 as u16))
            }
            AddressingMode::ZeroPageX | AddressingMode::ZeroPageY => {
                let (index, name) = if info.mode == AddressingMode::ZeroPageX {
                    (self.x, 'X')
                } else {
                    (self.y, 'Y')
                };
                let addr = byte2.wrapping_add(index);
                format!(
                    "{} ${:02X},{} @ {:02X} = {:02X}",
                    mnemonic,
                    byte2,
                    name,
                    addr,
                    bus.peek(addr as u16)
                )
            }
            AddressingMode::Relative => {
                let target = pc.wrapping_add(2).wrapping_add(byte2 as i8 as u16);
                format!("{} ${:04X}", mnemonic, target)
            }
            AddressingMode::Absolute => {
                if mnemonic == "JMP" || mnemonic == "JSR" {
                    format!("{} ${:04X}", mnemonic, word)
                } else {
                    format!("{} ${:04X} = {:02X}", mnemonic, word, bus.peek(word))
                }
            }
            AddressingMode::AbsoluteX | AddressingMode::AbsoluteY => {
                let (index, name) = if info.mode == AddressingMode::AbsoluteX {
                    (self.x, 'X')
                } else {
                    (self.y, 'Y')
                };
                let addr = word.wrapping_add(index as u16);
                format!(
                    "{} ${:04X},{} @ {:04X} = {:02X}",
                    mnemonic,
                    word,
                    name,
                    addr,
                    bus.peek(addr)
                )
            }
            AddressingMode::Indirect => {
                let lo = bus.peek(word);
                let hi = bus.peek(indirect_high_address(word));
                format!(
                    "{} (${:04X}) = {:04X}",
                    mnemonic,
                    word,
                    u16::from_le_bytes([lo, hi])
                )
            }
            AddressingMode::IndexedIndirect => {
                let ptr = byte2.wrapping_add(self.x);
                let addr = peek_zero_page_pointer(bus, ptr);
                format!(
                    "{} (${:02X},X) @ {:02X} = {:04X} = {:02X}",
                    mnemonic,
                    byte2,
                    ptr,
                    addr,
                    bus.peek(addr)
                )
            }
            AddressingMode::IndirectIndexed => {
                let base = peek_zero_page_pointer(bus, byte2);
                let addr = base.wrapping_add(self.y as u16);
                format!(
                    "{} (${:02X}),Y = {:04X} @ {:04X} = {:02X}",
                    mnemonic,
                    byte2,
                    base,
                    addr,
                    bus.peek(addr)
                )
            }
        }
    }
}

fn peek_zero_page_pointer(bus: &Bus, ptr: u8) -> u16 {
    u16::from_le_bytes([bus.peek(ptr as u16), bus.peek(ptr.wrapping_add(1) as u16)])
}
