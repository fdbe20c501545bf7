// PPU register handling

use super::constants::*;
use super::Ppu;

impl Ppu {
    /// Read from a PPU register
    ///
    /// # Arguments
    ///
    /// * `register` - The register number (0-7)
    ///
    /// # Returns
    ///
    /// The value read from the register
    ///
    /// # Register Behaviors
    ///
    /// - PPUSTATUS ($2002): Returns status, clears VBlank flag and the write latch
    /// - OAMDATA ($2004): Returns OAM data at the current OAM address
    /// - PPUDATA ($2007): Returns buffered PPU data (palette reads are immediate)
    /// - Write-only registers: Return the last value written
    pub(super) fn read_register(&mut self, register: usize) -> u8 {
        match register {
            PPUSTATUS => {
                let status = self.regs[PPUSTATUS];
                self.regs[PPUSTATUS] &= !STATUS_VBLANK;
                self.write_latch = false;
                status
            }
            OAMDATA => self.oam[self.regs[OAMADDR] as usize],
            PPUDATA => {
                let addr = self.vram_addr;
                let mapped = self.map_address(addr);
                let value = if mapped >= PALETTE_BASE {
                    // Palette reads bypass the buffer; the buffer picks up the
                    // nametable byte underneath instead
                    let value = self.read_direct(mapped);
                    let under = self.map_address(addr.wrapping_sub(0x1000));
                    self.read_buffer = self.read_direct(under);
                    value
                } else {
                    let value = self.read_buffer;
                    self.read_buffer = self.read_direct(mapped);
                    value
                };
                self.increment_vram_addr();
                value
            }
            _ => self.regs[register & 7],
        }
    }

    /// Write to a PPU register
    ///
    /// # Arguments
    ///
    /// * `register` - The register number (0-7)
    /// * `data` - The value to write
    ///
    /// # Register Behaviors
    ///
    /// - PPUCTRL ($2000): Stores control flags, nametable select goes to t and v
    /// - PPUMASK ($2001): Stores mask flags
    /// - PPUSTATUS ($2002): Ignored
    /// - OAMADDR ($2003): Sets OAM address
    /// - OAMDATA ($2004): Writes to OAM and increments the address
    /// - PPUSCROLL ($2005): Two writes, X then Y
    /// - PPUADDR ($2006): Two writes, high then low; the second copies t to v
    /// - PPUDATA ($2007): Writes to PPU memory and increments the address
    ///
    /// Every write that changes how lines are drawn records an HEvent.
    pub(super) fn write_register(&mut self, register: usize, data: u8) {
        if register == PPUSTATUS {
            return;
        }
        self.regs[register & 7] = data;

        match register {
            PPUCTRL => {
                self.advance_scroll();
                // t: ...GH.. ........ <- d: ......GH
                self.scroll.temp =
                    (self.scroll.temp & !0x0C00) | (((data & CTRL_NAMETABLE) as u16) << 10);
                self.reload_horizontal();
                self.record_event();
            }
            PPUMASK => {
                self.advance_scroll();
                self.record_event();
            }
            OAMDATA => {
                let oam_addr = self.regs[OAMADDR];
                self.oam[oam_addr as usize] = data;
                self.regs[OAMADDR] = oam_addr.wrapping_add(1);
            }
            PPUSCROLL => {
                self.advance_scroll();
                if !self.write_latch {
                    // t: ....... ...ABCDE <- d: ABCDE...
                    // x:              FGH <- d: .....FGH
                    self.scroll.temp = (self.scroll.temp & !0x001F) | (data >> 3) as u16;
                    self.scroll.fine_x = data & 0x07;
                    self.reload_horizontal();
                } else {
                    // t: FGH..AB CDE..... <- d: ABCDEFGH
                    self.scroll.temp = (self.scroll.temp & !0x73E0)
                        | (((data & 0xF8) as u16) << 2)
                        | (((data & 0x07) as u16) << 12);
                }
                self.record_event();
                self.write_latch = !self.write_latch;
            }
            PPUADDR => {
                if !self.write_latch {
                    // t: .CDEFGH ........ <- d: ..CDEFGH
                    self.scroll.temp = (self.scroll.temp & !0x7F00) | (((data & 0x3F) as u16) << 8);
                    // Raw high byte until the second write, which records the event
                    self.vram_addr = data as u16;
                } else {
                    // t: ....... ABCDEFGH <- d: ABCDEFGH, then v = t
                    self.scroll.temp = (self.scroll.temp & !0x00FF) | data as u16;
                    self.scroll.current = self.scroll.temp;
                    self.vram_addr = self.scroll.current;
                    self.record_event();
                }
                self.write_latch = !self.write_latch;
            }
            PPUDATA => {
                let mapped = self.map_address(self.vram_addr);
                self.write_direct(mapped, data);
                self.increment_vram_addr();
            }
            _ => {}
        }
    }

    /// Copy the horizontal scroll bits of t into v
    pub(super) fn reload_horizontal(&mut self) {
        self.scroll.current = (self.scroll.current & !0x041F) | (self.scroll.temp & 0x041F);
    }

    fn increment_vram_addr(&mut self) {
        let step = if self.regs[PPUCTRL] & CTRL_INCREMENT_32 != 0 {
            32
        } else {
            1
        };
        self.vram_addr = self.vram_addr.wrapping_add(step) & (VRAM_SIZE as u16 - 1);
    }
}
