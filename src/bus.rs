// Bus module - Memory bus implementation
//
// This module implements the main memory bus that connects the CPU to all
// memory-mapped components. Every CPU address resolves through a per-direction
// handler table: installing a handler over a range overwrites the table
// entries, so the most recently installed handler wins. Built-in handlers are
// installed at construction; the cartridge mapper installs its own on load.
//
// # NES Memory Map (CPU Address Space)
//
// ```text
// $0000-$07FF: 2KB Internal RAM
// $0800-$1FFF: Mirrors of RAM (3 times)
// $2000-$2007: PPU Registers
// $2008-$3FFF: Mirrors of PPU Registers (repeating every 8 bytes)
// $4000-$4013: APU Registers (write)
// $4014:       OAM DMA (write)
// $4015:       APU Status (read/write)
// $4016:       Controller 1 data (read) / strobe (write)
// $4017:       Controller 2 data (read) / APU frame counter (write)
// $4018-$401F: Unmapped
// $4020-$FFFF: Cartridge space (PRG-ROM, PRG-RAM, and mapper registers)
// ```

use crate::apu::{AudioUnit, RegisterApu};
use crate::cartridge::Mapper;
use crate::input::ControllerPorts;
use crate::ppu::Ppu;

/// Value returned by reads from unmapped addresses
pub const OPEN_BUS: u8 = 0x00;

/// Size of the CPU address space
const ADDRESS_SPACE: usize = 0x10000;

/// Internal RAM size (2KB)
const RAM_SIZE: usize = 2048;

/// Trait for memory-mapped components
///
/// This trait defines the interface for components that can be mapped into the
/// CPU's address space. Components implementing this trait can handle read and
/// write operations for their specific memory ranges.
///
/// # Examples
///
/// The PPU, the controller ports and the audio unit all implement this trait to
/// provide their memory-mapped register interfaces.
pub trait MemoryMappedDevice {
    /// Read a byte from the device
    ///
    /// Some devices have side effects on read (e.g., PPU PPUSTATUS clears flags),
    /// so this method takes &mut self.
    ///
    /// # Arguments
    /// * `addr` - The CPU address being read
    ///
    /// # Returns
    /// The byte value at the specified address
    fn read(&mut self, addr: u16) -> u8;

    /// Write a byte to the device
    ///
    /// # Arguments
    /// * `addr` - The CPU address being written
    /// * `data` - The byte value to write
    fn write(&mut self, addr: u16, data: u8);
}

/// Target of a CPU memory access
///
/// The Bus owns every target, so dispatch is a match on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// 2KB internal RAM, mirrored
    Ram,
    /// PPU registers, mirrored every 8 bytes
    PpuRegisters,
    /// Audio unit registers
    Apu,
    /// OAM DMA trigger
    OamDma,
    /// Controller ports
    Controller,
    /// Cartridge mapper (PRG-ROM, PRG-RAM, bank registers)
    Cartridge,
}

/// Main memory bus structure
///
/// The Bus connects the CPU to all memory-mapped components. It owns the
/// internal RAM, the PPU, the cartridge mapper, the controller ports and the
/// audio unit, and routes each access through its handler tables.
pub struct Bus {
    /// Internal RAM: 2KB
    ///
    /// The NES has 2KB of internal RAM located at $0000-$07FF.
    /// This RAM is mirrored 3 times at $0800-$1FFF.
    ram: [u8; RAM_SIZE],

    /// PPU (Picture Processing Unit)
    ppu: Ppu,

    /// Cartridge mapper, if a cartridge is inserted
    mapper: Option<Mapper>,

    /// Controller ports at $4016/$4017
    controllers: ControllerPorts,

    /// Audio unit behind $4000-$4017
    apu: Box<dyn AudioUnit>,

    // ========================================
    // Handler Tables
    // ========================================
    read_handlers: Box<[Option<Handler>]>,
    write_handlers: Box<[Option<Handler>]>,

    // ========================================
    // OAM DMA State
    // ========================================
    /// Set by a $4014 write; the CPU collects it and adds the stall
    dma_pending: bool,
}

impl Bus {
    /// Create a new bus with the built-in handlers installed
    ///
    /// # Example
    /// ```
    /// use nesemu::Bus;
    /// let mut bus = Bus::new();
    /// bus.write(0x0000, 0x42);
    /// assert_eq!(bus.read(0x0800), 0x42);
    /// ```
    pub fn new() -> Self {
        Self::with_audio_unit(Box::new(RegisterApu::new()))
    }

    /// Create a new bus using the given audio unit
    pub fn with_audio_unit(apu: Box<dyn AudioUnit>) -> Self {
        let mut bus = Bus {
            ram: [0; RAM_SIZE],
            ppu: Ppu::new(),
            mapper: None,
            controllers: ControllerPorts::new(),
            apu,
            read_handlers: vec![None; ADDRESS_SPACE].into_boxed_slice(),
            write_handlers: vec![None; ADDRESS_SPACE].into_boxed_slice(),
            dma_pending: false,
        };
        bus.install_builtin_handlers();
        bus
    }

    fn install_builtin_handlers(&mut self) {
        self.set_read_handler(0x0000, 0x1FFF, Handler::Ram);
        self.set_write_handler(0x0000, 0x1FFF, Handler::Ram);

        self.set_read_handler(0x2000, 0x3FFF, Handler::PpuRegisters);
        self.set_write_handler(0x2000, 0x3FFF, Handler::PpuRegisters);

        self.set_write_handler(0x4000, 0x4013, Handler::Apu);
        self.set_write_handler(0x4014, 0x4014, Handler::OamDma);
        self.set_read_handler(0x4015, 0x4015, Handler::Apu);
        self.set_write_handler(0x4015, 0x4015, Handler::Apu);

        self.set_read_handler(0x4016, 0x4017, Handler::Controller);
        self.set_write_handler(0x4016, 0x4016, Handler::Controller);
        self.set_write_handler(0x4017, 0x4017, Handler::Apu);
    }

    // ========================================
    // Handler Registration
    // ========================================

    /// Route reads of `[low, high]` to `handler`
    ///
    /// Overwrites whatever was installed for those addresses.
    pub fn set_read_handler(&mut self, low: u16, high: u16, handler: Handler) {
        self.read_handlers[low as usize..=high as usize].fill(Some(handler));
    }

    /// Route writes of `[low, high]` to `handler`
    ///
    /// Overwrites whatever was installed for those addresses.
    pub fn set_write_handler(&mut self, low: u16, high: u16, handler: Handler) {
        self.write_handlers[low as usize..=high as usize].fill(Some(handler));
    }

    /// Handler that serves reads of `addr`
    pub fn read_handler(&self, addr: u16) -> Option<Handler> {
        self.read_handlers[addr as usize]
    }

    /// Handler that serves writes of `addr`
    pub fn write_handler(&self, addr: u16) -> Option<Handler> {
        self.write_handlers[addr as usize]
    }

    // ========================================
    // Memory Access
    // ========================================

    /// Read a byte from the bus
    ///
    /// Unmapped addresses return `OPEN_BUS`.
    ///
    /// # Arguments
    /// * `addr` - The 16-bit address to read from
    pub fn read(&mut self, addr: u16) -> u8 {
        match self.read_handlers[addr as usize] {
            Some(Handler::Ram) => self.ram[(addr & 0x07FF) as usize],
            Some(Handler::PpuRegisters) => self.ppu.read(addr),
            Some(Handler::Apu) => self.apu.read(addr),
            Some(Handler::Controller) => self.controllers.read(addr),
            Some(Handler::Cartridge) => self
                .mapper
                .as_ref()
                .map_or(OPEN_BUS, |mapper| mapper.cpu_read(addr)),
            Some(Handler::OamDma) | None => OPEN_BUS,
        }
    }

    /// Write a byte to the bus
    ///
    /// Writes to unmapped addresses are ignored.
    ///
    /// # Arguments
    /// * `addr` - The 16-bit address to write to
    /// * `data` - The byte value to write
    pub fn write(&mut self, addr: u16, data: u8) {
        match self.write_handlers[addr as usize] {
            Some(Handler::Ram) => self.ram[(addr & 0x07FF) as usize] = data,
            Some(Handler::PpuRegisters) => self.ppu.write(addr, data),
            Some(Handler::Apu) => self.apu.write(addr, data),
            Some(Handler::OamDma) => self.oam_dma(data),
            Some(Handler::Controller) => self.controllers.write(addr, data),
            Some(Handler::Cartridge) => {
                if let Some(mapper) = self.mapper.as_mut() {
                    mapper.cpu_write(addr, data, &mut self.ppu);
                }
            }
            None => {}
        }
    }

    /// Read a byte without side effects
    ///
    /// Used by trace output. Register-backed addresses return `OPEN_BUS`.
    pub fn peek(&self, addr: u16) -> u8 {
        match self.read_handlers[addr as usize] {
            Some(Handler::Ram) => self.ram[(addr & 0x07FF) as usize],
            Some(Handler::Cartridge) => self
                .mapper
                .as_ref()
                .map_or(OPEN_BUS, |mapper| mapper.cpu_read(addr)),
            _ => OPEN_BUS,
        }
    }

    /// Read a 16-bit word from the bus (little-endian)
    ///
    /// # Example
    /// ```
    /// use nesemu::Bus;
    /// let mut bus = Bus::new();
    /// bus.write(0x0000, 0x34);
    /// bus.write(0x0001, 0x12);
    /// assert_eq!(bus.read_u16(0x0000), 0x1234);
    /// ```
    pub fn read_u16(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    // ========================================
    // OAM DMA
    // ========================================

    /// Copy page `$XX00-$XXFF` into OAM
    ///
    /// The copy happens at once; the CPU pays for it through `take_dma_stall`.
    fn oam_dma(&mut self, page: u8) {
        let base = (page as u16) << 8;
        let mut buffer = [0u8; 256];
        for (offset, byte) in buffer.iter_mut().enumerate() {
            *byte = self.read(base.wrapping_add(offset as u16));
        }
        self.ppu.write_oam_dma(&buffer);
        self.dma_pending = true;
    }

    /// Collect a pending OAM DMA
    ///
    /// Returns the number of CPU cycles the transfer stalls: 513, plus one
    /// when it starts on an odd CPU cycle.
    ///
    /// # Example
    /// ```
    /// use nesemu::Bus;
    /// let mut bus = Bus::new();
    /// bus.write(0x4014, 0x02);
    /// assert_eq!(bus.take_dma_stall(7), 514);
    /// assert_eq!(bus.take_dma_stall(8), 0);
    /// ```
    pub fn take_dma_stall(&mut self, cpu_cycles: u64) -> u16 {
        if !self.dma_pending {
            return 0;
        }
        self.dma_pending = false;
        513 + (cpu_cycles & 1) as u16
    }

    // ========================================
    // Cartridge
    // ========================================

    /// Insert a cartridge
    ///
    /// CHR data goes to the PPU, the mapper installs its handlers over the
    /// built-ins, and its bank state is pushed to the PPU.
    pub fn insert_cartridge(&mut self, mut mapper: Mapper, chr_rom: Vec<u8>) {
        self.ppu.set_chr_rom(chr_rom);
        mapper.install(self);
        mapper.reset(&mut self.ppu);
        self.mapper = Some(mapper);
    }

    /// Reset every device to its power-on state
    ///
    /// RAM keeps its contents; ROM data and mapper handlers are preserved.
    pub fn reset(&mut self) {
        self.ppu.reset();
        if let Some(mapper) = self.mapper.as_mut() {
            mapper.reset(&mut self.ppu);
        }
        self.controllers.reset();
        self.apu.reset();
        self.dma_pending = false;
    }

    /// Clock the mapper's scanline counter
    pub fn clock_scanline(&mut self, line: u16, rendering: bool) {
        if let Some(mapper) = self.mapper.as_mut() {
            mapper.on_scanline(line, rendering, &mut self.ppu);
        }
    }

    /// Level of the mapper IRQ line
    pub fn irq_line(&self) -> bool {
        self.mapper.as_ref().is_some_and(Mapper::irq_line)
    }

    // ========================================
    // Device Access
    // ========================================

    /// Get reference to PPU
    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    /// Get mutable reference to PPU
    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    /// Inserted mapper
    pub fn mapper(&self) -> Option<&Mapper> {
        self.mapper.as_ref()
    }

    /// Audio unit
    pub fn apu(&self) -> &dyn AudioUnit {
        self.apu.as_ref()
    }

    /// Set the button bitmask of a controller port (0 or 1)
    pub fn set_pad_status(&mut self, port: usize, buttons: u8) {
        self.controllers.set_buttons(port, buttons);
    }

    /// Internal RAM contents
    pub fn ram_contents(&self) -> &[u8; RAM_SIZE] {
        &self.ram
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
