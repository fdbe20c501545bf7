// Emulator module - Main emulator coordinator
//
// The emulator owns the CPU and the Bus (which in turn owns the PPU, the
// mapper, the controllers and the audio unit). It runs the CPU a whole
// instruction at a time and derives PPU scanline ticks from the cycles
// consumed: 3 PPU dots per CPU cycle, 341 dots per scanline, 262 scanlines
// per frame.

mod config;
mod screenshot;

pub use config::{
    ConfigError, EmulationConfig, EmulatorConfig, LoggingConfig, SpeedMode, VideoConfig,
    CONFIG_FILE,
};
pub use screenshot::{save_screenshot, ScreenshotError, FRAME_BYTES};

use crate::apu::ChannelType;
use crate::bus::Bus;
use crate::cartridge::{create_mapper, Cartridge, INesError, MapperError};
use crate::cpu::{milliseconds_to_cycles, Cpu};
use crate::ppu::{
    DOTS_PER_SCANLINE, LAST_VISIBLE_SCANLINE, PRERENDER_SCANLINE, SCANLINES_PER_FRAME,
    VBLANK_SCANLINE,
};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// PPU dots per CPU cycle (NTSC)
pub const DOTS_PER_CPU_CYCLE: u32 = 3;

/// Longest slice of time a single `run_milliseconds` call will emulate
pub const MAX_ELAPSED_MS: f64 = 1000.0 / 15.0;

/// PPU dots in one frame
const DOTS_PER_FRAME: u64 = DOTS_PER_SCANLINE as u64 * SCANLINES_PER_FRAME as u64;

/// Errors that can occur while loading a ROM
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read
    Io(io::Error),

    /// The iNES container is malformed
    INes(INesError),

    /// The cartridge's mapper is not supported
    Mapper(MapperError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "I/O error: {}", e),
            LoadError::INes(e) => write!(f, "Invalid ROM: {}", e),
            LoadError::Mapper(e) => write!(f, "Mapper error: {}", e),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::INes(e) => Some(e),
            LoadError::Mapper(e) => Some(e),
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<INesError> for LoadError {
    fn from(e: INesError) -> Self {
        LoadError::INes(e)
    }
}

impl From<MapperError> for LoadError {
    fn from(e: MapperError) -> Self {
        LoadError::Mapper(e)
    }
}

/// Host notification at vblank entry
///
/// The argument is the number of further vblanks the current run budget will
/// produce; 0 means this is the last one and the host should render now.
pub type VblankCallback = Box<dyn FnMut(u32)>;

/// Main emulator structure
///
/// Coordinates all NES components and exposes the host-facing operations:
/// loading, running, rendering, input and sound queries.
pub struct Emulator {
    /// CPU (6502 processor)
    cpu: Cpu,

    /// Bus (connects all components)
    bus: Bus,

    /// Configuration
    config: EmulatorConfig,

    /// Currently loaded ROM path
    rom_path: Option<PathBuf>,

    /// Whether a cartridge has been loaded
    loaded: bool,

    /// Speed mode
    speed_mode: SpeedMode,

    // ========================================
    // PPU Timing
    // ========================================
    /// Scanline currently being drawn (0-261)
    scanline: u16,

    /// PPU dots elapsed within `scanline`
    dot: u32,

    /// Frames completed since reset
    frame_count: u64,

    vblank_callback: Option<VblankCallback>,
}

impl Emulator {
    /// Create a new emulator with the default configuration
    ///
    /// # Example
    ///
    /// ```
    /// use nesemu::emulator::Emulator;
    ///
    /// let emulator = Emulator::new();
    /// assert_eq!(emulator.frame_count(), 0);
    /// ```
    pub fn new() -> Self {
        Self::with_config(EmulatorConfig::default())
    }

    /// Create a new emulator using `config`
    pub fn with_config(config: EmulatorConfig) -> Self {
        let mut cpu = Cpu::new();
        cpu.set_trace(config.emulation.trace);
        Emulator {
            cpu,
            bus: Bus::new(),
            speed_mode: config.emulation.speed,
            config,
            rom_path: None,
            loaded: false,
            scanline: 0,
            dot: 0,
            frame_count: 0,
            vblank_callback: None,
        }
    }

    // ========================================
    // Loading
    // ========================================

    /// Load an iNES image from memory
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        let cartridge = Cartridge::from_ines(bytes)?;
        self.load_cartridge(cartridge)
    }

    /// Load an iNES file and remember its path for screenshots
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        self.load_rom(&bytes)?;
        self.rom_path = Some(path.to_path_buf());
        log::info!("loaded {}", path.display());
        Ok(())
    }

    /// Insert a cartridge, replacing the CPU, bus and mapper
    ///
    /// The mapper is created first, so an unsupported mapper leaves the
    /// current state untouched. The system is reset afterwards.
    pub fn load_cartridge(&mut self, cartridge: Cartridge) -> Result<(), LoadError> {
        let mapper = create_mapper(&cartridge)?;

        let mut bus = Bus::new();
        bus.insert_cartridge(mapper, cartridge.chr_rom);
        self.bus = bus;

        let mut cpu = Cpu::new();
        cpu.set_trace(self.config.emulation.trace);
        self.cpu = cpu;

        self.rom_path = None;
        self.loaded = true;
        self.reset();
        Ok(())
    }

    /// Whether a cartridge is loaded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Reset the emulator
    ///
    /// Resets all components to their power-on state, as if pressing the
    /// reset button. ROM contents and the mapper survive.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        self.scanline = 0;
        self.dot = 0;
        self.frame_count = 0;
        self.bus.ppu_mut().set_scanline(0);
    }

    // ========================================
    // Execution
    // ========================================

    /// Execute one CPU instruction and advance the PPU to match
    ///
    /// # Returns
    ///
    /// CPU cycles consumed
    pub fn step(&mut self) -> u16 {
        let cycles = self.execute_instruction();
        self.advance_ppu(cycles as u64, 0);
        cycles
    }

    /// Run until at least `cycles` CPU cycles have been consumed
    ///
    /// # Returns
    ///
    /// CPU cycles actually consumed (at most one instruction over budget)
    pub fn run_cycles(&mut self, cycles: u64) -> u64 {
        let mut consumed = 0;
        while consumed < cycles {
            let taken = self.execute_instruction() as u64;
            consumed += taken;
            self.advance_ppu(taken, cycles.saturating_sub(consumed));
        }
        consumed
    }

    /// Run `ms` milliseconds of emulated time
    ///
    /// The elapsed time is clamped to `MAX_ELAPSED_MS` and scaled by the
    /// speed mode.
    pub fn run_milliseconds(&mut self, ms: f64) -> u64 {
        let ms = ms.min(MAX_ELAPSED_MS) * self.speed_mode.multiplier();
        self.run_cycles(milliseconds_to_cycles(ms))
    }

    fn execute_instruction(&mut self) -> u16 {
        let cycles = self.cpu.step(&mut self.bus);
        // Mapper registers may have acknowledged the IRQ
        self.cpu.set_irq_line(self.bus.irq_line());
        cycles
    }

    /// Advance the PPU by the dots of `cycles` CPU cycles
    ///
    /// `budget_left` is the number of CPU cycles left in the current run,
    /// used to tell the vblank callback how many frames remain.
    fn advance_ppu(&mut self, cycles: u64, budget_left: u64) {
        self.dot += cycles as u32 * DOTS_PER_CPU_CYCLE;
        while self.dot >= DOTS_PER_SCANLINE {
            self.dot -= DOTS_PER_SCANLINE;
            self.scanline = (self.scanline + 1) % SCANLINES_PER_FRAME;
            self.enter_scanline(budget_left);
        }
    }

    fn enter_scanline(&mut self, budget_left: u64) {
        let line = self.scanline;
        self.bus.ppu_mut().set_scanline(line);

        match line {
            0..=LAST_VISIBLE_SCANLINE => {
                let rendering = self.bus.ppu().rendering_enabled();
                self.bus.clock_scanline(line, rendering);
                self.cpu.set_irq_line(self.bus.irq_line());
            }
            VBLANK_SCANLINE => {
                self.bus.ppu_mut().set_vblank();
                if self.bus.ppu().nmi_enabled() {
                    self.cpu.trigger_nmi();
                }
                self.frame_count += 1;

                let budget_dots = budget_left * DOTS_PER_CPU_CYCLE as u64 + self.dot as u64;
                let left_v = (budget_dots / DOTS_PER_FRAME) as u32;
                if let Some(callback) = self.vblank_callback.as_mut() {
                    callback(left_v);
                }
            }
            PRERENDER_SCANLINE => {
                self.bus.ppu_mut().clear_vblank();
                let rendering = self.bus.ppu().rendering_enabled();
                self.bus.clock_scanline(line, rendering);
                self.cpu.set_irq_line(self.bus.irq_line());
            }
            _ => {}
        }
    }

    /// Register the vblank notification
    pub fn set_vblank_callback<F>(&mut self, callback: F)
    where
        F: FnMut(u32) + 'static,
    {
        self.vblank_callback = Some(Box::new(callback));
    }

    // ========================================
    // Video / Input / Sound
    // ========================================

    /// Render the last completed frame into an RGBA buffer (256x240x4)
    pub fn render(&mut self, pixels: &mut [u8]) {
        self.bus.ppu_mut().render(pixels);
    }

    /// Set the button bitmask of controller `port` (0 or 1)
    pub fn set_pad_status(&mut self, port: usize, buttons: u8) {
        self.bus.set_pad_status(port, buttons);
    }

    /// Waveform of each audio channel
    pub fn channel_types(&self) -> Vec<ChannelType> {
        self.bus.apu().channel_types().to_vec()
    }

    /// Output level of audio channel `ch` (0.0 - 1.0)
    pub fn volume(&self, ch: usize) -> f32 {
        self.bus.apu().volume(ch)
    }

    /// Frequency of audio channel `ch` in Hz
    pub fn frequency(&self, ch: usize) -> f32 {
        self.bus.apu().frequency(ch)
    }

    /// Duty ratio of audio channel `ch`
    pub fn duty_ratio(&self, ch: usize) -> f32 {
        self.bus.apu().duty_ratio(ch)
    }

    /// Render the current frame and save it as a PNG
    ///
    /// Uses the screenshot directory and naming from the video
    /// configuration.
    pub fn save_screenshot(&mut self) -> Result<PathBuf, ScreenshotError> {
        let mut frame = vec![0u8; FRAME_BYTES];
        self.render(&mut frame);
        save_screenshot(
            &frame,
            &self.config.video.screenshot_directory,
            self.rom_path.as_deref(),
            self.config.video.timestamped_screenshots,
        )
    }

    // ========================================
    // Settings and Accessors
    // ========================================

    pub fn set_speed_mode(&mut self, mode: SpeedMode) {
        self.speed_mode = mode;
    }

    pub fn speed_mode(&self) -> SpeedMode {
        self.speed_mode
    }

    /// Enable or disable the per-instruction CPU trace
    pub fn set_trace(&mut self, enabled: bool) {
        self.config.emulation.trace = enabled;
        self.cpu.set_trace(enabled);
    }

    /// Frames completed since the last reset
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Scanline currently being drawn
    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    pub fn rom_path(&self) -> Option<&Path> {
        self.rom_path.as_deref()
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::Mirroring;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// NROM cartridge whose program is `program` at $8000, NOP-filled
    fn nrom(program: &[u8]) -> Cartridge {
        let mut prg = vec![0xEA; 0x8000];
        prg[..program.len()].copy_from_slice(program);
        prg[0x7FFC] = 0x00;
        prg[0x7FFD] = 0x80;
        Cartridge::new(prg, vec![0; 0x2000], 0, Mirroring::Vertical)
    }

    /// Program that spins forever at $8000
    fn spin() -> Cartridge {
        nrom(&[0x4C, 0x00, 0x80])
    }

    fn loaded(cartridge: Cartridge) -> Emulator {
        let mut emulator = Emulator::new();
        emulator.load_cartridge(cartridge).expect("load");
        emulator
    }

    #[test]
    fn test_emulator_new() {
        let emulator = Emulator::new();
        assert!(!emulator.is_loaded());
        assert_eq!(emulator.speed_mode(), SpeedMode::Normal);
        assert!(emulator.rom_path().is_none());
    }

    #[test]
    fn test_load_resets_cpu() {
        let emulator = loaded(spin());
        assert!(emulator.is_loaded());
        assert_eq!(emulator.cpu().pc, 0x8000);
        assert_eq!(emulator.cpu().cycles, 7);
    }

    #[test]
    fn test_first_frame_timeline_starts_at_line_zero() {
        let emulator = loaded(spin());
        let pending = emulator.bus().ppu().pending_timeline();
        assert_eq!(pending.events().first().map(|e| e.scanline), Some(0));
        assert_eq!(emulator.bus().ppu().scanline(), 0);
    }

    #[test]
    fn test_unsupported_mapper_keeps_state() {
        let mut emulator = loaded(spin());
        emulator.run_cycles(100);
        let pc = emulator.cpu().pc;

        let mut bad = spin();
        bad.mapper = 5;
        let result = emulator.load_cartridge(bad);

        assert!(matches!(
            result,
            Err(LoadError::Mapper(MapperError::UnsupportedMapper(5)))
        ));
        assert_eq!(emulator.cpu().pc, pc);
        assert!(emulator.is_loaded());
    }

    #[test]
    fn test_bad_ines_rejected() {
        let mut emulator = Emulator::new();
        assert!(matches!(
            emulator.load_rom(b"not a rom"),
            Err(LoadError::INes(_))
        ));
    }

    #[test]
    fn test_frame_timing() {
        let mut emulator = loaded(spin());
        // One frame is 89342 dots = 29780.67 CPU cycles
        emulator.run_cycles(29781 * 3);
        assert_eq!(emulator.frame_count(), 3);
    }

    #[test]
    fn test_vblank_callback_counts_down() {
        let mut emulator = loaded(spin());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        emulator.set_vblank_callback(move |left| sink.borrow_mut().push(left));

        // Finish the first frame's visible part, then run exactly 3 frames
        emulator.run_cycles(241 * 341 / 3 + 10);
        seen.borrow_mut().clear();
        emulator.run_cycles(29781 * 3);

        assert_eq!(*seen.borrow(), vec![2, 1, 0]);
    }

    #[test]
    fn test_nmi_fires_at_vblank() {
        // LDA #$80; STA $2000; spin
        let mut cartridge = nrom(&[0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80]);
        // NMI handler at $9000: spin
        cartridge.prg_rom[0x1000..0x1003].copy_from_slice(&[0x4C, 0x00, 0x90]);
        cartridge.prg_rom[0x7FFA] = 0x00;
        cartridge.prg_rom[0x7FFB] = 0x90;

        let mut emulator = loaded(cartridge);
        emulator.run_cycles(29781);

        assert_eq!(emulator.frame_count(), 1);
        assert_eq!(emulator.cpu().pc, 0x9000);
        assert!(emulator.cpu().get_interrupt_disable());
    }

    #[test]
    fn test_run_milliseconds_clamped_and_scaled() {
        let mut emulator = loaded(spin());
        let consumed = emulator.run_milliseconds(1000.0);
        let budget = milliseconds_to_cycles(MAX_ELAPSED_MS);
        assert!(consumed >= budget && consumed < budget + 8);

        emulator.set_speed_mode(SpeedMode::Paused);
        assert_eq!(emulator.run_milliseconds(10.0), 0);

        emulator.set_speed_mode(SpeedMode::FastForward2x);
        let consumed = emulator.run_milliseconds(10.0);
        assert!(consumed >= milliseconds_to_cycles(20.0));
    }

    #[test]
    fn test_reset_after_cpu_modification() {
        let mut emulator = loaded(spin());
        emulator.cpu_mut().a = 0xFF;
        emulator.cpu_mut().x = 0xAA;
        emulator.run_cycles(1000);

        emulator.reset();

        assert_eq!(emulator.cpu().a, 0);
        assert_eq!(emulator.cpu().x, 0);
        assert_eq!(emulator.cpu().pc, 0x8000);
        assert_eq!(emulator.scanline(), 0);
    }

    #[test]
    fn test_sound_queries_delegate() {
        let mut emulator = loaded(nrom(&[
            0xA9, 0x01, 0x8D, 0x15, 0x40, // enable pulse 1
            0xA9, 0xBF, 0x8D, 0x00, 0x40, // duty 2, constant volume 15
            0xA9, 0xFD, 0x8D, 0x02, 0x40, // timer low
            0xA9, 0x00, 0x8D, 0x03, 0x40, // timer high, length load
            0x4C, 0x14, 0x80,
        ]));
        emulator.run_cycles(100);

        assert_eq!(emulator.channel_types().len(), 4);
        assert_eq!(emulator.volume(0), 1.0);
        assert_eq!(emulator.duty_ratio(0), 0.5);
        assert!((emulator.frequency(0) - 440.4).abs() < 0.5);
    }

    #[test]
    fn test_pad_status_reaches_controller() {
        // Strobe, then read the first bit of port 1 into $00
        let mut emulator = loaded(nrom(&[
            0xA9, 0x01, 0x8D, 0x16, 0x40, // LDA #1; STA $4016
            0xA9, 0x00, 0x8D, 0x16, 0x40, // LDA #0; STA $4016
            0xAD, 0x16, 0x40, 0x85, 0x00, // LDA $4016; STA $00
            0x4C, 0x0F, 0x80,
        ]));
        emulator.set_pad_status(0, crate::input::buttons::A);
        emulator.run_cycles(100);
        assert_eq!(emulator.bus().ram_contents()[0], 0x41);
    }
}
