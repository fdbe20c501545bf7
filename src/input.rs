// Input module - Standard controller ports at $4016/$4017
//
// Each port holds the button bits last set by the front end and an 8-bit
// shift register. Writing 1 to bit 0 of $4016 raises the strobe, which
// keeps reloading both shift registers; lowering it freezes them, and each
// read then returns one button (A, B, Select, Start, Up, Down, Left, Right).

use crate::bus::MemoryMappedDevice;

/// Button bit positions in a pad status byte
pub mod buttons {
    pub const A: u8 = 0x01;
    pub const B: u8 = 0x02;
    pub const SELECT: u8 = 0x04;
    pub const START: u8 = 0x08;
    pub const UP: u8 = 0x10;
    pub const DOWN: u8 = 0x20;
    pub const LEFT: u8 = 0x40;
    pub const RIGHT: u8 = 0x80;
}

/// Upper bits driven onto the data bus during controller reads
const OPEN_BUS_BITS: u8 = 0x40;

/// One controller port
#[derive(Debug, Clone, Copy, Default)]
struct Port {
    /// Current button states
    buttons: u8,
    /// Shift register, shifted out LSB first
    shift: u8,
}

impl Port {
    fn latch(&mut self) {
        self.shift = self.buttons;
    }

    fn read(&mut self, strobe: bool) -> u8 {
        if strobe {
            self.latch();
        }
        let bit = self.shift & 1;
        // Official pads report 1 after the eighth read
        self.shift = (self.shift >> 1) | 0x80;
        bit
    }
}

/// Both controller ports
#[derive(Debug, Clone, Default)]
pub struct ControllerPorts {
    ports: [Port; 2],
    strobe: bool,
}

impl ControllerPorts {
    /// Create ports with no buttons pressed
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the button state of `port` (0 or 1)
    ///
    /// Out-of-range ports are ignored.
    pub fn set_buttons(&mut self, port: usize, buttons: u8) {
        if let Some(p) = self.ports.get_mut(port) {
            p.buttons = buttons;
        }
    }

    /// Button state of `port`
    pub fn buttons(&self, port: usize) -> u8 {
        self.ports.get(port).map_or(0, |p| p.buttons)
    }

    /// Clear shift registers and strobe; button state is kept
    pub fn reset(&mut self) {
        self.strobe = false;
        for port in &mut self.ports {
            port.shift = 0;
        }
    }
}

impl MemoryMappedDevice for ControllerPorts {
    fn read(&mut self, addr: u16) -> u8 {
        let index = (addr & 1) as usize;
        OPEN_BUS_BITS | self.ports[index].read(self.strobe)
    }

    fn write(&mut self, _addr: u16, data: u8) {
        self.strobe = data & 1 != 0;
        if self.strobe {
            for port in &mut self.ports {
                port.latch();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strobe(ports: &mut ControllerPorts) {
        ports.write(0x4016, 1);
        ports.write(0x4016, 0);
    }

    #[test]
    fn test_reads_report_buttons_in_order() {
        let mut ports = ControllerPorts::new();
        ports.set_buttons(0, buttons::B | buttons::UP | buttons::RIGHT);
        strobe(&mut ports);

        let bits: Vec<u8> = (0..8).map(|_| ports.read(0x4016) & 1).collect();
        assert_eq!(bits, vec![0, 1, 0, 0, 1, 0, 0, 1]);
    }

    #[test]
    fn test_reads_after_eighth_return_one() {
        let mut ports = ControllerPorts::new();
        strobe(&mut ports);
        for _ in 0..8 {
            assert_eq!(ports.read(0x4016), 0x40);
        }
        assert_eq!(ports.read(0x4016), 0x41);
    }

    #[test]
    fn test_strobe_high_repeats_button_a() {
        let mut ports = ControllerPorts::new();
        ports.set_buttons(0, buttons::A);
        ports.write(0x4016, 1);
        for _ in 0..4 {
            assert_eq!(ports.read(0x4016) & 1, 1);
        }
    }

    #[test]
    fn test_button_change_after_latch_not_visible() {
        let mut ports = ControllerPorts::new();
        strobe(&mut ports);
        ports.set_buttons(0, buttons::A);
        assert_eq!(ports.read(0x4016) & 1, 0);
    }

    #[test]
    fn test_invalid_port_ignored() {
        let mut ports = ControllerPorts::new();
        ports.set_buttons(5, 0xFF);
        assert_eq!(ports.buttons(0), 0);
        assert_eq!(ports.buttons(5), 0);
    }

    #[test]
    fn test_reset_keeps_buttons() {
        let mut ports = ControllerPorts::new();
        ports.set_buttons(1, buttons::START);
        ports.reset();
        assert_eq!(ports.buttons(1), buttons::START);
    }
}
