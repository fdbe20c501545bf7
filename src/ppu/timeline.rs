// Per-scanline event timeline
//
// Every write that changes how a scanline is drawn (control, mask, scroll,
// CHR banks, mirroring) records an HEvent tagged with the scanline it first
// affects. Rendering walks the list and draws each half-open scanline range
// with the state captured in its event. Two timelines exist: one accumulates
// the running frame while the other holds the finished one; they swap at
// vblank entry.

use super::constants::SCREEN_HEIGHT;

/// Maximum events per frame: one per visible scanline
pub const MAX_EVENTS: usize = SCREEN_HEIGHT;

/// Snapshot of the rendering state from a given scanline onward
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HEvent {
    /// First scanline this state applies to
    pub scanline: u16,
    /// PPUCTRL value
    pub ctrl: u8,
    /// PPUMASK value
    pub mask: u8,
    /// Byte offsets of the eight 1KB CHR windows
    pub chr_bank_offsets: [usize; 8],
    /// Packed nametable mirroring bits
    pub mirror_bits: u8,
    /// Loopy `v` register
    pub scroll_current: u16,
    /// Fine X scroll (0-7)
    pub fine_x: u8,
}

/// Fixed-capacity, scanline-ordered list of HEvents
#[derive(Debug, Clone)]
pub struct Timeline {
    events: Box<[HEvent]>,
    len: usize,
}

impl Timeline {
    /// Create an empty timeline
    pub fn new() -> Self {
        Timeline {
            events: vec![HEvent::default(); MAX_EVENTS].into_boxed_slice(),
            len: 0,
        }
    }

    /// Remove all events, keeping the storage
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no event was recorded
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Recorded events in scanline order
    pub fn events(&self) -> &[HEvent] {
        &self.events[..self.len]
    }

    /// Most recent event
    pub fn last(&self) -> Option<&HEvent> {
        self.events().last()
    }

    /// Append an event
    ///
    /// An event on the same scanline as the last one replaces it. Events at or
    /// after the new scanline are dropped first so the list stays strictly
    /// increasing.
    pub fn push(&mut self, event: HEvent) {
        if event.scanline as usize >= MAX_EVENTS {
            return;
        }
        while self.len > 0 && self.events[self.len - 1].scanline > event.scanline {
            self.len -= 1;
        }
        if self.len > 0 && self.events[self.len - 1].scanline == event.scanline {
            self.events[self.len - 1] = event;
            return;
        }
        self.events[self.len] = event;
        self.len += 1;
    }

    /// Iterate `(event, first_line, end_line)` ranges
    ///
    /// Each event covers `[event.scanline, next.scanline)`; the last one runs
    /// to the bottom of the screen.
    pub fn ranges(&self) -> impl Iterator<Item = (&HEvent, usize, usize)> + '_ {
        let events = self.events();
        events.iter().enumerate().map(move |(i, event)| {
            let end = events
                .get(i + 1)
                .map_or(SCREEN_HEIGHT, |next| next.scanline as usize);
            (event, event.scanline as usize, end)
        })
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Advance the vertical scroll of a loopy register by `lines` scanlines
///
/// Coarse Y and fine Y are treated as one 0-239 value per nametable; moving
/// past the bottom toggles the vertical nametable bit. Values 240-255 (the
/// attribute-table rows) behave as negative offsets.
pub(super) fn advance_vertical(reg: u16, lines: u16) -> u16 {
    let page_y = ((reg >> 11) & 1) as i32 * 240;
    let mut y = (((reg & 0x03E0) >> 2) | ((reg >> 12) & 0x07)) as i32;
    if y >= 240 {
        y -= 256;
    }
    let ny = page_y + y + lines as i32;
    let page = (ny / 240) & 1;
    let sy = ny % 240;
    (reg & !0x7BE0) | (((sy & 0xF8) << 2) as u16) | (((sy & 0x07) << 12) as u16) | ((page << 11) as u16)
}
