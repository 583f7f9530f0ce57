/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The play field is a side view of the travel axis: further platforms
/// to the right, the active token standing above its platform, fallen
/// tokens lying in the gap below.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::ColorTag;
use super::scene::Scene;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background so every cell (and the gap between rows)
    /// shares one colour.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── HUD inputs that don't come from the scene ──

pub struct Hud {
    pub best: usize,
    /// Keyboard charge in degrees while charging.
    pub charge: Option<f64>,
    pub short_threshold: f64,
    pub long_threshold: f64,
    pub motion_active: bool,
}

// ── Layout ──

/// Terminal columns per unit of travel distance.
const COLS_PER_UNIT: f32 = 2.0;
/// Platforms are drawn this many columns wide, centred on their offset.
const PLATFORM_W: usize = 5;
const HUD_ROW: usize = 0;
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const METER_W: usize = 24;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    enhanced_keys: bool,
    /// Raw mode is on and the terminal needs restoring.
    active: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            enhanced_keys: false,
            active: false,
        }
    }

    /// Enter raw alternate-screen mode. Returns whether the terminal will
    /// report key releases.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        self.active = true;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        self.enhanced_keys = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.enhanced_keys {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.cells.fill(Cell::INVALID);

        Ok(self.enhanced_keys)
    }

    /// Restore the terminal. Safe after a partial `init`, and a no-op when
    /// raw mode was never entered.
    pub fn cleanup(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, scene: &Scene, hud: &Hud) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        self.compose_hud(scene, hud);
        self.compose_field(scene);
        self.compose_help(hud);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, scene: &Scene, hud: &Hud) {
        self.front.fill_row(HUD_ROW, HUD_BG);
        let text = format!(
            " HOPPER  Platform:{:<5} Best:{:<5} Falls:{:<4} Alt:{:>7.1} ",
            scene.score, hud.best, scene.falls, scene.camera_y
        );
        self.front.put_str(0, HUD_ROW, &text, Color::White, HUD_BG);

        if let Some(deg) = hud.charge {
            let meter_x = text.chars().count() + 1;
            let (bar, color) = charge_meter(deg, hud.short_threshold, hud.long_threshold);
            self.front.put_str(meter_x, HUD_ROW, &bar, color, HUD_BG);
        }
    }

    fn compose_field(&mut self, scene: &Scene) {
        let h = self.front.height;
        let w = self.front.width;
        if h < 8 || w < 20 { return; }

        let ground = h / 2 + 1;
        let anchor = scene.player.map(|t| t.position).unwrap_or(0.0);
        let anchor_col = (w / 4) as f32;

        // Travel runs toward negative offsets; draw it left → right
        let to_col = |offset: f32| -> Option<usize> {
            let col = anchor_col + (anchor - offset) * COLS_PER_UNIT;
            if col >= 0.0 && (col as usize) < w { Some(col as usize) } else { None }
        };

        for p in scene.platforms.values() {
            if let Some(c) = to_col(p.offset) {
                let left = c.saturating_sub(PLATFORM_W / 2);
                for x in left..(left + PLATFORM_W).min(w) {
                    self.front.set(x, ground, Cell::new('▀', tag_color(p.color), Color::Reset));
                    self.front.set(x, ground + 1, Cell::new('█', tag_color(p.color), Color::Reset));
                }
            }
        }

        // Flag over the newest platform
        if let Some(c) = scene.frontier().and_then(to_col) {
            self.front.set(c, ground - 1, Cell::new('▲', Color::DarkGrey, Color::Reset));
        }

        for t in &scene.fallen {
            if let Some(c) = to_col(t.position) {
                self.front.set(c, ground + 3, Cell::new('○', Color::DarkGrey, Color::Reset));
            }
        }

        if let Some(t) = scene.player {
            if let Some(c) = to_col(t.position) {
                self.front.set(c, ground - 1, Cell::new('●', Color::White, Color::Reset));
            }
        }

        if scene.feedback_visible {
            let msg = "You missed";
            let row = ground.saturating_sub(4);
            let col = to_col(scene.feedback_offset)
                .unwrap_or(w / 2)
                .saturating_sub(msg.len() / 2);
            self.front.put_str(col, row, msg, Color::Rgb { r: 255, g: 90, b: 90 }, Color::Reset);
        }
    }

    fn compose_help(&mut self, hud: &Hud) {
        let row = self.front.height.saturating_sub(1);
        if row <= HUD_ROW { return; }
        let help = if hud.motion_active {
            " SPACE: charge/jump  │  Pad: release R2 to crouch, tilt up + squeeze R2 to jump  │  ESC/Q: quit"
        } else {
            " SPACE: charge/jump  │  ESC/Q: quit"
        };
        self.front.put_str(0, row, help, Color::DarkGrey, Color::Reset);
    }
}

/// Meter bar for a keyboard charge. Colour tells which band the jump is in.
fn charge_meter(deg: f64, short: f64, long: f64) -> (String, Color) {
    let fill = if long > 0.0 {
        ((deg / long).clamp(0.0, 1.0) * METER_W as f64).round() as usize
    } else {
        METER_W
    };
    let bar = format!("[{}{}]", "#".repeat(fill), ".".repeat(METER_W - fill));
    let color = if deg < short {
        Color::Yellow
    } else if deg < long {
        Color::Green
    } else {
        Color::Red
    };
    (bar, color)
}

fn tag_color(tag: ColorTag) -> Color {
    match tag {
        ColorTag::Red      => Color::Red,
        ColorTag::Orange   => Color::Rgb { r: 255, g: 150, b: 40 },
        ColorTag::Yellow   => Color::Yellow,
        ColorTag::Green    => Color::Green,
        ColorTag::Cyan     => Color::Cyan,
        ColorTag::Blue     => Color::Blue,
        ColorTag::Purple   => Color::Rgb { r: 150, g: 80, b: 220 },
        ColorTag::Magenta  => Color::Magenta,
        ColorTag::Gray     => Color::Grey,
        ColorTag::DarkGray => Color::DarkGrey,
    }
}
