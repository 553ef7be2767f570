//! Terminal front end: input mapping, frame pacing and half-block output.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use log::{info, warn};

use crate::graphics::{PixelBuffer, Rgba};
use crate::interaction::InputEvent;
use crate::state::Simulation;

/// Two left clicks on the same cell within this window detonate
const DOUBLE_CLICK: Duration = Duration::from_millis(400);
/// Wheel units per scroll notch
const WHEEL_STEP: f64 = 100.0;
/// Upper half block: foreground paints the top pixel, background the bottom one
const HALF_BLOCK: char = '\u{2580}';

/// Front-end settings that do not affect the simulation itself
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Target frames per second
    pub fps: u32,
    /// Virtual pixels per terminal half-cell along each axis
    pub supersample: usize,
    /// Stop after this many frames
    pub frames: Option<u64>,
    /// Detonate automatically on this frame
    pub detonate_at: Option<u64>,
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Restores the terminal when dropped, including on early returns
struct TerminalGuard;

impl TerminalGuard {
    fn enter<W: Write>(out: &mut W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            ResetColor,
            DisableMouseCapture,
            LeaveAlternateScreen,
            cursor::Show
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Runs a simulation inside the terminal
pub struct TerminalApp {
    sim: Simulation,
    options: Options,
    buffer: PixelBuffer,
    cols: u16,
    rows: u16,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
    visible: usize,
    paused: bool,
    debug: bool,
    last_mouse_pos: (u16, u16),
    last_click: Option<(Instant, u16, u16)>,
    size_warned: bool,
}

impl TerminalApp {
    pub fn new(sim: Simulation, options: Options) -> Self {
        TerminalApp {
            sim,
            options: Options {
                supersample: options.supersample.max(1),
                fps: options.fps.max(1),
                ..options
            },
            buffer: PixelBuffer::new(0, 0),
            cols: 80,
            rows: 24,
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
            visible: 0,
            paused: false,
            debug: false,
            last_mouse_pos: (0, 0),
            last_click: None,
            size_warned: false,
        }
    }

    /// Takes over the terminal until the user quits or the frame limit is hit
    pub fn run(mut self) -> anyhow::Result<()> {
        let mut out = io::stdout();
        let _guard = TerminalGuard::enter(&mut out)?;
        let frame_budget = Duration::from_secs_f64(1.0 / f64::from(self.options.fps));
        let mut last_frame = Instant::now();
        info!("entering render loop at {} fps", self.options.fps);

        loop {
            while event::poll(Duration::ZERO)? {
                if self.handle_event(event::read()?) == Flow::Quit {
                    return Ok(());
                }
            }

            let now = Instant::now();
            let dt = now.duration_since(last_frame).as_secs_f64();
            last_frame = now;
            if !self.paused {
                if self.options.detonate_at == Some(self.sim.frame()) {
                    self.sim.detonate();
                }
                self.sim.advance_frame(dt);
            }
            self.draw(&mut out)?;

            if let Some(limit) = self.options.frames {
                if self.sim.frame() >= limit {
                    info!("frame limit {limit} reached");
                    return Ok(());
                }
            }

            let spent = now.elapsed();
            if spent < frame_budget {
                // Wakes early when input arrives
                event::poll(frame_budget - spent)?;
            }
        }
    }

    fn handle_event(&mut self, event: Event) -> Flow {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => {
                if !self.paused {
                    self.handle_mouse(mouse);
                }
                Flow::Continue
            }
            // Size is re-read every frame
            _ => Flow::Continue,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return Flow::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Flow::Quit
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                self.paused = !self.paused;
                // Drop any drag that was in progress
                self.sim.handle_input(InputEvent::PointerUp);
                self.last_click = None;
            }
            KeyCode::Char('d') | KeyCode::Char('D') => self.debug = !self.debug,
            KeyCode::Char(' ') | KeyCode::Char('e') | KeyCode::Char('E') => {
                if !self.paused {
                    self.sim.handle_input(InputEvent::Detonate);
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if !self.paused {
                    self.sim.reset_camera();
                }
            }
            _ => {}
        }
        Flow::Continue
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let pos = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let now = Instant::now();
                let double = matches!(
                    self.last_click,
                    Some((at, col, row)) if now.duration_since(at) <= DOUBLE_CLICK && (col, row) == pos
                );
                if double {
                    self.sim.handle_input(InputEvent::Detonate);
                    self.last_click = None;
                } else {
                    self.last_click = Some((now, pos.0, pos.1));
                }
                self.last_mouse_pos = pos;
                self.sim.handle_input(InputEvent::PointerDown);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let ss = self.options.supersample as f64;
                let dx = (f64::from(pos.0) - f64::from(self.last_mouse_pos.0)) * ss;
                let dy = (f64::from(pos.1) - f64::from(self.last_mouse_pos.1)) * 2.0 * ss;
                self.last_mouse_pos = pos;
                self.sim.handle_input(InputEvent::PointerMove { dx, dy });
            }
            MouseEventKind::Up(MouseButton::Left) => self.sim.handle_input(InputEvent::PointerUp),
            MouseEventKind::ScrollDown => self.sim.handle_input(InputEvent::Wheel { delta: WHEEL_STEP }),
            MouseEventKind::ScrollUp => self.sim.handle_input(InputEvent::Wheel { delta: -WHEEL_STEP }),
            _ => {}
        }
    }

    /// Current terminal size, keeping the last known one if it cannot be read
    fn refresh_size(&mut self) {
        let size = termsize::get()
            .map(|size| (size.cols, size.rows))
            .or_else(|| terminal::size().ok());
        match size {
            Some((cols, rows)) if cols > 0 && rows > 0 => {
                self.cols = cols;
                self.rows = rows;
            }
            _ if !self.size_warned => {
                warn!(
                    "terminal size unavailable, keeping {}x{}",
                    self.cols, self.rows
                );
                self.size_warned = true;
            }
            _ => {}
        }
    }

    fn draw<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }

        self.refresh_size();
        let ss = self.options.supersample;
        let (cols, rows) = (self.cols as usize, self.rows as usize);
        self.buffer.resize(cols * ss, rows * 2 * ss);
        self.visible = self.sim.render(&mut self.buffer);

        let mut fg = None;
        let mut bg = None;
        for row in 0..rows {
            queue!(out, cursor::MoveTo(0, row as u16))?;
            for col in 0..cols {
                let top = self.buffer.average(col * ss, row * 2 * ss, ss, ss);
                let bottom = self.buffer.average(col * ss, (row * 2 + 1) * ss, ss, ss);
                if fg != Some(top) {
                    queue!(out, SetForegroundColor(to_color(top)))?;
                    fg = Some(top);
                }
                if bg != Some(bottom) {
                    queue!(out, SetBackgroundColor(to_color(bottom)))?;
                    bg = Some(bottom);
                }
                queue!(out, Print(HALF_BLOCK))?;
            }
        }

        queue!(
            out,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Color::Black)
        )?;
        if self.debug {
            for (line, text) in self.debug_lines().iter().enumerate() {
                queue!(out, cursor::MoveTo(1, line as u16), Print(text))?;
            }
        }
        if self.paused {
            let text = " Paused ";
            let x = (self.cols as usize).saturating_sub(text.len()) / 2;
            queue!(out, cursor::MoveTo(x as u16, self.rows / 2), Print(text))?;
        }
        queue!(out, ResetColor)?;
        out.flush()
    }

    fn debug_lines(&self) -> Vec<String> {
        let camera = self.sim.camera();
        let explosion = self.sim.explosion();
        vec![
            format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            format!("Azimuth: {:.2}, Polar: {:.2}", camera.azimuth, camera.polar),
            format!("Radius: {:.0}", camera.radius()),
            format!("FPS: {:.2}", self.fps),
            format!("Visible: {}", self.visible),
            if explosion.is_active() {
                format!("Explosion: frame {}", explosion.time())
            } else {
                "Explosion: idle".to_string()
            },
        ]
    }
}

fn to_color(c: Rgba) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}
