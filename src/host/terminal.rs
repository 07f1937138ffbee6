use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::collections::VecDeque;
use std::io::{self, stdout, BufWriter, Stdout, Write};
use std::time::{Duration, Instant};
use tracing::debug;

use super::{FrameRequest, Host, HostEvent, ListenerId};
use crate::canvas::Surface;
use crate::error::SkyResult;

// How long to wait for input when no frame is pending.
const IDLE_POLL: Duration = Duration::from_millis(250);

pub trait InputSource {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;
    fn read(&mut self) -> io::Result<Event>;
}

pub struct CrosstermInput;

impl InputSource for CrosstermInput {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        event::poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        event::read()
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('q')
        || key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Full-screen terminal host. Each cell shows two surface pixels with `▄`:
/// the cell background is the upper pixel, the glyph the lower one.
pub struct TerminalHost<I: InputSource = CrosstermInput, W: Write = BufWriter<Stdout>> {
    input: I,
    out: W,
    cols: u16,
    rows: u16,
    refresh: Duration,
    deadline: Instant,
    pending_frame: Option<FrameRequest>,
    listeners: Vec<ListenerId>,
    resizes: VecDeque<ListenerId>,
    next_id: u64,
    output_buf: Vec<u8>,
    active: bool,
}

impl TerminalHost {
    pub fn enter(fps: u32) -> SkyResult<Self> {
        let mut out = BufWriter::with_capacity(1024 * 64, stdout());
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All)) {
            let _ = terminal::disable_raw_mode();
            return Err(e.into());
        }

        let (cols, rows) = terminal::size().unwrap_or((80, 24));
        let mut host = Self::with_io(CrosstermInput, out, cols, rows, fps);
        host.active = true;
        Ok(host)
    }
}

impl<I: InputSource, W: Write> TerminalHost<I, W> {
    fn with_io(input: I, out: W, cols: u16, rows: u16, fps: u32) -> Self {
        Self {
            input,
            out,
            cols,
            rows,
            refresh: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            deadline: Instant::now(),
            pending_frame: None,
            listeners: Vec::new(),
            resizes: VecDeque::new(),
            next_id: 1,
            output_buf: Vec::with_capacity(cols as usize * rows as usize * 25),
            active: false,
        }
    }

    /// Gives the terminal back. Safe to call more than once.
    pub fn leave(&mut self) -> SkyResult<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(self.out, Show, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn read_input(&mut self) -> SkyResult<bool> {
        match self.input.read()? {
            Event::Key(key) if is_quit(&key) => return Ok(true),
            Event::Resize(cols, rows) => {
                debug!(cols, rows, "terminal resized");
                self.cols = cols;
                self.rows = rows;
                execute!(self.out, Clear(ClearType::All))?;
                self.resizes.extend(self.listeners.iter().copied());
            }
            _ => {}
        }
        Ok(false)
    }

    /// Blocks until the next event. `None` once the user quits.
    ///
    /// Queued input is always drained before a frame is handed out, so a
    /// frame that is already late never hides a quit key or a resize.
    pub fn next_event(&mut self) -> SkyResult<Option<HostEvent>> {
        loop {
            if let Some(id) = self.resizes.pop_front() {
                return Ok(Some(HostEvent::Resize(id)));
            }

            let mut wait = match self.pending_frame {
                Some(_) => self.deadline.saturating_duration_since(Instant::now()),
                None => IDLE_POLL,
            };
            while self.input.poll(wait)? {
                if self.read_input()? {
                    return Ok(None);
                }
                wait = Duration::ZERO;
            }
            if !self.resizes.is_empty() {
                continue;
            }

            let now = Instant::now();
            if let Some(request) = self.pending_frame {
                if now >= self.deadline {
                    self.pending_frame = None;
                    self.deadline += self.refresh;
                    if self.deadline < now {
                        self.deadline = now + self.refresh;
                    }
                    return Ok(Some(HostEvent::Frame(request)));
                }
            }
        }
    }
}

impl<I: InputSource, W: Write> Host for TerminalHost<I, W> {
    fn viewport(&self) -> (u32, u32) {
        (self.cols as u32, self.rows as u32 * 2)
    }

    fn has_drawing_context(&self) -> bool {
        self.active
    }

    fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest(self.next_id());
        self.pending_frame = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending_frame == Some(request) {
            self.pending_frame = None;
        }
    }

    fn add_resize_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id());
        self.listeners.push(id);
        id
    }

    fn remove_resize_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|l| *l != id);
        self.resizes.retain(|l| *l != id);
    }

    fn present(&mut self, surface: &Surface) -> SkyResult<()> {
        encode_half_blocks(surface, self.cols, self.rows, &mut self.output_buf)?;
        self.out.write_all(&self.output_buf)?;
        self.out.flush()?;
        Ok(())
    }
}

impl<I: InputSource, W: Write> Drop for TerminalHost<I, W> {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

pub fn encode_half_blocks(surface: &Surface, cols: u16, rows: u16, buf: &mut Vec<u8>) -> io::Result<()> {
    buf.clear();
    buf.extend_from_slice(b"\x1b[H");
    if surface.is_empty() {
        return Ok(());
    }

    let rgb = surface.to_rgb8();
    let width = surface.width().min(cols as u32) as usize;
    let height = surface.height().min(rows as u32 * 2) as usize;
    let stride = surface.width() as usize;
    let at = |x: usize, y: usize| -> (u8, u8, u8) {
        if y >= height {
            return (0, 0, 0);
        }
        let i = (y * stride + x) * 3;
        (rgb[i], rgb[i + 1], rgb[i + 2])
    };

    let mut y = 0;
    while y < height {
        let mut prev_top = None;
        let mut prev_bot = None;
        for x in 0..width {
            let top = at(x, y);
            let bot = at(x, y + 1);
            if prev_top != Some(top) {
                write!(buf, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                prev_top = Some(top);
            }
            if prev_bot != Some(bot) {
                write!(buf, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                prev_bot = Some(bot);
            }
            buf.extend_from_slice("▄".as_bytes());
        }
        buf.extend_from_slice(b"\x1b[0m");
        if y + 2 < height {
            buf.extend_from_slice(b"\r\n");
        }
        y += 2;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Paint, Rect, Rgba};

    // Replays a fixed list of terminal events and counts polls.
    struct Scripted {
        events: VecDeque<Event>,
        polls: usize,
    }

    impl InputSource for Scripted {
        fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
            self.polls += 1;
            Ok(!self.events.is_empty())
        }

        fn read(&mut self) -> io::Result<Event> {
            self.events.pop_front().ok_or_else(|| io::Error::other("script exhausted"))
        }
    }

    fn scripted_host(events: Vec<Event>) -> TerminalHost<Scripted, Vec<u8>> {
        let input = Scripted {
            events: events.into(),
            polls: 0,
        };
        TerminalHost::with_io(input, Vec::new(), 40, 12, 500)
    }

    // Requests a frame whose deadline passed long ago, as after a slow render.
    fn overdue_frame(host: &mut TerminalHost<Scripted, Vec<u8>>) -> FrameRequest {
        let request = host.request_frame();
        host.deadline = Instant::now() - Duration::from_millis(50);
        request
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_quit_key_beats_overdue_frame() {
        for quit in [
            key(KeyCode::Char('q'), KeyModifiers::NONE),
            key(KeyCode::Esc, KeyModifiers::NONE),
            key(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut host = scripted_host(vec![quit]);
            overdue_frame(&mut host);
            assert_eq!(host.next_event().unwrap(), None);
        }
    }

    #[test]
    fn test_resize_is_delivered_before_overdue_frame() {
        let mut host = scripted_host(vec![Event::Resize(100, 30)]);
        let listener = host.add_resize_listener();
        let request = overdue_frame(&mut host);

        assert_eq!(host.next_event().unwrap(), Some(HostEvent::Resize(listener)));
        assert_eq!(host.viewport(), (100, 60));
        assert_eq!(host.next_event().unwrap(), Some(HostEvent::Frame(request)));
    }

    #[test]
    fn test_slow_frames_keep_reading_input() {
        let mut host = scripted_host(Vec::new());
        for _ in 0..20 {
            let request = overdue_frame(&mut host);
            assert_eq!(host.next_event().unwrap(), Some(HostEvent::Frame(request)));
        }
        assert!(host.input.polls >= 20, "polled {} times", host.input.polls);

        host.input.events.push_back(key(KeyCode::Char('q'), KeyModifiers::NONE));
        overdue_frame(&mut host);
        assert_eq!(host.next_event().unwrap(), None);
    }

    #[test]
    fn test_other_keys_do_not_stop_frames() {
        let mut host = scripted_host(vec![
            key(KeyCode::Char('x'), KeyModifiers::NONE),
            key(KeyCode::Char('c'), KeyModifiers::NONE),
        ]);
        let request = overdue_frame(&mut host);
        assert_eq!(host.next_event().unwrap(), Some(HostEvent::Frame(request)));
        assert!(host.input.events.is_empty());
    }

    #[test]
    fn test_cancelled_listener_gets_no_queued_resize() {
        let mut host = scripted_host(vec![Event::Resize(20, 10)]);
        let listener = host.add_resize_listener();
        let request = overdue_frame(&mut host);
        host.remove_resize_listener(listener);
        assert_eq!(host.next_event().unwrap(), Some(HostEvent::Frame(request)));
    }

    fn encode(surface: &Surface, cols: u16, rows: u16) -> String {
        let mut buf = Vec::new();
        encode_half_blocks(surface, cols, rows, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_two_pixel_rows_per_cell() {
        let mut surface = Surface::new(2, 2);
        surface.fill_rect(Rect::new(0.0, 0.0, 2.0, 1.0), &Paint::Solid(Rgba::rgb(255, 0, 0)));
        surface.fill_rect(Rect::new(0.0, 1.0, 2.0, 1.0), &Paint::Solid(Rgba::rgb(0, 0, 255)));
        let out = encode(&surface, 2, 1);
        assert_eq!(
            out,
            "\x1b[H\x1b[48;2;255;0;0m\x1b[38;2;0;0;255m▄▄\x1b[0m"
        );
    }

    #[test]
    fn test_odd_height_pads_with_black() {
        let mut surface = Surface::new(1, 3);
        surface.fill_rect(Rect::new(0.0, 0.0, 1.0, 3.0), &Paint::Solid(Rgba::rgb(9, 9, 9)));
        let out = encode(&surface, 1, 2);
        assert!(out.ends_with("\x1b[48;2;9;9;9m\x1b[38;2;0;0;0m▄\x1b[0m"));
        assert_eq!(out.matches("\r\n").count(), 1);
    }

    #[test]
    fn test_surface_larger_than_terminal_is_cropped() {
        let surface = Surface::new(10, 10);
        let out = encode(&surface, 3, 1);
        assert_eq!(out.matches('▄').count(), 3);
        assert!(!out.contains("\r\n"));
    }

    #[test]
    fn test_empty_surface_only_homes_cursor() {
        assert_eq!(encode(&Surface::new(0, 0), 80, 24), "\x1b[H");
    }
}
