//! Turns view strings into terminal writes.
//!
//! The renderer remembers the last frame drawn in each screen mode and only
//! rewrites lines that changed. All bytes of one render are collected into a
//! buffer and written with a single call, which keeps partial frames off the
//! screen.

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, MoveUp, Show};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use serde::{Deserialize, Serialize};
use tracing::trace;
use unicode_width::UnicodeWidthChar;

use super::message::ScreenRequest;

/// Where frames are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenMode {
    /// In the normal scrollback, at the cursor position.
    #[default]
    Inline,
    /// In the terminal's dedicated full-screen buffer.
    Alternate,
}

/// Lines drawn for one screen mode.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct RenderFrame {
    lines: Vec<String>,
    /// Ignore `lines` and redraw everything on the next render.
    repaint: bool,
}

pub struct Renderer<W: Write> {
    out: W,
    buf: Vec<u8>,
    mode: ScreenMode,
    inline: RenderFrame,
    alternate: RenderFrame,
    cursor_hidden: bool,
    width: u16,
    height: u16,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, width: u16, height: u16) -> Self {
        Self {
            out,
            buf: Vec::with_capacity(4096),
            mode: ScreenMode::Inline,
            inline: RenderFrame::default(),
            alternate: RenderFrame::default(),
            cursor_hidden: false,
            width,
            height,
        }
    }

    pub const fn mode(&self) -> ScreenMode {
        self.mode
    }

    pub const fn cursor_hidden(&self) -> bool {
        self.cursor_hidden
    }

    pub const fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub const fn writer(&self) -> &W {
        &self.out
    }

    /// Reset frame state for a fresh run, optionally hiding the cursor.
    pub fn start(&mut self, hide_cursor: bool) -> io::Result<()> {
        self.inline = RenderFrame::default();
        self.alternate = RenderFrame::default();
        if hide_cursor {
            self.hide_cursor()?;
        }
        Ok(())
    }

    /// Draw `view`, writing only what differs from the previous frame.
    ///
    /// Lines wider than the terminal are cut at its edge, so every line
    /// takes exactly one row. Rendering the same view twice writes nothing
    /// the second time.
    pub fn render(&mut self, view: &str) -> io::Result<()> {
        let width = usize::from(self.width.max(1));
        let mut lines = split_lines(view, width);
        let max_lines = usize::from(self.height.max(1));
        if lines.len() > max_lines {
            // Keep the bottom of the view; the top scrolls away.
            lines.drain(..lines.len() - max_lines);
        }

        let frame = match self.mode {
            ScreenMode::Inline => &self.inline,
            ScreenMode::Alternate => &self.alternate,
        };
        if !frame.repaint && frame.lines == lines {
            return Ok(());
        }

        match self.mode {
            ScreenMode::Inline => draw_inline(&mut self.buf, &self.inline, &lines, width)?,
            ScreenMode::Alternate => {
                draw_alternate(&mut self.buf, &self.alternate, &lines, width)?;
            }
        }

        let frame = self.frame_mut();
        frame.lines = lines;
        frame.repaint = false;
        self.flush()
    }

    /// Record a new terminal size. The next render repaints everything.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.frame_mut().repaint = true;
    }

    pub fn enter_alt_screen(&mut self) -> io::Result<()> {
        if self.mode == ScreenMode::Alternate {
            return Ok(());
        }
        queue!(
            self.buf,
            EnterAlternateScreen,
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;
        if self.cursor_hidden {
            queue!(self.buf, Hide)?;
        }
        self.mode = ScreenMode::Alternate;
        self.alternate = RenderFrame {
            lines: Vec::new(),
            repaint: true,
        };
        self.flush()
    }

    /// Leave the alternate screen. The terminal restores the main screen as
    /// it was, and the inline frame is repainted in place on the next render.
    pub fn exit_alt_screen(&mut self) -> io::Result<()> {
        if self.mode == ScreenMode::Inline {
            return Ok(());
        }
        queue!(self.buf, LeaveAlternateScreen)?;
        if self.cursor_hidden {
            queue!(self.buf, Hide)?;
        }
        self.mode = ScreenMode::Inline;
        self.alternate = RenderFrame::default();
        self.inline.repaint = true;
        self.flush()
    }

    pub fn hide_cursor(&mut self) -> io::Result<()> {
        queue!(self.buf, Hide)?;
        self.cursor_hidden = true;
        self.flush()
    }

    pub fn show_cursor(&mut self) -> io::Result<()> {
        queue!(self.buf, Show)?;
        self.cursor_hidden = false;
        self.flush()
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        queue!(self.buf, Clear(ClearType::All), MoveTo(0, 0))?;
        *self.frame_mut() = RenderFrame {
            lines: Vec::new(),
            repaint: true,
        };
        self.flush()
    }

    pub fn apply(&mut self, request: ScreenRequest) -> io::Result<()> {
        trace!(?request, "applying screen request");
        match request {
            ScreenRequest::EnterAltScreen => self.enter_alt_screen(),
            ScreenRequest::ExitAltScreen => self.exit_alt_screen(),
            ScreenRequest::HideCursor => self.hide_cursor(),
            ScreenRequest::ShowCursor => self.show_cursor(),
            ScreenRequest::ClearScreen => self.clear_screen(),
        }
    }

    /// Restore the terminal: back to the main screen, cursor visible, and
    /// the prompt on a fresh line below the last inline frame.
    pub fn stop(&mut self) -> io::Result<()> {
        if self.mode == ScreenMode::Alternate {
            queue!(self.buf, LeaveAlternateScreen)?;
            self.mode = ScreenMode::Inline;
            self.alternate = RenderFrame::default();
        }
        if self.inline.lines.last().is_some_and(|line| !line.is_empty()) {
            self.buf.extend_from_slice(b"\r\n");
        }
        queue!(self.buf, Show)?;
        self.cursor_hidden = false;
        self.flush()
    }

    fn frame_mut(&mut self) -> &mut RenderFrame {
        match self.mode {
            ScreenMode::Inline => &mut self.inline,
            ScreenMode::Alternate => &mut self.alternate,
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        trace!(bytes = self.buf.len(), "flushing frame");
        self.out.write_all(&self.buf)?;
        self.out.flush()?;
        self.buf.clear();
        Ok(())
    }
}

fn split_lines(view: &str, width: usize) -> Vec<String> {
    view.split('\n')
        .map(|line| clip(line.strip_suffix('\r').unwrap_or(line), width).0)
        .collect()
}

/// Cut `line` to `width` columns, returning the kept text and its width.
///
/// Escape sequences take no columns and are all kept, so a style reset
/// after the cut still applies.
fn clip(line: &str, width: usize) -> (String, usize) {
    let mut out = String::with_capacity(line.len());
    let mut used = 0;
    let mut full = false;
    let mut chars = line.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c == '\x1b' {
            let end = escape_end(line.as_bytes(), start);
            out.push_str(&line[start..end]);
            while chars.next_if(|&(i, _)| i < end).is_some() {}
            continue;
        }
        if full {
            continue;
        }
        let w = c.width().unwrap_or(0);
        if used + w > width {
            full = true;
            continue;
        }
        used += w;
        out.push(c);
    }
    (out, used)
}

fn visible_width(line: &str) -> usize {
    clip(line, usize::MAX).1
}

/// Byte index just past the escape sequence starting at `start`.
fn escape_end(bytes: &[u8], start: usize) -> usize {
    let len = bytes.len();
    match bytes.get(start + 1) {
        // CSI: parameters, then a final byte in 0x40..=0x7e.
        Some(b'[') => bytes[start + 2..]
            .iter()
            .position(|b| (0x40..=0x7e).contains(b))
            .map_or(len, |i| start + 2 + i + 1),
        // OSC: ends with BEL or ST.
        Some(b']') => {
            let mut i = start + 2;
            while i < len {
                match bytes[i] {
                    0x07 => return i + 1,
                    0x1b if bytes.get(i + 1) == Some(&b'\\') => return i + 2,
                    _ => i += 1,
                }
            }
            len
        }
        Some(b) if b.is_ascii() => start + 2,
        _ => start + 1,
    }
}

/// Overwrite the previous inline frame in place.
///
/// The cursor rests on the last line of the previous frame.
fn draw_inline(
    buf: &mut Vec<u8>,
    previous: &RenderFrame,
    lines: &[String],
    width: usize,
) -> io::Result<()> {
    let previous_len = previous.lines.len();
    if previous_len > 1 {
        queue!(buf, MoveUp(line_count(previous_len - 1)))?;
    }
    buf.push(b'\r');

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            buf.extend_from_slice(b"\r\n");
        }
        if !previous.repaint && previous.lines.get(i) == Some(line) {
            continue;
        }
        buf.extend_from_slice(line.as_bytes());
        // A full row leaves the cursor on its last cell; clearing would erase it.
        if visible_width(line) < width {
            queue!(buf, Clear(ClearType::UntilNewLine))?;
        }
    }

    if previous_len > lines.len() {
        // The row below exists because the old frame was taller, so this
        // never scrolls.
        buf.extend_from_slice(b"\r\n");
        queue!(buf, Clear(ClearType::FromCursorDown), MoveUp(1))?;
    }
    Ok(())
}

/// Draw into the alternate screen using absolute row addressing.
fn draw_alternate(
    buf: &mut Vec<u8>,
    previous: &RenderFrame,
    lines: &[String],
    width: usize,
) -> io::Result<()> {
    if previous.repaint {
        queue!(buf, Clear(ClearType::All))?;
    }

    for (i, line) in lines.iter().enumerate() {
        if !previous.repaint && previous.lines.get(i) == Some(line) {
            continue;
        }
        queue!(buf, MoveTo(0, line_count(i)))?;
        buf.extend_from_slice(line.as_bytes());
        if visible_width(line) < width {
            queue!(buf, Clear(ClearType::UntilNewLine))?;
        }
    }

    if !previous.repaint {
        for i in lines.len()..previous.lines.len() {
            queue!(buf, MoveTo(0, line_count(i)), Clear(ClearType::CurrentLine))?;
        }
    }
    Ok(())
}

fn line_count(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}
