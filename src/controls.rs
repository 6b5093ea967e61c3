use crate::particle::Rgb;
use std::io::Write;
use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    BurstNow,
    AutoFireworks,
}

impl Control {
    pub const ALL: [Control; 2] = [Control::BurstNow, Control::AutoFireworks];

    pub fn label(self, auto_on: bool) -> &'static str {
        match self {
            Control::BurstNow => "Burst Now",
            Control::AutoFireworks if auto_on => "Stop Auto",
            Control::AutoFireworks => "Auto Fireworks",
        }
    }
}

const LEFT_MARGIN: usize = 1;
const GAP: usize = 2;

const BAR_BG: Rgb = (12, 16, 34);
const BAR_FG: Rgb = (140, 150, 175);
const BUTTON_BG: Rgb = (40, 50, 86);
const BUTTON_ACTIVE_BG: Rgb = (150, 52, 92);
const BUTTON_FG: Rgb = (235, 235, 245);

/// One-row button strip along the bottom of the terminal.
#[derive(Default)]
pub struct ControlBar {
    auto_on: bool,
}

impl ControlBar {
    pub fn new(auto_on: bool) -> Self {
        Self { auto_on }
    }

    pub fn set_auto(&mut self, auto_on: bool) {
        self.auto_on = auto_on;
    }

    pub fn auto_on(&self) -> bool {
        self.auto_on
    }

    pub fn button_text(&self, control: Control) -> String {
        format!("[ {} ]", control.label(self.auto_on))
    }

    /// Column range each button occupies, left to right.
    pub fn spans(&self) -> Vec<(Control, Range<usize>)> {
        let mut start = LEFT_MARGIN;
        Control::ALL
            .iter()
            .map(|&control| {
                let len = self.button_text(control).chars().count();
                let span = start..start + len;
                start = span.end + GAP;
                (control, span)
            })
            .collect()
    }

    pub fn hit(&self, column: usize) -> Option<Control> {
        self.spans()
            .into_iter()
            .find(|(_, span)| span.contains(&column))
            .map(|(control, _)| control)
    }

    /// Appends the bar at terminal row `row` (0-based), clipped to `width`
    /// columns. `status` is right-aligned when it fits.
    pub fn encode(&self, buf: &mut Vec<u8>, row: usize, width: usize, status: &str) -> std::io::Result<()> {
        write!(buf, "\x1b[{};1H", row + 1)?;
        set_colors(buf, BAR_FG, BAR_BG)?;

        let mut col = 0;
        for (control, span) in self.spans() {
            if span.end > width {
                break;
            }
            pad(buf, span.start - col);
            let bg = if control == Control::AutoFireworks && self.auto_on {
                BUTTON_ACTIVE_BG
            } else {
                BUTTON_BG
            };
            set_colors(buf, BUTTON_FG, bg)?;
            buf.extend_from_slice(self.button_text(control).as_bytes());
            set_colors(buf, BAR_FG, BAR_BG)?;
            col = span.end;
        }

        let status_len = status.chars().count();
        if col + GAP + status_len + 1 <= width {
            pad(buf, width - status_len - 1 - col);
            buf.extend_from_slice(status.as_bytes());
            col = width - 1;
        }
        pad(buf, width.saturating_sub(col));
        buf.extend_from_slice(b"\x1b[0m");
        Ok(())
    }
}

fn set_colors(buf: &mut Vec<u8>, fg: Rgb, bg: Rgb) -> std::io::Result<()> {
    write!(
        buf,
        "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m",
        fg.0, fg.1, fg.2, bg.0, bg.1, bg.2
    )
}

fn pad(buf: &mut Vec<u8>, n: usize) {
    buf.extend(std::iter::repeat(b' ').take(n));
}
