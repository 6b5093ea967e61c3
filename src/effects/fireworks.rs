use super::Effect;
use crate::canvas::{Canvas, Surface};
use crate::config::Settings;
use crate::controls::{Control, ControlBar};
use crate::emitter::{self, BurstOptions, Rocket};
use crate::particle::Rgb;
use crate::stars::StarField;
use crate::store::ParticleStore;
use crate::timer::{Interval, Timeout};
use crossterm::event::{Event, KeyCode, KeyEventKind, MouseEvent, MouseEventKind};
use std::io::Write;
use tracing::{debug, info, trace};

const CLICK_BURST_COUNT: usize = 120;
const BURST_NOW_COUNT: usize = 160;

// Auto mode bursts carry 100-179 particles.
const AUTO_BURST_MIN: usize = 100;
const AUTO_BURST_SPREAD: usize = 80;

// Auto mode period, drawn once each time it is switched on.
const AUTO_PERIOD_MIN_MS: f32 = 900.0;
const AUTO_PERIOD_SPREAD_MS: f32 = 800.0;

/// Running totals for the session log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub rockets: u64,
    /// Bursts fired directly: clicks, Burst Now and auto mode. Rocket
    /// finales are not counted here.
    pub bursts: u64,
}

/// The whole show: owns the particles, rockets in flight, timers and the
/// persistent canvas they draw into.
pub struct FireworksEffect {
    cols: usize,
    rows: usize,
    canvas: Canvas,
    store: ParticleStore,
    rockets: Vec<Rocket>,
    stars: StarField,
    controls: Option<ControlBar>,
    palette: Vec<Rgb>,
    background: Rgb,
    fade_alpha: f32,
    auto: Option<Interval>,
    ambient: Interval,
    launch_chance: f32,
    warmup: Vec<Timeout>,
    rng: fastrand::Rng,
    stats: Stats,
    output_buf: Vec<u8>,
}

impl Effect for FireworksEffect {
    fn new(cols: usize, rows: usize, settings: &Settings, rng: fastrand::Rng) -> Self {
        let controls = settings.controls.then(|| ControlBar::new(false));
        let canvas = Canvas::new(cols, drawing_rows(rows, controls.is_some()), settings.pixel_scale);

        let mut effect = Self {
            cols,
            rows,
            canvas,
            store: ParticleStore::new(),
            rockets: Vec::new(),
            stars: StarField::default(),
            controls,
            palette: settings.palette.clone(),
            background: settings.background,
            fade_alpha: settings.fade_alpha,
            auto: None,
            ambient: Interval::new(settings.launch_interval_ms),
            launch_chance: settings.launch_chance,
            warmup: settings.warmup_ms.iter().map(|&ms| Timeout::new(ms)).collect(),
            rng,
            stats: Stats::default(),
            output_buf: Vec::with_capacity(cols * rows * 25),
        };
        if settings.auto {
            effect.toggle_auto();
        }
        info!(
            cols,
            rows,
            width = effect.canvas.width(),
            height = effect.canvas.height(),
            "fireworks ready"
        );
        effect
    }

    fn update(&mut self, dt: f32) {
        let dt_ms = dt * 1000.0;

        let warmups_due = self
            .warmup
            .iter_mut()
            .map(|timeout| timeout.advance(dt_ms))
            .filter(|&fired| fired)
            .count();
        self.warmup.retain(|t| !t.is_done());
        for _ in 0..warmups_due {
            self.launch_rocket();
        }

        for _ in 0..self.ambient.advance(dt_ms) {
            if self.auto.is_none() && self.rng.f32() < self.launch_chance {
                self.launch_rocket();
            }
        }

        let auto_due = self.auto.as_mut().map_or(0, |interval| interval.advance(dt_ms));
        for _ in 0..auto_due {
            self.auto_fire();
        }

        for rocket in &mut self.rockets {
            rocket.tick(&mut self.store, &self.palette, &mut self.rng);
        }
        self.rockets.retain(|rocket| !rocket.is_done());

        self.canvas.fade(self.background, self.fade_alpha);
        self.stars.draw(&mut self.canvas, &mut self.rng);
        self.store.step_and_prune(&mut self.canvas, &mut self.rng);
    }

    fn render(&mut self, out: &mut dyn Write) -> std::io::Result<()> {
        self.output_buf.clear();
        self.canvas.encode(&mut self.output_buf)?;

        if let Some(bar) = &self.controls {
            let status = format!("{} particles", self.store.len());
            bar.encode(&mut self.output_buf, self.rows.saturating_sub(1), self.cols, &status)?;
        }

        out.write_all(&self.output_buf)?;
        out.flush()?;
        Ok(())
    }

    fn resize(&mut self, cols: usize, rows: usize) {
        self.cols = cols;
        self.rows = rows;
        self.canvas.resize(cols, drawing_rows(rows, self.controls.is_some()));
        debug!(
            cols,
            rows,
            width = self.canvas.width(),
            height = self.canvas.height(),
            "canvas resized"
        );
    }

    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(_),
                column,
                row,
                ..
            }) => self.click(*column as usize, *row as usize),
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('b') | KeyCode::Char(' ') | KeyCode::Enter => {
                    self.activate(Control::BurstNow)
                }
                KeyCode::Char('a') => self.activate(Control::AutoFireworks),
                _ => {}
            },
            _ => {}
        }
    }
}

impl FireworksEffect {
    pub fn particle_count(&self) -> usize {
        self.store.len()
    }

    pub fn rocket_count(&self) -> usize {
        self.rockets.len()
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn is_auto(&self) -> bool {
        self.auto.is_some()
    }

    pub fn auto_period_ms(&self) -> Option<f32> {
        self.auto.as_ref().map(Interval::period_ms)
    }

    pub fn activate(&mut self, control: Control) {
        match control {
            Control::BurstNow => self.burst_now(),
            Control::AutoFireworks => self.toggle_auto(),
        }
    }

    pub fn toggle_auto(&mut self) {
        if self.auto.take().is_some() {
            info!("auto fireworks stopped");
        } else {
            let period = AUTO_PERIOD_MIN_MS + self.rng.f32() * AUTO_PERIOD_SPREAD_MS;
            self.auto = Some(Interval::new(period));
            info!(period_ms = period, "auto fireworks started");
        }
        let auto_on = self.auto.is_some();
        if let Some(bar) = &mut self.controls {
            bar.set_auto(auto_on);
        }
    }

    pub fn launch_rocket(&mut self) {
        let rocket = Rocket::launch(self.canvas.width(), self.canvas.height(), &mut self.rng);
        debug!(x = rocket.x(), peak_y = rocket.peak_y(), "rocket launched");
        self.stats.rockets += 1;
        self.rockets.push(rocket);
    }

    /// One large burst somewhere in the upper middle of the sky.
    pub fn burst_now(&mut self) {
        let (width, height) = (self.canvas.width(), self.canvas.height());
        let x = (width / 2.0) * (0.6 + (self.rng.f32() - 0.5));
        let y = height * (0.25 + self.rng.f32() * 0.15);
        self.burst(x, y, BURST_NOW_COUNT);
    }

    fn auto_fire(&mut self) {
        if self.rng.bool() {
            self.launch_rocket();
        } else {
            let (width, height) = (self.canvas.width(), self.canvas.height());
            let x = self.rng.f32() * (width * 0.9) + width * 0.05;
            let y = height * (0.12 + self.rng.f32() * 0.25);
            let count = AUTO_BURST_MIN + self.rng.usize(..AUTO_BURST_SPREAD);
            self.burst(x, y, count);
        }
    }

    fn burst(&mut self, x: f32, y: f32, count: usize) {
        emitter::burst(
            &mut self.store,
            x,
            y,
            &BurstOptions::new(count, &self.palette),
            &mut self.rng,
        );
        self.stats.bursts += 1;
        trace!(x, y, count, live = self.store.len(), "burst");
    }

    /// Clicks on the bottom row go to the control bar, even when the terminal
    /// is too short to leave any other row; clicks on the sky burst at the
    /// cell's center.
    fn click(&mut self, column: usize, row: usize) {
        if let Some(bar) = &self.controls {
            if row + 1 >= self.rows {
                if let Some(control) = bar.hit(column) {
                    self.activate(control);
                }
                return;
            }
        }
        let sky_rows = self.canvas.pixel_size().1 / 2;
        if row < sky_rows {
            let scale = self.canvas.scale();
            let x = (column as f32 + 0.5) * scale;
            let y = (row as f32 * 2.0 + 1.0) * scale;
            self.burst(x, y, CLICK_BURST_COUNT);
        }
    }
}

fn drawing_rows(rows: usize, controls: bool) -> usize {
    if controls {
        rows.saturating_sub(1).max(1)
    } else {
        rows.max(1)
    }
}
