use crate::config::Settings;
use crossterm::event::Event;
use std::io::Write;

pub mod fireworks;

pub trait Effect {
    /// Builds the effect for a terminal of `cols` x `rows` character cells.
    fn new(cols: usize, rows: usize, settings: &Settings, rng: fastrand::Rng) -> Self
    where
        Self: Sized;
    /// Advances one fixed simulation frame of `dt` seconds.
    fn update(&mut self, dt: f32);
    fn render(&mut self, out: &mut dyn Write) -> std::io::Result<()>;
    fn resize(&mut self, cols: usize, rows: usize);
    fn handle_event(&mut self, _event: &Event) {}
}
