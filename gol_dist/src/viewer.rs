//! Window that mirrors a run from its event stream.
//!
//! The grid shown here is rebuilt from flip events; buttons send control keys.

use std::time::Duration;

use anyhow::{Result, anyhow};
use eframe::egui;
use egui::{Color32, Rect, Vec2};
use gol::event::EventReceiver;
use gol::{Event, Grid, Params, State};
use tokio::sync::mpsc;

pub fn run(params: &Params, events: EventReceiver, keys: mpsc::Sender<char>) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 900.0]),
        ..Default::default()
    };
    let app = Viewer::new(params, events, keys);

    eframe::run_native(
        "Distributed Game of Life",
        options,
        Box::new(move |_cc| Box::new(app)),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}

struct Viewer {
    grid: Grid,
    events: EventReceiver,
    keys: mpsc::Sender<char>,
    turn: u64,
    alive: Option<usize>,
    state: State,
    last_message: String,
    finished: bool,
    live_color: Color32,
    dead_color: Color32,
}

impl Viewer {
    fn new(params: &Params, events: EventReceiver, keys: mpsc::Sender<char>) -> Self {
        Self {
            grid: Grid::new(params.image_width, params.image_height),
            events,
            keys,
            turn: 0,
            alive: None,
            state: State::Executing,
            last_message: String::new(),
            finished: false,
            live_color: Color32::from_rgb(0, 200, 0),
            dead_color: Color32::from_rgb(40, 40, 40),
        }
    }

    /// Applies everything the engine has sent since the last frame.
    fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.apply(event),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.finished = true;
                    break;
                }
            }
        }
    }

    fn apply(&mut self, event: Event) {
        match event {
            Event::CellFlipped { cell, .. } => self.grid.toggle(cell.x, cell.y),
            Event::CellsFlipped { cells, .. } => {
                for cell in cells {
                    self.grid.toggle(cell.x, cell.y);
                }
            }
            Event::TurnComplete { turn } => self.turn = turn,
            Event::AliveCellsCount { turn, count } => {
                self.alive = Some(count);
                self.last_message = format!("Turn {turn}: {count} alive");
            }
            Event::StateChange { turn, state } => {
                self.state = state;
                self.last_message = format!("Turn {turn}: {state}");
            }
            Event::ImageOutputComplete { filename, .. } => {
                self.last_message = format!("Wrote {filename}");
            }
            Event::FinalTurnComplete { turn, alive } => {
                self.turn = turn;
                self.alive = Some(alive.len());
            }
        }
    }

    fn send(&self, key: char) {
        let _ = self.keys.try_send(key);
    }
}

impl eframe::App for Viewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Distributed Game of Life");

            // Controls
            ui.horizontal(|ui| {
                let running = !self.finished && self.state != State::Quitting;
                let button_text = if self.state == State::Paused { "▶ Resume" } else { "⏸ Pause" };
                if ui.add_enabled(running, egui::Button::new(button_text)).clicked() {
                    self.send('p');
                }
                if ui.add_enabled(running, egui::Button::new("💾 Snapshot")).clicked() {
                    self.send('s');
                }
                if ui.add_enabled(running, egui::Button::new("⏹ Quit")).clicked() {
                    self.send('q');
                }

                ui.separator();

                ui.label(format!("Turn: {}", self.turn));
                if let Some(alive) = self.alive {
                    ui.label(format!("Alive: {alive}"));
                }
            });

            ui.horizontal(|ui| {
                ui.label("Live:");
                ui.color_edit_button_srgba(&mut self.live_color);
                ui.label("Dead:");
                ui.color_edit_button_srgba(&mut self.dead_color);

                ui.separator();

                let status = if self.finished { "Finished" } else { self.last_message.as_str() };
                ui.label(status);
            });

            ui.separator();

            // Fit the whole grid into the remaining space, square cells.
            let avail = ui.available_size();
            let cell = (avail.x / self.grid.width() as f32)
                .min(avail.y / self.grid.height() as f32)
                .max(1.0);
            let total_size = Vec2::new(cell * self.grid.width() as f32, cell * self.grid.height() as f32);

            let (response, painter) = ui.allocate_painter(total_size, egui::Sense::hover());
            let start_pos = response.rect.min;
            painter.rect_filled(Rect::from_min_size(start_pos, total_size), 0.0, self.dead_color);

            // Only live cells are drawn over the dead background
            for row in 0..self.grid.height() {
                for (col, &byte) in self.grid.row(row).iter().enumerate() {
                    if byte != gol::ALIVE {
                        continue;
                    }
                    let rect = Rect::from_min_size(
                        egui::pos2(start_pos.x + col as f32 * cell, start_pos.y + row as f32 * cell),
                        Vec2::splat(cell),
                    );
                    painter.rect_filled(rect, 0.0, self.live_color);
                }
            }
        });

        // Keep polling while the engine is still sending
        if !self.finished {
            ctx.request_repaint_after(Duration::from_millis(16));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gol::Cell;

    #[test]
    fn flips_rebuild_the_grid() {
        let params = Params { image_width: 4, image_height: 4, threads: 1, ..Params::default() };
        let (tx, rx) = gol::event::channel();
        let (keys, _key_rx) = mpsc::channel(1);
        let mut viewer = Viewer::new(&params, rx, keys);

        tx.send(Event::CellFlipped { turn: 0, cell: Cell::new(1, 1) }).unwrap();
        tx.send(Event::CellsFlipped { turn: 1, cells: vec![Cell::new(1, 1), Cell::new(2, 2)] }).unwrap();
        tx.send(Event::TurnComplete { turn: 1 }).unwrap();
        viewer.drain_events();
        assert_eq!(viewer.grid.alive_cells(), vec![Cell::new(2, 2)]);
        assert_eq!(viewer.turn, 1);
        assert!(!viewer.finished);

        drop(tx);
        viewer.drain_events();
        assert!(viewer.finished);
    }
}
