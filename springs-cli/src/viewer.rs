//! Interactive viewer for springs scenarios
//!
//! Draws the world every frame and advances it `speed` steps per frame while
//! playing. Scenario files are watched and reloaded when they change.

use eframe::egui;
use notify::{Event, RecommendedWatcher, Watcher};
use springs_core::{
    build_simulation_context, get_particle_states, step_simulation, SimulationContext,
    DEFAULT_SPEED,
};
use std::sync::mpsc;

use crate::{Overrides, Source};

const MASS_RADIUS: f32 = 10.0;

/// Meters visible across the shorter side of the canvas
const WORLD_SPAN: f32 = 30.0;

pub fn launch(source: Source, overrides: Overrides) -> Result<(), Box<dyn std::error::Error>> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([720.0, 760.0]),
        ..Default::default()
    };
    eframe::run_native(
        "springs",
        options,
        Box::new(move |cc| Ok(Box::new(Viewer::new(source, overrides, cc)))),
    )?;
    Ok(())
}

pub struct Viewer {
    source: Source,
    overrides: Overrides,
    sim_opt: Option<SimulationContext>,
    last_error: Option<String>,
    playing: bool,
    speed: usize,
    friction: f64,
    gravity: f64,
    #[allow(dead_code)] // Kept alive to maintain file watching
    file_watcher: Option<RecommendedWatcher>,
    file_receiver: mpsc::Receiver<notify::Result<Event>>,
}

impl Viewer {
    pub fn new(source: Source, overrides: Overrides, _cc: &eframe::CreationContext<'_>) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })
        .ok();

        if let (Some(w), Some(path)) = (watcher.as_mut(), source.watched_path()) {
            if let Err(e) = w.watch(path, notify::RecursiveMode::NonRecursive) {
                ftlog::warn!("not watching {path:?}: {e}");
            }
        }

        let mut app = Self {
            source,
            overrides,
            sim_opt: None,
            last_error: None,
            playing: false,
            speed: DEFAULT_SPEED,
            friction: 0.0,
            gravity: 0.0,
            file_watcher: watcher,
            file_receiver: rx,
        };

        app.reload();
        app
    }

    fn reload(&mut self) {
        let built = self.source.load().and_then(|mut scenario| {
            self.overrides.apply(&mut scenario);
            build_simulation_context(&scenario)
        });

        match built {
            Ok(sim) => {
                self.friction = sim.world.friction();
                self.gravity = sim.world.gravity();
                self.sim_opt = Some(sim);
                self.last_error = None;
            }
            Err(e) => {
                ftlog::warn!("failed to load scenario: {e}");
                self.last_error = Some(e.to_string());
                self.sim_opt = None;
                self.playing = false;
            }
        }
    }

    fn check_file_changes(&mut self) {
        let mut needs_reload = false;
        while let Ok(event) = self.file_receiver.try_recv() {
            match event {
                Ok(Event {
                    kind: notify::EventKind::Modify(_),
                    ..
                }) => needs_reload = true,
                Ok(_) => {}
                Err(e) => ftlog::warn!("file watcher error: {e}"),
            }
        }

        if needs_reload {
            ftlog::info!("scenario changed on disk, reloading");
            self.reload();
        }
    }

    fn advance(&mut self) {
        let Some(sim) = self.sim_opt.as_mut() else {
            return;
        };
        for _ in 0..self.speed.max(1) {
            match step_simulation(sim) {
                Ok(false) => {}
                Ok(true) => {
                    self.playing = false;
                    break;
                }
                Err(e) => {
                    self.last_error = Some(e.to_string());
                    self.playing = false;
                    break;
                }
            }
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button(if self.playing { "⏸ Pause" } else { "▶ Play" }).clicked() {
                self.playing = !self.playing;
            }

            if ui.button("⏮ Reset").clicked() {
                self.reload();
                self.playing = false;
            }

            if ui.button("⏭ Step").clicked() {
                let speed = std::mem::replace(&mut self.speed, 1);
                self.advance();
                self.speed = speed;
            }

            ui.separator();
            ui.add(egui::Slider::new(&mut self.speed, 1..=100).text("steps/frame"));
        });

        ui.horizontal(|ui| {
            let friction =
                ui.add(egui::Slider::new(&mut self.friction, 0.0..=2.0).text("friction"));
            let gravity =
                ui.add(egui::Slider::new(&mut self.gravity, 0.0..=20.0).text("gravity"));

            if let Some(sim) = self.sim_opt.as_mut() {
                let mut result = Ok(());
                if friction.changed() {
                    result = result.and(sim.world.set_friction(self.friction));
                }
                if gravity.changed() {
                    result = result.and(sim.world.set_gravity(self.gravity));
                }
                if let Err(e) = result {
                    self.last_error = Some(e.to_string());
                }

                ui.separator();
                let e = sim.world.energy();
                ui.label(format!(
                    "t = {:.2}  E = {:.3}  K = {:.3}  U = {:.3}",
                    sim.world.time(),
                    e.total,
                    e.kinetic,
                    e.potential
                ));
            }
        });
    }

    fn draw(&self, ui: &mut egui::Ui) {
        let rect = ui.max_rect();
        let painter = ui.painter();
        painter.rect_filled(rect, 0.0, egui::Color32::BLACK);

        let Some(sim) = &self.sim_opt else {
            return;
        };

        let center = rect.center();
        let scale = rect.width().min(rect.height()) / WORLD_SPAN;
        let to_screen =
            |p: glam::DVec2| center + egui::vec2(p.x as f32 * scale, -(p.y as f32) * scale);

        for (_, connection) in sim.world.connections() {
            let (Some(from), Some(to)) = (
                sim.world.particle(connection.from()),
                sim.world.particle(connection.to()),
            ) else {
                continue;
            };
            painter.line_segment(
                [to_screen(from.position()), to_screen(to.position())],
                egui::Stroke::new(3.0, egui::Color32::YELLOW),
            );
        }

        let square = egui::vec2(2.0 * MASS_RADIUS, 2.0 * MASS_RADIUS);
        for particle in get_particle_states(sim) {
            let pos = to_screen(particle.position);
            if particle.anchored {
                painter.rect_filled(
                    egui::Rect::from_center_size(pos, square),
                    0.0,
                    egui::Color32::WHITE,
                );
            } else {
                painter.circle_filled(pos, MASS_RADIUS, egui::Color32::YELLOW);
            }
        }
    }
}

impl eframe::App for Viewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_file_changes();

        egui::TopBottomPanel::top("controls").show(ctx, |ui| self.controls(ui));

        if let Some(error) = self.last_error.clone() {
            egui::TopBottomPanel::bottom("errors").show(ctx, |ui| {
                let text = egui::RichText::new(format!("Error: {}", error));
                ui.label(text.color(egui::Color32::RED));
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| self.draw(ui));

        if self.playing {
            self.advance();
            ctx.request_repaint();
        }
    }
}
