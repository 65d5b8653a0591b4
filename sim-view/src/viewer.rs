//! Interactive palm-tree viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Simulation`] and the
//! parameters of the planted tree, and implements [`eframe::App`] to draw
//! the tree and drive it through an egui UI.

use eframe::App;
use glam::Vec2;
use rand::rngs::ThreadRng;
use sim_core::{
    body::BodyKind,
    config::{SimConfig, TreeParams},
    simulation::Simulation,
    types::NodeId,
};

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The simulation core: [`Simulation`] and the [`TreeParams`] used to
///   (re)plant the tree.
/// - UI configuration (pan/zoom, poke tool, timing).
/// - eframe/egui callbacks for drawing and user interaction.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input (clicks poke the tree).
/// 2. If `running` is `true` and enough time has passed, call [`Viewer::step_once`].
/// 3. Render branches, leaves and anchors.
///
/// ### Fields
/// - `sim` - Simulation context (world, wind, shedding, random source).
/// - `params` - Tree parameters applied on the next replant.
///
/// - `running` - Whether the simulation is currently auto-advancing.
/// - `zoom` - Zoom factor for world-to-screen coordinate mapping.
/// - `pan` - Screen-space pan offset in pixels.
///
/// - `poke_radius` - World-space radius of a click poke.
/// - `poke_impulse` - Velocity kick at the center of a poke.
///
/// - `last_detached` - Leaves shed in the last simulation step (for highlighting).
///
/// - `step_interval` - Target time step between automatic simulation steps (seconds).
/// - `last_step_time` - Time stamp of the last step (egui time).
/// - `last_step_dt` - Actual time delta between the last two steps (for display only).
pub struct Viewer {
    sim: Simulation<ThreadRng>,
    params: TreeParams,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,

    poke_radius: f32,
    poke_impulse: f32,

    last_detached: Vec<NodeId>,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a viewer with default configuration and a freshly planted tree.
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Creates a viewer running `config`, with the default tree planted.
    ///
    /// The camera starts zoomed so the default tree fills most of the view,
    /// shifted down so the base sits below the center.
    pub fn with_config(config: SimConfig) -> Self {
        let params = TreeParams::default();
        let mut sim = Simulation::new(config, rand::rng());
        sim.plant(&params);

        Self {
            sim,
            params,
            running: false,
            zoom: 1.5,
            pan: egui::vec2(0.0, 200.0),
            poke_radius: 60.0,
            poke_impulse: 4.0,
            last_detached: Vec::with_capacity(8),
            step_interval: 1.0 / 60.0,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        }
    }

    /// Replants the tree from the current `params`.
    ///
    /// Keeps the configuration and camera, drops every body, clears
    /// `last_detached` and stops auto-running.
    fn reset(&mut self) {
        self.sim.clear();
        self.sim.plant(&self.params);
        self.last_detached.clear();
        self.running = false;
    }

    /// Advances the simulation by a single step and remembers which
    /// leaves were shed.
    fn step_once(&mut self) {
        let report = self.sim.step();
        if !report.detached.is_empty() {
            log::info!(
                "step {}: shed {} leaves",
                report.step,
                report.detached.len()
            );
        }
        self.last_detached = report.detached;
    }

    /// Pokes the tree at a world-space position with the current tool settings.
    fn poke_at(&mut self, center: Vec2) -> usize {
        self.sim.poke(center, self.poke_radius, self.poke_impulse)
    }

    /// Converts a world-space position to screen-space.
    ///
    /// World coordinates are scaled by `zoom`, offset by `pan`, and then
    /// centered inside the given `rect`. The y-axis is flipped so that
    /// positive y goes up in world space.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + p.x * self.zoom + self.pan.x,
            center.y - p.y * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to world-space.
    ///
    /// This is the inverse of [`Viewer::world_to_screen`].
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        Vec2::new(x, y)
    }

    fn labeled_drag_u32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut u32,
        range: std::ops::RangeInclusive<u32>,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(0.1));
        });
    }

    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.001..=1.0)
                        .speed(0.001),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Replant").clicked() {
                    self.reset();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.1..=10.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (timing, node and leaf counts).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt target = {:.3} s", self.step_interval));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!("step = {}", self.sim.steps()));
                ui.label(format!("bodies = {}", self.sim.world.bodies.len()));
                ui.label(format!(
                    "leaves attached = {}",
                    self.sim.world.attached_leaf_count()
                ));
                ui.label(format!(
                    "detached = {}",
                    self.sim.world.detached_leaf_count()
                ));
                ui.label(format!("shed last step = {}", self.last_detached.len()));
            });
        });
    }

    /// Builds the right-hand configuration panel.
    ///
    /// Wind, shedding and poke settings apply immediately; tree settings
    /// apply on the next replant.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Tree (on replant)");
                Self::labeled_drag_u32(ui, "max_depth:", &mut self.params.max_depth, 0..=8);
                Self::labeled_drag_f32(
                    ui,
                    "branch_length:",
                    &mut self.params.branch_length,
                    0.0..=300.0,
                    1.0,
                );
                Self::labeled_drag_f32(
                    ui,
                    "decay:",
                    &mut self.params.segment_length_decay,
                    0.0..=1.0,
                    0.005,
                );
                Self::labeled_drag_f32(
                    ui,
                    "branch_angle:",
                    &mut self.params.branch_angle,
                    0.0..=std::f32::consts::FRAC_PI_2,
                    0.01,
                );

                ui.separator();
                ui.label("Wind");
                let wind = &mut self.sim.wind;
                Self::labeled_drag_f32(ui, "jitter:", &mut wind.jitter, 0.0..=1.0, 0.005);
                Self::labeled_drag_f32(ui, "strength:", &mut wind.strength, 0.0..=1e-3, 1e-6);
                Self::labeled_drag_f32(
                    ui,
                    "ground_cutoff:",
                    &mut wind.ground_cutoff,
                    -100.0..=300.0,
                    0.5,
                );

                ui.separator();
                ui.label("Shedding");
                let shed = &mut self.sim.shed;
                Self::labeled_drag_f32(
                    ui,
                    "speed_threshold:",
                    &mut shed.speed_threshold,
                    0.0..=10.0,
                    0.01,
                );
                Self::labeled_drag_f32(ui, "fast_draw:", &mut shed.fast_draw, 0.0..=1.0, 0.001);
                Self::labeled_drag_f32(
                    ui,
                    "spontaneous_draw:",
                    &mut shed.spontaneous_draw,
                    0.0..=1.0,
                    0.0001,
                );

                ui.separator();
                ui.label("Poke");
                Self::labeled_drag_f32(ui, "radius:", &mut self.poke_radius, 1.0..=500.0, 1.0);
                Self::labeled_drag_f32(ui, "impulse:", &mut self.poke_impulse, 0.0..=20.0, 0.1);

                ui.separator();
                if ui.button("Reset cfg to default").clicked() {
                    self.sim.set_config(SimConfig::default());
                    self.params = TreeParams::default();
                }
            });
    }

    /// Draws a circle showing the poke radius at the hovered world position.
    fn ui_tool_hint(&self, painter: &egui::Painter, rect: egui::Rect, hover_world: Option<Vec2>) {
        let Some(center) = hover_world else {
            return;
        };
        let stroke = egui::Stroke::new(1.0, egui::Color32::YELLOW);
        painter.circle_stroke(
            self.world_to_screen(center, rect),
            self.poke_radius * self.zoom,
            stroke,
        );
    }

    /// Builds the central panel where the tree is drawn and interacted with.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            let hover_world = response.hover_pos().map(|p| self.screen_to_world(p, rect));

            // Click to poke.
            if response.clicked()
                && let Some(center) = hover_world
            {
                self.poke_at(center);
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.1, 10.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            // Floor line.
            if let Some(floor) = self.sim.world.cfg.floor {
                let y = self.world_to_screen(Vec2::new(0.0, floor), rect).y;
                painter.hline(
                    rect.x_range(),
                    y,
                    egui::Stroke::new(1.0, egui::Color32::DARK_GRAY),
                );
            }

            let bodies = &self.sim.world.bodies;

            // Branches and stems, thicker toward the trunk.
            for d in self.sim.world.constraints.distances() {
                let width = match bodies[d.b].kind {
                    BodyKind::Branch { depth } => (6.0 - depth as f32).max(1.0),
                    BodyKind::Leaf { .. } => 1.0,
                    BodyKind::Anchor => continue,
                };
                let a = self.world_to_screen(bodies[d.a].pos, rect);
                let b = self.world_to_screen(bodies[d.b].pos, rect);
                painter.line_segment([a, b], egui::Stroke::new(width, egui::Color32::BROWN));
            }

            // Leaves and anchors (highlighting leaves shed in the last step in red).
            for (i, body) in bodies.iter().enumerate() {
                let p = self.world_to_screen(body.pos, rect);
                match body.kind {
                    BodyKind::Anchor => {
                        painter.circle_filled(p, 4.0, egui::Color32::GRAY);
                    }
                    BodyKind::Branch { .. } => {}
                    BodyKind::Leaf { attached } => {
                        let color = if self.last_detached.contains(&i) {
                            egui::Color32::RED
                        } else if attached {
                            egui::Color32::LIGHT_GREEN
                        } else {
                            egui::Color32::from_rgb(230, 150, 40)
                        };
                        let r = (body.radius * self.zoom).max(2.0);
                        let tip = p + egui::vec2(body.angle.cos(), -body.angle.sin()) * r;
                        painter.circle_filled(p, r, color);
                        painter.line_segment([p, tip], egui::Stroke::new(1.0, egui::Color32::DARK_GREEN));
                    }
                }
            }

            self.ui_tool_hint(&painter, rect, hover_world);

            // Auto-run simulation if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
