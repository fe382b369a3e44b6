//! Interactive 3D space-colonization tree viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the simulation state
//! (tree, attractors, configuration, topology overlay) and implements
//! [`eframe::App`] to render a projected view of the growing tree and
//! control the simulation through an egui UI.

use eframe::App;
use glam::{Vec2, Vec3};
use grow_core::{
    attractor::{AttractorSet, BoxSampler, RejectionSampler},
    config::GrowthConfig,
    grower,
    influence_buffer::InfluenceBuffer,
    nearest::FullScan,
    topology::{self, GeometryEmitter, SegmentCollector, TopologyParams},
    tree::Tree,
    types::NodeId,
};

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The simulation core: [`Tree`], [`AttractorSet`], [`InfluenceBuffer`],
///   [`GrowthConfig`], [`TopologyParams`].
/// - A simple orbit camera (yaw/pitch) with orthographic projection,
///   zoom and pan.
/// - eframe/egui callbacks for drawing and user interaction.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and enough time has passed, call
///    [`Viewer::step_once`].
/// 3. Render the tree edges, attractors, and topology overlay.
pub struct Viewer {
    tree: Tree,
    attractors: AttractorSet,
    acc: InfluenceBuffer,
    cfg: GrowthConfig,
    topo_params: TopologyParams,

    /// Snapshot of the last topology build (segments + debug cloud).
    overlay: Option<SegmentCollector>,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,
    yaw: f32,
    pitch: f32,

    spawn_count: usize,
    spawn_center: Vec3,
    spawn_half_extent: f32,
    spawn_radius: f32,

    last_new_ids: Vec<NodeId>,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a new viewer with a single root node and a spherical
    /// attractor cloud above it.
    pub fn new() -> Self {
        let tree = Tree::new(Vec3::ZERO);
        let spawn_center = Vec3::new(0.0, 1.0, 0.0);
        let spawn_radius = 0.8;
        let attractors = sphere_cloud(spawn_center, spawn_radius, 500);
        let acc = InfluenceBuffer::with_len(tree.len());

        Self {
            tree,
            attractors,
            acc,
            cfg: GrowthConfig::default(),
            topo_params: TopologyParams::default(),
            overlay: None,
            running: false,
            zoom: 250.0,
            pan: egui::vec2(0.0, 150.0),
            yaw: 0.0,
            pitch: 0.3,
            spawn_count: 500,
            spawn_center,
            spawn_half_extent: 0.8,
            spawn_radius,
            last_new_ids: Vec::with_capacity(16),
            step_interval: 0.05,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        }
    }

    /// Resets the simulation to a fresh tree and attractor cloud,
    /// keeping configuration and camera settings.
    fn reset(&mut self) {
        self.tree = Tree::new(Vec3::ZERO);
        self.attractors = sphere_cloud(self.spawn_center, self.spawn_radius, self.spawn_count);
        self.acc = InfluenceBuffer::with_len(self.tree.len());
        self.overlay = None;
        self.last_new_ids.clear();
        self.running = false;
    }

    /// Clears all simulation data, leaving a blank canvas.
    fn clear(&mut self) {
        self.tree.nodes.clear();
        self.attractors.points.clear();
        self.acc = InfluenceBuffer::with_len(0);
        self.overlay = None;
        self.last_new_ids.clear();
    }

    /// Advances the simulation by a single growth iteration.
    ///
    /// Runs [`grower::attraction_phase`] followed by
    /// [`grower::growth_phase`]. Any topology overlay becomes stale as
    /// soon as the tree changes and is dropped.
    fn step_once(&mut self) {
        grower::attraction_phase(
            &self.tree,
            &mut self.attractors,
            &self.cfg,
            &FullScan,
            &mut self.acc,
        );
        let new_ids = grower::growth_phase(&mut self.tree, &self.acc, &self.cfg);

        self.overlay = None;
        self.last_new_ids = new_ids;
    }

    /// Replaces the attractor set with a uniform box cloud.
    fn respawn_box(&mut self) {
        let half = Vec3::splat(self.spawn_half_extent);
        let mut sampler = BoxSampler::new(rand::rng());
        self.attractors = AttractorSet::sampled(
            &mut sampler,
            self.spawn_center - half,
            self.spawn_center + half,
            self.spawn_count,
        );
        self.overlay = None;
    }

    /// Replaces the attractor set with a rejection-sampled sphere cloud.
    fn respawn_sphere(&mut self) {
        self.attractors = sphere_cloud(self.spawn_center, self.spawn_radius, self.spawn_count);
        self.overlay = None;
    }

    /// Runs the topology fold on the current tree and keeps the result
    /// for drawing. Invalid parameters are reported in the log and
    /// leave the overlay unchanged.
    fn build_overlay(&mut self) {
        if self.tree.is_empty() {
            return;
        }
        let mut collector = SegmentCollector::default();
        let alive: Vec<Vec3> = self
            .attractors
            .points
            .iter()
            .filter(|a| a.alive)
            .map(|a| a.pos)
            .collect();
        collector.emit_points(&alive);

        match topology::build_topology(&self.tree, &self.topo_params, &mut collector) {
            Ok(_) => self.overlay = Some(collector),
            Err(err) => tracing::warn!(%err, "topology build failed"),
        }
    }

    /// Projects a world position into the 2D view plane of the orbit
    /// camera (yaw around +Y, then pitch around +X, orthographic).
    fn project(&self, p: Vec3) -> Vec2 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        let x = p.x * cy - p.z * sy;
        let z = p.x * sy + p.z * cy;
        let y = p.y * cp - z * sp;
        Vec2::new(x, y)
    }

    /// Converts a world-space position to screen-space.
    ///
    /// The projected point is scaled by `zoom`, offset by `pan`, and
    /// centered inside the given `rect`. The y-axis is flipped so that
    /// positive y goes up in world space.
    fn world_to_screen(&self, p: Vec3, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        let v = self.project(p);
        egui::pos2(
            center.x + v.x * self.zoom + self.pan.x,
            center.y - v.y * self.zoom + self.pan.y,
        )
    }

    /// Helper to draw a labeled `usize` [`egui::DragValue`].
    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
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
                        .range(0.01..=1.0)
                        .speed(0.01),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Build topology").clicked() {
                    self.build_overlay();
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                if ui.button("Clear").clicked() {
                    self.clear();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 10.0..=1000.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (time step, node count, alive
    /// attractors, overlay segments).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt target = {:.3} s", self.step_interval));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!("nodes = {}", self.tree.len()));
                ui.label(format!("alive attractors = {}", self.attractors.alive_count()));
                if let Some(overlay) = &self.overlay {
                    ui.separator();
                    ui.label(format!("segments = {}", overlay.segments.len()));
                }
            });
        });
    }

    /// Builds the right-hand configuration panel.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(230.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Growth distances");
                Self::labeled_drag_f32(
                    ui,
                    "influence_distance:",
                    &mut self.cfg.influence_distance,
                    0.0..=10.0,
                    0.01,
                );
                Self::labeled_drag_f32(
                    ui,
                    "kill_distance:",
                    &mut self.cfg.kill_distance,
                    0.0..=10.0,
                    0.01,
                );
                Self::labeled_drag_f32(
                    ui,
                    "growth_step:",
                    &mut self.cfg.growth_step,
                    0.001..=1.0,
                    0.005,
                );

                ui.separator();
                ui.label("Topology");
                Self::labeled_drag_f32(
                    ui,
                    "base_thickness:",
                    &mut self.topo_params.base_thickness,
                    0.0001..=0.1,
                    0.0005,
                );
                Self::labeled_drag_f32(
                    ui,
                    "thickness_exp:",
                    &mut self.topo_params.thickness_exp,
                    1.0..=4.0,
                    0.1,
                );
                Self::labeled_drag_f32(
                    ui,
                    "trunk_taper:",
                    &mut self.topo_params.trunk_taper,
                    0.05..=1.0,
                    0.01,
                );

                ui.separator();
                ui.label("Attractor cloud");
                Self::labeled_drag_usize(ui, "count:", &mut self.spawn_count, 1..=5000, 1.0);
                Self::labeled_drag_f32(ui, "center.x:", &mut self.spawn_center.x, -5.0..=5.0, 0.05);
                Self::labeled_drag_f32(ui, "center.y:", &mut self.spawn_center.y, -5.0..=5.0, 0.05);
                Self::labeled_drag_f32(ui, "center.z:", &mut self.spawn_center.z, -5.0..=5.0, 0.05);
                Self::labeled_drag_f32(
                    ui,
                    "box half extent:",
                    &mut self.spawn_half_extent,
                    0.01..=5.0,
                    0.05,
                );
                Self::labeled_drag_f32(
                    ui,
                    "sphere radius:",
                    &mut self.spawn_radius,
                    0.01..=5.0,
                    0.05,
                );

                ui.horizontal(|ui| {
                    if ui.button("■ Box cloud").clicked() {
                        self.respawn_box();
                    }
                    if ui.button("○ Sphere cloud").clicked() {
                        self.respawn_sphere();
                    }
                });

                ui.separator();
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = GrowthConfig::default();
                    self.topo_params = TopologyParams::default();
                }
            });
    }

    /// Builds the central panel where the projected tree is drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Primary drag orbits the camera, secondary drag pans.
            if response.dragged_by(egui::PointerButton::Primary) {
                let delta = response.drag_delta();
                self.yaw += delta.x * 0.01;
                self.pitch = (self.pitch + delta.y * 0.01).clamp(-1.5, 1.5);
            }
            if response.dragged_by(egui::PointerButton::Secondary) {
                self.pan += response.drag_delta();
            }

            // Zoom with the scroll wheel.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(10.0, 1000.0);
            }

            // Topology overlay: stroke width scales with segment thickness.
            if let Some(overlay) = &self.overlay {
                for segment in &overlay.segments {
                    let width = (segment.thickness * self.zoom * 10.0).max(1.0);
                    let stroke = egui::Stroke::new(width, egui::Color32::from_rgb(180, 120, 60));
                    for pair in segment.points.windows(2) {
                        let a = self.world_to_screen(pair[0], rect);
                        let b = self.world_to_screen(pair[1], rect);
                        painter.line_segment([a, b], stroke);
                    }
                }
                for &p in &overlay.debug_points {
                    let p = self.world_to_screen(p, rect);
                    painter.circle_filled(p, 1.0, egui::Color32::DARK_GRAY);
                }
            }

            // Draw tree edges.
            for node in self.tree.nodes.iter() {
                for &child in &node.children {
                    let a = self.world_to_screen(node.pos, rect);
                    let b = self.world_to_screen(self.tree.nodes[child].pos, rect);
                    painter
                        .line_segment([a, b], egui::Stroke::new(1.0, egui::Color32::LIGHT_GREEN));
                }
            }

            // Draw tree nodes (highlighting newly added nodes in red).
            for (i, node) in self.tree.nodes.iter().enumerate() {
                let p = self.world_to_screen(node.pos, rect);

                let color = if self.last_new_ids.contains(&i) {
                    egui::Color32::RED
                } else {
                    egui::Color32::LIGHT_BLUE
                };

                painter.circle_filled(p, 2.0, color);
            }

            // Draw alive attractors.
            for a in &self.attractors.points {
                if !a.alive {
                    continue;
                }
                let p = self.world_to_screen(a.pos, rect);
                painter.circle_filled(p, 1.5, egui::Color32::LIGHT_RED);
            }

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

/// Rejection-samples a spherical attractor cloud.
fn sphere_cloud(center: Vec3, radius: f32, count: usize) -> AttractorSet {
    let mut sampler = RejectionSampler::new(rand::rng(), move |p: Vec3| {
        (p - center).length_squared() <= radius * radius
    });
    AttractorSet::sampled(
        &mut sampler,
        center - Vec3::splat(radius),
        center + Vec3::splat(radius),
        count,
    )
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

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::new(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    #[test]
    fn identity_camera_maps_x_right_and_y_up() {
        let mut viewer = Viewer::new();
        viewer.yaw = 0.0;
        viewer.pitch = 0.0;
        viewer.zoom = 100.0;
        viewer.pan = egui::vec2(0.0, 0.0);
        let rect = test_rect();

        let origin = viewer.world_to_screen(Vec3::ZERO, rect);
        let right = viewer.world_to_screen(Vec3::new(1.0, 0.0, 0.0), rect);
        let up = viewer.world_to_screen(Vec3::new(0.0, 1.0, 0.0), rect);
        let depth = viewer.world_to_screen(Vec3::new(0.0, 0.0, 1.0), rect);

        assert!(right.x > origin.x);
        assert!((right.y - origin.y).abs() < 1e-4);
        assert!(up.y < origin.y, "screen y grows downward");
        // With no yaw/pitch the z axis projects onto the view axis.
        assert!((depth.x - origin.x).abs() < 1e-4);
        assert!((depth.y - origin.y).abs() < 1e-4);
    }

    #[test]
    fn yaw_quarter_turn_brings_z_into_view() {
        let mut viewer = Viewer::new();
        viewer.yaw = std::f32::consts::FRAC_PI_2;
        viewer.pitch = 0.0;

        let v = viewer.project(Vec3::new(0.0, 0.0, 1.0));
        assert!((v.x - (-1.0)).abs() < 1e-5);
        assert!(v.y.abs() < 1e-5);
    }

    #[test]
    fn reset_restores_basic_state() {
        let mut viewer = Viewer::new();

        viewer.tree.add_child(0, Vec3::new(0.0, 0.1, 0.0));
        viewer.attractors.points.clear();
        viewer.acc = InfluenceBuffer::with_len(0);
        viewer.last_new_ids.push(42);
        viewer.running = true;

        viewer.reset();

        assert_eq!(viewer.tree.len(), 1);
        assert!(viewer.tree.nodes[0].parent.is_none());
        assert_eq!(viewer.attractors.points.len(), viewer.spawn_count);
        assert_eq!(viewer.acc.count.len(), viewer.tree.len());
        assert!(viewer.last_new_ids.is_empty());
        assert!(!viewer.running);
    }

    #[test]
    fn clear_removes_all_content() {
        let mut viewer = Viewer::new();

        assert!(!viewer.tree.is_empty());
        assert!(!viewer.attractors.points.is_empty());
        viewer.last_new_ids.push(0);

        viewer.clear();

        assert!(viewer.tree.is_empty());
        assert!(viewer.attractors.points.is_empty());
        assert_eq!(viewer.acc.count.len(), 0);
        assert!(viewer.last_new_ids.is_empty());
    }

    #[test]
    fn step_once_creates_child_and_updates_last_new_ids() {
        let mut viewer = Viewer::new();

        // Deterministic scenario: one root, one attractor up the y axis.
        viewer.tree = Tree::new(Vec3::ZERO);
        viewer.attractors = AttractorSet::from_positions(vec![Vec3::new(0.0, 0.5, 0.0)]);
        viewer.acc = InfluenceBuffer::with_len(viewer.tree.len());
        viewer.cfg = GrowthConfig::default();

        viewer.step_once();

        assert_eq!(viewer.last_new_ids, vec![1]);
        assert_eq!(viewer.tree.len(), 2);
        assert_eq!(viewer.tree.nodes[1].pos, Vec3::new(0.0, 0.1, 0.0));
        assert!(viewer.attractors.points[0].alive);
    }

    #[test]
    fn build_overlay_collects_segments_and_debug_cloud() {
        let mut viewer = Viewer::new();
        viewer.tree = Tree::new(Vec3::ZERO);
        let a = viewer.tree.add_child(0, Vec3::new(0.0, 0.1, 0.0));
        viewer.tree.add_child(a, Vec3::new(0.1, 0.2, 0.0));
        viewer.tree.add_child(a, Vec3::new(-0.1, 0.2, 0.0));
        viewer.attractors = AttractorSet::from_positions(vec![Vec3::new(0.0, 1.0, 0.0)]);

        viewer.build_overlay();

        let overlay = viewer.overlay.as_ref().expect("overlay built");
        // Two branch segments plus the trunk.
        assert_eq!(overlay.segments.len(), 3);
        assert_eq!(overlay.debug_points.len(), 1);

        // Stepping invalidates the overlay.
        viewer.step_once();
        assert!(viewer.overlay.is_none());
    }

    #[test]
    fn respawn_box_replaces_the_cloud_inside_bounds() {
        let mut viewer = Viewer::new();
        viewer.spawn_count = 64;
        viewer.spawn_center = Vec3::new(0.0, 2.0, 0.0);
        viewer.spawn_half_extent = 0.5;

        viewer.respawn_box();

        assert_eq!(viewer.attractors.points.len(), 64);
        for a in &viewer.attractors.points {
            let d = (a.pos - viewer.spawn_center).abs();
            assert!(d.x <= 0.5 && d.y <= 0.5 && d.z <= 0.5);
        }
    }
}
