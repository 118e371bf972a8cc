//! Start/finish viewer for finished aggregation runs, built with eframe/egui.
//!
//! This module defines [`Viewer`], which holds read-only snapshots of every
//! run (initial and final particle positions) together with the fractal
//! dimension fit, and implements [`eframe::App`] to draw them.

use dla_core::{
    ParticleKind, ParticleView, SimState, SimulationRun, fractal::FractalFit, layout::Layout,
};
use eframe::App;
use glam::{DMat3, DVec3, Vec2};

/// Ion colour, followed by one colour per electrode generation (cycled).
const ION_COLOR: egui::Color32 = egui::Color32::from_rgb(0x87, 0xce, 0xeb);
const GENERATION_COLORS: [egui::Color32; 10] = [
    egui::Color32::from_rgb(0x9e, 0x01, 0x42),
    egui::Color32::from_rgb(0xd5, 0x3e, 0x4f),
    egui::Color32::from_rgb(0xf4, 0x6d, 0x43),
    egui::Color32::from_rgb(0xfd, 0xae, 0x61),
    egui::Color32::from_rgb(0xfe, 0xe0, 0x8b),
    egui::Color32::from_rgb(0xe6, 0xf5, 0x98),
    egui::Color32::from_rgb(0xab, 0xdd, 0xa4),
    egui::Color32::from_rgb(0x66, 0xc2, 0xa5),
    egui::Color32::from_rgb(0x32, 0x88, 0xbd),
    egui::Color32::from_rgb(0x5e, 0x4f, 0xa2),
];

/// Fill colour for a particle.
pub fn particle_color(view: &ParticleView) -> egui::Color32 {
    match (view.kind, view.generation) {
        (ParticleKind::Electrode, Some(g)) => {
            GENERATION_COLORS[g as usize % GENERATION_COLORS.len()]
        }
        _ => ION_COLOR,
    }
}

/// Everything the viewer keeps about one finished run.
#[derive(Clone, Debug)]
pub struct RunView {
    pub atoms: usize,
    pub layout: Option<Layout>,
    pub radius: Option<f64>,
    pub sweeps: u64,
    pub done: bool,
    pub start: Vec<ParticleView>,
    pub finish: Vec<ParticleView>,
}

impl RunView {
    pub fn from_run(sim: &SimulationRun) -> Self {
        Self {
            atoms: sim.atom_count(),
            layout: sim.layout(),
            radius: sim.radius_of_gyration().ok(),
            sweeps: sim.sweeps(),
            done: sim.is_done(),
            start: sim.snapshot(SimState::Start),
            finish: sim.snapshot(SimState::Finish),
        }
    }

    fn label(&self) -> String {
        let layout = self.layout.map_or("custom", Layout::as_str);
        format!("N = {} ({layout})", self.atoms)
    }
}

/// Main application state for the viewer.
///
/// ### Fields
/// - `runs` - Snapshots of every run, in the order they were simulated.
/// - `selected` - Index into `runs` of the run being drawn.
/// - `fit` - Fractal dimension fit over the stored results, if any.
/// - `fit_layout` - Layout whose stored results `fit` was computed from.
///
/// - `yaw` / `pitch` - Camera rotation (radians), shared by both panels.
/// - `zoom` - Pixels per world unit.
/// - `pan` - Screen-space pan offset in pixels.
/// - `atom_radius` - World-space radius of a drawn particle.
/// - `show_chart` - Whether the log N vs log Rg window is open.
pub struct Viewer {
    runs: Vec<RunView>,
    selected: usize,
    fit: Option<FractalFit>,
    fit_layout: Layout,

    yaw: f64,
    pitch: f64,
    zoom: f32,
    pan: egui::Vec2,
    atom_radius: f32,

    show_chart: bool,
}

impl Viewer {
    pub fn new(
        runs: Vec<RunView>,
        fit_layout: Layout,
        fit: Option<FractalFit>,
        atom_radius: f64,
    ) -> Self {
        Self {
            runs,
            selected: 0,
            fit,
            fit_layout,
            yaw: 0.6,
            pitch: 0.4,
            zoom: 8.0,
            pan: egui::vec2(0.0, 0.0),
            atom_radius: atom_radius as f32,
            show_chart: false,
        }
    }

    pub fn with_chart_open(mut self, open: bool) -> Self {
        self.show_chart = open;
        self
    }

    /// Rotates `p` by the camera and drops the depth axis.
    ///
    /// ### Returns
    /// The projected 2-D position and the depth (larger is closer to the viewer).
    fn project(&self, p: DVec3) -> (Vec2, f32) {
        let rot = DMat3::from_rotation_x(self.pitch) * DMat3::from_rotation_y(self.yaw);
        let q = rot * p;
        (Vec2::new(q.x as f32, q.y as f32), q.z as f32)
    }

    /// Converts a projected position to screen-space inside `rect`.
    ///
    /// The y-axis is flipped so that positive y goes up.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + p.x * self.zoom + self.pan.x,
            center.y - p.y * self.zoom + self.pan.y,
        )
    }

    /// Inverse of [`Viewer::world_to_screen`].
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        Vec2::new(x, y)
    }

    /// Scales `zoom` by `factor` while keeping the point under `pointer` fixed.
    fn zoom_at(&mut self, pointer: egui::Pos2, rect: egui::Rect, factor: f32) {
        let anchor = self.screen_to_world(pointer, rect);
        self.zoom = (self.zoom * factor).clamp(0.5, 50.0);
        self.pan += pointer - self.world_to_screen(anchor, rect);
    }

    /// Top bar with camera controls.
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Reset view").clicked() {
                    self.yaw = 0.6;
                    self.pitch = 0.4;
                    self.pan = egui::vec2(0.0, 0.0);
                    self.zoom = 8.0;
                }
                ui.toggle_value(&mut self.show_chart, "📈 Chart");

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.5..=50.0).text("Zoom"));
                ui.add(
                    egui::DragValue::new(&mut self.atom_radius)
                        .prefix("atom radius = ")
                        .range(0.05..=5.0)
                        .speed(0.05),
                );
            });
        });
    }

    /// Bottom status bar for the selected run.
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let Some(run) = self.runs.get(self.selected) else {
                    ui.label("no runs");
                    return;
                };
                ui.label(format!("sweeps = {}", run.sweeps));
                match run.radius {
                    Some(rg) => ui.label(format!("Rg = {rg:.4}")),
                    None => ui.label("Rg = n/a"),
                };
                ui.separator();
                ui.label(format!("particles = {}", run.finish.len()));
                ui.label(format!(
                    "free ions = {}",
                    run.finish.iter().filter(|p| p.kind == ParticleKind::Ion).count()
                ));
            });
        });
    }

    /// Right-hand panel listing runs and the fractal dimension.
    fn ui_runs_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("runs_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Runs");
                ui.separator();

                for (i, run) in self.runs.iter().enumerate() {
                    let mut text = run.label();
                    if !run.done {
                        text.push_str(" (aborted)");
                    }
                    if ui.selectable_label(self.selected == i, text).clicked() {
                        self.selected = i;
                    }
                }

                ui.separator();
                ui.label(format!("Fractal dimension ({})", self.fit_layout));
                match &self.fit {
                    Some(fit) => ui.label(format!("Df = {:.4}", fit.dimension)),
                    None => ui.label("not enough stored results"),
                };
            });
    }

    /// Draws one set of particles into `rect`, back to front.
    fn draw_particles(
        &self,
        painter: &egui::Painter,
        rect: egui::Rect,
        particles: &[ParticleView],
        title: &str,
    ) {
        painter.rect_stroke(
            rect.shrink(2.0),
            0.0,
            egui::Stroke::new(1.0, egui::Color32::GRAY),
            egui::StrokeKind::Inside,
        );
        painter.text(
            rect.left_top() + egui::vec2(8.0, 8.0),
            egui::Align2::LEFT_TOP,
            title,
            egui::FontId::proportional(16.0),
            egui::Color32::WHITE,
        );

        let mut projected: Vec<(Vec2, f32, egui::Color32)> = particles
            .iter()
            .map(|p| {
                let (xy, depth) = self.project(p.pos);
                (xy, depth, particle_color(p))
            })
            .collect();
        projected.sort_by(|a, b| a.1.total_cmp(&b.1));

        let r = (self.atom_radius * self.zoom).max(1.5);
        let edge = egui::Stroke::new(
            0.5,
            egui::Color32::from_rgba_unmultiplied(128, 128, 128, 128),
        );
        for (xy, _, color) in projected {
            let p = self.world_to_screen(xy, rect);
            if rect.expand(r).contains(p) {
                painter.circle(p, r, color, edge);
            }
        }
    }

    /// Central area: start state on the left, final state on the right.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
                let rect = response.rect;

                // Left drag rotates, right drag pans.
                if response.dragged_by(egui::PointerButton::Primary) {
                    let delta = response.drag_delta();
                    self.yaw += f64::from(delta.x) * 0.01;
                    self.pitch = (self.pitch + f64::from(delta.y) * 0.01).clamp(-1.5, 1.5);
                } else if response.dragged_by(egui::PointerButton::Secondary) {
                    self.pan += response.drag_delta();
                }

                let mid = rect.center().x;
                let left = egui::Rect::from_min_max(rect.min, egui::pos2(mid, rect.max.y));
                let right = egui::Rect::from_min_max(egui::pos2(mid, rect.min.y), rect.max);

                let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0
                    && let Some(pointer) = response.hover_pos()
                {
                    let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                    let half = if left.contains(pointer) { left } else { right };
                    self.zoom_at(pointer, half, factor);
                }

                let Some(run) = self.runs.get(self.selected) else {
                    return;
                };

                self.draw_particles(&ui.painter_at(left), left, &run.start, "start");
                self.draw_particles(&ui.painter_at(right), right, &run.finish, "finish");
            });
    }

    /// Floating window with the log N vs log Rg scatter and fitted line.
    fn ui_chart(&mut self, ctx: &egui::Context) {
        let fit = self.fit.as_ref();
        egui::Window::new("log N vs log Rg")
            .open(&mut self.show_chart)
            .default_size(egui::vec2(360.0, 280.0))
            .show(ctx, |ui| match fit {
                Some(fit) => draw_chart(ui, fit),
                None => {
                    ui.label("No data to plot.");
                }
            });
    }
}

/// Scatter plot of `fit.points` with the fitted line, scaled to the
/// available space.
fn draw_chart(ui: &mut egui::Ui, fit: &FractalFit) {
    ui.label(format!("Df = {:.4}", fit.dimension));
    let size = ui.available_size().max(egui::vec2(200.0, 150.0));
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let rect = response.rect.shrink(12.0);

    let (mut min, mut max) = (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY));
    for &(x, y) in &fit.points {
        let p = Vec2::new(x as f32, y as f32);
        min = min.min(p);
        max = max.max(p);
    }
    let span = (max - min).max(Vec2::splat(1e-6));

    let to_screen = |x: f64, y: f64| {
        let t = (Vec2::new(x as f32, y as f32) - min) / span;
        egui::pos2(rect.left() + t.x * rect.width(), rect.bottom() - t.y * rect.height())
    };

    painter.rect_stroke(
        rect,
        0.0,
        egui::Stroke::new(1.0, egui::Color32::GRAY),
        egui::StrokeKind::Outside,
    );

    let line = fit.line();
    let (x0, x1) = (f64::from(min.x), f64::from(max.x));
    painter.line_segment(
        [to_screen(x0, line.eval(x0)), to_screen(x1, line.eval(x1))],
        egui::Stroke::new(1.0, egui::Color32::LIGHT_GRAY),
    );

    for &(x, y) in &fit.points {
        painter.circle_filled(to_screen(x, y), 3.0, GENERATION_COLORS[8]);
    }

    painter.text(
        rect.center_bottom() + egui::vec2(0.0, 10.0),
        egui::Align2::CENTER_TOP,
        "log Rg",
        egui::FontId::proportional(12.0),
        egui::Color32::GRAY,
    );
}

impl App for Viewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_runs_panel(ctx);
        self.ui_central_panel(ctx);
        self.ui_chart(ctx);
    }
}
