// SPDX-License-Identifier: MIT OR Apache-2.0
//! egui front end for the room node graph editor.
//!
//! - [`PainterRenderer`] paints through an [`egui::Painter`]
//! - [`RoomGraphEditorView`] feeds egui pointer input to a
//!   [`GraphEditorController`] and presents its context menu

use crate::config::EditorConfig;
use crate::controller::GraphEditorController;
use crate::input::{PointerButton, PointerEvent};
use crate::render::{GraphRenderer, NodeVisual};
use egui::{Color32, Pos2, Rect, Stroke, Vec2};

const BEZIER_SEGMENTS: usize = 32;
const LABEL_FONT_SIZE: f32 = 14.0;

/// Paints a graph with an egui painter. Canvas coordinates are offset by
/// `origin` to reach screen space.
pub struct PainterRenderer<'a> {
    painter: &'a egui::Painter,
    origin: Vec2,
    config: &'a EditorConfig,
}

impl<'a> PainterRenderer<'a> {
    /// Create a renderer whose canvas origin sits at `origin` on screen
    pub fn new(painter: &'a egui::Painter, origin: Vec2, config: &'a EditorConfig) -> Self {
        Self { painter, origin, config }
    }

    fn to_screen(&self, canvas_pos: Pos2) -> Pos2 {
        canvas_pos + self.origin
    }

    fn draw_bezier(&self, from: Pos2, to: Pos2, color: Color32) {
        let from = self.to_screen(from);
        let to = self.to_screen(to);
        let distance = (to.x - from.x).abs();
        let curvature = self.config.bezier_curvature.min(distance * 0.5);

        let ctrl1 = Pos2::new(from.x + curvature, from.y);
        let ctrl2 = Pos2::new(to.x - curvature, to.y);

        let stroke = Stroke::new(self.config.connecting_line_width, color);
        for segment in bezier_points(from, ctrl1, ctrl2, to, BEZIER_SEGMENTS).windows(2) {
            self.painter.line_segment([segment[0], segment[1]], stroke);
        }
    }
}

impl GraphRenderer for PainterRenderer<'_> {
    fn paint_connection(&mut self, from: Pos2, to: Pos2) {
        self.draw_bezier(from, to, Color32::from_rgb(200, 200, 200));
    }

    fn paint_drag_line(&mut self, from: Pos2, to: Pos2) {
        self.draw_bezier(from, to, Color32::from_rgba_unmultiplied(200, 200, 200, 140));
    }

    fn paint_node(&mut self, node: &NodeVisual<'_>) {
        let screen_rect = node.rect.translate(self.origin);
        let rounding = self.config.node_border;

        let bg_color = if node.room_type.is_none {
            Color32::from_rgb(45, 45, 48)
        } else {
            room_type_color(&node.room_type.name)
        };
        painter_fill(self.painter, screen_rect, rounding, bg_color);

        let label_rect = screen_rect.shrink(self.config.node_padding.min(screen_rect.height() * 0.5));
        self.painter.text(
            label_rect.center(),
            egui::Align2::CENTER_CENTER,
            &node.room_type.name,
            egui::FontId::proportional(LABEL_FONT_SIZE),
            Color32::WHITE,
        );

        if node.selected || (node.dragging && self.config.highlight_dragged_nodes) {
            self.painter.rect_stroke(
                screen_rect,
                rounding,
                Stroke::new(2.0, Color32::from_rgb(100, 150, 255)),
            );
        }
    }
}

fn painter_fill(painter: &egui::Painter, rect: Rect, rounding: f32, color: Color32) {
    painter.rect_filled(
        rect.translate(Vec2::new(3.0, 3.0)),
        rounding,
        Color32::from_rgba_unmultiplied(0, 0, 0, 60),
    );
    painter.rect_filled(rect, rounding, color);
}

/// Stable muted color for a room type name
fn room_type_color(name: &str) -> Color32 {
    let hash = name
        .bytes()
        .fold(2166136261_u32, |h, b| (h ^ u32::from(b)).wrapping_mul(16777619));
    let [r, g, b, _] = hash.to_le_bytes();
    Color32::from_rgb(50 + r / 3, 60 + g / 3, 70 + b / 3)
}

/// Hosts a [`GraphEditorController`] inside an egui layout
#[derive(Debug, Default)]
pub struct RoomGraphEditorView {
    last_mouse_pos: Option<Pos2>,
    menu_rect: Option<Rect>,
}

impl RoomGraphEditorView {
    /// Create a view
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the editor filling the available space
    pub fn show(&mut self, ui: &mut egui::Ui, controller: &mut GraphEditorController) {
        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let origin = rect.min.to_vec2();

        painter.rect_filled(rect, 0.0, Color32::from_rgb(30, 30, 32));

        for event in self.collect_events(ui, &response, origin) {
            controller.handle_event(&event);
        }
        self.handle_shortcuts(ui, controller);

        let mut renderer = PainterRenderer::new(&painter, origin, controller.config());
        controller.render(&mut renderer);

        self.show_context_menu(ui, controller, origin);
        self.draw_status_bar(ui, rect, controller);

        if controller.take_redraw_request() {
            ui.ctx().request_repaint();
        }
    }

    fn collect_events(&mut self, ui: &egui::Ui, response: &egui::Response, origin: Vec2) -> Vec<PointerEvent> {
        let Some(mouse_pos) = ui.input(|i| i.pointer.hover_pos()).or(self.last_mouse_pos) else {
            return Vec::new();
        };
        let delta = self.last_mouse_pos.map_or(Vec2::ZERO, |last| mouse_pos - last);
        self.last_mouse_pos = Some(mouse_pos);

        let canvas_pos = mouse_pos - origin;
        // Presses belong to the menu while it is under the pointer
        let over_menu = self.menu_rect.is_some_and(|menu| menu.contains(mouse_pos));
        let accepts_press = response.contains_pointer() && !over_menu;

        ui.input(|i| {
            let mut events = Vec::new();
            for (egui_button, button) in [
                (egui::PointerButton::Primary, PointerButton::Primary),
                (egui::PointerButton::Secondary, PointerButton::Secondary),
            ] {
                // Movement before the press belongs to no drag
                let pressed = i.pointer.button_pressed(egui_button);
                if pressed && accepts_press {
                    events.push(PointerEvent::down(button, canvas_pos));
                }
                if !pressed && i.pointer.button_down(egui_button) && delta != Vec2::ZERO {
                    events.push(PointerEvent::drag(button, canvas_pos, delta));
                }
                if i.pointer.button_released(egui_button) {
                    events.push(PointerEvent::up(button, canvas_pos));
                }
            }
            events
        })
    }

    fn handle_shortcuts(&self, ui: &egui::Ui, controller: &mut GraphEditorController) {
        let (delete, undo, redo) = ui.input(|i| {
            (
                i.key_pressed(egui::Key::Delete),
                i.modifiers.command && i.key_pressed(egui::Key::Z),
                i.modifiers.command && i.key_pressed(egui::Key::Y),
            )
        });

        let result = if delete {
            controller.delete_selected().map(|_| ())
        } else if undo {
            controller.undo()
        } else if redo {
            controller.redo()
        } else {
            Ok(())
        };

        if let Err(e) = result {
            tracing::warn!("Editor shortcut failed: {e}");
        }
    }

    fn show_context_menu(&mut self, ui: &egui::Ui, controller: &mut GraphEditorController, origin: Vec2) {
        let Some(menu) = controller.context_menu() else {
            self.menu_rect = None;
            return;
        };

        let mut chosen = None;
        let area = egui::Area::new(egui::Id::new("room_graph_context_menu"))
            .order(egui::Order::Foreground)
            .fixed_pos(menu.position + origin)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    for (index, item) in menu.items.iter().enumerate() {
                        if ui.button(&item.label).clicked() {
                            chosen = Some(index);
                        }
                    }
                });
            });
        self.menu_rect = Some(area.response.rect);

        if let Some(index) = chosen {
            if let Err(e) = controller.invoke_menu_item(index) {
                tracing::warn!("Menu action failed: {e}");
            }
            self.menu_rect = None;
        }
    }

    fn draw_status_bar(&self, ui: &egui::Ui, rect: Rect, controller: &GraphEditorController) {
        ui.painter().text(
            Pos2::new(rect.min.x + 10.0, rect.max.y - 10.0),
            egui::Align2::LEFT_BOTTOM,
            status_text(controller),
            egui::FontId::proportional(11.0),
            Color32::from_gray(150),
        );
    }
}

/// Graph summary plus the pending undo/redo steps
fn status_text(controller: &GraphEditorController) -> String {
    let graph = controller.graph();
    let history = controller.session().history();
    let dirty = if controller.session().is_dirty() { " *" } else { "" };

    let mut text = format!(
        "{}{} | Rooms: {} | Connections: {}",
        graph.name,
        dirty,
        graph.node_count(),
        graph.connection_count()
    );
    if history.can_undo() {
        text.push_str(&format!(" | Undo: {}", history.undo_description().unwrap_or_default()));
    }
    if history.can_redo() {
        text.push_str(&format!(" | Redo: {}", history.redo_description().unwrap_or_default()));
    }
    text
}

/// Generate points along a cubic bezier curve
fn bezier_points(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2, segments: usize) -> Vec<Pos2> {
    let mut points = Vec::with_capacity(segments + 1);
    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        let mt = 1.0 - t;

        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;

        points.push(Pos2::new(
            a * p0.x + b * p1.x + c * p2.x + d * p3.x,
            a * p0.y + b * p1.y + c * p2.y + d * p3.y,
        ));
    }
    points
}
