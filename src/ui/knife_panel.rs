//! Right-side panel for the knife tool.
//!
//! Shows the operation and interaction style, the chain toggle, pick
//! thresholds and the undo history head.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};

use crate::commands::TopologyHistory;
use crate::modeling::knife::{InteractionStyle, KnifeOperation, KnifeSettings, KnifeTool};

pub struct KnifePanelPlugin;

impl Plugin for KnifePanelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(EguiPrimaryContextPass, draw_knife_panel);
    }
}

fn draw_knife_panel(
    mut contexts: EguiContexts,
    mut tool: ResMut<KnifeTool>,
    mut settings: ResMut<KnifeSettings>,
    history: Res<TopologyHistory>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    egui::Window::new("Knife")
        .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
        .resizable(false)
        .show(ctx, |ui| {
            if draw_settings(ui, &mut tool, &mut settings) {
                settings.save();
            }

            ui.add_space(8.0);
            ui.separator();
            let undo = history.undo_description().unwrap_or("Nothing to undo");
            ui.label(egui::RichText::new(format!("Undo (Ctrl+Z): {}", undo)).small());
            if let Some(report) = tool.last_report() {
                ui.label(
                    egui::RichText::new(format!(
                        "Last: {} faces split, {} vertices added",
                        report.faces_split, report.vertices_created
                    ))
                    .small(),
                );
            }
        });

    Ok(())
}

/// Draw the knife settings into `ui`. Returns true when a persisted value changed.
pub fn draw_settings(ui: &mut egui::Ui, tool: &mut KnifeTool, settings: &mut KnifeSettings) -> bool {
    let mut changed = false;

    ui.horizontal(|ui| {
        let active = tool.is_active();
        if ui.selectable_label(active, "Active").clicked() {
            if active {
                tool.deactivate();
            } else {
                tool.activate();
            }
        }
    });

    ui.heading("Operation");
    ui.horizontal(|ui| {
        for (operation, key) in [
            (KnifeOperation::Cut, "K"),
            (KnifeOperation::InsertVertex, "V"),
            (KnifeOperation::EraseEdge, "X"),
        ] {
            let label = format!("{} ({})", operation.display_name(), key);
            if ui.selectable_label(tool.operation() == operation, label).clicked() {
                tool.set_operation(operation);
                settings.operation = operation;
                changed = true;
            }
        }
    });

    ui.heading("Style (T)");
    ui.horizontal(|ui| {
        for style in [InteractionStyle::Drag, InteractionStyle::TwoClick] {
            if ui.selectable_label(tool.style() == style, style.display_name()).clicked() {
                tool.set_style(style);
                settings.style = style;
                changed = true;
            }
        }
    });

    ui.add_space(8.0);
    egui::Grid::new("knife_settings_grid")
        .num_columns(2)
        .spacing([10.0, 8.0])
        .show(ui, |ui| {
            ui.label("Loop Cut (C):");
            let mut chain = settings.chain;
            if ui.checkbox(&mut chain, "").changed() {
                tool.set_chain(settings, chain);
                changed = true;
            }
            ui.end_row();

            ui.label("Edge Radius:");
            changed |= ui
                .add(
                    egui::Slider::new(&mut settings.edge_threshold_px, 2.0..=40.0)
                        .step_by(1.0)
                        .suffix("px"),
                )
                .changed();
            ui.end_row();

            ui.label("Vertex Snap:");
            changed |= ui
                .add(
                    egui::Slider::new(&mut settings.vertex_threshold_px, 0.0..=30.0)
                        .step_by(1.0)
                        .suffix("px"),
                )
                .changed();
            ui.end_row();

            ui.label("Max Belt Length:");
            changed |= ui
                .add(egui::Slider::new(&mut settings.max_belt_iterations, 1..=1000))
                .changed();
            ui.end_row();

            ui.label("Spatial Hash:");
            changed |= ui.checkbox(&mut settings.use_spatial_hash, "").changed();
            ui.end_row();
        });

    changed
}
