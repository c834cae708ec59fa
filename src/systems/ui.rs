use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin}; // fps
use bevy::pbr::wireframe::WireframeConfig;
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};

use crate::systems::district::{CurrentDistrict, ExportEvent, GizmosVisible, LastError, Params, RegenerateEvent, Seed};

pub struct UIPlugin;

impl Plugin for UIPlugin {
    fn build(&self, app: &mut App) {
        assert!(app.is_plugin_added::<EguiPlugin>());
        app.add_systems(Update, key_input)
            .add_systems(EguiPrimaryContextPass, (ui_main, fps)); // UI rendering here
    }
}

fn key_input(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut gizmos_visible: ResMut<GizmosVisible>,
    mut wireframe: ResMut<WireframeConfig>,
    mut exit: EventWriter<AppExit>,
) {
    if keyboard_input.just_pressed(KeyCode::Tab) {
        gizmos_visible.0 = !gizmos_visible.0;
    }
    if keyboard_input.just_pressed(KeyCode::F1) {
        wireframe.global = !wireframe.global;
    }
    if keyboard_input.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}

fn slider(ui: &mut egui::Ui, value: &mut f64, range: std::ops::RangeInclusive<f64>, text: &str, hover: &str) -> bool {
    ui.add(egui::Slider::new(value, range).text(text))
        .on_hover_text(hover)
        .changed()
}

fn ui_main(
    mut contexts: EguiContexts,
    current_seed: Res<Seed>,
    mut params: ResMut<Params>,
    current: Res<CurrentDistrict>,
    last_error: Res<LastError>,
    mut gizmos_visible: ResMut<GizmosVisible>,
    mut wireframe: ResMut<WireframeConfig>,
    mut regen_events: EventWriter<RegenerateEvent>,
    mut export_events: EventWriter<ExportEvent>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    egui::SidePanel::left("config_panel")
        .default_width(200.0)
        .min_width(280.0)
        .max_width(420.0)
        .resizable(true)
        .show(ctx, |ui| {
            let mut regenerate = false;
            let p = &mut params.0;

            // camera
            ui.label("WASD pan, Q/E rotate, scroll zoom");
            ui.separator();
            ui.checkbox(&mut gizmos_visible.0, "Road gizmos (TAB)");
            ui.checkbox(&mut wireframe.global, "Wireframe (F1)");
            ui.separator();

            // seed
            egui::CollapsingHeader::new("Seed").default_open(true).show(ui, |ui| {
                ui.label(format!("Current: {}", current_seed.0));
                if ui.button("Regenerate").clicked() {
                    regen_events.write(RegenerateEvent { seed: rand::random() });
                }
            });

            egui::CollapsingHeader::new("Subdivision").default_open(true).show(ui, |ui| {
                let s = &mut p.subdivision;
                regenerate |= slider(ui, &mut s.coarse.area_threshold, 5_000.0..=60_000.0, "Coarse Area (m²)",
                    "Blocks above this area are split by the coarse pass.");
                regenerate |= slider(ui, &mut s.coarse.distance_cutoff, 10.0..=300.0, "Coarse Cutoff (m)",
                    "Centroids farther than this from a primary road get a larger area budget.");
                regenerate |= slider(ui, &mut s.fine.area_threshold, 1_000.0..=20_000.0, "Fine Area (m²)",
                    "Blocks above this area are split by the fine pass.");
                regenerate |= slider(ui, &mut s.fine.distance_cutoff, 10.0..=300.0, "Fine Cutoff (m)",
                    "Distance cutoff of the fine pass.");
                regenerate |= slider(ui, &mut s.length_ratio, 1.5..=8.0, "Length Ratio",
                    "Longest over shortest edge that triggers a shape split.");
                regenerate |= slider(ui, &mut s.split_jitter, 0.0..=0.4, "Split Jitter",
                    "How far split points wander from edge midpoints.");
                regenerate |= ui.checkbox(&mut s.coarse.eliminate_narrow_end, "Narrow-end elimination (coarse)").changed();
                regenerate |= ui.checkbox(&mut s.fine.eliminate_narrow_end, "Narrow-end elimination (fine)").changed();
            });

            egui::CollapsingHeader::new("Setbacks").default_open(false).show(ui, |ui| {
                let s = &mut p.setback;
                regenerate |= slider(ui, &mut s.width_a, 1.0..=30.0, "Primary Half Width (m)", "Setback from primary roads.");
                regenerate |= slider(ui, &mut s.width_b, 1.0..=20.0, "Secondary Half Width (m)", "Setback from coarse split lines.");
                regenerate |= slider(ui, &mut s.width_other, 1.0..=15.0, "Other Half Width (m)", "Setback from every other edge.");
                regenerate |= slider(ui, &mut s.pedestrian_offset, 0.0..=8.0, "Pedestrian (m)", "Sidewalk width inside each block.");
            });

            egui::CollapsingHeader::new("Density").default_open(false).show(ui, |ui| {
                let h = &mut p.height;
                for (i, name) in ["Primary", "Coarse", "Fine"].into_iter().enumerate() {
                    ui.horizontal(|ui| {
                        regenerate |= ui.checkbox(&mut h.active[i], name).changed();
                        regenerate |= ui.add(egui::Slider::new(&mut h.weights[i], 0.0..=1.0).text("weight")).changed();
                    });
                }
                regenerate |= slider(ui, &mut p.far.scale, 0.05..=2.0, "FAR Scale", "Density scalar to FAR multiplier.");
            });

            egui::CollapsingHeader::new("Massing").default_open(false).show(ui, |ui| {
                let m = &mut p.massing;
                for (i, name) in ["Low Coverage", "Mid Coverage", "High Coverage"].into_iter().enumerate() {
                    regenerate |= slider(ui, &mut m.densities[i], 0.1..=1.0, name, "Building coverage of the tier.");
                }
                regenerate |= slider(ui, &mut m.tower_ratio, 0.0..=1.0, "Tower Ratio",
                    "Share of residual floor area placed on the primary tower.");
            });

            ui.separator();

            // stats
            if let Some(district) = &current.0 {
                ui.label(format!("Blocks: {}", district.setbacks.blocks.len()));
                ui.label(format!("Buildings: {}", district.building_count()));
                let converged = district.subdivision.coarse_report.converged && district.subdivision.fine_report.converged;
                if !converged {
                    ui.label(egui::RichText::new("Subdivision hit the iteration cap").color(egui::Color32::from_rgb(220, 160, 40)));
                }
                if !district.diagnostics.is_empty() {
                    ui.label(format!("Diagnostics: {}", district.diagnostics.len()));
                }
            }
            if let Some(err) = &last_error.0 {
                ui.label(egui::RichText::new(err).color(egui::Color32::from_rgb(178, 34, 34)));
            }

            ui.separator();

            // export section
            ui.horizontal(|ui| {
                if ui.button("Export OBJ")
                    .on_hover_text("Export all volumes as OBJ, current directory")
                    .clicked()
                {
                    let timestamp = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .map(|d| d.as_secs())
                        .unwrap_or_default();
                    export_events.write(ExportEvent { filename: format!("massing_export_{}.obj", timestamp) });
                }
            });

            ui.separator();
            ui.label("ESC to exit");

            // trigger regeneration on any parameter change
            if regenerate {
                regen_events.write(RegenerateEvent { seed: current_seed.0 });
            }
        });
}

fn fps(mut contexts: EguiContexts, diagnostics: Res<DiagnosticsStore>) {
    if let Ok(ctx) = contexts.ctx_mut() {
        egui::Area::new(egui::Id::new("fps_counter"))
            .anchor(egui::Align2::RIGHT_TOP, egui::Vec2::new(-10.0, 10.0))
            .show(ctx, |ui| {
                ui.with_layout(egui::Layout::top_down(egui::Align::RIGHT), |ui| {
                    if let Some(fps) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS).and_then(|d| d.smoothed()) {
                        ui.label(egui::RichText::new(format!("{:.0}", fps)).size(26.0).color(egui::Color32::WHITE));
                    }
                });
            });
    }
}
