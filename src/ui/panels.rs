use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{DashboardState, InputEvent};
use crate::ui::tables;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut DashboardState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open points…").clicked() {
                open_points_dialog(state);
                ui.close_menu();
            }
            let can_attach = state.points.is_some();
            if ui
                .add_enabled(can_attach, egui::Button::new("Open transfers…"))
                .clicked()
            {
                open_transfers_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.strong("Wicketboard");
        ui.separator();

        if let Some(points) = &state.points {
            let mut info = format!(
                "{} matches, {} teams",
                points.match_count(),
                points.team_names.len()
            );
            if state.transfers.is_some() {
                info.push_str(", transfers loaded");
            }
            ui.label(info);
            ui.separator();
        }

        let follows = state.leaderboard_follows_filter;
        if ui
            .selectable_label(follows, "Leaderboard follows filter")
            .on_hover_text(
                "Rank teams from the selected match window instead of \
                 full-season totals (product still undecided on the default)",
            )
            .clicked()
        {
            state.set_leaderboard_follows_filter(!follows);
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Controls bar – match range + team selection
// ---------------------------------------------------------------------------

/// Render the filter controls.  Widget changes are forwarded to the state
/// as [`InputEvent`]s; the state decides whether to recompute now or wait
/// for the team dropdown to close.
pub fn controls_bar(ui: &mut Ui, state: &mut DashboardState) {
    if state.points.is_none() {
        ui.label("No season loaded.");
        return;
    }
    let match_count = state.match_count() as u32;
    if match_count == 0 {
        ui.label("Season table has no matches.");
        return;
    }
    let (mut min, mut max) = state.match_range;

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Match");
        let from = ui.add(egui::Slider::new(&mut min, 1..=match_count).text("from"));
        let to = ui.add(egui::Slider::new(&mut max, 1..=match_count).text("to"));
        // keep the pair ordered while one end is dragged past the other
        if from.changed() && min > max {
            max = min;
        }
        if to.changed() && max < min {
            min = max;
        }

        ui.separator();
        team_selector(ui, state);
    });

    if (min, max) != state.match_range {
        state.apply_event(InputEvent::MatchRangeChanged(min, max));
    }
}

/// The team multi-select dropdown.  Its open state is an observed input:
/// while it is open the state suppresses recomputation, so half-finished
/// selections never reach the charts.
fn team_selector(ui: &mut Ui, state: &mut DashboardState) {
    let all_teams: Vec<String> = state.team_names().to_vec();
    let mut selection = state.selected_teams.clone();

    let summary = match selection.len() {
        0 => "All teams".to_string(),
        1 => selection[0].clone(),
        n => format!("{n} teams"),
    };

    let response = egui::ComboBox::from_id_salt("team_selector")
        .selected_text(summary)
        .width(160.0)
        .show_ui(ui, |ui: &mut Ui| {
            for team in &all_teams {
                let mut checked = selection.contains(team);
                if ui.checkbox(&mut checked, team).changed() {
                    if checked {
                        selection.push(team.clone());
                    } else {
                        selection.retain(|t| t != team);
                    }
                }
            }
        });

    let open = response.inner.is_some();
    if ui.button("Clear").clicked() {
        selection.clear();
    }

    state.apply_event(InputEvent::TeamSelectorOpened(open));
    if selection != state.selected_teams {
        state.apply_event(InputEvent::TeamsChanged(selection));
    }
}

// ---------------------------------------------------------------------------
// Left side panel – leaderboard and transfer tables
// ---------------------------------------------------------------------------

/// Render the standings panel.
pub fn side_panel(ui: &mut Ui, state: &DashboardState) {
    ui.heading("Leaderboard");
    ui.separator();

    let Some(views) = &state.views else {
        ui.label("No season loaded.");
        return;
    };
    let colors = state.color_map.as_ref();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            tables::leaderboard_table(ui, &views.leaderboard, colors);

            if let Some(transfer_rows) = &views.transfer_table {
                ui.add_space(12.0);
                ui.heading("Transfers");
                ui.separator();
                tables::transfer_table(ui, transfer_rows, colors);
            }
        });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_points_dialog(state: &mut DashboardState) {
    let file = rfd::FileDialog::new()
        .set_title("Open points per match")
        .add_filter("Season tables", &["csv", "json", "parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        match crate::data::loader::load_file(&path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} matches for teams {:?}",
                    table.match_count(),
                    table.team_names
                );
                state.attach_points(table);
            }
            Err(e) => {
                log::error!("Failed to load points file: {e}");
                state.status_message = Some(format!("Error: {e}"));
                state.loading = false;
            }
        }
    }
}

pub fn open_transfers_dialog(state: &mut DashboardState) {
    let file = rfd::FileDialog::new()
        .set_title("Open transfers per match")
        .add_filter("Season tables", &["csv", "json", "parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        let result = crate::data::loader::load_file(&path)
            .map_err(anyhow::Error::from)
            .and_then(|table| state.attach_transfers(table));
        if let Err(e) = result {
            log::error!("Failed to load transfers file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
            state.loading = false;
        }
    }
}
