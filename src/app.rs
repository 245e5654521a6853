use eframe::egui;

use crate::state::DashboardState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct WicketboardApp {
    pub state: DashboardState,
}

impl eframe::App for WicketboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Second top panel: filter controls ----
        egui::TopBottomPanel::top("controls_bar").show(ctx, |ui| {
            panels::controls_bar(ui, &mut self.state);
        });

        // ---- Left side panel: leaderboard and transfer tables ----
        egui::SidePanel::left("standings_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &self.state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::charts(ui, &self.state);
        });
    }
}
