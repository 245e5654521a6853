mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::WicketboardApp;
use eframe::egui;

/// Usage: `wicketboard [points-file [transfers-file]]`
/// Both files can also be opened later via File → Open.
fn main() -> eframe::Result {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let points_path = args.next().map(PathBuf::from);
    let transfers_path = args.next().map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Wicketboard – Fantasy League Dashboard",
        options,
        Box::new(move |_cc| {
            let mut app = WicketboardApp::default();
            load_startup_files(&mut app.state, points_path, transfers_path);
            Ok(Box::new(app))
        }),
    )
}

/// One-shot startup load.  A failure leaves the dashboard unready with the
/// error on the status line; there is no retry.
fn load_startup_files(
    state: &mut state::DashboardState,
    points_path: Option<PathBuf>,
    transfers_path: Option<PathBuf>,
) {
    if let Some(path) = points_path {
        match data::loader::load_file(&path) {
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
                return;
            }
        }
    }

    if let Some(path) = transfers_path {
        let result = data::loader::load_file(&path)
            .map_err(anyhow::Error::from)
            .and_then(|table| state.attach_transfers(table));
        if let Err(e) = result {
            log::error!("Failed to load transfers file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
