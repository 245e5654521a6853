use eframe::egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::ColorMap;
use crate::data::metrics::{LeaderboardRow, TransferRow};

// ---------------------------------------------------------------------------
// Leaderboard grid
// ---------------------------------------------------------------------------

/// Render the leaderboard as a striped grid: rank (with movement arrow),
/// team, total points.
pub fn leaderboard_table(ui: &mut Ui, rows: &[LeaderboardRow], colors: Option<&ColorMap>) {
    ui.push_id("leaderboard_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::remainder())
            .column(Column::auto())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Rank");
                });
                header.col(|ui| {
                    ui.strong("Team");
                });
                header.col(|ui| {
                    ui.strong("Points");
                });
            })
            .body(|mut body| {
                for row in rows {
                    body.row(18.0, |mut table_row| {
                        table_row.col(|ui| {
                            ui.horizontal(|ui: &mut Ui| {
                                ui.label(row.rank.to_string());
                                rank_change_arrow(ui, row.rank_change);
                            });
                        });
                        table_row.col(|ui| {
                            ui.label(team_text(&row.team, colors));
                        });
                        table_row.col(|ui| {
                            ui.label(format!("{:.0}", row.total_points));
                        });
                    });
                }
            });
    });
}

fn rank_change_arrow(ui: &mut Ui, change: i32) {
    if change > 0 {
        ui.label(RichText::new(format!("▲{change}")).color(Color32::DARK_GREEN));
    } else if change < 0 {
        ui.label(RichText::new(format!("▼{}", -change)).color(Color32::RED));
    }
}

// ---------------------------------------------------------------------------
// Transfer grid
// ---------------------------------------------------------------------------

/// Render the transfer-activity grid: team, total transfers, per-match
/// average, efficiency (blank when the team never transferred).
pub fn transfer_table(ui: &mut Ui, rows: &[TransferRow], colors: Option<&ColorMap>) {
    ui.push_id("transfer_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::remainder())
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::auto())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Team");
                });
                header.col(|ui| {
                    ui.strong("Transfers");
                });
                header.col(|ui| {
                    ui.strong("Avg");
                });
                header.col(|ui| {
                    ui.strong("Efficiency");
                });
            })
            .body(|mut body| {
                for row in rows {
                    body.row(18.0, |mut table_row| {
                        table_row.col(|ui| {
                            ui.label(team_text(&row.team, colors));
                        });
                        table_row.col(|ui| {
                            ui.label(format!("{:.0}", row.total_transfers));
                        });
                        table_row.col(|ui| {
                            ui.label(format!("{:.2}", row.avg_per_match));
                        });
                        table_row.col(|ui| match row.efficiency {
                            Some(eff) => {
                                ui.label(format!("{eff:.2}"));
                            }
                            None => {
                                ui.label("–");
                            }
                        });
                    });
                }
            });
    });
}

fn team_text(team: &str, colors: Option<&ColorMap>) -> RichText {
    let mut text = RichText::new(team);
    if let Some(cm) = colors {
        text = text.color(cm.color_for(team));
    }
    text
}
