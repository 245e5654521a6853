use eframe::egui::{Color32, ScrollArea, Ui};
use egui_plot::{Legend, Line, Plot, PlotBounds, PlotPoints, Points};

use crate::color::ColorMap;
use crate::data::model::TidyTable;
use crate::state::DashboardState;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Central panel – the chart stack
// ---------------------------------------------------------------------------

/// Render all published charts in the central panel.
pub fn charts(ui: &mut Ui, state: &DashboardState) {
    let Some(views) = &state.views else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a points file to view the season  (File → Open points…)");
        });
        return;
    };
    let colors = state.color_map.as_ref();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            line_chart(ui, "total_points", &views.total_points, colors);
            scatter_chart(ui, "earned_points", &views.earned_points, colors);

            if let Some(view) = &views.transfers_accumulated {
                line_chart(ui, "transfers_accumulated", view, colors);
            }
            if let Some(view) = &views.transfer_efficiency {
                efficiency_chart(ui, "transfer_efficiency", view, colors);
            }
        });
}

fn team_color(team: &str, colors: Option<&ColorMap>) -> Color32 {
    colors.map_or(Color32::LIGHT_BLUE, |cm| cm.color_for(team))
}

// ---------------------------------------------------------------------------
// Line chart (cumulative views)
// ---------------------------------------------------------------------------

/// One line+markers series per team.
fn line_chart(ui: &mut Ui, id: &str, view: &TidyTable, colors: Option<&ColorMap>) {
    let mut plot = Plot::new(id.to_string())
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Match")
        .y_axis_label(view.metric.label());
    if let Some((x0, x1)) = view.x_hint {
        plot = plot.include_x(x0).include_x(x1);
    }

    plot.show(ui, |plot_ui| {
        for team in view.teams() {
            let color = team_color(team, colors);
            let points: Vec<[f64; 2]> = view
                .team_rows(team)
                .filter_map(|r| r.value.map(|v| [f64::from(r.match_id), v]))
                .collect();

            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name(team)
                    .color(color)
                    .width(1.5),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .name(team)
                    .color(color)
                    .radius(2.5),
            );
        }
    });
}

// ---------------------------------------------------------------------------
// Scatter chart (per-match values, marker size encodes the value)
// ---------------------------------------------------------------------------

fn scatter_chart(ui: &mut Ui, id: &str, view: &TidyTable, colors: Option<&ColorMap>) {
    let max_value = view
        .rows
        .iter()
        .filter_map(|r| r.value)
        .fold(0.0_f64, f64::max);

    let mut plot = Plot::new(id.to_string())
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Match")
        .y_axis_label(view.metric.label());
    if let Some((x0, x1)) = view.x_hint {
        plot = plot.include_x(x0).include_x(x1);
    }

    plot.show(ui, |plot_ui| {
        for row in &view.rows {
            let Some(value) = row.value else {
                continue;
            };
            // Area-proportional marker, 10 px at the season's best haul.
            let radius = if max_value > 0.0 {
                (10.0 * (value / max_value).sqrt()).max(1.5) as f32
            } else {
                1.5
            };
            plot_ui.points(
                Points::new(PlotPoints::from(vec![[f64::from(row.match_id), value]]))
                    .name(&row.team)
                    .color(team_color(&row.team, colors))
                    .radius(radius),
            );
        }
    });
}

// ---------------------------------------------------------------------------
// Efficiency chart (pinned axis, gap-aware lines)
// ---------------------------------------------------------------------------

/// The efficiency series pins its axes to the published hints so mid-window
/// transients cannot make the chart jump while the range slider is dragged.
/// Undefined points break the line into segments rather than plotting zero.
fn efficiency_chart(ui: &mut Ui, id: &str, view: &TidyTable, colors: Option<&ColorMap>) {
    let plot = Plot::new(id.to_string())
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Match")
        .y_axis_label(view.metric.label())
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false);

    plot.show(ui, |plot_ui| {
        if let (Some((x0, x1)), Some((y0, y1))) = (view.x_hint, view.y_hint) {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max([x0, y0], [x1, y1]));
        }

        for team in view.teams() {
            let color = team_color(team, colors);
            for segment in defined_segments(view, team) {
                plot_ui.line(
                    Line::new(PlotPoints::from(segment))
                        .name(team)
                        .color(color)
                        .width(1.5),
                );
            }
        }
    });
}

/// Split one team's series into runs of consecutive defined values.
fn defined_segments(view: &TidyTable, team: &str) -> Vec<Vec<[f64; 2]>> {
    let mut segments: Vec<Vec<[f64; 2]>> = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();
    for row in view.team_rows(team) {
        match row.value {
            Some(v) => current.push([f64::from(row.match_id), v]),
            None => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}
