use super::model::{MatchTable, Metric, TidyRow, TidyTable};

// ---------------------------------------------------------------------------
// Table-view rows
// ---------------------------------------------------------------------------

/// One leaderboard entry.  Ties share the lowest rank among them (min-rank);
/// the next distinct total skips the tied slots.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    pub team: String,
    pub total_points: f64,
    pub rank: u32,
    /// Rank movement against the standings one match earlier
    /// (positive = climbed).  Zero when fewer than two matches exist.
    pub rank_change: i32,
}

/// One row of the transfer-activity table.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRow {
    pub team: String,
    pub total_transfers: f64,
    /// Transfers per match, rounded to 2 decimals.
    pub avg_per_match: f64,
    /// `total_points / total_transfers`, rounded to 2 decimals.
    /// `None` when the team never transferred.
    pub efficiency: Option<f64>,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Reshapes
// ---------------------------------------------------------------------------

/// Melt a wide table to tidy form, one row per (match, team) pair, keeping
/// raw per-match values.  Output is team-major (all of one team's matches,
/// then the next team), matching the wide column order.
///
/// The x-hint frames the span one match wide on each side so edge markers
/// stay clear of the plot border.
pub fn per_match_tidy(table: &MatchTable, metric: Metric) -> TidyTable {
    let rows = melt(table);
    TidyTable {
        metric,
        rows,
        x_hint: table
            .match_span()
            .map(|(first, last)| (f64::from(first) - 1.0, f64::from(last) + 1.0)),
        y_hint: None,
    }
}

/// Per team, the running sum of values over the rows in presentation order,
/// melted to tidy form.
///
/// The input is taken as the whole series: when the caller has already
/// restricted the match range, accumulation restarts at the window's first
/// included match rather than carrying totals from before the window.
pub fn cumulative_totals(table: &MatchTable, metric: Metric) -> TidyTable {
    let mut rows = Vec::with_capacity(table.match_count() * table.team_names.len());
    for (team_idx, team) in table.team_names.iter().enumerate() {
        let mut running = 0.0;
        for row in &table.rows {
            running += row.values[team_idx];
            rows.push(TidyRow {
                match_id: row.match_id,
                team: team.clone(),
                value: Some(running),
            });
        }
    }
    TidyTable {
        metric,
        rows,
        x_hint: table
            .match_span()
            .map(|(first, last)| (f64::from(first) - 0.5, f64::from(last) + 0.5)),
        y_hint: None,
    }
}

/// Column-major melt: one tidy row per (team column, match) cell.
fn melt(table: &MatchTable) -> Vec<TidyRow> {
    let mut rows = Vec::with_capacity(table.match_count() * table.team_names.len());
    for (team_idx, team) in table.team_names.iter().enumerate() {
        for row in &table.rows {
            rows.push(TidyRow {
                match_id: row.match_id,
                team: team.clone(),
                value: Some(row.values[team_idx]),
            });
        }
    }
    rows
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

/// Min-rank every total: `1 + number of strictly larger totals`.
fn min_ranks(totals: &[f64]) -> Vec<u32> {
    totals
        .iter()
        .map(|&t| 1 + totals.iter().filter(|&&other| other > t).count() as u32)
        .collect()
}

/// Sum each team's points over all rows, min-rank the totals and sort
/// ascending by rank (ties keep column order).
///
/// `rank_change` compares against the standings with the final row removed;
/// it feeds the movement arrows next to each rank.
pub fn leaderboard(table: &MatchTable) -> Vec<LeaderboardRow> {
    let totals: Vec<f64> = (0..table.team_names.len())
        .map(|i| table.team_total(i))
        .collect();
    let ranks = min_ranks(&totals);

    let previous_ranks: Option<Vec<u32>> = if table.match_count() >= 2 {
        let prior: Vec<f64> = (0..table.team_names.len())
            .map(|i| {
                table
                    .rows
                    .iter()
                    .take(table.match_count() - 1)
                    .map(|row| row.values[i])
                    .sum()
            })
            .collect();
        Some(min_ranks(&prior))
    } else {
        None
    };

    let mut rows: Vec<LeaderboardRow> = table
        .team_names
        .iter()
        .enumerate()
        .map(|(i, team)| LeaderboardRow {
            team: team.clone(),
            total_points: totals[i],
            rank: ranks[i],
            rank_change: previous_ranks
                .as_ref()
                .map(|prev| prev[i] as i32 - ranks[i] as i32)
                .unwrap_or(0),
        })
        .collect();
    rows.sort_by_key(|row| row.rank);
    rows
}

// ---------------------------------------------------------------------------
// Transfer views
// ---------------------------------------------------------------------------

/// Per-team transfer totals joined with point totals by team name, sorted by
/// efficiency descending with undefined efficiencies last.
pub fn transfers_table(points: &MatchTable, transfers: &MatchTable) -> Vec<TransferRow> {
    let match_count = transfers.match_count();
    if match_count == 0 {
        return Vec::new();
    }

    let mut rows: Vec<TransferRow> = transfers
        .team_names
        .iter()
        .enumerate()
        .filter_map(|(idx, team)| {
            let point_idx = points.team_index(team)?;
            let total_transfers = transfers.team_total(idx);
            let total_points = points.team_total(point_idx);
            Some(TransferRow {
                team: team.clone(),
                total_transfers,
                avg_per_match: round2(total_transfers / match_count as f64),
                efficiency: (total_transfers != 0.0)
                    .then(|| round2(total_points / total_transfers)),
            })
        })
        .collect();

    rows.sort_by(|a, b| match (a.efficiency, b.efficiency) {
        (Some(ea), Some(eb)) => eb.total_cmp(&ea),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    rows
}

/// Per match and team, `cumulative points / cumulative transfers`; `None`
/// while a team's cumulative transfers are still zero.
///
/// The y-hint is anchored to the values present at the first and last
/// included match only.  Mid-window transients can be extreme (one point on
/// one transfer early in the season) and must not move the axis while the
/// range slider is dragged.
pub fn efficiency_series(points: &MatchTable, transfers: &MatchTable) -> TidyTable {
    let mut rows = Vec::new();
    for (point_idx, team) in points.team_names.iter().enumerate() {
        let Some(transfer_idx) = transfers.team_index(team) else {
            continue;
        };
        let mut cum_points = 0.0;
        let mut cum_transfers = 0.0;
        for (point_row, transfer_row) in points.rows.iter().zip(&transfers.rows) {
            cum_points += point_row.values[point_idx];
            cum_transfers += transfer_row.values[transfer_idx];
            rows.push(TidyRow {
                match_id: point_row.match_id,
                team: team.clone(),
                value: (cum_transfers != 0.0).then(|| cum_points / cum_transfers),
            });
        }
    }

    let span = points.match_span();
    let y_hint = span.and_then(|(first, last)| {
        let boundary: Vec<f64> = rows
            .iter()
            .filter(|r| r.match_id == first || r.match_id == last)
            .filter_map(|r| r.value)
            .collect();
        let min = boundary.iter().cloned().reduce(f64::min)?;
        let max = boundary.iter().cloned().reduce(f64::max)?;
        Some((min - 50.0, max + 50.0))
    });

    TidyTable {
        metric: Metric::TransferEfficiency,
        rows,
        x_hint: span.map(|(first, last)| (f64::from(first) - 0.5, f64::from(last) + 0.5)),
        y_hint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterSpec, apply_filter};
    use crate::data::model::MatchRow;

    /// Spec fixture: 3 matches, A=[10,20,10], B=[5,25,20].
    fn points() -> MatchTable {
        MatchTable::new(
            vec!["A".into(), "B".into()],
            vec![
                MatchRow { match_id: 1, values: vec![10.0, 5.0] },
                MatchRow { match_id: 2, values: vec![20.0, 25.0] },
                MatchRow { match_id: 3, values: vec![10.0, 20.0] },
            ],
        )
    }

    /// Transfers fixture: A=[1,0,1], B=[0,0,0].
    fn transfers() -> MatchTable {
        MatchTable::new(
            vec!["A".into(), "B".into()],
            vec![
                MatchRow { match_id: 1, values: vec![1.0, 0.0] },
                MatchRow { match_id: 2, values: vec![0.0, 0.0] },
                MatchRow { match_id: 3, values: vec![1.0, 0.0] },
            ],
        )
    }

    fn team_values(view: &TidyTable, team: &str) -> Vec<Option<f64>> {
        view.team_rows(team).map(|r| r.value).collect()
    }

    #[test]
    fn cumulative_matches_manual_prefix_sum() {
        let view = cumulative_totals(&points(), Metric::Points);
        assert_eq!(
            team_values(&view, "A"),
            vec![Some(10.0), Some(30.0), Some(40.0)]
        );
        assert_eq!(
            team_values(&view, "B"),
            vec![Some(5.0), Some(30.0), Some(50.0)]
        );
        assert_eq!(view.x_hint, Some((0.5, 3.5)));
    }

    #[test]
    fn cumulative_on_single_row_is_raw() {
        let table = MatchTable::new(
            vec!["A".into()],
            vec![MatchRow { match_id: 1, values: vec![7.0] }],
        );
        let view = cumulative_totals(&table, Metric::Points);
        assert_eq!(team_values(&view, "A"), vec![Some(7.0)]);
    }

    #[test]
    fn cumulative_restarts_inside_filtered_window() {
        let spec = FilterSpec {
            teams: Vec::new(),
            match_range: (2, 3),
        };
        let window = apply_filter(&points(), &spec).unwrap();
        let view = cumulative_totals(&window, Metric::Points);
        assert_eq!(team_values(&view, "A"), vec![Some(20.0), Some(30.0)]);
    }

    #[test]
    fn melt_roundtrip_reproduces_wide_table() {
        let table = points();
        let view = per_match_tidy(&table, Metric::Points);

        // reshape back to wide form
        let teams = view.teams();
        let mut match_ids: Vec<u32> = view.rows.iter().map(|r| r.match_id).collect();
        match_ids.sort_unstable();
        match_ids.dedup();

        let rows: Vec<MatchRow> = match_ids
            .iter()
            .map(|&id| MatchRow {
                match_id: id,
                values: teams
                    .iter()
                    .map(|team| {
                        view.rows
                            .iter()
                            .find(|r| r.match_id == id && r.team == *team)
                            .and_then(|r| r.value)
                            .unwrap()
                    })
                    .collect(),
            })
            .collect();
        let wide = MatchTable::new(teams.iter().map(|t| t.to_string()).collect(), rows);
        assert_eq!(wide, table);
    }

    #[test]
    fn per_match_tidy_keeps_raw_values_and_scatter_framing() {
        let view = per_match_tidy(&points(), Metric::Points);
        assert_eq!(
            team_values(&view, "A"),
            vec![Some(10.0), Some(20.0), Some(10.0)]
        );
        assert_eq!(view.x_hint, Some((0.0, 4.0)));
    }

    #[test]
    fn leaderboard_fixture_ranks() {
        let rows = leaderboard(&points());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].team, "B");
        assert_eq!(rows[0].total_points, 50.0);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[1].team, "A");
        assert_eq!(rows[1].total_points, 40.0);
        assert_eq!(rows[1].rank, 2);
    }

    #[test]
    fn leaderboard_min_rank_ties() {
        let table = MatchTable::new(
            vec!["A".into(), "B".into(), "C".into()],
            vec![MatchRow { match_id: 1, values: vec![50.0, 50.0, 40.0] }],
        );
        let rows = leaderboard(&table);
        let ranks: Vec<u32> = rows.iter().map(|r| r.rank).collect();
        // tied teams share rank 1, the next team skips to 3
        assert_eq!(ranks, vec![1, 1, 3]);
        // ranks are non-decreasing in sorted order
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
        // equal totals always share a rank
        assert_eq!(rows[0].rank, rows[1].rank);
    }

    #[test]
    fn leaderboard_rank_change_against_previous_match() {
        // After match 2 both teams sit at 30 (shared rank 1); match 3 breaks
        // the tie in B's favour.
        let rows = leaderboard(&points());
        let b = rows.iter().find(|r| r.team == "B").unwrap();
        let a = rows.iter().find(|r| r.team == "A").unwrap();
        assert_eq!(b.rank_change, 0);
        assert_eq!(a.rank_change, -1);
    }

    #[test]
    fn transfers_table_fixture() {
        let rows = transfers_table(&points(), &transfers());
        assert_eq!(rows.len(), 2);

        // A: 2 transfers for 40 points
        assert_eq!(rows[0].team, "A");
        assert_eq!(rows[0].total_transfers, 2.0);
        assert_eq!(rows[0].avg_per_match, 0.67);
        assert_eq!(rows[0].efficiency, Some(20.0));

        // B never transferred: efficiency undefined, sorted last
        assert_eq!(rows[1].team, "B");
        assert_eq!(rows[1].total_transfers, 0.0);
        assert_eq!(rows[1].efficiency, None);
    }

    #[test]
    fn efficiency_series_guards_zero_denominator() {
        let view = efficiency_series(&points(), &transfers());
        assert_eq!(
            team_values(&view, "A"),
            vec![Some(10.0), Some(30.0), Some(20.0)]
        );
        // B's cumulative transfers stay zero: every point is undefined
        assert_eq!(team_values(&view, "B"), vec![None, None, None]);
        assert!(view.rows.iter().all(|r| r.value.map_or(true, f64::is_finite)));
    }

    #[test]
    fn efficiency_y_hint_anchored_to_boundary_matches() {
        // Boundary values: A at match 1 → 10, A at match 3 → 20 (B undefined
        // at both).  The match-2 transient (30) must not widen the axis.
        let view = efficiency_series(&points(), &transfers());
        assert_eq!(view.y_hint, Some((-40.0, 70.0)));
    }

    #[test]
    fn efficiency_y_hint_absent_when_no_boundary_value_defined() {
        let no_transfers = MatchTable::new(
            vec!["A".into(), "B".into()],
            vec![
                MatchRow { match_id: 1, values: vec![0.0, 0.0] },
                MatchRow { match_id: 2, values: vec![0.0, 0.0] },
                MatchRow { match_id: 3, values: vec![0.0, 0.0] },
            ],
        );
        let view = efficiency_series(&points(), &no_transfers);
        assert_eq!(view.y_hint, None);
    }

    #[test]
    fn single_team_subset_is_chart_ready() {
        let spec = FilterSpec {
            teams: vec!["B".into()],
            match_range: (1, 3),
        };
        let window = apply_filter(&points(), &spec).unwrap();
        let view = cumulative_totals(&window, Metric::Points);
        assert_eq!(view.teams(), vec!["B"]);
        assert_eq!(
            team_values(&view, "B"),
            vec![Some(5.0), Some(30.0), Some(50.0)]
        );
    }
}
