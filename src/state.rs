use anyhow::{Result, bail};

use crate::color::ColorMap;
use crate::data::filter::{FilterSpec, apply_filter};
use crate::data::metrics::{self, LeaderboardRow, TransferRow};
use crate::data::model::{MatchTable, Metric, TidyTable};

// ---------------------------------------------------------------------------
// ViewBundle – one recomputation's output
// ---------------------------------------------------------------------------

/// Everything one recomputation publishes to the presentation sink.
/// Replaced wholesale on the next publish; the transfer views exist only
/// when a transfers table is attached.
#[derive(Debug, Clone)]
pub struct ViewBundle {
    pub total_points: TidyTable,
    pub earned_points: TidyTable,
    pub leaderboard: Vec<LeaderboardRow>,
    pub transfers_accumulated: Option<TidyTable>,
    pub transfer_efficiency: Option<TidyTable>,
    pub transfer_table: Option<Vec<TransferRow>>,
}

// ---------------------------------------------------------------------------
// InputEvent – the observed UI inputs
// ---------------------------------------------------------------------------

/// A change to one of the three observed inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// The team multi-select dropdown opened or closed.
    TeamSelectorOpened(bool),
    /// The team selection changed (selection order preserved; empty = all).
    TeamsChanged(Vec<String>),
    /// The match-range slider moved (inclusive bounds).
    MatchRangeChanged(u32, u32),
}

// ---------------------------------------------------------------------------
// DashboardState
// ---------------------------------------------------------------------------

/// The dashboard's full state, independent of rendering.
///
/// Owns the load-once season tables and the last published [`ViewBundle`].
/// All input changes flow through [`apply_event`](Self::apply_event), which
/// recomputes synchronously: while the team selector is open recomputation
/// is suppressed (multi-select in progress) and flushed once on close.
pub struct DashboardState {
    /// Per-match points table (None until a file is loaded).
    pub points: Option<MatchTable>,
    /// Per-match transfers table; must share the points table's team names.
    pub transfers: Option<MatchTable>,

    /// Whether the team multi-select dropdown is currently open.
    pub team_selector_open: bool,
    /// Selected teams in selection order; empty means all teams.
    pub selected_teams: Vec<String>,
    /// Inclusive match-range filter.
    pub match_range: (u32, u32),

    /// When false (the default) the leaderboard always shows full-season
    /// totals; when true it follows the match-range filter.
    pub leaderboard_follows_filter: bool,

    /// Last published views; retained as-is when a recomputation yields
    /// "no update".
    pub views: Option<ViewBundle>,
    /// Input changed while the selector was open; flush on close.
    dirty: bool,

    /// Stable team → colour assignment for charts and tables.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            points: None,
            transfers: None,
            team_selector_open: false,
            selected_teams: Vec::new(),
            match_range: (1, 1),
            leaderboard_follows_filter: false,
            views: None,
            dirty: false,
            color_map: None,
            status_message: None,
            loading: false,
        }
    }
}

impl DashboardState {
    /// Ingest a newly loaded points table: reset the filters to the full
    /// span and publish the initial views.  Any previously attached
    /// transfers table is dropped (it belonged to the old season).
    pub fn attach_points(&mut self, table: MatchTable) {
        self.color_map = Some(ColorMap::new(&table.team_names));
        self.selected_teams.clear();
        self.match_range = table.match_span().unwrap_or((1, 1));
        self.transfers = None;
        self.points = Some(table);
        self.views = None;
        self.dirty = false;
        self.status_message = None;
        self.loading = false;
        self.publish();
    }

    /// Attach the transfers table for the loaded season.  Fails when no
    /// points table is loaded or the two tables cannot be joined.
    pub fn attach_transfers(&mut self, table: MatchTable) -> Result<()> {
        let Some(points) = &self.points else {
            bail!("load a points table before a transfers table");
        };
        let mut expected: Vec<&String> = points.team_names.iter().collect();
        let mut got: Vec<&String> = table.team_names.iter().collect();
        expected.sort();
        got.sort();
        if expected != got {
            bail!(
                "transfers table teams {:?} do not match points table teams {:?}",
                table.team_names,
                points.team_names
            );
        }
        let point_ids: Vec<u32> = points.rows.iter().map(|r| r.match_id).collect();
        let transfer_ids: Vec<u32> = table.rows.iter().map(|r| r.match_id).collect();
        if point_ids != transfer_ids {
            bail!("transfers table covers different matches than the points table");
        }

        self.transfers = Some(table);
        self.loading = false;
        self.publish();
        Ok(())
    }

    /// Matches in the loaded season (slider upper bound).
    pub fn match_count(&self) -> usize {
        self.points.as_ref().map_or(0, MatchTable::match_count)
    }

    /// Team names of the loaded season, in column order.
    pub fn team_names(&self) -> &[String] {
        self.points.as_ref().map_or(&[], |t| t.team_names.as_slice())
    }

    /// Switch the leaderboard between full-season totals and the filtered
    /// window, republishing immediately.
    pub fn set_leaderboard_follows_filter(&mut self, follows: bool) {
        if self.leaderboard_follows_filter != follows {
            self.leaderboard_follows_filter = follows;
            self.publish();
        }
    }

    // -- event dispatch ----------------------------------------------------

    /// Feed one input change through the recomputation contract.
    pub fn apply_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::TeamSelectorOpened(open) => {
                let closing = self.team_selector_open && !open;
                self.team_selector_open = open;
                if closing && self.dirty {
                    self.publish();
                }
            }
            InputEvent::TeamsChanged(teams) => {
                if self.selected_teams != teams {
                    self.selected_teams = teams;
                    self.input_changed();
                }
            }
            InputEvent::MatchRangeChanged(min, max) => {
                if self.match_range != (min, max) {
                    self.match_range = (min, max);
                    self.input_changed();
                }
            }
        }
    }

    fn input_changed(&mut self) {
        if self.team_selector_open {
            self.dirty = true;
        } else {
            self.publish();
        }
    }

    /// Recompute and, unless the result is "no update", replace the
    /// published views.
    fn publish(&mut self) {
        self.dirty = false;
        if let Some(bundle) = self.recompute() {
            self.views = Some(bundle);
        }
    }

    // -- recomputation -----------------------------------------------------

    /// Derive a fresh [`ViewBundle`] from the current inputs.
    ///
    /// Returns `None` ("no update": keep showing the last good state) when
    /// no points table is loaded, the filter is rejected, or the filtered
    /// window contains no matches.
    pub fn recompute(&self) -> Option<ViewBundle> {
        let points = self.points.as_ref()?;
        let spec = FilterSpec {
            teams: self.selected_teams.clone(),
            match_range: self.match_range,
        };

        let window = match apply_filter(points, &spec) {
            Ok(table) => table,
            Err(e) => {
                log::warn!("filter rejected, keeping previous views: {e}");
                return None;
            }
        };
        if window.is_empty() {
            log::debug!(
                "empty window [{}, {}], keeping previous views",
                spec.match_range.0,
                spec.match_range.1
            );
            return None;
        }

        let transfer_window = match &self.transfers {
            Some(transfers) => match apply_filter(transfers, &spec) {
                Ok(table) => Some(table),
                Err(e) => {
                    log::warn!("transfer filter rejected, keeping previous views: {e}");
                    return None;
                }
            },
            None => None,
        };

        let leaderboard_source = if self.leaderboard_follows_filter {
            &window
        } else {
            points
        };

        Some(ViewBundle {
            total_points: metrics::cumulative_totals(&window, Metric::Points),
            earned_points: metrics::per_match_tidy(&window, Metric::Points),
            leaderboard: metrics::leaderboard(leaderboard_source),
            transfers_accumulated: transfer_window
                .as_ref()
                .map(|t| metrics::cumulative_totals(t, Metric::TransfersAccumulated)),
            transfer_efficiency: transfer_window
                .as_ref()
                .map(|t| metrics::efficiency_series(&window, t)),
            transfer_table: transfer_window
                .as_ref()
                .map(|t| metrics::transfers_table(&window, t)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::MatchRow;

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

    fn loaded_state() -> DashboardState {
        let mut state = DashboardState::default();
        state.attach_points(points());
        state
    }

    #[test]
    fn attach_publishes_full_span_views() {
        let state = loaded_state();
        assert_eq!(state.match_range, (1, 3));
        let views = state.views.as_ref().expect("initial publish");
        assert_eq!(views.leaderboard[0].team, "B");
        assert_eq!(views.total_points.rows.len(), 6);
        assert!(views.transfer_table.is_none());
    }

    #[test]
    fn range_change_recomputes_within_window() {
        let mut state = loaded_state();
        state.apply_event(InputEvent::MatchRangeChanged(2, 3));
        let views = state.views.as_ref().unwrap();
        let a: Vec<Option<f64>> = views.total_points.team_rows("A").map(|r| r.value).collect();
        // accumulation restarts at the window's first match
        assert_eq!(a, vec![Some(20.0), Some(30.0)]);
    }

    #[test]
    fn open_selector_suppresses_until_close() {
        let mut state = loaded_state();
        state.apply_event(InputEvent::TeamSelectorOpened(true));
        state.apply_event(InputEvent::TeamsChanged(vec!["B".into()]));

        // still showing both teams
        let views = state.views.as_ref().unwrap();
        assert_eq!(views.total_points.teams().len(), 2);

        state.apply_event(InputEvent::TeamSelectorOpened(false));
        let views = state.views.as_ref().unwrap();
        assert_eq!(views.total_points.teams(), vec!["B"]);
    }

    #[test]
    fn closing_selector_without_changes_does_not_republish() {
        let mut state = loaded_state();
        let before = state.views.clone().unwrap();
        state.apply_event(InputEvent::TeamSelectorOpened(true));
        state.apply_event(InputEvent::TeamSelectorOpened(false));
        let after = state.views.as_ref().unwrap();
        assert_eq!(before.total_points, after.total_points);
    }

    #[test]
    fn empty_window_keeps_previous_views() {
        let mut state = loaded_state();
        state.apply_event(InputEvent::MatchRangeChanged(7, 9));
        // input updated, but the published views are the last good ones
        assert_eq!(state.match_range, (7, 9));
        let views = state.views.as_ref().unwrap();
        assert_eq!(views.total_points.rows.len(), 6);
    }

    #[test]
    fn rejected_filter_keeps_previous_views() {
        let mut state = loaded_state();
        state.apply_event(InputEvent::TeamsChanged(vec!["Nope".into()]));
        let views = state.views.as_ref().unwrap();
        assert_eq!(views.total_points.teams().len(), 2);
    }

    #[test]
    fn leaderboard_ignores_window_by_default() {
        let mut state = loaded_state();
        state.apply_event(InputEvent::MatchRangeChanged(2, 3));
        let views = state.views.as_ref().unwrap();
        // full-season totals: B 50, A 40
        assert_eq!(views.leaderboard[0].total_points, 50.0);

        state.leaderboard_follows_filter = true;
        state.apply_event(InputEvent::MatchRangeChanged(2, 2));
        let views = state.views.as_ref().unwrap();
        // window totals: B 25, A 20
        assert_eq!(views.leaderboard[0].total_points, 25.0);
    }

    #[test]
    fn transfer_views_appear_once_attached() {
        let mut state = loaded_state();
        state.attach_transfers(transfers()).unwrap();
        let views = state.views.as_ref().unwrap();
        let table = views.transfer_table.as_ref().unwrap();
        assert_eq!(table[0].team, "A");
        assert_eq!(table[0].efficiency, Some(20.0));
        assert!(views.transfer_efficiency.is_some());
        assert!(views.transfers_accumulated.is_some());
    }

    #[test]
    fn transfers_with_different_teams_are_rejected() {
        let mut state = loaded_state();
        let bad = MatchTable::new(
            vec!["A".into(), "Z".into()],
            vec![MatchRow { match_id: 1, values: vec![1.0, 0.0] }],
        );
        assert!(state.attach_transfers(bad).is_err());
        assert!(state.transfers.is_none());
    }

    #[test]
    fn transfers_before_points_are_rejected() {
        let mut state = DashboardState::default();
        assert!(state.attach_transfers(transfers()).is_err());
    }
}
