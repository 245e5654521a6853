use std::fmt;

// ---------------------------------------------------------------------------
// MatchRow – one row of the season table
// ---------------------------------------------------------------------------

/// A single match: its identifier plus one numeric value per team.
/// `values` is parallel to [`MatchTable::team_names`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRow {
    /// 1-based match identifier, unique and ascending within a table.
    pub match_id: u32,
    /// Points or transfer counts, one entry per team column.
    pub values: Vec<f64>,
}

// ---------------------------------------------------------------------------
// MatchTable – the complete loaded dataset (wide form)
// ---------------------------------------------------------------------------

/// The full parsed season table: one row per match, one column per team.
///
/// Loaded once at session start and treated as read-only afterwards; the
/// filter and metrics layers only ever allocate new tables from it.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchTable {
    /// Ordered team names (insertion order = source column order).
    pub team_names: Vec<String>,
    /// All matches, sorted by `match_id` ascending.
    pub rows: Vec<MatchRow>,
}

impl MatchTable {
    pub fn new(team_names: Vec<String>, rows: Vec<MatchRow>) -> Self {
        MatchTable { team_names, rows }
    }

    /// Number of matches.
    pub fn match_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has any matches.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First and last match id, if the table is non-empty.
    pub fn match_span(&self) -> Option<(u32, u32)> {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => Some((first.match_id, last.match_id)),
            _ => None,
        }
    }

    /// Column index of a team name.
    pub fn team_index(&self, name: &str) -> Option<usize> {
        self.team_names.iter().position(|t| t == name)
    }

    /// One team's values in match order.
    pub fn column(&self, team_idx: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(move |row| row.values[team_idx])
    }

    /// Sum of one team's values over all rows.
    pub fn team_total(&self, team_idx: usize) -> f64 {
        self.column(team_idx).sum()
    }
}

// ---------------------------------------------------------------------------
// Metric – which quantity a derived view carries
// ---------------------------------------------------------------------------

/// The quantity on a derived view's value axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Points,
    Transfers,
    TransfersAccumulated,
    TransferEfficiency,
}

impl Metric {
    /// Axis / legend label for the value column.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Points => "Points",
            Metric::Transfers => "Transfers",
            Metric::TransfersAccumulated => "Transfers accumulated",
            Metric::TransferEfficiency => "Transfer Efficiency",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// TidyTable – long-form derived view handed to the chart sink
// ---------------------------------------------------------------------------

/// One observation of a tidy table: `(match, team, value)`.
/// `value` is `None` where the metric is undefined (a ratio whose
/// denominator is still zero) – such points are skipped by the sink, never
/// rendered as zero or infinity.
#[derive(Debug, Clone, PartialEq)]
pub struct TidyRow {
    pub match_id: u32,
    pub team: String,
    pub value: Option<f64>,
}

/// A long-form (one row per match/team pair) derived view, tagged with its
/// metric and the axis ranges the chart should use.
#[derive(Debug, Clone, PartialEq)]
pub struct TidyTable {
    pub metric: Metric,
    pub rows: Vec<TidyRow>,
    /// Suggested x-axis range (chart framing over the included span).
    pub x_hint: Option<(f64, f64)>,
    /// Suggested y-axis range. For the efficiency series this is anchored
    /// to the window's boundary matches, not the global extrema.
    pub y_hint: Option<(f64, f64)>,
}

impl TidyTable {
    /// Teams present in this view, in first-appearance order.
    pub fn teams(&self) -> Vec<&str> {
        let mut teams: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !teams.contains(&row.team.as_str()) {
                teams.push(&row.team);
            }
        }
        teams
    }

    /// All rows belonging to one team, in match order.
    pub fn team_rows<'a>(&'a self, team: &'a str) -> impl Iterator<Item = &'a TidyRow> {
        self.rows.iter().filter(move |r| r.team == team)
    }
}
