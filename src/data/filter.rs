use thiserror::Error;

use super::model::{MatchRow, MatchTable};

// ---------------------------------------------------------------------------
// FilterSpec – what the user currently wants to see
// ---------------------------------------------------------------------------

/// A team projection plus an inclusive match-range restriction.
///
/// Rebuilt from the live UI inputs on every recomputation; never stored.
/// `teams` keeps the user's selection order (it becomes column and legend
/// order); an empty list means "all teams".
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub teams: Vec<String>,
    /// Inclusive `(min, max)` match-id bounds.
    pub match_range: (u32, u32),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown team '{0}'")]
    UnknownTeam(String),
    #[error("invalid match range [{min}, {max}]")]
    InvalidRange { min: u32, max: u32 },
}

// ---------------------------------------------------------------------------
// apply_filter
// ---------------------------------------------------------------------------

/// Produce a new table restricted to the requested teams and match range.
///
/// The team projection is validated before any work happens, so a failing
/// spec leaves nothing half-applied.  Zero surviving rows is a valid result
/// (the caller decides it means "no update", not an error).
pub fn apply_filter(table: &MatchTable, spec: &FilterSpec) -> Result<MatchTable, FilterError> {
    let (min, max) = spec.match_range;
    if min > max {
        return Err(FilterError::InvalidRange { min, max });
    }

    // Resolve the projection first: all-or-nothing.
    let (team_names, indices): (Vec<String>, Vec<usize>) = if spec.teams.is_empty() {
        (
            table.team_names.clone(),
            (0..table.team_names.len()).collect(),
        )
    } else {
        let mut names = Vec::with_capacity(spec.teams.len());
        let mut indices = Vec::with_capacity(spec.teams.len());
        for team in &spec.teams {
            let idx = table
                .team_index(team)
                .ok_or_else(|| FilterError::UnknownTeam(team.clone()))?;
            names.push(team.clone());
            indices.push(idx);
        }
        (names, indices)
    };

    let rows: Vec<MatchRow> = table
        .rows
        .iter()
        .filter(|row| row.match_id >= min && row.match_id <= max)
        .map(|row| MatchRow {
            match_id: row.match_id,
            values: indices.iter().map(|&i| row.values[i]).collect(),
        })
        .collect();

    Ok(MatchTable::new(team_names, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MatchTable {
        MatchTable::new(
            vec!["A".into(), "B".into(), "C".into()],
            vec![
                MatchRow { match_id: 1, values: vec![10.0, 5.0, 1.0] },
                MatchRow { match_id: 2, values: vec![20.0, 25.0, 2.0] },
                MatchRow { match_id: 3, values: vec![10.0, 20.0, 3.0] },
            ],
        )
    }

    #[test]
    fn identity_filter_is_a_copy() {
        let t = table();
        let spec = FilterSpec {
            teams: Vec::new(),
            match_range: (1, 3),
        };
        let filtered = apply_filter(&t, &spec).unwrap();
        assert_eq!(filtered, t);
    }

    #[test]
    fn projection_keeps_selection_order() {
        let t = table();
        let spec = FilterSpec {
            teams: vec!["C".into(), "A".into()],
            match_range: (1, 3),
        };
        let filtered = apply_filter(&t, &spec).unwrap();
        assert_eq!(filtered.team_names, vec!["C", "A"]);
        assert_eq!(filtered.rows[1].values, vec![2.0, 20.0]);
    }

    #[test]
    fn range_is_inclusive() {
        let t = table();
        let spec = FilterSpec {
            teams: Vec::new(),
            match_range: (2, 3),
        };
        let filtered = apply_filter(&t, &spec).unwrap();
        assert_eq!(filtered.match_count(), 2);
        assert_eq!(filtered.rows[0].match_id, 2);
    }

    #[test]
    fn out_of_data_range_yields_empty_not_error() {
        let t = table();
        let spec = FilterSpec {
            teams: Vec::new(),
            match_range: (7, 9),
        };
        let filtered = apply_filter(&t, &spec).unwrap();
        assert!(filtered.is_empty());
        assert_eq!(filtered.team_names, t.team_names);
    }

    #[test]
    fn unknown_team_fails_without_partial_application() {
        let t = table();
        let spec = FilterSpec {
            teams: vec!["A".into(), "Nope".into()],
            match_range: (1, 3),
        };
        let err = apply_filter(&t, &spec).unwrap_err();
        assert_eq!(err, FilterError::UnknownTeam("Nope".into()));
        // source table untouched
        assert_eq!(t.match_count(), 3);
        assert_eq!(t.team_names.len(), 3);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let t = table();
        let spec = FilterSpec {
            teams: Vec::new(),
            match_range: (3, 1),
        };
        assert_eq!(
            apply_filter(&t, &spec).unwrap_err(),
            FilterError::InvalidRange { min: 3, max: 1 }
        );
    }
}
