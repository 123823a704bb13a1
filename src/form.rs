use std::fmt;

use serde::{Deserialize, Serialize};

/// Points for a win under the standard scoring, used as the form-score ceiling.
const MAX_POINTS_PER_MATCH: f64 = 3.0;

/// A match result from one team's point of view.
///
/// Symbols other than `W`/`D`/`L` are kept as `Other` so they survive a
/// round trip through a form string, but they score nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "char", into = "char")]
pub enum Outcome {
    Win,
    Draw,
    Loss,
    Other(char),
}

impl Outcome {
    pub fn from_symbol(c: char) -> Self {
        match c {
            'W' => Outcome::Win,
            'D' => Outcome::Draw,
            'L' => Outcome::Loss,
            other => Outcome::Other(other),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Outcome::Win => 'W',
            Outcome::Draw => 'D',
            Outcome::Loss => 'L',
            Outcome::Other(c) => c,
        }
    }

    pub fn from_goals(goals_for: f64, goals_against: f64) -> Self {
        if goals_for > goals_against {
            Outcome::Win
        } else if goals_for < goals_against {
            Outcome::Loss
        } else {
            Outcome::Draw
        }
    }
}

impl From<char> for Outcome {
    fn from(c: char) -> Self {
        Outcome::from_symbol(c)
    }
}

impl From<Outcome> for char {
    fn from(o: Outcome) -> Self {
        o.symbol()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Points awarded per outcome; overridable for alternative form weightings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointsTable {
    pub win: f64,
    pub draw: f64,
    pub loss: f64,
}

impl Default for PointsTable {
    fn default() -> Self {
        Self {
            win: 3.0,
            draw: 1.0,
            loss: 0.0,
        }
    }
}

impl PointsTable {
    pub fn points(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Win => self.win,
            Outcome::Draw => self.draw,
            Outcome::Loss => self.loss,
            Outcome::Other(_) => 0.0,
        }
    }
}

/// Current run of identical results, counted back from the latest match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    #[serde(rename = "type")]
    pub outcome: Option<Outcome>,
    pub length: usize,
}

/// Parses a compact form string such as `"WWDLW"` (oldest first).
pub fn parse_results(form: &str) -> Vec<Outcome> {
    form.trim().chars().map(Outcome::from_symbol).collect()
}

/// The last `max_length` results as a string, oldest of the window first.
pub fn form_sequence(results: &[Outcome], max_length: usize) -> String {
    let start = results.len().saturating_sub(max_length);
    results[start..].iter().map(|o| o.symbol()).collect()
}

/// Recency-weighted form on a 0-100 scale.
///
/// Weights rise linearly from 0.5 (oldest) to 1.0 (latest); the weighted
/// mean of points is divided by the three points of a win.
pub fn form_score(results: &[Outcome], points: &PointsTable) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let n = results.len();
    let span = n.saturating_sub(1).max(1) as f64;

    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (i, outcome) in results.iter().enumerate() {
        let w = 0.5 + 0.5 * (i as f64 / span);
        weighted_sum += points.points(*outcome) * w;
        weight_total += w;
    }
    if weight_total == 0.0 {
        return 0.0;
    }
    crate::round_dp(weighted_sum / weight_total / MAX_POINTS_PER_MATCH * 100.0, 2)
}

/// Share of `results` equal to `outcome`, as a percentage.
pub fn outcome_rate(results: &[Outcome], outcome: Outcome) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let count = results.iter().filter(|r| **r == outcome).count();
    crate::round_dp(count as f64 / results.len() as f64 * 100.0, 2)
}

pub fn current_streak(results: &[Outcome]) -> Streak {
    let Some(&last) = results.last() else {
        return Streak {
            outcome: None,
            length: 0,
        };
    };
    let length = results.iter().rev().take_while(|r| **r == last).count();
    Streak {
        outcome: Some(last),
        length,
    }
}

/// League points for `results`; 3/1/0 under the default table.
pub fn total_points(results: &[Outcome], points: &PointsTable) -> f64 {
    results.iter().map(|r| points.points(*r)).sum()
}

pub fn goal_difference(goals_for: &[i64], goals_against: &[i64]) -> i64 {
    goals_for.iter().sum::<i64>() - goals_against.iter().sum::<i64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_symbols_survive_the_form_string() {
        let results = parse_results("WXL");
        assert_eq!(results[1], Outcome::Other('X'));
        assert_eq!(form_sequence(&results, 5), "WXL");
        assert_eq!(total_points(&results, &PointsTable::default()), 3.0);
    }

    #[test]
    fn single_result_gets_full_weight() {
        assert_eq!(form_score(&[Outcome::Draw], &PointsTable::default()), 33.33);
    }

    #[test]
    fn outcome_serializes_as_its_symbol() {
        let json = serde_json::to_string(&current_streak(&parse_results("LWW"))).unwrap();
        assert_eq!(json, r#"{"type":"W","length":2}"#);
    }
}
