use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StatsError;
use crate::metric_table::Direction;

/// Team statistic category; each maps to one `mart_team_*` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatType {
    Attack,
    Defense,
    Possession,
    Discipline,
}

impl StatType {
    pub const ALL: [StatType; 4] = [
        StatType::Attack,
        StatType::Defense,
        StatType::Possession,
        StatType::Discipline,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatType::Attack => "attack",
            StatType::Defense => "defense",
            StatType::Possession => "possession",
            StatType::Discipline => "discipline",
        }
    }

    pub fn table_name(self) -> &'static str {
        match self {
            StatType::Attack => "mart_team_attack",
            StatType::Defense => "mart_team_defense",
            StatType::Possession => "mart_team_possession",
            StatType::Discipline => "mart_team_discipline",
        }
    }

    /// Metrics of this category where a smaller value is the better one.
    pub fn lower_is_better(self) -> &'static [&'static str] {
        match self {
            StatType::Attack => &[],
            StatType::Defense => &["goals_conceded_per_game", "total_goals_conceded"],
            StatType::Possession => &["dispossessed_per_game"],
            StatType::Discipline => &[
                "yellow_cards_per_game",
                "total_yellow_cards",
                "total_red_cards",
                "fouls_per_game",
                "total_fouls",
                "offsides_per_game",
                "total_offsides",
                "free_kicks_per_game",
                "total_free_kicks",
            ],
        }
    }

    pub fn directions(self) -> impl Iterator<Item = (&'static str, Direction)> {
        self.lower_is_better()
            .iter()
            .map(|m| (*m, Direction::LowerIsBetter))
    }

    /// `(metric, label)` pairs plotted on this category's radar.
    pub fn radar_axes(self) -> &'static [(&'static str, &'static str)] {
        match self {
            StatType::Attack => &[
                ("goals_per_game", "Goals/Game"),
                ("xg_per_game", "xG/Game"),
                ("shots_on_target_per_game", "Shots on Target/Game"),
                ("big_chances_created_per_game", "Big Chances/Game"),
                ("shots_per_game", "Shots/Game"),
                ("corners_per_game", "Corners/Game"),
            ],
            StatType::Defense => &[
                ("tackles_per_game", "Tackles/Game"),
                ("interceptions_per_game", "Interceptions/Game"),
                ("clearances_per_game", "Clearances/Game"),
                ("blocked_shots_per_game", "Blocked Shots/Game"),
                ("ball_recoveries_per_game", "Ball Recoveries/Game"),
                ("clean_sheet_pct", "Clean Sheet %"),
            ],
            StatType::Possession => &[
                ("avg_possession_pct", "Possession %"),
                ("pass_accuracy_pct", "Pass Accuracy %"),
                ("accurate_passes_per_game", "Accurate Passes/Game"),
                ("accurate_long_balls_per_game", "Long Balls/Game"),
                ("final_third_entries_per_game", "Final Third Entries/Game"),
                ("touches_in_box_per_game", "Touches in Box/Game"),
            ],
            StatType::Discipline => &[
                ("yellow_cards_per_game", "Yellow Cards/Game"),
                ("total_red_cards", "Red Cards"),
                ("fouls_per_game", "Fouls/Game"),
                ("offsides_per_game", "Offsides/Game"),
                ("total_fouls", "Total Fouls"),
                ("total_offsides", "Total Offsides"),
            ],
        }
    }
}

impl FromStr for StatType {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attack" => Ok(StatType::Attack),
            "defense" => Ok(StatType::Defense),
            "possession" => Ok(StatType::Possession),
            "discipline" => Ok(StatType::Discipline),
            _ => Err(StatsError::UnknownStatType(s.to_string())),
        }
    }
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_is_an_error() {
        assert_eq!("Defense".parse::<StatType>(), Ok(StatType::Defense));
        assert_eq!(
            "goalkeeping".parse::<StatType>(),
            Err(StatsError::UnknownStatType("goalkeeping".to_string()))
        );
    }

    #[test]
    fn discipline_axes_are_all_lower_is_better() {
        let lower = StatType::Discipline.lower_is_better();
        assert!(StatType::Discipline
            .radar_axes()
            .iter()
            .all(|(m, _)| lower.contains(m)));
    }
}
