//! Balance analysis of batch results.
//!
//! Flags win rates that drift from an even split and match lengths that
//! suggest one side snowballs or that games stall into the turn cap.

use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

use breach_core::factions::FactionId;

use crate::batch::BatchResults;

/// Win rate band outside which a side is flagged as [`Severity::Medium`].
pub const WIN_RATE_BAND: (f64, f64) = (0.45, 0.55);
/// Win rate band outside which a side is flagged as [`Severity::High`].
pub const WIN_RATE_HARD_BAND: (f64, f64) = (0.40, 0.60);
/// Average match length below which matches are considered too short.
pub const MIN_AVERAGE_TURNS: f64 = 6.0;
/// Share of turn-capped matches above which games are considered stalled.
pub const MAX_TURN_LIMIT_RATE: f64 = 0.20;

/// Severity of a balance issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Minor issue, low priority
    Low,
    /// Noticeable imbalance
    Medium,
    /// Significant problem requiring attention
    High,
}

/// A detected balance outlier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceOutlier {
    /// Category of the issue (win_rate, pacing, stability)
    pub category: String,
    /// Specific metric that's out of range
    pub metric: String,
    /// Observed value
    pub value: f64,
    /// Expected acceptable range
    pub expected_range: (f64, f64),
    /// Issue severity
    pub severity: Severity,
    /// Additional context
    pub context: String,
}

impl BalanceOutlier {
    /// Create new outlier
    pub fn new(
        category: &str,
        metric: &str,
        value: f64,
        range: (f64, f64),
        severity: Severity,
    ) -> Self {
        Self {
            category: category.to_string(),
            metric: metric.to_string(),
            value,
            expected_range: range,
            severity,
            context: String::new(),
        }
    }

    /// Add context
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context = ctx.into();
        self
    }
}

/// Win rate of one seat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideWinRate {
    /// Seat label, `player1` or `player2`.
    pub side: String,
    /// Faction in that seat.
    pub faction: FactionId,
    /// Share of matches won (0.0 - 1.0).
    pub win_rate: f64,
}

/// Complete balance analysis report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceAnalysis {
    /// Win rates per seat
    pub win_rates: Vec<SideWinRate>,
    /// Average match length in turns
    pub average_turns: f64,
    /// Share of matches decided by the turn cap
    pub turn_limit_rate: f64,
    /// Detected outliers
    pub outliers: Vec<BalanceOutlier>,
    /// Games analyzed
    pub games_analyzed: u32,
}

impl BalanceAnalysis {
    /// Whether any high-severity issue was found.
    pub fn has_high_severity(&self) -> bool {
        self.outliers.iter().any(|o| o.severity == Severity::High)
    }

    /// Get outliers sorted by severity, most severe first
    pub fn outliers_by_severity(&self) -> Vec<&BalanceOutlier> {
        let mut sorted: Vec<_> = self.outliers.iter().collect();
        sorted.sort_by(|a, b| b.severity.cmp(&a.severity));
        sorted
    }

    /// Save to JSON
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Generate markdown summary
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str("# Balance Analysis Report\n\n");

        md.push_str("## Win Rates\n\n");
        md.push_str("| Side | Faction | Win Rate |\n|------|---------|----------|\n");
        for rate in &self.win_rates {
            let _ = writeln!(
                md,
                "| {} | {} | {:.1}% |",
                rate.side,
                rate.faction.display_name(),
                rate.win_rate * 100.0
            );
        }

        let _ = write!(
            md,
            "\n## Pacing\n\n- Average turns: {:.1}\n- Turn-capped matches: {:.1}%\n",
            self.average_turns,
            self.turn_limit_rate * 100.0
        );

        if self.outliers.is_empty() {
            md.push_str("\n## Issues Detected\n\nNone.\n");
        } else {
            md.push_str("\n## Issues Detected\n\n");
            for outlier in self.outliers_by_severity() {
                let _ = writeln!(
                    md,
                    "- **[{:?}]** {}/{}: {:.2} (expected {:.2}-{:.2})",
                    outlier.severity,
                    outlier.category,
                    outlier.metric,
                    outlier.value,
                    outlier.expected_range.0,
                    outlier.expected_range.1
                );
                if !outlier.context.is_empty() {
                    let _ = writeln!(md, "  - {}", outlier.context);
                }
            }
        }

        let _ = write!(md, "\n---\n*Analyzed {} games*\n", self.games_analyzed);
        md
    }
}

/// Analyze batch results and generate a balance report
pub fn analyze_batch(results: &BatchResults) -> BalanceAnalysis {
    let summary = &results.summary;
    let mut analysis = BalanceAnalysis {
        games_analyzed: summary.games_played,
        ..Default::default()
    };

    if !results.errors.is_empty() {
        let attempted = summary.games_played as usize + results.errors.len();
        analysis.outliers.push(
            BalanceOutlier::new(
                "stability",
                "failed_games",
                results.errors.len() as f64,
                (0.0, 0.0),
                Severity::High,
            )
            .with_context(format!(
                "{} of {} matches were aborted by a rejected AI action",
                results.errors.len(),
                attempted
            )),
        );
    }

    if summary.games_played == 0 {
        return analysis;
    }

    let factions = [results.config.faction1, results.config.faction2];
    for (seat, faction) in factions.into_iter().enumerate() {
        let side = format!("player{}", seat + 1);
        let rate = summary.win_rate(seat);
        analysis.win_rates.push(SideWinRate {
            side: side.clone(),
            faction,
            win_rate: rate,
        });

        if let Some(outlier) = win_rate_outlier(&side, faction, rate) {
            analysis.outliers.push(outlier);
        }
    }

    let count = f64::from(summary.games_played);
    analysis.average_turns =
        results.games.iter().map(|g| f64::from(g.turns)).sum::<f64>() / count;
    analysis.turn_limit_rate = f64::from(summary.turn_limit_games) / count;

    if analysis.average_turns < MIN_AVERAGE_TURNS {
        analysis.outliers.push(
            BalanceOutlier::new(
                "pacing",
                "average_turns",
                analysis.average_turns,
                (MIN_AVERAGE_TURNS, f64::from(results.config.max_turns)),
                Severity::Medium,
            )
            .with_context("Matches end very quickly; burst damage may be too strong"),
        );
    }

    if analysis.turn_limit_rate > MAX_TURN_LIMIT_RATE {
        analysis.outliers.push(
            BalanceOutlier::new(
                "pacing",
                "turn_limit_rate",
                analysis.turn_limit_rate,
                (0.0, MAX_TURN_LIMIT_RATE),
                Severity::Low,
            )
            .with_context("Many matches stall into the turn cap; sustain may be too strong"),
        );
    }

    analysis
}

fn win_rate_outlier(side: &str, faction: FactionId, rate: f64) -> Option<BalanceOutlier> {
    let severity = if rate < WIN_RATE_HARD_BAND.0 || rate > WIN_RATE_HARD_BAND.1 {
        Severity::High
    } else if rate < WIN_RATE_BAND.0 || rate > WIN_RATE_BAND.1 {
        Severity::Medium
    } else {
        return None;
    };

    let direction = if rate < 0.5 { "under" } else { "over" };
    Some(
        BalanceOutlier::new("win_rate", side, rate, WIN_RATE_BAND, severity).with_context(format!(
            "{side} ({}) is {direction}performing",
            faction.display_name()
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_rate_bands() {
        assert!(win_rate_outlier("player1", FactionId::Phantom, 0.5).is_none());
        assert!(win_rate_outlier("player1", FactionId::Phantom, 0.55).is_none());

        let medium = win_rate_outlier("player1", FactionId::Phantom, 0.57).unwrap();
        assert_eq!(medium.severity, Severity::Medium);
        assert!(medium.context.contains("overperforming"));

        let high = win_rate_outlier("player2", FactionId::Sentinel, 0.35).unwrap();
        assert_eq!(high.severity, Severity::High);
        assert!(high.context.contains("underperforming"));
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_markdown_sections() {
        let analysis = BalanceAnalysis {
            win_rates: vec![SideWinRate {
                side: "player1".into(),
                faction: FactionId::Phantom,
                win_rate: 0.62,
            }],
            average_turns: 14.0,
            turn_limit_rate: 0.0,
            outliers: vec![win_rate_outlier("player1", FactionId::Phantom, 0.62).unwrap()],
            games_analyzed: 50,
        };

        let md = analysis.to_markdown();
        assert!(md.contains("| player1 | Phantom | 62.0% |"));
        assert!(md.contains("**[High]** win_rate/player1"));
        assert!(md.contains("*Analyzed 50 games*"));
        assert!(analysis.has_high_severity());
    }
}
