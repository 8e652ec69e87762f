use serde::Serialize;
use tera::{Context, Tera};

use crate::db::models::RankingEntry;

const LEADERBOARD_TEMPLATE: &str = "leaderboard.html";

/// One table row, with numbers already formatted for display.
#[derive(Serialize, Debug, PartialEq)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub school: String,
    pub name: String,
    pub record_time: String,
    pub deviation: String,
    pub date: String,
}

impl LeaderboardRow {
    pub fn new(rank: usize, entry: &RankingEntry) -> Self {
        Self {
            rank,
            school: entry.school.clone(),
            name: entry.name.clone(),
            record_time: format!("{:.3}", entry.record_time),
            deviation: format!("{:.3}", entry.deviation),
            date: display_date(&entry.created_at).to_string(),
        }
    }
}

/// Date portion of a stored timestamp (first 10 characters).
fn display_date(created_at: &str) -> &str {
    created_at.get(..10).unwrap_or(created_at)
}

#[derive(Serialize)]
struct LeaderboardPage<'a> {
    limit: u64,
    rows: &'a [LeaderboardRow],
}

/// Compiled once at startup and shared through `AppState`.
pub struct LeaderboardRenderer {
    tera: Tera,
}

impl LeaderboardRenderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        // .html suffix turns on autoescaping for player-supplied names
        tera.add_raw_template(
            LEADERBOARD_TEMPLATE,
            include_str!("../../templates/leaderboard.html.tera"),
        )?;
        Ok(Self { tera })
    }

    pub fn render(&self, entries: &[RankingEntry], limit: u64) -> Result<String, tera::Error> {
        let rows: Vec<LeaderboardRow> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| LeaderboardRow::new(i + 1, entry))
            .collect();
        let context = Context::from_serialize(LeaderboardPage { limit, rows: &rows })?;
        self.tera.render(LEADERBOARD_TEMPLATE, &context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, record_time: f64, deviation: f64) -> RankingEntry {
        RankingEntry {
            school: "A".to_string(),
            name: name.to_string(),
            record_time,
            deviation,
            created_at: "2026-10-19T08:15:30.123Z".to_string(),
        }
    }

    #[test]
    fn test_row_formatting() {
        let row = LeaderboardRow::new(1, &entry("X", 9.987, 0.013));
        assert_eq!(row.record_time, "9.987");
        assert_eq!(row.deviation, "0.013");
        assert_eq!(row.date, "2026-10-19");

        let row = LeaderboardRow::new(2, &entry("Y", 10.0, 0.0004));
        assert_eq!(row.record_time, "10.000");
        assert_eq!(row.deviation, "0.000");
    }

    #[test]
    fn test_display_date_short_input() {
        assert_eq!(display_date("2026-10"), "2026-10");
        assert_eq!(display_date(""), "");
    }

    #[test]
    fn test_render_numbers_rows_by_rank() {
        let renderer = LeaderboardRenderer::new().unwrap();
        let html = renderer
            .render(&[entry("X", 9.987, 0.013), entry("Y", 10.2, 0.2)], 20)
            .unwrap();

        assert!(html.contains("Top 20 Ranking"));
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains("<td>2</td>"));
        assert!(html.contains("<td>9.987</td>"));
        assert!(html.contains("<td>0.013</td>"));
        assert!(html.contains("<td>2026-10-19</td>"));
        assert!(!html.contains("08:15:30"));
        assert!(html.find("<td>X</td>").unwrap() < html.find("<td>Y</td>").unwrap());
    }

    #[test]
    fn test_render_empty_leaderboard() {
        let renderer = LeaderboardRenderer::new().unwrap();
        let html = renderer.render(&[], 20).unwrap();
        assert!(html.contains("No records yet."));
        assert!(!html.contains("<tbody>"));
    }

    #[test]
    fn test_render_escapes_names() {
        let renderer = LeaderboardRenderer::new().unwrap();
        let html = renderer.render(&[entry("<script>alert(1)</script>", 9.0, 1.0)], 20).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
