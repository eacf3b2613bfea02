//! Aggregate score statistics for teacher dashboards and exam summaries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::grade::ResultRecord;
use crate::model::Exam;

/// One student's recorded score for one exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRow {
    /// Student name, or "Anonymous" when none was recorded.
    pub student_name: String,
    /// The exam's id.
    pub exam_id: String,
    /// The exam's title.
    pub exam_title: String,
    /// Correct answers.
    pub score: u32,
    /// Questions presented.
    pub total: u32,
    /// Score as a percentage, one decimal place.
    pub percentage: f64,
    /// When the submission arrived.
    pub submitted_at: DateTime<Utc>,
}

/// All recorded scores for one exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamScores {
    /// The exam's id.
    pub exam_id: String,
    /// The exam's title.
    pub exam_title: String,
    /// Score rows, most recent first.
    pub rows: Vec<ScoreRow>,
    /// Mean percentage across the rows, one decimal place.
    pub avg_percentage: f64,
}

/// A teacher's full scoreboard: per-exam groups plus overall figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scoreboard {
    /// Per-exam score groups, ordered by exam id.
    pub exams: Vec<ExamScores>,
    /// Total number of recorded submissions.
    pub total_submissions: usize,
    /// Mean raw score across every submission, one decimal place.
    pub overall_avg_score: f64,
}

/// Summary statistics for a single exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamStatsSummary {
    /// The exam's id.
    pub exam_id: String,
    /// Number of recorded submissions.
    pub attempts: usize,
    /// Mean raw score, one decimal place.
    pub mean_score: f64,
    /// Mean percentage, one decimal place.
    pub mean_percentage: f64,
    /// Highest recorded score.
    pub best: u32,
    /// Lowest recorded score.
    pub worst: u32,
}

/// Score as a percentage of total, rounded to one decimal place.
/// Zero-question results score 0.0 rather than dividing by zero.
pub fn percentage(score: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(f64::from(score) / f64::from(total) * 100.0)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Build score rows for one exam's recorded results.
pub fn score_rows(exam: &Exam, results: &[ResultRecord]) -> Vec<ScoreRow> {
    results
        .iter()
        .map(|r| ScoreRow {
            student_name: r
                .student_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Anonymous".to_string()),
            exam_id: exam.id.clone(),
            exam_title: exam.title.clone(),
            score: r.score,
            total: r.total,
            percentage: percentage(r.score, r.total),
            submitted_at: r.submitted_at,
        })
        .collect()
}

/// Group score rows per exam and compute the overall figures.
pub fn compute_scoreboard(rows: Vec<ScoreRow>) -> Scoreboard {
    let total_submissions = rows.len();
    let overall_avg_score = if rows.is_empty() {
        0.0
    } else {
        round1(rows.iter().map(|r| f64::from(r.score)).sum::<f64>() / rows.len() as f64)
    };

    let mut grouped: BTreeMap<String, Vec<ScoreRow>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.exam_id.clone()).or_default().push(row);
    }

    let exams = grouped
        .into_values()
        .map(|rows| {
            let avg_percentage =
                round1(rows.iter().map(|r| r.percentage).sum::<f64>() / rows.len() as f64);
            ExamScores {
                exam_id: rows[0].exam_id.clone(),
                exam_title: rows[0].exam_title.clone(),
                rows,
                avg_percentage,
            }
        })
        .collect();

    Scoreboard {
        exams,
        total_submissions,
        overall_avg_score,
    }
}

/// Summary statistics for one exam's recorded results.
pub fn compute_exam_stats(exam_id: &str, results: &[ResultRecord]) -> ExamStatsSummary {
    if results.is_empty() {
        return ExamStatsSummary {
            exam_id: exam_id.to_string(),
            attempts: 0,
            mean_score: 0.0,
            mean_percentage: 0.0,
            best: 0,
            worst: 0,
        };
    }

    let n = results.len() as f64;
    let mean_score = round1(results.iter().map(|r| f64::from(r.score)).sum::<f64>() / n);
    let mean_percentage = round1(
        results
            .iter()
            .map(|r| percentage(r.score, r.total))
            .sum::<f64>()
            / n,
    );
    let best = results.iter().map(|r| r.score).max().unwrap_or(0);
    let worst = results.iter().map(|r| r.score).min().unwrap_or(0);

    ExamStatsSummary {
        exam_id: exam_id.to_string(),
        attempts: results.len(),
        mean_score,
        mean_percentage,
        best,
        worst,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExamStatus;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn exam(id: &str, title: &str) -> Exam {
        Exam {
            id: id.into(),
            title: title.into(),
            duration_minutes: 30,
            status: ExamStatus::Open,
            teacher_id: None,
            tag: None,
        }
    }

    fn result(exam_id: &str, name: Option<&str>, score: u32, total: u32) -> ResultRecord {
        ResultRecord {
            id: "r1".into(),
            token: "tok".into(),
            exam_id: exam_id.into(),
            student_name: name.map(String::from),
            score,
            total,
            submitted_at: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
            answers: HashMap::new(),
            details: vec![],
        }
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(3, 3), 100.0);
        assert_eq!(percentage(0, 0), 0.0);
    }

    #[test]
    fn score_rows_fill_anonymous_names() {
        let e = exam("e1", "Midterm");
        let rows = score_rows(
            &e,
            &[
                result("e1", Some("Ada"), 4, 5),
                result("e1", None, 2, 5),
                result("e1", Some("   "), 1, 5),
            ],
        );
        assert_eq!(rows[0].student_name, "Ada");
        assert_eq!(rows[1].student_name, "Anonymous");
        assert_eq!(rows[2].student_name, "Anonymous");
        assert_eq!(rows[0].percentage, 80.0);
    }

    #[test]
    fn scoreboard_groups_per_exam_in_id_order() {
        let e1 = exam("aaa", "First");
        let e2 = exam("zzz", "Second");
        let mut rows = score_rows(&e2, &[result("zzz", Some("Bob"), 1, 2)]);
        rows.extend(score_rows(
            &e1,
            &[
                result("aaa", Some("Ada"), 2, 2),
                result("aaa", Some("Cy"), 0, 2),
            ],
        ));

        let board = compute_scoreboard(rows);
        assert_eq!(board.total_submissions, 3);
        assert_eq!(board.exams.len(), 2);
        assert_eq!(board.exams[0].exam_id, "aaa");
        assert_eq!(board.exams[0].avg_percentage, 50.0);
        assert_eq!(board.exams[1].exam_id, "zzz");
        // Mean raw score of 1, 2, 0.
        assert_eq!(board.overall_avg_score, 1.0);
    }

    #[test]
    fn empty_scoreboard() {
        let board = compute_scoreboard(vec![]);
        assert!(board.exams.is_empty());
        assert_eq!(board.total_submissions, 0);
        assert_eq!(board.overall_avg_score, 0.0);
    }

    #[test]
    fn exam_stats_summary() {
        let results = [
            result("e1", Some("Ada"), 5, 5),
            result("e1", Some("Bob"), 3, 5),
            result("e1", Some("Cy"), 1, 5),
        ];
        let stats = compute_exam_stats("e1", &results);
        assert_eq!(stats.attempts, 3);
        assert_eq!(stats.mean_score, 3.0);
        assert_eq!(stats.mean_percentage, 60.0);
        assert_eq!(stats.best, 5);
        assert_eq!(stats.worst, 1);
    }

    #[test]
    fn exam_stats_with_no_results() {
        let stats = compute_exam_stats("e1", &[]);
        assert_eq!(stats.attempts, 0);
        assert_eq!(stats.mean_score, 0.0);
    }
}
