//! Dashboard statistics over already-fetched records
//!
//! All functions are pure and total: empty input yields zeroes or the
//! "N/A" sentinel, never an error.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::models::{AttendanceRecord, AttendanceStatus, Grade, Registration, RegistrationStatus};
use crate::utils::helpers::{percentage, round_half_up};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttendanceStats {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub total: usize,
    /// Percentage of records marked present
    pub rate: u32,
    pub absent_rate: u32,
    pub late_rate: u32,
}

/// Count attendance by status. The three percentages are rounded
/// independently and need not sum to 100.
pub fn attendance_stats<'a, I>(records: I) -> AttendanceStats
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let mut stats = AttendanceStats::default();
    for record in records {
        match record.status {
            AttendanceStatus::Present => stats.present += 1,
            AttendanceStatus::Absent => stats.absent += 1,
            AttendanceStatus::Late => stats.late += 1,
        }
        stats.total += 1;
    }
    stats.rate = percentage(stats.present, stats.total);
    stats.absent_rate = percentage(stats.absent, stats.total);
    stats.late_rate = percentage(stats.late, stats.total);
    stats
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GradeSummary {
    /// Mean score rounded to a whole number
    pub average: u32,
    /// Unrounded mean
    pub mean: f64,
    pub highest: f64,
    pub lowest: f64,
    pub count: usize,
}

pub fn grade_summary(grades: &[Grade]) -> GradeSummary {
    if grades.is_empty() {
        return GradeSummary::default();
    }

    let mut sum = 0.0;
    let mut highest = f64::MIN;
    let mut lowest = f64::MAX;
    for grade in grades {
        sum += grade.score;
        highest = highest.max(grade.score);
        lowest = lowest.min(grade.score);
    }
    let mean = sum / grades.len() as f64;

    GradeSummary {
        average: round_half_up(mean).max(0.0) as u32,
        mean,
        highest,
        lowest,
        count: grades.len(),
    }
}

/// Grade-point average on a 0–5 scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gpa {
    Value(f64),
    NotAvailable,
}

impl Gpa {
    pub fn value(&self) -> Option<f64> {
        match self {
            Gpa::Value(v) => Some(*v),
            Gpa::NotAvailable => None,
        }
    }
}

impl std::fmt::Display for Gpa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gpa::Value(v) => write!(f, "{:.2}", v),
            Gpa::NotAvailable => f.write_str("N/A"),
        }
    }
}

impl Serialize for Gpa {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Mean score divided by 20, mapping 0–100 onto 0–5
pub fn gpa(grades: &[Grade]) -> Gpa {
    if grades.is_empty() {
        Gpa::NotAvailable
    } else {
        Gpa::Value(grade_summary(grades).mean / 20.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
    /// No historical baseline to compare against
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectSummary {
    pub subject: String,
    pub average: u32,
    pub mean: f64,
    pub count: usize,
    pub last_grade: String,
    pub trend: Trend,
}

/// One entry per distinct subject, in order of first appearance.
///
/// `baseline` maps a subject to a historical mean score. Subjects without a
/// baseline get [`Trend::Unknown`]; otherwise the mean must move by more than
/// `threshold` points to count as up or down.
pub fn subject_summaries(
    grades: &[Grade],
    baseline: &HashMap<String, f64>,
    threshold: f64,
) -> Vec<SubjectSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_subject: HashMap<&str, Vec<&Grade>> = HashMap::new();
    for grade in grades {
        let entry = by_subject.entry(grade.subject.as_str()).or_default();
        if entry.is_empty() {
            order.push(grade.subject.as_str());
        }
        entry.push(grade);
    }

    order
        .into_iter()
        .filter_map(|subject| {
            let group = by_subject.get(subject)?;
            let sum: f64 = group.iter().map(|g| g.score).sum();
            let mean = sum / group.len() as f64;
            // Latest timestamp wins; equal timestamps fall back to the higher id.
            let last = group.iter().max_by_key(|g| (g.created_at, g.id))?;
            let trend = match baseline.get(subject) {
                Some(previous) => trend_between(*previous, mean, threshold),
                None => Trend::Unknown,
            };

            Some(SubjectSummary {
                subject: subject.to_string(),
                average: round_half_up(mean).max(0.0) as u32,
                mean,
                count: group.len(),
                last_grade: last.letter_grade.clone(),
                trend,
            })
        })
        .collect()
}

/// Per-subject mean scores, usable as the baseline for a later period
pub fn subject_means(grades: &[Grade]) -> HashMap<String, f64> {
    subject_summaries(grades, &HashMap::new(), 0.0)
        .into_iter()
        .map(|s| (s.subject, s.mean))
        .collect()
}

fn trend_between(previous: f64, current: f64, threshold: f64) -> Trend {
    let delta = current - previous;
    if delta > threshold {
        Trend::Up
    } else if delta < -threshold {
        Trend::Down
    } else {
        Trend::Stable
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterBucket {
    A,
    B,
    C,
    D,
    F,
}

impl LetterBucket {
    pub const ALL: [LetterBucket; 5] = [
        LetterBucket::A,
        LetterBucket::B,
        LetterBucket::C,
        LetterBucket::D,
        LetterBucket::F,
    ];

    /// Bucket by leading letter, ignoring +/- modifiers
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter.trim().chars().next()?.to_ascii_uppercase() {
            'A' => Some(LetterBucket::A),
            'B' => Some(LetterBucket::B),
            'C' => Some(LetterBucket::C),
            'D' => Some(LetterBucket::D),
            'F' => Some(LetterBucket::F),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketShare {
    pub bucket: LetterBucket,
    pub count: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeDistribution {
    pub buckets: Vec<BucketShare>,
    /// Records whose letter grade fits no bucket
    pub unbucketed: usize,
    pub total: usize,
}

impl GradeDistribution {
    pub fn count(&self, bucket: LetterBucket) -> usize {
        self.buckets.iter().find(|b| b.bucket == bucket).map_or(0, |b| b.count)
    }

    pub fn percentage(&self, bucket: LetterBucket) -> u32 {
        self.buckets.iter().find(|b| b.bucket == bucket).map_or(0, |b| b.percentage)
    }
}

pub fn grade_distribution(grades: &[Grade]) -> GradeDistribution {
    let mut counts: HashMap<LetterBucket, usize> = HashMap::new();
    let mut unbucketed = 0;
    for grade in grades {
        match LetterBucket::from_letter(&grade.letter_grade) {
            Some(bucket) => *counts.entry(bucket).or_default() += 1,
            None => unbucketed += 1,
        }
    }

    let total = grades.len();
    let buckets = LetterBucket::ALL
        .iter()
        .map(|&bucket| {
            let count = counts.get(&bucket).copied().unwrap_or(0);
            BucketShare { bucket, count, percentage: percentage(count, total) }
        })
        .collect();

    GradeDistribution { buckets, unbucketed, total }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistrationCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub attended: usize,
    pub total: usize,
}

impl RegistrationCounts {
    /// Seats held: everything except rejections
    pub fn active(&self) -> usize {
        self.pending + self.approved + self.attended
    }
}

pub fn registration_counts<'a, I>(registrations: I) -> RegistrationCounts
where
    I: IntoIterator<Item = &'a Registration>,
{
    let mut counts = RegistrationCounts::default();
    for registration in registrations {
        match registration.status {
            RegistrationStatus::Pending => counts.pending += 1,
            RegistrationStatus::Approved => counts.approved += 1,
            RegistrationStatus::Rejected => counts.rejected += 1,
            RegistrationStatus::Attended => counts.attended += 1,
        }
        counts.total += 1;
    }
    counts
}

/// The first `n` records in the order supplied
pub fn recent<T>(records: &[T], n: usize) -> &[T] {
    &records[..records.len().min(n)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn attendance(statuses: &[AttendanceStatus]) -> Vec<AttendanceRecord> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, &status)| AttendanceRecord {
                id: i as i64 + 1,
                student_id: 1,
                class_id: 1,
                date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                status,
                created_at: Utc::now(),
            })
            .collect()
    }

    fn grade(subject: &str, score: f64, letter: &str, minutes: i64) -> Grade {
        Grade {
            id: minutes,
            student_id: 1,
            subject: subject.to_string(),
            term: "Fall".to_string(),
            score,
            letter_grade: letter.to_string(),
            remarks: None,
            created_at: Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap() + Duration::minutes(minutes),
        }
    }

    #[test]
    fn test_attendance_stats_scenario() {
        use AttendanceStatus::*;
        let stats = attendance_stats(&attendance(&[Present, Present, Absent, Late]));
        assert_eq!(stats.present, 2);
        assert_eq!(stats.absent, 1);
        assert_eq!(stats.late, 1);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.rate, 50);
        assert_eq!(stats.absent_rate, 25);
        assert_eq!(stats.late_rate, 25);
    }

    #[test]
    fn test_attendance_rates_round_independently() {
        use AttendanceStatus::*;
        let stats = attendance_stats(&attendance(&[Present, Absent, Late]));
        assert_eq!((stats.rate, stats.absent_rate, stats.late_rate), (33, 33, 33));
    }

    #[test]
    fn test_attendance_stats_empty() {
        assert_eq!(attendance_stats(&Vec::<AttendanceRecord>::new()), AttendanceStats::default());
    }

    #[test]
    fn test_grade_summary_scenario() {
        let grades = vec![
            grade("Math", 85.0, "B", 1),
            grade("Math", 92.0, "A", 2),
            grade("Math", 78.0, "C", 3),
        ];
        let summary = grade_summary(&grades);
        assert_eq!(summary.average, 85);
        assert_eq!(summary.highest, 92.0);
        assert_eq!(summary.lowest, 78.0);
        assert_eq!(gpa(&grades).to_string(), "4.25");
    }

    #[test]
    fn test_empty_grades() {
        let summary = grade_summary(&[]);
        assert_eq!(summary.average, 0);
        assert_eq!(summary.count, 0);
        assert_eq!(gpa(&[]), Gpa::NotAvailable);
        assert_eq!(gpa(&[]).to_string(), "N/A");
        assert_eq!(serde_json::to_string(&gpa(&[])).unwrap(), "\"N/A\"");
    }

    #[test]
    fn test_subject_summaries_without_baseline() {
        let grades = vec![
            grade("Science", 70.0, "C", 1),
            grade("Math", 90.0, "A-", 2),
            grade("Science", 81.0, "B", 3),
        ];
        let summaries = subject_summaries(&grades, &HashMap::new(), 2.0);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].subject, "Science");
        assert_eq!(summaries[0].average, 76);
        assert_eq!(summaries[0].last_grade, "B");
        assert_eq!(summaries[0].trend, Trend::Unknown);
        assert_eq!(summaries[1].subject, "Math");
        assert_eq!(summaries[1].count, 1);
    }

    #[test]
    fn test_subject_trend_against_baseline() {
        let grades = vec![grade("Math", 90.0, "A", 1), grade("Art", 70.0, "C", 2), grade("Music", 80.0, "B", 3)];
        let baseline: HashMap<String, f64> = [
            ("Math".to_string(), 80.0),
            ("Art".to_string(), 75.0),
            ("Music".to_string(), 79.0),
        ]
        .into_iter()
        .collect();
        let trends: Vec<Trend> = subject_summaries(&grades, &baseline, 2.0)
            .into_iter()
            .map(|s| s.trend)
            .collect();
        assert_eq!(trends, vec![Trend::Up, Trend::Down, Trend::Stable]);
    }

    #[test]
    fn test_subject_means() {
        let grades = vec![grade("Math", 80.0, "B", 1), grade("Math", 90.0, "A", 2)];
        assert_eq!(subject_means(&grades).get("Math"), Some(&85.0));
    }

    #[test]
    fn test_grade_distribution() {
        let grades = vec![
            grade("Math", 95.0, "A+", 1),
            grade("Math", 91.0, "a", 2),
            grade("Math", 84.0, "B-", 3),
            grade("Math", 50.0, "F", 4),
            grade("Math", 0.0, "Incomplete", 5),
        ];
        let distribution = grade_distribution(&grades);
        assert_eq!(distribution.total, 5);
        assert_eq!(distribution.count(LetterBucket::A), 2);
        assert_eq!(distribution.percentage(LetterBucket::A), 40);
        assert_eq!(distribution.count(LetterBucket::C), 0);
        assert_eq!(distribution.percentage(LetterBucket::C), 0);
        assert_eq!(distribution.unbucketed, 1);
        assert_eq!(grade_distribution(&[]).percentage(LetterBucket::A), 0);
    }

    #[test]
    fn test_registration_counts() {
        let make = |status| Registration { id: 1, event_id: 1, user_id: 1, status, created_at: Utc::now() };
        let registrations = vec![
            make(RegistrationStatus::Pending),
            make(RegistrationStatus::Approved),
            make(RegistrationStatus::Rejected),
            make(RegistrationStatus::Attended),
            make(RegistrationStatus::Approved),
        ];
        let counts = registration_counts(&registrations);
        assert_eq!(counts.approved, 2);
        assert_eq!(counts.total, 5);
        assert_eq!(counts.active(), 4);
    }

    #[test]
    fn test_recent_takes_supplied_order() {
        let values = [5, 3, 9, 1];
        assert_eq!(recent(&values, 2), &[5, 3]);
        assert_eq!(recent(&values, 10), &values);
        assert!(recent::<i32>(&[], 3).is_empty());
    }
}
