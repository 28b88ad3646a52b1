//! Property tests for the aggregation engine

use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use SchoolDesk::models::{AttendanceRecord, AttendanceStatus, CreateGradeRequest, Grade};
use SchoolDesk::services::aggregation::{attendance_stats, gpa, grade_distribution, grade_summary, Gpa};

fn attendance_status() -> impl Strategy<Value = AttendanceStatus> {
    prop_oneof![
        Just(AttendanceStatus::Present),
        Just(AttendanceStatus::Absent),
        Just(AttendanceStatus::Late),
    ]
}

fn records(statuses: &[AttendanceStatus]) -> Vec<AttendanceRecord> {
    statuses
        .iter()
        .enumerate()
        .map(|(i, &status)| AttendanceRecord {
            id: i as i64 + 1,
            student_id: 1,
            class_id: 1,
            date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            status,
            created_at: Utc.timestamp_opt(1_780_000_000 + i as i64, 0).unwrap(),
        })
        .collect()
}

fn grades(scores: &[u32], letters: &[&str]) -> Vec<Grade> {
    scores
        .iter()
        .enumerate()
        .map(|(i, &score)| Grade {
            id: i as i64 + 1,
            student_id: 1,
            subject: "Math".to_string(),
            term: "2026-T1".to_string(),
            score: f64::from(score),
            letter_grade: letters[i % letters.len()].to_string(),
            remarks: None,
            created_at: Utc.timestamp_opt(1_780_000_000 + i as i64, 0).unwrap(),
        })
        .collect()
}

fn grade_request(score: f64) -> CreateGradeRequest {
    CreateGradeRequest {
        student_id: 1,
        subject: "Math".to_string(),
        term: "2026-T1".to_string(),
        score,
        letter_grade: "B".to_string(),
        remarks: None,
    }
}

proptest! {
    #[test]
    fn attendance_counts_add_up(statuses in prop::collection::vec(attendance_status(), 0..200)) {
        let stats = attendance_stats(&records(&statuses));
        prop_assert_eq!(stats.present + stats.absent + stats.late, stats.total);
        prop_assert_eq!(stats.total, statuses.len());
        prop_assert!(stats.rate <= 100);
        prop_assert!(stats.absent_rate <= 100);
        prop_assert!(stats.late_rate <= 100);
        if stats.total == 0 {
            prop_assert_eq!(stats.rate, 0);
        }
    }

    #[test]
    fn average_lies_between_extremes(scores in prop::collection::vec(0u32..=100, 1..100)) {
        let summary = grade_summary(&grades(&scores, &["B"]));
        prop_assert!(summary.lowest <= f64::from(summary.average));
        prop_assert!(f64::from(summary.average) <= summary.highest);
        prop_assert!(summary.lowest <= summary.mean && summary.mean <= summary.highest);
        prop_assert_eq!(summary.count, scores.len());
    }

    #[test]
    fn fractional_scores_never_enter_a_summary(
        whole in 0u32..100,
        tenths in 1u32..10,
    ) {
        let score = f64::from(whole) + f64::from(tenths) / 10.0;
        prop_assert!(grade_request(score).validate().is_err());
    }

    #[test]
    fn validated_scores_keep_average_between_extremes(
        scores in prop::collection::vec(prop_oneof![0.0f64..=100.0, (0u32..=100).prop_map(f64::from)], 1..60),
    ) {
        let accepted: Vec<u32> = scores
            .iter()
            .filter(|&&score| grade_request(score).validate().is_ok())
            .map(|&score| score as u32)
            .collect();
        prop_assume!(!accepted.is_empty());
        let summary = grade_summary(&grades(&accepted, &["C"]));
        prop_assert!(summary.lowest <= f64::from(summary.average));
        prop_assert!(f64::from(summary.average) <= summary.highest);
    }

    #[test]
    fn gpa_is_available_iff_grades_exist(scores in prop::collection::vec(0u32..=100, 0..20)) {
        let result = gpa(&grades(&scores, &["A"]));
        prop_assert_eq!(result == Gpa::NotAvailable, scores.is_empty());
        if let Gpa::Value(value) = result {
            prop_assert!((0.0..=5.0).contains(&value));
        }
    }

    #[test]
    fn distribution_counts_every_grade(scores in prop::collection::vec(0u32..=100, 0..60)) {
        let distribution = grade_distribution(&grades(&scores, &["A", "B+", "C-", "D", "F", "Incomplete"]));
        let bucketed: usize = distribution.buckets.iter().map(|share| share.count).sum();
        prop_assert_eq!(bucketed + distribution.unbucketed, distribution.total);
        prop_assert_eq!(distribution.total, scores.len());
    }
}
