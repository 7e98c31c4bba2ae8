//! Dashboard projection: many focus/life entries per day → one row per day.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::date_window::DateWindow;
use crate::models::activity::{ActivityData, ActivityLog};

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DayRow {
    pub date: NaiveDate,
    pub score: Option<i32>,
    pub sleep_hours: Option<f64>,
    pub screen_time: Option<i32>,
    pub mood: Option<i32>,
}

impl DayRow {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            ..Default::default()
        }
    }

    fn apply(&mut self, data: &ActivityData) {
        match data {
            ActivityData::Focus(focus) => {
                if focus.score.is_some() {
                    self.score = focus.score;
                }
            }
            ActivityData::Life(life) => {
                if life.sleep_hours.is_some() {
                    self.sleep_hours = life.sleep_hours;
                }
                if life.screen_time.is_some() {
                    self.screen_time = life.screen_time;
                }
                if life.mood.is_some() {
                    self.mood = life.mood;
                }
            }
        }
    }
}

/// One row for every day in `window`, ascending, empty days included.
///
/// Entries are applied oldest first, so for each field the most recent
/// submission that carries it wins. Input order does not matter.
pub fn project(records: &[ActivityLog], window: DateWindow) -> Vec<DayRow> {
    let mut rows: BTreeMap<NaiveDate, DayRow> =
        window.days().map(|d| (d, DayRow::empty(d))).collect();

    let mut ordered: Vec<&ActivityLog> = records.iter().collect();
    ordered.sort_by_key(|r| r.created_at);

    for record in ordered {
        if let Some(row) = rows.get_mut(&record.day()) {
            row.apply(&record.data);
        }
    }

    rows.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::{FocusData, LifeData};
    use chrono::{DateTime, Duration, Utc};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(day: NaiveDate, hour: u32) -> DateTime<Utc> {
        day.and_hms_opt(hour, 0, 0).unwrap().and_utc()
    }

    fn focus(day: NaiveDate, hour: u32, score: i32) -> ActivityLog {
        ActivityLog {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            created_at: at(day, hour),
            data: ActivityData::Focus(FocusData {
                task_content: "work".into(),
                duration_minutes: 25,
                score: Some(score),
                ai_feedback: None,
            }),
        }
    }

    fn life(day: NaiveDate, hour: u32, data: LifeData) -> ActivityLog {
        ActivityLog {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            created_at: at(day, hour),
            data: ActivityData::Life(data),
        }
    }

    fn week() -> DateWindow {
        DateWindow::new(date(2024, 1, 8), date(2024, 1, 14)).unwrap()
    }

    #[test]
    fn test_every_day_present_even_without_records() {
        let start = date(2024, 1, 8);
        let records = vec![
            focus(start + Duration::days(1), 9, 70),
            focus(start + Duration::days(4), 9, 85),
        ];

        let rows = project(&records, week());
        assert_eq!(rows.len(), 7);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.date, start + Duration::days(i as i64));
            if i == 1 || i == 4 {
                assert!(row.score.is_some());
            } else {
                assert_eq!(*row, DayRow::empty(row.date));
            }
        }
        assert_eq!(rows[1].score, Some(70));
        assert_eq!(rows[4].score, Some(85));
    }

    #[test]
    fn test_focus_and_life_share_a_row() {
        let day = date(2024, 1, 10);
        let records = vec![
            focus(day, 9, 80),
            life(
                day,
                21,
                LifeData {
                    sleep_hours: Some(6.5),
                    ..Default::default()
                },
            ),
        ];

        let rows = project(&records, week());
        let row = rows.iter().find(|r| r.date == day).unwrap();
        assert_eq!(row.score, Some(80));
        assert_eq!(row.sleep_hours, Some(6.5));
    }

    #[test]
    fn test_latest_focus_wins_regardless_of_input_order() {
        let day = date(2024, 1, 10);
        let records = vec![focus(day, 18, 90), focus(day, 8, 40)];

        let rows = project(&records, week());
        assert_eq!(rows[2].score, Some(90));
    }

    #[test]
    fn test_life_fields_merge_independently() {
        let day = date(2024, 1, 12);
        let records = vec![
            life(
                day,
                7,
                LifeData {
                    sleep_hours: Some(7.0),
                    mood: Some(2),
                    ..Default::default()
                },
            ),
            life(
                day,
                20,
                LifeData {
                    mood: Some(4),
                    screen_time: Some(180),
                    ..Default::default()
                },
            ),
        ];

        let rows = project(&records, week());
        let row = rows.iter().find(|r| r.date == day).unwrap();
        assert_eq!(row.sleep_hours, Some(7.0)); // not cleared by the later entry
        assert_eq!(row.mood, Some(4)); // overlapping field: latest wins
        assert_eq!(row.screen_time, Some(180));
    }

    #[test]
    fn test_records_outside_window_ignored() {
        let records = vec![focus(date(2024, 1, 7), 12, 50), focus(date(2024, 1, 15), 0, 60)];
        let rows = project(&records, week());
        assert!(rows.iter().all(|r| r.score.is_none()));
    }

    #[test]
    fn test_row_serializes_nulls() {
        let json = serde_json::to_value(DayRow::empty(date(2024, 1, 8))).unwrap();
        assert_eq!(json["date"], "2024-01-08");
        assert!(json["score"].is_null());
        assert!(json["sleep_hours"].is_null());
        assert!(json["screen_time"].is_null());
        assert!(json["mood"].is_null());
    }
}
