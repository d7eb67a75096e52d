use chrono::{DateTime, Datelike, Utc, Weekday};

use jobtrack_core::types::ReminderFrequency;

const DAILY_HOURS: i64 = 24;
const TWICE_WEEKLY_HOURS: i64 = 84;
const WEEKLY_HOURS: i64 = 168;
const MONTHLY_HOURS: i64 = 720;
/// Custom schedules send at most once per chosen day. 20 h instead of 24
/// leaves slack for sweep jitter without allowing two sends on one day.
const CUSTOM_HOURS: i64 = 20;

/// Decide whether a reminder is due at `now`.
///
/// A user who has never been sent one counts as last sent at the epoch, so
/// every window is open. `custom` additionally requires that `now` falls on
/// one of the chosen weekdays; an empty day list is never due.
pub fn reminder_due(
    frequency: ReminderFrequency,
    custom_dates: &[Weekday],
    last_sent: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    let last = last_sent.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let elapsed = now.signed_duration_since(last);
    match frequency {
        ReminderFrequency::Daily => elapsed.num_hours() >= DAILY_HOURS,
        ReminderFrequency::TwiceWeekly => elapsed.num_hours() >= TWICE_WEEKLY_HOURS,
        ReminderFrequency::Weekly => elapsed.num_hours() >= WEEKLY_HOURS,
        ReminderFrequency::Monthly => elapsed.num_hours() >= MONTHLY_HOURS,
        ReminderFrequency::Custom => {
            custom_dates.contains(&now.weekday()) && elapsed.num_hours() >= CUSTOM_HOURS
        }
        ReminderFrequency::None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn monday_noon() -> DateTime<Utc> {
        // 2024-01-01 was a Monday.
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn never_sent_opens_every_fixed_window() {
        let now = monday_noon();
        for f in [
            ReminderFrequency::Daily,
            ReminderFrequency::TwiceWeekly,
            ReminderFrequency::Weekly,
            ReminderFrequency::Monthly,
        ] {
            assert!(reminder_due(f, &[], None, now), "{f} should be due");
        }
    }

    #[test]
    fn none_is_never_due() {
        assert!(!reminder_due(ReminderFrequency::None, &[], None, monday_noon()));
    }

    #[test]
    fn daily_waits_a_full_day() {
        let now = monday_noon();
        let recent = Some(now - Duration::hours(23));
        let boundary = Some(now - Duration::hours(24));
        let old = Some(now - Duration::hours(25));
        assert!(!reminder_due(ReminderFrequency::Daily, &[], recent, now));
        assert!(reminder_due(ReminderFrequency::Daily, &[], boundary, now));
        assert!(reminder_due(ReminderFrequency::Daily, &[], old, now));
    }

    #[test]
    fn twice_weekly_window_is_84_hours() {
        let now = monday_noon();
        let recent = Some(now - Duration::hours(83));
        let old = Some(now - Duration::hours(84));
        assert!(!reminder_due(ReminderFrequency::TwiceWeekly, &[], recent, now));
        assert!(reminder_due(ReminderFrequency::TwiceWeekly, &[], old, now));
    }

    #[test]
    fn weekly_window_is_168_hours() {
        let now = monday_noon();
        let recent = Some(now - Duration::hours(167));
        let old = Some(now - Duration::hours(168));
        assert!(!reminder_due(ReminderFrequency::Weekly, &[], recent, now));
        assert!(reminder_due(ReminderFrequency::Weekly, &[], old, now));
    }

    #[test]
    fn monthly_window_is_720_hours() {
        let now = monday_noon();
        let recent = Some(now - Duration::hours(719));
        let old = Some(now - Duration::hours(720));
        assert!(!reminder_due(ReminderFrequency::Monthly, &[], recent, now));
        assert!(reminder_due(ReminderFrequency::Monthly, &[], old, now));
    }

    #[test]
    fn custom_requires_matching_weekday() {
        let now = monday_noon();
        assert!(reminder_due(ReminderFrequency::Custom, &[Weekday::Mon], None, now));
        assert!(!reminder_due(ReminderFrequency::Custom, &[Weekday::Tue], None, now));

        // Elapsed time alone is not enough on the wrong day.
        let tuesday = now + Duration::days(1);
        let two_days_ago = Some(tuesday - Duration::hours(48));
        assert!(!reminder_due(
            ReminderFrequency::Custom,
            &[Weekday::Mon],
            two_days_ago,
            tuesday
        ));
    }

    #[test]
    fn custom_sends_once_per_chosen_day() {
        let now = monday_noon();
        let this_morning = Some(now - Duration::hours(3));
        let yesterday = Some(now - Duration::hours(21));
        assert!(!reminder_due(ReminderFrequency::Custom, &[Weekday::Mon], this_morning, now));
        assert!(reminder_due(ReminderFrequency::Custom, &[Weekday::Mon], yesterday, now));
    }

    #[test]
    fn custom_with_no_days_is_never_due() {
        assert!(!reminder_due(ReminderFrequency::Custom, &[], None, monday_noon()));
    }
}
