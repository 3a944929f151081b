//! End-to-end recurrence scenarios over real calendar data.
//!
//! The fixtures lean on 2012: a leap year whose America/New_York clocks
//! spring forward on March 11 and fall back on November 4.

use cadence_core::{Interval, TimePoint};
use cadence_recur::{Domain, Recurring, RecurError, Stage};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

fn date(y: i32, mo: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, mo, d).expect("valid date")
}

fn datetime(y: i32, mo: u32, d: u32, h: u32, mi: u32, sec: u32) -> NaiveDateTime {
    date(y, mo, d).and_hms_opt(h, mi, sec).expect("valid time")
}

fn year_2012() -> anyhow::Result<Interval> {
    Ok(Interval::dates(date(2012, 1, 1), date(2013, 1, 1))?)
}

fn produce_all(stage: &Stage) -> anyhow::Result<Vec<Interval>> {
    Ok(stage.produce()?.collect())
}

/// Local date, local hour, and UTC offset in hours of a fixed point.
fn fixed_parts(point: TimePoint) -> (NaiveDate, u32, i32) {
    match point {
        TimePoint::Fixed(dt) => (
            dt.date_naive(),
            dt.naive_local().hour(),
            dt.offset().local_minus_utc() / 3600,
        ),
        TimePoint::Day(_) | TimePoint::Floating(_) => panic!("expected a fixed point"),
    }
}

#[test_log::test]
fn second_thursdays_at_two_pm_across_the_year() {
    let chain = year_2012()
        .expect("valid base")
        .each_months(1)
        .expect("valid chain")
        .weekday(Weekday::Thu, 2)
        .expect("valid chain")
        .at_time_in("2:00pm", 3600, chrono_tz::America::New_York)
        .expect("valid chain");
    let occurrences = produce_all(&chain).expect("produces");

    let expected = [
        (1, 19, -5),
        (2, 16, -5),
        (3, 15, -4),
        (4, 19, -4),
        (5, 17, -4),
        (6, 21, -4),
        (7, 19, -4),
        (8, 16, -4),
        (9, 20, -4),
        (10, 18, -4),
        (11, 15, -5),
        (12, 20, -5),
    ];
    assert_eq!(occurrences.len(), expected.len());
    for (occurrence, &(mo, d, offset_hours)) in occurrences.iter().zip(expected.iter()) {
        let (day, hour, offset) = fixed_parts(occurrence.start());
        assert_eq!(day, date(2012, mo, d));
        assert_eq!(hour, 14);
        assert_eq!(offset, offset_hours);
        let (end_day, end_hour, _) = fixed_parts(occurrence.end());
        assert_eq!(end_day, day);
        assert_eq!(end_hour, 15);
        assert!(!occurrence.end_inclusive());
    }
}

#[test_log::test]
fn local_hour_holds_across_the_spring_forward() {
    let base = Interval::dates(date(2012, 3, 10), date(2012, 3, 13)).expect("valid base");
    let chain = base
        .each_days(1)
        .expect("valid chain")
        .at_time_in("2:00pm", 3600, chrono_tz::America::New_York)
        .expect("valid chain");
    let occurrences = produce_all(&chain).expect("produces");

    assert_eq!(occurrences.len(), 3);
    let offsets: Vec<_> = occurrences
        .iter()
        .map(|occurrence| {
            let (_, hour, offset) = fixed_parts(occurrence.start());
            assert_eq!(hour, 14);
            offset
        })
        .collect();
    assert_eq!(offsets, vec![-5, -4, -4]);
}

#[test_log::test]
fn an_explicit_offset_rides_along_on_every_day() {
    let base = Interval::dates(date(2012, 1, 1), date(2012, 1, 4)).expect("valid base");
    let chain = base
        .each_days(1)
        .expect("valid chain")
        .at_time("14:00 +09:00", 3600)
        .expect("valid chain");
    let occurrences = produce_all(&chain).expect("produces");

    assert_eq!(occurrences.len(), 3);
    for occurrence in &occurrences {
        let (_, hour, offset) = fixed_parts(occurrence.start());
        assert_eq!(hour, 14);
        assert_eq!(offset, 9);
    }
}

#[test_log::test]
fn weekdays_over_two_full_weeks_yield_ten() {
    let base = Interval::dates(date(2012, 1, 2), date(2012, 1, 16)).expect("valid base");
    let chain = base.each_weekdays().expect("valid chain");
    let occurrences = produce_all(&chain).expect("produces");

    assert_eq!(occurrences.len(), 10);
    assert!(
        occurrences
            .iter()
            .all(|i| !matches!(i.start().date().weekday(), Weekday::Sat | Weekday::Sun))
    );
}

#[test_log::test]
fn a_daily_window_stays_inside_its_day() {
    let base = Interval::dates(date(2012, 2, 13), date(2012, 2, 15)).expect("valid base");
    let chain = base
        .between_times("16:45", "19:35")
        .expect("valid chain");
    let occurrences = produce_all(&chain).expect("produces");

    assert_eq!(occurrences.len(), 2);
    assert_eq!(
        occurrences[0].start(),
        TimePoint::Floating(datetime(2012, 2, 13, 16, 45, 0))
    );
    assert_eq!(
        occurrences[0].end(),
        TimePoint::Floating(datetime(2012, 2, 13, 19, 35, 0))
    );
}

#[test_log::test]
fn a_wrapping_window_runs_into_the_next_day() {
    let base = Interval::dates(date(2012, 2, 13), date(2012, 2, 15)).expect("valid base");
    let chain = base
        .between_times("23:30", "02:17")
        .expect("valid chain");
    let occurrences = produce_all(&chain).expect("produces");

    assert_eq!(occurrences.len(), 2);
    assert_eq!(
        occurrences[0].start(),
        TimePoint::Floating(datetime(2012, 2, 13, 23, 30, 0))
    );
    assert_eq!(
        occurrences[0].end(),
        TimePoint::Floating(datetime(2012, 2, 14, 2, 17, 0))
    );
    assert_eq!(
        occurrences[1].end(),
        TimePoint::Floating(datetime(2012, 2, 15, 2, 17, 0))
    );
}

#[test_log::test]
fn a_second_grid_stops_at_the_exclusive_end() {
    let base = Interval::dates(date(2012, 2, 13), date(2012, 2, 18)).expect("valid base");
    let chain = base.each_seconds(1).expect("valid chain");
    let mut sequence = chain.produce().expect("produces");

    let first = sequence.next().expect("nonempty");
    assert_eq!(
        first,
        Interval::floating(datetime(2012, 2, 13, 0, 0, 0), datetime(2012, 2, 13, 0, 0, 1))
            .expect("valid interval")
    );
    let last = sequence.last().expect("nonempty");
    assert_eq!(
        last,
        Interval::floating(
            datetime(2012, 2, 17, 23, 59, 59),
            datetime(2012, 2, 18, 0, 0, 0),
        )
        .expect("valid interval")
    );
}

#[test_log::test]
fn an_inclusive_date_base_runs_through_its_last_day() {
    let base =
        Interval::dates_inclusive(date(2012, 2, 13), date(2012, 2, 14)).expect("valid base");
    let chain = base.each_seconds(1).expect("valid chain");
    let last = chain.produce().expect("produces").last().expect("nonempty");
    assert_eq!(
        last,
        Interval::floating(
            datetime(2012, 2, 14, 23, 59, 59),
            datetime(2012, 2, 15, 0, 0, 0),
        )
        .expect("valid interval")
    );
}

#[test_log::test]
fn a_span_wider_than_the_step_overlaps_neighbors() {
    let base = Interval::floating(
        datetime(2012, 2, 13, 13, 46, 25),
        datetime(2012, 2, 13, 13, 46, 45),
    )
    .expect("valid base");

    let chain = base
        .each_seconds(1)
        .expect("valid chain")
        .lasting(3)
        .expect("valid span");
    let occurrences = produce_all(&chain).expect("produces");
    assert_eq!(occurrences.len(), 20);
    let overlap = occurrences[0]
        .intersection(occurrences[1])
        .expect("comparable")
        .expect("overlapping");
    assert_eq!(
        overlap,
        Interval::floating(
            datetime(2012, 2, 13, 13, 46, 26),
            datetime(2012, 2, 13, 13, 46, 28),
        )
        .expect("valid interval")
    );

    let sparse = base
        .each_seconds(1)
        .expect("valid chain")
        .step_by(7)
        .expect("valid step")
        .offset_by(1)
        .expect("valid offset")
        .lasting(3)
        .expect("valid span");
    let occurrences = produce_all(&sparse).expect("produces");
    assert_eq!(occurrences.len(), 3);
    assert_eq!(
        occurrences[0],
        Interval::floating(
            datetime(2012, 2, 13, 13, 46, 26),
            datetime(2012, 2, 13, 13, 46, 29),
        )
        .expect("valid interval")
    );
}

#[test_log::test]
fn limit_one_keeps_only_the_first_occurrence() {
    let chain = year_2012()
        .expect("valid base")
        .each_months(1)
        .expect("valid chain")
        .limit_to(1)
        .expect("valid limit");
    let occurrences = produce_all(&chain).expect("produces");

    assert_eq!(occurrences.len(), 1);
    assert_eq!(
        occurrences[0],
        Interval::dates(date(2012, 1, 1), date(2012, 2, 1)).expect("valid interval")
    );
}

#[test_log::test]
fn one_month_of_the_year_recurs_annually() {
    let base = Interval::dates(date(2012, 1, 1), date(2014, 1, 1)).expect("valid base");
    let chain = base
        .each_month_of_year(chrono::Month::February, 1)
        .expect("valid chain");
    let occurrences = produce_all(&chain).expect("produces");

    assert_eq!(occurrences.len(), 2);
    assert_eq!(occurrences[0].start(), TimePoint::Day(date(2012, 2, 1)));
    assert_eq!(occurrences[0].end(), TimePoint::Day(date(2012, 3, 1)));
    assert_eq!(occurrences[1].start(), TimePoint::Day(date(2013, 2, 1)));
}

#[test_log::test]
fn an_open_domain_streams_until_the_consumer_stops() {
    let chain = Domain::Onward(TimePoint::Day(date(2012, 1, 1)))
        .each_weeks(2)
        .expect("valid chain");
    let starts: Vec<_> = chain
        .produce()
        .expect("produces")
        .take(3)
        .map(|i| i.start())
        .collect();
    assert_eq!(
        starts,
        vec![
            TimePoint::Day(date(2012, 1, 1)),
            TimePoint::Day(date(2012, 1, 15)),
            TimePoint::Day(date(2012, 1, 29)),
        ]
    );
}

#[test_log::test]
fn every_month_restarts_its_own_weekday_hunt() {
    let chain = year_2012()
        .expect("valid base")
        .each_months(1)
        .expect("valid chain")
        .weekday(Weekday::Thu, 0)
        .expect("valid chain");
    let occurrences = produce_all(&chain).expect("produces");

    assert_eq!(occurrences.len(), 12);
    for occurrence in &occurrences {
        let start = occurrence.start().date();
        assert_eq!(start.weekday(), Weekday::Thu);
        assert!(start.day() <= 7, "first Thursday falls in the first week");
    }
}

#[test_log::test]
fn chain_output_feeds_the_interval_algebra() {
    let chain = year_2012()
        .expect("valid base")
        .each_months(1)
        .expect("valid chain")
        .weekday(Weekday::Thu, 2)
        .expect("valid chain")
        .at_time_in("2:00pm", 3600, chrono_tz::America::New_York)
        .expect("valid chain");
    let occurrences = produce_all(&chain).expect("produces");

    let day = Interval::dates(date(2012, 1, 19), date(2012, 1, 20)).expect("valid interval");
    assert!(occurrences[0].within(day).expect("comparable"));
    assert!(day.subsumes(occurrences[0]).expect("comparable"));
    assert!(occurrences[0].precedes(occurrences[1]).expect("comparable"));
    assert!(
        occurrences[0]
            .intersection(occurrences[1])
            .expect("comparable")
            .is_none()
    );
}

#[test_log::test]
fn covers_confirms_a_second_thursday_instant() {
    let chain = year_2012()
        .expect("valid base")
        .each_months(1)
        .expect("valid chain")
        .weekday(Weekday::Thu, 2)
        .expect("valid chain")
        .at_time_in("2:00pm", 3600, chrono_tz::America::New_York)
        .expect("valid chain");

    let inside = TimePoint::Fixed(
        chrono::DateTime::parse_from_rfc3339("2012-05-17T14:30:00-04:00").expect("valid instant"),
    );
    assert!(chain.covers(inside).expect("comparable"));

    let outside = TimePoint::Fixed(
        chrono::DateTime::parse_from_rfc3339("2012-05-17T16:00:00-04:00").expect("valid instant"),
    );
    assert!(!chain.covers(outside).expect("comparable"));
}

#[test_log::test]
fn clock_parse_failures_surface_at_the_factory() {
    let err = year_2012()
        .expect("valid base")
        .at_time("25:00", 60)
        .expect_err("hour out of range");
    assert!(matches!(err, RecurError::ClockParse(_)));
}
