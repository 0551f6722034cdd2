use chrono::{
    Duration,
    Local,
};

use super::*;
use crate::source::{
    parse_time,
    WindowArgs,
};

fn window(start: Option<&str>, end: Option<&str>, at: Option<&str>) -> WindowArgs {
    WindowArgs {
        start: start.map(String::from),
        end: end.map(String::from),
        at: at.map(String::from),
    }
}

#[rstest]
fn test_parse_time_rfc3339() {
    let now = ts(0).with_timezone(&Local);

    assert_eq!(parse_time(now, "2024-05-01T12:00:10Z").unwrap(), ts(10));
    assert_eq!(parse_time(now, "2024-05-01T14:00:10+02:00").unwrap(), ts(10));
}

#[rstest]
fn test_parse_time_relative() {
    let now = ts(7200).with_timezone(&Local);

    assert_eq!(parse_time(now, "2 hours ago").unwrap(), ts(0));
}

#[rstest]
fn test_parse_time_garbage() {
    assert_err!(parse_time(Local::now(), "@@@"));
}

#[rstest]
fn test_window_resolve() {
    let now = ts(0).with_timezone(&Local);

    assert_eq!(window(None, None, None).resolve(now).unwrap(), kr_provider::TimeWindow::default());

    let resolved = window(Some("2024-05-01T11:00:00Z"), Some("2024-05-01T12:00:00Z"), None).resolve(now).unwrap();
    assert_eq!(resolved.start, Some(ts(0) - Duration::hours(1)));
    assert_eq!(resolved.end, Some(ts(0)));
}

#[rstest]
fn test_window_resolve_at_overrides_end() {
    let now = ts(0).with_timezone(&Local);
    let resolved = window(None, Some("2024-05-01T12:00:00Z"), Some("2024-05-01T12:00:30Z")).resolve(now).unwrap();

    assert_eq!(resolved.end, Some(ts(30)));
}

#[rstest]
fn test_window_resolve_inverted() {
    let now = ts(0).with_timezone(&Local);

    assert_err!(window(Some("2024-05-01T12:00:30Z"), Some("2024-05-01T12:00:00Z"), None).resolve(now));
}
