use chrono::{Duration, TimeZone, Utc};
use domain::{AlertLabels, AlertStatus, Clock, ManualClock};

#[test]
fn status_keeps_unknown_values() {
    assert_eq!(AlertStatus::from("firing"), AlertStatus::Firing);
    assert_eq!(AlertStatus::from("resolved"), AlertStatus::Resolved);
    let other = AlertStatus::from("pending");
    assert_eq!(other.as_str(), "pending");
    assert!(!other.is_resolved());

    let json = serde_json::to_string(&AlertStatus::Resolved).expect("serialize");
    assert_eq!(json, "\"resolved\"");
}

#[test]
fn labels_preserve_unknown_fields() {
    let labels: AlertLabels = serde_json::from_value(serde_json::json!({
        "alert_involved_object_kind": "Pod",
        "alert_involved_object_name": "web-0",
        "severity": "Critical",
        "team": "infra"
    }))
    .expect("labels");

    assert_eq!(labels.alert_involved_object_kind, "Pod");
    assert_eq!(labels.severity, "Critical");
    assert!(labels.alert_indicator.is_empty());
    assert_eq!(labels.extra.get("team"), Some(&serde_json::json!("infra")));

    let value = serde_json::to_value(&labels).expect("serialize");
    assert_eq!(value["team"], "infra");
}

#[test]
fn manual_clock_rolls_over_day() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 23, 0, 0).unwrap());
    let day = clock.today();
    clock.advance(Duration::hours(2));
    assert_eq!(clock.today(), day.succ_opt().unwrap());
}
