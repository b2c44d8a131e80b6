use api_contract::{AlertListQuery, AlertRequest, ApiResponse, DeleteAlertsRequest, PageResult};
use serde_json::Value;

#[test]
fn alert_request_accepts_webhook_payload() {
    let payload = r#"{
        "status": "firing",
        "startsAt": "2024-05-01T08:00:00Z",
        "labels": {"alert_involved_object_kind": "Pod", "severity": "High", "team": "infra"},
        "annotations": {"alert_current_value": "93"}
    }"#;
    let req: AlertRequest = serde_json::from_str(payload).expect("parse");
    assert_eq!(req.status, "firing");
    assert_eq!(req.starts_at, "2024-05-01T08:00:00Z");
    assert!(req.ends_at.is_none());
    assert_eq!(req.labels.severity, "High");
    assert_eq!(req.annotations.alert_current_value, "93");
    assert!(req.labels.extra.contains_key("team"));
}

#[test]
fn alert_request_missing_fields_default_to_empty() {
    let req: AlertRequest = serde_json::from_str("{}").expect("parse");
    assert!(req.status.is_empty());
    assert!(req.starts_at.is_empty());
}

#[test]
fn delete_request_and_query_parse() {
    let req: DeleteAlertsRequest = serde_json::from_str(r#"{"ids":[1,2]}"#).expect("parse");
    assert_eq!(req.ids, vec![1, 2]);

    let query: AlertListQuery =
        serde_json::from_str(r#"{"pageNumber":2,"pageSize":20,"severity":"Low"}"#).expect("parse");
    assert_eq!(query.page_number, Some(2));
    assert_eq!(query.page_size, Some(20));
    assert_eq!(query.severity.as_deref(), Some("Low"));
}

#[test]
fn page_result_is_camel_case() {
    let page = PageResult {
        list: vec![1, 2],
        total_count: 12,
        curr_page: 1,
        page_size: 10,
    };
    let value: Value = serde_json::to_value(page).expect("serialize");
    assert_eq!(value["totalCount"], 12);
    assert_eq!(value["currPage"], 1);
    assert!(value.get("total_count").is_none());
}

#[test]
fn error_envelope_has_no_data() {
    let response = ApiResponse::<()>::error("RESOURCE.NOT_FOUND", "not found");
    let value: Value = serde_json::to_value(response).expect("serialize");
    assert_eq!(value["success"], false);
    assert!(value["data"].is_null());
    assert_eq!(value["error"]["code"], "RESOURCE.NOT_FOUND");
}
