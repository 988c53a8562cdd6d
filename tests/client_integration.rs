use std::time::Duration;

use mockito::Matcher;
use serde_json::json;

use civic_issues::client::{CivicClient, IssueApi, IssueQuery};
use civic_issues::error::CivicError;
use civic_issues::identity::Session;
use civic_issues::models::{Coordinate, IssueStatus, IssueUpdate, PhotoPart, SubmissionPayload};

fn client(server: &mockito::Server, session: Session) -> CivicClient {
    CivicClient::new(&server.url(), session, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_list_issues_sends_filters_and_reads_all_location_forms() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/issues")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("status".into(), "pending".into()),
            Matcher::UrlEncoded("limit".into(), "10".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                {"id": 1, "title": "Pothole", "status": "pending", "location": "12.9716,77.5946"},
                {"id": "2", "title": "Lamp", "status": "pending",
                 "location": {"type": "Point", "coordinates": [77.6, 12.9]}},
                {"id": "3", "title": "Bin", "status": "escalated", "location": null}
            ])
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let query = IssueQuery {
        status: Some("pending".to_string()),
        limit: Some(10),
        ..IssueQuery::default()
    };
    let issues = client(&server, Session::anonymous()).list_issues(&query).await.unwrap();

    mock.assert_async().await;
    assert_eq!(issues.len(), 3);
    assert_eq!(issues[0].id, "1");
    assert_eq!(issues[0].coordinate(), Some(Coordinate::new(12.9716, 77.5946)));
    assert_eq!(issues[1].coordinate(), Some(Coordinate::new(12.9, 77.6)));
    assert_eq!(issues[2].coordinate(), None);
    assert_eq!(issues[2].status, IssueStatus::Unknown("escalated".to_string()));
}

#[tokio::test]
async fn test_wrapped_list_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/departments/")
        .with_status(200)
        .with_body(r#"{"data": [{"id": 7, "name": "Roads"}]}"#)
        .create_async()
        .await;

    let departments = client(&server, Session::anonymous()).list_departments().await.unwrap();
    assert_eq!(departments.len(), 1);
    assert_eq!(departments[0].id, "7");
    assert_eq!(departments[0].name, "Roads");
}

#[tokio::test]
async fn test_update_sends_null_department_and_bearer() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PATCH", "/issues/42")
        .match_header("authorization", "Bearer staff-token")
        .match_body(Matcher::Json(json!({"status": "resolved", "department_id": null})))
        .with_status(200)
        .with_body(json!({"id": "42", "title": "Pothole", "status": "resolved", "department_id": null}).to_string())
        .expect(1)
        .create_async()
        .await;

    let update = IssueUpdate::new(IssueStatus::Resolved, Some(String::new()));
    let issue = client(&server, Session::with_token("staff-token"))
        .update_issue("42", &update)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(issue.status, IssueStatus::Resolved);
    assert_eq!(issue.department_id, None);
}

#[tokio::test]
async fn test_error_detail_is_surfaced() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/issues/9")
        .with_status(404)
        .with_body(r#"{"error": "Issue not found"}"#)
        .create_async()
        .await;

    let err = client(&server, Session::anonymous()).get_issue("9").await.unwrap_err();
    match &err {
        CivicError::Http { status, detail } => {
            assert_eq!(*status, 404);
            assert_eq!(detail, "Issue not found");
        }
        other => panic!("Expected CivicError::Http, got {:?}", other),
    }
    assert!(err.is_network());
    assert_eq!(err.user_message(), "Issue not found");
}

#[tokio::test]
async fn test_anonymous_multipart_submission() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/issues")
        .match_header("authorization", Matcher::Missing)
        .match_header("content-type", Matcher::Regex("^multipart/form-data".to_string()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="title"\r\n\r\nStreetlight out"#.to_string()),
            Matcher::Regex(r#"name="lat"\r\n\r\n12.5"#.to_string()),
            Matcher::Regex(r#"name="lng"\r\n\r\n-0.25"#.to_string()),
            Matcher::Regex(r#"name="images"; filename="photo-0.jpg""#.to_string()),
        ]))
        .with_status(201)
        .with_body(json!({"id": "100", "title": "Streetlight out", "status": "pending"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let payload = SubmissionPayload {
        title: "Streetlight out".to_string(),
        description: "Streetlight out since Monday".to_string(),
        coordinate: Coordinate::new(12.5, -0.25),
        images: vec![PhotoPart::new(b"jpeg".to_vec(), 0, None, None)],
    };
    let issue = client(&server, Session::anonymous()).submit_issue(&payload).await.unwrap();

    mock.assert_async().await;
    assert_eq!(issue.id, "100");
}

#[tokio::test]
async fn test_signed_in_submission_carries_bearer() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/issues")
        .match_header("authorization", "Bearer reporter-token")
        .match_header("content-type", Matcher::Regex("^multipart/form-data".to_string()))
        .with_status(201)
        .with_body(json!({"id": "101", "title": "Flooded underpass", "status": "pending"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let payload = SubmissionPayload {
        title: "Flooded underpass".to_string(),
        description: "Flooded underpass".to_string(),
        coordinate: Coordinate::new(-33.9, 18.4),
        images: Vec::new(),
    };
    let issue = client(&server, Session::with_token("reporter-token"))
        .submit_issue(&payload)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(issue.id, "101");
}

#[tokio::test]
async fn test_issues_by_time_passes_days() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/admin/analytics/issues-by-time")
        .match_query(Matcher::UrlEncoded("days".into(), "7".into()))
        .with_status(200)
        .with_body(r#"[{"date": "2024-05-01", "count": 3}, {"date": "2024-05-02", "count": 0}]"#)
        .create_async()
        .await;

    let series = client(&server, Session::anonymous()).issues_by_time(7).await.unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].count, 3);
}

#[tokio::test]
async fn test_assign_and_resolve_shortcuts() {
    let mut server = mockito::Server::new_async().await;
    let assign = server
        .mock("POST", "/issues/5/assign")
        .match_query(Matcher::UrlEncoded("department_id".into(), "3".into()))
        .with_status(200)
        .with_body(r#"{"id": 5, "status": "assigned", "department_id": 3}"#)
        .expect(1)
        .create_async()
        .await;
    let resolve = server
        .mock("POST", "/issues/5/resolve")
        .with_status(200)
        .with_body(r#"{"id": 5, "status": "resolved", "department_id": 3}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client(&server, Session::with_token("t"));
    let assigned = client.assign_issue("5", "3").await.unwrap();
    assert_eq!(assigned.status, IssueStatus::Assigned);
    assert_eq!(assigned.department_id.as_deref(), Some("3"));

    let resolved = client.resolve_issue("5").await.unwrap();
    assert_eq!(resolved.status, IssueStatus::Resolved);

    assign.assert_async().await;
    resolve.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let client = CivicClient::new("http://127.0.0.1:1", Session::anonymous(), Duration::from_secs(2)).unwrap();
    let err = client.list_departments().await.unwrap_err();
    assert!(err.is_network());
}
