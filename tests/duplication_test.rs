mod common;

use std::collections::HashMap;

use academic_requests::academic::dto::CourseLookup;
use academic_requests::error::AppError;
use academic_requests::models::{CourseRequestPatch, Day, Modality, RoomType, RowState};
use academic_requests::services::{
    ApplyOutcome, Confirmed, CourseRequestTable, DuplicationWorkflow,
};

use common::{
    StubAcademicClient, current_semester, date, past_semester, schedule, stored_request,
};

fn client_with_past_requests() -> StubAcademicClient {
    let mut requests = HashMap::new();
    requests.insert(
        past_semester().id,
        vec![
            stored_request(
                "101",
                "Data Structures",
                vec![
                    schedule("LUNES", "08:00:00", "10:00:00", 1, 1),
                    schedule("MIE", "08:00:00", "10:00:00", 2, 2),
                ],
            ),
            stored_request("102", "Algorithms", vec![schedule("FRIDAY", "14:00:00", "16:00:00", 3, 7)]),
        ],
    );

    StubAcademicClient {
        semesters: Some(vec![past_semester(), current_semester()]),
        requests,
        ..Default::default()
    }
}

async fn selected_workflow(client: &StubAcademicClient) -> DuplicationWorkflow {
    let mut workflow = DuplicationWorkflow::new();
    workflow.load_semesters(client, date("2024-09-01")).await;
    workflow.select(Some("2024-1".to_string()));
    workflow
}

#[tokio::test]
async fn semester_list_excludes_current() {
    let client = client_with_past_requests();
    let mut workflow = DuplicationWorkflow::new();

    let options = workflow.load_semesters(&client, date("2024-09-01")).await.to_vec();

    assert_eq!(options.len(), 1);
    assert_eq!(options[0].key, "2024-1");
    assert_eq!(workflow.semester_id("2024-1"), Some(20241));
}

#[tokio::test]
async fn semester_list_falls_back_when_fetch_fails() {
    let client = StubAcademicClient::default();
    let mut workflow = DuplicationWorkflow::new();

    let options = workflow.load_semesters(&client, date("2025-03-10")).await.to_vec();

    assert_eq!(options.len(), 1);
    assert_eq!(options[0].key, "2024-2");
    assert_eq!(workflow.semester_id("2024-2"), Some(20242));
}

#[tokio::test]
async fn preview_without_selection_is_a_lookup_error() {
    let client = client_with_past_requests();
    let mut workflow = DuplicationWorkflow::new();
    workflow.load_semesters(&client, date("2024-09-01")).await;

    let result = workflow.load_preview(&client).await;
    assert!(matches!(result, Err(AppError::Lookup(_))));

    workflow.select(Some("1999-1".to_string()));
    let result = workflow.load_preview(&client).await;
    assert!(matches!(result, Err(AppError::Lookup(_))));
    assert_eq!(client.fetches(), 0);
}

#[tokio::test]
async fn preview_counts_requests() {
    let client = client_with_past_requests();
    let mut workflow = selected_workflow(&client).await;

    let preview = workflow.load_preview(&client).await.unwrap();

    assert_eq!(preview.total_requests, 2);
    assert_eq!(preview.semester_id, 20241);
    assert_eq!(preview.message, "Found 2 request(s) for 2024-1");
}

#[tokio::test]
async fn changing_selection_discards_preview() {
    let client = client_with_past_requests();
    let mut workflow = selected_workflow(&client).await;
    workflow.load_preview(&client).await.unwrap();

    workflow.select(Some("2024-1".to_string()));

    assert!(workflow.preview().is_none());
}

#[tokio::test]
async fn stale_preview_response_is_ignored() {
    let client = client_with_past_requests();
    let mut workflow = selected_workflow(&client).await;

    let stale = workflow.begin_preview().unwrap();
    workflow.select(Some("2024-1".to_string()));
    let fresh = workflow.begin_preview().unwrap();

    assert!(workflow.complete_preview(stale, Vec::new()).is_none());
    assert!(workflow.preview().is_none());

    let requests = vec![stored_request("101", "Data Structures", vec![])];
    let preview = workflow.complete_preview(fresh, requests).unwrap();
    assert_eq!(preview.total_requests, 1);
}

#[tokio::test]
async fn apply_reuses_fetched_preview() {
    let client = client_with_past_requests();
    let mut workflow = selected_workflow(&client).await;
    let mut table = CourseRequestTable::new(Some(current_semester()));

    workflow.load_preview(&client).await.unwrap();
    let outcome = workflow.apply(&client, &mut table, &Confirmed(true)).await.unwrap();

    assert_eq!(client.fetches(), 1);
    assert_eq!(
        outcome,
        ApplyOutcome::Applied {
            count: 2,
            message: "Found 2 request(s) for 2024-1".to_string(),
        }
    );
    assert!(workflow.preview().is_none());
}

#[tokio::test]
async fn apply_maps_rows_as_fresh_drafts() {
    let client = client_with_past_requests();
    let mut workflow = selected_workflow(&client).await;
    let mut table = CourseRequestTable::new(Some(current_semester()));

    workflow.apply(&client, &mut table, &Confirmed(false)).await.unwrap();

    assert_eq!(client.fetches(), 1);
    assert_eq!(table.len(), 2);

    let first = table.row(0).unwrap();
    assert_eq!(first.state, RowState::New);
    assert_eq!(first.course_id, "101");
    assert_eq!(first.seats, 25);
    // current semester dates, not the source semester's
    assert_eq!(first.start_date, "2024-08-05");
    assert_eq!(first.end_date, "2024-11-29");
    assert_eq!(first.weeks, 17);

    let slots = first.schedules();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].day, Some(Day::Mon));
    assert_eq!(slots[0].start_time, "08:00");
    assert_eq!(slots[0].total, 2.0);
    assert_eq!(slots[0].modality, Some(Modality::InPerson));
    assert_eq!(slots[1].day, Some(Day::Wed));
    assert_eq!(slots[1].room_type, Some(RoomType::Lab));

    let second = table.row(1).unwrap();
    assert_eq!(second.schedules()[0].day, Some(Day::Fri));
    assert_eq!(second.schedules()[0].modality, Some(Modality::Hybrid));
    assert_eq!(second.schedules()[0].room_type, None);
}

#[tokio::test]
async fn apply_with_no_source_requests_is_informational() {
    let client = StubAcademicClient {
        semesters: Some(vec![past_semester()]),
        ..Default::default()
    };
    let mut workflow = selected_workflow(&client).await;
    let mut table = CourseRequestTable::new(Some(current_semester()));

    let outcome = workflow.apply(&client, &mut table, &Confirmed(false)).await.unwrap();

    assert_eq!(
        outcome,
        ApplyOutcome::Empty {
            message: "No requests found for 2024-1".to_string(),
        }
    );
    assert!(table.is_empty());
}

#[tokio::test]
async fn declined_confirmation_leaves_table_untouched() {
    let client = client_with_past_requests();
    let mut workflow = selected_workflow(&client).await;
    let mut table = CourseRequestTable::new(Some(current_semester()));
    table
        .patch_row(
            0,
            CourseRequestPatch {
                course_id: Some("999".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    let outcome = workflow.apply(&client, &mut table, &Confirmed(false)).await.unwrap();

    assert_eq!(outcome, ApplyOutcome::Cancelled);
    assert_eq!(table.len(), 1);
    assert_eq!(table.row(0).unwrap().course_id, "999");
    assert_eq!(client.fetches(), 0);
}

#[tokio::test]
async fn apply_backfills_missing_names_from_catalogue() {
    let mut client = client_with_past_requests();
    let mut bare = stored_request("303", "", vec![]);
    bare.section = None;
    client.requests.insert(past_semester().id, vec![bare]);
    client.catalogue.insert(
        "303".to_string(),
        CourseLookup {
            name: "Operating Systems".to_string(),
            section_id: Some("7".to_string()),
            credits: Some(4),
        },
    );
    let mut workflow = selected_workflow(&client).await;
    let mut table = CourseRequestTable::new(Some(current_semester()));

    workflow.apply(&client, &mut table, &Confirmed(true)).await.unwrap();

    let row = table.row(0).unwrap();
    assert_eq!(row.course_name, "Operating Systems");
    assert_eq!(row.section, "7");
    assert_eq!(row.schedules().len(), 1);
}

#[tokio::test]
async fn apply_loaded_after_selection_change_is_rejected() {
    let client = client_with_past_requests();
    let mut workflow = selected_workflow(&client).await;
    let mut table = CourseRequestTable::new(Some(current_semester()));

    let mut ticket = workflow
        .begin_apply(&table, &Confirmed(true))
        .await
        .unwrap()
        .unwrap();
    let rows = ticket.load_rows(&client).await.unwrap();
    workflow.select(Some("2024-1".to_string()));

    let result = workflow.complete_apply(ticket, rows, &mut table);

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(table.len(), 1);
    assert!(table.row(0).unwrap().course_id.is_empty());
}

#[tokio::test]
async fn declined_apply_hands_out_no_ticket() {
    let client = client_with_past_requests();
    let mut workflow = selected_workflow(&client).await;
    let mut table = CourseRequestTable::new(Some(current_semester()));
    table
        .patch_row(
            0,
            CourseRequestPatch {
                seats: Some(10),
                ..Default::default()
            },
        )
        .unwrap();

    let ticket = workflow.begin_apply(&table, &Confirmed(false)).await.unwrap();

    assert!(ticket.is_none());
}
