mod common;

use chrono::NaiveDate;
use common::TestApp;
use sitestock_api::{errors::ServiceError, services::sites::SiteStatus};
use uuid::Uuid;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

#[tokio::test]
async fn create_and_fetch_site_round_trip() {
    let app = TestApp::new().await;
    let sites = app.state.services.sites.clone();

    let created = sites
        .create_site(
            "Bridge Renovation".to_string(),
            "Riverside District".to_string(),
            date(2024, 3, 1),
            Some(date(2024, 9, 30)),
            Some("A. Mason".to_string()),
            Some("R. Patel".to_string()),
            Some(SiteStatus::OnHold),
        )
        .await
        .expect("create site");

    let fetched = sites
        .get_site(&created.id)
        .await
        .expect("query site")
        .expect("site exists");

    assert_eq!(fetched.name, "Bridge Renovation");
    assert_eq!(fetched.location, "Riverside District");
    assert_eq!(fetched.start_date, date(2024, 3, 1));
    assert_eq!(fetched.end_date, Some(date(2024, 9, 30)));
    assert_eq!(fetched.supervisor.as_deref(), Some("A. Mason"));
    assert_eq!(fetched.manager.as_deref(), Some("R. Patel"));
    assert_eq!(fetched.status, "on_hold");
}

#[tokio::test]
async fn new_sites_default_to_active() {
    let app = TestApp::new().await;
    let site = app.seed_site("Default Status Site").await;
    assert_eq!(site.status, SiteStatus::Active.to_string());
}

#[tokio::test]
async fn blank_fields_and_reversed_dates_are_rejected() {
    let app = TestApp::new().await;
    let sites = app.state.services.sites.clone();

    let err = sites
        .create_site(
            "  ".to_string(),
            "Somewhere".to_string(),
            date(2024, 3, 1),
            None,
            None,
            None,
            None,
        )
        .await
        .expect_err("blank name must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let err = sites
        .create_site(
            "Bridge".to_string(),
            "".to_string(),
            date(2024, 3, 1),
            None,
            None,
            None,
            None,
        )
        .await
        .expect_err("blank location must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let err = sites
        .create_site(
            "Bridge".to_string(),
            "Riverside".to_string(),
            date(2024, 3, 1),
            Some(date(2024, 2, 1)),
            None,
            None,
            None,
        )
        .await
        .expect_err("end before start must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn listing_is_ordered_by_name() {
    let app = TestApp::new().await;

    app.seed_site("Tower Block").await;
    app.seed_site("Bridge Renovation").await;
    app.seed_site("Metro Station").await;

    let sites = app
        .state
        .services
        .sites
        .list_sites()
        .await
        .expect("list sites");
    let names: Vec<&str> = sites.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Bridge Renovation", "Metro Station", "Tower Block"]);
}

#[tokio::test]
async fn update_site_revalidates_the_combined_date_range() {
    let app = TestApp::new().await;
    let sites = app.state.services.sites.clone();

    let created = sites
        .create_site(
            "Bridge Renovation".to_string(),
            "Riverside".to_string(),
            date(2024, 3, 1),
            Some(date(2024, 9, 30)),
            None,
            None,
            None,
        )
        .await
        .expect("create site");

    // New end date lands before the stored start date
    let err = sites
        .update_site(
            created.id,
            None,
            None,
            None,
            Some(date(2024, 1, 15)),
            None,
            None,
            None,
        )
        .await
        .expect_err("end before existing start must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    // New start date lands after the stored end date
    let err = sites
        .update_site(
            created.id,
            None,
            None,
            Some(date(2024, 12, 1)),
            None,
            None,
            None,
            None,
        )
        .await
        .expect_err("start after existing end must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    // A consistent update goes through and leaves other fields alone
    let updated = sites
        .update_site(
            created.id,
            None,
            None,
            None,
            Some(date(2024, 11, 30)),
            Some("A. Mason".to_string()),
            None,
            Some(SiteStatus::Completed),
        )
        .await
        .expect("valid update");
    assert_eq!(updated.name, "Bridge Renovation");
    assert_eq!(updated.end_date, Some(date(2024, 11, 30)));
    assert_eq!(updated.supervisor.as_deref(), Some("A. Mason"));
    assert_eq!(updated.status, "completed");

    let missing = Uuid::new_v4();
    let err = sites
        .update_site(missing, None, None, None, None, None, None, None)
        .await
        .expect_err("unknown site must fail");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn delete_site_removes_it_from_the_registry() {
    let app = TestApp::new().await;
    let sites = app.state.services.sites.clone();

    let created = app.seed_site("Short Lived Site").await;

    sites.delete_site(created.id).await.expect("delete site");

    let fetched = sites.get_site(&created.id).await.expect("query site");
    assert!(fetched.is_none());

    let err = sites
        .delete_site(created.id)
        .await
        .expect_err("second delete must fail");
    assert!(matches!(err, ServiceError::NotFound(_)));
}
