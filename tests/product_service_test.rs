mod common;

use common::TestApp;
use rust_decimal_macros::dec;
use sitestock_api::errors::ServiceError;
use uuid::Uuid;

#[tokio::test]
async fn create_and_fetch_product_round_trip() {
    let app = TestApp::new().await;
    let products = app.state.services.products.clone();

    let created = products
        .create_product(
            "Cement".to_string(),
            "bag".to_string(),
            dec!(350.75),
            dec!(50),
            Some(dec!(15)),
        )
        .await
        .expect("create product");

    let fetched = products
        .get_product(&created.id)
        .await
        .expect("query product")
        .expect("product exists");

    assert_eq!(fetched.name, "Cement");
    assert_eq!(fetched.unit, "bag");
    assert_eq!(fetched.rate_per_unit, dec!(350.75));
    assert_eq!(fetched.stock_quantity, dec!(50));
    assert_eq!(fetched.low_stock_threshold, dec!(15));
    assert!(fetched.updated_at.is_some());
}

#[tokio::test]
async fn blank_name_or_unit_is_rejected() {
    let app = TestApp::new().await;
    let products = app.state.services.products.clone();

    let err = products
        .create_product("   ".to_string(), "bag".to_string(), dec!(10), dec!(1), None)
        .await
        .expect_err("blank name must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let err = products
        .create_product("Cement".to_string(), "".to_string(), dec!(10), dec!(1), None)
        .await
        .expect_err("blank unit must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn negative_amounts_are_rejected() {
    let app = TestApp::new().await;
    let products = app.state.services.products.clone();

    let err = products
        .create_product(
            "Cement".to_string(),
            "bag".to_string(),
            dec!(-1),
            dec!(1),
            None,
        )
        .await
        .expect_err("negative rate must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let err = products
        .create_product(
            "Cement".to_string(),
            "bag".to_string(),
            dec!(10),
            dec!(-5),
            None,
        )
        .await
        .expect_err("negative stock must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let err = products
        .create_product(
            "Cement".to_string(),
            "bag".to_string(),
            dec!(10),
            dec!(5),
            Some(dec!(-2)),
        )
        .await
        .expect_err("negative threshold must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn listing_is_ordered_by_name_and_searchable() {
    let app = TestApp::new().await;

    app.seed_product("Steel Rod", "kg", dec!(60), dec!(100)).await;
    app.seed_product("Cement", "bag", dec!(350), dec!(50)).await;
    app.seed_product("Sand", "m3", dec!(1200), dec!(20)).await;

    let products = app.state.services.products.clone();

    let all = products.list_products(None).await.expect("list products");
    let names: Vec<&str> = all.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Cement", "Sand", "Steel Rod"]);

    // Search is case-insensitive over name and unit
    let by_name = products
        .list_products(Some("STE".to_string()))
        .await
        .expect("search by name");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "Steel Rod");

    let by_unit = products
        .list_products(Some("Bag".to_string()))
        .await
        .expect("search by unit");
    assert_eq!(by_unit.len(), 1);
    assert_eq!(by_unit[0].name, "Cement");

    let none = products
        .list_products(Some("gravel".to_string()))
        .await
        .expect("search without matches");
    assert!(none.is_empty());
}

#[tokio::test]
async fn update_product_applies_partial_changes() {
    let app = TestApp::new().await;
    let products = app.state.services.products.clone();

    let created = app.seed_product("Cement", "bag", dec!(350), dec!(50)).await;

    let updated = products
        .update_product(created.id, Some("Cement OPC".to_string()), None, None, None, None)
        .await
        .expect("rename product");
    assert_eq!(updated.name, "Cement OPC");
    assert_eq!(updated.unit, "bag");
    assert_eq!(updated.rate_per_unit, dec!(350));

    let repriced = products
        .update_product(created.id, None, None, Some(dec!(375)), Some(dec!(60)), None)
        .await
        .expect("reprice product");
    assert_eq!(repriced.rate_per_unit, dec!(375));
    assert_eq!(repriced.stock_quantity, dec!(60));
    assert_eq!(repriced.name, "Cement OPC");

    let err = products
        .update_product(created.id, Some("  ".to_string()), None, None, None, None)
        .await
        .expect_err("blank rename must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let missing = Uuid::new_v4();
    let err = products
        .update_product(missing, Some("Ghost".to_string()), None, None, None, None)
        .await
        .expect_err("unknown product must fail");
    assert!(matches!(err, ServiceError::ProductNotFound(id) if id == missing));
}

#[tokio::test]
async fn delete_product_removes_it_from_the_catalog() {
    let app = TestApp::new().await;
    let products = app.state.services.products.clone();

    let created = app.seed_product("Cement", "bag", dec!(350), dec!(50)).await;

    products
        .delete_product(created.id)
        .await
        .expect("delete product");

    let fetched = products
        .get_product(&created.id)
        .await
        .expect("query product");
    assert!(fetched.is_none());

    let err = products
        .delete_product(created.id)
        .await
        .expect_err("second delete must fail");
    assert!(matches!(err, ServiceError::ProductNotFound(id) if id == created.id));
}

#[tokio::test]
async fn low_stock_respects_each_products_threshold() {
    let app = TestApp::new().await;
    let products = app.state.services.products.clone();

    // Default threshold of 10 applies when none is given
    products
        .create_product("Grout".to_string(), "bag".to_string(), dec!(80), dec!(8), None)
        .await
        .expect("create grout");

    // An explicit lower threshold keeps the same stock level out of the list
    products
        .create_product(
            "Sand".to_string(),
            "m3".to_string(),
            dec!(1200),
            dec!(8),
            Some(dec!(5)),
        )
        .await
        .expect("create sand");

    // Stock exactly at the threshold counts as low
    products
        .create_product(
            "Steel".to_string(),
            "kg".to_string(),
            dec!(60),
            dec!(5),
            Some(dec!(5)),
        )
        .await
        .expect("create steel");

    let low = products.low_stock_products().await.expect("low stock query");
    let names: Vec<&str> = low.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Grout", "Steel"]);
}
