mod common;

use chrono::Utc;
use common::TestApp;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sitestock_api::services::{sites::SiteStatus, usage::UsageLine};

#[tokio::test]
async fn empty_database_yields_zero_metrics() {
    let app = TestApp::new().await;

    let metrics = app
        .state
        .services
        .dashboard
        .dashboard_metrics()
        .await
        .expect("dashboard metrics");

    assert_eq!(metrics.active_sites, 0);
    assert_eq!(metrics.total_sites, 0);
    assert_eq!(metrics.total_products, 0);
    assert_eq!(metrics.total_stock_value, Decimal::ZERO);
    assert_eq!(metrics.total_purchase_cost, Decimal::ZERO);
    assert_eq!(metrics.low_stock_items, 0);
    assert!(metrics.generated_at <= Utc::now());
}

#[tokio::test]
async fn dashboard_aggregates_sites_catalog_and_ledger() {
    let app = TestApp::new().await;

    let bridge = app.seed_site("Bridge Renovation").await;
    app.seed_site("Tower Block").await;
    let finished = app.seed_site("Finished Depot").await;
    app.state
        .services
        .sites
        .update_site(
            finished.id,
            None,
            None,
            None,
            None,
            None,
            None,
            Some(SiteStatus::Completed),
        )
        .await
        .expect("complete site");

    let cement = app.seed_product("Cement", "bag", dec!(350), dec!(40)).await;
    app.seed_product("Sand", "ton", dec!(1200), dec!(20)).await;
    // Stock 8 sits under the default low stock threshold of 10
    app.seed_product("Grout", "bag", dec!(90), dec!(8)).await;

    let usage = app.state.services.usage.clone();
    let snapshot = usage.catalog_snapshot().await.expect("catalog snapshot");
    usage
        .submit_batch(
            bridge.id,
            vec![UsageLine::for_product(&cement, dec!(10), None)],
            &snapshot,
        )
        .await
        .expect("record usage");

    let metrics = app
        .state
        .services
        .dashboard
        .dashboard_metrics()
        .await
        .expect("dashboard metrics");

    assert_eq!(metrics.active_sites, 2);
    assert_eq!(metrics.total_sites, 3);
    assert_eq!(metrics.total_products, 3);
    // Valuation reflects the post-usage stock: 30*350 + 20*1200 + 8*90
    assert_eq!(metrics.total_stock_value, dec!(35220));
    assert_eq!(metrics.total_purchase_cost, dec!(3500));
    assert_eq!(metrics.low_stock_items, 1);
}

#[tokio::test]
async fn rate_changes_reprice_valuation_and_purchase_history() {
    let app = TestApp::new().await;

    let site = app.seed_site("Bridge Renovation").await;
    let cement = app.seed_product("Cement", "bag", dec!(350), dec!(40)).await;

    let usage = app.state.services.usage.clone();
    let snapshot = usage.catalog_snapshot().await.expect("catalog snapshot");
    usage
        .submit_batch(
            site.id,
            vec![UsageLine::for_product(&cement, dec!(10), None)],
            &snapshot,
        )
        .await
        .expect("record usage");

    app.state
        .services
        .products
        .update_product(cement.id, None, None, Some(dec!(400)), None, None)
        .await
        .expect("reprice cement");

    let metrics = app
        .state
        .services
        .dashboard
        .dashboard_metrics()
        .await
        .expect("dashboard metrics");

    // Both figures are derived from the current rate, not the rate at usage time
    assert_eq!(metrics.total_stock_value, dec!(12000));
    assert_eq!(metrics.total_purchase_cost, dec!(4000));
}
