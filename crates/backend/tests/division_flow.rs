mod common;

use axum::http::{Method, StatusCode};
use common::{approx, call, create_user, exec, get, login, setup};
use serde_json::{json, Value};

async fn seed() {
    exec(
        "INSERT INTO salesperson_masters (salesman_no, salesman_name, role)
            VALUES (101, 'Ann Retail', 'Retail')",
    )
    .await;
    exec(
        "INSERT INTO division_masters (div_no, div_desc)
            VALUES (10, 'Hardware'), (20, 'Software'), (20, 'Software dup')",
    )
    .await;

    // W1 is a warranty order: it counts for division history, not for gross profit
    exec(
        "INSERT INTO sales (salesperson, order_no, period, customer_name, derived_customer_class, item_division, qty, ext_sales, ext_cost, zero_perc_sales, is_warranty) VALUES
            (101, 'O1', '2025-02-01', 'Acme', 'Dealer', 10, 3, 300, 200, 'no', 'no'),
            (101, 'O2', '2025-05-01', 'Acme', 'Dealer', 20, 1, 100, 50, 'no', 'no'),
            (101, 'W1', '2025-08-01', 'Acme', 'Dealer', 20, 1, 100, 100, 'no', 'yes')",
    )
    .await;

    exec(
        "INSERT INTO budgets (salesperson_id, salesperson_name, customer_name, customer_class, quarter_1_sales, quarter_2_sales, quarter_3_sales, quarter_4_sales, is_custom) VALUES
            (101, 'Ann Retail', 'Acme', 'Dealer', 1000, 1000, 1000, 1000, 0),
            (101, 'Ann Retail', 'Custom Co', 'Dealer', 500, 0, 0, 0, 1)",
    )
    .await;

    create_user("admin", Some(0)).await;
    create_user("ann", Some(101)).await;
}

fn division<'a>(rows: &'a Value, div_no: i64) -> &'a Value {
    rows.as_array()
        .and_then(|rows| rows.iter().find(|r| r["item_division"] == div_no))
        .unwrap_or_else(|| panic!("division {} missing in {}", div_no, rows))
}

fn ratio_override(div_no: i64, ratio: f64) -> Value {
    json!({
        "salesperson_id": 101,
        "salesperson_name": "Ann Retail",
        "customer_class": "Dealer",
        "group_key": "Acme",
        "item_division": div_no,
        "custom_ratio": ratio
    })
}

#[tokio::test]
async fn test_division_allocation_and_gross_profit() {
    let _dir = setup().await;
    seed().await;
    let app = backend::routes::app();

    let admin = login(&app, "admin").await;
    let ann = login(&app, "ann").await;

    let (status, _) = get(&app, "/api/division/allocations", &ann).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // historical ratios 300/500 and 200/500 over the collapsed non-custom budget
    let (status, body) = get(&app, "/api/division/allocations", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_records"], 2);
    let hardware = division(&body["data"], 10);
    assert_eq!(hardware["division_name"], "Hardware");
    assert!(approx(&hardware["historical_ratio"], 0.6));
    assert!(approx(&hardware["effective_ratio"], 0.6));
    assert!(approx(&hardware["q1_allocated"], 600.0));
    assert!(approx(&hardware["total_allocated"], 2400.0));
    assert_eq!(hardware["is_custom"], false);
    let software = division(&body["data"], 20);
    assert_eq!(software["division_name"], "Software");
    assert!(approx(&software["historical_sales"], 200.0));
    assert!(approx(&software["total_allocated"], 1600.0));

    // overrides: insert, then update
    let save = |ratio: f64| json!({ "overrides": [ratio_override(20, ratio)] });
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/division/save-ratios",
        Some(&admin),
        Some(save(0.5)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["result"],
        json!({ "saved_count": 1, "updated_count": 0, "total_processed": 1 })
    );
    assert_eq!(
        body["message"],
        "Successfully saved 1 new overrides and updated 0 existing overrides"
    );

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/division/save-ratios",
        Some(&admin),
        Some(save(0.45)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["updated_count"], 1);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/division/save-ratios",
        Some(&admin),
        Some(save(1.5)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("between 0 and 1"));

    let (status, body) = get(&app, "/api/division/allocations/101/Dealer/Acme", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    let software = division(&body["data"], 20);
    assert!(approx(&software["effective_ratio"], 0.45));
    assert!(approx(&software["historical_ratio"], 0.4));
    assert!(approx(&software["q1_allocated"], 450.0));
    assert_eq!(software["is_custom"], true);
    assert_eq!(division(&body["data"], 10)["is_custom"], false);

    let (status, body) = call(
        &app,
        Method::DELETE,
        "/api/division/reset-group/101/Dealer/Acme",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_count"], 1);
    assert_eq!(
        body["message"],
        "Successfully reset 1 custom overrides for group"
    );

    let both = json!({ "overrides": [ratio_override(10, 0.7), ratio_override(20, 0.3)] });
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/division/save-ratios",
        Some(&admin),
        Some(both),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["saved_count"], 2);

    let (status, body) = call(
        &app,
        Method::DELETE,
        "/api/division/reset-all",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_count"], 2);

    // gross profit from valid orders only; custom budgets are left out
    let (status, body) = get(&app, "/api/gross-profit", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_records"], 1);
    let row = &body["data"][0];
    assert_eq!(row["group_key"], "Acme");
    assert!(approx(&row["q1_gp_percent"], 0.333333));
    assert!(approx(&row["q2_gp_percent"], 0.5));
    assert!(approx(&row["q3_gp_percent"], 0.375));
    assert!(approx(&row["full_year_gp_percent"], 0.375));
    assert!(approx(&row["q1_gp_value"], 333.33));
    assert!(approx(&row["total_gp_value"], 1500.0));
    assert_eq!(row["is_custom"], false);

    let gp_overrides = json!({ "overrides": [
        { "salesperson_id": 101, "customer_class": "Dealer", "group_key": "Acme", "period": "full_year", "gp_percent": 0.5 },
        { "salesperson_id": 101, "customer_class": "Dealer", "group_key": "Acme", "period": "q1", "gp_percent": 0.2 }
    ]});
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/gross-profit/overrides",
        Some(&admin),
        Some(gp_overrides),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["saved_count"], 2);

    let bad = json!({ "overrides": [
        { "salesperson_id": 101, "customer_class": "Dealer", "group_key": "Acme", "period": "q2", "gp_percent": 2.0 }
    ]});
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/gross-profit/overrides",
        Some(&admin),
        Some(bad),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(&app, "/api/gross-profit/101/Dealer/Acme", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    let row = &body["data"][0];
    assert!(approx(&row["q1_gp_percent"], 0.2));
    assert!(approx(&row["q1_gp_value"], 200.0));
    assert!(approx(&row["q2_gp_percent"], 0.5));
    // no valid Q3 sales: the full-year override applies
    assert!(approx(&row["q3_gp_percent"], 0.5));
    assert!(approx(&row["total_gp_value"], 2000.0));
    assert_eq!(row["is_custom"], true);
    assert_eq!(row["overridden_periods"], json!(["q1", "full_year"]));

    let (status, body) = call(
        &app,
        Method::DELETE,
        "/api/gross-profit/reset-group/101/Dealer/Acme",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_count"], 2);

    let (_, body) = get(&app, "/api/gross-profit/101/Dealer/Acme", &admin).await;
    assert_eq!(body["data"][0]["is_custom"], false);

    // only the exact Hospitality class groups sales by flag; H2 groups by customer
    exec(
        "INSERT INTO sales (salesperson, order_no, period, customer_name, derived_customer_class, flag, item_division, qty, ext_sales, ext_cost, zero_perc_sales, is_warranty) VALUES
            (202, 'H1', '2025-03-01', 'Hampton Downtown', 'Hospitality', 'Hampton', 10, 1, 400, 300, 'no', 'no'),
            (202, 'H2', '2025-03-01', 'Hampton Downtown', 'Hospitality West', 'Hampton', 20, 1, 100, 50, 'no', 'no')",
    )
    .await;
    exec(
        "INSERT INTO budgets (salesperson_id, salesperson_name, brand, flag, customer_class, quarter_1_sales, quarter_2_sales, quarter_3_sales, quarter_4_sales, is_custom) VALUES
            (202, 'Hugo Hotels', 'Hilton', 'Hampton', 'Hospitality', 100, 100, 100, 100, 0)",
    )
    .await;

    let (status, body) = get(&app, "/api/division/allocations", &admin).await;
    assert_eq!(status, StatusCode::OK);
    let hampton: Vec<&Value> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["group_key"] == "Hampton")
        .collect();
    assert_eq!(hampton.len(), 1);
    assert_eq!(hampton[0]["item_division"], 10);
    assert_eq!(hampton[0]["customer_class"], "Hospitality");
    assert_eq!(hampton[0]["brand"], "Hilton");
    assert!(approx(&hampton[0]["historical_ratio"], 1.0));
    assert!(approx(&hampton[0]["total_allocated"], 400.0));
}
