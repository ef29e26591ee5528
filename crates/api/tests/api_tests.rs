//! HTTP tests driving the router against an in-memory database.

use api::{app, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use broker_core::{Load, LoadStatus};
use chrono::{Duration, NaiveDateTime, Utc};
use database::{load, Database};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

const KEY: &str = "test-key";

async fn setup() -> (Router, Database) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();
    (app(AppState::new(db.clone(), KEY)), db)
}

fn in_days(days: i64) -> NaiveDateTime {
    Utc::now().naive_utc() + Duration::days(days)
}

fn load_at(load_id: &str, origin: &str, destination: &str, pickup: NaiveDateTime) -> Load {
    Load {
        load_id: load_id.to_string(),
        origin: origin.to_string(),
        destination: destination.to_string(),
        pickup_datetime: pickup,
        delivery_datetime: pickup + Duration::days(2),
        equipment_type: "Dry Van".to_string(),
        loadboard_rate: 2800.0,
        status: LoadStatus::Available,
        notes: String::new(),
        weight: 18000.0,
        commodity_type: "Electronics".to_string(),
        num_of_pieces: 45,
        miles: 1320.0,
        dimensions: "48x40x60".to_string(),
        target_carrier_rate: None,
        cap_carrier_rate: None,
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("X-API-Key", KEY)
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("X-API-Key", KEY)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn call_json(call_id: &str) -> Value {
    json!({
        "system": {"call_id": call_id, "call_duration": 245},
        "fmcsa_data": {
            "carrier_mc_number": 1234,
            "carrier_name": "TYROLER METALS INC",
            "carrier_validation_result": "VALID",
            "retrieval_date": "2026-02-13T19:45:01.867+0000"
        },
        "load_data": {
            "load_id_discussed": "LD-001",
            "alternate_loads_presented": 1,
            "loadboard_rate": 2200.0,
            "origin": "Chicago, IL",
            "destination": "Dallas, TX",
            "carrier_requested_lane": "Denver to Chicago",
            "equipment_type": "Dry Van",
            "miles": 920.0
        },
        "transcript_extraction": {
            "negotiation": {
                "carrier_first_offer": 1900.0,
                "final_agreed_rate": 2000.0,
                "negotiation_rounds": 2
            },
            "outcome": {
                "call_outcome": "accepted",
                "funnel_stage_reached": "deal_agreed"
            }
        }
    })
}

#[tokio::test]
async fn test_health_needs_no_key() {
    let (app, _db) = setup().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_or_wrong_key_is_401() {
    let (app, _db) = setup().await;

    let no_key = Request::builder()
        .uri("/api/analytics/summary")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, no_key).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid API key");

    let wrong_key = Request::builder()
        .uri("/api/loads/search")
        .header("X-API-Key", "nope")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, wrong_key).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ingest_creates_then_updates() {
    let (app, _db) = setup().await;

    let (status, body) = send(&app, post("/api/analytics/calls", &call_json("call-1"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"call_id": "call-1", "status": "created"}));

    let (_, first) = send(&app, get("/api/analytics/calls/call-1")).await;

    let mut revised = call_json("call-1");
    revised["system"]["call_duration"] = json!(999);
    let (status, body) = send(&app, post("/api/analytics/calls", &revised)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "updated");

    let (status, stored) = send(&app, get("/api/analytics/calls/call-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["system"]["call_duration"], 999);
    assert_eq!(stored["ingested_at"], first["ingested_at"]);
    assert_eq!(stored["revision"], 2);

    let (status, _) = send(&app, get("/api/analytics/calls/unknown")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_call_bodies_are_422() {
    let (app, _db) = setup().await;

    let mut no_outcome = call_json("call-1");
    no_outcome["transcript_extraction"] = json!({});
    let (status, _) = send(&app, post("/api/analytics/calls", &no_outcome)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, post("/api/analytics/calls", &call_json(""))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let garbage = Request::builder()
        .method("POST")
        .uri("/api/analytics/calls")
        .header("X-API-Key", KEY)
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, garbage).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_search_state_code_and_pricing() {
    let (app, db) = setup().await;
    let pickup = in_days(10);
    load::upsert_load(db.pool(), &load_at("LD-CHI", "Chicago, IL", "Dallas, TX", pickup))
        .await
        .unwrap();
    load::upsert_load(db.pool(), &load_at("LD-SAC", "Sacramento, CA", "Dallas, TX", pickup))
        .await
        .unwrap();

    let (status, body) = send(&app, get("/api/loads/search?origin=CA&validation_check=VALID")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["loads"][0]["load_id"], "LD-SAC");
    // Ten days out with no rejections: cold pricing.
    assert_eq!(body["loads"][0]["target_carrier_rate"], 2660.0);
    assert_eq!(body["loads"][0]["cap_carrier_rate"], 2800.0);

    let (status, body) = send(
        &app,
        get("/api/loads/search?origin=&destination=&min_rate=&max_weight=&pickup_date="),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn test_search_ranks_by_lane() {
    let (app, db) = setup().await;
    let pickup = in_days(10);
    let suburb = load_at("LD-2", "North Dallas, TX", "Miami, FL", pickup);
    let exact = load_at("LD-1", "Dallas, TX", "Miami, FL", pickup);
    load::upsert_load(db.pool(), &suburb).await.unwrap();
    load::upsert_load(db.pool(), &exact).await.unwrap();

    let (status, body) = send(&app, get("/api/loads/search?origin=Dallas")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["loads"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["load_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["LD-1", "LD-2"]);
}

#[tokio::test]
async fn test_search_rejects_bad_input() {
    let (app, _db) = setup().await;

    let (status, body) = send(&app, get("/api/loads/search?validation_check=INVALID")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Carrier validation failed");

    let (status, _) = send(&app, get("/api/loads/search?min_rate=lots")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/api/loads/search?delivery_date=someday")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_load() {
    let (app, db) = setup().await;
    load::upsert_load(db.pool(), &load_at("LD-001", "Dallas, TX", "Miami, FL", in_days(10)))
        .await
        .unwrap();

    let (status, body) = send(&app, get("/api/loads/LD-001")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["origin"], "Dallas, TX");
    assert!(body["target_carrier_rate"].is_number());

    let (status, body) = send(&app, get("/api/loads/LD-404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Load not found");
}

#[tokio::test]
async fn test_negotiation_flow() {
    let (app, db) = setup().await;
    load::upsert_load(db.pool(), &load_at("LD-001", "Dallas, TX", "Miami, FL", in_days(10)))
        .await
        .unwrap();
    load::upsert_load(db.pool(), &load_at("LD-OLD", "Dallas, TX", "Miami, FL", in_days(-1)))
        .await
        .unwrap();
    let mut booked = load_at("LD-BKD", "Dallas, TX", "Miami, FL", in_days(10));
    booked.status = LoadStatus::Booked;
    load::upsert_load(db.pool(), &booked).await.unwrap();

    let offer = |load_id: &str, amount: f64, round: i64| {
        json!({"load_id": load_id, "carrier_offer": amount, "negotiation_round": round})
    };

    let (status, body) = send(&app, post("/api/negotiations/evaluate", &offer("LD-001", 2296.0, 1))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["decision"], "accept");
    assert_eq!(body["margin_percent"], 18.0);
    assert_eq!(body["loadboard_rate"], 2800.0);

    let (_, body) = send(&app, post("/api/negotiations/evaluate", &offer("LD-001", 2801.0, 2))).await;
    assert_eq!(body["decision"], "reject");

    let (status, _) = send(&app, post("/api/negotiations/evaluate", &offer("LD-404", 2000.0, 1))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, post("/api/negotiations/evaluate", &offer("LD-OLD", 2000.0, 1))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, post("/api/negotiations/evaluate", &offer("LD-BKD", 2000.0, 1))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, post("/api/negotiations/evaluate", &offer("LD-001", 0.0, 1))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, post("/api/negotiations/evaluate", &offer("LD-001", 2000.0, 0))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_summary_empty_and_bad_dates() {
    let (app, _db) = setup().await;

    let (status, body) = send(&app, get("/api/analytics/summary")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_calls"], 0);
    assert_eq!(body["acceptance_rate"], 0.0);
    assert_eq!(body["booked_revenue"], 0.0);

    let (status, _) = send(&app, get("/api/analytics/summary?from=2026-13-01")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/api/analytics/operations?from=&to=")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_dashboard_views_after_ingest() {
    let (app, _db) = setup().await;
    send(&app, post("/api/analytics/calls", &call_json("call-1"))).await;

    let mut rejected = call_json("call-2");
    rejected["fmcsa_data"]["carrier_mc_number"] = json!(42);
    rejected["transcript_extraction"]["outcome"] = json!({
        "call_outcome": "rejected",
        "rejection_reason": "Rate too low",
        "funnel_stage_reached": "offer_pitched"
    });
    rejected["transcript_extraction"]["negotiation"] = json!({});
    send(&app, post("/api/analytics/calls", &rejected)).await;

    let (_, summary) = send(&app, get("/api/analytics/summary")).await;
    assert_eq!(summary["total_calls"], 2);
    assert_eq!(summary["acceptance_rate"], 50.0);
    assert_eq!(summary["booked_revenue"], 2000.0);
    assert_eq!(summary["total_margin_earned"], 200.0);
    assert_eq!(summary["avg_rate_per_mile"], 2.17);
    assert_eq!(summary["total_carriers"], 2);

    let (_, ops) = send(&app, get("/api/analytics/operations")).await;
    assert_eq!(ops["funnel"][0]["stage"], "call_started");
    assert_eq!(ops["funnel"][0]["count"], 2);
    assert_eq!(ops["funnel"][5]["count"], 1);
    assert_eq!(ops["funnel"][5]["drop_off_percent"], 50.0);
    assert_eq!(ops["rejection_reasons"][0]["reason"], "Rate too low");

    let (_, negotiations) = send(&app, get("/api/analytics/negotiations")).await;
    let names: Vec<&str> = negotiations["negotiation_outcomes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Accepted at First Offer", "Negotiated & Agreed", "No Deal"]);
    assert_eq!(negotiations["margin_distribution"][0]["range"], "5-10%");

    let (_, carriers) = send(&app, get("/api/analytics/carriers")).await;
    assert_eq!(carriers["top_actual_lanes"][0]["lane"], "Chicago, IL \u{2192} Dallas, TX");
    assert_eq!(carriers["carrier_leaderboard"].as_array().unwrap().len(), 2);

    let (_, geo) = send(&app, get("/api/analytics/geography")).await;
    let arcs = geo["arcs"].as_array().unwrap();
    assert!(arcs.iter().any(|a| a["arc_type"] == "requested" && a["origin"] == "Denver, CO"));
    assert!(arcs.iter().any(|a| a["arc_type"] == "booked" && a["origin"] == "Chicago, IL"));

    let (status, quality) = send(&app, get("/api/analytics/ai-quality")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quality["protocol_compliance_rate"], 0.0);
    assert!(quality["tone_quality_distribution"].as_object().unwrap().is_empty());

    let (_, future) = send(&app, get("/api/analytics/summary?from=2999-01-01")).await;
    assert_eq!(future["total_calls"], 0);
}
