mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{catalog, seeded_settings, service, FailOnSeed, FixedOutcome};
use pokemon_battle_guess::aggregate::trial_seed;
use pokemon_battle_guess::battle::{BattleExecutor, DuelExecutor, Side, TrialOutcome};
use pokemon_battle_guess::server::create_router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SEED: u64 = 99;

fn app(executor: Arc<dyn BattleExecutor>) -> Router {
    create_router(service(executor, seeded_settings(SEED)))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(raw) => {
            builder = builder.header("content-type", "application/json");
            Body::from(raw)
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request builds"))
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response is JSON")
    };
    (status, value)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body.to_string())).await
}

async fn simulate(app: &Router, pokemon1: u32, pokemon2: u32) -> (StatusCode, Value) {
    let body = json!({ "pokemon1Id": pokemon1, "pokemon2Id": pokemon2 });
    post(app, "/api/simulate-battle", body).await
}

#[tokio::test]
async fn health_reports_active_sessions() {
    let app = app(Arc::new(FixedOutcome(TrialOutcome::Draw)));
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "OK", "activeSessions": 0 }));

    simulate(&app, 6, 9).await;
    let (_, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(body["activeSessions"], 1);
}

#[tokio::test]
async fn simulate_then_guess_round_trip() {
    let app = app(Arc::new(DuelExecutor::new(catalog())));
    let (status, battle) = post(
        &app,
        "/api/simulate-battle",
        json!({
            "pokemon1Id": 6,
            "pokemon2Id": 9,
            "options": {
                "generation": 9,
                "pokemon1Level": 60,
                "pokemon2Level": 55,
                "withItems": true,
                "movesetType": "competitive",
                "aiDifficulty": "elite"
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(battle["totalBattles"], 100);
    assert_eq!(battle["pokemon1"]["name"], "Charizard");
    assert_eq!(battle["pokemon1"]["level"], 60);
    assert_eq!(battle["pokemon1"]["item"], "lifeorb");
    assert_eq!(battle["pokemon2"]["level"], 55);

    let wins1 = battle["pokemon1"]["wins"].as_u64().expect("wins1");
    let wins2 = battle["pokemon2"]["wins"].as_u64().expect("wins2");
    let draws = battle["draws"].as_u64().expect("draws");
    assert_eq!(wins1 + wins2 + draws, 100);
    let win_rate = battle["winRate"].as_f64().expect("win rate");
    assert_eq!(win_rate, wins1 as f64 / 100.0);

    let battle_id = battle["battleId"].as_str().expect("battle id").to_string();
    let (status, score) = post(
        &app,
        "/api/submit-guess",
        json!({ "battleId": battle_id, "guessedWinRate": win_rate }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(score["score"], 100);
    assert_eq!(score["accuracy"], 1.0);
    assert_eq!(score["actualWinRate"], win_rate);
    assert!(score["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn perfect_guess_on_a_one_sided_battle() {
    let app = app(Arc::new(FixedOutcome(TrialOutcome::Winner(Side::A))));
    let (_, battle) = simulate(&app, 6, 143).await;
    assert_eq!(battle["winRate"], 1.0);
    assert_eq!(battle["pokemon1"]["wins"], 100);
    assert_eq!(battle["pokemon2"]["wins"], 0);

    let (status, score) = post(
        &app,
        "/api/submit-guess",
        json!({ "battleId": battle["battleId"], "guessedWinRate": 1.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(score["score"], 100);
    assert_eq!(score["band"], "perfect");

    let (_, score) = post(
        &app,
        "/api/submit-guess",
        json!({ "battleId": battle["battleId"], "guessedWinRate": 0.0 }),
    )
    .await;
    assert_eq!(score["score"], 0);
    assert_eq!(score["band"], "wayOff");
}

#[tokio::test]
async fn simulate_errors_map_to_status_codes() {
    let app = app(Arc::new(FixedOutcome(TrialOutcome::Draw)));

    let (status, body) = simulate(&app, 6, 151).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "UnknownCreature");
    assert!(body["message"].as_str().is_some_and(|m| m.contains("151")));

    let (status, body) = post(
        &app,
        "/api/simulate-battle",
        json!({ "pokemon1Id": 999, "pokemon2Id": 6 }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "NoLegalMoves");

    let (status, body) = post(
        &app,
        "/api/simulate-battle",
        json!({ "pokemon1Id": 6, "pokemon2Id": 9, "options": { "pokemon1Level": 150 } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidOptions");

    let malformed = Some("{not json".to_string());
    let (status, body) = send(&app, "POST", "/api/simulate-battle", malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidOptions");
}

#[tokio::test]
async fn executor_failure_is_a_server_error() {
    let app = app(Arc::new(FailOnSeed(trial_seed(SEED, 0))));
    let (status, body) = simulate(&app, 6, 9).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "SimulationFailed");

    let (_, health) = send(&app, "GET", "/health", None).await;
    assert_eq!(health["activeSessions"], 0);
}

#[tokio::test]
async fn guess_errors_map_to_status_codes() {
    let app = app(Arc::new(FixedOutcome(TrialOutcome::Draw)));

    let (status, body) = post(
        &app,
        "/api/submit-guess",
        json!({ "battleId": uuid::Uuid::new_v4().to_string(), "guessedWinRate": 0.5 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");

    let (_, battle) = simulate(&app, 6, 9).await;
    let (status, body) = post(
        &app,
        "/api/submit-guess",
        json!({ "battleId": battle["battleId"], "guessedWinRate": 1.5 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidGuess");

    let missing_guess = json!({ "battleId": battle["battleId"] });
    let (status, body) = post(&app, "/api/submit-guess", missing_guess).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidGuess");
}
