use axum::extract::{Query, State};
use axum::Json;
use hospital_registry::domain::model::NewHospital;
use hospital_registry::http::dto::{ListQuery, PrefectureQuery};
use hospital_registry::http::error::AppError;
use hospital_registry::http::handlers;
use hospital_registry::{AppState, LocalStorage, TomlConfig};
use std::sync::Arc;
use tempfile::TempDir;

const MIYAGI: &str = "id,code,name,address,prefecture,established\n\
                      1.0,0401,仙台中央病院,宮城県仙台市青葉区1-1,宮城県,\"内科,外科\"\n\
                      2.0,0402,石巻眼科クリニック,宮城県石巻市2-2,宮城県,眼科\n";

const HOKKAIDO: &str = "id,code,name,address,prefecture,established\n\
                        1.0,0101,札幌中央病院,北海道札幌市中央区北1条西,北海道,内科\n";

async fn setup(add_target: Option<&str>) -> (TempDir, AppState) {
    let temp_dir = TempDir::new().unwrap();
    let csv_dir = temp_dir.path().join("csv");
    std::fs::create_dir_all(&csv_dir).unwrap();
    std::fs::write(csv_dir.join("miyagi_hos.csv"), MIYAGI).unwrap();
    std::fs::write(csv_dir.join("hokkaidou_hos.csv"), HOKKAIDO).unwrap();

    let mut config = TomlConfig::from_toml_str(
        r#"
[sources]
csv_paths = ["csv/miyagi_hos.csv", "csv/hokkaidou_hos.csv"]
"#,
    )
    .unwrap();
    config.sources.add_target = add_target.map(str::to_string);

    let storage = Arc::new(LocalStorage::new(temp_dir.path().to_str().unwrap().to_string()));
    let state = AppState::from_config(&config, storage).await;
    (temp_dir, state)
}

fn prefecture(name: &str) -> Query<PrefectureQuery> {
    Query(PrefectureQuery {
        prefecture: name.to_string(),
    })
}

fn list(exclude_blocked: bool) -> Query<ListQuery> {
    Query(ListQuery { exclude_blocked })
}

#[tokio::test]
async fn test_block_and_unblock_prefecture() {
    let (_dir, state) = setup(None).await;

    let Json(blocked) = handlers::block_prefecture(State(state.clone()), prefecture("北海道"))
        .await
        .unwrap();
    assert_eq!(
        blocked.message.as_deref(),
        Some("都道府県 '北海道' がブロックされました")
    );
    assert_eq!(blocked.blocked_prefectures, vec!["北海道"]);

    let Json(cards) = handlers::hospital_cards(State(state.clone()), list(true)).await;
    assert_eq!(cards.len(), 2);
    assert!(cards.iter().all(|c| c.prefecture == "宮城県"));

    let Json(all) = handlers::hospital_cards(State(state.clone()), list(false)).await;
    assert_eq!(all.len(), 3);

    let Json(unblocked) = handlers::unblock_prefecture(State(state.clone()), prefecture("北海道"))
        .await
        .unwrap();
    assert_eq!(
        unblocked.message.as_deref(),
        Some("都道府県 '北海道' のブロックが解除されました")
    );
    assert!(unblocked.blocked_prefectures.is_empty());

    let Json(current) = handlers::get_blocked_prefectures(State(state)).await;
    assert!(current.message.is_none());
    assert!(current.blocked_prefectures.is_empty());
}

#[tokio::test]
async fn test_set_blocked_prefectures_replaces_set() {
    let (_dir, state) = setup(None).await;
    state.blocked.block("青森県");

    let Json(response) = handlers::set_blocked_prefectures(
        State(state.clone()),
        Json(vec!["宮城県".to_string(), "北海道".to_string()]),
    )
    .await
    .unwrap();

    assert_eq!(
        response.message.as_deref(),
        Some("ブロックする都道府県が設定されました")
    );
    assert_eq!(response.blocked_prefectures, vec!["北海道", "宮城県"]);

    let Json(records) = handlers::hospital_data(State(state), list(true)).await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_empty_prefecture_is_rejected() {
    let (_dir, state) = setup(None).await;

    let result = handlers::block_prefecture(State(state.clone()), prefecture("  ")).await;
    match result {
        Err(e) => assert_eq!(e.status(), axum::http::StatusCode::BAD_REQUEST),
        Ok(_) => panic!("blank prefecture was accepted"),
    }

    let result = handlers::set_blocked_prefectures(
        State(state.clone()),
        Json(vec!["北海道".to_string(), String::new()]),
    )
    .await;
    assert!(result.is_err());
    assert!(state.blocked.list().is_empty());
}

#[tokio::test]
async fn test_indexed_cards_are_numbered_after_filtering() {
    let (_dir, state) = setup(None).await;
    state.blocked.block("仙台");

    let Json(cards) = handlers::indexed_hospital_cards(State(state), list(true)).await;
    let summary: Vec<(u32, &str)> = cards.iter().map(|c| (c.id, c.name.as_str())).collect();

    assert_eq!(summary, vec![(1, "石巻眼科クリニック"), (2, "札幌中央病院")]);
    assert_eq!(cards[0].reviews, 0);
}

#[tokio::test]
async fn test_hospital_info_scans_departments() {
    let (_dir, state) = setup(None).await;

    let Json(infos) = handlers::hospital_info(State(state), list(true)).await;
    let first = &infos[0];

    assert_eq!(first.name, "仙台中央病院");
    assert_eq!(first.departments, vec!["内科,外科"]);
}

#[tokio::test]
async fn test_add_hospital_appends_and_is_listed() {
    let (dir, state) = setup(Some("csv/miyagi_hos.csv")).await;

    let hospital = NewHospital {
        name: "仙台北病院".to_string(),
        address: "宮城県仙台市泉区".to_string(),
        departments: vec!["小児科".to_string()],
    };
    let Json(response) = handlers::add_hospital(State(state.clone()), Json(hospital))
        .await
        .unwrap();
    assert_eq!(response.message, "病院が追加されました");
    assert_eq!(response.name, "仙台北病院");

    let written = std::fs::read_to_string(dir.path().join("csv/miyagi_hos.csv")).unwrap();
    assert!(written.ends_with(",,仙台北病院,宮城県仙台市泉区,,小児科\n"));

    let Json(cards) = handlers::hospital_cards(State(state.clone()), list(true)).await;
    let card = cards.iter().find(|c| c.name == "仙台北病院").unwrap();
    assert_eq!(card.prefecture, "");

    let Json(records) = handlers::hospital_data(State(state), list(true)).await;
    let record = records.iter().find(|r| r.name == "仙台北病院").unwrap();
    assert_eq!(record.departments, vec!["小児科"]);
}

#[tokio::test]
async fn test_add_hospital_without_target_is_unavailable() {
    let (_dir, state) = setup(None).await;

    let hospital = NewHospital {
        name: "仙台北病院".to_string(),
        address: "宮城県仙台市泉区".to_string(),
        departments: vec![],
    };
    let result = handlers::add_hospital(State(state), Json(hospital)).await;
    assert!(matches!(result, Err(AppError::Unavailable(_))));
}

#[tokio::test]
async fn test_index_page_lists_cards() {
    let (_dir, state) = setup(None).await;
    state.blocked.block("北海道");

    let page = handlers::index(State(state.clone()), list(true)).await.unwrap();
    assert!(page.0.contains("仙台中央病院"));
    assert!(!page.0.contains("札幌中央病院"));

    let page = handlers::index(State(state), list(false)).await.unwrap();
    assert!(page.0.contains("札幌中央病院"));
}

#[tokio::test]
async fn test_health_reports_loaded_sources() {
    let (_dir, state) = setup(None).await;
    state.blocked.block("北海道");

    let Json(health) = handlers::health_check(State(state)).await;
    assert_eq!(health.status, "ok");
    assert_eq!(health.configured_sources, 2);
    assert_eq!(health.loaded_sources, 2);
    assert_eq!(health.rows, 3);
    assert_eq!(health.blocked_prefectures, 1);
}
