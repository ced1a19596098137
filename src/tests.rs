//! Integration tests for the kanban backend and its typed client.
//!
//! Each test spins up the real router on an ephemeral port and drives it
//! through the client services and controllers.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::client::{
    resolve_entity, BoardFormValue, BoardUpdateController, CardUpdateController, ClientError,
    EntityPage, EntityService, FilterOptions, LineUpdateController, ListController, ListQuery,
    Resolved, SortState,
};
use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::models::{
    Board, BoardRef, Card, CardPayload, Line, LinePayload, LineRef, NewBoard, NewCard, NewLine,
};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        // Create config
        let config = Config {
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
        };

        let state = AppState {
            repo,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn boards(&self) -> EntityService<Board> {
        EntityService::new(self.client.clone(), &self.base_url)
    }

    fn lines(&self) -> EntityService<Line> {
        EntityService::new(self.client.clone(), &self.base_url)
    }

    fn cards(&self) -> EntityService<Card> {
        EntityService::new(self.client.clone(), &self.base_url)
    }

    async fn seed_board(&self, title: &str) -> Board {
        self.boards()
            .create(&NewBoard {
                title: Some(title.to_string()),
            })
            .await
            .expect("Failed to create board")
    }

    async fn seed_line(&self, title: &str, board: Option<&Board>) -> Line {
        self.lines()
            .create(&NewLine {
                title: Some(title.to_string()),
                board: board.cloned(),
            })
            .await
            .expect("Failed to create line")
    }

    async fn seed_card(&self, title: &str, level: Option<i32>, line: Option<&Line>) -> Card {
        self.cards()
            .create(&NewCard {
                title: Some(title.to_string()),
                level,
                desc: None,
                line: line.map(|l| LineRef { id: l.id }),
            })
            .await
            .expect("Failed to create card")
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_board_crud_lifecycle() {
    let fixture = TestFixture::new().await;
    let boards = fixture.boards();

    let created = boards
        .create(&NewBoard {
            title: Some("sprint 1".to_string()),
        })
        .await
        .unwrap();
    assert!(created.id > 0);
    assert_eq!(created.title.as_deref(), Some("sprint 1"));

    let fetched = boards.find(created.id).await.unwrap();
    assert_eq!(fetched, created);

    let updated = boards
        .update(&Board {
            id: created.id,
            title: Some("sprint 2".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title.as_deref(), Some("sprint 2"));

    boards.delete(created.id).await.unwrap();
    assert!(matches!(
        boards.find(created.id).await,
        Err(ClientError::NotFound)
    ));
}

#[tokio::test]
async fn test_create_returns_created_with_location() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/boards"))
        .json(&json!({ "title": "backlog" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 201);
    let location = resp.headers()["location"].to_str().unwrap().to_string();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(location, format!("/api/boards/{}", body["id"]));
}

#[tokio::test]
async fn test_create_rejects_existing_id() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/boards"))
        .json(&json!({ "id": 7, "title": "smuggled" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_update_rejects_id_mismatch() {
    let fixture = TestFixture::new().await;
    let board = fixture.seed_board("original").await;

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/boards/{}", board.id)))
        .json(&json!({ "id": board.id + 1, "title": "renamed" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_update_missing_entity_is_not_found() {
    let fixture = TestFixture::new().await;

    let result = fixture
        .boards()
        .update(&Board {
            id: 424242,
            title: Some("ghost".to_string()),
        })
        .await;

    assert!(matches!(result, Err(ClientError::NotFound)));
}

#[tokio::test]
async fn test_delete_missing_entity_is_no_content() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .delete(fixture.url("/api/boards/424242"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 204);
}

#[tokio::test]
async fn test_partial_update_leaves_absent_fields_untouched() {
    let fixture = TestFixture::new().await;
    let card = fixture.seed_card("review PR", Some(3), None).await;

    let patched = fixture
        .cards()
        .partial_update(&CardPayload {
            id: Some(card.id),
            desc: Some("waiting on CI".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(patched.title.as_deref(), Some("review PR"));
    assert_eq!(patched.level, Some(3));
    assert_eq!(patched.desc.as_deref(), Some("waiting on CI"));
}

#[tokio::test]
async fn test_full_update_clears_omitted_fields() {
    let fixture = TestFixture::new().await;
    let card = fixture.seed_card("triage", Some(2), None).await;

    let updated = fixture
        .cards()
        .update(&Card {
            id: card.id,
            title: Some("triage".to_string()),
            level: None,
            desc: None,
            line: None,
        })
        .await
        .unwrap();

    assert_eq!(updated.level, None);
    let fetched = fixture.cards().find(card.id).await.unwrap();
    assert_eq!(fetched.level, None);
}

#[tokio::test]
async fn test_line_nests_its_board() {
    let fixture = TestFixture::new().await;
    let board = fixture.seed_board("product").await;
    let line = fixture.seed_line("in progress", Some(&board)).await;

    let fetched = fixture.lines().find(line.id).await.unwrap();
    assert_eq!(fetched.board, Some(board));
}

#[tokio::test]
async fn test_list_pagination_and_total_count() {
    let fixture = TestFixture::new().await;
    for i in 1..=25 {
        fixture.seed_board(&format!("board {:02}", i)).await;
    }

    let boards = fixture.boards();
    let first = boards
        .query(&ListQuery {
            page: Some(0),
            size: Some(20),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(first.items.len(), 20);
    assert_eq!(first.total_count, 25);

    let second = boards
        .query(&ListQuery {
            page: Some(1),
            size: Some(20),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(second.items.len(), 5);
    assert_eq!(second.total_count, 25);
}

#[tokio::test]
async fn test_list_sorting() {
    let fixture = TestFixture::new().await;
    for title in ["banana", "apple", "cherry"] {
        fixture.seed_board(title).await;
    }

    let page = fixture
        .boards()
        .query(&ListQuery {
            sort: vec!["title,DESC".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();

    let titles: Vec<&str> = page
        .items
        .iter()
        .filter_map(|b| b.title.as_deref())
        .collect();
    assert_eq!(titles, vec!["cherry", "banana", "apple"]);
}

#[tokio::test]
async fn test_line_list_sorting_with_joined_board() {
    let fixture = TestFixture::new().await;
    let board = fixture.seed_board("product").await;
    for title in ["done", "backlog", "doing"] {
        fixture.seed_line(title, Some(&board)).await;
    }

    // Line listings join the boards table, which shares the id and title
    // column names; sorting must still resolve to the line columns.
    let page = fixture
        .lines()
        .query(&ListQuery {
            sort: vec!["title,ASC".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();

    let titles: Vec<&str> = page
        .items
        .iter()
        .filter_map(|l| l.title.as_deref())
        .collect();
    assert_eq!(titles, vec!["backlog", "doing", "done"]);

    let by_id = fixture
        .lines()
        .query(&ListQuery {
            sort: vec!["id,DESC".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_id.items[0].title.as_deref(), Some("doing"));
}

#[tokio::test]
async fn test_criteria_filters() {
    let fixture = TestFixture::new().await;
    let line = fixture.seed_line("doing", None).await;
    fixture.seed_card("fix login bug", Some(1), Some(&line)).await;
    fixture.seed_card("write docs", Some(4), Some(&line)).await;
    fixture.seed_card("fix logout bug", Some(5), None).await;

    let cards = fixture.cards();

    let contains = cards
        .query(&ListQuery {
            filters: vec![("title.contains".to_string(), "bug".to_string())],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(contains.total_count, 2);

    let level = cards
        .query(&ListQuery {
            filters: vec![("level.greaterThan".to_string(), "3".to_string())],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(level.total_count, 2);

    let unassigned = cards
        .query(&ListQuery {
            filters: vec![("lineId.specified".to_string(), "false".to_string())],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(unassigned.total_count, 1);
    assert_eq!(unassigned.items[0].title.as_deref(), Some("fix logout bug"));

    let scoped = cards
        .query(&ListQuery {
            filters: vec![("lineId.equals".to_string(), line.id.to_string())],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(scoped.total_count, 2);
}

#[tokio::test]
async fn test_unknown_filter_field_is_bad_request() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/boards?color.equals=red"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .get(fixture.url("/api/boards?sort=color,asc"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_board_scoped_card_listing() {
    let fixture = TestFixture::new().await;
    let ours = fixture.seed_board("ours").await;
    let theirs = fixture.seed_board("theirs").await;
    let our_line = fixture.seed_line("todo", Some(&ours)).await;
    let their_line = fixture.seed_line("todo", Some(&theirs)).await;
    fixture.seed_card("our card", None, Some(&our_line)).await;
    fixture
        .seed_card("their card", None, Some(&their_line))
        .await;

    let page = fixture
        .cards()
        .query(&ListQuery {
            filters: vec![("boardId.equals".to_string(), ours.id.to_string())],
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].title.as_deref(), Some("our card"));
}

#[tokio::test]
async fn test_list_controller_navigation_round_trip() {
    let fixture = TestFixture::new().await;
    let board = fixture.seed_board("big board").await;
    let line = fixture.seed_line("todo", Some(&board)).await;
    for i in 1..=25 {
        fixture
            .seed_card(&format!("card {:02}", i), None, Some(&line))
            .await;
    }

    let mut controller = ListController::new(fixture.cards(), SortState::new("id", true))
        .scoped(vec![("boardId.equals".to_string(), board.id.to_string())]);

    // UI page 2 with a 20-item page size maps to wire page index 1.
    let params = vec![
        ("page".to_string(), "2".to_string()),
        ("sort".to_string(), "title,desc".to_string()),
    ];
    controller.handle_navigation(&params).await.unwrap();

    let wire = controller.wire_query();
    assert_eq!(wire.page, Some(1));
    assert_eq!(wire.sort, vec!["title,DESC".to_string()]);

    assert_eq!(controller.state.page, 2);
    assert_eq!(controller.total_items, 25);
    assert_eq!(controller.items.len(), 5);
    // Descending by title, the second page starts at "card 05".
    assert_eq!(controller.items[0].title.as_deref(), Some("card 05"));
    assert_eq!(controller.items[4].title.as_deref(), Some("card 01"));
}

#[tokio::test]
async fn test_list_controller_emits_navigation_params() {
    let fixture = TestFixture::new().await;
    let mut controller = ListController::new(fixture.boards(), SortState::new("id", true));
    controller
        .handle_navigation(&[("sort".to_string(), "title,asc".to_string())])
        .await
        .unwrap();

    // Re-selecting the current predicate flips the direction.
    let params = controller.sort_navigation("title");
    assert!(params.contains(&("sort".to_string(), "title,desc".to_string())));

    let params = controller.page_navigation(3);
    assert!(params.contains(&("page".to_string(), "3".to_string())));
    assert!(params.contains(&("sort".to_string(), "title,asc".to_string())));

    // A filter change resets to page 1.
    let filters = FilterOptions::from_params(&[(
        "title.contains".to_string(),
        "bug".to_string(),
    )]);
    let params = controller.filter_navigation(&filters);
    assert!(params.contains(&("page".to_string(), "1".to_string())));
    assert!(params.contains(&("title.contains".to_string(), "bug".to_string())));
}

#[tokio::test]
async fn test_list_controller_discards_stale_response() {
    let fixture = TestFixture::new().await;
    fixture.seed_board("only board").await;

    let boards = fixture.boards();
    let mut controller = ListController::new(fixture.boards(), SortState::new("id", true));

    let stale = controller.begin_load();
    let latest = controller.begin_load();

    let page = boards.query(&ListQuery::default()).await.unwrap();
    assert!(controller.apply(latest, page.clone()));
    assert_eq!(controller.total_items, 1);

    // A response for the superseded load must not overwrite newer state.
    let empty: EntityPage<Board> = EntityPage {
        items: Vec::new(),
        total_count: 0,
    };
    assert!(!controller.apply(stale, empty));
    assert_eq!(controller.total_items, 1);
    assert_eq!(controller.items.len(), 1);
}

#[tokio::test]
async fn test_resolver_outcomes() {
    let fixture = TestFixture::new().await;
    let board = fixture.seed_board("resolved").await;
    let boards = fixture.boards();

    assert_eq!(
        resolve_entity(&boards, None).await.unwrap(),
        Resolved::New
    );
    assert_eq!(
        resolve_entity(&boards, Some(board.id)).await.unwrap(),
        Resolved::Entity(board)
    );
    assert!(matches!(
        resolve_entity(&boards, Some(424242)).await,
        Err(ClientError::NotFound)
    ));
}

#[tokio::test]
async fn test_save_protocol_routes_create_then_update() {
    let fixture = TestFixture::new().await;

    let mut controller = BoardUpdateController::new(fixture.client.clone(), &fixture.base_url);
    controller.init(Resolved::New);
    assert!(matches!(controller.form.value(), BoardFormValue::New(_)));

    // First save: draft with a null identifier goes through create.
    controller.form.title = Some("fresh".to_string());
    controller.save().await.unwrap();
    assert!(!controller.is_saving);

    let page = fixture.boards().query(&ListQuery::default()).await.unwrap();
    assert_eq!(page.total_count, 1);
    let created = page.items[0].clone();

    // Editing the persisted record must route through update, not create.
    let resolved = resolve_entity(&fixture.boards(), Some(created.id))
        .await
        .unwrap();
    controller.init(resolved);
    controller.form.title = Some("renamed".to_string());
    controller.save().await.unwrap();

    let page = fixture.boards().query(&ListQuery::default()).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].id, created.id);
    assert_eq!(page.items[0].title.as_deref(), Some("renamed"));
}

#[tokio::test]
async fn test_save_failure_resets_saving_flag_without_navigation() {
    let fixture = TestFixture::new().await;

    let mut controller = BoardUpdateController::new(fixture.client.clone(), &fixture.base_url);
    controller.init(Resolved::Entity(Board {
        id: 424242,
        title: Some("ghost".to_string()),
    }));

    let result = controller.save().await;
    assert!(matches!(result, Err(ClientError::NotFound)));
    assert!(!controller.is_saving);
}

#[tokio::test]
async fn test_line_controller_populates_board_picker() {
    let fixture = TestFixture::new().await;
    // 25 boards: the default picker query only returns the first page of 20.
    let mut last = None;
    for i in 1..=25 {
        last = Some(fixture.seed_board(&format!("board {:02}", i)).await);
    }
    let off_page_board = last.unwrap();
    let line = fixture.seed_line("todo", Some(&off_page_board)).await;

    let mut controller = LineUpdateController::new(fixture.client.clone(), &fixture.base_url);
    let resolved = resolve_entity(&fixture.lines(), Some(line.id)).await.unwrap();
    controller.init(resolved).await.unwrap();

    // The line's own board is prepended even though it fell off the page,
    // and appears exactly once.
    assert_eq!(controller.boards_shared_collection.len(), 21);
    assert_eq!(controller.boards_shared_collection[0].id, off_page_board.id);
    let occurrences = controller
        .boards_shared_collection
        .iter()
        .filter(|b| b.id == off_page_board.id)
        .count();
    assert_eq!(occurrences, 1);
}

#[tokio::test]
async fn test_card_controller_saves_line_reference() {
    let fixture = TestFixture::new().await;
    let board = fixture.seed_board("product").await;
    let line = fixture.seed_line("doing", Some(&board)).await;

    let mut controller = CardUpdateController::new(fixture.client.clone(), &fixture.base_url);
    controller.init(Resolved::New).await.unwrap();
    assert_eq!(controller.lines_shared_collection.len(), 1);

    controller.form.title = Some("hook up picker".to_string());
    controller.form.line = Some(LineRef { id: line.id });
    controller.save().await.unwrap();

    let page = fixture
        .cards()
        .query(&ListQuery {
            filters: vec![("lineId.equals".to_string(), line.id.to_string())],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].line, Some(LineRef { id: line.id }));
}

#[tokio::test]
async fn test_partial_update_moves_line_between_boards() {
    let fixture = TestFixture::new().await;
    let first = fixture.seed_board("first").await;
    let second = fixture.seed_board("second").await;
    let line = fixture.seed_line("movable", Some(&first)).await;

    let patched = fixture
        .lines()
        .partial_update(&LinePayload {
            id: Some(line.id),
            board: Some(BoardRef { id: second.id }),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(patched.title.as_deref(), Some("movable"));
    assert_eq!(patched.board.as_ref().map(|b| b.id), Some(second.id));
}
