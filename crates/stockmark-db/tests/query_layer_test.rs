//! Integration tests for read paths, deletion and tag resolution.
//!
//! Requires a PostgreSQL server at DATABASE_URL; run with `cargo test -- --ignored`.

use stockmark_db::test_fixtures::{stock_request, TestDatabase};
use stockmark_db::{Error, ErrorKind, StockRepository, TagRepository};

async fn setup() -> TestDatabase {
    dotenvy::dotenv().ok();
    TestDatabase::new().await
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_resolve_is_stable_across_transactions() {
    let test_db = setup().await;
    let db = &test_db.db;

    let first = db.tags.resolve("dividend").await.unwrap();
    let second = db.tags.resolve("dividend").await.unwrap();
    assert_eq!(first, second);

    let other = db.tags.resolve("Dividend").await.unwrap();
    assert_ne!(first, other);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_resolve_accepts_empty_name() {
    let test_db = setup().await;
    let db = &test_db.db;

    let first = db.tags.resolve("").await.unwrap();
    let second = db.tags.resolve("").await.unwrap();
    assert_eq!(first, second);

    let tags = db.tags.list().await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_fetch_by_symbol() {
    let test_db = setup().await;
    let db = &test_db.db;

    let nvda = db
        .stocks
        .create(stock_request("NVDA", &["chips", "ai"]))
        .await
        .unwrap();
    db.stocks
        .create(stock_request("AMD", &["chips"]))
        .await
        .unwrap();

    let fetched = db.stocks.fetch_by_symbol("NVDA").await.unwrap();
    assert_eq!(fetched.id, nvda.id);
    assert_eq!(fetched.tag_names(), vec!["ai", "chips"]);

    // Symbols match exactly.
    let err = db.stocks.fetch_by_symbol("nvda").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_fetch_by_symbol_prefers_oldest_duplicate() {
    let test_db = setup().await;
    let db = &test_db.db;

    let older = db
        .stocks
        .create(stock_request("BRK", &["value"]))
        .await
        .unwrap();
    db.stocks.create(stock_request("BRK", &[])).await.unwrap();

    let fetched = db.stocks.fetch_by_symbol("BRK").await.unwrap();
    assert_eq!(fetched.id, older.id);
    assert_eq!(fetched.tag_names(), vec!["value"]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_list_by_tags_matches_any_name() {
    let test_db = setup().await;
    let db = &test_db.db;

    db.stocks
        .create(stock_request("XOM", &["energy", "dividend"]))
        .await
        .unwrap();
    db.stocks
        .create(stock_request("JNJ", &["dividend", "health"]))
        .await
        .unwrap();
    db.stocks
        .create(stock_request("TSLA", &["ev"]))
        .await
        .unwrap();

    let filter = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();

    let stocks = db
        .stocks
        .list_by_tags(&filter(&["dividend", "energy"]))
        .await
        .unwrap();
    let symbols: Vec<&str> = stocks.iter().map(|s| s.symbol.as_str()).collect();
    // XOM matches both names and is still listed once.
    assert_eq!(symbols, vec!["JNJ", "XOM"]);
    // Matched stocks keep their full tag set.
    assert_eq!(stocks[0].tag_names(), vec!["dividend", "health"]);

    let none = db
        .stocks
        .list_by_tags(&filter(&["crypto"]))
        .await
        .unwrap();
    assert!(none.is_empty());

    assert!(db.stocks.list_by_tags(&[]).await.unwrap().is_empty());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_list_orders_by_symbol_with_tags() {
    let test_db = setup().await;
    let db = &test_db.db;

    db.stocks
        .create(stock_request("MSFT", &["tech"]))
        .await
        .unwrap();
    db.stocks
        .create(stock_request("AAPL", &["tech", "consumer"]))
        .await
        .unwrap();
    db.stocks.create(stock_request("KO", &[])).await.unwrap();

    let stocks = db.stocks.list().await.unwrap();
    let symbols: Vec<&str> = stocks.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["AAPL", "KO", "MSFT"]);

    assert_eq!(stocks[0].tag_names(), vec!["consumer", "tech"]);
    assert!(stocks[1].tags.is_empty());
    assert_eq!(stocks[2].tag_names(), vec!["tech"]);

    let tags = db.tags.list().await.unwrap();
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["consumer", "tech"]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_fetch_missing_stock_is_not_found() {
    let test_db = setup().await;

    let err = test_db.db.stocks.fetch(424_242).await.unwrap_err();
    assert!(matches!(err, Error::StockNotFound(424_242)));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_cascades_only_own_associations() {
    let test_db = setup().await;
    let db = &test_db.db;

    let doomed = db
        .stocks
        .create(stock_request("META", &["social", "tech"]))
        .await
        .unwrap();
    let kept = db
        .stocks
        .create(stock_request("GOOG", &["tech"]))
        .await
        .unwrap();

    assert_eq!(db.stocks.delete(doomed.id).await.unwrap(), 1);

    let stocks = db.stocks.list().await.unwrap();
    assert_eq!(stocks.len(), 1);
    assert_eq!(stocks[0].id, kept.id);
    assert_eq!(stocks[0].tag_names(), vec!["tech"]);

    assert!(db.tags.list_for_stock(doomed.id).await.unwrap().is_empty());
    let junction_rows: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM stock_tags WHERE stock_id = $1")
            .bind(doomed.id)
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert_eq!(junction_rows, 0);

    // Tags are never deleted by stock deletion.
    assert_eq!(db.tags.list().await.unwrap().len(), 2);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_unknown_stock_is_noop() {
    let test_db = setup().await;

    let removed = test_db.db.stocks.delete(31_337).await.unwrap();
    assert_eq!(removed, 0);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_list_for_stock_orders_by_name() {
    let test_db = setup().await;
    let db = &test_db.db;

    let stock = db
        .stocks
        .create(stock_request("V", &["payments", "finance", "moat"]))
        .await
        .unwrap();

    let tags = db.tags.list_for_stock(stock.id).await.unwrap();
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["finance", "moat", "payments"]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_schema_bootstrap_is_idempotent() {
    let test_db = setup().await;
    let db = &test_db.db;

    db.stocks
        .create(stock_request("SAP", &["erp"]))
        .await
        .unwrap();

    db.ensure_schema().await.expect("second bootstrap failed");
    assert_eq!(db.stocks.list().await.unwrap().len(), 1);

    test_db.cleanup().await;
}
