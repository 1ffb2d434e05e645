#![cfg(feature = "sqlite")]

use sql_proxy::prelude::*;
use sql_proxy::sqlite::rusqlite;
use tempfile::TempDir;
use tracing_test::traced_test;

fn create_schema(dir: &TempDir) -> Result<String, Box<dyn std::error::Error>> {
    let path = dir.path().join("proxy.db");
    let conn = rusqlite::Connection::open(&path)?;
    conn.execute_batch(
        "CREATE TABLE players (id INTEGER PRIMARY KEY, name TEXT NOT NULL, score INTEGER, nick TEXT);",
    )?;
    Ok(path.to_string_lossy().into_owned())
}

fn player(id: i64, name: &str, score: i64) -> MutationRequest {
    MutationRequest::insert(
        "players",
        vec![
            FieldValue::new("id", id.to_string()),
            FieldValue::new("name", name),
            FieldValue::new("score", score.to_string()),
            FieldValue::new("nick", name.to_lowercase()),
        ],
    )
}

fn names(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.get("name").map(str::to_string))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn writes_survive_close_and_reconnect() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = create_schema(&dir)?;
    let credentials = Credentials::sqlite(&path);

    let proxy = SqlProxy::new();
    proxy.connect(&credentials).await?;
    proxy.submit(player(1, "Ada", 10)).await?;
    proxy.submit(player(2, "O'Brien", 20)).await?;
    proxy.submit(player(3, "Grace", 30)).await?;
    proxy
        .submit(
            MutationRequest::update("players", vec![FieldValue::new("score", "99")])
                .with_condition("id", "2"),
        )
        .await?;
    // Drain on close guarantees all four statements are on disk afterwards.
    proxy.close().await?;

    proxy.connect(&credentials).await?;
    let records = proxy
        .query(&QueryRequest::new("players", ["id", "name", "score"]))
        .await?;
    assert_eq!(names(&records), vec!["Ada", "O'Brien", "Grace"]);
    let scores: Vec<&str> = records.iter().filter_map(|r| r.get("score")).collect();
    assert_eq!(scores, vec!["10", "99", "30"]);

    let filtered = proxy
        .query(&QueryRequest::new("players", ["name"]).with_condition("name", "O'Brien"))
        .await?;
    assert_eq!(names(&filtered), vec!["O'Brien"]);
    proxy.close().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn update_without_condition_touches_every_row() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = create_schema(&dir)?;

    let proxy = SqlProxy::new();
    proxy.connect(&Credentials::sqlite(&path)).await?;
    for id in 1..=3 {
        proxy.submit(player(id, &format!("p{id}"), id)).await?;
    }
    proxy
        .submit(MutationRequest::update(
            "players",
            vec![FieldValue::new("score", "0")],
        ))
        .await?;
    proxy.close().await?;

    proxy.connect(&Credentials::sqlite(&path)).await?;
    let records = proxy.query(&QueryRequest::new("players", ["score"])).await?;
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.get("score") == Some("0")));
    proxy.close().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[traced_test]
async fn constraint_violations_only_reach_the_log() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = create_schema(&dir)?;

    let proxy = SqlProxy::new();
    proxy.connect(&Credentials::sqlite(&path)).await?;
    proxy.submit(player(1, "Ada", 10)).await?;
    // Same primary key: accepted by the queue, rejected by SQLite.
    proxy.submit(player(1, "Impostor", 0)).await?;
    proxy.submit(player(2, "Grace", 20)).await?;
    proxy.close().await?;

    let stats = proxy.stats();
    assert_eq!(stats.executed, 2);
    assert_eq!(stats.failed, 1);
    assert!(logs_contain("queued statement failed"));

    let check = rusqlite::Connection::open(&path)?;
    let count: i64 = check.query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))?;
    assert_eq!(count, 2);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn null_values_fail_the_read() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = create_schema(&dir)?;
    {
        let conn = rusqlite::Connection::open(&path)?;
        conn.execute("INSERT INTO players (id, name) VALUES (1, 'Ada')", [])?;
    }

    let proxy = SqlProxy::new();
    proxy.connect(&Credentials::sqlite(&path)).await?;
    let ok = proxy.query(&QueryRequest::new("players", ["name"])).await?;
    assert_eq!(names(&ok), vec!["Ada"]);

    let result = proxy
        .query(&QueryRequest::new("players", ["name", "score"]))
        .await;
    assert!(matches!(
        result,
        Err(SqlProxyError::ScanError { row: 0, ref column, .. }) if column == "score"
    ));
    proxy.close().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn query_errors_from_sqlite_are_returned() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = create_schema(&dir)?;

    let proxy = SqlProxy::new();
    proxy.connect(&Credentials::sqlite(&path)).await?;
    let result = proxy.query(&QueryRequest::new("no_such_table", ["x"])).await;
    assert!(result.is_err());
    assert!(proxy.is_connected());
    proxy.close().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_connect_leaves_the_proxy_disconnected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("missing").join("nested").join("proxy.db");

    let proxy = SqlProxy::new();
    let result = proxy
        .connect(&Credentials::sqlite(missing.to_string_lossy()))
        .await;
    assert!(result.is_err());
    assert!(!proxy.is_connected());
    assert!(matches!(
        proxy.submit(player(1, "Ada", 1)).await,
        Err(SqlProxyError::NotConnected)
    ));

    let empty = proxy.connect(&Credentials::sqlite("")).await;
    assert!(matches!(empty, Err(SqlProxyError::ConfigError(_))));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn closed_sqlite_connection_refuses_further_work() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = create_schema(&dir)?;

    let conn = SqliteConnection::open(&path).await?;
    let insert = build_insert(
        "players",
        &[FieldValue::new("id", "1"), FieldValue::new("name", "Ada")],
    )?;
    assert_eq!(conn.execute(&insert).await?, 1);

    conn.close().await?;
    // A second close (and the eventual drop) does not send another shutdown.
    conn.close().await?;

    let select = build_select("players", &["name"], None)?;
    assert!(matches!(
        conn.query(&select).await,
        Err(SqlProxyError::ConnectionError(_))
    ));
    assert!(matches!(
        conn.execute(&insert).await,
        Err(SqlProxyError::ConnectionError(_))
    ));
    drop(conn);

    let check = rusqlite::Connection::open(&path)?;
    let count: i64 = check.query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))?;
    assert_eq!(count, 1);
    Ok(())
}
