use chrono::{Duration, Utc};
use predicates::str::contains;
use shopclock::db::coordinator::Coordinator;
use shopclock::db::migrate;
use shopclock::db::queries;
use shopclock::errors::AppError;
use shopclock::models::employee::NewEmployee;
use shopclock::models::target::TargetKey;
use shopclock::{clock, store};

mod common;
use common::{add_employee, init_schema, manager, registry_for, scl, setup_test_db};

#[test]
fn test_clock_in_out_roundtrip() {
    let db_path = setup_test_db("clock_roundtrip");
    init_schema(&db_path);
    add_employee(&db_path, "Dana Levi", "1001");

    scl()
        .args(["--db", &db_path, "--test", "clock", "in", "1001"])
        .assert()
        .success()
        .stdout(contains("clocked in"));

    scl()
        .args(["--db", &db_path, "--test", "clock", "status", "1001"])
        .assert()
        .success()
        .stdout(contains("on shift"));

    scl()
        .args(["--db", &db_path, "--test", "clock", "out", "1001"])
        .assert()
        .success()
        .stdout(contains("clocked out"));

    scl()
        .args(["--db", &db_path, "--test", "clock", "status", "1001"])
        .assert()
        .success()
        .stdout(contains("off shift"));
}

#[test]
fn test_double_clock_in_keeps_single_open_entry() {
    let db_path = setup_test_db("clock_double_in");
    init_schema(&db_path);
    add_employee(&db_path, "Dana Levi", "1001");

    scl()
        .args(["--db", &db_path, "--test", "clock", "in", "1001"])
        .assert()
        .success()
        .stdout(contains("clocked in"));

    scl()
        .args(["--db", &db_path, "--test", "clock", "in", "1001"])
        .assert()
        .success()
        .stdout(contains("already on an open shift"));

    let conn = rusqlite::Connection::open(&db_path).expect("open db");
    let open: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM time_entries WHERE clock_out IS NULL",
            [],
            |r| r.get(0),
        )
        .expect("count open entries");
    assert_eq!(open, 1);
}

#[test]
fn test_clock_out_without_open_shift() {
    let db_path = setup_test_db("clock_not_in");
    init_schema(&db_path);
    add_employee(&db_path, "Dana Levi", "1001");

    scl()
        .args(["--db", &db_path, "--test", "clock", "out", "1001"])
        .assert()
        .success()
        .stdout(contains("not on an open shift"));
}

#[test]
fn test_device_mismatch_is_reported_not_blocking() {
    let db_path = setup_test_db("clock_device_mismatch");
    init_schema(&db_path);
    add_employee(&db_path, "Dana Levi", "1001");

    scl()
        .args([
            "--db", &db_path, "--test", "clock", "in", "1001", "--device", "kiosk-1",
        ])
        .assert()
        .success();

    scl()
        .args([
            "--db", &db_path, "--test", "clock", "out", "1001", "--device", "kiosk-2", "--json",
        ])
        .assert()
        .success()
        .stdout(contains("\"status\": \"clocked_out\""))
        .stdout(contains("\"device_match\": false"));
}

#[test]
fn test_clock_out_reports_duration() {
    let db_path = setup_test_db("clock_duration");
    let registry = registry_for(&db_path, None);
    let manager = manager();
    let conn = manager.open(registry.read_target()).expect("open primary");
    migrate::ensure_schema(&conn, TargetKey::Primary, &registry).expect("schema");

    let co = Coordinator::new(&registry, &manager);
    let new = NewEmployee {
        name: "Dana Levi".to_string(),
        code: "1001".to_string(),
        external_id: None,
        hourly_rate: 50.0,
        active: true,
    };
    let employee = store::create_employee(&co, "admin", &new).expect("create").value;

    // Backdate the open entry so the computed duration is meaningful.
    let started = Utc::now() - Duration::minutes(120);
    queries::insert_open_entry(&conn, employee.id, &started, Some("kiosk-1"))
        .expect("open entry");

    let result = clock::clock_out(&co, "1001", Some("kiosk-2")).expect("clock out");
    assert_eq!(result.value.status, clock::ClockStatus::ClockedOut);
    assert_eq!(result.value.device_match, Some(false));
    assert!(
        result.value.message.contains("120 min"),
        "unexpected message: {}",
        result.value.message
    );
}

#[test]
fn test_unknown_employee_is_an_error() {
    let db_path = setup_test_db("clock_unknown");
    init_schema(&db_path);

    scl()
        .args(["--db", &db_path, "--test", "clock", "in", "9999"])
        .assert()
        .failure()
        .stderr(contains("No active employee"));
}

#[test]
fn test_manual_entry_rejects_inverted_times() {
    let db_path = setup_test_db("entry_inverted");
    init_schema(&db_path);
    add_employee(&db_path, "Dana Levi", "1001");

    scl()
        .args([
            "--db",
            &db_path,
            "--test",
            "entry",
            "add",
            "1001",
            "--in",
            "2026-08-06 17:00",
            "--out",
            "2026-08-06 09:00",
        ])
        .assert()
        .failure()
        .stderr(contains("clock-out must be after clock-in"));
}

#[test]
fn test_manual_entry_and_edit_roundtrip() {
    let db_path = setup_test_db("entry_roundtrip");
    init_schema(&db_path);
    add_employee(&db_path, "Dana Levi", "1001");

    scl()
        .args([
            "--db",
            &db_path,
            "--test",
            "entry",
            "add",
            "1001",
            "--in",
            "2026-08-06 09:00",
            "--out",
            "2026-08-06 17:00",
            "--admin",
            "boss",
        ])
        .assert()
        .success()
        .stdout(contains("Manual entry"));

    let conn = rusqlite::Connection::open(&db_path).expect("open db");
    let (id, manual): (i64, i64) = conn
        .query_row("SELECT id, manual FROM time_entries LIMIT 1", [], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .expect("entry row");
    assert_eq!(manual, 1);

    scl()
        .args([
            "--db",
            &db_path,
            "--test",
            "entry",
            "edit",
            &id.to_string(),
            "--out",
            "2026-08-06 18:30",
            "--admin",
            "boss",
        ])
        .assert()
        .success()
        .stdout(contains("updated"));

    scl()
        .args([
            "--db",
            &db_path,
            "--test",
            "entry",
            "del",
            &id.to_string(),
            "--admin",
            "boss",
        ])
        .assert()
        .success()
        .stdout(contains("deleted"));
}

#[test]
fn test_manual_entry_gated_on_stale_schema() {
    let db_path = setup_test_db("entry_schema_gate");

    // Hand-build a revision-1 database: base tables, no device columns, no
    // replication columns, version stamped below current.
    let conn = rusqlite::Connection::open(&db_path).expect("open db");
    conn.execute_batch(
        r#"
        CREATE TABLE employees (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            code        TEXT NOT NULL UNIQUE,
            external_id TEXT,
            hourly_rate REAL NOT NULL DEFAULT 0,
            active      INTEGER NOT NULL DEFAULT 1
        );
        CREATE TABLE time_entries (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id INTEGER NOT NULL,
            clock_in    TEXT NOT NULL,
            clock_out   TEXT,
            manual      INTEGER NOT NULL DEFAULT 0
        );
        CREATE TABLE settings (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            currency       TEXT NOT NULL DEFAULT 'ILS',
            pin_hash       TEXT,
            db_host        TEXT,
            db_port        INTEGER,
            db_user        TEXT,
            db_secret      TEXT,
            schema_version INTEGER NOT NULL DEFAULT 1
        );
        CREATE TABLE audit_log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            at        TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        INSERT INTO settings (currency, schema_version) VALUES ('ILS', 1);
        INSERT INTO employees (name, code) VALUES ('Dana Levi', '1001');
        "#,
    )
    .expect("v1 schema");
    drop(conn);

    let registry = registry_for(&db_path, None);
    let manager = manager();
    let co = Coordinator::new(&registry, &manager);

    let t_in = Utc::now() - Duration::hours(8);
    let t_out = Utc::now() - Duration::hours(1);
    let err = clock::add_manual_entry(&co, "boss", "1001", t_in, t_out)
        .expect_err("gate should reject");
    assert!(matches!(err, AppError::SchemaGate));
}
