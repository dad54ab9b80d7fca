use predicates::str::contains;

mod common;
use common::{add_employee, count_rows, init_schema, schema_version, scl, setup_test_db};

#[test]
fn test_settings_show_defaults() {
    let db_path = setup_test_db("settings_defaults");
    init_schema(&db_path);

    scl()
        .args(["--db", &db_path, "--test", "settings", "show"])
        .assert()
        .success()
        .stdout(contains("Read-of-record: primary"))
        .stdout(contains("Schema version: 3 (up to date)"));
}

#[test]
fn test_settings_update_is_persisted() {
    let db_path = setup_test_db("settings_persisted");
    init_schema(&db_path);

    scl()
        .args([
            "--db", &db_path, "--test", "settings", "set", "--brand", "Corner Bakery",
            "--currency", "EUR",
        ])
        .assert()
        .success()
        .stdout(contains("Settings updated"));

    scl()
        .args(["--db", &db_path, "--test", "settings", "show"])
        .assert()
        .success()
        .stdout(contains("Corner Bakery"))
        .stdout(contains("EUR"));
}

#[test]
fn test_settings_reject_empty_active_set() {
    let db_path = setup_test_db("settings_no_targets");
    init_schema(&db_path);

    scl()
        .args([
            "--db", &db_path, "--test", "settings", "set", "--primary-active", "false",
        ])
        .assert()
        .failure()
        .stderr(contains("at least one storage target"));
}

/// Full admin flow: attach a secondary target through a settings write,
/// initialize its schema, then watch a mutation land on both targets.
#[test]
fn test_secondary_target_attach_and_replicate() {
    let primary = setup_test_db("settings_attach_primary");
    let secondary = setup_test_db("settings_attach_secondary");
    init_schema(&primary);

    scl()
        .args([
            "--db", &primary, "--test", "settings", "set", "--secondary-host", &secondary,
            "--secondary-active", "true",
        ])
        .assert()
        .success()
        .stdout(contains("Settings updated"));

    scl()
        .args([
            "--db", &primary, "--test", "db", "--init-schema", "--target", "secondary",
        ])
        .assert()
        .success()
        .stdout(contains("secondary"));
    assert_eq!(schema_version(&secondary), 3);

    add_employee(&primary, "Dana Levi", "1001");
    assert_eq!(count_rows(&primary, "employees"), 1);
    assert_eq!(count_rows(&secondary, "employees"), 1);

    scl()
        .args(["--db", &primary, "--test", "clock", "in", "1001"])
        .assert()
        .success();
    assert_eq!(count_rows(&primary, "time_entries"), 1);
    assert_eq!(count_rows(&secondary, "time_entries"), 1);
}

/// Deactivating the configured read-of-record moves the designation to the
/// remaining active target instead of failing.
#[test]
fn test_read_of_record_reassigned_on_deactivation() {
    let primary = setup_test_db("settings_swap_primary");
    let secondary = setup_test_db("settings_swap_secondary");
    init_schema(&primary);

    scl()
        .args([
            "--db", &primary, "--test", "settings", "set", "--secondary-host", &secondary,
            "--secondary-active", "true",
        ])
        .assert()
        .success();
    scl()
        .args([
            "--db", &primary, "--test", "db", "--init-schema", "--target", "secondary",
        ])
        .assert()
        .success();

    add_employee(&primary, "Dana Levi", "1001");

    scl()
        .args([
            "--db", &primary, "--test", "settings", "set", "--primary-active", "false",
        ])
        .assert()
        .success();

    // The settings row on the secondary now designates it as read-of-record.
    let conn = rusqlite::Connection::open(&secondary).expect("open secondary");
    let designated: String = conn
        .query_row(
            "SELECT primary_target FROM settings ORDER BY id LIMIT 1",
            [],
            |r| r.get(0),
        )
        .expect("designation");
    assert_eq!(designated, "secondary");

    // Reads keep working against the new read-of-record.
    scl()
        .args(["--db", &primary, "--db2", &secondary, "--test", "employee", "list"])
        .assert()
        .success()
        .stdout(contains("Dana Levi"));
}

#[test]
fn test_admin_accounts_roundtrip() {
    let db_path = setup_test_db("settings_admins");
    init_schema(&db_path);

    scl()
        .args([
            "--db", &db_path, "--test", "admin", "add", "boss", "--pin-hash",
            "$2b$12$abcdefghijklmnopqrstuv",
        ])
        .assert()
        .success()
        .stdout(contains("Admin account 'boss' saved"));

    scl()
        .args(["--db", &db_path, "--test", "admin", "list"])
        .assert()
        .success()
        .stdout(contains("boss"))
        .stdout(contains("active"));
}

#[test]
fn test_audit_log_records_admin_actions() {
    let db_path = setup_test_db("settings_audit");
    init_schema(&db_path);
    add_employee(&db_path, "Dana Levi", "1001");

    scl()
        .args(["--db", &db_path, "--test", "settings", "set", "--brand", "Corner Bakery"])
        .assert()
        .success();

    scl()
        .args(["--db", &db_path, "--test", "log"])
        .assert()
        .success()
        .stdout(contains("employee_created"))
        .stdout(contains("settings_updated"))
        .stdout(contains("schema_created"));
}
