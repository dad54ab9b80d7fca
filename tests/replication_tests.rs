use shopclock::db::coordinator::Coordinator;
use shopclock::db::migrate::{self, CURRENT_VERSION};
use shopclock::models::employee::NewEmployee;
use shopclock::models::target::{TargetKey, TargetSelector};
use shopclock::{clock, store};

mod common;
use common::{count_rows, manager, registry_for, setup_test_db};

fn new_employee(code: &str) -> NewEmployee {
    NewEmployee {
        name: "Dana Levi".to_string(),
        code: code.to_string(),
        external_id: Some("00042".to_string()),
        hourly_rate: 50.0,
        active: true,
    }
}

#[test]
fn test_mutation_replicates_to_both_targets() {
    let primary = setup_test_db("repl_primary");
    let secondary = setup_test_db("repl_secondary");
    let registry = registry_for(&primary, Some(&secondary));
    let manager = manager();

    let outcomes = migrate::ensure_schema_selector(&manager, &registry, TargetSelector::Both);
    assert!(outcomes.iter().all(|o| o.ok));

    let co = Coordinator::new(&registry, &manager);
    let result = store::create_employee(&co, "admin", &new_employee("1001")).expect("create");
    assert!(result.warnings.is_empty());

    clock::clock_in(&co, "1001", Some("kiosk-1")).expect("clock in");

    assert_eq!(count_rows(&primary, "employees"), 1);
    assert_eq!(count_rows(&secondary, "employees"), 1);
    assert_eq!(count_rows(&primary, "time_entries"), 1);
    assert_eq!(count_rows(&secondary, "time_entries"), 1);

    // Field-level equality of the replicated employee row.
    for path in [&primary, &secondary] {
        let conn = rusqlite::Connection::open(path).expect("open db");
        let (name, code, external_id, rate): (String, String, String, f64) = conn
            .query_row(
                "SELECT name, code, external_id, hourly_rate FROM employees",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .expect("employee row");
        assert_eq!(name, "Dana Levi");
        assert_eq!(code, "1001");
        assert_eq!(external_id, "00042");
        assert_eq!(rate, 50.0);
    }

    // Clock-in timestamps were fixed once at the call boundary, so the rows
    // are byte-identical on both targets.
    let read = |path: &str| -> String {
        let conn = rusqlite::Connection::open(path).expect("open db");
        conn.query_row("SELECT clock_in FROM time_entries", [], |r| r.get(0))
            .expect("clock_in")
    };
    assert_eq!(read(&primary), read(&secondary));
}

#[test]
fn test_read_of_record_failure_aborts_before_fanout() {
    let primary = "/nonexistent_shopclock_dir/repl_dead_primary.sqlite";
    let secondary = setup_test_db("repl_live_secondary");
    let registry = registry_for(primary, Some(&secondary));
    let manager = manager();

    // Prepare the secondary so a fan-out write would succeed if attempted.
    let conn = manager
        .open(registry.target(TargetKey::Secondary))
        .expect("open secondary");
    migrate::ensure_schema(&conn, TargetKey::Secondary, &registry).expect("schema");
    drop(conn);

    let co = Coordinator::new(&registry, &manager);
    let err = store::create_employee(&co, "admin", &new_employee("1001"));
    assert!(err.is_err(), "write must fail when the read target is down");

    // The secondary was never touched.
    assert_eq!(count_rows(&secondary, "employees"), 0);
}

#[test]
fn test_replica_failure_degrades_to_warning() {
    let primary = setup_test_db("repl_live_primary");
    let secondary = "/nonexistent_shopclock_dir/repl_dead_secondary.sqlite";
    let registry = registry_for(&primary, Some(secondary));
    let manager = manager();

    let conn = manager
        .open(registry.target(TargetKey::Primary))
        .expect("open primary");
    migrate::ensure_schema(&conn, TargetKey::Primary, &registry).expect("schema");
    drop(conn);

    let co = Coordinator::new(&registry, &manager);
    let result = store::create_employee(&co, "admin", &new_employee("1001")).expect("create");

    assert_eq!(result.value.code, "1001");
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].target, TargetKey::Secondary);
    assert_eq!(count_rows(&primary, "employees"), 1);
}

#[test]
fn test_deactivated_read_target_is_redesignated() {
    let primary = setup_test_db("repl_swap_primary");
    let secondary = setup_test_db("repl_swap_secondary");
    let mut registry = registry_for(&primary, Some(&secondary));
    let manager = manager();

    let outcomes = migrate::ensure_schema_selector(&manager, &registry, TargetSelector::Both);
    assert!(outcomes.iter().all(|o| o.ok));

    {
        let co = Coordinator::new(&registry, &manager);
        store::create_employee(&co, "admin", &new_employee("1001")).expect("create");
    }

    // Deactivate the current read-of-record; the designation must move.
    let mut new_primary = registry.target(TargetKey::Primary).clone();
    new_primary.active = false;
    let new_secondary = registry.target(TargetKey::Secondary).clone();
    let reassigned = registry
        .set_configuration(new_primary, new_secondary, TargetKey::Primary)
        .expect("reconfigure");
    assert!(reassigned);
    assert_eq!(registry.designated(), TargetKey::Secondary);

    // Reads keep working, now served from the secondary.
    let co = Coordinator::new(&registry, &manager);
    let employees = store::list_employees(&co).expect("list");
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0].code, "1001");
    assert_eq!(
        migrate::ensure_schema_selector(&manager, &registry, TargetSelector::Active).len(),
        1
    );

    // Schema version on the new read target is still current.
    assert_eq!(common::schema_version(&secondary), CURRENT_VERSION);
}
