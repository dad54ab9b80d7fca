use shopclock::db::registry::Registry;
use shopclock::errors::AppError;
use shopclock::models::target::{TargetConfig, TargetKey, TargetSelector};

mod common;
use common::{registry_for, setup_test_db};

fn target(key: TargetKey, host: Option<&str>, active: bool) -> TargetConfig {
    let mut t = TargetConfig::new(key);
    t.host = host.map(|h| h.to_string());
    t.active = active;
    t
}

#[test]
fn test_empty_active_set_is_rejected() {
    let primary = target(TargetKey::Primary, Some("a.sqlite"), false);
    let secondary = target(TargetKey::Secondary, None, false);
    let err = Registry::new(primary, secondary, TargetKey::Primary);
    assert!(matches!(err, Err(AppError::Config(_))));
}

#[test]
fn test_active_but_undefined_target_does_not_count() {
    // Active flag without a host is not a usable target.
    let primary = target(TargetKey::Primary, None, true);
    let secondary = target(TargetKey::Secondary, None, false);
    let err = Registry::new(primary, secondary, TargetKey::Primary);
    assert!(matches!(err, Err(AppError::Config(_))));
}

#[test]
fn test_designation_silently_moves_to_usable_target() {
    let primary = target(TargetKey::Primary, Some("a.sqlite"), false);
    let secondary = target(TargetKey::Secondary, Some("b.sqlite"), true);
    let registry =
        Registry::new(primary, secondary, TargetKey::Primary).expect("valid registry");
    assert_eq!(registry.designated(), TargetKey::Secondary);
    assert_eq!(registry.read_target().key, TargetKey::Secondary);
}

#[test]
fn test_rejected_reconfiguration_leaves_registry_unchanged() {
    let db = setup_test_db("registry_unchanged");
    let mut registry = registry_for(&db, None);

    let dead_primary = target(TargetKey::Primary, Some("a.sqlite"), false);
    let dead_secondary = target(TargetKey::Secondary, None, false);
    let result = registry.set_configuration(dead_primary, dead_secondary, TargetKey::Primary);
    assert!(result.is_err());

    // Old configuration still in force.
    assert_eq!(registry.designated(), TargetKey::Primary);
    assert!(registry.read_target().configured());
}

#[test]
fn test_active_targets_are_ordered_primary_first() {
    let primary = target(TargetKey::Primary, Some("a.sqlite"), true);
    let secondary = target(TargetKey::Secondary, Some("b.sqlite"), true);
    let registry =
        Registry::new(primary, secondary, TargetKey::Secondary).expect("valid registry");

    let keys: Vec<TargetKey> = registry.active_targets().iter().map(|t| t.key).collect();
    assert_eq!(keys, vec![TargetKey::Primary, TargetKey::Secondary]);
    // Designation is honored independently of iteration order.
    assert_eq!(registry.read_target().key, TargetKey::Secondary);
}

#[test]
fn test_selector_scopes() {
    let primary = target(TargetKey::Primary, Some("a.sqlite"), true);
    let secondary = target(TargetKey::Secondary, Some("b.sqlite"), false);
    let registry =
        Registry::new(primary, secondary, TargetKey::Primary).expect("valid registry");

    assert_eq!(registry.select(TargetSelector::Active).len(), 1);
    assert_eq!(registry.select(TargetSelector::Both).len(), 2);
    assert_eq!(
        registry.select(TargetSelector::Secondary)[0].key,
        TargetKey::Secondary
    );
}

#[test]
fn test_selector_parsing() {
    assert_eq!(
        TargetSelector::from_str("both"),
        Some(TargetSelector::Both)
    );
    assert_eq!(
        TargetSelector::from_str("Active"),
        Some(TargetSelector::Active)
    );
    assert_eq!(TargetSelector::from_str("everything"), None);
    assert_eq!(TargetKey::from_str("secondary"), Some(TargetKey::Secondary));
    assert_eq!(TargetKey::from_str("tertiary"), None);
}
