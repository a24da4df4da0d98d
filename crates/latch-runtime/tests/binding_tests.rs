use crate::binding::{BindingEntry, BindingKind, BindingState};
use crate::error::{BindingError, UnboundReason};
use crate::value::Value;

fn number(entry: &BindingEntry) -> f64 {
    match entry.get("x", false) {
        Ok(Value::Number(n)) => n,
        other => panic!("expected number, got {other:?}"),
    }
}

#[test]
fn test_mutable_entry_starts_set_to_undefined() {
    let entry = BindingEntry::mutable();
    assert_eq!(entry.kind(), BindingKind::Mutable);
    assert!(entry.is_set());
    assert!(entry.get("x", false).unwrap().is_undefined());
}

#[test]
fn test_mutable_entry_accepts_any_number_of_writes() {
    let mut entry = BindingEntry::mutable();
    for i in 0..5 {
        entry.set("x", Value::Number(f64::from(i))).unwrap();
    }
    assert_eq!(number(&entry), 4.0);
}

#[test]
fn test_write_once_entry_starts_unset() {
    let entry = BindingEntry::write_once();
    assert_eq!(entry.kind(), BindingKind::Immutable);
    assert!(matches!(entry.state(), BindingState::Unset));
    assert!(entry.is_write_once());
}

#[test]
fn test_write_once_plain_read_fails_without_changing_state() {
    let entry = BindingEntry::write_once();
    for _ in 0..3 {
        assert_eq!(
            entry.get("x", false).unwrap_err(),
            BindingError::UnboundAccess {
                name: "x".to_string(),
                reason: UnboundReason::Unassigned,
            }
        );
    }
    assert!(!entry.is_set());
}

#[test]
fn test_write_once_typeof_read_is_undefined_and_repeatable() {
    let entry = BindingEntry::write_once();
    for _ in 0..3 {
        assert!(entry.get("x", true).unwrap().is_undefined());
    }
    assert!(!entry.is_set());
}

#[test]
fn test_write_once_accepts_exactly_one_write() {
    let mut entry = BindingEntry::write_once();
    entry.set("x", Value::Number(1.0)).unwrap();
    let err = entry.set("x", Value::Number(2.0)).unwrap_err();
    assert!(matches!(err, BindingError::Reassignment { .. }));
    assert_eq!(number(&entry), 1.0);
    // Later attempts keep failing the same way.
    assert!(matches!(
        entry.set("x", Value::Number(3.0)),
        Err(BindingError::Reassignment { .. })
    ));
    assert_eq!(number(&entry), 1.0);
}

#[test]
fn test_written_entry_never_reads_absent_again() {
    let mut entry = BindingEntry::write_once();
    entry.set("x", Value::Number(7.0)).unwrap();
    assert!(matches!(entry.get("x", true), Ok(Value::Number(n)) if n == 7.0));
    assert!(matches!(entry.get("x", false), Ok(Value::Number(n)) if n == 7.0));
}

#[test]
fn test_awaiting_initializer_rejects_everything_until_initialized() {
    let mut entry = BindingEntry::awaiting_initializer();
    assert!(!entry.is_write_once());
    assert!(matches!(
        entry.get("x", true),
        Err(BindingError::UnboundAccess { .. })
    ));
    assert!(matches!(
        entry.get("x", false),
        Err(BindingError::UnboundAccess { .. })
    ));
    assert!(matches!(
        entry.set("x", Value::Null),
        Err(BindingError::UnboundAccess { .. })
    ));
    assert!(!entry.is_set());

    entry.initialize("x", Value::Number(3.0)).unwrap();
    assert_eq!(number(&entry), 3.0);
    assert!(matches!(
        entry.set("x", Value::Null),
        Err(BindingError::Reassignment { .. })
    ));
}

#[test]
fn test_initialize_twice_is_an_internal_error() {
    let mut entry = BindingEntry::mutable();
    entry.initialize("x", Value::Number(1.0)).unwrap();
    assert!(matches!(
        entry.initialize("x", Value::Number(2.0)),
        Err(BindingError::AlreadyInitialized { .. })
    ));
    assert_eq!(number(&entry), 1.0);
}

#[test]
fn test_initialize_after_write_once_commit_is_rejected() {
    let mut entry = BindingEntry::write_once();
    entry.set("x", Value::Number(1.0)).unwrap();
    assert!(matches!(
        entry.initialize("x", Value::Number(2.0)),
        Err(BindingError::AlreadyInitialized { .. })
    ));
    assert_eq!(number(&entry), 1.0);
}

#[test]
fn test_with_value_entries_are_frozen_when_immutable() {
    let mut entry = BindingEntry::with_value(BindingKind::Immutable, Value::Number(0.0));
    assert!(matches!(
        entry.set("x", Value::Number(1.0)),
        Err(BindingError::Reassignment { .. })
    ));
    assert_eq!(number(&entry), 0.0);
}

#[test]
fn test_error_families() {
    use crate::error::ErrorFamily;
    let name = "x".to_string();
    assert_eq!(
        BindingError::UnboundAccess {
            name: name.clone(),
            reason: UnboundReason::Unassigned,
        }
        .family(),
        ErrorFamily::ReferenceError
    );
    assert_eq!(
        BindingError::UnresolvedReference { name: name.clone() }.family(),
        ErrorFamily::ReferenceError
    );
    assert_eq!(
        BindingError::Reassignment { name: name.clone() }.family(),
        ErrorFamily::TypeError
    );
    assert_eq!(
        BindingError::DuplicateName { name: name.clone() }.family(),
        ErrorFamily::SyntaxError
    );
    assert_eq!(BindingError::MissingBinding { name }.family(), ErrorFamily::Error);
}

#[test]
fn test_unbound_messages_name_the_missing_write_or_initializer() {
    let unwritten = BindingEntry::write_once().get("v", false).unwrap_err();
    assert_eq!(
        unwritten.to_string(),
        "Constant 'v' is used before being assigned."
    );

    let pending = BindingEntry::awaiting_initializer();
    let read = pending.get("w", false).unwrap_err();
    assert_eq!(
        read,
        BindingError::UnboundAccess {
            name: "w".to_string(),
            reason: UnboundReason::BeforeDeclaration,
        }
    );
    assert_eq!(
        read.to_string(),
        "Block-scoped variable 'w' used before its declaration."
    );
    assert_eq!(pending.get("w", true).unwrap_err(), read);
}

#[test]
fn test_error_messages_use_diagnostic_templates() {
    let err = BindingError::Reassignment {
        name: "total".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Cannot assign to 'total' because it is a constant."
    );
    let err = BindingError::UnresolvedReference {
        name: "missing".to_string(),
    };
    assert_eq!(err.to_string(), "Cannot find name 'missing'.");
}
