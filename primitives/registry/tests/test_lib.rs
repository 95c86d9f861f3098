use std::sync::Arc;

use registry::{DuplicateNameError, NameKind, NameRegistry};

#[test]
fn test_register_and_query_in_order() {
    let registry = NameRegistry::new();
    registry.register(NameKind::Query, "getmovies").expect("first registration");
    registry.register(NameKind::Query, "postmovies").expect("second registration");

    assert_eq!(registry.names_for(NameKind::Query), vec!["getmovies", "postmovies"]);
    assert_eq!(registry.last_for(NameKind::Query).as_deref(), Some("postmovies"));
    assert_eq!(registry.count(NameKind::Query), 2);
    assert!(registry.contains(NameKind::Query, "getmovies"));
}

#[test]
fn test_kinds_are_separate_namespaces() {
    let registry = NameRegistry::new();
    registry.register(NameKind::Query, "shared").expect("query name");
    registry.register(NameKind::PipeModule, "shared").expect("same name, other kind");

    assert!(registry.contains(NameKind::PipeModule, "shared"));
    assert!(registry.names_for(NameKind::PipeModule).len() == 1);
}

#[test]
fn test_duplicate_is_rejected_without_mutation() {
    let registry = NameRegistry::new();
    registry.register(NameKind::PipeModule, "filter").expect("first registration");

    let err = registry.register(NameKind::PipeModule, "filter").expect_err("duplicate");
    assert_eq!(err, DuplicateNameError::new(NameKind::PipeModule, "filter"));
    assert_eq!(registry.count(NameKind::PipeModule), 1);
}

#[test]
fn test_empty_registry() {
    let registry = NameRegistry::new();
    assert!(registry.names_for(NameKind::Query).is_empty());
    assert_eq!(registry.last_for(NameKind::Query), None);
    assert!(!registry.contains(NameKind::Query, "anything"));
}

#[test]
fn test_error_message_includes_context() {
    let err = DuplicateNameError::new(NameKind::Query, "getmoviesactor")
        .with_context("get /movies/{actor} and get /movies-actor");
    assert_eq!(
        err.to_string(),
        "duplicate query name 'getmoviesactor' (get /movies/{actor} and get /movies-actor)"
    );
    assert_eq!(
        DuplicateNameError::new(NameKind::PipeModule, "f").to_string(),
        "duplicate pipe-module name 'f'"
    );
}

#[test]
fn test_shared_between_threads() {
    let registry = Arc::new(NameRegistry::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || registry.register(NameKind::Query, &format!("q{}", i)))
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread joined").expect("unique name");
    }
    assert_eq!(registry.count(NameKind::Query), 4);
}
