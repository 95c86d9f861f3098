use ir::Specification;
use ldgen_analysis::{validate, ExtractError, ValidationSummary};
use registry::NameKind;

fn spec(yaml: &str) -> Specification { Specification::from_yaml_str(yaml).expect("spec") }

#[test]
fn accepts_well_formed_specification() {
    let summary = validate(&spec(
        r#"
datasources:
  sparql:
    - http://dbpedia.org/sparql
paths:
  /movies/{actor}:
    get:
      query:
        graphql-query: "{ id }"
      postprocessing:
        filterT:
          source: http://example.org/filter.js
  /actors:
    get:
      query:
        graphql-query: "{ name }"
      postprocessing:
        filterT:
          source: http://example.org/filter.js
"#,
    ))
    .expect("valid");

    assert_eq!(summary, ValidationSummary { data_sources: 1, operations: 2, pipe_modules: 1 });
}

#[test]
fn fails_on_colliding_query_names() {
    let err = validate(&spec(
        r#"
paths:
  /movies/{actor}:
    get:
      query:
        graphql-query: "{ a }"
  /movies-actor:
    get:
      query:
        graphql-query: "{ b }"
"#,
    ))
    .expect_err("collision");

    match err {
        ExtractError::DuplicateName(dup) => {
            assert_eq!(dup.kind, NameKind::Query);
            assert_eq!(dup.name, "getmoviesactor");
        }
        other => panic!("expected DuplicateName, got {:?}", other),
    }
}

#[test]
fn collision_message_names_both_routes() {
    let err = validate(&spec(
        "paths:\n  /movies/{actor}:\n    get:\n      query:\n        graphql-query: x\n  /movies-actor:\n    get:\n      query:\n        graphql-query: y\n",
    ))
    .expect_err("collision");
    assert_eq!(
        err.to_string(),
        "duplicate query name 'getmoviesactor' (get /movies/{actor} and get /movies-actor)"
    );
}

#[test]
fn fails_on_invalid_routing_method() {
    let err = validate(&spec(
        "paths:\n  /movies:\n    get:\n      query:\n        graphql-query: x\n    fetch:\n      query:\n        graphql-query: y\n",
    ))
    .expect_err("bad verb");
    assert!(matches!(
        err,
        ExtractError::InvalidRoutingMethod { ref method, ref path } if method == "fetch" && path == "/movies"
    ));
}

#[test]
fn fails_on_pipe_module_with_two_sources() {
    let err = validate(&spec(
        r#"
paths:
  /a:
    get:
      query: { graphql-query: x }
      postprocessing: { p: { source: "http://one/p.js" } }
  /b:
    get:
      query: { graphql-query: y }
      postprocessing: { p: { source: "http://two/p.js" } }
"#,
    ))
    .expect_err("conflict");
    assert!(matches!(err, ExtractError::DuplicateName(ref d) if d.kind == NameKind::PipeModule));
}

#[test]
fn empty_specification_is_valid() {
    assert_eq!(validate(&spec("")).expect("empty"), ValidationSummary::default());
}
