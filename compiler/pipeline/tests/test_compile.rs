use std::fs;
use std::path::Path;
use std::sync::Arc;

use codegen::{ArtifactKind, ArtifactSink, FileSink, MemorySink};
use pipeline::{compile, CompileReport, PipelineError};
use transport::{DynTransport, MemoryTransport, TransportError};

const BRAD_PITT: &str = r#"
datasources:
  sparql:
    - http://dbpedia.org/sparql
paths:
  /movies/brad_pitt:
    get:
      query:
        graphql-query: '{ id ... on Film { starring(label:"Brad Pitt") } }'
        json-ld-context: '{"@context": {"Film": "http://dbpedia.org/ontology/Film", "starring": "http://dbpedia.org/ontology/starring"}}'
"#;

fn write(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, text).expect("write fixture");
    path.to_string_lossy().into_owned()
}

fn no_network() -> DynTransport { Arc::new(MemoryTransport::new()) }

#[tokio::test]
async fn test_end_to_end_single_route() {
    let temp = tempfile::tempdir().expect("tempdir");
    let spec = write(temp.path(), "spec.yaml", BRAD_PITT);
    let out = temp.path().join("generated");

    let report = compile(&spec, Arc::new(FileSink::new(&out)), no_network()).await.expect("compile");
    assert_eq!(report, CompileReport { routes: 1, queries: 1, pipe_modules: 0 });

    let query_js = fs::read_to_string(out.join("executeQuery.js")).expect("query artifact");
    assert!(query_js.contains(r#"sources: [{"type":"sparql","value":"http://dbpedia.org/sparql"}],"#));
    assert!(query_js.contains("const getmoviesbradpitt = {"));
    assert!(query_js.contains(r#"query: '{ id ... on Film { starring(label:"Brad Pitt") } }',"#));
    assert!(query_js.contains(r#""Film":"http://dbpedia.org/ontology/Film""#));
    assert!(query_js.ends_with("module.exports = { executeQuery, getmoviesbradpitt };\n"));

    let pipes_js = fs::read_to_string(out.join("pipeModules.js")).expect("pipe artifact");
    assert!(!pipes_js.contains("const "));
    assert!(pipes_js.ends_with("module.exports = {};\n"));

    let routes_js = fs::read_to_string(out.join("routes.js")).expect("routes artifact");
    assert!(routes_js.contains("router.get('/movies/brad_pitt', async (req, res, next) => {"));
    assert!(routes_js.contains("queries.executeQuery(queries.getmoviesbradpitt, variables)"));
    assert!(!routes_js.contains("pipeModules."));
}

#[tokio::test]
async fn test_pipe_chain_and_shared_modules() {
    let temp = tempfile::tempdir().expect("tempdir");
    let spec = write(
        temp.path(),
        "spec.yaml",
        r#"
datasources:
  sparql: http://dbpedia.org/sparql
paths:
  /movies/{actor}:
    get:
      query:
        graphql-query: "{ id ... on Film { starring(label: $actor) } }"
      postprocessing:
        sortT:
          source: http://pipes.example.org/sort.js
        firstT:
          source: http://pipes.example.org/first.js
  /actors:
    get:
      query:
        graphql-query: "{ name }"
      postprocessing:
        sortT:
          source: http://pipes.example.org/sort.js
"#,
    );
    let transport = Arc::new(
        MemoryTransport::new()
            .with("http://pipes.example.org/sort.js", "(data) => data.sort()\n")
            .with("http://pipes.example.org/first.js", "(data) => data.slice(0, 1)"),
    );
    let sink = Arc::new(MemorySink::new());

    let report = compile(&spec, sink.clone(), transport).await.expect("compile");
    assert_eq!(report, CompileReport { routes: 2, queries: 2, pipe_modules: 2 });

    let pipes_js = sink.contents(ArtifactKind::PipeModules).expect("pipe artifact");
    assert_eq!(pipes_js.matches("const sortT = (data) => data.sort();").count(), 1);
    assert!(pipes_js.ends_with("module.exports = { sortT, firstT };\n"));

    let routes_js = sink.contents(ArtifactKind::Routes).expect("routes artifact");
    let actor = routes_js.find("router.get('/movies/:actor'").expect("first route");
    let actors = routes_js.find("router.get('/actors'").expect("second route");
    assert!(actor < actors);
    let sort = routes_js.find("pipeModules.sortT(data)").expect("sort call");
    let first = routes_js.find("pipeModules.firstT(data)").expect("first call");
    assert!(sort < first);
    assert_eq!(routes_js.matches("pipeModules.sortT(data)").count(), 2);
}

#[tokio::test]
async fn test_unresolved_reference_writes_nothing() {
    let temp = tempfile::tempdir().expect("tempdir");
    let spec = write(
        temp.path(),
        "spec.yaml",
        "paths:\n  /movies:\n    get:\n      $ref: fragments/missing.yaml\n",
    );
    let sink = Arc::new(MemorySink::new());

    let err = compile(&spec, sink.clone(), no_network()).await.expect_err("unresolved");
    match err {
        PipelineError::UnresolvedReference { location, .. } => {
            assert_eq!(location, "fragments/missing.yaml")
        }
        other => panic!("expected UnresolvedReference, got {:?}", other),
    }
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_references_are_followed() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::create_dir(temp.path().join("ops")).expect("mkdir");
    write(
        temp.path(),
        "ops/movies.yaml",
        "get:\n  query:\n    graphql-query: \"{ id }\"\n",
    );
    let spec = write(temp.path(), "spec.yaml", "paths:\n  /movies:\n    $ref: ops/movies.yaml\n");
    let sink = Arc::new(MemorySink::new());

    compile(&spec, sink.clone(), no_network()).await.expect("compile");
    let query_js = sink.contents(ArtifactKind::Query).expect("query artifact");
    assert!(query_js.contains("const getmovies = {"));
}

#[tokio::test]
async fn test_duplicate_query_name_writes_nothing() {
    let temp = tempfile::tempdir().expect("tempdir");
    let spec = write(
        temp.path(),
        "spec.yaml",
        "paths:\n  /movies/{actor}:\n    get:\n      query:\n        graphql-query: x\n  /movies-actor:\n    get:\n      query:\n        graphql-query: y\n",
    );
    let sink = Arc::new(MemorySink::new());

    let err = compile(&spec, sink.clone(), no_network()).await.expect_err("duplicate");
    assert!(matches!(err, PipelineError::DuplicateName(_)));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_invalid_method_writes_nothing() {
    let temp = tempfile::tempdir().expect("tempdir");
    let spec = write(
        temp.path(),
        "spec.yaml",
        "paths:\n  /movies:\n    fetch:\n      query:\n        graphql-query: x\n",
    );
    let sink = Arc::new(MemorySink::new());

    let err = compile(&spec, sink.clone(), no_network()).await.expect_err("invalid method");
    assert_eq!(err.to_string(), "invalid routing method 'fetch' for path /movies");
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_pipe_module_named_after_module_binding_writes_nothing() {
    let temp = tempfile::tempdir().expect("tempdir");
    let spec = write(
        temp.path(),
        "spec.yaml",
        "paths:\n  /movies:\n    get:\n      query:\n        graphql-query: x\n      postprocessing:\n        exports:\n          source: http://x/e.js\n",
    );
    let transport = Arc::new(MemoryTransport::new().with("http://x/e.js", "(d) => d"));
    let sink = Arc::new(MemorySink::new());

    let err = compile(&spec, sink.clone(), transport.clone()).await.expect_err("module binding");
    match err {
        PipelineError::Extract(analysis::ExtractError::InvalidIdentifier { name, .. }) => {
            assert_eq!(name, "exports")
        }
        other => panic!("expected InvalidIdentifier, got {:?}", other),
    }
    assert!(sink.is_empty());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_fetch_failure_aborts_and_keeps_partial_output() {
    let temp = tempfile::tempdir().expect("tempdir");
    let spec = write(
        temp.path(),
        "spec.yaml",
        r#"
paths:
  /first:
    get:
      query: { graphql-query: "{ a }" }
  /second:
    get:
      query: { graphql-query: "{ b }" }
      postprocessing:
        broken:
          source: http://pipes.example.org/broken.js
"#,
    );
    let transport = Arc::new(MemoryTransport::new().with_error(
        "http://pipes.example.org/broken.js",
        TransportError::Http("connection reset".into()),
    ));
    let sink = Arc::new(MemorySink::new());

    let err = compile(&spec, sink.clone(), transport).await.expect_err("fetch failure");
    assert!(matches!(err, PipelineError::PipeModuleFetch { ref name, .. } if name == "broken"));

    let routes_js = sink.contents(ArtifactKind::Routes).expect("routes artifact");
    assert!(routes_js.contains("router.get('/first'"));
    assert!(!routes_js.contains("/second"));
    assert!(!routes_js.contains("module.exports"));
}

#[tokio::test]
async fn test_empty_specification_produces_empty_artifacts() {
    let temp = tempfile::tempdir().expect("tempdir");
    let spec = write(temp.path(), "spec.yaml", "paths: {}\n");
    let sink = Arc::new(MemorySink::new());

    let report = compile(&spec, sink.clone(), no_network()).await.expect("compile");
    assert_eq!(report, CompileReport::default());
    for kind in ArtifactKind::ALL {
        assert!(sink.contents(kind).is_some(), "{} not created", kind);
    }
    let query_js = sink.contents(ArtifactKind::Query).expect("query artifact");
    assert!(query_js.contains("sources: [],"));
    assert!(query_js.ends_with("module.exports = { executeQuery };\n"));
}

#[test]
fn test_sink_is_object_safe() {
    let sink: Arc<dyn ArtifactSink> = Arc::new(MemorySink::new());
    sink.create(ArtifactKind::Routes).expect("create");
}
