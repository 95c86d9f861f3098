use std::sync::Arc;

use codegen::{ArtifactKind, ArtifactSink, MemorySink};
use ir::{DataSource, Specification};
use pipeline::{EmitterState, MultiArtifactEmitter, PipelineError};
use registry::NameKind;
use transport::MemoryTransport;

fn created_sink() -> Arc<MemorySink> {
    let sink = Arc::new(MemorySink::new());
    for kind in ArtifactKind::ALL {
        sink.create(kind).expect("create");
    }
    sink
}

fn emitter(sink: &Arc<MemorySink>, transport: MemoryTransport) -> MultiArtifactEmitter {
    MultiArtifactEmitter::new(
        sink.clone(),
        Arc::new(transport),
        vec![DataSource::new("sparql", "http://dbpedia.org/sparql")],
    )
}

#[tokio::test]
async fn test_state_transitions() {
    let sink = created_sink();
    let mut emitter = emitter(&sink, MemoryTransport::new());
    assert_eq!(emitter.state(), EmitterState::Idle);

    let spec = Specification::from_yaml_str(
        "paths:\n  /movies:\n    get:\n      query:\n        graphql-query: '{ id }'\n",
    )
    .expect("spec");

    let err = emitter.emit_pair(&spec.operations()[0]).await.expect_err("not started");
    assert!(matches!(err, PipelineError::InvalidState { state: EmitterState::Idle, .. }));
    assert!(matches!(emitter.finish(), Err(PipelineError::InvalidState { .. })));

    emitter.begin().expect("begin");
    assert_eq!(emitter.state(), EmitterState::Emitting);
    assert!(emitter.begin().is_err());

    emitter.emit_pair(&spec.operations()[0]).await.expect("emit");
    let report = emitter.finish().expect("finish");
    assert_eq!(emitter.state(), EmitterState::Done);
    assert_eq!(report.routes, 1);

    let err = emitter.emit_pair(&spec.operations()[0]).await.expect_err("done");
    assert_eq!(err.to_string(), "emitter cannot emit while done");
}

#[tokio::test]
async fn test_names_committed_before_route_is_written() {
    let sink = created_sink();
    let transport = MemoryTransport::new().with("http://x/f.js", "(d) => d");
    let mut emitter = emitter(&sink, transport);
    let spec = Specification::from_yaml_str(
        r#"
paths:
  /movies/{actor}:
    get:
      query:
        graphql-query: "{ id }"
      postprocessing:
        f:
          source: http://x/f.js
"#,
    )
    .expect("spec");

    emitter.begin().expect("begin");
    let headers: Vec<usize> = ArtifactKind::ALL.iter().map(|k| sink.append_count(*k)).collect();
    assert_eq!(headers, vec![1, 1, 1]);

    emitter.emit_pair(&spec.operations()[0]).await.expect("emit");
    assert!(emitter.registry().contains(NameKind::Query, "getmoviesactor"));
    assert!(emitter.registry().contains(NameKind::PipeModule, "f"));

    for kind in ArtifactKind::ALL {
        assert_eq!(sink.append_count(kind), 2, "{} flushed once per call", kind);
    }
    let routes = sink.contents(ArtifactKind::Routes).expect("routes");
    assert!(routes.contains("queries.executeQuery(queries.getmoviesactor, variables)"));
    assert!(routes.contains("data = await pipeModules.f(data);"));
    assert!(!routes.contains("module.exports"));
}

#[tokio::test]
async fn test_run_preserves_declaration_order() {
    let sink = created_sink();
    let mut emitter = emitter(&sink, MemoryTransport::new());
    let spec = Specification::from_yaml_str(
        r#"
paths:
  /zebra:
    post:
      query: { graphql-query: "{ z }" }
    get:
      query: { graphql-query: "{ z }" }
  /alpha:
    get:
      query: { graphql-query: "{ a }" }
"#,
    )
    .expect("spec");

    emitter.run(&spec).await.expect("run");

    let query_js = sink.contents(ArtifactKind::Query).expect("query");
    assert!(query_js.ends_with(
        "module.exports = { executeQuery, postzebra, getzebra, getalpha };\n"
    ));
    let routes_js = sink.contents(ArtifactKind::Routes).expect("routes");
    assert!(routes_js.ends_with(
        "module.exports.routes = [{\"method\":\"post\",\"path\":\"/zebra\"},{\"method\":\"get\",\"path\":\"/zebra\"},{\"method\":\"get\",\"path\":\"/alpha\"}];\n"
    ));
}
