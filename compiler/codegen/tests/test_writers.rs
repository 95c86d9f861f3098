use std::fs;
use std::sync::Arc;

use codegen::{
    ArtifactKind, ArtifactSink, ArtifactWriter, FileSink, PipeModuleWriter, QueryWriter,
    RouteBinding, RouteWriter, WriterPhase,
};
use ir::{DataSource, HttpMethod, PipeModule, Query, Route};
use registry::NameRegistry;
use serde_json::json;

#[test]
fn test_three_writers_share_one_registry() {
    let temp = tempfile::tempdir().expect("tempdir");
    let sink: Arc<dyn ArtifactSink> = Arc::new(FileSink::new(temp.path().join("generated")));
    for kind in ArtifactKind::ALL {
        sink.create(kind).expect("create");
    }

    let registry = Arc::new(NameRegistry::new());
    let mut pipes = PipeModuleWriter::new(sink.clone(), registry.clone());
    let mut queries = QueryWriter::new(
        sink.clone(),
        registry.clone(),
        vec![
            DataSource::new("sparql", "http://dbpedia.org/sparql"),
            DataSource::new("file", "http://example.org/data.ttl"),
        ],
    );
    let mut routes = RouteWriter::new(sink.clone(), registry.clone());

    pipes.begin().expect("pipes begin");
    queries.begin().expect("queries begin");
    routes.begin().expect("routes begin");

    pipes
        .emit(&[PipeModule {
            name: "firstOnly".into(),
            source: "http://example.org/first.js".into(),
            code: "(data) => data.slice(0, 1)".into(),
        }])
        .expect("pipes emit");
    queries
        .emit(&Query {
            name: "getmoviesactor".into(),
            query: "{ id ... on Film { starring(label: $actor) } }".into(),
            context: json!({"@context": {"Film": "http://dbpedia.org/ontology/Film"}}),
        })
        .expect("queries emit");
    routes
        .emit(&RouteBinding {
            route: Route { method: HttpMethod::Get, path: "/movies/:actor".into() },
            query_name: queries.last_emitted().expect("query emitted").to_string(),
            pipe_names: pipes.current_names().to_vec(),
        })
        .expect("routes emit");

    pipes.end().expect("pipes end");
    queries.end().expect("queries end");
    routes.end().expect("routes end");
    assert_eq!(routes.phase(), WriterPhase::Sealed);

    let dir = temp.path().join("generated");
    let query_js = fs::read_to_string(dir.join("executeQuery.js")).expect("query artifact");
    let pipes_js = fs::read_to_string(dir.join("pipeModules.js")).expect("pipe artifact");
    let routes_js = fs::read_to_string(dir.join("routes.js")).expect("routes artifact");

    let sparql = query_js.find("http://dbpedia.org/sparql").expect("first source");
    let file = query_js.find("http://example.org/data.ttl").expect("second source");
    assert!(sparql < file);
    assert!(query_js.contains("query: '{ id ... on Film { starring(label: $actor) } }'"));
    assert!(query_js.ends_with("module.exports = { executeQuery, getmoviesactor };\n"));

    assert!(pipes_js.contains("const firstOnly = (data) => data.slice(0, 1);"));
    assert!(pipes_js.ends_with("module.exports = { firstOnly };\n"));

    assert!(routes_js.contains("router.get('/movies/:actor',"));
    assert!(routes_js.contains("queries.executeQuery(queries.getmoviesactor, variables)"));
    assert!(routes_js.contains("data = await pipeModules.firstOnly(data);"));
}

#[test]
fn test_sealed_writer_rejects_writes() {
    let sink = Arc::new(codegen::MemorySink::new());
    sink.create(ArtifactKind::PipeModules).expect("create");
    let mut pipes = PipeModuleWriter::new(sink.clone(), Arc::new(NameRegistry::new()));
    pipes.begin().expect("begin");
    pipes.end().expect("end");

    assert!(pipes.emit(&[]).is_err());
    assert!(pipes.end().is_err());
    assert!(pipes.begin().is_err());
    assert_eq!(sink.append_count(ArtifactKind::PipeModules), 2);
}
