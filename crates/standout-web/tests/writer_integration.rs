//! End-to-end tests for response writers.
//!
//! These drive writers the way a hosting pipeline does: pick the first
//! responsible writer for a content path, then hand it the response.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use standout_web::locale::{self, set_language};
use standout_web::{
    BufferedResponse, CustomResponseWriter, DirResourceContext, FileResolver, FixedLocale,
    InMemoryRegistry, InlineResolver, Locale, MiniJinjaEngine, PathAffixes, RenderContext,
    ResourceContext, ResponseWriter, SimpleRequest, StaticHost, TemplateEngine, WriterConfig,
    WriterError,
};

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn classpath_engine() -> MiniJinjaEngine {
    let mut engine = MiniJinjaEngine::new();
    engine.add_resolver(Arc::new(
        FileResolver::new(fixtures().join("classpath")).with_affixes(PathAffixes::new("views/", "")),
    ));
    engine
}

/// Returns the first writer responsible for `path`, as a pipeline would.
fn select<'a>(
    writers: &'a [Box<dyn CustomResponseWriter>],
    path: &str,
) -> Option<&'a dyn CustomResponseWriter> {
    writers
        .iter()
        .find(|writer| writer.is_responsible_to(path))
        .map(|writer| writer.as_ref())
}

fn lines(lines: &[&str]) -> String {
    lines.join("\n")
}

#[test]
fn writer_renders_params_scoped_vars_and_locale() {
    let writer = ResponseWriter::builder()
        .engine(classpath_engine())
        .build()
        .unwrap();

    set_language(Some(Locale::new("ja")));
    let request = SimpleRequest::new("GET", "/").with_param("msgInParam", "I am parameter.");
    let mut response = BufferedResponse::new();
    let ctx = RenderContext::new(&request, &mut response).with_var("sayHelloTo", "Nabchan");
    writer.render("/test.html", ctx).unwrap();
    set_language(None);

    assert_eq!(
        response.body_string(),
        lines(&[
            "<!DOCTYPE html>",
            "<html>",
            "<body>",
            "<p>I am parameter.</p>",
            "<p>Nabchan</p>",
            "<p>ja</p>",
            "</body>",
            "</html>",
        ])
    );
}

#[test]
fn unset_language_falls_back_to_system_default() {
    let mut engine = MiniJinjaEngine::new();
    engine.add_resolver(Arc::new(
        InlineResolver::new().with_template("/locale.txt", "{{ locale }}"),
    ));
    let writer = ResponseWriter::builder()
        .path_pattern(r".*\.txt")
        .engine(engine)
        .build()
        .unwrap();

    set_language(None);
    assert!(locale::language().is_none());

    let request = SimpleRequest::new("GET", "/");
    let mut response = BufferedResponse::new();
    writer
        .render("/locale.txt", RenderContext::new(&request, &mut response))
        .unwrap();
    assert_eq!(response.body_string(), Locale::system_default().as_str());
}

#[test]
fn output_matches_direct_engine_processing() {
    let engine: Arc<dyn TemplateEngine> = Arc::new(classpath_engine());
    let writer = ResponseWriter::builder()
        .shared_engine(Arc::clone(&engine))
        .locale_source(FixedLocale(Locale::new("en")))
        .build()
        .unwrap();

    let request = SimpleRequest::new("POST", "/orders").with_param("msgInParam", "a & b");
    let mut response = BufferedResponse::new();
    let ctx = RenderContext::new(&request, &mut response).with_var("sayHelloTo", "<you>");
    let expected_ctx = ctx.engine_context(Locale::new("en"));
    writer.render("/test.html", ctx).unwrap();

    let mut direct = Vec::new();
    engine.process("/test.html", &expected_ctx, &mut direct).unwrap();

    assert_eq!(response.body(), direct.as_slice());
    assert!(response.body_string().contains("a &amp; b"));
    assert!(response.body_string().contains("&lt;you&gt;"));
}

#[test]
fn pipeline_picks_first_responsible_writer() {
    let mut text_engine = MiniJinjaEngine::new();
    text_engine.add_resolver(Arc::new(
        InlineResolver::new().with_template("/report.txt", "report for {{ request.path }}"),
    ));

    let writers: Vec<Box<dyn CustomResponseWriter>> = vec![
        Box::new(
            ResponseWriter::builder()
                .path_pattern(r"/template/.*\.html")
                .engine(classpath_engine())
                .build()
                .unwrap(),
        ),
        Box::new(
            ResponseWriter::builder()
                .path_pattern(r".*\.txt")
                .engine(text_engine)
                .build()
                .unwrap(),
        ),
    ];

    assert!(select(&writers, "/index.html").is_none());

    let writer = select(&writers, "/report.txt").unwrap();
    let request = SimpleRequest::new("GET", "/reports/7");
    let mut response = BufferedResponse::new();
    writer
        .write_response("/report.txt", RenderContext::new(&request, &mut response))
        .unwrap();
    assert_eq!(response.body_string(), "report for /reports/7");
}

#[test]
fn container_managed_writer_reads_webapp_templates() {
    let registry = Arc::new(InMemoryRegistry::new());
    let config = WriterConfig::from_yaml(
        r#"
path_pattern: '/thymeleaf/.*\.html'
resolver_prefix: /WEB-INF/templates/
"#,
    )
    .unwrap();
    let writer = ResponseWriter::from_config(&config, registry.clone()).unwrap();

    // Host startup completes: the front controller is registered with the
    // application's resource context.
    let webapp: Arc<dyn ResourceContext> = Arc::new(
        DirResourceContext::new(fixtures().join("webapp"))
            .with_attribute("greeting", json!("Hello there!")),
    );
    registry.register(
        "webFrontController",
        Arc::new(StaticHost::new(Arc::clone(&webapp))),
    );

    assert!(writer.is_responsible_to("/thymeleaf/test.html"));

    let request = SimpleRequest::new("GET", "/").with_param("msgInParam", "I am parameter.");
    let mut response = BufferedResponse::new();
    let ctx = RenderContext::new(&request, &mut response)
        .with_environment(webapp)
        .with_var("sayHelloTo", "Nabchan");
    writer.render("/thymeleaf/test.html", ctx).unwrap();

    assert_eq!(
        response.body_string(),
        lines(&[
            "<!DOCTYPE html>",
            "<html>",
            "<body>",
            "<p>I am parameter.</p>",
            "<p>Nabchan</p>",
            "<p>Hello there!</p>",
            "</body>",
            "</html>",
        ])
    );
}

#[test]
fn configuration_error_writes_nothing() {
    let writer = ResponseWriter::builder().build().unwrap();
    let request = SimpleRequest::new("GET", "/");

    for _ in 0..2 {
        let mut response = BufferedResponse::new();
        let err = writer
            .render("/test.html", RenderContext::new(&request, &mut response))
            .unwrap_err();
        assert!(matches!(err, WriterError::Configuration(_)));
        assert!(response.body().is_empty());
    }
}

#[test]
fn engine_context_is_built_fresh_per_call() {
    let mut engine = MiniJinjaEngine::new();
    engine.add_resolver(Arc::new(
        InlineResolver::new().with_template("/n.html", "{{ n | default('none') }}"),
    ));
    let writer = ResponseWriter::builder().engine(engine).build().unwrap();
    let request = SimpleRequest::new("GET", "/");

    let mut first = BufferedResponse::new();
    writer
        .render("/n.html", RenderContext::new(&request, &mut first).with_var("n", 1))
        .unwrap();
    let mut second = BufferedResponse::new();
    writer
        .render("/n.html", RenderContext::new(&request, &mut second))
        .unwrap();

    assert_eq!(first.body_string(), "1");
    assert_eq!(second.body_string(), "none");
}
