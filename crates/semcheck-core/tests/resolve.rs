use semcheck_core::{Config, ResolveFailure, RuleConfig, SpecConfig, SpecResolver};
use semcheck_docs::DocumentError;
use semcheck_llm::mock::MockProvider;
use semcheck_reduce::{ReduceError, Strategy};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GUIDE: &str = "# Guide\n\
                     Intro text.\n\
                     \n\
                     ## Errors\n\
                     Return 404 for missing resources.\n\
                     Return 400 for malformed input.\n\
                     \n\
                     ## Caching\n\
                     Responses carry an ETag.\n";

const STATUS_PAGE: &str = "<html><body>\
    <section id=\"status.codes\">\
    <h2>15. Status Codes</h2>\
    <p>200 OK</p><p>404 Not Found</p><p>500 Internal Server Error</p>\
    </section></body></html>";

fn spec(path: impl Into<String>, specifically: Option<&str>) -> SpecConfig {
    SpecConfig {
        path: path.into(),
        specifically: specifically.map(str::to_string),
    }
}

fn rule(name: &str, specs: Vec<SpecConfig>) -> RuleConfig {
    RuleConfig {
        name: name.into(),
        description: format!("{name} description"),
        enabled: true,
        specs,
    }
}

fn resolver(mock: MockProvider, strategy: Strategy, budget: usize) -> SpecResolver<MockProvider> {
    let mut config = Config::default();
    config.reducer.strategy = strategy;
    config.reducer.budget = budget;
    config.reducer.context_before = 0;
    config.reducer.context_after = 0;
    SpecResolver::from_config(&config, mock)
}

fn write_guide(dir: &tempfile::TempDir) -> String {
    let path = dir.path().join("guide.md");
    std::fs::write(&path, GUIDE).unwrap();
    path.to_str().unwrap().to_string()
}

#[tokio::test]
async fn anchored_local_section_without_hint_is_returned_as_is() {
    let dir = tempfile::tempdir().unwrap();
    let guide = write_guide(&dir);
    let mock = MockProvider::failing();
    let resolver = resolver(mock.clone(), Strategy::Regex, 10);

    let rule = rule("errors", vec![spec(format!("{guide}#errors"), None)]);
    let resolved = resolver
        .resolve_spec(&rule, &rule.specs[0], &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        resolved.content,
        "Return 404 for missing resources.\nReturn 400 for malformed input."
    );
    assert!(resolved.over_budget);
    assert!(mock.recorded_requests().is_empty());
}

#[tokio::test]
async fn unhinted_spec_within_budget_is_not_flagged() {
    let dir = tempfile::tempdir().unwrap();
    let guide = write_guide(&dir);
    let resolver = resolver(MockProvider::failing(), Strategy::Regex, 8000);

    let rule = rule("caching", vec![spec(format!("{guide}#caching"), None)]);
    let resolved = resolver
        .resolve_spec(&rule, &rule.specs[0], &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(resolved.content, "Responses carry an ETag.");
    assert!(!resolved.over_budget);
}

#[tokio::test]
async fn hint_reduces_remote_section() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rfc9110.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(STATUS_PAGE, "text/html"))
        .mount(&server)
        .await;

    let mock = MockProvider::with_responses(vec![r#"{"query": "404"}"#.into()]);
    let resolver = resolver(mock.clone(), Strategy::Regex, 20);
    let rule = rule(
        "not-found",
        vec![spec(
            format!("{}/rfc9110.html#status.codes", server.uri()),
            Some("missing resources"),
        )],
    );

    let resolved = resolver
        .resolve_spec(&rule, &rule.specs[0], &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(resolved.content.lines().count(), 1);
    assert!(resolved.content.contains("404 Not Found"));

    let requests = mock.recorded_requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0][1].content.contains("<rule_name>not-found</rule_name>"));
    assert!(
        requests[0][1]
            .content
            .contains("<description>not-found description</description>")
    );
}

#[tokio::test]
async fn rules_sharing_a_document_fetch_it_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rfc9110.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(STATUS_PAGE, "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/rfc9110.html", server.uri());
    let rules = vec![
        rule("a", vec![spec(format!("{url}#status.codes"), None)]),
        rule("b", vec![spec(url.clone(), None)]),
        rule("c", vec![spec(format!("{url}#status.codes"), Some("404"))]),
    ];

    let resolver = resolver(MockProvider::failing(), Strategy::Regex, 8000);
    let results = resolver
        .resolve_all(&rules, &CancellationToken::new())
        .await;

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| !r.has_failures()));
    assert_eq!(resolver.documents().len(), 1);
}

#[tokio::test]
async fn one_failing_rule_does_not_abort_others() {
    let dir = tempfile::tempdir().unwrap();
    let guide = write_guide(&dir);
    let missing = dir.path().join("missing.md");
    let missing = missing.to_str().unwrap().to_string();

    let mut disabled = rule("disabled", vec![spec(guide.clone(), None)]);
    disabled.enabled = false;
    let rules = vec![
        rule(
            "mixed",
            vec![spec(missing.clone(), None), spec(format!("{guide}#caching"), None)],
        ),
        disabled,
        rule("ok", vec![spec(format!("{guide}#guide"), None)]),
    ];

    let resolver = resolver(MockProvider::failing(), Strategy::Regex, 8000);
    let results = resolver
        .resolve_all(&rules, &CancellationToken::new())
        .await;

    let names: Vec<_> = results.iter().map(|r| r.rule.as_str()).collect();
    assert_eq!(names, ["mixed", "ok"]);

    let mixed = &results[0];
    assert!(mixed.has_failures());
    let err = mixed.specs[0].as_ref().unwrap_err();
    assert_eq!(err.rule, "mixed");
    assert_eq!(err.spec_path, missing);
    assert!(matches!(
        err.reason,
        ResolveFailure::Document(DocumentError::FetchFailed { status: None, .. })
    ));
    assert!(err.to_string().starts_with(&format!(
        "could not resolve specification {missing} for rule mixed: "
    )));
    assert_eq!(
        mixed.specs[1].as_ref().unwrap().content,
        "Responses carry an ETag."
    );

    assert!(!results[1].has_failures());
}

#[tokio::test]
async fn reduction_errors_are_wrapped() {
    let dir = tempfile::tempdir().unwrap();
    let guide = write_guide(&dir);
    let mock = MockProvider::with_responses(vec![r#"{"query": "teapot"}"#.into()]);
    let resolver = resolver(mock, Strategy::Regex, 10);
    let rule = rule("teapot", vec![spec(guide, Some("418"))]);

    let err = resolver
        .resolve_spec(&rule, &rule.specs[0], &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err.reason,
        ResolveFailure::Reduce(ReduceError::NoRegexMatches { .. })
    ));
}

#[tokio::test]
async fn cancelled_resolution_returns_cancelled() {
    let dir = tempfile::tempdir().unwrap();
    let guide = write_guide(&dir);
    let resolver = resolver(MockProvider::failing(), Strategy::Regex, 10);
    let rule = rule("cancelled", vec![spec(guide, None)]);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let results = resolver.resolve_rule(&rule, &cancel).await;
    let err = results.specs[0].as_ref().unwrap_err();
    assert!(matches!(
        err.reason,
        ResolveFailure::Document(DocumentError::Cancelled { .. })
    ));
    assert!(resolver.documents().is_empty());
}
