//! Session lifecycle against a mock server: login, token propagation,
//! logout, and the one-shot retry on authentication failure.

mod support;

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use opencga::auth::{PasswordPrompt, Token};
use opencga::error::{OpencgaError, RecoverySuggestion, Result};
use opencga::rest::{Category, NoRetry};
use opencga::session::{ClientOptions, OpencgaClient, VersionCheck};

use support::*;

fn password(value: &str) -> Option<SecretString> {
    Some(SecretString::from(value.to_string()))
}

async fn mount_password_login(server: &MockServer, secret: &str, token: &str) {
    Mock::given(method("POST"))
        .and(path(rest_path("users/demo/login")))
        .and(body_json(json!({ "password": secret })))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body(token)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_propagates_token_to_every_sub_client() {
    let server = MockServer::start().await;
    mount_password_login(&server, "pw", "t1").await;

    let client = client_for(&server);
    assert!(client.registry().iter().all(|c| c.token().is_none()));

    let token = client.login(Some("demo"), password("pw")).await.unwrap();
    assert_eq!(token, Token::new("t1"));
    assert_eq!(client.user_id().as_deref(), Some("demo"));

    let tokens: Vec<_> = client.registry().iter().map(|c| c.token()).collect();
    assert_eq!(tokens.len(), 17);
    assert!(tokens.iter().all(|t| t.as_ref() == Some(&token)));
}

#[tokio::test]
async fn requests_carry_the_session_token() {
    let server = MockServer::start().await;
    mount_password_login(&server, "pw", "t1").await;
    Mock::given(method("GET"))
        .and(path(rest_path("files/search")))
        .and(header("authorization", "Bearer t1"))
        .and(query_param("study", "demo@family:platinum"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!([{"id": "a.vcf"}]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.login(Some("demo"), password("pw")).await.unwrap();
    let files = client
        .files()
        .search(&[("study", "demo@family:platinum")])
        .await
        .unwrap();
    assert_eq!(files.num_results(), 1);
    assert_eq!(files.get_result(0), Some(&json!({"id": "a.vcf"})));
}

#[tokio::test]
async fn rejected_login_is_an_authentication_error_without_the_password() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(rest_path("users/demo/login")))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_body("Bad user or password")))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .login(Some("demo"), password("s3cr3t-value"))
        .await
        .unwrap_err();

    assert!(matches!(err, OpencgaError::Authentication(_)));
    assert!(!err.to_string().contains("s3cr3t-value"));
    assert!(!format!("{err:?}").contains("s3cr3t-value"));
    assert!(!format!("{client:?}").contains("s3cr3t-value"));
    assert!(!client.is_logged_in());
    assert_eq!(client.user_id(), None);
}

#[tokio::test]
async fn password_is_not_observable_after_successful_login() {
    let server = MockServer::start().await;
    mount_password_login(&server, "s3cr3t-value", "t1").await;

    let client = client_for(&server);
    let token = client
        .login(Some("demo"), password("s3cr3t-value"))
        .await
        .unwrap();

    let mut visible = vec![
        format!("{client:?}"),
        format!("{token:?}"),
        token.as_str().to_string(),
        format!("{:?}", client.token()),
        format!("{:?}", client.registry()),
        client.user_id().unwrap_or_default(),
    ];
    visible.extend(client.registry().iter().map(|c| format!("{c:?}")));
    visible.extend(
        client
            .registry()
            .iter()
            .filter_map(|c| c.token())
            .map(|t| t.as_str().to_string()),
    );

    assert_eq!(visible.len(), 6 + 17 + 17);
    for text in &visible {
        assert!(!text.contains("s3cr3t-value"), "password leaked in {text}");
    }
}

#[tokio::test]
async fn login_without_user_reuses_stored_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(rest_path("users/demo/login")))
        .and(body_json(json!({ "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body("t1")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(rest_path("users/demo/login")))
        .and(body_json(json!({ "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body("t2")))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.login(Some("demo"), password("pw")).await.unwrap();
    let again = client.login(None, None).await.unwrap();

    assert_eq!(again, Token::new("t2"));
    assert!(client
        .registry()
        .iter()
        .all(|c| c.token() == Some(Token::new("t2"))));
}

#[tokio::test]
async fn login_without_user_before_any_login_is_invalid() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let err = client.login(None, None).await.unwrap_err();
    assert!(matches!(err, OpencgaError::InvalidOperation(_)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn logout_clears_every_sub_client_and_forgets_credentials() {
    let server = MockServer::start().await;
    mount_password_login(&server, "pw", "t1").await;

    let client = client_for(&server);
    client.login(Some("demo"), password("pw")).await.unwrap();
    client.logout();

    assert!(!client.is_logged_in());
    assert_eq!(client.user_id(), None);
    assert!(client.registry().iter().all(|c| c.token().is_none()));
    assert!(matches!(
        client.login(None, None).await,
        Err(OpencgaError::InvalidOperation(_))
    ));
    client.logout();
}

#[tokio::test]
async fn scoped_session_logs_out_on_drop() {
    let server = MockServer::start().await;
    mount_password_login(&server, "pw", "t1").await;

    let client = client_for(&server);
    {
        let session = client.scoped();
        session.login(Some("demo"), password("pw")).await.unwrap();
        assert!(session.jobs().token().is_some());
    }
    assert!(client.registry().iter().all(|c| c.token().is_none()));
}

#[tokio::test]
async fn expired_token_is_refreshed_and_request_retried_once() {
    let server = MockServer::start().await;
    mount_password_login(&server, "pw", "t1").await;
    Mock::given(method("POST"))
        .and(path(rest_path("users/demo/login")))
        .and(header("authorization", "Bearer t1"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body("t2")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(rest_path("samples/s1/info")))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_body("Token expired")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(rest_path("samples/s1/info")))
        .and(header("authorization", "Bearer t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{"id": "s1"}]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.login(Some("demo"), password("pw")).await.unwrap();
    let sample = client.samples().info("s1", &[]).await.unwrap();

    assert_eq!(sample.get_result(0), Some(&json!({"id": "s1"})));
    assert!(client
        .registry()
        .iter()
        .all(|c| c.token() == Some(Token::new("t2"))));
}

#[tokio::test]
async fn second_authentication_failure_is_not_retried_again() {
    let server = MockServer::start().await;
    mount_password_login(&server, "pw", "t1").await;
    Mock::given(method("POST"))
        .and(path(rest_path("users/demo/login")))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body("t2")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(rest_path("studies/st1/info")))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_body("Invalid token")))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.login(Some("demo"), password("pw")).await.unwrap();
    let err = client.studies().info("st1", &[]).await.unwrap_err();

    match err {
        OpencgaError::Authentication(message) => assert_eq!(message, "Invalid token"),
        other => panic!("expected Authentication, got {other:?}"),
    }
}

#[tokio::test]
async fn permission_denied_is_returned_without_refreshing() {
    let server = MockServer::start().await;
    mount_password_login(&server, "pw", "t1").await;
    Mock::given(method("POST"))
        .and(path(rest_path("users/demo/login")))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body("t2")))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(rest_path("studies/st1/info")))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(error_body(
            "Permission denied. User 'demo' cannot VIEW study",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.login(Some("demo"), password("pw")).await.unwrap();
    let err = client.studies().info("st1", &[]).await.unwrap_err();

    match &err {
        OpencgaError::PermissionDenied(message) => {
            assert_eq!(message, "Permission denied. User 'demo' cannot VIEW study")
        }
        other => panic!("expected PermissionDenied, got {other:?}"),
    }
    assert_eq!(err.recovery_suggestion(), RecoverySuggestion::RequestAccess);
    assert_eq!(client.token(), Some(Token::new("t1")));
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn authentication_failure_without_login_is_returned_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(rest_path("projects/p1/info")))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.projects().info("p1", &[]).await.unwrap_err();
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn disabled_retry_surfaces_the_first_failure() {
    let server = MockServer::start().await;
    mount_password_login(&server, "pw", "t1").await;
    Mock::given(method("GET"))
        .and(path(rest_path("cohorts/c1/info")))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_body("Token expired")))
        .expect(1)
        .mount(&server)
        .await;

    let options = ClientOptions::builder()
        .check_versions(false)
        .retry_handler(Arc::new(NoRetry))
        .build();
    let client = OpencgaClient::new(config_for(&server), options).unwrap();
    client.login(Some("demo"), password("pw")).await.unwrap();

    let err = client.cohorts().info("c1", &[]).await.unwrap_err();
    assert!(err.is_auth_failure());
    assert_eq!(client.token(), Some(Token::new("t1")));
}

#[tokio::test]
async fn concurrent_requests_after_login_all_use_the_new_token() {
    let server = MockServer::start().await;
    mount_password_login(&server, "pw", "t1").await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .expect(17)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.login(Some("demo"), password("pw")).await.unwrap();

    let requests = client.registry().iter().map(|c| c.search(&[]));
    let results = futures::future::join_all(requests).await;
    assert!(results.iter().all(|r| r.is_ok()));
}

struct FixedPrompt(&'static str);

impl PasswordPrompt for FixedPrompt {
    fn read_password(&self, _user: &str) -> Result<SecretString> {
        Ok(SecretString::from(self.0.to_string()))
    }
}

#[tokio::test]
async fn missing_password_is_read_from_the_prompt() {
    let server = MockServer::start().await;
    mount_password_login(&server, "prompted", "t1").await;

    let options = ClientOptions::builder()
        .check_versions(false)
        .password_prompt(Arc::new(FixedPrompt("prompted")))
        .build();
    let client = OpencgaClient::new(config_for(&server), options).unwrap();
    client.login(Some("demo"), None).await.unwrap();

    assert_eq!(client.client(Category::Admin).token(), Some(Token::new("t1")));
}

#[tokio::test]
async fn version_mismatch_does_not_fail_construction() {
    let server = MockServer::start().await;
    mount_about(&server, "2.1.3").await;

    let client = OpencgaClient::connect(config_for(&server), ClientOptions::default())
        .await
        .unwrap();
    assert_eq!(
        client.check_versions().await,
        VersionCheck::ClientOlder {
            client: "2.0.0".into(),
            server: "2.1.3".into()
        }
    );
}

#[tokio::test]
async fn unreachable_about_does_not_fail_construction() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(rest_path("meta/about")))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let client = OpencgaClient::connect(config_for(&server), ClientOptions::default())
        .await
        .unwrap();
    assert_eq!(
        client.check_versions().await,
        VersionCheck::Unknown { server: None }
    );
}

#[tokio::test]
async fn help_renders_the_server_catalogue() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(rest_path("meta/api")))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([[
            {
                "name": "Jobs",
                "endpoints": [{
                    "path": "/{apiVersion}/jobs/{jobs}/info",
                    "method": "GET",
                    "description": "Get job information",
                    "parameters": [
                        {"name": "jobs", "type": "string", "description": "Comma separated list of job IDs"}
                    ]
                }]
            },
            {"name": "Meta", "endpoints": []}
        ]]))))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(
        client.help(None, false).await.unwrap(),
        "Available categories:\n    - Jobs\n    - Meta\n"
    );
    assert_eq!(
        client.help(Some("Jobs"), true).await.unwrap(),
        "Jobs endpoints:\n\
         \x20   - /{apiVersion}/jobs/{jobs}/info (GET): Get job information\n\
         \x20       - jobs (string): Comma separated list of job IDs\n"
    );
    assert_eq!(client.help(Some("Nope"), false).await.unwrap(), "");
}

#[tokio::test]
async fn wait_for_job_returns_done_status_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(rest_path("jobs/job-uuid/info")))
        .and(query_param("study", "study-uuid"))
        .and(query_param("include", "status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{
            "status": {"name": "DONE", "date": "20240101120000", "message": ""}
        }]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let target = opencga::job::WaitTarget::ids("ignored", "ignored")
        .with_response(json!({"studyUuid": "study-uuid", "uuid": "job-uuid"}));
    let status = client
        .wait_for_job(target, std::time::Duration::from_secs(10))
        .await
        .unwrap();
    assert_eq!(status.name, opencga::job::JobStatusName::Done);
}

struct CountingRetry(std::sync::atomic::AtomicUsize);

#[async_trait]
impl opencga::rest::RetryHandler for CountingRetry {
    async fn on_auth_failure(
        &self,
        ctx: opencga::rest::RetryContext<'_>,
    ) -> Result<Option<Token>> {
        self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        assert_eq!(ctx.category, Category::Individuals);
        Ok(None)
    }
}

#[tokio::test]
async fn custom_retry_handler_sees_the_failing_category() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(rest_path("individuals/i1/info")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let handler = Arc::new(CountingRetry(Default::default()));
    let options = ClientOptions::builder()
        .check_versions(false)
        .retry_handler(handler.clone())
        .build();
    let client = OpencgaClient::new(config_for(&server), options).unwrap();
    assert!(client.individuals().info("i1", &[]).await.is_err());
    assert_eq!(handler.0.load(std::sync::atomic::Ordering::SeqCst), 1);
}
