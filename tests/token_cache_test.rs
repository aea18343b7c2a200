use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bodega::{
    AccessToken, BearerTokenPolicy, ClientError, Context, HttpTransport, Pipeline, Request,
    Response, ResponseBody, TokenCredential,
};
use chrono::Utc;
use reqwest::{Method, StatusCode};
use reqwest::header::HeaderMap;
use std::sync::Mutex;

/// Counts fetches and takes a while per fetch, to widen any race window.
struct SlowCountingCredential {
    fetches: AtomicUsize,
}

#[async_trait]
impl TokenCredential for SlowCountingCredential {
    async fn get_token(
        &self,
        _ctx: &Context,
        _scopes: &[String],
    ) -> Result<AccessToken, ClientError> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(AccessToken::new(
            format!("tok-{n}"),
            Utc::now() + chrono::Duration::hours(1),
        ))
    }
}

/// Records every authorization header it sees.
struct HeaderCapturingTransport {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl HttpTransport for HeaderCapturingTransport {
    async fn send(&self, _ctx: &Context, request: &Request) -> Result<Response, ClientError> {
        let value = request
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("<missing>")
            .to_string();
        self.seen.lock().unwrap().push(value);
        Ok(Response::new(
            StatusCode::OK,
            HeaderMap::new(),
            ResponseBody::empty(),
        ))
    }
}

#[tokio::test]
async fn concurrent_sends_share_one_token_fetch() {
    let credential = Arc::new(SlowCountingCredential { fetches: AtomicUsize::new(0) });
    let transport = Arc::new(HeaderCapturingTransport { seen: Mutex::new(Vec::new()) });
    let pipeline = Pipeline::builder()
        .with_per_retry_policy(Arc::new(BearerTokenPolicy::new(
            credential.clone(),
            vec!["store/.default".to_string()],
        )))
        .build(transport.clone());

    let ctx = Context::background();
    let mut tasks = Vec::new();
    for _ in 0..16 {
        let pipeline = pipeline.clone();
        let ctx = ctx.clone();
        tasks.push(tokio::spawn(async move {
            let mut request = Request::new(Method::GET, "https://shelf.example.com/store");
            pipeline.send(&ctx, &mut request).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(credential.fetches.load(Ordering::SeqCst), 1);
    let seen = transport.seen.lock().unwrap();
    assert_eq!(seen.len(), 16);
    assert!(seen.iter().all(|v| v == "Bearer tok-0"));
}

/// The credential failing must fail the call before the transport runs and
/// without attaching a partial header.
#[tokio::test]
async fn credential_failure_short_circuits_the_chain() {
    struct FailingCredential;

    #[async_trait]
    impl TokenCredential for FailingCredential {
        async fn get_token(
            &self,
            _ctx: &Context,
            _scopes: &[String],
        ) -> Result<AccessToken, ClientError> {
            Err(ClientError::Credential("interactive login required".into()))
        }
    }

    struct UnreachableTransport;

    #[async_trait]
    impl HttpTransport for UnreachableTransport {
        async fn send(&self, _ctx: &Context, _request: &Request) -> Result<Response, ClientError> {
            panic!("transport must not run when the credential fails");
        }
    }

    let pipeline = Pipeline::builder()
        .with_per_retry_policy(Arc::new(BearerTokenPolicy::new(
            Arc::new(FailingCredential),
            vec!["store/.default".to_string()],
        )))
        .build(Arc::new(UnreachableTransport));

    let ctx = Context::background();
    let mut request = Request::new(Method::GET, "https://shelf.example.com/store");
    let err = pipeline.send(&ctx, &mut request).await.unwrap_err();

    assert!(matches!(err, ClientError::Credential(_)));
    assert!(request.headers().get("authorization").is_none());
}
