//! Test doubles for the arrival-time API.
//!
//! [`FakeUpstream`] is a real HTTP server for exercising the client;
//! [`MockSource`] skips HTTP entirely for batch and tracker tests.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{OriginalUri, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::get;
use axum::Router;

use crate::network::PlatformId;

use super::batch::ArrivalSource;
use super::error::FetchError;
use super::types::RawArrival;

/// What the fake saw for one request.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    pub query: HashMap<String, String>,
    pub user_agent: Option<String>,
}

struct Script {
    /// Responses in order; the last one repeats forever.
    responses: Mutex<VecDeque<(u16, String)>>,
    /// Fixed answers for particular stations or platforms, ahead of the
    /// scripted ones.
    pinned: Mutex<HashMap<String, (u16, String)>>,
    seen: Mutex<Vec<SeenRequest>>,
}

/// A scripted HTTP server bound to an ephemeral localhost port.
pub struct FakeUpstream {
    base_url: String,
    script: Arc<Script>,
}

impl FakeUpstream {
    pub async fn start(responses: Vec<(u16, &str)>) -> Self {
        let script = Arc::new(Script {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|(status, body)| (status, body.to_string()))
                    .collect(),
            ),
            pinned: Mutex::new(HashMap::new()),
            seen: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/train_arrival_time_by_id/", get(scripted))
            .route("/train_arrival_time_by_platform/", get(scripted))
            .with_state(Arc::clone(&script));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            script,
        }
    }

    /// A base URL nothing is listening on.
    pub async fn unreachable_base_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn hits(&self) -> usize {
        self.script.seen.lock().unwrap().len()
    }

    /// Requests naming `unit` as their station or platform.
    pub fn hits_for(&self, unit: &str) -> usize {
        self.script
            .seen
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.query.values().any(|v| v == unit))
            .count()
    }

    /// Always answer `unit` with this status and body.
    pub fn pin(&self, unit: &str, status: u16, body: &str) {
        self.script
            .pinned
            .lock()
            .unwrap()
            .insert(unit.to_string(), (status, body.to_string()));
    }

    pub fn last_request(&self) -> Option<SeenRequest> {
        self.script.seen.lock().unwrap().last().cloned()
    }
}

async fn scripted(
    State(script): State<Arc<Script>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let pinned = query
        .values()
        .find_map(|unit| script.pinned.lock().unwrap().get(unit).cloned());

    script.seen.lock().unwrap().push(SeenRequest {
        path: uri.path().to_string(),
        query,
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    let mut responses = script.responses.lock().unwrap();
    let (status, body) = if let Some(answer) = pinned {
        answer
    } else if responses.len() > 1 {
        responses.pop_front().unwrap()
    } else {
        responses.front().cloned().unwrap_or((500, String::new()))
    };

    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        body,
    )
}

/// A record as the upstream would report it.
pub fn record(name: &str, platform: &str, next: &str) -> RawArrival {
    RawArrival {
        mrt: name.into(),
        platform_id: platform.into(),
        next_train_arr: next.into(),
        next_train_destination: "Somewhere".into(),
        status: 1,
        ..Default::default()
    }
}

/// How [`MockSource`] answers one unit.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Succeed with these records; platform fetches take the first.
    Records(Vec<RawArrival>),
    /// Fail terminally.
    Fail,
    /// Never answer.
    Hang,
}

/// An [`ArrivalSource`] answering from a table keyed by station name or
/// platform id. Units missing from the table fail.
#[derive(Default)]
pub struct MockSource {
    replies: Mutex<HashMap<String, Reply>>,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, unit: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(unit.to_string(), reply);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn reply(&self, unit: &str) -> Reply {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .get(unit)
            .cloned()
            .unwrap_or(Reply::Fail)
    }
}

async fn answer(unit: String, reply: Reply) -> Result<Vec<RawArrival>, FetchError> {
    match reply {
        Reply::Records(records) => Ok(records),
        Reply::Fail => Err(FetchError::Unrecoverable { status: 500, unit }),
        Reply::Hang => std::future::pending().await,
    }
}

impl ArrivalSource for MockSource {
    fn fetch_station(
        &self,
        _max_tries: u32,
        station: &str,
    ) -> impl Future<Output = Result<Vec<RawArrival>, FetchError>> + Send {
        answer(station.to_string(), self.reply(station))
    }

    fn fetch_platform(
        &self,
        _max_tries: u32,
        platform: &PlatformId,
    ) -> impl Future<Output = Result<RawArrival, FetchError>> + Send {
        let unit = platform.to_string();
        let reply = self.reply(&unit);
        async move {
            let records = answer(unit.clone(), reply).await?;
            records
                .into_iter()
                .next()
                .ok_or(FetchError::InvalidRecord { unit, index: 0 })
        }
    }
}
