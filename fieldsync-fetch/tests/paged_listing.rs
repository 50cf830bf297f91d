//! Integration tests: the executor and pagination driver against an
//! in-memory backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fieldsync_core::Constraint;
use fieldsync_fetch::{
    CancellationToken, ClientSettings, HttpRequest, HttpResponse, ListPage, ListQuery, SortOrder,
    StaticToken, SyncClient, Transport, TransportError, fetch_all,
};
use serde_json::{Value, json};
use tokio::time::Instant;

/// Serves `total` numbered rows, honoring `cursor` and `limit`, and fails
/// every `flaky_every`-th request with a 503.
struct Backend {
    total: u64,
    flaky_every: Option<usize>,
    log: Mutex<Vec<(String, Instant)>>,
}

impl Backend {
    fn new(total: u64) -> Arc<Self> {
        Arc::new(Self {
            total,
            flaky_every: None,
            log: Mutex::new(Vec::new()),
        })
    }

    fn flaky(total: u64, every: usize) -> Arc<Self> {
        Arc::new(Self {
            total,
            flaky_every: Some(every),
            log: Mutex::new(Vec::new()),
        })
    }

    fn urls(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
    }

    fn times(&self) -> Vec<Instant> {
        self.log.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait]
impl Transport for Backend {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let count = {
            let mut log = self.log.lock().unwrap();
            log.push((request.url.to_string(), Instant::now()));
            log.len()
        };
        if self.flaky_every.is_some_and(|n| count % n == 0) {
            return Ok(HttpResponse::new(503, "unavailable"));
        }

        let param = |name: &str| {
            request
                .url
                .query_pairs()
                .find(|(k, _)| k == name)
                .and_then(|(_, v)| v.parse::<u64>().ok())
                .unwrap_or(0)
        };
        let cursor = param("cursor");
        let limit = param("limit");
        let end = (cursor + limit).min(self.total);
        let results: Vec<Value> = (cursor..end)
            .map(|n| json!({"_id": format!("t{n}"), "Title": format!("Task {n}")}))
            .collect();

        let body = json!({"response": {
            "cursor": cursor,
            "results": results,
            "remaining": self.total - end,
            "count": end - cursor,
        }});
        Ok(HttpResponse::new(200, body.to_string()))
    }
}

fn client(backend: &Arc<Backend>) -> SyncClient {
    SyncClient::builder(ClientSettings::new("https://backend.test/api/1.1"))
        .transport(Arc::clone(backend))
        .credentials(StaticToken::new("token"))
        .build()
        .unwrap()
}

async fn list_all(
    client: &SyncClient,
    query: &ListQuery,
    page_size: u32,
) -> Result<Vec<Value>, fieldsync_fetch::SyncError> {
    let cancel = CancellationToken::new();
    fetch_all(
        page_size.try_into().unwrap(),
        &cancel,
        |cursor| {
            let cancel = cancel.clone();
            async move {
                let request =
                    query.to_request("obj/task", cursor.offset(), cursor.page_size())?;
                let page: ListPage<Value> = client
                    .execute_with_report(&request, &cancel)
                    .await
                    .into_result()?;
                Ok(page.results)
            }
        },
    )
    .await
}

#[tokio::test(start_paused = true)]
async fn test_walks_every_page_in_order() {
    let backend = Backend::new(230);
    let client = client(&backend);

    let rows = list_all(&client, &ListQuery::new(), 100).await.unwrap();

    assert_eq!(rows.len(), 230);
    assert_eq!(rows[0]["_id"], "t0");
    assert_eq!(rows[229]["title"], "Task 229");
    assert_eq!(backend.urls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_query_parameters_reach_the_wire() {
    let backend = Backend::new(3);
    let client = client(&backend);
    let query = ListQuery::filtered(Constraint::equals("status", "open"))
        .sorted_by("due_date", SortOrder::Asc);

    list_all(&client, &query, 10).await.unwrap();

    let url = url::Url::parse(&backend.urls()[0]).unwrap();
    let params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(url.path(), "/api/1.1/obj/task");
    assert!(params.contains(&("sort_field".into(), "due_date".into())));
    assert!(params.contains(&("sort_order".into(), "asc".into())));
    assert!(params.contains(&(
        "constraints".into(),
        r#"[{"key":"status","constraint_type":"equals","value":"open"}]"#.into()
    )));
}

#[tokio::test(start_paused = true)]
async fn test_pages_and_retries_share_the_pacing() {
    let backend = Backend::flaky(250, 2);
    let client = client(&backend);

    let rows = list_all(&client, &ListQuery::new(), 100).await.unwrap();
    assert_eq!(rows.len(), 250);

    // Three pages, each second request failing once.
    let times = backend.times();
    assert_eq!(times.len(), 5);
    for pair in times.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(500));
    }
}
