use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use unibox_m3u::ExportEntry;
use utoipa::OpenApi;

use crate::page;
use crate::redirect::ResolveError;
use crate::workspace::Workspace;

#[derive(OpenApi)]
#[openapi(
    info(description = "unibox API"),
    paths(refresh_channels, get_stream, get_stats, download_playlist)
)]
pub struct ApiDoc;

pub fn router(state: Arc<Workspace>) -> Router {
    Router::new()
        .route("/", get(get_catalog))
        .route("/atualizar-canais", get(refresh_channels))
        .route("/stream/{index}", get(get_stream))
        .route("/stats", get(get_stats))
        .route("/baixar-m3u", get(download_playlist))
        .route("/openapi.json", get(async || Json(ApiDoc::openapi())))
        .with_state(state)
}

pub async fn serve(
    addr: SocketAddr,
    state: Arc<Workspace>,
    token: CancellationToken,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&addr).await?;

    info!("Listening on http://{}", &addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(token.cancelled_owned())
        .await?;

    Ok(())
}

mod model {
    use chrono::{DateTime, Utc};
    use serde::Serialize;
    use utoipa::ToSchema;

    #[derive(Serialize, ToSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct RefreshResult {
        pub success: bool,
        pub canais: usize,
        pub ultima_atualizacao: Option<DateTime<Utc>>,
    }
}

fn host(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::HOST)?.to_str().ok()
}

async fn get_catalog(State(workspace): State<Arc<Workspace>>, headers: HeaderMap) -> Html<String> {
    let snapshot = workspace.store().snapshot();
    let counts = workspace.viewers().current_counts();
    let base_url = workspace.base_url(host(&headers));

    Html(page::catalog(
        workspace.catalog(),
        &snapshot,
        &counts,
        &base_url,
    ))
}

#[utoipa::path(
    get,
    path = "/atualizar-canais",
    responses((status = 200, body = model::RefreshResult)),
)]
async fn refresh_channels(State(workspace): State<Arc<Workspace>>) -> Json<model::RefreshResult> {
    let success = workspace.refresher().refresh().await.is_ok();
    let snapshot = workspace.store().snapshot();

    Json(model::RefreshResult {
        success,
        canais: snapshot.len(),
        ultima_atualizacao: snapshot.refreshed_at,
    })
}

#[utoipa::path(
    get,
    path = "/stream/{index}",
    params(("index" = usize, Path)),
    responses(
        (status = FOUND, description = "Redirect to the channel's stream"),
        (status = NOT_FOUND),
        (status = SERVICE_UNAVAILABLE, content_type = "text/html"),
    ),
)]
async fn get_stream(
    State(workspace): State<Arc<Workspace>>,
    Path(index): Path<String>,
) -> Response {
    // Strict parse: a trailing suffix such as `1abc` is not read as index 1.
    let resolved = index
        .parse::<usize>()
        .map_err(|_| ResolveError::NotFound)
        .and_then(|index| workspace.redirector().resolve(index));

    match resolved {
        Ok(url) => {
            debug!(%index, %url, "Redirecting to stream");
            (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
        }
        Err(ResolveError::NotFound) => {
            (StatusCode::NOT_FOUND, "Canal não encontrado").into_response()
        }
        Err(ResolveError::NotReady { name }) => {
            (StatusCode::SERVICE_UNAVAILABLE, Html(page::not_ready(&name))).into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/stats",
    responses((status = 200, body = BTreeMap<String, usize>)),
)]
async fn get_stats(State(workspace): State<Arc<Workspace>>) -> Json<BTreeMap<usize, usize>> {
    Json(workspace.viewers().current_counts())
}

#[utoipa::path(
    get,
    path = "/baixar-m3u",
    responses((status = 200, content_type = "application/octet-stream")),
)]
async fn download_playlist(
    State(workspace): State<Arc<Workspace>>,
    headers: HeaderMap,
) -> Response {
    let snapshot = workspace.store().snapshot();
    let catalog = workspace.catalog();
    let base_url = workspace.base_url(host(&headers));

    let urls = (0..snapshot.len())
        .map(|index| format!("{base_url}/stream/{index}"))
        .collect::<Vec<_>>();

    let playlist = unibox_m3u::write_playlist(snapshot.channels.iter().zip(&urls).map(
        |(channel, url)| ExportEntry {
            name: &channel.name,
            url,
            logo: catalog.logo_url.as_deref(),
            group: catalog.group_title.as_deref(),
        },
    ));

    let disposition = format!("attachment; filename={}", catalog.download_filename);
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        playlist,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::config::CatalogConfig;
    use crate::refresh::Refresher;
    use crate::source::Source;
    use crate::store::ChannelStore;
    use crate::viewers::ViewerCounter;

    const PLAYLIST: &str =
        "#EXTINF:-1,Channel A\nhttp://x/a.m3u8\n#EXTINF:-1,Channel B\n#AGUARDANDO\n";

    struct StaticSource(Option<&'static str>);

    #[async_trait]
    impl Source for StaticSource {
        async fn fetch(&self) -> anyhow::Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("unreachable"))
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    async fn workspace(source: StaticSource, public_url: Option<&str>) -> Arc<Workspace> {
        let store = Arc::new(ChannelStore::default());
        let viewers = ViewerCounter::new(Duration::from_secs(5), CancellationToken::new());
        let refresher = Arc::new(Refresher::new(
            Arc::new(source),
            store.clone(),
            vec!["Placeholder".to_string()],
            Duration::from_secs(15),
        ));

        refresher.refresh().await.ok();

        Arc::new(Workspace::new(
            store,
            viewers,
            refresher,
            CatalogConfig::default(),
            public_url.map(str::to_string),
        ))
    }

    async fn get(workspace: Arc<Workspace>, uri: &str) -> Response {
        get_with_host(workspace, uri, "localhost:3000").await
    }

    async fn get_with_host(workspace: Arc<Workspace>, uri: &str, host: &str) -> Response {
        let request = Request::get(uri)
            .header(header::HOST, host)
            .body(Body::empty())
            .unwrap();

        router(workspace).oneshot(request).await.unwrap()
    }

    async fn body(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_catalog() {
        let workspace = workspace(StaticSource(Some(PLAYLIST)), None).await;

        let response = get(workspace, "/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body(response).await;
        assert!(body.contains("Channel A"));
        assert!(body.contains("Channel B"));
        assert!(body.contains(r#"href="/stream/1""#));
        assert!(body.contains(&htmlescape::encode_attribute(
            r#""http://localhost:3000/stream/1""#
        )));
    }

    #[tokio::test]
    async fn test_catalog_quotes_in_host() {
        let workspace = workspace(StaticSource(Some(PLAYLIST)), None).await;

        let response = get_with_host(workspace, "/", "x');alert(1);('").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body(response).await;
        assert!(!body.contains("');alert(1);('"));
        assert!(body.contains(&htmlescape::encode_attribute(
            r#""http://x');alert(1);('/stream/0""#
        )));
    }

    #[tokio::test]
    async fn test_stream_redirect() {
        let workspace = workspace(StaticSource(Some(PLAYLIST)), None).await;

        let response = get(workspace.clone(), "/stream/0").await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "http://x/a.m3u8");
        assert_eq!(workspace.viewers().current_counts()[&0], 1);
    }

    #[tokio::test]
    async fn test_stream_not_found() {
        let workspace = workspace(StaticSource(Some(PLAYLIST)), None).await;

        for uri in ["/stream/5", "/stream/-1", "/stream/abc", "/stream/1abc"] {
            let response = get(workspace.clone(), uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_stream_not_ready() {
        let workspace = workspace(StaticSource(Some(PLAYLIST)), None).await;

        let response = get(workspace.clone(), "/stream/1").await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(body(response).await.contains("Channel B"));
        assert!(workspace.viewers().current_counts().is_empty());
    }

    #[tokio::test]
    async fn test_stats() {
        let workspace = workspace(StaticSource(Some(PLAYLIST)), None).await;
        get(workspace.clone(), "/stream/0").await;
        get(workspace.clone(), "/stream/0").await;

        let response = get(workspace, "/stats").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, r#"{"0":2}"#);
    }

    #[tokio::test]
    async fn test_refresh() {
        let workspace = workspace(StaticSource(Some(PLAYLIST)), None).await;

        let response = get(workspace, "/atualizar-canais").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body(response).await).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["canais"], 2);
        assert!(json["ultimaAtualizacao"].is_string());
    }

    #[tokio::test]
    async fn test_refresh_failure_with_placeholders() {
        let workspace = workspace(StaticSource(None), None).await;

        let response = get(workspace, "/atualizar-canais").await;

        let json: serde_json::Value = serde_json::from_str(&body(response).await).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["canais"], 1);
        assert!(json["ultimaAtualizacao"].is_null());
    }

    #[tokio::test]
    async fn test_download_playlist() {
        let workspace = workspace(StaticSource(Some(PLAYLIST)), None).await;

        let response = get(workspace, "/baixar-m3u").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=record_tv.m3u"
        );
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );

        let entries = unibox_m3u::parse(&body(response).await);
        let names = entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["Channel A", "Channel B"]);
        assert_eq!(
            entries[1].location,
            unibox_m3u::Location::Url("http://localhost:3000/stream/1".to_string())
        );
    }

    #[tokio::test]
    async fn test_download_playlist_with_public_url() {
        let workspace = workspace(StaticSource(Some(PLAYLIST)), Some("https://tv.example.com/")).await;

        let body = body(get(workspace, "/baixar-m3u").await).await;

        assert!(body.contains("\nhttps://tv.example.com/stream/0\n"));
    }

    #[tokio::test]
    async fn test_openapi() {
        let workspace = workspace(StaticSource(Some(PLAYLIST)), None).await;

        let response = get(workspace, "/openapi.json").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.contains("/atualizar-canais"));
    }
}
