use std::sync::Arc;

use {
    anyhow::Context,
    axum::{
        Router,
        body::Body,
        http::Request,
        middleware,
        routing::{get, post},
    },
    tokenproxy_config::TokenProxyConfig,
    tower_http::{
        request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
        trace::TraceLayer,
    },
    tracing::{info, info_span, warn},
};

use crate::{middleware::require_gateway_secret, routes, state::AppState};

/// Build the full router. Layers run outermost-last: request id is set
/// first, then traced, then echoed back on the response.
pub fn build_router(state: Arc<AppState>) -> Router {
    let token_api = Router::new()
        .route("/idp-login", post(routes::idp_login))
        .route("/exchange", post(routes::exchange))
        .route("/refresh", post(routes::refresh))
        .route("/logout", post(routes::logout))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_gateway_secret,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .nest("/api/v1/token", token_api)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                let request_id = req
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                info_span!(
                    "http",
                    method = %req.method(),
                    path = %req.uri().path(),
                    request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

/// Start the proxy and serve until Ctrl-C or SIGTERM.
pub async fn start_gateway(config: TokenProxyConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(&config)?);
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        %addr,
        realm = %config.provider.realm,
        gateway_secret = config.server.gateway_secret.is_some(),
        "token proxy listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("token proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
