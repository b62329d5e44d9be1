//! HTTP listener

use axum::Router;
use tokio::net::TcpListener;

use crate::prelude::*;

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		error!("Cannot listen for the shutdown signal: {}", err);
		std::future::pending::<()>().await;
	}
	info!("Shutdown signal received");
}

/// Serves `router` on the configured address until Ctrl-C
pub async fn serve(app: App, router: Router) -> ClResult<()> {
	let listener = TcpListener::bind(app.opts.listen.as_ref()).await.map_err(|e| {
		error!("FATAL: Cannot listen on {}: {}", app.opts.listen, e);
		e
	})?;
	info!("Listening on HTTP {}", app.opts.listen);
	info!("Admin page: {}/admin", app.opts.base_url.trim_end_matches('/'));

	axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;
	Ok(())
}

// vim: ts=4
