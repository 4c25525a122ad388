use otpd::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::setup();

    let state = otpd::initialize_state().await?;
    let listener = tokio::net::TcpListener::bind(&state.config.listen).await?;

    tracing::info!(address = %state.config.listen, "otpd listening");

    axum::serve(listener, otpd::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot install ctrl-c handler");
    }
}
