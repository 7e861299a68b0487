use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tokio::select! {
        res = server::run() => res,
        _ = tokio::signal::ctrl_c() => {
            info!("received Ctrl+C, shutting down");
            Ok(())
        }
    }
}
