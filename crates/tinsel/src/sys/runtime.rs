use crate::events::AppEvent;
use async_channel::Sender;
use std::path::PathBuf;
use std::thread;
use tokio::runtime::{Handle, Runtime};

/// Starts the socket server and the config watcher on a runtime owned by a
/// background thread. The returned handle also runs the image decodes.
pub fn start_background_services(
    tx: Sender<AppEvent>,
    config_path: Option<PathBuf>,
) -> std::io::Result<Handle> {
    let rt = Runtime::new()?;
    let handle = rt.handle().clone();

    {
        let tx = tx.clone();
        rt.spawn(async move {
            crate::sys::server::run_server(tx).await;
        });
    }

    if let Some(path) = config_path {
        rt.spawn(async move {
            crate::config::run_async_watcher(path, tx).await;
        });
    }

    thread::Builder::new()
        .name("tinsel-runtime".into())
        .spawn(move || rt.block_on(std::future::pending::<()>()))?;

    Ok(handle)
}
