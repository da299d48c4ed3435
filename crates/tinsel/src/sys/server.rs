use crate::events::AppEvent;
use async_channel::Sender;
use choreo::remote::{Command, SOCKET_PATH};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

/// Parses one control line. Blank lines are ignored; bad lines are logged.
pub fn parse_line(line: &str) -> Option<AppEvent> {
    if line.trim().is_empty() {
        return None;
    }
    match line.parse::<Command>() {
        Ok(command) => Some(command.into()),
        Err(e) => {
            log::warn!("Ignoring control line '{}': {}", line.trim(), e);
            None
        }
    }
}

pub async fn run_server(tx: Sender<AppEvent>) {
    if std::fs::metadata(SOCKET_PATH).is_ok() {
        let _ = std::fs::remove_file(SOCKET_PATH);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket {}: {}", SOCKET_PATH, e);
            return;
        }
    };
    log::info!("Listening for commands on {}", SOCKET_PATH);

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        if let Some(event) = parse_line(&line)
                            && tx.send(event).await.is_err()
                        {
                            break;
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use choreo::Layout;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("chaos"), Some(AppEvent::SetLayout(Layout::Chaos)));
        assert_eq!(parse_line("hands on\n"), Some(AppEvent::Hands(true)));
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("launch rockets"), None);
    }
}
