//! Utility functions shared across the application.

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::warn;

/// Find an available port, starting from the preferred port.
///
/// Tries the preferred port first, then the next 10 consecutive ports, and
/// finally lets the OS assign one.
pub async fn find_available_port(host: &str, preferred: u16) -> std::io::Result<u16> {
    let addr: SocketAddr = format!("{}:{}", host, preferred)
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    if let Ok(listener) = TcpListener::bind(addr).await {
        drop(listener);
        return Ok(preferred);
    }

    warn!(port = preferred, "Preferred port unavailable, probing alternatives");

    for offset in 1..=10u16 {
        let Some(port) = preferred.checked_add(offset) else {
            break;
        };
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        if let Ok(listener) = TcpListener::bind(addr).await {
            drop(listener);
            return Ok(port);
        }
    }

    // Let the OS pick
    let addr: SocketAddr = format!("{}:0", host)
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let listener = TcpListener::bind(addr).await?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_available_port_prefers_free_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let free = listener.local_addr().unwrap().port();
        drop(listener);

        let port = find_available_port("127.0.0.1", free).await.unwrap();
        assert_eq!(port, free);
    }

    #[tokio::test]
    async fn test_find_available_port_skips_taken_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let taken = listener.local_addr().unwrap().port();

        let port = find_available_port("127.0.0.1", taken).await.unwrap();
        assert_ne!(port, taken);
    }
}
