#![allow(dead_code)]

use vendingmachine::domain::item::Item;

/// coke: 1 @ 100, coffee: 2 @ 50, milk: 0 @ 80
pub fn default_items() -> Vec<Item> {
    vec![
        Item::new("coke", 1, 100),
        Item::new("coffee", 2, 50),
        Item::new("milk", 0, 80),
    ]
}

/// Sends a single HTTP/1.1 request over a fresh connection and returns the raw response.
pub async fn raw_request(addr: std::net::SocketAddr, request: &str) -> std::io::Result<String> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut stream = tokio::net::TcpStream::connect(addr).await?;
    stream.write_all(request.as_bytes()).await?;
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await?;
    Ok(String::from_utf8_lossy(&response).into_owned())
}
