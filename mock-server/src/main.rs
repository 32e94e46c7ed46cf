use tokio::net::TcpListener;

/// Runs the echo service standalone, e.g. to point a client at it by hand.
/// `ECHO_ADDR` sets the full bind address; otherwise `PORT` on loopback.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let addr = match std::env::var("ECHO_ADDR") {
        Ok(addr) => addr,
        Err(_) => {
            let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
            format!("127.0.0.1:{port}")
        }
    };
    let listener = TcpListener::bind(&addr).await?;
    let local = listener.local_addr()?;
    println!("echo routes: /echo /multipart /empty /malformed /binary /status/{{code}}");
    println!("echo server listening on {local}");
    mock_server::run(listener).await
}
