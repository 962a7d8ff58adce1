use mock_server::{API_KEY_HEADER, ROUTES};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    let addr = listener.local_addr()?;

    println!("mock tenant API on http://{addr} (every route requires {API_KEY_HEADER})");
    for (methods, path) in ROUTES {
        println!("  {methods:<18} {path}");
    }

    mock_server::run(listener).await
}
