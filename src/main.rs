use dotenv::dotenv;
use tracing_subscriber::{fmt, EnvFilter};

use idgate::config::Config;

#[tokio::main]
async fn main() {
    dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::load();
    idgate::start_server(config).await;
}
