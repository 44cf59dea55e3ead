use clap::Parser;
use redlog::config::Config;
use redlog::{server, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::parse();

    server::run(config).await
}
