pub use error::Error;
mod command;
mod conf;
mod crs;
mod error;
mod parcel;
mod rpc;
mod wfs;
use std::env;
use tracing_subscriber::EnvFilter;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[actix_web::main]
async fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();

    let command = match args.get(1) {
        Some(some) => some,
        None => Err(Error::Cli("No actions passed".into()))?,
    };

    let conf = conf::Conf::load()?;

    match command.as_str() {
        "server" => command::server::run(conf, args.get(2).cloned()).await?,
        "analyze" => command::analyze::run(conf, &args[2..]).await?,
        "sources" => command::sources::run(&conf)?,
        first_arg => Err(Error::Cli(format!("Unknown command: {first_arg}")))?,
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if cfg!(debug_assertions) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    }
}
