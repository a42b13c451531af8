use crate::conf::Conf;
use crate::rpc;
use crate::wfs::{Resolver, WfsClient};
use crate::Result;
use actix_web::dev::Service;
use actix_web::web::scope;
use actix_web::{
    middleware::{Compress, NormalizePath},
    web::Data,
    App, HttpServer,
};
use futures_util::future::FutureExt;
use time::OffsetDateTime;
use tracing::info;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";

pub async fn run(conf: Conf, addr: Option<String>) -> Result<()> {
    let addr = addr.unwrap_or_else(|| DEFAULT_ADDR.into());
    let resolver = Data::new(Resolver::new(WfsClient::new()?, conf.sources));
    info!(addr, sources = resolver.sources().len(), "Starting server");
    HttpServer::new(move || {
        App::new()
            .wrap_fn(|req, srv| {
                let req_method = req.method().as_str().to_string();
                let req_path = req.path().to_string();
                let req_time = OffsetDateTime::now_utc();
                let req_ip = req
                    .connection_info()
                    .realip_remote_addr()
                    .unwrap_or_default()
                    .to_string();
                srv.call(req).map(move |res| {
                    if let Ok(res) = res.as_ref() {
                        let res_status = res.status().as_u16();
                        info!(
                            req_method,
                            req_path,
                            req_ip,
                            res_status,
                            res_time_sec = (OffsetDateTime::now_utc() - req_time).as_seconds_f64(),
                        );
                    }

                    res
                })
            })
            .wrap(NormalizePath::trim())
            .wrap(Compress::default())
            .app_data(resolver.clone())
            .service(scope("rpc").service(rpc::handler::handle))
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
