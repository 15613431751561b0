use std::{convert::Infallible, net::SocketAddr, path::PathBuf};

use async_graphql::http::GraphiQLSource;
use async_graphql_warp::{GraphQLBadRequest, GraphQLResponse};
use tracing::info;
use warp::{
    http::{Response as HttpResponse, StatusCode},
    Filter, Rejection, Reply,
};

use crate::api::Schema;

/// Certificate and key used to serve over TLS.
pub(crate) struct Tls {
    pub(crate) cert: PathBuf,
    pub(crate) key: PathBuf,
}

/// Serves the schema on `POST /` and GraphiQL on `GET /` until the process
/// is stopped.
pub(crate) async fn serve(schema: Schema, addr: SocketAddr, tls: Option<Tls>) {
    let graphql_post = async_graphql_warp::graphql(schema).and_then(
        |(schema, request): (Schema, async_graphql::Request)| async move {
            Ok::<_, Infallible>(GraphQLResponse::from(schema.execute(request).await))
        },
    );

    let graphiql = warp::path::end().and(warp::get()).map(|| {
        HttpResponse::builder()
            .header("content-type", "text/html")
            .body(GraphiQLSource::build().endpoint("/").finish())
    });

    let routes = graphiql.or(graphql_post).recover(recover);

    match tls {
        Some(tls) => {
            info!(%addr, "serving over https");
            warp::serve(routes)
                .tls()
                .cert_path(tls.cert)
                .key_path(tls.key)
                .run(addr)
                .await;
        }
        None => {
            info!(%addr, "serving over http");
            warp::serve(routes).run(addr).await;
        }
    }
}

async fn recover(err: Rejection) -> Result<impl Reply, Infallible> {
    if let Some(GraphQLBadRequest(err)) = err.find() {
        return Ok(warp::reply::with_status(
            err.to_string(),
            StatusCode::BAD_REQUEST,
        ));
    }

    Ok(warp::reply::with_status(
        "INTERNAL_SERVER_ERROR".to_string(),
        StatusCode::INTERNAL_SERVER_ERROR,
    ))
}
