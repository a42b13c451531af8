use crate::wfs::{Resolver, WfsClient};
use crate::{Error, Result};
use actix_web::{
    post,
    web::{Data, Json},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{error, info};

#[derive(Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: RpcMethod,
    pub params: Option<Value>,
    pub id: Value,
}

#[derive(Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum RpcMethod {
    AnalyzeParcel,
    ExtractPoints,
    ComputeArea,
    GetSources,
}

#[derive(Serialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Value,
}

#[derive(Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    pub data: Option<Value>,
}

impl RpcError {
    fn parse_error(data: Option<Value>) -> Self {
        Self {
            code: -32700,
            message: "Parse error".into(),
            data,
        }
    }

    fn invalid_request(data: Option<Value>) -> Self {
        Self {
            code: -32600,
            message: "Invalid Request".into(),
            data,
        }
    }

    fn invalid_params(data: Option<Value>) -> Self {
        Self {
            code: -32602,
            message: "Invalid params".into(),
            data,
        }
    }

    fn server_error(data: Option<Value>) -> Self {
        Self {
            code: -32000,
            message: "Server error".into(),
            data,
        }
    }
}

impl From<Error> for RpcError {
    fn from(error: Error) -> Self {
        let data = Some(Value::String(error.to_string()));
        match error {
            Error::InvalidInput(_) => RpcError::invalid_params(data),
            _ => RpcError::server_error(data),
        }
    }
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            result: None,
            error: Some(error),
            id,
        }
    }

    pub fn from<R>(id: Value, val: R) -> Result<Self>
    where
        R: Serialize,
    {
        Ok(Self::success(id, serde_json::to_value(&val)?))
    }
}

#[post("")]
pub async fn handle(req_body: String, resolver: Data<Resolver<WfsClient>>) -> Json<RpcResponse> {
    let Ok(req) = serde_json::from_str::<Map<String, Value>>(&req_body) else {
        let error_data = json!("Request body is not a valid JSON object");
        return Json(RpcResponse::error(
            Value::Null,
            RpcError::parse_error(Some(error_data)),
        ));
    };
    let id = req.get("id").cloned().unwrap_or_default();
    let req: RpcRequest = match serde_json::from_value(Value::Object(req)) {
        Ok(val) => val,
        Err(e) => {
            let data = Value::String(e.to_string());
            return Json(RpcResponse::error(id, RpcError::invalid_request(Some(data))));
        }
    };
    if req.jsonrpc != "2.0" {
        let data = json!("Field jsonrpc must be \"2.0\"");
        return Json(RpcResponse::error(
            req.id,
            RpcError::invalid_request(Some(data)),
        ));
    }
    info!(method = ?req.method, "Handling RPC call");
    let id = req.id.clone();
    match dispatch(req, &resolver).await {
        Ok(res) => Json(res),
        Err(e) => {
            if !matches!(e, Error::InvalidInput(_)) {
                error!(error = %e, "RPC call failed");
            }
            Json(RpcResponse::error(id, e.into()))
        }
    }
}

async fn dispatch(req: RpcRequest, resolver: &Resolver<WfsClient>) -> Result<RpcResponse> {
    match req.method {
        RpcMethod::AnalyzeParcel => RpcResponse::from(
            req.id,
            super::analyze_parcel::run(params(req.params)?, resolver).await?,
        ),
        RpcMethod::ExtractPoints => RpcResponse::from(
            req.id,
            super::extract_points::run(params(req.params)?)?,
        ),
        RpcMethod::ComputeArea => {
            RpcResponse::from(req.id, super::compute_area::run(params(req.params)?)?)
        }
        RpcMethod::GetSources => RpcResponse::from(req.id, super::get_sources::run(resolver)?),
    }
}

fn params<T>(val: Option<Value>) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_value(val.unwrap_or_default())
        .map_err(|e| Error::InvalidInput(format!("Invalid params: {e}")))
}
