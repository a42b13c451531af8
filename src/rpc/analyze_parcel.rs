use crate::parcel::analysis::{self, Analysis};
use crate::wfs::{Lookup, Resolver};
use crate::Result;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct Params {
    pub text: String,
    #[serde(default)]
    pub swap: bool,
}

pub async fn run<L: Lookup>(params: Params, resolver: &Resolver<L>) -> Result<Analysis> {
    analysis::analyze(&params.text, params.swap, resolver).await
}
