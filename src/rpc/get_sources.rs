use crate::wfs::{Lookup, Resolver, Source};
use crate::Result;
use serde::Serialize;

#[derive(Serialize)]
pub struct Res {
    pub sources: Vec<Source>,
}

pub fn run<L: Lookup>(resolver: &Resolver<L>) -> Result<Res> {
    Ok(Res {
        sources: resolver.sources().to_vec(),
    })
}
