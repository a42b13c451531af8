use crate::parcel::point::{centroid, extract_with_order, Point};
use crate::Result;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct Params {
    pub text: String,
    #[serde(default)]
    pub swap: bool,
}

#[derive(Serialize)]
pub struct Res {
    pub points: Vec<Point>,
    pub centroid: Option<Point>,
}

pub fn run(params: Params) -> Result<Res> {
    let points = extract_with_order(&params.text, params.swap);
    Ok(Res {
        centroid: centroid(&points),
        points,
    })
}
