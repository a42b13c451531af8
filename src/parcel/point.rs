use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-?[0-9]+\.?[0-9]*").expect("number pattern is valid")
});

/// WGS84 point in degrees, serialized as `[lat, lon]` so map widgets can take it as is.
///
/// Values are not range checked, whatever the user pasted is passed through.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Point { lat, lon }
    }

    pub fn swapped(&self) -> Self {
        Point {
            lat: self.lon,
            lon: self.lat,
        }
    }
}

impl From<[f64; 2]> for Point {
    fn from(pair: [f64; 2]) -> Self {
        Point::new(pair[0], pair[1])
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.lat, point.lon]
    }
}

/// Pulls every signed decimal out of `text` and pairs them up in the order they were found.
/// A trailing unpaired number is dropped.
pub fn extract(text: &str) -> Vec<Point> {
    let numbers: Vec<f64> = NUMBER
        .find_iter(text)
        .filter_map(|it| it.as_str().parse::<f64>().ok())
        .collect();
    numbers
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect()
}

/// Reinterprets `[lat, lon]` pairs as `[lon, lat]`. Applying it twice is a no-op.
pub fn swap_order(points: &[Point]) -> Vec<Point> {
    points.iter().map(Point::swapped).collect()
}

pub fn extract_with_order(text: &str, swap: bool) -> Vec<Point> {
    let points = extract(text);
    if swap {
        swap_order(&points)
    } else {
        points
    }
}

pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let count = points.len() as f64;
    Some(Point::new(
        points.iter().map(|it| it.lat).sum::<f64>() / count,
        points.iter().map(|it| it.lon).sum::<f64>() / count,
    ))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn extract_pairs_numbers_in_order() {
        let points = extract("(52.1234, 21.1234) [52.2, 21.3]");
        assert_eq!(
            vec![Point::new(52.1234, 21.1234), Point::new(52.2, 21.3)],
            points
        );
    }

    #[test]
    fn extract_yields_half_the_tokens() {
        for count in 0..9 {
            let text = (0..count)
                .map(|it| format!("{it}.5"))
                .collect::<Vec<_>>()
                .join(" ; ");
            assert_eq!(count / 2, extract(&text).len());
        }
    }

    #[test]
    fn extract_drops_trailing_odd_number() {
        let points = extract("1 2 3 4 5");
        assert_eq!(vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)], points);
    }

    #[test]
    fn extract_keeps_negative_and_out_of_range_values() {
        let points = extract("-33.9 -151.2, 200 -400");
        assert_eq!(
            vec![Point::new(-33.9, -151.2), Point::new(200.0, -400.0)],
            points
        );
    }

    #[test]
    fn extract_ignores_text_without_numbers() {
        assert!(extract("").is_empty());
        assert!(extract("N E S W, no coordinates here").is_empty());
    }

    #[test]
    fn extract_accepts_trailing_dot() {
        assert_eq!(vec![Point::new(50.0, 20.0)], extract("50. 20."));
    }

    #[test]
    fn swap_is_applied_after_pairing() {
        let points = extract_with_order("21.0 52.0 21.5 52.5 7", true);
        assert_eq!(vec![Point::new(52.0, 21.0), Point::new(52.5, 21.5)], points);
    }

    #[test]
    fn swap_is_self_inverse() {
        let points = extract("50.1 20.1 50.2 20.2 50.3 20.3");
        assert_eq!(points, swap_order(&swap_order(&points)));
    }

    #[test]
    fn centroid_is_mean_of_vertices() {
        let points = vec![Point::new(0.0, 0.0), Point::new(2.0, 4.0)];
        assert_eq!(Some(Point::new(1.0, 2.0)), centroid(&points));
        assert_eq!(None, centroid(&[]));
    }

    #[test]
    fn serializes_as_lat_lon_pair() -> crate::Result<()> {
        let json = serde_json::to_string(&Point::new(50.5, 20.25))?;
        assert_eq!("[50.5,20.25]", json);
        let point: Point = serde_json::from_str("[1.0, 2.0]")?;
        assert_eq!(Point::new(1.0, 2.0), point);
        Ok(())
    }
}
