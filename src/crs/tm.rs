//! Transverse Mercator forward projection on GRS80, Krüger series to 4th order.
//!
//! Millimetre accuracy within a few degrees of the central meridian, which covers every
//! Polish grid this crate talks to.

const GRS80_A: f64 = 6378137.0;
const GRS80_F: f64 = 1.0 / 298.257222101;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseMercator {
    pub central_meridian: f64,
    pub scale: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

impl TransverseMercator {
    /// PUWG 1992, EPSG:2180
    pub const PUWG_1992: TransverseMercator = TransverseMercator {
        central_meridian: 19.0,
        scale: 0.9993,
        false_easting: 500000.0,
        false_northing: -5300000.0,
    };

    /// PUWG 2000 zone, EPSG:2176 (zone 5) to EPSG:2179 (zone 8).
    pub fn puwg_2000(zone: u8) -> TransverseMercator {
        TransverseMercator {
            central_meridian: zone as f64 * 3.0,
            scale: 0.999923,
            false_easting: zone as f64 * 1_000_000.0 + 500000.0,
            false_northing: 0.0,
        }
    }

    /// Returns (easting, northing) in meters.
    pub fn forward(&self, lat: f64, lon: f64) -> (f64, f64) {
        let n = GRS80_F / (2.0 - GRS80_F);
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let rectifying_radius = GRS80_A / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0);
        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0,
            49561.0 * n4 / 161280.0,
        ];
        let e = 2.0 * n.sqrt() / (1.0 + n);

        let phi = lat.to_radians();
        let lambda = (lon - self.central_meridian).to_radians();
        let sin_phi = phi.sin();
        let t = (sin_phi.atanh() - e * (e * sin_phi).atanh()).sinh();
        let xi_prime = t.atan2(lambda.cos());
        let eta_prime = (lambda.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_prime;
        let mut eta = eta_prime;
        for (j, a) in alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += a * (k * xi_prime).sin() * (k * eta_prime).cosh();
            eta += a * (k * xi_prime).cos() * (k * eta_prime).sinh();
        }

        (
            self.false_easting + self.scale * rectifying_radius * eta,
            self.false_northing + self.scale * rectifying_radius * xi,
        )
    }
}
