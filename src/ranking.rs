//! Great-circle distance and result ranking.

use crate::store::GeoRecord;
use crate::types::Coordinate;
use geo::{Distance, Haversine, Point};

/// Sphere radius used by [`earth_distance`], in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_378_100.0;

/// Distance metrics for ranking candidates.
///
/// - **SphericalLawOfCosines**: sphere of [`EARTH_RADIUS_METERS`], the ranking default
/// - **Haversine**: the `geo` crate's haversine on the mean Earth radius
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    #[default]
    SphericalLawOfCosines,
    Haversine,
}

impl DistanceMetric {
    /// Distance in meters between two lon/lat points.
    pub fn distance(self, a: &Point, b: &Point) -> f64 {
        match self {
            DistanceMetric::SphericalLawOfCosines => earth_distance(a, b),
            DistanceMetric::Haversine => Haversine.distance(*a, *b),
        }
    }
}

/// Great-circle distance by the spherical law of cosines.
///
/// # Examples
///
/// ```rust
/// use geobox::ranking::earth_distance;
/// use geo::Point;
///
/// let ferry_building = Point::new(-122.3937, 37.7955);
/// let mission = Point::new(-122.424817, 37.765914);
/// let d = earth_distance(&ferry_building, &mission);
/// assert!((4_000.0..4_600.0).contains(&d));
/// assert!(earth_distance(&mission, &mission) < 1.0);
/// ```
pub fn earth_distance(a: &Point, b: &Point) -> f64 {
    let (lat1, lon1) = (a.y().to_radians(), a.x().to_radians());
    let (lat2, lon2) = (b.y().to_radians(), b.x().to_radians());
    let cos_angle = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon2 - lon1).cos();
    // Rounding can push the cosine just past 1 for identical points.
    EARTH_RADIUS_METERS * cos_angle.clamp(-1.0, 1.0).acos()
}

/// A candidate with its distance from the query point, in meters.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<R> {
    pub distance: f64,
    pub record: R,
}

/// Sorts every candidate by distance from `query`, nearest first.
///
/// Ties keep their input order. Nothing is dropped.
pub fn rank_by_distance<R: GeoRecord>(query: &Coordinate, candidates: Vec<R>) -> Vec<Ranked<R>> {
    rank_by_distance_with(query, candidates, DistanceMetric::default())
}

pub fn rank_by_distance_with<R: GeoRecord>(
    query: &Coordinate,
    candidates: Vec<R>,
    metric: DistanceMetric,
) -> Vec<Ranked<R>> {
    let origin = query.point();
    let mut ranked: Vec<Ranked<R>> = candidates
        .into_iter()
        .map(|record| Ranked {
            distance: metric.distance(&origin, &record.coordinate().point()),
            record,
        })
        .collect();

    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Pin(&'static str, Coordinate);

    impl GeoRecord for Pin {
        type Id = &'static str;

        fn id(&self) -> &'static str {
            self.0
        }

        fn coordinate(&self) -> &Coordinate {
            &self.1
        }
    }

    fn pin(name: &'static str, lat: &str, lon: &str) -> Pin {
        Pin(name, Coordinate::parse(lat, lon).unwrap())
    }

    #[test]
    fn test_quarter_meridian() {
        let d = earth_distance(&Point::new(0.0, 0.0), &Point::new(0.0, 90.0));
        let expected = EARTH_RADIUS_METERS * std::f64::consts::FRAC_PI_2;
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn test_metrics_agree_roughly() {
        let a = Point::new(-74.0060, 40.7128);
        let b = Point::new(-118.2437, 34.0522);
        let cosines = DistanceMetric::SphericalLawOfCosines.distance(&a, &b);
        let haversine = DistanceMetric::Haversine.distance(&a, &b);
        assert!((cosines - haversine).abs() / haversine < 0.01);
    }

    #[test]
    fn test_rank_sorted_and_complete() {
        let query = Coordinate::parse("37.78452", "-122.39532").unwrap();
        let candidates = vec![
            pin("far", "37.80000", "-122.42000"),
            pin("near", "37.78460", "-122.39540"),
            pin("mid", "37.79000", "-122.40000"),
        ];
        let ranked = rank_by_distance(&query, candidates);

        let names: Vec<_> = ranked.iter().map(|r| r.record.0).collect();
        assert_eq!(names, vec!["near", "mid", "far"]);
        assert!(ranked.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let query = Coordinate::parse("10", "10").unwrap();
        let candidates = vec![
            pin("b", "10.5", "10"),
            pin("a", "10.5", "10"),
            pin("c", "10.5", "10"),
        ];
        let names: Vec<_> = rank_by_distance(&query, candidates)
            .into_iter()
            .map(|r| r.record.0)
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_rank_empty() {
        let query = Coordinate::parse("0", "0").unwrap();
        assert!(rank_by_distance::<Pin>(&query, Vec::new()).is_empty());
    }
}
