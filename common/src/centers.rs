//! 近隣リサイクルセンターのランキング
//!
//! 固定リストとユーザー座標からハバーサイン距離を計算し、近い順に並べる。

use crate::types::{Coordinates, RankedCenter, RecyclingCenter};

/// 地球半径（km）
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// リサイクルセンター一覧（固定データ）
pub const RECYCLING_CENTERS: &[RecyclingCenter] = &[
    RecyclingCenter {
        id: 1,
        name: "Eco-Friendly Recyclers",
        address: "123 Green Way, Chennai",
        coordinates: Coordinates::new(13.0827, 80.2707),
    },
    RecyclingCenter {
        id: 2,
        name: "SIDCO Industrial Estate",
        address: "26, Thirumazhisai, Chennai, Tamil Nadu 600124",
        coordinates: Coordinates::new(13.05, 80.05),
    },
    RecyclingCenter {
        id: 3,
        name: "Chennai Waste Management",
        address: "456 Recycle Ave, Chennai",
        coordinates: Coordinates::new(13.01, 80.23),
    },
    RecyclingCenter {
        id: 4,
        name: "Planet Savers Inc.",
        address: "789 Earth St, Chennai",
        coordinates: Coordinates::new(13.1, 80.15),
    },
];

/// 2点間の大圏距離（km）
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// 距離の昇順に並べる（同距離は元の順序を維持）
pub fn rank_centers(user: Coordinates, centers: &[RecyclingCenter]) -> Vec<RankedCenter> {
    let mut ranked: Vec<RankedCenter> = centers
        .iter()
        .map(|&center| RankedCenter {
            center,
            distance: haversine_km(user, center.coordinates),
        })
        .collect();
    // sort_byは安定ソート
    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked
}
