mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ride_core::geo::Location;
use ride_core::graph::SpatialGraph;
use ride_core::matching::{
    CancellationToken, DriverId, DriverMatcher, EtaLookupPool, MatchOutcome, RidePreferences,
    RiderId,
};
use ride_core::rating::InMemoryRatingStore;
use ride_core::service::MatchService;
use ride_core::store::InMemoryDriverStore;
use ride_core::test_helpers::{
    distant_driver, driver, failing_eta, fixed_eta, nearby_driver, no_ratings, ratings_from,
    sample_rider,
};

use support::assert_close;

fn matcher() -> DriverMatcher {
    DriverMatcher::new(Arc::new(SpatialGraph::new()))
}

#[test]
fn closest_compatible_driver_wins_the_sample_request() {
    let drivers = vec![nearby_driver(), distant_driver()];
    let ratings = ratings_from(&drivers);

    let best = matcher()
        .find_best_driver(&sample_rider(), &drivers, &ratings, &fixed_eta(10.0))
        .expect("a driver should match");

    assert_eq!(best.driver_id, DriverId(1));
    assert_eq!(best.rating, 4.5);
    assert_eq!(best.eta_minutes, 10.0);
    let expected = (0.5 * 10.0 + 0.3 * best.distance_km) / 4.5;
    assert_close(best.score, expected, 1e-12);
}

#[test]
fn no_drivers_means_no_match() {
    let none = matcher().find_best_driver(&sample_rider(), &[], &no_ratings(), &fixed_eta(10.0));
    assert!(none.is_none());
}

#[test]
fn failed_eta_lookups_exclude_every_driver() {
    let drivers = vec![nearby_driver(), distant_driver()];
    let none = matcher().find_best_driver(&sample_rider(), &drivers, &no_ratings(), &failing_eta());
    assert!(none.is_none());
}

#[test]
fn only_failed_driver_is_skipped() {
    let drivers = vec![nearby_driver(), distant_driver()];
    let near = nearby_driver().location;
    let eta = move |_: Location, to: Location| if to == near { None } else { Some(30.0) };

    let best = matcher()
        .find_best_driver(&sample_rider(), &drivers, &no_ratings(), &eta)
        .expect("second driver still matches");
    assert_eq!(best.driver_id, DriverId(2));
}

#[test]
fn drivers_sharing_one_preference_are_filtered_out() {
    let rider = sample_rider();
    let incompatible = nearby_driver().with_preferences(RidePreferences::new(true, false, true));
    let compatible = distant_driver();

    let best = matcher()
        .find_best_driver(&rider, &[incompatible, compatible], &no_ratings(), &fixed_eta(5.0))
        .expect("compatible driver matches");
    assert_eq!(best.driver_id, DriverId(2));
}

#[test]
fn unrated_driver_scores_with_default_rating() {
    let drivers = vec![nearby_driver()];
    let zero_average = |_: DriverId| Some(0.0);
    let best = matcher()
        .find_best_driver(&sample_rider(), &drivers, &zero_average, &fixed_eta(10.0))
        .expect("match");
    assert_eq!(best.rating, 5.0);
}

#[test]
fn equal_scores_keep_the_first_listed_driver() {
    let here = sample_rider().location;
    let drivers = vec![driver(8, here), driver(3, here), driver(5, here)];

    let best = matcher()
        .find_best_driver(&sample_rider(), &drivers, &no_ratings(), &fixed_eta(4.0))
        .expect("match");
    assert_eq!(best.driver_id, DriverId(8));
}

#[test]
fn concurrent_matching_agrees_with_sequential() {
    let rider = sample_rider();
    let drivers: Vec<_> = (0..60)
        .map(|i| {
            let offset = f64::from(i) * 0.003;
            driver(u64::from(i as u32) + 1, Location::new(40.70 + offset, -74.01 + offset / 2.0))
        })
        .collect();
    let eta = |from: Location, to: Location| Some(from.distance_km(&to) * 3.0 + 1.0);
    let ratings = |id: DriverId| Some(3.0 + (id.0 % 3) as f64 * 0.5);
    let pool = EtaLookupPool::new(4).expect("pool");

    let sequential = matcher().find_best_driver(&rider, &drivers, &ratings, &eta);
    let concurrent = matcher().find_best_driver_concurrent(
        &rider,
        &drivers,
        &ratings,
        &eta,
        &pool,
        &CancellationToken::new(),
    );

    assert!(sequential.is_some());
    assert_eq!(concurrent.matched(), sequential);
}

#[test]
fn cancellation_mid_match_returns_cancelled() {
    let rider = sample_rider();
    let drivers: Vec<_> = (1..=40)
        .map(|i| driver(i, Location::new(40.71, -74.0)))
        .collect();
    let cancel = CancellationToken::new();
    let calls = AtomicUsize::new(0);
    let eta = {
        let cancel = cancel.clone();
        move |_: Location, _: Location| {
            if calls.fetch_add(1, Ordering::SeqCst) == 3 {
                cancel.cancel();
            }
            Some(2.0)
        }
    };
    let pool = EtaLookupPool::new(2).expect("pool");

    let outcome =
        matcher().find_best_driver_concurrent(&rider, &drivers, &no_ratings(), &eta, &pool, &cancel);
    assert_eq!(outcome, MatchOutcome::Cancelled);
}

#[test]
fn service_uses_submitted_ratings() {
    let here = sample_rider().location;
    let ratings = Arc::new(InMemoryRatingStore::new());
    let store = Arc::new(InMemoryDriverStore::from_drivers([
        driver(1, here),
        driver(2, here),
        driver(3, here).unavailable(),
    ]));
    ratings.submit(RiderId(9), DriverId(1), 2.0).unwrap();
    ratings.submit(RiderId(9), DriverId(2), 4.0).unwrap();

    let service = MatchService::new(
        matcher(),
        store.clone(),
        ratings.clone(),
        Arc::new(fixed_eta(6.0)),
    );
    let best = service.match_rider(&sample_rider()).expect("match");
    assert_eq!(best.driver_id, DriverId(2));
    assert_eq!(best.rating, 4.0);

    store.set_available(DriverId(2), false);
    let best = service.match_rider(&sample_rider()).expect("match");
    assert_eq!(best.driver_id, DriverId(1));
}
