//! The route is the pickups of riders `1..=N` in index order, followed by their
//! drop-offs in the same order. Inserting the newest rider `N` adds its pickup
//! after the last active pickup, and its drop-off right after the drop-off of
//! some active rider. Everything here measures what those two additions cost,
//! in distance, and for whom.

use crate::SolverError;
use rpp_core::models::{Point, RouteLedger};
use std::ops::RangeInclusive;
use tracing::{Level, event};

/// The Euclidean distance between two points
pub fn distance(a: &Point, b: &Point) -> f64 {
    a.distance(b)
}

/// The riders already on the route, `1..=N-1`
pub fn active_riders(ledger: &RouteLedger) -> RangeInclusive<usize> {
    ledger.active_indices()
}

/// The active rider picked up last, i.e. where the newest rider's pickup detour starts.
pub fn last_rider_picked_up(ledger: &RouteLedger) -> Result<usize, SolverError> {
    ledger.check_insertable()?;
    Ok(ledger.len() - 1)
}

fn dest(ledger: &RouteLedger, idx: usize) -> Point {
    ledger[idx].destination()
}

/// Extra distance from picking up the newest rider on the way to the first drop-off.
///
/// `dist(s_L, s_N) + dist(s_N, d_1) - dist(s_L, d_1)`, where `L` is the last
/// active rider: a triangle-inequality detour, non-negative up to rounding.
pub fn source_detour(ledger: &RouteLedger) -> Result<f64, SolverError> {
    let last = last_rider_picked_up(ledger)?;
    let newest = &ledger[ledger.len()];

    let from = ledger[last].source();
    let first_drop = dest(ledger, 1);

    Ok(distance(&from, &newest.source()) + distance(&newest.source(), &first_drop)
        - distance(&from, &first_drop))
}

/// Extra distance from dropping the newest rider off right after rider `t_j`'s drop-off.
///
/// With `L` the last active rider:
/// - `t_j == 1`: the newest rider rides straight to its own destination first,
///   `sd_N + dist(d_N, d_1) - dist(s_N, d_1)`
/// - `1 < t_j < L`: `dist(d_{t_j-1}, d_N) + dist(d_N, d_{t_j}) - dist(d_{t_j}, d_{t_j+1})`
/// - `t_j == L`: `dist(d_{t_j-1}, d_N) + dist(d_N, d_{t_j}) - dist(d_{t_j}, d_N)`
/// - otherwise 0
///
/// The `t_j == L` case subtracts a leg it also adds, and is kept exactly as
/// the pricing model states it.
pub fn destination_detour(ledger: &RouteLedger, t_j: usize) -> Result<f64, SolverError> {
    ledger.check_insertion_point(t_j)?;
    let last = ledger.len() - 1;
    let newest = &ledger[ledger.len()];
    let d_n = newest.destination();

    let detour = if t_j == 1 {
        let first_drop = dest(ledger, 1);
        newest.trip_distance() + distance(&d_n, &first_drop)
            - distance(&newest.source(), &first_drop)
    } else if t_j < last {
        distance(&dest(ledger, t_j - 1), &d_n) + distance(&d_n, &dest(ledger, t_j))
            - distance(&dest(ledger, t_j), &dest(ledger, t_j + 1))
    } else if t_j == last {
        distance(&dest(ledger, t_j - 1), &d_n) + distance(&d_n, &dest(ledger, t_j))
            - distance(&dest(ledger, t_j), &d_n)
    } else {
        0.0
    };

    Ok(detour)
}

/// The drop-off position `t_j` for the newest rider with the cheapest route.
///
/// The route cost is the newest rider's pickup to the first drop-off, then
/// every active drop-off in order, plus the cost of slotting the newest
/// drop-off in. Dropping it off first (`t_j = 1`) is the baseline; each
/// active rider `idx`, in order, then proposes dropping it off right after
/// `idx` (`t_j = idx + 1`). A proposal replaces the incumbent only if it is
/// strictly cheaper, so ties go to the earliest position.
///
/// The existing drop-off order is taken as given and is not re-optimized.
pub fn best_insertion_point(ledger: &RouteLedger) -> Result<usize, SolverError> {
    let last = last_rider_picked_up(ledger)?;
    let newest = &ledger[ledger.len()];
    let (s_n, d_n) = (newest.source(), newest.destination());

    let base = distance(&s_n, &dest(ledger, 1))
        + (2..=last)
            .map(|idx| distance(&dest(ledger, idx - 1), &dest(ledger, idx)))
            .sum::<f64>();

    let mut best_cost = base + newest.trip_distance() + distance(&d_n, &dest(ledger, 1))
        - distance(&s_n, &dest(ledger, 1));
    let mut t_j = 1;

    for idx in active_riders(ledger) {
        let cost = if idx < last {
            base + distance(&dest(ledger, idx), &d_n) + distance(&d_n, &dest(ledger, idx + 1))
                - distance(&dest(ledger, idx), &dest(ledger, idx + 1))
        } else {
            base + distance(&dest(ledger, idx), &d_n)
        };

        if cost < best_cost {
            best_cost = cost;
            t_j = idx + 1;
        }
    }

    event!(Level::DEBUG, t_j, route_cost = best_cost, "chose drop-off position");
    Ok(t_j)
}

/// Places the newest rider's drop-off after rider `t_j` and rewrites the detour state.
///
/// Each active rider `idx` is charged, relative to its own trip distance, the
/// pickup detour (every active rider is still aboard when the newest rider is
/// picked up) and, when `idx >= t_j`, the drop-off detour:
///
/// `with[idx] = without[idx] + (source_detour + [idx >= t_j] * destination_detour) / sd[idx]`
///
/// The newest rider's own detour is 0 when it is dropped off first (`t_j = 1`)
/// or last (`t_j = N`). Otherwise it rides from its pickup through drop-offs
/// `1..t_j` before reaching its destination, and its detour is that path's
/// length less its direct trip distance, again relative to the trip distance.
///
/// The ledger must not be read or written by anyone else during the call.
/// All inputs are validated before anything is written, so on error the
/// ledger is left untouched. On success it also records `t_j`.
pub fn apply_insertion(ledger: &mut RouteLedger, t_j: usize) -> Result<(), SolverError> {
    ledger.check_insertion_point(t_j)?;
    let newest = ledger.len();

    let source = source_detour(ledger)?;
    let destination = destination_detour(ledger, t_j)?;

    let own = if t_j == newest || t_j == 1 {
        0.0
    } else {
        let rider = &ledger[newest];
        let mut path = distance(&rider.source(), &dest(ledger, 1));
        for idx in 1..t_j - 1 {
            path += distance(&dest(ledger, idx), &dest(ledger, idx + 1));
        }
        path += distance(&dest(ledger, t_j - 1), &rider.destination());
        (path - rider.trip_distance()) / rider.trip_distance()
    };

    for (idx, rider) in ledger.iter_mut() {
        if idx == newest {
            rider.actual_detour_with_insertion = own;
            continue;
        }

        let mut extra = source;
        if idx >= t_j {
            extra += destination;
        }
        rider.actual_detour_with_insertion =
            rider.actual_detour_without_insertion + extra / rider.trip_distance();
    }

    ledger.record_insertion(t_j)?;
    Ok(())
}

/// Finds the best drop-off position for the newest rider and applies it.
///
/// Takes the ledger by value and returns it updated, which makes the exclusive
/// ownership the insertion relies on explicit at the call site.
pub fn insert_newest(mut ledger: RouteLedger) -> Result<RouteLedger, SolverError> {
    let t_j = best_insertion_point(&ledger)?;
    apply_insertion(&mut ledger, t_j)?;
    Ok(ledger)
}

/// Rolls the detours of the current route forward so that another rider can be inserted.
///
/// Admitting a further rider requires recomputing every rider's detour on the
/// finalized route as its new `actual_detour_without_insertion`. That step is
/// not implemented, and this function always fails with
/// [`SolverError::NotImplemented`].
pub fn recompute_detours_without_insertion(
    _ledger: &mut RouteLedger,
) -> Result<(), SolverError> {
    Err(SolverError::NotImplemented(
        "recomputing detours without the newest rider",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rpp_core::models::{LedgerError, Rider, RiderSpec};

    fn rider(s: (f64, f64), d: (f64, f64)) -> Rider {
        Rider::new(RiderSpec::new(s.into(), d.into(), 0.3), 2.0).unwrap()
    }

    // Three riders travelling east along y = 0 and a newcomer from the north
    fn corridor(newcomer_dest: (f64, f64)) -> RouteLedger {
        RouteLedger::try_from(vec![
            rider((0.0, 0.0), (4.0, 0.0)),
            rider((1.0, 0.0), (8.0, 0.0)),
            rider((2.0, 0.0), (12.0, 0.0)),
            rider((3.0, 3.0), newcomer_dest),
        ])
        .unwrap()
    }

    #[test]
    fn test_requires_active_rider() {
        let ledger = RouteLedger::try_from(vec![rider((0.0, 0.0), (1.0, 0.0))]).unwrap();
        assert_eq!(
            source_detour(&ledger).unwrap_err(),
            SolverError::InvalidLedger(LedgerError::TooFewRiders(1))
        );
        assert_eq!(
            best_insertion_point(&ledger).unwrap_err(),
            SolverError::InvalidLedger(LedgerError::TooFewRiders(1))
        );
    }

    #[test]
    fn test_source_detour() {
        let ledger = corridor((6.0, 0.0));
        // from s_3 = (2, 0) via (3, 3) to d_1 = (4, 0)
        let expected = 10f64.sqrt() + 10f64.sqrt() - 2.0;
        assert_abs_diff_eq!(source_detour(&ledger).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_destination_detour_cases() {
        let ledger = corridor((6.0, 0.0));
        let sd_n = 18f64.sqrt();

        // t_j = 1: sd_N + dist(d_N, d_1) - dist(s_N, d_1)
        assert_abs_diff_eq!(
            destination_detour(&ledger, 1).unwrap(),
            sd_n + 2.0 - 10f64.sqrt(),
            epsilon = 1e-12
        );
        // 1 < t_j = 2 < L = 3
        assert_abs_diff_eq!(
            destination_detour(&ledger, 2).unwrap(),
            2.0 + 2.0 - 4.0,
            epsilon = 1e-12
        );
        // t_j = L = 3: the subtracted leg equals the second added one
        assert_abs_diff_eq!(
            destination_detour(&ledger, 3).unwrap(),
            2.0,
            epsilon = 1e-12
        );
        // t_j = N
        assert_eq!(destination_detour(&ledger, 4).unwrap(), 0.0);
        assert_eq!(
            destination_detour(&ledger, 5).unwrap_err(),
            SolverError::InvalidLedger(LedgerError::InsertionPointOutOfRange { t_j: 5, newest: 4 })
        );
    }

    #[test]
    fn test_best_insertion_point_between_drop_offs() {
        // d_N = (6, 0) lies between d_1 and d_2, so it costs nothing to drop off after rider 1
        assert_eq!(best_insertion_point(&corridor((6.0, 0.0))).unwrap(), 2);
        // beyond every other drop-off, it is cheapest to go last
        assert_eq!(best_insertion_point(&corridor((14.0, 0.0))).unwrap(), 4);
        // before d_1 on the way from s_N, the baseline wins
        assert_eq!(best_insertion_point(&corridor((3.5, 1.5))).unwrap(), 1);
    }

    #[test]
    fn test_ties_keep_earliest_position() {
        // d_N coincides with d_1: dropping off first or right after rider 1 cost the same
        let ledger = RouteLedger::try_from(vec![
            rider((0.0, 0.0), (4.0, 0.0)),
            rider((1.0, 3.0), (4.0, 0.0)),
        ])
        .unwrap();
        assert_eq!(best_insertion_point(&ledger).unwrap(), 1);
    }

    #[test]
    fn test_apply_insertion_updates_every_rider() {
        let mut ledger = corridor((6.0, 0.0));
        ledger[2].actual_detour_without_insertion = 0.1;

        let source = source_detour(&ledger).unwrap();
        let destination = destination_detour(&ledger, 2).unwrap();
        apply_insertion(&mut ledger, 2).unwrap();

        assert_eq!(ledger.insertion_point(), Some(2));
        assert_abs_diff_eq!(
            ledger[1].actual_detour_with_insertion,
            source / 4.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            ledger[2].actual_detour_with_insertion,
            0.1 + (source + destination) / 7.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            ledger[3].actual_detour_with_insertion,
            (source + destination) / 10.0,
            epsilon = 1e-12
        );

        // s_N -> d_1 -> d_N, against the direct trip
        let sd_n = 18f64.sqrt();
        assert_abs_diff_eq!(
            ledger[4].actual_detour_with_insertion,
            (10f64.sqrt() + 2.0 - sd_n) / sd_n,
            epsilon = 1e-12
        );
        // the pre-insertion state is untouched
        assert_eq!(ledger[2].actual_detour_without_insertion, 0.1);
    }

    #[test]
    fn test_apply_insertion_newest_detour_along_the_drop_offs() {
        let mut ledger = corridor((10.0, 0.0));
        apply_insertion(&mut ledger, 3).unwrap();

        // s_N -> d_1 -> d_2 -> d_N
        let sd_n = (49f64 + 9.0).sqrt();
        let path = 10f64.sqrt() + 4.0 + 2.0;
        assert_abs_diff_eq!(
            ledger[4].actual_detour_with_insertion,
            (path - sd_n) / sd_n,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_apply_insertion_rejects_bad_position_without_writing() {
        let mut ledger = corridor((6.0, 0.0));
        let before = ledger.clone();
        assert!(apply_insertion(&mut ledger, 0).is_err());
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_recompute_without_insertion_is_reserved() {
        let mut ledger = corridor((6.0, 0.0));
        assert!(matches!(
            recompute_detours_without_insertion(&mut ledger),
            Err(SolverError::NotImplemented(_))
        ));
    }
}
