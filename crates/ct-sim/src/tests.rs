//! Unit tests for ct-sim.

#[cfg(test)]
mod helpers {
    use ct_core::{GeoPoint, SimulationParams};

    use crate::{TrafficSimulator, builtin_roads};

    pub const CENTER: GeoPoint = GeoPoint { lat: 40.7128, lon: -74.0060 };

    /// Tuesday 2023-11-14 08:00 UTC (morning rush).
    pub const RUSH: i64 = 1_699_948_800;
    /// Tuesday 2023-11-14 03:00 UTC (night).
    pub const NIGHT: i64 = 1_699_930_800;

    pub fn simulator() -> TrafficSimulator {
        TrafficSimulator::new(builtin_roads(CENTER), SimulationParams::default())
    }
}

// ── Road catalog ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod catalog {
    use std::collections::HashSet;

    use crate::{RoadType, builtin_roads};

    use super::helpers::CENTER;

    #[test]
    fn builtin_has_fifteen_unique_roads() {
        let roads = builtin_roads(CENTER);
        assert_eq!(roads.len(), 15);
        let ids: HashSet<_> = roads.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 15);
    }

    #[test]
    fn builtin_type_mix() {
        let roads = builtin_roads(CENTER);
        for t in RoadType::ALL {
            assert_eq!(roads.iter().filter(|r| r.road_type == t).count(), 5, "{t}");
        }
    }

    #[test]
    fn arterials_chain_end_to_start() {
        let roads = builtin_roads(CENTER);
        let arterials: Vec<_> = roads.iter().filter(|r| r.road_type == RoadType::Arterial).collect();
        for pair in arterials.windows(2) {
            assert_eq!(pair[0].end.grid_key(), pair[1].start.grid_key());
        }
    }

    #[test]
    fn road_type_parsing() {
        assert_eq!("Arterial".parse::<RoadType>(), Ok(RoadType::Arterial));
        assert_eq!(" local ".parse::<RoadType>(), Ok(RoadType::Local));
        assert!("highway".parse::<RoadType>().is_err());
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;
    use std::path::Path;

    use crate::{Road, RoadType, SimError, SimResult, load_roads_csv, load_roads_reader};

    const CSV: &str = "\
id,name,start_lat,start_lon,end_lat,end_lon,road_type
R1,First,0.0,0.0,0.0,0.001,arterial
R2,Second,0.0,0.001,0.001,0.001,Local
";

    #[test]
    fn loads_rows_in_order() {
        let roads = load_roads_reader(Cursor::new(CSV)).unwrap();
        assert_eq!(roads.len(), 2);
        assert_eq!(roads[0].id, "R1");
        assert_eq!(roads[1].road_type, RoadType::Local);
        assert!((roads[0].length_m() - 111.2).abs() < 1.0);
    }

    #[test]
    fn unknown_road_type_errors() {
        let csv = "id,name,start_lat,start_lon,end_lat,end_lon,road_type\nR1,X,0,0,0,1,freeway\n";
        let err = load_roads_reader(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, SimError::UnknownRoadType { ref value, .. } if value == "freeway"));
    }

    #[test]
    fn duplicate_id_errors() {
        let csv = "id,name,start_lat,start_lon,end_lat,end_lon,road_type\n\
                   R1,X,0,0,0,1,local\nR1,Y,0,1,1,1,local\n";
        let err = load_roads_reader(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, SimError::DuplicateRoad(ref id) if id == "R1"));
    }

    #[test]
    fn ids_differing_in_case_are_distinct() {
        let csv = "id,name,start_lat,start_lon,end_lat,end_lon,road_type\n\
                   R1,X,0,0,0,1,local\nr1,Y,0,1,1,1,local\n";
        let roads: SimResult<Vec<Road>> = load_roads_reader(Cursor::new(csv));
        assert_eq!(roads.unwrap().len(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_roads_csv(Path::new("/nonexistent/roads.csv")).unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
    }

    #[test]
    fn out_of_range_coordinate_errors() {
        let csv = "id,name,start_lat,start_lon,end_lat,end_lon,road_type\nR1,X,95,0,0,1,local\n";
        let err = load_roads_reader(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, SimError::InvalidCoordinate { .. }));
    }

    #[test]
    fn malformed_number_is_csv_error() {
        let csv = "id,name,start_lat,start_lon,end_lat,end_lon,road_type\nR1,X,north,0,0,1,local\n";
        assert!(matches!(load_roads_reader(Cursor::new(csv)), Err(SimError::Csv(_))));
    }
}

// ── Simulator ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod simulator {
    use ct_core::{SimRng, SimulationParams};

    use crate::{RoadType, builtin_roads, generate_snapshot};

    use super::helpers::{CENTER, NIGHT, RUSH, simulator};

    #[test]
    fn scores_bounded_and_levels_match_thresholds() {
        let sim = simulator();
        let thresholds = sim.params().thresholds;
        for seed in 0..200 {
            let mut rng = SimRng::new(seed);
            for ts in [RUSH, NIGHT, RUSH + 4 * 86_400] {
                let snap = sim.generate_snapshot(ts, &mut rng);
                assert_eq!(snap.len(), 15);
                for s in &snap.segments {
                    assert!((0.0..=100.0).contains(&s.congestion_score), "{}", s.congestion_score);
                    assert_eq!(s.congestion_level, thresholds.level(s.congestion_score));
                }
            }
        }
    }

    #[test]
    fn same_seed_same_snapshot() {
        let sim = simulator();
        let a = sim.generate_snapshot(RUSH, &mut SimRng::new(9));
        let b = sim.generate_snapshot(RUSH, &mut SimRng::new(9));
        assert_eq!(a, b);
    }

    #[test]
    fn rush_hour_is_busier_than_night() {
        let sim = simulator();
        let mut rush = 0u64;
        let mut night = 0u64;
        for seed in 0..50 {
            rush += sim.generate_snapshot(RUSH, &mut SimRng::new(seed)).total_vehicles();
            night += sim.generate_snapshot(NIGHT, &mut SimRng::new(seed)).total_vehicles();
        }
        assert!(rush > 4 * night, "rush {rush} vs night {night}");
    }

    #[test]
    fn always_spiking_saturates_arterials_at_rush() {
        let params = SimulationParams { spike_probability: 1.0, ..SimulationParams::default() };
        let roads = builtin_roads(CENTER);
        let snap = generate_snapshot(RUSH, &roads, &params, &mut SimRng::new(1));
        // Rush arterial: >= trunc(50 * 2.5 * 0.7) = 87 vehicles => 43.5; spiked x1.5 => > 65.
        for s in snap.segments.iter().filter(|s| s.road_type == RoadType::Arterial) {
            assert!(s.congestion_score > 65.0, "{}", s.congestion_score);
        }
    }

    #[test]
    fn zero_speed_yields_empty_roads() {
        let params = SimulationParams {
            simulation_speed: 0.0,
            spike_probability: 0.0,
            ..SimulationParams::default()
        };
        let roads = builtin_roads(CENTER);
        let snap = generate_snapshot(RUSH, &roads, &params, &mut SimRng::new(1));
        assert!(snap.segments.iter().all(|s| s.vehicle_count == 0 && s.congestion_score == 0.0));
    }

    #[test]
    fn empty_catalog_gives_empty_snapshot() {
        let snap = generate_snapshot(RUSH, &[], &SimulationParams::default(), &mut SimRng::new(1));
        assert!(snap.is_empty());
        assert_eq!(snap.average_congestion(), 0.0);
        assert_eq!(snap.timestamp, RUSH);
    }
}

// ── History & providers ───────────────────────────────────────────────────────

#[cfg(test)]
mod providers {
    use std::sync::Arc;

    use ct_core::SimRng;

    use crate::{FixedSnapshot, LiveSnapshots, Snapshot, SnapshotHistory, SnapshotProvider};

    use super::helpers::{RUSH, simulator};

    #[test]
    fn history_evicts_oldest() {
        let mut h = SnapshotHistory::new(3);
        for ts in 0..5 {
            h.push(Arc::new(Snapshot::empty(ts)));
        }
        assert_eq!(h.len(), 3);
        let ts: Vec<i64> = h.recent(10).iter().map(|s| s.timestamp).collect();
        assert_eq!(ts, vec![2, 3, 4]);
        let ts: Vec<i64> = h.recent(2).iter().map(|s| s.timestamp).collect();
        assert_eq!(ts, vec![3, 4]);
        assert_eq!(h.latest().map(|s| s.timestamp), Some(4));
    }

    #[test]
    fn history_capacity_at_least_one() {
        let mut h = SnapshotHistory::new(0);
        h.push(Arc::new(Snapshot::empty(1)));
        h.push(Arc::new(Snapshot::empty(2)));
        assert_eq!(h.capacity(), 1);
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn fixed_provider_returns_same_arc() {
        let p = FixedSnapshot::new(Snapshot::empty(5));
        assert!(Arc::ptr_eq(&p.current(), &p.current()));
        assert_eq!(p.recent(10).len(), 1);
        assert!(p.recent(0).is_empty());
    }

    #[test]
    fn live_refresh_swaps_snapshot() {
        let live = LiveSnapshots::new(simulator(), SimRng::new(1), 10, RUSH);
        let before = live.current();
        assert_eq!(before.timestamp, RUSH);

        let after = live.refresh(RUSH + 5);
        assert_eq!(live.current().timestamp, RUSH + 5);
        assert!(Arc::ptr_eq(&after, &live.current()));
        // The old Arc is untouched for anyone still holding it.
        assert_eq!(before.timestamp, RUSH);
        assert_eq!(live.history_len(), 2);
    }

    #[test]
    fn live_history_is_bounded_and_reset_clears() {
        let live = LiveSnapshots::new(simulator(), SimRng::new(1), 4, RUSH);
        for i in 1..10 {
            live.refresh(RUSH + i);
        }
        assert_eq!(live.history_len(), 4);
        assert_eq!(live.recent(4).last().map(|s| s.timestamp), Some(RUSH + 9));

        live.reset(RUSH + 100);
        assert_eq!(live.history_len(), 1);
        assert_eq!(live.current().timestamp, RUSH + 100);
    }

    #[test]
    fn live_is_reproducible_for_a_seed() {
        let a = LiveSnapshots::new(simulator(), SimRng::new(77), 4, RUSH);
        let b = LiveSnapshots::new(simulator(), SimRng::new(77), 4, RUSH);
        assert_eq!(*a.refresh(RUSH + 1), *b.refresh(RUSH + 1));
    }

    #[test]
    fn concurrent_refresh_and_reset_keep_history_consistent() {
        let live = LiveSnapshots::new(simulator(), SimRng::new(3), 8, RUSH);

        std::thread::scope(|s| {
            for t in 0..4i64 {
                let live = &live;
                s.spawn(move || {
                    for i in 0..25 {
                        let ts = RUSH + t * 1000 + i;
                        if i % 10 == 9 {
                            live.reset(ts);
                        } else {
                            live.refresh(ts);
                        }
                    }
                });
            }
        });

        // The newest history entry is always the published snapshot.
        let newest = live.recent(1);
        assert!(Arc::ptr_eq(&newest[0], &live.current()));
        assert!(live.history_len() <= 8);

        live.reset(RUSH + 9999);
        assert_eq!(live.history_len(), 1);
        assert!(Arc::ptr_eq(&live.recent(1)[0], &live.current()));
    }
}
