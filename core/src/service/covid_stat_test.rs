#[cfg(test)]
mod tests {
    use crate::model::day_stat::DayStat;
    use crate::model::series::Series;
    use crate::model::snapshot::Snapshot;
    use crate::error::SourceError;
    use crate::service::testing::fake_stat;
    use chrono::{Duration, Local, NaiveDate};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 4, d).unwrap()
    }

    #[test]
    fn test_first_delta_on_empty_series_is_snapshot() {
        let (mut stat, state, _) = fake_stat("cz");
        state.borrow_mut().snapshot = Snapshot::new(100, 10, 2, 1);

        let today = Local::now().date_naive();
        let delta = stat.compute_delta().unwrap();
        assert_eq!(delta, DayStat::new(today, 100, 10, 2, 1));

        stat.merge(delta);
        assert_eq!(stat.total_tested(), 100);
        assert_eq!(stat.total_positive(), 10);
        assert_eq!(stat.total_recovered(), 2);
        assert_eq!(stat.total_dead(), 1);
    }

    #[test]
    fn test_unchanged_snapshot_gives_empty_delta() {
        let (mut stat, state, _) = fake_stat("cz");
        state.borrow_mut().snapshot = Snapshot::new(100, 10, 2, 1);
        stat.merge(DayStat::new(day(2), 100, 10, 2, 1));

        let delta = stat.compute_delta_on(day(2)).unwrap();
        assert!(delta.is_empty());
    }

    #[test]
    fn test_delta_is_against_whole_history() {
        let (mut stat, state, _) = fake_stat("cz");
        stat.merge(DayStat::new(day(1), 100, 10, 0, 0));
        stat.merge(DayStat::new(day(3), 50, 5, 4, 1));
        state.borrow_mut().snapshot = Snapshot::new(175, 16, 4, 2);

        let delta = stat.compute_delta_on(day(4)).unwrap();
        assert_eq!(delta, DayStat::new(day(4), 25, 1, 0, 1));
    }

    #[test]
    fn test_skipped_merge_double_counts_next_delta() {
        // Documents the exactly-once contract: a delta that is computed but
        // never merged is counted again by the following cycle.
        let (mut stat, state, _) = fake_stat("cz");
        stat.merge(DayStat::new(day(1), 100, 10, 0, 0));

        state.borrow_mut().snapshot = Snapshot::new(120, 12, 0, 0);
        let first = stat.compute_delta_on(day(2)).unwrap();
        assert_eq!(first.tested, 20);
        // first delta dropped here instead of merged

        state.borrow_mut().snapshot = Snapshot::new(130, 13, 0, 0);
        let second = stat.compute_delta_on(day(2)).unwrap();
        assert_eq!(second.tested, 30, "the 20 from the first cycle is counted again");

        // Merging both (a caller that "catches up") overshoots the source.
        stat.merge(first);
        stat.merge(second);
        assert_eq!(stat.total_tested(), 150);
        assert_ne!(stat.total_tested(), 130);
    }

    #[test]
    fn test_double_merge_double_counts() {
        let (mut stat, state, _) = fake_stat("cz");
        state.borrow_mut().snapshot = Snapshot::new(40, 4, 0, 0);

        let delta = stat.compute_delta_on(day(2)).unwrap();
        stat.merge(delta);
        stat.merge(delta);

        assert_eq!(stat.series().get(day(2)), Some(&DayStat::new(day(2), 80, 8, 0, 0)));
        let next = stat.compute_delta_on(day(3)).unwrap();
        assert_eq!(next.tested, -40);
    }

    #[test]
    fn test_relabelled_delta_merges_into_yesterday() {
        let (mut stat, state, _) = fake_stat("cz");
        stat.merge(DayStat::new(day(1), 10, 1, 0, 0));
        state.borrow_mut().snapshot = Snapshot::new(15, 2, 0, 0);

        let delta = stat.compute_delta_on(day(2)).unwrap().with_date(day(1));
        stat.merge(delta);

        assert_eq!(stat.series().len(), 1);
        assert_eq!(stat.series().get(day(1)), Some(&DayStat::new(day(1), 15, 2, 0, 0)));
        assert!(stat.compute_delta_on(day(2)).unwrap().is_empty());
    }

    #[test]
    fn test_yesterday_helper_relabels_to_previous_day() {
        let d = DayStat::new(day(9), 1, 0, 0, 0).yesterday();
        assert_eq!(d.date, Local::now().date_naive() - Duration::days(1));
        assert_eq!(d.tested, 1);
    }

    #[test]
    fn test_source_errors_propagate_unchanged() {
        let (mut stat, state, _) = fake_stat("ru");
        state.borrow_mut().offline = true;
        assert!(matches!(stat.refresh(), Err(SourceError::Unavailable { .. })));

        state.borrow_mut().layout_changed = true;
        match stat.compute_delta_on(day(2)) {
            Err(SourceError::FormatChanged { locale, field, .. }) => {
                assert_eq!(locale, "ru");
                assert_eq!(field, "tested");
            }
            other => panic!("expected FormatChanged, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_total_is_not_merged() {
        let (mut stat, state, repo) = fake_stat("cz");
        stat.merge(DayStat::new(day(1), 100, 10, 0, 0));
        state.borrow_mut().snapshot = Snapshot::new(i64::MAX as u64 + 1, 11, 0, 0);

        match stat.compute_delta_on(day(2)) {
            Err(SourceError::FormatChanged { field, .. }) => assert_eq!(field, "tested"),
            other => panic!("expected FormatChanged, got {:?}", other),
        }
        assert_eq!(stat.total_tested(), 100);
        assert!(repo.stored.borrow().is_empty());
    }

    #[test]
    fn test_merge_does_not_persist_until_asked() {
        let (mut stat, _, repo) = fake_stat("ua");
        stat.merge(DayStat::new(day(2), 5, 1, 0, 0));
        assert!(repo.stored.borrow().is_empty());

        stat.persist().unwrap();
        assert_eq!(repo.stored.borrow().len(), 1);
    }

    #[test]
    fn test_reload_replaces_memory() {
        let (mut stat, _, repo) = fake_stat("ua");
        let on_disk: Series = vec![DayStat::new(day(1), 7, 0, 0, 0)].into_iter().collect();
        *repo.stored.borrow_mut() = on_disk.clone();

        stat.merge(DayStat::new(day(2), 5, 1, 0, 0));
        stat.reload().unwrap();

        assert_eq!(stat.series(), &on_disk);
        assert_eq!(stat.total_tested(), 7);
    }

    #[test]
    fn test_lost_persist_is_derived_again_after_restart() {
        // A merge that never reaches the store is derived (and announced)
        // again by the next process, which only sees the older durable copy.
        let (mut stat, state, repo) = fake_stat("cz");
        state.borrow_mut().snapshot = Snapshot::new(100, 10, 0, 0);
        let delta = stat.compute_delta_on(day(1)).unwrap();
        stat.merge(delta);
        stat.persist().unwrap();

        state.borrow_mut().snapshot = Snapshot::new(130, 13, 0, 0);
        let delta = stat.compute_delta_on(day(2)).unwrap();
        stat.merge(delta);
        *repo.fail_save.borrow_mut() = true;
        assert!(stat.persist().is_err());
        assert_eq!(stat.total_tested(), 130);

        stat.reload().unwrap();
        assert_eq!(stat.total_tested(), 100);
        assert_eq!(stat.compute_delta_on(day(2)).unwrap().tested, 30);
    }
}
