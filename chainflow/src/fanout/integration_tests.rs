//! Integration tests for fan-out execution.

#[cfg(test)]
mod tests {
    use crate::errors::{ChainflowError, FailureCause, StageKind};
    use crate::fanout::FanOutCoordinator;
    use crate::pipeline::{PipelineIndex, PipelineRunner};
    use crate::simulators::{Amount, ProductQuery};
    use crate::testing::{EchoDependentWork, IndexedWorkSource};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    fn index(n: u32) -> PipelineIndex {
        PipelineIndex::new(n).unwrap()
    }

    fn build(
        source: IndexedWorkSource,
        dependent: EchoDependentWork,
        pipelines: usize,
    ) -> (FanOutCoordinator, Arc<IndexedWorkSource>, Arc<EchoDependentWork>) {
        let source = Arc::new(source);
        let dependent = Arc::new(dependent);
        let runner = PipelineRunner::new(source.clone(), dependent.clone());
        (
            FanOutCoordinator::new(runner, pipelines).unwrap(),
            source,
            dependent,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_pipeline_sees_its_own_index() {
        for pipelines in [2_usize, 5, 16] {
            let (coordinator, source, _) = build(
                IndexedWorkSource::new(Duration::from_millis(10)),
                EchoDependentWork::new(Duration::from_millis(10)),
                pipelines,
            );

            let report = coordinator.run().await;

            let indices: Vec<u32> = report.outcomes().iter().map(|o| o.index.get()).collect();
            let expected: Vec<u32> = (1..=u32::try_from(pipelines).unwrap()).collect();
            assert_eq!(indices, expected);

            // Stage two echoes the call id it was given, so a shared loop
            // variable would show up as repeated or out-of-range ids here.
            let call_ids: HashSet<u32> = report.successes().map(|(_, q)| q.call_id).collect();
            assert_eq!(call_ids.len(), pipelines);
            assert!(!call_ids.contains(&0));
            assert!(!call_ids.contains(&(expected.len() as u32 + 1)));

            let mut seen = source.calls();
            seen.sort_unstable();
            assert_eq!(seen, expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stage_two_consumes_same_pipeline_stage_one_result() {
        // Later indices finish stage one first, so a mix-up between
        // pipelines would pair a result with the wrong index.
        let source = (1..=5).fold(IndexedWorkSource::new(Duration::ZERO), |s, n| {
            s.with_latency_for(n, Duration::from_millis(u64::from(60 - n * 10)))
        });
        let (coordinator, _, dependent) =
            build(source, EchoDependentWork::new(Duration::from_millis(5)), 5);

        let report = coordinator.run().await;

        for (idx, query) in report.successes() {
            assert_eq!(query.threshold, IndexedWorkSource::amount_for(idx.get()));
            assert_eq!(query.count, EchoDependentWork::count_for(idx.get()));
        }
        for (call_id, amount) in dependent.calls() {
            assert_eq!(amount, IndexedWorkSource::amount_for(call_id));
        }

        // Stage two completion order follows stage one latency, not index.
        let completion_order: Vec<u32> = dependent.calls().iter().map(|(id, _)| *id).collect();
        assert_eq!(completion_order, vec![5, 4, 3, 2, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_time_tracks_slowest_pipeline() {
        let (coordinator, _, _) = build(
            IndexedWorkSource::new(Duration::from_millis(50)),
            EchoDependentWork::new(Duration::from_millis(50)),
            5,
        );
        let start = Instant::now();

        let report = coordinator.run().await;
        let elapsed = start.elapsed();

        assert_eq!(report.success_count(), 5);
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(5 * 50));
        assert!(report.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_outcomes_before_slowest_pipeline_finishes() {
        let source = IndexedWorkSource::new(Duration::from_millis(10))
            .with_latency_for(3, Duration::from_millis(500));
        let (coordinator, _, dependent) =
            build(source, EchoDependentWork::new(Duration::from_millis(10)), 5);

        let handle = tokio::spawn(async move { coordinator.run().await });

        tokio::time::sleep(Duration::from_millis(200)).await;
        // Four pipelines are done, but the coordinator has not returned.
        assert_eq!(dependent.calls().len(), 4);
        assert!(!handle.is_finished());

        let report = handle.await.unwrap();
        assert_eq!(report.len(), 5);
        assert_eq!(report.success_count(), 5);
        assert!(report.elapsed() >= Duration::from_millis(510));
    }

    #[tokio::test]
    async fn test_result_line_format() {
        let (coordinator, _, _) = build(
            IndexedWorkSource::new(Duration::ZERO),
            EchoDependentWork::new(Duration::ZERO),
            3,
        );

        let report = coordinator.run().await;

        assert_eq!(
            report.report_lines(),
            vec![
                "Results from 1: 5 products cost more than $1.25.",
                "Results from 2: 6 products cost more than $2.25.",
                "Results from 3: 7 products cost more than $3.25.",
            ]
        );
        assert_eq!(
            ProductQuery::new(1, 10, Amount::from_cents(4250)).to_string(),
            "10 products cost more than $42.50."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_pipeline_is_isolated() {
        let (coordinator, _, dependent) = build(
            IndexedWorkSource::new(Duration::from_millis(20)).failing_on(3),
            EchoDependentWork::new(Duration::from_millis(20)),
            5,
        );

        let report = coordinator.run().await;

        assert_eq!(report.len(), 5);
        for n in [1, 2, 4, 5] {
            let query = report.get(index(n)).and_then(|o| o.query()).unwrap();
            assert_eq!(query.threshold, IndexedWorkSource::amount_for(n));
        }

        let failed = report.get(index(3)).unwrap().failure_info().unwrap();
        assert_eq!(failed.index, index(3));
        assert_eq!(failed.stage(), Some(StageKind::StageOne));
        assert_eq!(report.report_lines()[2], "Results from 3: FAILED (stage one failed: injected failure for call 3)");

        // Stage two never ran for the failed pipeline.
        assert!(dependent.calls().iter().all(|(id, _)| *id != 3));

        let err: ChainflowError = report.into_result().unwrap_err().into();
        assert_eq!(err.to_string(), "1 of 5 pipelines failed: [3]");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stage_two_failure_is_reported_by_index() {
        let (coordinator, _, _) = build(
            IndexedWorkSource::new(Duration::from_millis(5)),
            EchoDependentWork::new(Duration::from_millis(5)).failing_on(2).failing_on(4),
            5,
        );

        let report = coordinator.run().await;
        let failures: Vec<(u32, Option<StageKind>)> =
            report.failures().map(|f| (f.index.get(), f.stage())).collect();

        assert_eq!(
            failures,
            vec![(2, Some(StageKind::StageTwo)), (4, Some(StageKind::StageTwo))]
        );
        assert_eq!(report.success_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_pipeline_does_not_abort_siblings() {
        let (coordinator, _, dependent) = build(
            IndexedWorkSource::new(Duration::from_millis(10)).panicking_on(2),
            EchoDependentWork::new(Duration::from_millis(30)),
            4,
        );

        let report = coordinator.run().await;

        assert_eq!(report.success_count(), 3);
        let failed = report.get(index(2)).unwrap().failure_info().unwrap();
        assert!(matches!(failed.cause, FailureCause::Panicked(_)));
        assert_eq!(dependent.calls().len(), 3);
    }
}
