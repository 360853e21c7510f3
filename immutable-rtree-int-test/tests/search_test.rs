use immutable_rtree::search::{always, intersects, within_distance};
use immutable_rtree::{Flow, SearchState, Shape};
use immutable_rtree_int_test::test_util::{
    brute_force_intersecting, cleanup, create_star_test_context, create_test_context, random_rectangle, run_test,
    sorted_values,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_intersecting_matches_brute_force() {
    run_test(
        create_test_context,
        |ctx| {
            let tree = ctx.tree();
            let mut rng = StdRng::seed_from_u64(ctx.seed());
            for _ in 0..50 {
                let rect = random_rectangle(&mut rng, 200.0);
                let found: Vec<_> = tree.search_intersecting(rect).collect();
                assert_eq!(sorted_values(&found), brute_force_intersecting(ctx.entries(), &rect));
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_demand_granularity_does_not_change_results() {
    run_test(
        create_star_test_context,
        |ctx| {
            let tree = ctx.tree();
            let mut rng = StdRng::seed_from_u64(ctx.seed());
            let rect = random_rectangle(&mut rng, 500.0);

            let unbounded: Vec<_> = tree.search(intersects(rect)).collect();
            for demand in [1, 2, 3, 7, 64, usize::MAX] {
                let mut search = tree.search(intersects(rect));
                let mut collected = Vec::new();
                while !search.is_terminated() {
                    collected.extend(search.request(demand));
                }
                assert_eq!(collected, unbounded, "demand {}", demand);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_suspended_state_resumes_where_it_stopped() {
    run_test(
        create_test_context,
        |ctx| {
            let tree = ctx.tree();
            let predicate = always();
            let everything: Vec<_> = tree.entries().collect();

            let mut state = Some(SearchState::new(tree.root(), &predicate));
            let mut resumed = Vec::new();
            let mut rounds = 0;
            while let Some(current) = state.take() {
                let (chunk, next) = current.advance(&predicate, 13);
                assert!(chunk.len() <= 13);
                resumed.extend(chunk);
                state = next;
                rounds += 1;
            }

            assert_eq!(resumed, everything);
            assert!(rounds >= everything.len() / 13);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_within_distance_is_exclusive() {
    run_test(
        create_test_context,
        |ctx| {
            let tree = ctx.tree();
            let query = immutable_rtree::Rectangle::from_point(500.0, 500.0);
            let distance = 120.0;

            let found: Vec<_> = tree.search(within_distance(query, distance)).collect();
            let expected = sorted_values(
                ctx.entries()
                    .iter()
                    .filter(|e| e.geometry().distance(&query) < distance),
            );
            assert_eq!(sorted_values(&found), expected);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_cancel_and_sink_stop() {
    run_test(
        create_test_context,
        |ctx| {
            let tree = ctx.tree();

            let mut search = tree.entries();
            assert_eq!(search.request(5).len(), 5);
            search.cancel();
            assert!(search.is_terminated());
            assert!(search.request(5).is_empty());

            let mut seen = 0;
            let flow = tree.search_with(always(), |_| {
                seen += 1;
                if seen == 10 {
                    Flow::Stop
                } else {
                    Flow::Continue
                }
            });
            assert_eq!(flow, Flow::Stop);
            assert_eq!(seen, 10);
            Ok(())
        },
        cleanup,
    )
}
