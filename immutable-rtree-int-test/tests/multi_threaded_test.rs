use immutable_rtree::{Geometry, RTree, Rectangle, SharedRTree, SpatialIndex};
use immutable_rtree_int_test::test_util::{cleanup, create_test_context, run_test, verify_invariants};
use std::sync::{Arc, Barrier};
use std::thread;

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_multi_threaded_add() {
    run_test(
        create_test_context,
        |ctx| {
            let index = SharedRTree::new(ctx.tree());
            let initial = ctx.entries().len();

            let num_threads = 5;
            let adds_per_thread = 40;
            let barrier = Arc::new(Barrier::new(num_threads));

            let mut handles = vec![];
            for thread_id in 0..num_threads {
                let index_clone = index.clone();
                let barrier_clone = Arc::clone(&barrier);

                let handle = thread::spawn(move || {
                    barrier_clone.wait();
                    for i in 0..adds_per_thread {
                        let value = 10_000 + (thread_id * adds_per_thread + i) as u32;
                        let _ = index_clone.add(value, Geometry::point(i as f64, thread_id as f64));
                    }
                });
                handles.push(handle);
            }

            for handle in handles {
                let _ = handle.join();
            }

            assert_eq!(index.size(), initial + num_threads * adds_per_thread);
            verify_invariants(&index.snapshot())
        },
        cleanup,
    )
}

#[test]
fn test_readers_see_consistent_snapshots() {
    run_test(
        create_test_context,
        |ctx| {
            let index = SharedRTree::new(ctx.tree());
            let victims: Vec<_> = ctx.entries()[..200].to_vec();
            let barrier = Arc::new(Barrier::new(3));

            let writer = {
                let index = index.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for entry in victims {
                        let (value, geometry) = entry.into_parts();
                        let _ = index.remove(value, geometry);
                    }
                })
            };

            let readers: Vec<_> = (0..2)
                .map(|_| {
                    let index = index.clone();
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        for _ in 0..50 {
                            let snapshot: RTree<u32> = index.snapshot();
                            let walked = snapshot.entries().count();
                            assert_eq!(walked, snapshot.size());
                            assert!(verify_invariants(&snapshot).is_ok());
                        }
                    })
                })
                .collect();

            writer.join().expect("writer panicked");
            for reader in readers {
                reader.join().expect("reader panicked");
            }

            assert_eq!(index.size(), ctx.entries().len() - 200);
            let remaining = index.find_intersecting(&Rectangle::new(f64::MIN, f64::MIN, f64::MAX, f64::MAX))?;
            assert_eq!(remaining.len(), index.size());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_clear_while_shared() {
    run_test(
        create_test_context,
        |ctx| {
            let index = SharedRTree::new(ctx.tree());
            let held = index.snapshot();
            index.clear()?;

            assert_eq!(index.size(), 0);
            assert_eq!(held.size(), ctx.entries().len());
            assert!(index
                .find_nearest(&Rectangle::from_point(0.0, 0.0), 3, None)?
                .is_empty());
            Ok(())
        },
        cleanup,
    )
}
