use immutable_rtree::{
    Context, Entry, Geometry, Node, NodeRef, RTree, RTreeError, RTreeResult, Rectangle, Shape,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::backtrace::Backtrace;
use std::time::Instant;

/// Side of the square every random geometry is placed in.
pub const WORLD_SIZE: f64 = 1000.0;

/// Runs a test between a setup and a teardown step.
///
/// `after` still runs when the test body returns an error. Panics inside any
/// step are caught and reported together with the time the test took.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> RTreeResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> RTreeResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> RTreeResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    let start_time = Instant::now();

    let result = std::panic::catch_unwind(|| {
        let backtrace = Backtrace::capture();
        match before() {
            Ok(ctx) => match test(ctx.clone()) {
                Ok(_) => match after(ctx) {
                    Ok(_) => Ok(()),
                    Err(e) => Err((format!("After run failed: {:?}", e), backtrace.to_string())),
                },
                Err(e) => {
                    let _ = after(ctx);
                    Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                }
            },
            Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
        }
    });

    let elapsed = start_time.elapsed();
    let (error, backtrace) = match result {
        Ok(Ok(_)) => return,
        Ok(Err((e, bt))) => (e, bt),
        Err(panic_err) => {
            let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", panic_err.type_id())
            };
            (format!("Panic: {}", err_msg), Backtrace::capture().to_string())
        }
    };

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {:?}", elapsed);
    eprintln!("Error: {}", error);
    if !backtrace.is_empty() && !backtrace.contains("disabled") {
        eprintln!("\nBacktrace:\n{}", backtrace);
    }
    eprintln!("=====================================================\n");

    panic!("Test failed. Last error: {}", error);
}

/// A tree built from a seeded random workload, with the entries it holds.
#[derive(Clone)]
pub struct TestContext {
    seed: u64,
    tree: RTree<u32>,
    entries: Vec<Entry<u32>>,
}

impl TestContext {
    pub fn new(seed: u64, tree: RTree<u32>, entries: Vec<Entry<u32>>) -> Self {
        Self {
            seed,
            tree,
            entries,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tree(&self) -> RTree<u32> {
        self.tree.clone()
    }

    pub fn entries(&self) -> &[Entry<u32>] {
        &self.entries
    }
}

pub fn create_test_context() -> RTreeResult<TestContext> {
    create_context_with(42, 500, Context::default_context())
}

pub fn create_star_test_context() -> RTreeResult<TestContext> {
    let context = Context::builder().max_children(8).star().build()?;
    create_context_with(4242, 500, context)
}

pub fn create_context_with(seed: u64, count: usize, context: Context) -> RTreeResult<TestContext> {
    let entries = random_entries(seed, count);
    let tree = RTree::with_context(context).insert_all(entries.iter().cloned());
    if tree.size() != entries.len() {
        return Err(RTreeError::InvalidOperation(format!(
            "tree holds {} entries after inserting {}",
            tree.size(),
            entries.len()
        )));
    }
    Ok(TestContext::new(seed, tree, entries))
}

/// Verifies the tree left behind by a test is still well formed.
pub fn cleanup(ctx: TestContext) -> RTreeResult<()> {
    verify_invariants(&ctx.tree())
}

pub fn random_geometry(rng: &mut StdRng) -> Geometry {
    let x = rng.random_range(0.0..WORLD_SIZE);
    let y = rng.random_range(0.0..WORLD_SIZE);
    match rng.random_range(0..3) {
        0 => Geometry::point(x, y),
        1 => {
            let w = rng.random_range(0.0..20.0);
            let h = rng.random_range(0.0..20.0);
            Geometry::rectangle(x, y, x + w, y + h)
        }
        _ => Geometry::circle(x, y, rng.random_range(0.0..10.0)),
    }
}

/// `count` entries with values `0..count` and random geometries.
pub fn random_entries(seed: u64, count: usize) -> Vec<Entry<u32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count as u32)
        .map(|value| Entry::new(value, random_geometry(&mut rng)))
        .collect()
}

pub fn random_rectangle(rng: &mut StdRng, max_side: f64) -> Rectangle {
    let x = rng.random_range(0.0..WORLD_SIZE);
    let y = rng.random_range(0.0..WORLD_SIZE);
    let w = rng.random_range(0.0..max_side);
    let h = rng.random_range(0.0..max_side);
    Rectangle::new(x, y, x + w, y + h)
}

pub fn sorted_values<'a>(entries: impl IntoIterator<Item = &'a Entry<u32>>) -> Vec<u32> {
    let mut values: Vec<u32> = entries.into_iter().map(|e| *e.value()).collect();
    values.sort_unstable();
    values
}

pub fn brute_force_intersecting(entries: &[Entry<u32>], rect: &Rectangle) -> Vec<u32> {
    sorted_values(entries.iter().filter(|e| e.geometry().intersects(rect)))
}

/// Distances of the `k` nearest entries within `max_distance`, ascending.
pub fn brute_force_nearest(entries: &[Entry<u32>], query: &Rectangle, max_distance: f64, k: usize) -> Vec<f64> {
    let mut distances: Vec<f64> = entries
        .iter()
        .map(|e| e.geometry().distance(query))
        .filter(|d| *d <= max_distance)
        .collect();
    distances.sort_by(|a, b| a.total_cmp(b));
    distances.truncate(k);
    distances
}

/// Walks the tree and checks its structural invariants without relying on
/// the crate's own integrity check.
pub fn verify_invariants<V, G: Shape>(tree: &RTree<V, G>) -> RTreeResult<()> {
    let Some(root) = tree.root() else {
        return if tree.size() == 0 {
            Ok(())
        } else {
            Err(invalid(format!("empty tree reports size {}", tree.size())))
        };
    };

    let mut walk = Walk {
        min: tree.context().min_children(),
        max: tree.context().max_children(),
        leaf_depth: None,
        entries: 0,
    };
    walk.visit(root, 0)?;

    if walk.entries != tree.size() {
        return Err(invalid(format!(
            "tree reports size {} but holds {} entries",
            tree.size(),
            walk.entries
        )));
    }
    Ok(())
}

struct Walk {
    min: usize,
    max: usize,
    leaf_depth: Option<usize>,
    entries: usize,
}

impl Walk {
    fn visit<V, G: Shape>(&mut self, node: &NodeRef<V, G>, depth: usize) -> RTreeResult<()> {
        let count = Node::count(node);
        let lower = match (depth, node.is_leaf()) {
            (0, true) => 1,
            (0, false) => 2,
            _ => self.min,
        };
        if count < lower || count > self.max {
            return Err(invalid(format!(
                "node at depth {} holds {} items, allowed {}..={}",
                depth, count, lower, self.max
            )));
        }

        let union = match (node.entries(), node.children()) {
            (Some(entries), _) => {
                match self.leaf_depth {
                    None => self.leaf_depth = Some(depth),
                    Some(expected) if expected != depth => {
                        return Err(invalid(format!(
                            "leaf at depth {}, expected {}",
                            depth, expected
                        )));
                    }
                    Some(_) => {}
                }
                self.entries += entries.len();
                union_of(entries.iter().map(|e| e.geometry().mbr()))
            }
            (None, Some(children)) => {
                for child in children {
                    self.visit(child, depth + 1)?;
                }
                union_of(children.iter().map(|c| Node::mbr(c)))
            }
            (None, None) => return Err(invalid("node without contents".to_string())),
        };

        if union != Some(Node::mbr(node)) {
            return Err(invalid(format!(
                "node at depth {} has mbr {} but its contents span {:?}",
                depth,
                Node::mbr(node),
                union
            )));
        }
        Ok(())
    }
}

fn union_of(rects: impl Iterator<Item = Rectangle>) -> Option<Rectangle> {
    rects.reduce(|a, b| a.add(&b))
}

fn invalid(message: String) -> RTreeError {
    RTreeError::InvalidOperation(message)
}
