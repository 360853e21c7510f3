use immutable_rtree::{Context, Entry, Geometry, Node, RTree, Rectangle, Splitter};
use immutable_rtree_int_test::test_util::{cleanup, create_test_context, run_test, verify_invariants};

#[ctor::ctor]
fn init() {
    colog::init();
}

fn unit_box(x: f64) -> Geometry {
    Geometry::rectangle(x, x, x + 1.0, x + 1.0)
}

#[test]
fn test_ten_inserts_split_the_root() {
    let mut tree: RTree<u32> = RTree::with_context(Context::default_context());
    for i in 1..=10 {
        tree = tree.add(i, unit_box(i as f64));
    }

    assert_eq!(tree.size(), 10);
    let root = tree.root().expect("tree should not be empty");
    assert!(!root.is_leaf());
    assert!(verify_invariants(&tree).is_ok());
}

#[test]
fn test_nearest_two_of_four_unit_boxes() {
    let tree: RTree<u32> = [1, 2, 10, 11]
        .into_iter()
        .fold(RTree::new(), |tree, x| tree.add(x, unit_box(x as f64)));

    let query = Rectangle::new(9.0, 9.0, 10.0, 10.0);
    let nearest: Vec<u32> = tree.nearest(&query, 10.0, 2).iter().map(|e| *e.value()).collect();
    assert_eq!(nearest, vec![10, 11]);
}

#[test]
fn test_delete_sole_entry_empties_tree() {
    let e1 = Entry::new(1u32, unit_box(1.0));
    let tree = RTree::new().insert(e1.clone());
    let tree = tree.delete(&e1);

    assert_eq!(tree.size(), 0);
    assert!(tree.root().is_none());
    assert!(tree.is_empty());
}

#[test]
fn test_quadratic_split_groups_neighbours() {
    let boxes: Vec<Rectangle> = [1.0, 2.0, 100.0, 101.0]
        .iter()
        .map(|x| Rectangle::new(*x, *x, x + 1.0, x + 1.0))
        .collect();

    let pair = Splitter::Quadratic.split(boxes, 2);
    let mut groups: Vec<Vec<f64>> = [pair.group1(), pair.group2()]
        .iter()
        .map(|group| {
            let mut xs: Vec<f64> = group.iter().map(|r| r.x1).collect();
            xs.sort_by(|a, b| a.total_cmp(b));
            xs
        })
        .collect();
    groups.sort_by(|a, b| a[0].total_cmp(&b[0]));

    assert_eq!(groups, vec![vec![1.0, 2.0], vec![100.0, 101.0]]);
}

#[test]
fn test_old_versions_survive_updates() {
    run_test(
        create_test_context,
        |ctx| {
            let before = ctx.tree();
            let first = ctx.entries()[0].clone();

            let after = before.delete(&first).add(9999, Geometry::point(1.0, 1.0));
            assert_eq!(before.size(), ctx.entries().len());
            assert_eq!(after.size(), ctx.entries().len());
            assert!(!before.same_version(&after));

            let untouched: Vec<u32> = before.entries().map(|e| *e.value()).collect();
            assert!(untouched.contains(first.value()));
            assert!(!untouched.contains(&9999));

            verify_invariants(&before)?;
            verify_invariants(&after)
        },
        cleanup,
    )
}

#[test]
fn test_root_shape_follows_size() {
    let tree: RTree<u32> = RTree::new();
    assert_eq!(tree.depth(), 0);

    let tree = tree.add(1, Geometry::point(0.0, 0.0));
    assert!(matches!(tree.root().map(|r| &**r), Some(Node::Leaf(_))));
    assert_eq!(tree.depth(), 1);
}
