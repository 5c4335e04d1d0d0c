use ordered_tree::OrderedTree;

use std::collections::HashSet;

/// Inserts `xs` in order into a fresh tree.
fn build(xs: &[i8]) -> OrderedTree<i8> {
    OrderedTree::from_keys("quick", xs.iter().copied())
}

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let tree = build(&xs);

    xs.iter().all(|x| tree.contains(x))
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let tree = build(&xs);
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| !tree.contains(x) && tree.get_by_key(x).is_none())
}

#[quickcheck]
fn in_order_is_sorted(xs: Vec<i8>) -> bool {
    let tree = build(&xs);
    let keys = tree.in_order();

    keys.windows(2).all(|pair| pair[0] <= pair[1]) && keys.len() == xs.len()
}

#[quickcheck]
fn mirror_is_involutive(xs: Vec<i8>) -> bool {
    let mut tree = build(&xs);
    let before = tree.shape_view();
    if tree.mirror().is_err() {
        return xs.is_empty();
    }
    let mirrored = tree.in_order();
    let mut reversed = mirrored.clone();
    reversed.reverse();
    let reversed_ok = reversed.windows(2).all(|pair| pair[0] <= pair[1]);

    tree.mirror().is_ok() && reversed_ok && tree.shape_view() == before
}

#[quickcheck]
fn balance_preserves_keys(xs: Vec<i8>) -> bool {
    let mut tree = build(&xs);
    tree.balance();

    let mut expected = xs;
    expected.sort_unstable();
    let keys: Vec<_> = tree.in_order().into_iter().copied().collect();

    keys == expected && tree.len() == expected.len()
}

#[quickcheck]
fn balance_height_is_minimal(xs: Vec<i8>) -> bool {
    let distinct: HashSet<_> = xs.into_iter().collect();
    let mut tree = OrderedTree::from_keys("distinct", distinct);
    tree.balance();

    let n = tree.len();
    // ceil(log2(n + 1))
    let minimal = (usize::BITS - n.leading_zeros()) as usize;
    tree.height() == minimal
}

#[quickcheck]
fn levels_sum_to_len(xs: Vec<i8>) -> bool {
    let tree = build(&xs);
    let total: usize = (0..tree.height() as isize)
        .map(|level| tree.nodes_at_level(level))
        .sum();

    total == xs.len() && tree.nodes_at_level(tree.height() as isize) == 0
}

#[quickcheck]
fn every_subtree_of_a_bst_is_a_bst(xs: Vec<i8>) -> bool {
    let distinct: HashSet<_> = xs.into_iter().collect();
    let tree = OrderedTree::from_keys("distinct", distinct.iter().copied());

    tree.count_embedded_bsts() == distinct.len()
}

#[quickcheck]
fn successor_is_next_key(xs: Vec<i8>) -> bool {
    // Keep the first copy of each key so the successor is unambiguous but the shape still
    // follows insertion order.
    let mut seen = HashSet::new();
    let keys: Vec<_> = xs.into_iter().filter(|x| seen.insert(*x)).collect();
    let tree = build(&keys);
    let mut sorted = keys.clone();
    sorted.sort_unstable();

    sorted.iter().enumerate().all(|(i, x)| {
        let next = tree.successor(tree.get_by_key(x)).map(|n| *n.key());
        next == sorted.get(i + 1).copied()
    })
}

#[quickcheck]
fn every_path_starts_at_the_root(xs: Vec<i8>) -> bool {
    let tree = build(&xs);
    let Ok(paths) = tree.all_paths() else {
        return xs.is_empty();
    };
    let root = tree.root().map(|n| format!("{} ", n.key())).unwrap_or_default();

    !paths.is_empty() && paths.iter().all(|path| path.starts_with(&root) && path.ends_with(' '))
}
