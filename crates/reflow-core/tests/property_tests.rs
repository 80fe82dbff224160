//! Properties that hold for any input.

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

use reflow_core::margin::{VerticalMargin, collapse_two_margins};
use reflow_core::{
    BoxTree, Container, Dimension, FloatSide, LayoutCoord, LayoutEngine, MinMaxWidths,
    ResolvedStyle, VerticalLayout,
};

fn block() -> ResolvedStyle {
    ResolvedStyle {
        font_size: 10.0,
        ..ResolvedStyle::block()
    }
}

/// Helper: words of the given lengths (1 to 16 letters each).
fn text_of(lengths: &[u8]) -> String {
    lengths
        .iter()
        .map(|&n| "x".repeat(usize::from(n % 16) + 1))
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Margins
// ---------------------------------------------------------------------------

#[quickcheck]
fn prop_margin_collapse_is_order_independent(margins: Vec<i16>) -> bool {
    let mut forward = VerticalMargin::new();
    let mut backward = VerticalMargin::new();
    for &m in &margins {
        forward.add(LayoutCoord::from(m), false);
    }
    for &m in margins.iter().rev() {
        backward.add(LayoutCoord::from(m), false);
    }
    forward.collapse() == backward.collapse()
}

#[quickcheck]
fn prop_two_margins_collapse_by_sign(a: i16, b: i16) -> bool {
    let (a, b) = (LayoutCoord::from(a), LayoutCoord::from(b));
    let expected = if a >= 0 && b >= 0 {
        a.max(b)
    } else if a < 0 && b < 0 {
        a.min(b)
    } else {
        a + b
    };
    collapse_two_margins(a, b) == expected
}

// ---------------------------------------------------------------------------
// Widths
// ---------------------------------------------------------------------------

#[quickcheck]
fn prop_shrink_to_fit_stays_between_min_and_max(a: u16, b: u16, c: u16, available: u16) -> bool {
    let mut sizes = [a, b, c].map(LayoutCoord::from);
    sizes.sort_unstable();
    let widths = MinMaxWidths {
        minimum: sizes[0],
        normal_minimum: sizes[1],
        maximum: sizes[2],
    };
    let used = widths.shrink_to_fit(LayoutCoord::from(available));
    used >= widths.normal_minimum && used <= widths.maximum
}

#[quickcheck]
fn prop_intrinsic_widths_are_ordered(lengths: Vec<u8>) -> TestResult {
    if lengths.is_empty() {
        return TestResult::discard();
    }
    let mut tree = BoxTree::new(ResolvedStyle::root());
    let float = tree.append_element(
        tree.root(),
        ResolvedStyle {
            float: Some(FloatSide::Left),
            ..block()
        },
    );
    let _ = tree.append_text(float, &text_of(&lengths));

    let Ok(root) = LayoutEngine::default().layout(&tree, 400, 600) else {
        return TestResult::failed();
    };
    let Some(widths) = root.find(float).and_then(Container::min_max_width) else {
        return TestResult::failed();
    };
    TestResult::from_bool(
        widths.minimum <= widths.normal_minimum && widths.normal_minimum <= widths.maximum,
    )
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

#[quickcheck]
fn prop_lines_do_not_overlap(lengths: Vec<u8>, width: u8) -> TestResult {
    if lengths.is_empty() {
        return TestResult::discard();
    }
    let mut tree = BoxTree::new(ResolvedStyle::root());
    let p = tree.append_element(tree.root(), block());
    let _ = tree.append_text(p, &text_of(&lengths));

    let width = LayoutCoord::from(width) + 20;
    let Ok(root) = LayoutEngine::default().layout(&tree, width, 600) else {
        return TestResult::failed();
    };
    let Some(p) = root.find(p) else {
        return TestResult::failed();
    };
    let lines: Vec<_> = p.lines().collect();
    let stacked = lines.windows(2).all(|pair| pair[0].bottom() <= pair[1].y);
    let inside = lines.iter().all(|line| line.content_width() <= line.width || line.fragments.len() == 1);
    TestResult::from_bool(stacked && inside)
}

#[quickcheck]
fn prop_same_side_floats_never_rise(sizes: Vec<(u8, u8)>) -> TestResult {
    if sizes.is_empty() {
        return TestResult::discard();
    }
    let mut tree = BoxTree::new(ResolvedStyle::root());
    for &(w, h) in &sizes {
        let _ = tree.append_element(
            tree.root(),
            ResolvedStyle {
                float: Some(FloatSide::Left),
                width: Dimension::Px(LayoutCoord::from(w) + 1),
                height: Dimension::Px(LayoutCoord::from(h) + 1),
                ..block()
            },
        );
    }

    let Ok(root) = LayoutEngine::default().layout(&tree, 300, 600) else {
        return TestResult::failed();
    };
    let tops: Vec<LayoutCoord> = root
        .stack()
        .iter()
        .filter_map(|item| match item {
            VerticalLayout::Float(f) => Some(f.margin_box.y),
            _ => None,
        })
        .collect();
    TestResult::from_bool(tops.len() == sizes.len() && tops.windows(2).all(|t| t[0] <= t[1]))
}
