//! Integration tests for container reflow.
//!
//! All tests use `ApproximateFontMetrics` at a 10px font: every character
//! is 6px wide, `line-height: normal` is 12px.

use reflow_core::context::{LayoutInput, ReflowContext};
use reflow_core::{
    ApproximateFontMetrics, BoxContent, BoxId, BoxTree, ClearSide, Container, Dimension, Display,
    EdgeSizes, FirstLineStyle, FloatSide, FragmentKind, LayoutConfig, LayoutCoord, LayoutEngine,
    LayoutError, LayoutStatus, LayoutVisitor, Line, Margins, MemoryBudget, Overflow, Point, Rect,
    ReplacedContent, ResolvedStyle, SpaceManager, TextAlign, UnicodeBreakOracle, VerticalLayout,
    WhiteSpace,
};

/// Helper: a block box at the test font size.
fn block() -> ResolvedStyle {
    ResolvedStyle {
        font_size: 10.0,
        ..ResolvedStyle::block()
    }
}

/// Helper: the root box at the test font size.
fn root_style() -> ResolvedStyle {
    ResolvedStyle {
        font_size: 10.0,
        ..ResolvedStyle::root()
    }
}

/// Helper: a left float with a fixed size.
fn fixed_float(width: LayoutCoord, height: LayoutCoord) -> ResolvedStyle {
    ResolvedStyle {
        float: Some(FloatSide::Left),
        width: Dimension::Px(width),
        height: Dimension::Px(height),
        ..block()
    }
}

/// Helper: `n` four-letter words separated by single spaces.
fn words(n: usize) -> String {
    vec!["aaaa"; n].join(" ")
}

fn layout(tree: &BoxTree, width: LayoutCoord) -> Container {
    LayoutEngine::default()
        .layout(tree, width, 600)
        .expect("unlimited budget")
}

fn lines(container: &Container) -> Vec<&Line> {
    container.lines().collect()
}

/// Records everything a painter would see.
#[derive(Debug, Default, PartialEq)]
struct Geometry {
    boxes: Vec<(BoxId, Rect)>,
    lines: Vec<(Point, LayoutCoord, LayoutCoord, usize)>,
}

impl LayoutVisitor for Geometry {
    fn enter_container(&mut self, container: &Container, border_box: Rect) {
        self.boxes.push((container.node(), border_box));
    }

    fn visit_line(&mut self, line: &Line, origin: Point) {
        self.lines
            .push((origin, line.width, line.height, line.fragments.len()));
    }
}

fn geometry(root: &Container) -> Geometry {
    let mut g = Geometry::default();
    root.traverse(&mut g, Point::default());
    g
}

// ---------------------------------------------------------------------------
// Block layout and margins
//
// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
// ---------------------------------------------------------------------------

#[test]
fn test_auto_width_block_with_short_paragraph() {
    let mut tree = BoxTree::new(root_style());
    let p = tree.append_element(tree.root(), block());
    let _ = tree.append_text(p, "hello world");

    let root = layout(&tree, 300);
    let p = root.find(p).expect("paragraph container");
    assert_eq!(p.width, 300);
    assert_eq!(p.height, 12);

    let lines = lines(p);
    assert_eq!(lines.len(), 1);
    let line = lines[0];
    assert_eq!((line.x, line.y, line.width, line.height), (0, 0, 300, 12));
    assert_eq!(line.content_width(), 66);
    assert_eq!(line.fragments[0].width, 36);
    assert_eq!(line.fragments[1].x, 36);
    assert!(line.used_space <= line.width);
}

#[test]
fn test_sibling_paragraph_margins_collapse() {
    let mut tree = BoxTree::new(root_style());
    let style = ResolvedStyle {
        margin: Margins::vertical(10, 10),
        ..block()
    };
    let p1 = tree.append_element(tree.root(), style.clone());
    let _ = tree.append_text(p1, "first");
    let p2 = tree.append_element(tree.root(), style);
    let _ = tree.append_text(p2, "second");

    let root = layout(&tree, 300);
    let a = root.find(p1).expect("p1");
    let b = root.find(p2).expect("p2");
    assert_eq!(a.y, 10);
    assert_eq!(b.y - (a.y + a.height), 10, "gap must be max(10, 10)");
    // The root is a formatting context root: the last margin stays inside.
    assert_eq!(root.height, b.y + b.height + 10);
}

#[test]
fn test_stack_entries_follow_each_other() {
    let (tree, _) = document("second paragraph");
    let root = layout(&tree, 300);
    let stacked: Vec<&VerticalLayout> = root.stack().iter().filter(|i| i.is_in_stack()).collect();
    assert_eq!(stacked.len(), 3);
    for pair in stacked.windows(2) {
        assert!(pair[0].stack_position() + pair[0].layout_height() <= pair[1].stack_position());
    }
    let last = stacked[2];
    assert_eq!(root.height, last.stack_position() + last.layout_height() + 8);
}

#[test]
fn test_parent_and_child_top_margins_collapse() {
    let mut tree = BoxTree::new(root_style());
    let outer = tree.append_element(
        tree.root(),
        ResolvedStyle {
            margin: Margins::vertical(20, 0),
            ..block()
        },
    );
    let inner = tree.append_element(
        outer,
        ResolvedStyle {
            margin: Margins::vertical(30, 0),
            ..block()
        },
    );
    let _ = tree.append_text(inner, "x");

    let root = layout(&tree, 300);
    let outer_c = root.find(outer).expect("outer");
    let inner_c = outer_c.find(inner).expect("inner");
    assert_eq!(outer_c.y, 30, "margins collapse to max(20, 30)");
    assert_eq!(inner_c.y, 0);
    assert_eq!(outer_c.height, 12);
}

#[test]
fn test_empty_block_collapses_through() {
    let mut tree = BoxTree::new(root_style());
    let a = tree.append_element(tree.root(), block());
    let _ = tree.append_text(a, "a");
    let empty = tree.append_element(
        tree.root(),
        ResolvedStyle {
            margin: Margins::vertical(15, 25),
            ..block()
        },
    );
    let b = tree.append_element(
        tree.root(),
        ResolvedStyle {
            margin: Margins::vertical(5, 0),
            ..block()
        },
    );
    let _ = tree.append_text(b, "b");

    let root = layout(&tree, 300);
    let item = root
        .stack()
        .iter()
        .find_map(|item| match item {
            VerticalLayout::Block(block) if block.container.node() == empty => Some(block),
            _ => None,
        })
        .expect("empty block");
    assert!(item.collapsed_through);
    assert_eq!(item.container.height, 0);
    assert_eq!(root.find(b).expect("b").y, 12 + 25);
}

#[test]
fn test_padding_stops_collapse_with_child() {
    let mut tree = BoxTree::new(root_style());
    let outer = tree.append_element(
        tree.root(),
        ResolvedStyle {
            padding: EdgeSizes {
                top: 4,
                ..EdgeSizes::default()
            },
            ..block()
        },
    );
    let inner = tree.append_element(
        outer,
        ResolvedStyle {
            margin: Margins::vertical(10, 0),
            ..block()
        },
    );
    let _ = tree.append_text(inner, "x");

    let root = layout(&tree, 300);
    let outer_c = root.find(outer).expect("outer");
    assert_eq!(outer_c.y, 0);
    assert_eq!(outer_c.find(inner).expect("inner").y, 10);
    assert_eq!(outer_c.height, 4 + 10 + 12);
}

#[test]
fn test_mixed_and_negative_sibling_margins() {
    // (bottom of the first, top of the second, resulting gap)
    for (bottom, top, gap) in [(20, -5, 15), (-4, -10, -10), (-6, 3, -3)] {
        let mut tree = BoxTree::new(root_style());
        let a = tree.append_element(
            tree.root(),
            ResolvedStyle {
                margin: Margins::vertical(0, bottom),
                ..block()
            },
        );
        let _ = tree.append_text(a, "a");
        let b = tree.append_element(
            tree.root(),
            ResolvedStyle {
                margin: Margins::vertical(top, 0),
                ..block()
            },
        );
        let _ = tree.append_text(b, "b");

        let root = layout(&tree, 300);
        let a = root.find(a).expect("a");
        let b = root.find(b).expect("b");
        assert_eq!(b.y - (a.y + a.height), gap, "margins {bottom} and {top}");
    }
}

// ---------------------------------------------------------------------------
// Floats and clearance
//
// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
// ---------------------------------------------------------------------------

#[test]
fn test_lines_shorten_beside_left_float() {
    let mut tree = BoxTree::new(root_style());
    let _ = tree.append_element(tree.root(), fixed_float(100, 50));
    let _ = tree.append_text(tree.root(), &words(40));

    let root = layout(&tree, 300);
    let lines = lines(&root);
    assert_eq!(lines.len(), 6);
    for line in &lines[..5] {
        assert_eq!((line.x, line.width), (100, 200), "line at y={}", line.y);
    }
    let below = lines[5];
    assert_eq!((below.x, below.y, below.width), (0, 60, 300));
}

#[test]
fn test_clearance_moves_block_below_float() {
    let mut tree = BoxTree::new(root_style());
    let _ = tree.append_element(tree.root(), fixed_float(100, 50));
    let cleared = tree.append_element(
        tree.root(),
        ResolvedStyle {
            clear: Some(ClearSide::Left),
            ..block()
        },
    );
    let _ = tree.append_text(cleared, "below");

    let root = layout(&tree, 300);
    let c = root.find(cleared).expect("cleared block");
    assert_eq!(c.y, 50);
    assert_eq!(lines(c)[0].x, 0);
}

#[test]
fn test_formatting_context_root_avoids_float() {
    let mut tree = BoxTree::new(root_style());
    let _ = tree.append_element(tree.root(), fixed_float(100, 50));
    let boxed = tree.append_element(
        tree.root(),
        ResolvedStyle {
            overflow: Overflow::Hidden,
            ..block()
        },
    );
    let _ = tree.append_text(boxed, "beside");

    let root = layout(&tree, 300);
    let c = root.find(boxed).expect("bfc block");
    assert_eq!((c.x, c.y, c.width), (100, 0, 200));
}

#[test]
fn test_float_too_wide_for_line_waits_below_it() {
    let mut tree = BoxTree::new(root_style());
    let _ = tree.append_text(tree.root(), "aaaa aaaa");
    let float = tree.append_element(tree.root(), fixed_float(280, 20));
    let _ = tree.append_text(tree.root(), " bbbb");

    let root = layout(&tree, 300);
    let lines = lines(&root);
    assert_eq!(lines.len(), 1);
    assert_eq!((lines[0].x, lines[0].width), (0, 300));

    let item = root
        .stack()
        .iter()
        .find_map(|item| match item {
            VerticalLayout::Float(f) => Some(f),
            _ => None,
        })
        .expect("float item");
    assert!(item.deferred);
    assert_eq!(item.container.node(), float);
    assert_eq!(item.margin_box, Rect::new(0, 12, 280, 20));
    assert_eq!(root.height, 32, "the root contains its floats");
}

#[test]
fn test_float_moves_with_margin_collapsing_through_parent() {
    let mut tree = BoxTree::new(root_style());
    let outer = tree.append_element(tree.root(), block());
    let float = tree.append_element(outer, fixed_float(50, 20));
    let inner = tree.append_element(
        outer,
        ResolvedStyle {
            margin: Margins::vertical(10, 0),
            ..block()
        },
    );
    let _ = tree.append_text(inner, "beside");

    let root = layout(&tree, 300);
    let outer_c = root.find(outer).expect("outer");
    assert_eq!(outer_c.y, 10, "the child's margin collapses through the parent");

    let g = geometry(&root);
    let top_of = |node: BoxId| g.boxes.iter().find(|(id, _)| *id == node).map(|(_, rect)| rect.y);
    assert_eq!(top_of(float), Some(10));
    assert_eq!(top_of(inner), Some(10));
    assert_eq!(lines(outer_c.find(inner).expect("inner"))[0].x, 50);
}

// ---------------------------------------------------------------------------
// Inline layout
//
// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
// ---------------------------------------------------------------------------

#[test]
fn test_text_align_center() {
    let mut tree = BoxTree::new(root_style());
    let p = tree.append_element(
        tree.root(),
        ResolvedStyle {
            text_align: TextAlign::Center,
            ..block()
        },
    );
    let _ = tree.append_text(p, "aaaa");

    let root = layout(&tree, 300);
    let line = lines(root.find(p).expect("p"))[0];
    assert_eq!(line.fragments[0].x, (300 - 24) / 2);
}

#[test]
fn test_forced_break_starts_new_line() {
    let mut tree = BoxTree::new(root_style());
    let p = tree.append_element(tree.root(), block());
    let _ = tree.append_text(p, "aa");
    let _ = tree.append(p, ResolvedStyle::inline(), BoxContent::LineBreak);
    let _ = tree.append_text(p, "bb");

    let root = layout(&tree, 300);
    let lines = lines(root.find(p).expect("p"));
    assert_eq!(lines.len(), 2);
    assert!(lines[0].has_forced_break);
    assert_eq!(lines[1].y, 12);
}

#[test]
fn test_preserved_newlines_break_lines() {
    let mut tree = BoxTree::new(root_style());
    let p = tree.append_element(
        tree.root(),
        ResolvedStyle {
            white_space: WhiteSpace::Pre,
            ..block()
        },
    );
    let _ = tree.append_text(p, "a b\ncd");

    let root = layout(&tree, 300);
    let lines = lines(root.find(p).expect("p"));
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].content_width(), 18);
    assert_eq!(lines[1].content_width(), 12);
}

#[test]
fn test_inline_box_edges_take_space() {
    let mut tree = BoxTree::new(root_style());
    let p = tree.append_element(tree.root(), block());
    let span = tree.append_element(
        p,
        ResolvedStyle {
            padding: EdgeSizes {
                left: 5,
                right: 5,
                ..EdgeSizes::default()
            },
            font_size: 10.0,
            ..ResolvedStyle::inline()
        },
    );
    let _ = tree.append_text(span, "aa");

    let root = layout(&tree, 300);
    let line = lines(root.find(p).expect("p"))[0];
    let kinds: Vec<bool> = line
        .fragments
        .iter()
        .map(|f| matches!(f.kind, FragmentKind::InlineStart | FragmentKind::InlineEnd))
        .collect();
    assert_eq!(kinds, [true, false, true]);
    assert_eq!(line.content_width(), 22);
}

#[test]
fn test_negative_text_indent_overflows_left() {
    let mut tree = BoxTree::new(root_style());
    let p = tree.append_element(
        tree.root(),
        ResolvedStyle {
            text_indent: -20,
            ..block()
        },
    );
    let _ = tree.append_text(p, "aaaa");

    let root = layout(&tree, 300);
    let line = lines(root.find(p).expect("p"))[0];
    assert_eq!(line.fragments[0].x, -20);
    assert_eq!((line.overflow_left, line.overflow_right), (20, 0));
}

#[test]
fn test_unbreakable_word_overflows_right() {
    let mut tree = BoxTree::new(root_style());
    let p = tree.append_element(tree.root(), block());
    let _ = tree.append_text(p, &"a".repeat(16));

    let root = layout(&tree, 60);
    let lines = lines(root.find(p).expect("p"));
    assert_eq!(lines.len(), 1);
    assert_eq!((lines[0].width, lines[0].content_width()), (60, 96));
    assert_eq!((lines[0].overflow_left, lines[0].overflow_right), (0, 36));
}

#[test]
fn test_paragraph_width_limit() {
    let config = LayoutConfig {
        paragraph_width_limit: Some(100),
        ..LayoutConfig::default()
    };
    let mut tree = BoxTree::new(root_style());
    let p = tree.append_element(tree.root(), block());
    let _ = tree.append_text(p, &words(20));

    let root = LayoutEngine::new(config)
        .layout(&tree, 300, 600)
        .expect("unlimited budget");
    for line in lines(root.find(p).expect("p")) {
        assert_eq!(line.width, 100);
        assert!(line.content_width() <= 100);
    }
}

// ---------------------------------------------------------------------------
// ::first-line
//
// [§ 5.12.1 The :first-line pseudo-element](https://www.w3.org/TR/CSS2/selector.html#first-line-pseudo)
// ---------------------------------------------------------------------------

fn first_line_tree(text: &str) -> (BoxTree, BoxId) {
    let mut tree = BoxTree::new(root_style());
    let p = tree.append_element(
        tree.root(),
        ResolvedStyle {
            first_line: Some(FirstLineStyle {
                font_size: Some(20.0),
                line_height: None,
            }),
            ..block()
        },
    );
    let _ = tree.append_text(p, text);
    (tree, p)
}

#[test]
fn test_first_line_suspends_once_and_resumes() {
    let text = words(20);
    let (tree, p) = first_line_tree(&text);
    let mut root = Container::new(tree.root(), &tree);
    let report = LayoutEngine::default()
        .reflow(&tree, &mut root, 300, 600)
        .expect("unlimited budget");
    assert_eq!(report.first_line_suspensions, 1);
    assert!(!root.any_reflowing());

    let p = root.find(p).expect("p");
    let lines = lines(p);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].is_first_line);
    assert!(!lines[1].is_first_line);
    assert_eq!(lines[0].fragments.len(), 5);
    assert_eq!(lines[0].height, 24);
    assert_eq!(lines[1].y, 24);
    assert_eq!(lines[1].height, 12);

    // Every word is laid out exactly once.
    let laid_out: Vec<&str> = lines
        .iter()
        .flat_map(|line| line.fragments.iter())
        .filter_map(|f| f.text_range())
        .map(|range| text[range].trim())
        .collect();
    assert_eq!(laid_out, text.split(' ').collect::<Vec<_>>());
}

#[test]
fn test_first_line_without_more_content_does_not_suspend() {
    let (tree, _) = first_line_tree("short");
    let mut root = Container::new(tree.root(), &tree);
    let report = LayoutEngine::default()
        .reflow(&tree, &mut root, 300, 600)
        .expect("unlimited budget");
    assert_eq!(report.first_line_suspensions, 0);
}

#[test]
fn test_finish_layout_after_suspension() {
    let mut tree = BoxTree::new(ResolvedStyle {
        first_line: Some(FirstLineStyle {
            font_size: Some(20.0),
            line_height: None,
        }),
        ..root_style()
    });
    let _ = tree.append_text(tree.root(), &words(20));

    let config = LayoutConfig::default();
    let metrics = ApproximateFontMetrics;
    let oracle = UnicodeBreakOracle;
    let mut cx = ReflowContext::new(&tree, &config, &metrics, &oracle);
    let mut space = SpaceManager::new();
    let mut root = Container::new(tree.root(), &tree);

    let status = root
        .layout(&mut cx, &mut space, &LayoutInput::root(300, 600))
        .expect("unlimited budget");
    assert!(matches!(status, LayoutStatus::EndOfFirstLine(_)));
    assert!(root.is_reflowing());

    root.finish_layout(&mut cx, &mut space).expect("unlimited budget");
    assert!(!root.is_reflowing());
    assert_eq!(root.lines().count(), 1);
    assert_eq!(root.height, 24);
    assert!(!root.is_min_max_calculated());
}

#[test]
fn test_resume_without_suspension_is_an_error() {
    let mut tree = BoxTree::new(root_style());
    let _ = tree.append_text(tree.root(), "text");

    let config = LayoutConfig::default();
    let metrics = ApproximateFontMetrics;
    let oracle = UnicodeBreakOracle;
    let mut cx = ReflowContext::new(&tree, &config, &metrics, &oracle);
    let mut space = SpaceManager::new();
    let mut root = Container::new(tree.root(), &tree);

    let input = LayoutInput::root(300, 600).resumed(Some(reflow_core::ResumePoint {
        path: vec![0],
        text_offset: 2,
    }));
    assert!(matches!(
        root.layout(&mut cx, &mut space, &input),
        Err(LayoutError::ResumeMismatch(_))
    ));
}

// ---------------------------------------------------------------------------
// Shrink-to-fit
//
// [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
// ---------------------------------------------------------------------------

#[test]
fn test_shrink_to_fit_float_honours_min_width() {
    let mut tree = BoxTree::new(root_style());
    let float = tree.append_element(
        tree.root(),
        ResolvedStyle {
            float: Some(FloatSide::Left),
            min_width: Dimension::Px(50),
            ..block()
        },
    );
    let _ = tree.append_text(float, "aaaaa");

    let mut root = Container::new(tree.root(), &tree);
    let report = LayoutEngine::default()
        .reflow(&tree, &mut root, 200, 600)
        .expect("unlimited budget");
    assert_eq!(report.passes, 2, "first visit guesses, second corrects");

    let c = root.find(float).expect("float");
    assert_eq!(c.width, 50);
    let widths = c.min_max_width().expect("computed");
    assert_eq!((widths.minimum, widths.normal_minimum, widths.maximum), (50, 50, 50));
}

#[test]
fn test_shrink_to_fit_float_takes_natural_width() {
    let mut tree = BoxTree::new(root_style());
    let float = tree.append_element(
        tree.root(),
        ResolvedStyle {
            float: Some(FloatSide::Left),
            ..block()
        },
    );
    let _ = tree.append_text(float, "aaaa aa");
    let _ = tree.append_text(tree.root(), "beside");

    let root = layout(&tree, 300);
    let c = root.find(float).expect("float");
    assert_eq!(c.width, 42);
    assert_eq!(lines(&root)[0].x, 42);
}

#[test]
fn test_percentage_replaced_element_settles_in_one_correction() {
    let mut tree = BoxTree::new(root_style());
    let float = tree.append_element(
        tree.root(),
        ResolvedStyle {
            float: Some(FloatSide::Left),
            ..block()
        },
    );
    let _ = tree.append(
        float,
        ResolvedStyle::inline(),
        BoxContent::Replaced(ReplacedContent {
            width: 40,
            height: 20,
            percent_width: Some(50.0),
        }),
    );

    let mut root = Container::new(tree.root(), &tree);
    let report = LayoutEngine::default()
        .reflow(&tree, &mut root, 200, 600)
        .expect("unlimited budget");
    assert_eq!(report.passes, 2);

    let c = root.find(float).expect("float");
    assert_eq!(c.width, 40);
    let widths = c.min_max_width().expect("computed");
    assert_eq!((widths.minimum, widths.normal_minimum, widths.maximum), (0, 0, 40));
    assert_eq!(lines(c)[0].fragments[0].width, 20);
}

#[test]
fn test_shrink_to_fit_counts_floats_beside_blocks() {
    let mut tree = BoxTree::new(root_style());
    let outer = tree.append_element(
        tree.root(),
        ResolvedStyle {
            float: Some(FloatSide::Left),
            ..block()
        },
    );
    let _ = tree.append_element(outer, fixed_float(100, 50));
    let p = tree.append_element(outer, block());
    let _ = tree.append_text(p, "aaaaa aaaaa");

    let root = layout(&tree, 300);
    let c = root.find(outer).expect("outer float");
    let widths = c.min_max_width().expect("computed");
    assert_eq!((widths.minimum, widths.normal_minimum, widths.maximum), (100, 100, 166));
    assert_eq!(c.width, 166);

    let lines = lines(c.find(p).expect("p"));
    assert_eq!(lines.len(), 1);
    assert_eq!((lines[0].x, lines[0].width), (100, 66));
}

#[test]
fn test_inline_block_shrinks_to_content() {
    let mut tree = BoxTree::new(root_style());
    let p = tree.append_element(tree.root(), block());
    let _ = tree.append_text(p, "aa ");
    let ib = tree.append_element(
        p,
        ResolvedStyle {
            display: Display::InlineBlock,
            ..block()
        },
    );
    let _ = tree.append_text(ib, "bbbb");

    let root = layout(&tree, 300);
    let p = root.find(p).expect("p");
    let c = p.find(ib).expect("inline-block");
    assert_eq!(c.width, 24);
    assert_eq!(c.x, 18);
}

// ---------------------------------------------------------------------------
// Incremental reflow
// ---------------------------------------------------------------------------

fn document(changed: &str) -> (BoxTree, BoxId) {
    let mut tree = BoxTree::new(root_style());
    let _ = tree.append_element(tree.root(), fixed_float(60, 30));
    let mut target = tree.root();
    for (i, text) in ["first paragraph", changed, "third one here"].iter().enumerate() {
        let p = tree.append_element(
            tree.root(),
            ResolvedStyle {
                margin: Margins::vertical(8, 8),
                ..block()
            },
        );
        let t = tree.append_text(p, text);
        if i == 1 {
            target = t;
        }
    }
    (tree, target)
}

#[test]
fn test_skipped_subtrees_match_full_reflow() {
    let (mut tree, target) = document("second paragraph");
    let engine = LayoutEngine::default();
    let mut root = Container::new(tree.root(), &tree);
    let _ = engine.reflow(&tree, &mut root, 300, 600).expect("first");

    tree.set_text(target, "second changed!!");
    let report = engine.reflow(&tree, &mut root, 300, 600).expect("second");
    assert!(report.containers_skipped >= 1);

    let (fresh_tree, _) = document("second changed!!");
    let fresh = layout(&fresh_tree, 300);
    assert_eq!(geometry(&root), geometry(&fresh));
}

#[test]
fn test_unchanged_tree_is_skipped_entirely() {
    let (tree, _) = document("second paragraph");
    let engine = LayoutEngine::default();
    let mut root = Container::new(tree.root(), &tree);
    let _ = engine.reflow(&tree, &mut root, 300, 600).expect("first");
    let before = geometry(&root);

    let report = engine.reflow(&tree, &mut root, 300, 600).expect("second");
    assert_eq!(report.containers_laid_out, 0);
    assert_eq!(report.containers_skipped, 1);
    assert_eq!(geometry(&root), before);
}

#[test]
fn test_unchanged_block_below_pending_float_still_moves_it() {
    let mut tree = BoxTree::new(root_style());
    let float = tree.append_element(tree.root(), fixed_float(60, 30));
    let p1 = tree.append_element(
        tree.root(),
        ResolvedStyle {
            margin: Margins::vertical(8, 0),
            ..block()
        },
    );
    let _ = tree.append_text(p1, "first");
    let p2 = tree.append_element(tree.root(), block());
    let text = tree.append_text(p2, "second");

    let engine = LayoutEngine::default();
    let mut root = Container::new(tree.root(), &tree);
    let _ = engine.reflow(&tree, &mut root, 300, 600).expect("first");
    tree.set_text(text, "changed");
    let _ = engine.reflow(&tree, &mut root, 300, 600).expect("second");

    let item = root
        .stack()
        .iter()
        .find_map(|item| match item {
            VerticalLayout::Float(f) if f.container.node() == float => Some(f),
            _ => None,
        })
        .expect("float item");
    assert_eq!(item.margin_box.y, 8, "the float sits below the collapsed margin");
    assert_eq!(root.find(p1).expect("p1").y, 8);
    assert_eq!(lines(root.find(p1).expect("p1"))[0].x, 60);
}

#[test]
fn test_recomputed_intrinsic_widths_match() {
    let (tree, _) = document("second paragraph");
    let engine = LayoutEngine::default();
    let mut root = Container::new(tree.root(), &tree);
    let _ = engine.reflow(&tree, &mut root, 300, 600).expect("first");
    let widths = root.min_max_width();
    let before = geometry(&root);
    assert!(widths.is_some());

    root.clear_min_max_width();
    assert!(!root.is_min_max_calculated());
    let report = engine.reflow(&tree, &mut root, 300, 600).expect("second");
    assert!(report.containers_laid_out >= 1);
    assert!(root.is_min_max_calculated());
    assert_eq!(root.min_max_width(), widths);
    assert_eq!(geometry(&root), before);
}

#[test]
fn test_resize_reports_moved_areas() {
    let (tree, _) = document("second paragraph");
    let engine = LayoutEngine::default();
    let mut root = Container::new(tree.root(), &tree);
    let _ = engine.reflow(&tree, &mut root, 300, 600).expect("first");

    let report = engine.reflow(&tree, &mut root, 120, 600).expect("resize");
    assert!(report.containers_laid_out > 0);
    assert!(!report.invalidated.is_empty());
}

// ---------------------------------------------------------------------------
// Allocation failure
// ---------------------------------------------------------------------------

fn busy_document() -> BoxTree {
    let mut tree = BoxTree::new(root_style());
    let _ = tree.append_element(tree.root(), fixed_float(80, 40));
    let p = tree.append_element(
        tree.root(),
        ResolvedStyle {
            margin: Margins::vertical(6, 6),
            first_line: Some(FirstLineStyle {
                font_size: Some(14.0),
                line_height: None,
            }),
            ..block()
        },
    );
    let _ = tree.append_text(p, &words(30));
    let ib = tree.append_element(
        p,
        ResolvedStyle {
            display: Display::InlineBlock,
            ..block()
        },
    );
    let _ = tree.append_text(ib, "inline block");
    let float = tree.append_element(
        p,
        ResolvedStyle {
            float: Some(FloatSide::Right),
            ..block()
        },
    );
    let _ = tree.append_text(float, "side");
    let cleared = tree.append_element(
        tree.root(),
        ResolvedStyle {
            clear: Some(ClearSide::Both),
            ..block()
        },
    );
    let _ = tree.append_text(cleared, &words(12));
    tree
}

#[test]
fn test_out_of_memory_at_every_step_leaves_clean_state() {
    let expected = geometry(&layout(&busy_document(), 300));
    let mut succeeded = false;

    for limit in 0..20_000 {
        let tree = busy_document();
        let mut root = Container::new(tree.root(), &tree);
        let engine = LayoutEngine::default().with_memory_budget(MemoryBudget::limited(limit));
        match engine.reflow(&tree, &mut root, 300, 600) {
            Ok(_) => {
                assert_eq!(geometry(&root), expected);
                succeeded = true;
                break;
            }
            Err(error) => {
                assert_eq!(error, LayoutError::OutOfMemory);
                assert!(!root.any_reflowing(), "limit {limit} left a container mid-pass");
                let _ = LayoutEngine::default()
                    .reflow(&tree, &mut root, 300, 600)
                    .expect("retry with unlimited budget");
                assert_eq!(geometry(&root), expected, "limit {limit}");
            }
        }
    }
    assert!(succeeded, "layout never fit the budget");
}
