use triage_core::routing::Pane;
use triage_tui::layout::compute;

#[test]
fn wide_terminals_show_every_column() {
    let layout = compute(200, Pane::Orphaned);
    assert!(layout.show_signal);
    assert!(layout.show_author);
    assert!(layout.show_ci);
}

#[test]
fn columns_hide_in_order_signal_author_ci() {
    // Shrink an Orphaned pane and watch the hide order.
    let at_110 = compute(110, Pane::Orphaned);
    assert!(!at_110.show_signal);
    assert!(at_110.show_author);
    assert!(at_110.show_ci);

    let at_95 = compute(95, Pane::Orphaned);
    assert!(!at_95.show_signal);
    assert!(!at_95.show_author);
    assert!(at_95.show_ci);

    let at_80 = compute(80, Pane::Orphaned);
    assert!(!at_80.show_signal);
    assert!(!at_80.show_author);
    assert!(!at_80.show_ci);
}

#[test]
fn signal_never_applies_outside_orphaned() {
    let layout = compute(300, Pane::Priority);
    assert!(!layout.show_signal);
    assert!(layout.show_author);
    assert!(layout.show_ci);
}

#[test]
fn flex_widths_respect_their_bounds() {
    for width in [60u16, 80, 100, 140, 200, 320] {
        for pane in [Pane::Priority, Pane::Assigned, Pane::Orphaned] {
            let layout = compute(width, pane);
            assert!(
                (30..=120).contains(&layout.title_width),
                "title width {} out of bounds at terminal width {}",
                layout.title_width,
                width
            );
            assert!(
                (20..=50).contains(&layout.repo_width),
                "repo width {} out of bounds at terminal width {}",
                layout.repo_width,
                width
            );
        }
    }
}

#[test]
fn title_takes_the_larger_share_of_leftover() {
    let layout = compute(200, Pane::Assigned);
    assert!(layout.title_width > layout.repo_width);
}

#[test]
fn very_wide_terminals_cap_the_flex_columns() {
    let layout = compute(500, Pane::Priority);
    assert_eq!(layout.title_width, 120);
    assert_eq!(layout.repo_width, 50);
}
