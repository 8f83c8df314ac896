use super::*;

const VIEWPORT: Viewport = Viewport { width: 1200.0, height: 800.0 };

#[test]
fn panel_inside_viewport_keeps_natural_placement() {
    let placement = place_panel(Rect::new(100.0, 60.0, 240.0, 300.0), VIEWPORT, 20.0);
    assert!(placement.is_natural());
    assert!(placement.style_overrides().is_empty());
}

#[test]
fn right_overflow_anchors_right() {
    let placement = place_panel(Rect::new(1000.0, 60.0, 240.0, 300.0), VIEWPORT, 20.0);
    assert_eq!(placement.horizontal, Horizontal::AnchorRight);
    assert_eq!(placement.style_overrides(), vec![("left", "auto"), ("right", "0"), ("transform", "none")]);
}

#[test]
fn margin_counts_as_overflow() {
    // Right edge at 1190 sits inside the viewport but within the 20px margin.
    let placement = place_panel(Rect::new(950.0, 60.0, 240.0, 300.0), VIEWPORT, 20.0);
    assert_eq!(placement.horizontal, Horizontal::AnchorRight);
    let relaxed = place_panel(Rect::new(950.0, 60.0, 240.0, 300.0), VIEWPORT, 0.0);
    assert_eq!(relaxed.horizontal, Horizontal::Natural);
}

#[test]
fn left_overflow_anchors_left() {
    let placement = place_panel(Rect::new(-30.0, 60.0, 240.0, 300.0), VIEWPORT, 20.0);
    assert_eq!(placement.horizontal, Horizontal::AnchorLeft);
    assert_eq!(placement.style_overrides(), vec![("left", "0"), ("right", "auto"), ("transform", "none")]);
}

#[test]
fn right_overflow_wins_over_left() {
    let wide = Rect::new(-10.0, 60.0, 1300.0, 100.0);
    assert_eq!(place_panel(wide, VIEWPORT, 20.0).horizontal, Horizontal::AnchorRight);
}

#[test]
fn bottom_overflow_flips_above() {
    let placement = place_panel(Rect::new(100.0, 600.0, 240.0, 300.0), VIEWPORT, 20.0);
    assert_eq!(placement.vertical, Vertical::Above);
    assert_eq!(placement.horizontal, Horizontal::Natural);
    assert_eq!(
        placement.style_overrides(),
        vec![("top", "auto"), ("bottom", "100%"), ("margin-top", "0"), ("margin-bottom", "0.5rem")]
    );
}

#[test]
fn every_override_property_is_cleared_on_close() {
    let corner = Placement { horizontal: Horizontal::AnchorRight, vertical: Vertical::Above };
    for (property, _) in corner.style_overrides() {
        assert!(PLACEMENT_PROPERTIES.contains(&property), "{property} not in clear list");
    }
}
