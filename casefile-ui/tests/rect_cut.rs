use casefile_ui::{Rect, Vec2};

#[test]
fn test_cut() {
    let screen = Rect::new(0.0, 0.0, 1000.0, 800.0);

    let (header, body) = screen.split_top(100.0);
    assert_eq!(header, Rect::new(0.0, 0.0, 1000.0, 100.0));
    assert_eq!(body, Rect::new(0.0, 100.0, 1000.0, 700.0));

    let padded = body.shrink(20.0);
    assert_eq!(padded, Rect::new(20.0, 120.0, 960.0, 660.0));
}

#[test]
fn test_shrink_collapses() {
    let tiny = Rect::new(5.0, 5.0, 10.0, 10.0);
    assert_eq!(tiny.shrink(6.0), Rect::new(5.0, 5.0, 0.0, 0.0));
}

#[test]
fn test_anchor_and_translate() {
    let r = Rect::new(100.0, 200.0, 400.0, 100.0);
    assert_eq!(r.anchor_point(Vec2::new(1.0, 0.5)), Vec2::new(500.0, 250.0));
    assert_eq!(r.translate(-100.0, 0.0).x, 0.0);
    assert_eq!(r.center(200.0, 50.0), Rect::new(200.0, 225.0, 200.0, 50.0));
}
