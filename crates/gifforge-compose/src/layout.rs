//! Canvas layout math for composed frames.

use gifforge_core::Alignment;

/// Top-left position of an item anchored inside a canvas.
///
/// Items larger than the canvas get negative offsets and are cropped by
/// the compositor.
pub fn anchor_position(
    alignment: Alignment,
    canvas: (u32, u32),
    item: (u32, u32),
) -> (i64, i64) {
    let (cw, ch) = (canvas.0 as i64, canvas.1 as i64);
    let (iw, ih) = (item.0 as i64, item.1 as i64);

    let left = 0;
    let center_x = (cw - iw) / 2;
    let right = cw - iw;
    let top = 0;
    let center_y = (ch - ih) / 2;
    let bottom = ch - ih;

    match alignment {
        Alignment::TopLeft => (left, top),
        Alignment::TopMiddle => (center_x, top),
        Alignment::TopRight => (right, top),
        Alignment::MiddleLeft => (left, center_y),
        Alignment::Center => (center_x, center_y),
        Alignment::MiddleRight => (right, center_y),
        Alignment::BottomLeft => (left, bottom),
        Alignment::BottomMiddle => (center_x, bottom),
        Alignment::BottomRight => (right, bottom),
    }
}

/// Dimensions that fit `(w, h)` inside `bound x bound` preserving aspect
/// ratio. Never upscales.
pub fn fit_within(w: u32, h: u32, bound: u32) -> (u32, u32) {
    if w <= bound && h <= bound {
        return (w, h);
    }
    let scale = (bound as f64 / w as f64).min(bound as f64 / h as f64);
    let fw = ((w as f64 * scale).round() as u32).max(1);
    let fh = ((h as f64 * scale).round() as u32).max(1);
    (fw, fh)
}

/// Normalize an arbitrary clockwise rotation in degrees to quarter turns
/// (0..=3). Arbitrary angles round to the nearest 90-degree step.
pub fn quarter_turns(rotation: i32) -> u32 {
    let quarters = (rotation as f64 / 90.0).round() as i64;
    quarters.rem_euclid(4) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_corners() {
        let canvas = (100, 80);
        let item = (40, 20);
        assert_eq!(anchor_position(Alignment::TopLeft, canvas, item), (0, 0));
        assert_eq!(anchor_position(Alignment::TopRight, canvas, item), (60, 0));
        assert_eq!(anchor_position(Alignment::BottomLeft, canvas, item), (0, 60));
        assert_eq!(
            anchor_position(Alignment::BottomRight, canvas, item),
            (60, 60)
        );
    }

    #[test]
    fn anchor_edges_and_center() {
        let canvas = (100, 80);
        let item = (40, 20);
        assert_eq!(anchor_position(Alignment::TopMiddle, canvas, item), (30, 0));
        assert_eq!(anchor_position(Alignment::MiddleLeft, canvas, item), (0, 30));
        assert_eq!(
            anchor_position(Alignment::MiddleRight, canvas, item),
            (60, 30)
        );
        assert_eq!(
            anchor_position(Alignment::BottomMiddle, canvas, item),
            (30, 60)
        );
        assert_eq!(anchor_position(Alignment::Center, canvas, item), (30, 30));
    }

    #[test]
    fn oversized_item_gets_negative_offset() {
        assert_eq!(
            anchor_position(Alignment::Center, (10, 10), (20, 20)),
            (-5, -5)
        );
    }

    #[test]
    fn fit_within_shrinks_but_never_grows() {
        assert_eq!(fit_within(200, 100, 100), (100, 50));
        assert_eq!(fit_within(100, 200, 100), (50, 100));
        assert_eq!(fit_within(40, 20, 100), (40, 20));
    }

    #[test]
    fn quarter_turn_normalization() {
        assert_eq!(quarter_turns(0), 0);
        assert_eq!(quarter_turns(90), 1);
        assert_eq!(quarter_turns(180), 2);
        assert_eq!(quarter_turns(270), 3);
        assert_eq!(quarter_turns(360), 0);
        assert_eq!(quarter_turns(-90), 3);
        assert_eq!(quarter_turns(45), 1);
        assert_eq!(quarter_turns(44), 0);
        assert_eq!(quarter_turns(449), 1);
    }
}
