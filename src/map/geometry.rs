use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    plot_line(x0, y0, x1, y1, |x, y| canvas.set_pixel_signed(x, y));
}

/// Draw a dashed line with the given on/off pattern in pixels
pub fn draw_dashed_line(
    canvas: &mut BrailleCanvas,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    dash: (u8, u8),
) {
    let period = (dash.0 as u32 + dash.1 as u32).max(1);
    let mut step: u32 = 0;
    plot_line(x0, y0, x1, y1, |x, y| {
        if step % period < dash.0 as u32 {
            canvas.set_pixel_signed(x, y);
        }
        step += 1;
    });
}

/// Draw a thicker line (used for heavy stroke weights)
pub fn draw_thick_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    draw_line(canvas, x0, y0, x1, y1);
    draw_line(canvas, x0 + 1, y0, x1 + 1, y1);
    draw_line(canvas, x0, y0 + 1, x1, y1 + 1);
}

/// Draw a filled circle (for school location markers)
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.set_pixel_signed(cx + dx, cy + dy);
            }
        }
    }
}

/// Clip a segment to the canvas rectangle (with a small margin) using
/// Liang-Barsky. Returns the clipped endpoints, or `None` when the segment
/// lies entirely outside. Keeps rasterization cost bounded by the viewport
/// even for segments whose endpoints project far off screen.
pub fn clip_segment(
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    width: i32,
    height: i32,
) -> Option<((i32, i32), (i32, i32))> {
    const MARGIN: f64 = 2.0;
    let dx = (x1 - x0) as f64;
    let dy = (y1 - y0) as f64;

    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;

    // (p, q) per boundary: left, right, top, bottom
    let checks = [
        (-dx, x0 as f64 + MARGIN),
        (dx, width as f64 + MARGIN - x0 as f64),
        (-dy, y0 as f64 + MARGIN),
        (dy, height as f64 + MARGIN - y0 as f64),
    ];

    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                if r > t0 {
                    t0 = r;
                }
            } else {
                if r < t0 {
                    return None;
                }
                if r < t1 {
                    t1 = r;
                }
            }
        }
    }

    let clip = |t: f64| {
        (
            (x0 as f64 + t * dx).round() as i32,
            (y0 as f64 + t * dy).round() as i32,
        )
    };
    Some((clip(t0), clip(t1)))
}

/// Bresenham core, invoking `plot` for each pixel along the line
fn plot_line<F: FnMut(i32, i32)>(x0: i32, y0: i32, x1: i32, y1: i32, mut plot: F) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        plot(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_pixels(canvas: &BrailleCanvas) -> usize {
        canvas.cells().map(|(_, _, ch)| {
            (ch as u32 - 0x2800).count_ones() as usize
        }).sum()
    }

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        assert_eq!(set_pixels(&canvas), 10);
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(set_pixels(&canvas), 8);
    }

    #[test]
    fn test_dashed_line_has_gaps() {
        let mut solid = BrailleCanvas::new(10, 1);
        let mut dashed = BrailleCanvas::new(10, 1);
        draw_line(&mut solid, 0, 0, 19, 0);
        draw_dashed_line(&mut dashed, 0, 0, 19, 0, (5, 5));
        assert!(set_pixels(&dashed) < set_pixels(&solid));
        assert_eq!(set_pixels(&dashed), 10); // half of every 10-pixel period
    }

    #[test]
    fn test_clip_keeps_inside_segment() {
        let clipped = clip_segment(3, 4, 60, 30, 100, 60).unwrap();
        assert_eq!(clipped, ((3, 4), (60, 30)));
    }

    #[test]
    fn test_clip_crossing_segment_stays_in_bounds() {
        // Endpoints far off both sides, segment crosses the canvas
        let ((ax, ay), (bx, by)) = clip_segment(-500, 30, 700, 30, 100, 60).unwrap();
        assert!(ax >= -2 && bx <= 102);
        assert_eq!((ay, by), (30, 30));
        assert!(bx - ax >= 100);
    }

    #[test]
    fn test_clip_rejects_fully_outside_segment() {
        assert!(clip_segment(-500, -80, 700, -40, 100, 60).is_none());
        assert!(clip_segment(200, 0, 300, 60, 100, 60).is_none());
    }

    #[test]
    fn test_circle_covers_center() {
        let mut canvas = BrailleCanvas::new(3, 2);
        draw_circle(&mut canvas, 2, 3, 2);
        assert!(!canvas.is_empty());
    }
}
