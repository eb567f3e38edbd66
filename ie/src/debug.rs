//! Annotated copies of captures, written as diagnostics.

pub use image::RgbImage;
use image::Rgb;
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};

use crate::{BoxCount, BoxLayout, Image, Point, Scan};

const LINE: Rgb<u8> = Rgb([0, 0, 255]);
const TARGET: Rgb<u8> = Rgb([0, 255, 0]);
const MARK: Rgb<u8> = Rgb([255, 0, 0]);

fn rect(x: i32, y: i32, w: u32, h: u32) -> imageproc::rect::Rect {
    imageproc::rect::Rect::at(x, y).of_size(w.max(1), h.max(1))
}

/// Draw every segmented line of `scan` on a copy of the full capture: line
/// bounds across the region, each ink bounding box, and the selected target.
pub fn draw_scan(capture: Image, scan: &Scan, region_width: u32) -> RgbImage {
    let mut out = capture.to_rgb_image();
    let (ox, oy) = (scan.origin.x, scan.origin.y);
    let right = (ox + region_width as i32 - 1) as f32;

    for (i, c) in scan.candidates.iter().enumerate() {
        let top = (oy + c.line.top as i32) as f32;
        let bottom = (oy + c.line.bottom as i32) as f32;
        draw_line_segment_mut(&mut out, (ox as f32, top), (right, top), LINE);
        draw_line_segment_mut(&mut out, (ox as f32, bottom), (right, bottom), LINE);

        let color = if scan.selected == Some(i) { TARGET } else { LINE };
        draw_hollow_rect_mut(
            &mut out,
            rect(
                ox + c.extent.min_x as i32,
                oy + c.line.top as i32,
                c.width(),
                c.line.bottom - c.line.top + 1,
            ),
            color,
        );
    }

    if let Some(p) = scan.target.point() {
        draw_filled_circle_mut(&mut out, (p.x, p.y), 3, TARGET);
    }
    out
}

/// Draw the scan column limits and the counted boxes.
pub fn draw_boxes(capture: Image, layout: &BoxLayout, count: BoxCount) -> RgbImage {
    let mut out = capture.to_rgb_image();
    let x = layout.column as f32;
    let last = capture.height().saturating_sub(1) as f32;
    draw_line_segment_mut(&mut out, (x, 0.0), (x, count.top as f32), MARK);
    draw_line_segment_mut(&mut out, (x, last), (x, count.bottom as f32), MARK);

    for b in layout.boxes(count, capture.width()) {
        draw_hollow_rect_mut(&mut out, rect(b.x as i32, b.y as i32, b.w, b.h), MARK);
    }
    out
}

/// Mark a click point (capture coordinates) with a filled dot.
pub fn mark_click(capture: Image, at: Point) -> RgbImage {
    let mut out = capture.to_rgb_image();
    draw_filled_circle_mut(&mut out, (at.x, at.y), 10, MARK);
    out
}
