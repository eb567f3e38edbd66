//! Offline calibration aids: run one stage of the pipeline on a saved
//! screenshot and print what it saw.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use ie::screen::report::TimeRange;
use ie::{BoxLayout, ControlReading, Ie, Image, OwnedImage, Rect, Scan, TargetMatch, TieBreak};

/// Parse `x,y,w,h`.
pub fn parse_rect(s: &str) -> Result<Rect, String> {
	let parts = s
		.split(',')
		.map(|p| p.trim().parse::<u32>())
		.collect::<Result<Vec<_>, _>>()
		.map_err(|e| format!("invalid region {s:?}: {e}"))?;
	match parts[..] {
		[x, y, w, h] => Ok(Rect::new(x, y, w, h)),
		_ => Err(format!("region {s:?} must be x,y,w,h")),
	}
}

pub fn describe_scan(scan: &Scan, tie_break: TieBreak) -> String {
	let mut out = String::new();
	for (i, c) in scan.candidates.iter().enumerate() {
		let mark = if scan.selected == Some(i) {
			'*'
		} else if scan.accepted.contains(&c.width()) {
			'+'
		} else {
			' '
		};
		let _ = writeln!(
			out,
			"{mark} rows {:>4}..{:<4} width {:>4} center {}",
			c.line.top,
			c.line.bottom,
			c.width(),
			c.center().offset(scan.origin)
		);
	}
	let _ = match scan.target {
		TargetMatch::Found(p) => writeln!(
			out,
			"target {p} ({} of {} lines accepted, tie-break {:?})",
			scan.matches(),
			scan.candidates.len(),
			tie_break
		),
		TargetMatch::NotFound => writeln!(
			out,
			"no target: none of {} lines has a width in {:?}",
			scan.candidates.len(),
			scan.accepted
		),
	};
	out
}

pub fn locate(ie: &Ie, path: &Path, region: Option<Rect>, out: Option<&Path>) -> Result<()> {
	let img = OwnedImage::open(path)?;
	let region = region.unwrap_or(Rect::new(0, 0, img.width(), img.height()));
	let scan = ie.locate(img.as_image(), region);
	print!("{}", describe_scan(&scan, ie.calibration().time_range.matcher.tie_break));

	if let Some(out) = out {
		ie::debug::draw_scan(img.as_image(), &scan, region.w)
			.save(out)
			.with_context(|| format!("write {:?}", out))?;
	}
	Ok(())
}

pub fn count_boxes(path: &Path, layout: BoxLayout, out: Option<&Path>) -> Result<()> {
	let img = OwnedImage::open(path)?;
	let Some(count) = layout.count(img.as_image()) else {
		println!("no dark pixel in column {}", layout.column);
		return Ok(());
	};
	println!("{} boxes between rows {} and {}", count.count, count.top, count.bottom);

	if let Some(out) = out {
		ie::debug::draw_boxes(img.as_image(), &layout, count)
			.save(out)
			.with_context(|| format!("write {:?}", out))?;
	}
	Ok(())
}

fn describe_control(out: &mut String, name: &str, reading: &ControlReading, expected: String) {
	let sampled = reading.sampled.map_or_else(|| "nothing".to_string(), |c| c.to_string());
	let _ = writeln!(
		out,
		"{name:<10} at {} sampled {sampled}: {} (palette {expected})",
		reading.at, reading.state
	);
}

/// Every calibrated probe evaluated on one capture.
pub fn describe_probes(ie: &Ie, image: Image) -> String {
	let cal = ie.calibration();
	let mut out = String::new();

	match ie.report_time_range(image) {
		TimeRange::Indicated { row } => {
			let _ = writeln!(out, "time range selected (highlight at row {row})");
		}
		TimeRange::Unset { scan, fallback } => {
			let _ = writeln!(out, "time range not selected; line search:");
			out.push_str(&describe_scan(&scan, cal.time_range.matcher.tie_break));
			let _ = writeln!(out, "fallback {fallback}");
		}
	}

	let controls = ie.report_controls(image);
	describe_control(&mut out, "next page", &controls.next_page, cal.next_page.expected());
	describe_control(&mut out, "print", &controls.print, cal.print.expected());

	let _ = writeln!(
		out,
		"ready      at {} expects {}: {}",
		cal.ready.at,
		cal.ready.color,
		if ie.report_is_ready(image) { "yes" } else { "no" }
	);
	out
}
