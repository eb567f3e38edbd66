//! Page-by-page report export.
//!
//! Each iteration makes sure a time range is selected, then looks at the
//! "next page" and "print" buttons. An enabled next page is clicked and
//! counted as a report; an enabled print button is clicked, counted, and ends
//! the run. Iterations where neither button is usable count as attempts, and
//! too many attempts in a row fail the run.

use anyhow::Result;

use ie::screen::report::{Controls, TimeRange};
use ie::Point;

use crate::input::Pointer;
use crate::stop::Stop;

/// Read-only view of the report screen.
pub trait Observer {
	fn time_range(&mut self) -> Result<TimeRange>;
	fn controls(&mut self) -> Result<Controls>;
	/// Desktop position of the display the last observation was taken from.
	fn origin(&self) -> Point;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
	Scanning,
	/// A page was just turned.
	Advancing,
	Terminal,
	Failed,
}

/// Counters of one navigation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
	pub state: NavState,
	/// Consecutive iterations without a page turn.
	pub attempts: u32,
	pub reports_generated: u32,
	pub iterations: u32,
}

impl Default for Session {
	fn default() -> Self {
		Self {
			state: NavState::Scanning,
			attempts: 0,
			reports_generated: 0,
			iterations: 0,
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum NavError {
	#[error(
		"no usable control after {attempts} attempts ({reports_generated} reports generated); last seen: {}",
		describe(.last)
	)]
	AttemptsExhausted {
		attempts: u32,
		reports_generated: u32,
		last: Option<Box<Controls>>,
	},
	#[error("stopped by operator after {reports_generated} reports")]
	Aborted { reports_generated: u32 },
	#[error(transparent)]
	Io(#[from] anyhow::Error),
}

fn describe(last: &Option<Box<Controls>>) -> String {
	let sampled = |c: Option<ie::Color>| c.map_or_else(|| "nothing".to_string(), |c| c.to_string());
	match last {
		Some(c) => format!(
			"next page {} sampled {} at {}, print {} sampled {} at {}",
			c.next_page.state,
			sampled(c.next_page.sampled),
			c.next_page.at,
			c.print.state,
			sampled(c.print.sampled),
			c.print.at,
		),
		None => "no observation".to_string(),
	}
}

pub struct Navigator<O, P> {
	observer: O,
	pointer: P,
	max_attempts: u32,
	stop: Stop,
	session: Session,
	last: Option<Box<Controls>>,
}

impl<O: Observer, P: Pointer> Navigator<O, P> {
	pub fn new(observer: O, pointer: P, max_attempts: u32, stop: Stop) -> Self {
		Self {
			observer,
			pointer,
			max_attempts,
			stop,
			session: Session::default(),
			last: None,
		}
	}

	pub fn session(&self) -> Session {
		self.session
	}

	#[cfg(test)]
	pub fn into_parts(self) -> (O, P) {
		(self.observer, self.pointer)
	}

	fn check_stop(&self) -> Result<(), NavError> {
		if self.stop.is_raised() {
			return Err(NavError::Aborted {
				reports_generated: self.session.reports_generated,
			});
		}
		Ok(())
	}

	/// Click at capture coordinates.
	fn click(&mut self, at: Point, what: &str) -> Result<(), NavError> {
		self.check_stop()?;
		let abs = at.offset(self.observer.origin());
		tracing::info!(%at, %abs, what, "clicking");
		self.pointer.click(abs)?;
		Ok(())
	}

	fn select_time_range(&mut self) -> Result<(), NavError> {
		let range = self.observer.time_range()?;
		let TimeRange::Unset { scan, fallback } = &range else {
			tracing::debug!(?range, "time range already selected");
			return Ok(());
		};

		match scan.target.point() {
			Some(at) => {
				if scan.is_ambiguous() {
					tracing::warn!(
						matches = scan.matches(),
						widths = ?scan.widths(),
						accepted = ?scan.accepted,
						%at,
						"several lines have an accepted width; tie-break picked one"
					);
				}
				self.click(at, "time range")
			}
			None => {
				tracing::info!(
					widths = ?scan.widths(),
					accepted = ?scan.accepted,
					%fallback,
					"no line has an accepted width; clicking fallback"
				);
				self.click(*fallback, "time range fallback")
			}
		}
	}

	/// One iteration: select a time range if needed, then act on the buttons.
	///
	/// Returns the state the iteration ended in: `Advancing` after a page
	/// turn, `Terminal` after print, `Scanning` when neither button was
	/// usable. Once the attempt bound is reached the session is `Failed` and
	/// an error is returned.
	pub fn step(&mut self) -> Result<NavState, NavError> {
		if self.session.attempts >= self.max_attempts {
			self.session.state = NavState::Failed;
			let err = NavError::AttemptsExhausted {
				attempts: self.session.attempts,
				reports_generated: self.session.reports_generated,
				last: self.last.take(),
			};
			tracing::error!(error = %err, "report navigation failed");
			return Err(err);
		}

		self.check_stop()?;
		self.session.iterations += 1;
		self.session.state = NavState::Scanning;
		tracing::debug!(
			iteration = self.session.iterations,
			attempt = self.session.attempts + 1,
			reports = self.session.reports_generated,
			"scanning report page"
		);

		self.select_time_range()?;

		let controls = self.observer.controls()?;
		if controls.next_page.state.is_enabled() {
			self.click(controls.next_page.at, "next page")?;
			self.session.reports_generated += 1;
			self.session.attempts = 0;
			self.session.state = NavState::Advancing;
			tracing::info!(
				reports = self.session.reports_generated,
				state = %controls.next_page.state,
				"page advanced"
			);
			return Ok(NavState::Advancing);
		}

		if controls.print.state.is_enabled() {
			self.click(controls.print.at, "print")?;
			self.session.reports_generated += 1;
			self.session.state = NavState::Terminal;
			tracing::info!(
				reports = self.session.reports_generated,
				iterations = self.session.iterations,
				"print reached"
			);
			return Ok(NavState::Terminal);
		}

		self.session.attempts += 1;
		tracing::debug!(
			attempts = self.session.attempts,
			next_page = %controls.next_page.state,
			next_page_sampled = ?controls.next_page.sampled,
			print = %controls.print.state,
			print_sampled = ?controls.print.sampled,
			"no usable control"
		);
		self.last = Some(Box::new(controls));
		Ok(NavState::Scanning)
	}

	/// Run until the print button is reached.
	///
	/// Returns the number of reports generated; the export stage names
	/// `reports + 1` files.
	pub fn run(&mut self) -> Result<u32, NavError> {
		while self.step()? != NavState::Terminal {}
		Ok(self.session.reports_generated)
	}
}

#[cfg(test)]
mod tests {
	use std::collections::VecDeque;

	use ie::{
		Color, ControlReading, ControlState, OwnedImage, Rect, ScanDirection, TargetMatcher,
	};

	use super::*;

	const NEXT: Point = Point::new(1236, 1003);
	const PRINT: Point = Point::new(1302, 1003);

	#[derive(Debug, Clone, Copy)]
	enum Page {
		Disabled,
		Unknown,
		Next,
		Print,
	}

	fn controls(page: Page) -> Controls {
		let reading = |at, state| ControlReading {
			at,
			sampled: None,
			state,
		};
		let disabled = || ControlState::Disabled("disabled".into());
		let enabled = || ControlState::Enabled("enabled-gray".into());
		match page {
			Page::Disabled => Controls {
				next_page: reading(NEXT, disabled()),
				print: reading(PRINT, disabled()),
			},
			Page::Unknown => Controls {
				next_page: reading(NEXT, ControlState::Unknown),
				print: reading(PRINT, ControlState::Unknown),
			},
			Page::Next => Controls {
				next_page: reading(NEXT, enabled()),
				print: reading(PRINT, disabled()),
			},
			Page::Print => Controls {
				next_page: reading(NEXT, disabled()),
				print: reading(PRINT, enabled()),
			},
		}
	}

	struct Scripted {
		pages: VecDeque<Page>,
		ranges: VecDeque<TimeRange>,
		origin: Point,
	}

	impl Scripted {
		fn new(pages: &[Page]) -> Self {
			Self {
				pages: pages.iter().copied().collect(),
				ranges: VecDeque::new(),
				origin: Point::default(),
			}
		}
	}

	impl Observer for Scripted {
		fn time_range(&mut self) -> Result<TimeRange> {
			Ok(self
				.ranges
				.pop_front()
				.unwrap_or(TimeRange::Indicated { row: 400 }))
		}

		fn controls(&mut self) -> Result<Controls> {
			Ok(controls(self.pages.pop_front().unwrap_or(Page::Disabled)))
		}

		fn origin(&self) -> Point {
			self.origin
		}
	}

	#[derive(Default)]
	struct Recorder(Vec<Point>);

	impl Pointer for Recorder {
		fn click(&mut self, at: Point) -> Result<()> {
			self.0.push(at);
			Ok(())
		}
	}

	fn unset_range(bar_width: Option<u32>) -> TimeRange {
		let mut img = OwnedImage::filled(200, 100, Color::WHITE);
		if let Some(w) = bar_width {
			img.fill_rect(Rect::new(20, 40, w, 8), Color::BLACK);
		}
		let scan = TargetMatcher::default().scan(img.as_image(), ScanDirection::TopDown);
		TimeRange::Unset {
			scan,
			fallback: Rect::new(0, 0, 200, 100).bottom_center(),
		}
	}

	#[test]
	fn reaches_print_after_one_page_turn() {
		use Page::*;
		let mut nav = Navigator::new(
			Scripted::new(&[Disabled, Disabled, Next, Print]),
			Recorder::default(),
			10,
			Stop::default(),
		);

		assert_eq!(nav.run().unwrap(), 2);
		let session = nav.session();
		assert_eq!(session.state, NavState::Terminal);
		assert_eq!(session.iterations, 4);
		assert_eq!(session.reports_generated, 2);

		let (_, pointer) = nav.into_parts();
		assert_eq!(pointer.0, vec![NEXT, PRINT]);
	}

	#[test]
	fn page_turn_is_reported_as_advancing() {
		use Page::*;
		let mut nav = Navigator::new(
			Scripted::new(&[Disabled, Next, Print]),
			Recorder::default(),
			10,
			Stop::default(),
		);

		assert_eq!(nav.step().unwrap(), NavState::Scanning);
		assert_eq!(nav.session().attempts, 1);
		assert_eq!(nav.step().unwrap(), NavState::Advancing);
		assert_eq!(nav.session().state, NavState::Advancing);
		assert_eq!(nav.session().attempts, 0);
		assert_eq!(nav.step().unwrap(), NavState::Terminal);
		assert_eq!(nav.session().reports_generated, 2);
	}

	#[test]
	fn exhausting_attempts_fails() {
		let mut nav = Navigator::new(
			Scripted::new(&[Page::Disabled; 15]),
			Recorder::default(),
			10,
			Stop::default(),
		);

		let err = nav.run().unwrap_err();
		let NavError::AttemptsExhausted {
			attempts,
			reports_generated,
			last,
		} = &err
		else {
			panic!("unexpected error: {err}");
		};
		assert_eq!((*attempts, *reports_generated), (10, 0));
		assert!(last.is_some());
		assert!(err.to_string().contains("next page disabled (disabled)"));

		let session = nav.session();
		assert_eq!(session.state, NavState::Failed);
		assert_eq!(session.iterations, 10);
		assert!(nav.into_parts().1 .0.is_empty());
	}

	#[test]
	fn page_turn_resets_attempts() {
		let mut script = vec![Page::Disabled; 9];
		script.push(Page::Next);
		script.extend([Page::Unknown; 9]);
		script.push(Page::Print);

		let mut nav = Navigator::new(Scripted::new(&script), Recorder::default(), 10, Stop::default());
		assert_eq!(nav.run().unwrap(), 2);
		assert_eq!(nav.session().iterations, 20);
	}

	#[test]
	fn classifier_miss_counts_as_attempt() {
		let mut nav = Navigator::new(
			Scripted::new(&[Page::Unknown, Page::Unknown, Page::Unknown]),
			Recorder::default(),
			3,
			Stop::default(),
		);
		assert!(matches!(
			nav.run(),
			Err(NavError::AttemptsExhausted { attempts: 3, .. })
		));
	}

	#[test]
	fn unset_time_range_is_clicked_before_controls() {
		let mut observer = Scripted::new(&[Page::Disabled, Page::Print]);
		observer.ranges.push_back(unset_range(Some(68)));
		observer.ranges.push_back(unset_range(None));

		let mut nav = Navigator::new(observer, Recorder::default(), 10, Stop::default());
		assert_eq!(nav.run().unwrap(), 1);

		let (_, pointer) = nav.into_parts();
		assert_eq!(
			pointer.0,
			vec![Point::new(53, 43), Point::new(100, 99), PRINT]
		);
	}

	#[test]
	fn clicks_are_translated_to_desktop() {
		let mut observer = Scripted::new(&[Page::Print]);
		observer.origin = Point::new(-1920, 0);

		let mut nav = Navigator::new(observer, Recorder::default(), 10, Stop::default());
		nav.run().unwrap();
		assert_eq!(nav.into_parts().1 .0, vec![Point::new(1302 - 1920, 1003)]);
	}

	#[test]
	fn stop_aborts_without_clicking() {
		let stop = Stop::default();
		stop.raise();
		let mut nav = Navigator::new(Scripted::new(&[Page::Print]), Recorder::default(), 10, stop);

		assert!(matches!(
			nav.run(),
			Err(NavError::Aborted { reports_generated: 0 })
		));
		assert!(nav.into_parts().1 .0.is_empty());
	}
}
