//! Synthetic input. The core only ever needs "move and click"; the workflow
//! also types text into fields.

use std::time::Duration;

use anyhow::{anyhow, Result};
use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};

use ie::Point;

pub trait Pointer {
	/// Move to absolute desktop coordinates and issue a primary click.
	fn click(&mut self, at: Point) -> Result<()>;
}

pub trait Input: Pointer {
	fn type_text(&mut self, text: &str) -> Result<()>;
	fn press_enter(&mut self) -> Result<()>;
}

impl<P: Pointer + ?Sized> Pointer for &mut P {
	fn click(&mut self, at: Point) -> Result<()> {
		(**self).click(at)
	}
}

impl<I: Input + ?Sized> Input for &mut I {
	fn type_text(&mut self, text: &str) -> Result<()> {
		(**self).type_text(text)
	}

	fn press_enter(&mut self) -> Result<()> {
		(**self).press_enter()
	}
}

pub struct Desktop {
	enigo: Enigo,
	/// Pause between moving the pointer and clicking.
	click_delay: Duration,
}

impl Desktop {
	pub fn new(click_delay: Duration) -> Result<Self> {
		let enigo = Enigo::new(&Settings::default())
			.map_err(|e| anyhow!("failed to connect to input backend: {e}"))?;
		Ok(Self { enigo, click_delay })
	}
}

impl Pointer for Desktop {
	fn click(&mut self, at: Point) -> Result<()> {
		self.enigo
			.move_mouse(at.x, at.y, Coordinate::Abs)
			.map_err(|e| anyhow!("failed to move pointer to {at}: {e}"))?;
		std::thread::sleep(self.click_delay);
		self.enigo
			.button(Button::Left, Direction::Click)
			.map_err(|e| anyhow!("failed to click at {at}: {e}"))?;
		tracing::debug!(%at, "clicked");
		Ok(())
	}
}

impl Input for Desktop {
	fn type_text(&mut self, text: &str) -> Result<()> {
		self.enigo
			.text(text)
			.map_err(|e| anyhow!("failed to type text: {e}"))
	}

	fn press_enter(&mut self) -> Result<()> {
		self.enigo
			.key(Key::Return, Direction::Click)
			.map_err(|e| anyhow!("failed to press enter: {e}"))
	}
}
