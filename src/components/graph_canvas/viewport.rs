//! Pan/zoom mapping between graph space and screen space.

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 5.0;
const ZOOM_IN_FACTOR: f64 = 1.1;
const ZOOM_OUT_FACTOR: f64 = 0.9;

/// `screen = graph * scale + translate`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub translate_x: f64,
	pub translate_y: f64,
	pub scale: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			translate_x: 0.0,
			translate_y: 0.0,
			scale: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn screen_to_graph(&self, x: f64, y: f64) -> (f64, f64) {
		(
			(x - self.translate_x) / self.scale,
			(y - self.translate_y) / self.scale,
		)
	}

	pub fn graph_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
		(
			x * self.scale + self.translate_x,
			y * self.scale + self.translate_y,
		)
	}

	/// Scales by one wheel notch, keeping the graph point under the pointer fixed.
	pub fn apply_zoom(&mut self, pointer_x: f64, pointer_y: f64, zoom_in: bool) {
		if !pointer_x.is_finite() || !pointer_y.is_finite() {
			return;
		}
		let (gx, gy) = self.screen_to_graph(pointer_x, pointer_y);
		let factor = if zoom_in { ZOOM_IN_FACTOR } else { ZOOM_OUT_FACTOR };
		self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
		self.translate_x = pointer_x - gx * self.scale;
		self.translate_y = pointer_y - gy * self.scale;
	}

	/// Screen-space deltas.
	pub fn pan(&mut self, dx: f64, dy: f64) {
		if !dx.is_finite() || !dy.is_finite() {
			return;
		}
		self.translate_x += dx;
		self.translate_y += dy;
	}

	/// Puts graph point `(x, y)` at the centre of a `width`×`height` surface.
	pub fn center_on(&mut self, x: f64, y: f64, width: f64, height: f64) {
		self.translate_x = width / 2.0 - x * self.scale;
		self.translate_y = height / 2.0 - y * self.scale;
	}
}
