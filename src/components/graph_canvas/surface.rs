use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextBaseline {
	Top,
	Middle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle<'a> {
	pub font: &'a str,
	pub color: &'a str,
	pub baseline: TextBaseline,
}

/// Minimal 2D drawing API the renderer needs. Text is always horizontally centred.
pub trait Surface {
	fn clear(&mut self);
	/// Pushes `translate(tx, ty)` then `scale(k)`.
	fn push_transform(&mut self, tx: f64, ty: f64, k: f64);
	fn pop_transform(&mut self);
	fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: &str);
	fn stroke_circle(&mut self, x: f64, y: f64, radius: f64, width: f64, color: &str);
	fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: &str, dash: &[f64]);
	fn fill_polygon(&mut self, points: &[(f64, f64)], color: &str);
	fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &str);
	fn measure_text(&mut self, text: &str, font: &str) -> f64;
	fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle<'_>);
}

/// [`Surface`] backed by a browser canvas.
pub struct CanvasSurface<'a> {
	ctx: &'a CanvasRenderingContext2d,
	width: f64,
	height: f64,
}

impl<'a> CanvasSurface<'a> {
	pub fn new(ctx: &'a CanvasRenderingContext2d, width: f64, height: f64) -> Self {
		Self { ctx, width, height }
	}

	fn circle_path(&self, x: f64, y: f64, radius: f64) {
		self.ctx.begin_path();
		let _ = self.ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	}

	fn set_dash(&self, dash: &[f64]) {
		let segments = js_sys::Array::new();
		for &segment in dash {
			segments.push(&JsValue::from_f64(segment));
		}
		let _ = self.ctx.set_line_dash(&segments);
	}
}

impl Surface for CanvasSurface<'_> {
	fn clear(&mut self) {
		self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
	}

	fn push_transform(&mut self, tx: f64, ty: f64, k: f64) {
		self.ctx.save();
		let _ = self.ctx.translate(tx, ty);
		let _ = self.ctx.scale(k, k);
	}

	fn pop_transform(&mut self) {
		self.ctx.restore();
	}

	fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: &str) {
		self.circle_path(x, y, radius);
		self.ctx.set_fill_style_str(color);
		self.ctx.fill();
	}

	fn stroke_circle(&mut self, x: f64, y: f64, radius: f64, width: f64, color: &str) {
		self.circle_path(x, y, radius);
		self.ctx.set_stroke_style_str(color);
		self.ctx.set_line_width(width);
		self.ctx.stroke();
	}

	fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: &str, dash: &[f64]) {
		self.set_dash(dash);
		self.ctx.begin_path();
		self.ctx.move_to(from.0, from.1);
		self.ctx.line_to(to.0, to.1);
		self.ctx.set_stroke_style_str(color);
		self.ctx.set_line_width(width);
		self.ctx.stroke();
		if !dash.is_empty() {
			self.set_dash(&[]);
		}
	}

	fn fill_polygon(&mut self, points: &[(f64, f64)], color: &str) {
		let Some((&(x0, y0), rest)) = points.split_first() else {
			return;
		};
		self.ctx.begin_path();
		self.ctx.move_to(x0, y0);
		for &(x, y) in rest {
			self.ctx.line_to(x, y);
		}
		self.ctx.close_path();
		self.ctx.set_fill_style_str(color);
		self.ctx.fill();
	}

	fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &str) {
		self.ctx.set_fill_style_str(color);
		self.ctx.fill_rect(x, y, width, height);
	}

	fn measure_text(&mut self, text: &str, font: &str) -> f64 {
		self.ctx.set_font(font);
		self.ctx
			.measure_text(text)
			.map(|metrics| metrics.width())
			.unwrap_or(0.0)
	}

	fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle<'_>) {
		self.ctx.set_font(style.font);
		self.ctx.set_fill_style_str(style.color);
		self.ctx.set_text_align("center");
		self.ctx.set_text_baseline(match style.baseline {
			TextBaseline::Top => "top",
			TextBaseline::Middle => "middle",
		});
		let _ = self.ctx.fill_text(text, x, y);
	}
}
