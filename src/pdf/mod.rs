// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A `plotters` drawing backend producing a single-page vector PDF.
//!
//! One backend unit is one PDF point. Drawing operations are accumulated in a
//! `pdf_writer` content stream and the document is serialized on
//! [`present`](DrawingBackend::present). The output carries no timestamps, so
//! identical drawing produces identical bytes.

pub mod font;

use pdf_writer::types::{LineCapStyle, LineJoinStyle};
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str, TextStr};
use plotters_backend::text_anchor::{HPos, VPos};
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
    FontStyle, FontTransform,
};
use thiserror::Error;

use std::path::{Path, PathBuf};

/// Control point distance for approximating a quarter circle with a cubic
/// Bézier curve.
const KAPPA: f64 = 0.552_284_749_831;

const REGULAR: Name<'static> = Name(b"F1");
const BOLD: Name<'static> = Name(b"F2");

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),
    #[error("document has already been written")]
    AlreadyPresented,
}

enum Target<'a> {
    File(PathBuf),
    Buffer(&'a mut Vec<u8>),
}

/// Document metadata written to the info dictionary.
#[derive(Clone, Debug, Default)]
struct Info {
    title: Option<String>,
    producer: Option<String>,
}

pub struct PdfBackend<'a> {
    target: Target<'a>,
    size: (u32, u32),
    info: Info,
    // taken when the document is written
    content: Option<Content>,
}

/// Rounds to hundredths of a point so the stream stays short and stable.
fn round(v: f64) -> f32 {
    ((v * 100.0).round() / 100.0) as f32
}

/// Composites `color` over the white page.
fn rgb(color: BackendColor) -> (f32, f32, f32) {
    let alpha = color.alpha.max(0.0).min(1.0);
    let channel = |c: u8| round((f64::from(c) * alpha + 255.0 * (1.0 - alpha)) / 255.0);
    let (r, g, b) = color.rgb;
    (channel(r), channel(g), channel(b))
}

impl<'a> PdfBackend<'a> {
    /// Writes the document to `path` when presented.
    pub fn new<P: AsRef<Path>>(path: P, size: (u32, u32)) -> Self {
        Self::with_target(Target::File(path.as_ref().to_path_buf()), size)
    }

    /// Writes the document into `buffer` when presented, replacing its contents.
    pub fn with_buffer(buffer: &'a mut Vec<u8>, size: (u32, u32)) -> Self {
        Self::with_target(Target::Buffer(buffer), size)
    }

    fn with_target(target: Target<'a>, size: (u32, u32)) -> Self {
        let mut content = Content::new();
        content
            .set_line_cap(LineCapStyle::RoundCap)
            .set_line_join(LineJoinStyle::RoundJoin);
        Self {
            target,
            size,
            info: Info::default(),
            content: Some(content),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.info.title = Some(title.into());
        self
    }

    pub fn producer(mut self, producer: impl Into<String>) -> Self {
        self.info.producer = Some(producer.into());
        self
    }

    fn flip(&self, (x, y): BackendCoord) -> (f32, f32) {
        (x as f32, (i64::from(self.size.1) - i64::from(y)) as f32)
    }

    fn content(&mut self) -> Result<&mut Content, DrawingErrorKind<PdfError>> {
        self.content
            .as_mut()
            .ok_or(DrawingErrorKind::DrawingError(PdfError::AlreadyPresented))
    }

    /// Sets the stroke colour and width, or returns `None` when `style` is
    /// fully transparent.
    fn stroke<S: BackendStyle>(
        &mut self,
        style: &S,
    ) -> Result<Option<&mut Content>, DrawingErrorKind<PdfError>> {
        let color = style.color();
        let width = style.stroke_width().max(1) as f32;
        let content = self.content()?;
        if color.alpha == 0.0 {
            return Ok(None);
        }
        let (r, g, b) = rgb(color);
        content.set_stroke_rgb(r, g, b).set_line_width(width);
        Ok(Some(content))
    }

    fn fill(
        &mut self,
        color: BackendColor,
    ) -> Result<Option<&mut Content>, DrawingErrorKind<PdfError>> {
        let content = self.content()?;
        if color.alpha == 0.0 {
            return Ok(None);
        }
        let (r, g, b) = rgb(color);
        content.set_fill_rgb(r, g, b);
        Ok(Some(content))
    }

    fn paint<S: BackendStyle>(
        &mut self,
        style: &S,
        fill: bool,
    ) -> Result<Option<&mut Content>, DrawingErrorKind<PdfError>> {
        if fill {
            self.fill(style.color())
        } else {
            self.stroke(style)
        }
    }

    fn document(&self, content: Vec<u8>) -> Vec<u8> {
        let catalog = Ref::new(1);
        let pages = Ref::new(2);
        let page = Ref::new(3);
        let regular = Ref::new(4);
        let bold = Ref::new(5);
        let contents = Ref::new(6);
        let info = Ref::new(7);

        let mut pdf = Pdf::new();
        pdf.catalog(catalog).pages(pages);
        pdf.pages(pages).kids([page]).count(1);
        {
            let mut writer = pdf.page(page);
            writer
                .parent(pages)
                .media_box(Rect::new(0.0, 0.0, self.size.0 as f32, self.size.1 as f32))
                .contents(contents);
            writer
                .resources()
                .fonts()
                .pair(REGULAR, regular)
                .pair(BOLD, bold);
        }
        pdf.type1_font(regular)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(bold)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.stream(contents, &content);

        if self.info.title.is_some() || self.info.producer.is_some() {
            let mut writer = pdf.document_info(info);
            if let Some(title) = &self.info.title {
                writer.title(TextStr(title));
            }
            if let Some(producer) = &self.info.producer {
                writer.producer(TextStr(producer));
            }
        }

        pdf.finish()
    }
}

impl<'a> DrawingBackend for PdfBackend<'a> {
    type ErrorType = PdfError;

    fn get_size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<PdfError>> {
        self.content().map(|_| ())
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<PdfError>> {
        let content = match self.content.take() {
            Some(content) => content,
            None => return Ok(()),
        };
        let document = self.document(content.finish());
        match &mut self.target {
            Target::File(path) => std::fs::write(path, &document)
                .map_err(|e| DrawingErrorKind::DrawingError(PdfError::Io(e)))?,
            Target::Buffer(buffer) => {
                buffer.clear();
                buffer.extend_from_slice(&document);
            }
        }
        Ok(())
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<PdfError>> {
        let (x, y) = self.flip((point.0, point.1 + 1));
        if let Some(content) = self.fill(color)? {
            content.rect(x, y, 1.0, 1.0).fill_nonzero();
        }
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<PdfError>> {
        let (from, to) = (self.flip(from), self.flip(to));
        if let Some(content) = self.stroke(style)? {
            content.move_to(from.0, from.1).line_to(to.0, to.1).stroke();
        }
        Ok(())
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<PdfError>> {
        let (x, y) = self.flip((upper_left.0, bottom_right.1));
        let width = (bottom_right.0 - upper_left.0) as f32;
        let height = (bottom_right.1 - upper_left.1) as f32;
        if let Some(content) = self.paint(style, fill)? {
            content.rect(x, y, width, height);
            if fill {
                content.fill_nonzero();
            } else {
                content.stroke();
            }
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<PdfError>> {
        let points: Vec<_> = path.into_iter().map(|p| self.flip(p)).collect();
        if points.len() < 2 {
            return self.content().map(|_| ());
        }
        if let Some(content) = self.stroke(style)? {
            content.move_to(points[0].0, points[0].1);
            for (x, y) in &points[1..] {
                content.line_to(*x, *y);
            }
            content.stroke();
        }
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<PdfError>> {
        let r = f64::from(radius);
        let k = r * KAPPA;
        let cx = f64::from(center.0);
        let cy = f64::from(self.size.1) - f64::from(center.1);
        let p = |x: f64, y: f64| (round(cx + x), round(cy + y));

        if let Some(content) = self.paint(style, fill)? {
            let start = p(r, 0.0);
            content.move_to(start.0, start.1);
            let quarters = [
                [(r, k), (k, r), (0.0, r)],
                [(-k, r), (-r, k), (-r, 0.0)],
                [(-r, -k), (-k, -r), (0.0, -r)],
                [(k, -r), (r, -k), (r, 0.0)],
            ];
            for [c1, c2, end] in &quarters {
                let (c1, c2, end) = (p(c1.0, c1.1), p(c2.0, c2.1), p(end.0, end.1));
                content.cubic_to(c1.0, c1.1, c2.0, c2.1, end.0, end.1);
            }
            content.close_path();
            if fill {
                content.fill_nonzero();
            } else {
                content.stroke();
            }
        }
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<PdfError>> {
        let points: Vec<_> = vert.into_iter().map(|p| self.flip(p)).collect();
        if points.len() < 3 {
            return self.content().map(|_| ());
        }
        if let Some(content) = self.fill(style.color())? {
            content.move_to(points[0].0, points[0].1);
            for (x, y) in &points[1..] {
                content.line_to(*x, *y);
            }
            content.close_path().fill_nonzero();
        }
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<PdfError>> {
        if text.is_empty() {
            return self.content().map(|_| ());
        }

        let size = style.size();
        let width = font::text_width(text, size);
        let anchor = style.anchor();
        let along = match anchor.h_pos {
            HPos::Left => 0.0,
            HPos::Center => -width / 2.0,
            HPos::Right => -width,
        };
        let up = match anchor.v_pos {
            VPos::Top => -font::ASCENT * size,
            VPos::Center => -(font::ASCENT - font::DESCENT) / 2.0 * size,
            VPos::Bottom => font::DESCENT * size,
        };

        // baseline direction on the page, which has y pointing up
        let (cos, sin) = match style.transform() {
            FontTransform::Rotate90 => (0.0, -1.0),
            FontTransform::Rotate180 => (-1.0, 0.0),
            FontTransform::Rotate270 => (0.0, 1.0),
            _ => (1.0, 0.0),
        };
        let x = f64::from(pos.0) + along * cos - up * sin;
        let y = f64::from(self.size.1) - f64::from(pos.1) + along * sin + up * cos;

        let name = match style.style() {
            FontStyle::Bold => BOLD,
            _ => REGULAR,
        };
        let bytes = font::winansi(text);

        if let Some(content) = self.fill(style.color())? {
            content
                .begin_text()
                .set_font(name, round(size))
                .set_text_matrix([
                    round(cos),
                    round(sin),
                    round(-sin),
                    round(cos),
                    round(x),
                    round(y),
                ])
                .show(Str(&bytes))
                .end_text();
        }
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<PdfError>> {
        let size = style.size();
        let width = font::text_width(text, size).ceil() as u32;
        let height = ((font::ASCENT + font::DESCENT) * size).ceil() as u32;
        Ok((width, height))
    }
}
