// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use plotters::element::{Drawable, PointCollection};
use plotters::style::ShapeStyle;
use plotters_backend::{BackendCoord, DrawingBackend, DrawingErrorKind};

/// Point marker drawn at every measurement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    Circle,
    Square,
    Triangle,
    Diamond,
}

impl Marker {
    /// Vertices of the polygonal markers, relative to the data point. Circles
    /// have no outline and are drawn natively.
    pub fn outline(self, size: i32) -> Vec<BackendCoord> {
        match self {
            Marker::Circle => Vec::new(),
            Marker::Square => vec![(-size, -size), (size, -size), (size, size), (-size, size)],
            Marker::Triangle => vec![(0, -size - 1), (size + 1, size), (-size - 1, size)],
            Marker::Diamond => vec![(0, -size - 1), (size + 1, 0), (0, size + 1), (-size - 1, 0)],
        }
    }

    pub fn at<C>(self, at: C, size: u32, style: ShapeStyle) -> MarkerElement<C> {
        MarkerElement {
            at,
            marker: self,
            size,
            style,
            stem: None,
        }
    }
}

/// A marker glyph anchored at one coordinate. With a stem it doubles as the
/// legend entry: a short line segment with the marker on top.
pub struct MarkerElement<C> {
    at: C,
    marker: Marker,
    size: u32,
    style: ShapeStyle,
    stem: Option<(i32, u32)>,
}

impl<C> MarkerElement<C> {
    /// Draws a horizontal line of half-length `reach` and width `width`
    /// through the marker.
    pub fn with_stem(mut self, reach: i32, width: u32) -> Self {
        self.stem = Some((reach, width));
        self
    }
}

impl<'a, C> PointCollection<'a, C> for &'a MarkerElement<C> {
    type Point = &'a C;
    type IntoIter = std::iter::Once<&'a C>;

    fn point_iter(self) -> Self::IntoIter {
        std::iter::once(&self.at)
    }
}

impl<C, DB: DrawingBackend> Drawable<DB> for MarkerElement<C> {
    fn draw<I: Iterator<Item = BackendCoord>>(
        &self,
        mut points: I,
        backend: &mut DB,
        _: (u32, u32),
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        let (x, y) = match points.next() {
            Some(point) => point,
            None => return Ok(()),
        };

        if let Some((reach, width)) = self.stem {
            let line = ShapeStyle {
                color: self.style.color,
                filled: false,
                stroke_width: width,
            };
            backend.draw_line((x - reach, y), (x + reach, y), &line)?;
        }

        match self.marker {
            Marker::Circle => {
                backend.draw_circle((x, y), self.size, &self.style, self.style.filled)
            }
            marker => {
                let outline = marker
                    .outline(self.size as i32)
                    .into_iter()
                    .map(|(dx, dy)| (x + dx, y + dy));
                backend.fill_polygon(outline, &self.style)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outlines_are_distinct() {
        let shapes: Vec<_> = [Marker::Square, Marker::Triangle, Marker::Diamond]
            .iter()
            .map(|m| m.outline(3))
            .collect();
        assert_eq!(shapes[0].len(), 4);
        assert_eq!(shapes[1].len(), 3);
        assert_eq!(shapes[2].len(), 4);
        assert_ne!(shapes[0], shapes[2]);
    }

    #[test]
    fn outline_scales_with_size() {
        assert_eq!(
            Marker::Square.outline(2),
            vec![(-2, -2), (2, -2), (2, 2), (-2, 2)]
        );
        assert!(Marker::Circle.outline(4).is_empty());
    }
}
