use crate::error::{Error, Result};
use crate::rng::XorShift64Star;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A partially specified layout region, as supplied by the host.
///
/// Any subset of the fields may be present; [`BoundingBox::resolve`] derives the rest.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundingBoxSpec {
    pub x1: Option<f64>,
    pub y1: Option<f64>,
    pub x2: Option<f64>,
    pub y2: Option<f64>,
    pub w: Option<f64>,
    pub h: Option<f64>,
}

/// A fully resolved layout region. All edges and both extents are always populated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub w: f64,
    pub h: f64,
}

impl BoundingBox {
    pub fn from_origin(x1: f64, y1: f64, w: f64, h: f64) -> Self {
        Self {
            x1,
            y1,
            x2: x1 + w,
            y2: y1 + h,
            w,
            h,
        }
    }

    /// Resolves a host-supplied region against the viewport.
    ///
    /// A missing spec means the whole viewport. Missing far edges are derived from the extent and
    /// missing extents from the far edge; when neither is present the viewport extent is used.
    pub fn resolve(spec: Option<&BoundingBoxSpec>, viewport: Size) -> Result<Self> {
        let Some(spec) = spec else {
            return Self::from_origin(0.0, 0.0, viewport.width, viewport.height).validated();
        };

        let (x1, x2, w) = resolve_axis("x", spec.x1, spec.x2, spec.w, viewport.width)?;
        let (y1, y2, h) = resolve_axis("y", spec.y1, spec.y2, spec.h, viewport.height)?;
        Self {
            x1,
            y1,
            x2,
            y2,
            w,
            h,
        }
        .validated()
    }

    fn validated(self) -> Result<Self> {
        let values = [self.x1, self.y1, self.x2, self.y2, self.w, self.h];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::config(format!(
                "bounding box must be finite, got {self:?}"
            )));
        }
        if self.w < 0.0 || self.h < 0.0 {
            return Err(Error::config(format!(
                "bounding box has a negative extent (w={}, h={})",
                self.w, self.h
            )));
        }
        Ok(self)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x1 + self.w / 2.0, self.y1 + self.h / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x1 && p.x <= self.x2 && p.y >= self.y1 && p.y <= self.y2
    }

    pub fn random_point(&self, rng: &mut XorShift64Star) -> Point {
        Point::new(
            self.x1 + rng.next_f64_unit() * self.w,
            self.y1 + rng.next_f64_unit() * self.h,
        )
    }
}

fn resolve_axis(
    axis: &str,
    start: Option<f64>,
    end: Option<f64>,
    extent: Option<f64>,
    fallback: f64,
) -> Result<(f64, f64, f64)> {
    let start = start.unwrap_or(0.0);
    match (end, extent) {
        (Some(end), Some(extent)) => {
            let tolerance = 1e-9 * (1.0 + start.abs().max(end.abs()));
            if ((end - start) - extent).abs() > tolerance {
                return Err(Error::config(format!(
                    "bounding box {axis} edges ({start}, {end}) disagree with extent {extent}"
                )));
            }
            Ok((start, end, extent))
        }
        (Some(end), None) => Ok((start, end, end - start)),
        (None, Some(extent)) => Ok((start, start + extent, extent)),
        (None, None) => Ok((start, start + fallback, fallback)),
    }
}
