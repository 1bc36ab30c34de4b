use luma_image::ImageError;

/// A monotone-input tone curve through control points.
///
/// No points is the identity, two points interpolate linearly and three or more
/// points define a natural cubic spline. Inputs beyond the outermost control points
/// follow the end segments.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<[f32; 2]>", into = "Vec<[f32; 2]>"))]
pub struct ToneCurve {
    points: Vec<[f32; 2]>,
    // second derivatives of the spline at each control point
    second_derivatives: Vec<f32>,
}

impl ToneCurve {
    /// Create a curve from `(input, output)` control points.
    ///
    /// # Errors
    ///
    /// `InvalidOptions` if a single point is given, a coordinate lies outside
    /// [0, 255] or the inputs are not strictly increasing.
    ///
    /// # Example
    ///
    /// ```
    /// use luma_imgproc::tone::ToneCurve;
    ///
    /// let curve = ToneCurve::new(vec![[0.0, 50.0], [255.0, 200.0]]).unwrap();
    /// assert_eq!(curve.evaluate(128.0).round(), 125.0);
    /// ```
    pub fn new(points: Vec<[f32; 2]>) -> Result<Self, ImageError> {
        if points.len() == 1 {
            return Err(ImageError::InvalidOptions(
                "a tone curve needs zero or at least two points".to_string(),
            ));
        }
        if let Some(point) = points
            .iter()
            .find(|p| p.iter().any(|v| !(0.0..=255.0).contains(v)))
        {
            return Err(ImageError::InvalidOptions(format!(
                "tone curve point {point:?} lies outside [0, 255]"
            )));
        }
        if points.windows(2).any(|w| w[1][0] <= w[0][0]) {
            return Err(ImageError::InvalidOptions(
                "tone curve inputs must be strictly increasing".to_string(),
            ));
        }

        let second_derivatives = natural_spline(&points);
        Ok(Self {
            points,
            second_derivatives,
        })
    }

    /// The identity curve.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Control points of the curve.
    pub fn points(&self) -> &[[f32; 2]] {
        &self.points
    }

    /// Whether the curve maps every input to itself.
    pub fn is_identity(&self) -> bool {
        self.points.is_empty()
    }

    /// Evaluate the curve without rounding or clamping.
    pub fn evaluate(&self, x: f32) -> f32 {
        if self.points.len() < 2 {
            return x;
        }

        let last = self.points.len() - 2;
        let segment = self
            .points
            .windows(2)
            .position(|w| x < w[1][0])
            .unwrap_or(last);

        let [x0, y0] = self.points[segment];
        let [x1, y1] = self.points[segment + 1];
        let m0 = self.second_derivatives[segment];
        let m1 = self.second_derivatives[segment + 1];
        let h = x1 - x0;
        let (a, b) = (x1 - x, x - x0);

        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }
}

impl TryFrom<Vec<[f32; 2]>> for ToneCurve {
    type Error = ImageError;

    fn try_from(points: Vec<[f32; 2]>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<ToneCurve> for Vec<[f32; 2]> {
    fn from(curve: ToneCurve) -> Self {
        curve.points
    }
}

/// Second derivatives of the natural cubic spline through `points`.
///
/// Solves the tridiagonal system with the Thomas algorithm; both ends have a zero
/// second derivative.
fn natural_spline(points: &[[f32; 2]]) -> Vec<f32> {
    let n = points.len();
    let mut m = vec![0.0f32; n];
    if n < 3 {
        return m;
    }

    let h: Vec<f32> = points.windows(2).map(|w| w[1][0] - w[0][0]).collect();
    let slope: Vec<f32> = points
        .windows(2)
        .zip(&h)
        .map(|(w, h)| (w[1][1] - w[0][1]) / h)
        .collect();

    // forward sweep over the interior rows
    let mut diag = vec![0.0f32; n];
    let mut rhs = vec![0.0f32; n];
    for i in 1..n - 1 {
        let lower = h[i - 1];
        diag[i] = 2.0 * (h[i - 1] + h[i]);
        rhs[i] = 6.0 * (slope[i] - slope[i - 1]);
        if i > 1 {
            let factor = lower / diag[i - 1];
            diag[i] -= factor * h[i - 1];
            rhs[i] -= factor * rhs[i - 1];
        }
    }

    // back substitution
    for i in (1..n - 1).rev() {
        let upper = if i + 1 < n - 1 { h[i] * m[i + 1] } else { 0.0 };
        m[i] = (rhs[i] - upper) / diag[i];
    }

    m
}
