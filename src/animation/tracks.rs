#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    CubicSpline,
}

/// Why a track failed [`KeyframeTrack::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackViolation {
    Empty,
    TimesNotIncreasing { index: usize },
    ValueCount { expected: usize, found: usize },
}

impl std::fmt::Display for TrackViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackViolation::Empty => write!(f, "track has no keyframes"),
            TrackViolation::TimesNotIncreasing { index } => {
                write!(f, "key time at index {index} is not greater than its predecessor")
            }
            TrackViolation::ValueCount { expected, found } => {
                write!(f, "expected {expected} values, found {found}")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Copy> {
    pub times: Vec<f32>,
    pub values: Vec<T>, // For CubicSpline, length is times.len() * 3
    pub interpolation: InterpolationMode,
}

impl<T: Copy> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Checks that times strictly increase and the value count matches.
    pub fn validate(&self) -> Result<(), TrackViolation> {
        if self.times.is_empty() {
            return Err(TrackViolation::Empty);
        }
        if let Some(index) = self
            .times
            .windows(2)
            .position(|pair| pair[1] <= pair[0])
        {
            return Err(TrackViolation::TimesNotIncreasing { index: index + 1 });
        }

        let expected = match self.interpolation {
            InterpolationMode::CubicSpline => self.times.len() * 3,
            _ => self.times.len(),
        };
        if self.values.len() != expected {
            return Err(TrackViolation::ValueCount {
                expected,
                found: self.values.len(),
            });
        }
        Ok(())
    }

    /// Keyframe value at `index`, skipping cubic-spline tangents.
    #[must_use]
    pub fn keyframe_value(&self, index: usize) -> Option<T> {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values.get(index * 3 + 1).copied(),
            _ => self.values.get(index).copied(),
        }
    }

    /// Applies `f` to every stored value, tangents included.
    pub fn map_values(&mut self, mut f: impl FnMut(T) -> T) {
        for value in &mut self.values {
            *value = f(*value);
        }
    }

    /// Applies `f` to keyframe values only; cubic-spline tangents are left
    /// untouched.
    pub fn map_keyframes(&mut self, mut f: impl FnMut(T) -> T) {
        match self.interpolation {
            InterpolationMode::CubicSpline => {
                for value in self.values.iter_mut().skip(1).step_by(3) {
                    *value = f(*value);
                }
            }
            _ => self.map_values(f),
        }
    }
}
