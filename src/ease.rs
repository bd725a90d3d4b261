#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    /// Quartic ease-out; the entrance-reveal curve.
    OutQuart,
    /// Exponential ease-out; the curve smooth scrolling glides on.
    OutExpo,
    /// Overshooting ease-out used by press-recover pulses. `overshoot`
    /// controls how far past the target the curve swings (1.70158 is the
    /// conventional ~10% overshoot).
    OutBack { overshoot: f64 },
}

impl Ease {
    /// `OutBack` with the conventional overshoot.
    pub fn out_back() -> Self {
        Self::OutBack { overshoot: 1.70158 }
    }

    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::OutQuart => 1.0 - (1.0 - t).powi(4),
            Self::OutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f64.powf(-10.0 * t)
                }
            }
            Self::OutBack { overshoot } => {
                let c1 = overshoot;
                let c3 = c1 + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Ease; 10] = [
        Ease::Linear,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
        Ease::OutQuart,
        Ease::OutExpo,
        Ease::OutBack { overshoot: 1.70158 },
    ];

    #[test]
    fn endpoints_are_stable() {
        for ease in ALL {
            assert!((ease.apply(0.0)).abs() < 1e-9, "{ease:?} at 0");
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-9, "{ease:?} at 1");
        }
    }

    #[test]
    fn monotonic_spot_check() {
        // OutBack is intentionally non-monotonic (it overshoots), so it is
        // checked separately below.
        for ease in &ALL[..9] {
            let a = ease.apply(0.25);
            let b = ease.apply(0.5);
            let c = ease.apply(0.75);
            assert!(a < b, "{ease:?}");
            assert!(b < c, "{ease:?}");
        }
    }

    #[test]
    fn out_back_overshoots_then_settles() {
        let ease = Ease::out_back();
        let peak = (1..100)
            .map(|i| ease.apply(f64::from(i) / 100.0))
            .fold(f64::MIN, f64::max);
        assert!(peak > 1.0);
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        for ease in ALL {
            assert_eq!(ease.apply(-3.0), ease.apply(0.0));
            assert_eq!(ease.apply(42.0), ease.apply(1.0));
        }
    }
}
