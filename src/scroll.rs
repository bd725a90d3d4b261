//! Page scroll state: eased glides toward anchor targets and the header's
//! past-the-fold threshold. The scroller owns `scroll_y` while a glide runs;
//! a host-reported position (the user grabbing the wheel) wins over it and
//! cancels the glide.

use crate::{
    ease::Ease,
    error::{KinemaError, KinemaResult},
    stage::{NodeId, Stage},
    timeline::TweenSpec,
    tween::Tween,
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScrollerConfig {
    pub glide: TweenSpec,
    /// Added to an anchor target's document top; negative leaves headroom.
    pub anchor_offset_px: f64,
    /// Relative jump for anchors that point nowhere yet.
    pub fallback_jump_px: f64,
    /// The header counts as scrolled past this offset.
    pub header_threshold_px: f64,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self {
            glide: TweenSpec::new(1200.0, Ease::OutExpo),
            anchor_offset_px: -100.0,
            fallback_jump_px: 800.0,
            header_threshold_px: 50.0,
        }
    }
}

impl ScrollerConfig {
    pub fn validate(&self) -> KinemaResult<()> {
        if !self.glide.duration_ms.is_finite() || self.glide.duration_ms <= 0.0 {
            return Err(KinemaError::validation(format!(
                "scroller glide duration must be finite and positive, got {}",
                self.glide.duration_ms
            )));
        }
        for (name, value) in [
            ("anchor_offset_px", self.anchor_offset_px),
            ("fallback_jump_px", self.fallback_jump_px),
            ("header_threshold_px", self.header_threshold_px),
        ] {
            if !value.is_finite() {
                return Err(KinemaError::validation(format!(
                    "scroller {name} must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Header threshold crossings, reported once per crossing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum HeaderEdge {
    /// Scrolled past the threshold.
    Scrolled,
    /// Returned above it.
    Restored,
}

#[derive(Debug)]
pub struct Scroller {
    config: ScrollerConfig,
    scroll_y: f64,
    glide: Option<Tween>,
    header_scrolled: bool,
}

impl Scroller {
    pub fn new(config: ScrollerConfig) -> KinemaResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            scroll_y: 0.0,
            glide: None,
            header_scrolled: false,
        })
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn is_gliding(&self) -> bool {
        self.glide.is_some()
    }

    pub fn header_scrolled(&self) -> bool {
        self.header_scrolled
    }

    /// Host-reported scroll position. Cancels any glide in progress.
    pub fn set_scroll(&mut self, y: f64) -> Option<HeaderEdge> {
        if self.glide.take().is_some() {
            tracing::debug!(y, "glide cancelled by host scroll");
        }
        self.scroll_y = y;
        self.header_edge()
    }

    /// Glide toward an anchor: a node's document top plus the configured
    /// headroom, or a relative jump for placeholder anchors with no target.
    pub fn scroll_to_anchor(&mut self, stage: &Stage, target: Option<NodeId>, now: f64) {
        let target_y = match target {
            Some(node) => stage.metrics(node).top + self.config.anchor_offset_px,
            None => self.scroll_y + self.config.fallback_jump_px,
        };
        self.glide_to(target_y, now);
    }

    /// Start a glide from the current position. Replaces any glide in flight.
    pub fn glide_to(&mut self, target_y: f64, now: f64) {
        tracing::debug!(from = self.scroll_y, to = target_y, "glide started");
        self.glide = Some(Tween::new(
            self.scroll_y,
            target_y,
            now,
            self.config.glide.duration_ms,
            self.config.glide.ease,
        ));
    }

    /// Advance the glide and report a header crossing, if any.
    pub fn tick(&mut self, now: f64) -> Option<HeaderEdge> {
        if let Some(glide) = self.glide {
            self.scroll_y = glide.value_at(now);
            if glide.is_finished_at(now) {
                self.glide = None;
                tracing::debug!(y = self.scroll_y, "glide settled");
            }
        }
        self.header_edge()
    }

    fn header_edge(&mut self) -> Option<HeaderEdge> {
        let past = self.scroll_y > self.config.header_threshold_px;
        if past == self.header_scrolled {
            return None;
        }
        self.header_scrolled = past;
        Some(if past {
            HeaderEdge::Scrolled
        } else {
            HeaderEdge::Restored
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Metrics;

    fn scroller() -> Scroller {
        Scroller::new(ScrollerConfig::default()).unwrap()
    }

    #[test]
    fn glide_reaches_the_target_exactly_at_duration_end() {
        let mut s = scroller();
        s.glide_to(800.0, 0.0);
        s.tick(600.0);
        assert!(s.scroll_y() > 0.0 && s.scroll_y() < 800.0);
        s.tick(1200.0);
        assert_eq!(s.scroll_y(), 800.0);
        assert!(!s.is_gliding());
    }

    #[test]
    fn a_new_glide_replaces_the_old_one() {
        let mut s = scroller();
        s.glide_to(800.0, 0.0);
        s.tick(600.0);
        s.glide_to(100.0, 600.0);
        s.tick(1800.0);
        assert_eq!(s.scroll_y(), 100.0);
    }

    #[test]
    fn host_scroll_wins_over_a_glide() {
        let mut s = scroller();
        s.glide_to(800.0, 0.0);
        s.set_scroll(50.0);
        assert!(!s.is_gliding());
        s.tick(1200.0);
        assert_eq!(s.scroll_y(), 50.0);
    }

    #[test]
    fn anchors_land_above_their_section() {
        let mut stage = Stage::new();
        let section = stage.insert("features");
        stage.set_metrics(section, Metrics { width: 0.0, top: 1000.0, gap: 0.0 });

        let mut s = scroller();
        s.scroll_to_anchor(&stage, Some(section), 0.0);
        s.tick(1200.0);
        assert_eq!(s.scroll_y(), 900.0);
    }

    #[test]
    fn placeholder_anchors_jump_relative() {
        let stage = Stage::new();
        let mut s = scroller();
        s.set_scroll(200.0);
        s.scroll_to_anchor(&stage, None, 0.0);
        s.tick(1200.0);
        assert_eq!(s.scroll_y(), 1000.0);
    }

    #[test]
    fn header_edges_fire_once_per_crossing() {
        let mut s = scroller();
        assert_eq!(s.set_scroll(51.0), Some(HeaderEdge::Scrolled));
        assert_eq!(s.set_scroll(400.0), None);
        assert_eq!(s.tick(100.0), None);
        assert_eq!(s.set_scroll(50.0), Some(HeaderEdge::Restored));
        assert_eq!(s.set_scroll(0.0), None);
    }

    #[test]
    fn header_edge_fires_mid_glide() {
        let mut s = scroller();
        s.glide_to(800.0, 0.0);
        let mut edges = Vec::new();
        for t in [50.0, 100.0, 600.0, 1200.0] {
            if let Some(edge) = s.tick(t) {
                edges.push(edge);
            }
        }
        assert_eq!(edges, vec![HeaderEdge::Scrolled]);
    }

    #[test]
    fn bad_config_is_rejected() {
        let config = ScrollerConfig {
            glide: TweenSpec::new(0.0, Ease::OutExpo),
            ..ScrollerConfig::default()
        };
        assert!(matches!(
            Scroller::new(config),
            Err(KinemaError::Validation(_))
        ));
    }
}
